//! The six fixed prompt-construction slots.
//!
//! [`Category::ALL`] is also the rendering order of a composed prompt, so
//! reordering the variants changes every generated prompt.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A prompt-construction slot. Every fragment belongs to exactly one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Role,
    Goal,
    Audience,
    Context,
    Output,
    Tone,
}

/// How a category's section is laid out in the composed prompt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SectionStyle {
    /// `Label: content` on one line.
    Inline,
    /// `Label:` followed by the content on the next line.
    Block,
}

impl Category {
    /// All categories in declaration (and rendering) order.
    pub const ALL: [Category; 6] = [
        Self::Role,
        Self::Goal,
        Self::Audience,
        Self::Context,
        Self::Output,
        Self::Tone,
    ];

    /// Lowercase identifier as stored in the `type` column.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Role => "role",
            Self::Goal => "goal",
            Self::Audience => "audience",
            Self::Context => "context",
            Self::Output => "output",
            Self::Tone => "tone",
        }
    }

    /// Heading used for this category's section in a composed prompt.
    pub fn label(self) -> &'static str {
        match self {
            Self::Role => "Role",
            Self::Goal => "Goal",
            Self::Audience => "Target Audience",
            Self::Context => "Context",
            Self::Output => "Output",
            Self::Tone => "Tone",
        }
    }

    /// Whether more than one fragment may be referenced at once.
    pub fn is_multi_select(self) -> bool {
        matches!(self, Self::Audience | Self::Context | Self::Output)
    }

    pub fn section_style(self) -> SectionStyle {
        if self.is_multi_select() {
            SectionStyle::Block
        } else {
            SectionStyle::Inline
        }
    }

    /// Position in [`Category::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// The next category in declaration order, wrapping around.
    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    /// The previous category in declaration order, wrapping around.
    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string names no category.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown category {0:?} (expected one of role, goal, audience, context, output, tone)")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}
