//! Labeled-section text builder.
//!
//! [`SectionBuilder`] collects labeled sections and joins them with a blank
//! line. Sections whose content is empty are skipped, so callers never
//! need to guard against producing a dangling label.
//!
//! # Example
//!
//! ```
//! use promptlib::compose::SectionBuilder;
//!
//! let text = SectionBuilder::new()
//!     .inline("Role", "You are a reviewer.")
//!     .block("Context", "Line one\nLine two")
//!     .inline("Tone", "")
//!     .raw("Thanks!")
//!     .build();
//!
//! assert_eq!(
//!     text,
//!     "Role: You are a reviewer.\n\nContext:\nLine one\nLine two\n\nThanks!"
//! );
//! ```

use crate::category::SectionStyle;

#[derive(Debug, Default, Clone)]
pub struct SectionBuilder {
    sections: Vec<String>,
}

impl SectionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `Label: content`. Skipped if `content` is empty.
    pub fn inline(self, label: &str, content: impl AsRef<str>) -> Self {
        self.section(SectionStyle::Inline, label, content)
    }

    /// Append `Label:` with the content on the following lines. Skipped if
    /// `content` is empty.
    pub fn block(self, label: &str, content: impl AsRef<str>) -> Self {
        self.section(SectionStyle::Block, label, content)
    }

    /// Append a section in the given style. Skipped if `content` is empty.
    pub fn section(mut self, style: SectionStyle, label: &str, content: impl AsRef<str>) -> Self {
        let content = content.as_ref();
        if content.is_empty() {
            return self;
        }
        let rendered = match style {
            SectionStyle::Inline => format!("{label}: {content}"),
            SectionStyle::Block => format!("{label}:\n{content}"),
        };
        self.sections.push(rendered);
        self
    }

    /// Append text with no label. Skipped if empty.
    pub fn raw(mut self, content: impl Into<String>) -> Self {
        let content = content.into();
        if !content.is_empty() {
            self.sections.push(content);
        }
        self
    }

    /// Append unlabeled text only when `condition` holds.
    pub fn raw_if(self, condition: bool, content: impl Into<String>) -> Self {
        if condition { self.raw(content) } else { self }
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Join all sections with a blank line between them.
    pub fn build(self) -> String {
        self.sections.join("\n\n")
    }
}
