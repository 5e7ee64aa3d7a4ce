//! Prompt composition.
//!
//! [`compose`] turns one [`Selection`] per category plus the loaded
//! fragment library into a single text block. Categories are rendered in
//! [`Category::ALL`] order; role, goal and tone use `Label: content`, the
//! multi-select categories use `Label:` followed by one fragment per line.
//! Sections are separated by a blank line.
//!
//! Composition never fails. A reference to a fragment that is no longer in
//! the library is dropped and reported as a [`CompositionWarning`].
//! Nothing is logged here; callers decide which warnings to log.
//!
//! ```
//! use promptlib::category::Category;
//! use promptlib::compose::{PromptRequest, Selection, Selections, compose};
//! use promptlib::fragment::{Fragment, FragmentDraft};
//!
//! let expert = Fragment::from_draft(FragmentDraft::new(
//!     Category::Role,
//!     "Expert",
//!     "You are a senior engineer.",
//! ));
//! let request = PromptRequest {
//!     selections: Selections::new().with(Category::Role, Selection::fragment(expert.id)),
//!     recursive_feedback: false,
//! };
//!
//! let composition = compose(&request, &[expert]);
//! assert_eq!(composition.text, "Role: You are a senior engineer.");
//! assert!(composition.warnings.is_empty());
//! ```

mod builder;
mod selection;

pub use builder::SectionBuilder;
pub use selection::{Choice, Selection, Selections};

use std::fmt;

use crate::category::Category;
use crate::fragment::Fragment;
use crate::store::RecordId;

/// Closing instruction appended when recursive feedback is requested.
pub const RECURSIVE_FEEDBACK_INSTRUCTION: &str = "Before you provide the response, please ask me \
any questions that you feel could help you craft a better response. If you feel you have enough \
information to craft this response, please just provide it.";

/// Everything the composer needs besides the library.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct PromptRequest {
    pub selections: Selections,
    /// Ask the responder to pose clarifying questions before answering.
    pub recursive_feedback: bool,
}

/// A problem found while composing. The affected reference is skipped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CompositionWarning {
    /// The referenced fragment is not in the library.
    MissingFragment { category: Category, id: RecordId },
    /// A single-select category referenced more than one fragment; only the
    /// first was used.
    ExtraReferences { category: Category, ignored: usize },
}

impl fmt::Display for CompositionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingFragment { category, id } => write!(
                f,
                "{} references fragment {id}, which is no longer in the library; skipped",
                category.label()
            ),
            Self::ExtraReferences { category, ignored } => write!(
                f,
                "{} accepts one fragment; ignored {ignored} extra",
                category.label()
            ),
        }
    }
}

/// The rendered prompt and anything that was skipped along the way.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Composition {
    pub text: String,
    pub warnings: Vec<CompositionWarning>,
}

/// Render `request` against `library`.
///
/// Deterministic: the same request and library always produce the same
/// text.
pub fn compose(request: &PromptRequest, library: &[Fragment]) -> Composition {
    let mut warnings = Vec::new();
    let mut builder = SectionBuilder::new();

    for (category, selection) in request.selections.iter() {
        let content = match selection {
            Selection::Skip => continue,
            Selection::Custom(text) => text.clone(),
            Selection::References(ids) => {
                resolve_references(category, ids, library, &mut warnings)
            }
        };
        builder = builder.section(category.section_style(), category.label(), content);
    }

    let text = builder
        .raw_if(request.recursive_feedback, RECURSIVE_FEEDBACK_INSTRUCTION)
        .build();

    Composition { text, warnings }
}

/// Join the content of the referenced fragments, one per line.
fn resolve_references(
    category: Category,
    ids: &[RecordId],
    library: &[Fragment],
    warnings: &mut Vec<CompositionWarning>,
) -> String {
    let ids = if !category.is_multi_select() && ids.len() > 1 {
        warnings.push(CompositionWarning::ExtraReferences {
            category,
            ignored: ids.len() - 1,
        });
        &ids[..1]
    } else {
        ids
    };

    let mut lines: Vec<&str> = Vec::with_capacity(ids.len());
    for id in ids {
        match library.iter().find(|f| f.id == *id) {
            Some(fragment) => lines.push(&fragment.content),
            None => warnings.push(CompositionWarning::MissingFragment { category, id: *id }),
        }
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fragment::FragmentDraft;

    fn fragment(category: Category, title: &str, content: &str) -> Fragment {
        Fragment::from_draft(FragmentDraft::new(category, title, content))
    }

    fn request(selections: Selections) -> PromptRequest {
        PromptRequest {
            selections,
            recursive_feedback: false,
        }
    }

    #[test]
    fn single_role_renders_inline() {
        let expert = fragment(Category::Role, "Expert", "You are a senior engineer.");
        let req = request(Selections::new().with(Category::Role, Selection::fragment(expert.id)));
        let out = compose(&req, &[expert]);
        assert_eq!(out.text, "Role: You are a senior engineer.");
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn all_skip_yields_empty_body() {
        let library = vec![fragment(Category::Role, "Expert", "x")];
        assert_eq!(compose(&PromptRequest::default(), &library).text, "");

        let with_feedback = PromptRequest {
            recursive_feedback: true,
            ..Default::default()
        };
        assert_eq!(
            compose(&with_feedback, &library).text,
            RECURSIVE_FEEDBACK_INSTRUCTION
        );
    }

    #[test]
    fn full_prompt_layout() {
        let role = fragment(Category::Role, "Expert", "You are a senior engineer.");
        let devs = fragment(Category::Audience, "Devs", "Backend developers");
        let pms = fragment(Category::Audience, "PMs", "Product managers");
        let ctx = fragment(Category::Context, "Repo", "A Rust workspace.");
        let library = vec![role.clone(), devs.clone(), pms.clone(), ctx.clone()];

        let req = PromptRequest {
            selections: Selections::new()
                .with(Category::Tone, Selection::custom("Friendly"))
                .with(Category::Role, Selection::fragment(role.id))
                .with(Category::Goal, Selection::custom("Review this diff."))
                .with(Category::Audience, Selection::References(vec![pms.id, devs.id]))
                .with(Category::Context, Selection::fragment(ctx.id))
                .with(Category::Output, Selection::custom("A bullet list.")),
            recursive_feedback: true,
        };

        let expected = format!(
            "Role: You are a senior engineer.\n\n\
             Goal: Review this diff.\n\n\
             Target Audience:\nProduct managers\nBackend developers\n\n\
             Context:\nA Rust workspace.\n\n\
             Output:\nA bullet list.\n\n\
             Tone: Friendly\n\n\
             {RECURSIVE_FEEDBACK_INSTRUCTION}"
        );
        assert_eq!(compose(&req, &library).text, expected);
    }

    #[test]
    fn composition_is_deterministic() {
        let a = fragment(Category::Output, "A", "alpha");
        let b = fragment(Category::Output, "B", "beta");
        let library = vec![a.clone(), b.clone()];
        let req = PromptRequest {
            selections: Selections::new()
                .with(Category::Output, Selection::References(vec![b.id, a.id]))
                .with(Category::Goal, Selection::custom("g")),
            recursive_feedback: true,
        };
        let first = compose(&req, &library);
        let second = compose(&req, &library);
        assert_eq!(first.text.as_bytes(), second.text.as_bytes());
    }

    #[test]
    fn custom_text_wins_over_references_in_multi_select() {
        let devs = fragment(Category::Audience, "Devs", "Backend developers");
        let selection = Selection::from_choices(
            &[Choice::Fragment(devs.id), Choice::WriteYourOwn],
            "Data scientists",
        );
        let req = request(Selections::new().with(Category::Audience, selection));
        assert_eq!(
            compose(&req, &[devs]).text,
            "Target Audience:\nData scientists"
        );
    }

    #[test]
    fn missing_reference_is_skipped_with_warning() {
        let kept = fragment(Category::Context, "Kept", "still here");
        let gone = RecordId::new();
        let req = request(
            Selections::new().with(Category::Context, Selection::References(vec![gone, kept.id])),
        );
        let out = compose(&req, &[kept]);
        assert_eq!(out.text, "Context:\nstill here");
        assert_eq!(
            out.warnings,
            vec![CompositionWarning::MissingFragment {
                category: Category::Context,
                id: gone
            }]
        );
        assert!(out.warnings[0].to_string().contains("no longer in the library"));
    }

    #[test]
    fn missing_single_reference_drops_the_section() {
        let req = request(Selections::new().with(Category::Role, Selection::fragment(RecordId::new())));
        let out = compose(&req, &[]);
        assert_eq!(out.text, "");
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn single_select_uses_first_reference_only() {
        let a = fragment(Category::Tone, "A", "Formal");
        let b = fragment(Category::Tone, "B", "Casual");
        let req = request(
            Selections::new().with(Category::Tone, Selection::References(vec![a.id, b.id])),
        );
        let out = compose(&req, &[a, b]);
        assert_eq!(out.text, "Tone: Formal");
        assert_eq!(
            out.warnings,
            vec![CompositionWarning::ExtraReferences {
                category: Category::Tone,
                ignored: 1
            }]
        );
    }

    #[test]
    fn empty_custom_text_contributes_nothing() {
        let req = request(
            Selections::new()
                .with(Category::Role, Selection::custom(""))
                .with(Category::Goal, Selection::custom("Do it.")),
        );
        assert_eq!(compose(&req, &[]).text, "Goal: Do it.");
    }

    #[test]
    fn references_resolve_across_categories() {
        // A fragment re-typed after it was picked still resolves by id.
        let moved = fragment(Category::Tone, "Moved", "Now a tone");
        let req = request(Selections::new().with(Category::Goal, Selection::fragment(moved.id)));
        assert_eq!(compose(&req, &[moved]).text, "Goal: Now a tone");
    }
}
