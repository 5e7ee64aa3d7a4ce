//! Reusable, titled pieces of prompt text.

use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::store::{IdSource, Record, RecordId};

/// One row of the fragment library.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fragment {
    pub id: RecordId,
    /// Display title. Not required to be unique.
    pub title: String,
    pub category: Category,
    pub content: String,
}

/// The user-editable fields of a fragment, as entered in a form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FragmentDraft {
    pub title: String,
    pub category: Category,
    pub content: String,
}

impl FragmentDraft {
    pub fn new(category: Category, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            category,
            content: content.into(),
        }
    }
}

impl Default for FragmentDraft {
    fn default() -> Self {
        Self::new(Category::Role, "", "")
    }
}

impl Fragment {
    /// Build a new fragment with a fresh id.
    pub fn from_draft(draft: FragmentDraft) -> Self {
        Self::with_id(RecordId::new(), draft)
    }

    pub fn with_id(id: RecordId, draft: FragmentDraft) -> Self {
        Self {
            id,
            title: draft.title,
            category: draft.category,
            content: draft.content,
        }
    }

    /// The editable fields, e.g. to prefill an edit form.
    pub fn draft(&self) -> FragmentDraft {
        FragmentDraft {
            title: self.title.clone(),
            category: self.category,
            content: self.content.clone(),
        }
    }
}

#[derive(Serialize, Deserialize)]
pub struct FragmentRow {
    #[serde(default)]
    id: String,
    #[serde(default)]
    title: String,
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    content: String,
}

impl Record for Fragment {
    const FILE_NAME: &'static str = "prompt_elements.csv";
    const COLUMNS: &'static [&'static str] = &["id", "title", "type", "content"];
    type Row = FragmentRow;

    fn id(&self) -> RecordId {
        self.id
    }

    fn to_row(&self) -> FragmentRow {
        FragmentRow {
            id: self.id.to_string(),
            title: self.title.clone(),
            kind: self.category.as_str().to_string(),
            content: self.content.clone(),
        }
    }

    fn from_row(row: FragmentRow) -> Result<(Self, IdSource), String> {
        let category = row.kind.parse::<Category>().map_err(|e| e.to_string())?;
        let (id, source) = RecordId::parse_or_assign(&row.id);
        Ok((
            Fragment {
                id,
                title: row.title,
                category,
                content: row.content,
            },
            source,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_round_trip_keeps_id_and_type() {
        let fragment = Fragment::from_draft(FragmentDraft::new(
            Category::Audience,
            "Execs",
            "Busy executives.",
        ));
        let (back, source) = Fragment::from_row(fragment.to_row()).unwrap();
        assert_eq!(back, fragment);
        assert_eq!(source, IdSource::Stored);
    }

    #[test]
    fn unknown_type_is_rejected() {
        let row = FragmentRow {
            id: String::new(),
            title: "x".into(),
            kind: "persona".into(),
            content: "y".into(),
        };
        let err = Fragment::from_row(row).unwrap_err();
        assert!(err.contains("persona"));
    }

    #[test]
    fn draft_mirrors_editable_fields() {
        let fragment =
            Fragment::from_draft(FragmentDraft::new(Category::Tone, "Warm", "Be warm."));
        let draft = fragment.draft();
        assert_eq!(draft.title, "Warm");
        assert_eq!(draft.category, Category::Tone);
        assert_eq!(Fragment::with_id(fragment.id, draft), fragment);
    }
}
