//! Per-category selections.
//!
//! A UI offers each category a list of choices: the two sentinels (skip,
//! write your own) followed by the fragments of that category. [`Choice`]
//! is one entry of that list; [`Selection`] is what the composer actually
//! consumes after sentinel handling.

use crate::category::Category;
use crate::store::RecordId;

/// What the composer should emit for one category.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum Selection {
    /// Contribute nothing.
    #[default]
    Skip,
    /// Use this free text verbatim.
    Custom(String),
    /// Use the content of these fragments, in this order.
    References(Vec<RecordId>),
}

/// One pickable entry in a category's choice list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Choice {
    Skip,
    WriteYourOwn,
    Fragment(RecordId),
}

impl Choice {
    pub fn is_sentinel(self) -> bool {
        !matches!(self, Self::Fragment(_))
    }
}

impl Selection {
    /// Reduce the raw choices of one category to a selection.
    ///
    /// "Write your own" wins over everything else: if it was picked, the
    /// free text is used and any fragment picks are dropped. Otherwise the
    /// picked fragments are kept in pick order with duplicates removed; no
    /// fragments left means skip.
    pub fn from_choices(choices: &[Choice], custom_text: &str) -> Self {
        if choices.contains(&Choice::WriteYourOwn) {
            return Self::Custom(custom_text.to_string());
        }
        let mut ids: Vec<RecordId> = Vec::with_capacity(choices.len());
        for choice in choices {
            if let Choice::Fragment(id) = choice
                && !ids.contains(id)
            {
                ids.push(*id);
            }
        }
        if ids.is_empty() {
            Self::Skip
        } else {
            Self::References(ids)
        }
    }

    /// Shorthand for a single fragment reference.
    pub fn fragment(id: RecordId) -> Self {
        Self::References(vec![id])
    }

    pub fn custom(text: impl Into<String>) -> Self {
        Self::Custom(text.into())
    }

    pub fn is_skip(&self) -> bool {
        matches!(self, Self::Skip)
    }
}

/// One [`Selection`] per category, all [`Selection::Skip`] by default.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Selections([Selection; 6]);

impl Selections {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, category: Category) -> &Selection {
        &self.0[category.index()]
    }

    pub fn set(&mut self, category: Category, selection: Selection) {
        self.0[category.index()] = selection;
    }

    /// Builder-style [`set`](Self::set).
    pub fn with(mut self, category: Category, selection: Selection) -> Self {
        self.set(category, selection);
        self
    }

    /// Categories paired with their selection, in rendering order.
    pub fn iter(&self) -> impl Iterator<Item = (Category, &Selection)> {
        Category::ALL.into_iter().zip(self.0.iter())
    }
}
