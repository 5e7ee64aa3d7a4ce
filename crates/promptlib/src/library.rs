//! Create, filter, edit and delete fragments.

use std::fmt;

use tracing::info;

use crate::category::Category;
use crate::fragment::{Fragment, FragmentDraft};
use crate::store::{CsvTable, RecordId, RecordStore, StoreResult};

/// Category filter for the library listing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Filter {
    #[default]
    All,
    Only(Category),
}

impl Filter {
    pub fn matches(self, fragment: &Fragment) -> bool {
        match self {
            Self::All => true,
            Self::Only(category) => fragment.category == category,
        }
    }

    /// Fragments passing this filter, in storage order.
    pub fn apply(self, fragments: &[Fragment]) -> Vec<&Fragment> {
        fragments.iter().filter(|f| self.matches(f)).collect()
    }

    /// Filter choices for a library: `All`, then each category that has at
    /// least one fragment, sorted by stored name.
    pub fn options(fragments: &[Fragment]) -> Vec<Filter> {
        let mut present: Vec<Category> = Category::ALL
            .into_iter()
            .filter(|c| fragments.iter().any(|f| f.category == *c))
            .collect();
        present.sort_by_key(|c| c.as_str());

        let mut options = vec![Self::All];
        options.extend(present.into_iter().map(Self::Only));
        options
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("All"),
            Self::Only(category) => fmt::Display::fmt(category, f),
        }
    }
}

/// The fragment library, backed by a [`RecordStore`].
#[derive(Debug, Clone)]
pub struct FragmentLibrary<S = CsvTable<Fragment>> {
    store: S,
}

impl<S: RecordStore<Fragment>> FragmentLibrary<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Add a fragment. Titles are not checked for uniqueness and empty
    /// fields are accepted.
    pub fn create(&self, draft: FragmentDraft) -> StoreResult<Fragment> {
        let fragment = Fragment::from_draft(draft);
        self.store.append(fragment.clone())?;
        info!(
            "Added {} fragment \"{}\" ({})",
            fragment.category, fragment.title, fragment.id
        );
        Ok(fragment)
    }

    /// Every fragment in storage order.
    pub fn list(&self) -> StoreResult<Vec<Fragment>> {
        self.store.list()
    }

    pub fn filter(&self, filter: Filter) -> StoreResult<Vec<Fragment>> {
        Ok(self
            .store
            .list()?
            .into_iter()
            .filter(|f| filter.matches(f))
            .collect())
    }

    /// Overwrite the editable fields of the fragment with `id`.
    pub fn update(&self, id: RecordId, draft: FragmentDraft) -> StoreResult<Fragment> {
        let fragment = Fragment::with_id(id, draft);
        self.store.update(fragment.clone())?;
        info!("Updated fragment \"{}\" ({id})", fragment.title);
        Ok(fragment)
    }

    pub fn delete(&self, id: RecordId) -> StoreResult<Fragment> {
        let removed = self.store.delete(id)?;
        info!("Deleted fragment \"{}\" ({id})", removed.title);
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreError;
    use tempfile::TempDir;

    fn library(dir: &TempDir) -> FragmentLibrary {
        FragmentLibrary::new(CsvTable::open(dir.path()).unwrap())
    }

    #[test]
    fn created_fragment_is_listed_exactly_once() {
        let dir = TempDir::new().unwrap();
        let lib = library(&dir);
        let created = lib
            .create(FragmentDraft::new(
                Category::Role,
                "Expert",
                "You are a senior engineer.",
            ))
            .unwrap();

        let all = lib.list().unwrap();
        assert_eq!(all.iter().filter(|f| f.id == created.id).count(), 1);
        assert_eq!(all, vec![created]);
    }

    #[test]
    fn duplicate_titles_and_empty_fields_are_allowed() {
        let dir = TempDir::new().unwrap();
        let lib = library(&dir);
        lib.create(FragmentDraft::new(Category::Goal, "Same", "one"))
            .unwrap();
        lib.create(FragmentDraft::new(Category::Goal, "Same", "two"))
            .unwrap();
        lib.create(FragmentDraft::new(Category::Goal, "", "")).unwrap();
        assert_eq!(lib.list().unwrap().len(), 3);
    }

    #[test]
    fn filter_by_category() {
        let dir = TempDir::new().unwrap();
        let lib = library(&dir);
        lib.create(FragmentDraft::new(Category::Role, "R", "r"))
            .unwrap();
        lib.create(FragmentDraft::new(Category::Tone, "T1", "t1"))
            .unwrap();
        lib.create(FragmentDraft::new(Category::Tone, "T2", "t2"))
            .unwrap();

        let tones = lib.filter(Filter::Only(Category::Tone)).unwrap();
        let titles: Vec<&str> = tones.iter().map(|f| f.title.as_str()).collect();
        assert_eq!(titles, ["T1", "T2"]);
        assert_eq!(lib.filter(Filter::All).unwrap().len(), 3);
        assert!(lib.filter(Filter::Only(Category::Goal)).unwrap().is_empty());
    }

    #[test]
    fn filter_options_are_alphabetical() {
        let dir = TempDir::new().unwrap();
        let lib = library(&dir);
        for category in [Category::Tone, Category::Role, Category::Goal, Category::Audience] {
            lib.create(FragmentDraft::new(category, "T", "t")).unwrap();
        }
        let options = Filter::options(&lib.list().unwrap());
        assert_eq!(
            options,
            [
                Filter::All,
                Filter::Only(Category::Audience),
                Filter::Only(Category::Goal),
                Filter::Only(Category::Role),
                Filter::Only(Category::Tone)
            ]
        );
        assert_eq!(options[0].to_string(), "All");
        assert_eq!(options[4].to_string(), "tone");
    }

    #[test]
    fn update_overwrites_fields_in_place() {
        let dir = TempDir::new().unwrap();
        let lib = library(&dir);
        let a = lib
            .create(FragmentDraft::new(Category::Role, "A", "a"))
            .unwrap();
        let b = lib
            .create(FragmentDraft::new(Category::Role, "B", "b"))
            .unwrap();

        let updated = lib
            .update(a.id, FragmentDraft::new(Category::Goal, "A2", "a2"))
            .unwrap();
        assert_eq!(lib.list().unwrap(), vec![updated, b]);
    }

    #[test]
    fn delete_leaves_other_rows_untouched() {
        let dir = TempDir::new().unwrap();
        let lib = library(&dir);
        let created: Vec<Fragment> = ["a", "b", "c", "d"]
            .iter()
            .map(|t| {
                lib.create(FragmentDraft::new(Category::Context, *t, *t))
                    .unwrap()
            })
            .collect();

        lib.delete(created[1].id).unwrap();
        let remaining = lib.list().unwrap();
        assert_eq!(remaining.len(), 3);
        assert_eq!(
            remaining,
            vec![created[0].clone(), created[2].clone(), created[3].clone()]
        );
    }

    #[test]
    fn delete_unknown_id_fails() {
        let dir = TempDir::new().unwrap();
        let lib = library(&dir);
        assert!(matches!(
            lib.delete(RecordId::new()),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn reads_files_written_without_ids() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("prompt_elements.csv"),
            "title,type,content\nExpert,role,You are a senior engineer.\n\
             Devs,audience,\"Backend devs,\nfrontend devs\"\n",
        )
        .unwrap();
        let lib = library(&dir);
        let all = lib.list().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].category, Category::Role);
        assert_eq!(all[1].content, "Backend devs,\nfrontend devs");
    }
}
