//! A library of reusable prompt fragments and a composer that assembles them.
//!
//! `promptlib` keeps two flat CSV tables in one directory: the fragment
//! library (`prompt_elements.csv`) and the history of composed prompts
//! (`prompt_history.csv`). A front end picks fragments per category, asks
//! [`compose`](compose::compose) for the rendered text, and saves the result
//! to history.
//!
//! Nothing is cached between calls. Every read goes to disk and every
//! mutation rewrites the affected file, so two sessions sharing a directory
//! see each other's writes (last writer wins).
//!
//! # Getting started
//!
//! ```no_run
//! use promptlib::prelude::*;
//!
//! fn main() -> Result<(), StoreError> {
//!     let workspace = Workspace::open(&StorageConfig::default())?;
//!
//!     let expert = workspace.library().create(FragmentDraft::new(
//!         Category::Role,
//!         "Expert",
//!         "You are a senior engineer.",
//!     ))?;
//!
//!     let request = PromptRequest {
//!         selections: Selections::new().with(Category::Role, Selection::fragment(expert.id)),
//!         recursive_feedback: true,
//!     };
//!     let composition = workspace.snapshot()?.compose(&request);
//!     workspace.history().save("Code review", &composition.text)?;
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`category`] | The six fixed fragment categories, their labels and section styles |
//! | [`fragment`] | [`Fragment`](fragment::Fragment) rows and drafts |
//! | [`library`] | [`FragmentLibrary`](library::FragmentLibrary) create/filter/update/delete |
//! | [`history`] | Append-only [`PromptHistory`](history::PromptHistory) |
//! | [`compose`] | [`Selection`](compose::Selection) per category and the deterministic composer |
//! | [`store`] | [`RecordStore`](store::RecordStore) trait and its CSV implementation |
//! | [`config`] | [`StorageConfig`](config::StorageConfig) directory resolution with fallback |
//! | [`workspace`] | [`Workspace`](workspace::Workspace), the two tables opened together |
//! | [`logging`] | [`UiTracingLayer`](logging::UiTracingLayer) for in-app log capture |

pub mod category;
pub mod compose;
pub mod config;
pub mod fragment;
pub mod history;
pub mod library;
pub mod logging;
pub mod prelude;
pub mod store;
pub mod workspace;

pub use category::Category;
pub use store::{RecordId, StoreError, StoreResult};
pub use workspace::{Snapshot, Workspace};
