// ABOUTME: Persistence layer for gysd: the two snapshot backends and their merged view.
// ABOUTME: Provides the slot store, the sqlite document store, the catalog, and the dismissal key.

pub mod catalog;
pub mod dismissal;
pub mod doc;
pub mod slot;

pub use catalog::Catalog;
pub use dismissal::DismissalKey;
pub use doc::{DocError, DocStore};
pub use slot::{SlotError, SlotStore};
