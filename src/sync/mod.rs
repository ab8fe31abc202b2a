//! Client-side list synchronization.
//!
//! Every list view in the application holds its entities through this
//! module: a keyed, ordered collection fed by paginated fetches, mutated
//! optimistically, with failures surfaced through a single-slot transient
//! error channel. The layer owns no persistence; a view creates its state
//! fresh and discards it on navigation.

pub mod error;
pub mod fetch;
pub mod list;
pub mod mutate;
pub mod query;
pub mod search;

pub use error::{ErrorSlot, FailedResponse, Severity};
pub use fetch::{sync_page, Fetcher, ListSync};
pub use list::{insert_front, remove_by_key, upsert, Keyed};
pub use mutate::{next_vote_state, toggled, Vote};
pub use query::{ListFilter, PageQuery, SortKey};
pub use search::{search_pair, Debouncer, SearchResults};
