//! Client side of the editor: an HTTP client for the API, the shared state
//! store the UI renders from, and the debounced autosave used by inline edits.

pub mod api;
pub mod autosave;
pub mod store;

pub use api::{ApiClient, ClientError};
pub use autosave::AutoSave;
pub use store::{order_ids, Store, StoreState};
pub use crate::services::ordering::move_item;
