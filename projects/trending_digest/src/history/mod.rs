pub mod diff;
pub mod store;

pub use diff::diff_against_history;
pub use store::{HistoryStore, JsonHistoryStore, SaveHistoryError, SnapshotHistoryStore};
