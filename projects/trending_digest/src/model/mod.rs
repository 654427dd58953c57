pub mod repository;
pub mod timestamp;

pub use repository::{History, RepositoryRecord};
