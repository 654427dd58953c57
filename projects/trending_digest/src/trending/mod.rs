pub mod extract;
pub mod fetch;

pub use extract::{ExtractEntryError, ExtractorInitError, RepositoryExtractor};
pub use fetch::{GitHubPageFetcher, PageFetcher};
