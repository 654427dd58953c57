//! Raw access to the GitHub trending listing.

pub mod index;
