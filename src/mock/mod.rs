//! The top-level mock: a registry of repositories keyed by `owner/name`.
//!
//! The request-routing layer that turns API calls into method calls lives
//! outside this crate. It looks a repository up here by the owner and name in
//! the request path and calls one [`Repository`](crate::storage::Repository)
//! method.

mod config;
mod fixture;
mod registry;

pub use config::{ExistingRepoPolicy, MockConfig};
pub use fixture::RepositoryFixture;
pub use registry::Mock;
