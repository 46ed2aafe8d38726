//! Mocks for model collaborators.

/// Mock backing store.
pub mod store;
