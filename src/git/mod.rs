//! Git operations module
//!
//! Provides:
//! - Created/modified file detection against a base reference
//! - HEAD commit lookup for report links

pub mod diff;

pub use diff::{GitChanges, GitDiff};
