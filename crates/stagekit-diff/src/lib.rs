//! Diff engine for stagekit.
//!
//! Computes the edits that turn a source collection into a target collection
//! and packages them as staged changesets that a list view can apply one
//! batch at a time. Diffing is a pure, synchronous, total computation: it
//! never fails and keeps no state between calls.
//!
//! # Key Functions
//!
//! - [`diff_linear`] / [`diff_linear_with`] -- Raw edit sets for flat sequences
//! - [`staged_changeset`] / [`staged_changeset_in_section`] -- Up to three flat stages
//! - [`sectioned_staged_changeset`] -- Up to five stages for sectioned collections
//! - [`apply_changeset`] / [`apply_sectioned_changeset`] -- Batch-update apply layer

pub mod apply;
pub mod config;
pub mod error;
pub mod linear;
mod occurrence;
pub mod sectioned;
pub mod staged;
#[cfg(test)]
mod testing;

pub use apply::{apply_changeset, apply_sectioned_changeset, apply_sectioned_staged, apply_staged};
pub use config::{DiffConfig, UpdateIndex};
pub use error::{ApplyError, ApplyResult};
pub use linear::{diff_linear, diff_linear_with, LinearDiff};
pub use sectioned::sectioned_staged_changeset;
pub use staged::{staged_changeset, staged_changeset_in_section, staged_changeset_with};
