//! Foundation types for stagekit.
//!
//! This crate provides the identity and equality model that every diffable
//! element and section satisfies, plus the value types a diff produces. Every
//! other stagekit crate depends on `stagekit-types`.
//!
//! # Key Types
//!
//! - [`Differentiable`] -- Identity key plus content-equality predicate
//! - [`DifferentiableSection`] -- A differentiable value owning an ordered element sequence
//! - [`ArraySection`] -- Generic section built from a model and a `Vec` of elements
//! - [`ElementPath`] -- `(section, element)` composite index
//! - [`Moved`] -- A `(source, target)` move record
//! - [`Changeset`] -- One stage: resulting data plus its edit lists
//! - [`StagedChangeset`] -- Ordered stages transforming a source into a target

pub mod changeset;
pub mod differentiable;
pub mod path;
pub mod section;

pub use changeset::{Changeset, StagedChangeset};
pub use differentiable::{Differentiable, DifferentiableSection};
pub use path::{ElementPath, Moved};
pub use section::ArraySection;
