//! The identity and equality model.
//!
//! A diff correlates source and target values by their identity key and only
//! then asks whether the content changed. The two questions are independent:
//! equal keys with unequal content is an update, unequal keys are unrelated
//! values no matter what their content says.

use std::hash::Hash;

/// A value that can take part in a diff.
///
/// Implementations must be deterministic: the same value must always report
/// the same identifier, and `is_content_equal` must be consistent across
/// calls. A violation is a caller error; the diff does not detect it and the
/// resulting stages are unspecified (though still free of out-of-bounds
/// access).
///
/// Identifiers do not have to be unique. When several source values share an
/// identifier, the k-th target occurrence of that identifier is matched to the
/// k-th source occurrence, left to right.
pub trait Differentiable {
    /// Stable identity key, e.g. a database primary key.
    type Id: Eq + Hash;

    /// The identity key of this value.
    fn difference_identifier(&self) -> Self::Id;

    /// Whether `self` and `other` carry the same content.
    ///
    /// Only consulted for values whose identifiers already matched.
    fn is_content_equal(&self, other: &Self) -> bool;
}

/// A differentiable value that owns an ordered sequence of elements.
///
/// The section's own identity and content equality come from its
/// [`Differentiable`] implementation and are compared independently of its
/// elements.
pub trait DifferentiableSection: Differentiable + Clone {
    /// The element type held by the section.
    type Element: Differentiable + Clone;

    /// The elements of this section, in order.
    fn elements(&self) -> &[Self::Element];

    /// Rebuild `source` with its identity and metadata preserved but its
    /// elements replaced by `elements`.
    fn with_elements(source: &Self, elements: Vec<Self::Element>) -> Self;
}

macro_rules! impl_differentiable_for_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Differentiable for $ty {
                type Id = $ty;

                fn difference_identifier(&self) -> Self::Id {
                    self.clone()
                }

                fn is_content_equal(&self, other: &Self) -> bool {
                    self == other
                }
            }
        )*
    };
}

impl_differentiable_for_value!(
    String,
    &'static str,
    char,
    bool,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
);
