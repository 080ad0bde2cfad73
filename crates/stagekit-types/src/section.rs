use serde::{Deserialize, Serialize};

use crate::differentiable::{Differentiable, DifferentiableSection};

/// A section made of a differentiable model and a `Vec` of elements.
///
/// The section's identity and content equality are the model's; the elements
/// are diffed separately.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArraySection<M, E> {
    /// The section's own value (header, title, ...).
    pub model: M,
    /// The elements of the section.
    pub elements: Vec<E>,
}

impl<M, E> ArraySection<M, E> {
    pub fn new(model: M, elements: impl IntoIterator<Item = E>) -> Self {
        Self {
            model,
            elements: elements.into_iter().collect(),
        }
    }
}

impl<M: Differentiable, E> Differentiable for ArraySection<M, E> {
    type Id = M::Id;

    fn difference_identifier(&self) -> Self::Id {
        self.model.difference_identifier()
    }

    fn is_content_equal(&self, other: &Self) -> bool {
        self.model.is_content_equal(&other.model)
    }
}

impl<M, E> DifferentiableSection for ArraySection<M, E>
where
    M: Differentiable + Clone,
    E: Differentiable + Clone,
{
    type Element = E;

    fn elements(&self) -> &[E] {
        &self.elements
    }

    fn with_elements(source: &Self, elements: Vec<E>) -> Self {
        Self {
            model: source.model.clone(),
            elements,
        }
    }
}
