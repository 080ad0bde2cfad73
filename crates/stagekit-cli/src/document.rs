//! JSON documents the CLI diffs.
//!
//! A flat document is an array of records, a sectioned document an array of
//! sections with an `elements` array each. Every object needs an `id`; all
//! other fields are its content.

use std::path::Path;

use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use stagekit_types::{Differentiable, DifferentiableSection};

/// One element of a flat or sectioned document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: Value,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// One section of a sectioned document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SectionRecord {
    pub id: Value,
    #[serde(default)]
    pub elements: Vec<Record>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// `1` and `"1"` are different identifiers.
fn identifier(id: &Value) -> String {
    id.to_string()
}

impl Differentiable for Record {
    type Id = String;

    fn difference_identifier(&self) -> String {
        identifier(&self.id)
    }

    fn is_content_equal(&self, other: &Self) -> bool {
        self.fields == other.fields
    }
}

impl Differentiable for SectionRecord {
    type Id = String;

    fn difference_identifier(&self) -> String {
        identifier(&self.id)
    }

    fn is_content_equal(&self, other: &Self) -> bool {
        self.fields == other.fields
    }
}

impl DifferentiableSection for SectionRecord {
    type Element = Record;

    fn elements(&self) -> &[Record] {
        &self.elements
    }

    fn with_elements(source: &Self, elements: Vec<Record>) -> Self {
        Self {
            id: source.id.clone(),
            elements,
            fields: source.fields.clone(),
        }
    }
}

/// Read and parse a JSON document.
pub fn load<T: DeserializeOwned>(path: &Path) -> anyhow::Result<Vec<T>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

/// Short label for a record in text output.
pub fn label(id: &Value) -> String {
    match id {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
