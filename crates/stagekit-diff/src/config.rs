use serde::{Deserialize, Serialize};

/// Which side of a matched pair an update is reported against.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateIndex {
    /// Index into the source. Staged element updates always use this, since
    /// the update stage keeps the source layout.
    #[default]
    Source,
    /// Index into the target. Section updates use this, since they run after
    /// every structural stage.
    Target,
}

/// Configuration for flat diffs.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffConfig {
    /// Section index stamped on every element path of a flat diff.
    pub section: usize,
    /// Side [`diff_linear_with`](crate::diff_linear_with) reports updates
    /// against. Staged changesets ignore it.
    pub update_index: UpdateIndex,
}

impl DiffConfig {
    /// A configuration placing the flat diff in `section`.
    pub fn in_section(section: usize) -> Self {
        Self {
            section,
            ..Default::default()
        }
    }
}
