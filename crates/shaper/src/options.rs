use serde::{Deserialize, Serialize};

/// How provenance survives averaging several degrees into one university line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProvenancePolicy {
    /// An averaged point is predicted when any contributing point is predicted.
    #[default]
    AnyPredicted,
    /// Averaged lines carry no provenance and are drawn solid.
    Drop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShapingOptions {
    pub provenance: ProvenancePolicy,
    /// Character budget per line for dispersion bar labels.
    pub label_wrap: usize,
}

impl Default for ShapingOptions {
    fn default() -> Self {
        Self {
            provenance: ProvenancePolicy::AnyPredicted,
            label_wrap: 16,
        }
    }
}
