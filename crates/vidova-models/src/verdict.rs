//! Classification verdict returned by the analysis provider.

use serde::{Deserialize, Serialize};

use crate::video::Sensitivity;

/// Structured result of a content-sensitivity classification.
///
/// The provider is instructed to answer with `Safe` or `Flagged`; the
/// parser rejects anything else, including `Unchecked`. The free-text
/// reason is kept for logging but not persisted on the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub sensitivity: Sensitivity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl Verdict {
    /// Whether the verdict carries a usable two-valued classification.
    pub fn is_valid(&self) -> bool {
        matches!(self.sensitivity, Sensitivity::Safe | Sensitivity::Flagged)
    }
}
