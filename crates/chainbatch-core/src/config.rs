//! Service configuration.

use serde::{Deserialize, Serialize};

/// Optional structural limits enforced before a sequence is executed.
///
/// Both limits are off by default; any non-empty sequence of non-empty
/// batches is accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Maximum number of batches in one sequence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_batches: Option<usize>,
    /// Maximum number of requests in one batch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_batch_size: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits_are_off_unless_configured() {
        let cfg: ServiceConfig = serde_json::from_str(r#"{"max_batches": 4}"#).unwrap();
        assert_eq!(cfg.max_batches, Some(4));
        assert_eq!(cfg.max_batch_size, None);
        assert_eq!(ServiceConfig::default().max_batches, None);
    }
}
