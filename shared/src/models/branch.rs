use serde::{Deserialize, Serialize};

/// Display token configuration for a branch
///
/// Owned by the branch management subsystem; the engine reads it on every
/// allocation and mutates only the counter it keeps for the branch.
/// Bounds are inclusive, default range 1..=999.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BranchTokenConfig {
    /// Whether the token system is enabled for this branch
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// First token in the range (inclusive)
    #[serde(default = "default_range_start")]
    pub range_start: u32,
    /// Last token in the range (inclusive)
    #[serde(default = "default_range_end")]
    pub range_end: u32,
    /// Next token the branch expects to issue
    #[serde(default = "default_range_start")]
    pub current_token: u32,
}

fn default_enabled() -> bool {
    true
}

fn default_range_start() -> u32 {
    1
}

fn default_range_end() -> u32 {
    999
}

impl Default for BranchTokenConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            range_start: 1,
            range_end: 999,
            current_token: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_range() {
        let config = BranchTokenConfig::default();
        assert!(config.enabled);
        assert_eq!(config.range_start, 1);
        assert_eq!(config.range_end, 999);
        assert_eq!(config.current_token, 1);
    }
}
