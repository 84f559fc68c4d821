//! Subcommand implementations

pub mod check;
pub mod replay;

use anyhow::{Context, Result};
use std::path::Path;
use warden_core::config::LayeredConfig;
use warden_core::WardenConfig;

/// Load, overlay and validate the configuration at `path`.
pub fn load_config(path: &Path) -> Result<WardenConfig> {
    WardenConfig::load(path).with_context(|| format!("invalid configuration {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_core::{Address, CouncilConfig, CouncilId, RecoveryConfig};

    #[test]
    fn test_load_config_from_file() {
        let config = WardenConfig {
            owner: Address::new([0xee; 20]),
            recovery: RecoveryConfig::default(),
            councils: vec![CouncilConfig {
                id: CouncilId::deployer(),
                account: Address::new([0xd0; 20]),
                members: vec![Address::new([1; 20]), Address::new([2; 20])],
                threshold: 1,
            }],
        };
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("warden.toml");
        std::fs::write(&path, toml::to_string(&config).unwrap()).unwrap();

        let loaded = load_config(&path).unwrap();
        assert_eq!(loaded.councils, config.councils);
        assert_eq!(loaded.owner, config.owner);
    }

    #[test]
    fn test_load_config_rejects_bad_threshold() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("warden.toml");
        std::fs::write(
            &path,
            r#"
owner = "0xeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee"

[[councils]]
id = "admin"
account = "0xa0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0"
members = ["0x0101010101010101010101010101010101010101"]
threshold = 2
"#,
        )
        .unwrap();
        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("invalid configuration"));
    }

    #[test]
    fn test_load_config_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_config(&dir.path().join("absent.toml")).is_err());
    }
}
