//! Warden configuration
//!
//! Global protocol timing lives in [`RecoveryConfig`]. Each protected slot is a
//! [`CouncilConfig`]. [`WardenConfig`] bundles both with the owner identity and
//! is what hosts load from `warden.toml`.

pub mod traits;
pub mod validation;

pub use traits::{LayeredConfig, ENV_PREFIX};
pub use validation::{ConfigValidator, ValidationError, ValidationResult};

use crate::identifiers::{Address, CouncilId};
use crate::time::MS_PER_DAY;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use traits::parse_u64_var;

/// Hard upper bound for `max_guardians`
pub const MAX_GUARDIANS_LIMIT: usize = 255;

/// Global recovery timing and sizing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecoveryConfig {
    /// Lifetime of a recovery request (ms)
    pub proposal_ttl_ms: u64,
    /// How long the last honest guardian may reset the council (ms)
    pub last_honest_window_ms: u64,
    /// Largest council size accepted
    pub max_guardians: usize,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            proposal_ttl_ms: 3 * MS_PER_DAY,
            last_honest_window_ms: 2 * MS_PER_DAY,
            max_guardians: 16,
        }
    }
}

impl RecoveryConfig {
    /// Record timing rules on `validator`
    pub fn check(&self, validator: &mut ConfigValidator) {
        validator
            .range("proposal_ttl_ms", self.proposal_ttl_ms, Some(1), None)
            .range("last_honest_window_ms", self.last_honest_window_ms, Some(1), None)
            .range(
                "max_guardians",
                self.max_guardians as u64,
                Some(1),
                Some(MAX_GUARDIANS_LIMIT as u64),
            );
    }

    /// Validate in isolation
    pub fn validate(&self) -> Result<()> {
        let mut validator = ConfigValidator::new();
        self.check(&mut validator);
        validator.finish()
    }
}

/// Initial setup of one council.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CouncilConfig {
    /// Registry key
    pub id: CouncilId,
    /// Protected address the council guards
    pub account: Address,
    /// Ordered guardian list
    pub members: Vec<Address>,
    /// Approvals required to execute
    pub threshold: usize,
}

impl CouncilConfig {
    fn check(&self, validator: &mut ConfigValidator, max_guardians: usize) {
        validator
            .custom("account", &self.account, |a| !a.is_zero(), "must not be the zero address")
            .range(
                "members",
                self.members.len() as u64,
                Some(1),
                Some(max_guardians as u64),
            )
            .range(
                "threshold",
                self.threshold as u64,
                Some(1),
                Some(self.members.len().max(1) as u64),
            )
            .each("members", &self.members, |item, _, member| {
                item.custom("", member, |m| !m.is_zero(), "must not be the zero address");
            });

        let mut seen = BTreeSet::new();
        for member in &self.members {
            if !seen.insert(*member) {
                validator.custom(
                    "members",
                    member,
                    |_| false,
                    &format!("duplicate guardian {member}"),
                );
            }
        }
    }
}

/// Complete host configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WardenConfig {
    /// Identity allowed to perform owner resets
    pub owner: Address,
    /// Protocol timing and sizing
    #[serde(default)]
    pub recovery: RecoveryConfig,
    /// Councils to create at startup
    #[serde(default)]
    pub councils: Vec<CouncilConfig>,
}

impl WardenConfig {
    /// Look up a council by id
    pub fn council(&self, id: &CouncilId) -> Option<&CouncilConfig> {
        self.councils.iter().find(|c| &c.id == id)
    }
}

impl LayeredConfig for WardenConfig {
    fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    fn merge_with_vars<I>(&mut self, vars: I) -> Result<()>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            let Some(name) = key.strip_prefix(ENV_PREFIX) else {
                continue;
            };
            match name {
                "PROPOSAL_TTL_MS" => {
                    self.recovery.proposal_ttl_ms = parse_u64_var(&key, &value)?;
                }
                "LAST_HONEST_WINDOW_MS" => {
                    self.recovery.last_honest_window_ms = parse_u64_var(&key, &value)?;
                }
                "MAX_GUARDIANS" => {
                    let max = parse_u64_var(&key, &value)?;
                    self.recovery.max_guardians = usize::try_from(max).unwrap_or(usize::MAX);
                }
                _ => continue,
            }
            tracing::debug!(variable = %key, "configuration override applied");
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        let mut validator = ConfigValidator::new();
        let mut recovery = validator.for_field("recovery");
        self.recovery.check(&mut recovery);
        validator.merge(recovery);

        validator.custom("owner", &self.owner, |o| !o.is_zero(), "must not be the zero address");

        let max_guardians = self.recovery.max_guardians;
        validator.each("councils", &self.councils, |item, _, council| {
            council.check(item, max_guardians);
        });

        let mut ids = BTreeSet::new();
        for council in &self.councils {
            if !ids.insert(council.id.clone()) {
                validator.custom(
                    "councils",
                    &council.id,
                    |_| false,
                    &format!("duplicate council id '{}'", council.id),
                );
            }
        }

        validator.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::WardenError;

    fn addr(seed: u8) -> Address {
        Address::new([seed; 20])
    }

    fn sample() -> WardenConfig {
        WardenConfig {
            owner: addr(0xee),
            recovery: RecoveryConfig::default(),
            councils: vec![CouncilConfig {
                id: CouncilId::deployer(),
                account: addr(0xd0),
                members: vec![addr(1), addr(2), addr(3)],
                threshold: 2,
            }],
        }
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(RecoveryConfig::default().validate().is_ok());
        assert_eq!(RecoveryConfig::default().proposal_ttl_ms, 3 * MS_PER_DAY);
    }

    #[test]
    fn test_sample_is_valid() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = sample();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed = WardenConfig::from_toml_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_recovery_section_is_optional() {
        let text = format!(
            r#"
owner = "{}"

[[councils]]
id = "admin"
account = "{}"
members = ["{}", "{}"]
threshold = 1
"#,
            addr(9),
            addr(8),
            addr(1),
            addr(2)
        );
        let parsed = WardenConfig::from_toml_str(&text).unwrap();
        assert_eq!(parsed.recovery, RecoveryConfig::default());
        assert!(parsed.council(&CouncilId::admin()).is_some());
    }

    #[test]
    fn test_validation_reports_every_problem() {
        let mut config = sample();
        config.owner = Address::ZERO;
        config.councils[0].threshold = 5;
        config.councils[0].members.push(addr(1));
        config.recovery.proposal_ttl_ms = 0;

        let err = config.validate().unwrap_err();
        let WardenError::Invalid { message } = err else {
            panic!("expected invalid error");
        };
        assert!(message.contains("recovery.proposal_ttl_ms"));
        assert!(message.contains("owner"));
        assert!(message.contains("councils[0].threshold"));
        assert!(message.contains("duplicate guardian"));
    }

    #[test]
    fn test_duplicate_council_ids_rejected() {
        let mut config = sample();
        let copy = config.councils[0].clone();
        config.councils.push(copy);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = sample();
        config
            .merge_with_vars(vec![
                ("WARDEN_PROPOSAL_TTL_MS".to_string(), "1000".to_string()),
                ("WARDEN_MAX_GUARDIANS".to_string(), "7".to_string()),
                ("UNRELATED".to_string(), "x".to_string()),
            ])
            .unwrap();
        assert_eq!(config.recovery.proposal_ttl_ms, 1000);
        assert_eq!(config.recovery.max_guardians, 7);
    }

    #[test]
    fn test_env_override_rejects_garbage() {
        let mut config = sample();
        let result = config.merge_with_vars(vec![(
            "WARDEN_LAST_HONEST_WINDOW_MS".to_string(),
            "soon".to_string(),
        )]);
        assert!(matches!(result, Err(WardenError::Invalid { .. })));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("warden.toml");
        std::fs::write(&path, toml::to_string_pretty(&sample()).unwrap()).unwrap();
        let loaded = WardenConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded, sample());

        let missing = WardenConfig::load_from_file(&dir.path().join("absent.toml"));
        assert!(matches!(missing, Err(WardenError::NotFound { .. })));
    }
}
