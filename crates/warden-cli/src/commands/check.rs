//! `warden check`

use super::load_config;
use anyhow::Result;
use std::path::Path;
use warden_core::time::MS_PER_SECOND;
use warden_core::WardenConfig;

pub fn run(path: &Path) -> Result<()> {
    let config = load_config(path)?;
    print!("{}", render(&config));
    Ok(())
}

fn render(config: &WardenConfig) -> String {
    let recovery = &config.recovery;
    let mut out = format!(
        "owner: {}\nproposal ttl: {}s\nlast honest window: {}s\nmax guardians: {}\n",
        config.owner,
        recovery.proposal_ttl_ms / MS_PER_SECOND,
        recovery.last_honest_window_ms / MS_PER_SECOND,
        recovery.max_guardians,
    );
    if config.councils.is_empty() {
        out.push_str("no councils configured\n");
    }
    for council in &config.councils {
        out.push_str(&format!(
            "council {}: account {} ({} of {} guardians)\n",
            council.id,
            council.account,
            council.threshold,
            council.members.len()
        ));
        for (index, member) in council.members.iter().enumerate() {
            out.push_str(&format!("  [{index}] {member}\n"));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_core::{Address, CouncilConfig, CouncilId, RecoveryConfig};

    #[test]
    fn test_render_lists_councils() {
        let config = WardenConfig {
            owner: Address::new([0xee; 20]),
            recovery: RecoveryConfig::default(),
            councils: vec![CouncilConfig {
                id: CouncilId::admin(),
                account: Address::new([0xa0; 20]),
                members: vec![Address::new([1; 20]), Address::new([2; 20])],
                threshold: 2,
            }],
        };
        let text = render(&config);
        assert!(text.contains("proposal ttl: 259200s"));
        assert!(text.contains("council admin:"));
        assert!(text.contains("(2 of 2 guardians)"));
        assert!(text.contains("  [1] 0x0202"));
    }
}
