//! `warden replay`

use super::load_config;
use crate::script::{self, Action, Step};
use anyhow::{bail, Context, Result};
use std::path::Path;
use std::sync::Arc;
use warden_core::{SimulatedTimeHandler, WardenConfig};
use warden_recovery::{
    CouncilFactEmitter, CouncilResult, FactLog, NoopHandoff, ProtectedAccountOwner,
    RecoveryEffectSystem,
};

type ReplayEffects = RecoveryEffectSystem<SimulatedTimeHandler, Arc<FactLog>>;
type ReplayOwner = ProtectedAccountOwner<ReplayEffects, NoopHandoff>;

pub fn run(config_path: &Path, script_path: &Path, start_ms: u64, fail_fast: bool) -> Result<()> {
    let config = load_config(config_path)?;
    let text = std::fs::read_to_string(script_path)
        .with_context(|| format!("cannot read script {}", script_path.display()))?;
    let steps = script::parse(&text)
        .with_context(|| format!("malformed script {}", script_path.display()))?;

    let mut replay = Replay::new(&config, start_ms)?;
    let mut rejected = 0usize;
    for (index, step) in steps.iter().enumerate() {
        let line = replay.run_step(step);
        println!("{:>3} {}", index + 1, line.render());
        for fact in replay.facts.drain() {
            let json = serde_json::to_string(&fact)?;
            println!("      fact {} {json}", CouncilFactEmitter::fact_key(&fact));
        }
        if !line.ok {
            rejected += 1;
            if fail_fast {
                bail!("step {} ({}) rejected", index + 1, step.action.name());
            }
        }
    }

    for id in replay.owner.registry().ids() {
        let view = replay.owner.snapshot(id)?;
        println!("{}", serde_json::to_string_pretty(&view)?);
    }
    println!(
        "{} steps, {} rejected, clock at {}ms",
        steps.len(),
        rejected,
        replay.clock.now_ms()
    );
    Ok(())
}

struct Replay {
    owner: ReplayOwner,
    owner_id: warden_core::Address,
    clock: SimulatedTimeHandler,
    facts: Arc<FactLog>,
}

struct Outcome {
    at_ms: u64,
    op: &'static str,
    ok: bool,
    detail: String,
}

impl Outcome {
    fn render(&self) -> String {
        let verdict = if self.ok { "ok" } else { "rejected" };
        format!("[{}ms] {} {verdict}: {}", self.at_ms, self.op, self.detail)
    }
}

impl Replay {
    fn new(config: &WardenConfig, start_ms: u64) -> Result<Self> {
        let clock = SimulatedTimeHandler::new(start_ms);
        let facts = Arc::new(FactLog::new());
        let effects = Arc::new(RecoveryEffectSystem::new(clock.clone(), Arc::clone(&facts)));
        let owner = ProtectedAccountOwner::from_config(config, effects, NoopHandoff)
            .context("cannot set up councils")?;
        Ok(Self {
            owner,
            owner_id: config.owner,
            clock,
            facts,
        })
    }

    fn run_step(&mut self, step: &Step) -> Outcome {
        self.clock.advance_ms(step.after_ms);
        let result = self.apply(&step.action);
        let (ok, detail) = match result {
            Ok(detail) => (true, detail),
            Err(err) => {
                tracing::debug!(op = step.action.name(), error = %err, category = ?err.category(), "step rejected");
                (false, format!("{err} [{:?}]", err.category()))
            }
        };
        Outcome {
            at_ms: self.clock.now_ms(),
            op: step.action.name(),
            ok,
            detail,
        }
    }

    fn apply(&mut self, action: &Action) -> CouncilResult<String> {
        let default_caller = self.owner_id;
        let owner = &mut self.owner;
        match action {
            Action::Propose {
                council,
                caller,
                candidate,
            } => owner
                .propose(*caller, council, *candidate)
                .map(|nonce| format!("request {nonce} opened for {candidate}")),
            Action::Approve { council, caller } => owner
                .approve(*caller, council)
                .map(|count| format!("{count} approvals, status {}", status(owner, council))),
            Action::Revoke { council, caller } => owner
                .revoke(*caller, council)
                .map(|count| format!("{count} approvals, status {}", status(owner, council))),
            Action::Execute { council } => owner.finalize_recovery(council).map(|rotation| {
                format!(
                    "account rotated {} -> {}",
                    rotation.previous, rotation.current
                )
            }),
            Action::LastHonestReset {
                council,
                caller,
                members,
                threshold,
            } => owner
                .last_honest_reset(*caller, council, members.clone(), *threshold)
                .map(|()| format!("council replaced with {} guardians", members.len())),
            Action::OwnerReset {
                council,
                caller,
                members,
                threshold,
            } => owner
                .owner_reset(
                    caller.unwrap_or(default_caller),
                    council,
                    members.clone(),
                    *threshold,
                )
                .map(|()| format!("council replaced with {} guardians", members.len())),
            Action::AddGuardian {
                council,
                caller,
                guardian,
            } => owner
                .add_guardian(caller.unwrap_or(default_caller), council, *guardian)
                .map(|()| format!("{guardian} added")),
            Action::RemoveGuardian {
                council,
                caller,
                guardian,
            } => owner
                .remove_guardian(caller.unwrap_or(default_caller), council, *guardian)
                .map(|()| format!("{guardian} removed")),
            Action::SetGuardian {
                council,
                caller,
                index,
                guardian,
            } => owner
                .set_guardian(caller.unwrap_or(default_caller), council, *index, *guardian)
                .map(|()| format!("slot {index} set to {guardian}")),
            Action::SetThreshold {
                council,
                caller,
                threshold,
            } => owner
                .set_threshold(caller.unwrap_or(default_caller), council, *threshold)
                .map(|()| format!("threshold set to {threshold}")),
            Action::Advance { ms } => {
                self.clock.advance_ms(*ms);
                Ok(format!("clock advanced {ms}ms"))
            }
        }
    }
}

fn status(owner: &ReplayOwner, council: &warden_core::CouncilId) -> String {
    owner
        .status(council)
        .map_or_else(|err| format!("unknown ({err})"), |status| status.to_string())
}
