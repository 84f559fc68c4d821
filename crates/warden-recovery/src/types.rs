//! Council data model.

use crate::errors::{CouncilError, CouncilResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use warden_core::hash;
use warden_core::{Address, CouncilId, PhysicalTime};

/// Ordered, duplicate-free guardian list.
///
/// Only constructible through [`GuardianSet::try_new`], so every instance
/// already satisfies the size and uniqueness rules it was built with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardianSet {
    guardians: Vec<Address>,
}

impl GuardianSet {
    /// Validate and wrap a guardian list.
    ///
    /// Fails `InvalidParams` when the list is empty or longer than
    /// `max_guardians`, `ZeroAddress` for a null entry and
    /// `DuplicateGuardian` for a repeated one.
    pub fn try_new(guardians: Vec<Address>, max_guardians: usize) -> CouncilResult<Self> {
        if guardians.is_empty() {
            return Err(CouncilError::invalid("council needs at least one guardian"));
        }
        if guardians.len() > max_guardians {
            return Err(CouncilError::invalid(format!(
                "{} guardians exceeds the maximum of {max_guardians}",
                guardians.len()
            )));
        }
        let mut seen = BTreeSet::new();
        for guardian in &guardians {
            if guardian.is_zero() {
                return Err(CouncilError::ZeroAddress);
            }
            if !seen.insert(*guardian) {
                return Err(CouncilError::DuplicateGuardian {
                    guardian: *guardian,
                });
            }
        }
        Ok(Self { guardians })
    }

    /// Number of guardians.
    pub fn len(&self) -> usize {
        self.guardians.len()
    }

    /// Always false for a validated set; kept for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.guardians.is_empty()
    }

    /// Iterate over guardians in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &Address> {
        self.guardians.iter()
    }

    /// Whether `guardian` holds a slot.
    pub fn contains(&self, guardian: &Address) -> bool {
        self.guardians.contains(guardian)
    }

    /// Slot index of `guardian`.
    pub fn position(&self, guardian: &Address) -> Option<usize> {
        self.guardians.iter().position(|g| g == guardian)
    }

    /// Guardian at slot `index`.
    pub fn get(&self, index: usize) -> Option<&Address> {
        self.guardians.get(index)
    }

    /// Borrow as a slice.
    pub fn as_slice(&self) -> &[Address] {
        &self.guardians
    }

    // Callers validate before mutating in place.

    pub(crate) fn replace_at(&mut self, index: usize, guardian: Address) -> Option<Address> {
        self.guardians
            .get_mut(index)
            .map(|slot| std::mem::replace(slot, guardian))
    }

    pub(crate) fn push(&mut self, guardian: Address) {
        self.guardians.push(guardian);
    }

    pub(crate) fn remove(&mut self, guardian: &Address) -> bool {
        match self.position(guardian) {
            Some(index) => {
                self.guardians.remove(index);
                true
            }
            None => false,
        }
    }
}

impl<'a> IntoIterator for &'a GuardianSet {
    type Item = &'a Address;
    type IntoIter = std::slice::Iter<'a, Address>;

    fn into_iter(self) -> Self::IntoIter {
        self.guardians.iter()
    }
}

/// Guardian set plus approval threshold protecting one privileged address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Council {
    /// Guardians in slot order
    pub members: GuardianSet,
    /// Approvals required to execute
    pub threshold: usize,
    /// Frozen on suspected total compromise
    pub locked: bool,
}

impl Council {
    /// Build an unlocked council, checking `1 <= threshold <= members`.
    pub fn new(members: GuardianSet, threshold: usize) -> CouncilResult<Self> {
        check_threshold(threshold, members.len())?;
        Ok(Self {
            members,
            threshold,
            locked: false,
        })
    }

    /// Number of guardians.
    pub fn size(&self) -> usize {
        self.members.len()
    }

    /// Whether `guardian` is a member.
    pub fn is_guardian(&self, guardian: &Address) -> bool {
        self.members.contains(guardian)
    }
}

pub(crate) fn check_threshold(threshold: usize, size: usize) -> CouncilResult<()> {
    if threshold == 0 || threshold > size {
        return Err(CouncilError::invalid(format!(
            "threshold {threshold} must be between 1 and {size}"
        )));
    }
    Ok(())
}

/// The single in-flight recovery proposal of a council.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveryRequest {
    /// Candidate address to install on execution
    pub proposed_account: Address,
    /// Guardian that opened the request
    pub proposer: Address,
    /// When the request was opened
    pub created_at: PhysicalTime,
    /// Last instant at which the request can be approved or executed
    pub deadline: PhysicalTime,
    /// Guardians that currently approve
    pub approvals: BTreeSet<Address>,
    /// Council nonce assigned at proposal time
    pub nonce: u64,
}

impl RecoveryRequest {
    /// Number of current approvals.
    pub fn approval_count(&self) -> usize {
        self.approvals.len()
    }

    /// Whether `guardian` currently approves.
    pub fn has_approved(&self, guardian: &Address) -> bool {
        self.approvals.contains(guardian)
    }

    /// Whether the request can no longer be approved or executed at `now`.
    pub fn is_expired_at(&self, now: PhysicalTime) -> bool {
        now.is_past(self.deadline)
    }

    /// Content fingerprint of the proposal, independent of its approvals.
    ///
    /// Two requests share a fingerprint only if they name the same council,
    /// nonce, proposer, candidate and deadline.
    pub fn fingerprint(&self, council: &CouncilId) -> [u8; hash::HASH_LEN] {
        let mut h = hash::hasher();
        h.update(council.as_str().as_bytes())
            .update(&self.nonce.to_be_bytes())
            .update(self.proposer.as_bytes())
            .update(self.proposed_account.as_bytes())
            .update(&self.created_at.ts_ms.to_be_bytes())
            .update(&self.deadline.ts_ms.to_be_bytes());
        h.finalize()
    }
}

/// Time-boxed reset right of the sole non-approving guardian.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastHonestState {
    /// The holdout guardian
    pub guardian: Address,
    /// When the window opened
    pub opened_at: PhysicalTime,
    /// Last instant at which the reset may be used
    pub deadline: PhysicalTime,
    /// Nonce of the request that opened the window
    pub nonce: u64,
}

/// Everything the registry stores for one council.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CouncilState {
    /// Registry key
    pub id: CouncilId,
    /// Membership, threshold and lock flag
    pub council: Council,
    /// Active request, if any
    pub request: Option<RecoveryRequest>,
    /// Open last honest window, if any
    pub last_honest: Option<LastHonestState>,
    /// Monotonic proposal counter
    pub nonce: u64,
}

impl CouncilState {
    /// Fresh, idle council state.
    pub fn new(id: CouncilId, council: Council) -> Self {
        Self {
            id,
            council,
            request: None,
            last_honest: None,
            nonce: 0,
        }
    }

    /// Whether `guardian` is a member.
    pub fn is_guardian(&self, guardian: &Address) -> bool {
        self.council.is_guardian(guardian)
    }

    /// Current approval count, zero when idle.
    pub fn approval_count(&self) -> usize {
        self.request.as_ref().map_or(0, RecoveryRequest::approval_count)
    }

    /// Drop the active request and any last honest window.
    ///
    /// Returns the nonce of the discarded request.
    pub(crate) fn clear_in_flight(&mut self) -> Option<u64> {
        self.last_honest = None;
        self.request.take().map(|request| request.nonce)
    }
}
