//! Council registry
//!
//! Plain data container keyed by [`CouncilId`]. Councils are never removed.

use crate::errors::{CouncilError, CouncilResult};
use crate::types::CouncilState;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use warden_core::CouncilId;

/// All councils known to a host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CouncilRegistry {
    councils: BTreeMap<CouncilId, CouncilState>,
}

impl CouncilRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &CouncilId) -> bool {
        self.councils.contains_key(id)
    }

    /// Borrow a council or fail `CouncilNotFound`.
    pub fn get(&self, id: &CouncilId) -> CouncilResult<&CouncilState> {
        self.councils
            .get(id)
            .ok_or_else(|| CouncilError::CouncilNotFound { council: id.clone() })
    }

    pub(crate) fn get_mut(&mut self, id: &CouncilId) -> CouncilResult<&mut CouncilState> {
        self.councils
            .get_mut(id)
            .ok_or_else(|| CouncilError::CouncilNotFound { council: id.clone() })
    }

    /// Insert a new council; refuses to overwrite.
    pub(crate) fn insert(&mut self, state: CouncilState) -> CouncilResult<()> {
        if self.councils.contains_key(&state.id) {
            return Err(CouncilError::CouncilExists {
                council: state.id.clone(),
            });
        }
        self.councils.insert(state.id.clone(), state);
        Ok(())
    }

    pub fn ids(&self) -> impl Iterator<Item = &CouncilId> {
        self.councils.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CouncilState> {
        self.councils.values()
    }

    pub fn len(&self) -> usize {
        self.councils.len()
    }

    pub fn is_empty(&self) -> bool {
        self.councils.is_empty()
    }
}
