//! Fact sink that keeps everything for later assertions

use parking_lot::Mutex;
use warden_recovery::{CouncilFact, FactSink};

/// Records every emitted fact in order.
#[derive(Debug, Default)]
pub struct RecordingFactSink {
    facts: Mutex<Vec<CouncilFact>>,
}

impl RecordingFactSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn facts(&self) -> Vec<CouncilFact> {
        self.facts.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.facts.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.lock().is_empty()
    }

    pub fn clear(&self) {
        self.facts.lock().clear();
    }

    pub fn last(&self) -> Option<CouncilFact> {
        self.facts.lock().last().cloned()
    }

    /// Sub-types in emission order
    pub fn sub_types(&self) -> Vec<&'static str> {
        self.facts.lock().iter().map(CouncilFact::sub_type).collect()
    }

    /// Number of facts with the given sub-type
    pub fn count(&self, sub_type: &str) -> usize {
        self.facts
            .lock()
            .iter()
            .filter(|fact| fact.sub_type() == sub_type)
            .count()
    }

    pub fn contains(&self, sub_type: &str) -> bool {
        self.count(sub_type) > 0
    }
}

impl FactSink for RecordingFactSink {
    fn emit(&self, fact: &CouncilFact) {
        self.facts.lock().push(fact.clone());
    }
}
