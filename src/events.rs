//! Bounded decision-trace log. One event per tick, oldest dropped, so
//! a stuck bot can always be post-mortemed from the host side without
//! the log growing with the run.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::danger::DangerTier;
use crate::model::{Action, GoalKind};

pub const DECISION_LOG_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionEvent {
    pub turn: u64,
    pub tier: DangerTier,
    #[serde(default)]
    pub goal: Option<GoalKind>,
    /// Which policy produced the action, e.g. `"survival"`, `"executor"`.
    pub policy: String,
    pub action: Action,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionLog {
    events: VecDeque<DecisionEvent>,
}

impl DecisionLog {
    pub fn push(&mut self, event: DecisionEvent) {
        if self.events.len() == DECISION_LOG_CAPACITY {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    pub fn iter(&self) -> impl Iterator<Item = &DecisionEvent> {
        self.events.iter()
    }

    pub fn last(&self) -> Option<&DecisionEvent> {
        self.events.back()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_is_bounded() {
        let mut log = DecisionLog::default();
        for turn in 0..100 {
            log.push(DecisionEvent {
                turn,
                tier: DangerTier::Safe,
                goal: None,
                policy: "test".into(),
                action: Action::Wait,
            });
        }
        assert_eq!(log.len(), DECISION_LOG_CAPACITY);
        assert_eq!(log.iter().next().unwrap().turn, 36);
        assert_eq!(log.last().unwrap().turn, 99);
    }
}
