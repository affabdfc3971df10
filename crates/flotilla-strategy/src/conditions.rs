//! Strategy condition tracking.
//!
//! A [`StrategyConditions`] map holds at most one condition per gate.
//! Re-setting a condition to the status it already has keeps its
//! `last_transition_time`; only a status change moves the timestamp.

use std::collections::BTreeMap;

use flotilla_core::{
    ConditionStatus, ReleaseStrategyState, StrategyCondition, StrategyConditionType,
};

/// Reason attached to every `False` condition.
pub const CLUSTERS_NOT_READY: &str = "ClustersNotReady";

#[derive(Debug, Clone, PartialEq, Default)]
pub struct StrategyConditions {
    conditions: BTreeMap<StrategyConditionType, StrategyCondition>,
}

impl StrategyConditions {
    /// Seed the map from a previously persisted condition list.
    pub fn new(existing: &[StrategyCondition]) -> Self {
        let conditions = existing
            .iter()
            .map(|c| (c.kind, c.clone()))
            .collect();
        Self { conditions }
    }

    pub fn set_true(&mut self, kind: StrategyConditionType, step: u32, now: u64) {
        self.set(kind, ConditionStatus::True, None, None, step, now);
    }

    pub fn set_false(&mut self, kind: StrategyConditionType, step: u32, message: String, now: u64) {
        self.set(
            kind,
            ConditionStatus::False,
            Some(CLUSTERS_NOT_READY.to_string()),
            Some(message),
            step,
            now,
        );
    }

    pub fn set_unknown(&mut self, kind: StrategyConditionType, step: u32, now: u64) {
        self.set(kind, ConditionStatus::Unknown, None, None, step, now);
    }

    fn set(
        &mut self,
        kind: StrategyConditionType,
        status: ConditionStatus,
        reason: Option<String>,
        message: Option<String>,
        step: u32,
        now: u64,
    ) {
        let last_transition_time = match self.conditions.get(&kind) {
            Some(prev) if prev.status == status => prev.last_transition_time,
            _ => now,
        };
        self.conditions.insert(
            kind,
            StrategyCondition {
                kind,
                status,
                reason,
                message,
                step,
                last_transition_time,
            },
        );
    }

    pub fn get(&self, kind: StrategyConditionType) -> Option<&StrategyCondition> {
        self.conditions.get(&kind)
    }

    /// `True` and observed for `step`.
    pub fn is_true_at(&self, kind: StrategyConditionType, step: u32) -> bool {
        self.get(kind)
            .is_some_and(|c| c.status == ConditionStatus::True && c.step == step)
    }

    /// Conditions in evaluation order, for persistence.
    pub fn as_conditions(&self) -> Vec<StrategyCondition> {
        self.conditions.values().cloned().collect()
    }

    /// Summarise where the rollout at `step` is blocked.
    pub fn as_state(&self, step: u32, has_incumbent: bool, is_last_step: bool) -> ReleaseStrategyState {
        use StrategyConditionType::*;

        let installed = self.is_true_at(ContenderAchievedInstallation, step);
        let contender_capacity = self.is_true_at(ContenderAchievedCapacity, step);
        let contender_traffic = self.is_true_at(ContenderAchievedTraffic, step);
        let incumbent_traffic = !has_incumbent || self.is_true_at(IncumbentAchievedTraffic, step);
        let incumbent_capacity = !has_incumbent || self.is_true_at(IncumbentAchievedCapacity, step);

        let waiting_for_capacity = installed
            && (!contender_capacity
                || (contender_traffic && incumbent_traffic && !incumbent_capacity));
        let waiting_for_traffic =
            installed && contender_capacity && (!contender_traffic || !incumbent_traffic);
        let all_achieved = installed
            && contender_capacity
            && contender_traffic
            && incumbent_traffic
            && incumbent_capacity;

        ReleaseStrategyState {
            waiting_for_installation: !installed,
            waiting_for_capacity,
            waiting_for_traffic,
            waiting_for_command: all_achieved && !is_last_step,
        }
    }
}
