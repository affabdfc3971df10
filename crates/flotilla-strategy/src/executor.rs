//! Strategy executor: decides whether the targeted step is achieved and
//! what has to be written to get there.
//!
//! Gates are evaluated in a fixed order and the first unmet gate ends the
//! evaluation:
//!
//! 1. contender installation
//! 2. contender capacity, then contender traffic
//! 3. incumbent traffic, then incumbent capacity (only with an incumbent)
//!
//! Traffic leaves the incumbent before its capacity shrinks, so clusters are
//! never serving from an under-provisioned release. When every gate holds,
//! the step is wrapped up: achieved step and phases are advanced and an
//! event is recorded.

use tracing::{debug, info};

use flotilla_core::{
    AchievedStep, ReleaseInfo, ReleasePhase, ReleaseStrategyStatus, Result, StrategyConditionType,
};

use crate::checks::{check_capacity, check_installation, check_traffic, Comparison};
use crate::clock::Clock;
use crate::conditions::StrategyConditions;
use crate::recorder::{Event, EventRecorder, STRATEGY_APPLIED};
use crate::result::ExecutorResult;
use crate::step::{resolve_step, ResolvedStep};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Contender,
    Incumbent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dimension {
    Capacity,
    Traffic,
}

/// One capacity or traffic gate for one role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Gate {
    role: Role,
    dimension: Dimension,
}

const CONTENDER_GATES: [Gate; 2] = [
    Gate {
        role: Role::Contender,
        dimension: Dimension::Capacity,
    },
    Gate {
        role: Role::Contender,
        dimension: Dimension::Traffic,
    },
];

const INCUMBENT_GATES: [Gate; 2] = [
    Gate {
        role: Role::Incumbent,
        dimension: Dimension::Traffic,
    },
    Gate {
        role: Role::Incumbent,
        dimension: Dimension::Capacity,
    },
];

/// Outcome of a gate that was not achieved.
struct GateFailure {
    not_ready: Vec<String>,
    correction: Option<ExecutorResult>,
}

impl Gate {
    fn condition(self) -> StrategyConditionType {
        match (self.role, self.dimension) {
            (Role::Contender, Dimension::Capacity) => StrategyConditionType::ContenderAchievedCapacity,
            (Role::Contender, Dimension::Traffic) => StrategyConditionType::ContenderAchievedTraffic,
            (Role::Incumbent, Dimension::Traffic) => StrategyConditionType::IncumbentAchievedTraffic,
            (Role::Incumbent, Dimension::Capacity) => StrategyConditionType::IncumbentAchievedCapacity,
        }
    }

    fn comparison(self) -> Comparison {
        match self.role {
            Role::Contender => Comparison::AtLeast,
            Role::Incumbent => Comparison::AtMost,
        }
    }

    fn desired(self, step: &ResolvedStep) -> u32 {
        let values = match self.dimension {
            Dimension::Capacity => step.capacity,
            Dimension::Traffic => step.traffic,
        };
        match self.role {
            Role::Contender => values.contender,
            Role::Incumbent => values.incumbent,
        }
    }

    fn label(self) -> &'static str {
        match self.dimension {
            Dimension::Capacity => "capacity",
            Dimension::Traffic => "traffic",
        }
    }

    /// `None` when the gate holds.
    fn evaluate(self, info: &ReleaseInfo, step: &ResolvedStep) -> Option<GateFailure> {
        let desired = self.desired(step);
        match self.dimension {
            Dimension::Capacity => {
                let check = check_capacity(&info.capacity_target, desired, self.comparison());
                (!check.achieved).then(|| GateFailure {
                    not_ready: check.not_ready,
                    correction: check.corrected_spec.map(|new_spec| {
                        ExecutorResult::CapacityTargetOutdated {
                            target: info.capacity_target.key.clone(),
                            new_spec,
                        }
                    }),
                })
            }
            Dimension::Traffic => {
                let check = check_traffic(&info.traffic_target, desired, self.comparison());
                (!check.achieved).then(|| GateFailure {
                    not_ready: check.not_ready,
                    correction: check.corrected_spec.map(|new_spec| {
                        ExecutorResult::TrafficTargetOutdated {
                            target: info.traffic_target.key.clone(),
                            new_spec,
                        }
                    }),
                })
            }
        }
    }
}

/// Evaluates one contender/incumbent pair against the contender's target step.
pub struct Executor<'a> {
    contender: &'a ReleaseInfo,
    incumbent: Option<&'a ReleaseInfo>,
    recorder: &'a dyn EventRecorder,
    clock: &'a dyn Clock,
}

impl<'a> Executor<'a> {
    pub fn new(
        contender: &'a ReleaseInfo,
        incumbent: Option<&'a ReleaseInfo>,
        recorder: &'a dyn EventRecorder,
        clock: &'a dyn Clock,
    ) -> Self {
        Self {
            contender,
            incumbent,
            recorder,
            clock,
        }
    }

    /// Run the gates and return the patches the caller must apply.
    ///
    /// On error nothing must be applied.
    pub fn execute(&self) -> Result<Vec<ExecutorResult>> {
        let key = self.contender.key();
        let release = &self.contender.release;
        let step = resolve_step(
            &release.environment.strategy,
            release.spec.target_step,
            &key.to_string(),
        )?;

        let existing = release
            .status
            .strategy
            .as_ref()
            .map(|s| s.conditions.as_slice())
            .unwrap_or_default();
        let mut conditions = StrategyConditions::new(existing);
        let now = self.clock.now();

        // ── Installation ───────────────────────────────────────────
        let installation = check_installation(&self.contender.installation_target);
        if !installation.achieved {
            info!(release = %key, step = step.index, clusters = ?installation.not_ready, "installation pending");
            if installation.fully_reported {
                conditions.set_false(
                    StrategyConditionType::ContenderAchievedInstallation,
                    step.index,
                    format!(
                        "clusters pending installation: {}",
                        cluster_list(&installation.not_ready)
                    ),
                    now,
                );
            } else {
                conditions.set_unknown(
                    StrategyConditionType::ContenderAchievedInstallation,
                    step.index,
                    now,
                );
            }
            return Ok(vec![self.contender_status_patch(&conditions, &step)]);
        }
        debug!(release = %key, step = step.index, "installation finished");
        conditions.set_true(StrategyConditionType::ContenderAchievedInstallation, step.index, now);

        // ── Capacity and traffic ──────────────────────────────────
        let incumbent_gates = self
            .incumbent
            .map(|incumbent| INCUMBENT_GATES.map(|gate| (gate, incumbent)));
        let contender_gates = CONTENDER_GATES.map(|gate| (gate, self.contender));
        if incumbent_gates.is_none() {
            debug!(release = %key, "no incumbent, must be a new application");
        }

        for (gate, info) in contender_gates.into_iter().chain(incumbent_gates.into_iter().flatten()) {
            let subject = info.key();
            match gate.evaluate(info, &step) {
                Some(failure) => {
                    info!(
                        release = %key,
                        subject = %subject,
                        step = step.index,
                        clusters = ?failure.not_ready,
                        corrected = failure.correction.is_some(),
                        "{:?} has not achieved {} yet", gate.role, gate.label()
                    );
                    conditions.set_false(
                        gate.condition(),
                        step.index,
                        format!(
                            "clusters pending {} adjustments: {}",
                            gate.label(),
                            cluster_list(&failure.not_ready)
                        ),
                        now,
                    );
                    let mut patches: Vec<ExecutorResult> = failure.correction.into_iter().collect();
                    patches.push(self.contender_status_patch(&conditions, &step));
                    return Ok(patches);
                }
                None => {
                    debug!(release = %key, subject = %subject, "{:?} has achieved {}", gate.role, gate.label());
                    conditions.set_true(gate.condition(), step.index, now);
                }
            }
        }

        // ── Step wrap-up ──────────────────────────────────────────
        Ok(self.wrap_up(&conditions, &step))
    }

    fn wrap_up(&self, conditions: &StrategyConditions, step: &ResolvedStep) -> Vec<ExecutorResult> {
        let key = self.contender.key();
        let release = &self.contender.release;
        let contender_phase = if step.is_last {
            ReleasePhase::Installed
        } else {
            ReleasePhase::WaitingForCommand
        };

        let mut status = release.status.clone();
        status.strategy = Some(self.strategy_status(conditions, step));

        let reported_step = release.status.achieved_step.as_ref().map(|a| a.step);
        if reported_step != Some(step.index) || release.status.phase != contender_phase {
            info!(
                release = %key,
                step = step.index,
                phase = %contender_phase,
                "contender achieved step"
            );
            status.achieved_step = Some(AchievedStep {
                step: step.index,
                name: step.name.clone(),
            });
            status.phase = contender_phase;
        }

        let mut patches = vec![ExecutorResult::ReleaseStatusUpdate {
            target: key.clone(),
            new_status: status,
        }];

        if let Some(incumbent) = self.incumbent {
            let incumbent_phase = if step.is_last {
                ReleasePhase::Superseded
            } else {
                ReleasePhase::Installed
            };
            if incumbent.release.status.phase != incumbent_phase {
                info!(release = %incumbent.key(), phase = %incumbent_phase, "incumbent phase changed");
                let mut status = incumbent.release.status.clone();
                status.phase = incumbent_phase;
                patches.push(ExecutorResult::ReleaseStatusUpdate {
                    target: incumbent.key(),
                    new_status: status,
                });
            }
        }

        self.recorder.record(Event::normal(
            key,
            STRATEGY_APPLIED,
            format!("step {} finished", step.index),
        ));
        patches
    }

    /// Contender status with the strategy block replaced.
    fn contender_status_patch(&self, conditions: &StrategyConditions, step: &ResolvedStep) -> ExecutorResult {
        let mut status = self.contender.release.status.clone();
        status.strategy = Some(self.strategy_status(conditions, step));
        ExecutorResult::ReleaseStatusUpdate {
            target: self.contender.key(),
            new_status: status,
        }
    }

    fn strategy_status(&self, conditions: &StrategyConditions, step: &ResolvedStep) -> ReleaseStrategyStatus {
        ReleaseStrategyStatus {
            conditions: conditions.as_conditions(),
            state: conditions.as_state(step.index, self.incumbent.is_some(), step.is_last),
        }
    }
}

fn cluster_list(clusters: &[String]) -> String {
    format!("[{}]", clusters.join(", "))
}
