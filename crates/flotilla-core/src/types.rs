//! Domain types for flotilla.
//!
//! A release and its three companion targets (installation, capacity,
//! traffic) share one `namespace/name` key. Targets carry the desired
//! per-cluster state in `spec` and the observed per-cluster state in
//! `status`; the two are always joined by cluster name.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Name of a target cluster.
pub type ClusterName = String;

// ── Identity ───────────────────────────────────────────────────────

/// `namespace/name` identity shared by a release and its targets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectKey {
    pub namespace: String,
    pub name: String,
}

impl ObjectKey {
    pub fn new(namespace: &str, name: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            name: name.to_string(),
        }
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

// ── Release ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseMeta {
    pub namespace: String,
    pub name: String,
    /// Owning application.
    pub application: String,
    /// Orders the releases of one application; higher is newer.
    #[serde(default)]
    pub generation: u64,
}

/// A versioned rollout of an application.
///
/// Whether a release is the contender or the incumbent is decided per
/// evaluation, never stored on the release.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Release {
    pub meta: ReleaseMeta,
    pub environment: ReleaseEnvironment,
    pub spec: ReleaseSpec,
    #[serde(default)]
    pub status: ReleaseStatus,
}

impl Release {
    pub fn key(&self) -> ObjectKey {
        ObjectKey::new(&self.meta.namespace, &self.meta.name)
    }

    /// Installed at the final step of its strategy.
    pub fn is_complete(&self) -> bool {
        let Some(achieved) = &self.status.achieved_step else {
            return false;
        };
        self.status.phase == ReleasePhase::Installed
            && achieved.step as usize == self.environment.strategy.last_step_index()
    }
}

/// Immutable part of a release, fixed at creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseEnvironment {
    pub chart: ChartRef,
    pub strategy: RolloutStrategy,
    #[serde(default)]
    pub cluster_requirements: ClusterRequirements,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartRef {
    pub name: String,
    pub version: String,
    pub repo_url: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterRequirements {
    #[serde(default)]
    pub regions: Vec<String>,
    #[serde(default)]
    pub capabilities: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseSpec {
    /// Desired step index, set by an operator or the release controller.
    pub target_step: i32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseStatus {
    #[serde(default)]
    pub phase: ReleasePhase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub achieved_step: Option<AchievedStep>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<ReleaseStrategyStatus>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ReleasePhase {
    #[default]
    WaitingForCommand,
    Installed,
    Superseded,
}

impl fmt::Display for ReleasePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ReleasePhase::WaitingForCommand => "WaitingForCommand",
            ReleasePhase::Installed => "Installed",
            ReleasePhase::Superseded => "Superseded",
        };
        f.write_str(s)
    }
}

/// The last step a contender fully satisfied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievedStep {
    pub step: u32,
    pub name: String,
}

/// Strategy progress recorded on the contender's status.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseStrategyStatus {
    #[serde(default)]
    pub conditions: Vec<StrategyCondition>,
    #[serde(default)]
    pub state: ReleaseStrategyState,
}

// ── Strategy conditions ────────────────────────────────────────────

/// The five convergence gates, in evaluation order.
///
/// Declaration order doubles as the serialization order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StrategyConditionType {
    ContenderAchievedInstallation,
    ContenderAchievedCapacity,
    ContenderAchievedTraffic,
    IncumbentAchievedTraffic,
    IncumbentAchievedCapacity,
}

impl StrategyConditionType {
    pub const ALL: [StrategyConditionType; 5] = [
        StrategyConditionType::ContenderAchievedInstallation,
        StrategyConditionType::ContenderAchievedCapacity,
        StrategyConditionType::ContenderAchievedTraffic,
        StrategyConditionType::IncumbentAchievedTraffic,
        StrategyConditionType::IncumbentAchievedCapacity,
    ];
}

impl fmt::Display for StrategyConditionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConditionStatus {
    True,
    False,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyCondition {
    #[serde(rename = "type")]
    pub kind: StrategyConditionType,
    pub status: ConditionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Step the observation pertains to.
    pub step: u32,
    /// Unix timestamp (seconds) of the last status value change.
    pub last_transition_time: u64,
}

/// Coarse, user-facing summary of where a rollout is blocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseStrategyState {
    pub waiting_for_installation: bool,
    pub waiting_for_capacity: bool,
    pub waiting_for_traffic: bool,
    pub waiting_for_command: bool,
}

// ── Rollout strategy ───────────────────────────────────────────────

/// Ordered ramp of steps; the index is the unit of `targetStep`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RolloutStrategy {
    pub steps: Vec<RolloutStep>,
}

impl RolloutStrategy {
    /// Index of the final step. An empty strategy reports `0`.
    pub fn last_step_index(&self) -> usize {
        self.steps.len().saturating_sub(1)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RolloutStep {
    pub name: String,
    pub capacity: StepValue,
    pub traffic: StepValue,
}

/// Per-role value for one step. Kept as operator-authored text and parsed
/// when the step is resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepValue {
    pub incumbent: String,
    pub contender: String,
}

impl StepValue {
    pub fn new(incumbent: u32, contender: u32) -> Self {
        Self {
            incumbent: incumbent.to_string(),
            contender: contender.to_string(),
        }
    }
}

// ── Installation target ────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallationTarget {
    pub key: ObjectKey,
    pub spec: InstallationTargetSpec,
    #[serde(default)]
    pub status: InstallationTargetStatus,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InstallationTargetSpec {
    pub clusters: Vec<ClusterName>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InstallationTargetStatus {
    #[serde(default)]
    pub clusters: Vec<ClusterInstallationStatus>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterInstallationStatus {
    pub name: ClusterName,
    pub status: InstallationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstallationStatus {
    Installed,
    Pending,
    Failed,
}

// ── Capacity target ────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapacityTarget {
    pub key: ObjectKey,
    pub spec: CapacityTargetSpec,
    #[serde(default)]
    pub status: CapacityTargetStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CapacityTargetSpec {
    pub clusters: Vec<ClusterCapacityTarget>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterCapacityTarget {
    pub name: ClusterName,
    /// Desired share of the full replica count (0-100).
    pub percent: u32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CapacityTargetStatus {
    #[serde(default)]
    pub clusters: Vec<ClusterCapacityStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterCapacityStatus {
    pub name: ClusterName,
    pub achieved_percent: u32,
    #[serde(default)]
    pub available_replicas: u32,
}

// ── Traffic target ─────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficTarget {
    pub key: ObjectKey,
    pub spec: TrafficTargetSpec,
    #[serde(default)]
    pub status: TrafficTargetStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TrafficTargetSpec {
    pub clusters: Vec<ClusterTrafficTarget>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterTrafficTarget {
    pub name: ClusterName,
    /// Desired traffic weight (0-100).
    pub weight: u32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TrafficTargetStatus {
    #[serde(default)]
    pub clusters: Vec<ClusterTrafficStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterTrafficStatus {
    pub name: ClusterName,
    pub achieved_traffic: u32,
}

// ── ReleaseInfo ───────────────────────────────────────────────────

/// A release together with its three targets, for one role in one evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseInfo {
    pub release: Release,
    pub installation_target: InstallationTarget,
    pub capacity_target: CapacityTarget,
    pub traffic_target: TrafficTarget,
}

impl ReleaseInfo {
    pub fn key(&self) -> ObjectKey {
        self.release.key()
    }
}
