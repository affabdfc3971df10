//! Executor results: instructions for the caller to persist.
//!
//! The executor never mutates objects. Each result names one object and
//! carries the full replacement value for the field it changes.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use flotilla_core::{
    CapacityTargetSpec, Catalog, Error, ErrorKind, ObjectKey, ReleaseStatus, Result,
    TrafficTargetSpec,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ExecutorResult {
    /// Replace the capacity target's `spec`.
    #[serde(rename_all = "camelCase")]
    CapacityTargetOutdated {
        target: ObjectKey,
        new_spec: CapacityTargetSpec,
    },
    /// Replace the traffic target's `spec`.
    #[serde(rename_all = "camelCase")]
    TrafficTargetOutdated {
        target: ObjectKey,
        new_spec: TrafficTargetSpec,
    },
    /// Replace the release's `status`.
    #[serde(rename_all = "camelCase")]
    ReleaseStatusUpdate {
        target: ObjectKey,
        new_status: ReleaseStatus,
    },
}

impl ExecutorResult {
    pub fn target(&self) -> &ObjectKey {
        match self {
            ExecutorResult::CapacityTargetOutdated { target, .. }
            | ExecutorResult::TrafficTargetOutdated { target, .. }
            | ExecutorResult::ReleaseStatusUpdate { target, .. } => target,
        }
    }

    /// Apply this instruction to `catalog`.
    ///
    /// Returns `false` when the object already holds the replacement value.
    pub fn apply(&self, catalog: &mut Catalog) -> Result<bool> {
        let missing = |what: &str| {
            Error::new(
                ErrorKind::MissingTarget,
                self.target().to_string(),
                format!("{what} not found"),
            )
        };

        let changed = match self {
            ExecutorResult::CapacityTargetOutdated { target, new_spec } => {
                let ct = catalog
                    .capacity_target_mut(target)
                    .ok_or_else(|| missing("capacity target"))?;
                replace(&mut ct.spec, new_spec)
            }
            ExecutorResult::TrafficTargetOutdated { target, new_spec } => {
                let tt = catalog
                    .traffic_target_mut(target)
                    .ok_or_else(|| missing("traffic target"))?;
                replace(&mut tt.spec, new_spec)
            }
            ExecutorResult::ReleaseStatusUpdate { target, new_status } => {
                let rel = catalog
                    .release_mut(target)
                    .ok_or_else(|| missing("release"))?;
                replace(&mut rel.status, new_status)
            }
        };
        debug!(result = %self, changed, "executor result applied");
        Ok(changed)
    }
}

fn replace<T: PartialEq + Clone>(slot: &mut T, value: &T) -> bool {
    if slot == value {
        return false;
    }
    *slot = value.clone();
    true
}

impl fmt::Display for ExecutorResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutorResult::CapacityTargetOutdated { target, new_spec } => {
                write!(f, "capacity target {target}: spec ->")?;
                for c in &new_spec.clusters {
                    write!(f, " {}={}%", c.name, c.percent)?;
                }
                Ok(())
            }
            ExecutorResult::TrafficTargetOutdated { target, new_spec } => {
                write!(f, "traffic target {target}: spec ->")?;
                for c in &new_spec.clusters {
                    write!(f, " {}={}", c.name, c.weight)?;
                }
                Ok(())
            }
            ExecutorResult::ReleaseStatusUpdate { target, new_status } => {
                write!(f, "release {target}: phase={}", new_status.phase)?;
                if let Some(achieved) = &new_status.achieved_step {
                    write!(f, " achievedStep={}", achieved.step)?;
                }
                Ok(())
            }
        }
    }
}
