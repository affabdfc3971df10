//! Achievement checks: compare desired per-cluster values with what the
//! clusters report.
//!
//! Spec and status are joined by cluster name. A cluster missing from the
//! status is not ready. The set of clusters is owned by the installation
//! target; capacity and traffic checks only rewrite the values.

use flotilla_core::{
    CapacityTarget, CapacityTargetSpec, ClusterCapacityTarget, ClusterName, ClusterTrafficTarget,
    InstallationStatus, InstallationTarget, TrafficTarget, TrafficTargetSpec,
};

/// Direction in which a role ramps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// Ramping up: done once at or above the desired value.
    AtLeast,
    /// Ramping down: done once at or below the desired value.
    AtMost,
}

impl Comparison {
    pub fn satisfied(self, achieved: u32, desired: u32) -> bool {
        match self {
            Comparison::AtLeast => achieved >= desired,
            Comparison::AtMost => achieved <= desired,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallationCheck {
    pub achieved: bool,
    pub not_ready: Vec<ClusterName>,
    /// Every spec cluster has reported something, successful or not.
    pub fully_reported: bool,
}

/// Outcome of a capacity or traffic check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetCheck<S> {
    pub achieved: bool,
    /// Replacement spec when the stored one disagrees with the desired value.
    pub corrected_spec: Option<S>,
    pub not_ready: Vec<ClusterName>,
}

pub fn check_installation(target: &InstallationTarget) -> InstallationCheck {
    let not_ready: Vec<ClusterName> = target
        .spec
        .clusters
        .iter()
        .filter(|name| {
            !target
                .status
                .clusters
                .iter()
                .any(|s| &s.name == *name && s.status == InstallationStatus::Installed)
        })
        .cloned()
        .collect();
    let fully_reported = target.status.clusters.len() == target.spec.clusters.len();

    InstallationCheck {
        achieved: fully_reported && not_ready.is_empty(),
        not_ready,
        fully_reported,
    }
}

pub fn check_capacity(
    target: &CapacityTarget,
    desired: u32,
    comparison: Comparison,
) -> TargetCheck<CapacityTargetSpec> {
    let desired_spec = CapacityTargetSpec {
        clusters: target
            .spec
            .clusters
            .iter()
            .map(|c| ClusterCapacityTarget {
                name: c.name.clone(),
                percent: desired,
            })
            .collect(),
    };
    let not_ready = not_ready_clusters(
        target.spec.clusters.iter().map(|c| (&c.name, c.percent)),
        |name| {
            target
                .status
                .clusters
                .iter()
                .find(|s| &s.name == name)
                .map(|s| s.achieved_percent)
        },
        desired,
        comparison,
    );
    finish(&target.spec, desired_spec, not_ready)
}

pub fn check_traffic(
    target: &TrafficTarget,
    desired: u32,
    comparison: Comparison,
) -> TargetCheck<TrafficTargetSpec> {
    let desired_spec = TrafficTargetSpec {
        clusters: target
            .spec
            .clusters
            .iter()
            .map(|c| ClusterTrafficTarget {
                name: c.name.clone(),
                weight: desired,
            })
            .collect(),
    };
    let not_ready = not_ready_clusters(
        target.spec.clusters.iter().map(|c| (&c.name, c.weight)),
        |name| {
            target
                .status
                .clusters
                .iter()
                .find(|s| &s.name == name)
                .map(|s| s.achieved_traffic)
        },
        desired,
        comparison,
    );
    finish(&target.spec, desired_spec, not_ready)
}

/// Clusters whose stored value is stale, whose status is missing, or whose
/// achieved value does not satisfy `comparison` against `desired`.
fn not_ready_clusters<'a>(
    spec: impl Iterator<Item = (&'a ClusterName, u32)>,
    achieved: impl Fn(&ClusterName) -> Option<u32>,
    desired: u32,
    comparison: Comparison,
) -> Vec<ClusterName> {
    spec.filter(|(name, stored)| {
        *stored != desired
            || !achieved(name).is_some_and(|value| comparison.satisfied(value, desired))
    })
    .map(|(name, _)| name.clone())
    .collect()
}

fn finish<S: PartialEq>(current: &S, desired: S, not_ready: Vec<ClusterName>) -> TargetCheck<S> {
    TargetCheck {
        achieved: not_ready.is_empty(),
        corrected_spec: (*current != desired).then_some(desired),
        not_ready,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flotilla_core::{
        CapacityTargetStatus, ClusterCapacityStatus, ClusterInstallationStatus,
        ClusterTrafficStatus, InstallationTargetSpec, InstallationTargetStatus, ObjectKey,
        TrafficTargetStatus,
    };

    fn key() -> ObjectKey {
        ObjectKey::new("default", "app-1")
    }

    fn capacity(spec: &[(&str, u32)], status: &[(&str, u32)]) -> CapacityTarget {
        CapacityTarget {
            key: key(),
            spec: CapacityTargetSpec {
                clusters: spec
                    .iter()
                    .map(|(name, percent)| ClusterCapacityTarget {
                        name: name.to_string(),
                        percent: *percent,
                    })
                    .collect(),
            },
            status: CapacityTargetStatus {
                clusters: status
                    .iter()
                    .map(|(name, achieved)| ClusterCapacityStatus {
                        name: name.to_string(),
                        achieved_percent: *achieved,
                        available_replicas: 0,
                    })
                    .collect(),
            },
        }
    }

    fn traffic(spec: &[(&str, u32)], status: &[(&str, u32)]) -> TrafficTarget {
        TrafficTarget {
            key: key(),
            spec: TrafficTargetSpec {
                clusters: spec
                    .iter()
                    .map(|(name, weight)| ClusterTrafficTarget {
                        name: name.to_string(),
                        weight: *weight,
                    })
                    .collect(),
            },
            status: TrafficTargetStatus {
                clusters: status
                    .iter()
                    .map(|(name, achieved)| ClusterTrafficStatus {
                        name: name.to_string(),
                        achieved_traffic: *achieved,
                    })
                    .collect(),
            },
        }
    }

    fn installation(spec: &[&str], status: &[(&str, InstallationStatus)]) -> InstallationTarget {
        InstallationTarget {
            key: key(),
            spec: InstallationTargetSpec {
                clusters: spec.iter().map(|s| s.to_string()).collect(),
            },
            status: InstallationTargetStatus {
                clusters: status
                    .iter()
                    .map(|(name, status)| ClusterInstallationStatus {
                        name: name.to_string(),
                        status: *status,
                        message: None,
                    })
                    .collect(),
            },
        }
    }

    #[test]
    fn ramp_up_requires_at_least_desired() {
        let target = capacity(&[("a", 50), ("b", 50)], &[("a", 50), ("b", 40)]);
        let check = check_capacity(&target, 50, Comparison::AtLeast);
        assert!(!check.achieved);
        assert_eq!(check.not_ready, vec!["b"]);
        assert!(check.corrected_spec.is_none());
    }

    #[test]
    fn ramp_down_accepts_at_most_desired() {
        let target = capacity(&[("a", 50), ("b", 50)], &[("a", 50), ("b", 40)]);
        let check = check_capacity(&target, 50, Comparison::AtMost);
        assert!(check.achieved);
        assert!(check.not_ready.is_empty());
    }

    #[test]
    fn stale_spec_is_corrected_even_when_status_satisfies_it() {
        let target = capacity(&[("a", 10), ("b", 50)], &[("a", 100), ("b", 100)]);
        let check = check_capacity(&target, 50, Comparison::AtLeast);

        assert!(!check.achieved);
        assert_eq!(check.not_ready, vec!["a"]);
        let spec = check.corrected_spec.unwrap();
        assert_eq!(
            spec.clusters,
            vec![
                ClusterCapacityTarget { name: "a".to_string(), percent: 50 },
                ClusterCapacityTarget { name: "b".to_string(), percent: 50 },
            ]
        );
    }

    #[test]
    fn cluster_missing_from_status_is_not_ready() {
        let target = traffic(&[("a", 100), ("b", 100)], &[("a", 100)]);
        let check = check_traffic(&target, 100, Comparison::AtLeast);
        assert!(!check.achieved);
        assert_eq!(check.not_ready, vec!["b"]);
    }

    #[test]
    fn status_is_joined_by_name_not_position() {
        let target = traffic(&[("a", 0), ("b", 0)], &[("b", 0), ("a", 30)]);
        let check = check_traffic(&target, 0, Comparison::AtMost);
        assert_eq!(check.not_ready, vec!["a"]);
    }

    #[test]
    fn traffic_spec_is_corrected_for_every_cluster() {
        let target = traffic(&[("a", 0), ("b", 0)], &[("a", 0), ("b", 0)]);
        let check = check_traffic(&target, 50, Comparison::AtLeast);
        assert_eq!(check.not_ready, vec!["a", "b"]);
        let spec = check.corrected_spec.unwrap();
        assert!(spec.clusters.iter().all(|c| c.weight == 50));
    }

    #[test]
    fn status_for_unknown_cluster_is_ignored() {
        let target = capacity(&[("a", 100)], &[("a", 100), ("zz", 0)]);
        assert!(check_capacity(&target, 100, Comparison::AtLeast).achieved);
    }

    #[test]
    fn installation_achieved_when_every_cluster_installed() {
        let target = installation(
            &["a", "b"],
            &[("b", InstallationStatus::Installed), ("a", InstallationStatus::Installed)],
        );
        let check = check_installation(&target);
        assert!(check.achieved);
        assert!(check.fully_reported);
    }

    #[test]
    fn installation_not_achieved_on_failed_cluster() {
        let target = installation(
            &["a", "b"],
            &[("a", InstallationStatus::Installed), ("b", InstallationStatus::Failed)],
        );
        let check = check_installation(&target);
        assert!(!check.achieved);
        assert!(check.fully_reported);
        assert_eq!(check.not_ready, vec!["b"]);
    }

    #[test]
    fn installation_not_fully_reported() {
        let target = installation(&["a", "b"], &[("a", InstallationStatus::Installed)]);
        let check = check_installation(&target);
        assert!(!check.achieved);
        assert!(!check.fully_reported);
        assert_eq!(check.not_ready, vec!["b"]);
    }
}
