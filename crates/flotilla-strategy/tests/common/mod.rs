//! Shared fixtures for the strategy engine tests.

#![allow(dead_code)]

use flotilla_core::*;

pub const EU: &str = "eu-west";
pub const US: &str = "us-east";
pub const CLUSTERS: [&str; 2] = [EU, US];

/// Three-step ramp: staging, 50/50, full on.
pub fn vanguard() -> RolloutStrategy {
    RolloutStrategy {
        steps: vec![
            RolloutStep {
                name: "staging".to_string(),
                capacity: StepValue::new(100, 1),
                traffic: StepValue::new(100, 0),
            },
            RolloutStep {
                name: "50/50".to_string(),
                capacity: StepValue::new(50, 50),
                traffic: StepValue::new(50, 50),
            },
            RolloutStep {
                name: "full on".to_string(),
                capacity: StepValue::new(0, 100),
                traffic: StepValue::new(0, 100),
            },
        ],
    }
}

pub fn release(name: &str, generation: u64, target_step: i32) -> Release {
    Release {
        meta: ReleaseMeta {
            namespace: "shop".to_string(),
            name: name.to_string(),
            application: "storefront".to_string(),
            generation,
        },
        environment: ReleaseEnvironment {
            chart: ChartRef {
                name: "storefront".to_string(),
                version: format!("0.{generation}.0"),
                repo_url: "https://charts.example.com".to_string(),
            },
            strategy: vanguard(),
            cluster_requirements: ClusterRequirements {
                regions: vec!["eu".to_string(), "us".to_string()],
                capabilities: vec![],
            },
        },
        spec: ReleaseSpec { target_step },
        status: ReleaseStatus::default(),
    }
}

/// A release installed on every cluster, with capacity and traffic specs
/// and statuses at the given values everywhere.
pub fn release_info(name: &str, generation: u64, target_step: i32, capacity: u32, traffic: u32) -> ReleaseInfo {
    let release = release(name, generation, target_step);
    let key = release.key();
    let mut info = ReleaseInfo {
        release,
        installation_target: InstallationTarget {
            key: key.clone(),
            spec: InstallationTargetSpec {
                clusters: CLUSTERS.iter().map(|c| c.to_string()).collect(),
            },
            status: InstallationTargetStatus::default(),
        },
        capacity_target: CapacityTarget {
            key: key.clone(),
            spec: CapacityTargetSpec::default(),
            status: CapacityTargetStatus::default(),
        },
        traffic_target: TrafficTarget {
            key,
            spec: TrafficTargetSpec::default(),
            status: TrafficTargetStatus::default(),
        },
    };
    installed(&mut info, &CLUSTERS);
    set_capacity(&mut info, capacity, &[(EU, capacity), (US, capacity)]);
    set_traffic(&mut info, traffic, &[(EU, traffic), (US, traffic)]);
    info
}

/// Reset installation status: `clusters` installed, nothing else reported.
pub fn installed(info: &mut ReleaseInfo, clusters: &[&str]) {
    info.installation_target.status.clusters = clusters
        .iter()
        .map(|c| ClusterInstallationStatus {
            name: c.to_string(),
            status: InstallationStatus::Installed,
            message: None,
        })
        .collect();
}

pub fn set_capacity(info: &mut ReleaseInfo, spec: u32, achieved: &[(&str, u32)]) {
    info.capacity_target.spec.clusters = CLUSTERS
        .iter()
        .map(|c| ClusterCapacityTarget {
            name: c.to_string(),
            percent: spec,
        })
        .collect();
    info.capacity_target.status.clusters = achieved
        .iter()
        .map(|(c, v)| ClusterCapacityStatus {
            name: c.to_string(),
            achieved_percent: *v,
            available_replicas: *v / 10,
        })
        .collect();
}

pub fn set_traffic(info: &mut ReleaseInfo, spec: u32, achieved: &[(&str, u32)]) {
    info.traffic_target.spec.clusters = CLUSTERS
        .iter()
        .map(|c| ClusterTrafficTarget {
            name: c.to_string(),
            weight: spec,
        })
        .collect();
    info.traffic_target.status.clusters = achieved
        .iter()
        .map(|(c, v)| ClusterTrafficStatus {
            name: c.to_string(),
            achieved_traffic: *v,
        })
        .collect();
}

/// The incumbent of a finished rollout: full capacity and traffic, last step.
pub fn completed_incumbent(name: &str) -> ReleaseInfo {
    let mut info = release_info(name, 0, 2, 100, 100);
    info.release.status.phase = ReleasePhase::Installed;
    info.release.status.achieved_step = Some(AchievedStep {
        step: 2,
        name: "full on".to_string(),
    });
    info
}

pub fn conditions(status: &ReleaseStatus) -> &[StrategyCondition] {
    status
        .strategy
        .as_ref()
        .map(|s| s.conditions.as_slice())
        .unwrap_or_default()
}

pub fn condition(status: &ReleaseStatus, kind: StrategyConditionType) -> Option<&StrategyCondition> {
    conditions(status).iter().find(|c| c.kind == kind)
}
