use std::path::Path;

use anyhow::bail;
use tracing::info;

use flotilla_core::config::SimulateConfig;
use flotilla_core::*;
use flotilla_strategy::{Clock, EventRecorder, Executor, ExecutorResult, FixedClock, TracingRecorder};

/// Seconds of simulated time between cycles.
const CYCLE_SECS: u64 = 30;

pub struct SimulationOutcome {
    pub catalog: Catalog,
    pub cycles: u32,
    pub completed: bool,
    /// One line per cycle.
    pub log: Vec<String>,
}

pub fn simulate(
    snapshot: &Path,
    app: &str,
    config: &SimulateConfig,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let catalog = Catalog::from_file(snapshot)?;
    let clock = FixedClock::new(flotilla_strategy::SystemClock.now());
    let outcome = run_simulation(catalog, app, config, &TracingRecorder, &clock)?;

    for line in &outcome.log {
        println!("{line}");
    }
    if let Some(path) = output {
        std::fs::write(path, outcome.catalog.to_json_string()?)?;
        println!("✓ Wrote {}", path.display());
    }
    if !outcome.completed {
        bail!(
            "rollout of {app} did not complete within {} cycles",
            outcome.cycles
        );
    }
    Ok(())
}

pub fn run_simulation(
    mut catalog: Catalog,
    app: &str,
    config: &SimulateConfig,
    recorder: &dyn EventRecorder,
    clock: &FixedClock,
) -> anyhow::Result<SimulationOutcome> {
    let mut log = Vec::new();

    for cycle in 1..=config.max_cycles {
        let (contender, incumbent) = catalog.rollout_pair(app)?;
        let patches =
            Executor::new(&contender, incumbent.as_ref(), recorder, clock).execute()?;

        let mut applied = Vec::new();
        for patch in &patches {
            if patch.apply(&mut catalog)? {
                applied.push(describe(patch));
            }
        }
        settle_clusters(&mut catalog);
        clock.advance(CYCLE_SECS);

        let key = contender.key();
        let Some(release) = catalog.release_mut(&key) else {
            bail!("release {key} vanished from the catalog");
        };
        let summary = if applied.is_empty() {
            "no changes".to_string()
        } else {
            applied.join("; ")
        };
        log.push(format!(
            "cycle {cycle}: step {} {}: {summary}",
            release.spec.target_step, release.status.phase
        ));

        if release.status.phase == ReleasePhase::Installed {
            info!(release = %key, cycles = cycle, "rollout complete");
            return Ok(SimulationOutcome {
                catalog,
                cycles: cycle,
                completed: true,
                log,
            });
        }

        let waiting = release
            .status
            .strategy
            .as_ref()
            .is_some_and(|s| s.state.waiting_for_command);
        if waiting && config.auto_promote {
            release.spec.target_step += 1;
            info!(release = %key, step = release.spec.target_step, "promoted");
        }
    }

    Ok(SimulationOutcome {
        catalog,
        cycles: config.max_cycles,
        completed: false,
        log,
    })
}

fn describe(patch: &ExecutorResult) -> String {
    match patch {
        ExecutorResult::ReleaseStatusUpdate { new_status, .. } => {
            let waiting = new_status.strategy.as_ref().map(|s| s.state).unwrap_or_default();
            let mut line = patch.to_string();
            if waiting.waiting_for_installation {
                line.push_str(" (waiting for installation)");
            } else if waiting.waiting_for_capacity {
                line.push_str(" (waiting for capacity)");
            } else if waiting.waiting_for_traffic {
                line.push_str(" (waiting for traffic)");
            } else if waiting.waiting_for_command {
                line.push_str(" (waiting for command)");
            }
            line
        }
        _ => patch.to_string(),
    }
}

/// Every simulated cluster controller reports exactly what its spec asks for.
fn settle_clusters(catalog: &mut Catalog) {
    for it in &mut catalog.installation_targets {
        it.status.clusters = it
            .spec
            .clusters
            .iter()
            .map(|name| ClusterInstallationStatus {
                name: name.clone(),
                status: InstallationStatus::Installed,
                message: None,
            })
            .collect();
    }
    for ct in &mut catalog.capacity_targets {
        ct.status.clusters = ct
            .spec
            .clusters
            .iter()
            .map(|c| ClusterCapacityStatus {
                name: c.name.clone(),
                achieved_percent: c.percent,
                available_replicas: c.percent.div_ceil(10),
            })
            .collect();
    }
    for tt in &mut catalog.traffic_targets {
        tt.status.clusters = tt
            .spec
            .clusters
            .iter()
            .map(|c| ClusterTrafficStatus {
                name: c.name.clone(),
                achieved_traffic: c.weight,
            })
            .collect();
    }
}
