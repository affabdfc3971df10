//! Convergence tests: drive a whole rollout by repeatedly evaluating,
//! applying the patches to a catalog, and letting simulated cluster
//! controllers catch up.

mod common;

use common::*;
use flotilla_core::*;
use flotilla_strategy::*;

fn catalog_of(infos: Vec<ReleaseInfo>) -> Catalog {
    let mut catalog = Catalog::default();
    for info in infos {
        catalog.releases.push(info.release);
        catalog.installation_targets.push(info.installation_target);
        catalog.capacity_targets.push(info.capacity_target);
        catalog.traffic_targets.push(info.traffic_target);
    }
    catalog
}

/// Every cluster controller applies its spec instantly.
fn converge_clusters(catalog: &mut Catalog) {
    for it in &mut catalog.installation_targets {
        it.status.clusters = it
            .spec
            .clusters
            .iter()
            .map(|c| ClusterInstallationStatus {
                name: c.clone(),
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
                available_replicas: c.percent / 10,
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

/// One evaluate/apply pass. Returns how many patches changed something.
fn cycle(catalog: &mut Catalog, recorder: &MemoryRecorder, clock: &FixedClock) -> usize {
    let (contender, incumbent) = catalog.rollout_pair("storefront").unwrap();
    let patches = Executor::new(&contender, incumbent.as_ref(), recorder, clock)
        .execute()
        .unwrap();
    let mut changed = 0;
    for patch in &patches {
        if patch.apply(catalog).unwrap() {
            changed += 1;
        }
    }
    changed
}

fn fresh_contender() -> ReleaseInfo {
    let mut contender = release_info("storefront-2", 1, 0, 0, 0);
    contender.installation_target.status.clusters.clear();
    contender.capacity_target.status.clusters.clear();
    contender.traffic_target.status.clusters.clear();
    contender
}

#[test]
fn rollout_converges_through_every_step() {
    let mut catalog = catalog_of(vec![completed_incumbent("storefront-1"), fresh_contender()]);
    let recorder = MemoryRecorder::new();
    let clock = FixedClock::new(1000);
    let contender_key = ObjectKey::new("shop", "storefront-2");
    let incumbent_key = ObjectKey::new("shop", "storefront-1");

    for _ in 0..32 {
        cycle(&mut catalog, &recorder, &clock);
        converge_clusters(&mut catalog);
        clock.advance(10);

        let rel = catalog.release_mut(&contender_key).unwrap();
        if rel.status.phase == ReleasePhase::Installed {
            break;
        }
        let waiting = rel
            .status
            .strategy
            .as_ref()
            .is_some_and(|s| s.state.waiting_for_command);
        if waiting {
            rel.spec.target_step += 1;
        }
    }

    let contender = catalog.release(&contender_key).unwrap();
    assert_eq!(contender.status.phase, ReleasePhase::Installed);
    assert_eq!(contender.status.achieved_step.as_ref().unwrap().step, 2);

    let incumbent = catalog.release(&incumbent_key).unwrap();
    assert_eq!(incumbent.status.phase, ReleasePhase::Superseded);
    let ct = catalog.capacity_target(&incumbent_key).unwrap();
    assert!(ct.spec.clusters.iter().all(|c| c.percent == 0));
    let tt = catalog.traffic_target(&incumbent_key).unwrap();
    assert!(tt.spec.clusters.iter().all(|c| c.weight == 0));

    let messages: Vec<_> = recorder.events().into_iter().map(|e| e.message).collect();
    assert_eq!(
        messages,
        vec!["step 0 finished", "step 1 finished", "step 2 finished"]
    );
}

#[test]
fn converged_state_is_a_fixed_point() {
    let mut catalog = catalog_of(vec![completed_incumbent("storefront-1"), fresh_contender()]);
    let recorder = MemoryRecorder::new();
    let clock = FixedClock::new(1000);

    // Step 0 needs: installation, capacity fix, traffic fix (already 0), status.
    for _ in 0..8 {
        cycle(&mut catalog, &recorder, &clock);
        converge_clusters(&mut catalog);
        clock.advance(10);
    }

    // Without a promotion nothing changes any more, however often we run.
    assert_eq!(cycle(&mut catalog, &recorder, &clock), 0);
    clock.advance(3600);
    assert_eq!(cycle(&mut catalog, &recorder, &clock), 0);

    let contender = catalog.release(&ObjectKey::new("shop", "storefront-2")).unwrap();
    assert_eq!(contender.status.phase, ReleasePhase::WaitingForCommand);
    assert_eq!(contender.status.achieved_step.as_ref().unwrap().step, 0);
}

#[test]
fn new_application_rolls_out_without_incumbent() {
    let mut contender = fresh_contender();
    contender.release.spec.target_step = 2;
    let mut catalog = catalog_of(vec![contender]);
    let recorder = MemoryRecorder::new();
    let clock = FixedClock::new(1000);

    for _ in 0..8 {
        cycle(&mut catalog, &recorder, &clock);
        converge_clusters(&mut catalog);
    }

    let rel = catalog.release(&ObjectKey::new("shop", "storefront-2")).unwrap();
    assert_eq!(rel.status.phase, ReleasePhase::Installed);
    assert_eq!(catalog.history("storefront"), vec!["storefront-2"]);
}
