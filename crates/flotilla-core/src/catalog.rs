//! Catalog: a consistent snapshot of releases and their targets.
//!
//! The catalog is the caller side of an evaluation: it picks the contender
//! and incumbent for an application and assembles each into a
//! [`ReleaseInfo`]. Lookups return owned copies, so an evaluation never sees
//! the catalog change underneath it.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, ErrorKind, Result};
use crate::types::*;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    #[serde(default)]
    pub releases: Vec<Release>,
    #[serde(default)]
    pub installation_targets: Vec<InstallationTarget>,
    #[serde(default)]
    pub capacity_targets: Vec<CapacityTarget>,
    #[serde(default)]
    pub traffic_targets: Vec<TrafficTarget>,
}

impl Catalog {
    /// Load a JSON snapshot from disk.
    pub fn from_file(path: &Path) -> Result<Self> {
        let subject = path.display().to_string();
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::new(ErrorKind::Snapshot, subject.clone(), e.to_string()))?;
        let catalog: Catalog = serde_json::from_str(&content)
            .map_err(|e| Error::new(ErrorKind::Snapshot, subject, e.to_string()))?;
        debug!(
            ?path,
            releases = catalog.releases.len(),
            "catalog snapshot loaded"
        );
        Ok(catalog)
    }

    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| Error::new(ErrorKind::Snapshot, "catalog", e.to_string()))
    }

    // ── Lookups ────────────────────────────────────────────────────

    pub fn release(&self, key: &ObjectKey) -> Option<&Release> {
        self.releases.iter().find(|r| &r.key() == key)
    }

    pub fn release_mut(&mut self, key: &ObjectKey) -> Option<&mut Release> {
        self.releases.iter_mut().find(|r| &r.key() == key)
    }

    pub fn installation_target(&self, key: &ObjectKey) -> Option<&InstallationTarget> {
        self.installation_targets.iter().find(|t| &t.key == key)
    }

    pub fn installation_target_mut(&mut self, key: &ObjectKey) -> Option<&mut InstallationTarget> {
        self.installation_targets.iter_mut().find(|t| &t.key == key)
    }

    pub fn capacity_target(&self, key: &ObjectKey) -> Option<&CapacityTarget> {
        self.capacity_targets.iter().find(|t| &t.key == key)
    }

    pub fn capacity_target_mut(&mut self, key: &ObjectKey) -> Option<&mut CapacityTarget> {
        self.capacity_targets.iter_mut().find(|t| &t.key == key)
    }

    pub fn traffic_target(&self, key: &ObjectKey) -> Option<&TrafficTarget> {
        self.traffic_targets.iter().find(|t| &t.key == key)
    }

    pub fn traffic_target_mut(&mut self, key: &ObjectKey) -> Option<&mut TrafficTarget> {
        self.traffic_targets.iter_mut().find(|t| &t.key == key)
    }

    // ── Role selection ─────────────────────────────────────────────

    /// Releases of `app`, newest generation first.
    pub fn releases_for(&self, app: &str) -> Vec<&Release> {
        let mut releases: Vec<&Release> = self
            .releases
            .iter()
            .filter(|r| r.meta.application == app)
            .collect();
        releases.sort_by(|a, b| b.meta.generation.cmp(&a.meta.generation));
        releases
    }

    /// The newest release of `app`.
    pub fn contender(&self, app: &str) -> Result<&Release> {
        self.releases_for(app)
            .into_iter()
            .next()
            .ok_or_else(|| Error::new(ErrorKind::ContenderNotFound, app, "application has no releases"))
    }

    /// The newest completed release of `app` other than the contender.
    /// `None` for a brand-new application.
    pub fn incumbent(&self, app: &str) -> Option<&Release> {
        self.releases_for(app)
            .into_iter()
            .skip(1)
            .find(|r| r.is_complete())
    }

    /// Release names of `app`, oldest generation first.
    pub fn history(&self, app: &str) -> Vec<String> {
        let mut releases = self.releases_for(app);
        releases.reverse();
        releases.into_iter().map(|r| r.meta.name.clone()).collect()
    }

    // ── Assembly ───────────────────────────────────────────────────

    /// Assemble the release at `key` and its three targets.
    pub fn release_info(&self, key: &ObjectKey) -> Result<ReleaseInfo> {
        let subject = key.to_string();
        let release = self
            .release(key)
            .ok_or_else(|| Error::new(ErrorKind::MissingTarget, subject.clone(), "release not found"))?;
        let installation_target = self.installation_target(key).ok_or_else(|| {
            Error::new(
                ErrorKind::MissingInstallationTarget,
                subject.clone(),
                "no installation target for release",
            )
        })?;
        let capacity_target = self.capacity_target(key).ok_or_else(|| {
            Error::new(
                ErrorKind::MissingCapacityTarget,
                subject.clone(),
                "no capacity target for release",
            )
        })?;
        let traffic_target = self.traffic_target(key).ok_or_else(|| {
            Error::new(
                ErrorKind::MissingTrafficTarget,
                subject.clone(),
                "no traffic target for release",
            )
        })?;

        Ok(ReleaseInfo {
            release: release.clone(),
            installation_target: installation_target.clone(),
            capacity_target: capacity_target.clone(),
            traffic_target: traffic_target.clone(),
        })
    }

    /// The `(contender, incumbent)` pair for `app`, ready for evaluation.
    pub fn rollout_pair(&self, app: &str) -> Result<(ReleaseInfo, Option<ReleaseInfo>)> {
        let contender = self.release_info(&self.contender(app)?.key())?;
        let incumbent = match self.incumbent(app) {
            Some(rel) => Some(self.release_info(&rel.key())?),
            None => None,
        };
        debug!(
            app,
            contender = %contender.key(),
            incumbent = ?incumbent.as_ref().map(|i| i.key().to_string()),
            "rollout pair selected"
        );
        Ok((contender, incumbent))
    }
}
