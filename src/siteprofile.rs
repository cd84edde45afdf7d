//! Site profile store (C12): per-host render overrides loaded lazily
//! from `<sitesDir>/<host>.json`, cached the way the image cache caches
//! decoded bytes — a `moka::sync::Cache` in front of the filesystem.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SiteProfileMode {
    Compact,
    Rich,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct SiteProfile {
    pub mode: Option<SiteProfileMode>,
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

pub struct SiteProfileStore {
    sites_dir: Option<PathBuf>,
    cache: moka::sync::Cache<String, Arc<Option<SiteProfile>>>,
}

impl SiteProfileStore {
    pub fn new(sites_dir: Option<PathBuf>) -> Self {
        Self {
            sites_dir,
            cache: moka::sync::Cache::builder().max_capacity(1024).build(),
        }
    }

    /// Resolve a profile for `host`, trying suffix labels
    /// (`a.b.example.com` -> `b.example.com` -> `example.com`) if the
    /// exact host has no file.
    pub fn get(&self, host: &str) -> Option<Arc<SiteProfile>> {
        let Some(dir) = &self.sites_dir else { return None };
        if let Some(hit) = self.cache.get(host) {
            return hit.as_ref().clone().map(Arc::new);
        }

        let profile = resolve_with_suffix_fallback(dir, host);
        self.cache.insert(host.to_string(), Arc::new(profile.clone()));
        profile.map(Arc::new)
    }
}

fn resolve_with_suffix_fallback(dir: &Path, host: &str) -> Option<SiteProfile> {
    let labels: Vec<&str> = host.split('.').collect();
    for start in 0..labels.len() {
        let candidate = labels[start..].join(".");
        let path = dir.join(format!("{candidate}.json"));
        if let Ok(text) = std::fs::read_to_string(&path) {
            match serde_json::from_str(&text) {
                Ok(profile) => {
                    debug!(host, candidate, "loaded site profile");
                    return Some(profile);
                }
                Err(err) => {
                    debug!(host, ?err, "failed to parse site profile, ignoring");
                    return None;
                }
            }
        }
    }
    None
}
