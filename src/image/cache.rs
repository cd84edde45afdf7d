//! Two-layer image cache (C7): an in-memory `moka` LRU in front of a
//! disk cache sharded by SHA-1 prefix (spec.md §4.6).

use sha1::{Digest, Sha1};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use tracing::{debug, warn};

/// A decoded-and-re-encoded image ready to drop into an `I` tag.
#[derive(Debug, Clone)]
pub struct CachedImage {
    pub width: u16,
    pub height: u16,
    pub bytes: Vec<u8>,
}

/// `(format, quality, url)` cache key per spec.md §4.6.
pub fn cache_key(format: &str, quality: u8, url: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(format.as_bytes());
    hasher.update([b':']);
    hasher.update([quality]);
    hasher.update([b':']);
    hasher.update(url.as_bytes());
    hex::encode(hasher.finalize())
}

pub struct ImageCache {
    mem: moka::sync::Cache<String, Arc<CachedImage>>,
    disk_dir: PathBuf,
    disk_budget_bytes: u64,
}

impl ImageCache {
    pub fn new(disk_dir: PathBuf, budget_mb: u64) -> Self {
        let budget_bytes = budget_mb * 1024 * 1024;
        let mem = moka::sync::Cache::builder()
            .weigher(|_k: &String, v: &Arc<CachedImage>| v.bytes.len().min(u32::MAX as usize) as u32)
            .max_capacity(budget_bytes)
            .build();
        Self {
            mem,
            disk_dir,
            disk_budget_bytes: budget_bytes,
        }
    }

    fn shard_path(&self, key: &str) -> PathBuf {
        let shard = &key[..2.min(key.len())];
        self.disk_dir.join(shard).join(format!("{key}.bin"))
    }

    pub fn get(&self, key: &str) -> Option<Arc<CachedImage>> {
        if let Some(hit) = self.mem.get(key) {
            return Some(hit);
        }
        let path = self.shard_path(key);
        let bytes = fs::read(&path).ok()?;
        if bytes.len() < 4 {
            return None;
        }
        let width = u16::from_be_bytes([bytes[0], bytes[1]]);
        let height = u16::from_be_bytes([bytes[2], bytes[3]]);
        let image = Arc::new(CachedImage {
            width,
            height,
            bytes: bytes[4..].to_vec(),
        });
        touch_mtime(&path);
        self.mem.insert(key.to_string(), image.clone());
        Some(image)
    }

    pub fn put(&self, key: &str, image: CachedImage) {
        let image = Arc::new(image);
        self.mem.insert(key.to_string(), image.clone());

        let path = self.shard_path(key);
        if let Some(parent) = path.parent() {
            if let Err(err) = fs::create_dir_all(parent) {
                warn!(?err, "failed to create image cache shard dir");
                return;
            }
        }
        let mut record = Vec::with_capacity(4 + image.bytes.len());
        record.extend_from_slice(&image.width.to_be_bytes());
        record.extend_from_slice(&image.height.to_be_bytes());
        record.extend_from_slice(&image.bytes);
        if let Err(err) = fs::write(&path, record) {
            warn!(?err, "failed to write image cache entry");
        }
    }

    /// Spawn an asynchronous prune pass evicting oldest-mtime disk
    /// entries first until total size is back under budget.
    pub fn spawn_prune(self: Arc<Self>) {
        tokio::task::spawn_blocking(move || self.prune_sync());
    }

    fn prune_sync(&self) {
        let mut entries: Vec<(PathBuf, u64, SystemTime)> = Vec::new();
        let mut total = 0u64;
        collect_entries(&self.disk_dir, &mut entries, &mut total);

        if total <= self.disk_budget_bytes {
            return;
        }
        entries.sort_by_key(|(_, _, mtime)| *mtime);
        let mut over = total - self.disk_budget_bytes;
        for (path, len, _) in entries {
            if over == 0 {
                break;
            }
            if fs::remove_file(&path).is_ok() {
                over = over.saturating_sub(len);
            }
        }
        debug!("image disk cache pruned");
    }
}

fn collect_entries(dir: &Path, out: &mut Vec<(PathBuf, u64, SystemTime)>, total: &mut u64) {
    let Ok(read_dir) = fs::read_dir(dir) else { return };
    for entry in read_dir.flatten() {
        let path = entry.path();
        let Ok(meta) = entry.metadata() else { continue };
        if meta.is_dir() {
            collect_entries(&path, out, total);
        } else {
            let len = meta.len();
            let mtime = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
            *total += len;
            out.push((path, len, mtime));
        }
    }
}

fn touch_mtime(path: &Path) {
    let Ok(file) = fs::File::options().write(true).open(path) else { return };
    let times = fs::FileTimes::new().set_modified(SystemTime::now());
    let _ = file.set_times(times);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_key_is_stable_for_same_inputs() {
        let a = cache_key("jpeg", 85, "http://x.test/a.png");
        let b = cache_key("jpeg", 85, "http://x.test/a.png");
        assert_eq!(a, b);
        assert_eq!(a.len(), 40);
    }

    #[test]
    fn cache_key_differs_on_quality() {
        let a = cache_key("jpeg", 85, "http://x.test/a.png");
        let b = cache_key("jpeg", 40, "http://x.test/a.png");
        assert_ne!(a, b);
    }

    #[test]
    fn put_then_get_round_trips_through_disk() {
        let dir = std::env::temp_dir().join(format!("oms-imgcache-test-{}", std::process::id()));
        let cache = ImageCache::new(dir.clone(), 100);
        let key = cache_key("png", 85, "http://x.test/b.png");
        cache.put(
            &key,
            CachedImage {
                width: 10,
                height: 20,
                bytes: vec![1, 2, 3, 4],
            },
        );
        // force a cold read by bypassing the in-memory layer
        let path = cache.shard_path(&key);
        assert!(path.exists());
        let fetched = cache.get(&key).unwrap();
        assert_eq!(fetched.width, 10);
        assert_eq!(fetched.height, 20);
        assert_eq!(fetched.bytes, vec![1, 2, 3, 4]);
        let _ = fs::remove_dir_all(&dir);
    }
}
