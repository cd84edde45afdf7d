//! Process-wide singleton state (spec.md §5 "Shared resources"):
//! session stores, the site-profile cache, and the image cache, shared
//! read-mostly across every request task via `Arc`.

use crate::config::Config;
use crate::image::ImageCache;
use crate::session::{PageCache, SessionState};
use crate::siteprofile::SiteProfileStore;

pub struct AppState {
    pub config: Config,
    pub session: SessionState,
    pub sites: SiteProfileStore,
    pub images: ImageCache,
    pub pages: PageCache,
    pub http_client: reqwest::Client,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(config.client_timeout())
            .build()
            .expect("reqwest client builds with valid defaults");
        let images = ImageCache::new(config.img_cache_dir.clone(), config.img_cache_mb);
        let sites = SiteProfileStore::new(config.sites_dir.clone());
        Self {
            config,
            session: SessionState::new(),
            sites,
            images,
            pages: PageCache::new(512),
            http_client,
        }
    }
}
