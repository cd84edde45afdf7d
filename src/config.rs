//! Process configuration, assembled once from the environment at startup
//! (spec.md §6.3). We parse the whole env into one struct at the edge
//! instead of scattering `env::var` calls through the business logic —
//! the convention every rama example binary follows.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// `OMS_TAGCOUNT_MODE` policy controlling the `+1` wire tag-count quirk
/// (spec.md §4.1, §9).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagCountMode {
    /// Wire `tag_count == parsed` exactly.
    Exact,
    /// Wire `tag_count == parsed`, excluding the trailing `Q`.
    ExcludeQ,
    /// Wire `tag_count == parsed + 1` (default legacy-client quirk).
    Plus1,
    /// Wire `tag_count == parsed + 2`.
    Plus2,
}

impl TagCountMode {
    fn parse(s: &str) -> Self {
        match s {
            "exact" => Self::Exact,
            "exclude_q" => Self::ExcludeQ,
            "plus2" => Self::Plus2,
            _ => Self::Plus1,
        }
    }

    /// Apply the policy to a raw parsed tag count.
    pub fn adjust(self, base_tags: u32, has_trailing_q: bool) -> u32 {
        match self {
            Self::Exact => base_tags,
            Self::ExcludeQ => {
                if has_trailing_q {
                    base_tags.saturating_sub(1)
                } else {
                    base_tags
                }
            }
            Self::Plus1 => base_tags + 1,
            Self::Plus2 => base_tags + 2,
        }
    }
}

/// `OMS_BOOKMARKS_MODE` (spec.md §6.3, §4.10).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookmarksMode {
    /// Decide per-request based on whether a local bookmarks file exists.
    Auto,
    /// Always proxy the bookmarks portal upstream.
    Remote,
    /// Always render a local bookmarks OMS page.
    Local,
}

impl BookmarksMode {
    fn parse(s: &str) -> Self {
        match s {
            "remote" => Self::Remote,
            "local" => Self::Local,
            _ => Self::Auto,
        }
    }
}

/// Full process configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub http_debug: bool,
    pub css_debug: bool,
    pub img_debug: bool,
    pub img_cache_dir: PathBuf,
    pub img_cache_mb: u64,
    pub sites_dir: Option<PathBuf>,
    pub bookmarks_mode: BookmarksMode,
    pub bookmarks_path: Option<PathBuf>,
    pub paginate_tags: usize,
    pub paginate_bytes: usize,
    pub tagcount_mode: TagCountMode,
    pub tagcount_delta: i32,
    pub debug_scan: bool,
}

const DEFAULT_PAGINATE_BYTES: usize = 32 * 1024;
const MIN_PAGINATE_BYTES: usize = 1024;
const DEFAULT_PAGINATE_TAGS: usize = 1200;

impl Config {
    /// Load configuration from the process environment, applying the
    /// defaults documented in spec.md §4.4, §4.6, §6.3.
    pub fn from_env() -> Self {
        Self {
            port: env_parse("PORT", 8080),
            http_debug: env_flag("OMS_HTTP_DEBUG"),
            css_debug: env_flag("OMS_CSS_DEBUG"),
            img_debug: env_flag("OMS_IMG_DEBUG"),
            img_cache_dir: env::var("OMS_IMG_CACHE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("cache/img")),
            img_cache_mb: env_parse("OMS_IMG_CACHE_MB", 100),
            sites_dir: env::var("OMS_SITES_DIR").ok().map(PathBuf::from),
            bookmarks_mode: env::var("OMS_BOOKMARKS_MODE")
                .map(|s| BookmarksMode::parse(&s))
                .unwrap_or(BookmarksMode::Auto),
            bookmarks_path: env::var("OMS_BOOKMARKS").ok().map(PathBuf::from),
            paginate_tags: env_parse("OMS_PAGINATE_TAGS", DEFAULT_PAGINATE_TAGS),
            paginate_bytes: env_parse("OMS_PAGINATE_BYTES", DEFAULT_PAGINATE_BYTES)
                .max(MIN_PAGINATE_BYTES),
            tagcount_mode: env::var("OMS_TAGCOUNT_MODE")
                .map(|s| TagCountMode::parse(&s))
                .unwrap_or(TagCountMode::Plus1),
            tagcount_delta: env_parse("OMS_TAGCOUNT_DELTA", 0),
            debug_scan: env_flag("OMS_DEBUG_SCAN"),
        }
    }

    /// 8-second upstream client timeout (spec.md §5).
    pub fn client_timeout(&self) -> Duration {
        Duration::from_secs(8)
    }
}

fn env_flag(key: &str) -> bool {
    match env::var(key) {
        Ok(v) => !matches!(v.as_str(), "" | "0" | "false"),
        Err(_) => false,
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tagcount_mode_defaults_to_plus1() {
        assert_eq!(TagCountMode::parse("bogus"), TagCountMode::Plus1);
        assert_eq!(TagCountMode::Plus1.adjust(10, true), 11);
    }

    #[test]
    fn tagcount_exclude_q_drops_trailing_tag() {
        assert_eq!(TagCountMode::ExcludeQ.adjust(10, true), 9);
        assert_eq!(TagCountMode::ExcludeQ.adjust(10, false), 10);
    }

    #[test]
    fn bookmarks_mode_parses_known_values() {
        assert_eq!(BookmarksMode::parse("local"), BookmarksMode::Local);
        assert_eq!(BookmarksMode::parse("remote"), BookmarksMode::Remote);
        assert_eq!(BookmarksMode::parse("whatever"), BookmarksMode::Auto);
    }
}
