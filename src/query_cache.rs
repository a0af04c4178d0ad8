use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD as BASE64;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

const CACHE_VERSION: u32 = 1;
const CACHE_DIR: &str = "hoops_terminal";
const CACHE_FILE: &str = "query_cache.json";

/// Aggregation results go stale after five minutes; the player-name list is
/// effectively static and keeps for an hour.
pub const DEFAULT_TTL_SECS: u64 = 300;
pub const PLAYER_NAMES_TTL_SECS: u64 = 3600;

static CACHE: Mutex<Option<QueryCacheFile>> = Mutex::new(None);

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct QueryCacheFile {
    version: u32,
    entries: HashMap<String, CacheEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheEntry {
    payload: serde_json::Value,
    fetched_at: u64,
}

pub fn query_ttl() -> Duration {
    ttl_from_env("QUERY_CACHE_TTL_SECS", DEFAULT_TTL_SECS)
}

pub fn player_names_ttl() -> Duration {
    ttl_from_env("PLAYER_NAMES_TTL_SECS", PLAYER_NAMES_TTL_SECS)
}

fn ttl_from_env(var: &str, default_secs: u64) -> Duration {
    let secs = std::env::var(var)
        .ok()
        .and_then(|val| val.parse::<u64>().ok())
        .unwrap_or(default_secs);
    Duration::from_secs(secs)
}

/// Cache key for a query template plus its bound parameters. The template
/// text participates in the digest, so editing a query invalidates its
/// entries without a version bump.
pub fn cache_key(template: &str, query_params: &[&str]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(template.as_bytes());
    for param in query_params {
        hasher.update([0u8]);
        hasher.update(param.as_bytes());
    }
    BASE64.encode(hasher.finalize())
}

/// Serve from cache when fresh, otherwise run the query and remember the
/// result. Cache IO failures degrade to recomputing, never to an error.
pub fn cached<T, F>(key: &str, ttl: Duration, compute: F) -> Result<T>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Result<T>,
{
    if let Some(hit) = lookup::<T>(key, ttl) {
        return Ok(hit);
    }
    let value = compute()?;
    store(key, &value);
    Ok(value)
}

fn lookup<T: DeserializeOwned>(key: &str, ttl: Duration) -> Option<T> {
    let entry = {
        let mut guard = CACHE.lock().expect("query cache lock poisoned");
        let cache = guard.get_or_insert_with(load_cache_file);
        cache.entries.get(key).cloned()
    }?;
    let now = system_time_to_secs(SystemTime::now())?;
    if now.saturating_sub(entry.fetched_at) > ttl.as_secs() {
        return None;
    }
    serde_json::from_value(entry.payload).ok()
}

fn store<T: Serialize>(key: &str, value: &T) {
    let Ok(payload) = serde_json::to_value(value) else {
        return;
    };
    let entry = CacheEntry {
        payload,
        fetched_at: system_time_to_secs(SystemTime::now()).unwrap_or_default(),
    };
    let mut guard = CACHE.lock().expect("query cache lock poisoned");
    let cache = guard.get_or_insert_with(load_cache_file);
    cache.version = CACHE_VERSION;
    cache.entries.insert(key.to_string(), entry);
    let _ = save_cache_file(cache);
}

/// Drop every cached result, in memory and on disk. Wired to the refresh
/// key in the UI.
pub fn clear() {
    let mut guard = CACHE.lock().expect("query cache lock poisoned");
    *guard = Some(QueryCacheFile {
        version: CACHE_VERSION,
        entries: HashMap::new(),
    });
    if let Some(cache) = guard.as_ref() {
        let _ = save_cache_file(cache);
    }
}

fn load_cache_file() -> QueryCacheFile {
    let Some(path) = cache_path() else {
        return QueryCacheFile::default();
    };
    let raw = fs::read_to_string(path).ok();
    let Some(raw) = raw else {
        return QueryCacheFile::default();
    };
    let cache = serde_json::from_str::<QueryCacheFile>(&raw).unwrap_or_default();
    if cache.version != CACHE_VERSION {
        return QueryCacheFile::default();
    }
    cache
}

fn save_cache_file(cache: &QueryCacheFile) -> Result<()> {
    let Some(path) = cache_path() else {
        return Ok(());
    };
    let Some(dir) = path.parent() else {
        return Ok(());
    };
    fs::create_dir_all(dir).ok();
    let tmp = path.with_extension("json.tmp");
    let json = serde_json::to_string(cache).context("serialize query cache")?;
    fs::write(&tmp, json).context("write query cache")?;
    fs::rename(&tmp, &path).context("swap query cache")?;
    Ok(())
}

pub fn app_cache_dir() -> Option<PathBuf> {
    if let Ok(base) = std::env::var("XDG_CACHE_HOME") {
        if !base.trim().is_empty() {
            return Some(PathBuf::from(base).join(CACHE_DIR));
        }
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".cache").join(CACHE_DIR))
}

fn cache_path() -> Option<PathBuf> {
    app_cache_dir().map(|dir| dir.join(CACHE_FILE))
}

fn system_time_to_secs(time: SystemTime) -> Option<u64> {
    time.duration_since(UNIX_EPOCH).ok().map(|d| d.as_secs())
}
