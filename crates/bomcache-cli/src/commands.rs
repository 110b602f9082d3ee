//! Subcommand implementations.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use serde_json::json;

use bomcache_core::cache::{CacheBucket, CacheStorage};
use bomcache_core::worker::{WorkerState, CACHE_NAME};
use bomcache_core::{
    default_bom, default_item, Config, DiskCacheStorage, HttpFetcher, OfflineWorker, Request,
    RequestMode, ServiceHost,
};

type DiskWorker = OfflineWorker<DiskCacheStorage, HttpFetcher>;

fn build_worker(config: &Config) -> Result<DiskWorker> {
    let origin = config.origin()?;
    let cache_dir = config.cache_dir()?;
    let storage = DiskCacheStorage::new(cache_dir.clone())
        .with_context(|| format!("Failed to open cache directory: {}", cache_dir.display()))?;
    let fetcher = HttpFetcher::new().context("Failed to create HTTP client")?;
    Ok(OfflineWorker::new(origin, storage, fetcher)?)
}

pub async fn install(config: &Config) -> Result<()> {
    let mut host = ServiceHost::new(build_worker(config)?);
    host.install()
        .await
        .context("Install failed; nothing was cached")?;

    let manifest = host.worker().manifest();
    println!(
        "Installed {} assets into {}",
        manifest.files.len(),
        manifest.cache_name
    );
    Ok(())
}

pub async fn activate(config: &Config) -> Result<()> {
    let mut host = ServiceHost::restore(build_worker(config)?).await?;
    match host.state() {
        WorkerState::Activated => {
            println!("Already active, no stale caches");
            Ok(())
        }
        WorkerState::Installed => {
            let report = host.activate().await.context("Activation failed")?;
            print_removed(&report.removed);
            Ok(())
        }
        state => bail!("Worker is {}; run `bomcache install` first", state),
    }
}

pub async fn start(config: &Config) -> Result<()> {
    let mut host = ServiceHost::new(build_worker(config)?);
    match host.start().await? {
        Some(report) => print_removed(&report.removed),
        None => println!("Installed, waiting to activate"),
    }
    Ok(())
}

fn print_removed(removed: &[String]) {
    if removed.is_empty() {
        println!("Activated, no stale caches");
    } else {
        println!("Activated, removed {} stale cache(s):", removed.len());
        for name in removed {
            println!("  {}", name);
        }
    }
}

pub async fn fetch(config: &Config, url: &str, mode: RequestMode) -> Result<()> {
    let host = ServiceHost::restore(build_worker(config)?).await?;
    let url = host.worker().resolve(url)?;
    let request = Request::navigate(url).with_mode(mode);

    let (response, source) = host
        .fetch(&request)
        .await
        .with_context(|| format!("Failed to fetch {}", request.url))?;

    println!("{} {}", response.status, response.url);
    println!("source: {}", source);
    if let Some(content_type) = response.header("content-type") {
        println!("content-type: {}", content_type);
    }
    println!("{} bytes", response.body.len());
    Ok(())
}

pub async fn status(config: &Config) -> Result<()> {
    let cache_dir = config.cache_dir()?;
    let storage = DiskCacheStorage::new(cache_dir.clone())?;
    let names = storage.keys().await?;

    println!("Cache directory: {}", cache_dir.display());
    if names.is_empty() {
        println!("No cache buckets");
        return Ok(());
    }

    for name in names {
        let marker = if name == CACHE_NAME { " (current)" } else { " (stale)" };
        println!("{}{}", name, marker);

        let bucket = storage.open(&name).await?;
        for url in bucket.keys().await? {
            match bucket.match_url(&url).await? {
                Some(cached) => println!(
                    "  {:>3} {:>9} {}  {}",
                    cached.data.status,
                    cached.data.body.len(),
                    url,
                    cached.age_display()
                ),
                None => println!("  ??? {}", url),
            }
        }
    }
    Ok(())
}

pub fn defaults() -> Result<()> {
    let records = json!({
        "bom": default_bom(),
        "item": default_item(),
    });
    println!("{}", serde_json::to_string_pretty(&records)?);
    Ok(())
}

/// Persist explicit flags on top of the config file. Environment overrides
/// are not written back.
pub fn save_config(
    origin: Option<String>,
    cache_dir: Option<PathBuf>,
    log_level: Option<String>,
) -> Result<()> {
    let config = with_flags(Config::load_file()?, origin, cache_dir, log_level);
    config.save()?;
    println!("Saved {}", Config::config_path()?.display());
    Ok(())
}

fn with_flags(
    mut config: Config,
    origin: Option<String>,
    cache_dir: Option<PathBuf>,
    log_level: Option<String>,
) -> Config {
    if let Some(origin) = origin {
        config.origin = Some(origin);
    }
    if let Some(dir) = cache_dir {
        config.cache_dir = Some(dir);
    }
    if let Some(level) = log_level {
        config.log_level = Some(level);
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_flags_keeps_unset_file_values() {
        let file = Config {
            origin: Some("https://file.test/".to_string()),
            cache_dir: Some(PathBuf::from("/var/cache/bomcache")),
            log_level: None,
        };

        let updated = with_flags(file.clone(), None, None, Some("info".to_string()));
        assert_eq!(updated.origin, file.origin);
        assert_eq!(updated.cache_dir, file.cache_dir);
        assert_eq!(updated.log_level.as_deref(), Some("info"));

        let updated = with_flags(file, Some("https://bom.test/".to_string()), None, None);
        assert_eq!(updated.origin.as_deref(), Some("https://bom.test/"));
        assert_eq!(updated.cache_dir, Some(PathBuf::from("/var/cache/bomcache")));
    }
}
