//! Install, activate and fetch handlers of the offline worker.

use futures::future::{join_all, try_join_all};
use reqwest::Url;
use tracing::{debug, info, warn};

use super::assets::AssetManifest;
use super::host::HostControl;
use super::WorkerError;
use crate::cache::{CacheBucket, CacheStorage, CachedData};
use crate::net::{Fetcher, Request, Response};

/// Body served when the offline page itself was never cached.
const FALLBACK_OFFLINE_HTML: &str = "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>Offline</title></head>\
<body><h1>You are offline</h1><p>This page is not available without a network connection.</p></body></html>\n";

/// Where a response handed back to the page came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseSource {
    /// Live response fetched by the worker
    Network,
    /// Cached offline page
    OfflineCache,
    /// Offline page missing from the cache, minimal page generated instead
    Synthesized,
    /// Not intercepted; the host fetched it itself
    Passthrough,
}

impl std::fmt::Display for ResponseSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResponseSource::Network => write!(f, "network"),
            ResponseSource::OfflineCache => write!(f, "offline cache"),
            ResponseSource::Synthesized => write!(f, "synthesized"),
            ResponseSource::Passthrough => write!(f, "passthrough"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The worker did not intercept the request.
    Passthrough,
    Respond {
        response: Response,
        source: ResponseSource,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivationReport {
    /// Stale buckets deleted during activation
    pub removed: Vec<String>,
}

pub struct OfflineWorker<S, F> {
    scope: Url,
    storage: S,
    fetcher: F,
    manifest: AssetManifest,
}

impl<S: CacheStorage, F: Fetcher> OfflineWorker<S, F> {
    /// Create a worker for `scope` (e.g. `https://bom.example/`), caching the
    /// default asset manifest.
    pub fn new(scope: &str, storage: S, fetcher: F) -> Result<Self, WorkerError> {
        let scope = Url::parse(scope).map_err(|e| WorkerError::InvalidUrl {
            url: scope.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            scope,
            storage,
            fetcher,
            manifest: AssetManifest::default(),
        })
    }

    pub fn with_manifest(mut self, manifest: AssetManifest) -> Self {
        self.manifest = manifest;
        self
    }

    pub fn scope(&self) -> &Url {
        &self.scope
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn manifest(&self) -> &AssetManifest {
        &self.manifest
    }

    /// Resolve a path from the manifest against the scope.
    pub fn resolve(&self, path: &str) -> Result<String, WorkerError> {
        self.scope
            .join(path)
            .map(String::from)
            .map_err(|e| WorkerError::InvalidUrl {
                url: path.to_string(),
                reason: e.to_string(),
            })
    }

    /// Pre-cache every asset of the manifest.
    ///
    /// Nothing is written unless every asset was fetched with a 2xx status.
    /// On success the host is asked to activate this worker without waiting.
    pub async fn install(&self, host: &dyn HostControl) -> Result<(), WorkerError> {
        info!(cache = %self.manifest.cache_name, "Install");

        let bucket = self.storage.open(&self.manifest.cache_name).await?;
        info!(files = self.manifest.files.len(), "Pre-caching offline page");

        let urls = self
            .manifest
            .files
            .iter()
            .map(|path| self.resolve(path))
            .collect::<Result<Vec<_>, _>>()?;
        let entries = try_join_all(urls.into_iter().map(|url| self.fetch_asset(url))).await?;
        bucket.put_all(entries).await?;

        host.skip_waiting();
        Ok(())
    }

    async fn fetch_asset(&self, url: String) -> Result<(String, Response), WorkerError> {
        let response = self
            .fetcher
            .fetch(&Request::get(url.as_str()))
            .await
            .map_err(|source| WorkerError::Install {
                url: url.clone(),
                source,
            })?;

        if !response.ok() {
            return Err(WorkerError::BadStatus {
                url,
                status: response.status,
            });
        }
        Ok((url, response))
    }

    /// Remove every bucket except the current one, then claim open clients.
    ///
    /// Deletions run concurrently and independently; if any of them failed
    /// the error is returned once all have settled.
    pub async fn activate(&self, host: &dyn HostControl) -> Result<ActivationReport, WorkerError> {
        info!(cache = %self.manifest.cache_name, "Activate");

        let current = self.manifest.cache_name.as_str();
        let stale: Vec<String> = self
            .storage
            .keys()
            .await?
            .into_iter()
            .filter(|name| name != current)
            .collect();

        let results = join_all(stale.into_iter().map(|name| async move {
            info!(bucket = %name, "Removing old cache");
            let result = self.storage.delete(&name).await;
            (name, result)
        }))
        .await;

        let mut removed = Vec::new();
        let mut failed = Vec::new();
        for (name, result) in results {
            match result {
                Ok(true) => removed.push(name),
                Ok(false) => debug!(bucket = %name, "Old cache already gone"),
                Err(e) => {
                    warn!(bucket = %name, error = %e, "Failed to remove old cache");
                    failed.push((name, e));
                }
            }
        }

        if !failed.is_empty() {
            return Err(WorkerError::Activation { removed, failed });
        }

        host.claim_clients();
        Ok(ActivationReport { removed })
    }

    /// Handle a request made by a controlled page.
    ///
    /// Only navigations are intercepted. An HTTP error status from the
    /// network is returned as is; only a network failure falls back to the
    /// cached offline page.
    pub async fn handle_fetch(&self, request: &Request) -> FetchOutcome {
        debug!(url = %request.url, mode = %request.mode, "Fetch");
        if !request.mode.is_navigation() {
            return FetchOutcome::Passthrough;
        }

        match self.fetcher.fetch(request).await {
            Ok(response) => FetchOutcome::Respond {
                response,
                source: ResponseSource::Network,
            },
            Err(e) => {
                info!(url = %request.url, error = %e, "Network unavailable, serving offline page");
                self.offline_fallback().await
            }
        }
    }

    async fn offline_fallback(&self) -> FetchOutcome {
        match self.cached_offline_page().await {
            Ok(Some(cached)) => FetchOutcome::Respond {
                response: cached.data,
                source: ResponseSource::OfflineCache,
            },
            Ok(None) => {
                warn!(page = %self.manifest.offline_page, "Offline page missing from cache");
                self.synthesized_offline_page()
            }
            Err(e) => {
                warn!(error = %e, "Failed to read offline page from cache");
                self.synthesized_offline_page()
            }
        }
    }

    async fn cached_offline_page(&self) -> Result<Option<CachedData<Response>>, WorkerError> {
        let url = self.resolve(&self.manifest.offline_page)?;
        let bucket = self.storage.open(&self.manifest.cache_name).await?;
        Ok(bucket.match_url(&url).await?)
    }

    fn synthesized_offline_page(&self) -> FetchOutcome {
        let url = self
            .resolve(&self.manifest.offline_page)
            .unwrap_or_else(|_| self.scope.to_string());
        FetchOutcome::Respond {
            response: Response::new(url, 503, FALLBACK_OFFLINE_HTML)
                .with_header("content-type", "text/html; charset=utf-8"),
            source: ResponseSource::Synthesized,
        }
    }
}
