//! Cache-first package index client.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use reqwest::Client;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use reqmerge_core::config::RegistryConfig;
use reqmerge_core::package::PackageName;
use reqmerge_core::store::CacheStore;
use reqmerge_util::errors::ReqmergeError;

use crate::cache::RegistryCache;
use crate::index::{PackageIndex, RegistryRecord};

/// Build a shared reqwest client for index lookups.
pub fn build_client(timeout: Duration) -> miette::Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!("reqmerge/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| {
            ReqmergeError::Unexpected {
                message: format!("Failed to create HTTP client: {e}"),
            }
            .into()
        })
}

/// Looks up published versions, disk cache first, network second.
///
/// Every package is queried over the network at most once per client: a
/// lookup that failed is remembered as empty for the rest of the run.
/// Clones share that memory.
#[derive(Debug, Clone)]
pub struct RegistryClient {
    http: Client,
    index_url: String,
    cache: RegistryCache,
    seen: Arc<Mutex<HashMap<PackageName, RegistryRecord>>>,
}

impl RegistryClient {
    pub fn new(http: Client, index_url: &str, store: CacheStore) -> Self {
        Self {
            http,
            index_url: index_url.trim_end_matches('/').to_string(),
            cache: RegistryCache::new(store),
            seen: Arc::default(),
        }
    }

    /// Client configured from the `[registry]` section.
    pub fn from_config(config: &RegistryConfig, store: CacheStore) -> miette::Result<Self> {
        let http = build_client(Duration::from_secs(config.timeout_secs))?;
        Ok(Self::new(http, &config.index_url, store))
    }

    pub fn index_url(&self) -> &str {
        &self.index_url
    }

    /// Index endpoint for one package.
    pub fn package_url(&self, name: &PackageName) -> String {
        format!("{}/{name}/json", self.index_url)
    }

    /// Published versions of `name` with their runtime requirements.
    ///
    /// Never fails: an unreachable or failing index yields an empty record,
    /// which callers treat as "no versions". Only successful fetches are
    /// written to the disk cache.
    pub async fn versions(&self, name: &PackageName) -> RegistryRecord {
        if let Some(record) = self.remembered(name) {
            return record;
        }

        if let Some(record) = self.cache.get(name) {
            tracing::debug!(package = %name, "registry cache hit");
            self.remember(name, &record);
            return record;
        }

        tracing::debug!(package = %name, url = %self.package_url(name), "registry cache miss");
        let record = match self.fetch(name).await {
            Ok(record) => {
                if let Err(e) = self.cache.put(name, &record) {
                    tracing::warn!(package = %name, error = %e, "failed to write registry cache");
                }
                record
            }
            Err(e) => {
                tracing::warn!(error = %e, "treating package as having no versions");
                RegistryRecord::new()
            }
        };
        self.remember(name, &record);
        record
    }

    /// Warm the lookup memory for `names`, at most `jobs` requests in flight.
    pub async fn prefetch(&self, names: impl IntoIterator<Item = PackageName>, jobs: usize) {
        let pending: Vec<PackageName> = names
            .into_iter()
            .filter(|name| self.remembered(name).is_none())
            .collect();
        if pending.is_empty() {
            return;
        }

        let semaphore = Arc::new(Semaphore::new(jobs.max(1)));
        let mut join_set = JoinSet::new();
        for name in pending {
            let client = self.clone();
            let sem = semaphore.clone();
            join_set.spawn(async move {
                let _permit = sem.acquire_owned().await;
                client.versions(&name).await;
            });
        }
        while let Some(result) = join_set.join_next().await {
            if let Err(e) = result {
                tracing::warn!(error = %e, "registry prefetch task failed");
            }
        }
    }

    async fn fetch(&self, name: &PackageName) -> Result<RegistryRecord, ReqmergeError> {
        let unavailable = |message: String| ReqmergeError::RegistryUnavailable {
            package: name.to_string(),
            message,
        };
        let url = self.package_url(name);

        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| unavailable(format!("request to {url} failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(unavailable(format!("HTTP {status} fetching {url}")));
        }

        let index: PackageIndex = resp
            .json()
            .await
            .map_err(|e| unavailable(format!("invalid index response from {url}: {e}")))?;
        Ok(index.into_record())
    }

    fn remembered(&self, name: &PackageName) -> Option<RegistryRecord> {
        self.seen.lock().ok()?.get(name).cloned()
    }

    fn remember(&self, name: &PackageName, record: &RegistryRecord) {
        if let Ok(mut seen) = self.seen.lock() {
            seen.insert(name.clone(), record.clone());
        }
    }
}
