//! Manifest resolution with automatic upstream fill.
//!
//! A cache hit returns immediately. On a miss the resolver checks that
//! the version has a configured AES key, maps the region to an upstream
//! domain, fetches the official dispatch response, decrypts it, pulls
//! out the `manifest` field and persists it, then answers from the
//! refreshed cache. Each fill runs on a detached task shared by every
//! requester of that version, so concurrent misses perform one upstream
//! fetch and a client that disconnects mid-request still leaves a
//! populated cache behind.

use std::sync::Arc;

use dashmap::DashMap;
use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::cipher::DispatchCipher;
use crate::error::GatewayError;
use crate::fetch::ManifestFetcher;
use crate::hotfix::HotfixStore;
use crate::version::{extract_region, extract_version_number, region_domain};

/// Query parameters a game client sends to the dispatch endpoint.
/// The same values are forwarded verbatim on an upstream fetch.
#[derive(Debug, Clone, Deserialize)]
pub struct DispatchQuery {
    pub version: String,
    #[serde(alias = "t", default)]
    pub timestamp: String,
    #[serde(default)]
    pub uid: String,
    #[serde(default)]
    pub token: String,
}

/// One in-flight fill, cloneable so late arrivals await the same task.
type SharedFill = Shared<BoxFuture<'static, Result<(), GatewayError>>>;

pub struct HotfixResolver {
    store: Arc<HotfixStore>,
    cipher: Arc<DispatchCipher>,
    fetcher: Arc<dyn ManifestFetcher>,
    flights: DashMap<String, SharedFill>,
}

impl HotfixResolver {
    pub fn new(
        store: Arc<HotfixStore>,
        cipher: Arc<DispatchCipher>,
        fetcher: Arc<dyn ManifestFetcher>,
    ) -> Self {
        Self {
            store,
            cipher,
            fetcher,
            flights: DashMap::new(),
        }
    }

    /// Resolves the manifest for the query's full version string,
    /// fetching from upstream on a cache miss.
    pub async fn resolve(&self, query: &DispatchQuery) -> Result<Value, GatewayError> {
        let key = query.version.as_str();
        if let Some(manifest) = self.store.manifest(key) {
            return Ok(manifest);
        }

        // Reject unknown versions and regions before allocating a
        // flight slot; the flight map must not grow on garbage input.
        let version = extract_version_number(key)
            .ok_or_else(|| GatewayError::UnsupportedVersion(key.to_string()))?;
        if !self.cipher.has_key(version) {
            warn!("Client requested unsupported game version {key}");
            return Err(GatewayError::UnsupportedVersion(key.to_string()));
        }
        let region =
            extract_region(key).ok_or_else(|| GatewayError::UnsupportedRegion(key.to_string()))?;
        let domain = region_domain(&region).ok_or_else(|| {
            warn!("No upstream dispatch domain for region {region}");
            GatewayError::UnsupportedRegion(region.clone())
        })?;

        let fill = self.shared_fill(query, version, domain);
        let result = fill.await;
        // The slot only marks an in-flight fill. Drop it win or lose:
        // on success the cache answers, on failure the next request may
        // retry against a recovered upstream.
        self.flights.remove(key);
        result?;

        self.store.manifest(key).ok_or_else(|| {
            GatewayError::Manifest(format!("manifest missing after fill for {key}"))
        })
    }

    /// Joins the in-flight fill for this version, spawning one if none
    /// is running. The fill lives on a detached task: dropping a
    /// requester's future abandons its handle on the shared future, not
    /// the fill itself.
    fn shared_fill(&self, query: &DispatchQuery, version: u32, domain: &'static str) -> SharedFill {
        use dashmap::mapref::entry::Entry;

        match self.flights.entry(query.version.clone()) {
            Entry::Occupied(slot) => slot.get().clone(),
            Entry::Vacant(slot) => {
                let task = tokio::spawn(fill_manifest(
                    self.store.clone(),
                    self.cipher.clone(),
                    self.fetcher.clone(),
                    query.clone(),
                    version,
                    domain,
                ));
                let fill: SharedFill = async move {
                    match task.await {
                        Ok(result) => result,
                        Err(e) => Err(GatewayError::Internal(format!("fill task failed: {e}"))),
                    }
                }
                .boxed()
                .shared();
                slot.insert(fill.clone());
                fill
            }
        }
    }

    #[cfg(test)]
    fn in_flight_count(&self) -> usize {
        self.flights.len()
    }
}

/// Performs one upstream fetch-decrypt-persist cycle for a version.
async fn fill_manifest(
    store: Arc<HotfixStore>,
    cipher: Arc<DispatchCipher>,
    fetcher: Arc<dyn ManifestFetcher>,
    query: DispatchQuery,
    version: u32,
    domain: &'static str,
) -> Result<(), GatewayError> {
    let key = query.version.as_str();

    // A fill finishing between a requester's cache check and its flight
    // lookup can leave a fresh fill racing an already-filled cache;
    // re-checking here keeps the fetch from repeating.
    if store.manifest(key).is_some() {
        return Ok(());
    }

    info!("🔄 Fetching hotfix manifest for {key} from {domain}");
    let url = format!(
        "https://{domain}/query_gameserver?version={key}&t={}&uid={}&token={}",
        query.timestamp, query.uid, query.token
    );
    let transport = fetcher.fetch(&url).await?;

    let plaintext = cipher.decrypt(version, transport.trim()).map_err(|e| {
        warn!("Failed to decrypt upstream dispatch for {key}: {e}");
        e
    })?;
    let document: Value = serde_json::from_slice(&plaintext)
        .map_err(|e| GatewayError::Manifest(format!("upstream payload for {key}: {e}")))?;
    let manifest = document
        .get("manifest")
        .cloned()
        .ok_or_else(|| GatewayError::Manifest(format!("no manifest field for {key}")))?;

    store.save_manifest(key, manifest);
    info!("✅ Cached hotfix manifest for {key}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct CountingFetcher {
        calls: AtomicUsize,
        response: String,
        delay: Duration,
    }

    impl CountingFetcher {
        fn new(response: String) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                response,
                delay: Duration::ZERO,
            }
        }

        fn count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl ManifestFetcher for CountingFetcher {
        async fn fetch(&self, _url: &str) -> Result<String, GatewayError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            Ok(self.response.clone())
        }
    }

    fn test_cipher() -> Arc<DispatchCipher> {
        let key = "ab".repeat(32);
        Arc::new(DispatchCipher::from_hex_keys([(39, key.as_str())]).unwrap())
    }

    fn test_store(dir: &tempfile::TempDir) -> Arc<HotfixStore> {
        let path = dir.path().join("hotfix.json");
        Arc::new(HotfixStore::load(&path, &["1_os_3.9".to_string()]).unwrap())
    }

    fn query(version: &str) -> DispatchQuery {
        DispatchQuery {
            version: version.to_string(),
            timestamp: "0".to_string(),
            uid: "0".to_string(),
            token: String::new(),
        }
    }

    fn upstream_payload(cipher: &DispatchCipher, manifest: Value) -> String {
        let document = json!({ "retcode": 0, "manifest": manifest });
        cipher
            .encrypt(39, document.to_string().as_bytes())
            .unwrap()
    }

    #[tokio::test]
    async fn miss_fetches_once_then_serves_from_cache() {
        let dir = tempfile::tempdir().unwrap();
        let cipher = test_cipher();
        let manifest = json!({"asset_bundle": {"version": 7}});
        let fetcher = Arc::new(CountingFetcher::new(upstream_payload(&cipher, manifest.clone())));
        let resolver = HotfixResolver::new(test_store(&dir), cipher, fetcher.clone());

        let first = resolver.resolve(&query("1_os_3.9")).await.unwrap();
        let second = resolver.resolve(&query("1_os_3.9")).await.unwrap();
        assert_eq!(first, manifest);
        assert_eq!(second, manifest);
        assert_eq!(fetcher.count(), 1);
    }

    #[tokio::test]
    async fn unsupported_version_never_fetches() {
        let dir = tempfile::tempdir().unwrap();
        let cipher = test_cipher();
        let fetcher = Arc::new(CountingFetcher::new(String::new()));
        let resolver = HotfixResolver::new(test_store(&dir), cipher, fetcher.clone());

        let err = resolver.resolve(&query("1_os_9.9")).await.unwrap_err();
        assert!(matches!(err, GatewayError::UnsupportedVersion(_)));
        assert_eq!(fetcher.count(), 0);
    }

    #[tokio::test]
    async fn unknown_region_never_fetches() {
        let dir = tempfile::tempdir().unwrap();
        let cipher = test_cipher();
        let fetcher = Arc::new(CountingFetcher::new(String::new()));
        let resolver = HotfixResolver::new(test_store(&dir), cipher, fetcher.clone());

        let err = resolver.resolve(&query("1_moon_3.9")).await.unwrap_err();
        assert!(matches!(err, GatewayError::UnsupportedRegion(_)));
        assert_eq!(fetcher.count(), 0);
    }

    #[tokio::test]
    async fn concurrent_misses_share_one_fetch() {
        let dir = tempfile::tempdir().unwrap();
        let cipher = test_cipher();
        let manifest = json!({"hot": true});
        let mut fetcher = CountingFetcher::new(upstream_payload(&cipher, manifest.clone()));
        fetcher.delay = Duration::from_millis(50);
        let fetcher = Arc::new(fetcher);
        let resolver = Arc::new(HotfixResolver::new(test_store(&dir), cipher, fetcher.clone()));

        let mut tasks = Vec::new();
        for _ in 0..8 {
            let resolver = resolver.clone();
            tasks.push(tokio::spawn(async move {
                resolver.resolve(&query("1_os_3.9")).await
            }));
        }
        for task in tasks {
            assert_eq!(task.await.unwrap().unwrap(), manifest);
        }
        assert_eq!(fetcher.count(), 1);
    }

    #[tokio::test]
    async fn aborted_requester_does_not_duplicate_the_fetch() {
        let dir = tempfile::tempdir().unwrap();
        let cipher = test_cipher();
        let manifest = json!({"hot": 1});
        let mut fetcher = CountingFetcher::new(upstream_payload(&cipher, manifest.clone()));
        fetcher.delay = Duration::from_millis(200);
        let fetcher = Arc::new(fetcher);
        let resolver = Arc::new(HotfixResolver::new(test_store(&dir), cipher, fetcher.clone()));

        // First requester disconnects mid-fill, as a dropped HTTP
        // request future would.
        let first = {
            let resolver = resolver.clone();
            tokio::spawn(async move { resolver.resolve(&query("1_os_3.9")).await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        first.abort();
        assert!(first.await.unwrap_err().is_cancelled());

        // A second requester must join the still-running fill instead
        // of starting its own.
        let second = resolver.resolve(&query("1_os_3.9")).await.unwrap();
        assert_eq!(second, manifest);
        assert_eq!(fetcher.count(), 1);
    }

    #[tokio::test]
    async fn flight_slots_are_evicted_and_never_allocated_for_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let cipher = test_cipher();
        let manifest = json!({"hot": 2});
        let fetcher = Arc::new(CountingFetcher::new(upstream_payload(&cipher, manifest)));
        let resolver = HotfixResolver::new(test_store(&dir), cipher, fetcher);

        // Unknown versions and regions never reach the flight map.
        resolver.resolve(&query("1_os_9.9")).await.unwrap_err();
        resolver.resolve(&query("1_moon_3.9")).await.unwrap_err();
        resolver.resolve(&query("garbage")).await.unwrap_err();
        assert_eq!(resolver.in_flight_count(), 0);

        // A completed fill releases its slot.
        resolver.resolve(&query("1_os_3.9")).await.unwrap();
        assert_eq!(resolver.in_flight_count(), 0);
    }

    #[tokio::test]
    async fn garbage_upstream_payload_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let cipher = test_cipher();
        let fetcher = Arc::new(CountingFetcher::new("not base64!!".to_string()));
        let resolver = HotfixResolver::new(test_store(&dir), cipher, fetcher.clone());

        let err = resolver.resolve(&query("1_os_3.9")).await.unwrap_err();
        assert!(matches!(err, GatewayError::Decrypt(39)));
    }

    #[tokio::test]
    async fn missing_manifest_field_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let cipher = test_cipher();
        let document = json!({ "retcode": 0 });
        let transport = cipher.encrypt(39, document.to_string().as_bytes()).unwrap();
        let fetcher = Arc::new(CountingFetcher::new(transport));
        let resolver = HotfixResolver::new(test_store(&dir), cipher, fetcher);

        let err = resolver.resolve(&query("1_os_3.9")).await.unwrap_err();
        assert!(matches!(err, GatewayError::Manifest(_)));
    }
}
