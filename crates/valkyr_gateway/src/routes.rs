//! HTTP surface of the dispatch gateway.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tracing::warn;

use crate::cipher::DispatchCipher;
use crate::error::GatewayError;
use crate::hotfix::HotfixStore;
use crate::resolver::{DispatchQuery, HotfixResolver};
use crate::response::{build_response, GatewayConfig};
use crate::version::extract_version_number;

/// Shared state behind the axum router.
#[derive(Clone)]
pub struct GatewayState {
    pub config: Arc<GatewayConfig>,
    pub store: Arc<HotfixStore>,
    pub cipher: Arc<DispatchCipher>,
    pub resolver: Arc<HotfixResolver>,
}

pub fn router(state: GatewayState) -> Router {
    Router::new()
        .route("/query_gateway", get(query_gateway))
        .with_state(state)
}

async fn query_gateway(
    State(state): State<GatewayState>,
    Query(query): Query<DispatchQuery>,
) -> Response {
    match handle_query(&state, &query).await {
        Ok(payload) => (StatusCode::OK, payload).into_response(),
        Err(e) => {
            // Clients only ever see a bare 400; the reason stays in the log.
            warn!(version = %query.version, "query_gateway failed: {e}");
            StatusCode::BAD_REQUEST.into_response()
        }
    }
}

async fn handle_query(state: &GatewayState, query: &DispatchQuery) -> Result<String, GatewayError> {
    let manifest = state.resolver.resolve(query).await?;
    let version = extract_version_number(&query.version)
        .ok_or_else(|| GatewayError::UnsupportedVersion(query.version.clone()))?;

    let response = build_response(
        &query.version,
        manifest,
        &state.config,
        state.store.use_local_cache(),
    );
    let body = serde_json::to_vec(&response)
        .map_err(|e| GatewayError::Internal(format!("serialize dispatch response: {e}")))?;
    state.cipher.encrypt(version, &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::ManifestFetcher;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::net::SocketAddr;

    struct CannedFetcher {
        response: String,
    }

    #[async_trait]
    impl ManifestFetcher for CannedFetcher {
        async fn fetch(&self, _url: &str) -> Result<String, GatewayError> {
            Ok(self.response.clone())
        }
    }

    fn test_state(dir: &tempfile::TempDir, upstream_manifest: Value) -> GatewayState {
        let store = Arc::new(
            HotfixStore::load(&dir.path().join("hotfix.json"), &["1_os_3.9".to_string()])
                .unwrap(),
        );
        let key = "cd".repeat(32);
        let cipher =
            Arc::new(DispatchCipher::from_hex_keys([(39, key.as_str())]).unwrap());
        let upstream = json!({ "retcode": 0, "manifest": upstream_manifest });
        let fetcher = Arc::new(CannedFetcher {
            response: cipher
                .encrypt(39, upstream.to_string().as_bytes())
                .unwrap(),
        });
        let resolver = Arc::new(HotfixResolver::new(
            store.clone(),
            cipher.clone(),
            fetcher,
        ));
        GatewayState {
            config: Arc::new(GatewayConfig {
                bind_address: SocketAddr::from(([127, 0, 0, 1], 8080)),
                public_url: "http://127.0.0.1:8080".to_string(),
                game_public_address: "127.0.0.1".to_string(),
                game_port: 16100,
            }),
            store,
            cipher,
            resolver,
        }
    }

    #[tokio::test]
    async fn full_query_yields_decryptable_dispatch() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir, json!({"asset_bundle": {"version": 3}}));
        let query = DispatchQuery {
            version: "1_os_3.9".to_string(),
            timestamp: "0".to_string(),
            uid: "1".to_string(),
            token: String::new(),
        };

        let transport = handle_query(&state, &query).await.unwrap();
        let plain = state.cipher.decrypt(39, &transport).unwrap();
        let doc: Value = serde_json::from_slice(&plain).unwrap();
        assert_eq!(doc["gameserver"]["port"], 16100);
        assert_eq!(doc["manifest"]["asset_bundle"]["version"], 3);
        assert_eq!(doc["ext"]["apm_switch"], "1");
        assert!(doc["asset_bundle_url_list"][0]
            .as_str()
            .unwrap()
            .contains("overseas01"));
    }

    #[tokio::test]
    async fn unknown_version_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir, json!({}));
        let query = DispatchQuery {
            version: "1_os_5.5".to_string(),
            timestamp: String::new(),
            uid: String::new(),
            token: String::new(),
        };
        assert!(handle_query(&state, &query).await.is_err());
    }
}
