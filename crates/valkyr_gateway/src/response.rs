//! Dispatch response document.

use std::net::SocketAddr;

use serde::Serialize;
use serde_json::{json, Value};

use crate::urls;

/// Addresses the gateway hands out to clients.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Address the HTTP server listens on.
    pub bind_address: SocketAddr,
    /// URL clients use to reach this HTTP server.
    pub public_url: String,
    /// Address clients use to reach the game server.
    pub game_public_address: String,
    pub game_port: u16,
}

#[derive(Debug, Serialize)]
pub struct ServerInfo {
    pub ip: String,
    pub port: u16,
    pub is_kcp: bool,
}

/// The document returned (encrypted) from the dispatch endpoint. Field
/// names are the client's wire contract.
#[derive(Debug, Serialize)]
pub struct QueryGatewayResponse {
    pub account_url: String,
    pub gameserver: ServerInfo,
    pub gateway: ServerInfo,
    pub asset_bundle_url_list: Vec<String>,
    pub ex_resource_url_list: Vec<String>,
    pub ex_audio_and_video_url_list: Vec<String>,
    pub manifest: Value,
    pub ext: Value,
}

/// Assembles the full dispatch response for a version, pointing the
/// client at this server and embedding the resolved manifest.
pub fn build_response(
    version_key: &str,
    manifest: Value,
    config: &GatewayConfig,
    use_local_cache: bool,
) -> QueryGatewayResponse {
    let server_info = || ServerInfo {
        ip: config.game_public_address.clone(),
        port: config.game_port,
        is_kcp: true,
    };

    let asset_bundle = urls::asset_bundle_url_list(version_key, use_local_cache, &config.public_url);
    let ex_resource = urls::ex_resource_url_list(version_key, use_local_cache, &config.public_url);
    let ex_audio_and_video =
        urls::ex_audio_and_video_url_list(version_key, use_local_cache, &config.public_url);

    // Client-tuning flags the game expects verbatim.
    let ext = json!({
        "ex_res_use_http": "0",
        "is_xxxx": "0",
        "elevator_model_path": "GameEntry/EVA/StartLoading_Model",
        "block_error_dialog": "1",
        "ex_res_pre_publish": "0",
        "ex_resource_url_list": ex_resource,
        "apm_switch_game_log": "1",
        "ex_audio_and_video_url_list": ex_audio_and_video,
        "apm_log_dest": "2",
        "update_streaming_asb": "1",
        "use_multy_cdn": "1",
        "show_bulletin_empty_dialog_bg": "0",
        "ai_use_asset_boundle": "1",
        "res_use_asset_boundle": "1",
        "apm_log_level": "0",
        "apm_switch_crash": "1",
        "network_feedback_enable": "0",
        "new_audio_upload": "1",
        "apm_switch": "1",
    });

    QueryGatewayResponse {
        account_url: format!("{}/", config.public_url),
        gameserver: server_info(),
        gateway: server_info(),
        asset_bundle_url_list: asset_bundle,
        ex_resource_url_list: ex_resource,
        ex_audio_and_video_url_list: ex_audio_and_video,
        manifest,
        ext,
    }
}
