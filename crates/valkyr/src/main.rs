//! Main application entry point for the Valkyr server
//!
//! Provides CLI interface, configuration loading, and startup for both
//! the TCP game server and the HTTP dispatch gateway.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Arg, Command};
use serde::{Deserialize, Serialize};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use valkyr_game::command::build_command_registry;
use valkyr_game::{AccountStore, GameConfig, GameData, GameServer, I18n, ServerContext};
use valkyr_gateway::{
    DispatchCipher, GatewayConfig, GatewayState, HotfixResolver, HotfixStore, HttpManifestFetcher,
};

// ============================================================================
// Configuration
// ============================================================================

/// Application configuration loaded from TOML file.
///
/// Every section and field carries a default, so a partial file parses
/// with the gaps filled in; the normalized result is written back after
/// each load to keep the file on disk complete.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Game server configuration
    pub game_server: GameServerSettings,
    /// HTTP dispatch gateway configuration
    pub http_server: HttpServerSettings,
    /// Hotfix cache configuration
    pub hotfix: HotfixSettings,
    /// Static data file paths
    pub data: DataSettings,
    /// Privileged account lists
    pub accounts: AccountSettings,
    /// Logging configuration
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameServerSettings {
    /// Bind address for the TCP listener
    pub bind_address: String,
    /// Address handed to clients in dispatch responses
    pub public_address: String,
    /// Port handed to clients in dispatch responses
    pub public_port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpServerSettings {
    /// Bind address for the dispatch gateway
    pub bind_address: String,
    /// Base URL clients use to reach this gateway
    pub public_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HotfixSettings {
    /// Path of the hotfix cache file
    pub file_path: String,
    /// Version strings the gateway serves
    pub supported_versions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSettings {
    /// Item and fragment table file
    pub game_data_path: String,
    /// Optional translation overlay file
    pub lang_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AccountSettings {
    /// Uids granted the admin permission at login
    pub admin_uids: Vec<u64>,
    /// Uids granted the support permission at login
    pub support_uids: Vec<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level filter
    pub level: String,
    /// JSON formatting
    pub json_format: bool,
}

impl Default for GameServerSettings {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:16100".to_string(),
            public_address: "127.0.0.1".to_string(),
            public_port: 16100,
        }
    }
}

impl Default for HttpServerSettings {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".to_string(),
            public_url: "http://127.0.0.1:8080".to_string(),
        }
    }
}

impl Default for HotfixSettings {
    fn default() -> Self {
        Self {
            file_path: "data/hotfix.json".to_string(),
            supported_versions: vec!["1_os_3.9".to_string()],
        }
    }
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            game_data_path: "data/gamedata.json".to_string(),
            lang_path: None,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from file, writing a default file when absent.
    /// A successfully loaded file is re-written so fields missing from
    /// the file show up on disk with their defaults.
    pub async fn load_from_file(path: &PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        let config = if path.exists() {
            let content = tokio::fs::read_to_string(path).await?;
            toml::from_str::<AppConfig>(&content)?
        } else {
            info!("Created default configuration file: {}", path.display());
            AppConfig::default()
        };
        let toml_content = toml::to_string_pretty(&config)?;
        tokio::fs::write(path, toml_content).await?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self
            .game_server
            .bind_address
            .parse::<std::net::SocketAddr>()
            .is_err()
        {
            return Err(format!(
                "Invalid game server bind address: {}",
                self.game_server.bind_address
            ));
        }

        if self
            .http_server
            .bind_address
            .parse::<std::net::SocketAddr>()
            .is_err()
        {
            return Err(format!(
                "Invalid HTTP bind address: {}",
                self.http_server.bind_address
            ));
        }

        if self.hotfix.supported_versions.is_empty() {
            return Err("At least one supported version is required".to_string());
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(format!(
                "Invalid log level: {}. Must be one of: {:?}",
                self.logging.level, valid_levels
            ));
        }

        Ok(())
    }

    fn to_game_config(&self) -> Result<GameConfig, Box<dyn std::error::Error>> {
        Ok(GameConfig {
            bind_address: self.game_server.bind_address.parse()?,
            admin_uids: self.accounts.admin_uids.clone(),
            support_uids: self.accounts.support_uids.clone(),
        })
    }

    fn to_gateway_config(&self) -> Result<GatewayConfig, Box<dyn std::error::Error>> {
        Ok(GatewayConfig {
            bind_address: self.http_server.bind_address.parse()?,
            public_url: self.http_server.public_url.trim_end_matches('/').to_string(),
            game_public_address: self.game_server.public_address.clone(),
            game_port: self.game_server.public_port,
        })
    }
}

// ============================================================================
// CLI Interface
// ============================================================================

/// Command line arguments
#[derive(Debug, Clone)]
pub struct CliArgs {
    pub config_path: PathBuf,
    pub bind_address: Option<String>,
    pub http_bind_address: Option<String>,
    pub log_level: Option<String>,
    pub json_logs: bool,
}

impl CliArgs {
    /// Parse command line arguments
    pub fn parse() -> Self {
        let matches = Command::new("Valkyr Server")
            .version(env!("CARGO_PKG_VERSION"))
            .about("Game server with opcode dispatch and hotfix-aware dispatch gateway")
            .arg(
                Arg::new("config")
                    .short('c')
                    .long("config")
                    .value_name("FILE")
                    .help("Configuration file path")
                    .default_value("config.toml"),
            )
            .arg(
                Arg::new("bind")
                    .short('b')
                    .long("bind")
                    .value_name("ADDRESS")
                    .help("Game server bind address (e.g., 127.0.0.1:16100)"),
            )
            .arg(
                Arg::new("http-bind")
                    .long("http-bind")
                    .value_name("ADDRESS")
                    .help("Dispatch gateway bind address (e.g., 127.0.0.1:8080)"),
            )
            .arg(
                Arg::new("log-level")
                    .short('l')
                    .long("log-level")
                    .value_name("LEVEL")
                    .help("Log level (trace, debug, info, warn, error)"),
            )
            .arg(
                Arg::new("json-logs")
                    .long("json-logs")
                    .help("Output logs in JSON format")
                    .action(clap::ArgAction::SetTrue),
            )
            .get_matches();

        Self {
            config_path: PathBuf::from(
                matches
                    .get_one::<String>("config")
                    .expect("Default config path should always be set"),
            ),
            bind_address: matches.get_one::<String>("bind").cloned(),
            http_bind_address: matches.get_one::<String>("http-bind").cloned(),
            log_level: matches.get_one::<String>("log-level").cloned(),
            json_logs: matches.get_flag("json-logs"),
        }
    }
}

// ============================================================================
// Logging Setup
// ============================================================================

/// Initialize logging system
fn setup_logging(config: &LoggingSettings) -> Result<(), Box<dyn std::error::Error>> {
    let log_level = config.level.as_str();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if config.json_format {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_file(false)
                    .with_line_number(false)
                    .with_thread_ids(true)
                    .with_thread_names(true),
            )
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_file(false)
                    .with_line_number(false)
                    .with_thread_ids(true)
                    .with_thread_names(true),
            )
            .init();
    }

    info!("🔧 Logging initialized with level: {}", log_level);
    Ok(())
}

// ============================================================================
// Signal Handling
// ============================================================================

/// Setup graceful shutdown signal handling
async fn setup_signal_handlers() -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(unix)]
    {
        use signal::unix::{signal, SignalKind};

        let mut sigint = signal(SignalKind::interrupt())?;
        let mut sigterm = signal(SignalKind::terminate())?;

        tokio::select! {
            _ = sigint.recv() => {
                info!("📡 Received SIGINT");
            }
            _ = sigterm.recv() => {
                info!("📡 Received SIGTERM");
            }
        }
    }

    #[cfg(windows)]
    {
        signal::ctrl_c().await?;
        info!("📡 Received Ctrl+C");
    }

    Ok(())
}

// ============================================================================
// Application
// ============================================================================

/// Main application struct owning both servers
pub struct Application {
    config: AppConfig,
    server: Arc<GameServer>,
    gateway_state: GatewayState,
}

impl Application {
    /// Create new application from CLI arguments
    pub async fn new(args: CliArgs) -> Result<Self, Box<dyn std::error::Error>> {
        // Load configuration first (before logging setup)
        let mut config = AppConfig::load_from_file(&args.config_path).await?;

        // Apply CLI overrides
        if let Some(bind_address) = args.bind_address {
            config.game_server.bind_address = bind_address;
        }
        if let Some(http_bind_address) = args.http_bind_address {
            config.http_server.bind_address = http_bind_address;
        }
        if let Some(log_level) = args.log_level {
            config.logging.level = log_level;
        }
        if args.json_logs {
            config.logging.json_format = true;
        }

        if let Err(e) = config.validate() {
            return Err(format!("Configuration validation failed: {}", e).into());
        }

        setup_logging(&config.logging)?;
        display_banner();

        // Static data and translations
        let data = Arc::new(GameData::load(config.data.game_data_path.as_ref())?);
        let i18n = Arc::new(match &config.data.lang_path {
            Some(path) => I18n::load(path.as_ref()),
            None => I18n::builtin(),
        });

        // Game server
        let game_config = config.to_game_config()?;
        let accounts = AccountStore::new(&game_config.admin_uids, &game_config.support_uids);
        let commands = build_command_registry()?;
        let ctx = Arc::new(ServerContext::new(data, i18n, accounts, commands));
        let server = Arc::new(GameServer::new(game_config, ctx)?);

        // Dispatch gateway
        let store = Arc::new(HotfixStore::load(
            config.hotfix.file_path.as_ref(),
            &config.hotfix.supported_versions,
        )?);
        let keys = store.aes_keys();
        let cipher = Arc::new(DispatchCipher::from_hex_keys(
            keys.iter().map(|(version, key)| (*version, key.as_str())),
        )?);
        let fetcher = Arc::new(HttpManifestFetcher::new()?);
        let resolver = Arc::new(HotfixResolver::new(
            store.clone(),
            cipher.clone(),
            fetcher,
        ));
        let gateway_state = GatewayState {
            config: Arc::new(config.to_gateway_config()?),
            store,
            cipher,
            resolver,
        };

        info!("🚀 Valkyr Server v{}", env!("CARGO_PKG_VERSION"));
        info!(
            "📂 Config: {} | Hotfix: {}",
            args.config_path.display(),
            config.hotfix.file_path
        );

        Ok(Self {
            config,
            server,
            gateway_state,
        })
    }

    /// Run both servers until a shutdown signal arrives
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        info!("📋 Configuration Summary:");
        info!("  🌐 Game server: {}", self.config.game_server.bind_address);
        info!(
            "  📡 Dispatch gateway: {}",
            self.config.http_server.bind_address
        );
        info!(
            "  📄 Supported versions: {}",
            self.config.hotfix.supported_versions.join(", ")
        );

        // Start game server in background
        let server_handle = {
            let server = self.server.clone();
            tokio::spawn(async move {
                match server.start().await {
                    Ok(()) => {
                        info!("✅ Game server stopped");
                    }
                    Err(e) => {
                        error!("❌ Game server error: {:?}", e);
                        std::process::exit(1);
                    }
                }
            })
        };

        // Start dispatch gateway in background
        let http_bind: std::net::SocketAddr = self.config.http_server.bind_address.parse()?;
        let router = valkyr_gateway::router(self.gateway_state);
        let gateway_handle = tokio::spawn(async move {
            let listener = match tokio::net::TcpListener::bind(http_bind).await {
                Ok(listener) => listener,
                Err(e) => {
                    error!("❌ Failed to bind dispatch gateway on {http_bind}: {e}");
                    std::process::exit(1);
                }
            };
            info!("📡 Dispatch gateway listening on {http_bind}");
            if let Err(e) = axum::serve(listener, router).await {
                error!("❌ Dispatch gateway error: {:?}", e);
            }
        });

        info!("✅ Valkyr Server is now running!");
        info!("🛑 Press Ctrl+C to gracefully shutdown");

        setup_signal_handlers().await?;

        info!("🛑 Shutdown signal received, initiating graceful shutdown...");
        self.server.shutdown();
        gateway_handle.abort();

        // Give connections time to drain
        tokio::time::sleep(tokio::time::Duration::from_secs(1)).await;
        server_handle.abort();

        info!("👋 Valkyr Server shutdown complete");
        Ok(())
    }
}

// ============================================================================
// Entry Point
// ============================================================================

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    match Application::new(args).await {
        Ok(app) => {
            if let Err(e) = app.run().await {
                error!("❌ Application error: {:?}", e);
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("❌ Failed to start application: {:?}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}

// ============================================================================
// Utilities and Helpers
// ============================================================================

/// Display startup banner using proper logging
fn display_banner() {
    let version = option_env!("CARGO_PKG_VERSION").unwrap_or("UNK");
    info!("╔══════════════════════════════════════════╗");
    info!("║            🌟 VALKYR SERVER 🌟           ║");
    info!("║                 v{}                   ║", version);
    info!("║                                          ║");
    info!("║  Opcode Packet Dispatch over TCP         ║");
    info!("║  Hotfix-Aware Dispatch Gateway           ║");
    info!("║  Declarative Chat Command Framework      ║");
    info!("╚══════════════════════════════════════════╝");
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_default_config() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());

        let game_config = config.to_game_config().expect("default converts");
        assert_eq!(game_config.bind_address.port(), 16100);
        let gateway_config = config.to_gateway_config().expect("default converts");
        assert_eq!(gateway_config.game_port, 16100);
    }

    #[tokio::test]
    async fn test_config_validation() {
        let mut config = AppConfig::default();

        config.game_server.bind_address = "invalid".to_string();
        assert!(config.validate().is_err());

        config.game_server.bind_address = "127.0.0.1:16100".to_string();
        config.hotfix.supported_versions.clear();
        assert!(config.validate().is_err());

        config.hotfix.supported_versions = vec!["1_os_3.9".to_string()];
        config.logging.level = "invalid".to_string();
        assert!(config.validate().is_err());
    }

    #[tokio::test]
    async fn test_partial_config_is_normalized_and_rewritten() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");

        // Only one section, one field; everything else must default.
        tokio::fs::write(&path, "[logging]\nlevel = \"debug\"\n")
            .await
            .expect("write partial config");

        let loaded = AppConfig::load_from_file(&path).await.expect("load");
        assert_eq!(loaded.logging.level, "debug");
        assert_eq!(loaded.game_server.bind_address, "127.0.0.1:16100");
        assert_eq!(
            loaded.hotfix.supported_versions,
            vec!["1_os_3.9".to_string()]
        );

        // The file on disk now carries the filled-in sections.
        let rewritten = tokio::fs::read_to_string(&path).await.expect("read back");
        assert!(rewritten.contains("[game_server]"));
        assert!(rewritten.contains("[hotfix]"));
        assert!(rewritten.contains("level = \"debug\""));
    }

    #[test]
    fn test_privileged_uids_reach_game_config() {
        let mut config = AppConfig::default();
        config.accounts.admin_uids = vec![9000];
        config.accounts.support_uids = vec![9001];

        let game_config = config.to_game_config().expect("converts");
        assert_eq!(game_config.admin_uids, vec![9000]);
        assert_eq!(game_config.support_uids, vec![9001]);

        // The account store is seeded from the game config's lists.
        let accounts = AccountStore::new(&game_config.admin_uids, &game_config.support_uids);
        let account = accounts.authenticate(9000, "");
        assert!(account
            .permissions
            .contains(&valkyr_game::player::Permission::Admin));
    }

    #[tokio::test]
    async fn test_config_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");

        // First load creates the default file, second reads it back.
        let created = AppConfig::load_from_file(&path).await.expect("create");
        assert!(path.exists());
        let loaded = AppConfig::load_from_file(&path).await.expect("reload");
        assert_eq!(
            created.game_server.bind_address,
            loaded.game_server.bind_address
        );
        assert_eq!(
            created.hotfix.supported_versions,
            loaded.hotfix.supported_versions
        );
    }

    #[test]
    fn test_public_url_trailing_slash_trimmed() {
        let mut config = AppConfig::default();
        config.http_server.public_url = "http://example.com/".to_string();
        let gateway_config = config.to_gateway_config().expect("converts");
        assert_eq!(gateway_config.public_url, "http://example.com");
    }
}
