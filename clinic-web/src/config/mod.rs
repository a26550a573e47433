use secrecy::Secret;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub auth: AuthSettings,
    pub database: DatabaseSettings,
    pub storage: StorageSettings,
    pub site: SiteSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthSettings {
    /// Base URL of the hosted auth provider's HTTP API.
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// The hosted database owns the schema; migrations are only applied
    /// when explicitly enabled (dev and test environments).
    #[serde(default)]
    pub run_migrations: bool,
}

fn default_max_connections() -> u32 {
    8
}

fn default_min_connections() -> u32 {
    1
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageSettings {
    pub backend: StorageBackend,
    #[serde(default = "default_local_path")]
    pub local_path: String,
    /// URL prefix under which stored objects are reachable by browsers.
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
    /// Base URL of the hosted object store (bucket backend only).
    pub bucket_url: Option<String>,
    pub bucket: Option<String>,
    pub api_key: Option<Secret<String>>,
}

fn default_local_path() -> String {
    "clinic-web/static/uploads".to_string()
}

fn default_public_base_url() -> String {
    "/static/uploads".to_string()
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Local,
    Bucket,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SiteSettings {
    /// Source URL for the booking widget embedded on the contact page.
    pub booking_embed_url: String,
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let base_path = std::env::current_dir().expect("Failed to determine the current directory");

    // Works from both the workspace root and the crate directory
    let configuration_directory = if base_path.ends_with("clinic-web") {
        base_path.join("config")
    } else {
        base_path.join("clinic-web").join("config")
    };

    let settings = config::Config::builder()
        .add_source(config::File::from(configuration_directory.join("base.yaml")).required(true))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<Settings>()
}
