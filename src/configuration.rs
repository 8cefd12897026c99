use serde;

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub app_port: u16,
    pub app_host: String,
    #[serde(default)]
    pub debug_stacktrace: bool,
    #[serde(default)]
    pub redis: Option<RedisSettings>,
    pub jwt: JwtSettings,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: String,
    pub host: String,
    pub port: u16,
    pub database_name: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct RedisSettings {
    pub url: String,
    #[serde(default = "default_cache_ttl")]
    pub ttl_seconds: u64,
}

#[derive(Clone, serde::Deserialize)]
pub struct JwtSettings {
    pub secret: String,
    pub issuer: String,
    #[serde(default = "default_token_ttl")]
    pub ttl_seconds: i64,
}

// Keep the secret out of logs.
impl std::fmt::Debug for JwtSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtSettings")
            .field("secret", &"****")
            .field("issuer", &self.issuer)
            .field("ttl_seconds", &self.ttl_seconds)
            .finish()
    }
}

fn default_max_connections() -> u32 {
    5
}

fn default_cache_ttl() -> u64 {
    3600
}

fn default_token_ttl() -> i64 {
    3600
}

impl DatabaseSettings {
    // Connection string: postgresql://<username>:<password>@<host>:<port>/<database_name>
    pub fn connection_string(&self) -> String {
        format!(
            "postgresql://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database_name,
        )
    }
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // configuration.yaml first, then CUSTOMER_SERVICE__JWT__SECRET style overrides
    let settings = config::Config::builder()
        .add_source(config::File::with_name("configuration").required(false))
        .add_source(
            config::Environment::with_prefix("CUSTOMER_SERVICE")
                .prefix_separator("__")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize()
}
