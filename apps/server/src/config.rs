//! Server configuration
//!
//! Layered the usual way: built-in defaults, then an optional file named by
//! `COSTURA_CONFIG`, then `COSTURA_*` environment variables using `__` as the
//! section separator (`COSTURA_DATABASE__URL`). A `.env` file is read first.

use serde::Deserialize;
use std::net::SocketAddr;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub logging: LoggingConfig,
    pub pagination: PaginationConfig,
    pub sms: SmsConfig,
    pub payment: PaymentConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
    pub max_request_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            cors_origins: Vec::new(),
            max_request_body_size: 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Postgres,
    /// Google Cloud Firestore
    #[serde(alias = "document")]
    Firestore,
    /// In-process documents, lost on restart; for tests and local runs
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub backend: StorageBackend,
    pub url: Option<String>,
    pub pool_min_size: u32,
    pub pool_max_size: u32,
    pub pool_timeout_seconds: u64,
    pub run_migrations: bool,
    /// Google Cloud project holding the Firestore database
    pub firestore_project_id: Option<String>,
    pub firestore_database_id: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Postgres,
            url: None,
            pool_min_size: 1,
            pool_max_size: 10,
            pool_timeout_seconds: 30,
            run_migrations: true,
            firestore_project_id: None,
            firestore_database_id: "(default)".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub issuer: String,
    pub token_ttl_hours: i64,
    /// Clock skew tolerated when checking `exp`.
    pub leeway_seconds: u64,
    pub bcrypt_cost: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            issuer: "costura".to_string(),
            token_ttl_hours: 24,
            leeway_seconds: 30,
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
    pub file_enabled: bool,
    pub file_directory: String,
    pub file_prefix: String,
    /// daily, hourly, minutely or never
    pub file_rotation: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file_enabled: false,
            file_directory: "logs".to_string(),
            file_prefix: "costura".to_string(),
            file_rotation: "daily".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    pub default_limit: usize,
    pub max_limit: usize,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_limit: 10,
            max_limit: 100,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SmsProviderKind {
    Twilio,
    #[default]
    Disabled,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SmsConfig {
    pub provider: SmsProviderKind,
    pub base_url: String,
    pub account_sid: String,
    pub auth_token: String,
    pub service_sid: String,
    pub channel: String,
    pub timeout_seconds: u64,
    /// Code accepted by the disabled provider.
    pub dev_code: String,
}

impl Default for SmsConfig {
    fn default() -> Self {
        Self {
            provider: SmsProviderKind::Disabled,
            base_url: "https://verify.twilio.com".to_string(),
            account_sid: String::new(),
            auth_token: String::new(),
            service_sid: String::new(),
            channel: "sms".to_string(),
            timeout_seconds: 10,
            dev_code: "000000".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentProviderKind {
    Stripe,
    #[default]
    Disabled,
}

/// Plan prices in minor units (centavos).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlanPrices {
    pub monthly_standard: i64,
    pub yearly_standard: i64,
    pub monthly_pro: i64,
    pub yearly_pro: i64,
}

impl Default for PlanPrices {
    fn default() -> Self {
        Self {
            monthly_standard: 349,
            yearly_standard: 3799,
            monthly_pro: 999,
            yearly_pro: 9999,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PaymentConfig {
    pub provider: PaymentProviderKind,
    pub base_url: String,
    pub secret_key: String,
    pub webhook_secret: String,
    pub success_url: String,
    pub cancel_url: String,
    pub timeout_seconds: u64,
    pub webhook_tolerance_seconds: i64,
    pub grace_period_days: i64,
    pub prices: PlanPrices,
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            provider: PaymentProviderKind::Disabled,
            base_url: "https://api.stripe.com".to_string(),
            secret_key: String::new(),
            webhook_secret: String::new(),
            success_url: "http://localhost:8080/payment/success".to_string(),
            cancel_url: "http://localhost:8080/payment/cancel".to_string(),
            timeout_seconds: 15,
            webhook_tolerance_seconds: 300,
            grace_period_days: 7,
            prices: PlanPrices::default(),
        }
    }
}

impl Config {
    /// Load configuration from `COSTURA_CONFIG` (if set) and the environment.
    pub fn load() -> Result<Self, config::ConfigError> {
        let _ = dotenvy::dotenv();
        let path = std::env::var("COSTURA_CONFIG").ok();
        Self::load_from(path.as_deref())
    }

    pub fn load_from(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(true));
        }

        builder
            .add_source(
                config::Environment::with_prefix("COSTURA")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("server.cors_origins"),
            )
            .build()?
            .try_deserialize()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.auth.jwt_secret.trim().is_empty() {
            return Err("auth.jwt_secret must be set".to_string());
        }
        if self.auth.token_ttl_hours <= 0 {
            return Err("auth.token_ttl_hours must be positive".to_string());
        }
        if !(4..=31).contains(&self.auth.bcrypt_cost) {
            return Err("auth.bcrypt_cost must be between 4 and 31".to_string());
        }

        match self.database.backend {
            StorageBackend::Postgres => {
                if is_blank(&self.database.url) {
                    return Err("database.url is required for the postgres backend".to_string());
                }
                if self.database.pool_min_size > self.database.pool_max_size {
                    return Err(format!(
                        "database.pool_min_size ({}) exceeds pool_max_size ({})",
                        self.database.pool_min_size, self.database.pool_max_size
                    ));
                }
            }
            StorageBackend::Firestore => {
                if is_blank(&self.database.firestore_project_id) {
                    return Err(
                        "database.firestore_project_id is required for the firestore backend"
                            .to_string(),
                    );
                }
                if self.database.firestore_database_id.trim().is_empty() {
                    return Err("database.firestore_database_id must not be empty".to_string());
                }
            }
            StorageBackend::Memory => {}
        }

        if self.pagination.max_limit == 0 {
            return Err("pagination.max_limit must be greater than zero".to_string());
        }
        if self.pagination.default_limit == 0
            || self.pagination.default_limit > self.pagination.max_limit
        {
            return Err(format!(
                "pagination.default_limit must be between 1 and {}",
                self.pagination.max_limit
            ));
        }

        if self.sms.provider == SmsProviderKind::Twilio
            && (self.sms.account_sid.is_empty()
                || self.sms.auth_token.is_empty()
                || self.sms.service_sid.is_empty())
        {
            return Err(
                "sms.account_sid, sms.auth_token and sms.service_sid are required for twilio"
                    .to_string(),
            );
        }

        if self.payment.provider == PaymentProviderKind::Stripe
            && (self.payment.secret_key.is_empty() || self.payment.webhook_secret.is_empty())
        {
            return Err(
                "payment.secret_key and payment.webhook_secret are required for stripe"
                    .to_string(),
            );
        }
        for (key, value) in [
            ("sms.base_url", &self.sms.base_url),
            ("payment.base_url", &self.payment.base_url),
            ("payment.success_url", &self.payment.success_url),
            ("payment.cancel_url", &self.payment.cancel_url),
        ] {
            if let Err(e) = url::Url::parse(value) {
                return Err(format!("{key} is not a valid URL: {e}"));
            }
        }
        if self.payment.grace_period_days < 0 {
            return Err("payment.grace_period_days must not be negative".to_string());
        }

        Ok(())
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr = format!("{}:{}", self.server.host, self.server.port);
        addr.parse()
            .map_err(|e| anyhow::anyhow!("Invalid listen address {addr}: {e}"))
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map(str::trim).map_or(true, str::is_empty)
}
