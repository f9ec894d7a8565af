use config::ConfigError;

#[derive(serde::Deserialize, Clone)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub application: ApplicationSettings,
    pub auth: AuthSettings,
}

#[derive(serde::Deserialize, Clone)]
pub struct ApplicationSettings {
    pub port: u16,
}

#[derive(serde::Deserialize, Clone)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: String,
    pub port: u16,
    pub host: String,
    pub database_name: String,
}

impl DatabaseSettings {
    pub fn connection_string(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database_name
        )
    }

    pub fn connection_string_without_db(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}",
            self.username, self.password, self.host, self.port
        )
    }
}

/// Authentication settings
///
/// `access_secret` must be non-empty; `main` refuses to start otherwise.
#[derive(serde::Deserialize, Clone)]
pub struct AuthSettings {
    pub access_secret: String,
    pub access_token_expiry: i64, // seconds (e.g., 900 for 15 minutes)
    pub refresh_token_expiry_days: i64,
    pub cookie_name: String,
    pub cookie_secure: bool,
    pub cookie_same_site: String, // "lax" | "strict" | "none"
}

impl AuthSettings {
    /// Check the settings a running server cannot do without.
    pub fn validate(&self) -> Result<(), crate::error::ConfigError> {
        if self.access_secret.is_empty() {
            return Err(crate::error::ConfigError::MissingRequired(
                "auth.access_secret".to_string(),
            ));
        }
        if !matches!(self.cookie_same_site.as_str(), "lax" | "strict" | "none") {
            return Err(crate::error::ConfigError::InvalidValue(format!(
                "auth.cookie_same_site must be lax, strict, or none (got {:?})",
                self.cookie_same_site
            )));
        }
        Ok(())
    }
}

pub fn get_configuration() -> Result<Settings, ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("configuration").required(false))
        .add_source(config::Environment::with_prefix("APP").separator("__"))
        .build()?;
    settings.try_deserialize::<Settings>()
}
