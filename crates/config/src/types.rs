use crate::{ConfigError, VcapServices};
use std::{collections::HashMap, env};

/// Scopes requested from the identity provider during login
pub const DEFAULT_SCOPES: [&str; 3] = ["openid", "test.access", "test.admin"];

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub auth: AuthConfig,
    pub session: SessionConfig,
    pub backing_service: BackingServiceConfig,
}

impl ApiConfig {
    /// Load configuration from environment variables and bound services
    pub fn from_env() -> Result<Self, ConfigError> {
        let vcap = VcapServices::from_env()?;
        Ok(Self {
            server: ServerConfig::from_env()?,
            logging: LoggingConfig::from_env(),
            auth: AuthConfig::from_env(&vcap)?,
            session: SessionConfig::from_env()?,
            backing_service: BackingServiceConfig::from_env(),
        })
    }
}

fn env_lookup(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &str,
    default: T,
) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match lookup(var) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidVar {
            var: var.to_string(),
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    /// Load from environment variables. `PORT` (set by the platform) wins over `SERVER_PORT`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port_var = if lookup("PORT").is_some() {
            "PORT"
        } else {
            "SERVER_PORT"
        };
        Ok(Self {
            host: lookup("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_var(&lookup, port_var, 8080)?,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Logging Configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub modules: HashMap<String, String>,
}

impl LoggingConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        let mut modules = HashMap::new();

        // Load module-specific log levels
        if let Some(level) = env_lookup("LOG_MODULE_API") {
            modules.insert("api".to_string(), level);
        }
        if let Some(level) = env_lookup("LOG_MODULE_SERVICES") {
            modules.insert("services".to_string(), level);
        }

        Self {
            level: env_lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            format: env_lookup("LOG_FORMAT").unwrap_or_else(|| "pretty".to_string()),
            modules,
        }
    }

    /// Filter directive understood by `tracing_subscriber::EnvFilter`
    pub fn filter_directive(&self) -> String {
        let mut filter = self.level.clone();
        let mut modules: Vec<_> = self.modules.iter().collect();
        modules.sort();
        for (module, level) in modules {
            filter.push_str(&format!(",{module}={level}"));
        }
        filter
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        let mut modules = HashMap::new();
        modules.insert("api".to_string(), "debug".to_string());
        modules.insert("services".to_string(), "debug".to_string());

        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            modules,
        }
    }
}

/// OAuth client registration with the identity provider
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub client_id: String,
    pub client_secret: String,
    /// Base URL of the identity provider, without a trailing slash
    pub auth_domain: String,
    pub callback_url: String,
    /// Disables certificate verification toward the IdP and the backing service
    pub skip_tls_verify: bool,
    pub scopes: Vec<String>,
}

impl AuthConfig {
    /// Load from the bound SSO service, with direct environment overrides
    pub fn from_env(vcap: &VcapServices) -> Result<Self, ConfigError> {
        Self::from_lookup(vcap, env_lookup)
    }

    /// Every missing property is reported at once rather than failing on the first.
    pub fn from_lookup(
        vcap: &VcapServices,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let service = lookup("SSO_SERVICE_NAME").unwrap_or_else(|| "sso".to_string());
        let mut errors = Vec::new();

        let mut property = |var: &str, name: &str| -> String {
            if let Some(value) = lookup(var) {
                return value;
            }
            match vcap.service_property(&service, name) {
                Ok(value) => value,
                Err(e) => {
                    errors.push(e.to_string());
                    String::new()
                }
            }
        };

        let client_id = property("AUTH_CLIENT_ID", "client_id");
        let client_secret = property("AUTH_CLIENT_SECRET", "client_secret");
        let auth_domain = property("AUTH_DOMAIN", "auth_domain");

        let callback_url = lookup("AUTH_CALLBACK").unwrap_or_else(|| {
            errors.push("Could not retrieve callback url from environment (AUTH_CALLBACK)".into());
            String::new()
        });

        let skip_tls_verify = parse_var(&lookup, "AUTH_SKIP_SSL_VALIDATION", true)?;

        if !errors.is_empty() {
            return Err(ConfigError::Incomplete(errors));
        }

        Ok(Self {
            client_id,
            client_secret,
            auth_domain: auth_domain.trim_end_matches('/').to_string(),
            callback_url,
            skip_tls_verify,
            scopes: DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect(),
        })
    }

    pub fn authorize_endpoint(&self) -> String {
        format!("{}/oauth/authorize", self.auth_domain)
    }

    pub fn token_endpoint(&self) -> String {
        format!("{}/oauth/token", self.auth_domain)
    }

    pub fn userinfo_endpoint(&self) -> String {
        format!("{}/userinfo", self.auth_domain)
    }

    pub fn token_key_url(&self) -> String {
        format!("{}/token_key", self.auth_domain)
    }
}

/// Browser session settings
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub cookie_name: String,
    /// Idle lifetime of a session in seconds
    pub lifetime_secs: u64,
    pub cookie_secure: bool,
}

impl SessionConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            cookie_name: lookup("SESSION_COOKIE_NAME")
                .unwrap_or_else(|| "authcode_session".to_string()),
            lifetime_secs: parse_var(&lookup, "SESSION_LIFETIME_SECS", 3600)?,
            cookie_secure: parse_var(&lookup, "SESSION_COOKIE_SECURE", false)?,
        })
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "authcode_session".to_string(),
            lifetime_secs: 3600,
            cookie_secure: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BackingServiceConfig {
    pub url: String,
}

impl BackingServiceConfig {
    pub fn from_env() -> Self {
        Self {
            url: env_lookup("BACKING_SERVICE_URL").unwrap_or_else(|| {
                "https://oauth-backing-service.apps.pcf.local/api/hello".to_string()
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn sso_binding() -> VcapServices {
        VcapServices::parse(
            r#"{"p-identity":[{"name":"sso","credentials":{
                "client_id":"vcap-client",
                "client_secret":"vcap-secret",
                "auth_domain":"https://login.example.com/"
            }}]}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_auth_config_from_bound_service() {
        let config = AuthConfig::from_lookup(
            &sso_binding(),
            lookup_from(&[("AUTH_CALLBACK", "https://app.example.com/callback")]),
        )
        .unwrap();

        assert_eq!(config.client_id, "vcap-client");
        assert_eq!(config.client_secret, "vcap-secret");
        assert_eq!(config.auth_domain, "https://login.example.com");
        assert_eq!(config.callback_url, "https://app.example.com/callback");
        assert!(config.skip_tls_verify);
        assert_eq!(config.scopes, vec!["openid", "test.access", "test.admin"]);
        assert_eq!(
            config.token_key_url(),
            "https://login.example.com/token_key"
        );
        assert_eq!(
            config.token_endpoint(),
            "https://login.example.com/oauth/token"
        );
        assert_eq!(
            config.authorize_endpoint(),
            "https://login.example.com/oauth/authorize"
        );
        assert_eq!(config.userinfo_endpoint(), "https://login.example.com/userinfo");
    }

    #[test]
    fn test_env_overrides_bound_service() {
        let config = AuthConfig::from_lookup(
            &sso_binding(),
            lookup_from(&[
                ("AUTH_CALLBACK", "http://localhost:8080/callback"),
                ("AUTH_CLIENT_ID", "local-client"),
                ("AUTH_SKIP_SSL_VALIDATION", "false"),
            ]),
        )
        .unwrap();

        assert_eq!(config.client_id, "local-client");
        assert_eq!(config.client_secret, "vcap-secret");
        assert!(!config.skip_tls_verify);
    }

    #[test]
    fn test_custom_service_name() {
        let vcap = VcapServices::parse(
            r#"{"p-identity":[{"name":"my-sso","credentials":{
                "client_id":"a","client_secret":"b","auth_domain":"https://idp"
            }}]}"#,
        )
        .unwrap();
        let config = AuthConfig::from_lookup(
            &vcap,
            lookup_from(&[("SSO_SERVICE_NAME", "my-sso"), ("AUTH_CALLBACK", "cb")]),
        )
        .unwrap();
        assert_eq!(config.auth_domain, "https://idp");
    }

    #[test]
    fn test_all_missing_properties_are_reported() {
        let err = AuthConfig::from_lookup(&VcapServices::default(), lookup_from(&[])).unwrap_err();
        match err {
            ConfigError::Incomplete(errors) => {
                assert_eq!(errors.len(), 4);
                assert!(errors.iter().any(|e| e.contains("AUTH_CALLBACK")));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_invalid_skip_flag() {
        let err = AuthConfig::from_lookup(
            &sso_binding(),
            lookup_from(&[("AUTH_CALLBACK", "cb"), ("AUTH_SKIP_SSL_VALIDATION", "maybe")]),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidVar { var, .. } if var == "AUTH_SKIP_SSL_VALIDATION"));
    }

    #[test]
    fn test_server_port_precedence() {
        let config =
            ServerConfig::from_lookup(lookup_from(&[("PORT", "9000"), ("SERVER_PORT", "7000")]))
                .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.bind_address(), "0.0.0.0:9000");

        let config = ServerConfig::from_lookup(lookup_from(&[("SERVER_PORT", "7000")])).unwrap();
        assert_eq!(config.port, 7000);

        let config = ServerConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.port, 8080);

        assert!(ServerConfig::from_lookup(lookup_from(&[("PORT", "http")])).is_err());
    }

    #[test]
    fn test_session_defaults() {
        let config = SessionConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.cookie_name, "authcode_session");
        assert_eq!(config.lifetime_secs, 3600);
        assert!(!config.cookie_secure);
    }

    #[test]
    fn test_logging_filter_directive() {
        let mut config = LoggingConfig {
            level: "warn".to_string(),
            format: "compact".to_string(),
            modules: HashMap::new(),
        };
        assert_eq!(config.filter_directive(), "warn");

        config.modules.insert("services".to_string(), "trace".to_string());
        config.modules.insert("api".to_string(), "debug".to_string());
        assert_eq!(config.filter_directive(), "warn,api=debug,services=trace");
    }
}
