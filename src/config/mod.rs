// Configuration module entry point
// Loads the gateway configuration once at startup; it is immutable afterwards

mod state;
mod types;
mod upstream;

use std::net::{SocketAddr, ToSocketAddrs};

use crate::error::GatewayError;

// Re-export public types
pub use state::GatewayState;
pub use types::{
    default_rewrite_rules, Config, LoggingConfig, PerformanceConfig, ProxyConfig, RewriteRule,
    ServerConfig, StaticConfig,
};
pub use upstream::Upstream;

/// Environment variables `DEVGATE__<SECTION>__<KEY>` override file values
const ENV_PREFIX: &str = "DEVGATE";

type Builder = config::ConfigBuilder<config::builder::DefaultState>;

impl Config {
    /// Load configuration from specified file path (extension optional)
    ///
    /// A missing file is not an error: defaults, `DEVGATE__*` variables and
    /// `PORT` still apply. The result is not validated, so command-line
    /// overrides can still replace a bad value; call [`Config::validate`].
    pub fn load_from(config_path: &str) -> Result<Self, GatewayError> {
        let settings = with_defaults(config::Config::builder())?
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("server.port", std::env::var("PORT").ok())?
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Build configuration from TOML text on top of the defaults (unvalidated)
    pub fn from_toml(contents: &str) -> Result<Self, GatewayError> {
        let settings = with_defaults(config::Config::builder())?
            .add_source(config::File::from_str(contents, config::FileFormat::Toml))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Check invariants that deserialization alone cannot express
    pub fn validate(&self) -> Result<(), GatewayError> {
        Upstream::parse(&self.proxy.upstream)?;

        if self.static_files.default_document.is_empty()
            || self.static_files.default_document.contains('/')
        {
            return Err(GatewayError::Config(format!(
                "invalid default document '{}'",
                self.static_files.default_document
            )));
        }

        if let Some(rule) = self
            .proxy
            .rewrite
            .iter()
            .find(|rule| !rule.prefix.starts_with('/'))
        {
            return Err(GatewayError::Config(format!(
                "rewrite prefix '{}' must start with '/'",
                rule.prefix
            )));
        }

        if self.proxy.relay_buffer == 0 {
            return Err(GatewayError::Config(
                "proxy.relay_buffer must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, GatewayError> {
        (self.server.host.as_str(), self.server.port)
            .to_socket_addrs()
            .map_err(|e| GatewayError::Config(format!("Invalid address: {e}")))?
            .next()
            .ok_or_else(|| {
                GatewayError::Config(format!(
                    "Address {}:{} did not resolve",
                    self.server.host, self.server.port
                ))
            })
    }

    /// Render the effective configuration as TOML
    pub fn to_toml(&self) -> Result<String, GatewayError> {
        toml::to_string_pretty(self).map_err(|e| GatewayError::Config(e.to_string()))
    }
}

fn with_defaults(builder: Builder) -> Result<Builder, config::ConfigError> {
    builder
        .set_default("server.host", "127.0.0.1")?
        .set_default("server.port", 3000)?
        .set_default("server.shutdown_grace_period", 10)?
        .set_default("static.root", ".")?
        .set_default("static.default_document", "index.html")?
        .set_default("static.serve_dotfiles", false)?
        .set_default("static.max_age", 0)?
        .set_default("proxy.upstream", "http://localhost:3001")?
        .set_default("proxy.change_origin", true)?
        .set_default("proxy.xfwd", false)?
        .set_default("proxy.rewrite_location", false)?
        .set_default("proxy.relay_buffer", 16)?
        .set_default("logging.level", "info")?
        .set_default("logging.access_log", true)?
        .set_default("logging.access_log_format", "combined")?
        .set_default("performance.keep_alive", true)?
        .set_default("performance.header_read_timeout", 30)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let cfg = Config::from_toml("").unwrap();
        assert_eq!(cfg.server.port, 3000);
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.static_files.default_document, "index.html");
        assert_eq!(cfg.static_files.root, std::path::PathBuf::from("."));
        assert!(!cfg.static_files.serve_dotfiles);
        assert_eq!(cfg.proxy.upstream, "http://localhost:3001");
        assert!(cfg.proxy.change_origin);
        assert_eq!(cfg.proxy.timeout, None);
        assert_eq!(cfg.proxy.rewrite, vec![RewriteRule::new("/api", "")]);
    }

    #[test]
    fn test_rewrite_table_from_toml() {
        let cfg = Config::from_toml(
            r#"
            [proxy]
            upstream = "http://127.0.0.1:9000"
            timeout = 5

            [[proxy.rewrite]]
            prefix = "/api/v1"
            replacement = "/v1"

            [[proxy.rewrite]]
            prefix = "/api"
            "#,
        )
        .unwrap();

        assert_eq!(cfg.proxy.upstream, "http://127.0.0.1:9000");
        assert_eq!(cfg.proxy.timeout, Some(5));
        assert_eq!(
            cfg.proxy.rewrite,
            vec![RewriteRule::new("/api/v1", "/v1"), RewriteRule::new("/api", "")]
        );
    }

    #[test]
    fn test_empty_rewrite_table() {
        let cfg = Config::from_toml("[proxy]\nrewrite = []\n").unwrap();
        assert!(cfg.proxy.rewrite.is_empty());
    }

    #[test]
    fn test_rejects_https_upstream() {
        let cfg = Config::from_toml("[proxy]\nupstream = \"https://example.com\"\n").unwrap();
        let err = cfg.validate().unwrap_err();
        assert!(matches!(err, GatewayError::Config(_)));
    }

    #[test]
    fn test_rejects_relative_rewrite_prefix() {
        let cfg = Config::from_toml("[[proxy.rewrite]]\nprefix = \"api\"\n").unwrap();
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("must start with '/'"));
    }

    #[test]
    fn test_rejects_nested_default_document() {
        let cfg = Config::from_toml("[static]\ndefault_document = \"a/index.html\"\n").unwrap();
        let err = cfg.validate().unwrap_err();
        assert!(matches!(err, GatewayError::Config(_)));
    }

    #[test]
    fn test_override_replaces_invalid_loaded_value() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("devgate.toml");
        std::fs::write(&path, "[proxy]\nupstream = \"ftp://nowhere\"\n").unwrap();

        let stem = dir.path().join("devgate");
        let mut cfg = Config::load_from(stem.to_str().unwrap()).unwrap();
        assert!(cfg.validate().is_err());

        cfg.proxy.upstream = "http://127.0.0.1:4000".to_string();
        cfg.validate().unwrap();
    }

    #[test]
    fn test_load_from_file_without_extension() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("devgate.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "[static]\nroot = \"public\"\nmax_age = 60").unwrap();

        let stem = dir.path().join("devgate");
        let cfg = Config::load_from(stem.to_str().unwrap()).unwrap();
        assert_eq!(cfg.static_files.root, std::path::PathBuf::from("public"));
        assert_eq!(cfg.static_files.max_age, 60);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let stem = dir.path().join("absent");
        let cfg = Config::load_from(stem.to_str().unwrap()).unwrap();
        assert_eq!(cfg.static_files.default_document, "index.html");
    }

    #[test]
    fn test_socket_addr_resolves_localhost() {
        let mut cfg = Config::from_toml("").unwrap();
        cfg.server.host = "localhost".to_string();
        cfg.server.port = 0;
        assert!(cfg.get_socket_addr().unwrap().ip().is_loopback());
    }

    #[test]
    fn test_to_toml_roundtrips_through_loader() {
        let cfg = Config::from_toml("[proxy]\ncookie_domain = \"\"\n").unwrap();
        let text = cfg.to_toml().unwrap();
        let again = Config::from_toml(&text).unwrap();
        assert_eq!(again.proxy.cookie_domain.as_deref(), Some(""));
        assert_eq!(again.proxy.rewrite, cfg.proxy.rewrite);
    }
}
