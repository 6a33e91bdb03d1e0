use anyhow::{Context, Result};
use figment::{providers::{Env, Format, Serialized, Toml}, Figment};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use validator::Validate;

use crate::energy::{Assumptions, CostTable};

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";
pub const ENV_PREFIX: &str = "SOLAR__";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub assumptions: Assumptions,
    pub costs: CostTable,
    pub models: ModelsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub enable_cors: bool,
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            enable_cors: false,
            request_timeout_secs: 10,
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }
}

/// Paths of the pre-trained model artifacts; a missing path disables the
/// matching prediction endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelsConfig {
    pub solar_model_path: Option<PathBuf>,
    pub anomaly_model_path: Option<PathBuf>,
}

impl Config {
    /// Defaults, then `config/default.toml`, then `SOLAR__*` environment variables.
    pub fn load() -> Result<Self> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let _ = dotenvy::dotenv();
        let figment = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));
        let cfg: Config = figment.extract().context("invalid configuration")?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        self.assumptions
            .validate()
            .context("invalid [assumptions] section")?;
        self.costs.validate().context("invalid [costs] section")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_defaults_without_file() {
        Jail::expect_with(|_jail| {
            let cfg = Config::load_from("missing.toml").unwrap();
            assert_eq!(cfg.server.port, 8080);
            assert_eq!(cfg.assumptions.sun_hours, 5.0);
            assert_eq!(cfg.assumptions.tariff_per_kwh, 8.0);
            assert_eq!(cfg.assumptions.export_credit_per_kwh, 5.0);
            assert!(cfg.models.solar_model_path.is_none());
            Ok(())
        });
    }

    #[test]
    fn test_file_and_env_layering() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "solar.toml",
                r#"
                [server]
                port = 9000

                [assumptions]
                tariff_per_kwh = 10.5

                [models]
                solar_model_path = "models/solar.json"
                "#,
            )?;
            jail.set_env("SOLAR__SERVER__HOST", "0.0.0.0");
            jail.set_env("SOLAR__ASSUMPTIONS__SUN_HOURS", "4.5");

            let cfg = Config::load_from("solar.toml").unwrap();
            assert_eq!(cfg.server.port, 9000);
            assert_eq!(cfg.server.host, "0.0.0.0");
            assert_eq!(cfg.assumptions.tariff_per_kwh, 10.5);
            assert_eq!(cfg.assumptions.sun_hours, 4.5);
            // untouched keys keep their defaults
            assert_eq!(cfg.assumptions.days_per_month, 30.0);
            assert_eq!(
                cfg.models.solar_model_path,
                Some(PathBuf::from("models/solar.json"))
            );
            Ok(())
        });
    }

    #[test]
    fn test_rejects_invalid_assumptions() {
        Jail::expect_with(|jail| {
            jail.set_env("SOLAR__ASSUMPTIONS__SUN_HOURS", "0.0");
            let err = Config::load_from("missing.toml").unwrap_err();
            assert!(format!("{:#}", err).contains("assumptions"));
            Ok(())
        });
    }

    #[test]
    fn test_socket_addr() {
        let server = ServerConfig::default();
        assert_eq!(server.socket_addr().unwrap().port(), 8080);
    }
}
