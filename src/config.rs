use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

/// Runtime configuration, layered as defaults -> `config.toml` -> `WORKSHOP_*` env vars.
///
/// Nested keys use `__` in the environment, e.g. `WORKSHOP_DATABASE__URL`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub basic: BasicConfig,
    pub database: DatabaseConfig,
    pub export: ExportConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BasicConfig {
    pub listen_addr: String,
    pub loglevel: String,
    pub body_limit_mb: usize,
}

impl Default for BasicConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:9000".to_string(),
            loglevel: "info".to_string(),
            body_limit_mb: 16,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub busy_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:alsami.db".to_string(),
            max_connections: 8,
            busy_timeout_secs: 5,
        }
    }
}

/// Defaults and styling knobs for the spreadsheet export.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ExportConfig {
    pub default_filename: String,
    pub default_sheet: String,
    pub column_width: f64,
    pub font_name: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            default_filename: "alsami.xlsx".to_string(),
            default_sheet: "تقرير".to_string(),
            column_width: 22.0,
            font_name: "Tajawal".to_string(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, figment::Error> {
        Self::figment().extract()
    }

    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file("config.toml"))
            .merge(Env::prefixed("WORKSHOP_").split("__"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn env_overrides_nested_keys() {
        Jail::expect_with(|jail| {
            jail.set_env("WORKSHOP_DATABASE__URL", "sqlite:/tmp/other.db");
            jail.set_env("WORKSHOP_EXPORT__COLUMN_WIDTH", "30");
            let cfg = Config::load()?;
            assert_eq!(cfg.database.url, "sqlite:/tmp/other.db");
            assert_eq!(cfg.export.column_width, 30.0);
            assert_eq!(cfg.basic.listen_addr, "0.0.0.0:9000");
            Ok(())
        });
    }

    #[test]
    fn toml_file_is_merged_under_env() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                [basic]
                loglevel = "debug"

                [export]
                font_name = "Arial"
                "#,
            )?;
            jail.set_env("WORKSHOP_BASIC__LOGLEVEL", "warn");
            let cfg = Config::load()?;
            assert_eq!(cfg.basic.loglevel, "warn");
            assert_eq!(cfg.export.font_name, "Arial");
            assert_eq!(cfg.export.default_sheet, "تقرير");
            Ok(())
        });
    }
}
