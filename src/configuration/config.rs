#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

use std::env;
use std::path;

use anyhow::bail;
use anyhow::Result;
use clap::ArgMatches;
use clap::Command;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use strum::EnumIter;
use strum::EnumVariantNames;
use strum::IntoEnumIterator;
use tokio::fs;

static CONFIG: Lazy<DashMap<String, String>> = Lazy::new(DashMap::new);

#[derive(Clone, Copy, Debug, Eq, PartialEq, EnumIter, EnumVariantNames, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum ConfigKey {
    #[strum(serialize = "backend-url")]
    BackendURL,
    BackendTimeout,
    DownloadDir,
    ConfigFile,
}

pub struct Config {}

fn cache_dir() -> path::PathBuf {
    #[cfg(not(target_os = "macos"))]
    let dir = dirs::cache_dir().unwrap_or_else(|| return path::PathBuf::from("."));
    #[cfg(target_os = "macos")]
    let dir = env::var("HOME")
        .map(|home| return path::PathBuf::from(home).join(".config"))
        .unwrap_or_else(|_| return path::PathBuf::from("."));

    return dir.join("redline");
}

fn validate(key: ConfigKey, val: &str) -> Result<()> {
    if key == ConfigKey::BackendTimeout && val.parse::<u64>().is_err() {
        bail!(format!(
            "Invalid value for '{key}': {val}\nExpected a number of milliseconds"
        ));
    }

    return Ok(());
}

impl Config {
    pub fn get(key: ConfigKey) -> String {
        if let Some(val) = CONFIG.get(&key.to_string()) {
            return val.to_string();
        }

        return "".to_string();
    }

    pub fn set(key: ConfigKey, value: &str) {
        CONFIG.insert(key.to_string(), value.to_string());
    }

    pub fn default(key: ConfigKey) -> String {
        let config_path = cache_dir().join("config.toml");

        let res = match key {
            ConfigKey::BackendURL => "http://localhost:8000".to_string(),
            ConfigKey::BackendTimeout => "30000".to_string(),
            ConfigKey::DownloadDir => ".".to_string(),

            // Special
            ConfigKey::ConfigFile => config_path.to_string_lossy().to_string(),
        };

        return res;
    }

    /// Directory debug logs are written to.
    pub fn log_dir() -> path::PathBuf {
        if let Ok(dir) = env::var("REDLINE_LOG_DIR") {
            if !dir.is_empty() {
                return path::PathBuf::from(dir);
            }
        }

        return cache_dir();
    }

    pub async fn load(clap_arg_matches: Vec<&ArgMatches>) -> Result<()> {
        for key in ConfigKey::iter() {
            Config::set(key, &Config::default(key))
        }

        let mut config_file = Config::default(ConfigKey::ConfigFile);
        for matches in clap_arg_matches.as_slice() {
            if let Some(arg_config_file) =
                matches.get_one::<String>(&ConfigKey::ConfigFile.to_string())
            {
                config_file = arg_config_file.to_string();
            }
        }

        let config_path = path::PathBuf::from(&config_file);
        if config_path.exists() {
            let toml_str = fs::read_to_string(config_path).await?;
            let doc = toml_str.parse::<toml_edit::Document>()?;

            for key in ConfigKey::iter() {
                if key == ConfigKey::ConfigFile {
                    continue;
                }

                if let Some(val) = doc.get(&key.to_string()) {
                    if let Some(val_int) = val.as_integer() {
                        let val_str = val_int.to_string();
                        validate(key, &val_str).map_err(|err| {
                            return anyhow::anyhow!("{config_file}: {err}");
                        })?;
                        Config::set(key, &val_str);
                    } else if let Some(val_str) = val.as_str() {
                        if val_str.is_empty() {
                            continue;
                        }
                        validate(key, val_str).map_err(|err| {
                            return anyhow::anyhow!("{config_file}: {err}");
                        })?;
                        Config::set(key, val_str);
                    } else {
                        bail!(format!("{config_file} has an invalid value for key '{key}'"));
                    }
                }
            }
        }

        for key in ConfigKey::iter() {
            for matches in clap_arg_matches.as_slice() {
                if let Ok(Some(val)) = matches.try_get_one::<String>(&key.to_string()) {
                    if val.is_empty() {
                        continue;
                    }
                    validate(key, val)?;
                    Config::set(key, val)
                }
            }
        }

        tracing::debug!(
            backend_url = Config::get(ConfigKey::BackendURL),
            backend_timeout = Config::get(ConfigKey::BackendTimeout),
            download_dir = Config::get(ConfigKey::DownloadDir),
            config_file = Config::get(ConfigKey::ConfigFile),
            "config"
        );

        return Ok(());
    }

    pub fn serialize_default(cmd: Command) -> String {
        let toml_str = ConfigKey::iter()
            .filter_map(|key| {
                if key == ConfigKey::ConfigFile {
                    return None;
                }

                let description = cmd
                    .get_arguments()
                    .find(|e| return e.get_long() == Some(key.to_string().as_str()))
                    .and_then(|arg| return arg.get_help())
                    .map(|help| {
                        return help
                            .to_string()
                            .split("[default:")
                            .next()
                            .unwrap_or_default()
                            .trim()
                            .to_string();
                    })
                    .unwrap_or_default();

                let mut val = Config::default(key);
                if val.is_empty() {
                    val = format!("# {key} = \"\"");
                } else if val.parse::<u64>().is_ok() {
                    val = format!("{key} = {val}");
                } else {
                    val = format!("{key} = \"{val}\"");
                }

                return Some(format!("# {description}\n{val}"));
            })
            .collect::<Vec<String>>()
            .join("\n\n");

        return toml_str;
    }
}
