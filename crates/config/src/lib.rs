//! Layered configuration for ruidex.
//!
//! Layers, lowest priority first: built-in defaults, `ruidex.toml` in the
//! platform config directory, an explicit config file, then `RUIDEX_*`
//! environment variables.

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "ruidex.toml";
pub const ENV_PREFIX: &str = "RUIDEX_";
pub const DEFAULT_THUMBNAIL_SIZE: u32 = 128;
const TABLES_DIR_NAME: &str = "tables";

/// What to do when an output file already exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    #[default]
    Skip,
    Overwrite,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Root of the external client cache tree.
    pub cache_root: PathBuf,
    /// Root of the image, audio and thumbnail output tree.
    pub output_root: PathBuf,
    /// Directory for intermediate tables.
    pub work_dir: PathBuf,
    /// Catalog CSV.
    pub catalog: PathBuf,
    /// Directory for the final tables; `<work_dir>/tables` when unset.
    pub tables_dir: Option<PathBuf>,
    /// SQLite file the final tables are also loaded into.
    pub database: Option<PathBuf>,
    pub workers: usize,
    pub mode: OutputMode,
    /// Longest thumbnail edge in pixels.
    pub thumbnail_size: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_root: PathBuf::from("cache"),
            output_root: PathBuf::from("output"),
            work_dir: PathBuf::from("work"),
            catalog: PathBuf::from("catalog.csv"),
            tables_dir: None,
            database: None,
            workers: default_workers(),
            mode: OutputMode::default(),
            thumbnail_size: DEFAULT_THUMBNAIL_SIZE,
        }
    }
}

/// Half the logical cores, at least one.
pub fn default_workers() -> usize {
    std::thread::available_parallelism().map(|n| n.get() / 2).unwrap_or(1).max(1)
}

/// `ruidex.toml` in the platform config directory, if there is one.
pub fn user_config_file() -> Option<PathBuf> {
    ProjectDirs::from("", "", "ruidex").map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

impl Config {
    /// Load every layer and validate the result.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        Self::from_figment(Self::figment(user_config_file().as_deref(), explicit)?)
    }

    /// Build the layered figment without extracting it.
    ///
    /// A missing user file is ignored; a missing explicit file is an error.
    pub fn figment(user: Option<&Path>, explicit: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(user) = user {
            tracing::debug!(path = %user.display(), "user config layer");
            figment = figment.merge(Toml::file(user));
        }
        if let Some(explicit) = explicit {
            if !explicit.is_file() {
                exn::bail!(ErrorKind::NotFound(explicit.to_path_buf()));
            }
            figment = match extension(explicit).as_deref() {
                Some("toml") => figment.merge(Toml::file(explicit)),
                Some("yaml" | "yml") => figment.merge(Yaml::file(explicit)),
                Some("json") => figment.merge(Json::file(explicit)),
                _ => exn::bail!(ErrorKind::UnsupportedFormat(explicit.to_path_buf())),
            };
        }
        Ok(figment.merge(Env::prefixed(ENV_PREFIX)))
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: Self = figment.extract().or_raise(|| ErrorKind::Extract)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            exn::bail!(ErrorKind::Invalid("workers must be at least 1"));
        }
        if self.thumbnail_size == 0 {
            exn::bail!(ErrorKind::Invalid("thumbnail_size must be at least 1"));
        }
        Ok(())
    }

    pub fn tables_dir(&self) -> PathBuf {
        self.tables_dir.clone().unwrap_or_else(|| self.work_dir.join(TABLES_DIR_NAME))
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase)
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use rstest::rstest;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        config.validate().unwrap();
        assert!(config.workers >= 1);
        assert_eq!(config.mode, OutputMode::Skip);
        assert_eq!(config.tables_dir(), PathBuf::from("work/tables"));
    }

    #[rstest]
    #[case("ruidex.toml", "workers = 3\nmode = \"overwrite\"\n")]
    #[case("ruidex.yaml", "workers: 3\nmode: overwrite\n")]
    #[case("ruidex.YML", "workers: 3\nmode: overwrite\n")]
    #[case("ruidex.json", r#"{"workers": 3, "mode": "overwrite"}"#)]
    fn explicit_file_by_extension(#[case] name: &str, #[case] contents: &str) {
        Jail::expect_with(|jail| {
            jail.create_file(name, contents)?;
            let config = Config::from_figment(Config::figment(None, Some(Path::new(name))).unwrap()).unwrap();
            assert_eq!(config.workers, 3);
            assert_eq!(config.mode, OutputMode::Overwrite);
            Ok(())
        });
    }

    #[test]
    fn layers_override_in_order() {
        Jail::expect_with(|jail| {
            jail.create_file("user.toml", "workers = 2\nthumbnail_size = 64\ncatalog = \"user.csv\"\n")?;
            jail.create_file("explicit.toml", "workers = 5\n")?;
            jail.set_env("RUIDEX_THUMBNAIL_SIZE", "256");
            let figment = Config::figment(Some(Path::new("user.toml")), Some(Path::new("explicit.toml"))).unwrap();
            let config = Config::from_figment(figment).unwrap();
            assert_eq!(config.catalog, PathBuf::from("user.csv"));
            assert_eq!(config.workers, 5);
            assert_eq!(config.thumbnail_size, 256);
            Ok(())
        });
    }

    #[test]
    fn missing_user_file_is_ignored() {
        Jail::expect_with(|_| {
            let config = Config::from_figment(Config::figment(Some(Path::new("absent.toml")), None).unwrap()).unwrap();
            assert_eq!(config.thumbnail_size, DEFAULT_THUMBNAIL_SIZE);
            Ok(())
        });
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("absent.toml");
        let err = Config::figment(None, Some(&path)).unwrap_err();
        assert_eq!(*err, ErrorKind::NotFound(path));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("ruidex.ini");
        std::fs::write(&path, "workers = 1").unwrap();
        let err = Config::figment(None, Some(&path)).unwrap_err();
        assert_eq!(*err, ErrorKind::UnsupportedFormat(path));
    }

    #[rstest]
    #[case("RUIDEX_WORKERS", "0")]
    #[case("RUIDEX_THUMBNAIL_SIZE", "0")]
    fn rejects_zero(#[case] key: &str, #[case] value: &str) {
        Jail::expect_with(|jail| {
            jail.set_env(key, value);
            let err = Config::from_figment(Config::figment(None, None).unwrap()).unwrap_err();
            assert!(matches!(&*err, ErrorKind::Invalid(_)));
            Ok(())
        });
    }

    #[test]
    fn explicit_tables_dir_wins() {
        Jail::expect_with(|jail| {
            jail.set_env("RUIDEX_TABLES_DIR", "/srv/tables");
            jail.set_env("RUIDEX_DATABASE", "index.sqlite");
            let config = Config::from_figment(Config::figment(None, None).unwrap()).unwrap();
            assert_eq!(config.tables_dir(), PathBuf::from("/srv/tables"));
            assert_eq!(config.database, Some(PathBuf::from("index.sqlite")));
            Ok(())
        });
    }

    #[test]
    fn malformed_value_fails_extraction() {
        Jail::expect_with(|jail| {
            jail.set_env("RUIDEX_MODE", "sometimes");
            let err = Config::from_figment(Config::figment(None, None).unwrap()).unwrap_err();
            assert_eq!(*err, ErrorKind::Extract);
            Ok(())
        });
    }
}
