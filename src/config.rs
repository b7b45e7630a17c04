use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use serde::{Deserialize, Serialize};

/// Filesystem path whose volume the disk probe reports on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrimaryVolume(pub PathBuf);

impl Default for PrimaryVolume {
    fn default() -> Self {
        if cfg!(windows) {
            Self(PathBuf::from("C:\\"))
        } else {
            Self(PathBuf::from("/"))
        }
    }
}

impl PrimaryVolume {
    pub fn path(&self) -> &Path {
        &self.0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub http_addr: String,
    pub log_level: String,
    /// Length of the CPU usage sampling window.
    pub cpu_sample_window_ms: u64,
    /// Deadline for a single snapshot collection.
    pub request_timeout_secs: u64,
    pub primary_volume: PrimaryVolume,
    /// Header marking fragment (HTML partial) requests.
    pub fragment_header: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_addr: "127.0.0.1:9200".into(),
            log_level: "info".into(),
            cpu_sample_window_ms: 1000,
            request_timeout_secs: 5,
            primary_volume: PrimaryVolume::default(),
            fragment_header: "HX-Request".into(),
        }
    }
}

impl Config {
    pub fn path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("could not determine config directory")?;
        Ok(config_dir.join("sysara").join("config.yaml"))
    }

    pub fn cpu_sample_window(&self) -> Duration {
        Duration::from_millis(self.cpu_sample_window_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Load config from the default location (or `path`), layered under
/// `SYSARA_*` environment variables. A missing file yields defaults.
pub fn load(path: Option<&Path>) -> Result<Config> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => Config::path()?,
    };
    figment(&path)
        .extract()
        .with_context(|| format!("loading config from {}", path.display()))
}

fn figment(path: &Path) -> Figment {
    Figment::from(Serialized::defaults(Config::default()))
        .merge(Yaml::file(path))
        .merge(Env::prefixed("SYSARA_"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn defaults_when_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load(Some(&dir.path().join("absent.yaml"))).unwrap();
        assert_eq!(cfg.http_addr, "127.0.0.1:9200");
        assert_eq!(cfg.cpu_sample_window(), Duration::from_secs(1));
        assert_eq!(cfg.fragment_header, "HX-Request");
        assert_eq!(cfg.primary_volume, PrimaryVolume::default());
    }

    #[test]
    fn yaml_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(
            &path,
            "http_addr: 0.0.0.0:8080\ncpu_sample_window_ms: 250\nprimary_volume: /data\n",
        )
        .unwrap();

        let cfg = load(Some(&path)).unwrap();
        assert_eq!(cfg.http_addr, "0.0.0.0:8080");
        assert_eq!(cfg.cpu_sample_window(), Duration::from_millis(250));
        assert_eq!(cfg.primary_volume.path(), Path::new("/data"));
        assert_eq!(cfg.fragment_header, "HX-Request");
    }

    #[test]
    fn env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file("config.yaml", "log_level: debug\nrequest_timeout_secs: 9\n")?;
            jail.set_env("SYSARA_LOG_LEVEL", "trace");

            let cfg: Config = figment(Path::new("config.yaml")).extract()?;
            assert_eq!(cfg.log_level, "trace");
            assert_eq!(cfg.request_timeout(), Duration::from_secs(9));
            Ok(())
        });
    }
}
