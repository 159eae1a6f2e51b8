use std::{
    env, fs,
    path::{Path, PathBuf},
};

use {
    anyhow::{bail, Context},
    serde::Deserialize,
};

use super::Schema;
use crate::{
    selector::{LinkMode, UrlTemplates},
    RepertoireError,
};

// A struct that represents our `repertoire.yml` config file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub sheet_id: Option<String>,
    pub sheet_name: Option<String>,
    pub file: Option<PathBuf>,
    pub timeout_secs: Option<u64>,
    pub locale: Option<String>,
    pub batch_size: Option<usize>,
    pub link_mode: Option<LinkMode>,
    pub urls: Option<UrlTemplates>,
    pub schema: Option<Schema>,
}

impl FileConfig {
    pub fn find() -> Result<PathBuf, RepertoireError> {
        let mut paths = vec![];

        if let Ok(xdg_config_home) = env::var("XDG_CONFIG_HOME") {
            let xdg_config_home = PathBuf::from(xdg_config_home);
            paths.push(xdg_config_home.join("repertoire").join("repertoire.yml"));
            paths.push(xdg_config_home.join("repertoire.yml"));
        }

        if let Ok(home_dir) = env::var("HOME") {
            let home_dir = PathBuf::from(home_dir);
            paths.push(
                home_dir
                    .join(".config")
                    .join("repertoire")
                    .join("repertoire.yml"),
            );
            paths.push(home_dir.join(".repertoire.yml"));
        }

        for path in paths {
            if path.exists() {
                return Ok(path);
            }
        }

        bail!("Config file not found!")
    }

    pub fn load(path: &Path) -> Result<Self, RepertoireError> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("could not read config file '{}'", path.display()))?;

        if contents.trim().is_empty() {
            return Ok(Self::default());
        }

        let file_config = serde_yaml::from_str(&contents)
            .with_context(|| format!("malformed config file '{}'", path.display()))?;

        Ok(file_config)
    }

    // The explicit file if given, else the first config file found, else defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, RepertoireError> {
        match explicit {
            Some(path) => Self::load(path),
            None => match Self::find() {
                Ok(path) => Self::load(&path),
                Err(_) => Ok(Self::default()),
            },
        }
    }

    pub fn expanded_file(&self) -> Option<PathBuf> {
        self.file.as_ref().map(|p| expand_home(p))
    }
}

pub fn expand_home(path: &Path) -> PathBuf {
    let path_str = path.to_string_lossy();
    if let Some(rest) = path_str.strip_prefix("~/") {
        if let Ok(home) = env::var("HOME") {
            return Path::new(&home).join(rest);
        }
    }
    path.to_path_buf()
}
