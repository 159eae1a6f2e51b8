use std::{
    collections::{BTreeMap, HashMap},
    env, fmt, fs, io,
    path::PathBuf,
    str::FromStr,
};

use {
    anyhow::{bail, Context},
    tracing::debug,
};

use crate::RepertoireError;

pub const THEME_KEY: &str = "theme";
pub const FONT_SIZE_KEY: &str = "fontSize";
pub const DEFAULT_FONT_SIZE: u16 = 16;
const FONT_SIZE_RANGE: (u16, u16) = (8, 48);

// The collaborator persisting user display preferences.
pub trait PreferenceStore {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), RepertoireError>;
}

#[derive(Debug, Default)]
pub struct MemoryPreferences {
    values: HashMap<String, String>,
}

impl PreferenceStore for MemoryPreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), RepertoireError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

// Preferences kept in a YAML file and written back on every change.
#[derive(Debug)]
pub struct FilePreferences {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FilePreferences {
    // A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, RepertoireError> {
        let path = path.into();

        let values = match fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => BTreeMap::new(),
            Ok(text) => serde_yaml::from_str(&text)
                .with_context(|| format!("malformed preferences in '{}'", path.display()))?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("could not read preferences '{}'", path.display()))
            }
        };

        Ok(Self { path, values })
    }

    // `$XDG_CONFIG_HOME/repertoire/prefs.yml`, else `~/.config/repertoire/prefs.yml`.
    pub fn default_path() -> Result<PathBuf, RepertoireError> {
        let config_dir = match env::var("XDG_CONFIG_HOME") {
            Ok(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => PathBuf::from(env::var("HOME").context("HOME is not set")?).join(".config"),
        };

        Ok(config_dir.join("repertoire").join("prefs.yml"))
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl PreferenceStore for FilePreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), RepertoireError> {
        self.values.insert(key.to_string(), value.to_string());

        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(&self.path, serde_yaml::to_string(&self.values)?)
            .with_context(|| format!("could not write '{}'", self.path.display()))?;

        debug!(key, value, path = %self.path.display(), "saved preference");
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Theme::Light => f.write_str("light"),
            Theme::Dark => f.write_str("dark"),
        }
    }
}

impl FromStr for Theme {
    type Err = RepertoireError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => bail!("unknown theme '{other}', expected 'light' or 'dark'"),
        }
    }
}

// The preferences read once when the front end starts.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct DisplayPrefs {
    pub theme: Theme,
    // Unset until the user changes it.
    pub font_size: Option<u16>,
}

impl DisplayPrefs {
    // Unreadable values fall back to the defaults.
    pub fn load(store: &dyn PreferenceStore) -> Self {
        Self {
            theme: store
                .get(THEME_KEY)
                .and_then(|v| v.parse().ok())
                .unwrap_or_default(),
            font_size: store
                .get(FONT_SIZE_KEY)
                .and_then(|v| v.trim().parse().ok()),
        }
    }

    pub fn set_theme(
        &mut self,
        store: &mut dyn PreferenceStore,
        theme: Theme,
    ) -> Result<(), RepertoireError> {
        store.set(THEME_KEY, &theme.to_string())?;
        self.theme = theme;
        Ok(())
    }

    pub fn toggle_theme(&mut self, store: &mut dyn PreferenceStore) -> Result<Theme, RepertoireError> {
        self.set_theme(store, self.theme.toggled())?;
        Ok(self.theme)
    }

    // Steps the font size from its current value, within 8..=48.
    pub fn step_font_size(
        &mut self,
        store: &mut dyn PreferenceStore,
        delta: i32,
    ) -> Result<u16, RepertoireError> {
        let current = i32::from(self.font_size.unwrap_or(DEFAULT_FONT_SIZE));
        let (min, max) = FONT_SIZE_RANGE;
        let size = (current + delta).clamp(i32::from(min), i32::from(max)) as u16;

        store.set(FONT_SIZE_KEY, &size.to_string())?;
        self.font_size = Some(size);
        Ok(size)
    }
}
