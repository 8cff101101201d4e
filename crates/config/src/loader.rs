//! Layered settings loader

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};

use crate::error::{ConfigError, ConfigResult};
use crate::settings::Settings;
use crate::source::ConfigSource;

/// Prefix of environment variables merged into [`Settings`].
pub const ENV_PREFIX: &str = "WEAVE_";

/// Settings together with the layers they were merged from.
#[derive(Debug, Clone)]
pub struct LoadedSettings {
    /// Merged and validated settings.
    pub settings: Settings,
    /// Contributing layers, lowest precedence first.
    pub sources: Vec<ConfigSource>,
}

/// Loads [`Settings`] as defaults, then an optional TOML file, then
/// `WEAVE_*` environment variables (`__` separates nesting levels).
///
/// `WEAVE_LOG` and `WEAVE_LOG_FORMAT` are shorthands for
/// `WEAVE_LOG__LEVEL` and `WEAVE_LOG__FORMAT`.
///
/// ```no_run
/// use weave_config::SettingsLoader;
///
/// let loaded = SettingsLoader::new().with_file("weave.toml").load()?;
/// println!("binding {}", loaded.settings.server.bind);
/// # Ok::<(), weave_config::ConfigError>(())
/// ```
#[derive(Debug, Clone)]
pub struct SettingsLoader {
    file: Option<PathBuf>,
}

impl Default for SettingsLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsLoader {
    /// Defaults plus `WEAVE_*` environment.
    pub fn new() -> Self {
        Self { file: None }
    }

    /// Merge `path` between defaults and environment. The file must exist.
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// Like [`with_file`](Self::with_file) but accepts `None`.
    pub fn with_optional_file(mut self, path: Option<impl Into<PathBuf>>) -> Self {
        self.file = path.map(Into::into);
        self
    }

    /// The merged provider stack.
    pub fn figment(&self) -> ConfigResult<(Figment, Vec<ConfigSource>)> {
        let mut sources = vec![ConfigSource::Default];
        let mut figment = Figment::from(Serialized::defaults(Settings::default()));

        if let Some(path) = &self.file {
            ensure_exists(path)?;
            figment = figment.merge(Toml::file(path));
            sources.push(ConfigSource::File(path.clone()));
        }

        figment = figment.merge(
            Env::prefixed(ENV_PREFIX)
                .map(|key| {
                    let key = key.as_str();
                    if key.eq_ignore_ascii_case("log") {
                        "log.level".into()
                    } else if key.eq_ignore_ascii_case("log_format") {
                        "log.format".into()
                    } else {
                        key.into()
                    }
                })
                .split("__"),
        );
        sources.push(ConfigSource::EnvWithPrefix(ENV_PREFIX.to_owned()));

        Ok((figment, sources))
    }

    /// Merge, deserialize and validate.
    pub fn load(&self) -> ConfigResult<LoadedSettings> {
        let (figment, sources) = self.figment()?;
        let settings: Settings = figment.extract()?;
        settings.validate()?;

        tracing::debug!(
            sources = %sources.iter().map(ToString::to_string).collect::<Vec<_>>().join(", "),
            "settings loaded"
        );
        Ok(LoadedSettings { settings, sources })
    }
}

impl Settings {
    /// Load settings with the default layering and an optional file.
    pub fn load(file: Option<&Path>) -> ConfigResult<Self> {
        SettingsLoader::new()
            .with_optional_file(file)
            .load()
            .map(|loaded| loaded.settings)
    }
}

fn ensure_exists(path: &Path) -> ConfigResult<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(ConfigError::FileNotFound(path.to_path_buf()))
    }
}
