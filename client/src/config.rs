use {
    crate::cli::default_config_path,
    anyhow::{Context as _, Result},
    derivative::Derivative,
    ldseal_protocol::Password,
    ldseal_sdk::RenderSettings,
    serde::{Deserialize, Serialize},
    std::path::{Path, PathBuf},
    tracing::debug,
};

#[derive(Derivative, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[derivative(Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default = "default_ld_path")]
    #[derivative(Default(value = "default_ld_path()"))]
    pub ld_path: String,
    #[serde(default = "default_language")]
    #[derivative(Default(value = "default_language()"))]
    pub language: String,
    /// Used for documents that don't specify their own master password.
    #[serde(default)]
    #[derivative(Debug = "ignore")]
    pub master_password: Option<Password>,
    #[serde(default)]
    pub passwords_file: Option<PathBuf>,
    #[serde(default)]
    pub passwords_listing: bool,
    #[serde(default)]
    pub log_file: Option<PathBuf>,
    #[serde(default = "default_log_filter")]
    #[derivative(Default(value = "default_log_filter()"))]
    pub log_filter: String,
}

fn default_ld_path() -> String {
    RenderSettings::default().ld_path
}

fn default_language() -> String {
    RenderSettings::default().language
}

fn default_log_filter() -> String {
    "info".into()
}

impl Config {
    /// Loads the config from `path`.
    ///
    /// Without an explicit path the default location is used, and a missing
    /// file there means default settings.
    #[inline]
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_owned(),
            None => {
                let path = default_config_path()?;
                if !path.try_exists()? {
                    debug!(path = %path.display(), "config file not found, using defaults");
                    return Ok(Self::default());
                }
                path
            }
        };
        Self::parse(&fs_err::read_to_string(&path)?)
            .with_context(|| format!("invalid config file {}", path.display()))
    }

    #[inline]
    pub fn parse(text: &str) -> Result<Self> {
        Ok(json5::from_str(text)?)
    }

    #[must_use]
    #[inline]
    pub fn render_settings(&self) -> RenderSettings {
        RenderSettings {
            ld_path: self.ld_path.clone(),
            language: self.language.clone(),
        }
    }
}
