//! Config file loading.
//!
//! A document is located by path, `file://` URL, `http(s)://` URL, or `-` for
//! standard input. The format is chosen from the file extension, the text is
//! parsed into a [`Value`] and then resolved with
//! [`resolve_with`](crate::resolve::resolve_with).

use std::{
    fmt,
    io::Read,
    path::{Path, PathBuf},
};

use serde_json::Value;
use url::Url;

use crate::{
    error::{BoxError, ConfigError},
    expand::{ProcessEnv, VarSource},
    resolve::resolve_with,
};

/// Supported document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Toml,
}

impl ConfigFormat {
    /// Picks the format from a path's extension.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnsupportedFileType`] for anything other than
    /// `.yaml`, `.yml` and `.toml`.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("");
        match ext {
            "yaml" | "yml" => Ok(Self::Yaml),
            "toml" => Ok(Self::Toml),
            _ => Err(ConfigError::UnsupportedFileType(if ext.is_empty() {
                String::new()
            } else {
                format!(".{ext}")
            })),
        }
    }

    /// Parses `content` into a JSON-shaped value.
    pub fn parse(self, content: &str) -> Result<Value, ConfigError> {
        let parsed: Result<Value, BoxError> = match self {
            Self::Yaml => serde_yaml::from_str::<Value>(content).map_err(BoxError::from),
            Self::Toml => toml::from_str::<toml::Value>(content)
                .map_err(BoxError::from)
                .and_then(|v| serde_json::to_value(v).map_err(BoxError::from)),
        };
        // An empty YAML document is a null, treat it as an empty mapping.
        parsed
            .map(|v| match v {
                Value::Null => Value::Object(Default::default()),
                v => v,
            })
            .map_err(|source| ConfigError::Parse {
                format: self,
                source,
            })
    }
}

impl fmt::Display for ConfigFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Yaml => write!(f, "YAML"),
            Self::Toml => write!(f, "TOML"),
        }
    }
}

/// Retrieves the text of a remote document.
pub trait Fetch {
    /// Returns the body served at `url`.
    fn fetch(&self, url: &str) -> anyhow::Result<String>;
}

/// Blocking HTTP(S) fetcher.
#[derive(Debug, Default, Clone, Copy)]
pub struct HttpFetch;

impl Fetch for HttpFetch {
    fn fetch(&self, url: &str) -> anyhow::Result<String> {
        let body = ureq::get(url).call()?.body_mut().read_to_string()?;
        Ok(body)
    }
}

/// Options for [`load_config_file`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    /// Accept `-` as "read YAML from standard input".
    pub allow_stdin: bool,
    /// Store the unresolved document inside the result.
    pub squirrel_original_config: bool,
    /// Key under which the unresolved document is stored.
    pub squirrel_field: String,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            allow_stdin: false,
            squirrel_original_config: false,
            squirrel_field: "__orig_config".to_string(),
        }
    }
}

enum Location {
    Stdin,
    Local(PathBuf),
    Remote(Url),
}

impl Location {
    fn parse(config_file: &str, allow_stdin: bool) -> Self {
        if allow_stdin && config_file == "-" {
            return Self::Stdin;
        }
        match Url::parse(config_file) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Self::Remote(url),
            Ok(url) if url.scheme() == "file" => match url.to_file_path() {
                Ok(path) => Self::Local(path),
                Err(()) => Self::Local(PathBuf::from(url.path())),
            },
            _ => Self::Local(PathBuf::from(config_file)),
        }
    }
}

/// Loads and resolves a config document using the process environment.
///
/// # Errors
///
/// See [`load_config_file_with`].
pub fn load_config_file(
    config_file: impl AsRef<str>,
    options: &LoadOptions,
) -> Result<Value, ConfigError> {
    load_config_file_with(config_file, options, &HttpFetch, &ProcessEnv)
}

/// Loads and resolves a config document with explicit collaborators.
///
/// # Errors
///
/// Returns a [`ConfigError`] for unsupported extensions, unreadable local
/// files, failed remote fetches, stdin read failures and parse failures.
pub fn load_config_file_with(
    config_file: impl AsRef<str>,
    options: &LoadOptions,
    fetch: &dyn Fetch,
    source: &dyn VarSource,
) -> Result<Value, ConfigError> {
    let config_file = config_file.as_ref();

    let (format, raw) = match Location::parse(config_file, options.allow_stdin) {
        Location::Stdin => {
            debug!("Reading YAML config from stdin");
            let mut raw = String::new();
            std::io::stdin()
                .read_to_string(&mut raw)
                .map_err(ConfigError::Stdin)?;
            (ConfigFormat::Yaml, raw)
        }
        Location::Local(path) => {
            let format = ConfigFormat::from_path(&path)?;
            if !path.is_file() {
                return Err(ConfigError::CannotOpen {
                    source: std::io::Error::new(std::io::ErrorKind::NotFound, "not a file"),
                    path,
                });
            }
            info!("Loading {format} config from {}", path.display());
            let raw = std::fs::read_to_string(&path)
                .map_err(|source| ConfigError::CannotOpen { path, source })?;
            (format, raw)
        }
        Location::Remote(url) => {
            let format = ConfigFormat::from_path(Path::new(url.path()))?;
            info!("Fetching {format} config from {url}");
            let raw = fetch
                .fetch(url.as_str())
                .map_err(|e| ConfigError::RemoteFetch {
                    url: url.to_string(),
                    source: e.into(),
                })?;
            (format, raw)
        }
    };

    let raw_config = format.parse(&raw)?;
    let mut config = resolve_with(&raw_config, source);

    if options.squirrel_original_config {
        let Value::Object(map) = &mut config else {
            return Err(ConfigError::Invalid(format!(
                "config document {config_file} must be a mapping to keep the original config"
            )));
        };
        map.insert(options.squirrel_field.clone(), raw_config);
    }

    Ok(config)
}
