//!
//! # Text Forms
//!
//! [GdsLibrary](crate::GdsLibrary), [GdsStruct](crate::GdsStruct), and
//! [GdsReadOptions](crate::GdsReadOptions) as JSON, YAML, or TOML text, in memory or on disk.
//!

// Std-Lib Imports
use std::path::{Path, PathBuf};

// Crates.io Imports
use serde::de::DeserializeOwned;
use serde::Serialize;

/// # Text Format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerializationFormat {
    Json,
    Yaml,
    Toml,
}
impl SerializationFormat {
    /// Format named by the extension of `fname`, if any.
    /// Matching ignores case, and accepts both `yaml` and `yml`.
    pub fn from_path(fname: impl AsRef<Path>) -> Option<Self> {
        let ext = fname.as_ref().extension()?.to_str()?;
        [
            ("json", Self::Json),
            ("yaml", Self::Yaml),
            ("yml", Self::Yaml),
            ("toml", Self::Toml),
        ]
        .into_iter()
        .find(|(name, _)| ext.eq_ignore_ascii_case(name))
        .map(|(_, fmt)| fmt)
    }
    /// Render `data`. JSON output is pretty-printed.
    pub fn to_string(&self, data: &impl Serialize) -> Result<String, Error> {
        let s = match self {
            Self::Json => serde_json::to_string_pretty(data)?,
            Self::Yaml => serde_yaml::to_string(data)?,
            Self::Toml => toml::to_string(data)?,
        };
        Ok(s)
    }
    /// Parse `s`, after stripping any indentation common to all of its lines
    pub fn from_str<T: DeserializeOwned>(&self, s: &str) -> Result<T, Error> {
        let text = textwrap::dedent(s);
        let data = match self {
            Self::Json => serde_json::from_str(&text)?,
            Self::Yaml => serde_yaml::from_str(&text)?,
            Self::Toml => toml::from_str(&text)?,
        };
        Ok(data)
    }
    /// Write `data` to `fname`, replacing any existing content
    pub fn save(&self, data: &impl Serialize, fname: impl AsRef<Path>) -> Result<(), Error> {
        std::fs::write(fname, self.to_string(data)?)?;
        Ok(())
    }
    /// Read and parse the content of `fname`
    pub fn open<T: DeserializeOwned>(&self, fname: impl AsRef<Path>) -> Result<T, Error> {
        let text = std::fs::read_to_string(fname)?;
        self.from_str(&text)
    }
}

/// Types which can be saved to, and opened from, text files.
/// Every method has a default, so implementations are empty.
pub trait SerdeFile: Serialize + DeserializeOwned {
    fn save_as(&self, fmt: SerializationFormat, fname: impl AsRef<Path>) -> Result<(), Error> {
        fmt.save(self, fname)
    }
    fn open_as(fname: impl AsRef<Path>, fmt: SerializationFormat) -> Result<Self, Error> {
        fmt.open(fname)
    }
    /// Open `fname`, choosing a format from its extension
    fn open_inferred(fname: impl AsRef<Path>) -> Result<Self, Error> {
        let fname = fname.as_ref();
        let fmt = SerializationFormat::from_path(fname)
            .ok_or_else(|| Error::UnknownFormat(fname.to_path_buf()))?;
        fmt.open(fname)
    }
}

/// # Text Conversion Errors
#[derive(Debug, derive_more::From)]
pub enum Error {
    Io(std::io::Error),
    Json(serde_json::Error),
    Yaml(serde_yaml::Error),
    TomlWrite(toml::ser::Error),
    TomlRead(toml::de::Error),
    /// File extension names no [SerializationFormat]
    #[from(ignore)]
    UnknownFormat(PathBuf),
}
impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "{}", e),
            Self::Json(e) => write!(f, "JSON: {}", e),
            Self::Yaml(e) => write!(f, "YAML: {}", e),
            Self::TomlWrite(e) => write!(f, "TOML: {}", e),
            Self::TomlRead(e) => write!(f, "TOML: {}", e),
            Self::UnknownFormat(p) => write!(f, "No text format for file {:?}", p),
        }
    }
}
impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::Yaml(e) => Some(e),
            Self::TomlWrite(e) => Some(e),
            Self::TomlRead(e) => Some(e),
            Self::UnknownFormat(_) => None,
        }
    }
}
