//! The manifest of demo conversations.

use std::{
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
};

use serde::Deserialize;
use url::Url;

use crate::error::{Error, Result};

/// A list of demo conversations that can be loaded in place of the current
/// history.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DemoManifest {
    pub demos: Vec<Demo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Demo {
    pub title: String,

    #[serde(default)]
    pub icon: Option<String>,

    /// Transcript location, relative to the manifest unless it is a URL.
    pub file: String,
}

impl DemoManifest {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|error| Error::Manifest(error.to_string()))
    }

    /// Find a demo by 1-based index or case-insensitive title.
    pub fn find(&self, query: &str) -> Result<&Demo> {
        let query = query.trim();

        if let Ok(index) = query.parse::<usize>() {
            return index
                .checked_sub(1)
                .and_then(|i| self.demos.get(i))
                .ok_or_else(|| Error::UnknownDemo(query.to_owned()));
        }

        self.demos
            .iter()
            .find(|demo| demo.title.eq_ignore_ascii_case(query))
            .ok_or_else(|| Error::UnknownDemo(query.to_owned()))
    }
}

impl Demo {
    /// The transcript location, resolved against the manifest location.
    pub fn source(&self, manifest: &Source) -> Result<Source> {
        if let Ok(url) = Url::parse(&self.file)
            && matches!(url.scheme(), "http" | "https")
        {
            return Ok(Source::Url(url));
        }

        match manifest {
            Source::Url(base) => base
                .join(&self.file)
                .map(Source::Url)
                .map_err(|error| Error::Manifest(format!("{}: {error}", self.file))),
            Source::Path(base) => Ok(Source::Path(
                base.parent()
                    .unwrap_or_else(|| Path::new(""))
                    .join(&self.file),
            )),
        }
    }
}

/// Where a transcript or manifest lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Path(PathBuf),
    Url(Url),
}

impl FromStr for Source {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match Url::parse(s) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(Self::Url(url)),
            _ => Ok(Self::Path(PathBuf::from(s))),
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => write!(f, "{}", path.display()),
            Self::Url(url) => write!(f, "{url}"),
        }
    }
}

#[cfg(test)]
#[path = "demo_tests.rs"]
mod tests;
