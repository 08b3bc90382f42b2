// ABOUTME: Chart reference parsing and validation.
// ABOUTME: Handles formats like minio, stable/minio, stable/minio:1.2.3.

use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseChartRefError {
    #[error("chart reference cannot be empty")]
    Empty,

    #[error("invalid character in chart reference: {0}")]
    InvalidChar(char),

    #[error("invalid chart reference format: {0}")]
    InvalidFormat(String),
}

/// Reference to a deployable chart package: optional repository, chart name,
/// optional pinned version.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChartRef {
    repo: Option<String>,
    name: String,
    version: Option<String>,
}

impl ChartRef {
    pub fn parse(input: &str) -> Result<Self, ParseChartRefError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ParseChartRefError::Empty);
        }

        for c in input.chars() {
            if !c.is_ascii_alphanumeric() && c != '/' && c != ':' && c != '.' && c != '-' && c != '_'
            {
                return Err(ParseChartRefError::InvalidChar(c));
            }
        }

        let (without_version, version) = match input.rsplit_once(':') {
            Some((before, after)) => (before, Some(after.to_string())),
            None => (input, None),
        };

        let (repo, name) = match without_version.split_once('/') {
            Some((repo, name)) => {
                if repo.is_empty() || name.is_empty() || name.contains('/') {
                    return Err(ParseChartRefError::InvalidFormat(input.to_string()));
                }
                (Some(repo.to_string()), name.to_string())
            }
            None => (None, without_version.to_string()),
        };

        if name.is_empty() {
            return Err(ParseChartRefError::InvalidFormat(input.to_string()));
        }

        Ok(Self {
            repo,
            name,
            version,
        })
    }

    pub fn repo(&self) -> Option<&str> {
        self.repo.as_deref()
    }

    /// Bare chart name without repository or version.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }
}

impl fmt::Display for ChartRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref repo) = self.repo {
            write!(f, "{}/", repo)?;
        }
        write!(f, "{}", self.name)?;
        if let Some(ref version) = self.version {
            write!(f, ":{}", version)?;
        }
        Ok(())
    }
}

impl serde::Serialize for ChartRef {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for ChartRef {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        ChartRef::parse(&value).map_err(serde::de::Error::custom)
    }
}
