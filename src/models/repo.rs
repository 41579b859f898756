use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::Error;

/// A repository identified by owner and name.
///
/// Parses from the `owner/name` shorthand, a web URL such as
/// `https://github.com/owner/name`, or an SSH remote such as
/// `git@github.com:owner/name.git`. A trailing `.git` is dropped from the
/// name and path segments past the second one are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoId {
    pub owner: String,
    pub name: String,
}

impl RepoId {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }

    fn from_segments<'a>(input: &str, mut segments: impl Iterator<Item = &'a str>) -> Result<Self, Error> {
        let invalid = || Error::InvalidRepo(input.to_string());

        let owner = segments.next().ok_or_else(invalid)?;
        let name = segments.next().ok_or_else(invalid)?;
        let name = name.strip_suffix(".git").unwrap_or(name);

        if owner.is_empty() || name.is_empty() {
            return Err(invalid());
        }

        Ok(Self::new(owner, name))
    }
}

impl FromStr for RepoId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();
        if input.is_empty() {
            return Err(Error::InvalidRepo(s.to_string()));
        }

        if input.contains("://") {
            let url = Url::parse(input).map_err(|_| Error::InvalidRepo(s.to_string()))?;
            let segments = url
                .path_segments()
                .ok_or_else(|| Error::InvalidRepo(s.to_string()))?
                .filter(|segment| !segment.is_empty());
            return Self::from_segments(s, segments);
        }

        // git@github.com:owner/name.git
        if let Some((_, path)) = input.strip_prefix("git@").and_then(|rest| rest.split_once(':')) {
            return Self::from_segments(s, path.split('/').filter(|p| !p.is_empty()));
        }

        // github.com/owner/name without a scheme
        let path = input.strip_prefix("github.com/").unwrap_or(input);
        let parts: Vec<&str> = path.trim_end_matches('/').split('/').collect();
        if parts.len() != 2 {
            return Err(Error::InvalidRepo(s.to_string()));
        }
        Self::from_segments(s, parts.into_iter())
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}
