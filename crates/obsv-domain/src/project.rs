//! Validated project identifiers
//!
//! A project id is either a UUID or a lowercase slug
//! (`[a-z0-9]+(-[a-z0-9]+)*`, 3-64 characters). Anything else is rejected
//! before it reaches a route handler.

use crate::constants::{PROJECT_SLUG_MAX_LENGTH, PROJECT_SLUG_MIN_LENGTH};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A validated project identifier (tenant-like scope for agents)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProjectId(String);

impl ProjectId {
    /// Parse and validate a project id
    pub fn parse(raw: &str) -> Result<Self> {
        if uuid::Uuid::parse_str(raw).is_ok() {
            return Ok(Self(raw.to_string()));
        }

        if raw.len() < PROJECT_SLUG_MIN_LENGTH || raw.len() > PROJECT_SLUG_MAX_LENGTH {
            return Err(Error::validation_field(
                "project id must be 3-64 characters",
                "projectId",
            ));
        }

        if !is_valid_slug(raw) {
            return Err(Error::validation_field(
                "project id must be a UUID or a lowercase slug",
                "projectId",
            ));
        }

        Ok(Self(raw.to_string()))
    }

    /// The validated identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Slug grammar: alphanumeric groups separated by single hyphens,
/// no leading/trailing hyphen.
fn is_valid_slug(raw: &str) -> bool {
    let mut prev_hyphen = true; // rejects a leading hyphen
    for c in raw.chars() {
        match c {
            'a'..='z' | '0'..='9' => prev_hyphen = false,
            '-' if !prev_hyphen => prev_hyphen = true,
            _ => return false,
        }
    }
    !prev_hyphen
}

impl FromStr for ProjectId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ProjectId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<ProjectId> for String {
    fn from(id: ProjectId) -> Self {
        id.0
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
