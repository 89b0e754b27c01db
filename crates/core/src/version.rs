// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Content version: a digest over the revisions of every dependency
//! repository of a job, taken in sorted path order.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Length of a content version in bytes.
pub const VERSION_LEN: usize = 32;

/// Fixed-size digest identifying one checked-out state of a job.
///
/// The zero value means "never computed". It is never produced by
/// [`Version::digest`], so a job that has never been refreshed always
/// differs from one that has.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Version([u8; VERSION_LEN]);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VersionParseError {
    #[error("version must be {expected} hex characters, got {actual}")]
    Length { expected: usize, actual: usize },
    #[error("invalid hex character {0:?} in version")]
    InvalidChar(char),
}

impl Version {
    pub const ZERO: Version = Version([0; VERSION_LEN]);

    pub fn from_bytes(bytes: [u8; VERSION_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; VERSION_LEN] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    /// Digest the concatenation of `revisions`, in iteration order.
    ///
    /// Callers are responsible for ordering; the refresh engine sorts by
    /// dependency path before calling this.
    pub fn digest<I, S>(revisions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        let mut hasher = Sha256::new();
        for revision in revisions {
            hasher.update(revision.as_ref());
        }
        Self(hasher.finalize().into())
    }

    /// Lowercase hex rendering.
    pub fn to_hex(&self) -> String {
        use fmt::Write;
        let mut out = String::with_capacity(VERSION_LEN * 2);
        for byte in self.0 {
            let _ = write!(out, "{byte:02x}");
        }
        out
    }

    /// First `n` hex characters, for tables.
    pub fn short(&self, n: usize) -> String {
        let mut hex = self.to_hex();
        hex.truncate(n);
        hex
    }

    pub fn from_hex(s: &str) -> Result<Self, VersionParseError> {
        if s.len() != VERSION_LEN * 2 {
            return Err(VersionParseError::Length { expected: VERSION_LEN * 2, actual: s.len() });
        }
        let mut bytes = [0u8; VERSION_LEN];
        for (slot, pair) in bytes.iter_mut().zip(s.as_bytes().chunks_exact(2)) {
            *slot = (hex_value(pair[0])? << 4) | hex_value(pair[1])?;
        }
        Ok(Self(bytes))
    }
}

fn hex_value(b: u8) -> Result<u8, VersionParseError> {
    let c = b as char;
    c.to_digit(16).map(|d| d as u8).ok_or(VersionParseError::InvalidChar(c))
}

impl Default for Version {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Version({})", self.short(12))
    }
}

impl FromStr for Version {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[path = "version_tests.rs"]
mod tests;
