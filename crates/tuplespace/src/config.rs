// SPDX-License-Identifier: LGPL-2.1-or-later
// Copyright (C) 2025 Shahzad A. Bhatti <bhatti@plexobject.com>
//
// This file is part of linda-tuplespace.
//
// linda-tuplespace is free software: you can redistribute it and/or modify
// it under the terms of the GNU Lesser General Public License as published by
// the Free Software Foundation, either version 2.1 of the License, or
// (at your option) any later version.
//
// linda-tuplespace is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Lesser General Public License for more details.
//
// You should have received a copy of the GNU Lesser General Public License
// along with linda-tuplespace. If not, see <https://www.gnu.org/licenses/>.

//! TupleSpace Configuration Module
//!
//! ## Configuration Hierarchy
//! 1. **CODE**: Explicit [`SpaceConfig`] passed to [`TupleSpace::from_config`] (highest priority)
//! 2. **ENV**: Environment variables (`LINDA_SPACE_NAME`, etc.)
//! 3. **FILE**: YAML configuration file
//! 4. **DEFAULT**: [`SpaceConfig::default`] (lowest priority)
//!
//! ## Examples
//!
//! ### From Code
//! ```rust
//! use linda_tuplespace::{SpaceConfig, TupleSpace};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = SpaceConfig {
//!     name: "jobs".to_string(),
//!     waiter_warn_threshold: 1000,
//!     pool_warn_threshold: 0,
//! };
//! let space = TupleSpace::from_config(config)?;
//! assert_eq!(space.name(), "jobs");
//! # Ok(())
//! # }
//! ```
//!
//! ### From Environment Variables
//! ```bash
//! export LINDA_SPACE_NAME=jobs
//! export LINDA_WAITER_WARN_THRESHOLD=1000
//! ```
//!
//! ### From Config File (YAML)
//! ```yaml
//! name: jobs
//! waiter_warn_threshold: 1000
//! pool_warn_threshold: 100000
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{TupleSpaceError, TupleSpaceResult};
use crate::space::TupleSpace;

/// Environment variable for the space name
pub const ENV_SPACE_NAME: &str = "LINDA_SPACE_NAME";
/// Environment variable for the waiter warning threshold
pub const ENV_WAITER_WARN_THRESHOLD: &str = "LINDA_WAITER_WARN_THRESHOLD";
/// Environment variable for the pool warning threshold
pub const ENV_POOL_WARN_THRESHOLD: &str = "LINDA_POOL_WARN_THRESHOLD";

/// Tuple space settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpaceConfig {
    /// Label carried on every log event from this space
    pub name: String,
    /// Warn when a waiter registry grows past this many entries (0 = never)
    pub waiter_warn_threshold: usize,
    /// Warn when the pool grows past this many tuples (0 = never)
    pub pool_warn_threshold: usize,
}

impl Default for SpaceConfig {
    fn default() -> Self {
        SpaceConfig {
            name: "default".to_string(),
            waiter_warn_threshold: 0,
            pool_warn_threshold: 0,
        }
    }
}

impl SpaceConfig {
    /// Check the configuration is usable
    pub fn validate(&self) -> TupleSpaceResult<()> {
        if self.name.trim().is_empty() {
            return Err(TupleSpaceError::InvalidConfiguration(
                "space name must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Parse a YAML document
    pub fn from_yaml_str(yaml: &str) -> TupleSpaceResult<Self> {
        let config: SpaceConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> TupleSpaceResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), "loading tuple space config");
        Self::from_yaml_str(&contents)
    }

    /// Read settings from process environment variables.
    ///
    /// Unset variables keep their defaults.
    pub fn from_env() -> TupleSpaceResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through `lookup`, which maps a variable name to its value
    pub fn from_lookup<F>(lookup: F) -> TupleSpaceResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = SpaceConfig::default();

        if let Some(name) = lookup(ENV_SPACE_NAME) {
            config.name = name;
        }
        if let Some(raw) = lookup(ENV_WAITER_WARN_THRESHOLD) {
            config.waiter_warn_threshold = parse_count(ENV_WAITER_WARN_THRESHOLD, &raw)?;
        }
        if let Some(raw) = lookup(ENV_POOL_WARN_THRESHOLD) {
            config.pool_warn_threshold = parse_count(ENV_POOL_WARN_THRESHOLD, &raw)?;
        }

        config.validate()?;
        Ok(config)
    }
}

fn parse_count(key: &str, raw: &str) -> TupleSpaceResult<usize> {
    raw.trim().parse::<usize>().map_err(|_| {
        TupleSpaceError::InvalidConfiguration(format!(
            "{} must be a non-negative integer, got {:?}",
            key, raw
        ))
    })
}

impl TupleSpace {
    /// Create TupleSpace from explicit configuration (CODE - highest priority)
    ///
    /// ## Errors
    /// - `TupleSpaceError::InvalidConfiguration`: the configuration fails validation
    pub fn from_config(config: SpaceConfig) -> TupleSpaceResult<Self> {
        config.validate()?;
        Ok(Self::with_config(config))
    }

    /// Create TupleSpace from environment variables (ENV - medium priority)
    ///
    /// ## Environment Variables
    /// - `LINDA_SPACE_NAME`: space name
    /// - `LINDA_WAITER_WARN_THRESHOLD`: waiter registry warning threshold
    /// - `LINDA_POOL_WARN_THRESHOLD`: pool size warning threshold
    pub fn from_env() -> TupleSpaceResult<Self> {
        Self::from_config(SpaceConfig::from_env()?)
    }

    /// Create TupleSpace from a YAML file (FILE)
    pub fn from_file(path: impl AsRef<Path>) -> TupleSpaceResult<Self> {
        Self::from_config(SpaceConfig::from_file(path)?)
    }

    /// Use environment variables when any are set, otherwise defaults
    pub fn from_env_or_default() -> Self {
        match Self::from_env() {
            Ok(space) => space,
            Err(e) => {
                tracing::warn!("Ignoring tuple space environment config: {}", e);
                Self::default()
            }
        }
    }
}
