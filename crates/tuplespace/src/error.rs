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

//! Error types for tuple space setup.
//!
//! Space operations themselves do not fail: a miss is `None`, a blocked call
//! simply waits. Only configuration loading can go wrong.

use thiserror::Error;

/// Result type for fallible tuple space calls.
pub type TupleSpaceResult<T> = Result<T, TupleSpaceError>;

/// TupleSpace errors
#[derive(Error, Debug)]
pub enum TupleSpaceError {
    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// I/O error while loading configuration
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_yaml::Error> for TupleSpaceError {
    fn from(err: serde_yaml::Error) -> Self {
        TupleSpaceError::SerializationError(err.to_string())
    }
}
