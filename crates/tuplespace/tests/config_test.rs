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


//! Integration Tests for file and environment configuration

mod common;

use common::init_tracing;
use linda_tuplespace::{template, tuple, SpaceConfig, TupleSpace, TupleSpaceError, ANY};
use std::io::Write;

/// Test 1: a YAML file configures the space
#[tokio::test]
async fn test_space_from_yaml_file() {
    init_tracing();
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "name: orders\nwaiter_warn_threshold: 2\npool_warn_threshold: 1").unwrap();

    let space = TupleSpace::from_file(file.path()).expect("config should load");
    assert_eq!(space.name(), "orders");
    assert_eq!(space.config().waiter_warn_threshold, 2);

    // Crossing the thresholds only logs
    space.write(tuple!("o", 1)).await;
    space.write(tuple!("o", 2)).await;
    assert_eq!(space.count(&template!("o", ANY)).await, 2);
}

/// Test 2: unknown keys are ignored, missing ones take defaults
#[test]
fn test_partial_yaml_file() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "pool_warn_threshold: 10\nextra: true").unwrap();

    let config = SpaceConfig::from_file(file.path()).expect("config should load");
    assert_eq!(config.name, SpaceConfig::default().name);
    assert_eq!(config.pool_warn_threshold, 10);
}

/// Test 3: an empty name in the file is rejected
#[test]
fn test_yaml_file_with_empty_name() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "name: \"\"").unwrap();

    let err = TupleSpace::from_file(file.path()).unwrap_err();
    assert!(matches!(err, TupleSpaceError::InvalidConfiguration(_)));
}

/// Test 4: config round-trips through serde
#[test]
fn test_config_serde_round_trip() {
    let config = SpaceConfig {
        name: "telemetry".to_string(),
        waiter_warn_threshold: 100,
        pool_warn_threshold: 5000,
    };
    let json = serde_json::to_string(&config).unwrap();
    let back: SpaceConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back, config);
}
