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

//! Event registration types
//!
//! A registered callback is a one-shot waiter that never blocks its caller.
//! It fires at most once; callers that want a stream of events re-register
//! from inside the callback.

use serde::{Deserialize, Serialize};

use crate::tuple::Tuple;

/// One-shot callback invoked with the matched tuple.
///
/// Runs on the task that triggered it, after the space lock is released, so
/// it may call back into the space (typically by spawning).
pub type Callback = Box<dyn FnOnce(Tuple) + Send + 'static>;

/// Which tuples an event registration may fire on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTiming {
    /// Tuples already in the space are considered first
    Immediate,
    /// Only tuples written after registration
    Future,
}
