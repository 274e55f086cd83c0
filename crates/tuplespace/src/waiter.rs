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

//! Waiter registry
//!
//! ## Purpose
//! Records blocked `read`/`take` calls (and event callbacks) so that `write`
//! can find them. Each waiter is one-shot: it is removed from the registry the
//! moment it is signalled.
//!
//! ## Signals are hints
//! A parked task is woken through its own `oneshot` channel and then re-scans
//! the pool under the lock. The wake carries no tuple. Callbacks are the
//! exception: they cannot re-scan, so they are handed the tuple directly.

use std::fmt;

use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;
use ulid::Ulid;

use crate::event::Callback;
use crate::template::Template;
use crate::tuple::Tuple;

/// Whether an operation copies (`Read`) or removes (`Take`) its match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccessMode {
    /// Non-destructive; one tuple may satisfy many readers
    Read,
    /// Destructive; one tuple satisfies at most one taker
    Take,
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessMode::Read => write!(f, "read"),
            AccessMode::Take => write!(f, "take"),
        }
    }
}

/// Unique id of a registered waiter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WaiterId(Ulid);

impl WaiterId {
    pub(crate) fn new() -> Self {
        WaiterId(Ulid::new())
    }
}

impl fmt::Display for WaiterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a waiter is told about a matching write
pub(crate) enum Notification {
    /// Wake a parked task
    Wake(oneshot::Sender<()>),
    /// Run a registered callback with the tuple
    Callback(Callback),
}

/// Result of signalling a waiter
pub(crate) enum Signal {
    /// The parked task will re-scan
    Woken,
    /// The parked task is gone (timed out or dropped)
    Dead,
    /// Run this callback once the lock is released
    Fire(Callback),
}

/// A registered interest in tuples matching `template`
pub(crate) struct Waiter {
    pub(crate) id: WaiterId,
    pub(crate) template: Template,
    notification: Notification,
}

impl fmt::Debug for Waiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.notification {
            Notification::Wake(_) => "wake",
            Notification::Callback(_) => "callback",
        };
        f.debug_struct("Waiter")
            .field("id", &self.id)
            .field("template", &self.template)
            .field("notification", &kind)
            .finish()
    }
}

impl Waiter {
    /// Waiter for a parked task, plus the receiver the task parks on
    pub(crate) fn parked(template: Template) -> (Self, oneshot::Receiver<()>) {
        let (tx, rx) = oneshot::channel();
        let waiter = Waiter {
            id: WaiterId::new(),
            template,
            notification: Notification::Wake(tx),
        };
        (waiter, rx)
    }

    /// Waiter backed by a callback
    pub(crate) fn callback(template: Template, callback: Callback) -> Self {
        Waiter {
            id: WaiterId::new(),
            template,
            notification: Notification::Callback(callback),
        }
    }

    pub(crate) fn matches(&self, tuple: &Tuple) -> bool {
        self.template.matches(tuple)
    }

    /// False once the parked task has stopped listening
    pub(crate) fn is_live(&self) -> bool {
        match &self.notification {
            Notification::Wake(tx) => !tx.is_closed(),
            Notification::Callback(_) => true,
        }
    }

    /// Consume the waiter and deliver its signal
    pub(crate) fn signal(self) -> Signal {
        match self.notification {
            Notification::Wake(tx) => {
                if tx.send(()).is_ok() {
                    Signal::Woken
                } else {
                    Signal::Dead
                }
            }
            Notification::Callback(callback) => Signal::Fire(callback),
        }
    }
}

/// Arrival-ordered waiters for one access mode
#[derive(Debug, Default)]
pub(crate) struct WaiterRegistry {
    waiters: Vec<Waiter>,
}

impl WaiterRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Append a waiter at the back
    pub(crate) fn push(&mut self, waiter: Waiter) {
        self.waiters.push(waiter);
    }

    /// Remove a specific waiter, if still registered
    pub(crate) fn remove(&mut self, id: WaiterId) -> Option<Waiter> {
        let index = self.waiters.iter().position(|w| w.id == id)?;
        Some(self.waiters.remove(index))
    }

    /// Remove every waiter matching `tuple`, in arrival order
    pub(crate) fn drain_matching(&mut self, tuple: &Tuple) -> Vec<Waiter> {
        let mut matched = Vec::new();
        let mut kept = Vec::with_capacity(self.waiters.len());
        for waiter in self.waiters.drain(..) {
            if waiter.matches(tuple) {
                matched.push(waiter);
            } else {
                kept.push(waiter);
            }
        }
        self.waiters = kept;
        matched
    }

    /// Remove the earliest waiter matching `tuple`
    pub(crate) fn pop_first_matching(&mut self, tuple: &Tuple) -> Option<Waiter> {
        let index = self.waiters.iter().position(|w| w.matches(tuple))?;
        Some(self.waiters.remove(index))
    }

    /// Drop parked entries whose task is no longer listening
    pub(crate) fn prune_dead(&mut self) -> usize {
        let before = self.waiters.len();
        self.waiters.retain(Waiter::is_live);
        before - self.waiters.len()
    }

    /// Registered waiters, oldest first
    pub(crate) fn iter(&self) -> impl Iterator<Item = &Waiter> {
        self.waiters.iter()
    }

    pub(crate) fn len(&self) -> usize {
        self.waiters.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.waiters.is_empty()
    }
}
