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

//! Tuple pool
//!
//! ## Design
//! - **Storage**: `BTreeMap<EntryId, Tuple>`, ids handed out in insertion order
//! - **Pattern Matching**: linear scan in id order, first match wins
//! - **Duplicates**: structurally equal tuples are independent entries
//! - **Locking**: none; the owning space serializes access
//!
//! Removing an entry never shifts the others, so bulk removal is a plain
//! collect-ids-then-remove pass.

use std::collections::BTreeMap;

use crate::template::Template;
use crate::tuple::Tuple;

/// Position of a tuple in the pool; increases with every insert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(u64);

/// Insertion-ordered multiset of data tuples
#[derive(Debug, Default)]
pub struct TuplePool {
    entries: BTreeMap<EntryId, Tuple>,
    next_id: u64,
}

impl TuplePool {
    /// Create an empty pool
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a tuple, returning its entry id
    pub fn insert(&mut self, tuple: Tuple) -> EntryId {
        let id = EntryId(self.next_id);
        self.next_id += 1;
        self.entries.insert(id, tuple);
        id
    }

    /// Tuple stored at `id`
    pub fn get(&self, id: EntryId) -> Option<&Tuple> {
        self.entries.get(&id)
    }

    /// Remove a specific entry
    pub fn remove(&mut self, id: EntryId) -> Option<Tuple> {
        self.entries.remove(&id)
    }

    /// Id of the oldest tuple matching `template`
    pub fn position(&self, template: &Template) -> Option<EntryId> {
        self.entries
            .iter()
            .find(|(_, tuple)| template.matches(tuple))
            .map(|(id, _)| *id)
    }

    /// Oldest tuple matching `template`
    pub fn find_first(&self, template: &Template) -> Option<&Tuple> {
        self.entries.values().find(|tuple| template.matches(tuple))
    }

    /// Remove and return the oldest tuple matching `template`
    pub fn take_first(&mut self, template: &Template) -> Option<Tuple> {
        let id = self.position(template)?;
        self.entries.remove(&id)
    }

    /// All matching tuples, oldest first
    pub fn find_all<'a>(&'a self, template: &'a Template) -> impl Iterator<Item = &'a Tuple> + 'a {
        self.entries.values().filter(move |tuple| template.matches(tuple))
    }

    /// Remove and return all matching tuples, oldest first
    pub fn take_all(&mut self, template: &Template) -> Vec<Tuple> {
        let ids: Vec<EntryId> = self
            .entries
            .iter()
            .filter(|(_, tuple)| template.matches(tuple))
            .map(|(id, _)| *id)
            .collect();

        ids.into_iter()
            .filter_map(|id| self.entries.remove(&id))
            .collect()
    }

    /// Number of matching tuples
    pub fn count(&self, template: &Template) -> usize {
        self.find_all(template).count()
    }

    /// Iterate every stored tuple, oldest first
    pub fn iter(&self) -> impl Iterator<Item = &Tuple> {
        self.entries.values()
    }

    /// Number of stored tuples
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the pool holds nothing
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every tuple; ids keep increasing
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
