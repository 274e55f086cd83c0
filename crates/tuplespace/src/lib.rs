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

//! Linda-style tuplespace coordination
//!
//! An in-process associative memory: tasks `write` tuples, and `read` or
//! `take` them back by pattern. Blocking operations park until a matching
//! tuple arrives; event callbacks fire once on a match.
//!
//! ```rust
//! use linda_tuplespace::{template, tuple, FieldType, TupleSpace, ANY};
//!
//! # async fn example() {
//! let space = TupleSpace::new();
//! space.write(tuple!("job", 7, "resize")).await;
//!
//! let job = space.take(&template!("job", FieldType::Integer, ANY)).await;
//! assert_eq!(job.get(1).and_then(|f| f.as_integer()), Some(7));
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Data model
pub mod template;
pub mod tuple;

// Storage and waiter bookkeeping
pub mod pool;
pub mod waiter;

// Coordination engine
pub mod event;
pub mod linda;
pub mod space;

// Configuration module
pub mod config;
pub mod error;

// Re-export main types
pub use config::SpaceConfig;
pub use error::{TupleSpaceError, TupleSpaceResult};
pub use event::{Callback, EventTiming};
pub use linda::Linda;
pub use space::{SpaceSnapshot, TupleSpace, TupleSpaceStats};
pub use template::{matches, FieldType, Template, TemplateField, ANY};
pub use tuple::{OrderedFloat, Tuple, TupleField};
pub use waiter::{AccessMode, WaiterId};

/// Build a [`Tuple`] from values convertible into [`TupleField`]
///
/// ```rust
/// use linda_tuplespace::{tuple, TupleField};
///
/// let t = tuple!("point", 3, 4.5, true);
/// assert_eq!(t.arity(), 4);
/// assert_eq!(t.get(0), Some(&TupleField::from("point")));
/// ```
#[macro_export]
macro_rules! tuple {
    ($($field:expr),* $(,)?) => {
        $crate::Tuple::new(vec![$($crate::TupleField::from($field)),*])
    };
}

/// Build a [`Template`] from values convertible into [`TemplateField`]
///
/// Concrete values match exactly, [`ANY`] matches anything and a
/// [`FieldType`] matches any value of that type.
///
/// ```rust
/// use linda_tuplespace::{template, tuple, FieldType, ANY};
///
/// let t = template!("point", FieldType::Integer, ANY);
/// assert!(t.matches(&tuple!("point", 3, 4.5)));
/// assert!(!t.matches(&tuple!("point", "3", 4.5)));
/// ```
#[macro_export]
macro_rules! template {
    ($($field:expr),* $(,)?) => {
        $crate::Template::new(vec![$($crate::TemplateField::from($field)),*])
    };
}
