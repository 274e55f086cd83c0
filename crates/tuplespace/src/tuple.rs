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

//! Data tuples
//!
//! ## Purpose
//! A [`Tuple`] is the unit stored in the space: an ordered, immutable record of
//! concrete [`TupleField`] values. Tuples can never carry wildcards; those live
//! only in [`Template`](crate::Template), so a data tuple is valid by construction.
//!
//! ## Ownership
//! Every field owns its data, so a [`Tuple::deep_copy`] shares nothing with the
//! original. Readers always receive copies and can never alias pool storage.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use crate::template::{Template, TemplateField};

/// A tuple in the space
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Tuple {
    fields: Vec<TupleField>,
}

impl Tuple {
    /// Create a new tuple from fields
    pub fn new(fields: Vec<TupleField>) -> Self {
        Tuple { fields }
    }

    /// Get the fields of the tuple
    pub fn fields(&self) -> &[TupleField] {
        &self.fields
    }

    /// Number of fields
    pub fn arity(&self) -> usize {
        self.fields.len()
    }

    /// Field at `index`, if any
    pub fn get(&self, index: usize) -> Option<&TupleField> {
        self.fields.get(index)
    }

    /// Value-independent clone of this tuple.
    ///
    /// Read operations hand these out so the caller owns its result outright.
    pub fn deep_copy(&self) -> Tuple {
        Tuple {
            fields: self.fields.to_vec(),
        }
    }

    /// Check if tuple matches a template
    pub fn matches(&self, template: &Template) -> bool {
        template.matches(self)
    }

    /// Template that matches exactly this tuple (every position `Exact`)
    pub fn to_template(&self) -> Template {
        Template::new(
            self.fields
                .iter()
                .cloned()
                .map(TemplateField::Exact)
                .collect(),
        )
    }

    /// Consume the tuple, returning its fields
    pub fn into_fields(self) -> Vec<TupleField> {
        self.fields
    }
}

impl fmt::Display for Tuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", field)?;
        }
        write!(f, ")")
    }
}

impl From<Vec<TupleField>> for Tuple {
    fn from(fields: Vec<TupleField>) -> Self {
        Tuple::new(fields)
    }
}

/// Field in a tuple
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub enum TupleField {
    /// Integer value
    Integer(i64),
    /// String value
    String(String),
    /// Boolean value
    Boolean(bool),
    /// Binary data
    Binary(Vec<u8>),
    /// Floating point
    Float(OrderedFloat),
    /// Null value
    Null,
}

impl TupleField {
    /// Runtime type of this value, as used by typed wildcards
    pub fn field_type(&self) -> crate::FieldType {
        use crate::FieldType;
        match self {
            TupleField::Integer(_) => FieldType::Integer,
            TupleField::String(_) => FieldType::String,
            TupleField::Boolean(_) => FieldType::Boolean,
            TupleField::Binary(_) => FieldType::Binary,
            TupleField::Float(_) => FieldType::Float,
            TupleField::Null => FieldType::Null,
        }
    }

    /// Integer payload, if this is an integer
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            TupleField::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// String payload, if this is a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            TupleField::String(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for TupleField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TupleField::Integer(v) => write!(f, "{}", v),
            TupleField::String(v) => write!(f, "{:?}", v),
            TupleField::Boolean(v) => write!(f, "{}", v),
            TupleField::Binary(v) => write!(f, "<{} bytes>", v.len()),
            TupleField::Float(v) => write!(f, "{}", v.get()),
            TupleField::Null => write!(f, "null"),
        }
    }
}

/// Float wrapper with bitwise equality, so fields can be `Eq + Hash + Ord`
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OrderedFloat(f64);

impl OrderedFloat {
    /// Create a new OrderedFloat from a float value
    pub fn new(value: f64) -> Self {
        OrderedFloat(value)
    }

    /// Get the inner float value
    pub fn get(&self) -> f64 {
        self.0
    }
}

impl PartialEq for OrderedFloat {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for OrderedFloat {}

impl PartialOrd for OrderedFloat {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OrderedFloat {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl std::hash::Hash for OrderedFloat {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

// Conversion traits
impl From<i64> for TupleField {
    fn from(val: i64) -> Self {
        TupleField::Integer(val)
    }
}

impl From<i32> for TupleField {
    fn from(val: i32) -> Self {
        TupleField::Integer(i64::from(val))
    }
}

impl From<String> for TupleField {
    fn from(val: String) -> Self {
        TupleField::String(val)
    }
}

impl From<&str> for TupleField {
    fn from(val: &str) -> Self {
        TupleField::String(val.to_string())
    }
}

impl From<bool> for TupleField {
    fn from(val: bool) -> Self {
        TupleField::Boolean(val)
    }
}

impl From<Vec<u8>> for TupleField {
    fn from(val: Vec<u8>) -> Self {
        TupleField::Binary(val)
    }
}

impl From<f64> for TupleField {
    fn from(val: f64) -> Self {
        TupleField::Float(OrderedFloat(val))
    }
}

impl From<()> for TupleField {
    fn from(_: ()) -> Self {
        TupleField::Null
    }
}
