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

//! Templates and the structural match predicate
//!
//! A [`Template`] has the same shape as a tuple, but each position may be a
//! concrete value, an untyped wildcard, a typed wildcard, or a predicate.
//! [`matches`] is pure: no side effects, same answer every time.

use std::fmt;
use std::sync::Arc;

use crate::tuple::{Tuple, TupleField};

/// Untyped wildcard, for use in [`template!`](crate::template)
pub const ANY: TemplateField = TemplateField::Wildcard;

/// Returns true iff `candidate` has the template's arity and every position
/// is satisfied by the corresponding template field.
pub fn matches(candidate: &Tuple, template: &Template) -> bool {
    template.matches(candidate)
}

/// Pattern for matching tuples
#[derive(Debug, Clone)]
pub struct Template {
    fields: Vec<TemplateField>,
}

impl Template {
    /// Create a new template
    pub fn new(fields: Vec<TemplateField>) -> Self {
        Template { fields }
    }

    /// Template fields
    pub fn fields(&self) -> &[TemplateField] {
        &self.fields
    }

    /// Number of positions
    pub fn arity(&self) -> usize {
        self.fields.len()
    }

    /// True when no position is a wildcard, type or predicate
    pub fn is_concrete(&self) -> bool {
        self.fields
            .iter()
            .all(|f| matches!(f, TemplateField::Exact(_)))
    }

    /// Check if a tuple matches this template
    pub fn matches(&self, tuple: &Tuple) -> bool {
        if self.fields.len() != tuple.arity() {
            return false;
        }

        self.fields
            .iter()
            .zip(tuple.fields())
            .all(|(template_field, field)| template_field.matches(field))
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match field {
                TemplateField::Exact(v) => write!(f, "{}", v)?,
                TemplateField::Wildcard => write!(f, "_")?,
                TemplateField::Type(ty) => write!(f, "{:?}", ty)?,
                TemplateField::Predicate(_) => write!(f, "<predicate>")?,
            }
        }
        write!(f, ")")
    }
}

impl From<Tuple> for Template {
    fn from(tuple: Tuple) -> Self {
        tuple.to_template()
    }
}

/// Field in a template
#[derive(Clone)]
pub enum TemplateField {
    /// Exact match
    Exact(TupleField),
    /// Wildcard (matches any value)
    Wildcard,
    /// Typed wildcard (matches any value of the given type)
    Type(FieldType),
    /// Predicate function
    Predicate(Arc<dyn Fn(&TupleField) -> bool + Send + Sync>),
}

impl fmt::Debug for TemplateField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateField::Exact(field) => f.debug_tuple("Exact").field(field).finish(),
            TemplateField::Wildcard => f.debug_tuple("Wildcard").finish(),
            TemplateField::Type(ty) => f.debug_tuple("Type").field(ty).finish(),
            TemplateField::Predicate(_) => f.debug_tuple("Predicate").field(&"<function>").finish(),
        }
    }
}

impl TemplateField {
    /// Build a predicate field from a closure
    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&TupleField) -> bool + Send + Sync + 'static,
    {
        TemplateField::Predicate(Arc::new(f))
    }

    /// Check if a field matches this template position
    pub fn matches(&self, field: &TupleField) -> bool {
        match self {
            TemplateField::Exact(expected) => field == expected,
            TemplateField::Wildcard => true,
            TemplateField::Type(field_type) => field.field_type() == *field_type,
            TemplateField::Predicate(pred) => pred(field),
        }
    }
}

/// Field type for typed wildcards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldType {
    /// Integer type
    Integer,
    /// String type
    String,
    /// Boolean type
    Boolean,
    /// Binary data type
    Binary,
    /// Floating point type
    Float,
    /// Null/empty type
    Null,
}

impl From<FieldType> for TemplateField {
    fn from(ty: FieldType) -> Self {
        TemplateField::Type(ty)
    }
}

impl From<TupleField> for TemplateField {
    fn from(field: TupleField) -> Self {
        TemplateField::Exact(field)
    }
}

impl From<i64> for TemplateField {
    fn from(val: i64) -> Self {
        TemplateField::Exact(val.into())
    }
}

impl From<i32> for TemplateField {
    fn from(val: i32) -> Self {
        TemplateField::Exact(val.into())
    }
}

impl From<String> for TemplateField {
    fn from(val: String) -> Self {
        TemplateField::Exact(val.into())
    }
}

impl From<&str> for TemplateField {
    fn from(val: &str) -> Self {
        TemplateField::Exact(val.into())
    }
}

impl From<bool> for TemplateField {
    fn from(val: bool) -> Self {
        TemplateField::Exact(val.into())
    }
}

impl From<Vec<u8>> for TemplateField {
    fn from(val: Vec<u8>) -> Self {
        TemplateField::Exact(val.into())
    }
}

impl From<f64> for TemplateField {
    fn from(val: f64) -> Self {
        TemplateField::Exact(val.into())
    }
}
