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

//! Linda trait
//!
//! ## Purpose
//! The classic Linda operation set as an object-safe trait, so coordination
//! code can be written against `Arc<dyn Linda>` and handed any space
//! implementation.
//!
//! ## Example
//! ```rust
//! use linda_tuplespace::{template, tuple, Linda, TupleSpace, ANY};
//! use std::sync::Arc;
//!
//! # async fn example() {
//! let space: Arc<dyn Linda> = Arc::new(TupleSpace::new());
//! space.write(tuple!("ping", 1)).await;
//! let pong = space.take(&template!("ping", ANY)).await;
//! assert_eq!(pong, tuple!("ping", 1));
//! # }
//! ```

use async_trait::async_trait;

use crate::event::{Callback, EventTiming};
use crate::space::TupleSpace;
use crate::template::Template;
use crate::tuple::Tuple;
use crate::waiter::AccessMode;

/// Linda coordination operations
#[async_trait]
pub trait Linda: Send + Sync {
    /// Add a tuple; never fails
    async fn write(&self, tuple: Tuple);

    /// Remove and return a matching tuple, waiting for one if needed
    async fn take(&self, template: &Template) -> Tuple;

    /// Copy a matching tuple, waiting for one if needed
    async fn read(&self, template: &Template) -> Tuple;

    /// Remove and return a matching tuple, or `None` without waiting
    async fn try_take(&self, template: &Template) -> Option<Tuple>;

    /// Copy a matching tuple, or `None` without waiting
    async fn try_read(&self, template: &Template) -> Option<Tuple>;

    /// Remove every matching tuple atomically
    async fn take_all(&self, template: &Template) -> Vec<Tuple>;

    /// Copy every matching tuple atomically
    async fn read_all(&self, template: &Template) -> Vec<Tuple>;

    /// Register a one-shot callback; never blocks
    async fn event_register(
        &self,
        mode: AccessMode,
        timing: EventTiming,
        template: Template,
        callback: Callback,
    );

    /// Log the contents of the space
    async fn debug(&self, prefix: &str);
}

#[async_trait]
impl Linda for TupleSpace {
    async fn write(&self, tuple: Tuple) {
        TupleSpace::write(self, tuple).await
    }

    async fn take(&self, template: &Template) -> Tuple {
        TupleSpace::take(self, template).await
    }

    async fn read(&self, template: &Template) -> Tuple {
        TupleSpace::read(self, template).await
    }

    async fn try_take(&self, template: &Template) -> Option<Tuple> {
        TupleSpace::try_take(self, template).await
    }

    async fn try_read(&self, template: &Template) -> Option<Tuple> {
        TupleSpace::try_read(self, template).await
    }

    async fn take_all(&self, template: &Template) -> Vec<Tuple> {
        TupleSpace::take_all(self, template).await
    }

    async fn read_all(&self, template: &Template) -> Vec<Tuple> {
        TupleSpace::read_all(self, template).await
    }

    async fn event_register(
        &self,
        mode: AccessMode,
        timing: EventTiming,
        template: Template,
        callback: Callback,
    ) {
        TupleSpace::event_register(self, mode, timing, template, callback).await
    }

    async fn debug(&self, prefix: &str) {
        TupleSpace::debug(self, prefix).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::{TemplateField, ANY};
    use crate::tuple::TupleField;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_space_through_trait_object() {
        let space: Arc<dyn Linda> = Arc::new(TupleSpace::new());

        let tuple = Tuple::new(vec![TupleField::from("test"), TupleField::from(42)]);
        space.write(tuple.clone()).await;

        let template = Template::new(vec![TemplateField::from("test"), ANY]);
        let results = space.read_all(&template).await;
        assert_eq!(results, vec![tuple.clone()]);

        assert_eq!(space.take(&template).await, tuple);
        assert!(space.try_read(&template).await.is_none());
        assert!(space.take_all(&template).await.is_empty());
    }

    #[tokio::test]
    async fn test_event_register_through_trait() {
        let space: Arc<dyn Linda> = Arc::new(TupleSpace::new());
        let (tx, rx) = tokio::sync::oneshot::channel();

        space
            .event_register(
                AccessMode::Read,
                EventTiming::Future,
                Template::new(vec![ANY]),
                Box::new(move |t| {
                    let _ = tx.send(t);
                }),
            )
            .await;
        space.write(Tuple::new(vec![TupleField::Null])).await;

        assert_eq!(rx.await.unwrap(), Tuple::new(vec![TupleField::Null]));
        assert!(space.try_take(&Template::new(vec![ANY])).await.is_some());
    }
}
