//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of Zivec.
//! The Zivec project belongs to the Dunimd Team.
//!
//! Licensed under the Apache License, Version 2.0 (the "License");
//! You may not use this file except in compliance with the License.
//! You may obtain a copy of the License at
//!
//!     http://www.apache.org/licenses/LICENSE-2.0
//!
//! Unless required by applicable law or agreed to in writing, software
//! distributed under the License is distributed on an "AS IS" BASIS,
//! WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//! See the License for the specific language governing permissions and
//! limitations under the License.

//! # Zivec Binding Module
//!
//! Transforms, conditions and filters are constructed from parameters alone
//! and only become usable once bound to the schema of the data they will see.
//! Binding resolves column names to positions and checks column types.
//!
//! [`ZiBindState`] makes the two lifecycle states explicit:
//!
//! - `Unbound(spec)`: only construction parameters are known
//! - `Bound { spec, resolved }`: the schema has been resolved into whatever the
//!   spec needs at execution time (column indices, compiled predicates,
//!   output schema)
//!
//! Rebinding re-runs resolution and replaces the previous binding; there is
//! no way back to `Unbound`. Only the spec is serialized, so a deserialized
//! value always starts unbound.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::{Result, ZiError};
use crate::schema::ZiSchema;

/// Parameters that can be resolved against a schema.
pub trait ZiBindable: Clone + fmt::Debug {
    /// Everything execution needs once the schema is known.
    type Resolved: Clone + fmt::Debug;

    /// Stable name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Resolves the parameters against `schema`.
    fn bind(&self, schema: &ZiSchema) -> Result<Self::Resolved>;
}

/// Explicit Unbound/Bound lifecycle around a [`ZiBindable`] spec.
#[derive(Clone, Debug)]
pub enum ZiBindState<S: ZiBindable> {
    Unbound(S),
    Bound { spec: S, resolved: S::Resolved },
}

impl<S: ZiBindable> ZiBindState<S> {
    pub fn new(spec: S) -> Self {
        ZiBindState::Unbound(spec)
    }

    /// Constructs and binds in one step.
    pub fn bound(spec: S, schema: &ZiSchema) -> Result<Self> {
        let mut state = ZiBindState::new(spec);
        state.set_input_schema(schema)?;
        Ok(state)
    }

    pub fn spec(&self) -> &S {
        match self {
            ZiBindState::Unbound(spec) | ZiBindState::Bound { spec, .. } => spec,
        }
    }

    pub fn into_spec(self) -> S {
        match self {
            ZiBindState::Unbound(spec) | ZiBindState::Bound { spec, .. } => spec,
        }
    }

    pub fn name(&self) -> &'static str {
        self.spec().name()
    }

    pub fn is_bound(&self) -> bool {
        matches!(self, ZiBindState::Bound { .. })
    }

    /// Binds to `schema`. On failure the previous state is kept.
    pub fn set_input_schema(&mut self, schema: &ZiSchema) -> Result<()> {
        let resolved = self.spec().bind(schema)?;
        log::debug!(
            "bound '{}' to schema with {} columns",
            self.name(),
            schema.num_columns()
        );
        let spec = self.spec().clone();
        *self = ZiBindState::Bound { spec, resolved };
        Ok(())
    }

    /// The binding, or a state error when used before `set_input_schema`.
    pub fn resolved(&self) -> Result<&S::Resolved> {
        match self {
            ZiBindState::Bound { resolved, .. } => Ok(resolved),
            ZiBindState::Unbound(spec) => Err(ZiError::state(format!(
                "'{}' used before set_input_schema",
                spec.name()
            ))),
        }
    }
}

impl<S: ZiBindable> From<S> for ZiBindState<S> {
    fn from(spec: S) -> Self {
        ZiBindState::new(spec)
    }
}

impl<S: ZiBindable + Serialize> Serialize for ZiBindState<S> {
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> std::result::Result<Ser::Ok, Ser::Error> {
        self.spec().serialize(serializer)
    }
}

impl<'de, S: ZiBindable + Deserialize<'de>> Deserialize<'de> for ZiBindState<S> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        S::deserialize(deserializer).map(ZiBindState::Unbound)
    }
}
