// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Join constraint validation
//!
//! Probes a join constraint speculatively: the validator runs on an isolated
//! error sink and returns its findings to the caller, who decides whether to
//! merge them. A rejected probe therefore never pollutes the parent's error
//! list.

use crate::error::ResolutionError;
use crate::resolver::{ArgumentType, Resolver};
use crate::result::Resolved;
use sqlsema_syntax::stmt::JoinConstraint;

pub struct JoinValidator {
    resolver: Resolver,
    /// Columns of the table being joined against (right side)
    values: Vec<Resolved>,
    /// Frames already joined to (left side), outer first
    scoped_values: Vec<Vec<Resolved>>,
}

impl JoinValidator {
    pub fn new(
        resolver: &Resolver,
        values: Vec<Resolved>,
        scoped_values: Vec<Vec<Resolved>>,
    ) -> Self {
        Self {
            resolver: resolver.with_isolated_errors(),
            values,
            scoped_values,
        }
    }

    /// Validate the constraint, returning the isolated error list
    pub fn validate(&self, constraint: &JoinConstraint) -> Vec<ResolutionError> {
        match constraint {
            JoinConstraint::On(expr) => {
                // both the already-joined scopes and the new table are visible
                let mut frames = self.scoped_values.clone();
                frames.push(self.values.clone());
                self.resolver
                    .with_frames(frames)
                    .resolve_expr(expr, Some(&ArgumentType::Boolean));
            }
            JoinConstraint::Using(columns) => {
                // each join key must exist on both sides, checked independently
                let flattened: Vec<Resolved> =
                    self.scoped_values.iter().flatten().cloned().collect();
                for column in columns {
                    self.resolver.resolve_column_in(&self.values, column, None);
                    self.resolver.resolve_column_in(&flattened, column, None);
                }
            }
        }
        self.resolver.errors.take()
    }
}
