// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Testing utilities for sqlsema
//!
//! This crate provides common testing components including:
//! - A syntax-tree factory that allocates non-overlapping spans
//! - Schema and symbol-table fixtures shared across resolver tests

pub mod ast;
pub mod fixtures;

// Re-exports for convenience
pub use ast::AstFactory;
pub use fixtures::SchemaFixtures;
