// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Statement validators
//!
//! One validator per statement kind, each built on the resolver. Validators
//! are stateless: they check a statement against a scope the resolver
//! assembled and push everything they find into the resolver's error sink.

pub mod create_table;
pub mod delete;
pub mod insert;
pub mod join;
pub mod select;
pub mod update;

pub use create_table::CreateTableValidator;
pub use delete::DeleteValidator;
pub use insert::InsertValidator;
pub use join::JoinValidator;
pub use select::{SelectBodyValidator, SelectStmtValidator};
pub use update::UpdateValidator;
