//! `szuru-core` — shared domain building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! identity, self-validation and the error model every entity reports through.

pub mod entity;
pub mod error;
pub mod id;

pub use entity::{Entity, Validate};
pub use error::{DomainError, DomainResult, ValidationError};
pub use id::{TokenId, UserId};
