//! # gift-schema
//!
//! JSON Schema registry and validation for GIFT messages.
//!
//! Payload types are defined in `gift-core` with `#[derive(JsonSchema)]`.
//! This crate registers one schema per message type name, plus the
//! `Message` envelope, and validates raw JSON against them before it is
//! decoded.

pub mod error;
pub mod registry;

pub use error::SchemaError;
pub use registry::{MESSAGE_SCHEMA, SchemaRegistry};
