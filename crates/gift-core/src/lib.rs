//! # gift-core
//!
//! Shared message model for the GIFT tutoring modules.
//!
//! The Domain, Tutor, Learner, Pedagogical, LMS, and UMS modules exchange the
//! value objects defined here. This crate provides:
//! - The performance assessment hierarchy (task, concept, intermediate concept)
//! - User and domain session identity
//! - LMS course records with a per-domain index
//! - Branch path history and the ledger that counts learners per path
//! - Tutor display requests and learner/tutor actions
//! - Domain session lifecycle requests
//! - The message envelope mapping a message type name to its payload
//! - Cross-cutting error types and the `Validate` trait

pub mod assessment;
pub mod branch;
pub mod enums;
pub mod errors;
pub mod learner_action;
pub mod lifecycle;
pub mod lms;
pub mod messages;
pub mod session;
pub mod tutor;
pub mod validate;

pub use errors::CoreError;
pub use validate::Validate;
