//! Cirrus Core
//!
//! Core types shared by the Cirrus crates.
//!
//! This crate contains:
//! - Job types: handles, status classes and poll outcomes
//! - Status enumerations reported by the supported AWS services
//! - Multipart types: part plans and completed-part assembly
//!
//! Nothing in here performs I/O; the client and runner crates do.

pub mod domain;
pub mod error;

pub use error::MultipartError;
