//! Core domain types
//!
//! These types are shared between the client (which produces observations
//! from service responses) and the runner (which polls and uploads).

pub mod job;
pub mod multipart;
pub mod status;
