//! Domain logic shared by every photobooth crate.
//!
//! Nothing in here performs I/O: crop geometry for the capture pipeline,
//! cursor pagination over finished photos, email template substitution and
//! asset key naming are all plain functions over plain data.

pub mod error;
pub mod geometry;
pub mod naming;
pub mod pagination;
pub mod template;
pub mod types;
