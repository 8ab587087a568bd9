//! Object-storage backend for the photobooth asset store.
//!
//! [`S3BlobStore`] implements [`BlobStore`](photobooth_store::BlobStore)
//! over any S3-compatible service, so frames, photos and the metadata
//! documents all live in one bucket under a common prefix.

pub mod s3;

pub use s3::{S3BlobStore, S3Config};
