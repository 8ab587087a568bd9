//! Persistence for frames, finished photos, settings and the email log.
//!
//! [`AssetStore`] is the interface the rest of the system talks to. The one
//! implementation, [`DocumentStore`], keeps metadata as whole JSON documents
//! next to the image assets on any [`BlobStore`]: the local filesystem
//! ([`LocalBlobStore`]) or an object store (see the `photobooth-cloud` crate).

pub mod asset_store;
pub mod blob;
pub mod documents;
pub mod error;
pub mod local;
pub mod models;

pub use asset_store::{AssetStore, BatchDeleteReport, BatchFailure};
pub use blob::BlobStore;
pub use documents::{DocumentStore, FrameSyncReport};
pub use error::{StoreError, StoreResult};
pub use local::LocalBlobStore;
