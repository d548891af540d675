//! Source uploads.
//!
//! - `dispatcher` -- [`UploadDispatcher`] and the [`IndexingClient`] port
//! - `mime` -- content-type resolution for uploaded files
//! - `sources` -- [`SourceList`] of registered sources

pub mod dispatcher;
pub mod mime;
pub mod sources;

pub use dispatcher::{IndexingClient, UploadDispatcher};
pub use mime::detect_content_type;
pub use sources::SourceList;
