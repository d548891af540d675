//! Infrastructure implementations for ragdesk.
//!
//! Concrete adapters for the ports defined in `ragdesk-core`:
//!
//! - `storage` -- [`storage::FileKvStore`], the on-disk session store
//! - `transport` -- [`transport::WsChannel`], the WebSocket event channel
//! - `indexing` -- [`indexing::HttpIndexingClient`], multipart uploads
//! - `config` / `filesystem` -- config loading and data directory resolution
//! - `runtime` -- wires everything into a ready `ClientContext`

pub mod config;
pub mod filesystem;
pub mod indexing;
pub mod runtime;
pub mod storage;
pub mod transport;
