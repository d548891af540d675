//! Upload dispatch to the indexing service.
//!
//! Turns one [`Submission`] into an [`IndexRequest`], starts a fresh
//! ingestion job on the tracker, and folds every failure into the uniform
//! [`IndexResponse`] shape. Nothing here returns an error to the caller.

use ragdesk_types::error::IndexError;
use ragdesk_types::source::{IndexPayload, IndexRequest, IndexResponse, IndexType, Submission};
use tracing::{info, warn};

use super::mime::detect_content_type;
use crate::channel::EventChannel;
use crate::ingest::IngestionTracker;

/// Indexing service port. The HTTP adapter lives in ragdesk-infra.
pub trait IndexingClient: Send + Sync {
    /// Submit one request. Non-success answers from the service map to
    /// `Err`, not to `Ok` with `success: false`.
    fn index(
        &self,
        request: IndexRequest,
    ) -> impl std::future::Future<Output = Result<IndexResponse, IndexError>> + Send;
}

pub struct UploadDispatcher<I: IndexingClient> {
    client: I,
}

impl<I: IndexingClient> UploadDispatcher<I> {
    pub fn new(client: I) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &I {
        &self.client
    }

    /// Build the wire request for a submission. `None` when it is empty.
    pub fn build_request(submission: &Submission) -> Option<IndexRequest> {
        if submission.is_empty() {
            return None;
        }
        let request = match submission {
            Submission::File { name, mime, data } => {
                let mime = detect_content_type(name, data, mime.as_deref());
                IndexRequest {
                    index_type: IndexType::from_mime(&mime),
                    payload: IndexPayload::Bytes {
                        file_name: name.clone(),
                        mime,
                        data: data.clone(),
                    },
                }
            }
            Submission::Url(url) => IndexRequest {
                index_type: IndexType::Website,
                payload: IndexPayload::Text(url.clone()),
            },
            Submission::Context(text) => IndexRequest {
                index_type: IndexType::Text,
                payload: IndexPayload::Text(text.clone()),
            },
        };
        Some(request)
    }

    /// Dispatch a submission and track its ingestion.
    ///
    /// An empty submission fails locally without starting a job. A failed
    /// dispatch cancels the job it started.
    pub async fn submit<C: EventChannel>(
        &self,
        submission: &Submission,
        tracker: &mut IngestionTracker<C>,
    ) -> IndexResponse {
        let Some(request) = Self::build_request(submission) else {
            warn!(kind = ?submission.kind(), "empty submission, nothing to index");
            return IndexResponse::failure("nothing to index");
        };

        let index_type = request.index_type;
        tracker.start_job();
        info!(%index_type, "submitting source for indexing");

        match self.client.index(request).await {
            Ok(response) if response.success => {
                info!(%index_type, message = ?response.message, "source accepted for indexing");
                response
            }
            Ok(response) => {
                warn!(%index_type, error = ?response.error, "indexing service rejected source");
                tracker.cancel();
                response
            }
            Err(e) => {
                warn!(%index_type, error = %e, "indexing request failed");
                tracker.cancel();
                IndexResponse::failure(e.to_string())
            }
        }
    }
}

impl<I: IndexingClient> std::fmt::Debug for UploadDispatcher<I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadDispatcher").finish_non_exhaustive()
    }
}
