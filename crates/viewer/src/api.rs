//! The API seam the shell drives, implemented by the real HTTP client.

use async_trait::async_trait;
use cloudmark_client::{ApiClient, ClientError};
use cloudmark_core::{Annotation, Position};

/// The three store operations the viewer needs.
///
/// [`ApiClient`] is the production implementation; tests substitute mocks.
#[async_trait]
pub trait AnnotationApi {
    /// Fetch all annotations, newest-first.
    async fn list(&self) -> Result<Vec<Annotation>, ClientError>;

    /// Create an annotation at `position`.
    async fn create(&self, position: &Position, text: &str) -> Result<Annotation, ClientError>;

    /// Delete by id; returns whether the server removed a record.
    async fn delete(&self, id: &str) -> Result<bool, ClientError>;
}

#[async_trait]
impl AnnotationApi for ApiClient {
    async fn list(&self) -> Result<Vec<Annotation>, ClientError> {
        ApiClient::list(self).await
    }

    async fn create(&self, position: &Position, text: &str) -> Result<Annotation, ClientError> {
        ApiClient::create(self, position, text).await
    }

    async fn delete(&self, id: &str) -> Result<bool, ClientError> {
        ApiClient::delete(self, id).await
    }
}
