//! The remote publishing service, as seen by the executor.

use async_trait::async_trait;
use blogsync_types::{Collection, CollectionParams, PostParams, RemotePost};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("{message} (status {status})")]
    Status { status: u16, message: String },

    #[error("invalid response: {0}")]
    Decode(String),
}

/// Operations the executor needs from a publishing service.
///
/// Every call may fail independently. Only a failed [`list_posts`] stops a
/// run; everything else is logged and the affected page is abandoned.
///
/// [`list_posts`]: PublishApi::list_posts
#[async_trait]
pub trait PublishApi: Send + Sync {
    /// Every post owned by the authenticated user.
    async fn list_posts(&self) -> Result<Vec<RemotePost>, ApiError>;

    async fn create_post(&self, params: &PostParams) -> Result<RemotePost, ApiError>;

    async fn update_post(
        &self,
        id: &str,
        token: &str,
        params: &PostParams,
    ) -> Result<RemotePost, ApiError>;

    async fn delete_post(&self, id: &str, token: &str) -> Result<(), ApiError>;

    async fn pin_post(&self, collection: &str, id: &str, position: i64) -> Result<(), ApiError>;

    async fn unpin_post(&self, collection: &str, id: &str) -> Result<(), ApiError>;

    async fn list_collections(&self) -> Result<Vec<Collection>, ApiError>;

    async fn create_collection(&self, params: &CollectionParams) -> Result<Collection, ApiError>;
}
