//! write.as API client.

use async_trait::async_trait;
use blogsync_core::{ApiError, PublishApi};
use blogsync_types::{Collection, CollectionParams, PostParams, RemotePost};
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

pub const DEFAULT_API_URL: &str = "https://write.as/api";

/// Every response body is wrapped in this envelope.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: Option<T>,
    #[serde(default)]
    error_msg: String,
}

#[derive(Debug, Serialize)]
struct PinParams<'a> {
    id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    position: Option<i64>,
}

#[derive(Clone, Debug)]
pub struct WriteAsClient {
    client: Client,
    base: String,
    token: String,
}

impl WriteAsClient {
    pub fn new(base: &str, token: impl Into<String>) -> Result<Self, ApiError> {
        let client = Client::builder()
            .user_agent(Self::user_agent())
            .build()
            .map_err(transport)?;
        Ok(Self {
            client,
            base: base.trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    pub fn user_agent() -> &'static str {
        concat!("blogsync/", env!("CARGO_PKG_VERSION"))
    }

    fn url(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, ApiError> {
        let mut url = Url::parse(&format!("{}{}", self.base, path))
            .map_err(|e| ApiError::Transport(Box::new(e)))?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in query {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client
            .request(method, url)
            .header(reqwest::header::AUTHORIZATION, format!("Token {}", self.token))
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, ApiError> {
        let resp = Self::check(req.send().await.map_err(transport)?).await?;
        let bytes = resp.bytes().await.map_err(transport)?;
        let envelope: Envelope<T> = serde_json::from_slice(&bytes)
            .map_err(|e| ApiError::Decode(format!("failed to parse body: {e}")))?;
        envelope
            .data
            .ok_or_else(|| ApiError::Decode("response has no data".into()))
    }

    async fn send_unit(&self, req: RequestBuilder) -> Result<(), ApiError> {
        Self::check(req.send().await.map_err(transport)?).await?;
        Ok(())
    }

    async fn check(resp: Response) -> Result<Response, ApiError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let bytes = resp.bytes().await.map_err(transport)?;
        let message = match serde_json::from_slice::<Envelope<serde_json::Value>>(&bytes) {
            Ok(envelope) if !envelope.error_msg.is_empty() => envelope.error_msg,
            _ => String::from_utf8_lossy(&bytes).into_owned(),
        };
        Err(ApiError::Status {
            status: status.as_u16(),
            message,
        })
    }
}

fn transport(err: reqwest::Error) -> ApiError {
    ApiError::Transport(Box::new(err))
}

#[async_trait]
impl PublishApi for WriteAsClient {
    async fn list_posts(&self) -> Result<Vec<RemotePost>, ApiError> {
        let url = self.url("/me/posts", &[])?;
        self.send(self.request(Method::GET, url)).await
    }

    async fn create_post(&self, params: &PostParams) -> Result<RemotePost, ApiError> {
        let path = if params.collection.is_empty() {
            "/posts".to_string()
        } else {
            format!("/collections/{}/posts", params.collection)
        };
        let url = self.url(&path, &[])?;
        self.send(self.request(Method::POST, url).json(params)).await
    }

    async fn update_post(
        &self,
        id: &str,
        _token: &str,
        params: &PostParams,
    ) -> Result<RemotePost, ApiError> {
        // The token travels in the body via `params`.
        let url = self.url(&format!("/posts/{id}"), &[])?;
        self.send(self.request(Method::POST, url).json(params)).await
    }

    async fn delete_post(&self, id: &str, token: &str) -> Result<(), ApiError> {
        let path = format!("/posts/{id}");
        let url = if token.is_empty() {
            self.url(&path, &[])?
        } else {
            self.url(&path, &[("token", token)])?
        };
        self.send_unit(self.request(Method::DELETE, url)).await
    }

    async fn pin_post(&self, collection: &str, id: &str, position: i64) -> Result<(), ApiError> {
        let url = self.url(&format!("/collections/{collection}/pin"), &[])?;
        let body = [PinParams {
            id,
            position: Some(position),
        }];
        self.send_unit(self.request(Method::POST, url).json(&body))
            .await
    }

    async fn unpin_post(&self, collection: &str, id: &str) -> Result<(), ApiError> {
        let url = self.url(&format!("/collections/{collection}/unpin"), &[])?;
        let body = [PinParams { id, position: None }];
        self.send_unit(self.request(Method::POST, url).json(&body))
            .await
    }

    async fn list_collections(&self) -> Result<Vec<Collection>, ApiError> {
        let url = self.url("/me/collections", &[])?;
        self.send(self.request(Method::GET, url)).await
    }

    async fn create_collection(&self, params: &CollectionParams) -> Result<Collection, ApiError> {
        let url = self.url("/collections", &[])?;
        self.send(self.request(Method::POST, url).json(params)).await
    }
}
