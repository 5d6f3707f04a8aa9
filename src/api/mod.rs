mod upload;

pub use upload::{read_file, PresignRequest, PresignResponse, UploadRequest};

use crate::content::Node;
use crate::models::{ApplyStep, ContentPage, Council, NavNode, Resource};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ApiErrorKind {
    Unauthorized,
    NotFound,
    Network,
    Http,
    Parse,
    /// The backend answered `{success: false}`.
    Rejected,
    Upload,
}

#[derive(Clone, Debug, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub status: Option<u16>,
    pub message: String,
}

impl ApiError {
    fn network(e: reqwest::Error) -> Self {
        Self {
            kind: ApiErrorKind::Network,
            status: None,
            message: e.to_string(),
        }
    }

    fn parse(e: impl std::fmt::Display) -> Self {
        Self {
            kind: ApiErrorKind::Parse,
            status: None,
            message: e.to_string(),
        }
    }

    fn unauthorized() -> Self {
        Self {
            kind: ApiErrorKind::Unauthorized,
            status: Some(401),
            message: "Unauthorized".to_string(),
        }
    }

    fn not_found(path: &str) -> Self {
        Self {
            kind: ApiErrorKind::NotFound,
            status: Some(404),
            message: format!("Not found: {path}"),
        }
    }

    fn http(status: StatusCode, body: String, ctx: &str) -> Self {
        Self {
            kind: ApiErrorKind::Http,
            status: Some(status.as_u16()),
            message: format!("{ctx} ({status}): {body}"),
        }
    }

    fn rejected(message: Option<String>) -> Self {
        Self {
            kind: ApiErrorKind::Rejected,
            status: None,
            message: message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| "Request was rejected".to_string()),
        }
    }

    pub(crate) fn upload() -> Self {
        Self {
            kind: ApiErrorKind::Upload,
            status: None,
            message: "Upload failed".to_string(),
        }
    }

    /// "Upload failed", keeping a rejected session recognisable so it still ends the session.
    pub(crate) fn upload_failed(cause: &ApiError) -> Self {
        let mut err = Self::upload();
        if cause.kind == ApiErrorKind::Unauthorized {
            err.kind = ApiErrorKind::Unauthorized;
            err.status = cause.status;
        }
        err
    }

    /// Missing resource; lookups turn this into `None`.
    pub fn is_not_found(&self) -> bool {
        self.kind == ApiErrorKind::NotFound || self.status == Some(400)
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// `{success, data}` wrapper used by every endpoint.
#[derive(Deserialize, Debug)]
struct Envelope<T> {
    #[serde(default = "default_success")]
    success: bool,
    data: Option<T>,
    #[serde(default)]
    message: Option<String>,
}

fn default_success() -> bool {
    true
}

#[derive(Clone, Debug)]
pub struct ApiClient {
    pub(crate) base_url: String,
    pub(crate) token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn get_auth_header(&self) -> Option<String> {
        self.token.as_ref().map(|t| format!("Bearer {}", t))
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn send(&self, method: Method, path: &str, body: Option<Value>) -> ApiResult<reqwest::Response> {
        let client = reqwest::Client::new();
        let mut req = client.request(method.clone(), self.url(path));
        if let Some(header) = self.get_auth_header() {
            req = req.header("Authorization", header);
        }
        if let Some(b) = body {
            req = req.json(&b);
        }

        tracing::debug!(%method, path, "api request");
        let res = req.send().await.map_err(|e| {
            tracing::warn!(%method, path, error = %e, "api request failed");
            ApiError::network(e)
        })?;

        let status = res.status();
        if status.is_success() {
            Ok(res)
        } else if status == StatusCode::UNAUTHORIZED {
            Err(ApiError::unauthorized())
        } else if status == StatusCode::NOT_FOUND {
            Err(ApiError::not_found(path))
        } else {
            let body = res.text().await.unwrap_or_default();
            tracing::warn!(%method, path, %status, "api request returned error status");
            Err(ApiError::http(status, body, "Request failed"))
        }
    }

    /// Sends a request and unwraps the envelope. `Ok(None)` means the backend succeeded
    /// without a payload.
    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> ApiResult<Option<T>> {
        let res = self.send(method, path, body).await?;
        let text = res.text().await.map_err(ApiError::network)?;
        if text.trim().is_empty() {
            return Ok(None);
        }

        let envelope: Envelope<T> = serde_json::from_str(&text).map_err(ApiError::parse)?;
        if !envelope.success {
            return Err(ApiError::rejected(envelope.message));
        }
        Ok(envelope.data)
    }

    async fn request_required<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> ApiResult<T> {
        self.request(method, path, body)
            .await?
            .ok_or_else(|| ApiError::parse(format!("response from {path} is missing data")))
    }

    fn to_body(value: &impl Serialize) -> ApiResult<Value> {
        serde_json::to_value(value).map_err(ApiError::parse)
    }

    fn item_path<R: Resource>(id: &str) -> String {
        format!("{}/{}", R::COLLECTION, urlencoding::encode(id))
    }

    pub async fn list<R: Resource>(&self) -> ApiResult<Vec<R>> {
        Ok(self
            .request::<Vec<R>>(Method::GET, R::COLLECTION, None)
            .await?
            .unwrap_or_default())
    }

    pub async fn fetch<R: Resource>(&self, id: &str) -> ApiResult<Option<R>> {
        match self.request::<R>(Method::GET, &Self::item_path::<R>(id), None).await {
            Err(e) if e.is_not_found() => Ok(None),
            other => other,
        }
    }

    pub async fn create<R: Resource>(&self, record: &R) -> ApiResult<R> {
        self.request_required(Method::POST, R::COLLECTION, Some(Self::to_body(record)?))
            .await
    }

    pub async fn update<R: Resource>(&self, id: &str, record: &R) -> ApiResult<R> {
        self.request_required(
            Method::PUT,
            &Self::item_path::<R>(id),
            Some(Self::to_body(record)?),
        )
        .await
    }

    /// Creates or updates depending on whether the record already has an id.
    pub async fn save<R: Resource>(&self, record: &R) -> ApiResult<R> {
        match record.id() {
            Some(id) => self.update(id, record).await,
            None => self.create(record).await,
        }
    }

    pub async fn delete<R: Resource>(&self, id: &str) -> ApiResult<()> {
        self.request::<Value>(Method::DELETE, &Self::item_path::<R>(id), None)
            .await
            .map(|_| ())
    }

    /// Council lookup by its display title; a missing council is `None`, not an error.
    pub async fn council_by_title(&self, title: &str) -> ApiResult<Option<Council>> {
        let path = format!("council/title/{}", urlencoding::encode(title.trim()));
        match self.request::<Council>(Method::GET, &path, None).await {
            Err(e) if e.is_not_found() => {
                tracing::debug!(title, "council not found");
                Ok(None)
            }
            other => other,
        }
    }

    pub async fn update_apply_step(&self, step_id: &str, step: &ApplyStep) -> ApiResult<ApplyStep> {
        let path = format!("onlineApply/step/{}", urlencoding::encode(step_id));
        self.request_required(Method::PUT, &path, Some(Self::to_body(step)?))
            .await
    }

    /// Section document for a content page; `None` when the page was never written.
    pub async fn page_content(&self, page: ContentPage) -> ApiResult<Option<Node>> {
        match self.request::<Node>(Method::GET, page.slug(), None).await {
            Ok(Some(Node::Null)) | Err(ApiError { kind: ApiErrorKind::NotFound, .. }) => Ok(None),
            other => other,
        }
    }

    pub async fn save_page_content(
        &self,
        page: ContentPage,
        doc: &Node,
        exists: bool,
    ) -> ApiResult<Node> {
        let method = if exists { Method::PUT } else { Method::POST };
        let saved = self
            .request::<Node>(method, page.slug(), Some(Self::to_body(doc)?))
            .await?;
        Ok(saved.unwrap_or_else(|| doc.clone()))
    }

    pub async fn navigation(&self) -> ApiResult<Vec<NavNode>> {
        Ok(self
            .request::<Vec<NavNode>>(Method::GET, "navigation", None)
            .await?
            .unwrap_or_default())
    }

    pub async fn save_navigation(&self, nodes: &[NavNode]) -> ApiResult<()> {
        self.request::<Value>(Method::PUT, "navigation", Some(Self::to_body(&nodes)?))
            .await
            .map(|_| ())
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_client_new_strips_trailing_slash() {
        let client = ApiClient::new("http://localhost:5000/api/");
        assert_eq!(client.base_url(), "http://localhost:5000/api");
        assert!(client.token.is_none());
        assert_eq!(client.url("/banner"), "http://localhost:5000/api/banner");
    }

    #[test]
    fn test_api_client_get_auth_header() {
        let client = ApiClient::new("http://localhost");
        assert!(client.get_auth_header().is_none());
        let client = client.with_token(Some("my-jwt-token".to_string()));
        assert_eq!(client.get_auth_header().as_deref(), Some("Bearer my-jwt-token"));
        assert!(client.is_authenticated());
    }

    #[test]
    fn test_item_path_is_encoded() {
        assert_eq!(ApiClient::item_path::<Council>("a b"), "council/a%20b");
    }

    #[test]
    fn test_envelope_contract_deserialize() {
        let e: Envelope<Vec<u32>> = serde_json::from_str(r#"{"success":true,"data":[1]}"#).unwrap();
        assert!(e.success);
        assert_eq!(e.data, Some(vec![1]));

        let e: Envelope<Value> =
            serde_json::from_str(r#"{"success":false,"message":"Title exists"}"#).unwrap();
        assert!(!e.success);
        assert_eq!(ApiError::rejected(e.message).to_string(), "Title exists");
    }

    #[test]
    fn test_not_found_covers_bad_request() {
        assert!(ApiError::not_found("x").is_not_found());
        assert!(ApiError::http(StatusCode::BAD_REQUEST, String::new(), "ctx").is_not_found());
        assert!(!ApiError::http(StatusCode::INTERNAL_SERVER_ERROR, String::new(), "ctx").is_not_found());
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
pub(crate) mod mock_backend;
