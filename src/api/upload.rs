//! Direct-to-bucket uploads through presigned URLs.

use super::{ApiClient, ApiError, ApiResult};
use reqwest::Method;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PresignRequest {
    pub filename: String,
    pub content_type: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PresignResponse {
    pub upload_url: String,
    pub public_url: String,
}

/// Presign responses have been seen both bare and inside the usual envelope.
#[derive(Deserialize)]
#[serde(untagged)]
enum PresignBody {
    Bare(PresignResponse),
    Wrapped { data: PresignResponse },
}

/// A picked file, read into memory.
#[derive(Clone, Debug, PartialEq)]
pub struct UploadRequest {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadRequest {
    pub fn new(filename: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        let content_type = content_type.into();
        Self {
            filename: filename.into(),
            content_type: if content_type.trim().is_empty() {
                "application/octet-stream".to_string()
            } else {
                content_type
            },
            bytes,
        }
    }
}

impl ApiClient {
    pub async fn presign(&self, req: &PresignRequest) -> ApiResult<PresignResponse> {
        let body = serde_json::to_value(req).map_err(ApiError::parse)?;
        let res = self.send(Method::POST, "upload/presign", Some(body)).await?;
        match res.json::<PresignBody>().await.map_err(ApiError::parse)? {
            PresignBody::Bare(p) | PresignBody::Wrapped { data: p } => Ok(p),
        }
    }

    async fn put_object(upload_url: &str, file: UploadRequest) -> ApiResult<()> {
        let client = reqwest::Client::new();
        let res = client
            .put(upload_url)
            .header("Content-Type", file.content_type)
            .body(file.bytes)
            .send()
            .await
            .map_err(ApiError::network)?;

        let status = res.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = res.text().await.unwrap_or_default();
            Err(ApiError::http(status, body, "Object upload failed"))
        }
    }

    /// Uploads `file` and returns the public URL to store in the content document.
    ///
    /// Every failure collapses into a single "Upload failed" error; nothing is retried and
    /// an unused presigned slot is simply left behind. A 401 keeps its `Unauthorized` kind.
    pub async fn upload(&self, file: UploadRequest) -> ApiResult<String> {
        let filename = file.filename.clone();
        let presign_req = PresignRequest {
            filename: file.filename.clone(),
            content_type: file.content_type.clone(),
        };

        let result = async {
            let slot = self.presign(&presign_req).await?;
            Self::put_object(&slot.upload_url, file).await?;
            Ok::<_, ApiError>(slot.public_url)
        }
        .await;

        match result {
            Ok(url) => {
                tracing::info!(%filename, %url, "upload complete");
                Ok(url)
            }
            Err(e) => {
                tracing::warn!(%filename, kind = ?e.kind, error = %e, "upload failed");
                Err(ApiError::upload_failed(&e))
            }
        }
    }
}

/// Reads a file picked in an `<input type="file">`. Browser only.
pub async fn read_file(file: &web_sys::File) -> ApiResult<UploadRequest> {
    let buf = wasm_bindgen_futures::JsFuture::from(file.array_buffer())
        .await
        .map_err(|_| ApiError::upload())?;
    let bytes = js_sys::Uint8Array::new(&buf).to_vec();
    Ok(UploadRequest::new(file.name(), file.type_(), bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_presign_contract() {
        let req = PresignRequest {
            filename: "a.png".into(),
            content_type: "image/png".into(),
        };
        assert_eq!(
            serde_json::to_value(req).unwrap(),
            json!({"filename": "a.png", "contentType": "image/png"})
        );

        let bare: PresignBody =
            serde_json::from_value(json!({"uploadUrl": "u", "publicUrl": "p"})).unwrap();
        let wrapped: PresignBody = serde_json::from_value(
            json!({"success": true, "data": {"uploadUrl": "u", "publicUrl": "p"}}),
        )
        .unwrap();
        for body in [bare, wrapped] {
            let (PresignBody::Bare(p) | PresignBody::Wrapped { data: p }) = body;
            assert_eq!(p.public_url, "p");
        }
    }

    #[test]
    fn test_missing_content_type_defaults() {
        let r = UploadRequest::new("x.bin", "", vec![1]);
        assert_eq!(r.content_type, "application/octet-stream");
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod backend_tests {
    use super::super::mock_backend::MockBackend;
    use super::*;
    use crate::api::ApiErrorKind;

    #[tokio::test]
    async fn test_upload_puts_bytes_and_returns_public_url() {
        let backend = MockBackend::start().await;
        let api = ApiClient::new(backend.base_url());

        let url = api
            .upload(UploadRequest::new("hero.png", "image/png", vec![1, 2, 3]))
            .await
            .expect("upload should succeed");
        assert_eq!(url, "https://cdn.test/hero.png");

        let stored = backend.object("hero.png").expect("object stored");
        assert_eq!(stored.bytes, vec![1, 2, 3]);
        assert_eq!(stored.content_type, "image/png");
    }

    #[tokio::test]
    async fn test_failed_transfer_is_upload_failed() {
        let backend = MockBackend::start().await;
        let api = ApiClient::new(backend.base_url());

        let err = api
            .upload(UploadRequest::new("reject.png", "image/png", vec![0]))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::Upload);
        assert_eq!(err.to_string(), "Upload failed");
        assert!(backend.object("reject.png").is_none());
    }

    #[tokio::test]
    async fn test_rejected_session_stays_unauthorized() {
        let backend = MockBackend::start().await;
        let api = ApiClient::new(backend.base_url());

        let err = api
            .upload(UploadRequest::new("expired.png", "image/png", vec![0]))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::Unauthorized);
        assert_eq!(err.status, Some(401));
        assert_eq!(err.to_string(), "Upload failed");
        assert!(backend.object("expired.png").is_none());
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_upload_failed() {
        let api = ApiClient::new("http://127.0.0.1:9");
        let err = api
            .upload(UploadRequest::new("a.png", "image/png", vec![0]))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Upload failed");
    }
}
