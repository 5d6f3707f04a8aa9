use crate::api::{ApiClient, ApiError, ApiErrorKind};
use crate::config::EnvConfig;
use crate::session::SessionStore;
use crate::storage::BrowserStorage;
use leptos::prelude::*;

const NOTICE_TTL_MS: i32 = 4000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub id: u64,
    pub kind: NoticeKind,
    pub message: String,
}

/// Toast queue, newest last.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Notices {
    next_id: u64,
    items: Vec<Notice>,
}

impl Notices {
    pub fn push(&mut self, kind: NoticeKind, message: impl Into<String>) -> u64 {
        self.next_id += 1;
        self.items.push(Notice {
            id: self.next_id,
            kind,
            message: message.into(),
        });
        self.next_id
    }

    pub fn dismiss(&mut self, id: u64) {
        self.items.retain(|n| n.id != id);
    }

    pub fn items(&self) -> &[Notice] {
        &self.items
    }
}

/// Text shown for a failed request.
pub fn describe_error(err: &ApiError) -> String {
    match err.kind {
        ApiErrorKind::Unauthorized => "Your session has expired. Please sign in again.".to_string(),
        ApiErrorKind::Network => "Could not reach the server".to_string(),
        _ => err.to_string(),
    }
}

#[derive(Clone, Copy)]
pub(crate) struct AppState {
    pub config: StoredValue<EnvConfig>,
    pub session: RwSignal<SessionStore<BrowserStorage>>,
    pub notices: RwSignal<Notices>,
}

impl AppState {
    pub fn new(config: EnvConfig) -> Self {
        Self {
            config: StoredValue::new(config),
            session: RwSignal::new(SessionStore::load(BrowserStorage)),
            notices: RwSignal::new(Notices::default()),
        }
    }

    /// Client carrying the current session token.
    pub fn api(&self) -> ApiClient {
        let base = self.config.with_value(|c| c.api_base_url.clone());
        let token = self.session.with_untracked(|s| s.token().map(str::to_string));
        ApiClient::new(base).with_token(token)
    }

    pub fn notify(&self, kind: NoticeKind, message: impl Into<String>) {
        let mut id = 0;
        self.notices.update(|n| id = n.push(kind, message));

        #[cfg(target_arch = "wasm32")]
        {
            use wasm_bindgen::JsCast;
            let notices = self.notices;
            let _ = window().set_timeout_with_callback_and_timeout_and_arguments_0(
                wasm_bindgen::closure::Closure::once_into_js(move || {
                    notices.update(|n| n.dismiss(id));
                })
                .as_ref()
                .unchecked_ref(),
                NOTICE_TTL_MS,
            );
        }
        #[cfg(not(target_arch = "wasm32"))]
        let _ = (id, NOTICE_TTL_MS);
    }

    pub fn success(&self, message: impl Into<String>) {
        self.notify(NoticeKind::Success, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.notify(NoticeKind::Error, message);
    }

    /// Surfaces a failed request; a 401 also ends the session.
    pub fn report(&self, err: &ApiError) {
        tracing::warn!(kind = ?err.kind, status = ?err.status, error = %err, "request failed");
        if err.kind == ApiErrorKind::Unauthorized {
            self.session.update(|s| s.invalidate());
        }
        self.error(describe_error(err));
    }

    pub fn frontend_url(&self) -> String {
        self.config.with_value(|c| c.frontend_url.clone())
    }
}

#[derive(Clone, Copy)]
pub(crate) struct AppContext(pub AppState);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notices_push_and_dismiss() {
        let mut n = Notices::default();
        let a = n.push(NoticeKind::Success, "Saved");
        let b = n.push(NoticeKind::Error, "Upload failed");
        assert_ne!(a, b);
        assert_eq!(n.items().len(), 2);

        n.dismiss(a);
        assert_eq!(n.items().len(), 1);
        assert_eq!(n.items()[0].message, "Upload failed");

        n.dismiss(a);
        assert_eq!(n.items().len(), 1);
    }

    #[test]
    fn test_describe_error_keeps_backend_message() {
        let err = ApiError {
            kind: ApiErrorKind::Rejected,
            status: None,
            message: "Title already exists".into(),
        };
        assert_eq!(describe_error(&err), "Title already exists");

        let err = ApiError {
            kind: ApiErrorKind::Unauthorized,
            status: Some(401),
            message: "Unauthorized".into(),
        };
        assert!(describe_error(&err).contains("sign in"));
    }
}
