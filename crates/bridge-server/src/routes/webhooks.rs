//! Carrier webhooks: inbound SMS and delivery status callbacks.

use axum::extract::State;
use axum::http::header::{CONTENT_TYPE, HOST};
use axum::http::{HeaderMap, Uri};
use axum::response::{IntoResponse, Response};
use axum::Form;
use carrier_gateway::SIGNATURE_HEADER;
use relay::{Admission, InboundRouter, StatusReconciler, WebhookRequest};
use tracing::debug;

use crate::error::WebhookError;
use crate::state::AppState;

/// Empty markup acknowledgment: the carrier sends no reply.
pub const EMPTY_TWIML: &str = r#"<?xml version="1.0" encoding="UTF-8"?><Response></Response>"#;

type Fields = Vec<(String, String)>;

/// Receive an inbound SMS.
pub async fn inbound_sms(
    State(state): State<AppState>,
    headers: HeaderMap,
    uri: Uri,
    Form(params): Form<Fields>,
) -> Result<Response, WebhookError> {
    let url = signed_url(state.inbound_webhook_url.as_deref(), &headers, &uri);
    let request = WebhookRequest::new(url, params, signature(&headers));

    let router = InboundRouter::new(state.db.clone(), state.webhook_auth.clone());
    if let Admission::Ignored(reason) = router.route(&request).await? {
        debug!(reason = reason.as_str(), "Inbound SMS acknowledged without admission");
    }

    Ok(([(CONTENT_TYPE, "text/xml")], EMPTY_TWIML).into_response())
}

/// Receive a delivery status callback.
pub async fn status_callback(
    State(state): State<AppState>,
    headers: HeaderMap,
    uri: Uri,
    Form(params): Form<Fields>,
) -> Result<&'static str, WebhookError> {
    let url = signed_url(state.status_callback_url.as_deref(), &headers, &uri);
    let request = WebhookRequest::new(url, params, signature(&headers));

    StatusReconciler::new(state.db.clone(), state.webhook_auth.clone())
        .handle(&request)
        .await?;
    Ok("OK")
}

fn signature(headers: &HeaderMap) -> Option<String> {
    headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// The URL the carrier signed: the configured public URL, else the URL
/// this request arrived on.
fn signed_url(configured: Option<&str>, headers: &HeaderMap, uri: &Uri) -> String {
    if let Some(url) = configured {
        return url.to_string();
    }
    if uri.scheme().is_some() {
        return uri.to_string();
    }

    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());
    let scheme = header("x-forwarded-proto").unwrap_or("https");
    let host = header(HOST.as_str()).unwrap_or("localhost");
    let path = uri.path_and_query().map(|p| p.as_str()).unwrap_or("/");
    format!("{scheme}://{host}{path}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_signed_url_prefers_configuration() {
        let uri: Uri = "/webhooks/sms".parse().unwrap();
        let url = signed_url(Some("https://public.example/sms"), &HeaderMap::new(), &uri);
        assert_eq!(url, "https://public.example/sms");
    }

    #[test]
    fn test_signed_url_rebuilt_from_request() {
        let uri: Uri = "/webhooks/sms?x=1".parse().unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(HOST, HeaderValue::from_static("bridge.example"));
        assert_eq!(
            signed_url(None, &headers, &uri),
            "https://bridge.example/webhooks/sms?x=1"
        );

        headers.insert("x-forwarded-proto", HeaderValue::from_static("http"));
        assert_eq!(
            signed_url(None, &headers, &uri),
            "http://bridge.example/webhooks/sms?x=1"
        );
    }
}
