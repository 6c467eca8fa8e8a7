//! The startup handshake.
//!
//! One HTTP request returns the socket endpoint together with the
//! user/channel snapshot that seeds the [`Directory`]. It is made exactly
//! once per [`Bot::start`](crate::Bot::start); there is no retry.

use crate::{config::Config, error::ConnectError};
use hark_core::{Directory, Entity, IdConvention};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::future::Future;
use tracing::debug;

/// Path of the handshake method under the API root.
pub const HANDSHAKE_METHOD: &str = "rtm.start";

/// Body of a handshake response.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct HandshakeResponse {
    /// Whether the platform accepted the request.
    pub ok: bool,
    /// Socket endpoint.
    #[serde(default)]
    pub url: String,
    /// Known users.
    #[serde(default)]
    pub users: Vec<Entity>,
    /// Known channels.
    #[serde(default)]
    pub channels: Vec<Entity>,
    /// The connected account.
    #[serde(rename = "self", default)]
    pub me: Option<Entity>,
    /// Platform error string when `ok` is false.
    #[serde(default)]
    pub error: Option<String>,
}

impl HandshakeResponse {
    /// Decode and validate a raw response body. Every error carries
    /// `status` and the raw `body`.
    pub fn from_body(status: u16, body: String) -> Result<Self, ConnectError> {
        let parsed: Self = match serde_json::from_str(&body) {
            Ok(parsed) => parsed,
            Err(error) => return Err(ConnectError::decode(error).with_response(status, body)),
        };
        parsed
            .validated()
            .map_err(|error| error.with_response(status, body))
    }

    /// Reject `ok: false` and responses without an endpoint.
    pub fn validated(self) -> Result<Self, ConnectError> {
        if !self.ok {
            return Err(ConnectError::rejected(self.error));
        }
        if self.url.is_empty() {
            return Err(ConnectError::decode("handshake response has no socket url"));
        }
        Ok(self)
    }

    /// Split into the socket url and the directory snapshot.
    pub fn into_parts(self, ids: IdConvention) -> (String, Directory) {
        let mut directory = Directory::new(self.users, self.channels).with_convention(ids);
        if let Some(me) = self.me {
            directory = directory.with_me(me);
        }
        (self.url, directory)
    }
}

/// Source of a [`HandshakeResponse`].
///
/// [`HttpHandshake`] talks to the platform; tests substitute their own.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot be used as a `Handshake`",
    label = "missing `Handshake` implementation"
)]
pub trait Handshake: Send + Sync {
    /// Perform the request.
    fn fetch(&self) -> impl Future<Output = Result<HandshakeResponse, ConnectError>> + Send;
}

/// Handshake over HTTPS with a bearer token.
#[derive(Debug)]
pub struct HttpHandshake {
    client: reqwest::Client,
    api_base: String,
    token: SecretString,
}

impl HttpHandshake {
    /// Create a handshake against `api_base`.
    pub fn new(api_base: impl Into<String>, token: SecretString) -> Result<Self, ConnectError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(ConnectError::transport)?;
        Ok(Self::with_client(client, api_base, token))
    }

    /// Create a handshake reusing an existing client.
    pub fn with_client(
        client: reqwest::Client,
        api_base: impl Into<String>,
        token: SecretString,
    ) -> Self {
        let api_base = api_base.into().trim_end_matches('/').to_string();
        Self {
            client,
            api_base,
            token,
        }
    }

    /// Create a handshake from the configured api root and token.
    pub fn from_config(config: &Config) -> Result<Self, ConnectError> {
        let token = SecretString::from(config.token.expose_secret().to_string());
        Self::new(config.api_base.clone(), token)
    }

    /// Full url of the handshake method.
    pub fn endpoint(&self) -> String {
        format!("{}/{HANDSHAKE_METHOD}", self.api_base)
    }
}

impl Handshake for HttpHandshake {
    async fn fetch(&self) -> Result<HandshakeResponse, ConnectError> {
        let endpoint = self.endpoint();
        debug!(%endpoint, "starting handshake");

        let response = self
            .client
            .get(&endpoint)
            .bearer_auth(self.token.expose_secret())
            .send()
            .await
            .map_err(ConnectError::transport)?;

        let status = response.status();
        let body = response.text().await.map_err(ConnectError::transport)?;
        if !status.is_success() {
            return Err(ConnectError::status(status.as_u16(), body));
        }

        HandshakeResponse::from_body(status.as_u16(), body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConnectErrorKind;
    use serde_json::json;

    fn response(value: serde_json::Value) -> HandshakeResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_decode_full_response() {
        let parsed = response(json!({
            "ok": true,
            "url": "wss://example.test/socket",
            "self": {"id": "U0", "name": "hark", "prefs": {}},
            "users": [{"id": "n0", "name": "neil", "real_name": "Neil"}],
            "channels": [{"id": "CG0", "name": "general", "is_member": true}],
        }));

        let (url, directory) = parsed
            .validated()
            .unwrap()
            .into_parts(IdConvention::default());
        assert_eq!(url, "wss://example.test/socket");
        assert_eq!(directory.resolve_user("@neil"), Some("n0"));
        assert_eq!(directory.resolve_channel("#general"), Some("CG0"));
        assert_eq!(directory.me(), Some(&Entity::new("U0", "hark")));
    }

    #[test]
    fn test_rejected_keeps_error_string() {
        let err = response(json!({"ok": false, "error": "invalid_auth"}))
            .validated()
            .unwrap_err();
        assert_eq!(err.kind, ConnectErrorKind::Rejected);
        assert_eq!(err.reason.as_deref(), Some("invalid_auth"));
        assert_eq!(err.body, None);
    }

    #[test]
    fn test_from_body_keeps_status_and_raw_body() {
        let raw = r#"{"ok":false,"error":"account_inactive"}"#;
        let err = HandshakeResponse::from_body(200, raw.to_string()).unwrap_err();
        assert_eq!(err.kind, ConnectErrorKind::Rejected);
        assert_eq!(err.status, Some(200));
        assert_eq!(err.body.as_deref(), Some(raw));
        assert_eq!(err.reason.as_deref(), Some("account_inactive"));

        let err = HandshakeResponse::from_body(200, "nope".to_string()).unwrap_err();
        assert_eq!(err.kind, ConnectErrorKind::Decode);
        assert_eq!(err.status, Some(200));
        assert_eq!(err.body.as_deref(), Some("nope"));
    }

    #[test]
    fn test_missing_url_is_decode_error() {
        let err = response(json!({"ok": true})).validated().unwrap_err();
        assert_eq!(err.kind, ConnectErrorKind::Decode);
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let handshake = HttpHandshake::with_client(
            reqwest::Client::new(),
            "http://localhost:1/api/",
            SecretString::from("t".to_string()),
        );
        assert_eq!(handshake.endpoint(), "http://localhost:1/api/rtm.start");
    }
}
