//! DevOps Secrets Vault API client.
//!
//! Two calls are supported: exchanging client credentials for an access
//! token (`POST /token`) and reading one secret (`GET /secrets/<path>`).

use crate::transport::{HttpRequest, HttpTransport, ReqwestTransport};
use async_trait::async_trait;
use dsv_core::{Error, Result, SecretDocument, SecretStore};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use std::fmt;
use tracing::debug;

/// Header identifying the calling integration to the vault.
pub const CLIENT_HEADER: &str = "Delinea-DSV-Client";

/// Default value of [`CLIENT_HEADER`].
pub const DEFAULT_CLIENT_NAME: &str = "gh-action";

/// API endpoint for a tenant server such as `tenant.secretsvaultcloud.com`.
pub fn api_endpoint(server: &str) -> String {
    format!("https://{}/v1", server.trim_end_matches('/'))
}

/// Bearer token returned by the token exchange.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

#[derive(Debug, Serialize)]
struct TokenRequest<'a> {
    grant_type: &'static str,
    client_id: &'a str,
    client_secret: &'a str,
}

/// Vault API client over an injectable transport.
pub struct VaultClient<T = ReqwestTransport> {
    transport: T,
    endpoint: String,
    client_name: String,
}

impl VaultClient<ReqwestTransport> {
    /// Client for a tenant server using the default reqwest transport.
    pub fn for_server(server: &str) -> Result<Self> {
        Ok(Self::new(ReqwestTransport::new()?, api_endpoint(server)))
    }
}

impl<T: HttpTransport> VaultClient<T> {
    pub fn new(transport: T, endpoint: impl Into<String>) -> Self {
        Self {
            transport,
            endpoint: endpoint.into(),
            client_name: DEFAULT_CLIENT_NAME.to_string(),
        }
    }

    /// Override the value sent in the client identification header.
    pub fn with_client_name(mut self, name: impl Into<String>) -> Self {
        self.client_name = name.into();
        self
    }

    /// Exchange client credentials for an access token.
    pub async fn authenticate(&self, client_id: &str, client_secret: &str) -> Result<AccessToken> {
        let body = serde_json::to_vec(&TokenRequest {
            grant_type: "client_credentials",
            client_id,
            client_secret,
        })?;
        let url = format!("{}/token", self.endpoint);

        let response = self.request_json(Method::POST, url, None, Some(body)).await?;

        response
            .get("accessToken")
            .and_then(|t| t.as_str())
            .map(AccessToken::new)
            .ok_or_else(|| Error::MissingField {
                field: "access token".to_string(),
            })
    }

    /// Fetch the secret document stored at `path`.
    ///
    /// `path` goes into the URL unescaped; callers validate it first.
    pub async fn fetch_secret(&self, token: &AccessToken, path: &str) -> Result<SecretDocument> {
        let url = format!("{}/secrets/{}", self.endpoint, path);
        self.request_json(Method::GET, url, Some(token), None).await
    }

    /// Authenticate and bind the token to this client.
    pub async fn login(self, client_id: &str, client_secret: &str) -> Result<VaultSession<T>> {
        let token = self.authenticate(client_id, client_secret).await?;
        Ok(VaultSession {
            client: self,
            token,
        })
    }

    async fn request_json(
        &self,
        method: Method,
        url: String,
        token: Option<&AccessToken>,
        body: Option<Vec<u8>>,
    ) -> Result<serde_json::Value> {
        let mut request = HttpRequest::new(method.clone(), url.clone())
            .header("Content-Type", "application/json")
            .header(CLIENT_HEADER, self.client_name.as_str());
        if let Some(token) = token {
            request = request.header("Authorization", token.as_str());
        }
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = self.transport.send(request).await?;
        if response.status != StatusCode::OK {
            return Err(Error::HttpStatus {
                method: method.to_string(),
                url,
                status: response.status.to_string(),
            });
        }

        debug!(%method, %url, "Decoding response");
        Ok(serde_json::from_slice(&response.body)?)
    }
}

/// A vault client holding a valid access token.
pub struct VaultSession<T = ReqwestTransport> {
    client: VaultClient<T>,
    token: AccessToken,
}

#[async_trait]
impl<T: HttpTransport> SecretStore for VaultSession<T> {
    async fn fetch_secret(&self, path: &str) -> Result<SecretDocument> {
        self.client.fetch_secret(&self.token, path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::HttpResponse;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Mutex;

    /// Replays one canned outcome and records every request.
    struct FakeTransport {
        outcome: std::result::Result<(StatusCode, &'static str), &'static str>,
        requests: Mutex<Vec<HttpRequest>>,
    }

    impl FakeTransport {
        fn respond(status: u16, body: &'static str) -> Self {
            Self {
                outcome: Ok((StatusCode::from_u16(status).unwrap(), body)),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn fail(message: &'static str) -> Self {
            Self {
                outcome: Err(message),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn requests(&self) -> Vec<HttpRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl HttpTransport for FakeTransport {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
            self.requests.lock().unwrap().push(request);
            match self.outcome {
                Ok((status, body)) => Ok(HttpResponse::new(status, body)),
                Err(message) => Err(Error::Transport(message.to_string())),
            }
        }
    }

    fn client(transport: FakeTransport) -> VaultClient<FakeTransport> {
        VaultClient::new(transport, "test.example.com")
    }

    #[tokio::test]
    async fn test_authenticate_happy_path() {
        let vault = client(FakeTransport::respond(200, r#"{"accessToken":"tok-123"}"#));

        let token = vault.authenticate("client_id", "client_secret").await.unwrap();
        assert_eq!(token.as_str(), "tok-123");

        let requests = vault.transport.requests();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.url, "test.example.com/token");
        assert_eq!(request.header_value("Content-Type"), Some("application/json"));
        assert_eq!(request.header_value(CLIENT_HEADER), Some("gh-action"));
        assert_eq!(request.header_value("Authorization"), None);

        let body: serde_json::Value =
            serde_json::from_slice(request.body.as_deref().unwrap()).unwrap();
        assert_eq!(
            body,
            json!({
                "grant_type": "client_credentials",
                "client_id": "client_id",
                "client_secret": "client_secret"
            })
        );
    }

    #[tokio::test]
    async fn test_authenticate_escapes_credentials() {
        let vault = client(FakeTransport::respond(200, r#"{"accessToken":"t"}"#));

        vault.authenticate("id\"", "sec\\ret").await.unwrap();

        let request = &vault.transport.requests()[0];
        let body: serde_json::Value =
            serde_json::from_slice(request.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["client_id"], "id\"");
        assert_eq!(body["client_secret"], "sec\\ret");
    }

    #[tokio::test]
    async fn test_authenticate_bad_request() {
        let vault = client(FakeTransport::respond(400, r#"{"accessToken":"ignored"}"#));

        let err = vault.authenticate("client_id", "client_secret").await.unwrap_err();

        assert!(matches!(err, Error::HttpStatus { .. }));
        assert_eq!(err.to_string(), "POST test.example.com/token: 400 Bad Request");
    }

    #[tokio::test]
    async fn test_authenticate_empty_endpoint() {
        let vault = VaultClient::new(FakeTransport::respond(400, ""), "");

        let err = vault.authenticate("client_id", "client_secret").await.unwrap_err();
        assert_eq!(err.to_string(), "POST /token: 400 Bad Request");
    }

    #[tokio::test]
    async fn test_authenticate_transport_error() {
        let vault = client(FakeTransport::fail("error"));

        let err = vault.authenticate("client_id", "client_secret").await.unwrap_err();

        assert!(matches!(err, Error::Transport(_)));
        assert_eq!(err.to_string(), "API call failed: error");
    }

    #[tokio::test]
    async fn test_authenticate_empty_body() {
        let vault = client(FakeTransport::respond(200, ""));

        let err = vault.authenticate("client_id", "client_secret").await.unwrap_err();

        assert!(matches!(err, Error::Decode(_)));
        assert!(err.to_string().starts_with("could not unmarshal response body"));
    }

    #[tokio::test]
    async fn test_authenticate_missing_token() {
        let vault = client(FakeTransport::respond(200, r#"{"test":"token"}"#));

        let err = vault.authenticate("client_id", "client_secret").await.unwrap_err();

        assert!(matches!(err, Error::MissingField { .. }));
        assert_eq!(err.to_string(), "could not read access token from response");
    }

    #[tokio::test]
    async fn test_authenticate_non_string_token() {
        let vault = client(FakeTransport::respond(200, r#"{"accessToken":42}"#));

        let err = vault.authenticate("client_id", "client_secret").await.unwrap_err();
        assert!(matches!(err, Error::MissingField { .. }));
    }

    #[tokio::test]
    async fn test_fetch_secret_happy_path() {
        let vault = client(FakeTransport::respond(200, r#"{"key":"val"}"#))
            .with_client_name("gitlab-action");
        let token = AccessToken::new("token");

        let doc = vault.fetch_secret(&token, "folder1/secret1").await.unwrap();
        assert_eq!(doc, json!({"key": "val"}));

        let request = &vault.transport.requests()[0];
        assert_eq!(request.method, Method::GET);
        assert_eq!(request.url, "test.example.com/secrets/folder1/secret1");
        assert_eq!(request.header_value("Authorization"), Some("token"));
        assert_eq!(request.header_value(CLIENT_HEADER), Some("gitlab-action"));
        assert!(request.body.is_none());
    }

    #[tokio::test]
    async fn test_fetch_secret_bad_request() {
        let vault = client(FakeTransport::respond(400, ""));

        let err = vault
            .fetch_secret(&AccessToken::new("token"), "folder1/secret1")
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "GET test.example.com/secrets/folder1/secret1: 400 Bad Request"
        );
    }

    #[tokio::test]
    async fn test_fetch_secret_transport_error() {
        let vault = client(FakeTransport::fail("error"));

        let err = vault
            .fetch_secret(&AccessToken::new("token"), "folder1/secret1")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "API call failed: error");
    }

    #[tokio::test]
    async fn test_fetch_secret_empty_body() {
        let vault = client(FakeTransport::respond(200, ""));

        let err = vault
            .fetch_secret(&AccessToken::new("token"), "folder1/secret1")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }

    #[tokio::test]
    async fn test_session_uses_token_for_fetch() {
        let vault = client(FakeTransport::respond(
            200,
            r#"{"accessToken":"tok-123","data":{"k":"v"}}"#,
        ));

        let session = vault.login("id", "secret").await.unwrap();
        let doc = session.fetch_secret("a/b").await.unwrap();

        assert_eq!(doc["data"]["k"], "v");
        let requests = session.client.transport.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].header_value("Authorization"), Some("tok-123"));
    }

    #[test]
    fn test_access_token_debug_is_redacted() {
        let token = AccessToken::new("super-secret");
        assert_eq!(format!("{token:?}"), "AccessToken(***)");
        assert_eq!(token.as_str(), "super-secret");
    }

    #[test]
    fn test_api_endpoint() {
        assert_eq!(
            api_endpoint("tenant.secretsvaultcloud.com"),
            "https://tenant.secretsvaultcloud.com/v1"
        );
    }
}
