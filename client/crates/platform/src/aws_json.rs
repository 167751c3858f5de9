//! AWS JSON 1.1 RPC Transport
//!
//! Amazon Cognito user-pool operations used by a public app client
//! (`InitiateAuth`, `SignUp`, `ConfirmSignUp`, ...) are JSON `POST`s to the
//! regional endpoint, distinguished by the `X-Amz-Target` header. They carry
//! the app client id in the body and need no request signing.

use std::time::Duration;

use http::{HeaderMap, StatusCode, header::CONTENT_TYPE};
use kernel::ErrorKind;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thiserror::Error;

/// Content type of every request and response
pub const AMZ_JSON_CONTENT_TYPE: &str = "application/x-amz-json-1.1";

const TARGET_HEADER: &str = "x-amz-target";
const ERROR_TYPE_HEADER: &str = "x-amzn-errortype";

/// Transport-level failure of an RPC call
#[derive(Debug, Error)]
pub enum RpcError {
    /// The service answered with an error document
    #[error("{code}: {message}")]
    Service {
        status: u16,
        code: String,
        message: String,
    },

    /// The request did not complete within the client timeout
    #[error("Request timed out")]
    Timeout,

    /// Connection / TLS / protocol failure
    #[error("Transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// Request or response body was not the expected JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RpcError {
    /// Service error code (e.g. `UserNotFoundException`), if any
    pub fn code(&self) -> Option<&str> {
        match self {
            RpcError::Service { code, .. } => Some(code),
            _ => None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            RpcError::Service { status, .. } => ErrorKind::from_status(*status),
            RpcError::Timeout => ErrorKind::Timeout,
            RpcError::Transport(_) => ErrorKind::Unavailable,
            RpcError::Json(_) => ErrorKind::Internal,
        }
    }
}

impl From<reqwest::Error> for RpcError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RpcError::Timeout
        } else {
            RpcError::Transport(err)
        }
    }
}

/// Error document returned by AWS JSON services
#[derive(Debug, Default, Deserialize)]
struct ErrorEnvelope {
    #[serde(rename = "__type", default)]
    error_type: Option<String>,
    #[serde(alias = "Message", default)]
    message: Option<String>,
}

/// JSON 1.1 RPC client bound to one service endpoint
#[derive(Debug, Clone)]
pub struct JsonRpcClient {
    http: reqwest::Client,
    endpoint: String,
    service: String,
}

impl JsonRpcClient {
    /// `service` is the target prefix, e.g. `AWSCognitoIdentityProviderService`
    pub fn new(
        endpoint: impl Into<String>,
        service: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, RpcError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(RpcError::Transport)?;

        Ok(Self {
            http,
            endpoint: endpoint.into(),
            service: service.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Invoke `operation` with `body` and decode the JSON answer
    pub async fn call<Req, Res>(&self, operation: &str, body: &Req) -> Result<Res, RpcError>
    where
        Req: Serialize + ?Sized,
        Res: DeserializeOwned,
    {
        let payload = serde_json::to_vec(body)?;
        let target = format!("{}.{}", self.service, operation);

        tracing::debug!(target_op = %target, endpoint = %self.endpoint, "RPC call");

        let response = self
            .http
            .post(&self.endpoint)
            .header(CONTENT_TYPE, AMZ_JSON_CONTENT_TYPE)
            .header(TARGET_HEADER, target)
            .body(payload)
            .send()
            .await?;

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.bytes().await?;

        if status.is_success() {
            // Several operations answer with an empty body
            let bytes: &[u8] = if bytes.is_empty() { b"{}" } else { &bytes };
            return Ok(serde_json::from_slice(bytes)?);
        }

        let err = decode_error(status, &headers, &bytes);
        tracing::debug!(operation, error = %err, "RPC call failed");
        Err(err)
    }
}

/// Build an [`RpcError::Service`] from a failed response
///
/// The error code is taken from the `x-amzn-ErrorType` header when present,
/// otherwise from the `__type` member of the body.
pub fn decode_error(status: StatusCode, headers: &HeaderMap, body: &[u8]) -> RpcError {
    let envelope: ErrorEnvelope = serde_json::from_slice(body).unwrap_or_default();

    let raw = headers
        .get(ERROR_TYPE_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
        .or(envelope.error_type)
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("UnknownError").to_string());

    RpcError::Service {
        status: status.as_u16(),
        code: normalize_error_code(&raw).to_string(),
        message: envelope.message.unwrap_or_default(),
    }
}

/// Strip namespace and URI decorations from an AWS error code
///
/// `com.amazonaws...#UserNotFoundException` and
/// `UserNotFoundException:http://internal.amazon.com/` both become
/// `UserNotFoundException`.
pub fn normalize_error_code(raw: &str) -> &str {
    let code = raw.rsplit('#').next().unwrap_or(raw);
    code.split(':').next().unwrap_or(code).trim()
}
