use reqwest::{header, Client, Error as ReqwestError};
use serde::{Deserialize, Serialize};
use serde_json::{Value, Error as SerdeJsonError};
use std::fmt::{self, Display, Formatter};
use std::time::Duration;

/// Custom error type for KodiClient operations.
#[derive(Debug)]
pub enum KodiClientError {
    /// Error during HTTP request (e.g., network issues, invalid URL).
    HttpRequestError(ReqwestError),
    /// Error serializing the request payload to JSON.
    SerializationError(SerdeJsonError),
    /// Error deserializing the response payload from JSON.
    DeserializationError(SerdeJsonError),
    /// The Kodi response contained an error object.
    RpcError(RpcError),
    /// The Kodi response was missing the 'result' field when expected.
    MissingResult,
    /// The Kodi response was missing the 'id' field when expected.
    MissingId,
    /// Mismatched ID between request and response.
    IdMismatch { expected: u32, received: Option<u32> },
}

impl Display for KodiClientError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            KodiClientError::HttpRequestError(e) => write!(f, "HTTP request error: {}", e),
            KodiClientError::SerializationError(e) => write!(f, "JSON serialization error: {}", e),
            KodiClientError::DeserializationError(e) => write!(f, "JSON deserialization error: {}", e),
            KodiClientError::RpcError(e) => write!(f, "Kodi error {}: {}", e.code, e.message),
            KodiClientError::MissingResult => write!(f, "Kodi response missing 'result' field"),
            KodiClientError::MissingId => write!(f, "Kodi response missing 'id' field"),
            KodiClientError::IdMismatch { expected, received } => {
                write!(f, "Kodi response ID mismatch: expected {}, received {:?}", expected, received)
            }
        }
    }
}

impl std::error::Error for KodiClientError {}

impl From<ReqwestError> for KodiClientError {
    fn from(err: ReqwestError) -> Self {
        KodiClientError::HttpRequestError(err)
    }
}

impl KodiClientError {
    /// True for transport-level failures that mean the polling session is
    /// over and the caller should drop back to the reconnect-wait loop.
    pub fn is_connection(&self) -> bool {
        matches!(self, KodiClientError::HttpRequestError(_))
    }
}

/// The JSON-RPC 2.0 request envelope Kodi expects.
#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u32,
    method: &'a str,
    #[serde(skip_serializing_if = "Value::is_null")]
    params: Value,
}

/// A standard JSON-RPC error object.
#[derive(Debug, Deserialize)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
    #[allow(dead_code)]
    pub data: Option<Value>,
}

/// A standard JSON-RPC response envelope.
#[derive(Debug, Deserialize)]
struct RpcResponse {
    id: Option<u32>,
    result: Option<Value>,
    error: Option<RpcError>,
}

/// A client for Kodi's HTTP-transported JSON-RPC endpoint.
#[derive(Debug)]
pub struct KodiClient {
    id: u32,
    client: Client,
}

impl KodiClient {
    /// Creates a new `KodiClient` with populated headers and timeouts.
    pub fn new() -> Result<Self, KodiClientError> {
        const AGENT: &str = concat!(env!("CARGO_PKG_NAME"), " v", env!("CARGO_PKG_VERSION"));

        let mut headers = header::HeaderMap::new();
        headers.insert("User-Agent", header::HeaderValue::from_static(AGENT));
        headers.insert("Content-Type", header::HeaderValue::from_static("application/json"));
        headers.insert("Accept", header::HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .http1_only()
            .connect_timeout(Duration::from_millis(500))
            .timeout(Duration::from_secs(5))
            .default_headers(headers)
            .build()?;

        Ok(KodiClient {
            id: 1, // Start with ID 1, incremented per request
            client,
        })
    }

    /// Sends one JSON-RPC call and returns the `result` value.
    ///
    /// # Arguments
    /// * `base_url` - Kodi's HTTP root, e.g. `http://localhost:8080`.
    /// * `method` - JSON-RPC method name, e.g. `XBMC.GetInfoLabels`.
    /// * `params` - Method parameters; `Value::Null` for none.
    pub async fn call(
        &mut self,
        base_url: &str,
        method: &str,
        params: Value,
    ) -> Result<Value, KodiClientError> {
        let current_request_id = self.id;
        self.id = self.id.wrapping_add(1);

        let url = format!("{}/jsonrpc", base_url);

        let request = RpcRequest {
            jsonrpc: "2.0",
            id: current_request_id,
            method,
            params,
        };

        let request_body = serde_json::to_string(&request)
            .map_err(KodiClientError::SerializationError)?;

        let response = self.client
            .post(&url)
            .body(request_body)
            .send()
            .await?;

        response.error_for_status_ref()?;

        let response_text = response.text().await?;

        let rpc_response: RpcResponse = serde_json::from_str(&response_text)
            .map_err(KodiClientError::DeserializationError)?;

        if rpc_response.id.is_none() {
            return Err(KodiClientError::MissingId);
        }
        if rpc_response.id != Some(current_request_id) {
            return Err(KodiClientError::IdMismatch {
                expected: current_request_id,
                received: rpc_response.id,
            });
        }

        if let Some(error) = rpc_response.error {
            return Err(KodiClientError::RpcError(error));
        }

        rpc_response.result.ok_or(KodiClientError::MissingResult)
    }

    /// Plain GET for artwork bytes; the URL comes from Files.PrepareDownload
    /// or is already absolute.
    pub async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, KodiClientError> {
        let response = self.client.get(url).send().await?;
        let response = response.error_for_status()?;
        Ok(response.bytes().await?.to_vec())
    }
}
