//! [`HttpDirectory`]: the employee directory over HTTP.
//!
//! One lookup is one request:
//!
//! ```text
//! GET http://<server_fqdn>/api/1.0/employees/?format=json&rfid_tag=<tag>
//! Accept: application/json
//! Content-Type: application/json
//! Cache-Control: no-cache
//! Authorization: Token <license_key>
//! ```
//!
//! Failures are classified, never retried:
//!
//! | What happened                         | Completion          |
//! |---------------------------------------|---------------------|
//! | no HTTP response (refused, DNS, reset)| `TransportError`    |
//! | body cut off mid-read                 | `TransportError`    |
//! | non-2xx status                        | `ProtocolFailure`   |
//! | 2xx with a malformed payload          | `ProtocolFailure`   |
//! | 2xx with a well-formed payload        | `Success`           |

use std::time::Duration;

use reqwest::header::{ACCEPT, AUTHORIZATION, CACHE_CONTROL, CONTENT_TYPE, HeaderMap, HeaderValue};

use crate::{Directory, DirectoryError, DirectoryResponse, LookupCompletion, PendingLookup};

/// Path of the employee collection on the directory server.
pub const EMPLOYEES_PATH: &str = "/api/1.0/employees/";

/// Client-side backstop on a single request.
///
/// Kept well above the session's validation ceiling, so a silent directory
/// is reported as a validation timeout rather than a transport error.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Looks employees up in the directory over HTTP.
///
/// Cheap to clone: `reqwest::Client` is a handle to a shared connection
/// pool.
#[derive(Debug, Clone)]
pub struct HttpDirectory {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpDirectory {
    /// Builds a client for the directory at `server_fqdn`, authenticating
    /// with `license_key`.
    ///
    /// `server_fqdn` is a bare host, optionally with a port
    /// (`directory.example.com`, `10.0.0.5:8000`).
    ///
    /// # Errors
    /// - [`DirectoryError::InvalidServer`] for an empty address or one that
    ///   already carries a scheme or path.
    /// - [`DirectoryError::InvalidCredential`] for an empty key or one that
    ///   is not a valid header value.
    /// - [`DirectoryError::Client`] if the HTTP client cannot be built.
    pub fn new(server_fqdn: &str, license_key: &str) -> Result<Self, DirectoryError> {
        let endpoint = endpoint_for(server_fqdn)?;
        let headers = default_headers(license_key)?;

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(DirectoryError::Client)?;

        tracing::debug!(%endpoint, "directory client ready");
        Ok(Self { client, endpoint })
    }

    /// The collection URL queried for every lookup (without query string).
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Directory for HttpDirectory {
    fn lookup(&self, rfid_tag: &str) -> PendingLookup {
        let request = self
            .client
            .get(&self.endpoint)
            .query(&[("format", "json"), ("rfid_tag", rfid_tag)]);
        let rfid_tag = rfid_tag.to_owned();

        PendingLookup::spawn(async move {
            tracing::debug!(%rfid_tag, "directory lookup sent");
            let completion = fetch(request).await;
            tracing::debug!(%rfid_tag, ?completion, "directory lookup finished");
            completion
        })
    }
}

/// Sends the request and classifies whatever comes back.
async fn fetch(request: reqwest::RequestBuilder) -> LookupCompletion {
    let response = match request.send().await {
        Ok(response) => response,
        Err(e) => return LookupCompletion::TransportError(e.to_string()),
    };

    let status = response.status();
    if !status.is_success() {
        return LookupCompletion::ProtocolFailure(format!("directory returned HTTP {status}"));
    }

    let body = match response.bytes().await {
        Ok(body) => body,
        Err(e) => return LookupCompletion::TransportError(e.to_string()),
    };

    match DirectoryResponse::from_json(&body) {
        Ok(payload) => LookupCompletion::Success(payload),
        Err(e) => LookupCompletion::ProtocolFailure(e.to_string()),
    }
}

fn endpoint_for(server_fqdn: &str) -> Result<String, DirectoryError> {
    let host = server_fqdn.trim().trim_end_matches('/');
    if host.is_empty() || host.contains("://") || host.contains('/') {
        return Err(DirectoryError::InvalidServer(server_fqdn.to_owned()));
    }
    Ok(format!("http://{host}{EMPLOYEES_PATH}"))
}

fn default_headers(license_key: &str) -> Result<HeaderMap, DirectoryError> {
    let key = license_key.trim();
    if key.is_empty() {
        return Err(DirectoryError::InvalidCredential);
    }
    let mut token = HeaderValue::from_str(&format!("Token {key}"))
        .map_err(|_| DirectoryError::InvalidCredential)?;
    // Keeps the key out of reqwest's debug output.
    token.set_sensitive(true);

    let json = HeaderValue::from_static("application/json");
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, json.clone());
    headers.insert(CONTENT_TYPE, json);
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(AUTHORIZATION, token);
    Ok(headers)
}
