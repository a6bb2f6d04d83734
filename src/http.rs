use crate::decoder::decode_body;
use crate::draft::{canonical_header_key, HeaderSet, RequestDraft};

use anyhow::{Context, Result};
use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue, CONTENT_ENCODING},
    Client, Method, Request, Version,
};
use std::fmt::Debug;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info};

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(2);

/// A snapshot of the draft taken when the user asks to run it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedRequest {
    pub method: String,
    pub url: String,
    pub version: Version,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl PreparedRequest {
    pub fn from_draft(draft: &RequestDraft) -> Self {
        let headers = draft
            .effective_headers()
            .into_iter()
            .flat_map(|(name, values)| values.into_iter().map(move |v| (name.clone(), v)))
            .collect();

        PreparedRequest {
            method: draft.method().to_string(),
            url: draft.url(),
            version: if draft.proto_minor() == 0 {
                Version::HTTP_10
            } else {
                Version::HTTP_11
            },
            headers,
            body: draft.body().map(str::to_string),
        }
    }
}

/// A fully buffered response.
#[derive(Debug, Clone)]
pub struct ResponseCapture {
    status: u16,
    protocol: String,
    status_line: String,
    headers: HeaderSet,
    body: String,
}

impl ResponseCapture {
    pub fn new(status: u16, protocol: &str, headers: HeaderSet, body: String) -> Self {
        let reason = reqwest::StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("");
        ResponseCapture {
            status,
            protocol: protocol.to_string(),
            status_line: format!("{status} {reason}").trim_end().to_string(),
            headers,
            body,
        }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    pub fn status_line(&self) -> &str {
        &self.status_line
    }

    pub fn headers(&self) -> &HeaderSet {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&canonical_header_key(name))
            .and_then(|v| v.first())
            .map(String::as_str)
    }

    pub fn content_type(&self) -> &str {
        self.header("content-type").unwrap_or_default()
    }

    pub fn body(&self) -> &str {
        &self.body
    }
}

pub type Outcome = std::result::Result<ResponseCapture, String>;

/// An execution outcome paired with how long it took and which run it
/// belongs to.
#[derive(Debug)]
pub struct Timed<T> {
    pub generation: u64,
    pub elapsed: Duration,
    pub payload: T,
}

pub fn version_str(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "HTTP/0.9",
        Version::HTTP_10 => "HTTP/1.0",
        Version::HTTP_2 => "HTTP/2.0",
        Version::HTTP_3 => "HTTP/3.0",
        _ => "HTTP/1.1",
    }
}

fn header_set(headers: &HeaderMap) -> HeaderSet {
    let mut set = HeaderSet::new();
    for (name, value) in headers {
        set.entry(canonical_header_key(name.as_str()))
            .or_default()
            .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
    }
    set
}

#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("client", &"Client")
            .finish()
    }
}

impl HttpClient {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(HttpClient { client })
    }

    pub async fn request(&self, prepared: &PreparedRequest) -> Result<ResponseCapture> {
        let req = self.build_request(prepared)?;
        let res = self.client.execute(req).await?;

        let status = res.status().as_u16();
        let protocol = version_str(res.version());
        let headers = header_set(res.headers());
        let content_encoding = res
            .headers()
            .get(CONTENT_ENCODING)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let body_bytes = res.bytes().await?;
        let body = decode_body(body_bytes, &content_encoding);

        Ok(ResponseCapture::new(status, protocol, headers, body))
    }

    fn build_request(&self, prepared: &PreparedRequest) -> Result<Request> {
        let method = Method::from_bytes(prepared.method.as_bytes())
            .with_context(|| format!("Invalid method: {}", prepared.method))?;

        let mut req_builder = self
            .client
            .request(method, prepared.url.as_str())
            .version(prepared.version);

        for (name, value) in &prepared.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .with_context(|| format!("Invalid header name: {name}"))?;
            let value = HeaderValue::from_str(value)
                .with_context(|| format!("Invalid value for header {name}"))?;
            req_builder = req_builder.header(name, value);
        }

        if let Some(body) = &prepared.body {
            req_builder = req_builder.body(body.clone());
        }

        Ok(req_builder.build()?)
    }

    /// Sends the request and measures it. Failures become the error side of
    /// the outcome so they can be shown to the user.
    pub async fn run(&self, prepared: PreparedRequest, generation: u64) -> Timed<Outcome> {
        let start = Instant::now();
        info!(generation, method = %prepared.method, url = %prepared.url, "sending request");

        let payload = self
            .request(&prepared)
            .await
            .map_err(|e| format!("{e:#}"));
        let elapsed = start.elapsed();

        match &payload {
            Ok(res) => info!(generation, status = res.status(), ?elapsed, "response received"),
            Err(e) => info!(generation, ?elapsed, "request failed: {e}"),
        }

        Timed {
            generation,
            elapsed,
            payload,
        }
    }

    /// Runs the request on the tokio runtime and delivers the timed outcome
    /// to `tx` once.
    pub fn spawn(&self, prepared: PreparedRequest, generation: u64, tx: UnboundedSender<Timed<Outcome>>) {
        let client = self.clone();
        tokio::spawn(async move {
            let timed = client.run(prepared, generation).await;
            if tx.send(timed).is_err() {
                debug!(generation, "event loop gone, dropping outcome");
            }
        });
    }
}
