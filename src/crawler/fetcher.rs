//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the mirror, including:
//! - Building a client that presents itself like a desktop browser
//! - GET requests raced against run cancellation
//! - Status classification
//! - Exposing response bodies as an async byte stream

use super::cancel::CancelToken;
use crate::config::HttpConfig;
use crate::MirrorError;
use bytes::{Buf, Bytes};
use futures::stream::BoxStream;
use futures::StreamExt;
use reqwest::header::{
    HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONNECTION, CONTENT_TYPE,
};
use reqwest::{Client, Response};
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::io::{AsyncRead, ReadBuf};

const BROWSER_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";
const BROWSER_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.5";

/// Builds the HTTP client shared by every request of a run
///
/// Redirects are followed with reqwest's default policy (up to 10 hops).
///
/// # Arguments
///
/// * `config` - The HTTP section of the mirror configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use site_mirror::config::HttpConfig;
/// use site_mirror::crawler::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(BROWSER_ACCEPT));
    headers.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_static(BROWSER_ACCEPT_LANGUAGE),
    );
    headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));

    Client::builder()
        .user_agent(config.user_agent.as_str())
        .default_headers(headers)
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// A successful response whose body has not been read yet
#[derive(Debug)]
pub struct FetchedResponse {
    /// The URL that was requested
    pub url: String,

    /// Content-Type header value, if any
    pub content_type: Option<String>,

    /// Content-Length header value, if any
    pub content_length: Option<u64>,

    response: Response,
}

impl FetchedResponse {
    /// Reads the whole body as text
    pub async fn text(self) -> Result<String, MirrorError> {
        let url = self.url;
        self.response
            .text()
            .await
            .map_err(|source| MirrorError::Fetch { url, source })
    }

    /// Turns the body into an [`AsyncRead`]
    pub fn into_reader(self) -> BodyReader {
        BodyReader::new(self.response.bytes_stream().boxed())
    }
}

/// Issues a GET for `url`
///
/// # Returns
///
/// * `Ok(FetchedResponse)` - A 2xx response, body still unread
/// * `Err(MirrorError::Fetch)` - Transport failure or timeout
/// * `Err(MirrorError::HttpStatus)` - Any non-2xx status after redirects
/// * `Err(MirrorError::Cancelled)` - The run was cancelled while waiting
pub async fn fetch_url(
    client: &Client,
    url: &str,
    cancel: &CancelToken,
) -> Result<FetchedResponse, MirrorError> {
    if cancel.is_cancelled() {
        return Err(MirrorError::Cancelled);
    }

    let response = tokio::select! {
        result = client.get(url).send() => result.map_err(|source| MirrorError::Fetch {
            url: url.to_string(),
            source,
        })?,
        _ = cancel.cancelled() => return Err(MirrorError::Cancelled),
    };

    let status = response.status();
    if !status.is_success() {
        return Err(MirrorError::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    Ok(FetchedResponse {
        url: url.to_string(),
        content_type,
        content_length: response.content_length(),
        response,
    })
}

/// Adapts a chunked body stream to [`AsyncRead`]
///
/// Chunks larger than the caller's buffer are kept and handed out over
/// several reads.
pub struct BodyReader {
    stream: BoxStream<'static, reqwest::Result<Bytes>>,
    pending: Bytes,
}

impl BodyReader {
    pub fn new(stream: BoxStream<'static, reqwest::Result<Bytes>>) -> Self {
        Self {
            stream,
            pending: Bytes::new(),
        }
    }
}

impl AsyncRead for BodyReader {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        while self.pending.is_empty() {
            match self.stream.poll_next_unpin(cx) {
                Poll::Ready(Some(Ok(chunk))) => self.pending = chunk,
                Poll::Ready(Some(Err(e))) => {
                    return Poll::Ready(Err(io::Error::new(io::ErrorKind::Other, e)))
                }
                // End of body
                Poll::Ready(None) => return Poll::Ready(Ok(())),
                Poll::Pending => return Poll::Pending,
            }
        }

        let n = self.pending.len().min(buf.remaining());
        buf.put_slice(&self.pending[..n]);
        self.pending.advance(n);
        Poll::Ready(Ok(()))
    }
}
