//! Request wrapper with a replayable body.
//!
//! # Responsibilities
//! - Validate method and target when the request is constructed
//! - Own the caller's seekable body for the lifetime of the call
//! - Produce a fresh `http::Request` for every attempt
//!
//! # Design Decisions
//! - The transport never owns the body source. Each attempt streams through a
//!   `NonClosingReader`, so dropping the attempt's body leaves the source intact
//! - Every rewind starts a new generation; readers from earlier attempts that a
//!   transport is still holding get an error instead of interleaving reads

use std::fmt;
use std::future::poll_fn;
use std::io::{self, Cursor, SeekFrom};
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard};
use std::task::{Context as TaskContext, Poll};

use bytes::Bytes;
use futures_util::TryStreamExt;
use http::header::{HeaderName, HeaderValue};
use http::{HeaderMap, Method, Uri};
use http_body_util::{combinators::UnsyncBoxBody, BodyExt, Empty, StreamBody};
use hyper::body::Frame;
use tokio::io::{AsyncRead, AsyncSeek, ReadBuf};
use tokio_util::io::ReaderStream;
use url::Url;

use crate::error::{BoxError, Error, Result};
use crate::http::context::Context;

/// Body type handed to the transport for a single attempt.
pub type RequestBody = UnsyncBoxBody<Bytes, BoxError>;

/// A seekable byte source that can be replayed from its start.
pub trait ReplayableBody: AsyncRead + AsyncSeek + Send + Unpin + 'static {}

impl<T> ReplayableBody for T where T: AsyncRead + AsyncSeek + Send + Unpin + 'static {}

struct Source {
    reader: Box<dyn ReplayableBody>,
    generation: u64,
}

/// Request payload that is rewound before every attempt.
#[derive(Clone)]
pub struct ReplayBody {
    source: Arc<Mutex<Source>>,
}

impl ReplayBody {
    /// Wrap any seekable reader.
    pub fn new<R: ReplayableBody>(reader: R) -> Self {
        Self {
            source: Arc::new(Mutex::new(Source {
                reader: Box::new(reader),
                generation: 0,
            })),
        }
    }

    /// Replay a file from its current handle.
    pub fn file(file: tokio::fs::File) -> Self {
        Self::new(file)
    }

    fn lock(&self) -> io::Result<MutexGuard<'_, Source>> {
        self.source
            .lock()
            .map_err(|_| io::Error::other("request body lock poisoned"))
    }

    /// Seek the source back to offset 0 and fence off earlier readers.
    pub(crate) async fn rewind(&self) -> io::Result<()> {
        // Flush any seek left pending by a previous attempt.
        poll_fn(|cx| -> Poll<io::Result<()>> {
            let mut source = self.lock()?;
            Pin::new(&mut source.reader).poll_complete(cx).map_ok(|_| ())
        })
        .await?;

        {
            let mut source = self.lock()?;
            source.generation += 1;
            Pin::new(&mut source.reader).start_seek(SeekFrom::Start(0))?;
        }

        let position = poll_fn(|cx| -> Poll<io::Result<u64>> {
            let mut source = self.lock()?;
            Pin::new(&mut source.reader).poll_complete(cx)
        })
        .await?;

        if position != 0 {
            return Err(io::Error::other(format!(
                "body seek landed at offset {position} instead of 0"
            )));
        }
        Ok(())
    }

    /// A reader bound to the current generation.
    pub(crate) fn reader(&self) -> io::Result<NonClosingReader> {
        let generation = self.lock()?.generation;
        Ok(NonClosingReader {
            body: self.clone(),
            generation,
        })
    }

    /// Stream the current generation as an HTTP body.
    pub(crate) fn stream(&self) -> io::Result<RequestBody> {
        let stream = ReaderStream::new(self.reader()?)
            .map_ok(Frame::data)
            .map_err(BoxError::from);
        Ok(StreamBody::new(stream).boxed_unsync())
    }
}

impl fmt::Debug for ReplayBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReplayBody").finish_non_exhaustive()
    }
}

impl From<Vec<u8>> for ReplayBody {
    fn from(data: Vec<u8>) -> Self {
        Self::new(Cursor::new(data))
    }
}

impl From<Bytes> for ReplayBody {
    fn from(data: Bytes) -> Self {
        Self::new(Cursor::new(data))
    }
}

impl From<String> for ReplayBody {
    fn from(data: String) -> Self {
        Self::new(Cursor::new(data.into_bytes()))
    }
}

impl From<&'static str> for ReplayBody {
    fn from(data: &'static str) -> Self {
        Self::new(Cursor::new(data.as_bytes()))
    }
}

/// Reader handed to the transport. Dropping it never drops the source.
pub(crate) struct NonClosingReader {
    body: ReplayBody,
    generation: u64,
}

impl AsyncRead for NonClosingReader {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut TaskContext<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let mut source = self.body.lock()?;
        if source.generation != self.generation {
            return Poll::Ready(Err(io::Error::other(
                "request body was rewound for a newer attempt",
            )));
        }
        Pin::new(&mut source.reader).poll_read(cx, buf)
    }
}

/// An HTTP request that can be issued several times.
#[derive(Debug)]
pub struct Request {
    method: Method,
    url: Url,
    uri: Uri,
    headers: HeaderMap,
    body: Option<ReplayBody>,
    context: Context,
}

impl Request {
    /// Build a request, validating the method and target up front.
    pub fn new(
        ctx: Context,
        method: &str,
        target: &str,
        body: Option<ReplayBody>,
    ) -> Result<Self> {
        let method = Method::from_bytes(method.as_bytes())
            .map_err(|_| Error::InvalidMethod(method.to_string()))?;

        let url = Url::parse(target).map_err(|e| Error::InvalidUrl(format!("{target}: {e}")))?;
        match url.scheme() {
            "http" | "https" => {}
            scheme => {
                return Err(Error::InvalidUrl(format!(
                    "{target}: unsupported scheme '{scheme}'"
                )))
            }
        }
        let uri: Uri = url
            .as_str()
            .parse()
            .map_err(|e| Error::InvalidUrl(format!("{target}: {e}")))?;

        Ok(Self {
            method,
            url,
            uri,
            headers: HeaderMap::new(),
            body,
            context: ctx,
        })
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    pub fn body(&self) -> Option<&ReplayBody> {
        self.body.as_ref()
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Set a header, replacing any existing values.
    pub fn set_header(&mut self, name: &str, value: &str) -> Result<()> {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| Error::InvalidHeader(format!("{name}: {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| Error::InvalidHeader(format!("{name}: {e}")))?;
        self.headers.insert(name, value);
        Ok(())
    }

    /// Builder-style variant of [`Request::set_header`].
    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self> {
        self.set_header(name, value)?;
        Ok(self)
    }

    /// Assemble the request sent by one attempt. The body must already be rewound.
    pub(crate) fn to_attempt(&self) -> Result<http::Request<RequestBody>> {
        let body = match &self.body {
            Some(body) => body.stream().map_err(Error::BodyRewind)?,
            None => Empty::<Bytes>::new()
                .map_err(|never| match never {})
                .boxed_unsync(),
        };

        let mut request = http::Request::builder()
            .method(self.method.clone())
            .uri(self.uri.clone())
            .body(body)?;
        *request.headers_mut() = self.headers.clone();
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;

    #[test]
    fn test_rejects_bad_method() {
        let err = Request::new(Context::background(), "GE T", "http://localhost/", None).unwrap_err();
        assert!(matches!(err, Error::InvalidMethod(_)));
    }

    #[test]
    fn test_rejects_bad_target() {
        let err = Request::new(Context::background(), "GET", "not a url", None).unwrap_err();
        assert!(matches!(err, Error::InvalidUrl(_)));

        let err = Request::new(Context::background(), "GET", "ftp://localhost/file", None).unwrap_err();
        assert!(matches!(err, Error::InvalidUrl(_)));
    }

    #[test]
    fn test_accessors() {
        let mut req = Request::new(Context::background(), "POST", "http://localhost:8080/api", None).unwrap();
        req.set_header("content-type", "text/plain").unwrap();

        assert_eq!(*req.method(), Method::POST);
        assert_eq!(req.url().as_str(), "http://localhost:8080/api");
        assert_eq!(req.headers()["content-type"], "text/plain");
        assert!(req.body().is_none());
        assert!(req.set_header("bad header", "x").is_err());
    }

    #[tokio::test]
    async fn test_attempt_carries_method_uri_headers() {
        let req = Request::new(Context::background(), "PUT", "http://localhost/x?y=1", None)
            .unwrap()
            .with_header("x-custom", "1")
            .unwrap();
        let attempt = req.to_attempt().unwrap();

        assert_eq!(*attempt.method(), Method::PUT);
        assert_eq!(attempt.uri(), "http://localhost/x?y=1");
        assert_eq!(attempt.headers()["x-custom"], "1");
        let body = attempt.into_body().collect().await.unwrap().to_bytes();
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_rewind_replays_same_payload() {
        let body = ReplayBody::from("hello world");

        body.rewind().await.unwrap();
        let first = body.stream().unwrap().collect().await.unwrap().to_bytes();

        body.rewind().await.unwrap();
        let second = body.stream().unwrap().collect().await.unwrap().to_bytes();

        assert_eq!(first, Bytes::from_static(b"hello world"));
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_stale_reader_is_fenced() {
        let body = ReplayBody::from(vec![7u8; 16]);
        body.rewind().await.unwrap();
        let mut stale = body.reader().unwrap();

        body.rewind().await.unwrap();
        let mut buf = Vec::new();
        let err = stale.read_to_end(&mut buf).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::Other);

        let mut fresh = body.reader().unwrap();
        fresh.read_to_end(&mut buf).await.unwrap();
        assert_eq!(buf, vec![7u8; 16]);
    }

    #[tokio::test]
    async fn test_dropping_reader_keeps_source() {
        let body = ReplayBody::from("abc");
        body.rewind().await.unwrap();
        drop(body.reader().unwrap());

        body.rewind().await.unwrap();
        let mut out = String::new();
        body.reader().unwrap().read_to_string(&mut out).await.unwrap();
        assert_eq!(out, "abc");
    }
}
