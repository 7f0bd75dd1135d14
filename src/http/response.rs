//! Response types and body helpers.
//!
//! # Responsibilities
//! - Define the response type returned by transports and the client
//! - Drain discarded bodies so the transport can reuse the connection
//! - Collect bodies for callers that want the whole payload

use bytes::Bytes;
use http_body_util::{combinators::UnsyncBoxBody, BodyExt, Full};

use crate::error::BoxError;

/// Response body as produced by a transport.
pub type ResponseBody = UnsyncBoxBody<Bytes, BoxError>;

/// Response returned from a call.
pub type Response = http::Response<ResponseBody>;

/// Read a body to the end, discarding every frame. Returns the number of bytes read.
pub async fn drain(mut body: ResponseBody) -> Result<u64, BoxError> {
    let mut drained = 0u64;
    while let Some(frame) = body.frame().await {
        if let Ok(data) = frame?.into_data() {
            drained += data.len() as u64;
        }
    }
    Ok(drained)
}

/// Collect a response body into memory.
pub async fn read_body(response: Response) -> Result<Bytes, BoxError> {
    Ok(response.into_body().collect().await?.to_bytes())
}

/// Build a response body from in-memory bytes.
pub fn full<B: Into<Bytes>>(data: B) -> ResponseBody {
    Full::new(data.into())
        .map_err(|never| match never {})
        .boxed_unsync()
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;
    use http_body_util::StreamBody;
    use hyper::body::Frame;

    #[tokio::test]
    async fn test_drain_counts_bytes() {
        let drained = drain(full("0123456789")).await.unwrap();
        assert_eq!(drained, 10);
    }

    #[tokio::test]
    async fn test_drain_reports_stream_error() {
        let frames: Vec<Result<Frame<Bytes>, BoxError>> = vec![
            Ok(Frame::data(Bytes::from_static(b"partial"))),
            Err("connection reset".into()),
        ];
        let body = StreamBody::new(stream::iter(frames)).boxed_unsync();

        let err = drain(body).await.unwrap_err();
        assert_eq!(err.to_string(), "connection reset");
    }

    #[tokio::test]
    async fn test_read_body() {
        let response = http::Response::new(full("payload"));
        assert_eq!(read_body(response).await.unwrap(), Bytes::from_static(b"payload"));
    }
}
