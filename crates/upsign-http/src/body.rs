//! Upsign HTTP response body type.

use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use http_body::{Body, Frame, SizeHint};
use http_body_util::Full;

/// Response body for Upsign HTTP responses.
///
/// Every endpoint answers with at most one small JSON document, so the body
/// is either a single buffered chunk or nothing.
#[derive(Debug, Default)]
pub struct UpsignResponseBody {
    chunk: Option<Full<Bytes>>,
}

impl UpsignResponseBody {
    /// A body holding `data`.
    #[must_use]
    pub fn from_bytes(data: impl Into<Bytes>) -> Self {
        Self {
            chunk: Some(Full::new(data.into())),
        }
    }

    /// A body with no content.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }
}

impl Body for UpsignResponseBody {
    type Data = Bytes;
    type Error = std::io::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let Some(chunk) = self.get_mut().chunk.as_mut() else {
            return Poll::Ready(None);
        };
        Pin::new(chunk).poll_frame(cx).map_err(|never| match never {})
    }

    fn is_end_stream(&self) -> bool {
        self.chunk.as_ref().is_none_or(Full::is_end_stream)
    }

    fn size_hint(&self) -> SizeHint {
        self.chunk
            .as_ref()
            .map_or_else(|| SizeHint::with_exact(0), Full::size_hint)
    }
}
