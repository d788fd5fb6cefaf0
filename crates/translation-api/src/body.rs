//! Request body collection under a size ceiling.
//!
//! Streaming sources are read chunk by chunk and dropped as soon as the
//! running total passes the limit, so the upstream sender is cut off
//! instead of being drained.

use axum::body::Body;
use bytes::{Bytes, BytesMut};
use futures::StreamExt;
use thiserror::Error;

/// Where the request bytes come from.
#[derive(Debug)]
pub enum BodySource {
    /// Bytes already in memory; only the length is checked.
    Buffered(Bytes),
    /// A body that is still arriving.
    Streaming(Body),
}

/// Body collection failures. Both map to `413`.
#[derive(Debug, Error)]
pub enum CollectError {
    #[error("File size exceeds maximum allowed size of {limit} bytes.")]
    SizeExceeded { limit: usize },

    #[error("Failed to read request body: {0}")]
    Transport(String),
}

/// Collect `source` into one buffer of at most `limit` bytes.
pub async fn collect_body(source: BodySource, limit: usize) -> Result<Bytes, CollectError> {
    match source {
        BodySource::Buffered(data) => {
            if data.len() > limit {
                return Err(CollectError::SizeExceeded { limit });
            }
            Ok(data)
        }
        BodySource::Streaming(body) => {
            let mut stream = body.into_data_stream();
            let mut buf = BytesMut::new();

            while let Some(chunk) = stream.next().await {
                let chunk = chunk.map_err(|e| CollectError::Transport(e.to_string()))?;

                if buf.len() + chunk.len() > limit {
                    // dropping the stream aborts the upload
                    return Err(CollectError::SizeExceeded { limit });
                }
                buf.extend_from_slice(&chunk);
            }

            Ok(buf.freeze())
        }
    }
}
