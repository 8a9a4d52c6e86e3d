use thiserror::Error;

use crate::Stage;

/// Form-data codec Error
#[derive(Debug, Error)]
pub enum Error {
    /// Payload too large
    #[error("payload is too large, limit to `{0}`")]
    PayloadTooLarge(u64),

    /// Part without a `Content-Disposition` header
    #[error("missing content disposition")]
    MissingContentDisposition,

    /// Event is not valid in the current stage
    #[error("cannot encode `{event}` event in `{stage}` stage")]
    Sequencing {
        /// The kind of the rejected event.
        event: &'static str,
        /// The stage the encoder was in.
        stage: Stage,
    },

    /// Value has characters outside of latin-1
    #[error("`{0}` cannot be encoded as latin-1")]
    Unencodable(String),

    /// The `Content-Type` is not `multipart/form-data`
    #[error("content type is not multipart/form-data")]
    NoMultipart,

    /// No boundary in the `Content-Type`
    #[error("multipart boundary not found in content type")]
    NoBoundary,
}
