//! Sans-I/O multipart/form-data codec, [rfc7578]
//!
//! The [`Decoder`] turns bytes into [`Event`]s, the [`Encoder`] turns
//! events back into bytes. Neither does any I/O, feed them from whatever
//! transport carries the body.
//!
//! # Example
//!
//! ```rust
//! use form_data_codec::{parse_boundary, Decoder, Encoder, Event, Limits};
//!
//! let boundary = parse_boundary("multipart/form-data; boundary=X-BOUNDARY")?;
//! let body = b"--X-BOUNDARY\r\n\
//!     Content-Disposition: form-data; name=\"file\"; filename=\"a.txt\"\r\n\
//!     Content-Type: text/plain\r\n\
//!     \r\n\
//!     hello world\r\n\
//!     --X-BOUNDARY--\r\n";
//!
//! let mut decoder = Decoder::with_limits(&boundary, Limits::default().stream_size(1024));
//! let mut encoder = Encoder::new(&boundary);
//! let mut output = Vec::new();
//!
//! // the body may arrive in chunks of any size
//! for chunk in body.chunks(7) {
//!     decoder.append(chunk)?;
//!     for event in decoder.events() {
//!         let event = event?;
//!         if let Event::File { filename, .. } = &event {
//!             assert_eq!(filename, "a.txt");
//!         }
//!         output.extend_from_slice(&encoder.send_event(&event)?);
//!     }
//! }
//!
//! decoder.finish();
//! for event in decoder.events() {
//!     output.extend_from_slice(&encoder.send_event(&event?)?);
//! }
//!
//! assert!(decoder.is_complete());
//! // the encoder always opens with a line break before the first boundary
//! assert_eq!(&output[..2], b"\r\n");
//! assert_eq!(&output[2..], &body[..]);
//! # Ok::<(), form_data_codec::Error>(())
//! ```
//!
//! [rfc7578]: <https://tools.ietf.org/html/rfc7578>

#![forbid(unsafe_code)]
#![deny(nonstandard_style)]
#![warn(missing_docs, unreachable_pub)]

mod decoder;
mod encoder;
mod error;
mod event;
mod headers;
mod limits;
mod options;
mod state;
mod utils;

pub use decoder::{Decoder, Events};

pub use encoder::Encoder;

pub use event::Event;

pub use headers::{Headers, HeadersIter};

pub use options::{parse_options_header, unquote_header_value};

pub use state::*;

pub use limits::Limits;

pub use error::Error;

/// A `Result` with [`Error`] as its default error.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Parses the boundary from a `multipart/form-data` content type.
///
/// # Errors
///
/// [`Error::NoMultipart`] when the content type is something else,
/// [`Error::NoBoundary`] when the boundary is absent or empty.
///
/// ```
/// let boundary = form_data_codec::parse_boundary("multipart/form-data; boundary=ABCDEFG")?;
/// assert_eq!(boundary, "ABCDEFG");
/// # Ok::<(), form_data_codec::Error>(())
/// ```
pub fn parse_boundary<T: AsRef<str>>(content_type: T) -> Result<String> {
    let (essence, options) = parse_options_header(Some(content_type.as_ref()));

    if !essence.eq_ignore_ascii_case(mime::MULTIPART_FORM_DATA.essence_str()) {
        return Err(Error::NoMultipart);
    }

    match options.get("boundary") {
        Some(boundary) if !boundary.is_empty() => Ok(boundary.to_string()),
        _ => Err(Error::NoBoundary),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_boundary() {
        assert!(matches!(parse_boundary("text/plain"), Err(Error::NoMultipart)));
        assert!(matches!(parse_boundary("multipart/mixed; boundary=x"), Err(Error::NoMultipart)));
        assert!(matches!(parse_boundary("multipart/form-data"), Err(Error::NoBoundary)));
        assert!(matches!(
            parse_boundary("multipart/form-data; boundary=\"\""),
            Err(Error::NoBoundary)
        ));

        assert_eq!(
            parse_boundary("multipart/form-data; boundary=ABCDEFG").unwrap(),
            "ABCDEFG"
        );
        assert_eq!(
            parse_boundary("Multipart/Form-Data; charset=utf-8; BOUNDARY=\"a b\"").unwrap(),
            "a b"
        );
        assert_eq!(
            parse_boundary("multipart/form-data; boundary=------ABCDEFG").unwrap(),
            "------ABCDEFG"
        );
    }
}
