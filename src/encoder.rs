use bytes::{BufMut, Bytes, BytesMut};
use tracing::trace;

use crate::{
    utils::{latin1_encode, CRLF, DASHES},
    Error, Event, Headers, Result, Stage,
};

/// Serializes events into a multipart message.
///
/// Enforces the same stage order the [`Decoder`](crate::Decoder) produces.
#[derive(Debug)]
pub struct Encoder {
    stage: Stage,
    boundary: Bytes,
}

impl Encoder {
    /// Creates a new encoder.
    pub fn new<B: AsRef<[u8]>>(boundary: B) -> Self {
        Self {
            stage: Stage::Preamble,
            boundary: Bytes::copy_from_slice(boundary.as_ref()),
        }
    }

    /// Gets the current stage.
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Gets the boundary.
    pub fn boundary(&self) -> &[u8] {
        &self.boundary
    }

    /// Serializes an event.
    ///
    /// # Errors
    ///
    /// [`Error::Sequencing`] when the event is not allowed in the current
    /// stage, [`Error::Unencodable`] when a part name, filename or header
    /// is not latin-1. The stage is left unchanged on error.
    pub fn send_event(&mut self, event: &Event) -> Result<Bytes> {
        let bytes = match (event, self.stage) {
            (Event::Preamble(data), Stage::Preamble) => {
                self.transition(Stage::Part);
                data.clone()
            }
            (Event::Field { name, headers }, Stage::Preamble | Stage::Part | Stage::Data) => {
                let bytes = self.encode_part(name, None, headers)?;
                self.transition(Stage::Data);
                bytes
            }
            (
                Event::File {
                    name,
                    filename,
                    headers,
                },
                Stage::Preamble | Stage::Part | Stage::Data,
            ) => {
                let bytes = self.encode_part(name, Some(filename.as_str()), headers)?;
                self.transition(Stage::Data);
                bytes
            }
            (Event::Data { data, .. }, Stage::Data) => data.clone(),
            (Event::Epilogue(data), _) => {
                let mut buf = BytesMut::with_capacity(8 + self.boundary.len() + data.len());
                buf.put_slice(&CRLF);
                buf.put_slice(&DASHES);
                buf.put_slice(&self.boundary);
                buf.put_slice(&DASHES);
                buf.put_slice(&CRLF);
                buf.put_slice(data);
                self.transition(Stage::Complete);
                buf.freeze()
            }
            (event, stage) => {
                return Err(Error::Sequencing {
                    event: event.kind(),
                    stage,
                })
            }
        };

        trace!("encoded {}: {} bytes", event.kind(), bytes.len());
        Ok(bytes)
    }

    fn transition(&mut self, stage: Stage) {
        trace!("{} -> {}", self.stage, stage);
        self.stage = stage;
    }

    fn encode_part(&self, name: &str, filename: Option<&str>, headers: &Headers) -> Result<Bytes> {
        let mut buf = BytesMut::new();

        // `\r\n--boundary\r\n`
        buf.put_slice(&CRLF);
        buf.put_slice(&DASHES);
        buf.put_slice(&self.boundary);
        buf.put_slice(&CRLF);

        buf.put_slice(b"Content-Disposition: form-data; name=\"");
        buf.put_slice(&latin1(name)?);
        buf.put_u8(b'"');
        if let Some(filename) = filename {
            buf.put_slice(b"; filename=\"");
            buf.put_slice(&latin1(filename)?);
            buf.put_u8(b'"');
        }
        buf.put_slice(&CRLF);

        for (k, v) in headers {
            if k.eq_ignore_ascii_case("content-disposition") {
                continue;
            }
            buf.put_slice(&latin1(k)?);
            buf.put_slice(b": ");
            buf.put_slice(&latin1(v)?);
            buf.put_slice(&CRLF);
        }
        buf.put_slice(&CRLF);

        Ok(buf.freeze())
    }
}

fn latin1(s: &str) -> Result<Vec<u8>> {
    latin1_encode(s).ok_or_else(|| Error::Unencodable(s.to_string()))
}
