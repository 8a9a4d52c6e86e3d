use std::fmt;

use bytes::{Buf, Bytes, BytesMut};
use tracing::{debug, trace};

use crate::{
    headers::parse_part_headers,
    parse_options_header,
    utils::{find_blank_line, last_line_break, Delimiter, Scan, SEARCH_SLACK},
    Error, Event, Limits, Result, Stage,
};

const DEFAULT_BUF_SIZE: usize = 8 * 1024;

/// Incremental multipart decoder.
///
/// Bytes are pushed in with [`append`](Self::append), events are pulled out
/// with [`next_event`](Self::next_event). `Ok(None)` means more input is
/// needed, or that the message is complete.
///
/// ```
/// use form_data_codec::{Decoder, Event};
///
/// let mut decoder = Decoder::new("b1");
/// decoder.append(b"--b1\r\nContent-Disposition: form-data; name=\"x\"\r\n\r\nhello\r\n--b1--\r\n")?;
/// decoder.finish();
///
/// let events = decoder.events().collect::<Result<Vec<_>, _>>()?;
/// assert_eq!(events.len(), 4);
/// assert_eq!(events[1].name(), Some("x"));
/// assert!(matches!(&events[2], Event::Data { data, more_data: false } if data == "hello"));
/// # Ok::<(), form_data_codec::Error>(())
/// ```
pub struct Decoder {
    eof: bool,
    stage: Stage,
    length: u64,
    limits: Limits,
    buffer: BytesMut,
    boundary: Bytes,
    delimiter: Delimiter,
    search_position: usize,
}

impl Decoder {
    /// Creates a new decoder without a size limit.
    pub fn new<B: AsRef<[u8]>>(boundary: B) -> Self {
        Self::with_limits(boundary, Limits::default())
    }

    /// Creates a new decoder with limits.
    pub fn with_limits<B: AsRef<[u8]>>(boundary: B, limits: Limits) -> Self {
        let boundary = Bytes::copy_from_slice(boundary.as_ref());

        Self {
            eof: false,
            stage: Stage::Preamble,
            length: 0,
            limits,
            buffer: BytesMut::with_capacity(DEFAULT_BUF_SIZE),
            delimiter: Delimiter::new(&boundary),
            boundary,
            search_position: 0,
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

    /// Gets the number of bytes appended so far.
    pub fn len(&self) -> u64 {
        self.length
    }

    /// Checks if nothing has been appended yet.
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Checks if the end of input was signaled.
    pub fn is_eof(&self) -> bool {
        self.eof
    }

    /// Checks if the decoder has nothing more to produce.
    pub fn is_complete(&self) -> bool {
        self.stage == Stage::Complete
    }

    /// Appends a chunk of the message.
    ///
    /// Bytes appended after [`finish`](Self::finish) are dropped.
    ///
    /// # Errors
    ///
    /// [`Error::PayloadTooLarge`] when the buffered bytes would exceed the
    /// limit. The decoder drops its buffer and stops making progress.
    pub fn append(&mut self, data: &[u8]) -> Result<()> {
        if data.is_empty() {
            return Ok(());
        }

        if self.stage == Stage::Complete {
            trace!("decoder is complete, dropping {} bytes", data.len());
            return Ok(());
        }

        if self.eof {
            debug!("input already finished, dropping {} bytes", data.len());
            return Ok(());
        }

        let l = data.len();
        if let Some(max) = self
            .limits
            .checked_stream_size((self.buffer.len() + l) as u64)
        {
            debug!("buffer exceeds {} bytes", max);
            self.poison();
            return Err(Error::PayloadTooLarge(max));
        }

        self.buffer.extend_from_slice(data);
        self.length += l as u64;
        trace!("appended {}/{} bytes", l, self.length);

        Ok(())
    }

    /// Signals the end of input, no more bytes will be appended.
    pub fn finish(&mut self) {
        trace!("end of input");
        self.eof = true;
    }

    /// Produces the next event, if the buffered input holds one.
    ///
    /// # Errors
    ///
    /// [`Error::MissingContentDisposition`] when a part has no
    /// `Content-Disposition` header. The decoder stops making progress.
    pub fn next_event(&mut self) -> Result<Option<Event>> {
        match self.stage {
            Stage::Preamble => Ok(self.decode_preamble()),
            Stage::Part => self.decode_part(),
            Stage::Data => Ok(self.decode_data()),
            Stage::Epilogue => Ok(self.decode_epilogue()),
            Stage::Complete => Ok(None),
        }
    }

    /// Drains the events available from the buffered input.
    pub fn events(&mut self) -> Events<'_> {
        Events { decoder: self }
    }

    fn transition(&mut self, stage: Stage) {
        trace!("{} -> {}", self.stage, stage);
        self.stage = stage;
        self.search_position = 0;
    }

    fn poison(&mut self) {
        self.buffer.clear();
        self.transition(Stage::Complete);
    }

    fn take_epilogue(&mut self) -> Event {
        let data = self.buffer.split().freeze();
        self.transition(Stage::Complete);
        Event::Epilogue(data)
    }

    fn decode_preamble(&mut self) -> Option<Event> {
        match self
            .delimiter
            .scan(&self.buffer, self.search_position, false, self.eof)
        {
            Scan::Found(m) => {
                let data = self.buffer.split_to(m.start).freeze();
                self.buffer.advance(m.end - m.start);
                self.transition(if m.last { Stage::Epilogue } else { Stage::Part });
                Some(Event::Preamble(data))
            }
            Scan::Partial(start) => {
                self.search_position = start;
                None
            }
            Scan::NotFound if self.eof => {
                debug!("no boundary before the end of input");
                Some(self.take_epilogue())
            }
            Scan::NotFound => {
                self.search_position = self
                    .buffer
                    .len()
                    .saturating_sub(self.boundary.len() + SEARCH_SLACK);
                None
            }
        }
    }

    fn decode_part(&mut self) -> Result<Option<Event>> {
        let Some((start, end)) = find_blank_line(&self.buffer, self.search_position) else {
            if self.eof {
                debug!("part headers are not terminated before the end of input");
                return Ok(Some(self.take_epilogue()));
            }
            self.search_position = self.buffer.len().saturating_sub(SEARCH_SLACK);
            return Ok(None);
        };

        let headers = parse_part_headers(&self.buffer[..start]);
        self.buffer.advance(end);

        let Some(disposition) = headers
            .get_ignore_case("Content-Disposition")
            .filter(|v| !v.is_empty())
        else {
            self.poison();
            return Err(Error::MissingContentDisposition);
        };

        let (_, options) = parse_options_header(Some(disposition));
        let name = options.get("name").unwrap_or_default().to_string();

        let event = match options.get("filename") {
            Some(filename) => Event::File {
                name,
                filename: filename.to_string(),
                headers,
            },
            None => Event::Field { name, headers },
        };
        trace!("part decoded: {:?}", event);

        self.transition(Stage::Data);
        Ok(Some(event))
    }

    fn decode_data(&mut self) -> Option<Event> {
        // without `--boundary` there is no delimiter to look for
        let scan = if self.delimiter.occurs_in(&self.buffer) {
            self.delimiter.scan(&self.buffer, 0, true, self.eof)
        } else {
            Scan::NotFound
        };

        let n = match scan {
            Scan::Found(m) => {
                let data = self.buffer.split_to(m.start).freeze();
                self.buffer.advance(m.end - m.start);
                self.transition(if m.last { Stage::Epilogue } else { Stage::Part });
                return Some(Event::Data {
                    data,
                    more_data: false,
                });
            }
            Scan::NotFound if self.eof => {
                debug!("part is not closed before the end of input");
                let data = self.buffer.split().freeze();
                self.transition(Stage::Epilogue);
                return Some(Event::Data {
                    data,
                    more_data: false,
                });
            }
            // withhold a line break that may start the delimiter
            Scan::Partial(start) => last_line_break(&self.buffer).min(start),
            Scan::NotFound => last_line_break(&self.buffer),
        };

        if n == 0 {
            return None;
        }

        trace!("data decoded: {} bytes", n);
        Some(Event::Data {
            data: self.buffer.split_to(n).freeze(),
            more_data: true,
        })
    }

    fn decode_epilogue(&mut self) -> Option<Event> {
        if !self.eof {
            return None;
        }
        Some(self.take_epilogue())
    }
}

impl fmt::Debug for Decoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Decoder")
            .field("eof", &self.eof)
            .field("stage", &self.stage)
            .field("length", &self.length)
            .field("buffered", &self.buffer.len())
            .field("search_position", &self.search_position)
            .field("boundary", &String::from_utf8_lossy(&self.boundary))
            .finish()
    }
}

/// Iterator over the events currently available from a [`Decoder`].
///
/// Ends when the decoder needs more input or is complete.
#[derive(Debug)]
pub struct Events<'a> {
    decoder: &'a mut Decoder,
}

impl Iterator for Events<'_> {
    type Item = Result<Event>;

    fn next(&mut self) -> Option<Self::Item> {
        self.decoder.next_event().transpose()
    }
}
