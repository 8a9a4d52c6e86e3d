use bytes::Bytes;

use crate::Headers;

/// An event of a multipart message, produced by the [`Decoder`](crate::Decoder)
/// and consumed by the [`Encoder`](crate::Encoder).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Bytes before the first boundary.
    Preamble(Bytes),
    /// Start of a part without a filename.
    Field {
        /// The name of the part.
        name: String,
        /// All headers of the part, `Content-Disposition` included.
        headers: Headers,
    },
    /// Start of a part with a filename.
    File {
        /// The name of the part.
        name: String,
        /// The filename, may be empty.
        filename: String,
        /// All headers of the part, `Content-Disposition` included.
        headers: Headers,
    },
    /// A chunk of the current part's body.
    Data {
        /// The payload.
        data: Bytes,
        /// `false` on the chunk that closes the part.
        more_data: bool,
    },
    /// Bytes after the final boundary.
    Epilogue(Bytes),
}

impl Event {
    /// Gets the kind of the event.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::Preamble(_) => "Preamble",
            Event::Field { .. } => "Field",
            Event::File { .. } => "File",
            Event::Data { .. } => "Data",
            Event::Epilogue(_) => "Epilogue",
        }
    }

    /// Gets the part name of a `Field` or `File`.
    pub fn name(&self) -> Option<&str> {
        match self {
            Event::Field { name, .. } | Event::File { name, .. } => Some(name.as_str()),
            _ => None,
        }
    }

    /// Gets the filename of a `File`.
    pub fn filename(&self) -> Option<&str> {
        match self {
            Event::File { filename, .. } => Some(filename.as_str()),
            _ => None,
        }
    }

    /// Gets the part headers of a `Field` or `File`.
    pub fn headers(&self) -> Option<&Headers> {
        match self {
            Event::Field { headers, .. } | Event::File { headers, .. } => Some(headers),
            _ => None,
        }
    }

    /// Parses the `Content-Type` header of a `Field` or `File`.
    pub fn content_type(&self) -> Option<mime::Mime> {
        self.headers()?
            .get_ignore_case("Content-Type")
            .map(str::parse)
            .and_then(Result::ok)
    }

    /// Gets the payload of a `Preamble`, `Data` or `Epilogue`.
    pub fn data(&self) -> Option<&Bytes> {
        match self {
            Event::Preamble(data) | Event::Epilogue(data) | Event::Data { data, .. } => Some(data),
            _ => None,
        }
    }

    /// Checks if this is the `Data` chunk that closes a part.
    pub fn is_last_data(&self) -> bool {
        matches!(self, Event::Data { more_data: false, .. })
    }
}
