use memchr::{memchr2, memmem, memrchr};

pub(crate) const CR: u8 = b'\r';
pub(crate) const LF: u8 = b'\n';
pub(crate) const DASHES: [u8; 2] = [b'-', b'-']; // `--`
pub(crate) const CRLF: [u8; 2] = [CR, LF]; // `\r\n`
pub(crate) const CRLFS: [u8; 4] = [CR, LF, CR, LF]; // `\r\n\r\n`

/// Bytes kept behind the search cursor so a delimiter straddling it is still found.
pub(crate) const SEARCH_SLACK: usize = 8;

/// Whitespace that may trail a boundary before its line break.
pub(crate) fn is_blank(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\x0b' | b'\x0c')
}

pub(crate) fn is_space(b: u8) -> bool {
    is_blank(b) || b == CR || b == LF
}

/// Length of the line break (`\r\n`, `\n` or `\r`) at the start of `bytes`.
pub(crate) fn line_break_len(bytes: &[u8]) -> usize {
    match bytes {
        [CR, LF, ..] => 2,
        [CR, ..] | [LF, ..] => 1,
        _ => 0,
    }
}

/// Splits on `\r\n`, `\r` and `\n`.
pub(crate) fn split_lines(bytes: &[u8]) -> Vec<&[u8]> {
    let mut lines = Vec::new();
    let mut rest = bytes;
    while let Some(n) = memchr2(CR, LF, rest) {
        lines.push(&rest[..n]);
        rest = &rest[n + line_break_len(&rest[n..])..];
    }
    if !rest.is_empty() {
        lines.push(rest);
    }
    lines
}

/// Position of the earliest trailing line-break byte; withheld data starts here.
///
/// Takes the smaller of the last `\n` and the last `\r`, each defaulting to the
/// buffer length.
pub(crate) fn last_line_break(bytes: &[u8]) -> usize {
    let lf = memrchr(LF, bytes).unwrap_or(bytes.len());
    let cr = memrchr(CR, bytes).unwrap_or(bytes.len());
    lf.min(cr)
}

/// Finds the first blank line (`\r\n\r\n`, `\r\r` or `\n\n`) at or after `from`.
///
/// Returns the range covered by the blank line.
pub(crate) fn find_blank_line(bytes: &[u8], from: usize) -> Option<(usize, usize)> {
    let mut i = from;
    while let Some(n) = memchr2(CR, LF, bytes.get(i..)?) {
        i += n;
        let rest = &bytes[i..];
        if rest.starts_with(&CRLFS) {
            return Some((i, i + 4));
        }
        if rest.starts_with(&[CR, CR]) || rest.starts_with(&[LF, LF]) {
            return Some((i, i + 2));
        }
        i += 1;
    }
    None
}

pub(crate) fn latin1_decode(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

pub(crate) fn latin1_encode(s: &str) -> Option<Vec<u8>> {
    s.chars().map(|c| u8::try_from(u32::from(c)).ok()).collect()
}

/// A delimiter located in the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Match {
    /// Start of the delimiter, including its leading line break.
    pub(crate) start: usize,
    /// End of the delimiter, including its trailing line break.
    pub(crate) end: usize,
    /// `--boundary--`, the message is over.
    pub(crate) last: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Scan {
    Found(Match),
    /// A delimiter starts here but the buffer ends before it can be decided.
    Partial(usize),
    NotFound,
}

enum Suffix {
    Complete { end: usize, last: bool },
    Incomplete,
    Invalid,
}

/// Scans for `[line break] --boundary (-- [blanks] [line break] | [blanks] line break)`.
#[derive(Debug)]
pub(crate) struct Delimiter {
    finder: memmem::Finder<'static>,
}

impl Delimiter {
    pub(crate) fn new(boundary: &[u8]) -> Self {
        // `--boundary`
        let mut needle = Vec::with_capacity(2 + boundary.len());
        needle.extend_from_slice(&DASHES);
        needle.extend_from_slice(boundary);

        Self {
            finder: memmem::Finder::new(&needle).into_owned(),
        }
    }

    /// `--boundary`
    pub(crate) fn needle(&self) -> &[u8] {
        self.finder.needle()
    }

    /// Quick check for `--boundary` anywhere in `bytes`.
    pub(crate) fn occurs_in(&self, bytes: &[u8]) -> bool {
        self.finder.find(bytes).is_some()
    }

    /// Finds the first delimiter starting at or after `from`.
    ///
    /// With `leading` the delimiter must be preceded by a line break.
    /// Unless `eof`, a delimiter whose tail reaches the end of `bytes` is
    /// reported as [`Scan::Partial`].
    pub(crate) fn scan(&self, bytes: &[u8], from: usize, leading: bool, eof: bool) -> Scan {
        let needle_len = self.needle().len();
        let mut offset = from;

        while let Some(n) = bytes.get(offset..).and_then(|rest| self.finder.find(rest)) {
            let at = offset + n;
            offset = at + 1;

            let start = match leading_break(bytes, from, at) {
                Some(start) => start,
                None if leading => continue,
                None => at,
            };

            match suffix(bytes, at + needle_len, eof) {
                Suffix::Complete { end, last } => return Scan::Found(Match { start, end, last }),
                Suffix::Incomplete => return Scan::Partial(start),
                Suffix::Invalid => {}
            }
        }

        Scan::NotFound
    }
}

fn leading_break(bytes: &[u8], from: usize, at: usize) -> Option<usize> {
    if at >= from + 2 && bytes[at - 2..at] == CRLF {
        Some(at - 2)
    } else if at > from && matches!(bytes[at - 1], CR | LF) {
        Some(at - 1)
    } else {
        None
    }
}

fn suffix(bytes: &[u8], at: usize, eof: bool) -> Suffix {
    let rest = &bytes[at..];

    if rest.starts_with(&DASHES) {
        let i = skip_blanks(bytes, at + 2);
        return match trailing_break(bytes, i, eof) {
            Some(n) => Suffix::Complete { end: i + n, last: true },
            None => Suffix::Incomplete,
        };
    }

    // `-` could still become `--`
    if !eof && DASHES.starts_with(rest) {
        return Suffix::Incomplete;
    }

    let i = skip_blanks(bytes, at);
    match trailing_break(bytes, i, eof) {
        Some(0) => Suffix::Invalid,
        Some(n) => Suffix::Complete { end: i + n, last: false },
        None => Suffix::Incomplete,
    }
}

fn skip_blanks(bytes: &[u8], mut i: usize) -> usize {
    while bytes.get(i).copied().is_some_and(is_blank) {
        i += 1;
    }
    i
}

/// Length of the line break at `i`, `None` when more input could change it.
fn trailing_break(bytes: &[u8], i: usize, eof: bool) -> Option<usize> {
    match &bytes[i..] {
        [] if !eof => None,
        [CR] if !eof => None,
        rest => Some(line_break_len(rest)),
    }
}
