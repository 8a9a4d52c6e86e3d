use std::{fmt, slice};

use tracing::debug;

use crate::utils::{is_space, latin1_decode, line_break_len, split_lines};

/// An ordered map of header names to values.
///
/// Names keep the case they were written with. Inserting an existing name
/// replaces its value in place, so the first position wins.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a value, returning the previous value of the same name.
    pub fn insert<K, V>(&mut self, name: K, value: V) -> Option<String>
    where
        K: Into<String>,
        V: Into<String>,
    {
        let name = name.into();
        let value = value.into();
        match self.get_mut(&name) {
            Some(old) => Some(std::mem::replace(old, value)),
            None => {
                self.entries.push((name, value));
                None
            }
        }
    }

    /// Gets a value by its exact name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Gets a value, comparing names ASCII case-insensitively.
    pub fn get_ignore_case(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut String> {
        self.entries
            .iter_mut()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v)
    }

    /// Checks whether `name` is present.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Checks if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(name, value)` in insertion order.
    pub fn iter(&self) -> HeadersIter<'_> {
        HeadersIter(self.entries.iter())
    }
}

impl fmt::Debug for Headers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V> FromIterator<(K, V)> for Headers
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        for (k, v) in iter {
            headers.insert(k, v);
        }
        headers
    }
}

impl<'a> IntoIterator for &'a Headers {
    type Item = (&'a str, &'a str);
    type IntoIter = HeadersIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the entries of [`Headers`].
#[derive(Debug)]
pub struct HeadersIter<'a>(slice::Iter<'a, (String, String)>);

impl<'a> Iterator for HeadersIter<'a> {
    type Item = (&'a str, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

/// Folds header continuation lines, a line break followed by a space or tab,
/// into a single space.
fn unfold(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let n = line_break_len(&bytes[i..]);
        if n > 0 && matches!(bytes.get(i + n), Some(b' ' | b'\t')) {
            out.push(b' ');
            i += n + 1;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    out
}

/// Parses the header block of a part.
///
/// Bytes are read as latin-1, so decoding never fails. Blank lines and lines
/// without a colon are skipped.
pub(crate) fn parse_part_headers(bytes: &[u8]) -> Headers {
    let bytes = unfold(bytes);
    let mut headers = Headers::new();

    for line in split_lines(&bytes) {
        if line.iter().all(|b| is_space(*b)) {
            continue;
        }

        let line = latin1_decode(line);
        let Some((name, value)) = line.split_once(':') else {
            debug!("skipping header line without a colon: {:?}", line);
            continue;
        };

        headers.insert(name.trim(), value.trim());
    }

    headers
}
