//! Parsing of `Content-Disposition` and `Content-Type` style header values.
//!
//! A value is a primary token followed by `; key=value` options. Option
//! values may be quoted, and may use the [rfc2231] extended notation
//! (`key*=charset'lang'%xx`) with continuations (`key*0*`, `key*1`, ...).
//!
//! [rfc2231]: <https://tools.ietf.org/html/rfc2231>

use std::borrow::Cow;

use encoding_rs::{Encoding, UTF_8};
use once_cell::sync::Lazy;
use percent_encoding::percent_decode_str;
use regex::Regex;
use tracing::debug;

use crate::Headers;

/// `,token` then the options, newlines already replaced by commas.
static OPTION_HEADER_START_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^,\s*([^;,\s]+)([;,]\s*.+)?").unwrap());

/// One `; key[*N][*]=value` option.
static OPTION_HEADER_PIECE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?x)
        ^;\s*,?\s*
        (?P<key>
            "[^"\\]*(?:\\.[^"\\]*)*"
        |
            [^\s;,=*]+
        )
        (?:\*(?P<count>\d+))?
        \s*
        (?:
            (?:
                \*\s*=\s*
                (?:
                    (?P<encoding>[^\s]+?)
                    '(?P<language>[^\s]*?)'
                )?
            |
                =\s*
            )
            (?P<value>
                "[^"\\]*(?:\\.[^"\\]*)*"
            |
                [^;,]+
            )?
        )?
        \s*
        "#,
    )
    .unwrap()
});

/// Unquotes a header value the way browsers quote, not the way the RFCs do.
///
/// A quoted filename starting with `\\` is a UNC path and keeps its
/// backslashes.
pub fn unquote_header_value(value: &str, is_filename: bool) -> String {
    let inner = match value {
        "\"" => "",
        v if v.len() > 1 && v.starts_with('"') && v.ends_with('"') => &v[1..v.len() - 1],
        v => return v.to_string(),
    };

    if is_filename && inner.starts_with("\\\\") {
        return inner.to_string();
    }

    inner.replace("\\\\", "\\").replace("\\\"", "\"")
}

fn decode_extended(value: &str, label: &str) -> String {
    let bytes: Cow<'_, [u8]> = percent_decode_str(value).into();
    let encoding = Encoding::for_label(label.as_bytes()).unwrap_or_else(|| {
        debug!("unknown charset {:?}, decoding as utf-8", label);
        UTF_8
    });
    let (text, malformed) = encoding.decode_without_bom_handling(&bytes);
    if malformed {
        debug!("malformed {} sequence in {:?}", encoding.name(), value);
    }
    text.into_owned()
}

/// Parses a `Content-Disposition` or `Content-Type` header value.
///
/// Returns the primary token and the options keyed by their lower-cased
/// name. An absent or empty value gives an empty token and no options.
///
/// Continuation segments are appended in the order they appear, and a
/// segment without a charset reuses the last one announced in its run.
///
/// ```
/// use form_data_codec::parse_options_header;
///
/// let (token, options) = parse_options_header(Some("form-data; name=\"a\"; filename*=UTF-8''%e2%82%ac.txt"));
/// assert_eq!(token, "form-data");
/// assert_eq!(options.get("name"), Some("a"));
/// assert_eq!(options.get("filename"), Some("€.txt"));
/// ```
pub fn parse_options_header(value: Option<&str>) -> (String, Headers) {
    let mut options = Headers::new();

    let Some(value) = value.filter(|v| !v.is_empty()) else {
        return (String::new(), options);
    };

    // newlines become commas, so every value starts the same way
    let value = format!(",{}", value.replace('\n', ","));
    let Some(start) = OPTION_HEADER_START_RE.captures(&value) else {
        return (String::new(), options);
    };
    let token = start.get(1).map_or("", |m| m.as_str());
    let mut rest = start.get(2).map_or("", |m| m.as_str());

    let mut continued = None;
    while !rest.is_empty() {
        let Some(piece) = OPTION_HEADER_PIECE_RE.captures(rest) else {
            break;
        };

        let count = piece.name("count");
        let encoding = match (count, piece.name("encoding")) {
            (Some(_), Some(encoding)) => {
                continued = Some(encoding.as_str());
                Some(encoding.as_str())
            }
            (Some(_), None) => continued,
            (None, encoding) => {
                continued = None;
                encoding.map(|m| m.as_str())
            }
        };

        let key = unquote_header_value(&piece["key"], false).to_lowercase();
        let decoded = piece.name("value").map(|v| {
            let v = unquote_header_value(v.as_str(), key == "filename");
            match encoding {
                Some(label) => decode_extended(&v, label),
                None => v,
            }
        });

        match (count, decoded) {
            (None, decoded) => {
                options.insert(key, decoded.unwrap_or_default());
            }
            (Some(_), Some(decoded)) => match options.get_mut(&key) {
                Some(prev) => prev.push_str(&decoded),
                None => {
                    options.insert(key, decoded);
                }
            },
            (Some(_), None) => {}
        }

        rest = &rest[piece.get(0).map_or(rest.len(), |m| m.end())..];
    }

    (token.to_string(), options)
}
