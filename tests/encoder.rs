use std::fs;

use anyhow::Result;
use bytes::{Bytes, BytesMut};

use form_data_codec::*;

mod lib;

use lib::{decode, Limited};

fn encode<'a>(encoder: &mut Encoder, events: impl IntoIterator<Item = &'a Event>) -> Result<Bytes> {
    let mut buf = BytesMut::new();
    for event in events {
        buf.extend_from_slice(&encoder.send_event(event)?);
    }
    Ok(buf.freeze())
}

#[test]
fn round_trip() -> Result<()> {
    lib::tracing_init().ok();

    let boundary = "---------------------------9704338192090380615194531385$";
    let body = Bytes::from(fs::read("tests/fixtures/sample.txt")?);

    for chunks in [Limited::new(body.clone(), body.len()), Limited::random(body.clone())] {
        let events = decode(&mut Decoder::new(boundary), chunks)?;

        let mut encoder = Encoder::new(boundary);
        assert_eq!(encode(&mut encoder, &events)?, body);
        assert_eq!(encoder.stage(), Stage::Complete);
    }

    Ok(())
}

#[test]
fn round_trip_adds_leading_line_break() -> Result<()> {
    for (name, boundary) in [
        ("mixed.txt", "a7f7ac8d4e2e437c877bb7b8d7cc549c"),
        ("postman.txt", "--------------------------850116600781883365617864"),
    ] {
        let body = fs::read(format!("tests/fixtures/{name}"))?;
        let events = decode(&mut Decoder::new(boundary), Limited::random(body.clone()))?;

        let output = encode(&mut Encoder::new(boundary), &events)?;
        assert_eq!(&output[..2], b"\r\n", "{name}");
        assert_eq!(&output[2..], &body[..], "{name}");
    }

    Ok(())
}

#[test]
fn encoded_disposition_decodes_back() -> Result<()> {
    let mut encoder = Encoder::new("b1");
    let events = vec![
        Event::File {
            name: "upload".into(),
            filename: "na\u{ef}ve report.txt".into(),
            headers: [("Content-Type", "text/plain")].into_iter().collect(),
        },
        Event::Data {
            data: Bytes::from_static(b"body"),
            more_data: false,
        },
        Event::Epilogue(Bytes::new()),
    ];
    let output = encode(&mut encoder, &events)?;

    let decoded = decode(&mut Decoder::new("b1"), [&output])?;
    assert_eq!(decoded[0], Event::Preamble(Bytes::new()));
    assert_eq!(decoded[1].name(), Some("upload"));
    assert_eq!(decoded[1].filename(), Some("na\u{ef}ve report.txt"));
    assert_eq!(decoded[1].content_type(), Some(mime::TEXT_PLAIN));
    assert_eq!(decoded[2], events[1]);

    let (_, options) = parse_options_header(
        decoded[1]
            .headers()
            .and_then(|h| h.get("Content-Disposition")),
    );
    assert_eq!(options.get("name"), Some("upload"));
    assert_eq!(options.get("filename"), Some("na\u{ef}ve report.txt"));

    Ok(())
}

#[test]
fn stage_order() -> Result<()> {
    let mut encoder = Encoder::new("b1");
    assert_eq!(encoder.boundary(), b"b1");
    assert_eq!(encoder.stage(), Stage::Preamble);

    encoder.send_event(&Event::Preamble(Bytes::from_static(b"hi")))?;
    assert_eq!(encoder.stage(), Stage::Part);

    // a second preamble is out of order
    let err = encoder
        .send_event(&Event::Preamble(Bytes::new()))
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Sequencing {
            event: "Preamble",
            stage: Stage::Part
        }
    ));

    // no data before a part is opened
    let err = encoder
        .send_event(&Event::Data {
            data: Bytes::new(),
            more_data: false,
        })
        .unwrap_err();
    assert_eq!(err.to_string(), "cannot encode `Data` event in `PART` stage");

    encoder.send_event(&Event::Field {
        name: "a".into(),
        headers: Headers::new(),
    })?;
    encoder.send_event(&Event::Data {
        data: Bytes::from_static(b"1"),
        more_data: false,
    })?;

    // parts may follow each other without data
    encoder.send_event(&Event::Field {
        name: "b".into(),
        headers: Headers::new(),
    })?;
    assert_eq!(encoder.stage(), Stage::Data);

    let bytes = encoder.send_event(&Event::Epilogue(Bytes::new()))?;
    assert_eq!(bytes, "\r\n--b1--\r\n");
    assert_eq!(encoder.stage(), Stage::Complete);

    let err = encoder
        .send_event(&Event::Field {
            name: "c".into(),
            headers: Headers::new(),
        })
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Sequencing {
            event: "Field",
            stage: Stage::Complete
        }
    ));

    Ok(())
}

#[test]
fn unencodable_header() -> Result<()> {
    let mut encoder = Encoder::new("b1");

    let err = encoder
        .send_event(&Event::File {
            name: "f".into(),
            filename: "a.txt".into(),
            headers: [("X-Note", "\u{20ac}")].into_iter().collect(),
        })
        .unwrap_err();
    assert!(matches!(err, Error::Unencodable(ref s) if s == "\u{20ac}"));
    assert_eq!(encoder.stage(), Stage::Preamble);

    Ok(())
}
