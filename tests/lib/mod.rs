#![allow(dead_code)]

use bytes::BytesMut;
use form_data_codec::{Decoder, Event, Result};

mod limited;
pub use limited::Limited;

pub fn tracing_init() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        // From env var: `RUST_LOG`
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))
}

/// Feeds every chunk, then signals the end of input, collecting all events.
pub fn decode<I>(decoder: &mut Decoder, chunks: I) -> Result<Vec<Event>>
where
    I: IntoIterator,
    I::Item: AsRef<[u8]>,
{
    let mut events = Vec::new();

    for chunk in chunks {
        decoder.append(chunk.as_ref())?;
        for event in decoder.events() {
            events.push(event?);
        }
    }

    decoder.finish();
    for event in decoder.events() {
        events.push(event?);
    }

    Ok(events)
}

/// Merges the `Data` chunks of each part into one event.
pub fn coalesce(events: Vec<Event>) -> Vec<Event> {
    let mut merged: Vec<Event> = Vec::with_capacity(events.len());

    for event in events {
        if let (
            Some(Event::Data {
                data: prev,
                more_data: prev_more,
            }),
            Event::Data { data, more_data },
        ) = (merged.last_mut(), &event)
        {
            if *prev_more {
                let mut buf = BytesMut::from(&prev[..]);
                buf.extend_from_slice(data);
                *prev = buf.freeze();
                *prev_more = *more_data;
                continue;
            }
        }
        merged.push(event);
    }

    merged
}
