#![no_main]
use libfuzzer_sys::fuzz_target;

use form_data_codec::{Decoder, Limits};

const STREAM_SIZE: u64 = 1024 * 1024;

fuzz_target!(|data: &[u8]| {
    // the first byte picks the chunk size
    let Some((&n, body)) = data.split_first() else {
        return;
    };

    let mut decoder = Decoder::with_limits("BOUNDARY", Limits::default().stream_size(STREAM_SIZE));

    for chunk in body.chunks(usize::from(n).max(1)) {
        if decoder.append(chunk).is_err() {
            return;
        }
        for event in decoder.events() {
            if event.is_err() {
                return;
            }
        }
    }

    decoder.finish();
    while let Ok(Some(_)) = decoder.next_event() {}

    assert!(decoder.is_complete());
});
