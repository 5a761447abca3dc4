//! Fetch responses truncated by the broker's max-bytes limit.
//!
//! A broker that hits its fetch byte cap sends a partial trailing message;
//! the decoder must keep every complete message and drop the fragment.

use bytes::{Bytes, BytesMut};
use kurier_protocol::records::{self, Message, MESSAGE_HEADER_SIZE};
use kurier_protocol::{decode_response, ApiKey, Decoder, Encoder, RequestContext, Response};

const TOTAL_MESSAGES: usize = 530;

fn build_truncated_fetch_frame() -> (Bytes, usize) {
    let messages: Vec<Message> = (0..TOTAL_MESSAGES as i64)
        .map(|i| {
            let mut m = Message::new(Some(Bytes::from_static(b"test")), None);
            m.offset = i;
            m
        })
        .collect();

    let mut set = BytesMut::new();
    records::write_message_set_entries(&mut Encoder::new(&mut set), &messages);

    // cut into the last message's body, leaving its 12-byte entry header
    // intact; the broker declares the truncated length
    let truncated_len = set.len() - 6;
    let set = set.freeze().slice(..truncated_len);

    let mut buf = BytesMut::new();
    let mut encoder = Encoder::new(&mut buf);
    encoder.write_i32(11); // correlation id
    encoder.write_i32(1); // one topic
    encoder.write_string(Some("stress"));
    encoder.write_i32(1); // one partition
    encoder.write_i32(0);
    encoder.write_i16(0); // no error
    encoder.write_i64(TOTAL_MESSAGES as i64);
    encoder.write_i32(set.len() as i32);
    encoder.write_raw_bytes(&set);

    (buf.freeze(), truncated_len)
}

#[test]
fn truncated_fetch_yields_all_complete_messages() {
    let (frame, _) = build_truncated_fetch_frame();
    let ctx = RequestContext::new().with_api_version(0).with_correlation(11);

    let response = decode_response(&ctx, ApiKey::Fetch, frame, false).unwrap();
    let messages = match response {
        Response::Fetch(fetch) => fetch.topics[0].partitions[0].messages.clone(),
        other => panic!("wrong variant: {:?}", other),
    };

    assert_eq!(messages.len(), TOTAL_MESSAGES - 1);
    assert_eq!(messages[0].value, Some(Bytes::from_static(b"test")));
    assert_eq!(messages[0].offset, 0);
    assert_eq!(messages.last().unwrap().offset, TOTAL_MESSAGES as i64 - 2);
}

/// The same cut below the entry-header minimum also decodes cleanly.
#[test]
fn truncation_inside_entry_header_is_tolerated() {
    let messages: Vec<Message> = (0..3)
        .map(|i| {
            let mut m = Message::new(Some(Bytes::from_static(b"test")), None);
            m.offset = i;
            m
        })
        .collect();

    let mut set = BytesMut::new();
    records::write_message_set_entries(&mut Encoder::new(&mut set), &messages);
    let entry_len = set.len() / 3;
    // keep two entries plus a sub-minimum fragment of the third
    let truncated = set.freeze().slice(..2 * entry_len + MESSAGE_HEADER_SIZE - 2);

    let mut buf = BytesMut::new();
    let mut encoder = Encoder::new(&mut buf);
    encoder.write_i32(truncated.len() as i32);
    encoder.write_raw_bytes(&truncated);

    let decoded = records::read_message_set(&mut Decoder::new(buf.freeze())).unwrap();
    assert_eq!(decoded.len(), 2);
}
