//! Produce encoding: flat-payload grouping, compression, telemetry.

use bytes::{Bytes, BytesMut};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use kurier_protocol::produce_types::*;
use kurier_protocol::records;
use kurier_protocol::{CompressionType, Decoder, Encoder, Message, RequestContext};

fn payload(topic: &str, partition: i32, values: &[&str]) -> ProducePayload {
    ProducePayload {
        topic: topic.into(),
        partition,
        codec: CompressionType::None,
        messages: values
            .iter()
            .map(|v| Message::new(Some(Bytes::copy_from_slice(v.as_bytes())), None))
            .collect(),
    }
}

fn encode(request: &ProduceRequest, ctx: &RequestContext) -> Bytes {
    let mut buf = BytesMut::new();
    let mut encoder = Encoder::new(&mut buf);
    request.encode(&mut encoder, 0, ctx).unwrap();
    buf.freeze()
}

#[test]
fn flat_payloads_group_by_first_occurrence() {
    let request = ProduceRequest {
        acks: 1,
        timeout_ms: 1000,
        payloads: vec![
            payload("beta", 1, &["b1-first"]),
            payload("alpha", 0, &["a0"]),
            payload("beta", 1, &["b1-second"]),
            payload("beta", 0, &["b0"]),
        ],
    };

    let mut decoder = Decoder::new(encode(&request, &RequestContext::new()));
    assert_eq!(decoder.read_i16().unwrap(), 1); // acks
    assert_eq!(decoder.read_i32().unwrap(), 1000); // timeout
    assert_eq!(decoder.read_i32().unwrap(), 2); // two topics

    // beta was seen first and keeps its position
    assert_eq!(decoder.read_string().unwrap().as_deref(), Some("beta"));
    assert_eq!(decoder.read_i32().unwrap(), 2); // two partitions

    // beta/1 merges both payloads, preserving caller order
    assert_eq!(decoder.read_i32().unwrap(), 1);
    let messages = records::read_message_set(&mut decoder).unwrap();
    let values: Vec<_> = messages.iter().map(|m| m.value.clone().unwrap()).collect();
    assert_eq!(values, vec![Bytes::from_static(b"b1-first"), Bytes::from_static(b"b1-second")]);

    assert_eq!(decoder.read_i32().unwrap(), 0);
    records::read_message_set(&mut decoder).unwrap();

    assert_eq!(decoder.read_string().unwrap().as_deref(), Some("alpha"));
    assert_eq!(decoder.read_i32().unwrap(), 1);
    assert_eq!(decoder.read_i32().unwrap(), 0);
    records::read_message_set(&mut decoder).unwrap();
    assert_eq!(decoder.remaining(), 0);
}

#[test]
fn gzip_payload_round_trips_through_wire_shape() {
    let mut request = ProduceRequest {
        acks: 1,
        timeout_ms: 1000,
        payloads: vec![payload("orders", 0, &["a", "b", "c", "d", "e", "f", "g", "h"])],
    };
    request.payloads[0].codec = CompressionType::Gzip;

    let mut decoder = Decoder::new(encode(&request, &RequestContext::new()));
    decoder.read_i16().unwrap();
    decoder.read_i32().unwrap();
    decoder.read_i32().unwrap();
    decoder.read_string().unwrap();
    decoder.read_i32().unwrap();
    decoder.read_i32().unwrap();

    // the compressed wrapper expands back into the original messages
    let messages = records::read_message_set(&mut decoder).unwrap();
    assert_eq!(messages.len(), 8);
    assert_eq!(messages[0].value, Some(Bytes::from_static(b"a")));
    assert_eq!(messages[7].value, Some(Bytes::from_static(b"h")));
}

#[test]
fn telemetry_fires_once_per_encode() {
    let calls = Arc::new(AtomicUsize::new(0));
    let last: Arc<Mutex<(usize, usize, i64)>> = Arc::new(Mutex::new((0, 0, 0)));

    let calls_seen = calls.clone();
    let last_seen = last.clone();
    let ctx = RequestContext::new().with_produce_telemetry(Arc::new(
        move |count, bytes, saved| {
            calls_seen.fetch_add(1, Ordering::SeqCst);
            *last_seen.lock().unwrap() = (count, bytes, saved);
        },
    ));

    let request = ProduceRequest {
        acks: 1,
        timeout_ms: 1000,
        payloads: vec![payload("orders", 0, &["x", "y"]), payload("orders", 1, &["z"])],
    };
    encode(&request, &ctx);

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    let (count, bytes, saved) = *last.lock().unwrap();
    assert_eq!(count, 3);
    assert!(bytes > 0);
    assert_eq!(saved, 0); // uncompressed
}

#[test]
fn gzip_telemetry_reports_bytes_saved() {
    let last: Arc<Mutex<(usize, usize, i64)>> = Arc::new(Mutex::new((0, 0, 0)));
    let last_seen = last.clone();
    let ctx = RequestContext::new().with_produce_telemetry(Arc::new(
        move |count, bytes, saved| {
            *last_seen.lock().unwrap() = (count, bytes, saved);
        },
    ));

    let values: Vec<String> = (0..64).map(|_| "repetitive-payload".to_string()).collect();
    let value_refs: Vec<&str> = values.iter().map(String::as_str).collect();
    let mut request = ProduceRequest {
        acks: 1,
        timeout_ms: 1000,
        payloads: vec![payload("orders", 0, &value_refs)],
    };
    request.payloads[0].codec = CompressionType::Gzip;
    encode(&request, &ctx);

    let (count, _, saved) = *last.lock().unwrap();
    assert_eq!(count, 64);
    assert!(saved > 0, "highly repetitive set should compress, saved {}", saved);
}

#[test]
fn acks_zero_expects_no_response() {
    let fire_and_forget = ProduceRequest { acks: 0, timeout_ms: 1000, payloads: vec![] };
    assert!(!fire_and_forget.expect_response());
    let confirmed = ProduceRequest { acks: 1, timeout_ms: 1000, payloads: vec![] };
    assert!(confirmed.expect_response());
}
