//! Response stub round-trips at every covered version.
//!
//! Each stub is encoded the way a broker would frame it (correlation id
//! first) and decoded through the public entry point.

use bytes::{Bytes, BytesMut};
use kurier_protocol::api_versions_types::*;
use kurier_protocol::create_topics_types::*;
use kurier_protocol::delete_topics_types::*;
use kurier_protocol::fetch_types::*;
use kurier_protocol::find_coordinator_types::*;
use kurier_protocol::heartbeat_types::*;
use kurier_protocol::leave_group_types::*;
use kurier_protocol::list_groups_types::*;
use kurier_protocol::list_offsets_types::*;
use kurier_protocol::metadata_types::*;
use kurier_protocol::offset_commit_types::*;
use kurier_protocol::offset_fetch_types::*;
use kurier_protocol::produce_types::*;
use kurier_protocol::sasl_types::*;
use kurier_protocol::{decode_response, ApiKey, Encoder, Message, RequestContext, Response};

const CORRELATION: i32 = 7;

fn frame_response(encode: impl FnOnce(&mut Encoder)) -> Bytes {
    let mut buf = BytesMut::new();
    let mut encoder = Encoder::new(&mut buf);
    encoder.write_i32(CORRELATION);
    encode(&mut encoder);
    buf.freeze()
}

fn framed_with_size(frame: Bytes) -> Bytes {
    let mut buf = BytesMut::new();
    let mut encoder = Encoder::new(&mut buf);
    let size = encoder.begin_size();
    encoder.write_raw_bytes(&frame);
    encoder.end_size(size);
    buf.freeze()
}

fn ctx(version: i16) -> RequestContext {
    RequestContext::new().with_api_version(version).with_correlation(CORRELATION)
}

#[test]
fn produce_response_round_trips_all_versions() {
    let stub = ProduceResponse {
        topics: vec![ProduceResponseTopic {
            name: "orders".into(),
            partitions: vec![ProduceResponsePartition {
                partition: 2,
                error_code: 0,
                base_offset: 4200,
                log_append_time: None,
            }],
        }],
        throttle_time_ms: None,
    };

    for version in 0..=2 {
        let mut expected = stub.clone();
        if version >= 1 {
            expected.throttle_time_ms = Some(0);
        }
        if version >= 2 {
            expected.topics[0].partitions[0].log_append_time = Some(-1);
        }
        let frame = frame_response(|e| stub.encode(e, version).unwrap());
        let decoded = decode_response(&ctx(version), ApiKey::Produce, frame, false).unwrap();
        match decoded {
            Response::Produce(got) => assert_eq!(got, expected, "version {}", version),
            other => panic!("wrong variant: {:?}", other),
        }
    }
}

#[test]
fn fetch_response_round_trips_all_versions() {
    let mut message = Message::new(Some(Bytes::from_static(b"payload")), None);
    message.offset = 9;
    let stub = FetchResponse {
        throttle_time_ms: None,
        topics: vec![FetchResponseTopic {
            name: "orders".into(),
            partitions: vec![FetchResponsePartition {
                partition: 0,
                error_code: 0,
                high_watermark: 10,
                messages: vec![message],
            }],
        }],
    };

    for version in 0..=3 {
        let mut expected = stub.clone();
        if version >= 1 {
            expected.throttle_time_ms = Some(0);
        }
        let frame = frame_response(|e| stub.encode(e, version).unwrap());
        let decoded = decode_response(&ctx(version), ApiKey::Fetch, frame, false).unwrap();
        match decoded {
            Response::Fetch(got) => assert_eq!(got, expected, "version {}", version),
            other => panic!("wrong variant: {:?}", other),
        }
    }
}

#[test]
fn list_offsets_response_round_trips_both_versions() {
    let v0 = ListOffsetsResponse {
        topics: vec![ListOffsetsResponseTopic {
            name: "orders".into(),
            partitions: vec![ListOffsetsResponsePartition {
                partition: 1,
                error_code: 0,
                timestamp: None,
                offsets: vec![100, 50, 0],
            }],
        }],
    };
    let frame = frame_response(|e| v0.encode(e, 0).unwrap());
    match decode_response(&ctx(0), ApiKey::ListOffsets, frame, false).unwrap() {
        Response::ListOffsets(got) => assert_eq!(got, v0),
        other => panic!("wrong variant: {:?}", other),
    }

    let v1 = ListOffsetsResponse {
        topics: vec![ListOffsetsResponseTopic {
            name: "orders".into(),
            partitions: vec![ListOffsetsResponsePartition {
                partition: 1,
                error_code: 0,
                timestamp: Some(1_500_000_000_000),
                offsets: vec![100],
            }],
        }],
    };
    let frame = frame_response(|e| v1.encode(e, 1).unwrap());
    match decode_response(&ctx(1), ApiKey::ListOffsets, frame, false).unwrap() {
        Response::ListOffsets(got) => assert_eq!(got, v1),
        other => panic!("wrong variant: {:?}", other),
    }
}

#[test]
fn metadata_response_round_trips_all_versions() {
    let stub = MetadataResponse {
        brokers: vec![MetadataBroker {
            node_id: 0,
            host: "broker-0".into(),
            port: 9092,
            rack: Some("eu-1a".into()),
        }],
        cluster_id: Some("cluster".into()),
        controller_id: Some(0),
        topics: vec![MetadataTopic {
            error_code: 0,
            name: "orders".into(),
            is_internal: false,
            partitions: vec![MetadataPartition {
                error_code: 0,
                partition: 0,
                leader: 0,
                replicas: vec![0, 1],
                isr: vec![0],
            }],
        }],
    };

    for version in 0..=2 {
        let mut expected = stub.clone();
        if version < 1 {
            expected.brokers[0].rack = None;
            expected.controller_id = None;
        }
        if version < 2 {
            expected.cluster_id = None;
        }
        let frame = frame_response(|e| stub.encode(e, version).unwrap());
        let decoded = decode_response(&ctx(version), ApiKey::Metadata, frame, false).unwrap();
        match decoded {
            Response::Metadata(got) => assert_eq!(got, expected, "version {}", version),
            other => panic!("wrong variant: {:?}", other),
        }
    }
}

#[test]
fn offset_commit_and_fetch_responses_round_trip() {
    let commit = OffsetCommitResponse {
        topics: vec![OffsetCommitResponseTopic {
            name: "orders".into(),
            partitions: vec![OffsetCommitResponsePartition { partition: 3, error_code: 0 }],
        }],
    };
    for version in 0..=2 {
        let frame = frame_response(|e| commit.encode(e, version).unwrap());
        match decode_response(&ctx(version), ApiKey::OffsetCommit, frame, false).unwrap() {
            Response::OffsetCommit(got) => assert_eq!(got, commit),
            other => panic!("wrong variant: {:?}", other),
        }
    }

    let fetch = OffsetFetchResponse {
        topics: vec![OffsetFetchResponseTopic {
            name: "orders".into(),
            partitions: vec![OffsetFetchResponsePartition {
                partition: 3,
                offset: 42,
                metadata: Some("state".into()),
                error_code: 0,
            }],
        }],
    };
    for version in 0..=1 {
        let frame = frame_response(|e| fetch.encode(e, version).unwrap());
        match decode_response(&ctx(version), ApiKey::OffsetFetch, frame, false).unwrap() {
            Response::OffsetFetch(got) => assert_eq!(got, fetch),
            other => panic!("wrong variant: {:?}", other),
        }
    }
}

#[test]
fn coordinator_and_group_edge_responses_round_trip() {
    let coordinator = FindCoordinatorResponse {
        error_code: 0,
        coordinator_id: 1,
        host: "broker-1".into(),
        port: 9092,
    };
    let frame = frame_response(|e| coordinator.encode(e, 0).unwrap());
    match decode_response(&ctx(0), ApiKey::FindCoordinator, frame, false).unwrap() {
        Response::FindCoordinator(got) => assert_eq!(got, coordinator),
        other => panic!("wrong variant: {:?}", other),
    }

    let heartbeat = HeartbeatResponse { error_code: 27 };
    let frame = frame_response(|e| heartbeat.encode(e, 0).unwrap());
    match decode_response(&ctx(0), ApiKey::Heartbeat, frame, false).unwrap() {
        Response::Heartbeat(got) => assert_eq!(got, heartbeat),
        other => panic!("wrong variant: {:?}", other),
    }

    let leave = LeaveGroupResponse { error_code: 0 };
    let frame = frame_response(|e| leave.encode(e, 0).unwrap());
    match decode_response(&ctx(0), ApiKey::LeaveGroup, frame, false).unwrap() {
        Response::LeaveGroup(got) => assert_eq!(got, leave),
        other => panic!("wrong variant: {:?}", other),
    }

    let list = ListGroupsResponse {
        error_code: 0,
        groups: vec![ListedGroup { group_id: "readers".into(), protocol_type: "consumer".into() }],
    };
    let frame = frame_response(|e| list.encode(e, 0).unwrap());
    match decode_response(&ctx(0), ApiKey::ListGroups, frame, false).unwrap() {
        Response::ListGroups(got) => assert_eq!(got, list),
        other => panic!("wrong variant: {:?}", other),
    }
}

#[test]
fn handshake_and_admin_responses_round_trip() {
    let sasl = SaslHandshakeResponse {
        error_code: 0,
        mechanisms: vec!["PLAIN".into(), "SCRAM-SHA-256".into()],
    };
    let frame = frame_response(|e| sasl.encode(e, 0).unwrap());
    match decode_response(&ctx(0), ApiKey::SaslHandshake, frame, false).unwrap() {
        Response::SaslHandshake(got) => assert_eq!(got, sasl),
        other => panic!("wrong variant: {:?}", other),
    }

    let api_versions = ApiVersionsResponse {
        error_code: 0,
        api_versions: vec![ApiVersionRange { api_key: 0, min_version: 0, max_version: 2 }],
    };
    let frame = frame_response(|e| api_versions.encode(e, 0).unwrap());
    match decode_response(&ctx(0), ApiKey::ApiVersions, frame, false).unwrap() {
        Response::ApiVersions(got) => assert_eq!(got, api_versions),
        other => panic!("wrong variant: {:?}", other),
    }

    let create = CreateTopicsResponse {
        topics: vec![CreatableTopicResult {
            name: "orders".into(),
            error_code: 36,
            error_message: None,
        }],
    };
    for version in 0..=1 {
        let frame = frame_response(|e| create.encode(e, version).unwrap());
        match decode_response(&ctx(version), ApiKey::CreateTopics, frame, false).unwrap() {
            Response::CreateTopics(got) => assert_eq!(got, create),
            other => panic!("wrong variant: {:?}", other),
        }
    }

    let delete = DeleteTopicsResponse {
        topics: vec![DeletableTopicResult { name: "orders".into(), error_code: 0 }],
    };
    let frame = frame_response(|e| delete.encode(e, 0).unwrap());
    match decode_response(&ctx(0), ApiKey::DeleteTopics, frame, false).unwrap() {
        Response::DeleteTopics(got) => assert_eq!(got, delete),
        other => panic!("wrong variant: {:?}", other),
    }
}

/// `has_size = true` accepts a raw capture that still carries its length
/// prefix.
#[test]
fn decode_accepts_leading_size_prefix() {
    let heartbeat = HeartbeatResponse { error_code: 0 };
    let frame = frame_response(|e| heartbeat.encode(e, 0).unwrap());
    let sized = framed_with_size(frame);
    match decode_response(&ctx(0), ApiKey::Heartbeat, sized, true).unwrap() {
        Response::Heartbeat(got) => assert_eq!(got, heartbeat),
        other => panic!("wrong variant: {:?}", other),
    }
}
