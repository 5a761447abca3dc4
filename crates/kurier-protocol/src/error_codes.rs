//! Kafka protocol error codes
//!
//! Standard error codes from the Kafka protocol specification, restricted
//! to the ones the covered APIs surface. Codes ride inside typed responses;
//! they are data, not errors.

/// Retriable server-side error
pub const UNKNOWN: i16 = -1;

/// No error occurred
pub const NONE: i16 = 0;

/// The requested offset is out of range
pub const OFFSET_OUT_OF_RANGE: i16 = 1;

/// The message contents do not match the CRC
pub const CORRUPT_MESSAGE: i16 = 2;

/// This server does not host this topic-partition
pub const UNKNOWN_TOPIC_OR_PARTITION: i16 = 3;

/// There is no leader for this topic-partition
pub const LEADER_NOT_AVAILABLE: i16 = 5;

/// The request was sent to a broker that is not the leader
pub const NOT_LEADER_FOR_PARTITION: i16 = 6;

/// The request timed out on the broker
pub const REQUEST_TIMED_OUT: i16 = 7;

/// The broker is not available
pub const BROKER_NOT_AVAILABLE: i16 = 8;

/// The committing offset metadata is too large
pub const OFFSET_METADATA_TOO_LARGE: i16 = 12;

/// The group coordinator is still loading offsets
pub const GROUP_LOAD_IN_PROGRESS: i16 = 14;

/// The coordinator is not available
pub const GROUP_COORDINATOR_NOT_AVAILABLE: i16 = 15;

/// This broker is not the coordinator for the group
pub const NOT_COORDINATOR_FOR_GROUP: i16 = 16;

/// The configured session timeout is outside the allowed range
pub const INVALID_SESSION_TIMEOUT: i16 = 26;

/// The group is rebalancing
pub const REBALANCE_IN_PROGRESS: i16 = 27;

/// The generation id provided in the request is stale
pub const ILLEGAL_GENERATION: i16 = 22;

/// None of the proposed group protocols are supported by all members
pub const INCONSISTENT_GROUP_PROTOCOL: i16 = 23;

/// The group membership id was not recognized
pub const UNKNOWN_MEMBER_ID: i16 = 25;

/// The broker does not support the requested SASL mechanism
pub const UNSUPPORTED_SASL_MECHANISM: i16 = 33;

/// The version of the API is not supported
pub const UNSUPPORTED_VERSION: i16 = 35;

/// Topic with this name already exists
pub const TOPIC_ALREADY_EXISTS: i16 = 36;

/// Number of partitions is invalid
pub const INVALID_PARTITIONS: i16 = 37;

/// Replication factor is invalid
pub const INVALID_REPLICATION_FACTOR: i16 = 38;

/// Whether a broker-side error code is worth retrying against the cluster.
pub fn is_retriable(code: i16) -> bool {
    matches!(
        code,
        UNKNOWN
            | OFFSET_OUT_OF_RANGE
            | CORRUPT_MESSAGE
            | UNKNOWN_TOPIC_OR_PARTITION
            | LEADER_NOT_AVAILABLE
            | NOT_LEADER_FOR_PARTITION
            | REQUEST_TIMED_OUT
            | BROKER_NOT_AVAILABLE
            | GROUP_LOAD_IN_PROGRESS
            | GROUP_COORDINATOR_NOT_AVAILABLE
            | NOT_COORDINATOR_FOR_GROUP
    )
}
