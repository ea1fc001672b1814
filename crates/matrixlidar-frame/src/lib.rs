//! Command/response framing for the matrix LiDAR protocol.
//!
//! Outbound requests are framed as:
//! - a `0x55` preamble
//! - a 2-byte **big-endian** length (payload + 1)
//! - the command byte, then the payload
//!
//! Inbound responses are `status, command echo, 2-byte little-endian length,
//! payload`. The two length fields really do use opposite byte orders on the
//! wire.
//!
//! [`RequestWriter`] sends one request and waits out the settle delay;
//! [`ResponsePoller`] polls the bus until a matching response is assembled
//! or the timeout elapses.

pub mod codec;
pub mod error;
pub mod poller;
pub mod status;
pub mod writer;

pub use codec::{
    decode_payload, decode_request, decode_response_header, encode_request, encode_response,
    FrameConfig, Response, ResponseHeader, DEFAULT_SETTLE_DELAY, DEFAULT_TIMEOUT, MAX_PAYLOAD,
    MAX_TRANSFER, PREAMBLE, REQUEST_HEADER_SIZE, RESPONSE_HEADER_SIZE,
};
pub use error::{FrameError, Result};
pub use poller::ResponsePoller;
pub use status::{Command, ErrorCode, Status, STATUS_FAILED, STATUS_PENDING, STATUS_SUCCESS};
pub use writer::RequestWriter;
