// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! IPC Protocol for daemon communication.
//!
//! Wire format: 4-byte length prefix (big-endian) + JSON payload

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod request;
mod response;
mod wire;

/// Protocol version exchanged in the `Hello` handshake
pub const PROTOCOL_VERSION: &str = env!("CARGO_PKG_VERSION");

pub use request::Request;
pub use response::Response;
pub use wire::{
    decode, encode, read_message, read_request, read_response, write_message, write_request,
    write_response, ProtocolError, MAX_MESSAGE_SIZE,
};


#[cfg(test)]
#[path = "types_tests.rs"]
mod types_tests;
