//! Chargelink communication library.
//!
//! Typed JSON wire codec and RPC correlation for the charge-point side of
//! the 1.6 and 2.0.1 protocol revisions. Everything here is pure logic over
//! `std::io` streams; the concrete WebSocket transport and the logging
//! hardware backends live in the firmware binary.

#![deny(unused_must_use)]

pub mod codec;
pub mod config;
pub mod error;
pub mod logging;
pub mod messages;
pub mod rpc;
pub mod storage;
pub mod types;
