//! A 1-Wire bus controller for RMT-style pulse transceiver peripherals.
//!
//! [1-Wire](https://www.maximintegrated.com/en/design/technical-documents/app-notes/1/126.html)
//! is a single-master, multi-slave, half-duplex bus on one open-drain wire
//! plus ground. This crate turns a host peripheral that can only emit and
//! capture (level, duration) pulse pairs — an RMT block, in Espressif's
//! terms — into reset/bit/byte transfers, ROM-command framing, and device
//! enumeration, without assuming anything about how those pulses actually
//! reach the wire.
//!
//! Layering, bottom to top:
//! - [`signal`] / [`codec`] — the pulse representation and the pure
//!   functions translating it to and from bits. No I/O.
//! - [`transceiver`] — the port a host HAL implements to drive the line.
//! - [`link`] — [`LinkLayer`](link::LinkLayer): reset, bit/byte I/O, strong
//!   pull-up, built on a [`Transceiver`](transceiver::Transceiver).
//! - [`rom`] / [`crc8`] / [`command`] / [`search`] / [`family`] — ROM ids,
//!   the CRC they're checked against, ROM-command framing, and the
//!   enumeration state machine.
//! - [`bus`] — [`Bus`]: the façade tying all of the above together.
//!
//! `no_std`, no allocator: fixed-capacity buffers throughout, sized to the
//! largest single operation (a 64-bit read or write).

#![no_std]

pub use crate::{
    bus::Bus,
    error::{Error, Result},
    rom::{CrcMismatch, DeviceId},
    search::ScanControl,
    signal::{Level, Signal, SignalBuffer},
    transceiver::Transceiver,
};

pub mod bus;
pub mod codec;
pub mod command;
pub mod crc8;
pub mod error;
pub mod family;
pub mod link;
pub mod rom;
pub mod search;
pub mod signal;
pub mod transceiver;
