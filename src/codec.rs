//! Pure bit ↔ pulse translation. No I/O, no state — see AN126 for the timing
//! rationale behind every constant here.
//!
//! Letters in parentheses below are the app-note's own names for these
//! windows, kept in comments the way [`crate`]'s driver ancestor named them.

use crate::error::{CodecError as Error, CodecResult as Result};
use crate::signal::{Level, Signal, SignalBuffer, SIGNALS_PER_BIT};

/// (H) master drives low for the reset pulse.
pub const RESET_LOW: u16 = 480;
/// (I) release then wait before sampling presence.
pub const RESET_HIGH_BEFORE_SAMPLE: u16 = 70;
/// (J) remainder of the high window after presence is sampled.
pub const RESET_HIGH_AFTER_SAMPLE: u16 = 410;
/// (I + J) total high portion of the reset slot.
pub const RESET_HIGH: u16 = RESET_HIGH_BEFORE_SAMPLE + RESET_HIGH_AFTER_SAMPLE;
/// Receiver idle threshold while capturing a reset/presence pulse.
pub const RESET_IDLE_THRESHOLD: u16 = 530;

/// Duration of one read or write bit slot.
pub const IO_TIME_SLOT: u16 = 70;
/// (A) master pulls low to initiate a read slot.
pub const READ_LOW: u16 = 6;
/// (E) sample delay: spec calls for 9µs, +5µs margin for the pull-up.
pub const READ_HIGH_BEFORE_SAMPLE: u16 = 14;
/// (F) remainder of the read slot.
pub const READ_HIGH_AFTER_SAMPLE: u16 = 55;
/// (E + F) total high portion of a read slot.
pub const READ_HIGH: u16 = READ_HIGH_BEFORE_SAMPLE + READ_HIGH_AFTER_SAMPLE;

/// (C) master pulls low for a '0' write bit.
pub const WRITE_0_LOW: u16 = 60;
/// (A) master pulls low for a '1' write bit.
pub const WRITE_1_LOW: u16 = 6;

/// Default receive idle threshold: greater than any write-low period, so a
/// write never looks like the end of a captured frame.
pub const IDLE_THRESHOLD: u16 = 75;

/// Encodes `count` bits of `bits` (LSB-first) as a write pulse train.
///
/// `count` must be `<= 64`; callers (LinkLayer) are responsible for enforcing
/// that, as this function has nowhere to report it without an allocator for
/// the error path of an over-capacity buffer.
pub fn encode_write(bits: u64, count: usize) -> SignalBuffer {
    let mut signals = SignalBuffer::new();
    for i in 0..count {
        let bit = (bits >> i) & 1 == 1;
        let low = if bit { WRITE_1_LOW } else { WRITE_0_LOW };
        let _ = signals.push(Signal::new(Level::Low, low));
        let _ = signals.push(Signal::new(Level::High, IO_TIME_SLOT - low));
    }
    signals
}

/// Encodes `bit_count` read-stimulus slots: the master's half of a read, not
/// a response. The slave determines the bit value by how soon it releases the
/// line during each high window.
pub fn encode_read(bit_count: usize) -> SignalBuffer {
    let mut signals = SignalBuffer::new();
    for _ in 0..bit_count {
        let _ = signals.push(Signal::new(Level::Low, READ_LOW));
        let _ = signals.push(Signal::new(Level::High, READ_HIGH));
    }
    signals
}

/// Decodes `bit_count` bits starting at signal index `from`, accumulating
/// LSB-first. Each bit is one (low, high) signal pair; the decoded value is
/// 1 iff the high period is shorter than [`READ_HIGH_BEFORE_SAMPLE`].
pub fn decode(signals: &[Signal], from: usize, bit_count: usize) -> Result<u64> {
    if bit_count > 64 {
        return Err(Error::InvalidArgument);
    }
    let needed = from + SIGNALS_PER_BIT * bit_count;
    if needed > signals.len() {
        return Err(Error::InvalidSignal);
    }
    let mut value: u64 = 0;
    for i in 0..bit_count {
        let low = signals[from + SIGNALS_PER_BIT * i];
        let high = signals[from + SIGNALS_PER_BIT * i + 1];
        if low.level != Level::Low || high.level != Level::High {
            return Err(Error::InvalidSignal);
        }
        if low.period_us < READ_HIGH_BEFORE_SAMPLE {
            value |= 1 << i;
        }
    }
    Ok(value)
}

/// Decodes `byte_count` bytes starting at signal offset `from_byte * 16`
/// (8 bits, 2 signals each) into `out`.
pub fn decode_bytes(signals: &[Signal], from_byte: usize, out: &mut [u8]) -> Result<()> {
    for (i, byte) in out.iter_mut().enumerate() {
        let from = (from_byte + i) * 8 * SIGNALS_PER_BIT;
        *byte = decode(signals, from, 8)? as u8;
    }
    Ok(())
}
