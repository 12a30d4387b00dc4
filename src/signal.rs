//! The passive value type traded between the [`codec`](crate::codec) and the
//! [`Transceiver`](crate::transceiver::Transceiver) port: an ordered sequence
//! of (level, period) pulses.

/// One edge of the bus: which level it's driven/sampled to, and for how
/// long, in microseconds.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Signal {
    pub level: Level,
    pub period_us: u16,
}

impl Signal {
    pub const fn new(level: Level, period_us: u16) -> Self {
        Self { level, period_us }
    }
}

/// A single bus level. `Low` is the master (or a slave) pulling the open-drain
/// line down; `High` is the line released to the pull-up.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Level {
    #[default]
    Low,
    High,
}

impl From<Level> for u8 {
    fn from(level: Level) -> Self {
        match level {
            Level::Low => 0,
            Level::High => 1,
        }
    }
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high {
            Level::High
        } else {
            Level::Low
        }
    }
}

/// The largest single codec call encodes or decodes 64 bits, two signals per
/// bit.
pub const MAX_BITS: usize = 64;
pub const SIGNALS_PER_BIT: usize = 2;
pub const MAX_SIGNALS: usize = MAX_BITS * SIGNALS_PER_BIT;

/// Fixed-capacity signal sequence. No allocator: capacity is sized for the
/// largest operation the codec performs (a 64-bit read or write).
pub type SignalBuffer = heapless::Vec<Signal, MAX_SIGNALS>;
