//! The link layer: reset, bit/byte read and write, and strong pull-up power
//! delivery, built on a generic [`Transceiver`] (spec §4.2).

use crate::codec;
use crate::error::{Error, Result};
use crate::signal::{Level, Signal};
use crate::transceiver::Transceiver;

/// The window a reset's low pulse must land in, spec §9: asymmetric because
/// the peripheral sometimes overshoots the nominal 480µs on the high side.
const RESET_LOW_MIN: u16 = codec::RESET_LOW - 2;
const RESET_LOW_MAX: u16 = codec::RESET_LOW + 10;

/// Spec's reset-response budget (spec §4.2/§5): `reset` should see a
/// presence answer, if any, within this long of arming the receiver. Kept
/// here for documentation and for callers sizing their own watchdogs; the
/// bound itself is enforced inside the concrete [`Transceiver::read`], the
/// only thing in this crate that blocks on the bus — see the "Reset
/// response timeout" entry in DESIGN.md's Open Question list.
pub const RESET_RESPONSE_TIMEOUT_MS: u32 = 500;

/// Stateful driver around a [`Transceiver`] port. Owns the transceiver
/// exclusively; closing the link closes it.
pub struct LinkLayer<T: Transceiver> {
    transceiver: T,
    closed: bool,
    power: bool,
}

impl<T: Transceiver> LinkLayer<T> {
    /// Brings up the transceiver on `pin` and sets the default receive idle
    /// threshold.
    pub fn new(pin: T::Pin, pull_up: bool) -> Result<Self, T::Error> {
        let mut transceiver = T::new(pin, pull_up).map_err(Error::Transport)?;
        transceiver
            .set_idle_threshold(codec::IDLE_THRESHOLD)
            .map_err(Error::Transport)?;
        Ok(Self {
            transceiver,
            closed: false,
            power: false,
        })
    }

    /// Wraps an already-constructed transceiver, e.g. one a `Bus` took
    /// ownership of via `open_with_link`.
    pub fn from_transceiver(transceiver: T) -> Self {
        Self {
            transceiver,
            closed: false,
            power: false,
        }
    }

    /// Like [`new`](Self::new), but overrides the default receive idle
    /// threshold instead of `codec::IDLE_THRESHOLD`. For pull-up strengths
    /// or cable lengths where the default gap misjudges end-of-byte.
    pub fn with_idle_threshold(pin: T::Pin, pull_up: bool, idle_threshold_us: u16) -> Result<Self, T::Error> {
        let mut link = Self::new(pin, pull_up)?;
        link.transceiver
            .set_idle_threshold(idle_threshold_us)
            .map_err(Error::Transport)?;
        Ok(link)
    }

    fn require_open(&self) -> Result<(), T::Error> {
        if self.closed {
            Err(Error::BusClosed)
        } else {
            Ok(())
        }
    }

    /// Emits a reset pulse and reports whether any slave answered with a
    /// presence pulse. `transceiver.read()` is expected to return within
    /// [`RESET_RESPONSE_TIMEOUT_MS`] even with nothing captured; a response
    /// timeout then falls out of the normal `captured.len() >= 3` check
    /// below and resolves to `false`, not an error.
    pub fn reset(&mut self) -> Result<bool, T::Error> {
        self.require_open()?;

        let previous = self.transceiver.idle_threshold();
        let mut guard = IdleThresholdGuard::new(&mut self.transceiver, previous);
        guard
            .transceiver()
            .set_idle_threshold(codec::RESET_IDLE_THRESHOLD)
            .map_err(Error::Transport)?;

        let signals = [
            Signal::new(Level::Low, codec::RESET_LOW),
            Signal::new(Level::High, codec::RESET_HIGH),
        ];
        guard
            .transceiver()
            .start_reading()
            .map_err(Error::Transport)?;
        guard
            .transceiver()
            .write(&signals)
            .map_err(Error::Transport)?;
        let captured = guard.transceiver().read().map_err(Error::Transport)?;
        guard
            .transceiver()
            .stop_reading()
            .map_err(Error::Transport)?;

        let present = captured.len() >= 3
            && captured[0].level == Level::Low
            && (RESET_LOW_MIN..=RESET_LOW_MAX).contains(&captured[0].period_us)
            && captured[1].level == Level::High
            && captured[1].period_us > 0
            && captured[2].level == Level::Low
            && captured[2].period_us > 0;

        #[cfg(feature = "defmt")]
        defmt::trace!("1-wire reset: presence={}", present);

        Ok(present)
    }

    /// Writes the low `count` bits of `value`, LSB-first. If
    /// `activate_power` is set, open-drain is disabled once the write
    /// completes, turning the pin into a strong pull-up.
    pub fn write_bits(&mut self, value: u64, count: usize, activate_power: bool) -> Result<(), T::Error> {
        self.require_open()?;
        if count > 64 {
            return Err(Error::InvalidArgument);
        }
        let signals = codec::encode_write(value, count);
        self.transceiver.write(&signals).map_err(Error::Transport)?;
        if activate_power {
            self.set_power(true)?;
        }
        Ok(())
    }

    pub fn write_byte(&mut self, value: u8, activate_power: bool) -> Result<(), T::Error> {
        self.write_bits(value as u64, 8, activate_power)
    }

    /// Writes each byte individually (its own slot sequence, not packed into
    /// one transceiver call).
    pub fn write(&mut self, bytes: &[u8], activate_power: bool) -> Result<(), T::Error> {
        for &byte in bytes {
            self.write_byte(byte, activate_power)?;
        }
        Ok(())
    }

    /// Reads `count` bits (0..=64), LSB-first. Re-enables open-drain first,
    /// per the "any read restores open-drain" invariant.
    pub fn read_bits(&mut self, count: usize) -> Result<u64, T::Error> {
        self.require_open()?;
        if count > 64 {
            return Err(Error::InvalidArgument);
        }
        self.set_power(false)?;

        self.transceiver.start_reading().map_err(Error::Transport)?;
        let stimulus = codec::encode_read(count);
        self.transceiver.write(&stimulus).map_err(Error::Transport)?;
        let captured = self.transceiver.read().map_err(Error::Transport)?;
        self.transceiver
            .stop_reading()
            .map_err(Error::Transport)?;

        Ok(codec::decode(&captured, 0, count)?)
    }

    pub fn read_byte(&mut self) -> Result<u8, T::Error> {
        Ok(self.read_bits(8)? as u8)
    }

    /// Reads `buf.len()` bytes, one slot sequence per byte.
    pub fn read(&mut self, buf: &mut [u8]) -> Result<(), T::Error> {
        for byte in buf.iter_mut() {
            *byte = self.read_byte()?;
        }
        Ok(())
    }

    /// Enables or disables strong pull-up power delivery. Disabling
    /// open-drain (power on) lets the pin source current instead of only
    /// sinking it.
    pub fn set_power(&mut self, on: bool) -> Result<(), T::Error> {
        self.require_open()?;
        self.transceiver
            .set_open_drain(!on)
            .map_err(Error::Transport)?;
        self.power = on;
        Ok(())
    }

    pub fn power(&self) -> bool {
        self.power
    }

    /// Idempotent: closing an already-closed link is a no-op.
    pub fn close(&mut self) -> Result<(), T::Error> {
        if self.closed {
            return Ok(());
        }
        self.transceiver.close().map_err(Error::Transport)?;
        self.closed = true;
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

/// Scoped idle-threshold acquisition: restores the transceiver's previous
/// idle threshold on every exit path, including error returns, matching
/// spec §4.2's "guaranteed release" requirement for `reset`.
struct IdleThresholdGuard<'a, T: Transceiver> {
    transceiver: &'a mut T,
    previous_us: u16,
}

impl<'a, T: Transceiver> IdleThresholdGuard<'a, T> {
    fn new(transceiver: &'a mut T, previous_us: u16) -> Self {
        Self {
            transceiver,
            previous_us,
        }
    }

    fn transceiver(&mut self) -> &mut T {
        self.transceiver
    }
}

impl<T: Transceiver> Drop for IdleThresholdGuard<'_, T> {
    fn drop(&mut self) {
        let _ = self.transceiver.set_idle_threshold(self.previous_us);
    }
}
