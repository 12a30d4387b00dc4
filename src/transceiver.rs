//! The capability LinkLayer requires from the host platform: a pulse
//! transceiver on a single open-drain, pulled-up pin (spec §6.2). The RMT
//! peripheral driver that implements this trait, and the GPIO wiring behind
//! it, are deliberately outside this crate's scope — see spec.md §1.

use crate::signal::{Signal, SignalBuffer};

/// A pulse transceiver bound to one bidirectional 1-Wire pin.
///
/// Implementors are expected to fold the peripheral's own setup sequence
/// (configure an output channel, configure an input channel, join them into
/// one bidirectional, pulled-up channel) into [`Transceiver::new`]; once
/// constructed, [`LinkLayer`](crate::link::LinkLayer) only ever calls the
/// steady-state operations below.
pub trait Transceiver: Sized {
    /// Platform-specific pin identifier (GPIO number, peripheral pin type…).
    type Pin;
    /// Platform-specific transceiver failure (peripheral fault, DMA error…).
    type Error: core::fmt::Debug;

    /// Configures the output channel, the input channel, and joins them into
    /// a single bidirectional channel on `pin`, enabling the external
    /// pull-up if `pull_up` is set. Open-drain starts enabled.
    fn new(pin: Self::Pin, pull_up: bool) -> Result<Self, Self::Error>;

    /// Transmits `signals`, blocking until the peripheral has emitted them.
    /// May run concurrently with an active receive.
    fn write(&mut self, signals: &[Signal]) -> Result<(), Self::Error>;

    /// Arms the receiver. Capture runs until the line has been idle for at
    /// least the current idle threshold, or [`Transceiver::read`] times out.
    fn start_reading(&mut self) -> Result<(), Self::Error>;

    /// Blocks until the armed receive completes (idle threshold reached) and
    /// returns the captured signals.
    fn read(&mut self) -> Result<SignalBuffer, Self::Error>;

    /// Disarms the receiver; a no-op if it isn't armed.
    fn stop_reading(&mut self) -> Result<(), Self::Error>;

    /// Sets the receive idle threshold, in microseconds.
    fn set_idle_threshold(&mut self, us: u16) -> Result<(), Self::Error>;

    /// Current receive idle threshold, in microseconds.
    fn idle_threshold(&self) -> u16;

    /// Enables or disables open-drain mode on the pin. Disabling it lets the
    /// pin source current as a strong pull-up for power delivery.
    fn set_open_drain(&mut self, on: bool) -> Result<(), Self::Error>;

    /// Releases both channels. Idempotent.
    fn close(&mut self) -> Result<(), Self::Error>;
}
