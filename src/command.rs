//! ROM-command bytes and the small command pattern `Bus` frames them with,
//! spec §4.4. Search gets its own state machine (see [`crate::search`]); the
//! three commands here are simple reset-then-frame operations.

use crate::error::{Error, Result};
use crate::link::LinkLayer;
use crate::transceiver::Transceiver;

/// Select a specific device by its 64-bit id.
pub const MATCH: u8 = 0x55;
/// Address all devices simultaneously.
pub const SKIP: u8 = 0xCC;
/// Enumerate all devices (see [`crate::search`]).
pub const SEARCH: u8 = 0xF0;
/// Read the single device's id (collision-sensitive).
pub const READ: u8 = 0x33;
/// Enumerate only devices currently in alarm (see [`crate::search`]).
pub const SEARCH_ALARM: u8 = 0xEC;

/// A ROM-command framing operation: reset, then write the command byte and
/// whatever payload it needs.
pub(crate) trait RomCommand {
    type Output;

    fn execute<T: Transceiver>(&self, link: &mut LinkLayer<T>) -> Result<Self::Output, T::Error>;
}

/// `select(id)`: reset; fail `NO_DEVICE` if nothing answered; write MATCH and
/// the 64-bit id.
pub(crate) struct Select {
    pub id: u64,
}

impl RomCommand for Select {
    type Output = ();

    fn execute<T: Transceiver>(&self, link: &mut LinkLayer<T>) -> Result<(), T::Error> {
        if !link.reset()? {
            return Err(Error::NoDevice);
        }
        link.write_byte(MATCH, false)?;
        link.write_bits(self.id, 64, false)?;
        Ok(())
    }
}

/// `skip`: reset; fail `NO_DEVICE` if nothing answered; write SKIP.
pub(crate) struct Skip;

impl RomCommand for Skip {
    type Output = ();

    fn execute<T: Transceiver>(&self, link: &mut LinkLayer<T>) -> Result<(), T::Error> {
        if !link.reset()? {
            return Err(Error::NoDevice);
        }
        link.write_byte(SKIP, false)?;
        Ok(())
    }
}

/// `read_device_id`: reset; write READ; read 64 bits. Only meaningful with a
/// single device on the bus — with more than one, the result is the
/// open-drain AND of every id.
pub(crate) struct ReadDeviceId;

impl RomCommand for ReadDeviceId {
    type Output = u64;

    fn execute<T: Transceiver>(&self, link: &mut LinkLayer<T>) -> Result<u64, T::Error> {
        if !link.reset()? {
            return Err(Error::NoDevice);
        }
        link.write_byte(READ, false)?;
        link.read_bits(64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec;
    use crate::signal::{Signal, SignalBuffer};

    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    struct NoError;

    /// An empty bus: every `read()`, reset included, captures nothing.
    struct NoPresence;

    impl Transceiver for NoPresence {
        type Pin = ();
        type Error = NoError;

        fn new(_pin: (), _pull_up: bool) -> core::result::Result<Self, NoError> {
            Ok(NoPresence)
        }

        fn write(&mut self, _signals: &[Signal]) -> core::result::Result<(), NoError> {
            Ok(())
        }

        fn start_reading(&mut self) -> core::result::Result<(), NoError> {
            Ok(())
        }

        fn read(&mut self) -> core::result::Result<SignalBuffer, NoError> {
            Ok(SignalBuffer::new())
        }

        fn stop_reading(&mut self) -> core::result::Result<(), NoError> {
            Ok(())
        }

        fn set_idle_threshold(&mut self, _us: u16) -> core::result::Result<(), NoError> {
            Ok(())
        }

        fn idle_threshold(&self) -> u16 {
            codec::IDLE_THRESHOLD
        }

        fn set_open_drain(&mut self, _on: bool) -> core::result::Result<(), NoError> {
            Ok(())
        }

        fn close(&mut self) -> core::result::Result<(), NoError> {
            Ok(())
        }
    }

    #[test]
    fn select_fails_no_device_on_empty_bus() {
        let mut link = LinkLayer::from_transceiver(NoPresence);
        assert_eq!(Select { id: 1 }.execute(&mut link), Err(Error::NoDevice));
    }

    #[test]
    fn skip_fails_no_device_on_empty_bus() {
        let mut link = LinkLayer::from_transceiver(NoPresence);
        assert_eq!(Skip.execute(&mut link), Err(Error::NoDevice));
    }

    #[test]
    fn read_device_id_fails_no_device_on_empty_bus() {
        let mut link = LinkLayer::from_transceiver(NoPresence);
        assert_eq!(ReadDeviceId.execute(&mut link), Err(Error::NoDevice));
    }
}
