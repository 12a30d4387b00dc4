//! [`Bus`]: the public façade, spec §6.1. Owns (or borrows ownership of) a
//! [`LinkLayer`] and adds ROM-command framing and device enumeration on top
//! of its raw bit/byte I/O.

use crate::command::{ReadDeviceId, RomCommand, Select, Skip};
use crate::crc8;
use crate::error::Result;
use crate::link::LinkLayer;
use crate::rom::DeviceId;
use crate::search::{self, ScanControl};
use crate::transceiver::Transceiver;

/// A 1-Wire bus: ROM commands, enumeration, and raw bit/byte transfer over a
/// [`LinkLayer`]. All operations are sequential; see the crate docs for the
/// concurrency model.
pub struct Bus<T: Transceiver> {
    link: LinkLayer<T>,
}

impl<T: Transceiver> Bus<T> {
    /// Brings up a transceiver on `pin` and wraps it in a fresh link.
    pub fn open(pin: T::Pin, pull_up: bool) -> Result<Self, T::Error> {
        Ok(Self {
            link: LinkLayer::new(pin, pull_up)?,
        })
    }

    /// Takes ownership of an already-constructed link (closing the `Bus`
    /// closes it).
    pub fn open_with_link(link: LinkLayer<T>) -> Self {
        Self { link }
    }

    pub fn close(&mut self) -> Result<(), T::Error> {
        self.link.close()
    }

    /// Emits a reset pulse; `true` iff any device answered with presence.
    pub fn reset(&mut self) -> Result<bool, T::Error> {
        self.link.reset()
    }

    /// Selects a single device by its 64-bit id.
    pub fn select(&mut self, id: u64) -> Result<(), T::Error> {
        Select { id }.execute(&mut self.link)
    }

    /// Addresses every device on the bus simultaneously.
    pub fn skip(&mut self) -> Result<(), T::Error> {
        Skip.execute(&mut self.link)
    }

    /// Reads the single device's id. Only meaningful with exactly one
    /// device present; with more than one the result is the open-drain AND
    /// of every device's id.
    pub fn read_device_id(&mut self) -> Result<u64, T::Error> {
        ReadDeviceId.execute(&mut self.link)
    }

    pub fn write_bit(&mut self, value: bool, activate_power: bool) -> Result<(), T::Error> {
        self.link.write_bits(value as u64, 1, activate_power)
    }

    pub fn write_bits(&mut self, value: u64, count: usize, activate_power: bool) -> Result<(), T::Error> {
        self.link.write_bits(value, count, activate_power)
    }

    pub fn write_byte(&mut self, value: u8, activate_power: bool) -> Result<(), T::Error> {
        self.link.write_byte(value, activate_power)
    }

    pub fn write(&mut self, bytes: &[u8], activate_power: bool) -> Result<(), T::Error> {
        self.link.write(bytes, activate_power)
    }

    pub fn read_bit(&mut self) -> Result<bool, T::Error> {
        Ok(self.link.read_bits(1)? != 0)
    }

    pub fn read_bits(&mut self, count: usize) -> Result<u64, T::Error> {
        self.link.read_bits(count)
    }

    pub fn read_byte(&mut self) -> Result<u8, T::Error> {
        self.link.read_byte()
    }

    pub fn read(&mut self, buf: &mut [u8]) -> Result<(), T::Error> {
        self.link.read(buf)
    }

    /// Verifies a specific device is present without enumerating the whole
    /// bus.
    pub fn ping(&mut self, id: u64) -> Result<bool, T::Error> {
        search::ping(&mut self.link, id)
    }

    /// Enumerates devices on the bus, calling `callback` once per
    /// discovered id. `family`, if given, restricts the search to that
    /// family byte. `alarm_only` restricts it to devices currently in
    /// alarm. The callback returns [`ScanControl::SkipFamily`] to abandon
    /// the rest of the current family early.
    pub fn enumerate(
        &mut self,
        alarm_only: bool,
        family: Option<u8>,
        callback: impl FnMut(u64) -> ScanControl,
    ) -> Result<(), T::Error> {
        match family {
            Some(family) => search::enumerate_family(&mut self.link, family, callback),
            None => search::enumerate(&mut self.link, alarm_only, callback),
        }
    }

    /// Looks up a device id's family code against the built-in table.
    pub fn family_name(id: u64) -> Option<&'static str> {
        crate::family::name((id & 0xFF) as u8)
    }

    /// CRC-8 of the low 7 bytes of `id`, compared against the expected
    /// value in byte 7 by the caller.
    pub fn crc8_id(id: u64) -> u8 {
        crc8::calculate_id(id)
    }

    /// CRC-8 over an arbitrary byte sequence.
    pub fn crc8_bytes(bytes: &[u8]) -> u8 {
        crc8::calculate(bytes)
    }

    /// Decomposes a raw 64-bit ROM code into a [`DeviceId`], validating its
    /// CRC-8.
    pub fn decode_device_id(id: u64) -> core::result::Result<DeviceId, crate::rom::CrcMismatch> {
        DeviceId::try_from(id)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::codec;
    use crate::signal::{Level, Signal, SignalBuffer};
    use std::vec::Vec;

    /// A single simulated DS18B20-shaped device that answers reset, ROM
    /// read, and select/skip framing. Not a search harness (see
    /// `search::tests`) — just enough to exercise `Bus`'s facade methods.
    struct OneDevice {
        id: u64,
        pending_write: Vec<Signal>,
        idle_threshold: u16,
    }

    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    struct NoError;

    impl OneDevice {
        fn new(id: u64) -> Self {
            Self {
                id,
                pending_write: Vec::new(),
                idle_threshold: codec::IDLE_THRESHOLD,
            }
        }
    }

    impl Transceiver for OneDevice {
        type Pin = ();
        type Error = NoError;

        fn new(_pin: (), _pull_up: bool) -> core::result::Result<Self, NoError> {
            Ok(OneDevice::new(0))
        }

        fn write(&mut self, signals: &[Signal]) -> core::result::Result<(), NoError> {
            self.pending_write = signals.to_vec();
            Ok(())
        }

        fn start_reading(&mut self) -> core::result::Result<(), NoError> {
            Ok(())
        }

        fn read(&mut self) -> core::result::Result<SignalBuffer, NoError> {
            let mut out = SignalBuffer::new();
            if self.pending_write.len() == 2 && self.pending_write[0].level == Level::Low {
                let _ = out.push(Signal::new(Level::Low, codec::RESET_LOW));
                let _ = out.push(Signal::new(Level::High, 30));
                let _ = out.push(Signal::new(Level::Low, 100));
                let _ = out.push(Signal::new(
                    Level::High,
                    self.idle_threshold.saturating_add(self.idle_threshold / 2),
                ));
                return Ok(out);
            }
            // Every other write is a read-stimulus train; answer with this
            // device's id bits, LSB-first, one (low, high) pair per bit
            // already present in `signals`.
            let bit_count = self.pending_write.len() / 2;
            for i in 0..bit_count {
                let bit = (self.id >> i) & 1 != 0;
                if bit {
                    let _ = out.push(Signal::new(Level::Low, codec::READ_LOW));
                    let _ = out.push(Signal::new(Level::High, codec::READ_HIGH));
                } else {
                    let _ = out.push(Signal::new(Level::Low, codec::WRITE_0_LOW));
                    let _ = out.push(Signal::new(
                        Level::High,
                        codec::IO_TIME_SLOT - codec::WRITE_0_LOW,
                    ));
                }
            }
            Ok(out)
        }

        fn stop_reading(&mut self) -> core::result::Result<(), NoError> {
            Ok(())
        }

        fn set_idle_threshold(&mut self, us: u16) -> core::result::Result<(), NoError> {
            self.idle_threshold = us;
            Ok(())
        }

        fn idle_threshold(&self) -> u16 {
            self.idle_threshold
        }

        fn set_open_drain(&mut self, _on: bool) -> core::result::Result<(), NoError> {
            Ok(())
        }

        fn close(&mut self) -> core::result::Result<(), NoError> {
            Ok(())
        }
    }

    fn bus_with(id: u64) -> Bus<OneDevice> {
        let link = LinkLayer::from_transceiver(OneDevice::new(id));
        Bus::open_with_link(link)
    }

    #[test]
    fn reset_reports_presence() {
        let mut bus = bus_with(0x3D00_0000_0000_0001);
        assert!(bus.reset().unwrap());
    }

    #[test]
    fn read_device_id_round_trips() {
        let id = 0x3D00_0000_0000_0001;
        let mut bus = bus_with(id);
        assert_eq!(bus.read_device_id().unwrap(), id);
    }

    #[test]
    fn crc8_helpers_match_codec() {
        assert_eq!(Bus::<OneDevice>::crc8_id(0x3D00_0000_0000_0001), 0x3D);
        assert_eq!(Bus::<OneDevice>::crc8_bytes(&[0]), crc8::calculate(&[0]));
    }

    #[test]
    fn family_name_resolves_from_id() {
        assert_eq!(
            Bus::<OneDevice>::family_name(0x3D00_0000_0000_0001),
            None,
        );
    }

    #[test]
    fn closing_is_idempotent() {
        let mut bus = bus_with(0x3D00_0000_0000_0001);
        bus.close().unwrap();
        bus.close().unwrap();
    }

    /// No device on the bus: every `read()`, reset included, captures
    /// nothing, exercising S5 and NO_DEVICE propagation through the real
    /// `Bus`/`LinkLayer` stack rather than a from-scratch reimplementation.
    struct EmptyBus;

    impl Transceiver for EmptyBus {
        type Pin = ();
        type Error = NoError;

        fn new(_pin: (), _pull_up: bool) -> core::result::Result<Self, NoError> {
            Ok(EmptyBus)
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

    fn empty_bus() -> Bus<EmptyBus> {
        Bus::open_with_link(LinkLayer::from_transceiver(EmptyBus))
    }

    /// S5: reset on an empty bus resolves to `false`, not an error.
    #[test]
    fn reset_on_empty_bus_is_false() {
        assert_eq!(empty_bus().reset(), Ok(false));
    }

    #[test]
    fn select_propagates_no_device_on_empty_bus() {
        assert_eq!(empty_bus().select(1), Err(crate::error::Error::NoDevice));
    }

    #[test]
    fn skip_propagates_no_device_on_empty_bus() {
        assert_eq!(empty_bus().skip(), Err(crate::error::Error::NoDevice));
    }
}
