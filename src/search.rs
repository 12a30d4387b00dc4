//! The enumeration ("search") state machine, spec §4.5: an iterative binary
//! tree walk that discovers every device's 64-bit id in O(n·64) bus
//! operations with bounded memory.

use crate::command::{SEARCH, SEARCH_ALARM};
use crate::crc8;
use crate::error::{Error, Result};
use crate::link::LinkLayer;
use crate::transceiver::Transceiver;

/// What the caller's per-device callback asks the search to do next.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ScanControl {
    /// Keep walking the tree normally.
    Continue,
    /// Skip every remaining device sharing this id's family byte.
    SkipFamily,
}

/// Internal continuation signal: a superset of [`ScanControl`] that also
/// lets the family-filtered and `ping` wrappers force early termination
/// without reaching into the core loop's branch bookkeeping.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Continuation {
    Continue,
    SkipFamily,
    Stop,
}

impl From<ScanControl> for Continuation {
    fn from(c: ScanControl) -> Self {
        match c {
            ScanControl::Continue => Continuation::Continue,
            ScanControl::SkipFamily => Continuation::SkipFamily,
        }
    }
}

/// Transient bookkeeping for one enumeration traversal (spec §3
/// SearchState). All three branch fields are bit positions in `-1..64`;
/// `-1` means "no unexplored branch recorded".
struct SearchState {
    id: u64,
    last_unexplored_branch: i8,
    last_unexplored_family_branch: i8,
    previous_last_unexplored_branch: i8,
}

impl SearchState {
    fn new(start_id: u64, fixed_bits: i8) -> Self {
        Self {
            id: start_id,
            last_unexplored_branch: -1,
            last_unexplored_family_branch: -1,
            previous_last_unexplored_branch: fixed_bits,
        }
    }
}

/// Drives one full enumeration, calling `on_device` for every discovered id.
/// Shared by `enumerate`, the family-filtered wrapper and `ping`.
pub(crate) fn run<T: Transceiver>(
    link: &mut LinkLayer<T>,
    alarm_only: bool,
    start_id: u64,
    fixed_bits: i8,
    mut on_device: impl FnMut(u64) -> Continuation,
) -> Result<(), T::Error> {
    let mut state = SearchState::new(start_id, fixed_bits);

    loop {
        if !link.reset()? {
            return Ok(());
        }
        link.write_byte(if alarm_only { SEARCH_ALARM } else { SEARCH }, false)?;

        for p in 0..64u8 {
            let b = link.read_bits(1)? != 0;
            let c = link.read_bits(1)? != 0;
            let mask = 1u64 << p;

            let chosen = match (b, c) {
                (true, true) => {
                    if alarm_only {
                        return Ok(());
                    }
                    return Err(Error::BusError);
                }
                (false, false) => {
                    let p = p as i8;
                    if p < state.previous_last_unexplored_branch {
                        (state.id & mask) != 0
                    } else if p == state.previous_last_unexplored_branch {
                        true
                    } else {
                        if p < 8 {
                            state.last_unexplored_family_branch = p;
                        }
                        state.last_unexplored_branch = p;
                        false
                    }
                }
                (false, true) => false,
                (true, false) => true,
            };

            if chosen {
                state.id |= mask;
            } else {
                state.id &= !mask;
            }
            link.write_bits(chosen as u64, 1, false)?;
        }

        if (state.id >> 56) as u8 != crc8::calculate_id(state.id) {
            return Err(Error::CrcError);
        }

        match on_device(state.id) {
            Continuation::Stop => return Ok(()),
            Continuation::SkipFamily => {
                state.previous_last_unexplored_branch = state.last_unexplored_family_branch;
            }
            Continuation::Continue => {
                state.previous_last_unexplored_branch = state.last_unexplored_branch;
            }
        }
        state.last_unexplored_branch = -1;
        state.last_unexplored_family_branch = -1;

        if state.previous_last_unexplored_branch == -1 {
            #[cfg(feature = "defmt")]
            defmt::trace!("1-wire search: enumeration complete");
            return Ok(());
        }
    }
}

/// Plain enumeration: every device on the bus, or only those in alarm.
pub(crate) fn enumerate<T: Transceiver>(
    link: &mut LinkLayer<T>,
    alarm_only: bool,
    mut callback: impl FnMut(u64) -> ScanControl,
) -> Result<(), T::Error> {
    run(link, alarm_only, 0, -1, |id| callback(id).into())
}

/// Family-filtered enumeration: pre-seeds the low 8 bits with `family` and
/// reuses them verbatim (`fixed_bits = 8`), terminating as soon as a
/// discovered id's family byte no longer matches.
pub(crate) fn enumerate_family<T: Transceiver>(
    link: &mut LinkLayer<T>,
    family: u8,
    mut callback: impl FnMut(u64) -> ScanControl,
) -> Result<(), T::Error> {
    run(link, false, family as u64, 8, |id| {
        if (id & 0xFF) as u8 != family {
            Continuation::Stop
        } else {
            callback(id).into()
        }
    })
}

/// `ping(id)`: verifies a specific device is present by retracing its full
/// 64-bit path (`fixed_bits = 64`) and comparing the first (and only)
/// yielded id.
pub(crate) fn ping<T: Transceiver>(link: &mut LinkLayer<T>, id: u64) -> Result<bool, T::Error> {
    let mut found = false;
    run(link, false, id, 64, |yielded| {
        found = yielded == id;
        Continuation::Stop
    })?;
    Ok(found)
}
