use thiserror::Error;

/// Errors the signal codec can raise on its own, with no transceiver
/// involved. Kept separate from [`Error`] so `codec.rs` stays a pure,
/// transport-agnostic module; [`Error`] absorbs these via `From`.
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum CodecError {
    #[error("decode saw an unexpected signal level or ran past the signal buffer")]
    InvalidSignal,
    #[error("bit count out of range (0..=64)")]
    InvalidArgument,
}

/// Result alias for codec-only functions.
pub type CodecResult<T> = core::result::Result<T, CodecError>;

/// Result alias for link-layer/bus operations.
pub type Result<T, E> = core::result::Result<T, Error<E>>;

/// Error taxonomy for the link layer and bus, spec §6.3. `E` is the
/// transceiver's own associated error type, surfaced unmodified in
/// [`Error::Transport`]. `E` only needs `Debug` (not the `Error` trait):
/// embedded transceiver errors rarely bother implementing `core::error::Error`.
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum Error<E: core::fmt::Debug> {
    #[error("bus closed")]
    BusClosed,
    #[error("no device responded to reset")]
    NoDevice,
    #[error("search saw a (1, 1) response outside alarm mode")]
    BusError,
    #[error("search delivered a device id with a bad CRC-8")]
    CrcError,
    #[error("decode saw an unexpected signal level or ran past the signal buffer")]
    InvalidSignal,
    #[error("bit count out of range (0..=64)")]
    InvalidArgument,
    #[error("transceiver error: {0:?}")]
    Transport(E),
}

impl<E: core::fmt::Debug> From<CodecError> for Error<E> {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::InvalidSignal => Error::InvalidSignal,
            CodecError::InvalidArgument => Error::InvalidArgument,
        }
    }
}
