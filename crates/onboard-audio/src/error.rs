//! Codec error type shared by both chip backends.

use platform::{BusError, GpioError};

/// Errors surfaced by the codec facade and its backends.
///
/// An EQ preset that does not match is not an error: lookups return `None`
/// and the caller falls back to unity all-pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror_no_std::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CodecError {
    /// A parameter is out of range (register width, filter count, level).
    #[error("invalid argument")]
    InvalidArgument,
    /// A reset sequence is already running; the request was not queued.
    #[error("codec reset already in progress")]
    Busy,
    /// The control bus or a GPIO line failed.
    #[error("control transport failed")]
    TransportFailure,
    /// A biquad write was attempted while the chip is in normal load mode.
    #[error("biquad write outside fast-load mode")]
    WrongLoadMode,
    /// The reset sequence failed on every allowed attempt.
    #[error("codec did not come out of reset after {attempts} attempts")]
    Fatal {
        /// Number of attempts made.
        attempts: u8,
    },
    /// The operation does not exist on this chip.
    #[error("operation not supported by this codec")]
    Unsupported,
}

impl From<BusError> for CodecError {
    fn from(_: BusError) -> Self {
        Self::TransportFailure
    }
}

impl From<GpioError> for CodecError {
    fn from(_: GpioError) -> Self {
        Self::TransportFailure
    }
}
