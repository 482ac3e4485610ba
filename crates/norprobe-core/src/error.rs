//! Error types for norprobe-core
//!
//! This module provides a no_std compatible error type shared by the bus
//! contract, the session guard and the transports.

use core::fmt;

/// Core error type - no_std compatible, Copy for efficiency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    // Transport errors
    /// No transport response within the timeout bound
    Timeout,
    /// Hardware or link fault reported by the transport
    TransportError,
    /// Transport returned an unexpected number of bytes
    MalformedResponse {
        /// Number of bytes the transaction should have produced
        expected: usize,
        /// Number of bytes actually returned
        actual: usize,
    },

    // Bus state errors
    /// `acquire()` called while the bus is already held
    AlreadyHeld,
    /// `release()` called without a prior `acquire()`
    NotHeld,

    // Argument errors
    /// Empty write buffer or zero-length read
    InvalidArgument,
}

impl Error {
    /// Returns true for acquire/release misuse
    pub fn is_bus_state(&self) -> bool {
        matches!(self, Self::AlreadyHeld | Self::NotHeld)
    }

    /// Returns true for failures reported by the transport itself
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Timeout | Self::TransportError)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(f, "SPI transaction timed out"),
            Self::TransportError => write!(f, "SPI transport error"),
            Self::MalformedResponse { expected, actual } => write!(
                f,
                "malformed response: expected {} bytes, got {}",
                expected, actual
            ),
            Self::AlreadyHeld => write!(f, "SPI bus is already held"),
            Self::NotHeld => write!(f, "SPI bus is not held"),
            Self::InvalidArgument => write!(f, "invalid transaction argument"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Result type alias using the core Error type
pub type Result<T> = core::result::Result<T, Error>;
