//! Core traits and types for the sensor control plane.
//!
//! Everything the driver needs from the outside world (control bus, supply
//! rails, clock, reset line, sleeping) is expressed as a trait here so the
//! same control logic runs against real hardware or the [`crate::mock`]
//! backend.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::controls::ControlId;
use crate::stream::StartStage;

/// Register width on the control bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Width {
    /// 8-bit register.
    Bits8,
    /// 16-bit register, little endian on the wire.
    Bits16,
}

impl Width {
    /// Largest value a register of this width can hold.
    #[must_use]
    pub const fn max_value(self) -> u16 {
        match self {
            Self::Bits8 => 0xFF,
            Self::Bits16 => 0xFFFF,
        }
    }
}

/// A register address together with its declared width.
///
/// The width is fixed per address; reading or writing one address with two
/// different widths is a contract violation on the caller's side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Register {
    /// Address in the sensor's 16-bit register space.
    pub address: u16,
    /// Declared width.
    pub width: Width,
}

impl Register {
    /// An 8-bit register.
    #[must_use]
    pub const fn reg8(address: u16) -> Self {
        Self {
            address,
            width: Width::Bits8,
        }
    }

    /// A 16-bit little-endian register.
    #[must_use]
    pub const fn reg16(address: u16) -> Self {
        Self {
            address,
            width: Width::Bits16,
        }
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:04x}", self.address)
    }
}

/// Rectangle in pixel-array coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    /// Left edge.
    pub left: i32,
    /// Top edge.
    pub top: i32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Rect {
    /// Create a new rectangle.
    #[must_use]
    pub const fn new(left: i32, top: i32, width: u32, height: u32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Whether `other` lies entirely inside this rectangle.
    #[must_use]
    pub fn contains(&self, other: &Self) -> bool {
        let right = i64::from(self.left) + i64::from(self.width);
        let bottom = i64::from(self.top) + i64::from(self.height);
        other.left >= self.left
            && other.top >= self.top
            && i64::from(other.left) + i64::from(other.width) <= right
            && i64::from(other.top) + i64::from(other.height) <= bottom
    }
}

/// Pixel format representation (e.g., RG10, BA10).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FourCC(pub [u8; 4]);

impl FourCC {
    /// Create a new `FourCC` from a 4-byte array.
    #[must_use]
    pub const fn new(code: &[u8; 4]) -> Self {
        Self(*code)
    }
}

impl fmt::Display for FourCC {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{}", char::from(byte))?;
        }
        Ok(())
    }
}

#[cfg(feature = "v4l")]
impl From<v4l::FourCC> for FourCC {
    fn from(fourcc: v4l::FourCC) -> Self {
        Self(fourcc.repr)
    }
}

#[cfg(feature = "v4l")]
impl From<FourCC> for v4l::FourCC {
    fn from(fourcc: FourCC) -> Self {
        Self::new(&fourcc.0)
    }
}

/// Transport failure reported by a [`ControlBus`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BusError {
    /// The device did not acknowledge the transfer.
    #[error("no acknowledge from device")]
    NoAck,
    /// The transfer did not complete in time.
    #[error("bus transfer timed out")]
    Timeout,
    /// Any other adapter-level failure.
    #[error("bus failure: {0}")]
    Other(String),
}

/// Failure reported by a supply rail or clock.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct Fault(pub String);

/// Power sequencing failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PowerError {
    /// A supply rail refused to turn on.
    #[error("failed to enable supply {rail}: {source}")]
    Rail {
        /// Name of the failing rail.
        rail: String,
        /// Cause reported by the rail.
        source: Fault,
    },
    /// The external clock refused to turn on.
    #[error("failed to enable clock: {0}")]
    Clock(#[source] Fault),
}

/// Error type for sensor operations.
#[derive(Debug, Error)]
pub enum SensorError {
    /// A register read or write failed on the bus.
    #[error("register 0x{address:04x}: {source}")]
    Transport {
        /// Register that was being accessed.
        address: u16,
        /// Bus-level cause.
        source: BusError,
    },
    /// Rail or clock failed to power up.
    #[error(transparent)]
    Power(#[from] PowerError),
    /// Malformed request (bad selection target, read-only control, ...).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// Enumeration index past the end.
    #[error("{what} index {index} out of range")]
    OutOfRange {
        /// What was being enumerated.
        what: &'static str,
        /// Requested index.
        index: u32,
    },
    /// The control cannot change while streaming.
    #[error("control {0} is locked while streaming")]
    Locked(ControlId),
    /// The board does not match what the sensor supports.
    #[error("hardware configuration mismatch: {0}")]
    HardwareConfigMismatch(String),
    /// Pushing a control value to the sensor failed.
    #[error("control {id}: {source}")]
    ControlWrite {
        /// Control being applied.
        id: ControlId,
        /// Underlying failure.
        source: Box<SensorError>,
    },
    /// Stream start aborted; power has been released.
    #[error("stream start failed at {stage}: {source}")]
    StreamStart {
        /// Step of the enable sequence that failed.
        stage: StartStage,
        /// Underlying failure.
        source: Box<SensorError>,
    },
    /// Board description could not be parsed.
    #[error("board configuration: {0}")]
    Config(#[from] toml::de::Error),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for sensor operations.
pub type Result<T> = std::result::Result<T, SensorError>;

/// Addressed register channel to the sensor.
pub trait ControlBus {
    /// Read a register using its declared width.
    fn read(&mut self, register: Register) -> std::result::Result<u16, BusError>;

    /// Write a register using its declared width.
    fn write(&mut self, register: Register, value: u16) -> std::result::Result<(), BusError>;
}

/// One named supply regulator.
pub trait SupplyRail {
    /// Supply name as wired on the board.
    fn name(&self) -> &str;

    /// Turn the supply on.
    fn enable(&mut self) -> std::result::Result<(), Fault>;

    /// Turn the supply off.
    fn disable(&mut self) -> std::result::Result<(), Fault>;
}

/// External clock input of the sensor.
pub trait ClockSource {
    /// Start the clock.
    fn enable(&mut self) -> std::result::Result<(), Fault>;

    /// Stop the clock.
    fn disable(&mut self);

    /// Configured rate in Hz.
    fn rate(&self) -> u64;
}

/// Sensor reset (XCLR) line. Best effort; boards may not wire one.
pub trait ResetLine {
    /// Hold the sensor in reset (`true`) or release it (`false`).
    fn set(&mut self, asserted: bool);
}

/// Blocking sleep with a tolerance window.
pub trait Delay {
    /// Sleep for at least `min` and at most about `max`.
    fn sleep_range(&mut self, min: Duration, max: Duration);
}

/// The external collaborators one sensor instance is wired to.
pub struct Hardware {
    /// Register channel.
    pub bus: Box<dyn ControlBus + Send>,
    /// Supplies in enable order.
    pub rails: Vec<Box<dyn SupplyRail + Send>>,
    /// External clock.
    pub clock: Box<dyn ClockSource + Send>,
    /// Optional reset line.
    pub reset: Option<Box<dyn ResetLine + Send>>,
    /// Sleep provider for settle windows.
    pub delay: Box<dyn Delay + Send>,
}
