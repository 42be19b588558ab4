//! GMAX4002: control-plane driver core for the Gpixel GMAX4002 image sensor
//!
//! The sensor is driven through a register bus, three supply rails, an
//! external clock and an optional reset line. Each of these is a trait in
//! [`traits`], so the same driver runs against real hardware or against the
//! simulated board in [`mock`].

pub mod config;
pub mod controls;
pub mod delay;
pub mod device;
pub mod mock;
pub mod modes;
pub mod power;
pub mod ratelimit;
pub mod regs;
pub mod selection;
pub mod session;
pub mod stream;
pub mod tables;
pub mod traits;
pub mod validation;

pub use config::{BoardConfig, BusType, EndpointConfig};
pub use controls::ControlId;
pub use delay::ThreadDelay;
pub use device::{FormatWhich, Gmax4002};
pub use modes::{FormatCode, MbusFormat, PadState};
pub use selection::SelectionTarget;
pub use session::{PowerState, SessionSnapshot, StreamState};
pub use stream::StartStage;
pub use traits::{
    BusError, ClockSource, ControlBus, Delay, Fault, FourCC, Hardware, PowerError, Rect,
    Register, ResetLine, Result, SensorError, SupplyRail,
};
