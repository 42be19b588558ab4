//! Runtime state of one attached sensor.

use crate::controls::{ControlId, ControlSet};
use crate::modes::{init_state, MbusFormat, PadState};
use crate::traits::Rect;

/// Where the stream state machine is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    /// Not streaming.
    Idle,
    /// Stream start in progress.
    Configuring,
    /// Sensor is outputting frames.
    Streaming,
}

/// Power state as seen by the control dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerState {
    /// No power; control changes are only stored.
    Off,
    /// Powered, not streaming; control changes reach the sensor.
    Idle,
    /// Powered and streaming; flips are locked.
    Streaming,
}

/// Mutable state owned by a sensor handle.
#[derive(Debug, Clone)]
pub struct DeviceSession {
    /// Stream state.
    pub stream: StreamState,
    /// ACTIVE format and crop.
    pub active: PadState,
    /// Control values and locks.
    pub controls: ControlSet,
}

impl Default for DeviceSession {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceSession {
    /// Fresh session: idle, default format, default control values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            stream: StreamState::Idle,
            active: init_state(),
            controls: ControlSet::new(),
        }
    }
}

/// Point-in-time copy of the observable session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// Power state.
    pub power: PowerState,
    /// Outstanding power references.
    pub power_refs: u32,
    /// Stream state.
    pub stream: StreamState,
    /// Vertical flip lock.
    pub vflip_locked: bool,
    /// Horizontal flip lock.
    pub hflip_locked: bool,
    /// ACTIVE format.
    pub format: MbusFormat,
    /// ACTIVE crop.
    pub crop: Rect,
}

impl SessionSnapshot {
    pub(crate) fn capture(session: &DeviceSession, powered: bool, power_refs: u32) -> Self {
        let power = match (powered, session.stream) {
            (false, _) => PowerState::Off,
            (true, StreamState::Streaming) => PowerState::Streaming,
            (true, _) => PowerState::Idle,
        };
        Self {
            power,
            power_refs,
            stream: session.stream,
            vflip_locked: session.controls.is_locked(ControlId::Vflip),
            hflip_locked: session.controls.is_locked(ControlId::Hflip),
            format: session.active.format,
            crop: session.active.crop,
        }
    }
}
