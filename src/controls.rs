//! Control surface and dispatch.
//!
//! The sensor exposes the usual camera controls, but only analogue gain and
//! the two flips reach the hardware. Exposure, blanking and brightness are
//! accepted and stored so generic camera stacks can drive them; exposure
//! timing itself is owned by an external controller.

use std::fmt;

use log::{debug, error, info, warn};

use crate::ratelimit::RateLimit;
use crate::regs::{self, REG_ANALOG_GAIN, REG_FLIP_H, REG_FLIP_V};
use crate::traits::{ControlBus, Result, SensorError};

/// Pixel rate reported to the pipeline, in pixels per second.
pub const PIXEL_RATE: i64 = 60_000_000;
/// CSI-2 link frequency in Hz.
pub const LINK_FREQ: i64 = 600_000_000;
/// Link frequencies offered through the link-frequency menu control.
pub const LINK_FREQ_MENU: [i64; 1] = [LINK_FREQ];

/// Identifier of a camera control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlId {
    /// Pixel rate (read-only).
    PixelRate,
    /// Link frequency menu (read-only).
    LinkFreq,
    /// Vertical blanking.
    Vblank,
    /// Horizontal blanking.
    Hblank,
    /// Exposure in lines.
    Exposure,
    /// Analogue gain step.
    AnalogueGain,
    /// Vertical flip.
    Vflip,
    /// Horizontal flip.
    Hflip,
    /// Brightness (black level).
    Brightness,
    /// Any control this sensor does not implement, by V4L2 id.
    Other(u32),
}

impl ControlId {
    /// V4L2 control id.
    #[must_use]
    pub const fn cid(self) -> u32 {
        match self {
            Self::Brightness => 0x0098_0900,
            Self::Exposure => 0x0098_0911,
            Self::Hflip => 0x0098_0914,
            Self::Vflip => 0x0098_0915,
            Self::Vblank => 0x009e_0901,
            Self::Hblank => 0x009e_0902,
            Self::AnalogueGain => 0x009e_0903,
            Self::LinkFreq => 0x009f_0901,
            Self::PixelRate => 0x009f_0902,
            Self::Other(cid) => cid,
        }
    }

    /// Map a V4L2 control id back to a [`ControlId`].
    #[must_use]
    pub const fn from_cid(cid: u32) -> Self {
        match cid {
            0x0098_0900 => Self::Brightness,
            0x0098_0911 => Self::Exposure,
            0x0098_0914 => Self::Hflip,
            0x0098_0915 => Self::Vflip,
            0x009e_0901 => Self::Vblank,
            0x009e_0902 => Self::Hblank,
            0x009e_0903 => Self::AnalogueGain,
            0x009f_0901 => Self::LinkFreq,
            0x009f_0902 => Self::PixelRate,
            other => Self::Other(other),
        }
    }

    /// Fold an `Other` carrying a known id onto its named variant.
    #[must_use]
    pub const fn canonical(self) -> Self {
        Self::from_cid(self.cid())
    }
}

impl fmt::Display for ControlId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PixelRate => f.write_str("Pixel Rate"),
            Self::LinkFreq => f.write_str("Link Frequency"),
            Self::Vblank => f.write_str("Vertical Blanking"),
            Self::Hblank => f.write_str("Horizontal Blanking"),
            Self::Exposure => f.write_str("Exposure"),
            Self::AnalogueGain => f.write_str("Analogue Gain"),
            Self::Vflip => f.write_str("Vertical Flip"),
            Self::Hflip => f.write_str("Horizontal Flip"),
            Self::Brightness => f.write_str("Brightness"),
            Self::Other(cid) => write!(f, "0x{cid:08x}"),
        }
    }
}

/// Static description of a control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlDescriptor {
    /// Control id.
    pub id: ControlId,
    /// Minimum value.
    pub min: i64,
    /// Maximum value.
    pub max: i64,
    /// Step between valid values.
    pub step: i64,
    /// Value at attach time.
    pub default: i64,
    /// Whether setting the control writes a register.
    pub live: bool,
    /// Whether user space may set the control at all.
    pub read_only: bool,
}

impl ControlDescriptor {
    const fn new(id: ControlId, min: i64, max: i64, step: i64, default: i64) -> Self {
        Self {
            id,
            min,
            max,
            step,
            default,
            live: false,
            read_only: false,
        }
    }

    const fn live(mut self) -> Self {
        self.live = true;
        self
    }

    const fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// Round `value` to the nearest step and clamp it into range.
    #[must_use]
    pub fn clamp(&self, value: i64) -> i64 {
        let value = value.clamp(self.min, self.max);
        if self.step <= 1 {
            return value;
        }
        let offset = value - self.min;
        let rounded = self.min + (offset + self.step / 2) / self.step * self.step;
        rounded.min(self.max)
    }
}

/// Controls registered at attach time, in registration order.
pub static DESCRIPTORS: [ControlDescriptor; 9] = [
    ControlDescriptor::new(ControlId::PixelRate, 1, PIXEL_RATE, 1, PIXEL_RATE).read_only(),
    ControlDescriptor::new(ControlId::LinkFreq, 0, 0, 1, 0).read_only(),
    ControlDescriptor::new(ControlId::Vblank, 0, 0xF_FFFF, 1, 0),
    ControlDescriptor::new(ControlId::Hblank, 0, 0xFFFF, 1, 0),
    ControlDescriptor::new(ControlId::Exposure, 1000, 1000, 1000, 1000),
    ControlDescriptor::new(ControlId::AnalogueGain, 0, 15, 1, 0).live(),
    ControlDescriptor::new(ControlId::Vflip, 0, 1, 1, 0).live(),
    ControlDescriptor::new(ControlId::Hflip, 0, 1, 1, 0).live(),
    ControlDescriptor::new(ControlId::Brightness, 0, 1023, 1, 50),
];

/// Descriptor for `id`, if the sensor registers it.
#[must_use]
pub fn descriptor(id: ControlId) -> Option<&'static ControlDescriptor> {
    DESCRIPTORS.iter().find(|desc| desc.id == id)
}

/// Push one control value to the sensor.
///
/// Controls without a hardware effect return `Ok` without touching the bus.
pub fn apply_control<B: ControlBus + ?Sized>(
    bus: &mut B,
    id: ControlId,
    value: i64,
    gain_errors: &mut RateLimit,
) -> Result<()> {
    match id {
        ControlId::AnalogueGain => {
            info!("analogue gain = {value}");
            write_control(bus, id, value).map_err(|err| {
                if let Some(suppressed) = gain_errors.allow() {
                    if suppressed > 0 {
                        warn!("{suppressed} gain write failures suppressed");
                    }
                    error!("gain write failed: {err}");
                }
                err
            })
        }
        ControlId::Vflip | ControlId::Hflip => write_control(bus, id, value),
        ControlId::Exposure | ControlId::Vblank | ControlId::Hblank | ControlId::Brightness => {
            debug!("{id} = {value} (no hardware effect)");
            Ok(())
        }
        ControlId::PixelRate | ControlId::LinkFreq | ControlId::Other(_) => {
            info!("unhandled control {id}: value={value}");
            Ok(())
        }
    }
}

fn write_control<B: ControlBus + ?Sized>(bus: &mut B, id: ControlId, value: i64) -> Result<()> {
    let register = match id {
        ControlId::AnalogueGain => REG_ANALOG_GAIN,
        ControlId::Vflip => REG_FLIP_V,
        ControlId::Hflip => REG_FLIP_H,
        _ => return Ok(()),
    };
    let raw = u16::try_from(value).map_err(|_| {
        SensorError::InvalidArgument(format!("{id} value {value} does not fit the register"))
    })?;
    regs::write(bus, register, raw).map_err(|err| SensorError::ControlWrite {
        id,
        source: Box::new(err),
    })
}

#[derive(Debug, Clone)]
struct Entry {
    desc: &'static ControlDescriptor,
    value: i64,
    locked: bool,
}

/// Current control values and per-control lock flags.
#[derive(Debug, Clone)]
pub struct ControlSet {
    entries: Vec<Entry>,
    gain_errors: RateLimit,
}

impl Default for ControlSet {
    fn default() -> Self {
        Self::new()
    }
}

impl ControlSet {
    /// All registered controls at their default values, unlocked.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: DESCRIPTORS
                .iter()
                .map(|desc| Entry {
                    desc,
                    value: desc.default,
                    locked: false,
                })
                .collect(),
            gain_errors: RateLimit::default(),
        }
    }

    fn position(&self, id: ControlId) -> Option<usize> {
        let id = id.canonical();
        self.entries.iter().position(|entry| entry.desc.id == id)
    }

    fn entry(&self, id: ControlId) -> Option<&Entry> {
        self.position(id).and_then(|index| self.entries.get(index))
    }

    /// Stored value of `id`.
    #[must_use]
    pub fn value(&self, id: ControlId) -> Option<i64> {
        self.entry(id).map(|entry| entry.value)
    }

    /// Whether `id` is currently locked.
    #[must_use]
    pub fn is_locked(&self, id: ControlId) -> bool {
        self.entry(id).is_some_and(|entry| entry.locked)
    }

    /// Lock or unlock `id`.
    pub fn grab(&mut self, id: ControlId, locked: bool) {
        if let Some(entry) = self
            .position(id)
            .and_then(|index| self.entries.get_mut(index))
        {
            entry.locked = locked;
        }
    }

    /// Validate, dispatch and store a new value.
    ///
    /// `bus` is `None` while the sensor is unpowered: the value is stored
    /// and reaches the hardware on the next [`ControlSet::setup`]. The value
    /// is only stored once dispatch succeeded. Returns the value actually
    /// applied after clamping.
    ///
    /// Ids this sensor does not register are accepted and logged. The
    /// read-only pixel rate and link frequency are the exception: writing
    /// them is rejected with `InvalidArgument` whatever the power state,
    /// as a V4L2 control framework would before the driver sees the call.
    pub fn set<B: ControlBus + ?Sized>(
        &mut self,
        bus: Option<&mut B>,
        id: ControlId,
        value: i64,
    ) -> Result<i64> {
        let id = id.canonical();
        let Some(position) = self.position(id) else {
            info!("unhandled control {id}: value={value}");
            return Ok(value);
        };
        let Some(entry) = self.entries.get_mut(position) else {
            return Ok(value);
        };
        if entry.desc.read_only {
            return Err(SensorError::InvalidArgument(format!(
                "control {id} is read-only"
            )));
        }
        if entry.locked {
            return Err(SensorError::Locked(id));
        }

        let value = entry.desc.clamp(value);
        if let Some(bus) = bus {
            apply_control(bus, id, value, &mut self.gain_errors)?;
        }
        entry.value = value;
        Ok(value)
    }

    /// Push every stored, writable value to the sensor.
    pub fn setup<B: ControlBus + ?Sized>(&mut self, bus: &mut B) -> Result<()> {
        for entry in self.entries.iter().filter(|entry| !entry.desc.read_only) {
            apply_control(bus, entry.desc.id, entry.value, &mut self.gain_errors)?;
        }
        Ok(())
    }
}
