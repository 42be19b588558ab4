//! Power sequencing: supply rails, external clock and reset line.

use std::time::Duration;

use log::{debug, error, info, warn};

use crate::traits::{ClockSource, Delay, PowerError, ResetLine, SupplyRail};

/// Supplies in enable order.
pub const SUPPLY_NAMES: [&str; 3] = [
    "vana", // 3.3V analog
    "vdig", // 1.1V core
    "vddl", // 1.8V I/O
];

/// Minimum wait between reset release and the first register access.
pub const XCLR_MIN_DELAY: Duration = Duration::from_micros(10_000);
/// Tolerance on top of [`XCLR_MIN_DELAY`].
pub const XCLR_DELAY_RANGE: Duration = Duration::from_micros(1_000);

/// The sensor supplies, switched as one unit.
pub struct RailBank {
    rails: Vec<Box<dyn SupplyRail + Send>>,
}

impl RailBank {
    /// Wrap `rails`, given in enable order.
    #[must_use]
    pub fn new(rails: Vec<Box<dyn SupplyRail + Send>>) -> Self {
        Self { rails }
    }

    /// Rail names in enable order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.rails.iter().map(|rail| rail.name()).collect()
    }

    /// Enable every rail in order. If one fails, the rails already enabled
    /// are disabled again in reverse order.
    pub fn enable_all(&mut self) -> Result<(), PowerError> {
        for index in 0..self.rails.len() {
            let Some(rail) = self.rails.get_mut(index) else {
                break;
            };
            if let Err(source) = rail.enable() {
                let rail = rail.name().to_owned();
                error!("failed to enable supply {rail}: {source}");
                self.disable_first(index);
                return Err(PowerError::Rail { rail, source });
            }
        }
        Ok(())
    }

    /// Disable every rail, last enabled first.
    pub fn disable_all(&mut self) {
        self.disable_first(self.rails.len());
    }

    fn disable_first(&mut self, count: usize) {
        for rail in self.rails.iter_mut().take(count).rev() {
            if let Err(err) = rail.disable() {
                warn!("failed to disable supply {}: {err}", rail.name());
            }
        }
    }
}

/// Orders rails, clock and reset, and counts outstanding power references.
pub struct PowerSequencer {
    rails: RailBank,
    clock: Box<dyn ClockSource + Send>,
    reset: Option<Box<dyn ResetLine + Send>>,
    powered: bool,
    usage: u32,
}

impl PowerSequencer {
    /// Build a sequencer; the sensor starts unpowered.
    #[must_use]
    pub fn new(
        rails: RailBank,
        clock: Box<dyn ClockSource + Send>,
        reset: Option<Box<dyn ResetLine + Send>>,
    ) -> Self {
        Self {
            rails,
            clock,
            reset,
            powered: false,
            usage: 0,
        }
    }

    /// Whether the sensor currently has power and clock.
    #[must_use]
    pub const fn is_powered(&self) -> bool {
        self.powered
    }

    /// Outstanding power references.
    #[must_use]
    pub const fn usage(&self) -> u32 {
        self.usage
    }

    /// Configured external clock rate in Hz.
    #[must_use]
    pub fn clock_rate(&self) -> u64 {
        self.clock.rate()
    }

    /// Rails on, clock on, reset released, then wait for the sensor to
    /// come out of reset.
    pub fn power_on<D: Delay + ?Sized>(&mut self, delay: &mut D) -> Result<(), PowerError> {
        info!("power on");

        self.rails.enable_all()?;

        if let Err(source) = self.clock.enable() {
            error!("failed to enable clock: {source}");
            self.rails.disable_all();
            return Err(PowerError::Clock(source));
        }

        if let Some(reset) = self.reset.as_mut() {
            reset.set(false);
        }
        delay.sleep_range(XCLR_MIN_DELAY, XCLR_MIN_DELAY + XCLR_DELAY_RANGE);

        self.powered = true;
        Ok(())
    }

    /// Reset asserted, rails off, clock off. Does nothing when already off.
    pub fn power_off(&mut self) {
        if !self.powered {
            debug!("power off: already off");
            return;
        }
        info!("power off");

        if let Some(reset) = self.reset.as_mut() {
            reset.set(true);
        }
        self.rails.disable_all();
        self.clock.disable();

        self.powered = false;
    }

    /// Take a power reference, powering on if this is the first one.
    pub fn get<D: Delay + ?Sized>(&mut self, delay: &mut D) -> Result<(), PowerError> {
        if !self.powered {
            self.power_on(delay)?;
        }
        self.usage = self.usage.saturating_add(1);
        Ok(())
    }

    /// Drop a power reference, powering off when none remain.
    pub fn put(&mut self) {
        self.usage = self.usage.saturating_sub(1);
        if self.usage == 0 {
            self.power_off();
        }
    }
}
