//! In-memory hardware for tests and dry runs.
//!
//! Every collaborator handed out by [`MockHardware::hardware`] shares one
//! state, so the event trace records the exact interleaving of bus
//! transfers, rail and clock switching, reset toggles and sleeps. Faults
//! can be armed on any of them.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::power::SUPPLY_NAMES;
use crate::traits::{
    BusError, ClockSource, ControlBus, Delay, Fault, Hardware, Register, ResetLine, SupplyRail,
};

/// Default external clock rate of the mock clock.
pub const MOCK_CLOCK_RATE: u64 = 24_000_000;

/// One observable hardware interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Rail switched on.
    RailOn(&'static str),
    /// Rail switched off.
    RailOff(&'static str),
    /// Clock started.
    ClockOn,
    /// Clock stopped.
    ClockOff,
    /// Reset line driven; `true` holds the sensor in reset.
    Reset(bool),
    /// Successful register read.
    Read(Register),
    /// Successful register write.
    Write(Register, u16),
    /// Register write that failed.
    WriteFailed(Register),
    /// Requested sleep window.
    Sleep {
        /// Lower bound.
        min: Duration,
        /// Upper bound.
        max: Duration,
    },
}

#[derive(Debug, Default)]
struct Faults {
    nth_write: Option<usize>,
    write_addresses: HashSet<u16>,
    reads: bool,
    rails: HashSet<&'static str>,
    clock: bool,
}

#[derive(Debug)]
struct State {
    events: Vec<Event>,
    registers: HashMap<u16, u16>,
    faults: Faults,
    rails: Vec<(&'static str, bool)>,
    clock_on: bool,
    clock_rate: u64,
    reset_asserted: bool,
    require_power: bool,
}

impl State {
    fn powered(&self) -> bool {
        self.clock_on && self.rails.iter().all(|(_, on)| *on)
    }

    fn bus_ready(&self) -> bool {
        !self.require_power || (self.powered() && !self.reset_asserted)
    }
}

/// Handle to a simulated sensor board.
#[derive(Debug, Clone)]
pub struct MockHardware {
    state: Arc<Mutex<State>>,
}

impl Default for MockHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl MockHardware {
    /// Board with the standard supplies, a 24 MHz clock and a reset line.
    #[must_use]
    pub fn new() -> Self {
        Self::with_rails(&SUPPLY_NAMES)
    }

    /// Board with custom supply names.
    #[must_use]
    pub fn with_rails(names: &[&'static str]) -> Self {
        let state = State {
            events: Vec::new(),
            registers: HashMap::new(),
            faults: Faults::default(),
            rails: names.iter().map(|name| (*name, false)).collect(),
            clock_on: false,
            clock_rate: MOCK_CLOCK_RATE,
            reset_asserted: false,
            require_power: false,
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Collaborators wired to this board.
    #[must_use]
    pub fn hardware(&self) -> Hardware {
        let rails = self
            .state
            .lock()
            .rails
            .iter()
            .map(|(name, _)| {
                Box::new(MockRail {
                    name: *name,
                    state: Arc::clone(&self.state),
                }) as Box<dyn SupplyRail + Send>
            })
            .collect();
        Hardware {
            bus: Box::new(MockBus {
                state: Arc::clone(&self.state),
            }),
            rails,
            clock: Box::new(MockClock {
                state: Arc::clone(&self.state),
            }),
            reset: Some(Box::new(MockReset {
                state: Arc::clone(&self.state),
            })),
            delay: Box::new(MockDelay {
                state: Arc::clone(&self.state),
            }),
        }
    }

    /// Make the bus NAK while the sensor lacks power or is held in reset.
    pub fn require_power(&self, required: bool) {
        self.state.lock().require_power = required;
    }

    /// Change the rate reported by the clock.
    pub fn set_clock_rate(&self, rate: u64) {
        self.state.lock().clock_rate = rate;
    }

    /// Preload a register.
    pub fn set_register(&self, address: u16, value: u16) {
        self.state.lock().registers.insert(address, value);
    }

    /// Last value written to or preloaded into a register.
    #[must_use]
    pub fn register(&self, address: u16) -> Option<u16> {
        self.state.lock().registers.get(&address).copied()
    }

    /// Fail the `n`th write attempt from now, counting from zero.
    pub fn fail_nth_write(&self, n: usize) {
        self.state.lock().faults.nth_write = Some(n);
    }

    /// Fail every write to `address`.
    pub fn fail_writes_to(&self, address: u16) {
        self.state.lock().faults.write_addresses.insert(address);
    }

    /// Fail every read.
    pub fn fail_reads(&self) {
        self.state.lock().faults.reads = true;
    }

    /// Fail enabling the named rail.
    pub fn fail_rail(&self, name: &'static str) {
        self.state.lock().faults.rails.insert(name);
    }

    /// Fail enabling the clock.
    pub fn fail_clock(&self) {
        self.state.lock().faults.clock = true;
    }

    /// Disarm every fault.
    pub fn clear_faults(&self) {
        self.state.lock().faults = Faults::default();
    }

    /// Recorded events, oldest first.
    #[must_use]
    pub fn events(&self) -> Vec<Event> {
        self.state.lock().events.clone()
    }

    /// Forget recorded events.
    pub fn clear_events(&self) {
        self.state.lock().events.clear();
    }

    /// Number of recorded events matching `predicate`.
    pub fn count<F: Fn(&Event) -> bool>(&self, predicate: F) -> usize {
        self.state
            .lock()
            .events
            .iter()
            .filter(|event| predicate(event))
            .count()
    }

    /// Successful writes, oldest first.
    #[must_use]
    pub fn writes(&self) -> Vec<(Register, u16)> {
        self.state
            .lock()
            .events
            .iter()
            .filter_map(|event| match event {
                Event::Write(register, value) => Some((*register, *value)),
                _ => None,
            })
            .collect()
    }

    /// Rail names with their current state.
    #[must_use]
    pub fn rails_enabled(&self) -> Vec<(&'static str, bool)> {
        self.state.lock().rails.clone()
    }

    /// Whether the clock is running.
    #[must_use]
    pub fn clock_enabled(&self) -> bool {
        self.state.lock().clock_on
    }

    /// Whether the reset line is asserted.
    #[must_use]
    pub fn reset_asserted(&self) -> bool {
        self.state.lock().reset_asserted
    }

    /// All rails on and the clock running.
    #[must_use]
    pub fn is_powered(&self) -> bool {
        self.state.lock().powered()
    }
}

struct MockBus {
    state: Arc<Mutex<State>>,
}

impl ControlBus for MockBus {
    fn read(&mut self, register: Register) -> Result<u16, BusError> {
        let mut state = self.state.lock();
        if state.faults.reads || !state.bus_ready() {
            return Err(BusError::NoAck);
        }
        state.events.push(Event::Read(register));
        Ok(state.registers.get(&register.address).copied().unwrap_or(0))
    }

    fn write(&mut self, register: Register, value: u16) -> Result<(), BusError> {
        let mut state = self.state.lock();
        let armed = match state.faults.nth_write {
            Some(0) => {
                state.faults.nth_write = None;
                true
            }
            Some(n) => {
                state.faults.nth_write = Some(n - 1);
                false
            }
            None => false,
        };
        if armed || state.faults.write_addresses.contains(&register.address) || !state.bus_ready() {
            state.events.push(Event::WriteFailed(register));
            return Err(BusError::NoAck);
        }
        state.registers.insert(register.address, value);
        state.events.push(Event::Write(register, value));
        Ok(())
    }
}

struct MockRail {
    name: &'static str,
    state: Arc<Mutex<State>>,
}

impl MockRail {
    fn switch(&self, on: bool) {
        let mut state = self.state.lock();
        if let Some(rail) = state.rails.iter_mut().find(|(name, _)| *name == self.name) {
            rail.1 = on;
        }
        state.events.push(if on {
            Event::RailOn(self.name)
        } else {
            Event::RailOff(self.name)
        });
    }
}

impl SupplyRail for MockRail {
    fn name(&self) -> &str {
        self.name
    }

    fn enable(&mut self) -> Result<(), Fault> {
        if self.state.lock().faults.rails.contains(self.name) {
            return Err(Fault(format!("{} regulator fault", self.name)));
        }
        self.switch(true);
        Ok(())
    }

    fn disable(&mut self) -> Result<(), Fault> {
        self.switch(false);
        Ok(())
    }
}

struct MockClock {
    state: Arc<Mutex<State>>,
}

impl ClockSource for MockClock {
    fn enable(&mut self) -> Result<(), Fault> {
        let mut state = self.state.lock();
        if state.faults.clock {
            return Err(Fault("clock failed to lock".to_owned()));
        }
        state.clock_on = true;
        state.events.push(Event::ClockOn);
        Ok(())
    }

    fn disable(&mut self) {
        let mut state = self.state.lock();
        state.clock_on = false;
        state.events.push(Event::ClockOff);
    }

    fn rate(&self) -> u64 {
        self.state.lock().clock_rate
    }
}

struct MockReset {
    state: Arc<Mutex<State>>,
}

impl ResetLine for MockReset {
    fn set(&mut self, asserted: bool) {
        let mut state = self.state.lock();
        state.reset_asserted = asserted;
        state.events.push(Event::Reset(asserted));
    }
}

/// Records sleep requests without sleeping.
struct MockDelay {
    state: Arc<Mutex<State>>,
}

impl Delay for MockDelay {
    fn sleep_range(&mut self, min: Duration, max: Duration) {
        self.state.lock().events.push(Event::Sleep { min, max });
    }
}
