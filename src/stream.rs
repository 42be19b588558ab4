//! Stream start and stop.
//!
//! Starting the sensor is a fixed protocol: load the mode table, let the
//! clock settle, power up the analog core, sequence the analog blocks, then
//! enable the output. The delays are minimums from the sensor's power-up
//! timing and dominate the start latency.

use std::fmt;
use std::time::Duration;

use log::{debug, error, info, warn};

use crate::controls::ControlId;
use crate::modes::{modes_for, nearest_mode};
use crate::power::PowerSequencer;
use crate::regs::{
    self, MODE_CTRL_CLK_STABLE, MODE_CTRL_STREAM, REG_MODE_CTRL, REG_PWR_UP,
};
use crate::session::{DeviceSession, StreamState};
use crate::tables::ANALOG_BRINGUP;
use crate::traits::{ControlBus, Delay, Result, SensorError};

/// Settle window after the mode table, before the clock-stable bit.
pub const MODE_SETTLE: (Duration, Duration) =
    (Duration::from_millis(10), Duration::from_millis(12));
/// Analog power-up settle window; the sensor needs more than 80 ms.
pub const POWER_UP_SETTLE: (Duration, Duration) =
    (Duration::from_millis(100), Duration::from_millis(101));
/// Output stabilization window after stream enable.
pub const STREAM_SETTLE: (Duration, Duration) =
    (Duration::from_micros(25_000), Duration::from_micros(26_000));

/// Step of the stream start sequence, reported on failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartStage {
    /// Taking a power reference.
    PowerOn,
    /// Writing the mode register table.
    ModeRegisters,
    /// Setting `CLK_STABLE_EN`.
    ClockStable,
    /// Setting `PWR_UP_EN`.
    PowerUp,
    /// Analog block bring-up sequence.
    AnalogBringup,
    /// Setting `STREAM_EN`.
    StreamOn,
    /// Re-applying stored control values.
    ControlSetup,
}

impl fmt::Display for StartStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::PowerOn => "power on",
            Self::ModeRegisters => "mode registers",
            Self::ClockStable => "clock stable",
            Self::PowerUp => "power up",
            Self::AnalogBringup => "analog bring-up",
            Self::StreamOn => "stream on",
            Self::ControlSetup => "control setup",
        };
        f.write_str(name)
    }
}

fn staged<T>(stage: StartStage, result: Result<T>) -> Result<T> {
    result.map_err(|source| SensorError::StreamStart {
        stage,
        source: Box::new(source),
    })
}

fn settle<D: Delay + ?Sized>(delay: &mut D, window: (Duration, Duration)) {
    delay.sleep_range(window.0, window.1);
}

/// Bring the sensor from idle to streaming.
///
/// On failure the power reference taken here is released and the session
/// is left idle. Calling this while already streaming does nothing.
pub fn enable<B, D>(
    bus: &mut B,
    power: &mut PowerSequencer,
    delay: &mut D,
    session: &mut DeviceSession,
) -> Result<()>
where
    B: ControlBus + ?Sized,
    D: Delay + ?Sized,
{
    if session.stream == StreamState::Streaming {
        debug!("enable: already streaming");
        return Ok(());
    }
    session.stream = StreamState::Configuring;

    if let Err(err) = power.get(delay) {
        session.stream = StreamState::Idle;
        return staged(StartStage::PowerOn, Err(err.into()));
    }

    if let Err(err) = start_sequence(bus, delay, session) {
        error!("{err}");
        power.put();
        session.stream = StreamState::Idle;
        return Err(err);
    }

    // Flip changes mid-stream corrupt the Bayer order of the frame in flight.
    session.controls.grab(ControlId::Vflip, true);
    session.controls.grab(ControlId::Hflip, true);
    session.stream = StreamState::Streaming;
    Ok(())
}

fn start_sequence<B, D>(bus: &mut B, delay: &mut D, session: &mut DeviceSession) -> Result<()>
where
    B: ControlBus + ?Sized,
    D: Delay + ?Sized,
{
    let format = session.active.format;
    let mode = nearest_mode(modes_for(format.code), format.width, format.height).ok_or_else(|| {
        SensorError::InvalidArgument(format!("no mode for bus code 0x{:04x}", format.code.0))
    });
    let mode = staged(StartStage::ModeRegisters, mode)?;

    staged(
        StartStage::ModeRegisters,
        regs::apply_sequence(bus, mode.registers),
    )?;
    settle(delay, MODE_SETTLE);

    staged(
        StartStage::ClockStable,
        regs::update_bits(bus, REG_MODE_CTRL, MODE_CTRL_CLK_STABLE, MODE_CTRL_CLK_STABLE),
    )?;
    staged(StartStage::PowerUp, regs::write(bus, REG_PWR_UP, 0x01))?;
    settle(delay, POWER_UP_SETTLE);

    staged(
        StartStage::AnalogBringup,
        regs::apply_sequence(bus, &ANALOG_BRINGUP),
    )?;
    staged(
        StartStage::StreamOn,
        regs::update_bits(bus, REG_MODE_CTRL, MODE_CTRL_STREAM, MODE_CTRL_STREAM),
    )?;
    staged(StartStage::ControlSetup, session.controls.setup(bus))?;

    info!("streaming started");
    settle(delay, STREAM_SETTLE);
    Ok(())
}

/// Return to idle: unlock the flips, stop the output and drop the power
/// reference taken by [`enable`]. Never fails.
pub fn disable<B: ControlBus + ?Sized>(
    bus: &mut B,
    power: &mut PowerSequencer,
    session: &mut DeviceSession,
) {
    if session.stream != StreamState::Streaming {
        debug!("disable: not streaming");
        return;
    }

    session.controls.grab(ControlId::Vflip, false);
    session.controls.grab(ControlId::Hflip, false);

    if let Err(err) = regs::update_bits(bus, REG_MODE_CTRL, MODE_CTRL_STREAM, 0) {
        warn!("failed to stop output: {err}");
    }

    power.put();
    session.stream = StreamState::Idle;
    info!("streaming stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{Event, MockHardware};
    use crate::power::RailBank;
    use crate::tables::MODE_COMMON_REGS;
    use crate::traits::{BusError, Hardware, Register};

    struct Rig {
        mock: MockHardware,
        bus: Box<dyn ControlBus + Send>,
        delay: Box<dyn Delay + Send>,
        power: PowerSequencer,
        session: DeviceSession,
    }

    impl Rig {
        fn new() -> Self {
            let mock = MockHardware::new();
            mock.require_power(true);
            let Hardware {
                bus,
                rails,
                clock,
                reset,
                delay,
            } = mock.hardware();
            Self {
                mock,
                bus,
                delay,
                power: PowerSequencer::new(RailBank::new(rails), clock, reset),
                session: DeviceSession::new(),
            }
        }

        fn enable(&mut self) -> Result<()> {
            enable(
                self.bus.as_mut(),
                &mut self.power,
                self.delay.as_mut(),
                &mut self.session,
            )
        }

        fn disable(&mut self) {
            disable(self.bus.as_mut(), &mut self.power, &mut self.session);
        }
    }

    #[test]
    fn test_enable_sequence_order() {
        let mut rig = Rig::new();

        rig.enable().expect("enable failed");

        let events = rig.mock.events();
        let position = |wanted: &Event| {
            events
                .iter()
                .position(|event| event == wanted)
                .expect("event missing")
        };
        let table_end = position(&Event::Write(Register::reg8(0x3405), 0x02));
        let mode_settle = position(&Event::Sleep {
            min: MODE_SETTLE.0,
            max: MODE_SETTLE.1,
        });
        let power_up = position(&Event::Write(REG_PWR_UP, 0x01));
        let power_settle = position(&Event::Sleep {
            min: POWER_UP_SETTLE.0,
            max: POWER_UP_SETTLE.1,
        });
        let stream_on = position(&Event::Write(REG_MODE_CTRL, 0x03));
        let stream_settle = position(&Event::Sleep {
            min: STREAM_SETTLE.0,
            max: STREAM_SETTLE.1,
        });

        assert!(table_end < mode_settle);
        assert!(mode_settle < power_up);
        assert!(power_up < power_settle);
        assert!(power_settle < stream_on);
        assert!(stream_on < stream_settle);
        assert_eq!(rig.session.stream, StreamState::Streaming);
        assert!(rig.session.controls.is_locked(ControlId::Vflip));
        assert!(rig.session.controls.is_locked(ControlId::Hflip));
    }

    #[test]
    fn test_analog_bringup_order() {
        let mut rig = Rig::new();

        rig.enable().expect("enable failed");

        let seq: Vec<(u16, u16)> = rig
            .mock
            .writes()
            .iter()
            .map(|(reg, value)| (reg.address, *value))
            .skip_while(|(address, _)| *address != 0x3301)
            .skip(1)
            .take(7)
            .collect();
        // Mode table leaves 0x3023 = 0xF8 and 0x3024 = 0x14.
        assert_eq!(
            seq,
            vec![
                (0x3024, 0x14),
                (0x3023, 0xF8),
                (0x3023, 0xF9),
                (0x3023, 0xFF),
                (0x3024, 0x34),
                (0x3023, 0xFB),
                (0x2E00, 0x03),
            ]
        );
    }

    #[test]
    fn test_mode_table_failure_at_index_k() {
        for k in [0usize, 1, 57, MODE_COMMON_REGS.len() - 1] {
            let mut rig = Rig::new();
            rig.mock.fail_nth_write(k);

            let err = rig.enable().expect_err("enable should fail");

            assert!(matches!(
                err,
                SensorError::StreamStart {
                    stage: StartStage::ModeRegisters,
                    ..
                }
            ));
            assert_eq!(rig.mock.writes().len(), k);
            assert_eq!(rig.session.stream, StreamState::Idle);
            assert!(!rig.power.is_powered());
            assert!(!rig.mock.is_powered());
            assert!(!rig.session.controls.is_locked(ControlId::Vflip));
        }
    }

    #[test]
    fn test_control_setup_failure_releases_power() {
        let mut rig = Rig::new();
        // Mode table, CLK_STABLE, PWR_UP, bring-up, STREAM_EN, gain, vflip.
        rig.mock
            .fail_nth_write(MODE_COMMON_REGS.len() + 2 + ANALOG_BRINGUP.len() + 1 + 2);

        let err = rig.enable().expect_err("enable should fail");

        assert!(matches!(
            err,
            SensorError::StreamStart {
                stage: StartStage::ControlSetup,
                ref source,
            } if matches!(**source, SensorError::ControlWrite { id: ControlId::Hflip, .. })
        ));
        assert!(!rig.mock.is_powered());
        assert_eq!(rig.session.stream, StreamState::Idle);
    }

    #[test]
    fn test_power_failure_stays_idle() {
        let mut rig = Rig::new();
        rig.mock.fail_clock();

        let err = rig.enable().expect_err("enable should fail");

        assert!(matches!(
            err,
            SensorError::StreamStart {
                stage: StartStage::PowerOn,
                ..
            }
        ));
        assert_eq!(rig.session.stream, StreamState::Idle);
        assert!(rig.mock.writes().is_empty());
    }

    #[test]
    fn test_disable_returns_to_idle() {
        let mut rig = Rig::new();
        rig.enable().expect("enable failed");

        rig.disable();

        assert_eq!(rig.session.stream, StreamState::Idle);
        assert!(!rig.session.controls.is_locked(ControlId::Vflip));
        assert!(!rig.session.controls.is_locked(ControlId::Hflip));
        assert!(!rig.power.is_powered());
        assert_eq!(rig.power.usage(), 0);
    }

    #[test]
    fn test_disable_ignores_bus_errors() {
        let mut rig = Rig::new();
        rig.enable().expect("enable failed");
        rig.mock.fail_reads();

        rig.disable();

        assert_eq!(rig.session.stream, StreamState::Idle);
        assert!(!rig.power.is_powered());
    }

    #[test]
    fn test_enable_twice_is_noop() {
        let mut rig = Rig::new();
        rig.enable().expect("enable failed");
        let writes = rig.mock.writes().len();

        rig.enable().expect("second enable failed");

        assert_eq!(rig.mock.writes().len(), writes);
        assert_eq!(rig.power.usage(), 1);
    }

    #[test]
    fn test_stage_error_names_stage() {
        let err = staged::<()>(
            StartStage::PowerUp,
            Err(SensorError::Transport {
                address: 0x3301,
                source: BusError::Timeout,
            }),
        )
        .expect_err("error expected");
        assert_eq!(
            err.to_string(),
            "stream start failed at power up: register 0x3301: bus transfer timed out"
        );
    }
}
