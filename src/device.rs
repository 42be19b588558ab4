//! Host-facing sensor handle.

use log::{error, info, warn};
use parking_lot::Mutex;

use crate::config::BoardConfig;
use crate::controls::{ControlId, LINK_FREQ, PIXEL_RATE};
use crate::modes::{
    apply_format, enumerate_codes, enumerate_sizes, init_state, FormatCode, FrameSizeRange,
    MbusFormat, PadState,
};
use crate::power::{PowerSequencer, RailBank};
use crate::regs::{self, REG_BLKLEVEL};
use crate::selection::{self, SelectionTarget};
use crate::session::{DeviceSession, SessionSnapshot, StreamState};
use crate::stream;
use crate::traits::{ControlBus, Delay, Hardware, Rect, Result};
use crate::validation::{validate_endpoint, validate_supplies};

/// Which pad state a format call operates on.
#[derive(Debug)]
pub enum FormatWhich<'a> {
    /// A caller-owned scratch state; the session is not touched.
    Try(&'a mut PadState),
    /// The session's active state.
    Active,
}

struct Inner {
    bus: Box<dyn ControlBus + Send>,
    delay: Box<dyn Delay + Send>,
    power: PowerSequencer,
    /// References taken through `acquire_power`; the stream's own
    /// reference is not counted here.
    host_refs: u32,
    session: DeviceSession,
}

/// One attached GMAX4002 sensor.
///
/// All state changes go through a single lock, so the handle can be shared
/// between threads. Dropping it powers the sensor off.
pub struct Gmax4002 {
    inner: Mutex<Inner>,
}

impl Gmax4002 {
    /// Validate the board, probe the sensor and leave it powered off with
    /// default controls and format.
    ///
    /// # Errors
    ///
    /// - `HardwareConfigMismatch` if the endpoint or the supplies do not
    ///   match the sensor; nothing is powered in that case
    /// - `Power` if power-on fails
    /// - `Transport` if the sensor does not answer the presence probe
    pub fn attach(hardware: Hardware, board: &BoardConfig) -> Result<Self> {
        validate_endpoint(&board.endpoint)?;

        let Hardware {
            mut bus,
            rails,
            clock,
            reset,
            mut delay,
        } = hardware;
        let rails = RailBank::new(rails);
        validate_supplies(&rails.names())?;
        let reset = reset.filter(|_| board.reset_line);

        let mut power = PowerSequencer::new(rails, clock, reset);
        info!("external clock {} Hz", power.clock_rate());

        power.power_on(delay.as_mut())?;
        if let Err(err) = probe(bus.as_mut()) {
            power.power_off();
            return Err(err);
        }

        let session = DeviceSession::new();
        power.power_off();

        Ok(Self {
            inner: Mutex::new(Inner {
                bus,
                delay,
                power,
                host_refs: 0,
                session,
            }),
        })
    }

    /// Power off and release the hardware.
    pub fn detach(self) {
        info!("detaching");
        drop(self);
    }

    /// Start streaming.
    ///
    /// # Errors
    ///
    /// Returns `StreamStart` naming the failed stage; the sensor is left
    /// idle and the power reference taken for the stream is released.
    pub fn enable_streams(&self) -> Result<()> {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        stream::enable(
            inner.bus.as_mut(),
            &mut inner.power,
            inner.delay.as_mut(),
            &mut inner.session,
        )
    }

    /// Stop streaming. Never fails.
    pub fn disable_streams(&self) {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        stream::disable(inner.bus.as_mut(), &mut inner.power, &mut inner.session);
    }

    /// Whether the sensor is streaming.
    #[must_use]
    pub fn is_streaming(&self) -> bool {
        self.inner.lock().session.stream == StreamState::Streaming
    }

    /// Take a power reference on behalf of the host, e.g. while a pipeline
    /// is being configured.
    ///
    /// # Errors
    ///
    /// Returns `Power` if the sensor could not be powered.
    pub fn acquire_power(&self) -> Result<()> {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        inner.power.get(inner.delay.as_mut())?;
        inner.host_refs = inner.host_refs.saturating_add(1);
        Ok(())
    }

    /// Drop a power reference taken with [`Gmax4002::acquire_power`].
    ///
    /// Unbalanced calls are ignored; they never release the reference held
    /// by a running stream.
    pub fn release_power(&self) {
        let mut inner = self.inner.lock();
        if inner.host_refs == 0 {
            warn!("release_power without a matching acquire_power");
            return;
        }
        inner.host_refs -= 1;
        inner.power.put();
    }

    /// Set a control and return the value actually applied.
    ///
    /// While the sensor is unpowered the value is only stored and takes
    /// effect at the next stream start.
    ///
    /// # Errors
    ///
    /// - `Locked` for vflip/hflip while streaming
    /// - `InvalidArgument` for read-only controls
    /// - `ControlWrite` if the register write failed; the previous value
    ///   is kept
    pub fn set_control(&self, id: ControlId, value: i64) -> Result<i64> {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        let bus = inner.power.is_powered().then_some(inner.bus.as_mut());
        inner.session.controls.set(bus, id, value)
    }

    /// Stored value of a control.
    #[must_use]
    pub fn control(&self, id: ControlId) -> Option<i64> {
        self.inner.lock().session.controls.value(id)
    }

    /// Whether a control is currently locked.
    #[must_use]
    pub fn is_control_locked(&self, id: ControlId) -> bool {
        self.inner.lock().session.controls.is_locked(id)
    }

    /// Resolve and store a format. Never fails: unsupported requests are
    /// steered onto the nearest supported format.
    pub fn set_format(&self, which: FormatWhich<'_>, requested: &MbusFormat) -> MbusFormat {
        match which {
            FormatWhich::Try(state) => apply_format(state, requested),
            FormatWhich::Active => apply_format(&mut self.inner.lock().session.active, requested),
        }
    }

    /// Active format.
    #[must_use]
    pub fn format(&self) -> MbusFormat {
        self.inner.lock().session.active.format
    }

    /// Resolve a selection target against the active state.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for compose and unknown targets.
    pub fn get_selection(&self, target: SelectionTarget) -> Result<Rect> {
        selection::get_selection(&self.inner.lock().session.active, target)
    }

    /// Default pad state for a fresh TRY context.
    #[must_use]
    pub fn init_state() -> PadState {
        init_state()
    }

    /// Bus code at `index`.
    ///
    /// # Errors
    ///
    /// Returns `OutOfRange` past the end of the list.
    pub fn enum_mbus_code(index: u32) -> Result<FormatCode> {
        enumerate_codes(index)
    }

    /// Frame size at `index` for `code`.
    ///
    /// # Errors
    ///
    /// Returns `OutOfRange` past the end of the list or for an unknown code.
    pub fn enum_frame_size(code: FormatCode, index: u32) -> Result<FrameSizeRange> {
        enumerate_sizes(code, index)
    }

    /// Pixel rate in pixels per second.
    #[must_use]
    pub const fn pixel_rate() -> i64 {
        PIXEL_RATE
    }

    /// CSI-2 link frequency in Hz.
    #[must_use]
    pub const fn link_frequency() -> i64 {
        LINK_FREQ
    }

    /// External clock rate in Hz.
    #[must_use]
    pub fn clock_rate(&self) -> u64 {
        self.inner.lock().power.clock_rate()
    }

    /// Copy of the observable state.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        let inner = self.inner.lock();
        SessionSnapshot::capture(&inner.session, inner.power.is_powered(), inner.power.usage())
    }
}

impl Drop for Gmax4002 {
    fn drop(&mut self) {
        self.inner.get_mut().power.power_off();
    }
}

fn probe<B: ControlBus + ?Sized>(bus: &mut B) -> Result<()> {
    match regs::read(bus, REG_BLKLEVEL) {
        Ok(level) => {
            info!("sensor detected, black level {level}");
            Ok(())
        }
        Err(err) => {
            error!("presence probe failed: {err}");
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{Event, MockHardware};
    use crate::session::PowerState;
    use crate::traits::SensorError;

    fn attached() -> (MockHardware, Gmax4002) {
        let mock = MockHardware::new();
        mock.require_power(true);
        let sensor = Gmax4002::attach(mock.hardware(), &BoardConfig::default()).expect("attach");
        mock.clear_events();
        (mock, sensor)
    }

    #[test]
    fn test_attach_probes_then_powers_off() {
        let mock = MockHardware::new();
        mock.require_power(true);

        let sensor = Gmax4002::attach(mock.hardware(), &BoardConfig::default()).expect("attach");

        assert_eq!(mock.count(|event| *event == Event::Read(REG_BLKLEVEL)), 1);
        assert!(!mock.is_powered());
        let snapshot = sensor.snapshot();
        assert_eq!(snapshot.power, PowerState::Off);
        assert_eq!(snapshot.stream, StreamState::Idle);
        assert_eq!(snapshot.format, init_state().format);
    }

    #[test]
    fn test_attach_rejects_board_before_power() {
        let mock = MockHardware::new();
        let mut board = BoardConfig::default();
        board.endpoint.data_lanes = 2;

        let err = Gmax4002::attach(mock.hardware(), &board).err();

        assert!(matches!(err, Some(SensorError::HardwareConfigMismatch(_))));
        assert!(mock.events().is_empty());
    }

    #[test]
    fn test_attach_rejects_wrong_supplies() {
        let mock = MockHardware::with_rails(&["vana", "vdig"]);

        let err = Gmax4002::attach(mock.hardware(), &BoardConfig::default()).err();

        assert!(matches!(err, Some(SensorError::HardwareConfigMismatch(_))));
        assert!(mock.events().is_empty());
    }

    #[test]
    fn test_attach_probe_failure_powers_off() {
        let mock = MockHardware::new();
        mock.fail_reads();

        let err = Gmax4002::attach(mock.hardware(), &BoardConfig::default()).err();

        assert!(matches!(
            err,
            Some(SensorError::Transport {
                address: 0x305B,
                ..
            })
        ));
        assert!(!mock.is_powered());
    }

    #[test]
    fn test_unpowered_control_is_stored_only() {
        let (mock, sensor) = attached();

        assert_eq!(sensor.set_control(ControlId::AnalogueGain, 7).expect("set"), 7);

        assert!(mock.writes().is_empty());
        assert_eq!(sensor.control(ControlId::AnalogueGain), Some(7));
    }

    #[test]
    fn test_powered_control_reaches_bus() {
        let (mock, sensor) = attached();
        sensor.acquire_power().expect("power");

        sensor.set_control(ControlId::Vflip, 1).expect("set");

        assert_eq!(mock.register(0x2E05), Some(1));
        sensor.release_power();
        assert!(!mock.is_powered());
    }

    #[test]
    fn test_streaming_locks_flips() {
        let (mock, sensor) = attached();
        sensor.enable_streams().expect("enable");
        let writes = mock.writes().len();

        let err = sensor.set_control(ControlId::Hflip, 1).expect_err("locked");

        assert!(matches!(err, SensorError::Locked(ControlId::Hflip)));
        assert_eq!(mock.writes().len(), writes);
        assert_eq!(sensor.control(ControlId::Hflip), Some(0));

        sensor.set_control(ControlId::AnalogueGain, 4).expect("gain while streaming");
        assert_eq!(mock.register(0x2EC9), Some(4));
    }

    #[test]
    fn test_power_reference_survives_stream_stop() {
        let (mock, sensor) = attached();
        sensor.acquire_power().expect("power");
        sensor.enable_streams().expect("enable");
        assert_eq!(sensor.snapshot().power_refs, 2);

        sensor.disable_streams();

        assert!(mock.is_powered());
        assert_eq!(sensor.snapshot().power, PowerState::Idle);
        sensor.release_power();
        assert!(!mock.is_powered());
    }

    #[test]
    fn test_try_format_leaves_active_untouched() {
        let (_mock, sensor) = attached();
        let mut scratch = Gmax4002::init_state();

        let format = sensor.set_format(
            FormatWhich::Try(&mut scratch),
            &MbusFormat::new(FormatCode::SBGGR10_1X10, 640, 480),
        );

        assert_eq!(format.code, FormatCode::SBGGR10_1X10);
        assert_eq!((format.width, format.height), (2048, 1218));
        assert_eq!(scratch.format, format);
        assert_eq!(sensor.format(), init_state().format);
    }

    #[test]
    fn test_active_format_resolves_unknown_code() {
        let (_mock, sensor) = attached();

        let format = sensor.set_format(
            FormatWhich::Active,
            &MbusFormat::new(FormatCode(0x1234), 2048, 1218),
        );

        assert_eq!(format.code, FormatCode::SRGGB10_1X10);
        assert_eq!(sensor.format(), format);
        assert_eq!(
            sensor.get_selection(SelectionTarget::Crop).expect("crop"),
            Rect::new(0, 18, 2048, 1200)
        );
    }

    #[test]
    fn test_metadata_is_fixed() {
        let mock = MockHardware::new();
        mock.set_clock_rate(27_000_000);
        let sensor = Gmax4002::attach(mock.hardware(), &BoardConfig::default()).expect("attach");

        assert_eq!(sensor.clock_rate(), 27_000_000);
        assert_eq!(Gmax4002::pixel_rate(), 60_000_000);
        assert_eq!(Gmax4002::link_frequency(), 600_000_000);
    }

    #[test]
    fn test_drop_powers_off() {
        let (mock, sensor) = attached();
        sensor.acquire_power().expect("power");
        assert!(mock.is_powered());

        sensor.detach();

        assert!(!mock.is_powered());
        assert!(mock.reset_asserted());
    }

    #[test]
    fn test_handle_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Gmax4002>();
    }
}
