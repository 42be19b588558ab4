//! Register program engine.
//!
//! Applies ordered register writes and read-modify-write updates over a
//! [`ControlBus`]. Sequences abort on the first failing write and are never
//! rolled back: a partially applied table is an accepted outcome, the
//! caller decides what to do with the device afterwards.

use log::{debug, error};

use crate::traits::{ControlBus, Register, Result, SensorError};

/// Control register: bit 0 clock stable, bit 1 stream enable.
pub const REG_MODE_CTRL: Register = Register::reg8(0x2E00);
/// Analog power-up enable.
pub const REG_PWR_UP: Register = Register::reg8(0x3301);
/// Analog block sequencing registers.
pub const REG_ANA_SEQ_A: Register = Register::reg8(0x3023);
/// Analog block sequencing registers.
pub const REG_ANA_SEQ_B: Register = Register::reg8(0x3024);
/// Analogue gain, 0..=15.
pub const REG_ANALOG_GAIN: Register = Register::reg8(0x2EC9);
/// Vertical flip.
pub const REG_FLIP_V: Register = Register::reg8(0x2E05);
/// Horizontal flip.
pub const REG_FLIP_H: Register = Register::reg8(0x3002);
/// Black level; doubles as the presence probe since there is no chip id.
pub const REG_BLKLEVEL: Register = Register::reg16(0x305B);

/// `CLK_STABLE_EN` in [`REG_MODE_CTRL`].
pub const MODE_CTRL_CLK_STABLE: u16 = bit(0);
/// `STREAM_EN` in [`REG_MODE_CTRL`].
pub const MODE_CTRL_STREAM: u16 = bit(1);

/// Single-bit mask.
#[must_use]
pub const fn bit(n: u32) -> u16 {
    1 << n
}

/// Contiguous mask covering bits `low..=high`.
#[must_use]
pub const fn genmask(high: u32, low: u32) -> u16 {
    ((u32::MAX >> (31 - high)) & (u32::MAX << low)) as u16
}

/// Shift `value` into the field described by `mask`.
#[must_use]
pub const fn field_prep(mask: u16, value: u16) -> u16 {
    (value << mask.trailing_zeros()) & mask
}

/// One step of a register program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterWrite {
    /// Unconditional write.
    Write {
        /// Target register.
        register: Register,
        /// Value to write.
        value: u16,
    },
    /// Read-modify-write of the bits in `mask`.
    Update {
        /// Target register.
        register: Register,
        /// Bits to replace.
        mask: u16,
        /// New bit values, already shifted into place.
        value: u16,
    },
}

impl RegisterWrite {
    /// Plain write step.
    #[must_use]
    pub const fn write(register: Register, value: u16) -> Self {
        Self::Write { register, value }
    }

    /// Masked update step.
    #[must_use]
    pub const fn update(register: Register, mask: u16, value: u16) -> Self {
        Self::Update {
            register,
            mask,
            value,
        }
    }

    /// Register this step touches.
    #[must_use]
    pub const fn register(&self) -> Register {
        match *self {
            Self::Write { register, .. } | Self::Update { register, .. } => register,
        }
    }
}

/// Read a register, tagging failures with the address.
pub fn read<B: ControlBus + ?Sized>(bus: &mut B, register: Register) -> Result<u16> {
    bus.read(register).map_err(|source| SensorError::Transport {
        address: register.address,
        source,
    })
}

/// Write a register, tagging failures with the address.
pub fn write<B: ControlBus + ?Sized>(bus: &mut B, register: Register, value: u16) -> Result<()> {
    bus.write(register, value & register.width.max_value())
        .map_err(|source| SensorError::Transport {
            address: register.address,
            source,
        })
}

/// Replace the bits selected by `mask` with the corresponding bits of
/// `value`, leaving the rest of the register untouched.
pub fn update_bits<B: ControlBus + ?Sized>(
    bus: &mut B,
    register: Register,
    mask: u16,
    value: u16,
) -> Result<()> {
    let current = read(bus, register)?;
    let next = (current & !mask) | (value & mask);
    write(bus, register, next)
}

/// Apply `writes` in order, stopping at the first failure.
pub fn apply_sequence<B: ControlBus + ?Sized>(bus: &mut B, writes: &[RegisterWrite]) -> Result<()> {
    for (index, step) in writes.iter().enumerate() {
        let result = match *step {
            RegisterWrite::Write { register, value } => write(bus, register, value),
            RegisterWrite::Update {
                register,
                mask,
                value,
            } => update_bits(bus, register, mask, value),
        };
        if let Err(err) = result {
            error!(
                "register program aborted at step {index}/{}: {err}",
                writes.len()
            );
            return Err(err);
        }
    }
    debug!("applied {} register writes", writes.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{Event, MockHardware};
    use crate::traits::BusError;

    #[test]
    fn test_bit_helpers() {
        assert_eq!(bit(0), 0x01);
        assert_eq!(bit(5), 0x20);
        assert_eq!(genmask(7, 4), 0xF0);
        assert_eq!(genmask(2, 1), 0x06);
        assert_eq!(genmask(15, 0), 0xFFFF);
        assert_eq!(field_prep(genmask(7, 4), 0xF), 0xF0);
        assert_eq!(field_prep(genmask(2, 1), 0x3), 0x06);
        assert_eq!(field_prep(genmask(2, 1), 0x7), 0x06);
    }

    #[test]
    fn test_update_bits_preserves_other_bits() {
        let mock = MockHardware::new();
        mock.set_register(0x3023, 0x5A);
        let mut hw = mock.hardware();

        update_bits(hw.bus.as_mut(), REG_ANA_SEQ_A, genmask(7, 4), 0xF0).expect("update failed");

        assert_eq!(mock.register(0x3023), Some(0xFA));
    }

    #[test]
    fn test_update_bits_clears_bit() {
        let mock = MockHardware::new();
        mock.set_register(0x3024, 0xFF);
        let mut hw = mock.hardware();

        update_bits(hw.bus.as_mut(), REG_ANA_SEQ_B, bit(5), 0).expect("update failed");

        assert_eq!(mock.register(0x3024), Some(0xDF));
    }

    #[test]
    fn test_update_bits_read_failure_skips_write() {
        let mock = MockHardware::new();
        mock.fail_reads();
        let mut hw = mock.hardware();

        let err = update_bits(hw.bus.as_mut(), REG_MODE_CTRL, bit(0), bit(0))
            .expect_err("read failure should propagate");

        assert!(matches!(
            err,
            SensorError::Transport {
                address: 0x2E00,
                ..
            }
        ));
        assert!(mock.writes().is_empty());
    }

    #[test]
    fn test_apply_sequence_in_order() {
        let mock = MockHardware::new();
        let mut hw = mock.hardware();
        let program = [
            RegisterWrite::write(Register::reg8(0x10), 0x01),
            RegisterWrite::write(Register::reg8(0x11), 0x02),
            RegisterWrite::update(Register::reg8(0x10), bit(1), bit(1)),
        ];

        apply_sequence(hw.bus.as_mut(), &program).expect("program failed");

        let writes: Vec<(u16, u16)> = mock
            .writes()
            .iter()
            .map(|(reg, value)| (reg.address, *value))
            .collect();
        assert_eq!(writes, vec![(0x10, 0x01), (0x11, 0x02), (0x10, 0x03)]);
    }

    #[test]
    fn test_apply_sequence_stops_at_first_failure() {
        let mock = MockHardware::new();
        mock.fail_nth_write(2);
        let mut hw = mock.hardware();
        let program: Vec<RegisterWrite> = (0..6)
            .map(|i| RegisterWrite::write(Register::reg8(0x20 + i), 0xAA))
            .collect();

        let err = apply_sequence(hw.bus.as_mut(), &program).expect_err("should fail");

        assert!(matches!(
            err,
            SensorError::Transport {
                address: 0x22,
                source: BusError::NoAck
            }
        ));
        assert_eq!(mock.writes().len(), 2);
        assert!(mock
            .events()
            .iter()
            .all(|event| !matches!(event, Event::Write(reg, _) if reg.address > 0x22)));
    }

    #[test]
    fn test_write_masks_to_register_width() {
        let mock = MockHardware::new();
        let mut hw = mock.hardware();

        write(hw.bus.as_mut(), Register::reg8(0x40), 0x1FF).expect("write failed");
        write(hw.bus.as_mut(), Register::reg16(0x42), 0x1FF).expect("write failed");

        assert_eq!(mock.register(0x40), Some(0xFF));
        assert_eq!(mock.register(0x42), Some(0x1FF));
    }
}
