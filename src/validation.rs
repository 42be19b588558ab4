//! Attach-time checks of the board wiring.
//!
//! The sensor only works on a 4-lane CSI-2 D-PHY link at its fixed link
//! frequency, with its three supplies present. These checks run before any
//! power sequencing so that a misdescribed board never gets powered.

use crate::config::{BusType, EndpointConfig};
use crate::controls::LINK_FREQ_MENU;
use crate::power::SUPPLY_NAMES;
use crate::traits::{Result, SensorError};

/// Data lanes the sensor drives.
pub const REQUIRED_DATA_LANES: u8 = 4;

/// Validates the receiver endpoint the sensor is wired to.
///
/// # Arguments
///
/// * `endpoint` - The endpoint from the board description
///
/// # Returns
///
/// * `Ok(())` if the sensor can drive this endpoint
/// * `Err(SensorError::HardwareConfigMismatch)` otherwise
///
/// # Errors
///
/// Returns `HardwareConfigMismatch` if:
/// - The bus is not CSI-2 over D-PHY
/// - The lane count is not 4
/// - Link frequencies are listed but none of the sensor's is among them
pub fn validate_endpoint(endpoint: &EndpointConfig) -> Result<()> {
    if endpoint.bus_type != BusType::Csi2Dphy {
        return Err(SensorError::HardwareConfigMismatch(format!(
            "bus type {:?} not supported, need CSI-2 D-PHY",
            endpoint.bus_type
        )));
    }

    if endpoint.data_lanes != REQUIRED_DATA_LANES {
        return Err(SensorError::HardwareConfigMismatch(format!(
            "{} data lanes configured, need {REQUIRED_DATA_LANES}",
            endpoint.data_lanes
        )));
    }

    let supported = LINK_FREQ_MENU
        .iter()
        .all(|freq| endpoint.link_frequencies.contains(&freq.unsigned_abs()));
    if !endpoint.link_frequencies.is_empty() && !supported {
        return Err(SensorError::HardwareConfigMismatch(format!(
            "link frequencies {:?} do not include {:?}",
            endpoint.link_frequencies, LINK_FREQ_MENU
        )));
    }

    Ok(())
}

/// Validates that the supplies are exactly the sensor's, in enable order.
///
/// # Errors
///
/// Returns `HardwareConfigMismatch` if a supply is missing, extra, or out
/// of order.
pub fn validate_supplies(names: &[&str]) -> Result<()> {
    if names != SUPPLY_NAMES {
        return Err(SensorError::HardwareConfigMismatch(format!(
            "supplies {names:?} do not match {SUPPLY_NAMES:?}"
        )));
    }
    Ok(())
}
