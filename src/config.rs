//! Board description loaded from TOML.
//!
//! Describes how the sensor is wired on a given board: the CSI-2 endpoint,
//! the external clock and whether a reset line is routed.
//!
//! ```toml
//! clock_rate_hz = 24000000
//! reset_line = true
//!
//! [endpoint]
//! bus_type = "csi2-dphy"
//! data_lanes = 4
//! link_frequencies = [600000000]
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::controls::LINK_FREQ;
use crate::traits::Result;

/// Physical bus the endpoint is wired for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BusType {
    /// MIPI CSI-2 over D-PHY.
    Csi2Dphy,
    /// MIPI CSI-2 over C-PHY.
    Csi2Cphy,
    /// Parallel bus.
    Parallel,
}

/// Receiver endpoint the sensor output is routed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Bus type.
    pub bus_type: BusType,
    /// Number of CSI-2 data lanes.
    pub data_lanes: u8,
    /// Link frequencies the receiver supports, in Hz. Empty when the board
    /// does not restrict them.
    #[serde(default)]
    pub link_frequencies: Vec<u64>,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            bus_type: BusType::Csi2Dphy,
            data_lanes: 4,
            link_frequencies: vec![LINK_FREQ.unsigned_abs()],
        }
    }
}

/// Everything attach needs to know about the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardConfig {
    /// Sensor output endpoint.
    #[serde(default)]
    pub endpoint: EndpointConfig,
    /// External clock rate in Hz.
    #[serde(default = "default_clock_rate")]
    pub clock_rate_hz: u64,
    /// Whether the reset (XCLR) line is routed.
    #[serde(default = "default_reset_line")]
    pub reset_line: bool,
}

const fn default_clock_rate() -> u64 {
    24_000_000
}

const fn default_reset_line() -> bool {
    true
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            endpoint: EndpointConfig::default(),
            clock_rate_hz: default_clock_rate(),
            reset_line: default_reset_line(),
        }
    }
}

impl BoardConfig {
    /// Parse a board description.
    ///
    /// # Errors
    ///
    /// Returns `Config` if the text is not valid TOML or does not match the
    /// expected layout.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load a board description from a file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the TOML file
    ///
    /// # Errors
    ///
    /// Returns `Io` if the file cannot be read and `Config` if it cannot be
    /// parsed.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&text)
    }
}
