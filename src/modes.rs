//! Mode table and format resolution.
//!
//! The sensor has one readout mode and one bit depth family. Requests for
//! anything else are steered back onto the supported set instead of being
//! rejected, which is what format negotiation in a media pipeline expects.

use crate::regs::RegisterWrite;
use crate::tables::MODE_COMMON_REGS;
use crate::traits::{FourCC, Rect, Result, SensorError};

/// Output width of the full frame.
pub const NATIVE_WIDTH: u32 = 2048;
/// Output height of the full frame.
pub const NATIVE_HEIGHT: u32 = 1218;
/// Left edge of the active pixel array.
pub const PIXEL_ARRAY_LEFT: i32 = 0;
/// Top edge of the active pixel array.
pub const PIXEL_ARRAY_TOP: i32 = 18;
/// Width of the active pixel array.
pub const PIXEL_ARRAY_WIDTH: u32 = 2048;
/// Height of the active pixel array.
pub const PIXEL_ARRAY_HEIGHT: u32 = 1200;

/// Media bus format code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FormatCode(pub u32);

impl FormatCode {
    /// 10-bit Bayer, RGGB order.
    pub const SRGGB10_1X10: Self = Self(0x300f);
    /// 10-bit Bayer, GRBG order.
    pub const SGRBG10_1X10: Self = Self(0x300a);
    /// 10-bit Bayer, GBRG order.
    pub const SGBRG10_1X10: Self = Self(0x300e);
    /// 10-bit Bayer, BGGR order.
    pub const SBGGR10_1X10: Self = Self(0x3007);
    /// 10-bit monochrome. Known but not offered by any mode.
    pub const Y10_1X10: Self = Self(0x200a);

    /// Pixel format a capture node delivers for this bus code.
    #[must_use]
    pub const fn pixel_format(self) -> Option<FourCC> {
        match self {
            Self::SRGGB10_1X10 => Some(FourCC::new(b"RG10")),
            Self::SGRBG10_1X10 => Some(FourCC::new(b"BA10")),
            Self::SGBRG10_1X10 => Some(FourCC::new(b"GB10")),
            Self::SBGGR10_1X10 => Some(FourCC::new(b"BG10")),
            Self::Y10_1X10 => Some(FourCC::new(b"Y10 ")),
            _ => None,
        }
    }
}

/// Bus codes the sensor can output, grouped four Bayer orders per depth.
/// The first entry is the canonical default.
pub const SUPPORTED_CODES: [FormatCode; 4] = [
    FormatCode::SRGGB10_1X10,
    FormatCode::SGRBG10_1X10,
    FormatCode::SGBRG10_1X10,
    FormatCode::SBGGR10_1X10,
];

/// A fixed readout configuration.
#[derive(Debug, PartialEq, Eq)]
pub struct Mode {
    /// Output width.
    pub width: u32,
    /// Output height.
    pub height: u32,
    /// Analog crop applied by this mode.
    pub crop: Rect,
    /// Register program selecting the mode.
    pub registers: &'static [RegisterWrite],
}

/// Modes available for the 10-bit Bayer family.
pub static MODES_10BIT: [Mode; 1] = [Mode {
    width: NATIVE_WIDTH,
    height: NATIVE_HEIGHT,
    crop: Rect::new(
        PIXEL_ARRAY_LEFT,
        PIXEL_ARRAY_TOP,
        PIXEL_ARRAY_WIDTH,
        PIXEL_ARRAY_HEIGHT,
    ),
    registers: MODE_COMMON_REGS,
}];

/// Normalize a requested bus code onto the supported list.
#[must_use]
pub fn resolve_format(code: FormatCode) -> FormatCode {
    if SUPPORTED_CODES.contains(&code) {
        code
    } else {
        SUPPORTED_CODES[0]
    }
}

/// Modes offered for `code`; empty for anything outside the Bayer family.
#[must_use]
pub fn modes_for(code: FormatCode) -> &'static [Mode] {
    if SUPPORTED_CODES.contains(&code) {
        &MODES_10BIT
    } else {
        &[]
    }
}

/// Pick the mode whose size is closest to the request.
///
/// Distance is squared Euclidean over (width, height); the earliest entry
/// wins a tie.
#[must_use]
pub fn nearest_mode(modes: &[Mode], width: u32, height: u32) -> Option<&Mode> {
    let distance = |mode: &Mode| {
        let dw = i64::from(mode.width) - i64::from(width);
        let dh = i64::from(mode.height) - i64::from(height);
        dw * dw + dh * dh
    };
    modes.iter().fold(None, |best: Option<&Mode>, mode| match best {
        Some(current) if distance(current) <= distance(mode) => Some(current),
        _ => Some(mode),
    })
}

/// Bus code at `index` of the enumeration offered to the pipeline.
///
/// One code is offered per bit depth; the Bayer order variants are reached
/// through [`resolve_format`] only.
pub fn enumerate_codes(index: u32) -> Result<FormatCode> {
    let group = usize::try_from(index).unwrap_or(usize::MAX);
    SUPPORTED_CODES
        .chunks(4)
        .nth(group)
        .and_then(|codes| codes.first())
        .map(|code| resolve_format(*code))
        .ok_or(SensorError::OutOfRange {
            what: "bus code",
            index,
        })
}

/// Size limits reported for one enumerated frame size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSizeRange {
    /// Smallest width.
    pub min_width: u32,
    /// Largest width.
    pub max_width: u32,
    /// Smallest height.
    pub min_height: u32,
    /// Largest height.
    pub max_height: u32,
}

/// Frame size at `index` for `code`.
///
/// Codes without modes (anything outside the Bayer family) have no sizes,
/// so every index is out of range for them.
pub fn enumerate_sizes(code: FormatCode, index: u32) -> Result<FrameSizeRange> {
    let modes = modes_for(code);
    let mode = usize::try_from(index)
        .ok()
        .and_then(|i| modes.get(i))
        .ok_or(SensorError::OutOfRange {
            what: "frame size",
            index,
        })?;
    Ok(FrameSizeRange {
        min_width: mode.width,
        max_width: mode.width,
        min_height: mode.height,
        max_height: mode.height,
    })
}

/// Field order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// Progressive.
    None,
}

/// Colorspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Colorspace {
    /// Raw sensor data.
    Raw,
}

/// Y'CbCr encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YcbcrEncoding {
    /// ITU-R BT.601.
    Bt601,
}

/// Quantization range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantization {
    /// Full range.
    FullRange,
}

/// Transfer function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferFunction {
    /// Linear raw data.
    None,
}

/// Format on the sensor's source pad.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MbusFormat {
    /// Bus code.
    pub code: FormatCode,
    /// Frame width.
    pub width: u32,
    /// Frame height.
    pub height: u32,
    /// Field order.
    pub field: Field,
    /// Colorspace.
    pub colorspace: Colorspace,
    /// Y'CbCr encoding.
    pub ycbcr_enc: YcbcrEncoding,
    /// Quantization.
    pub quantization: Quantization,
    /// Transfer function.
    pub xfer_func: TransferFunction,
}

impl MbusFormat {
    /// A format request; colorimetry is filled in by the sensor.
    #[must_use]
    pub const fn new(code: FormatCode, width: u32, height: u32) -> Self {
        Self {
            code,
            width,
            height,
            field: Field::None,
            colorspace: Colorspace::Raw,
            ycbcr_enc: YcbcrEncoding::Bt601,
            quantization: Quantization::FullRange,
            xfer_func: TransferFunction::None,
        }
    }
}

/// Format and crop stored per pad, either by the pipeline (TRY) or by the
/// session (ACTIVE).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PadState {
    /// Current format.
    pub format: MbusFormat,
    /// Current crop, always the selected mode's crop.
    pub crop: Rect,
}

impl Default for PadState {
    fn default() -> Self {
        init_state()
    }
}

/// Resolve `requested` to a supported format and store it, with the
/// matching crop, into `state`.
pub fn apply_format(state: &mut PadState, requested: &MbusFormat) -> MbusFormat {
    let code = resolve_format(requested.code);
    let mode = nearest_mode(modes_for(code), requested.width, requested.height)
        .unwrap_or(&MODES_10BIT[0]);

    let format = MbusFormat::new(code, mode.width, mode.height);
    state.format = format;
    state.crop = mode.crop;
    format
}

/// Default pad state: canonical code at native size.
#[must_use]
pub fn init_state() -> PadState {
    let mode = &MODES_10BIT[0];
    PadState {
        format: MbusFormat::new(SUPPORTED_CODES[0], mode.width, mode.height),
        crop: mode.crop,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mode(width: u32, height: u32) -> Mode {
        Mode {
            width,
            height,
            crop: Rect::new(0, 0, width, height),
            registers: &[],
        }
    }

    #[test]
    fn test_resolve_format_keeps_supported_codes() {
        for code in SUPPORTED_CODES {
            assert_eq!(resolve_format(code), code);
        }
    }

    #[test]
    fn test_resolve_format_defaults_unknown_codes() {
        for raw in [0u32, 1, 0x2008, 0x3001, 0x300b, 0xffff_ffff] {
            assert_eq!(resolve_format(FormatCode(raw)), FormatCode::SRGGB10_1X10);
        }
    }

    #[test]
    fn test_resolve_format_idempotent() {
        for raw in [0u32, 0x300a, 0x300e, 0x3007, 0x300f, 0x200a, 0x1234] {
            let once = resolve_format(FormatCode(raw));
            assert_eq!(resolve_format(once), once);
            assert!(SUPPORTED_CODES.contains(&once));
        }
    }

    #[test]
    fn test_mono_is_not_offered() {
        assert_eq!(resolve_format(FormatCode::Y10_1X10), FormatCode::SRGGB10_1X10);
        assert!(modes_for(FormatCode::Y10_1X10).is_empty());
    }

    #[test]
    fn test_modes_for_bayer_family() {
        for code in SUPPORTED_CODES {
            let modes = modes_for(code);
            assert_eq!(modes.len(), 1);
            assert_eq!(modes[0].width, 2048);
            assert_eq!(modes[0].height, 1218);
        }
        assert!(modes_for(FormatCode(0x1234)).is_empty());
    }

    #[test]
    fn test_nearest_mode_single_entry() {
        let found = nearest_mode(&MODES_10BIT, 640, 480).expect("mode expected");
        assert_eq!((found.width, found.height), (2048, 1218));
    }

    #[test]
    fn test_nearest_mode_picks_closest() {
        let modes = [mode(4096, 2160), mode(1920, 1080), mode(640, 480)];
        let found = nearest_mode(&modes, 1800, 1000).expect("mode expected");
        assert_eq!((found.width, found.height), (1920, 1080));
        let found = nearest_mode(&modes, 100, 100).expect("mode expected");
        assert_eq!((found.width, found.height), (640, 480));
    }

    #[test]
    fn test_nearest_mode_tie_prefers_first() {
        let modes = [mode(100, 100), mode(300, 100)];
        let found = nearest_mode(&modes, 200, 100).expect("mode expected");
        assert_eq!(found.width, 100);
    }

    #[test]
    fn test_nearest_mode_empty() {
        assert!(nearest_mode(&[], 10, 10).is_none());
    }

    #[test]
    fn test_enumerate_codes() {
        assert_eq!(
            enumerate_codes(0).expect("index 0"),
            FormatCode::SRGGB10_1X10
        );
        assert!(matches!(
            enumerate_codes(1),
            Err(SensorError::OutOfRange { index: 1, .. })
        ));
    }

    #[test]
    fn test_enumerate_sizes() {
        let size = enumerate_sizes(FormatCode::SGBRG10_1X10, 0).expect("index 0");
        assert_eq!(
            size,
            FrameSizeRange {
                min_width: 2048,
                max_width: 2048,
                min_height: 1218,
                max_height: 1218,
            }
        );
    }

    #[test]
    fn test_enumerate_sizes_out_of_range() {
        assert!(matches!(
            enumerate_sizes(FormatCode::SRGGB10_1X10, 1),
            Err(SensorError::OutOfRange { index: 1, .. })
        ));
        assert!(matches!(
            enumerate_sizes(FormatCode::Y10_1X10, 0),
            Err(SensorError::OutOfRange { index: 0, .. })
        ));
    }

    #[test]
    fn test_apply_format_normalizes_request() {
        let mut state = init_state();
        let requested = MbusFormat::new(FormatCode(0xdead), 640, 480);

        let format = apply_format(&mut state, &requested);

        assert_eq!(format.code, FormatCode::SRGGB10_1X10);
        assert_eq!((format.width, format.height), (2048, 1218));
        assert_eq!(format.colorspace, Colorspace::Raw);
        assert_eq!(state.format, format);
        assert_eq!(state.crop, Rect::new(0, 18, 2048, 1200));
    }

    #[test]
    fn test_apply_format_keeps_bayer_order() {
        let mut state = init_state();
        let format = apply_format(
            &mut state,
            &MbusFormat::new(FormatCode::SBGGR10_1X10, 2048, 1218),
        );
        assert_eq!(format.code, FormatCode::SBGGR10_1X10);
    }

    #[test]
    fn test_init_state() {
        let state = init_state();
        assert_eq!(state.format.code, FormatCode::SRGGB10_1X10);
        assert_eq!((state.format.width, state.format.height), (2048, 1218));
        assert_eq!(state.crop, MODES_10BIT[0].crop);
    }

    #[test]
    fn test_pixel_formats() {
        assert_eq!(
            FormatCode::SRGGB10_1X10.pixel_format(),
            Some(FourCC::new(b"RG10"))
        );
        assert_eq!(
            FormatCode::SGRBG10_1X10.pixel_format(),
            Some(FourCC::new(b"BA10"))
        );
        assert_eq!(FormatCode(0x1234).pixel_format(), None);
    }

    #[cfg(feature = "v4l")]
    #[test]
    fn test_pixel_format_converts_to_v4l() {
        let fourcc = FormatCode::SBGGR10_1X10
            .pixel_format()
            .expect("bayer code has a pixel format");
        let converted: v4l::FourCC = fourcc.into();
        assert_eq!(&converted.repr, b"BG10");
        assert_eq!(FourCC::from(converted), fourcc);
    }
}
