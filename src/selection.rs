//! Selection rectangles exposed on the source pad.

use crate::modes::{
    PadState, NATIVE_HEIGHT, NATIVE_WIDTH, PIXEL_ARRAY_HEIGHT, PIXEL_ARRAY_LEFT, PIXEL_ARRAY_TOP,
    PIXEL_ARRAY_WIDTH,
};
use crate::traits::{Rect, Result, SensorError};

/// Selection target, numbered as in V4L2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionTarget {
    /// Current crop.
    Crop,
    /// Default crop.
    CropDefault,
    /// Limits of the crop.
    CropBounds,
    /// Full pixel array including optical black.
    NativeSize,
    /// Compose targets and anything unknown.
    Other(u32),
}

impl SelectionTarget {
    /// Map a raw V4L2 target number.
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        match raw {
            0x0000 => Self::Crop,
            0x0001 => Self::CropDefault,
            0x0002 => Self::CropBounds,
            0x0003 => Self::NativeSize,
            other => Self::Other(other),
        }
    }

    /// Raw V4L2 target number.
    #[must_use]
    pub const fn raw(self) -> u32 {
        match self {
            Self::Crop => 0x0000,
            Self::CropDefault => 0x0001,
            Self::CropBounds => 0x0002,
            Self::NativeSize => 0x0003,
            Self::Other(raw) => raw,
        }
    }
}

/// Whole sensor array.
#[must_use]
pub const fn native_rect() -> Rect {
    Rect::new(0, 0, NATIVE_WIDTH, NATIVE_HEIGHT)
}

/// Active pixel area.
#[must_use]
pub const fn pixel_array_rect() -> Rect {
    Rect::new(
        PIXEL_ARRAY_LEFT,
        PIXEL_ARRAY_TOP,
        PIXEL_ARRAY_WIDTH,
        PIXEL_ARRAY_HEIGHT,
    )
}

/// Resolve `target` against `state`, which is either the ACTIVE state or a
/// caller's TRY state.
///
/// # Errors
///
/// Returns `InvalidArgument` for compose and unknown targets.
pub fn get_selection(state: &PadState, target: SelectionTarget) -> Result<Rect> {
    match SelectionTarget::from_raw(target.raw()) {
        SelectionTarget::Crop => Ok(state.crop),
        SelectionTarget::NativeSize => Ok(native_rect()),
        SelectionTarget::CropDefault | SelectionTarget::CropBounds => Ok(pixel_array_rect()),
        SelectionTarget::Other(raw) => Err(SensorError::InvalidArgument(format!(
            "unsupported selection target 0x{raw:04x}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modes::init_state;

    #[test]
    fn test_fixed_targets() {
        let state = init_state();

        assert_eq!(
            get_selection(&state, SelectionTarget::NativeSize).expect("native"),
            Rect::new(0, 0, 2048, 1218)
        );
        assert_eq!(
            get_selection(&state, SelectionTarget::CropBounds).expect("bounds"),
            Rect::new(0, 18, 2048, 1200)
        );
        assert_eq!(
            get_selection(&state, SelectionTarget::CropDefault).expect("default"),
            Rect::new(0, 18, 2048, 1200)
        );
    }

    #[test]
    fn test_crop_follows_state() {
        let mut state = init_state();
        state.crop = Rect::new(4, 20, 100, 100);

        assert_eq!(
            get_selection(&state, SelectionTarget::Crop).expect("crop"),
            Rect::new(4, 20, 100, 100)
        );
    }

    #[test]
    fn test_compose_targets_rejected() {
        let state = init_state();
        for raw in [0x0100, 0x0101, 0x0102, 0x0103, 0xFFFF] {
            assert!(matches!(
                get_selection(&state, SelectionTarget::from_raw(raw)),
                Err(SensorError::InvalidArgument(_))
            ));
        }
    }

    #[test]
    fn test_raw_known_target_resolves() {
        let state = init_state();
        assert_eq!(
            get_selection(&state, SelectionTarget::Other(0x0003)).expect("native"),
            native_rect()
        );
        assert_eq!(
            get_selection(&state, SelectionTarget::Other(0x0000)).expect("crop"),
            state.crop
        );
    }

    #[test]
    fn test_crop_within_native() {
        let state = init_state();
        assert!(native_rect().contains(&state.crop));
        assert!(native_rect().contains(&pixel_array_rect()));
    }
}
