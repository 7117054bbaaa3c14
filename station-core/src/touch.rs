//! Raw touch-controller readings to screen pixels.

/// Calibration of one screen axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisCalibration {
    /// Raw reading at the first pixel of the axis.
    pub raw_min: u16,
    /// Raw reading at the last pixel of the axis.
    pub raw_max: u16,
    /// Pixels along the axis.
    pub resolution: u16,
    /// Mirror the axis after scaling.
    pub invert: bool,
}

impl AxisCalibration {
    pub const fn new(raw_min: u16, raw_max: u16, resolution: u16) -> Self {
        Self { raw_min, raw_max, resolution, invert: false }
    }

    pub const fn inverted(self) -> Self {
        Self { invert: true, ..self }
    }

    /// Clamp `raw` into the calibrated range and rescale to
    /// `0..=resolution - 1`, rounding to the nearest pixel.
    pub fn scale(&self, raw: u16) -> u16 {
        let (min, max) = (u64::from(self.raw_min), u64::from(self.raw_max));
        if self.resolution == 0 || max <= min {
            return 0;
        }

        let span = max - min;
        let top = u64::from(self.resolution) - 1;
        let offset = u64::from(raw).clamp(min, max) - min;
        let scaled = (offset * top + span / 2) / span;

        let pixel = if self.invert { top - scaled } else { scaled };
        pixel as u16
    }
}

/// Full panel calibration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TouchCalibration {
    /// Calibration of the raw channel that feeds screen X.
    pub x: AxisCalibration,
    /// Calibration of the raw channel that feeds screen Y.
    pub y: AxisCalibration,
    /// The controller's X channel drives screen Y and vice versa.
    pub swap_xy: bool,
}

impl Default for TouchCalibration {
    /// Resistive panel on a 240x320 portrait display.
    fn default() -> Self {
        Self {
            x: AxisCalibration::new(200, 3700, 240),
            y: AxisCalibration::new(240, 3800, 320),
            swap_xy: false,
        }
    }
}

/// Map a raw sample to screen coordinates. Stateless.
pub fn map(raw_x: u16, raw_y: u16, calibration: &TouchCalibration) -> (u16, u16) {
    let (raw_x, raw_y) = if calibration.swap_xy { (raw_y, raw_x) } else { (raw_x, raw_y) };
    (calibration.x.scale(raw_x), calibration.y.scale(raw_y))
}
