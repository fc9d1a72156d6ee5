//! Band-1 pixel values of a raster window

use crate::raster::sample::SampleType;

/// Pixel values read from one window of a raster
///
/// Values are stored row-major as `f64`, which represents every supported
/// sample type exactly.
#[derive(Debug, Clone)]
pub struct RasterWindow {
    pub width: u32,
    pub height: u32,
    pub sample_type: SampleType,
    pub values: Vec<f64>,
    pub nodata: Option<f64>,
    /// Treat zero as background in addition to nodata
    pub zero_as_nodata: bool,
}

impl RasterWindow {
    pub fn new(width: u32, height: u32, sample_type: SampleType, values: Vec<f64>, nodata: Option<f64>) -> Self {
        RasterWindow { width, height, sample_type, values, nodata, zero_as_nodata: false }
    }

    pub fn value(&self, x: u32, y: u32) -> f64 {
        self.values[y as usize * self.width as usize + x as usize]
    }

    /// Whether the pixel belongs to the foreground
    pub fn is_valid(&self, x: u32, y: u32) -> bool {
        self.is_valid_value(self.value(x, y))
    }

    pub fn is_valid_value(&self, value: f64) -> bool {
        if value.is_nan() {
            return false;
        }
        if self.zero_as_nodata && value == 0.0 {
            return false;
        }
        match self.nodata {
            Some(nodata) => value != nodata,
            None => true,
        }
    }

    pub fn valid_count(&self) -> usize {
        self.values.iter().filter(|v| self.is_valid_value(**v)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validity_rules() {
        let mut window = RasterWindow::new(4, 1, SampleType::F32,
                                           vec![0.0, 1.0, f64::NAN, -9999.0], Some(-9999.0));
        assert!(window.is_valid(0, 0));
        assert!(window.is_valid(1, 0));
        assert!(!window.is_valid(2, 0));
        assert!(!window.is_valid(3, 0));
        assert_eq!(window.valid_count(), 2);

        window.zero_as_nodata = true;
        assert!(!window.is_valid(0, 0));
    }
}
