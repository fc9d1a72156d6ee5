//! Affine pixel-to-world mapping for north-up rasters

/// North-up geotransform
///
/// `pixel_height` is negative for the usual top-down raster, so that
/// `y = origin_y + row * pixel_height` decreases going down the image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoTransform {
    pub origin_x: f64,
    pub origin_y: f64,
    pub pixel_width: f64,
    pub pixel_height: f64,
}

impl GeoTransform {
    pub fn new(origin_x: f64, origin_y: f64, pixel_width: f64, pixel_height: f64) -> Self {
        GeoTransform { origin_x, origin_y, pixel_width, pixel_height }
    }

    /// Pixel coordinates used when a raster carries no georeferencing
    pub fn identity() -> Self {
        GeoTransform::new(0.0, 0.0, 1.0, -1.0)
    }

    /// Builds the transform from ModelPixelScale and the first ModelTiepoint
    pub fn from_scale_and_tiepoint(scale: &[f64], tiepoint: &[f64]) -> Option<Self> {
        if scale.len() < 2 || tiepoint.len() < 6 || scale[0] == 0.0 || scale[1] == 0.0 {
            return None;
        }
        let (sx, sy) = (scale[0], scale[1]);
        let (i, j) = (tiepoint[0], tiepoint[1]);
        Some(GeoTransform::new(tiepoint[3] - i * sx, tiepoint[4] + j * sy, sx, -sy))
    }

    /// Builds the transform from a 4x4 ModelTransformation matrix
    ///
    /// Rotated or sheared matrices are rejected.
    pub fn from_model_transformation(matrix: &[f64]) -> Option<Self> {
        if matrix.len() < 16 || matrix[1] != 0.0 || matrix[4] != 0.0 {
            return None;
        }
        if matrix[0] == 0.0 || matrix[5] == 0.0 {
            return None;
        }
        Some(GeoTransform::new(matrix[3], matrix[7], matrix[0], matrix[5]))
    }

    /// World coordinate of a pixel-grid position (corner coordinates)
    pub fn apply(&self, col: f64, row: f64) -> (f64, f64) {
        (self.origin_x + col * self.pixel_width, self.origin_y + row * self.pixel_height)
    }

    /// Transform of a window whose top-left pixel is (x, y)
    pub fn shifted(&self, x: u32, y: u32) -> Self {
        let (origin_x, origin_y) = self.apply(x as f64, y as f64);
        GeoTransform::new(origin_x, origin_y, self.pixel_width, self.pixel_height)
    }

    /// ModelPixelScale values for this transform
    pub fn pixel_scale(&self) -> [f64; 3] {
        [self.pixel_width, -self.pixel_height, 0.0]
    }

    /// ModelTiepoint values anchoring pixel (0,0) at the origin
    pub fn tiepoint(&self) -> [f64; 6] {
        [0.0, 0.0, 0.0, self.origin_x, self.origin_y, 0.0]
    }
}

impl Default for GeoTransform {
    fn default() -> Self {
        GeoTransform::identity()
    }
}
