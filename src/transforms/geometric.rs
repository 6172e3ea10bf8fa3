use ndarray::{s, Array3};
use rand::{Rng, RngCore};

use super::check_probability;
use crate::bbox::{BBoxXYXY, Coord, Normalized};
use crate::compose::{Augment, Capabilities, Params};
use crate::error::AugmentError;
use crate::targets::{Frame, Image, Keypoint};

// ============================================================================
// NoOp
// ============================================================================

/// Leaves every target as it is. Useful as a placeholder and for checking
/// that the boundary conversions are lossless.
#[derive(Debug, Clone)]
pub struct NoOp {
    p: f64,
}

impl NoOp {
    pub fn new(p: f64) -> Result<Self, AugmentError> {
        Ok(Self {
            p: check_probability("NoOp", p)?,
        })
    }
}

impl Augment for NoOp {
    fn name(&self) -> &'static str {
        "NoOp"
    }

    fn probability(&self) -> f64 {
        self.p
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::ALL
    }
}

// ============================================================================
// HorizontalFlip / VerticalFlip
// ============================================================================

/// Mirrors the image left to right.
#[derive(Debug, Clone)]
pub struct HorizontalFlip {
    p: f64,
}

impl HorizontalFlip {
    pub fn new(p: f64) -> Result<Self, AugmentError> {
        Ok(Self {
            p: check_probability("HorizontalFlip", p)?,
        })
    }
}

impl Augment for HorizontalFlip {
    fn name(&self) -> &'static str {
        "HorizontalFlip"
    }

    fn probability(&self) -> f64 {
        self.p
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::ALL
    }

    fn apply_image(&self, image: &Image, _params: &Params) -> Result<Image, AugmentError> {
        Ok(image.slice(s![.., ..;-1, ..]).to_owned())
    }

    fn apply_bbox(
        &self,
        rect: BBoxXYXY<Normalized>,
        _params: &Params,
        _frame: Frame,
    ) -> Result<BBoxXYXY<Normalized>, AugmentError> {
        Ok(BBoxXYXY::from_xyxy(
            1.0 - rect.xmax(),
            rect.ymin(),
            1.0 - rect.xmin(),
            rect.ymax(),
        ))
    }

    fn apply_keypoint(
        &self,
        kp: Keypoint,
        _params: &Params,
        frame: Frame,
    ) -> Result<Keypoint, AugmentError> {
        Ok(Coord::new(frame.cols as f64 - kp.x, kp.y))
    }
}

/// Mirrors the image top to bottom.
#[derive(Debug, Clone)]
pub struct VerticalFlip {
    p: f64,
}

impl VerticalFlip {
    pub fn new(p: f64) -> Result<Self, AugmentError> {
        Ok(Self {
            p: check_probability("VerticalFlip", p)?,
        })
    }
}

impl Augment for VerticalFlip {
    fn name(&self) -> &'static str {
        "VerticalFlip"
    }

    fn probability(&self) -> f64 {
        self.p
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::ALL
    }

    fn apply_image(&self, image: &Image, _params: &Params) -> Result<Image, AugmentError> {
        Ok(image.slice(s![..;-1, .., ..]).to_owned())
    }

    fn apply_bbox(
        &self,
        rect: BBoxXYXY<Normalized>,
        _params: &Params,
        _frame: Frame,
    ) -> Result<BBoxXYXY<Normalized>, AugmentError> {
        Ok(BBoxXYXY::from_xyxy(
            rect.xmin(),
            1.0 - rect.ymax(),
            rect.xmax(),
            1.0 - rect.ymin(),
        ))
    }

    fn apply_keypoint(
        &self,
        kp: Keypoint,
        _params: &Params,
        frame: Frame,
    ) -> Result<Keypoint, AugmentError> {
        Ok(Coord::new(kp.x, frame.rows as f64 - kp.y))
    }
}

// ============================================================================
// RandomCrop
// ============================================================================

/// Cuts a fixed-size window at a random position.
///
/// The position is sampled as two fractions (`h_start`, `w_start`) of the
/// free space, so the same parameters work on any frame at least as large
/// as the window.
#[derive(Debug, Clone)]
pub struct RandomCrop {
    height: u32,
    width: u32,
    p: f64,
}

impl RandomCrop {
    pub fn new(height: u32, width: u32, p: f64) -> Result<Self, AugmentError> {
        if height == 0 || width == 0 {
            return Err(AugmentError::invalid_transform(
                "RandomCrop",
                format!("crop size must be positive (got {}x{})", height, width),
            ));
        }
        Ok(Self {
            height,
            width,
            p: check_probability("RandomCrop", p)?,
        })
    }

    /// Top-left corner `(y0, x0)` of the window inside `frame`.
    fn origin(&self, params: &Params, frame: Frame) -> Result<(u32, u32), AugmentError> {
        if self.height > frame.rows || self.width > frame.cols {
            return Err(AugmentError::invalid_transform(
                "RandomCrop",
                format!(
                    "crop {}x{} is larger than the image {}x{}",
                    self.height, self.width, frame.rows, frame.cols
                ),
            ));
        }
        let h_start = params.get(self.name(), "h_start")?;
        let w_start = params.get(self.name(), "w_start")?;
        for (key, value) in [("h_start", h_start), ("w_start", w_start)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(AugmentError::invalid_transform(
                    "RandomCrop",
                    format!("{} must lie in [0, 1] (got {})", key, value),
                ));
            }
        }
        let y0 = ((frame.rows - self.height) as f64 * h_start) as u32;
        let x0 = ((frame.cols - self.width) as f64 * w_start) as u32;
        Ok((y0, x0))
    }
}

impl Augment for RandomCrop {
    fn name(&self) -> &'static str {
        "RandomCrop"
    }

    fn probability(&self) -> f64 {
        self.p
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::ALL
    }

    fn sample_params(&self, rng: &mut dyn RngCore) -> Params {
        Params::new()
            .with("h_start", rng.random::<f64>())
            .with("w_start", rng.random::<f64>())
    }

    fn apply_image(&self, image: &Image, params: &Params) -> Result<Image, AugmentError> {
        let (y0, x0) = self.origin(params, Frame::of(image))?;
        let (y0, x0) = (y0 as usize, x0 as usize);
        let (h, w) = (self.height as usize, self.width as usize);
        Ok(image.slice(s![y0..y0 + h, x0..x0 + w, ..]).to_owned())
    }

    fn apply_bbox(
        &self,
        rect: BBoxXYXY<Normalized>,
        params: &Params,
        frame: Frame,
    ) -> Result<BBoxXYXY<Normalized>, AugmentError> {
        let (y0, x0) = self.origin(params, frame)?;
        let pixel = rect.to_pixel(frame.rows as f64, frame.cols as f64);
        let (x0, y0) = (x0 as f64, y0 as f64);
        let (h, w) = (self.height as f64, self.width as f64);
        Ok(BBoxXYXY::from_xyxy(
            (pixel.xmin() - x0) / w,
            (pixel.ymin() - y0) / h,
            (pixel.xmax() - x0) / w,
            (pixel.ymax() - y0) / h,
        ))
    }

    fn apply_keypoint(
        &self,
        kp: Keypoint,
        params: &Params,
        frame: Frame,
    ) -> Result<Keypoint, AugmentError> {
        let (y0, x0) = self.origin(params, frame)?;
        Ok(Coord::new(kp.x - x0 as f64, kp.y - y0 as f64))
    }
}

// ============================================================================
// Resize
// ============================================================================

/// Resizes to a fixed size with nearest-neighbour sampling.
///
/// Normalized boxes are unaffected; pixel keypoints are rescaled.
#[derive(Debug, Clone)]
pub struct Resize {
    height: u32,
    width: u32,
    p: f64,
}

impl Resize {
    pub fn new(height: u32, width: u32, p: f64) -> Result<Self, AugmentError> {
        if height == 0 || width == 0 {
            return Err(AugmentError::invalid_transform(
                "Resize",
                format!(
                    "image dimensions must be positive after resizing (got {}x{})",
                    height, width
                ),
            ));
        }
        Ok(Self {
            height,
            width,
            p: check_probability("Resize", p)?,
        })
    }
}

impl Augment for Resize {
    fn name(&self) -> &'static str {
        "Resize"
    }

    fn probability(&self) -> f64 {
        self.p
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::ALL
    }

    fn apply_image(&self, image: &Image, _params: &Params) -> Result<Image, AugmentError> {
        let (rows, cols, channels) = image.dim();
        let (h, w) = (self.height as usize, self.width as usize);
        let sy = rows as f64 / h as f64;
        let sx = cols as f64 / w as f64;
        Ok(Array3::from_shape_fn((h, w, channels), |(y, x, c)| {
            let src_y = (((y as f64 + 0.5) * sy) as usize).min(rows - 1);
            let src_x = (((x as f64 + 0.5) * sx) as usize).min(cols - 1);
            image[[src_y, src_x, c]]
        }))
    }

    fn apply_keypoint(
        &self,
        kp: Keypoint,
        _params: &Params,
        frame: Frame,
    ) -> Result<Keypoint, AugmentError> {
        Ok(Coord::new(
            kp.x * self.width as f64 / frame.cols as f64,
            kp.y * self.height as f64 / frame.rows as f64,
        ))
    }
}

// ============================================================================
// Rotate
// ============================================================================

/// Rotates about the image centre by a random angle in `[-limit, limit]`
/// degrees, counter-clockwise for positive angles. The canvas keeps its
/// size; uncovered pixels are zero.
#[derive(Debug, Clone)]
pub struct Rotate {
    limit: f64,
    p: f64,
}

impl Rotate {
    pub fn new(limit: f64, p: f64) -> Result<Self, AugmentError> {
        if !limit.is_finite() || limit < 0.0 {
            return Err(AugmentError::invalid_transform(
                "Rotate",
                format!("limit must be a non-negative angle (got {})", limit),
            ));
        }
        Ok(Self {
            limit,
            p: check_probability("Rotate", p)?,
        })
    }
}

/// Rotates a pixel point about the centre of `frame`.
fn rotate_point(x: f64, y: f64, angle: f64, frame: Frame) -> (f64, f64) {
    let (sin, cos) = angle.to_radians().sin_cos();
    let cx = frame.cols as f64 / 2.0;
    let cy = frame.rows as f64 / 2.0;
    let (dx, dy) = (x - cx, y - cy);
    (cx + cos * dx + sin * dy, cy - sin * dx + cos * dy)
}

impl Augment for Rotate {
    fn name(&self) -> &'static str {
        "Rotate"
    }

    fn probability(&self) -> f64 {
        self.p
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::ALL
    }

    fn sample_params(&self, rng: &mut dyn RngCore) -> Params {
        Params::new().with("angle", rng.random_range(-self.limit..=self.limit))
    }

    fn apply_image(&self, image: &Image, params: &Params) -> Result<Image, AugmentError> {
        let angle = params.get(self.name(), "angle")?;
        let (rows, cols, channels) = image.dim();
        // Inverse mapping: each output pixel centre is rotated back by
        // -angle to find its source.
        let (sin, cos) = angle.to_radians().sin_cos();
        let cx = cols as f64 / 2.0;
        let cy = rows as f64 / 2.0;
        Ok(Array3::from_shape_fn((rows, cols, channels), |(y, x, c)| {
            let dx = x as f64 + 0.5 - cx;
            let dy = y as f64 + 0.5 - cy;
            let src_x = (cx + cos * dx - sin * dy).floor();
            let src_y = (cy + sin * dx + cos * dy).floor();
            if src_x >= 0.0 && src_y >= 0.0 && src_x < cols as f64 && src_y < rows as f64 {
                image[[src_y as usize, src_x as usize, c]]
            } else {
                0.0
            }
        }))
    }

    fn apply_bbox(
        &self,
        rect: BBoxXYXY<Normalized>,
        params: &Params,
        frame: Frame,
    ) -> Result<BBoxXYXY<Normalized>, AugmentError> {
        let angle = params.get(self.name(), "angle")?;
        let (rows, cols) = (frame.rows as f64, frame.cols as f64);
        let corners = rect.to_pixel(rows, cols).corners().map(|corner| {
            let (x, y) = rotate_point(corner.x, corner.y, angle, frame);
            Coord::new(x / cols, y / rows)
        });
        Ok(BBoxXYXY::hull(corners).unwrap_or(rect))
    }

    fn apply_keypoint(
        &self,
        kp: Keypoint,
        params: &Params,
        frame: Frame,
    ) -> Result<Keypoint, AugmentError> {
        let angle = params.get(self.name(), "angle")?;
        let (x, y) = rotate_point(kp.x, kp.y, angle, frame);
        Ok(Coord::new(x, y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn ramp(rows: usize, cols: usize) -> Image {
        Array3::from_shape_fn((rows, cols, 1), |(y, x, _)| (y * cols + x) as f32)
    }

    fn assert_rect_close(rect: BBoxXYXY<Normalized>, expected: [f64; 4]) {
        for (a, b) in rect.to_array().iter().zip(expected) {
            assert!((a - b).abs() < 1e-9, "{:?} != {:?}", rect, expected);
        }
    }

    #[test]
    fn test_horizontal_flip() {
        let flip = HorizontalFlip::new(1.0).unwrap();
        let out = flip.apply_image(&ramp(1, 2), &Params::new()).unwrap();
        assert_eq!(out.iter().copied().collect::<Vec<_>>(), vec![1.0, 0.0]);

        let rect = flip
            .apply_bbox(
                BBoxXYXY::from_xyxy(0.1, 0.2, 0.3, 0.4),
                &Params::new(),
                Frame::new(1, 2),
            )
            .unwrap();
        assert_rect_close(rect, [0.7, 0.2, 0.9, 0.4]);
    }

    #[test]
    fn test_vertical_flip_keypoint() {
        let flip = VerticalFlip::new(0.5).unwrap();
        let kp = flip
            .apply_keypoint(Coord::new(3.0, 1.0), &Params::new(), Frame::new(10, 20))
            .unwrap();
        assert_eq!((kp.x, kp.y), (3.0, 9.0));
    }

    #[test]
    fn test_random_crop_window() {
        let crop = RandomCrop::new(2, 2, 1.0).unwrap();
        let params = Params::new().with("h_start", 0.0).with("w_start", 0.5);
        let out = crop.apply_image(&ramp(4, 4), &params).unwrap();
        assert_eq!(out.dim(), (2, 2, 1));
        assert_eq!(out.iter().copied().collect::<Vec<_>>(), vec![1.0, 2.0, 5.0, 6.0]);

        let rect = crop
            .apply_bbox(
                BBoxXYXY::from_xyxy(0.25, 0.25, 0.75, 0.75),
                &params,
                Frame::new(4, 4),
            )
            .unwrap();
        assert_rect_close(rect, [0.0, 0.5, 1.0, 1.5]);
    }

    #[test]
    fn test_random_crop_too_large() {
        let crop = RandomCrop::new(8, 8, 1.0).unwrap();
        let params = Params::new().with("h_start", 0.0).with("w_start", 0.0);
        let err = crop.apply_image(&ramp(4, 4), &params).unwrap_err();
        assert!(matches!(err, AugmentError::InvalidTransform { transform: "RandomCrop", .. }));
    }

    #[test]
    fn test_random_crop_rejects_offset_outside_unit() {
        let crop = RandomCrop::new(2, 2, 1.0).unwrap();
        for h_start in [2.0, -0.1, f64::NAN, f64::INFINITY] {
            let params = Params::new().with("h_start", h_start).with("w_start", 0.0);
            let err = crop.apply_image(&ramp(4, 4), &params).unwrap_err();
            assert!(matches!(err, AugmentError::InvalidTransform { transform: "RandomCrop", .. }));
        }

        let params = Params::new().with("h_start", 1.0).with("w_start", 1.0);
        let out = crop.apply_image(&ramp(4, 4), &params).unwrap();
        assert_eq!(out.iter().copied().collect::<Vec<_>>(), vec![10.0, 11.0, 14.0, 15.0]);
    }

    #[test]
    fn test_random_crop_params_are_fractions() {
        let crop = RandomCrop::new(2, 2, 1.0).unwrap();
        let mut rng = StdRng::seed_from_u64(11);
        let params = crop.sample_params(&mut rng);
        for key in ["h_start", "w_start"] {
            let v = params.get("RandomCrop", key).unwrap();
            assert!((0.0..1.0).contains(&v));
        }
    }

    #[test]
    fn test_resize_nearest() {
        let resize = Resize::new(2, 2, 1.0).unwrap();
        let out = resize.apply_image(&ramp(4, 4), &Params::new()).unwrap();
        assert_eq!(out.iter().copied().collect::<Vec<_>>(), vec![5.0, 7.0, 13.0, 15.0]);

        let kp = resize
            .apply_keypoint(Coord::new(2.0, 4.0), &Params::new(), Frame::new(4, 4))
            .unwrap();
        assert_eq!((kp.x, kp.y), (1.0, 2.0));
    }

    #[test]
    fn test_rotate_half_turn() {
        let rotate = Rotate::new(180.0, 1.0).unwrap();
        let params = Params::new().with("angle", 180.0);

        let out = rotate.apply_image(&ramp(2, 2), &params).unwrap();
        assert_eq!(out.iter().copied().collect::<Vec<_>>(), vec![3.0, 2.0, 1.0, 0.0]);

        let rect = rotate
            .apply_bbox(
                BBoxXYXY::from_xyxy(0.1, 0.2, 0.3, 0.4),
                &params,
                Frame::new(10, 10),
            )
            .unwrap();
        assert_rect_close(rect, [0.7, 0.6, 0.9, 0.8]);
    }

    #[test]
    fn test_rotate_zero_is_identity() {
        let rotate = Rotate::new(0.0, 1.0).unwrap();
        let mut rng = StdRng::seed_from_u64(5);
        let params = rotate.sample_params(&mut rng);
        assert_eq!(params.get("Rotate", "angle").unwrap(), 0.0);

        let image = ramp(3, 5);
        assert_eq!(rotate.apply_image(&image, &params).unwrap(), image);
    }

    #[test]
    fn test_probability_checked() {
        assert!(NoOp::new(-0.1).is_err());
        assert!(Rotate::new(-5.0, 0.5).is_err());
        assert!(Resize::new(0, 4, 1.0).is_err());
    }
}
