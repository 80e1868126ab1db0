//! Zoom, fit and rotation of the displayed image.

pub const ZOOM_MIN: f32 = 0.05;
pub const ZOOM_MAX: f32 = 8.0;

/// Multipliers applied per zoom command.
pub const KEY_ZOOM_IN: f32 = 1.25;
pub const KEY_ZOOM_OUT: f32 = 0.8;
pub const WHEEL_ZOOM_IN: f32 = 1.1;
pub const WHEEL_ZOOM_OUT: f32 = 0.9;

/// Transform state of the image on screen. Not kept across images.
///
/// Either `fit` or `zoom` decides the render scale, never both: every zoom
/// command clears `fit`, and `fit()` leaves the zoom number alone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewState {
    zoom: f32,
    fit: bool,
    rotation: u16,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            fit: true,
            rotation: 0,
        }
    }
}

/// Where and how large to draw the image inside the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderPlan {
    pub scale: f32,
    pub width: u32,
    pub height: u32,
    /// Top-left corner relative to the viewport; negative when the image
    /// overflows it.
    pub x: i32,
    pub y: i32,
}

impl ViewState {
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn is_fit(&self) -> bool {
        self.fit
    }

    /// Degrees clockwise, one of 0, 90, 180, 270.
    pub fn rotation(&self) -> u16 {
        self.rotation
    }

    pub fn reset_for_new_image(&mut self) {
        *self = Self::default();
    }

    pub fn set_zoom(&mut self, z: f32) {
        self.zoom = z.clamp(ZOOM_MIN, ZOOM_MAX);
        self.fit = false;
    }

    pub fn zoom_by(&mut self, factor: f32) {
        self.set_zoom(self.zoom * factor);
    }

    pub fn fit(&mut self) {
        self.fit = true;
    }

    pub fn rotate(&mut self, delta_degrees: i32) {
        self.rotation = (self.rotation as i32 + delta_degrees).rem_euclid(360) as u16;
    }

    /// `None` means nothing should be drawn (degenerate viewport or image).
    pub fn render_scale(&self, img_w: u32, img_h: u32, view_w: u32, view_h: u32) -> Option<f32> {
        if view_w <= 1 || view_h <= 1 || img_w == 0 || img_h == 0 {
            return None;
        }
        if self.fit {
            let scale = (view_w as f32 / img_w as f32).min(view_h as f32 / img_h as f32);
            Some(scale.max(ZOOM_MIN))
        } else {
            Some(self.zoom)
        }
    }

    pub fn render_plan(&self, img_w: u32, img_h: u32, view_w: u32, view_h: u32) -> Option<RenderPlan> {
        let scale = self.render_scale(img_w, img_h, view_w, view_h)?;
        let width = ((img_w as f32 * scale) as u32).max(1);
        let height = ((img_h as f32 * scale) as u32).max(1);
        Some(RenderPlan {
            scale,
            width,
            height,
            x: (view_w as i64 - width as i64).div_euclid(2) as i32,
            y: (view_h as i64 - height as i64).div_euclid(2) as i32,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let v = ViewState::default();
        assert_eq!(v.zoom(), 1.0);
        assert!(v.is_fit());
        assert_eq!(v.rotation(), 0);
    }

    #[test]
    fn test_reset_for_new_image() {
        let mut v = ViewState::default();
        v.set_zoom(3.0);
        v.rotate(270);
        v.reset_for_new_image();
        assert_eq!(v, ViewState::default());
    }

    #[test]
    fn test_set_zoom_clamps_and_leaves_fit() {
        let mut v = ViewState::default();
        v.set_zoom(1000.0);
        assert_eq!(v.zoom(), ZOOM_MAX);
        assert!(!v.is_fit());

        v.set_zoom(0.0001);
        assert_eq!(v.zoom(), ZOOM_MIN);
    }

    #[test]
    fn test_zoom_by_multiplies_stored_zoom() {
        let mut v = ViewState::default();
        v.zoom_by(KEY_ZOOM_IN);
        assert!((v.zoom() - 1.25).abs() < 1e-6);
        v.zoom_by(KEY_ZOOM_OUT);
        assert!((v.zoom() - 1.0).abs() < 1e-6);
        for _ in 0..40 {
            v.zoom_by(WHEEL_ZOOM_IN);
        }
        assert_eq!(v.zoom(), ZOOM_MAX);
    }

    #[test]
    fn test_fit_keeps_zoom_value() {
        let mut v = ViewState::default();
        v.set_zoom(2.0);
        v.fit();
        assert!(v.is_fit());
        assert_eq!(v.zoom(), 2.0);
        assert_eq!(v.render_scale(100, 100, 50, 50), Some(0.5));
    }

    #[test]
    fn test_rotate_wraps() {
        let mut v = ViewState::default();
        for _ in 0..4 {
            v.rotate(90);
        }
        assert_eq!(v.rotation(), 0);
        v.rotate(-90);
        assert_eq!(v.rotation(), 270);
        v.rotate(450);
        assert_eq!(v.rotation(), 0);
    }

    #[test]
    fn test_render_scale_fit_uses_tighter_axis() {
        let v = ViewState::default();
        assert_eq!(v.render_scale(400, 200, 200, 200), Some(0.5));
        assert_eq!(v.render_scale(100, 100, 300, 200), Some(2.0));
    }

    #[test]
    fn test_render_scale_fit_has_floor() {
        let v = ViewState::default();
        assert_eq!(v.render_scale(100_000, 10, 100, 100), Some(ZOOM_MIN));
    }

    #[test]
    fn test_render_scale_degenerate_viewport() {
        let v = ViewState::default();
        assert_eq!(v.render_scale(10, 10, 1, 500), None);
        assert_eq!(v.render_scale(10, 10, 500, 0), None);
        assert_eq!(v.render_scale(0, 10, 500, 500), None);
    }

    #[test]
    fn test_render_plan_centers() {
        let v = ViewState::default();
        let plan = v.render_plan(200, 100, 400, 400).unwrap();
        assert_eq!((plan.width, plan.height), (400, 200));
        assert_eq!((plan.x, plan.y), (0, 100));

        let mut v = ViewState::default();
        v.set_zoom(4.0);
        let plan = v.render_plan(100, 100, 200, 100).unwrap();
        assert_eq!((plan.width, plan.height), (400, 400));
        assert_eq!((plan.x, plan.y), (-100, -150));
    }

    #[test]
    fn test_render_plan_never_zero_sized() {
        let mut v = ViewState::default();
        v.set_zoom(ZOOM_MIN);
        let plan = v.render_plan(3, 3, 100, 100).unwrap();
        assert_eq!((plan.width, plan.height), (1, 1));
    }
}
