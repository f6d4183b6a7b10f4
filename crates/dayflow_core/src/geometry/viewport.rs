//! Canvas pan/zoom transform.
//!
//! # Responsibility
//! - Map wheel input and zoom controls to a new `(zoom, pan)` pair.
//! - Convert between screen and world coordinates.
//!
//! # Invariants
//! - `zoom` stays within `[zoom_min, zoom_max]`.
//! - Screen = world × zoom + pan; rotation is never applied.
//! - Cursor-centered zoom keeps the world point under the cursor fixed.

use crate::config::ViewportConfig;
use kurbo::{Affine, Point, Vec2};
use serde::{Deserialize, Serialize};

/// Canvas rendering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    /// Vertical flow list.
    #[default]
    Flow,
    /// Serpentine map.
    Map,
}

/// Pan/zoom state of the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    zoom: f64,
    pan: Vec2,
    limits: ViewportConfig,
}

impl Viewport {
    /// Identity transform with the given limits.
    pub fn new(limits: ViewportConfig) -> Self {
        Self {
            zoom: 1.0,
            pan: Vec2::ZERO,
            limits,
        }
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn pan(&self) -> Vec2 {
        self.pan
    }

    /// Sets pan directly, e.g. while drag-panning.
    pub fn set_pan(&mut self, pan: Vec2) {
        self.pan = pan;
    }

    /// World-to-screen transform.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.pan) * Affine::scale(self.zoom)
    }

    pub fn world_to_screen(&self, world: Point) -> Point {
        self.transform() * world
    }

    pub fn screen_to_world(&self, screen: Point) -> Point {
        Point::new(
            (screen.x - self.pan.x) / self.zoom,
            (screen.y - self.pan.y) / self.zoom,
        )
    }

    /// Applies one wheel event at `screen` with wheel `delta`.
    ///
    /// Without the zoom modifier the canvas pans 1:1 against the delta.
    /// With it, zoom changes by `-delta.y × sensitivity` around `screen`.
    pub fn wheel(&mut self, screen: Point, delta: Vec2, zoom_modifier: bool) {
        if !zoom_modifier {
            self.pan -= delta;
            return;
        }
        let next = self.zoom - delta.y * self.limits.wheel_zoom_sensitivity;
        self.zoom_around(screen, next);
    }

    /// Sets zoom to `zoom` (clamped) keeping the world point under `screen` fixed.
    pub fn zoom_around(&mut self, screen: Point, zoom: f64) {
        let world = self.screen_to_world(screen);
        self.zoom = self.clamp_zoom(zoom);
        self.pan = screen.to_vec2() - world.to_vec2() * self.zoom;
    }

    /// Steps zoom up without recentering.
    pub fn zoom_in(&mut self) {
        self.zoom = self.clamp_zoom(self.zoom + self.limits.zoom_step);
    }

    /// Steps zoom down without recentering.
    pub fn zoom_out(&mut self) {
        self.zoom = self.clamp_zoom(self.zoom - self.limits.zoom_step);
    }

    /// Restores zoom 1 and pan at the origin.
    pub fn reset(&mut self) {
        self.zoom = 1.0;
        self.pan = Vec2::ZERO;
    }

    fn clamp_zoom(&self, zoom: f64) -> f64 {
        zoom.clamp(self.limits.zoom_min, self.limits.zoom_max)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(ViewportConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::Viewport;
    use crate::config::ViewportConfig;
    use kurbo::{Point, Vec2};

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn plain_wheel_pans_one_to_one() {
        let mut view = Viewport::default();
        view.wheel(Point::new(50.0, 50.0), Vec2::new(10.0, -25.0), false);
        assert_eq!(view.pan(), Vec2::new(-10.0, 25.0));
        assert_eq!(view.zoom(), 1.0);
    }

    #[test]
    fn modifier_wheel_zooms_around_cursor() {
        let mut view = Viewport::default();
        let cursor = Point::new(100.0, 100.0);
        view.wheel(cursor, Vec2::new(0.0, -500.0), true);
        assert!(close(view.zoom(), 1.5));
        let back = view.world_to_screen(Point::new(100.0, 100.0));
        assert!(close(back.x, 100.0) && close(back.y, 100.0), "got {back:?}");
        assert!(close(view.pan().x, -50.0) && close(view.pan().y, -50.0));
    }

    #[test]
    fn zoom_is_clamped_and_steps_do_not_recenter() {
        let limits = ViewportConfig::default();
        let mut view = Viewport::new(limits);
        view.set_pan(Vec2::new(30.0, 40.0));
        view.wheel(Point::ORIGIN, Vec2::new(0.0, -1e6), true);
        assert_eq!(view.zoom(), limits.zoom_max);
        view.zoom_out();
        assert!(close(view.zoom(), limits.zoom_max - limits.zoom_step));

        let mut view = Viewport::new(limits);
        view.set_pan(Vec2::new(30.0, 40.0));
        view.zoom_in();
        assert!(close(view.zoom(), 1.0 + limits.zoom_step));
        assert_eq!(view.pan(), Vec2::new(30.0, 40.0));
        for _ in 0..100 {
            view.zoom_out();
        }
        assert_eq!(view.zoom(), limits.zoom_min);
    }

    #[test]
    fn screen_world_round_trip_and_reset() {
        let mut view = Viewport::default();
        view.zoom_around(Point::new(10.0, 20.0), 2.0);
        view.set_pan(view.pan() + Vec2::new(5.0, -5.0));
        let world = Point::new(-3.0, 7.5);
        let back = view.screen_to_world(view.world_to_screen(world));
        assert!(close(back.x, world.x) && close(back.y, world.y));

        view.reset();
        assert_eq!(view.zoom(), 1.0);
        assert_eq!(view.pan(), Vec2::ZERO);
    }
}
