//! The globe engine: a single object owning the projection, the drag
//! session, the auto-rotation clock and the data sets. All event data
//! (pointer coordinates, gesture factors, timestamps) arrives as explicit
//! parameters, which keeps the engine free of browser globals and testable
//! on the host.

use crate::model::Location;

use super::drag::DragSession;
use super::projection::{GeoPoint, Orthographic, Rotation, is_visible};
use super::rotation::{AutoRotate, RotationPolicy};

/// How marker radii respond to zoom.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum MarkerSizing {
    /// Constant pixel radius regardless of zoom.
    #[default]
    Fixed,
    /// Radius grows with the zoom factor: `base * k`.
    ScaleWithZoom,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlobeConfig {
    pub rotation_policy: RotationPolicy,
    pub marker_sizing: MarkerSizing,
    /// Marker radius in pixels at zoom factor 1.
    pub base_marker_radius: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Sphere radius in pixels at zoom factor 1. Derived from the viewport
    /// when absent.
    pub initial_scale: Option<f64>,
    /// Tilt/roll applied once at startup; dragging only ever touches the
    /// spin and tilt axes from there.
    pub initial_rotation: Rotation,
}

impl Default for GlobeConfig {
    fn default() -> Self {
        Self {
            rotation_policy: RotationPolicy::default(),
            marker_sizing: MarkerSizing::default(),
            base_marker_radius: 6.0,
            min_zoom: 0.2,
            max_zoom: 5.0,
            initial_scale: None,
            initial_rotation: Rotation::default(),
        }
    }
}

/// One marker, ready to paint. Invisible markers stay in the draw set with
/// their paint suppressed so list order keeps mapping 1:1 onto locations.
#[derive(Clone, Copy, Debug)]
pub struct Marker {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub visible: bool,
}

/// What an animation tick asks of the caller.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TickEffect {
    pub advanced: bool,
    pub hide_banner: bool,
}

pub struct GlobeEngine {
    config: GlobeConfig,
    projection: Orthographic,
    initial_scale: f64,
    zoom: f64,
    driver: AutoRotate,
    drag: Option<DragSession>,
    pressed: bool,
    locations: Vec<Location>,
    landmasses: Vec<Vec<GeoPoint>>,
}

impl GlobeEngine {
    pub fn new(width: f64, height: f64, config: GlobeConfig, now_ms: f64) -> Self {
        let initial_scale = config
            .initial_scale
            .unwrap_or_else(|| 0.45 * width.min(height));
        let mut projection = Orthographic::new(width, height, initial_scale);
        projection.set_rotation(config.initial_rotation);
        Self {
            projection,
            initial_scale,
            zoom: 1.0,
            driver: AutoRotate::new(config.rotation_policy, now_ms),
            drag: None,
            pressed: false,
            locations: Vec::new(),
            landmasses: Vec::new(),
            config,
        }
    }

    pub fn projection(&self) -> &Orthographic {
        &self.projection
    }

    pub fn initial_scale(&self) -> f64 {
        self.initial_scale
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Radius shared by the sphere silhouette and every decorative layer.
    /// All layers read this one value, so they cannot desynchronize.
    pub fn layer_radius(&self) -> f64 {
        self.projection.scale()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// The feed resolves once; locations are appended, never edited.
    pub fn set_locations(&mut self, locations: Vec<Location>) {
        self.locations = locations;
    }

    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    pub fn set_landmasses(&mut self, outlines: Vec<Vec<GeoPoint>>) {
        self.landmasses = outlines;
    }

    pub fn landmasses(&self) -> &[Vec<GeoPoint>] {
        &self.landmasses
    }

    /// Pointer-down. Replaces any stale session and suspends the idle-aware
    /// spin for the whole drag. Returns false when the pointer is outside
    /// the silhouette (no session starts, but auto-rotation still pauses
    /// until the matching `end_drag`).
    pub fn begin_drag(&mut self, x: f64, y: f64) -> bool {
        self.driver.stop();
        self.pressed = true;
        self.drag = DragSession::begin(&self.projection, x, y);
        self.drag.is_some()
    }

    /// Pointer-move during a drag. Returns false (and leaves the rotation
    /// untouched) when no session is active or the pointer has left the
    /// sphere's silhouette.
    pub fn drag_to(&mut self, x: f64, y: f64) -> bool {
        let Some(session) = self.drag else {
            return false;
        };
        match session.rotation_for(&self.projection, x, y) {
            Some(rotation) => {
                self.projection.set_rotation(rotation);
                true
            }
            None => false,
        }
    }

    /// Pointer-up: discard the session and resume auto-rotation with a fresh
    /// elapsed baseline. A press that never produced a session (pointer-down
    /// off the silhouette) still counts; a pointer-up with no prior press is
    /// ignored so unrelated mouseups do not re-baseline the spin.
    pub fn end_drag(&mut self, now_ms: f64) {
        if !self.pressed {
            return;
        }
        self.pressed = false;
        self.drag = None;
        self.driver.restart(now_ms);
    }

    /// Apply a cumulative zoom factor. Out-of-range or non-finite factors
    /// clamp instead of applying; the scale can never reach zero.
    pub fn set_zoom(&mut self, k: f64) {
        let k = if k.is_finite() { k } else { 1.0 };
        self.zoom = k.clamp(self.config.min_zoom, self.config.max_zoom);
        self.projection.set_scale(self.initial_scale * self.zoom);
    }

    /// One animation frame. Advances the spin per the configured policy and
    /// reports whether anything moved and whether the intro banner should be
    /// hidden now.
    pub fn tick(&mut self, now_ms: f64) -> TickEffect {
        let adv = self.driver.tick(now_ms, self.projection.scale());
        if adv.delta_lambda != 0.0 {
            let mut rotation = self.projection.rotation();
            rotation.lambda += adv.delta_lambda;
            self.projection.set_rotation(rotation);
        }
        TickEffect {
            advanced: adv.delta_lambda != 0.0,
            hide_banner: adv.hide_banner,
        }
    }

    /// Recompute screen position, radius and visibility for every location.
    pub fn markers(&self) -> Vec<Marker> {
        let center = self.projection.center();
        let radius = match self.config.marker_sizing {
            MarkerSizing::Fixed => self.config.base_marker_radius,
            MarkerSizing::ScaleWithZoom => self.config.base_marker_radius * self.zoom,
        };
        self.locations
            .iter()
            .map(|loc| {
                let (x, y) = self.projection.project(loc.point);
                Marker {
                    x,
                    y,
                    radius,
                    visible: is_visible(loc.point, center),
                }
            })
            .collect()
    }

    /// Topmost visible marker under the pointer, for hover/click captions.
    pub fn hit_test(&self, x: f64, y: f64) -> Option<&Location> {
        self.markers()
            .iter()
            .zip(self.locations.iter())
            .rev()
            .find(|(m, _)| {
                m.visible && (x - m.x).powi(2) + (y - m.y).powi(2) <= m.radius * m.radius
            })
            .map(|(_, loc)| loc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::projection::GeoPoint;

    fn engine() -> GlobeEngine {
        let config = GlobeConfig {
            initial_scale: Some(300.0),
            ..GlobeConfig::default()
        };
        GlobeEngine::new(800.0, 600.0, config, 0.0)
    }

    fn loc(name: &str, lon: f64, lat: f64) -> Location {
        Location {
            name: name.to_string(),
            point: GeoPoint::new(lon, lat),
        }
    }

    #[test]
    fn zoom_scales_sphere_and_layers_together() {
        let mut e = engine();
        assert_eq!(e.layer_radius(), 300.0);
        e.set_zoom(2.0);
        assert_eq!(e.projection().scale(), 600.0);
        assert_eq!(e.layer_radius(), 600.0);
        e.set_zoom(0.5);
        assert!(e.layer_radius() < 600.0);
    }

    #[test]
    fn zoom_clamps_out_of_range_factors() {
        let mut e = engine();
        e.set_zoom(50.0);
        assert_eq!(e.zoom(), 5.0);
        e.set_zoom(-3.0);
        assert_eq!(e.zoom(), 0.2);
        assert!(e.layer_radius() > 0.0);
        e.set_zoom(f64::NAN);
        assert_eq!(e.zoom(), 1.0);
    }

    #[test]
    fn drag_rotates_by_anchor_delta_at_start_rotation() {
        let mut e = engine();
        let from = e.projection().invert(400.0, 300.0).unwrap();
        let to = e.projection().invert(470.0, 260.0).unwrap();
        assert!(e.begin_drag(400.0, 300.0));
        assert!(e.drag_to(470.0, 260.0));
        let rot = e.projection().rotation();
        assert!((rot.lambda - (to.lon - from.lon)).abs() < 1e-9);
        assert!((rot.phi - (to.lat - from.lat)).abs() < 1e-9);
        assert_eq!(rot.gamma, 0.0);
    }

    #[test]
    fn drag_replay_is_deterministic() {
        let run = || {
            let mut e = engine();
            e.begin_drag(350.0, 320.0);
            for step in 0..20 {
                e.drag_to(350.0 + 4.0 * step as f64, 320.0 - 2.0 * step as f64);
            }
            e.end_drag(1234.0);
            e.projection().rotation()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn pointer_off_sphere_means_no_movement_that_frame() {
        let mut e = engine();
        e.begin_drag(400.0, 300.0);
        e.drag_to(430.0, 300.0);
        let before = e.projection().rotation();
        assert!(!e.drag_to(795.0, 5.0));
        assert_eq!(e.projection().rotation(), before);
        // Back inside the silhouette the session is still live.
        assert!(e.drag_to(440.0, 300.0));
    }

    #[test]
    fn idle_spin_is_suspended_for_the_whole_drag() {
        let mut e = engine();
        e.begin_drag(400.0, 300.0);
        let before = e.projection().rotation();
        assert_eq!(e.tick(100.0), TickEffect::default());
        assert_eq!(e.projection().rotation(), before);
        e.end_drag(500.0);
        let effect = e.tick(540.0);
        assert!(effect.advanced);
        assert!(e.projection().rotation().lambda > before.lambda);
    }

    #[test]
    fn spin_resumes_after_press_off_the_silhouette() {
        let mut e = engine();
        // Pointer-down in a corner: no session, but the spin still pauses.
        assert!(!e.begin_drag(5.0, 5.0));
        assert!(!e.is_dragging());
        assert_eq!(e.tick(50.0), TickEffect::default());
        // The matching pointer-up re-baselines the idle window as usual.
        e.end_drag(100.0);
        assert!(e.tick(200.0).advanced);
    }

    #[test]
    fn pointer_up_without_a_press_leaves_the_spin_alone() {
        let mut e = engine();
        e.tick(3500.0);
        assert!(!e.tick(4000.0).advanced);
        // A stray mouseup (press started off the canvas) is not an
        // interaction and must not reopen the idle window.
        e.end_drag(4100.0);
        assert!(!e.tick(4200.0).advanced);
    }

    #[test]
    fn always_on_spin_free_runs_during_drag() {
        let config = GlobeConfig {
            rotation_policy: RotationPolicy::AlwaysOn { deg_per_ms: 0.01 },
            initial_scale: Some(300.0),
            ..GlobeConfig::default()
        };
        let mut e = GlobeEngine::new(800.0, 600.0, config, 0.0);
        e.begin_drag(400.0, 300.0);
        assert!(e.tick(16.0).advanced);
    }

    #[test]
    fn banner_hide_surfaces_through_tick() {
        let mut e = engine();
        assert!(e.tick(3500.0).hide_banner);
        assert!(!e.tick(3600.0).hide_banner);
    }

    #[test]
    fn markers_track_visibility_across_rotation() {
        let mut e = engine();
        e.set_locations(vec![loc("Origin", 0.0, 0.0)]);
        assert!(e.markers()[0].visible);

        // Same marker viewed from the antipode stays in the draw set but
        // loses its paint.
        let config = GlobeConfig {
            initial_scale: Some(300.0),
            initial_rotation: crate::state::projection::Rotation::new(180.0, 0.0, 0.0),
            ..GlobeConfig::default()
        };
        let mut far = GlobeEngine::new(800.0, 600.0, config, 0.0);
        far.set_locations(vec![loc("Origin", 0.0, 0.0)]);
        let markers = far.markers();
        assert_eq!(markers.len(), 1);
        assert!(!markers[0].visible);
    }

    #[test]
    fn marker_radius_follows_sizing_mode() {
        let mut e = engine();
        e.set_locations(vec![loc("A", 10.0, 10.0)]);
        e.set_zoom(2.0);
        assert_eq!(e.markers()[0].radius, 6.0);

        let config = GlobeConfig {
            marker_sizing: MarkerSizing::ScaleWithZoom,
            initial_scale: Some(300.0),
            ..GlobeConfig::default()
        };
        let mut scaled = GlobeEngine::new(800.0, 600.0, config, 0.0);
        scaled.set_locations(vec![loc("A", 10.0, 10.0)]);
        scaled.set_zoom(2.0);
        assert_eq!(scaled.markers()[0].radius, 12.0);
    }

    #[test]
    fn hit_test_finds_visible_markers_only() {
        let mut e = engine();
        e.set_locations(vec![loc("Center", 0.0, 0.0), loc("Far side", 180.0, 0.0)]);
        let hit = e.hit_test(400.0, 300.0).expect("center marker under pointer");
        assert_eq!(hit.name, "Center");
        assert!(e.hit_test(100.0, 100.0).is_none());
    }
}
