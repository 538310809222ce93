//! Ephemeral drag session: exists only while a pointer-down/move sequence is
//! active and is discarded on pointer-up.

use super::projection::{GeoPoint, Orthographic, Rotation};

/// Snapshot taken at drag start. The anchor is the geographic point that was
/// under the pointer, inverse-projected through the rotation captured at the
/// same moment. Every subsequent move is evaluated in that fixed reference
/// frame; re-deriving the anchor against the live rotation would accumulate
/// drift over the session.
#[derive(Clone, Copy, Debug)]
pub struct DragSession {
    start_rotation: Rotation,
    anchor: GeoPoint,
}

impl DragSession {
    /// Begin a session at screen point (x, y). `None` when the pointer is
    /// outside the sphere's silhouette, in which case no drag starts.
    pub fn begin(projection: &Orthographic, x: f64, y: f64) -> Option<Self> {
        let start_rotation = projection.rotation();
        let anchor = projection.invert(x, y)?;
        Some(Self {
            start_rotation,
            anchor,
        })
    }

    pub fn start_rotation(&self) -> Rotation {
        self.start_rotation
    }

    /// Rotation for the current pointer position, or `None` when the pointer
    /// has left the silhouette (callers skip the update for that frame).
    ///
    /// The pointer is inverted through a projection reset to the session's
    /// start rotation, and the new rotation is start + (pointer - anchor) on
    /// the spin and tilt axes. Roll is never altered by dragging.
    pub fn rotation_for(&self, projection: &Orthographic, x: f64, y: f64) -> Option<Rotation> {
        let mut at_start = projection.clone();
        at_start.set_rotation(self.start_rotation);
        let here = at_start.invert(x, y)?;
        Some(Rotation {
            lambda: self.start_rotation.lambda + here.lon - self.anchor.lon,
            phi: self.start_rotation.phi + here.lat - self.anchor.lat,
            gamma: self.start_rotation.gamma,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begin_fails_off_sphere() {
        let p = Orthographic::new(800.0, 600.0, 200.0);
        assert!(DragSession::begin(&p, 0.0, 0.0).is_none());
        assert!(DragSession::begin(&p, 400.0, 300.0).is_some());
    }

    #[test]
    fn move_rotates_by_geographic_delta() {
        let mut p = Orthographic::new(800.0, 600.0, 200.0);
        p.set_rotation(Rotation::new(30.0, -10.0, 0.0));
        let session = DragSession::begin(&p, 400.0, 300.0).unwrap();

        let from = p.invert(400.0, 300.0).unwrap();
        let to = p.invert(450.0, 280.0).unwrap();
        let rot = session.rotation_for(&p, 450.0, 280.0).unwrap();
        assert!((rot.lambda - (30.0 + to.lon - from.lon)).abs() < 1e-9);
        assert!((rot.phi - (-10.0 + to.lat - from.lat)).abs() < 1e-9);
        assert_eq!(rot.gamma, 0.0);
    }

    #[test]
    fn move_off_sphere_yields_no_rotation() {
        let p = Orthographic::new(800.0, 600.0, 200.0);
        let session = DragSession::begin(&p, 400.0, 300.0).unwrap();
        assert!(session.rotation_for(&p, 790.0, 10.0).is_none());
    }

    #[test]
    fn reference_frame_is_the_start_rotation() {
        // Mutating the projection mid-session must not change what a given
        // pointer position resolves to.
        let mut p = Orthographic::new(800.0, 600.0, 200.0);
        let session = DragSession::begin(&p, 380.0, 310.0).unwrap();
        let before = session.rotation_for(&p, 420.0, 290.0).unwrap();
        p.set_rotation(Rotation::new(77.0, 5.0, 0.0));
        let after = session.rotation_for(&p, 420.0, 290.0).unwrap();
        assert_eq!(before, after);
    }
}
