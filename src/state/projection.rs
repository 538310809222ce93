//! Orthographic projection state and spherical geometry helpers.
//!
//! Rotation follows the usual cartographic convention: a spin `lambda`, a
//! tilt `phi` and a roll `gamma`, all in degrees. Forward projection rotates
//! the sphere first (lambda, then the phi/gamma rotation) and then applies
//! the orthographic forward `(cos phi' sin lambda', sin phi')`, scaled and
//! translated into screen space with y pointing down.

/// Angular distance (radians) inside which a point counts as visible.
/// Slightly more than PI/2 so markers right on the horizon do not pop.
pub const VISIBLE_ARC_RAD: f64 = 1.625;

/// Smallest scale `set_scale` will accept; anything at or below zero clamps here.
pub const MIN_SCALE: f64 = 1e-6;

/// A geographic point in degrees. Longitude in [-180, 180], latitude in [-90, 90].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

impl GeoPoint {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

/// Sphere orientation in degrees: spin, tilt, roll.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rotation {
    pub lambda: f64,
    pub phi: f64,
    pub gamma: f64,
}

impl Rotation {
    pub fn new(lambda: f64, phi: f64, gamma: f64) -> Self {
        Self { lambda, phi, gamma }
    }
}

/// Orthographic projection centered on a fixed viewport midpoint.
///
/// The translate is captured once at construction and never recomputed;
/// responsive resize is deliberately out of scope.
#[derive(Clone, Debug)]
pub struct Orthographic {
    rotation: Rotation,
    scale: f64,
    translate: (f64, f64),
}

impl Orthographic {
    pub fn new(width: f64, height: f64, scale: f64) -> Self {
        Self {
            rotation: Rotation::default(),
            scale: scale.max(MIN_SCALE),
            translate: (width / 2.0, height / 2.0),
        }
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Set the rotation, wrapping lambda into [-360, 360] so a long-running
    /// auto-rotation cannot drift out of the precision-safe range. The
    /// projection is 360-periodic in lambda, so wrapping is invisible.
    pub fn set_rotation(&mut self, rotation: Rotation) {
        self.rotation = Rotation {
            lambda: rotation.lambda % 360.0,
            ..rotation
        };
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Scale must stay positive; invalid values clamp instead of applying.
    pub fn set_scale(&mut self, scale: f64) {
        self.scale = scale.max(MIN_SCALE);
    }

    pub fn translate(&self) -> (f64, f64) {
        self.translate
    }

    /// Map a geographic point to screen coordinates. Far-hemisphere points
    /// still produce a coordinate; visibility is a separate test.
    pub fn project(&self, p: GeoPoint) -> (f64, f64) {
        let (lam, phi) = self.rotate_forward(p.lon.to_radians(), p.lat.to_radians());
        let x = phi.cos() * lam.sin();
        let y = phi.sin();
        (
            self.translate.0 + self.scale * x,
            self.translate.1 - self.scale * y,
        )
    }

    /// Inverse of [`project`](Self::project). Returns `None` when the screen
    /// point lies outside the sphere's silhouette, where the orthographic
    /// projection has no inverse.
    pub fn invert(&self, x: f64, y: f64) -> Option<GeoPoint> {
        let px = (x - self.translate.0) / self.scale;
        let py = (self.translate.1 - y) / self.scale;
        let rho = (px * px + py * py).sqrt();
        if rho > 1.0 {
            return None;
        }
        let c = rho.asin();
        let (sin_c, cos_c) = c.sin_cos();
        let (lam, phi) = if rho == 0.0 {
            (0.0, 0.0)
        } else {
            (
                (px * sin_c).atan2(rho * cos_c),
                (py * sin_c / rho).asin(),
            )
        };
        let (lon, lat) = self.rotate_inverse(lam, phi);
        Some(GeoPoint::new(lon.to_degrees(), lat.to_degrees()))
    }

    /// The geographic point currently at the viewport midpoint. Always
    /// defined: the midpoint sits at the exact center of the silhouette.
    pub fn center(&self) -> GeoPoint {
        let (lon, lat) = self.rotate_inverse(0.0, 0.0);
        GeoPoint::new(lon.to_degrees(), lat.to_degrees())
    }

    /// Apply the rotation to a (lon, lat) pair in radians.
    fn rotate_forward(&self, lon: f64, lat: f64) -> (f64, f64) {
        let d_lambda = self.rotation.lambda.to_radians();
        let (sin_dphi, cos_dphi) = self.rotation.phi.to_radians().sin_cos();
        let (sin_dgamma, cos_dgamma) = self.rotation.gamma.to_radians().sin_cos();

        let lam = wrap_radians(lon + d_lambda);
        let cos_phi = lat.cos();
        let x = lam.cos() * cos_phi;
        let y = lam.sin() * cos_phi;
        let z = lat.sin();
        let k = z * cos_dphi + x * sin_dphi;
        (
            (y * cos_dgamma - k * sin_dgamma).atan2(x * cos_dphi - z * sin_dphi),
            (k * cos_dgamma + y * sin_dgamma).asin(),
        )
    }

    /// Inverse of [`rotate_forward`](Self::rotate_forward), radians in and out.
    fn rotate_inverse(&self, lon: f64, lat: f64) -> (f64, f64) {
        let d_lambda = self.rotation.lambda.to_radians();
        let (sin_dphi, cos_dphi) = self.rotation.phi.to_radians().sin_cos();
        let (sin_dgamma, cos_dgamma) = self.rotation.gamma.to_radians().sin_cos();

        let cos_phi = lat.cos();
        let x = lon.cos() * cos_phi;
        let y = lon.sin() * cos_phi;
        let z = lat.sin();
        let k = z * cos_dgamma - y * sin_dgamma;
        let lam = (y * cos_dgamma + z * sin_dgamma).atan2(x * cos_dphi + k * sin_dphi);
        let phi = (k * cos_dphi - x * sin_dphi).asin();
        (wrap_radians(lam - d_lambda), phi)
    }
}

/// Great-circle (angular) distance between two points, in radians.
pub fn angular_distance(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let d_lat = lat2 - lat1;
    let d_lon = (b.lon - a.lon).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * h.sqrt().min(1.0).asin()
}

/// Whether `point` lies on the near hemisphere relative to the view center.
pub fn is_visible(point: GeoPoint, center: GeoPoint) -> bool {
    angular_distance(point, center) <= VISIBLE_ARC_RAD
}

fn wrap_radians(lam: f64) -> f64 {
    use std::f64::consts::PI;
    let mut l = lam;
    while l > PI {
        l -= 2.0 * PI;
    }
    while l < -PI {
        l += 2.0 * PI;
    }
    l
}
