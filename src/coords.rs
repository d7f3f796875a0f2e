//! Spherical and Cartesian coordinates on the unit sphere.
//!
//! Longitude runs over [0, 360) degrees. Latitude is the polar angle in
//! [0, 180] degrees measured from the north pole, so 90 is the equator.

use glam::DVec3;
use serde::{Deserialize, Serialize};

/// A point on the sphere in degrees.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Spherical {
    pub lon: f64,
    pub lat: f64,
}

impl Spherical {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Unit vector `(cos lon · sin lat, sin lon · sin lat, cos lat)`.
    pub fn to_unit(self) -> DVec3 {
        let (sin_lon, cos_lon) = self.lon.to_radians().sin_cos();
        let (sin_lat, cos_lat) = self.lat.to_radians().sin_cos();
        DVec3::new(cos_lon * sin_lat, sin_lon * sin_lat, cos_lat)
    }

    /// Inverse of [`Spherical::to_unit`]. The input need not be normalized.
    /// Longitude at the poles is reported as 0.
    pub fn from_vec(v: DVec3) -> Self {
        let r = v.length();
        if r == 0.0 {
            return Self::new(0.0, 90.0);
        }
        let lat = (v.z / r).clamp(-1.0, 1.0).acos().to_degrees();
        let lon = if v.x == 0.0 && v.y == 0.0 {
            0.0
        } else {
            normalize_lon(v.y.atan2(v.x).to_degrees())
        };
        Self::new(lon, lat)
    }

    /// Geographic latitude in degrees: +90 at the north pole, -90 at the south.
    pub fn geographic_lat(&self) -> f64 {
        90.0 - self.lat
    }
}

/// Wrap a longitude into [0, 360).
pub fn normalize_lon(lon: f64) -> f64 {
    let l = lon.rem_euclid(360.0);
    if l >= 360.0 {
        0.0
    } else {
        l
    }
}

/// Signed longitude difference `to - from` wrapped into (-180, 180].
/// Positive means `to` lies east of `from`.
pub fn lon_delta(from: f64, to: f64) -> f64 {
    let d = (to - from).rem_euclid(360.0);
    if d > 180.0 {
        d - 360.0
    } else {
        d
    }
}

/// Great-circle angle in radians between two unit vectors.
pub fn angular_distance(a: DVec3, b: DVec3) -> f64 {
    a.dot(b).clamp(-1.0, 1.0).acos()
}

/// Longitude stretch factor `1 / sin(lat)` for a polar angle in degrees.
/// Infinite at the poles.
pub fn lon_scale(lat: f64) -> f64 {
    1.0 / lat.to_radians().sin()
}
