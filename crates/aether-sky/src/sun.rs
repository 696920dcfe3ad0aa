//! Sun direction from horizontal coordinates.

use glam::Vec3;

/// Unit vector towards the sun for `elevation_deg` above the horizon and
/// `azimuth_deg` around +Y, measured from +Z towards +X.
pub fn sun_direction(elevation_deg: f32, azimuth_deg: f32) -> Vec3 {
    let phi = (90.0 - elevation_deg).to_radians();
    let theta = azimuth_deg.to_radians();
    Vec3::new(phi.sin() * theta.sin(), phi.cos(), phi.sin() * theta.cos())
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-6;

    #[test]
    fn test_zenith_ignores_azimuth() {
        for azimuth in [-180.0, -45.0, 0.0, 90.0, 180.0] {
            let d = sun_direction(90.0, azimuth);
            assert!((d - Vec3::Y).length() < EPS, "azimuth {azimuth}: {d:?}");
        }
    }

    #[test]
    fn test_horizon_has_no_vertical_component() {
        let d = sun_direction(0.0, 0.0);
        assert!(d.y.abs() < EPS);
        assert!((d - Vec3::Z).length() < EPS);
    }

    #[test]
    fn test_azimuth_turns_towards_x() {
        let d = sun_direction(0.0, 90.0);
        assert!((d - Vec3::X).length() < EPS, "{d:?}");
    }

    #[test]
    fn test_always_unit_length() {
        for elevation in [-30.0, 0.0, 12.5, 45.0, 89.0, 120.0] {
            for azimuth in [-180.0, -90.0, 33.0, 180.0] {
                let d = sun_direction(elevation, azimuth);
                assert!((d.length() - 1.0).abs() < 1e-5);
            }
        }
    }

    #[test]
    fn test_default_sun_is_above_horizon_behind_origin() {
        let d = sun_direction(45.0, 180.0);
        assert!(d.y > 0.0);
        assert!((d.y - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-5);
        assert!(d.z < 0.0);
    }
}
