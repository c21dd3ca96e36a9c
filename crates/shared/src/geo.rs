//! Great-circle distance math.

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Great-circle distance between two coordinates in meters, using the
/// haversine formula.
///
/// Returns ≈0 for identical coordinates. The central-angle term is clamped
/// to `[0, 1]` so near-antipodal pairs stay inside `sqrt`'s domain.
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let delta_phi = (lat2 - lat1).to_radians();
    let delta_lambda = (lon2 - lon1).to_radians();

    let a = (delta_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lambda / 2.0).sin().powi(2);
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_METERS * c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_points_are_zero() {
        assert_eq!(haversine_distance(-23.5505, -46.6333, -23.5505, -46.6333), 0.0);
        assert_eq!(haversine_distance(0.0, 0.0, 0.0, 0.0), 0.0);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let d1 = haversine_distance(-23.5505, -46.6333, -22.9068, -43.1729);
        let d2 = haversine_distance(-22.9068, -43.1729, -23.5505, -46.6333);
        assert_eq!(d1, d2);

        let d3 = haversine_distance(90.0, 0.0, -45.0, 120.0);
        let d4 = haversine_distance(-45.0, 120.0, 90.0, 0.0);
        assert_eq!(d3, d4);
    }

    #[test]
    fn test_known_distance_sao_paulo_rio() {
        // São Paulo to Rio de Janeiro, roughly 360 km.
        let d = haversine_distance(-23.5505, -46.6333, -22.9068, -43.1729);
        assert!((d - 360_000.0).abs() < 5_000.0, "got {d}");
    }

    #[test]
    fn test_one_degree_of_latitude() {
        // One degree of latitude along a meridian is ~111.19 km.
        let d = haversine_distance(10.0, 20.0, 11.0, 20.0);
        assert!((d - 111_195.0).abs() < 10.0, "got {d}");
    }

    #[test]
    fn test_antipodal_points_stay_finite() {
        let d = haversine_distance(0.0, 0.0, 0.0, 180.0);
        assert!(d.is_finite());
        assert!((d - std::f64::consts::PI * EARTH_RADIUS_METERS).abs() < 1.0);
    }

    #[test]
    fn test_near_identical_points_stay_small() {
        let d = haversine_distance(45.0, 45.0, 45.0 + 1e-12, 45.0);
        assert!(d.is_finite());
        assert!(d < 0.001);
    }
}
