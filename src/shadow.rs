use geo::{MultiPolygon, Polygon};
use thiserror::Error;
use crate::config::ProjectionParameters;
use crate::geometry;
use crate::solar_position::SunPosition;

/// Ground footprint shaded by one obstruction at one sun position
#[derive(Clone, Debug)]
pub struct ShadowPolygon {
    footprint: MultiPolygon<f64>,
}

impl ShadowPolygon {
    pub fn footprint(&self) -> &MultiPolygon<f64> {
        &self.footprint
    }

    pub fn area(&self) -> f64 {
        use geo::Area;
        self.footprint.unsigned_area()
    }
}

/// Projects obstruction footprints into 2D shadows
///
/// The shaded footprint is the union of the obstruction base and a copy of it translated by the
/// shadow vector. This does not sweep the full shadow volume, so shading from long, thin
/// obstructions is underestimated when the shadow is longer than the footprint.
#[derive(Clone, Debug, PartialEq)]
pub struct ShadowProjector {
    cutoff_tan: f64,
    cutoff_margin: f64,
}

impl Default for ShadowProjector {
    fn default() -> Self {
        ShadowProjector::new(&ProjectionParameters::default())
    }
}

impl ShadowProjector {
    /// Returns a new projector
    ///
    /// # Arguments
    ///
    /// * 'params' - projection parameters from configuration
    pub fn new(params: &ProjectionParameters) -> ShadowProjector {
        ShadowProjector {
            cutoff_tan: params.cutoff_elevation_deg.clamp(0.1, 89.0).to_radians().tan(),
            cutoff_margin: params.cutoff_margin.max(1.0),
        }
    }

    /// Distance beyond which an obstruction of the given height is ignored, i.e. its shadow
    /// length at the cutoff elevation plus a margin
    ///
    /// # Arguments
    ///
    /// * 'height_m' - obstruction height
    pub fn max_reach(&self, height_m: f64) -> f64 {
        height_m / self.cutoff_tan * self.cutoff_margin
    }

    /// Whether an obstruction is close enough to a roof to be projected at all
    ///
    /// # Arguments
    ///
    /// * 'roof' - roof polygon
    /// * 'obstruction' - obstruction base polygon
    /// * 'height_m' - obstruction height
    pub fn within_reach(&self, roof: &Polygon<f64>, obstruction: &Polygon<f64>, height_m: f64) -> bool {
        geometry::distance(roof, obstruction) <= self.max_reach(height_m)
    }

    /// Projects the shadow of an obstruction. Returns None when the sun is at or below the
    /// horizon.
    ///
    /// # Arguments
    ///
    /// * 'obstruction' - obstruction base polygon
    /// * 'height_m' - obstruction height
    /// * 'sun' - sun position
    pub fn project(&self, obstruction: &Polygon<f64>, height_m: f64, sun: &SunPosition) -> Result<Option<ShadowPolygon>, ProjectionError> {
        if !sun.is_up() {
            return Ok(None);
        }

        let (dx, dy) = shadow_offset(height_m, sun);
        if !dx.is_finite() || !dy.is_finite() {
            return Err(ProjectionError::NonFiniteOffset(format!(
                "height {} at azimuth {} elevation {}", height_m, sun.azimuth_deg, sun.elevation_deg)));
        }

        let base = MultiPolygon::new(vec![obstruction.clone()]);
        let moved = MultiPolygon::new(vec![geometry::translate(obstruction, dx, dy)]);
        let footprint = geometry::union_all([&base, &moved]);
        if footprint.0.is_empty() {
            return Err(ProjectionError::EmptyFootprint);
        }

        Ok(Some(ShadowPolygon { footprint }))
    }
}

/// Horizontal offset (dx east, dy north) of the shadow tip for an object of the given height.
/// The shadow points away from the sun, i.e. towards azimuth + 180.
///
/// # Arguments
///
/// * 'height_m' - object height
/// * 'sun' - sun position, expected above the horizon
pub fn shadow_offset(height_m: f64, sun: &SunPosition) -> (f64, f64) {
    let length = height_m / sun.elevation_deg.to_radians().tan();
    let direction = (sun.azimuth_deg + 180.0).rem_euclid(360.0).to_radians();

    (length * direction.sin(), length * direction.cos())
}

/// Percentage (0 to 100) of a roof polygon covered by the union of the given shadows.
/// Returns 0 when there are no shadows or the roof has no area.
///
/// # Arguments
///
/// * 'roof' - roof polygon
/// * 'shadows' - shadows cast at the same moment
pub fn shaded_fraction(roof: &Polygon<f64>, shadows: &[ShadowPolygon]) -> f64 {
    if shadows.is_empty() {
        return 0.0;
    }
    let roof_area = geometry::area(roof);
    if roof_area <= 0.0 {
        return 0.0;
    }

    let combined = geometry::union_all(shadows.iter().map(|s| &s.footprint));
    let pct = geometry::covered_area(roof, &combined) / roof_area * 100.0;

    if pct.is_finite() { pct.clamp(0.0, 100.0) } else { 0.0 }
}

/// Error depicting a failed shadow projection for a single obstruction
///
#[derive(Debug, Error)]
pub enum ProjectionError {
    #[error("NonFiniteOffset: {0}")]
    NonFiniteOffset(String),
    #[error("EmptyFootprint")]
    EmptyFootprint,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::polygon_from_vertices;

    fn square(x0: f64, y0: f64, size: f64) -> Polygon<f64> {
        polygon_from_vertices(&[(x0, y0), (x0 + size, y0), (x0 + size, y0 + size), (x0, y0 + size)]).unwrap()
    }

    #[test]
    fn no_shadow_at_night() {
        let sun = SunPosition { azimuth_deg: 180.0, elevation_deg: 0.0 };
        assert!(ShadowProjector::default().project(&square(0.0, 0.0, 1.0), 5.0, &sun).unwrap().is_none());
    }

    #[test]
    fn sun_in_the_south_casts_shadow_north() {
        let sun = SunPosition { azimuth_deg: 180.0, elevation_deg: 45.0 };
        let (dx, dy) = shadow_offset(10.0, &sun);
        assert!(dx.abs() < 1e-9);
        assert!((dy - 10.0).abs() < 1e-9);
    }

    #[test]
    fn sun_in_the_east_casts_shadow_west() {
        let sun = SunPosition { azimuth_deg: 90.0, elevation_deg: 45.0 };
        let (dx, dy) = shadow_offset(4.0, &sun);
        assert!((dx + 4.0).abs() < 1e-9);
        assert!(dy.abs() < 1e-9);
    }

    #[test]
    fn footprint_is_union_of_base_and_translated_copy() {
        // 2 m square, 1 m tall, 45 deg sun: copy moved 1 m north overlaps the base by half
        let sun = SunPosition { azimuth_deg: 180.0, elevation_deg: 45.0 };
        let shadow = ShadowProjector::default().project(&square(0.0, 0.0, 2.0), 1.0, &sun).unwrap().unwrap();
        assert!((shadow.area() - 6.0).abs() < 1e-6);
    }

    #[test]
    fn shaded_fraction_of_partially_covered_roof() {
        let roof = square(0.0, 0.0, 10.0);
        let sun = SunPosition { azimuth_deg: 180.0, elevation_deg: 45.0 };
        // Obstruction south of the roof; its shadow reaches 5 m onto the roof
        let shadow = ShadowProjector::default().project(&square(0.0, -10.0, 10.0), 15.0, &sun).unwrap().unwrap();
        let pct = shaded_fraction(&roof, &[shadow]);
        assert!((pct - 50.0).abs() < 1e-6, "got {}", pct);
    }

    #[test]
    fn overlapping_shadows_are_not_double_counted() {
        let roof = square(0.0, 0.0, 10.0);
        let sun = SunPosition { azimuth_deg: 180.0, elevation_deg: 60.0 };
        let projector = ShadowProjector::default();
        let a = projector.project(&square(-5.0, -5.0, 20.0), 10.0, &sun).unwrap().unwrap();
        let b = projector.project(&square(-6.0, -6.0, 22.0), 10.0, &sun).unwrap().unwrap();
        assert!((shaded_fraction(&roof, &[a.clone(), b]) - 100.0).abs() < 1e-6);
        assert_eq!(shaded_fraction(&roof, &[]), 0.0);
        assert!(shaded_fraction(&roof, &[a]) <= 100.0);
    }

    #[test]
    fn reach_follows_height_and_cutoff() {
        let projector = ShadowProjector::default();
        let expected = 10.0 / 5f64.to_radians().tan() * 1.2;
        assert!((projector.max_reach(10.0) - expected).abs() < 1e-9);
        let roof = square(0.0, 0.0, 10.0);
        assert!(projector.within_reach(&roof, &square(100.0, 0.0, 2.0), 10.0));
        assert!(!projector.within_reach(&roof, &square(500.0, 0.0, 2.0), 10.0));
    }
}
