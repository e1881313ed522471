use geo::Polygon;
use serde::{Deserialize, Serialize};
use crate::errors::{ConfigurationError, ModelError};
use crate::geometry::polygon_from_vertices;

/// A roof surface that may carry solar panels
///
/// Polygon vertices are given in a projected, metre-scale coordinate system where +y is north
/// and +x is east. Values are validated once at construction and are immutable afterwards.
#[derive(Clone, Debug)]
pub struct RoofPlane {
    id: String,
    name: String,
    polygon: Polygon<f64>,
    tilt_deg: f64,
    azimuth_deg: f64,
}

/// An object able to cast shadows on roof planes, e.g. a tree, a chimney or a neighbouring house
#[derive(Clone, Debug)]
pub struct Obstruction {
    id: String,
    kind: String,
    polygon: Polygon<f64>,
    height_m: f64,
}

/// Roof plane as it arrives from the geometry editor, before validation
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct PlaneRecord {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub polygon: Vec<(f64, f64)>,
    #[serde(default = "default_tilt")]
    pub tilt_deg: f64,
    #[serde(default = "default_azimuth")]
    pub azimuth_deg: f64,
}

/// Obstruction as it arrives from the geometry editor, before validation
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ObstructionRecord {
    pub id: String,
    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,
    pub polygon: Vec<(f64, f64)>,
    #[serde(default = "default_height")]
    pub height_m: f64,
}

/// Content of a geometry input file
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct GeometryInput {
    #[serde(default)]
    pub roof_planes: Vec<PlaneRecord>,
    #[serde(default)]
    pub obstructions: Vec<ObstructionRecord>,
}

fn default_tilt() -> f64 { 20.0 }
fn default_azimuth() -> f64 { 180.0 }
fn default_kind() -> String { "unknown".to_string() }
fn default_height() -> f64 { 3.0 }

impl RoofPlane {
    /// Returns a validated roof plane
    ///
    /// # Arguments
    ///
    /// * 'id' - identifier of the plane
    /// * 'name' - display name
    /// * 'vertices' - footprint ring, at least 3 distinct vertices, not self-intersecting
    /// * 'tilt_deg' - panel tilt from horizontal, 0 to 90 degrees
    /// * 'azimuth_deg' - compass direction the plane faces, 0 (inclusive) to 360 (exclusive)
    pub fn new(id: &str, name: &str, vertices: &[(f64, f64)], tilt_deg: f64, azimuth_deg: f64) -> Result<RoofPlane, ModelError> {
        if !(0.0..=90.0).contains(&tilt_deg) {
            return Err(ConfigurationError(format!("tilt {} of plane {} outside [0, 90]", tilt_deg, id)))?;
        }
        if !(0.0..360.0).contains(&azimuth_deg) {
            return Err(ConfigurationError(format!("azimuth {} of plane {} outside [0, 360)", azimuth_deg, id)))?;
        }
        let polygon = polygon_from_vertices(vertices)?;

        Ok(RoofPlane {
            id: id.to_string(),
            name: name.to_string(),
            polygon,
            tilt_deg,
            azimuth_deg,
        })
    }

    /// Builds a roof plane from an input record.
    ///
    /// Unlike [`RoofPlane::new`], orientation outside the documented range is clamped (tilt) or
    /// wrapped (azimuth) so that batch analysis keeps going. Every such adjustment is returned
    /// as a note. Malformed geometry and non-finite orientation are still errors.
    ///
    /// # Arguments
    ///
    /// * 'record' - the raw plane record
    pub fn from_record(record: &PlaneRecord) -> Result<(RoofPlane, Vec<String>), ModelError> {
        if !record.tilt_deg.is_finite() || !record.azimuth_deg.is_finite() {
            return Err(ConfigurationError(format!("non-finite orientation on plane {}", record.id)))?;
        }

        let mut notes = Vec::new();
        let tilt = record.tilt_deg.clamp(0.0, 90.0);
        if tilt != record.tilt_deg {
            notes.push(format!("Tilt {} clamped to {}", record.tilt_deg, tilt));
        }
        let azimuth = record.azimuth_deg.rem_euclid(360.0);
        if azimuth != record.azimuth_deg {
            notes.push(format!("Azimuth {} normalized to {}", record.azimuth_deg, azimuth));
        }
        let name = record.name.clone().unwrap_or_else(|| format!("Plane {}", record.id));

        Ok((RoofPlane::new(&record.id, &name, &record.polygon, tilt, azimuth)?, notes))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn polygon(&self) -> &Polygon<f64> {
        &self.polygon
    }

    pub fn tilt_deg(&self) -> f64 {
        self.tilt_deg
    }

    pub fn azimuth_deg(&self) -> f64 {
        self.azimuth_deg
    }
}

impl Obstruction {
    /// Returns a validated obstruction
    ///
    /// # Arguments
    ///
    /// * 'id' - identifier of the obstruction
    /// * 'kind' - free form label, e.g. "tree"
    /// * 'vertices' - footprint ring
    /// * 'height_m' - height above the roof reference level, must be positive
    pub fn new(id: &str, kind: &str, vertices: &[(f64, f64)], height_m: f64) -> Result<Obstruction, ModelError> {
        if !height_m.is_finite() || height_m <= 0.0 {
            return Err(ConfigurationError(format!("height {} of obstruction {} must be positive", height_m, id)))?;
        }
        let polygon = polygon_from_vertices(vertices)?;

        Ok(Obstruction {
            id: id.to_string(),
            kind: kind.to_string(),
            polygon,
            height_m,
        })
    }

    /// Builds an obstruction from an input record
    ///
    /// # Arguments
    ///
    /// * 'record' - the raw obstruction record
    pub fn from_record(record: &ObstructionRecord) -> Result<Obstruction, ModelError> {
        Obstruction::new(&record.id, &record.kind, &record.polygon, record.height_m)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn polygon(&self) -> &Polygon<f64> {
        &self.polygon
    }

    pub fn height_m(&self) -> f64 {
        self.height_m
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQUARE: [(f64, f64); 4] = [(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)];

    #[test]
    fn strict_constructor_rejects_out_of_range_orientation() {
        assert!(matches!(RoofPlane::new("1", "a", &SQUARE, 91.0, 180.0), Err(ModelError::Configuration(_))));
        assert!(matches!(RoofPlane::new("1", "a", &SQUARE, 20.0, 360.0), Err(ModelError::Configuration(_))));
        assert!(RoofPlane::new("1", "a", &SQUARE, 90.0, 0.0).is_ok());
    }

    #[test]
    fn record_orientation_is_clamped_with_notes() {
        let record = PlaneRecord {
            id: "7".into(),
            name: None,
            polygon: SQUARE.to_vec(),
            tilt_deg: 120.0,
            azimuth_deg: -90.0,
        };
        let (plane, notes) = RoofPlane::from_record(&record).unwrap();
        assert_eq!(plane.tilt_deg(), 90.0);
        assert_eq!(plane.azimuth_deg(), 270.0);
        assert_eq!(plane.name(), "Plane 7");
        assert_eq!(notes.len(), 2);
    }

    #[test]
    fn obstruction_height_must_be_positive() {
        assert!(Obstruction::new("t", "tree", &SQUARE, 0.0).is_err());
        assert!(Obstruction::new("t", "tree", &SQUARE, f64::INFINITY).is_err());
        assert_eq!(Obstruction::new("t", "tree", &SQUARE, 4.0).unwrap().height_m(), 4.0);
    }

    #[test]
    fn records_apply_defaults() {
        let json = r#"{
            "roof_planes": [{"id": "p1", "polygon": [[0, 0], [5, 0], [5, 5]]}],
            "obstructions": [{"id": "o1", "polygon": [[8, 8], [9, 8], [9, 9]]}]
        }"#;
        let input: GeometryInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.roof_planes[0].tilt_deg, 20.0);
        assert_eq!(input.roof_planes[0].azimuth_deg, 180.0);
        assert_eq!(input.obstructions[0].height_m, 3.0);
        assert_eq!(input.obstructions[0].kind, "unknown");
    }
}
