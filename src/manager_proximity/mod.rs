pub mod models;

use log::{debug, warn};
use rayon::prelude::*;
use crate::errors::GeometryError;
use crate::geometry;
use crate::manager_proximity::models::{ObstructionImpact, ProximityPlaneResult, ProximityResult};
use crate::models::{Obstruction, ObstructionRecord, PlaneRecord, RoofPlane};

/// Share of the shade risk score that converts into annual energy loss, i.e. a score of 100
/// is read as about 25 % loss
const LOSS_PER_RISK_POINT: f64 = 0.25;

/// Obstructions farther away than this many roof diagonals are ignored
const MAX_NORMALIZED_DISTANCE: f64 = 10.0;

/// Coarse shading estimate from distance and height bands only
///
/// No sun path is modelled, so no site location is needed. Each obstruction's impact depends on
/// whether it overlaps the roof and on its centroid distance relative to the roof size; impacts
/// add up to a 0 to 100 shade risk score.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProximityEngine;

impl ProximityEngine {
    pub fn new() -> ProximityEngine {
        ProximityEngine
    }

    /// Assesses all roof planes
    ///
    /// # Arguments
    ///
    /// * 'roof_planes' - planes to assess
    /// * 'obstructions' - obstructions around them
    pub fn analyze(&self, roof_planes: &[RoofPlane], obstructions: &[Obstruction]) -> ProximityResult {
        let planes = roof_planes
            .par_iter()
            .map(|plane| self.plane_result(plane, obstructions))
            .collect::<Vec<ProximityPlaneResult>>();

        assemble(planes, obstructions.len(), Vec::new())
    }

    /// Assesses raw input records, skipping malformed ones with a note
    ///
    /// # Arguments
    ///
    /// * 'planes' - roof plane records
    /// * 'obstruction_records' - obstruction records
    pub fn analyze_records(&self, planes: &[PlaneRecord], obstruction_records: &[ObstructionRecord]) -> ProximityResult {
        let mut notes = Vec::new();

        let obstructions = obstruction_records
            .iter()
            .filter_map(|r| match Obstruction::from_record(r) {
                Ok(o) => Some(o),
                Err(e) => {
                    warn!("skipping obstruction {}: {}", r.id, e);
                    notes.push(format!("Obstruction {} skipped: {}", r.id, e));
                    None
                }
            })
            .collect::<Vec<Obstruction>>();

        let records = planes
            .iter()
            .map(|r| match RoofPlane::from_record(r) {
                Ok(accepted) => Ok(accepted),
                Err(e) => {
                    warn!("rejecting roof plane {}: {}", r.id, e);
                    notes.push(format!("Roof plane {} rejected: {}", r.id, e));
                    let name = r.name.clone().unwrap_or_else(|| format!("Plane {}", r.id));
                    Err(ProximityPlaneResult {
                        error: Some(e.to_string()),
                        ..ProximityPlaneResult::empty(&r.id, &name)
                    })
                }
            })
            .collect::<Vec<Result<(RoofPlane, Vec<String>), ProximityPlaneResult>>>();

        let planes_out = records
            .into_par_iter()
            .map(|record| match record {
                Ok((plane, plane_notes)) => {
                    let mut assessment = self.plane_result(&plane, &obstructions);
                    assessment.notes.splice(0..0, plane_notes);
                    assessment
                },
                Err(rejected) => rejected,
            })
            .collect::<Vec<ProximityPlaneResult>>();

        assemble(planes_out, obstruction_records.len(), notes)
    }

    /// Assesses one roof plane
    ///
    /// # Arguments
    ///
    /// * 'plane' - the roof plane
    /// * 'obstructions' - obstructions around it
    pub fn assess_plane(&self, plane: &RoofPlane, obstructions: &[Obstruction]) -> Result<ProximityPlaneResult, GeometryError> {
        let mut result = ProximityPlaneResult::empty(plane.id(), plane.name());

        if geometry::area(plane.polygon()) <= 0.0 {
            let note = GeometryError::Degenerate(format!("roof plane {} has zero area", plane.id()));
            warn!("{}", note);
            result.notes.push(note.to_string());
            return Ok(result);
        }
        if obstructions.is_empty() {
            result.notes.push("No obstructions found - minimal shading expected".to_string());
            return Ok(result);
        }

        let diagonal = geometry::diagonal(plane.polygon());
        if diagonal <= 0.0 {
            return Err(GeometryError::Degenerate(format!("roof plane {} has no extent", plane.id())));
        }

        let mut total = 0.0;
        for obstruction in obstructions {
            match self.impact(plane, obstruction, diagonal) {
                Ok(Some(impact)) => {
                    if impact.intersects {
                        result.notes.push(format!("{} {} overlaps the roof plane", obstruction.kind(), obstruction.id()));
                    }
                    total += impact.impact_score;
                    let dominant = result.dominant_obstruction.as_ref().map_or(0.0, |d| d.impact_score);
                    if impact.impact_score > dominant {
                        result.dominant_obstruction = Some(impact.clone());
                    }
                    result.obstruction_impacts.push(impact);
                },
                Ok(None) => debug!("obstruction {} too far from plane {}", obstruction.id(), plane.id()),
                Err(e) => {
                    warn!("skipping obstruction {} for plane {}: {}", obstruction.id(), plane.id(), e);
                    result.notes.push(format!("Error processing obstruction {}: {}", obstruction.id(), e));
                }
            }
        }

        result.shade_risk_score = round_to(total.min(100.0), 2);
        result.estimated_annual_loss_percent = round_to(result.shade_risk_score * LOSS_PER_RISK_POINT, 2);
        result.notes.push(risk_note(result.shade_risk_score).to_string());

        Ok(result)
    }

    /// Assesses one plane, turning a failure into an error result for that plane only
    ///
    /// # Arguments
    ///
    /// * 'plane' - the roof plane
    /// * 'obstructions' - obstructions around it
    fn plane_result(&self, plane: &RoofPlane, obstructions: &[Obstruction]) -> ProximityPlaneResult {
        match self.assess_plane(plane, obstructions) {
            Ok(result) => result,
            Err(e) => {
                warn!("proximity assessment of plane {} failed: {}", plane.id(), e);
                ProximityPlaneResult {
                    error: Some(format!("Error analyzing plane: {}", e)),
                    ..ProximityPlaneResult::empty(plane.id(), plane.name())
                }
            }
        }
    }

    /// Impact of one obstruction on a roof plane, None when it is too far away to matter
    ///
    /// # Arguments
    ///
    /// * 'plane' - the roof plane
    /// * 'obstruction' - the obstruction
    /// * 'diagonal' - bounding box diagonal of the roof polygon
    fn impact(&self, plane: &RoofPlane, obstruction: &Obstruction, diagonal: f64) -> Result<Option<ObstructionImpact>, GeometryError> {
        let distance = geometry::centroid_distance(plane.polygon(), obstruction.polygon())
            .ok_or_else(|| GeometryError::Degenerate(format!("obstruction {} has no centroid", obstruction.id())))?;
        let normalized = distance / diagonal;
        let intersects = geometry::intersects(plane.polygon(), obstruction.polygon());

        Ok(impact_score(intersects, normalized, obstruction.height_m()).map(|score| ObstructionImpact {
            obstruction_id: obstruction.id().to_string(),
            kind: obstruction.kind().to_string(),
            distance_m: round_to(distance, 2),
            normalized_distance: round_to(normalized, 3),
            height_m: obstruction.height_m(),
            intersects,
            impact_score: round_to(score, 2),
        }))
    }
}

/// Impact score of a single obstruction from distance and height bands
///
/// | condition | score |
/// |---|---|
/// | overlapping | 80 to 100 |
/// | closer than 0.5 roof diagonals | 40 to 80 |
/// | closer than 2 roof diagonals | 20 to 50 |
/// | up to 10 roof diagonals | 10 to 30 |
///
/// Within a band the score grows with height (capped at 10 m) and with proximity.
///
/// # Arguments
///
/// * 'intersects' - whether obstruction and roof polygons overlap
/// * 'normalized_distance' - centroid distance divided by the roof diagonal
/// * 'height_m' - obstruction height
pub fn impact_score(intersects: bool, normalized_distance: f64, height_m: f64) -> Option<f64> {
    let height_factor = (height_m / 10.0).clamp(0.0, 1.0);
    let n = normalized_distance.max(0.0);

    let band = |floor: f64, span: f64, start: f64, end: f64| -> f64 {
        let proximity = 1.0 - (n - start) / (end - start);
        floor + span * height_factor * proximity.clamp(0.0, 1.0)
    };

    if intersects {
        Some(80.0 + 20.0 * height_factor)
    } else if n < 0.5 {
        Some(band(40.0, 40.0, 0.0, 0.5))
    } else if n < 2.0 {
        Some(band(20.0, 30.0, 0.5, 2.0))
    } else if n <= MAX_NORMALIZED_DISTANCE {
        Some(band(10.0, 20.0, 2.0, MAX_NORMALIZED_DISTANCE))
    } else {
        None
    }
}

fn risk_note(score: f64) -> &'static str {
    if score < 20.0 {
        "Low shading risk - good solar exposure"
    } else if score < 50.0 {
        "Moderate shading risk - consider obstruction mitigation"
    } else {
        "High shading risk - significant energy loss expected"
    }
}

/// Builds the engine level result
///
/// # Arguments
///
/// * 'planes' - per plane results in input order
/// * 'total_obstructions' - number of obstructions given by the caller
/// * 'notes' - notes collected at the input boundary
fn assemble(planes: Vec<ProximityPlaneResult>, total_obstructions: usize, notes: Vec<String>) -> ProximityResult {
    let assessed: Vec<&ProximityPlaneResult> = planes.iter().filter(|p| p.is_ok()).collect();
    let average_shade_risk = if assessed.is_empty() {
        None
    } else {
        Some(round_to(assessed.iter().map(|p| p.shade_risk_score).sum::<f64>() / assessed.len() as f64, 2))
    };

    let mut summary = "Shading analysis (proximity heuristic)".to_string();
    if planes.is_empty() {
        summary.push_str(" - No roof planes found");
    }

    ProximityResult {
        summary,
        total_roof_planes: planes.len(),
        total_obstructions,
        planes,
        average_shade_risk,
        notes,
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROOF: [(f64, f64); 4] = [(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)];

    fn roof() -> RoofPlane {
        RoofPlane::new("r", "Roof", &ROOF, 25.0, 180.0).unwrap()
    }

    fn square_at(id: &str, x0: f64, y0: f64, size: f64, height: f64) -> Obstruction {
        Obstruction::new(id, "tree", &[(x0, y0), (x0 + size, y0), (x0 + size, y0 + size), (x0, y0 + size)], height).unwrap()
    }

    #[test]
    fn bands_are_ordered_and_bounded() {
        assert_eq!(impact_score(true, 0.0, 10.0), Some(100.0));
        assert_eq!(impact_score(true, 0.0, 0.0), Some(80.0));
        assert_eq!(impact_score(false, 0.0, 10.0), Some(80.0));
        assert_eq!(impact_score(false, 0.49, 0.0), Some(40.0));
        assert_eq!(impact_score(false, 0.5, 10.0), Some(50.0));
        assert_eq!(impact_score(false, 2.0, 10.0), Some(30.0));
        assert_eq!(impact_score(false, 10.0, 10.0), Some(10.0));
        assert_eq!(impact_score(false, 10.01, 10.0), None);
    }

    #[test]
    fn score_grows_with_height() {
        let low = impact_score(false, 1.0, 2.0).unwrap();
        let high = impact_score(false, 1.0, 8.0).unwrap();
        assert!(high > low);
        assert!((20.0..=50.0).contains(&low) && (20.0..=50.0).contains(&high));
    }

    #[test]
    fn no_obstructions_means_no_risk() {
        let res = ProximityEngine::new().analyze(&[roof()], &[]);
        assert_eq!(res.planes[0].shade_risk_score, 0.0);
        assert_eq!(res.average_shade_risk, Some(0.0));
    }

    #[test]
    fn impacts_sum_and_cap_at_100() {
        let obstructions = vec![
            square_at("a", 2.0, 2.0, 2.0, 10.0),
            square_at("b", 6.0, 6.0, 2.0, 10.0),
        ];
        let res = ProximityEngine::new().analyze(&[roof()], &obstructions);
        let plane = &res.planes[0];
        assert_eq!(plane.shade_risk_score, 100.0);
        assert_eq!(plane.estimated_annual_loss_percent, 25.0);
        assert_eq!(plane.obstruction_impacts.len(), 2);
    }

    #[test]
    fn far_obstruction_is_ignored_and_dominant_is_highest() {
        let obstructions = vec![
            square_at("far", 1000.0, 0.0, 2.0, 10.0),
            square_at("mid", 20.0, 0.0, 2.0, 5.0),
            square_at("near", 12.0, 0.0, 2.0, 10.0),
        ];
        let res = ProximityEngine::new().analyze(&[roof()], &obstructions);
        let plane = &res.planes[0];
        assert_eq!(plane.obstruction_impacts.len(), 2);
        assert_eq!(plane.dominant_obstruction.as_ref().unwrap().obstruction_id, "near");
    }

    #[test]
    fn malformed_records_are_skipped_with_notes() {
        let planes = vec![
            PlaneRecord { id: "ok".into(), name: None, polygon: ROOF.to_vec(), tilt_deg: 20.0, azimuth_deg: 180.0 },
            PlaneRecord { id: "bad".into(), name: None, polygon: vec![(0.0, 0.0), (1.0, 1.0)], tilt_deg: 20.0, azimuth_deg: 180.0 },
        ];
        let obstructions = vec![
            ObstructionRecord { id: "o".into(), kind: "tree".into(), polygon: vec![(2.0, 2.0), (3.0, 2.0), (3.0, 3.0)], height_m: 5.0 },
            ObstructionRecord { id: "neg".into(), kind: "tree".into(), polygon: vec![(2.0, 2.0), (3.0, 2.0), (3.0, 3.0)], height_m: -1.0 },
        ];
        let res = ProximityEngine::new().analyze_records(&planes, &obstructions);
        assert_eq!(res.planes.len(), 2);
        assert!(res.planes[0].is_ok());
        assert_eq!(res.planes[0].obstruction_impacts.len(), 1);
        assert!(res.planes[1].error.is_some());
        assert_eq!(res.notes.len(), 2);
        assert_eq!(res.total_obstructions, 2);
    }
}
