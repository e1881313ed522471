use serde::Serialize;

/// Estimated shading impact of one obstruction on one roof plane
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct ObstructionImpact {
    pub obstruction_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub distance_m: f64,
    pub normalized_distance: f64,
    pub height_m: f64,
    pub intersects: bool,
    pub impact_score: f64,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct ProximityPlaneResult {
    pub plane_id: String,
    pub plane_name: String,
    pub shade_risk_score: f64,
    pub estimated_annual_loss_percent: f64,
    pub dominant_obstruction: Option<ObstructionImpact>,
    pub obstruction_impacts: Vec<ObstructionImpact>,
    pub notes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProximityPlaneResult {
    /// A zero risk result with no impacts
    ///
    /// # Arguments
    ///
    /// * 'plane_id' - id of the plane
    /// * 'plane_name' - name of the plane
    pub fn empty(plane_id: &str, plane_name: &str) -> ProximityPlaneResult {
        ProximityPlaneResult {
            plane_id: plane_id.to_string(),
            plane_name: plane_name.to_string(),
            shade_risk_score: 0.0,
            estimated_annual_loss_percent: 0.0,
            dominant_obstruction: None,
            obstruction_impacts: Vec::new(),
            notes: Vec::new(),
            error: None,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct ProximityResult {
    pub summary: String,
    pub total_roof_planes: usize,
    pub total_obstructions: usize,
    pub planes: Vec<ProximityPlaneResult>,
    pub average_shade_risk: Option<f64>,
    pub notes: Vec<String>,
}
