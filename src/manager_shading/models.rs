use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use crate::sampling::{RepresentativeDay, SampleTime};
use crate::solar_position::{Site, SunPosition};

/// How a representative day's energy is carried into monthly and annual totals
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug, Default)]
#[serde(rename_all = "snake_case")]
pub enum MonthlyPolicy {
    /// The representative day's totals are used as the month's figure, unscaled
    #[default]
    RepresentativeDay,
    /// The representative day's totals are multiplied by the number of days in the month
    DaysInMonth,
}

impl MonthlyPolicy {
    /// Weight of a representative day in monthly and annual totals
    ///
    /// # Arguments
    ///
    /// * 'day' - the representative day
    pub fn weight(&self, day: &RepresentativeDay) -> f64 {
        match self {
            MonthlyPolicy::RepresentativeDay => 1.0,
            MonthlyPolicy::DaysInMonth => day.days_in_month as f64,
        }
    }
}

/// One (plane, timestamp) evaluation. Production figures are in W/m².
#[derive(Clone, Debug, PartialEq)]
pub struct Sample {
    pub time: SampleTime,
    pub sun: SunPosition,
    pub irradiance: f64,
    pub efficiency: f64,
    pub shaded_fraction: f64,
    pub potential: f64,
    pub actual: f64,
    pub failed_obstructions: Vec<String>,
}

impl Sample {
    /// A sample with the sun at or below the horizon
    pub fn night(time: SampleTime, sun: SunPosition) -> Sample {
        Sample {
            time,
            sun,
            irradiance: 0.0,
            efficiency: 0.0,
            shaded_fraction: 0.0,
            potential: 0.0,
            actual: 0.0,
            failed_obstructions: Vec::new(),
        }
    }
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct HourlySample {
    pub hour: u32,
    pub timestamp: NaiveDateTime,
    pub sun_azimuth: f64,
    pub sun_elevation: f64,
    pub irradiance: f64,
    pub efficiency: f64,
    pub shaded_percent: f64,
    pub potential_w_m2: f64,
    pub production_w_m2: f64,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct MonthlySummary {
    pub month: String,
    pub month_number: u32,
    pub date: NaiveDate,
    pub potential_kwh_m2_day: f64,
    pub actual_kwh_m2_day: f64,
    pub potential_kwh_m2_month: f64,
    pub actual_kwh_m2_month: f64,
    pub loss_percent: f64,
    pub hourly_data: Vec<HourlySample>,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct ShadingMoment {
    pub timestamp: NaiveDateTime,
    pub month: String,
    pub hour: u32,
    pub sun_azimuth: f64,
    pub sun_elevation: f64,
    pub shaded_percent: f64,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct ProductionMoment {
    pub timestamp: NaiveDateTime,
    pub month: String,
    pub hour: u32,
    pub production_w_m2: f64,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct RoofSpecifications {
    pub tilt_deg: f64,
    pub azimuth_deg: f64,
    pub area_m2: f64,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct PlaneResult {
    pub plane_id: String,
    pub plane_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roof_specifications: Option<RoofSpecifications>,
    pub annual_energy_loss_percent: f64,
    pub peak_hours_loss_percent: f64,
    pub annual_production_kwh_m2: f64,
    pub potential_production_kwh_m2: f64,
    pub worst_shading_moment: Option<ShadingMoment>,
    pub best_production_moment: Option<ProductionMoment>,
    pub worst_hour_of_day: Option<u32>,
    pub monthly_breakdown: Vec<MonthlySummary>,
    pub recommendations: Vec<String>,
    pub notes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PlaneResult {
    /// A result with zero loss and production, used for failed and degenerate planes
    ///
    /// # Arguments
    ///
    /// * 'plane_id' - id of the plane
    /// * 'plane_name' - name of the plane
    pub fn empty(plane_id: &str, plane_name: &str) -> PlaneResult {
        PlaneResult {
            plane_id: plane_id.to_string(),
            plane_name: plane_name.to_string(),
            roof_specifications: None,
            annual_energy_loss_percent: 0.0,
            peak_hours_loss_percent: 0.0,
            annual_production_kwh_m2: 0.0,
            potential_production_kwh_m2: 0.0,
            worst_shading_moment: None,
            best_production_moment: None,
            worst_hour_of_day: None,
            monthly_breakdown: Vec::new(),
            recommendations: Vec::new(),
            notes: Vec::new(),
            error: None,
        }
    }

    /// A result for a plane that could not be analysed
    ///
    /// # Arguments
    ///
    /// * 'plane_id' - id of the plane
    /// * 'plane_name' - name of the plane
    /// * 'error' - description of the failure
    pub fn failed(plane_id: &str, plane_name: &str, error: String) -> PlaneResult {
        PlaneResult { error: Some(error), ..PlaneResult::empty(plane_id, plane_name) }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub utc_offset: f64,
}

impl From<&Site> for Location {
    fn from(site: &Site) -> Self {
        Location {
            latitude: site.latitude,
            longitude: site.longitude,
            utc_offset: site.utc_offset,
        }
    }
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct EngineResult {
    pub summary: String,
    pub location: Location,
    pub analysis_year: i32,
    pub total_roof_planes: usize,
    pub total_obstructions: usize,
    pub planes: Vec<PlaneResult>,
    pub average_annual_energy_loss: Option<f64>,
    pub average_peak_hours_loss: Option<f64>,
    pub notes: Vec<String>,
}
