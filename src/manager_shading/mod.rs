pub mod errors;
pub mod models;

use std::borrow::Cow;
use std::collections::BTreeMap;
use log::{debug, warn};
use rayon::prelude::*;
use crate::config::{AnalysisParameters, Config, IrradianceParameters, ProjectionParameters, SamplingParameters};
use crate::errors::{ConfigurationError, GeometryError};
use crate::geometry;
use crate::irradiance::IrradianceModel;
use crate::manager_shading::errors::ShadingError;
use crate::manager_shading::models::{
    EngineResult, HourlySample, Location, MonthlyPolicy, MonthlySummary, PlaneResult, ProductionMoment,
    RoofSpecifications, Sample, ShadingMoment,
};
use crate::models::{Obstruction, ObstructionRecord, PlaneRecord, RoofPlane};
use crate::sampling::{RepresentativeDay, SampleTime, TimeSampler};
use crate::shadow::{shaded_fraction, ShadowProjector};
use crate::solar_position::Site;

/// Shading simulation engine
///
/// For every roof plane the engine walks the sampler's representative time grid, computes the
/// sun position, clear-sky irradiance and panel efficiency, projects shadows from obstructions
/// within reach and accumulates potential (unshaded) against actual (shaded) production.
///
/// The engine holds configuration only. An analysis is a pure function of its inputs, so
/// identical inputs give identical results. Planes are analysed in parallel.
#[derive(Clone, Debug, PartialEq)]
pub struct ShadingEngine {
    sampler: TimeSampler,
    irradiance: IrradianceModel,
    projector: ShadowProjector,
    peak_start_hour: u32,
    peak_end_hour: u32,
    monthly_policy: MonthlyPolicy,
}

/// A plane ready for analysis, or the reason it was rejected at the input boundary
enum PlaneInput<'a> {
    Accepted { plane: Cow<'a, RoofPlane>, notes: Vec<String> },
    Rejected { id: String, name: String, error: String },
}

/// Running totals for one roof plane
#[derive(Default)]
struct PlaneTotals {
    potential: f64,
    actual: f64,
    peak_potential: f64,
    peak_actual: f64,
    worst: Option<(f64, ShadingMoment)>,
    best: Option<(f64, ProductionMoment)>,
    hourly_shading: BTreeMap<u32, (f64, u32)>,
}

impl Default for ShadingEngine {
    fn default() -> Self {
        let analysis = AnalysisParameters::default();
        ShadingEngine {
            sampler: TimeSampler::default(),
            irradiance: IrradianceModel::default(),
            projector: ShadowProjector::default(),
            peak_start_hour: analysis.peak_start_hour,
            peak_end_hour: analysis.peak_end_hour,
            monthly_policy: analysis.monthly_policy,
        }
    }
}

impl ShadingEngine {
    /// Returns a new engine
    ///
    /// # Arguments
    ///
    /// * 'analysis' - peak hours and monthly policy
    /// * 'sampling' - representative time grid
    /// * 'irradiance' - irradiance model constants
    /// * 'projection' - shadow projection cutoff
    pub fn new(
        analysis: &AnalysisParameters,
        sampling: &SamplingParameters,
        irradiance: &IrradianceParameters,
        projection: &ProjectionParameters) -> Result<ShadingEngine, ConfigurationError>
    {
        if analysis.peak_start_hour > analysis.peak_end_hour || analysis.peak_end_hour > 23 {
            return Err(ConfigurationError(format!(
                "peak hours {}..={} are invalid", analysis.peak_start_hour, analysis.peak_end_hour)));
        }

        Ok(ShadingEngine {
            sampler: TimeSampler::new(sampling)?,
            irradiance: IrradianceModel::new(irradiance),
            projector: ShadowProjector::new(projection),
            peak_start_hour: analysis.peak_start_hour,
            peak_end_hour: analysis.peak_end_hour,
            monthly_policy: analysis.monthly_policy,
        })
    }

    /// Returns a new engine from the configuration file sections
    ///
    /// # Arguments
    ///
    /// * 'config' - configuration struct
    pub fn from_config(config: &Config) -> Result<ShadingEngine, ConfigurationError> {
        ShadingEngine::new(&config.analysis, &config.sampling, &config.irradiance, &config.projection)
    }

    /// Replaces the time grid
    pub fn with_sampler(mut self, sampler: TimeSampler) -> ShadingEngine {
        self.sampler = sampler;
        self
    }

    /// Replaces the monthly totals policy
    pub fn with_monthly_policy(mut self, policy: MonthlyPolicy) -> ShadingEngine {
        self.monthly_policy = policy;
        self
    }

    /// Analyses all roof planes for a site given as plain coordinates. The sampled hours are
    /// read on the nominal solar time zone of the longitude.
    ///
    /// # Arguments
    ///
    /// * 'roof_planes' - planes to analyse
    /// * 'obstructions' - shadow casting obstructions
    /// * 'latitude' - site latitude in degrees
    /// * 'longitude' - site longitude in degrees
    /// * 'year' - calendar year of the analysis
    pub fn analyze(&self, roof_planes: &[RoofPlane], obstructions: &[Obstruction], latitude: f64, longitude: f64, year: i32) -> EngineResult {
        self.analyze_site(roof_planes, obstructions, &Site::new(latitude, longitude), year)
    }

    /// Analyses all roof planes for a site
    ///
    /// # Arguments
    ///
    /// * 'roof_planes' - planes to analyse
    /// * 'obstructions' - shadow casting obstructions
    /// * 'site' - site location and civil clock
    /// * 'year' - calendar year of the analysis
    pub fn analyze_site(&self, roof_planes: &[RoofPlane], obstructions: &[Obstruction], site: &Site, year: i32) -> EngineResult {
        let inputs = roof_planes
            .iter()
            .map(|p| PlaneInput::Accepted { plane: Cow::Borrowed(p), notes: Vec::new() })
            .collect();

        self.run(inputs, obstructions, site, year, Vec::new())
    }

    /// Analyses raw input records. Malformed obstructions are skipped and malformed planes are
    /// reported with an error, both with a note; the remaining input is analysed as usual.
    ///
    /// # Arguments
    ///
    /// * 'planes' - roof plane records
    /// * 'obstruction_records' - obstruction records
    /// * 'site' - site location and civil clock
    /// * 'year' - calendar year of the analysis
    pub fn analyze_records(&self, planes: &[PlaneRecord], obstruction_records: &[ObstructionRecord], site: &Site, year: i32) -> EngineResult {
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

        let inputs = planes
            .iter()
            .map(|r| match RoofPlane::from_record(r) {
                Ok((plane, plane_notes)) => PlaneInput::Accepted { plane: Cow::Owned(plane), notes: plane_notes },
                Err(e) => {
                    warn!("rejecting roof plane {}: {}", r.id, e);
                    notes.push(format!("Roof plane {} rejected: {}", r.id, e));
                    PlaneInput::Rejected {
                        id: r.id.clone(),
                        name: r.name.clone().unwrap_or_else(|| format!("Plane {}", r.id)),
                        error: e.to_string(),
                    }
                }
            })
            .collect();

        let mut result = self.run(inputs, &obstructions, site, year, notes);
        result.total_obstructions = obstruction_records.len();
        result
    }

    /// Obstructions close enough to a plane to ever shade it
    ///
    /// # Arguments
    ///
    /// * 'plane' - the roof plane
    /// * 'obstructions' - all obstructions
    pub fn obstructions_in_reach<'a>(&self, plane: &RoofPlane, obstructions: &'a [Obstruction]) -> Vec<&'a Obstruction> {
        obstructions
            .iter()
            .filter(|o| {
                let near = self.projector.within_reach(plane.polygon(), o.polygon(), o.height_m());
                if !near {
                    debug!("obstruction {} out of reach of plane {}", o.id(), plane.id());
                }
                near
            })
            .collect()
    }

    /// Evaluates one sample. With the sun at or below the horizon nothing is projected and all
    /// production figures are zero. An obstruction whose projection fails is left out of the
    /// sample and listed in `failed_obstructions`; the others still cast their shadows.
    ///
    /// # Arguments
    ///
    /// * 'plane' - the roof plane
    /// * 'obstructions' - obstructions in reach of the plane
    /// * 'site' - site location and civil clock
    /// * 'time' - the sampled moment
    pub fn evaluate_sample(&self, plane: &RoofPlane, obstructions: &[&Obstruction], site: &Site, time: &SampleTime) -> Sample {
        let sun = site.position(time.timestamp);
        if !sun.is_up() {
            return Sample::night(*time, sun);
        }

        let irradiance = self.irradiance.clear_sky_irradiance(sun.elevation_deg);
        let efficiency = self.irradiance.panel_efficiency(plane.tilt_deg(), plane.azimuth_deg(), &sun);
        let potential = irradiance * efficiency;

        let mut shadows = Vec::with_capacity(obstructions.len());
        let mut failed_obstructions = Vec::new();
        for obstruction in obstructions {
            match self.projector.project(obstruction.polygon(), obstruction.height_m(), &sun) {
                Ok(Some(shadow)) => shadows.push(shadow),
                Ok(None) => {},
                Err(e) => {
                    warn!("no shadow from obstruction {} at {}: {}", obstruction.id(), time.timestamp, e);
                    failed_obstructions.push(obstruction.id().to_string());
                }
            }
        }

        let shaded = shaded_fraction(plane.polygon(), &shadows);

        Sample {
            time: *time,
            sun,
            irradiance,
            efficiency,
            shaded_fraction: shaded,
            potential,
            actual: potential * (1.0 - shaded / 100.0),
            failed_obstructions,
        }
    }

    /// Analyses one roof plane over the given representative days
    ///
    /// # Arguments
    ///
    /// * 'plane' - the roof plane
    /// * 'obstructions' - all obstructions
    /// * 'site' - site location and civil clock
    /// * 'days' - representative days with their sampled hours
    pub fn analyze_plane(&self, plane: &RoofPlane, obstructions: &[Obstruction], site: &Site, days: &[RepresentativeDay]) -> Result<PlaneResult, ShadingError> {
        let roof_area = geometry::area(plane.polygon());
        let specs = RoofSpecifications {
            tilt_deg: plane.tilt_deg(),
            azimuth_deg: plane.azimuth_deg(),
            area_m2: round_to(roof_area, 2),
        };

        if !(roof_area > 0.0) {
            let note = GeometryError::Degenerate(format!("roof plane {} has zero area", plane.id()));
            warn!("{}", note);
            let mut result = PlaneResult::empty(plane.id(), plane.name());
            result.roof_specifications = Some(specs);
            result.notes.push(note.to_string());
            return Ok(result);
        }

        let candidates = self.obstructions_in_reach(plane, obstructions);
        debug!("analysing plane {} with {} of {} obstructions in reach", plane.id(), candidates.len(), obstructions.len());

        let mut totals = PlaneTotals::default();
        let mut monthly_breakdown = Vec::with_capacity(days.len());
        let mut failed_obstructions: Vec<String> = Vec::new();

        for day in days {
            let weight = self.monthly_policy.weight(day);
            let mut day_potential = 0.0;
            let mut day_actual = 0.0;
            let mut hourly_data = Vec::with_capacity(day.samples.len());

            for time in day.samples.iter() {
                let sample = self.evaluate_sample(plane, &candidates, site, time);
                if !sample.sun.is_up() {
                    continue;
                }

                day_potential += sample.potential;
                day_actual += sample.actual;
                totals.record(&sample, weight, self.is_peak_hour(time.hour));

                for id in sample.failed_obstructions.iter() {
                    if !failed_obstructions.contains(id) {
                        failed_obstructions.push(id.clone());
                    }
                }

                hourly_data.push(HourlySample {
                    hour: time.hour,
                    timestamp: time.timestamp,
                    sun_azimuth: round_to(sample.sun.azimuth_deg, 1),
                    sun_elevation: round_to(sample.sun.elevation_deg, 1),
                    irradiance: round_to(sample.irradiance, 1),
                    efficiency: round_to(sample.efficiency, 3),
                    shaded_percent: round_to(sample.shaded_fraction, 1),
                    potential_w_m2: round_to(sample.potential, 1),
                    production_w_m2: round_to(sample.actual, 1),
                });
            }

            monthly_breakdown.push(MonthlySummary {
                month: month_name(day.date),
                month_number: day.month,
                date: day.date,
                potential_kwh_m2_day: round_to(day_potential / 1000.0, 2),
                actual_kwh_m2_day: round_to(day_actual / 1000.0, 2),
                potential_kwh_m2_month: round_to(day_potential * weight / 1000.0, 2),
                actual_kwh_m2_month: round_to(day_actual * weight / 1000.0, 2),
                loss_percent: round_to(loss_percent(day_potential, day_actual), 2),
                hourly_data,
            });
        }

        if !totals.potential.is_finite() || !totals.actual.is_finite() {
            return Err(ShadingError::Computation(format!(
                "non-finite production totals for plane {} (potential {}, actual {})", plane.id(), totals.potential, totals.actual)));
        }

        let annual_loss = round_to(loss_percent(totals.potential, totals.actual), 2);
        let peak_loss = round_to(loss_percent(totals.peak_potential, totals.peak_actual), 2);
        let worst_hour = totals.worst_hour();

        let mut notes = Vec::new();
        if !failed_obstructions.is_empty() {
            notes.push(format!("Shadow projection failed for obstruction(s) {} in some samples", failed_obstructions.join(", ")));
        }

        Ok(PlaneResult {
            plane_id: plane.id().to_string(),
            plane_name: plane.name().to_string(),
            roof_specifications: Some(specs),
            annual_energy_loss_percent: annual_loss,
            peak_hours_loss_percent: peak_loss,
            annual_production_kwh_m2: round_to(totals.actual / 1000.0, 2),
            potential_production_kwh_m2: round_to(totals.potential / 1000.0, 2),
            worst_shading_moment: totals.worst.map(|(_, m)| m),
            best_production_moment: totals.best.map(|(_, m)| m),
            worst_hour_of_day: worst_hour.map(|(h, _)| h),
            monthly_breakdown,
            recommendations: recommendations(annual_loss, peak_loss, worst_hour),
            notes,
            error: None,
        })
    }

    fn is_peak_hour(&self, hour: u32) -> bool {
        hour >= self.peak_start_hour && hour <= self.peak_end_hour
    }

    /// Runs the analysis of all plane inputs and assembles the engine result
    ///
    /// # Arguments
    ///
    /// * 'inputs' - accepted and rejected planes, in caller order
    /// * 'obstructions' - valid obstructions
    /// * 'site' - site location and civil clock
    /// * 'year' - calendar year of the analysis
    /// * 'notes' - notes collected at the input boundary
    fn run(&self, inputs: Vec<PlaneInput<'_>>, obstructions: &[Obstruction], site: &Site, year: i32, notes: Vec<String>) -> EngineResult {
        let planes: Vec<PlaneResult> = match self.sampler.days(year) {
            Ok(days) => inputs
                .par_iter()
                .map(|input| self.plane_result(input, obstructions, site, &days))
                .collect(),
            Err(e) => {
                let e = ShadingError::from(e);
                warn!("analysis for year {} failed: {}", year, e);
                inputs
                    .iter()
                    .map(|input| match input {
                        PlaneInput::Accepted { plane, .. } => PlaneResult::failed(plane.id(), plane.name(), format!("Analysis failed: {}", e)),
                        PlaneInput::Rejected { id, name, error } => PlaneResult::failed(id, name, error.clone()),
                    })
                    .collect()
            }
        };

        let analysed: Vec<&PlaneResult> = planes.iter().filter(|p| p.is_ok()).collect();
        let average = |f: fn(&PlaneResult) -> f64| -> Option<f64> {
            if analysed.is_empty() {
                None
            } else {
                Some(round_to(analysed.iter().map(|p| f(p)).sum::<f64>() / analysed.len() as f64, 2))
            }
        };
        let average_annual_energy_loss = average(|p| p.annual_energy_loss_percent);
        let average_peak_hours_loss = average(|p| p.peak_hours_loss_percent);

        let mut summary = "Shading analysis (solar position simulation)".to_string();
        if planes.is_empty() {
            summary.push_str(" - No roof planes found");
        }

        EngineResult {
            summary,
            location: Location::from(site),
            analysis_year: year,
            total_roof_planes: planes.len(),
            total_obstructions: obstructions.len(),
            planes,
            average_annual_energy_loss,
            average_peak_hours_loss,
            notes,
        }
    }

    /// Analyses one plane input, turning any failure into an error on that plane's result
    fn plane_result(&self, input: &PlaneInput<'_>, obstructions: &[Obstruction], site: &Site, days: &[RepresentativeDay]) -> PlaneResult {
        match input {
            PlaneInput::Rejected { id, name, error } => PlaneResult::failed(id, name, error.clone()),
            PlaneInput::Accepted { plane, notes } => match self.analyze_plane(plane, obstructions, site, days) {
                Ok(mut result) => {
                    result.notes.splice(0..0, notes.iter().cloned());
                    result
                },
                Err(e) => {
                    warn!("analysis of plane {} failed: {}", plane.id(), e);
                    PlaneResult::failed(plane.id(), plane.name(), format!("Analysis failed: {}", e))
                }
            },
        }
    }
}

impl PlaneTotals {
    /// Adds a daytime sample to the totals
    ///
    /// # Arguments
    ///
    /// * 'sample' - the evaluated sample
    /// * 'weight' - weight of the sample's representative day
    /// * 'peak' - whether the sample falls in peak hours
    fn record(&mut self, sample: &Sample, weight: f64, peak: bool) {
        self.potential += sample.potential * weight;
        self.actual += sample.actual * weight;
        if peak {
            self.peak_potential += sample.potential * weight;
            self.peak_actual += sample.actual * weight;
        }

        let worst_so_far = self.worst.as_ref().map_or(0.0, |(v, _)| *v);
        if sample.shaded_fraction > worst_so_far {
            self.worst = Some((sample.shaded_fraction, ShadingMoment {
                timestamp: sample.time.timestamp,
                month: month_name(sample.time.timestamp.date()),
                hour: sample.time.hour,
                sun_azimuth: round_to(sample.sun.azimuth_deg, 1),
                sun_elevation: round_to(sample.sun.elevation_deg, 1),
                shaded_percent: round_to(sample.shaded_fraction, 1),
            }));
        }

        let best_so_far = self.best.as_ref().map_or(0.0, |(v, _)| *v);
        if sample.actual > best_so_far {
            self.best = Some((sample.actual, ProductionMoment {
                timestamp: sample.time.timestamp,
                month: month_name(sample.time.timestamp.date()),
                hour: sample.time.hour,
                production_w_m2: round_to(sample.actual, 1),
            }));
        }

        let entry = self.hourly_shading.entry(sample.time.hour).or_insert((0.0, 0));
        entry.0 += sample.shaded_fraction;
        entry.1 += 1;
    }

    /// Hour of day with the highest average shaded percentage, if any hour is shaded at all
    fn worst_hour(&self) -> Option<(u32, f64)> {
        let mut worst: Option<(u32, f64)> = None;
        for (hour, (sum, count)) in self.hourly_shading.iter() {
            let avg = sum / *count as f64;
            if avg > worst.map_or(0.0, |(_, v)| v) {
                worst = Some((*hour, avg));
            }
        }

        worst
    }
}

/// Recommendations from annual and peak-hour losses
///
/// # Arguments
///
/// * 'annual_loss' - annual energy loss in percent
/// * 'peak_loss' - peak-hours energy loss in percent
/// * 'worst_hour' - most shaded hour of day with its average shaded percent
pub fn recommendations(annual_loss: f64, peak_loss: f64, worst_hour: Option<(u32, f64)>) -> Vec<String> {
    let mut recs = Vec::new();

    if annual_loss < 5.0 {
        recs.push("Excellent solar exposure - minimal shading impact".to_string());
    } else if annual_loss <= 15.0 {
        recs.push("Moderate shading - consider obstruction trimming or other mitigation".to_string());
    } else {
        recs.push("Significant shading losses - obstruction mitigation highly recommended".to_string());
    }

    if peak_loss > annual_loss * 1.5 {
        recs.push("Peak hour shading is disproportionately high - focus on midday obstructions".to_string());
    }

    if let Some((hour, avg)) = worst_hour {
        recs.push(format!("Most affected time: {:02}:00 - avg {:.1}% shaded", hour, avg));
    }

    recs
}

/// Loss in percent of potential, 0 when there is no potential, clamped to [0, 100]
fn loss_percent(potential: f64, actual: f64) -> f64 {
    if potential > 0.0 {
        ((potential - actual) / potential * 100.0).clamp(0.0, 100.0)
    } else {
        0.0
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

fn month_name(date: chrono::NaiveDate) -> String {
    date.format("%B").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const ROOF: [(f64, f64); 4] = [(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)];

    fn sample_time(month: u32, hour: u32) -> SampleTime {
        SampleTime {
            month,
            hour,
            timestamp: NaiveDate::from_ymd_opt(2024, month, 15).unwrap().and_hms_opt(hour, 0, 0).unwrap(),
        }
    }

    #[test]
    fn night_sample_has_no_production_and_no_shadow() {
        let engine = ShadingEngine::default();
        let plane = RoofPlane::new("p", "p", &ROOF, 25.0, 180.0).unwrap();
        let tree = Obstruction::new("t", "tree", &ROOF, 10.0).unwrap();
        let site = Site::new(37.7749, -122.4194);

        let sample = engine.evaluate_sample(&plane, &[&tree], &site, &sample_time(1, 5));
        assert!(!sample.sun.is_up());
        assert_eq!(sample.potential, 0.0);
        assert_eq!(sample.actual, 0.0);
        assert_eq!(sample.shaded_fraction, 0.0);
    }

    #[test]
    fn failing_obstruction_does_not_hide_the_others() {
        let engine = ShadingEngine::default();
        let plane = RoofPlane::new("p", "p", &ROOF, 25.0, 180.0).unwrap();
        let huge = Obstruction::new("huge", "tower", &[(20.0, 20.0), (21.0, 20.0), (21.0, 21.0)], 1e308).unwrap();
        let cover = Obstruction::new("cover", "tree", &[(-1.0, -1.0), (11.0, -1.0), (11.0, 11.0), (-1.0, 11.0)], 10.0).unwrap();
        let site = Site::new(37.7749, -122.4194);

        // Low winter morning sun, so the huge obstruction's shadow length overflows
        let sample = engine.evaluate_sample(&plane, &[&huge, &cover], &site, &sample_time(1, 9));
        assert!(sample.sun.is_up() && sample.sun.elevation_deg < 45.0);
        assert_eq!(sample.failed_obstructions, vec!["huge".to_string()]);
        assert!((sample.shaded_fraction - 100.0).abs() < 1e-6);
        assert!(sample.actual.abs() < 1e-6);
    }

    #[test]
    fn zero_area_roof_gives_empty_result_with_note() {
        let engine = ShadingEngine::default();
        let line = RoofPlane::new("flat", "flat", &[(0.0, 0.0), (5.0, 0.0), (10.0, 0.0)], 20.0, 180.0).unwrap();
        let result = engine.analyze(&[line], &[], 37.7749, -122.4194, 2024);
        let plane = &result.planes[0];
        assert!(plane.error.is_none());
        assert_eq!(plane.annual_energy_loss_percent, 0.0);
        assert_eq!(plane.potential_production_kwh_m2, 0.0);
        assert!(plane.notes[0].contains("DegenerateGeometryError"));
    }

    #[test]
    fn unsupported_year_fails_every_plane_without_panicking() {
        let engine = ShadingEngine::default();
        let plane = RoofPlane::new("p", "p", &ROOF, 25.0, 180.0).unwrap();
        let result = engine.analyze(&[plane], &[], 37.7749, -122.4194, 1_000_000);
        assert!(result.planes[0].error.is_some());
        assert_eq!(result.average_annual_energy_loss, None);
    }

    #[test]
    fn days_in_month_policy_scales_totals() {
        let plane = RoofPlane::new("p", "p", &ROOF, 25.0, 180.0).unwrap();
        let sampler = TimeSampler::single_hour(12).unwrap();
        let engine = ShadingEngine::default().with_sampler(sampler);
        let day = engine.analyze(&[plane.clone()], &[], 37.7749, -122.4194, 2023);
        let month = engine
            .with_monthly_policy(MonthlyPolicy::DaysInMonth)
            .analyze(&[plane], &[], 37.7749, -122.4194, 2023);

        let day_total = day.planes[0].potential_production_kwh_m2;
        let month_total = month.planes[0].potential_production_kwh_m2;
        assert!(month_total > 28.0 * day_total && month_total < 31.5 * day_total);
        let jan = &month.planes[0].monthly_breakdown[0];
        assert!((jan.potential_kwh_m2_month - 31.0 * jan.potential_kwh_m2_day).abs() < 0.2);
    }

    #[test]
    fn recommendation_thresholds() {
        assert!(recommendations(0.0, 0.0, None)[0].starts_with("Excellent"));
        assert!(recommendations(5.0, 5.0, None)[0].starts_with("Moderate"));
        assert!(recommendations(15.0, 15.0, None)[0].starts_with("Moderate"));
        assert!(recommendations(15.1, 15.1, None)[0].starts_with("Significant"));
        assert_eq!(recommendations(4.0, 6.1, None).len(), 2);
        assert_eq!(recommendations(4.0, 6.0, None).len(), 1);
        assert_eq!(recommendations(4.0, 4.0, Some((9, 42.26)))[1], "Most affected time: 09:00 - avg 42.3% shaded");
    }

    #[test]
    fn loss_is_clamped_and_zero_without_potential() {
        assert_eq!(loss_percent(0.0, 0.0), 0.0);
        assert_eq!(loss_percent(100.0, 100.0), 0.0);
        assert_eq!(loss_percent(100.0, 25.0), 75.0);
        assert_eq!(loss_percent(100.0, -1.0), 100.0);
    }

    #[test]
    fn invalid_peak_hours_are_rejected() {
        let analysis = AnalysisParameters { peak_start_hour: 17, peak_end_hour: 10, ..AnalysisParameters::default() };
        let res = ShadingEngine::new(&analysis, &SamplingParameters::default(), &IrradianceParameters::default(), &ProjectionParameters::default());
        assert!(res.is_err());
    }
}
