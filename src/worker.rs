use std::fs;
use log::{info, warn};
use serde::Serialize;
use thiserror::Error;
use roof_shading::config::{AnalysisMode, Config, GeoRef};
use roof_shading::errors::ConfigurationError;
use roof_shading::manager_proximity::ProximityEngine;
use roof_shading::manager_shading::ShadingEngine;
use roof_shading::models::GeometryInput;
use roof_shading::solar_position::Site;

/// Runs one analysis as described by the configuration
///
/// # Arguments
///
/// * 'config' - configuration
pub fn run(config: &Config) -> Result<(), WorkerError> {
    let input = load_geometry(&config.files.geometry)?;
    info!("loaded {} roof planes and {} obstructions from {}",
        input.roof_planes.len(), input.obstructions.len(), config.files.geometry);

    let year = config.run.year;
    match resolve_mode(config.run.mode, config.geo_ref.as_ref())? {
        AnalysisMode::Proximity => {
            let result = ProximityEngine::new().analyze_records(&input.roof_planes, &input.obstructions);
            if let Some(risk) = result.average_shade_risk {
                info!("average shade risk: {:.1}", risk);
            }
            for note in result.notes.iter() {
                warn!("{}", note);
            }
            save_result(&config.files.output_dir, &format!("{}_proximity.json", year), &result)?;
        },
        _ => {
            let geo_ref = config.geo_ref.as_ref()
                .ok_or(WorkerError::ModeError("simulation requires a geo_ref section".to_string()))?;
            let engine = ShadingEngine::from_config(config)?;
            let site = site(geo_ref);

            let result = engine.analyze_records(&input.roof_planes, &input.obstructions, &site, year);
            for plane in result.planes.iter() {
                match &plane.error {
                    Some(e) => warn!("plane {}: {}", plane.plane_id, e),
                    None => info!("plane {}: annual loss {:.2} %, peak hours loss {:.2} %",
                        plane.plane_id, plane.annual_energy_loss_percent, plane.peak_hours_loss_percent),
                }
            }
            for note in result.notes.iter() {
                warn!("{}", note);
            }
            save_result(&config.files.output_dir, &format!("{}_shading.json", year), &result)?;
        }
    }

    Ok(())
}

/// Picks the analysis to run, auto falls back to the proximity heuristic when no location is known
///
/// # Arguments
///
/// * 'mode' - configured mode
/// * 'geo_ref' - configured site location, if any
fn resolve_mode(mode: AnalysisMode, geo_ref: Option<&GeoRef>) -> Result<AnalysisMode, WorkerError> {
    match (mode, geo_ref) {
        (AnalysisMode::Auto, Some(_)) => Ok(AnalysisMode::Simulation),
        (AnalysisMode::Auto, None) => {
            info!("no site location configured, using proximity heuristic");
            Ok(AnalysisMode::Proximity)
        },
        (AnalysisMode::Simulation, None) => Err(WorkerError::ModeError("simulation requires a geo_ref section".to_string())),
        (m, _) => Ok(m),
    }
}

fn site(geo_ref: &GeoRef) -> Site {
    let site = Site::new(geo_ref.lat, geo_ref.long);
    match geo_ref.utc_offset {
        Some(offset) => site.with_utc_offset(offset),
        None => site,
    }
}

/// Loads roof planes and obstructions from a json file
///
/// # Arguments
///
/// * 'path' - path to the geometry file
fn load_geometry(path: &str) -> Result<GeometryInput, WorkerError> {
    let json = fs::read_to_string(path)
        .map_err(|e| WorkerError::LoadGeometryError(format!("error reading {}: {}", path, e)))?;

    serde_json::from_str(&json)
        .map_err(|e| WorkerError::LoadGeometryError(format!("error parsing {}: {}", path, e)))
}

/// Saves an analysis result as pretty printed json
///
/// # Arguments
///
/// * 'path' - path to the output dir
/// * 'file_name' - name of the output file
/// * 'result' - result to save
fn save_result<T: Serialize>(path: &str, file_name: &str, result: &T) -> Result<(), WorkerError> {
    let filename = format!("{}{}", path, file_name);

    let json = serde_json::to_string_pretty(result)
        .map_err(|e| WorkerError::SaveResultError(format!("error serializing result: {}", e)))?;

    fs::write(&filename, json)
        .map_err(|e| WorkerError::SaveResultError(format!("error writing result to file: {}", e)))?;

    info!("Result saved to {}", filename);

    Ok(())
}

/// Error depicting errors that occur while running an analysis
///
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("error while loading geometry: {0:?}")]
    LoadGeometryError(String),
    #[error("error while selecting analysis mode: {0:?}")]
    ModeError(String),
    #[error("error while setting up the shading engine: {0}")]
    EngineError(#[from] ConfigurationError),
    #[error("error while saving result: {0:?}")]
    SaveResultError(String),
}
