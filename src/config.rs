use std::fs;
use log::LevelFilter;
use serde::Deserialize;
use thiserror::Error;
use crate::manager_shading::models::MonthlyPolicy;

#[derive(Deserialize, Clone, Debug)]
pub struct GeoRef {
    pub lat: f64,
    pub long: f64,
    #[serde(default)]
    pub utc_offset: Option<f64>,
}

/// Which engine the worker runs
#[derive(Deserialize, Clone, Copy, PartialEq, Eq, Debug, Default)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisMode {
    /// Simulation when a site location is configured, proximity heuristic otherwise
    #[default]
    Auto,
    Simulation,
    Proximity,
}

#[derive(Deserialize, Clone, Debug)]
pub struct RunParameters {
    pub year: i32,
    #[serde(default)]
    pub mode: AnalysisMode,
    #[serde(default = "default_threads")]
    pub threads: usize,
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct AnalysisParameters {
    pub peak_start_hour: u32,
    pub peak_end_hour: u32,
    pub monthly_policy: MonthlyPolicy,
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct SamplingParameters {
    pub representative_day: u32,
    pub months: Vec<u32>,
    pub first_hour: u32,
    pub last_hour: u32,
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct IrradianceParameters {
    pub solar_constant: f64,
    pub clarity: f64,
    pub temperature_c: f64,
    pub temp_coefficient: f64,
    pub min_derate: f64,
    pub max_derate: f64,
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct ProjectionParameters {
    pub cutoff_elevation_deg: f64,
    pub cutoff_margin: f64,
}

#[derive(Deserialize, Clone, Debug)]
pub struct Files {
    pub geometry: String,
    pub output_dir: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct General {
    pub log_path: String,
    pub log_level: LevelFilter,
    pub log_to_stdout: bool,
}

#[derive(Deserialize, Clone, Debug)]
pub struct Config {
    #[serde(default)]
    pub geo_ref: Option<GeoRef>,
    pub run: RunParameters,
    #[serde(default)]
    pub analysis: AnalysisParameters,
    #[serde(default)]
    pub sampling: SamplingParameters,
    #[serde(default)]
    pub irradiance: IrradianceParameters,
    #[serde(default)]
    pub projection: ProjectionParameters,
    pub files: Files,
    pub general: General,
}

fn default_threads() -> usize { 2 }

impl Default for AnalysisParameters {
    fn default() -> Self {
        AnalysisParameters {
            peak_start_hour: 10,
            peak_end_hour: 16,
            monthly_policy: MonthlyPolicy::RepresentativeDay,
        }
    }
}

impl Default for SamplingParameters {
    fn default() -> Self {
        SamplingParameters {
            representative_day: 15,
            months: (1..=12).collect(),
            first_hour: 6,
            last_hour: 18,
        }
    }
}

impl Default for IrradianceParameters {
    fn default() -> Self {
        IrradianceParameters {
            solar_constant: 1367.0,
            clarity: 1.0,
            temperature_c: 25.0,
            temp_coefficient: 0.004,
            min_derate: 0.7,
            max_derate: 1.0,
        }
    }
}

impl Default for ProjectionParameters {
    fn default() -> Self {
        ProjectionParameters {
            cutoff_elevation_deg: 5.0,
            cutoff_margin: 1.2,
        }
    }
}

/// Loads the configuration file and returns a struct with all configuration items
///
/// # Arguments
///
/// * 'config_path' - path to the configuration file
pub fn load_config(config_path: &str) -> Result<Config, LoadConfigurationError> {
    let toml = fs::read_to_string(config_path)?;

    parse_config(&toml)
}

/// Parses configuration from a TOML document
///
/// # Arguments
///
/// * 'toml' - the configuration document
pub fn parse_config(toml: &str) -> Result<Config, LoadConfigurationError> {
    let config: Config = toml::from_str(toml)?;

    Ok(config)
}

/// Error depicting errors that occur while loading configuration
///
#[derive(Debug, Error)]
pub enum LoadConfigurationError {
    #[error("FileError: {0}")]
    FileError(#[from] std::io::Error),
    #[error("ParseError: {0}")]
    ParseError(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
        [run]
        year = 2024

        [files]
        geometry = "geometry.json"
        output_dir = "out/"

        [general]
        log_path = "log/"
        log_level = "info"
        log_to_stdout = true
    "#;

    #[test]
    fn minimal_config_gets_defaults() {
        let config = parse_config(MINIMAL).unwrap();
        assert!(config.geo_ref.is_none());
        assert_eq!(config.run.mode, AnalysisMode::Auto);
        assert_eq!(config.run.threads, 2);
        assert_eq!(config.sampling, SamplingParameters::default());
        assert_eq!(config.irradiance.solar_constant, 1367.0);
        assert_eq!(config.projection.cutoff_margin, 1.2);
        assert_eq!(config.analysis.monthly_policy, MonthlyPolicy::RepresentativeDay);
        assert_eq!(config.general.log_level, LevelFilter::Info);
    }

    #[test]
    fn sections_override_defaults() {
        let toml = format!("{}\n{}", MINIMAL, r#"
            [geo_ref]
            lat = 37.7749
            long = -122.4194
            utc_offset = -8.0

            [analysis]
            monthly_policy = "days_in_month"

            [sampling]
            first_hour = 11
            last_hour = 13
        "#);
        let config = parse_config(&toml).unwrap();
        assert_eq!(config.geo_ref.unwrap().utc_offset, Some(-8.0));
        assert_eq!(config.analysis.monthly_policy, MonthlyPolicy::DaysInMonth);
        assert_eq!(config.analysis.peak_start_hour, 10);
        assert_eq!(config.sampling.first_hour, 11);
        assert_eq!(config.sampling.representative_day, 15);
    }

    #[test]
    fn missing_year_is_an_error() {
        let res = parse_config(&MINIMAL.replace("year = 2024", ""));
        assert!(matches!(res, Err(LoadConfigurationError::ParseError(_))));
    }
}
