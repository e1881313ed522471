use chrono::{NaiveDateTime, TimeDelta, Timelike};
use log::warn;
use serde::Serialize;

/// Sun direction as seen from the site
///
/// Azimuth is a compass bearing (0 = North, 90 = East, 180 = South, 270 = West), elevation is
/// the angle above the horizon. Elevation at or below zero means the sun is down.
#[derive(Serialize, Clone, Copy, Debug, PartialEq)]
pub struct SunPosition {
    pub azimuth_deg: f64,
    pub elevation_deg: f64,
}

impl SunPosition {
    pub fn is_up(&self) -> bool {
        self.elevation_deg > 0.0
    }
}

/// Geographic site with its civil clock
///
/// Timestamps handed to [`Site::position`] are local civil time, i.e. UTC plus `utc_offset`.
#[derive(Serialize, Clone, Copy, Debug, PartialEq)]
pub struct Site {
    pub latitude: f64,
    pub longitude: f64,
    pub utc_offset: f64,
}

impl Site {
    /// Returns a site using the nominal solar time zone of the longitude as civil clock.
    ///
    /// Latitude is clamped to [-90, 90] and longitude wrapped into [-180, 180) rather than
    /// rejected.
    ///
    /// # Arguments
    ///
    /// * 'latitude' - site latitude in degrees, north positive
    /// * 'longitude' - site longitude in degrees, east positive
    pub fn new(latitude: f64, longitude: f64) -> Site {
        let latitude = if latitude.is_finite() { latitude } else { 0.0 };
        let longitude = if longitude.is_finite() { longitude } else { 0.0 };

        let clamped = latitude.clamp(-90.0, 90.0);
        if clamped != latitude {
            warn!("latitude {} outside [-90, 90], clamped to {}", latitude, clamped);
        }
        let wrapped = (longitude + 180.0).rem_euclid(360.0) - 180.0;

        Site {
            latitude: clamped,
            longitude: wrapped,
            utc_offset: (wrapped / 15.0).round(),
        }
    }

    /// Replaces the civil clock offset
    ///
    /// # Arguments
    ///
    /// * 'utc_offset' - hours ahead of UTC, clamped to [-14, 14]
    pub fn with_utc_offset(mut self, utc_offset: f64) -> Site {
        if utc_offset.is_finite() {
            self.utc_offset = utc_offset.clamp(-14.0, 14.0);
        }
        self
    }

    /// Sun position at the given local time
    ///
    /// # Arguments
    ///
    /// * 'timestamp' - local civil time at the site
    pub fn position(&self, timestamp: NaiveDateTime) -> SunPosition {
        position_at(self.latitude, self.longitude, self.utc_offset, timestamp)
    }
}

/// Sun position for a site given in plain coordinates, with the nominal solar time zone as clock
///
/// # Arguments
///
/// * 'latitude' - site latitude in degrees
/// * 'longitude' - site longitude in degrees
/// * 'timestamp' - local civil time at the site
pub fn position(latitude: f64, longitude: f64, timestamp: NaiveDateTime) -> SunPosition {
    Site::new(latitude, longitude).position(timestamp)
}

/// Julian day of a UTC instant
pub fn julian_day(utc: NaiveDateTime) -> f64 {
    utc.and_utc().timestamp_millis() as f64 / 86_400_000.0 + 2_440_587.5
}

/// NOAA solar position algorithm.
///
/// The timestamp is local civil time with the given UTC offset. The Julian day is computed from
/// the corresponding UTC instant while the hour angle uses local time corrected by longitude,
/// offset and the equation of time.
///
/// # Arguments
///
/// * 'latitude' - site latitude in degrees
/// * 'longitude' - site longitude in degrees, east positive
/// * 'utc_offset' - hours ahead of UTC of the local clock
/// * 'timestamp' - local civil time
pub fn position_at(latitude: f64, longitude: f64, utc_offset: f64, timestamp: NaiveDateTime) -> SunPosition {
    let utc = timestamp - TimeDelta::seconds((utc_offset * 3600.0).round() as i64);
    let jc = (julian_day(utc) - 2_451_545.0) / 36_525.0;

    // Sun's geometric mean longitude, mean anomaly and the earth's orbital eccentricity
    let mean_long = (280.46646 + jc * (36000.76983 + jc * 0.0003032)).rem_euclid(360.0);
    let mean_anom = 357.52911 + jc * (35999.05029 - 0.0001537 * jc);
    let eccent = 0.016708634 - jc * (0.000042037 + 0.0000001267 * jc);
    let m = mean_anom.to_radians();

    let eq_of_center = m.sin() * (1.914602 - jc * (0.004817 + 0.000014 * jc))
        + (2.0 * m).sin() * (0.019993 - 0.000101 * jc)
        + (3.0 * m).sin() * 0.000289;

    let omega = (125.04 - 1934.136 * jc).to_radians();
    let app_long = (mean_long + eq_of_center - 0.00569 - 0.00478 * omega.sin()).to_radians();

    let mean_obliq = 23.0 + (26.0 + (21.448 - jc * (46.815 + jc * (0.00059 - jc * 0.001813))) / 60.0) / 60.0;
    let obliq = (mean_obliq + 0.00256 * omega.cos()).to_radians();

    let decl = (obliq.sin() * app_long.sin()).asin();

    let eot = equation_of_time(mean_long.to_radians(), m, eccent, obliq);

    let minutes = timestamp.hour() as f64 * 60.0 + timestamp.minute() as f64 + timestamp.second() as f64 / 60.0;
    let true_solar_time = (minutes + eot + 4.0 * longitude - 60.0 * utc_offset).rem_euclid(1440.0);
    let hour_angle = true_solar_time / 4.0 - 180.0;

    let lat = latitude.to_radians();
    let ha = hour_angle.to_radians();
    let cos_zenith = (lat.sin() * decl.sin() + lat.cos() * decl.cos() * ha.cos()).clamp(-1.0, 1.0);
    let zenith = cos_zenith.acos();

    let elevation_deg = 90.0 - zenith.to_degrees();
    let azimuth_deg = azimuth(lat, decl, zenith, hour_angle);

    SunPosition { azimuth_deg, elevation_deg }
}

/// Equation of time in minutes
///
/// # Arguments
///
/// * 'mean_long' - geometric mean longitude of the sun in radians
/// * 'mean_anom' - geometric mean anomaly of the sun in radians
/// * 'eccent' - eccentricity of the earth's orbit
/// * 'obliq' - corrected obliquity of the ecliptic in radians
fn equation_of_time(mean_long: f64, mean_anom: f64, eccent: f64, obliq: f64) -> f64 {
    let y = (obliq / 2.0).tan().powi(2);

    4.0 * (y * (2.0 * mean_long).sin()
        - 2.0 * eccent * mean_anom.sin()
        + 4.0 * eccent * y * mean_anom.sin() * (2.0 * mean_long).cos()
        - 0.5 * y * y * (4.0 * mean_long).sin()
        - 1.25 * eccent * eccent * (2.0 * mean_anom).sin())
    .to_degrees()
}

/// Solar azimuth in degrees clockwise from north, quadrant picked from the hour angle sign
///
/// # Arguments
///
/// * 'lat' - latitude in radians
/// * 'decl' - solar declination in radians
/// * 'zenith' - solar zenith angle in radians
/// * 'hour_angle' - hour angle in degrees, negative before solar noon
fn azimuth(lat: f64, decl: f64, zenith: f64, hour_angle: f64) -> f64 {
    let denominator = lat.cos() * zenith.sin();
    let cos_az = if denominator.abs() < 1e-12 {
        1.0
    } else {
        ((lat.sin() * zenith.cos() - decl.sin()) / denominator).clamp(-1.0, 1.0)
    };
    let angle = cos_az.acos().to_degrees();

    if hour_angle > 0.0 {
        (angle + 180.0).rem_euclid(360.0)
    } else {
        (540.0 - angle).rem_euclid(360.0)
    }
}
