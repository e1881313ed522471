use crate::config::IrradianceParameters;
use crate::solar_position::SunPosition;

/// Clear-sky irradiance and panel efficiency model
///
/// Irradiance follows the Kasten-Young air mass approximation with a `0.7^(AM^0.678)`
/// attenuation. Efficiency is the cosine of the angle of incidence between panel normal and sun
/// vector, derated linearly for temperature.
#[derive(Clone, Debug, PartialEq)]
pub struct IrradianceModel {
    solar_constant: f64,
    clarity: f64,
    temperature_c: f64,
    temp_coefficient: f64,
    min_derate: f64,
    max_derate: f64,
}

impl Default for IrradianceModel {
    fn default() -> Self {
        IrradianceModel::new(&IrradianceParameters::default())
    }
}

impl IrradianceModel {
    /// Returns a new irradiance model
    ///
    /// # Arguments
    ///
    /// * 'params' - irradiance parameters from configuration
    pub fn new(params: &IrradianceParameters) -> IrradianceModel {
        IrradianceModel {
            solar_constant: params.solar_constant,
            clarity: params.clarity.max(0.0),
            temperature_c: params.temperature_c,
            temp_coefficient: params.temp_coefficient,
            min_derate: params.min_derate.min(params.max_derate),
            max_derate: params.max_derate,
        }
    }

    /// Clear-sky irradiance in W/m² for the given sun elevation, zero when the sun is down
    ///
    /// # Arguments
    ///
    /// * 'elevation_deg' - sun elevation in degrees
    pub fn clear_sky_irradiance(&self, elevation_deg: f64) -> f64 {
        if elevation_deg <= 0.0 {
            return 0.0;
        }

        self.solar_constant * 0.7f64.powf(air_mass(elevation_deg).powf(0.678)) * self.clarity
    }

    /// Fraction (0 to 1) of the clear-sky irradiance a panel converts, given its orientation
    /// and the model's ambient temperature
    ///
    /// # Arguments
    ///
    /// * 'tilt_deg' - panel tilt from horizontal
    /// * 'panel_azimuth_deg' - compass direction the panel faces
    /// * 'sun' - sun position
    pub fn panel_efficiency(&self, tilt_deg: f64, panel_azimuth_deg: f64, sun: &SunPosition) -> f64 {
        self.panel_efficiency_at(tilt_deg, panel_azimuth_deg, sun, self.temperature_c)
    }

    /// Same as [`IrradianceModel::panel_efficiency`] with an explicit panel temperature
    ///
    /// # Arguments
    ///
    /// * 'tilt_deg' - panel tilt from horizontal
    /// * 'panel_azimuth_deg' - compass direction the panel faces
    /// * 'sun' - sun position
    /// * 'temperature_c' - panel temperature in degrees Celsius
    pub fn panel_efficiency_at(&self, tilt_deg: f64, panel_azimuth_deg: f64, sun: &SunPosition, temperature_c: f64) -> f64 {
        if !sun.is_up() {
            return 0.0;
        }

        let tilt = tilt_deg.to_radians();
        let el = sun.elevation_deg.to_radians();
        let rel_az = (sun.azimuth_deg - panel_azimuth_deg).to_radians();

        // Sun behind the panel plane gives zero, never negative, production
        let cos_aoi = (el.sin() * tilt.cos() + el.cos() * tilt.sin() * rel_az.cos()).max(0.0);

        let derate = (1.0 - self.temp_coefficient * (temperature_c - 25.0)).clamp(self.min_derate, self.max_derate);

        cos_aoi * derate
    }
}

/// Relative optical path length through the atmosphere (Kasten-Young)
///
/// # Arguments
///
/// * 'elevation_deg' - sun elevation in degrees, expected to be positive
pub fn air_mass(elevation_deg: f64) -> f64 {
    1.0 / (elevation_deg.to_radians().sin() + 0.50572 * (elevation_deg + 6.07995).powf(-1.6364))
}

/// Clear-sky irradiance in W/m² with the standard solar constant
///
/// # Arguments
///
/// * 'elevation_deg' - sun elevation in degrees
/// * 'clarity' - atmospheric clarity factor, 1.0 for a clean atmosphere
pub fn clear_sky_irradiance(elevation_deg: f64, clarity: f64) -> f64 {
    IrradianceModel::new(&IrradianceParameters { clarity, ..IrradianceParameters::default() })
        .clear_sky_irradiance(elevation_deg)
}

/// Panel efficiency with the standard temperature derate
///
/// # Arguments
///
/// * 'tilt_deg' - panel tilt from horizontal
/// * 'panel_azimuth_deg' - compass direction the panel faces
/// * 'sun_azimuth_deg' - sun azimuth
/// * 'sun_elevation_deg' - sun elevation
/// * 'temperature_c' - panel temperature in degrees Celsius
pub fn panel_efficiency(tilt_deg: f64, panel_azimuth_deg: f64, sun_azimuth_deg: f64, sun_elevation_deg: f64, temperature_c: f64) -> f64 {
    let sun = SunPosition { azimuth_deg: sun_azimuth_deg, elevation_deg: sun_elevation_deg };
    IrradianceModel::default().panel_efficiency_at(tilt_deg, panel_azimuth_deg, &sun, temperature_c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_irradiance_below_horizon() {
        assert_eq!(clear_sky_irradiance(0.0, 1.0), 0.0);
        assert_eq!(clear_sky_irradiance(-12.0, 1.0), 0.0);
    }

    #[test]
    fn zenith_irradiance_is_about_one_kilowatt() {
        let i = clear_sky_irradiance(90.0, 1.0);
        assert!(i > 900.0 && i < 1000.0, "got {}", i);
        assert!((air_mass(90.0) - 1.0).abs() < 0.01);
    }

    #[test]
    fn irradiance_grows_with_elevation_and_clarity() {
        assert!(clear_sky_irradiance(10.0, 1.0) < clear_sky_irradiance(30.0, 1.0));
        assert!((clear_sky_irradiance(45.0, 0.8) - 0.8 * clear_sky_irradiance(45.0, 1.0)).abs() < 1e-9);
    }

    #[test]
    fn sun_behind_vertical_panel_gives_zero() {
        assert_eq!(panel_efficiency(90.0, 180.0, 0.0, 30.0, 25.0), 0.0);
        assert_eq!(panel_efficiency(90.0, 180.0, 0.0, 89.0, 25.0), 0.0);
    }

    #[test]
    fn sun_normal_to_panel_gives_full_efficiency() {
        let e = panel_efficiency(30.0, 180.0, 180.0, 60.0, 25.0);
        assert!((e - 1.0).abs() < 1e-12);
    }

    #[test]
    fn temperature_derate_is_bounded() {
        let hot = panel_efficiency(0.0, 180.0, 180.0, 90.0, 125.0);
        let cold = panel_efficiency(0.0, 180.0, 180.0, 90.0, -40.0);
        assert!((hot - 0.7).abs() < 1e-12);
        assert!((cold - 1.0).abs() < 1e-12);
        assert!((panel_efficiency(0.0, 180.0, 180.0, 90.0, 35.0) - 0.96).abs() < 1e-12);
    }

    #[test]
    fn no_efficiency_at_night() {
        assert_eq!(panel_efficiency(25.0, 180.0, 180.0, -1.0, 25.0), 0.0);
    }
}
