use chrono::{NaiveDate, NaiveDateTime, TimeDelta, TimeZone, Utc};
use spa_sra::spa::{Function, Input, SpaData};
use roof_shading::solar_position::{position_at, Site};

macro_rules! assert_approx {
    ($left:expr, $right:expr, $tol:expr) => {
        let (l, r) = ($left as f64, $right as f64);
        assert!(
            (l - r).abs() <= $tol,
            "assert_approx failed: left={}, right={}, diff={}, tol={}",
            l, r, (l - r).abs(), $tol
        );
    };
}

fn local(year: i32, month: u32, day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day).unwrap().and_hms_opt(hour, 0, 0).unwrap()
}

/// Reference azimuth and elevation from NREL SPA
fn reference(lat: f64, lon: f64, utc_offset: f64, timestamp: NaiveDateTime) -> (f64, f64) {
    let utc = Utc.from_utc_datetime(&(timestamp - TimeDelta::minutes((utc_offset * 60.0) as i64)));
    let mut input = Input::from_date_time(utc);
    input.latitude = lat;
    input.longitude = lon;
    input.pressure = 1013.0;
    input.temperature = 10.0;
    input.elevation = 0.0;
    input.slope = 0.0;
    input.azm_rotation = 0.0;
    input.function = Function::SpaZaRts;

    let mut spa = SpaData::new(input);
    spa.spa_calculate().unwrap();

    (spa.spa_za.azimuth, spa.spa_za.e)
}

#[test]
fn matches_spa_across_sites_and_seasons() {
    let sites = [(37.7749, -122.4194), (56.2, 13.9), (-33.87, 151.21), (-33.92, 18.42)];
    for (lat, lon) in sites {
        let site = Site::new(lat, lon);
        for month in [1, 4, 6, 9, 12] {
            for hour in [9, 12, 15] {
                let t = local(2024, month, 15, hour);
                let (ref_az, ref_el) = reference(lat, lon, site.utc_offset, t);
                if ref_el < 5.0 {
                    continue;
                }
                let sun = site.position(t);
                assert_approx!(sun.elevation_deg, ref_el, 1.0);
                let az_diff = ((sun.azimuth_deg - ref_az + 540.0) % 360.0 - 180.0).abs();
                assert!(az_diff <= 1.0, "azimuth {} vs {} at {} {} {}", sun.azimuth_deg, ref_az, lat, lon, t);
            }
        }
    }
}

#[test]
fn explicit_offset_shifts_the_clock() {
    let t = local(2024, 6, 15, 13);
    let dst = position_at(37.7749, -122.4194, -7.0, t);
    let std = position_at(37.7749, -122.4194, -8.0, local(2024, 6, 15, 12));
    assert_approx!(dst.elevation_deg, std.elevation_deg, 1e-9);
    assert_approx!(dst.azimuth_deg, std.azimuth_deg, 1e-9);
}
