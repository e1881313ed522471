use chrono::{Datelike, NaiveDate, NaiveDateTime};
use crate::config::SamplingParameters;
use crate::errors::ConfigurationError;

/// One sampled moment, in local civil time
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SampleTime {
    pub month: u32,
    pub hour: u32,
    pub timestamp: NaiveDateTime,
}

/// A representative day standing in for its month, with its sampled hours
#[derive(Clone, Debug, PartialEq)]
pub struct RepresentativeDay {
    pub month: u32,
    pub date: NaiveDate,
    pub days_in_month: u32,
    pub samples: Vec<SampleTime>,
}

/// Deterministic discretization of a year into representative (day, hour) samples.
///
/// The default grid is the 15th of every month at whole hours 6 through 18, i.e. 156 samples
/// per roof plane and year. This trades accuracy for a fixed, small cost compared with a full
/// 8760 hour or weather file simulation.
#[derive(Clone, Debug, PartialEq)]
pub struct TimeSampler {
    representative_day: u32,
    months: Vec<u32>,
    first_hour: u32,
    last_hour: u32,
}

impl Default for TimeSampler {
    fn default() -> Self {
        let params = SamplingParameters::default();
        TimeSampler {
            representative_day: params.representative_day,
            months: params.months,
            first_hour: params.first_hour,
            last_hour: params.last_hour,
        }
    }
}

impl TimeSampler {
    /// Returns a new sampler after validating the grid
    ///
    /// # Arguments
    ///
    /// * 'params' - sampling parameters from configuration
    pub fn new(params: &SamplingParameters) -> Result<TimeSampler, ConfigurationError> {
        if !(1..=31).contains(&params.representative_day) {
            return Err(ConfigurationError(format!("representative day {} outside [1, 31]", params.representative_day)));
        }
        if params.months.is_empty() {
            return Err(ConfigurationError("at least one month must be sampled".into()));
        }
        if let Some(m) = params.months.iter().find(|m| !(1..=12).contains(*m)) {
            return Err(ConfigurationError(format!("month {} outside [1, 12]", m)));
        }
        if params.first_hour > params.last_hour || params.last_hour > 23 {
            return Err(ConfigurationError(format!("hour range {}..={} is invalid", params.first_hour, params.last_hour)));
        }

        let mut months = params.months.clone();
        months.sort_unstable();
        months.dedup();

        Ok(TimeSampler {
            representative_day: params.representative_day,
            months,
            first_hour: params.first_hour,
            last_hour: params.last_hour,
        })
    }

    /// A grid with one sample per representative day, for fast tests
    ///
    /// # Arguments
    ///
    /// * 'hour' - the single hour to sample, 0 to 23
    pub fn single_hour(hour: u32) -> Result<TimeSampler, ConfigurationError> {
        TimeSampler::new(&SamplingParameters {
            first_hour: hour,
            last_hour: hour,
            ..SamplingParameters::default()
        })
    }

    /// Number of samples per plane and year
    pub fn samples_per_year(&self) -> usize {
        self.months.len() * (self.last_hour - self.first_hour + 1) as usize
    }

    /// Returns the representative days of a year, each with its sampled hours.
    /// A representative day past the end of a month is moved to that month's last day.
    ///
    /// # Arguments
    ///
    /// * 'year' - the calendar year to sample
    pub fn days(&self, year: i32) -> Result<Vec<RepresentativeDay>, ConfigurationError> {
        let mut days = Vec::with_capacity(self.months.len());

        for &month in self.months.iter() {
            let dim = days_in_month(year, month)
                .ok_or_else(|| ConfigurationError(format!("year {} is not supported", year)))?;
            let date = NaiveDate::from_ymd_opt(year, month, self.representative_day.min(dim))
                .ok_or_else(|| ConfigurationError(format!("invalid date {}-{}", year, month)))?;

            let mut samples = Vec::with_capacity((self.last_hour - self.first_hour + 1) as usize);
            for hour in self.first_hour..=self.last_hour {
                let timestamp = date
                    .and_hms_opt(hour, 0, 0)
                    .ok_or_else(|| ConfigurationError(format!("invalid hour {}", hour)))?;
                samples.push(SampleTime { month, hour, timestamp });
            }

            days.push(RepresentativeDay { month, date, days_in_month: dim, samples });
        }

        Ok(days)
    }
}

/// Number of days in a month, None if the date is not representable
///
/// # Arguments
///
/// * 'year' - calendar year
/// * 'month' - month 1 to 12
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };

    Some(next.pred_opt()?.day())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn default_grid_has_156_samples() {
        let sampler = TimeSampler::default();
        let days = sampler.days(2024).unwrap();
        assert_eq!(sampler.samples_per_year(), 156);
        assert_eq!(days.len(), 12);
        assert_eq!(days.iter().map(|d| d.samples.len()).sum::<usize>(), 156);
        assert!(days.iter().all(|d| d.date.day() == 15));
        assert_eq!(days[0].samples.first().unwrap().timestamp.hour(), 6);
        assert_eq!(days[0].samples.last().unwrap().timestamp.hour(), 18);
    }

    #[test]
    fn grid_is_reproducible() {
        let sampler = TimeSampler::default();
        assert_eq!(sampler.days(2023).unwrap(), sampler.days(2023).unwrap());
    }

    #[test]
    fn late_representative_day_is_clamped_to_month_end() {
        let sampler = TimeSampler::new(&SamplingParameters { representative_day: 31, ..SamplingParameters::default() }).unwrap();
        let days = sampler.days(2023).unwrap();
        assert_eq!(days[1].date, NaiveDate::from_ymd_opt(2023, 2, 28).unwrap());
        assert_eq!(days[3].date, NaiveDate::from_ymd_opt(2023, 4, 30).unwrap());
    }

    #[test]
    fn single_hour_grid() {
        let sampler = TimeSampler::single_hour(12).unwrap();
        assert_eq!(sampler.samples_per_year(), 12);
    }

    #[test]
    fn invalid_grids_are_rejected() {
        assert!(TimeSampler::single_hour(24).is_err());
        assert!(TimeSampler::new(&SamplingParameters { months: vec![], ..SamplingParameters::default() }).is_err());
        assert!(TimeSampler::new(&SamplingParameters { months: vec![13], ..SamplingParameters::default() }).is_err());
        assert!(TimeSampler::new(&SamplingParameters { first_hour: 14, last_hour: 10, ..SamplingParameters::default() }).is_err());
    }

    #[test]
    fn month_lengths() {
        assert_eq!(days_in_month(2024, 2), Some(29));
        assert_eq!(days_in_month(2023, 2), Some(28));
        assert_eq!(days_in_month(2023, 12), Some(31));
        assert_eq!(days_in_month(2023, 13), None);
    }
}
