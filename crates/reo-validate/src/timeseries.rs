//! Length checks and resampling for annual time series.

use thiserror::Error;

/// Hours in the canonical (non-leap) simulation year.
pub const HOURS_PER_YEAR: usize = 8760;

/// Series that are resampled to the scenario resolution instead of only
/// being length-checked.
pub const WHOLESALE_SERIES: &[&str] = &[
    "wholesale_rate_us_dollars_per_kwh",
    "wholesale_rate_above_site_load_us_dollars_per_kwh",
];

/// Series length that matches none of the accepted resolutions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "Invalid length for {name}. Samples must be hourly (8,760 samples), 30 minute (17,520 samples), or 15 minute (35,040 samples)"
)]
pub struct InvalidSeriesLength {
    pub name: String,
    pub len: usize,
}

/// A series that was rewritten at a new resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct Resampled {
    pub values: Vec<f64>,
    pub message: String,
}

/// Normalizes series against the scenario's time steps per hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSeriesNormalizer {
    steps_per_hour: usize,
}

impl TimeSeriesNormalizer {
    pub fn new(steps_per_hour: usize) -> Self {
        Self {
            steps_per_hour: steps_per_hour.max(1),
        }
    }

    pub fn steps_per_hour(&self) -> usize {
        self.steps_per_hour
    }

    /// Normalize `values` named `name`, resampling the wholesale series.
    pub fn normalize(
        &self,
        name: &str,
        values: &[f64],
    ) -> Result<Option<Resampled>, InvalidSeriesLength> {
        self.normalize_with(name, values, WHOLESALE_SERIES.contains(&name))
    }

    /// `Ok(None)` means the series is already acceptable as is.
    ///
    /// With an hourly target every finer series is block-averaged to hourly.
    /// With a finer target only `resample_to_target` series are converted;
    /// others are length-checked.
    pub fn normalize_with(
        &self,
        name: &str,
        values: &[f64],
        resample_to_target: bool,
    ) -> Result<Option<Resampled>, InvalidSeriesLength> {
        let invalid = || InvalidSeriesLength {
            name: name.to_string(),
            len: values.len(),
        };
        let source = steps_in(values.len()).ok_or_else(invalid)?;
        let target = self.steps_per_hour;

        if target == 1 {
            if source == 1 {
                return Ok(None);
            }
            return Ok(Some(Resampled {
                values: block_average(values, source),
                message: format!(
                    "Downsampled {name} from {} minute resolution to hourly resolution to match time_steps_per_hour via average.",
                    60 / source
                ),
            }));
        }

        if !resample_to_target || source == target {
            return Ok(None);
        }
        let resampled = if source > target {
            if source % target != 0 {
                return Err(invalid());
            }
            Resampled {
                values: block_average(values, source / target),
                message: format!(
                    "Downsampled {name} from {} minute resolution to {} minute resolution to match time_steps_per_hour via average.",
                    60 / source,
                    60 / target
                ),
            }
        } else {
            if target % source != 0 {
                return Err(invalid());
            }
            Resampled {
                values: forward_fill(values, target / source),
                message: format!(
                    "Upsampled {name} from {} resolution to {} minute resolution to match time_steps_per_hour via forward-fill.",
                    resolution_label(source),
                    60 / target
                ),
            }
        };
        Ok(Some(resampled))
    }
}

/// Steps per hour implied by a series length.
fn steps_in(len: usize) -> Option<usize> {
    match len {
        8760 => Some(1),
        17520 => Some(2),
        35040 => Some(4),
        _ => None,
    }
}

fn resolution_label(steps_per_hour: usize) -> String {
    if steps_per_hour == 1 {
        "hourly".to_string()
    } else {
        format!("{} minute", 60 / steps_per_hour)
    }
}

fn block_average(values: &[f64], factor: usize) -> Vec<f64> {
    values
        .chunks(factor)
        .map(|block| block.iter().sum::<f64>() / block.len() as f64)
        .collect()
}

fn forward_fill(values: &[f64], factor: usize) -> Vec<f64> {
    values
        .iter()
        .flat_map(|value| std::iter::repeat_n(*value, factor))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn series(len: usize) -> Vec<f64> {
        (0..len).map(|idx| idx as f64).collect()
    }

    #[test]
    fn hourly_series_is_untouched_for_hourly_target() {
        let normalizer = TimeSeriesNormalizer::new(1);
        assert_eq!(normalizer.normalize("loads_kw", &series(8760)), Ok(None));
    }

    #[test]
    fn half_hourly_series_is_averaged_to_hourly() {
        let normalizer = TimeSeriesNormalizer::new(1);
        let resampled = normalizer
            .normalize("loads_kw", &series(17520))
            .expect("valid")
            .expect("resampled");
        assert_eq!(resampled.values.len(), HOURS_PER_YEAR);
        assert_eq!(resampled.values[0], 0.5);
        assert_eq!(resampled.values[1], 2.5);
        assert_eq!(
            resampled.message,
            "Downsampled loads_kw from 30 minute resolution to hourly resolution to match time_steps_per_hour via average."
        );
    }

    #[test]
    fn quarter_hourly_series_is_averaged_to_hourly() {
        let normalizer = TimeSeriesNormalizer::new(1);
        let resampled = normalizer
            .normalize("critical_loads_kw", &vec![2.0; 35040])
            .expect("valid")
            .expect("resampled");
        assert_eq!(resampled.values, vec![2.0; 8760]);
        assert!(resampled.message.contains("from 15 minute resolution"));
    }

    #[test]
    fn unexpected_length_is_rejected() {
        for steps in [1, 2, 4] {
            let err = TimeSeriesNormalizer::new(steps)
                .normalize("loads_kw", &series(9000))
                .unwrap_err();
            assert_eq!(err.len, 9000);
            assert!(err.to_string().starts_with("Invalid length for loads_kw."));
        }
    }

    #[test]
    fn finer_target_only_checks_ordinary_series() {
        let normalizer = TimeSeriesNormalizer::new(4);
        assert_eq!(normalizer.normalize("loads_kw", &series(8760)), Ok(None));
    }

    #[test]
    fn wholesale_series_follow_the_target_resolution() {
        let name = WHOLESALE_SERIES[0];

        let up = TimeSeriesNormalizer::new(4)
            .normalize(name, &series(8760))
            .expect("valid")
            .expect("resampled");
        assert_eq!(up.values.len(), 35040);
        assert_eq!(&up.values[..5], &[0.0, 0.0, 0.0, 0.0, 1.0]);
        assert_eq!(
            up.message,
            format!("Upsampled {name} from hourly resolution to 15 minute resolution to match time_steps_per_hour via forward-fill.")
        );

        let half_to_quarter = TimeSeriesNormalizer::new(4)
            .normalize(name, &series(17520))
            .expect("valid")
            .expect("resampled");
        assert!(half_to_quarter.message.contains("from 30 minute resolution to 15 minute"));

        let hourly_to_half = TimeSeriesNormalizer::new(2)
            .normalize(name, &series(8760))
            .expect("valid")
            .expect("resampled");
        assert_eq!(hourly_to_half.values.len(), 17520);
        assert!(hourly_to_half.message.contains("hourly resolution to 30 minute"));

        let down = TimeSeriesNormalizer::new(2)
            .normalize(name, &series(35040))
            .expect("valid")
            .expect("resampled");
        assert_eq!(down.values.len(), 17520);
        assert_eq!(down.values[0], 0.5);
        assert_eq!(
            down.message,
            format!("Downsampled {name} from 15 minute resolution to 30 minute resolution to match time_steps_per_hour via average.")
        );
    }

    #[test]
    fn matching_wholesale_series_is_untouched() {
        let normalizer = TimeSeriesNormalizer::new(2);
        assert_eq!(normalizer.normalize(WHOLESALE_SERIES[1], &series(17520)), Ok(None));
    }
}
