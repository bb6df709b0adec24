//! Collapses the provider's 3-hour forecast feed into daily entries.

use std::collections::HashSet;

use chrono::TimeZone;

use crate::model::{DailyForecastEntry, ForecastSample};

/// Maximum number of days shown in the forecast strip.
pub const MAX_FORECAST_DAYS: usize = 5;

/// Keep the first sample of each calendar day, in input order, up to
/// [`MAX_FORECAST_DAYS`] days.
///
/// Calendar days are taken in `tz`, so the same feed can bucket differently
/// for viewers in different zones. No averaging happens: the entry carries the
/// first sample's values verbatim.
pub fn reduce<Tz: TimeZone>(samples: &[ForecastSample], tz: &Tz) -> Vec<DailyForecastEntry> {
    let mut seen = HashSet::new();
    let mut days = Vec::with_capacity(MAX_FORECAST_DAYS);

    for sample in samples {
        if days.len() == MAX_FORECAST_DAYS {
            break;
        }

        let date = sample.timestamp.with_timezone(tz).date_naive();
        if !seen.insert(date) {
            continue;
        }

        days.push(DailyForecastEntry {
            date,
            temperature_c: sample.temperature_c,
            description: sample.description.clone(),
            icon: sample.icon.clone(),
        });
    }

    days
}
