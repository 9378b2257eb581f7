//! Date helper functions

use anyhow::Result;
use chrono::{DateTime, TimeZone};
use chrono_tz::Tz;

use crate::config::SiteConfig;
use crate::i18n::Locale;

/// Format a date using a date-fns / Moment.js style pattern with localized
/// month names
///
/// # Examples
/// ```ignore
/// format_date(&date, "dd MMM yyyy", Locale::PtBr) // -> "25 mar 2021"
/// ```
pub fn format_date<T: TimeZone>(date: &DateTime<T>, format: &str, locale: Locale) -> String
where
    T::Offset: std::fmt::Display,
{
    let chrono_format = pattern_to_chrono_format(format);
    date.format_localized(&chrono_format, locale.chrono_locale())
        .to_string()
}

/// Format a date in ISO 8601 / XML format
pub fn date_xml<T: TimeZone>(date: &DateTime<T>) -> String
where
    T::Offset: std::fmt::Display,
{
    date.format("%Y-%m-%dT%H:%M:%S%:z").to_string()
}

/// Formats CMS timestamps for display in the site's locale and timezone
#[derive(Debug, Clone)]
pub struct DateFormatter {
    locale: Locale,
    timezone: Tz,
    date_format: String,
}

impl DateFormatter {
    pub fn new(locale: Locale, timezone: &str, date_format: &str) -> Result<Self> {
        let timezone: Tz = if timezone.is_empty() {
            Tz::UTC
        } else {
            timezone
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid timezone {:?}: {}", timezone, e))?
        };
        Ok(Self {
            locale,
            timezone,
            date_format: date_format.to_string(),
        })
    }

    pub fn from_config(config: &SiteConfig) -> Result<Self> {
        Self::new(
            Locale::from_language(&config.language),
            &config.timezone,
            &config.listing.date_format,
        )
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Format with an explicit pattern
    pub fn format<T: TimeZone>(&self, date: &DateTime<T>, pattern: &str) -> String {
        format_date(&date.with_timezone(&self.timezone), pattern, self.locale)
    }

    /// Display date, e.g. `25 mar 2021`
    pub fn date<T: TimeZone>(&self, date: &DateTime<T>) -> String {
        self.format(date, &self.date_format)
    }

    /// Two-digit hour and minute, e.g. `("19", "05")`
    pub fn hour_minute<T: TimeZone>(&self, date: &DateTime<T>) -> (String, String) {
        (self.format(date, "HH"), self.format(date, "mm"))
    }
}

/// Convert a date-fns / Moment.js pattern to a chrono format string
fn pattern_to_chrono_format(format: &str) -> String {
    // Longer tokens first so that e.g. `MMM` is not eaten by `MM`
    let replacements = [
        // Year
        ("yyyy", "%Y"),
        ("YYYY", "%Y"),
        ("yy", "%y"),
        ("YY", "%y"),
        // Month
        ("MMMM", "%B"),
        ("MMM", "%b"),
        ("MM", "%m"),
        // Day of month
        ("dd", "%d"),
        ("DD", "%d"),
        // Hour 24h / 12h
        ("HH", "%H"),
        ("hh", "%I"),
        // Minute (after MM)
        ("mm", "%M"),
        // Second
        ("ss", "%S"),
    ];

    let mut result = format.to_string();

    for (from, to) in replacements {
        result = result.replace(from, to);
    }

    result
}
