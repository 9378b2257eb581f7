//! "Edited" notice for posts modified after publication

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

use crate::config::EditNoticeConfig;
use crate::helpers::DateFormatter;
use crate::i18n::I18n;

/// Rendered notice, e.g. `* editado em 25 mar 2021, às 19:25`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct EditNotice(String);

impl EditNotice {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Decides whether a post shows an edit notice and formats it
#[derive(Debug, Clone)]
pub struct EditDetector {
    /// Template with `{date}`, `{hour}` and `{minute}` placeholders
    template: String,
    use_modification_time: bool,
}

impl EditDetector {
    pub fn new(config: &EditNoticeConfig, i18n: &I18n) -> Self {
        Self {
            template: i18n.get("edited"),
            use_modification_time: config.use_modification_time,
        }
    }

    /// `None` when the post was never modified after its creation.
    ///
    /// The notice is rendered from the creation timestamp unless
    /// `edit_notice.use_modification_time` is set.
    pub fn detect(
        &self,
        created: Option<DateTime<FixedOffset>>,
        modified: DateTime<FixedOffset>,
        formatter: &DateFormatter,
    ) -> Option<EditNotice> {
        let created = created?;
        if created == modified {
            return None;
        }

        let shown = if self.use_modification_time {
            modified
        } else {
            created
        };
        let (hour, minute) = formatter.hour_minute(&shown);
        let notice = self
            .template
            .replace("{date}", &formatter.date(&shown))
            .replace("{hour}", &hour)
            .replace("{minute}", &minute);
        Some(EditNotice(notice))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::parse_timestamp;
    use crate::i18n::Locale;

    fn formatter(locale: Locale) -> DateFormatter {
        DateFormatter::new(locale, "UTC", "dd MMM yyyy").unwrap()
    }

    fn ts(s: &str) -> DateTime<FixedOffset> {
        parse_timestamp(s).unwrap()
    }

    #[test]
    fn test_same_timestamp_no_notice() {
        let detector = EditDetector::new(&EditNoticeConfig::default(), &I18n::new("pt-BR"));
        let t = ts("2021-03-25T19:25:28+0000");
        assert_eq!(detector.detect(Some(t), t, &formatter(Locale::PtBr)), None);
    }

    #[test]
    fn test_same_instant_other_offset_no_notice() {
        let detector = EditDetector::new(&EditNoticeConfig::default(), &I18n::new("en"));
        let a = ts("2021-03-25T19:25:28+0000");
        let b = ts("2021-03-25T16:25:28-0300");
        assert_eq!(detector.detect(Some(a), b, &formatter(Locale::En)), None);
    }

    #[test]
    fn test_edited_uses_creation_time_by_default() {
        let detector = EditDetector::new(&EditNoticeConfig::default(), &I18n::new("pt-BR"));
        let created = ts("2021-03-25T19:25:28+0000");
        let modified = ts("2021-04-02T08:03:00+0000");

        let notice = detector
            .detect(Some(created), modified, &formatter(Locale::PtBr))
            .unwrap();
        assert_eq!(notice.as_str(), "* editado em 25 mar 2021, às 19:25");
    }

    #[test]
    fn test_edited_with_modification_time() {
        let config = EditNoticeConfig {
            use_modification_time: true,
        };
        let detector = EditDetector::new(&config, &I18n::new("en"));
        let created = ts("2021-03-25T19:25:28+0000");
        let modified = ts("2021-04-02T08:03:00+0000");

        let notice = detector
            .detect(Some(created), modified, &formatter(Locale::En))
            .unwrap();
        assert_eq!(notice.as_str(), "* edited on 02 Apr 2021, at 08:03");
    }

    #[test]
    fn test_never_published() {
        let detector = EditDetector::new(&EditNoticeConfig::default(), &I18n::new("en"));
        let modified = ts("2021-04-02T08:03:00+0000");
        assert_eq!(detector.detect(None, modified, &formatter(Locale::En)), None);
    }
}
