//! Normalization of extracted document text.
//!
//! Masks volatile substrings (timestamps, dates, page counters, the date of a
//! "generated on" footer) and collapses whitespace, so that re-extracting
//! unchanged documents at a different time yields byte-identical text.
//!
//! Masking runs on each document body separately; the cache adds the
//! `--- Document: <path> ---` delimiters afterwards, so dates inside file
//! names survive.

use std::sync::OnceLock;

use regex::Regex;

const MONTHS: &str = "january|february|march|april|may|june|july|august|september|october|\
                      november|december|jan|feb|mar|apr|jun|jul|aug|sept|sep|oct|nov|dec";

/// Alternatives of one calendar date, ISO date-times included.
fn date_pattern() -> String {
    [
        r"\d{4}-\d{2}-\d{2}(?:[T ]\d{2}:\d{2}(?::\d{2}(?:\.\d+)?)?(?:Z|[+-]\d{2}:?\d{2})?)?"
            .to_string(),
        r"\d{4}[-/.]\d{1,2}[-/.]\d{1,2}".to_string(),
        r"\d{1,2}[-/.]\d{1,2}[-/.]\d{2,4}".to_string(),
        format!(r"\d{{1,2}}\s+(?:{MONTHS})\b\.?,?\s+\d{{4}}"),
        format!(r"(?:{MONTHS})\b\.?\s+\d{{1,2}}(?:st|nd|rd|th)?,?\s+\d{{4}}"),
    ]
    .join("|")
}

const CLOCK: &str = r"\d{1,2}:\d{2}(?::\d{2})?(?:\s*[ap]m\b)?";

/// Ordered masking rules.
///
/// Bare `HH:MM` is left alone (it is as likely a ratio as a time); a clock
/// time is masked only with seconds, an am/pm suffix, or right after a date.
fn rules() -> &'static [(Regex, &'static str)] {
    static RULES: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();
    RULES.get_or_init(|| {
        let date = date_pattern();
        let specs: Vec<(String, &'static str)> = vec![
            (
                format!(
                    r"(?i)\b(?:generated|printed|exported)\s+(?:on|at)\s+(?:(?:{date})(?:,?\s+(?:at\s+)?{CLOCK})?|{CLOCK})(?:\s+by\s+[\w.-]+)?"
                ),
                "[generated]",
            ),
            (r"(?i)\bpage\s+\d+\s*(?:of|/)\s*\d+\b".into(), "[page]"),
            (
                r"\b\d{4}-\d{2}-\d{2}[T ]\d{2}:\d{2}(?::\d{2}(?:\.\d+)?)?(?:Z|[+-]\d{2}:?\d{2})?"
                    .into(),
                "[timestamp]",
            ),
            (r"\b\d{4}[-/.]\d{1,2}[-/.]\d{1,2}\b".into(), "[date]"),
            (r"\b\d{1,2}[-/.]\d{1,2}[-/.]\d{2,4}\b".into(), "[date]"),
            (
                format!(r"(?i)\b\d{{1,2}}\s+(?:{MONTHS})\b\.?,?\s+\d{{4}}\b"),
                "[date]",
            ),
            (
                format!(r"(?i)\b(?:{MONTHS})\b\.?\s+\d{{1,2}}(?:st|nd|rd|th)?,?\s+\d{{4}}\b"),
                "[date]",
            ),
            (
                format!(r"(?i)\[date\],?\s+(?:at\s+)?{CLOCK}"),
                "[date] [time]",
            ),
            (r"(?i)\b\d{1,2}:\d{2}:\d{2}\b(?:\s*[ap]m\b)?".into(), "[time]"),
            (r"(?i)\b\d{1,2}:\d{2}\s*[ap]m\b".into(), "[time]"),
        ];
        specs
            .into_iter()
            .filter_map(|(pattern, replacement)| match Regex::new(&pattern) {
                Ok(re) => Some((re, replacement)),
                Err(e) => {
                    tracing::error!(%pattern, error = %e, "invalid normalization pattern");
                    None
                }
            })
            .collect()
    })
}

/// Replaces volatile substrings with stable placeholders.
pub fn mask_volatile(text: &str) -> String {
    let mut out = text.to_string();
    for (re, replacement) in rules() {
        if re.is_match(&out) {
            out = re.replace_all(&out, *replacement).into_owned();
        }
    }
    out
}

/// Collapses every run of whitespace (including newlines) to one space and
/// trims both ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Full normalization of one text: mask, then collapse.
pub fn normalize(text: &str) -> String {
    collapse_whitespace(&mask_volatile(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_whitespace() {
        assert_eq!(collapse_whitespace("  a\n\n b\t\tc  "), "a b c");
    }

    #[test]
    fn masks_generated_footer_date_and_author() {
        let a = normalize("Rates\nGenerated on 12 March 2024 at 10:15 by Core\nEnd");
        let b = normalize("Rates\nGenerated on 3 April 2025 at 09:01 by Core\nEnd");
        assert_eq!(a, "Rates [generated] End");
        assert_eq!(a, b);
        assert_eq!(
            normalize("Printed at 2024-05-01 08:30 by ops.batch, page 1"),
            "[generated], page 1"
        );
    }

    #[test]
    fn generated_in_prose_is_kept() {
        let text = "Interest generated on savings is credited monthly at 2.1% p.a.";
        assert_eq!(normalize(text), text);
        assert_ne!(
            normalize(text),
            normalize("Interest generated on savings is credited monthly at 3.5% p.a.")
        );
    }

    #[test]
    fn ratios_are_not_times() {
        let text = "Debt to equity must stay below 60:40 for approval.";
        assert_eq!(normalize(text), text);
        assert_ne!(
            normalize(text),
            normalize("Debt to equity must stay below 70:30 for approval.")
        );
    }

    #[test]
    fn masks_pages_dates_and_times() {
        assert_eq!(normalize("Page 3 of 12"), "[page]");
        assert_eq!(normalize("as of 2024-05-01T08:30:00Z"), "as of [timestamp]");
        assert_eq!(normalize("due 31/12/2024"), "due [date]");
        assert_eq!(normalize("due 2024.12.31"), "due [date]");
        assert_eq!(normalize("signed Jan 5th, 2024"), "signed [date]");
        assert_eq!(normalize("signed 5 January 2024"), "signed [date]");
        assert_eq!(normalize("at 10:45 pm today"), "at [time] today");
        assert_eq!(normalize("run 07:15:02 ok"), "run [time] ok");
        assert_eq!(normalize("cut-off 31/12/2024 at 18:00"), "cut-off [date] [time]");
    }

    #[test]
    fn keeps_business_numbers() {
        let text = "Limit 25,000 EUR at 4.5% for 36 months";
        assert_eq!(normalize(text), text);
    }
}
