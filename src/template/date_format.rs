use chrono::NaiveDate;

/// The date tokens a pattern may contain, longest first so that `yyyy` is
/// never consumed as two `yy`s. Everything else in the pattern is literal.
const DATE_TOKENS: [(&str, &str); 5] = [
    ("yyyy", "%Y"),
    ("Mon", "%b"),
    ("dd", "%d"),
    ("mm", "%m"),
    ("yy", "%y"),
];

/// Formats `date` according to a pattern of `dd`/`mm`/`yy`/`yyyy`/`Mon`
/// tokens. The pattern is scanned once, so substituted text is never
/// rescanned and literal characters pass through untouched.
///
/// ```
/// use chrono::NaiveDate;
/// use invoice_sheet::template::format_date;
///
/// let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
/// assert_eq!(format_date(date, "dd/mm/yyyy"), "07/03/2024");
/// assert_eq!(format_date(date, "Mon dd, yyyy"), "Mar 07, 2024");
/// ```
#[must_use]
pub fn format_date(date: NaiveDate, pattern: &str) -> String {
    let mut result = String::with_capacity(pattern.len());
    let mut rest = pattern;

    'scan: while !rest.is_empty() {
        for (token, spec) in DATE_TOKENS {
            if let Some(tail) = rest.strip_prefix(token) {
                result.push_str(&date.format(spec).to_string());
                rest = tail;
                continue 'scan;
            }
        }

        let c = rest.chars().next().expect("rest is not empty");
        result.push(c);
        rest = &rest[c.len_utf8()..];
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_common_patterns() {
        let d = date(2021, 12, 31);
        assert_eq!(format_date(d, "dd/mm/yyyy"), "31/12/2021");
        assert_eq!(format_date(d, "Mon dd, yyyy"), "Dec 31, 2021");
        assert_eq!(format_date(d, "yy-mm-dd"), "21-12-31");
        assert_eq!(format_date(d, "ddmmyy"), "311221");
    }

    #[test]
    fn test_yyyy_is_not_consumed_as_two_yy() {
        assert_eq!(format_date(date(2024, 3, 7), "yyyy"), "2024");
        assert_eq!(format_date(date(2024, 3, 7), "yyyyyy"), "202424");
    }

    #[test]
    fn test_substituted_text_is_not_rescanned() {
        // "May" contains a `y`; a naive search-and-replace would mangle it.
        assert_eq!(format_date(date(2024, 5, 1), "Mon yy"), "May 24");
    }

    #[test]
    fn test_literals_pass_through() {
        assert_eq!(
            format_date(date(2024, 3, 7), "invoice no. dd (final)"),
            "invoice no. 07 (final)"
        );
        assert_eq!(format_date(date(2024, 3, 7), ""), "");
    }
}
