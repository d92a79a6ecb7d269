//! Number format classification.
//!
//! Cell values in SpreadsheetML carry no date type: a date is a serial number
//! whose cell style points at a date-like number format. This module decides,
//! from a format ID and its code, whether a numeric cell is a timestamp.

/// Number format information.
#[derive(Debug, Clone)]
pub struct NumberFormat {
    /// Format ID
    pub id: u32,
    /// Format code (e.g., "General", "0.00", "mm/dd/yyyy")
    pub code: String,
}

impl NumberFormat {
    /// Create a new number format.
    #[inline]
    pub fn new(id: u32, code: String) -> Self {
        Self { id, code }
    }

    /// Check if this format represents a date/time format.
    pub fn is_date_format(&self) -> bool {
        is_date_format(&self.code)
    }
}

/// Check if a built-in number format ID is a date/time format.
///
/// IDs 14-22, 45 and 47 are the built-in date and time formats (46 is an
/// elapsed duration); 27-36 and 50-58 are locale-specific (CJK) date formats.
#[inline]
pub fn is_builtin_date_format(id: u32) -> bool {
    matches!(id, 14..=22 | 27..=36 | 45 | 47 | 50..=58)
}

/// Check if a format code represents a date/time format.
///
/// Elapsed-time formats such as `[h]:mm:ss` are durations, not timestamps.
pub fn is_date_format(format: &str) -> bool {
    let mut escaped = false;
    let mut is_quote = false;
    let mut brackets = 0u8;
    let mut prev = ' ';
    let mut hms = false;
    let mut ap = false;

    for s in format.chars() {
        match (s, escaped, is_quote, ap, brackets) {
            (_, true, ..) => escaped = false, // if escaped, ignore
            ('_' | '\\', ..) => escaped = true,
            ('"', _, true, _, _) => is_quote = false,
            (_, _, true, _, _) => (), // inside quotes, skip
            ('"', _, _, _, _) => is_quote = true,
            (';', ..) => return false, // first format only
            ('[', ..) => brackets += 1,
            (']', .., 1) if hms => return false, // elapsed time
            (']', ..) => brackets = brackets.saturating_sub(1),
            ('a' | 'A', _, _, false, 0) => ap = true,
            ('p' | 'm' | '/' | 'P' | 'M', _, _, true, 0) => return true,
            ('d' | 'm' | 'h' | 'y' | 's' | 'D' | 'M' | 'H' | 'Y' | 'S', _, _, false, 0) => {
                return true;
            },
            _ => {
                if !(hms && s.eq_ignore_ascii_case(&prev)) {
                    hms = prev == '[' && matches!(s, 'm' | 'h' | 's' | 'M' | 'H' | 'S');
                }
            },
        }
        prev = s;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_date_format() {
        assert!(is_date_format("DD/MM/YY"));
        assert!(is_date_format("yyyy-mm-dd"));
        assert!(is_date_format("H:MM:SS;@"));
        assert!(is_date_format("m\"M\"d\"D\";@"));

        assert!(!is_date_format("General"));
        assert!(!is_date_format("0.00"));
        assert!(!is_date_format("\"$\"#,##0_);[Red](\"$\"#,##0)"));
        assert!(!is_date_format("\\Y000000"));
        assert!(!is_date_format("#,##0.0####\" YMD\""));
        assert!(!is_date_format("[h]:mm:ss"));
        assert!(!is_date_format("[m]"));
    }

    #[test]
    fn test_is_builtin_date_format() {
        assert!(is_builtin_date_format(14));
        assert!(is_builtin_date_format(22));
        assert!(is_builtin_date_format(47));
        assert!(!is_builtin_date_format(46));
        assert!(!is_builtin_date_format(0));
        assert!(!is_builtin_date_format(2));
        assert!(!is_builtin_date_format(49));
    }

    #[test]
    fn test_number_format_struct() {
        assert!(NumberFormat::new(164, "d-mmm-yyyy".to_string()).is_date_format());
        assert!(!NumberFormat::new(165, "0.000".to_string()).is_date_format());
    }
}
