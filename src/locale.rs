//! Locale quote-mark resolution
//!
//! `Locale` and `CLocale` styles quote with the marks appropriate to the
//! active character map. The charmap is probed once per process; every
//! later lookup reuses the cached answer.

use crate::options::QuotingStyle;
use once_cell::sync::OnceCell;
use std::env;
use std::process::Command;
use tracing::{debug, warn};

const UTF8_LEFT: &str = "\u{2018}";
const UTF8_RIGHT: &str = "\u{2019}";

/// Left and right quotation marks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteMarks {
    pub left: String,
    pub right: String,
}

impl QuoteMarks {
    fn new(left: &str, right: &str) -> Self {
        Self { left: left.to_string(), right: right.to_string() }
    }
}

struct LocaleMarks {
    locale: QuoteMarks,
    clocale: QuoteMarks,
}

static LOCALE_MARKS: OnceCell<LocaleMarks> = OnceCell::new();

/// Quote marks for `style`, probing the locale on first use.
///
/// Styles other than `Locale` and `CLocale` get plain apostrophes.
pub fn locale_quote_marks(style: QuotingStyle) -> &'static QuoteMarks {
    let marks = LOCALE_MARKS.get_or_init(|| {
        let charmap = probe_charmap();
        match &charmap {
            Some(name) => debug!(charmap = %name, "resolved locale charmap"),
            None => warn!("could not determine locale charmap, using ASCII quote marks"),
        }
        LocaleMarks {
            locale: quote_marks_for(QuotingStyle::Locale, charmap.as_deref()),
            clocale: quote_marks_for(QuotingStyle::CLocale, charmap.as_deref()),
        }
    });

    match style {
        QuotingStyle::CLocale => &marks.clocale,
        _ => &marks.locale,
    }
}

/// Quote marks for `style` under the given charmap
pub fn quote_marks_for(style: QuotingStyle, charmap: Option<&str>) -> QuoteMarks {
    if charmap.is_some_and(is_utf8_charmap) {
        return QuoteMarks::new(UTF8_LEFT, UTF8_RIGHT);
    }
    match style {
        QuotingStyle::CLocale => QuoteMarks::new("\"", "\""),
        _ => QuoteMarks::new("'", "'"),
    }
}

/// Whether `name` designates UTF-8
pub fn is_utf8_charmap(name: &str) -> bool {
    name.eq_ignore_ascii_case("UTF-8") || name.eq_ignore_ascii_case("UTF8")
}

/// Determine the active character map name.
///
/// Asks `locale charmap` first and falls back to the locale environment
/// variables when the command is unavailable.
pub fn probe_charmap() -> Option<String> {
    let from_command = Command::new("locale")
        .arg("charmap")
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|stdout| stdout.trim().to_string())
        .filter(|name| !name.is_empty());

    from_command.or_else(|| {
        let locale = ["LC_ALL", "LC_CTYPE", "LANG"]
            .iter()
            .filter_map(|var| env::var(var).ok())
            .find(|value| !value.is_empty())?;
        charmap_from_locale_name(&locale)
    })
}

/// Extract the codeset from a locale name such as `en_US.UTF-8@euro`
fn charmap_from_locale_name(locale: &str) -> Option<String> {
    let (_, codeset) = locale.split_once('.')?;
    let codeset = codeset.split('@').next().unwrap_or(codeset);
    (!codeset.is_empty()).then(|| codeset.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8_charmap_names() {
        assert!(is_utf8_charmap("UTF-8"));
        assert!(is_utf8_charmap("utf8"));
        assert!(!is_utf8_charmap("ANSI_X3.4-1968"));
        assert!(!is_utf8_charmap("ISO-8859-1"));
    }

    #[test]
    fn test_quote_marks_under_utf8() {
        let marks = quote_marks_for(QuotingStyle::Locale, Some("UTF-8"));
        assert_eq!(marks, QuoteMarks::new("‘", "’"));

        let marks = quote_marks_for(QuotingStyle::CLocale, Some("UTF-8"));
        assert_eq!(marks, QuoteMarks::new("‘", "’"));
    }

    #[test]
    fn test_quote_marks_fallback() {
        assert_eq!(quote_marks_for(QuotingStyle::Locale, Some("ANSI_X3.4-1968")), QuoteMarks::new("'", "'"));
        assert_eq!(quote_marks_for(QuotingStyle::CLocale, None), QuoteMarks::new("\"", "\""));
        assert_eq!(quote_marks_for(QuotingStyle::Locale, None), QuoteMarks::new("'", "'"));
    }

    #[test]
    fn test_charmap_from_locale_name() {
        assert_eq!(charmap_from_locale_name("en_US.UTF-8"), Some("UTF-8".to_string()));
        assert_eq!(charmap_from_locale_name("de_DE.ISO-8859-15@euro"), Some("ISO-8859-15".to_string()));
        assert_eq!(charmap_from_locale_name("C"), None);
        assert_eq!(charmap_from_locale_name("POSIX."), None);
    }

    #[test]
    fn test_locale_quote_marks_are_cached() {
        let first = locale_quote_marks(QuotingStyle::Locale);
        let second = locale_quote_marks(QuotingStyle::Locale);
        assert!(std::ptr::eq(first, second));
    }
}
