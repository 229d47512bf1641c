//! Convenience entry points
//!
//! Each function builds (or clones) the options it needs and runs the
//! engine once. The `String` variants convert lossily, which only matters
//! for literal and shell styles fed invalid UTF-8; use [`quote_mem_bytes`]
//! when the exact bytes are needed.

use crate::error::Result;
use crate::options::{QuotingFlags, QuotingOptions, QuotingStyle};
use crate::quoter::restyle;

/// Characters a listing appends as type indicators
pub const INDICATOR_CHARS: &str = "*=>@|";

/// Quote for diagnostics, using the locale's quotation marks
pub fn quote(arg: &[u8]) -> String {
    let options = QuotingOptions::new(QuotingStyle::Locale).with_flags(QuotingFlags::ELIDE_NULL_BYTES);
    quote_with_options(arg, &options)
}

/// Quote a file name so it is always delimited by shell quotes
pub fn quote_for_file_always(arg: &[u8]) -> String {
    quote_style(arg, QuotingStyle::ShellAlways)
}

/// Quote a file name for the shell only where needed, treating `:` as special
pub fn quote_for_file(arg: &[u8]) -> String {
    let options = QuotingOptions::new(QuotingStyle::ShellEscape).with_char_quoted(':', true);
    quote_with_options(arg, &options)
}

pub fn quote_style(arg: &[u8], style: QuotingStyle) -> String {
    quote_with_options(arg, &QuotingOptions::new(style))
}

pub fn quote_with_options(arg: &[u8], options: &QuotingOptions) -> String {
    String::from_utf8_lossy(&restyle(arg, options, None)).into_owned()
}

/// Quote with `ch` escaped in addition to whatever `options` escapes
pub fn quote_with_char(arg: &[u8], options: &QuotingOptions, ch: char) -> String {
    let options = options.clone().with_char_quoted(ch, true);
    quote_with_options(arg, &options)
}

/// Quote for colon-separated output
pub fn quote_colon(arg: &[u8], options: &QuotingOptions) -> String {
    quote_with_char(arg, options, ':')
}

/// Quote between custom left and right marks, keeping the other settings
/// of `options`
pub fn quote_custom(arg: &[u8], options: &QuotingOptions, left: &str, right: &str) -> Result<String> {
    let options = options.clone().with_custom_quotes(left, right)?;
    Ok(quote_with_options(arg, &options))
}

/// Quote without lossy conversion
pub fn quote_mem_bytes(arg: &[u8], options: &QuotingOptions) -> Vec<u8> {
    restyle(arg, options, None)
}
