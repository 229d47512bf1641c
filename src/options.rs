//! Quoting configuration

use crate::error::{QuoteError, Result};
use bitflags::bitflags;
use std::fmt;
use std::str::FromStr;

const INT_BITS: usize = u32::BITS as usize;

/// Named quoting strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuotingStyle {
    /// Output names as-is
    Literal,
    /// Quote names for the shell if they contain special characters
    Shell,
    /// Always quote names for the shell
    ShellAlways,
    /// Like `Shell`, but use `$'...'` escapes for unprintable characters
    ShellEscape,
    /// Like `ShellAlways`, but use `$'...'` escapes for unprintable characters
    ShellEscapeAlways,
    /// Quote as a C string literal
    C,
    /// Like `C`, but only add the double quotes when needed
    CMaybe,
    /// Backslash-escape like `C`, without the surrounding quotes
    Escape,
    /// Quote with the locale's quotation marks
    Locale,
    /// Like `Locale`, but fall back to double quotes in the C locale
    CLocale,
    /// Quote with caller-supplied left and right marks
    Custom,
}

impl QuotingStyle {
    /// Every style, in canonical order
    pub const ALL: [QuotingStyle; 11] = [
        QuotingStyle::Literal,
        QuotingStyle::Shell,
        QuotingStyle::ShellAlways,
        QuotingStyle::ShellEscape,
        QuotingStyle::ShellEscapeAlways,
        QuotingStyle::C,
        QuotingStyle::CMaybe,
        QuotingStyle::Escape,
        QuotingStyle::Locale,
        QuotingStyle::CLocale,
        QuotingStyle::Custom,
    ];

    /// Canonical name, as accepted by `--quoting-style` style options
    pub fn name(self) -> &'static str {
        match self {
            QuotingStyle::Literal => "literal",
            QuotingStyle::Shell => "shell",
            QuotingStyle::ShellAlways => "shell-always",
            QuotingStyle::ShellEscape => "shell-escape",
            QuotingStyle::ShellEscapeAlways => "shell-escape-always",
            QuotingStyle::C => "c",
            QuotingStyle::CMaybe => "c-maybe",
            QuotingStyle::Escape => "escape",
            QuotingStyle::Locale => "locale",
            QuotingStyle::CLocale => "clocale",
            QuotingStyle::Custom => "custom",
        }
    }
}

impl fmt::Display for QuotingStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for QuotingStyle {
    type Err = QuoteError;

    fn from_str(s: &str) -> Result<Self> {
        let canonical = s.replace('_', "-");
        QuotingStyle::ALL
            .into_iter()
            .find(|style| style.name() == canonical)
            .ok_or_else(|| QuoteError::UnknownStyle(s.to_string()))
    }
}

bitflags! {
    /// Modifiers layered on top of a [`QuotingStyle`]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct QuotingFlags: u8 {
        /// Drop NUL bytes instead of emitting them (styles without escapes)
        const ELIDE_NULL_BYTES = 0b0000_0001;

        /// Omit the surrounding quotes when the name does not need them
        const ELIDE_OUTER_QUOTES = 0b0000_0010;

        /// Break up `??X` sequences that a C compiler would read as trigraphs
        const SPLIT_TRIGRAPHS = 0b0000_0100;
    }
}

/// A complete quoting configuration.
///
/// Options are plain values: call sites clone a base configuration and
/// override what they need rather than mutating a shared default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotingOptions {
    pub(crate) style: QuotingStyle,
    pub(crate) flags: QuotingFlags,
    /// One bit per byte value that must always be escaped
    pub(crate) quote_these_too: [u32; 256 / INT_BITS],
    pub(crate) left_quote: Option<String>,
    pub(crate) right_quote: Option<String>,
    pub(crate) replacement: Option<char>,
}

impl QuotingOptions {
    pub fn new(style: QuotingStyle) -> Self {
        Self {
            style,
            flags: QuotingFlags::empty(),
            quote_these_too: [0; 256 / INT_BITS],
            left_quote: None,
            right_quote: None,
            replacement: None,
        }
    }

    /// Build options from a style name such as `"shell-escape"`
    pub fn from_style_name(name: &str) -> Result<Self> {
        name.parse().map(Self::new)
    }

    /// Options for `Custom` style with the given quote marks
    pub fn custom(left: &str, right: &str) -> Result<Self> {
        let mut options = Self::new(QuotingStyle::Custom);
        options.set_custom_quoting(left, right)?;
        Ok(options)
    }

    pub fn style(&self) -> QuotingStyle {
        self.style
    }

    pub fn flags(&self) -> QuotingFlags {
        self.flags
    }

    pub fn replacement(&self) -> Option<char> {
        self.replacement
    }

    /// Custom left quote mark, if one has been set
    pub fn left_quote(&self) -> Option<&str> {
        self.left_quote.as_deref()
    }

    /// Custom right quote mark, if one has been set
    pub fn right_quote(&self) -> Option<&str> {
        self.right_quote.as_deref()
    }

    /// Replace the style, returning the previous one
    pub fn set_style(&mut self, style: QuotingStyle) -> QuotingStyle {
        std::mem::replace(&mut self.style, style)
    }

    /// Replace the flags, returning the previous ones
    pub fn set_flags(&mut self, flags: QuotingFlags) -> QuotingFlags {
        std::mem::replace(&mut self.flags, flags)
    }

    /// Turn always-quoting of `c` on or off, returning its previous state.
    ///
    /// Only byte-sized characters (up to U+00FF) can be tracked; others are
    /// ignored and report `false`.
    pub fn set_char_quoting(&mut self, c: char, on: bool) -> bool {
        let Ok(byte) = u8::try_from(c) else {
            return false;
        };
        let (word, bit) = Self::slot(byte);
        let previous = self.quote_these_too[word] & bit != 0;
        if on {
            self.quote_these_too[word] |= bit;
        } else {
            self.quote_these_too[word] &= !bit;
        }
        previous
    }

    /// Switch to `Custom` style with the given quote marks
    pub fn set_custom_quoting(&mut self, left: &str, right: &str) -> Result<()> {
        for mark in [left, right] {
            if mark.contains('\0') {
                return Err(QuoteError::InvalidQuoteMark(mark.to_string()));
            }
        }
        self.style = QuotingStyle::Custom;
        self.left_quote = Some(left.to_string());
        self.right_quote = Some(right.to_string());
        Ok(())
    }

    pub fn set_replacement(&mut self, replacement: Option<char>) {
        self.replacement = replacement;
    }

    /// Whether byte `c` is always escaped
    pub fn quotes_char(&self, c: u8) -> bool {
        let (word, bit) = Self::slot(c);
        self.quote_these_too[word] & bit != 0
    }

    /// Whether any character is always escaped
    pub fn has_quote_these_too(&self) -> bool {
        self.quote_these_too.iter().any(|&word| word != 0)
    }

    pub fn with_style(mut self, style: QuotingStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_flags(mut self, flags: QuotingFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_char_quoted(mut self, c: char, on: bool) -> Self {
        self.set_char_quoting(c, on);
        self
    }

    pub fn with_replacement(mut self, replacement: char) -> Self {
        self.replacement = Some(replacement);
        self
    }

    pub fn with_custom_quotes(mut self, left: &str, right: &str) -> Result<Self> {
        self.set_custom_quoting(left, right)?;
        Ok(self)
    }

    /// Drop every always-quoted character
    pub fn without_quote_these_too(mut self) -> Self {
        self.quote_these_too = [0; 256 / INT_BITS];
        self
    }

    fn slot(c: u8) -> (usize, u32) {
        let c = c as usize;
        (c / INT_BITS, 1 << (c % INT_BITS))
    }
}

impl Default for QuotingOptions {
    fn default() -> Self {
        Self::new(QuotingStyle::Escape)
    }
}
