//! # emx-quotearg
//!
//! Shell-safe quoting and escaping of arbitrary file-name bytes.
//!
//! File names are byte strings: they may hold control characters, invalid
//! UTF-8, or shell metacharacters. This crate turns them into text that is
//! readable on a terminal and, depending on the style, safe to paste back
//! into a shell. Output matches the classic `quotearg` algorithm byte for
//! byte.
//!
//! ## Quoting Styles
//!
//! | style | `a b` | `it's` | `a\nb` |
//! |---|---|---|---|
//! | `literal` | `a b` | `it's` | raw newline |
//! | `shell` | `'a b'` | `"it's"` | `'a` newline `b'` |
//! | `shell-escape` | `'a b'` | `"it's"` | `'a'$'\n''b'` |
//! | `c` | `"a b"` | `"it's"` | `"a\nb"` |
//! | `escape` | `a b` | `it's` | `a\nb` |
//!
//! `locale`, `clocale` and `custom` work like `c` with different quotation
//! marks; see [`locale`] for how the locale's marks are chosen.
//!
//! ## Outer-Quote Elision
//!
//! Styles such as `shell` and `c-maybe` only add quotes when the name needs
//! them. The engine optimistically scans without quotes and restarts with
//! quotes as soon as it meets a character that makes that unsafe.
//!
//! ## Example
//!
//! ```
//! use emx_quotearg::{quote_for_file, restyle, QuotingOptions, QuotingStyle};
//!
//! assert_eq!(quote_for_file(b"notes.txt"), "notes.txt");
//! assert_eq!(quote_for_file(b"my notes.txt"), "'my notes.txt'");
//!
//! let c = QuotingOptions::new(QuotingStyle::C);
//! assert_eq!(restyle(b"tab\there", &c, None), b"\"tab\\there\"");
//! ```

pub mod decoder;
pub mod error;
pub mod locale;
pub mod options;
pub mod printable;
pub mod quote;
pub mod quoter;

pub use decoder::{decode, Decoded, Decoder};
pub use error::{QuoteError, Result};
pub use locale::{locale_quote_marks, QuoteMarks};
pub use options::{QuotingFlags, QuotingOptions, QuotingStyle};
pub use printable::{is_printable, PrintableCache};
pub use quote::{
    quote, quote_colon, quote_custom, quote_for_file, quote_for_file_always,
    quote_mem_bytes, quote_style, quote_with_char, quote_with_options,
    INDICATOR_CHARS,
};
pub use quoter::{restyle, restyled_len};
