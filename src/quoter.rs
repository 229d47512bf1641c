//! The restyling engine
//!
//! [`restyle`] walks a byte buffer once per attempt, deciding for every
//! character whether it can be stored as-is, needs a backslash escape, or
//! needs an octal escape. Styles that try to elide their outer quotes may
//! discover halfway through that the quotes are needed after all; the scan
//! then bails out with [`ForceOuterQuoting`] and the engine starts over with
//! a configuration that always quotes.

use crate::decoder::decode;
use crate::locale::locale_quote_marks;
use crate::options::{QuotingFlags, QuotingOptions, QuotingStyle};
use crate::printable::is_printable;
use tracing::trace;

/// Restyle attempts allowed before the engine gives up.
///
/// Retries only ever move towards styles that need no further retry, so
/// two hops are the most any input takes.
pub const MAX_RESTYLE_DEPTH: usize = 3;

/// Quote `arg` according to `options`.
///
/// When `max_len` is set the output is silently truncated to that many
/// bytes; [`restyled_len`] reports the untruncated length.
pub fn restyle(arg: &[u8], options: &QuotingOptions, max_len: Option<usize>) -> Vec<u8> {
    restyle_at(arg, options, max_len, 0).buf
}

/// Length `restyle` would produce without a cap
pub fn restyled_len(arg: &[u8], options: &QuotingOptions) -> usize {
    restyle_at(arg, options, Some(0), 0).len
}

fn restyle_at(arg: &[u8], options: &QuotingOptions, max_len: Option<usize>, depth: usize) -> Output {
    assert!(
        depth < MAX_RESTYLE_DEPTH,
        "restyling {:?} did not settle after {} attempts",
        options.style(),
        depth
    );

    let mut restyler = Restyler::new(arg, options, max_len);
    match restyler.run() {
        Ok(Finish::Done) => restyler.out,
        Ok(Finish::PreferC) => {
            trace!(depth, "single quote needs no shell quoting, restyling as c");
            let c_options = options.clone().with_style(QuotingStyle::C);
            restyle_at(arg, &c_options, max_len, depth + 1)
        }
        Err(ForceOuterQuoting) => {
            let retry = restyler.retry_options();
            trace!(from = %options.style(), to = %retry.style(), depth, "outer quotes required, restyling");
            restyle_at(arg, &retry, max_len, depth + 1)
        }
    }
}

/// Raised mid-scan when eliding the outer quotes turns out to be unsafe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ForceOuterQuoting;

type Scan<T = ()> = std::result::Result<T, ForceOuterQuoting>;

/// How a completed scan wants to finish
enum Finish {
    Done,
    /// Shell quoting only needed for apostrophes; C quoting reads better
    PreferC,
}

/// What remains to store for the current position
enum Emit {
    /// Store, escaping it if it is in the always-quoted set
    Byte(u8),
    /// Store with a leading backslash
    Escaped(u8),
    /// Store unconditionally
    Raw(u8),
    /// Store nothing
    Skip,
}

/// Per-character scan state
#[derive(Debug, Default)]
struct Position {
    /// A backslash escape has been opened for this character
    escaping: bool,
    /// Whether C and shell quoting treat this character alike
    compat: bool,
    consumed: usize,
    /// The closing quote string starts here
    is_right_quote: bool,
}

/// Output accumulator with an optional cap
struct Output {
    buf: Vec<u8>,
    /// Bytes produced, including any dropped by the cap
    len: usize,
    cap: Option<usize>,
}

impl Output {
    fn new(cap: Option<usize>) -> Self {
        Self { buf: Vec::new(), len: 0, cap }
    }

    fn push(&mut self, b: u8) {
        if self.cap.map_or(true, |cap| self.len < cap) {
            self.buf.push(b);
        }
        self.len += 1;
    }
}

/// Scan state for one restyle attempt
struct Restyler<'a> {
    arg: &'a [u8],
    options: &'a QuotingOptions,
    out: Output,
    style: QuotingStyle,
    backslash_escapes: bool,
    elide_outer_quotes: bool,
    quote_string: String,
    pending_shell_escape_end: bool,
    encountered_single_quote: bool,
    all_c_and_shell_quote_compat: bool,
}

impl<'a> Restyler<'a> {
    fn new(arg: &'a [u8], options: &'a QuotingOptions, max_len: Option<usize>) -> Self {
        Self {
            arg,
            options,
            out: Output::new(max_len),
            style: options.style(),
            backslash_escapes: false,
            elide_outer_quotes: options.flags().contains(QuotingFlags::ELIDE_OUTER_QUOTES),
            quote_string: String::new(),
            pending_shell_escape_end: false,
            encountered_single_quote: false,
            all_c_and_shell_quote_compat: true,
        }
    }

    /// Options for the next attempt after a forced retry
    fn retry_options(&self) -> QuotingOptions {
        let style = if self.style == QuotingStyle::ShellAlways && self.backslash_escapes {
            QuotingStyle::ShellEscapeAlways
        } else {
            self.style
        };
        self.options
            .clone()
            .with_style(style)
            .with_flags(self.options.flags() - QuotingFlags::ELIDE_OUTER_QUOTES)
            .without_quote_these_too()
    }

    fn run(&mut self) -> Scan<Finish> {
        self.resolve_style();

        let mut i = 0;
        while i < self.arg.len() {
            i += self.step(i)?;
        }

        if self.out.len == 0 && self.style == QuotingStyle::ShellAlways && self.elide_outer_quotes {
            return Err(ForceOuterQuoting);
        }

        if self.style == QuotingStyle::ShellAlways
            && !self.elide_outer_quotes
            && self.encountered_single_quote
            && self.all_c_and_shell_quote_compat
        {
            return Ok(Finish::PreferC);
        }

        if !self.elide_outer_quotes {
            let quote_string = std::mem::take(&mut self.quote_string);
            self.push_str(&quote_string);
        }
        Ok(Finish::Done)
    }

    /// Settle the effective style, escape mode and quote string, and open
    /// the quotes unless they are being elided.
    fn resolve_style(&mut self) {
        match self.style {
            QuotingStyle::C | QuotingStyle::CMaybe => {
                if self.style == QuotingStyle::CMaybe {
                    self.style = QuotingStyle::C;
                    self.elide_outer_quotes = true;
                }
                if !self.elide_outer_quotes {
                    self.out.push(b'"');
                }
                self.backslash_escapes = true;
                self.quote_string = "\"".to_string();
            }
            QuotingStyle::Escape => {
                self.backslash_escapes = true;
                self.elide_outer_quotes = false;
            }
            QuotingStyle::Locale | QuotingStyle::CLocale | QuotingStyle::Custom => {
                let custom = (self.options.left_quote(), self.options.right_quote());
                let (left, right) = match (self.style, custom) {
                    (QuotingStyle::Custom, (Some(left), Some(right))) => (left.to_string(), right.to_string()),
                    _ => {
                        let marks = locale_quote_marks(self.style);
                        (marks.left.clone(), marks.right.clone())
                    }
                };
                if !self.elide_outer_quotes {
                    self.push_str(&left);
                }
                self.backslash_escapes = true;
                self.quote_string = right;
            }
            QuotingStyle::Shell
            | QuotingStyle::ShellEscape
            | QuotingStyle::ShellEscapeAlways
            | QuotingStyle::ShellAlways => {
                if self.style == QuotingStyle::ShellEscape {
                    self.backslash_escapes = true;
                }
                if matches!(self.style, QuotingStyle::Shell | QuotingStyle::ShellEscape) {
                    self.elide_outer_quotes = true;
                }
                if self.style != QuotingStyle::ShellAlways && !self.elide_outer_quotes {
                    self.backslash_escapes = true;
                }
                self.style = QuotingStyle::ShellAlways;
                if !self.elide_outer_quotes {
                    self.out.push(b'\'');
                }
                self.quote_string = "'".to_string();
            }
            QuotingStyle::Literal => {
                self.elide_outer_quotes = false;
            }
        }
    }

    /// Handle the character at `i`, returning the number of bytes consumed
    fn step(&mut self, i: usize) -> Scan<usize> {
        let arg = self.arg;
        let shell_always = self.style == QuotingStyle::ShellAlways;
        let mut pos = Position { consumed: 1, ..Position::default() };

        // The closing quote compares raw bytes, so a multibyte quote string
        // is matched even when it starts mid-character.
        if self.backslash_escapes
            && !shell_always
            && !self.quote_string.is_empty()
            && arg[i..].starts_with(self.quote_string.as_bytes())
        {
            if self.elide_outer_quotes {
                return Err(ForceOuterQuoting);
            }
            pos.is_right_quote = true;
        }

        let c = arg[i];
        let emit = match c {
            b'\0' => {
                if self.backslash_escapes {
                    self.start_esc(&mut pos.escaping)?;
                    // keep a following digit from extending the octal escape
                    if !shell_always && arg.get(i + 1).is_some_and(u8::is_ascii_digit) {
                        self.out.push(b'0');
                        self.out.push(b'0');
                    }
                    Emit::Byte(b'0')
                } else if self.options.flags().contains(QuotingFlags::ELIDE_NULL_BYTES) {
                    Emit::Skip
                } else {
                    Emit::Byte(c)
                }
            }

            b'?' => match self.style {
                QuotingStyle::ShellAlways if self.elide_outer_quotes => {
                    return Err(ForceOuterQuoting);
                }
                QuotingStyle::C
                    if self.options.flags().contains(QuotingFlags::SPLIT_TRIGRAPHS)
                        && i + 2 < arg.len()
                        && arg[i + 1] == b'?'
                        && matches!(
                            arg[i + 2],
                            b'!' | b'\'' | b'(' | b')' | b'-' | b'/' | b'<' | b'=' | b'>'
                        ) =>
                {
                    if self.elide_outer_quotes {
                        return Err(ForceOuterQuoting);
                    }
                    for b in *b"?\"\"?" {
                        self.out.push(b);
                    }
                    pos.consumed = 3;
                    Emit::Byte(arg[i + 2])
                }
                _ => Emit::Byte(c),
            },

            b'\x07' => self.c_escape(i, b'a', &mut pos)?,
            b'\x08' => self.c_escape(i, b'b', &mut pos)?,
            b'\x0C' => self.c_escape(i, b'f', &mut pos)?,
            b'\x0B' => self.c_escape(i, b'v', &mut pos)?,
            b'\n' | b'\r' | b'\t' => {
                if shell_always && self.elide_outer_quotes {
                    return Err(ForceOuterQuoting);
                }
                let esc = match c {
                    b'\n' => b'n',
                    b'\r' => b'r',
                    _ => b't',
                };
                self.c_escape(i, esc, &mut pos)?
            }
            b'\\' => {
                if shell_always {
                    if self.elide_outer_quotes {
                        return Err(ForceOuterQuoting);
                    }
                    Emit::Raw(c)
                } else if self.backslash_escapes && self.elide_outer_quotes && !self.quote_string.is_empty() {
                    Emit::Raw(c)
                } else {
                    self.c_escape(i, b'\\', &mut pos)?
                }
            }

            // braces only matter standing alone, '#' and '~' only up front
            b'{' | b'}' if arg.len() != 1 => Emit::Byte(c),
            b'{' | b'}' | b'#' | b'~' if i != 0 => Emit::Byte(c),
            b'{' | b'}' | b'#' | b'~' | b' ' => {
                pos.compat = true;
                self.shell_special(c)?
            }
            b'!' | b'"' | b'$' | b'&' | b'(' | b')' | b'*' | b';' | b'<' | b'=' | b'>' | b'[' | b'^'
            | b'`' | b'|' => self.shell_special(c)?,

            b'\'' => {
                self.encountered_single_quote = true;
                pos.compat = true;
                if shell_always {
                    if self.elide_outer_quotes {
                        return Err(ForceOuterQuoting);
                    }
                    for b in *b"'\\'" {
                        self.out.push(b);
                    }
                    self.pending_shell_escape_end = false;
                }
                Emit::Byte(c)
            }

            b'%' | b'+' | b',' | b'-' | b'.' | b'/' | b'0'..=b'9' | b':' | b'A'..=b'Z' | b']' | b'_'
            | b'a'..=b'z' => {
                pos.compat = true;
                Emit::Byte(c)
            }

            _ => self.multibyte(i, &mut pos)?,
        };

        match emit {
            Emit::Skip => return Ok(pos.consumed),
            Emit::Byte(b) => {
                let quote_these_too = ((self.backslash_escapes && !shell_always) || self.elide_outer_quotes)
                    && self.options.quotes_char(b);
                if quote_these_too || pos.is_right_quote {
                    self.start_esc(&mut pos.escaping)?;
                }
                self.store(b, pos.escaping, pos.compat);
            }
            Emit::Escaped(b) => {
                self.start_esc(&mut pos.escaping)?;
                self.store(b, pos.escaping, pos.compat);
            }
            Emit::Raw(b) => self.store(b, pos.escaping, pos.compat),
        }
        Ok(pos.consumed)
    }

    /// Short backslash escape such as `\n`, or the plain path without escapes
    fn c_escape(&mut self, i: usize, esc: u8, pos: &mut Position) -> Scan<Emit> {
        if self.backslash_escapes {
            Ok(Emit::Escaped(esc))
        } else {
            self.multibyte(i, pos)
        }
    }

    fn shell_special(&self, c: u8) -> Scan<Emit> {
        if self.style == QuotingStyle::ShellAlways && self.elide_outer_quotes {
            return Err(ForceOuterQuoting);
        }
        Ok(Emit::Byte(c))
    }

    /// Decode the sequence at `i` and emit it raw, octal-escaped or replaced.
    ///
    /// All bytes but the last are stored here; the last is handed back so it
    /// goes through the common store path.
    fn multibyte(&mut self, i: usize, pos: &mut Position) -> Scan<Emit> {
        let arg = self.arg;
        let Some(decoded) = decode(arg, i) else {
            return Ok(Emit::Skip);
        };
        let span = &arg[i..i + decoded.len];
        let printable = decoded.ch.is_some_and(is_printable);
        pos.compat = printable;
        pos.consumed = decoded.len;

        if !printable && self.backslash_escapes {
            let (last, init) = match span.split_last() {
                Some((&last, init)) => (last, init),
                None => return Ok(Emit::Skip),
            };
            for &b in init {
                self.octal_escape(b, &mut pos.escaping)?;
                self.out.push(b'0' + (b & 7));
            }
            self.octal_escape(last, &mut pos.escaping)?;
            return Ok(Emit::Raw(b'0' + (last & 7)));
        }

        if !printable {
            if let Some(replacement) = self.options.replacement() {
                let mut utf8 = [0; 4];
                return Ok(self.emit_all_but_last(replacement.encode_utf8(&mut utf8).as_bytes(), pos.escaping));
            }
        }

        if span.len() == 1 {
            return Ok(Emit::Byte(span[0]));
        }

        if pos.is_right_quote {
            self.out.push(b'\\');
        }
        Ok(self.emit_all_but_last(span, pos.escaping))
    }

    /// Open an escape and store the first two octal digits of `b`
    fn octal_escape(&mut self, b: u8, escaping: &mut bool) -> Scan {
        self.start_esc(escaping)?;
        self.out.push(b'0' + (b >> 6));
        self.out.push(b'0' + ((b >> 3) & 7));
        Ok(())
    }

    fn emit_all_but_last(&mut self, bytes: &[u8], escaping: bool) -> Emit {
        match bytes.split_last() {
            Some((&last, init)) => {
                for &b in init {
                    self.end_esc(escaping);
                    self.out.push(b);
                }
                Emit::Raw(last)
            }
            None => Emit::Skip,
        }
    }

    /// Begin a backslash escape, opening a `$'...'` run in shell style
    fn start_esc(&mut self, escaping: &mut bool) -> Scan {
        if self.elide_outer_quotes {
            return Err(ForceOuterQuoting);
        }
        *escaping = true;
        if self.style == QuotingStyle::ShellAlways && !self.pending_shell_escape_end {
            for b in *b"'$'" {
                self.out.push(b);
            }
            self.pending_shell_escape_end = true;
        }
        self.out.push(b'\\');
        Ok(())
    }

    /// Close an open `$'...'` run before storing a plain character
    fn end_esc(&mut self, escaping: bool) {
        if self.pending_shell_escape_end && !escaping {
            self.out.push(b'\'');
            self.out.push(b'\'');
            self.pending_shell_escape_end = false;
        }
    }

    fn store(&mut self, b: u8, escaping: bool, compat: bool) {
        self.end_esc(escaping);
        self.out.push(b);
        if !compat {
            self.all_c_and_shell_quote_compat = false;
        }
    }

    fn push_str(&mut self, s: &str) {
        for &b in s.as_bytes() {
            self.out.push(b);
        }
    }
}
