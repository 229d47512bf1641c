//! emx-quotearg CLI
//!
//! Quote file names (similar to `ls --quoting-style`).

use anyhow::{Context, Result};
use base64::Engine;
use clap::{Args, Parser, Subcommand};
use emx_quotearg::{
    quote_for_file, quote_mem_bytes, restyle, Decoder, QuotingFlags, QuotingOptions, QuotingStyle,
    INDICATOR_CHARS,
};
use std::ffi::OsString;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "emx-quotearg")]
#[command(author = "nzinfo <li.monan@gmail.com>")]
#[command(version)]
#[command(about = "Shell-safe file name quoting tool")]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Quote names given as arguments (default: one per line on stdin)
    Quote {
        /// Names to quote
        names: Vec<OsString>,

        /// Names are base64-encoded raw bytes
        #[arg(long)]
        base64: bool,

        /// Truncate each result to this many bytes
        #[arg(long)]
        max_len: Option<usize>,

        #[command(flatten)]
        style: StyleArgs,
    },

    /// Quote every path below a directory
    List {
        /// Directory to walk
        #[arg(default_value = ".")]
        directory: PathBuf,

        /// Also escape the type indicator characters `*=>@|`
        #[arg(long)]
        indicators: bool,

        #[command(flatten)]
        style: StyleArgs,
    },

    /// Print the names of all quoting styles
    Styles,
}

#[derive(Args, Debug, Default)]
struct StyleArgs {
    /// Quoting style
    #[arg(short = 's', long = "style")]
    style: Option<String>,

    /// Always escape ':'
    #[arg(long)]
    colon: bool,

    /// Always escape this character (repeatable)
    #[arg(short = 'q', long = "quote-char")]
    quote_chars: Vec<char>,

    /// Drop NUL bytes
    #[arg(long)]
    elide_null: bool,

    /// Break up C trigraphs
    #[arg(long)]
    split_trigraphs: bool,

    /// Left quote mark (selects the custom style)
    #[arg(long, requires = "right")]
    left: Option<String>,

    /// Right quote mark (selects the custom style)
    #[arg(long, requires = "left")]
    right: Option<String>,

    /// Show unprintable characters as this character
    #[arg(long)]
    replacement: Option<char>,
}

impl StyleArgs {
    fn is_default(&self) -> bool {
        self.style.is_none()
            && !self.colon
            && self.quote_chars.is_empty()
            && !self.elide_null
            && !self.split_trigraphs
            && self.left.is_none()
            && self.replacement.is_none()
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Quote { names, base64, max_len, style } => {
            quote_names(names, base64, max_len, &style)?;
        }
        Commands::List { directory, indicators, style } => {
            list_directory(&directory, indicators, &style)?;
        }
        Commands::Styles => {
            for style in QuotingStyle::ALL {
                println!("{}", style);
            }
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn build_options(args: &StyleArgs, default_style: QuotingStyle) -> Result<QuotingOptions> {
    let mut options = match &args.style {
        Some(name) => QuotingOptions::from_style_name(name)?,
        None => QuotingOptions::new(default_style),
    };

    let mut flags = QuotingFlags::empty();
    if args.elide_null {
        flags |= QuotingFlags::ELIDE_NULL_BYTES;
    }
    if args.split_trigraphs {
        flags |= QuotingFlags::SPLIT_TRIGRAPHS;
    }
    options.set_flags(flags);

    if args.colon {
        options.set_char_quoting(':', true);
    }
    for &ch in &args.quote_chars {
        if u8::try_from(ch).is_err() {
            anyhow::bail!("cannot always-quote '{}': only characters up to U+00FF are supported", ch);
        }
        options.set_char_quoting(ch, true);
    }

    if let (Some(left), Some(right)) = (&args.left, &args.right) {
        options.set_custom_quoting(left, right)?;
    }
    options.set_replacement(args.replacement);

    debug!(style = %options.style(), flags = ?options.flags(), "quoting options");
    Ok(options)
}

fn quote_names(names: Vec<OsString>, base64: bool, max_len: Option<usize>, args: &StyleArgs) -> Result<()> {
    let options = build_options(args, QuotingStyle::ShellEscape)?;

    let raw_names = if names.is_empty() {
        let mut buffer = Vec::new();
        io::stdin().read_to_end(&mut buffer)?;
        split_lines(&buffer)
    } else {
        names.iter().map(|name| os_bytes(name)).collect()
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for raw in raw_names {
        let name = if base64 {
            base64::engine::general_purpose::STANDARD
                .decode(&raw)
                .with_context(|| format!("Failed to decode base64 name: {}", String::from_utf8_lossy(&raw)))?
        } else {
            raw
        };

        if tracing::enabled!(tracing::Level::DEBUG) {
            let invalid = Decoder::new(&name).filter(|(_, decoded)| decoded.is_invalid()).count();
            debug!(bytes = name.len(), invalid_spans = invalid, "quoting name");
        }

        let quoted = restyle(&name, &options, max_len);
        out.write_all(&quoted)?;
        out.write_all(b"\n")?;
    }

    Ok(())
}

fn list_directory(dir: &Path, indicators: bool, args: &StyleArgs) -> Result<()> {
    let names = quoted_entries(dir, indicators, args)?;
    info!(directory = %dir.display(), entries = names.len(), "listed directory");

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for name in names {
        out.write_all(&name)?;
        out.write_all(b"\n")?;
    }
    Ok(())
}

/// Quote the path of every entry below `dir`, relative to `dir`
fn quoted_entries(dir: &Path, indicators: bool, args: &StyleArgs) -> Result<Vec<Vec<u8>>> {
    let mut options = build_options(args, QuotingStyle::ShellEscape)?;
    if indicators {
        for ch in INDICATOR_CHARS.chars() {
            options.set_char_quoting(ch, true);
        }
    }
    let use_file_quoting = args.is_default() && !indicators;

    let mut entries = Vec::new();
    for entry in walkdir::WalkDir::new(dir).min_depth(1).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to read directory: {}", dir.display()))?;
        let relative = entry
            .path()
            .strip_prefix(dir)
            .map_err(|_| anyhow::anyhow!("Failed to get relative path"))?;
        let raw = os_bytes(relative.as_os_str());

        let quoted = if use_file_quoting {
            quote_for_file(&raw).into_bytes()
        } else {
            quote_mem_bytes(&raw, &options)
        };
        entries.push(quoted);
    }

    Ok(entries)
}

fn split_lines(buffer: &[u8]) -> Vec<Vec<u8>> {
    let buffer = buffer.strip_suffix(b"\n").unwrap_or(buffer);
    if buffer.is_empty() {
        return Vec::new();
    }
    buffer.split(|&b| b == b'\n').map(<[u8]>::to_vec).collect()
}

#[cfg(unix)]
fn os_bytes(s: &std::ffi::OsStr) -> Vec<u8> {
    use std::os::unix::ffi::OsStrExt;
    s.as_bytes().to_vec()
}

#[cfg(not(unix))]
fn os_bytes(s: &std::ffi::OsStr) -> Vec<u8> {
    s.to_string_lossy().replace('\\', "/").into_bytes()
}
