//! Behavioural properties of the quoting engine

use emx_quotearg::{decode, restyle, Decoded, QuotingFlags, QuotingOptions, QuotingStyle};
use proptest::prelude::*;

/// Arbitrary bytes with a bias towards characters the engine treats specially
fn name_bytes() -> impl Strategy<Value = Vec<u8>> {
    let special = prop::sample::select(b"\0\x01\x7f\n\t\r\\'\"$ ?:{}#~*!`|[]=".to_vec());
    let raw = prop::collection::vec(prop_oneof![any::<u8>(), special], 0..24);
    let text = any::<String>().prop_map(String::into_bytes);
    prop_oneof![raw, text]
}

/// Decode one C escape sequence (the part after the backslash)
fn c_escape(s: &[u8]) -> Option<(u8, usize)> {
    let b = match *s.first()? {
        b'n' => b'\n',
        b't' => b'\t',
        b'r' => b'\r',
        b'a' => 0x07,
        b'b' => 0x08,
        b'f' => 0x0C,
        b'v' => 0x0B,
        b'0'..=b'7' => {
            let digits = s.iter().take(3).take_while(|&&d| (b'0'..=b'7').contains(&d)).count();
            let value = s[..digits].iter().fold(0u32, |acc, d| acc * 8 + u32::from(d - b'0'));
            return Some((u8::try_from(value).ok()?, digits));
        }
        other => other,
    };
    Some((b, 1))
}

/// Reverse a C string literal, quotes included
fn c_unquote(s: &[u8]) -> Option<Vec<u8>> {
    let inner = s.strip_prefix(b"\"")?.strip_suffix(b"\"")?;
    let mut out = Vec::new();
    let mut i = 0;
    while i < inner.len() {
        if inner[i] == b'\\' {
            let (b, n) = c_escape(&inner[i + 1..])?;
            out.push(b);
            i += 1 + n;
        } else {
            out.push(inner[i]);
            i += 1;
        }
    }
    Some(out)
}

/// POSIX quote removal for a single word, with bash's `$'...'`.
///
/// Returns `None` if the word is malformed or would be split or expanded.
fn shell_unquote(s: &[u8]) -> Option<Vec<u8>> {
    let mut out = Vec::new();
    let mut i = 0;
    while i < s.len() {
        match s[i] {
            b'\'' => {
                let end = i + 1 + s[i + 1..].iter().position(|&b| b == b'\'')?;
                out.extend_from_slice(&s[i + 1..end]);
                i = end + 1;
            }
            b'"' => {
                i += 1;
                loop {
                    match *s.get(i)? {
                        b'"' => break,
                        b'$' | b'`' => return None,
                        b'\\' if matches!(s.get(i + 1), Some(b'$' | b'`' | b'"' | b'\\' | b'\n')) => {
                            out.push(s[i + 1]);
                            i += 2;
                        }
                        b => {
                            out.push(b);
                            i += 1;
                        }
                    }
                }
                i += 1;
            }
            b'$' if s.get(i + 1) == Some(&b'\'') => {
                i += 2;
                loop {
                    match *s.get(i)? {
                        b'\'' => break,
                        b'\\' => {
                            let (b, n) = c_escape(&s[i + 1..])?;
                            out.push(b);
                            i += 1 + n;
                        }
                        b => {
                            out.push(b);
                            i += 1;
                        }
                    }
                }
                i += 1;
            }
            b'\\' => {
                out.push(*s.get(i + 1)?);
                i += 2;
            }
            b' ' | b'\t' | b'\n' | b'|' | b'&' | b';' | b'<' | b'>' | b'(' | b')' | b'$' | b'`' | b'*'
            | b'?' | b'[' | b'!' | b'^' => return None,
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    Some(out)
}

proptest! {
    #[test]
    fn literal_style_is_identity(arg in name_bytes()) {
        let options = QuotingOptions::new(QuotingStyle::Literal);
        prop_assert_eq!(restyle(&arg, &options, None), arg);
    }

    #[test]
    fn c_style_round_trips(arg in name_bytes()) {
        let options = QuotingOptions::new(QuotingStyle::C);
        let quoted = restyle(&arg, &options, None);
        prop_assert_eq!(c_unquote(&quoted), Some(arg));
    }

    #[test]
    fn shell_styles_round_trip(arg in name_bytes()) {
        for style in [
            QuotingStyle::Shell,
            QuotingStyle::ShellAlways,
            QuotingStyle::ShellEscape,
            QuotingStyle::ShellEscapeAlways,
        ] {
            let quoted = restyle(&arg, &QuotingOptions::new(style), None);
            prop_assert_eq!(
                shell_unquote(&quoted),
                Some(arg.clone()),
                "style {} produced {:?}",
                style,
                String::from_utf8_lossy(&quoted)
            );
        }
    }

    #[test]
    fn shell_escape_output_is_valid_utf8(arg in name_bytes()) {
        let quoted = restyle(&arg, &QuotingOptions::new(QuotingStyle::ShellEscape), None);
        prop_assert!(std::str::from_utf8(&quoted).is_ok());
    }

    #[test]
    fn max_len_is_a_prefix(arg in name_bytes(), cap in 0usize..16) {
        let options = QuotingOptions::new(QuotingStyle::ShellEscape);
        let full = restyle(&arg, &options, None);
        let capped = restyle(&arg, &options, Some(cap));
        prop_assert_eq!(&capped[..], &full[..full.len().min(cap)]);
    }

    #[test]
    fn decoder_spans_tile_input(arg in name_bytes()) {
        let mut pos = 0;
        while let Some(decoded) = decode(&arg, pos) {
            prop_assert!(decoded.len > 0);
            if let Some(ch) = decoded.ch {
                prop_assert_eq!(ch.len_utf8(), decoded.len);
            }
            pos += decoded.len;
        }
        prop_assert_eq!(pos, arg.len());
    }
}

#[test]
fn single_apostrophe_prefers_double_quotes() {
    let shell_always = restyle(b"it's", &QuotingOptions::new(QuotingStyle::ShellAlways), None);
    let c = restyle(b"it's", &QuotingOptions::new(QuotingStyle::C), None);
    assert_eq!(shell_always, c);
    assert_eq!(shell_always, b"\"it's\"");
}

#[test]
fn empty_input_is_never_elided() {
    let options = QuotingOptions::new(QuotingStyle::ShellAlways).with_flags(QuotingFlags::ELIDE_OUTER_QUOTES);
    assert_eq!(restyle(b"", &options, None), b"''");
}

#[test]
fn nul_handling() {
    let c = QuotingOptions::new(QuotingStyle::C);
    assert_eq!(restyle(b"\x001\x00", &c, None), br#""\0001\0""#);

    let literal = QuotingOptions::new(QuotingStyle::Literal).with_flags(QuotingFlags::ELIDE_NULL_BYTES);
    assert_eq!(restyle(b"\x001\x00", &literal, None), b"1");
}

#[test]
fn decoder_handles_mid_sequence_offsets() {
    let buf = [0xF0, 0x9F, 0xA5, 0x9E, b'y', b'a', b'm', b'!'];
    assert_eq!(decode(&buf, 0), Some(Decoded { len: 4, ch: Some('\u{1F95E}') }));
    assert_eq!(decode(&buf, 1), Some(Decoded { len: 3, ch: None }));
}

#[test]
fn trigraphs_are_split() {
    let options = QuotingOptions::new(QuotingStyle::C).with_flags(QuotingFlags::SPLIT_TRIGRAPHS);
    let quoted = String::from_utf8(restyle(b"huh??!", &options, None)).unwrap();
    assert!(quoted.contains(r#"?""?!"#));
    assert!(!quoted.contains("??!"));
}

#[test]
fn custom_quote_marks() {
    let options = QuotingOptions::custom("(", ")").unwrap();
    assert_eq!(restyle(b"a:b", &options, None), b"(a:b)");

    let options = options.with_char_quoted(':', true);
    assert_eq!(restyle(b"a:b", &options, None), br"(a\:b)");
}

#[test]
fn unknown_style_name_is_rejected() {
    assert!(QuotingOptions::from_style_name("bogus").is_err());
    assert!(QuotingOptions::from_style_name("shell-escape").is_ok());
}
