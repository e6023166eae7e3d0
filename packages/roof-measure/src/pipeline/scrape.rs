//! Best-effort text recovery from a raw document byte stream.
//!
//! This is not a document parser. It looks for text-show operators and
//! content streams in the uncompressed bytes and keeps whatever literal
//! strings it finds. No layout or page boundaries survive.

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use tracing::debug;

lazy_static! {
    // (literal) Tj, with escaped parens allowed inside the literal
    static ref LITERAL_SHOW: Regex = Regex::new(r"(?s)\(((?:[^()\\]|\\.)*)\)\s*Tj").unwrap();

    // <hex> Tj
    static ref HEX_SHOW: Regex = Regex::new(r"<([0-9A-Fa-f\s]+)>\s*Tj").unwrap();

    // stream ... endstream
    static ref CONTENT_STREAM: Regex = Regex::new(r"(?s)stream\r?\n(.*?)endstream").unwrap();

    // Bare (literal) inside a content stream
    static ref STREAM_LITERAL: Regex = Regex::new(r"\(([^)]*)\)").unwrap();

    static ref ESCAPE: Regex = Regex::new(r"\\([0-7]{1,3}|[nrtbf\\()])").unwrap();

    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

/// Recover plain text from raw document bytes.
///
/// Bytes are read one-per-character (Latin-1), three independent passes
/// collect literal strings, and the concatenated hits are unescaped and
/// whitespace-collapsed. Returns an empty string when nothing is found.
pub fn scrape_text(bytes: &[u8]) -> String {
    if bytes.is_empty() {
        debug!("Empty document, nothing to scrape");
        return String::new();
    }

    let content: String = bytes.iter().map(|&b| b as char).collect();
    let mut hits: Vec<String> = Vec::new();

    let literal_hits = collect_literal_shows(&content, &mut hits);
    let hex_hits = collect_hex_shows(&content, &mut hits);
    let stream_hits = collect_stream_literals(&content, &mut hits);

    debug!(
        literal_hits,
        hex_hits,
        stream_hits,
        bytes = bytes.len(),
        "Scraped document text"
    );

    if hits.is_empty() {
        return String::new();
    }

    normalize(&hits.join(" "))
}

fn collect_literal_shows(content: &str, hits: &mut Vec<String>) -> usize {
    let before = hits.len();
    hits.extend(
        LITERAL_SHOW
            .captures_iter(content)
            .map(|caps| caps[1].to_string()),
    );
    hits.len() - before
}

fn collect_hex_shows(content: &str, hits: &mut Vec<String>) -> usize {
    let before = hits.len();
    hits.extend(
        HEX_SHOW
            .captures_iter(content)
            .map(|caps| decode_hex(&caps[1]))
            .filter(|text| !text.is_empty()),
    );
    hits.len() - before
}

/// Literals inside content streams that no show operator consumed.
///
/// Shown strings are blanked first so a `(..) Tj` inside a stream is
/// collected once, by the literal pass.
fn collect_stream_literals(content: &str, hits: &mut Vec<String>) -> usize {
    let before = hits.len();
    for stream in CONTENT_STREAM.captures_iter(content) {
        let unshown = LITERAL_SHOW.replace_all(&stream[1], " ");
        let unshown = HEX_SHOW.replace_all(&unshown, " ");
        hits.extend(
            STREAM_LITERAL
                .captures_iter(&unshown)
                .map(|caps| caps[1].to_string())
                .filter(|text| !text.trim().is_empty()),
        );
    }
    hits.len() - before
}

/// Decode hex digit pairs to characters. Whitespace is ignored and an odd
/// trailing nibble is dropped.
fn decode_hex(hex: &str) -> String {
    let digits: Vec<u8> = hex
        .bytes()
        .filter(|b| b.is_ascii_hexdigit())
        .collect();

    digits
        .chunks_exact(2)
        .filter_map(|pair| std::str::from_utf8(pair).ok())
        .filter_map(|pair| u8::from_str_radix(pair, 16).ok())
        .map(char::from)
        .collect()
}

/// Resolve string escapes and collapse whitespace.
fn normalize(text: &str) -> String {
    let unescaped = ESCAPE.replace_all(text, |caps: &Captures| {
        let escape = &caps[1];
        match escape {
            "n" | "r" | "t" | "b" | "f" => " ".to_string(),
            "\\" | "(" | ")" => escape.to_string(),
            octal => u32::from_str_radix(octal, 8)
                .map(|code| char::from((code & 0xFF) as u8).to_string())
                .unwrap_or_default(),
        }
    });

    WHITESPACE.replace_all(&unescaped, " ").trim().to_string()
}
