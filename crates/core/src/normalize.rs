use crate::error::IngestError;
use regex::Regex;

/// Cleans raw page text extracted from regulation PDFs.
///
/// All patterns are compiled once at construction; [`TextNormalizer::normalize`]
/// itself is a pure function and never fails.
pub struct TextNormalizer {
    hyphen_break: Regex,
    whitespace_run: Regex,
    lone_newline: Regex,
    blank_lines: Regex,
    page_footer: Regex,
    institution_header: Regex,
    double_space: Regex,
}

impl TextNormalizer {
    pub fn new() -> Result<Self, IngestError> {
        Ok(Self {
            hyphen_break: Regex::new(r"(\w)-\s*\n\s*(\w)")?,
            whitespace_run: Regex::new(r"\s+")?,
            lone_newline: Regex::new(r"(\w)\s*\n\s*(\w)")?,
            blank_lines: Regex::new(r"\n\s*\n\s*\n+")?,
            page_footer: Regex::new(r"(?i)p[áa]gina\s+\d+\s+de\s+\d+")?,
            institution_header: Regex::new(r"(?i)cpm\s*-\s*conservat[óo]rio\s+de\s+m[úu]sica")?,
            double_space: Regex::new(r"  +")?,
        })
    }

    /// Applies the cleanup steps in order: encoding repair, dehyphenation,
    /// whitespace collapse, newline rejoins, footer and header stripping,
    /// and a final trim.
    pub fn normalize(&self, raw: &str) -> String {
        let text = repair_encoding(raw);
        let text = self.hyphen_break.replace_all(&text, "$1$2");
        let text = self.whitespace_run.replace_all(&text, " ");
        let text = self.lone_newline.replace_all(&text, "$1 $2");
        let text = self.blank_lines.replace_all(&text, "\n\n");
        let text = self.page_footer.replace_all(&text, "");
        let text = self.institution_header.replace_all(&text, "");
        let text = self.double_space.replace_all(&text, " ");
        text.trim().to_string()
    }
}

/// Best-effort repair for UTF-8 byte sequences that were decoded as Latin-1
/// (a common artifact of legacy PDF text encodings).
///
/// The repair is only accepted when every char fits in one byte and the byte
/// reinterpretation is valid UTF-8 in full; otherwise the input is kept
/// untouched, so repeated application is stable.
fn repair_encoding(text: &str) -> String {
    if text.chars().any(|c| c as u32 > 0xFF) {
        return text.to_string();
    }

    let bytes: Vec<u8> = text.chars().map(|c| c as u8).collect();
    match String::from_utf8(bytes) {
        Ok(decoded) if !decoded.is_empty() => decoded,
        _ => text.to_string(),
    }
}
