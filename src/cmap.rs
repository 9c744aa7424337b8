//! ToUnicode CMap parsing for CID-keyed (Type0) fonts.
//!
//! Type0 fonts address glyphs with two-byte codes; the font's `/ToUnicode`
//! stream maps those codes to Unicode text through `bfchar` and `bfrange`
//! sections. Linearized or damaged files sometimes carry ToUnicode streams
//! that fail to resolve through the object graph, so a raw byte-level
//! recovery path is provided as a fallback.

use std::collections::HashMap;
use std::io::Read;

use flate2::read::ZlibDecoder;

/// A parsed ToUnicode CMap: direct code mappings plus contiguous ranges.
#[derive(Debug, Default, Clone)]
pub struct ToUnicodeCMap {
    map: HashMap<u16, String>,
    ranges: Vec<(u16, u16, u32)>,
}

impl ToUnicodeCMap {
    /// Parses the decompressed content of a ToUnicode stream. Returns `None`
    /// when no usable mappings are found.
    pub fn parse(content: &[u8]) -> Option<Self> {
        let text = String::from_utf8_lossy(content);
        let mut cmap = ToUnicodeCMap::default();
        for body in sections(&text, "beginbfchar", "endbfchar") {
            cmap.parse_bfchar(body);
        }
        for body in sections(&text, "beginbfrange", "endbfrange") {
            cmap.parse_bfrange(body);
        }
        if cmap.map.is_empty() && cmap.ranges.is_empty() {
            None
        } else {
            Some(cmap)
        }
    }

    /// bfchar body: `<src> <dst>` pairs.
    fn parse_bfchar(&mut self, body: &str) {
        let mut toks = Tokens::new(body);
        while let Some(src) = toks.hex() {
            let Some(dst) = toks.hex() else { break };
            if let (Some(code), Some(text)) = (hex_u16(src), hex_unicode(dst)) {
                self.map.insert(code, text);
            }
        }
    }

    /// bfrange body: `<lo> <hi> <base>` triplets, or `<lo> <hi> [<dst>...]`
    /// with one destination per code.
    fn parse_bfrange(&mut self, body: &str) {
        let mut toks = Tokens::new(body);
        loop {
            let Some(lo) = toks.hex() else { break };
            let Some(hi) = toks.hex() else { break };
            if toks.eat('[') {
                let mut code = hex_u16(lo);
                while let Some(dst) = toks.hex() {
                    if let Some(c) = code {
                        if let Some(text) = hex_unicode(dst) {
                            self.map.insert(c, text);
                        }
                        code = c.checked_add(1);
                    }
                }
                toks.eat(']');
            } else if let Some(base) = toks.hex() {
                if let (Some(lo), Some(hi), Some(base)) =
                    (hex_u16(lo), hex_u16(hi), hex_u32(base))
                {
                    self.ranges.push((lo, hi, base));
                }
            } else {
                break;
            }
        }
    }

    /// Unicode text for a single two-byte code.
    pub fn lookup(&self, code: u16) -> Option<String> {
        if let Some(s) = self.map.get(&code) {
            return Some(s.clone());
        }
        for &(lo, hi, base) in &self.ranges {
            if code >= lo && code <= hi {
                return base
                    .checked_add((code - lo) as u32)
                    .and_then(char::from_u32)
                    .map(|c| c.to_string());
            }
        }
        None
    }
}

/// Recovers and parses a ToUnicode CMap straight from the file bytes, for
/// streams the object graph cannot serve.
pub fn recover_cmap(pdf_bytes: &[u8], obj_num: u32) -> Option<ToUnicodeCMap> {
    let data = raw_stream_content(pdf_bytes, obj_num)?;
    ToUnicodeCMap::parse(&data)
}

/// All `open .. close` section bodies in order of appearance.
fn sections<'a>(text: &'a str, open: &str, close: &str) -> Vec<&'a str> {
    let mut found = Vec::new();
    let mut pos = 0;
    while let Some(start) = text[pos..].find(open) {
        let body_start = pos + start + open.len();
        let Some(len) = text[body_start..].find(close) else {
            break;
        };
        found.push(&text[body_start..body_start + len]);
        pos = body_start + len + close.len();
    }
    found
}

/// Cursor over a CMap section body, yielding `<hex>` tokens.
struct Tokens<'a> {
    rest: &'a str,
}

impl<'a> Tokens<'a> {
    fn new(body: &'a str) -> Self {
        Tokens { rest: body }
    }

    fn skip_ws(&mut self) {
        self.rest = self.rest.trim_start();
    }

    /// Next `<hex>` token, if the cursor sits on one.
    fn hex(&mut self) -> Option<&'a str> {
        self.skip_ws();
        let rest = self.rest.strip_prefix('<')?;
        let end = rest.find('>')?;
        self.rest = &rest[end + 1..];
        Some(&rest[..end])
    }

    fn eat(&mut self, c: char) -> bool {
        self.skip_ws();
        match self.rest.strip_prefix(c) {
            Some(tail) => {
                self.rest = tail;
                true
            }
            None => false,
        }
    }
}

fn hex_u16(hex: &str) -> Option<u16> {
    u16::from_str_radix(hex.trim(), 16).ok()
}

fn hex_u32(hex: &str) -> Option<u32> {
    u32::from_str_radix(hex.trim(), 16).ok()
}

/// Destination hex to text, four digits per UTF-16 code unit.
fn hex_unicode(hex: &str) -> Option<String> {
    let hex = hex.trim();
    let mut units = Vec::new();
    let mut i = 0;
    while i + 4 <= hex.len() {
        // The lossy decode can leave multi-byte replacement chars in a
        // damaged token, so a chunk may fall off a char boundary.
        let Some(chunk) = hex.get(i..i + 4) else { break };
        if let Ok(unit) = u16::from_str_radix(chunk, 16) {
            units.push(unit);
        }
        i += 4;
    }
    if units.is_empty() {
        return None;
    }
    let text: String = char::decode_utf16(units.into_iter())
        .map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect();
    Some(text)
}

/// Pulls a stream's content for object `obj_num` by scanning the raw file,
/// inflating it when the object dictionary names FlateDecode. Handles
/// linearized files where lopdf fails to load the stream object.
fn raw_stream_content(pdf_bytes: &[u8], obj_num: u32) -> Option<Vec<u8>> {
    let pattern = format!("{} 0 obj", obj_num);
    let obj_start = find_pattern(pdf_bytes, pattern.as_bytes())?;

    let search_start = obj_start + pattern.len();
    let stream_kw = find_pattern(&pdf_bytes[search_start..], b"stream")?;
    let stream_start = search_start + stream_kw + "stream".len();

    // Stream data begins after the EOL following the keyword.
    let mut content_start = stream_start;
    if pdf_bytes.get(content_start) == Some(&b'\r') {
        content_start += 1;
    }
    if pdf_bytes.get(content_start) == Some(&b'\n') {
        content_start += 1;
    }

    let stream_end = find_pattern(&pdf_bytes[content_start..], b"endstream")?;
    let mut content_end = content_start + stream_end;

    // Trailing EOL before "endstream" is not part of the data.
    if content_end > content_start && pdf_bytes.get(content_end - 1) == Some(&b'\n') {
        content_end -= 1;
    }
    if content_end > content_start && pdf_bytes.get(content_end - 1) == Some(&b'\r') {
        content_end -= 1;
    }

    let data = &pdf_bytes[content_start..content_end];

    let dict_region = &pdf_bytes[obj_start..stream_start];
    if find_pattern(dict_region, b"FlateDecode").is_some() {
        let mut decoder = ZlibDecoder::new(data);
        let mut inflated = Vec::new();
        if decoder.read_to_end(&mut inflated).is_ok() {
            return Some(inflated);
        }
        log::debug!("object {} names FlateDecode but would not inflate", obj_num);
    }
    Some(data.to_vec())
}

fn find_pattern(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bfchar() {
        let content = r#"
/CIDInit /ProcSet findresource begin
12 dict begin
begincmap
1 begincodespacerange
<0000><FFFF>
endcodespacerange
3 beginbfchar
<0003> <0020>
<0024> <0041>
<0025> <0042>
endbfchar
endcmap
"#;
        let cmap = ToUnicodeCMap::parse(content.as_bytes()).unwrap();
        assert_eq!(cmap.lookup(0x0003), Some(" ".to_string()));
        assert_eq!(cmap.lookup(0x0024), Some("A".to_string()));
        assert_eq!(cmap.lookup(0x0025), Some("B".to_string()));
    }

    #[test]
    fn test_parse_bfrange_base_form() {
        let content = r#"
1 beginbfrange
<0041> <005A> <0041>
endbfrange
"#;
        let cmap = ToUnicodeCMap::parse(content.as_bytes()).unwrap();
        assert_eq!(cmap.lookup(0x0041), Some("A".to_string()));
        assert_eq!(cmap.lookup(0x005A), Some("Z".to_string()));
        assert_eq!(cmap.lookup(0x005B), None);
    }

    #[test]
    fn test_parse_bfrange_array_form() {
        let content = r#"
1 beginbfrange
<0010> <0012> [<0048> <0069> <0021>]
endbfrange
"#;
        let cmap = ToUnicodeCMap::parse(content.as_bytes()).unwrap();
        assert_eq!(cmap.lookup(0x0010), Some("H".to_string()));
        assert_eq!(cmap.lookup(0x0011), Some("i".to_string()));
        assert_eq!(cmap.lookup(0x0012), Some("!".to_string()));
    }

    #[test]
    fn test_bfchar_destination_with_raw_bytes_is_dropped() {
        // A destination holding bytes that are not UTF-8 drops out;
        // entries after it still load.
        let content = b"2 beginbfchar\n<0001> <00\xFF\xFF>\n<0002> <0042>\nendbfchar";
        let cmap = ToUnicodeCMap::parse(content).unwrap();
        assert_eq!(cmap.lookup(0x0001), None);
        assert_eq!(cmap.lookup(0x0002), Some("B".to_string()));
    }

    #[test]
    fn test_bfrange_destination_overflow_is_unmapped() {
        let content = r#"
1 beginbfrange
<0000> <00FF> <FFFFFFFF>
endbfrange
"#;
        let cmap = ToUnicodeCMap::parse(content.as_bytes()).unwrap();
        // Past the top of u32 there is nothing to map to.
        assert_eq!(cmap.lookup(0x0000), None);
        assert_eq!(cmap.lookup(0x0001), None);
    }

    #[test]
    fn test_multi_unit_destination() {
        // One code expanding to a surrogate pair plus a ligature split.
        let content = r#"
2 beginbfchar
<0005> <D83DDE00>
<0006> <00660069>
endbfchar
"#;
        let cmap = ToUnicodeCMap::parse(content.as_bytes()).unwrap();
        assert_eq!(cmap.lookup(0x0005), Some("\u{1F600}".to_string()));
        assert_eq!(cmap.lookup(0x0006), Some("fi".to_string()));
    }

    #[test]
    fn test_empty_cmap_is_none() {
        assert!(ToUnicodeCMap::parse(b"begincmap endcmap").is_none());
    }

    #[test]
    fn test_raw_stream_recovery() {
        let pdf = b"%PDF-1.4\n7 0 obj\n<< /Length 12 >>\nstream\nhello stream\nendstream\nendobj\n";
        let data = raw_stream_content(pdf, 7).unwrap();
        assert_eq!(data, b"hello stream");
        assert!(raw_stream_content(pdf, 8).is_none());
    }
}
