//! Font tables for the traversal: glyph widths and text decoding.
//!
//! A `FontInfo` is built for each font resource when a page or form comes
//! into scope. Simple fonts carry `/FirstChar` + `/Widths` and decode one
//! byte per glyph through the font's encoding; Type0 fonts carry `/DW` +
//! `/W` on their descendant font and decode two-byte codes through the
//! ToUnicode CMap. Fonts with no width table at all fall back to a flat
//! per-family average so advance accumulation keeps moving.

use std::collections::BTreeMap;

use lopdf::{Dictionary, Document, Object, ObjectId};

use crate::cmap::{self, ToUnicodeCMap};

/// Average advance widths for the non-embedded base-14 families, in
/// 1/1000 em units. Matched in table order, first hit wins.
const BASE14_AVG_WIDTHS: &[(&str, f32)] = &[
    ("Courier", 600.0),
    ("Helvetica", 556.0),
    ("Arial", 556.0),
    ("Times", 500.0),
    ("Symbol", 600.0),
    ("ZapfDingbats", 700.0),
];

/// Width used when nothing at all is known about a glyph.
pub(crate) const FALLBACK_WIDTH: f32 = 500.0;

/// One decoded glyph from a string operand.
#[derive(Debug)]
pub struct Glyph {
    /// Character code as it appeared in the operand.
    pub code: u32,
    /// Text the code decodes to; ligature codes expand to several chars.
    pub text: String,
}

#[derive(Debug)]
enum FontKind {
    /// One byte per glyph, decoded through the font's encoding.
    Simple {
        first_char: u32,
        widths: Vec<f32>,
        missing_width: f32,
    },
    /// Two bytes per glyph (Identity-H style), ToUnicode for text.
    Type0 {
        cmap: Option<ToUnicodeCMap>,
        widths: Vec<(u32, u32, f32)>,
        default_width: f32,
    },
}

/// Decode and metric tables for one font resource.
pub struct FontInfo<'a> {
    dict: &'a Dictionary,
    kind: FontKind,
}

impl<'a> FontInfo<'a> {
    /// Builds the tables for one font dictionary. Never fails: missing or
    /// damaged pieces degrade to fallbacks.
    pub fn load(doc: &'a Document, dict: &'a Dictionary, raw_pdf: Option<&[u8]>) -> Self {
        let subtype = dict
            .get(b"Subtype")
            .ok()
            .and_then(|o| o.as_name().ok())
            .unwrap_or(b"");
        let kind = if subtype == b"Type0" {
            load_type0(doc, dict, raw_pdf)
        } else {
            load_simple(doc, dict)
        };
        FontInfo { dict, kind }
    }

    /// Whether codes are one byte wide. Word spacing only applies to the
    /// single-byte code 32.
    pub fn single_byte(&self) -> bool {
        matches!(self.kind, FontKind::Simple { .. })
    }

    /// Advance width for a character code, in 1/1000 em units.
    pub fn width(&self, code: u32) -> f32 {
        match &self.kind {
            FontKind::Simple {
                first_char,
                widths,
                missing_width,
            } => code
                .checked_sub(*first_char)
                .and_then(|i| widths.get(i as usize))
                .copied()
                .unwrap_or(*missing_width),
            FontKind::Type0 {
                widths,
                default_width,
                ..
            } => {
                for &(lo, hi, w) in widths {
                    if code >= lo && code <= hi {
                        return w;
                    }
                }
                *default_width
            }
        }
    }

    /// Splits a string operand into decoded glyphs.
    pub fn decode_glyphs(&self, doc: &Document, bytes: &[u8]) -> Vec<Glyph> {
        match &self.kind {
            FontKind::Simple { .. } => {
                let encoding = self.dict.get_font_encoding(doc).ok();
                bytes
                    .iter()
                    .map(|&b| {
                        let text = encoding
                            .as_ref()
                            .and_then(|enc| Document::decode_text(enc, &[b]).ok())
                            .filter(|s| !s.is_empty())
                            // Latin-1 view of the byte when the encoding
                            // has no mapping for it.
                            .unwrap_or_else(|| char::from(b).to_string());
                        Glyph {
                            code: b as u32,
                            text,
                        }
                    })
                    .collect()
            }
            FontKind::Type0 { cmap, .. } => {
                if bytes.len() % 2 != 0 {
                    log::debug!("odd-length string operand for a two-byte font");
                }
                let mut glyphs = Vec::with_capacity(bytes.len() / 2);
                for chunk in bytes.chunks(2) {
                    if chunk.len() != 2 {
                        continue;
                    }
                    let code = u16::from_be_bytes([chunk[0], chunk[1]]);
                    let text = match cmap {
                        Some(cmap) => cmap.lookup(code),
                        None => None,
                    }
                    .or_else(|| char::from_u32(code as u32).map(|c| c.to_string()))
                    .unwrap_or_default();
                    glyphs.push(Glyph {
                        code: code as u32,
                        text,
                    });
                }
                glyphs
            }
        }
    }
}

fn load_simple(doc: &Document, dict: &Dictionary) -> FontKind {
    let first_char = dict
        .get(b"FirstChar")
        .ok()
        .and_then(|o| number(doc, o))
        .unwrap_or(0.0) as u32;

    let widths: Vec<f32> = dict
        .get(b"Widths")
        .ok()
        .map(|o| resolve(doc, o))
        .and_then(|o| o.as_array().ok())
        .map(|arr| arr.iter().map(|w| number(doc, w).unwrap_or(0.0)).collect())
        .unwrap_or_default();

    let missing_width =
        descriptor_missing_width(doc, dict).unwrap_or_else(|| base14_width(dict));

    if widths.is_empty() {
        log::debug!(
            "font {} has no width table, using {} per glyph",
            base_font_name(dict),
            missing_width
        );
    }

    FontKind::Simple {
        first_char,
        widths,
        missing_width,
    }
}

fn load_type0(doc: &Document, dict: &Dictionary, raw_pdf: Option<&[u8]>) -> FontKind {
    let cmap = load_tounicode(doc, dict, raw_pdf);
    if cmap.is_none() {
        log::debug!(
            "Type0 font {} without usable ToUnicode, codes pass through",
            base_font_name(dict)
        );
    }

    let mut widths = Vec::new();
    let mut default_width = 1000.0;
    if let Some(desc) = descendant_font(doc, dict) {
        if let Some(dw) = desc.get(b"DW").ok().and_then(|o| number(doc, o)) {
            default_width = dw;
        }
        widths = parse_cid_widths(doc, desc);
    }

    FontKind::Type0 {
        cmap,
        widths,
        default_width,
    }
}

/// Resolves the font's ToUnicode stream, trying the object graph first and
/// the raw file bytes when the graph cannot serve the stream.
fn load_tounicode(
    doc: &Document,
    dict: &Dictionary,
    raw_pdf: Option<&[u8]>,
) -> Option<ToUnicodeCMap> {
    let obj = dict.get(b"ToUnicode").ok()?;

    let via_graph = match resolve(doc, obj).as_stream() {
        Ok(stream) => {
            let data = match stream.decompressed_content() {
                Ok(data) => data,
                Err(_) => stream.content.clone(),
            };
            ToUnicodeCMap::parse(&data)
        }
        Err(_) => None,
    };
    if via_graph.is_some() {
        return via_graph;
    }

    if let (Ok(id), Some(raw)) = (obj.as_reference(), raw_pdf) {
        log::debug!("recovering ToUnicode stream {} from raw file bytes", id.0);
        return cmap::recover_cmap(raw, id.0);
    }
    None
}

fn descendant_font<'a>(doc: &'a Document, dict: &'a Dictionary) -> Option<&'a Dictionary> {
    let arr = resolve(doc, dict.get(b"DescendantFonts").ok()?)
        .as_array()
        .ok()?;
    resolve(doc, arr.first()?).as_dict().ok()
}

/// `/W` array on a descendant font: `lo hi w` triplets or `lo [w1 w2 ...]`
/// per-code lists, freely mixed.
fn parse_cid_widths(doc: &Document, desc: &Dictionary) -> Vec<(u32, u32, f32)> {
    let mut ranges = Vec::new();
    let Ok(obj) = desc.get(b"W") else {
        return ranges;
    };
    let Ok(arr) = resolve(doc, obj).as_array() else {
        return ranges;
    };

    let mut i = 0;
    while i < arr.len() {
        let Some(first) = number(doc, &arr[i]) else {
            break;
        };
        let first = first as u32;
        let Some(next) = arr.get(i + 1) else {
            break;
        };
        match resolve(doc, next) {
            Object::Array(per_code) => {
                for (j, w) in per_code.iter().enumerate() {
                    let Some(code) = first.checked_add(j as u32) else {
                        break;
                    };
                    if let Some(w) = number(doc, w) {
                        ranges.push((code, code, w));
                    }
                }
                i += 2;
            }
            other => {
                let Some(last) = number(doc, other) else {
                    break;
                };
                let Some(w) = arr.get(i + 2).and_then(|o| number(doc, o)) else {
                    break;
                };
                ranges.push((first, last as u32, w));
                i += 3;
            }
        }
    }
    ranges
}

fn descriptor_missing_width(doc: &Document, dict: &Dictionary) -> Option<f32> {
    let desc = resolve(doc, dict.get(b"FontDescriptor").ok()?)
        .as_dict()
        .ok()?;
    number(doc, desc.get(b"MissingWidth").ok()?)
}

fn base14_width(dict: &Dictionary) -> f32 {
    let name = base_font_name(dict);
    for &(family, w) in BASE14_AVG_WIDTHS {
        if name.contains(family) {
            return w;
        }
    }
    FALLBACK_WIDTH
}

fn base_font_name(dict: &Dictionary) -> String {
    dict.get(b"BaseFont")
        .ok()
        .and_then(|o| o.as_name().ok())
        .map(|n| String::from_utf8_lossy(n).to_string())
        .unwrap_or_else(|| "unnamed".to_string())
}

/// Font table for a page, keyed by resource name.
pub fn page_fonts<'a>(
    doc: &'a Document,
    page_id: ObjectId,
    raw_pdf: Option<&[u8]>,
) -> BTreeMap<Vec<u8>, FontInfo<'a>> {
    doc.get_page_fonts(page_id)
        .map(|fonts| {
            fonts
                .into_iter()
                .map(|(name, dict)| (name, FontInfo::load(doc, dict, raw_pdf)))
                .collect()
        })
        .unwrap_or_default()
}

/// Font table for an explicit resources dictionary (form XObjects carry
/// their own).
pub fn fonts_from_resources<'a>(
    doc: &'a Document,
    resources: &'a Dictionary,
    raw_pdf: Option<&[u8]>,
) -> BTreeMap<Vec<u8>, FontInfo<'a>> {
    let mut fonts = BTreeMap::new();
    let Ok(font_dict) = resources.get(b"Font").map(|o| resolve(doc, o)) else {
        return fonts;
    };
    let Ok(font_dict) = font_dict.as_dict() else {
        return fonts;
    };
    for (name, obj) in font_dict.iter() {
        if let Ok(dict) = resolve(doc, obj).as_dict() {
            fonts.insert(name.clone(), FontInfo::load(doc, dict, raw_pdf));
        }
    }
    fonts
}

/// Numeric value of a dictionary entry, following references.
pub(crate) fn number(doc: &Document, obj: &Object) -> Option<f32> {
    match resolve(doc, obj) {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Follows a reference to its target; other objects pass through.
pub(crate) fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        _ => obj,
    }
}
