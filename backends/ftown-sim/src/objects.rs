//! Simulated native objects and the face data derived from a font

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::rc::Rc;

use ftown_core::records::*;
use ftown_core::types::*;
use ftown_core::{ErrorCode, FaceRequester, ManagerLimits};

use crate::font::SimFont;
use crate::raster::{self, mul_fix};

pub(crate) struct Object {
    pub body: Body,
    /// Set for objects embedded in another one; freed together with it.
    pub owner: Option<usize>,
}

pub(crate) enum Body {
    Library(LibraryObj),
    Face(FaceObj),
    Size(SizeObj),
    Slot(SlotObj),
    CharMap(CharMapObj),
    Glyph(GlyphObj),
    Outline(OutlineObj),
    Bitmap(BitmapObj),
    Stroker(StrokerObj),
    Manager(ManagerObj),
}

impl Body {
    pub fn kind(&self) -> &'static str {
        match self {
            Body::Library(_) => "Library",
            Body::Face(_) => "Face",
            Body::Size(_) => "Size",
            Body::Slot(_) => "GlyphSlot",
            Body::CharMap(_) => "CharMap",
            Body::Glyph(_) => "Glyph",
            Body::Outline(_) => "Outline",
            Body::Bitmap(_) => "Bitmap",
            Body::Stroker(_) => "Stroker",
            Body::Manager(_) => "Manager",
        }
    }
}

#[derive(Default)]
pub(crate) struct LibraryObj {
    pub lcd_filter: Option<LcdFilter>,
    /// Properties set on this library, over [`default_property`].
    pub properties: BTreeMap<(String, String), PropertyValue>,
}

pub(crate) struct FaceObj {
    pub library: usize,
    pub font: Rc<SimFont>,
    pub face_index: i64,
    pub num_faces: i64,
    /// The font file. Memory faces keep the caller's bytes alive here like
    /// the native side must.
    pub data: Option<Rc<[u8]>>,
    pub refcount: u32,
    pub slot: usize,
    pub charmaps: Vec<usize>,
    pub charmap: usize,
    pub default_size: usize,
    pub active_size: usize,
    pub matrix: Matrix,
    pub delta: Vector,
    pub attached: Vec<PathBuf>,
    pub design_coords: Vec<i64>,
    pub named_instance: u32,
    pub manager: Option<usize>,
}

impl FaceObj {
    pub fn record(&self) -> FaceRecord {
        let font = &self.font;
        let mut flags = FaceFlags::SCALABLE | FaceFlags::SFNT | FaceFlags::HORIZONTAL | FaceFlags::GLYPH_NAMES;
        if !font.kerning.is_empty() {
            flags |= FaceFlags::KERNING;
        }
        if !font.strikes.is_empty() {
            flags |= FaceFlags::FIXED_SIZES;
        }
        if font.fixed_pitch {
            flags |= FaceFlags::FIXED_WIDTH;
        }
        if !font.axes.is_empty() {
            flags |= FaceFlags::MULTIPLE_MASTERS;
            if self.named_instance > 0 || !self.design_coords.is_empty() {
                flags |= FaceFlags::VARIATION;
            }
        }
        let mut style = StyleFlags::empty();
        if font.italic {
            style |= StyleFlags::ITALIC;
        }
        if font.bold {
            style |= StyleFlags::BOLD;
        }
        FaceRecord {
            num_faces: self.num_faces,
            face_index: self.face_index | (i64::from(self.named_instance) << 16),
            face_flags: flags,
            style_flags: style,
            num_glyphs: font.glyphs.len() as i64,
            family_name: Some(font.family_name.clone()),
            style_name: Some(font.style_name.clone()),
            available_sizes: font
                .strikes
                .iter()
                .map(|&ppem| BitmapSize {
                    height: ppem as i16,
                    width: ppem as i16,
                    size: i64::from(ppem) << 6,
                    x_ppem: i64::from(ppem) << 6,
                    y_ppem: i64::from(ppem) << 6,
                })
                .collect(),
            num_charmaps: self.charmaps.len() as i32,
            bbox: font_bbox(font),
            units_per_em: font.units_per_em,
            ascender: font.ascender,
            descender: font.descender,
            height: font.ascender - font.descender + font.line_gap,
            max_advance_width: max_advance(font) as i16,
            max_advance_height: font.ascender - font.descender,
            underline_position: -100,
            underline_thickness: 50,
        }
    }

    /// Current design coordinates, 16.16, falling back to axis defaults.
    pub fn coords(&self) -> Vec<i64> {
        if !self.design_coords.is_empty() {
            return self.design_coords.clone();
        }
        if self.named_instance > 0 {
            if let Some(instance) = self.font.instances.get(self.named_instance as usize - 1) {
                return instance.coords.iter().map(|&c| f64_to_f16dot16(c)).collect();
            }
        }
        self.font.axes.iter().map(|a| f64_to_f16dot16(a.default)).collect()
    }
}

pub(crate) struct SizeObj {
    pub face: usize,
    pub metrics: SizeMetrics,
}

pub(crate) struct SlotObj {
    pub face: usize,
    pub glyph_index: u32,
    pub metrics: GlyphMetrics,
    pub linear_hori_advance: i64,
    pub linear_vert_advance: i64,
    pub advance: Vector,
    pub format: GlyphFormat,
    pub outline: usize,
    pub bitmap: usize,
    pub bitmap_left: i32,
    pub bitmap_top: i32,
}

impl SlotObj {
    pub fn record(&self) -> GlyphSlotRecord {
        GlyphSlotRecord {
            glyph_index: self.glyph_index,
            metrics: self.metrics,
            linear_hori_advance: self.linear_hori_advance,
            linear_vert_advance: self.linear_vert_advance,
            advance: self.advance,
            format: self.format,
            bitmap_left: self.bitmap_left,
            bitmap_top: self.bitmap_top,
            lsb_delta: 0,
            rsb_delta: 0,
        }
    }
}

pub(crate) struct CharMapObj {
    pub face: usize,
    pub record: CharMapRecord,
    pub index: i32,
    pub map: BTreeMap<u32, u32>,
}

pub(crate) enum GlyphImage {
    Outline { outline: usize },
    Bitmap { bitmap: usize, left: i32, top: i32 },
}

pub(crate) struct GlyphObj {
    pub library: usize,
    /// 16.16.
    pub advance: Vector,
    pub image: GlyphImage,
}

impl GlyphObj {
    pub fn format(&self) -> GlyphFormat {
        match self.image {
            GlyphImage::Outline { .. } => GlyphFormat::Outline,
            GlyphImage::Bitmap { .. } => GlyphFormat::Bitmap,
        }
    }
}

pub(crate) struct OutlineObj {
    pub record: OutlineRecord,
}

#[derive(Clone)]
pub(crate) struct BitmapObj {
    pub record: BitmapRecord,
    pub buffer: Vec<u8>,
}

impl BitmapObj {
    pub fn empty() -> Self {
        Self {
            record: BitmapRecord::default(),
            buffer: Vec::new(),
        }
    }
}

pub(crate) struct StrokerObj {
    pub radius: i64,
    pub cap: StrokerLineCap,
    pub join: StrokerLineJoin,
    pub miter_limit: i64,
}

pub(crate) struct ManagerObj {
    pub library: usize,
    pub limits: ManagerLimits,
    pub requester: Rc<dyn FaceRequester>,
    /// `(face_id, face)`, least recently used first.
    pub faces: Vec<(usize, usize)>,
}

impl ManagerObj {
    /// Native default when the limit is zero.
    pub fn max_faces(&self) -> usize {
        if self.limits.max_faces == 0 {
            2
        } else {
            self.limits.max_faces as usize
        }
    }
}

pub(crate) fn font_bbox(font: &SimFont) -> BBox {
    let points: Vec<Vector> = font
        .glyphs
        .iter()
        .flat_map(|g| g.contours.iter().flat_map(|c| c.points.iter()))
        .map(|&(x, y)| Vector::new(i64::from(x), i64::from(y)))
        .collect();
    raster::cbox(&points)
}

pub(crate) fn max_advance(font: &SimFont) -> u16 {
    font.glyphs.iter().map(|g| g.advance).max().unwrap_or(0)
}

/// Unicode and, for the ASCII range, Mac Roman character maps.
pub(crate) fn charmap_tables(font: &SimFont) -> Vec<(CharMapRecord, BTreeMap<u32, u32>)> {
    let mut unicode = BTreeMap::new();
    for (gid, glyph) in font.glyphs.iter().enumerate() {
        for &cp in &glyph.codepoints {
            unicode.entry(cp).or_insert(gid as u32);
        }
    }
    let roman: BTreeMap<u32, u32> = unicode.range(..0x80).map(|(&cp, &g)| (cp, g)).collect();
    vec![
        (
            CharMapRecord {
                encoding: Encoding::UNICODE,
                platform_id: 3,
                encoding_id: 1,
            },
            unicode,
        ),
        (
            CharMapRecord {
                encoding: Encoding::APPLE_ROMAN,
                platform_id: 1,
                encoding_id: 0,
            },
            roman,
        ),
    ]
}

/// Scaled size metrics for a square pixel size.
pub(crate) fn size_metrics(font: &SimFont, x_ppem: u16, y_ppem: u16) -> SizeMetrics {
    let upem = i64::from(font.units_per_em);
    let x_scale = (i64::from(x_ppem) << 22) / upem;
    let y_scale = (i64::from(y_ppem) << 22) / upem;
    let ceil = |v: i64| (v + 63) & !63;
    let floor = |v: i64| v & !63;
    let round = |v: i64| (v + 32) & !63;
    let height = i64::from(font.ascender) - i64::from(font.descender) + i64::from(font.line_gap);
    SizeMetrics {
        x_ppem,
        y_ppem,
        x_scale,
        y_scale,
        ascender: ceil(mul_fix(i64::from(font.ascender), y_scale)),
        descender: floor(mul_fix(i64::from(font.descender), y_scale)),
        height: round(mul_fix(height, y_scale)),
        max_advance: round(mul_fix(i64::from(max_advance(font)), x_scale)),
    }
}

/// The glyph's outline in font units.
pub(crate) fn glyph_outline(font: &SimFont, glyph_index: u32) -> OutlineRecord {
    let mut record = OutlineRecord::default();
    let Some(glyph) = font.glyphs.get(glyph_index as usize) else {
        return record;
    };
    for contour in &glyph.contours {
        for (i, &(x, y)) in contour.points.iter().enumerate() {
            record.points.push(Vector::new(i64::from(x), i64::from(y)));
            record.tags.push(contour.tag(i));
        }
        if !contour.points.is_empty() {
            record.contours.push((record.points.len() - 1) as u16);
        }
    }
    record
}

pub(crate) fn sfnt_table(font: &SimFont, tag: SfntTag) -> Option<SfntTable> {
    let bbox = font_bbox(font);
    let max_points = font
        .glyphs
        .iter()
        .map(|g| g.contours.iter().map(|c| c.points.len()).sum::<usize>())
        .max()
        .unwrap_or(0);
    let max_contours = font.glyphs.iter().map(|g| g.contours.len()).max().unwrap_or(0);
    let first_char = font.glyphs.iter().flat_map(|g| g.codepoints.iter().copied()).min().unwrap_or(0);
    let last_char = font.glyphs.iter().flat_map(|g| g.codepoints.iter().copied()).max().unwrap_or(0);
    let mac_style = u16::from(font.bold) | u16::from(font.italic) << 1;

    let table = match tag {
        SfntTag::Head => SfntTable::Header(HeaderTable {
            table_version: 0x10000,
            font_revision: 0x10000,
            checksum_adjust: 0,
            magic_number: 0x5F0F_3CF5,
            flags: 0x000B,
            units_per_em: font.units_per_em,
            x_min: bbox.x_min as i16,
            y_min: bbox.y_min as i16,
            x_max: bbox.x_max as i16,
            y_max: bbox.y_max as i16,
            mac_style,
            lowest_rec_ppem: 8,
            font_direction: 2,
            index_to_loc_format: 0,
            glyph_data_format: 0,
        }),
        SfntTag::Maxp => SfntTable::MaxProfile(MaxProfileTable {
            version: 0x10000,
            num_glyphs: font.glyphs.len() as u16,
            max_points: max_points as u16,
            max_contours: max_contours as u16,
            max_zones: 2,
            ..MaxProfileTable::default()
        }),
        SfntTag::Hhea => SfntTable::HoriHeader(HoriHeaderTable {
            version: 0x10000,
            ascender: font.ascender,
            descender: font.descender,
            line_gap: font.line_gap,
            advance_max: max_advance(font),
            min_side_bearing_1: bbox.x_min as i16,
            min_side_bearing_2: 0,
            max_extent: bbox.x_max as i16,
            caret_slope_rise: 1,
            caret_slope_run: 0,
            caret_offset: 0,
            number_of_metrics: font.glyphs.len() as u16,
        }),
        SfntTag::Os2 => SfntTable::Os2(Os2Table {
            version: 4,
            x_avg_char_width: (font.glyphs.iter().map(|g| u32::from(g.advance)).sum::<u32>()
                / font.glyphs.len().max(1) as u32) as i16,
            us_weight_class: font.weight_class,
            us_width_class: 5,
            fs_type: font.fs_type,
            y_strikeout_size: 50,
            y_strikeout_position: 250,
            ach_vend_id: *b"SIM ",
            fs_selection: if font.bold || font.italic {
                u16::from(font.italic) | u16::from(font.bold) << 5
            } else {
                0x40
            },
            us_first_char_index: first_char.min(0xFFFF) as u16,
            us_last_char_index: last_char.min(0xFFFF) as u16,
            s_typo_ascender: font.ascender,
            s_typo_descender: font.descender,
            s_typo_line_gap: font.line_gap,
            us_win_ascent: font.ascender.unsigned_abs(),
            us_win_descent: font.descender.unsigned_abs(),
            sx_height: (font.ascender / 16) * 10,
            s_cap_height: bbox.y_max as i16,
            ..Os2Table::default()
        }),
        SfntTag::Post => SfntTable::Postscript(PostscriptTable {
            format_type: 0x20000,
            italic_angle: if font.italic { -12 << 16 } else { 0 },
            underline_position: -100,
            underline_thickness: 50,
            is_fixed_pitch: u32::from(font.fixed_pitch),
            ..PostscriptTable::default()
        }),
        SfntTag::Vhea | SfntTag::Pclt => return None,
    };
    Some(table)
}

/// Built-in value of a module property, `None` for unknown pairs.
pub(crate) fn default_property(module: &str, property: &str) -> Option<PropertyValue> {
    let value = match (module, property) {
        ("truetype", "interpreter-version") => PropertyValue::UInt(40),
        ("cff" | "type1" | "t1cid", "hinting-engine") => PropertyValue::UInt(1),
        ("cff" | "type1" | "t1cid" | "autofitter", "no-stem-darkening") => PropertyValue::Bool(true),
        ("cff" | "type1" | "t1cid" | "autofitter", "darkening-parameters") => {
            PropertyValue::Darkening([500, 400, 1000, 275, 1667, 275, 2333, 0])
        }
        ("autofitter", "default-script") => PropertyValue::UInt(1),
        ("autofitter", "fallback-script") => PropertyValue::UInt(0),
        ("pcf", "no-long-family-names") => PropertyValue::Bool(false),
        _ => return None,
    };
    Some(value)
}

pub(crate) fn is_module(module: &str) -> bool {
    matches!(module, "truetype" | "cff" | "type1" | "t1cid" | "autofitter" | "pcf")
}

/// Range checks the drivers apply on `FT_Property_Set`.
pub(crate) fn check_property(property: &str, value: &PropertyValue) -> Result<(), ErrorCode> {
    match (property, value) {
        ("interpreter-version", PropertyValue::UInt(35 | 40)) => Ok(()),
        ("interpreter-version", _) => Err(ErrorCode::UNIMPLEMENTED_FEATURE),
        ("hinting-engine", PropertyValue::UInt(0 | 1)) => Ok(()),
        ("hinting-engine", _) => Err(ErrorCode::UNIMPLEMENTED_FEATURE),
        ("darkening-parameters", PropertyValue::Darkening(p)) => {
            let points: Vec<(i32, i32)> = p.chunks(2).map(|c| (c[0], c[1])).collect();
            let rising = points.windows(2).all(|w| w[0].0 < w[1].0);
            let in_range = points.iter().all(|&(x, y)| x >= 0 && (0..=500).contains(&y));
            if rising && in_range {
                Ok(())
            } else {
                Err(ErrorCode::INVALID_ARGUMENT)
            }
        }
        _ => Ok(()),
    }
}

/// Raw bytes of a table, big-endian as in the file. Only `head` and a
/// version 0.5 `maxp` are laid out.
pub(crate) fn raw_table(font: &SimFont, tag: u32) -> Option<Vec<u8>> {
    let mut out = Vec::new();
    if tag == TableTag::new(b"head").0 {
        let Some(SfntTable::Header(head)) = sfnt_table(font, SfntTag::Head) else {
            return None;
        };
        for v in [head.table_version, head.font_revision, head.checksum_adjust, head.magic_number] {
            out.extend((v as u32).to_be_bytes());
        }
        out.extend(head.flags.to_be_bytes());
        out.extend(head.units_per_em.to_be_bytes());
        // created and modified
        out.extend([0u8; 16]);
        for v in [head.x_min, head.y_min, head.x_max, head.y_max] {
            out.extend(v.to_be_bytes());
        }
        out.extend(head.mac_style.to_be_bytes());
        out.extend(head.lowest_rec_ppem.to_be_bytes());
        out.extend(head.font_direction.to_be_bytes());
        out.extend(head.index_to_loc_format.to_be_bytes());
        out.extend(head.glyph_data_format.to_be_bytes());
    } else if tag == TableTag::new(b"maxp").0 {
        out.extend(0x0000_5000u32.to_be_bytes());
        out.extend((font.glyphs.len() as u16).to_be_bytes());
    } else {
        return None;
    }
    Some(out)
}

/// Draw `image` into `target` with its origin at the target's bottom-left
/// corner. Pixels outside the target are clipped.
pub(crate) fn blit(image: &raster::Raster, target: &mut BitmapObj) {
    let rec = target.record;
    let pitch = rec.pitch.unsigned_abs() as usize;
    let src_pitch = image.record.pitch.unsigned_abs() as usize;
    for rr in 0..image.record.rows as i64 {
        let row = i64::from(rec.rows) - i64::from(image.top) + rr;
        if row < 0 || row >= i64::from(rec.rows) {
            continue;
        }
        for cc in 0..image.record.width as i64 {
            let col = i64::from(image.left) + cc;
            if col < 0 || col >= i64::from(rec.width) {
                continue;
            }
            let (row, col, rr, cc) = (row as usize, col as usize, rr as usize, cc as usize);
            match rec.pixel_mode {
                PixelMode::Mono => {
                    if image.buffer[rr * src_pitch + cc / 8] & (0x80 >> (cc % 8)) != 0 {
                        target.buffer[row * pitch + col / 8] |= 0x80 >> (col % 8);
                    }
                }
                _ => {
                    let dst = &mut target.buffer[row * pitch + col];
                    *dst = (*dst).max(image.buffer[rr * src_pitch + cc]);
                }
            }
        }
    }
}

/// `name` table entries; Unicode and Windows strings as UTF-16BE.
pub(crate) fn sfnt_names(font: &SimFont) -> Vec<SfntName> {
    font.names
        .iter()
        .map(|n| SfntName {
            platform_id: n.platform_id,
            encoding_id: n.encoding_id,
            language_id: n.language_id,
            name_id: n.name_id,
            string: match n.platform_id {
                0 | 3 => n.value.encode_utf16().flat_map(u16::to_be_bytes).collect(),
                _ => n.value.chars().map(|c| if (c as u32) < 0x100 { c as u8 } else { b'?' }).collect(),
            },
        })
        .collect()
}

pub(crate) fn mm_var(font: &SimFont) -> MmVar {
    MmVar {
        num_designs: 0,
        axes: font
            .axes
            .iter()
            .enumerate()
            .map(|(i, a)| VarAxis {
                name: a.name.clone(),
                minimum: f64_to_f16dot16(a.min),
                default: f64_to_f16dot16(a.default),
                maximum: f64_to_f16dot16(a.max),
                tag: a.tag.bytes().chain(std::iter::repeat(b' ')).take(4).fold(0u32, |acc, b| acc << 8 | u32::from(b)),
                strid: 256 + i as u32,
            })
            .collect(),
        named_styles: font
            .instances
            .iter()
            .enumerate()
            .map(|(i, inst)| NamedStyle {
                coords: inst.coords.iter().map(|&c| f64_to_f16dot16(c)).collect(),
                strid: 256 + (font.axes.len() + i) as u32,
                psid: 0xFFFF,
            })
            .collect(),
    }
}

/// Convert a bitmap to 8 bits per pixel.
pub(crate) fn convert_bitmap(source: &BitmapObj, alignment: i32) -> Option<BitmapObj> {
    let rec = &source.record;
    let width = rec.width as usize;
    let rows = rec.rows as usize;
    let pitch = rec.pitch.unsigned_abs() as usize;
    let (levels, value): (u16, Box<dyn Fn(&[u8], usize) -> u8>) = match rec.pixel_mode {
        PixelMode::Mono => (2, Box::new(|row: &[u8], x: usize| (row[x / 8] >> (7 - x % 8)) & 1)),
        PixelMode::Gray2 => (4, Box::new(|row: &[u8], x: usize| (row[x / 4] >> (6 - 2 * (x % 4))) & 3)),
        PixelMode::Gray4 => (16, Box::new(|row: &[u8], x: usize| (row[x / 2] >> (4 - 4 * (x % 2))) & 15)),
        PixelMode::Gray | PixelMode::Lcd | PixelMode::LcdV => (256, Box::new(|row: &[u8], x: usize| row[x])),
        PixelMode::Bgra => (256, Box::new(|row: &[u8], x: usize| row[x * 4 + 3])),
        PixelMode::None | PixelMode::Unknown(_) => return None,
    };
    let align = alignment.unsigned_abs().max(1) as usize;
    let out_pitch = width.div_ceil(align) * align;
    let mut buffer = vec![0u8; out_pitch * rows];
    for y in 0..rows {
        let row = &source.buffer[y * pitch..(y + 1) * pitch];
        for x in 0..width {
            buffer[y * out_pitch + x] = value(row, x);
        }
    }
    Some(BitmapObj {
        record: BitmapRecord {
            rows: rec.rows,
            width: rec.width,
            pitch: if alignment < 0 { -(out_pitch as i32) } else { out_pitch as i32 },
            pixel_mode: PixelMode::Gray,
            num_grays: levels,
        },
        buffer,
    })
}

/// Grow a gray bitmap by `x`/`y` pixels, each output pixel taking the
/// maximum of the window it covers.
pub(crate) fn embolden_bitmap(source: &BitmapObj, x: u32, y: u32) -> BitmapObj {
    let rec = &source.record;
    let (width, rows) = (rec.width + x, rec.rows + y);
    let src_pitch = rec.pitch.unsigned_abs() as usize;
    let mut buffer = vec![0u8; (width * rows) as usize];
    for out_y in 0..rows {
        for out_x in 0..width {
            let mut v = 0u8;
            for sy in out_y.saturating_sub(y)..=out_y.min(rec.rows.saturating_sub(1)) {
                for sx in out_x.saturating_sub(x)..=out_x.min(rec.width.saturating_sub(1)) {
                    if sy < rec.rows && sx < rec.width {
                        v = v.max(source.buffer[sy as usize * src_pitch + sx as usize]);
                    }
                }
            }
            buffer[(out_y * width + out_x) as usize] = v;
        }
    }
    BitmapObj {
        record: BitmapRecord {
            rows,
            width,
            pitch: width as i32,
            pixel_mode: PixelMode::Gray,
            num_grays: rec.num_grays,
        },
        buffer,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metrics_at_ten_pixels() {
        let font = SimFont::sample();
        let m = size_metrics(&font, 10, 10);
        assert_eq!(m.x_scale, (10 << 22) / 1000);
        assert_eq!(m.ascender, 8 * 64);
        assert_eq!(m.descender, -2 * 64);
        assert_eq!(m.height, 12 * 64);
    }

    #[test]
    fn outline_tags_follow_contours() {
        let font = SimFont::sample();
        let b = glyph_outline(&font, 3);
        assert_eq!(b.n_points(), 7);
        assert_eq!(b.contours, [6]);
        assert_eq!(b.tags, [1, 1, 1, 0, 1, 0, 1]);
        assert!(glyph_outline(&font, 1).points.is_empty());
    }

    #[test]
    fn head_table_bytes() {
        let font = SimFont::sample();
        let head = raw_table(&font, TableTag::new(b"head").0).unwrap();
        assert_eq!(head.len(), 54);
        assert_eq!(head[12..16], 0x5F0F_3CF5u32.to_be_bytes());
        assert_eq!(head[18..20], 1000u16.to_be_bytes());
        let maxp = raw_table(&font, TableTag::new(b"maxp").0).unwrap();
        assert_eq!(maxp[4..6], (font.glyphs.len() as u16).to_be_bytes());
        assert!(raw_table(&font, TableTag::new(b"GSUB").0).is_none());
    }

    #[test]
    fn darkening_curve_must_rise() {
        let good = PropertyValue::Darkening([500, 400, 1000, 275, 1667, 275, 2333, 0]);
        assert_eq!(check_property("darkening-parameters", &good), Ok(()));
        let bad = PropertyValue::Darkening([500, 400, 400, 275, 1667, 275, 2333, 0]);
        assert_eq!(check_property("darkening-parameters", &bad), Err(ErrorCode::INVALID_ARGUMENT));
        assert_eq!(
            check_property("interpreter-version", &PropertyValue::UInt(38)),
            Err(ErrorCode::UNIMPLEMENTED_FEATURE)
        );
    }

    #[test]
    fn mono_converts_to_two_levels() {
        let mono = BitmapObj {
            record: BitmapRecord {
                rows: 1,
                width: 3,
                pitch: 1,
                pixel_mode: PixelMode::Mono,
                num_grays: 2,
            },
            buffer: vec![0b1010_0000],
        };
        let gray = convert_bitmap(&mono, 4).unwrap();
        assert_eq!(gray.record.pitch, 4);
        assert_eq!(gray.record.num_grays, 2);
        assert_eq!(gray.buffer, [1, 0, 1, 0]);
    }
}
