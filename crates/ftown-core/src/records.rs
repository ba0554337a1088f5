//! Plain snapshots of native records
//!
//! Backends copy these out of native memory field by field. Nothing here
//! borrows from the native side, so a record stays valid after the resource
//! it was read from is disposed.

use crate::types::{BBox, Encoding, FaceFlags, GlyphFormat, OutlineFlags, PixelMode, StyleFlags, Vector};

/// Public fields of a face record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FaceRecord {
    pub num_faces: i64,
    /// Low 16 bits: face index. High 16 bits: named instance index.
    pub face_index: i64,
    pub face_flags: FaceFlags,
    pub style_flags: StyleFlags,
    pub num_glyphs: i64,
    pub family_name: Option<String>,
    pub style_name: Option<String>,
    pub available_sizes: Vec<BitmapSize>,
    pub num_charmaps: i32,
    pub bbox: BBox,
    pub units_per_em: u16,
    pub ascender: i16,
    pub descender: i16,
    pub height: i16,
    pub max_advance_width: i16,
    pub max_advance_height: i16,
    pub underline_position: i16,
    pub underline_thickness: i16,
}

/// One fixed strike of a bitmap font.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BitmapSize {
    pub height: i16,
    pub width: i16,
    /// Nominal size in 26.6 points.
    pub size: i64,
    pub x_ppem: i64,
    pub y_ppem: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SizeMetrics {
    pub x_ppem: u16,
    pub y_ppem: u16,
    /// 16.16 scale from font units to 26.6 pixels.
    pub x_scale: i64,
    pub y_scale: i64,
    pub ascender: i64,
    pub descender: i64,
    pub height: i64,
    pub max_advance: i64,
}

/// Metrics of the glyph in a slot, 26.6 unless loaded with `NO_SCALE`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GlyphMetrics {
    pub width: i64,
    pub height: i64,
    pub hori_bearing_x: i64,
    pub hori_bearing_y: i64,
    pub hori_advance: i64,
    pub vert_bearing_x: i64,
    pub vert_bearing_y: i64,
    pub vert_advance: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlyphSlotRecord {
    pub glyph_index: u32,
    pub metrics: GlyphMetrics,
    /// 16.16, unhinted.
    pub linear_hori_advance: i64,
    pub linear_vert_advance: i64,
    /// 26.6, hinted.
    pub advance: Vector,
    pub format: GlyphFormat,
    pub bitmap_left: i32,
    pub bitmap_top: i32,
    pub lsb_delta: i64,
    pub rsb_delta: i64,
}

/// Fields common to every standalone glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlyphRecord {
    pub format: GlyphFormat,
    /// 16.16.
    pub advance: Vector,
}

/// Extra fields of a bitmap glyph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BitmapGlyphRecord {
    pub left: i32,
    pub top: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitmapRecord {
    pub rows: u32,
    pub width: u32,
    /// Bytes per row. Negative for bottom-up bitmaps.
    pub pitch: i32,
    pub pixel_mode: PixelMode,
    pub num_grays: u16,
}

impl BitmapRecord {
    /// Size of the pixel buffer in bytes.
    pub fn buffer_len(&self) -> usize {
        self.rows as usize * self.pitch.unsigned_abs() as usize
    }
}

impl Default for BitmapRecord {
    fn default() -> Self {
        Self {
            rows: 0,
            width: 0,
            pitch: 0,
            pixel_mode: PixelMode::None,
            num_grays: 0,
        }
    }
}

/// Full contents of an outline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutlineRecord {
    pub points: Vec<Vector>,
    /// One per point. Bit 0 set means on-curve; bit 1 distinguishes cubic
    /// from conic control points.
    pub tags: Vec<u8>,
    /// Index of the last point of each contour.
    pub contours: Vec<u16>,
    pub flags: OutlineFlags,
}

impl OutlineRecord {
    pub fn n_points(&self) -> usize {
        self.points.len()
    }

    pub fn n_contours(&self) -> usize {
        self.contours.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharMapRecord {
    pub encoding: Encoding,
    pub platform_id: u16,
    pub encoding_id: u16,
}

/// One entry of the SFNT `name` table. The string is raw, in the encoding
/// given by the platform and encoding IDs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SfntName {
    pub platform_id: u16,
    pub encoding_id: u16,
    pub language_id: u16,
    pub name_id: u16,
    pub string: Vec<u8>,
}

impl SfntName {
    /// Decode the string for the encodings that can be decoded without
    /// tables: UTF-16BE for Unicode and Windows, Latin-1 for Mac Roman.
    pub fn to_string_lossy(&self) -> String {
        match self.platform_id {
            0 | 3 => {
                let units: Vec<u16> = self
                    .string
                    .chunks_exact(2)
                    .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                    .collect();
                String::from_utf16_lossy(&units)
            }
            _ => self.string.iter().map(|&b| b as char).collect(),
        }
    }
}

/// Type 1 font info dictionary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PsFontInfo {
    pub version: Option<String>,
    pub notice: Option<String>,
    pub full_name: Option<String>,
    pub family_name: Option<String>,
    pub weight: Option<String>,
    /// 16.16 degrees.
    pub italic_angle: i64,
    pub is_fixed_pitch: bool,
    pub underline_position: i16,
    pub underline_thickness: u16,
}

/// Variation axis of a multiple-master or OpenType variable font.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarAxis {
    pub name: String,
    /// 16.16.
    pub minimum: i64,
    pub default: i64,
    pub maximum: i64,
    pub tag: u32,
    pub strid: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedStyle {
    /// One 16.16 coordinate per axis.
    pub coords: Vec<i64>,
    pub strid: u32,
    pub psid: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MmVar {
    pub num_designs: u32,
    pub axes: Vec<VarAxis>,
    pub named_styles: Vec<NamedStyle>,
}

/// Snapshot of one SFNT table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SfntTable {
    Header(HeaderTable),
    MaxProfile(MaxProfileTable),
    Os2(Os2Table),
    HoriHeader(HoriHeaderTable),
    VertHeader(HoriHeaderTable),
    Postscript(PostscriptTable),
    Pclt(PcltTable),
}

/// `head`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeaderTable {
    pub table_version: i64,
    pub font_revision: i64,
    pub checksum_adjust: i64,
    pub magic_number: i64,
    pub flags: u16,
    pub units_per_em: u16,
    pub x_min: i16,
    pub y_min: i16,
    pub x_max: i16,
    pub y_max: i16,
    pub mac_style: u16,
    pub lowest_rec_ppem: u16,
    pub font_direction: i16,
    pub index_to_loc_format: i16,
    pub glyph_data_format: i16,
}

/// `maxp`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MaxProfileTable {
    pub version: i64,
    pub num_glyphs: u16,
    pub max_points: u16,
    pub max_contours: u16,
    pub max_composite_points: u16,
    pub max_composite_contours: u16,
    pub max_zones: u16,
    pub max_twilight_points: u16,
    pub max_storage: u16,
    pub max_function_defs: u16,
    pub max_instruction_defs: u16,
    pub max_stack_elements: u16,
    pub max_size_of_instructions: u16,
    pub max_component_elements: u16,
    pub max_component_depth: u16,
}

/// `OS/2`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Os2Table {
    pub version: u16,
    pub x_avg_char_width: i16,
    pub us_weight_class: u16,
    pub us_width_class: u16,
    pub fs_type: u16,
    pub y_strikeout_size: i16,
    pub y_strikeout_position: i16,
    pub s_family_class: i16,
    pub panose: [u8; 10],
    pub ach_vend_id: [u8; 4],
    pub fs_selection: u16,
    pub us_first_char_index: u16,
    pub us_last_char_index: u16,
    pub s_typo_ascender: i16,
    pub s_typo_descender: i16,
    pub s_typo_line_gap: i16,
    pub us_win_ascent: u16,
    pub us_win_descent: u16,
    pub sx_height: i16,
    pub s_cap_height: i16,
}

/// `hhea` or `vhea`; the two share a layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HoriHeaderTable {
    pub version: i64,
    pub ascender: i16,
    pub descender: i16,
    pub line_gap: i16,
    pub advance_max: u16,
    pub min_side_bearing_1: i16,
    pub min_side_bearing_2: i16,
    pub max_extent: i16,
    pub caret_slope_rise: i16,
    pub caret_slope_run: i16,
    pub caret_offset: i16,
    pub number_of_metrics: u16,
}

/// `post`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PostscriptTable {
    pub format_type: i64,
    pub italic_angle: i64,
    pub underline_position: i16,
    pub underline_thickness: i16,
    pub is_fixed_pitch: u32,
    pub min_mem_type42: u32,
    pub max_mem_type42: u32,
    pub min_mem_type1: u32,
    pub max_mem_type1: u32,
}

/// `PCLT`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PcltTable {
    pub version: i64,
    pub font_number: u32,
    pub pitch: u16,
    pub x_height: u16,
    pub style: u16,
    pub type_family: u16,
    pub cap_height: u16,
    pub symbol_set: u16,
    pub typeface: [u8; 16],
    pub character_complement: [u8; 8],
    pub file_name: [u8; 6],
    pub stroke_weight: i8,
    pub width_type: i8,
    pub serif_style: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bitmap_buffer_len_uses_abs_pitch() {
        let record = BitmapRecord {
            rows: 3,
            width: 5,
            pitch: -8,
            pixel_mode: PixelMode::Gray,
            num_grays: 256,
        };
        assert_eq!(record.buffer_len(), 24);
    }

    #[test]
    fn sfnt_name_decoding() {
        let windows = SfntName {
            platform_id: 3,
            encoding_id: 1,
            language_id: 0x409,
            name_id: 1,
            string: vec![0, b'S', 0, b'i', 0, b'm'],
        };
        assert_eq!(windows.to_string_lossy(), "Sim");

        let mac = SfntName {
            platform_id: 1,
            encoding_id: 0,
            language_id: 0,
            name_id: 1,
            string: b"Sim".to_vec(),
        };
        assert_eq!(mac.to_string_lossy(), "Sim");
    }
}
