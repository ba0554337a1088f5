//! Native records copied into ftown-core snapshots

use std::ffi::c_void;

use ftown_core::records::*;
use ftown_core::types::*;

use crate::ffi::*;
use crate::{bbox, c_string, slice, vector};

/// # Safety
/// `face` must be a live face.
pub(crate) unsafe fn face_record(face: &FT_FaceRec) -> FaceRecord {
    let sizes = unsafe { slice(face.available_sizes, face.num_fixed_sizes.max(0) as usize) };
    FaceRecord {
        num_faces: i64::from(face.num_faces),
        face_index: i64::from(face.face_index),
        face_flags: FaceFlags::from_bits(i64::from(face.face_flags)),
        style_flags: StyleFlags::from_bits(i64::from(face.style_flags)),
        num_glyphs: i64::from(face.num_glyphs),
        family_name: unsafe { c_string(face.family_name) },
        style_name: unsafe { c_string(face.style_name) },
        available_sizes: sizes
            .iter()
            .map(|s| BitmapSize {
                height: s.height,
                width: s.width,
                size: i64::from(s.size),
                x_ppem: i64::from(s.x_ppem),
                y_ppem: i64::from(s.y_ppem),
            })
            .collect(),
        num_charmaps: face.num_charmaps,
        bbox: bbox(face.bbox),
        units_per_em: face.units_per_EM,
        ascender: face.ascender,
        descender: face.descender,
        height: face.height,
        max_advance_width: face.max_advance_width,
        max_advance_height: face.max_advance_height,
        underline_position: face.underline_position,
        underline_thickness: face.underline_thickness,
    }
}

pub(crate) fn size_metrics(m: &FT_Size_Metrics) -> SizeMetrics {
    SizeMetrics {
        x_ppem: m.x_ppem,
        y_ppem: m.y_ppem,
        x_scale: i64::from(m.x_scale),
        y_scale: i64::from(m.y_scale),
        ascender: i64::from(m.ascender),
        descender: i64::from(m.descender),
        height: i64::from(m.height),
        max_advance: i64::from(m.max_advance),
    }
}

pub(crate) fn slot_record(slot: &FT_GlyphSlotRec) -> GlyphSlotRecord {
    let m = &slot.metrics;
    GlyphSlotRecord {
        glyph_index: slot.glyph_index,
        metrics: GlyphMetrics {
            width: i64::from(m.width),
            height: i64::from(m.height),
            hori_bearing_x: i64::from(m.horiBearingX),
            hori_bearing_y: i64::from(m.horiBearingY),
            hori_advance: i64::from(m.horiAdvance),
            vert_bearing_x: i64::from(m.vertBearingX),
            vert_bearing_y: i64::from(m.vertBearingY),
            vert_advance: i64::from(m.vertAdvance),
        },
        linear_hori_advance: i64::from(slot.linearHoriAdvance),
        linear_vert_advance: i64::from(slot.linearVertAdvance),
        advance: vector(slot.advance),
        format: GlyphFormat::from_raw(slot.format),
        bitmap_left: slot.bitmap_left,
        bitmap_top: slot.bitmap_top,
        lsb_delta: i64::from(slot.lsb_delta),
        rsb_delta: i64::from(slot.rsb_delta),
    }
}

pub(crate) fn glyph_record(glyph: &FT_GlyphRec) -> GlyphRecord {
    GlyphRecord {
        format: GlyphFormat::from_raw(glyph.format),
        advance: vector(glyph.advance),
    }
}

pub(crate) fn bitmap_record(bitmap: &FT_Bitmap) -> BitmapRecord {
    BitmapRecord {
        rows: bitmap.rows,
        width: bitmap.width,
        pitch: bitmap.pitch,
        pixel_mode: PixelMode::from_raw(bitmap.pixel_mode),
        num_grays: bitmap.num_grays,
    }
}

/// # Safety
/// `bitmap` must be a live bitmap whose buffer holds `rows * |pitch|` bytes.
pub(crate) unsafe fn bitmap_buffer(bitmap: &FT_Bitmap) -> Vec<u8> {
    let len = bitmap_record(bitmap).buffer_len();
    unsafe { slice(bitmap.buffer, len) }.to_vec()
}

/// # Safety
/// `outline` must be a live outline.
pub(crate) unsafe fn outline_record(outline: &FT_Outline) -> OutlineRecord {
    let n_points = usize::from(outline.n_points);
    let n_contours = usize::from(outline.n_contours);
    unsafe {
        OutlineRecord {
            points: slice(outline.points, n_points).iter().copied().map(vector).collect(),
            tags: slice(outline.tags, n_points).to_vec(),
            contours: slice(outline.contours, n_contours).to_vec(),
            flags: OutlineFlags::from_bits(outline.flags),
        }
    }
}

/// # Safety
/// `name.string` must point to `name.string_len` bytes.
pub(crate) unsafe fn sfnt_name(name: &FT_SfntName) -> SfntName {
    SfntName {
        platform_id: name.platform_id,
        encoding_id: name.encoding_id,
        language_id: name.language_id,
        name_id: name.name_id,
        string: unsafe { slice(name.string, name.string_len as usize) }.to_vec(),
    }
}

/// # Safety
/// The string fields must be null or NUL-terminated.
pub(crate) unsafe fn ps_font_info(info: &PS_FontInfoRec) -> PsFontInfo {
    unsafe {
        PsFontInfo {
            version: c_string(info.version),
            notice: c_string(info.notice),
            full_name: c_string(info.full_name),
            family_name: c_string(info.family_name),
            weight: c_string(info.weight),
            italic_angle: i64::from(info.italic_angle),
            is_fixed_pitch: info.is_fixed_pitch != 0,
            underline_position: info.underline_position,
            underline_thickness: info.underline_thickness,
        }
    }
}

/// # Safety
/// `mm` must come from `FT_Get_MM_Var` and not be released yet.
pub(crate) unsafe fn mm_var(mm: &FT_MM_Var) -> MmVar {
    let num_axis = mm.num_axis as usize;
    unsafe {
        let axes = slice(mm.axis, num_axis)
            .iter()
            .map(|a| VarAxis {
                name: c_string(a.name).unwrap_or_default(),
                minimum: i64::from(a.minimum),
                default: i64::from(a.def),
                maximum: i64::from(a.maximum),
                tag: a.tag as u32,
                strid: a.strid,
            })
            .collect();
        let named_styles = slice(mm.namedstyle, mm.num_namedstyles as usize)
            .iter()
            .map(|s| NamedStyle {
                coords: slice(s.coords, num_axis).iter().map(|&c| i64::from(c)).collect(),
                strid: s.strid,
                psid: s.psid,
            })
            .collect();
        MmVar {
            num_designs: mm.num_designs,
            axes,
            named_styles,
        }
    }
}

fn bytes<const N: usize>(chars: &[std::ffi::c_char; N]) -> [u8; N] {
    (*chars).map(|c| c as u8)
}

/// # Safety
/// `table` must be what `FT_Get_Sfnt_Table` returned for `tag`, non-null.
pub(crate) unsafe fn sfnt_table(tag: SfntTag, table: *mut c_void) -> SfntTable {
    match tag {
        SfntTag::Head => {
            let t = unsafe { &*table.cast::<TT_Header>() };
            SfntTable::Header(HeaderTable {
                table_version: i64::from(t.Table_Version),
                font_revision: i64::from(t.Font_Revision),
                checksum_adjust: i64::from(t.CheckSum_Adjust),
                magic_number: i64::from(t.Magic_Number),
                flags: t.Flags,
                units_per_em: t.Units_Per_EM,
                x_min: t.xMin,
                y_min: t.yMin,
                x_max: t.xMax,
                y_max: t.yMax,
                mac_style: t.Mac_Style,
                lowest_rec_ppem: t.Lowest_Rec_PPEM,
                font_direction: t.Font_Direction,
                index_to_loc_format: t.Index_To_Loc_Format,
                glyph_data_format: t.Glyph_Data_Format,
            })
        }
        SfntTag::Maxp => {
            let t = unsafe { &*table.cast::<TT_MaxProfile>() };
            SfntTable::MaxProfile(MaxProfileTable {
                version: i64::from(t.version),
                num_glyphs: t.numGlyphs,
                max_points: t.maxPoints,
                max_contours: t.maxContours,
                max_composite_points: t.maxCompositePoints,
                max_composite_contours: t.maxCompositeContours,
                max_zones: t.maxZones,
                max_twilight_points: t.maxTwilightPoints,
                max_storage: t.maxStorage,
                max_function_defs: t.maxFunctionDefs,
                max_instruction_defs: t.maxInstructionDefs,
                max_stack_elements: t.maxStackElements,
                max_size_of_instructions: t.maxSizeOfInstructions,
                max_component_elements: t.maxComponentElements,
                max_component_depth: t.maxComponentDepth,
            })
        }
        SfntTag::Os2 => {
            let t = unsafe { &*table.cast::<TT_OS2>() };
            SfntTable::Os2(Os2Table {
                version: t.version,
                x_avg_char_width: t.xAvgCharWidth,
                us_weight_class: t.usWeightClass,
                us_width_class: t.usWidthClass,
                fs_type: t.fsType,
                y_strikeout_size: t.yStrikeoutSize,
                y_strikeout_position: t.yStrikeoutPosition,
                s_family_class: t.sFamilyClass,
                panose: t.panose,
                ach_vend_id: bytes(&t.achVendID),
                fs_selection: t.fsSelection,
                us_first_char_index: t.usFirstCharIndex,
                us_last_char_index: t.usLastCharIndex,
                s_typo_ascender: t.sTypoAscender,
                s_typo_descender: t.sTypoDescender,
                s_typo_line_gap: t.sTypoLineGap,
                us_win_ascent: t.usWinAscent,
                us_win_descent: t.usWinDescent,
                sx_height: t.sxHeight,
                s_cap_height: t.sCapHeight,
            })
        }
        SfntTag::Hhea | SfntTag::Vhea => {
            let t = unsafe { &*table.cast::<TT_HoriHeader>() };
            let header = HoriHeaderTable {
                version: i64::from(t.Version),
                ascender: t.Ascender,
                descender: t.Descender,
                line_gap: t.Line_Gap,
                advance_max: t.advance_Width_Max,
                min_side_bearing_1: t.min_Left_Side_Bearing,
                min_side_bearing_2: t.min_Right_Side_Bearing,
                max_extent: t.xMax_Extent,
                caret_slope_rise: t.caret_Slope_Rise,
                caret_slope_run: t.caret_Slope_Run,
                caret_offset: t.caret_Offset,
                number_of_metrics: t.number_Of_HMetrics,
            };
            if tag == SfntTag::Hhea {
                SfntTable::HoriHeader(header)
            } else {
                SfntTable::VertHeader(header)
            }
        }
        SfntTag::Post => {
            let t = unsafe { &*table.cast::<TT_Postscript>() };
            SfntTable::Postscript(PostscriptTable {
                format_type: i64::from(t.FormatType),
                italic_angle: i64::from(t.italicAngle),
                underline_position: t.underlinePosition,
                underline_thickness: t.underlineThickness,
                is_fixed_pitch: t.isFixedPitch as u32,
                min_mem_type42: t.minMemType42 as u32,
                max_mem_type42: t.maxMemType42 as u32,
                min_mem_type1: t.minMemType1 as u32,
                max_mem_type1: t.maxMemType1 as u32,
            })
        }
        SfntTag::Pclt => {
            let t = unsafe { &*table.cast::<TT_PCLT>() };
            SfntTable::Pclt(PcltTable {
                version: i64::from(t.Version),
                font_number: t.FontNumber as u32,
                pitch: t.Pitch,
                x_height: t.xHeight,
                style: t.Style,
                type_family: t.TypeFamily,
                cap_height: t.CapHeight,
                symbol_set: t.SymbolSet,
                typeface: bytes(&t.TypeFace),
                character_complement: bytes(&t.CharacterComplement),
                file_name: bytes(&t.FileName),
                stroke_weight: t.StrokeWeight as i8,
                width_type: t.WidthType as i8,
                serif_style: t.SerifStyle,
            })
        }
    }
}
