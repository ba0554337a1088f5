//! Mirrors of the FreeType 2 public records and entry points
//!
//! Only the public part of each record is declared, so pointers to them are
//! only ever read through, never allocated on the Rust side (outlines and
//! bitmaps, which FreeType leaves to the caller, are the exception).
//! Layouts follow FreeType 2.13.

#![allow(non_camel_case_types, non_snake_case, dead_code)]

use std::ffi::{c_char, c_int, c_long, c_short, c_uchar, c_uint, c_ulong, c_ushort, c_void};

pub type FT_Error = c_int;
pub type FT_Pos = c_long;
pub type FT_Fixed = c_long;
pub type FT_F26Dot6 = c_long;
pub type FT_Long = c_long;
pub type FT_ULong = c_ulong;
pub type FT_Int = c_int;
pub type FT_UInt = c_uint;
pub type FT_Int32 = i32;
pub type FT_Short = c_short;
pub type FT_UShort = c_ushort;
pub type FT_Byte = c_uchar;
pub type FT_Bool = c_uchar;
pub type FT_Pointer = *mut c_void;

#[repr(C)]
pub struct FT_LibraryRec {
    _private: [u8; 0],
}

#[repr(C)]
pub struct FT_StrokerRec {
    _private: [u8; 0],
}

#[repr(C)]
pub struct FTC_ManagerRec {
    _private: [u8; 0],
}

pub type FT_Library = *mut FT_LibraryRec;
pub type FT_Face = *mut FT_FaceRec;
pub type FT_Size = *mut FT_SizeRec;
pub type FT_GlyphSlot = *mut FT_GlyphSlotRec;
pub type FT_CharMap = *mut FT_CharMapRec;
pub type FT_Glyph = *mut FT_GlyphRec;
pub type FT_Stroker = *mut FT_StrokerRec;
pub type FTC_Manager = *mut FTC_ManagerRec;
pub type FTC_FaceID = FT_Pointer;

#[repr(C)]
#[derive(Clone, Copy, Default)]
pub struct FT_Vector {
    pub x: FT_Pos,
    pub y: FT_Pos,
}

#[repr(C)]
#[derive(Clone, Copy, Default)]
pub struct FT_Matrix {
    pub xx: FT_Fixed,
    pub xy: FT_Fixed,
    pub yx: FT_Fixed,
    pub yy: FT_Fixed,
}

#[repr(C)]
#[derive(Clone, Copy, Default)]
pub struct FT_BBox {
    pub xMin: FT_Pos,
    pub yMin: FT_Pos,
    pub xMax: FT_Pos,
    pub yMax: FT_Pos,
}

#[repr(C)]
pub struct FT_Generic {
    pub data: *mut c_void,
    pub finalizer: Option<unsafe extern "C" fn(*mut c_void)>,
}

#[repr(C)]
pub struct FT_Bitmap_Size {
    pub height: FT_Short,
    pub width: FT_Short,
    pub size: FT_Pos,
    pub x_ppem: FT_Pos,
    pub y_ppem: FT_Pos,
}

#[repr(C)]
pub struct FT_FaceRec {
    pub num_faces: FT_Long,
    pub face_index: FT_Long,
    pub face_flags: FT_Long,
    pub style_flags: FT_Long,
    pub num_glyphs: FT_Long,
    pub family_name: *mut c_char,
    pub style_name: *mut c_char,
    pub num_fixed_sizes: FT_Int,
    pub available_sizes: *mut FT_Bitmap_Size,
    pub num_charmaps: FT_Int,
    pub charmaps: *mut FT_CharMap,
    pub generic: FT_Generic,
    pub bbox: FT_BBox,
    pub units_per_EM: FT_UShort,
    pub ascender: FT_Short,
    pub descender: FT_Short,
    pub height: FT_Short,
    pub max_advance_width: FT_Short,
    pub max_advance_height: FT_Short,
    pub underline_position: FT_Short,
    pub underline_thickness: FT_Short,
    pub glyph: FT_GlyphSlot,
    pub size: FT_Size,
    pub charmap: FT_CharMap,
    // Private fields follow
}

#[repr(C)]
pub struct FT_CharMapRec {
    pub face: FT_Face,
    /// `FT_Encoding`, a C enum holding a four-character tag.
    pub encoding: c_uint,
    pub platform_id: FT_UShort,
    pub encoding_id: FT_UShort,
}

#[repr(C)]
pub struct FT_Size_Metrics {
    pub x_ppem: FT_UShort,
    pub y_ppem: FT_UShort,
    pub x_scale: FT_Fixed,
    pub y_scale: FT_Fixed,
    pub ascender: FT_Pos,
    pub descender: FT_Pos,
    pub height: FT_Pos,
    pub max_advance: FT_Pos,
}

#[repr(C)]
pub struct FT_SizeRec {
    pub face: FT_Face,
    pub generic: FT_Generic,
    pub metrics: FT_Size_Metrics,
    internal: *mut c_void,
}

#[repr(C)]
pub struct FT_Glyph_Metrics {
    pub width: FT_Pos,
    pub height: FT_Pos,
    pub horiBearingX: FT_Pos,
    pub horiBearingY: FT_Pos,
    pub horiAdvance: FT_Pos,
    pub vertBearingX: FT_Pos,
    pub vertBearingY: FT_Pos,
    pub vertAdvance: FT_Pos,
}

#[repr(C)]
pub struct FT_Bitmap {
    pub rows: c_uint,
    pub width: c_uint,
    pub pitch: c_int,
    pub buffer: *mut c_uchar,
    pub num_grays: c_ushort,
    pub pixel_mode: c_uchar,
    pub palette_mode: c_uchar,
    pub palette: *mut c_void,
}

impl FT_Bitmap {
    /// The state `FT_Bitmap_Init` leaves behind.
    pub fn empty() -> Self {
        Self {
            rows: 0,
            width: 0,
            pitch: 0,
            buffer: std::ptr::null_mut(),
            num_grays: 0,
            pixel_mode: 0,
            palette_mode: 0,
            palette: std::ptr::null_mut(),
        }
    }
}

#[repr(C)]
pub struct FT_Outline {
    pub n_contours: c_ushort,
    pub n_points: c_ushort,
    pub points: *mut FT_Vector,
    pub tags: *mut c_uchar,
    pub contours: *mut c_ushort,
    pub flags: c_int,
}

impl FT_Outline {
    pub fn empty() -> Self {
        Self {
            n_contours: 0,
            n_points: 0,
            points: std::ptr::null_mut(),
            tags: std::ptr::null_mut(),
            contours: std::ptr::null_mut(),
            flags: 0,
        }
    }
}

#[repr(C)]
pub struct FT_GlyphSlotRec {
    pub library: FT_Library,
    pub face: FT_Face,
    pub next: FT_GlyphSlot,
    pub glyph_index: FT_UInt,
    pub generic: FT_Generic,
    pub metrics: FT_Glyph_Metrics,
    pub linearHoriAdvance: FT_Fixed,
    pub linearVertAdvance: FT_Fixed,
    pub advance: FT_Vector,
    /// `FT_Glyph_Format` tag.
    pub format: c_uint,
    pub bitmap: FT_Bitmap,
    pub bitmap_left: FT_Int,
    pub bitmap_top: FT_Int,
    pub outline: FT_Outline,
    pub num_subglyphs: FT_UInt,
    subglyphs: *mut c_void,
    pub control_data: *mut c_void,
    pub control_len: c_long,
    pub lsb_delta: FT_Pos,
    pub rsb_delta: FT_Pos,
    pub other: *mut c_void,
    internal: *mut c_void,
}

#[repr(C)]
pub struct FT_GlyphRec {
    pub library: FT_Library,
    clazz: *const c_void,
    pub format: c_uint,
    pub advance: FT_Vector,
}

#[repr(C)]
pub struct FT_BitmapGlyphRec {
    pub root: FT_GlyphRec,
    pub left: FT_Int,
    pub top: FT_Int,
    pub bitmap: FT_Bitmap,
}

#[repr(C)]
pub struct FT_OutlineGlyphRec {
    pub root: FT_GlyphRec,
    pub outline: FT_Outline,
}

pub type FT_Outline_MoveToFunc = unsafe extern "C" fn(to: *const FT_Vector, user: *mut c_void) -> c_int;
pub type FT_Outline_LineToFunc = unsafe extern "C" fn(to: *const FT_Vector, user: *mut c_void) -> c_int;
pub type FT_Outline_ConicToFunc =
    unsafe extern "C" fn(control: *const FT_Vector, to: *const FT_Vector, user: *mut c_void) -> c_int;
pub type FT_Outline_CubicToFunc = unsafe extern "C" fn(
    control1: *const FT_Vector,
    control2: *const FT_Vector,
    to: *const FT_Vector,
    user: *mut c_void,
) -> c_int;

#[repr(C)]
pub struct FT_Outline_Funcs {
    pub move_to: FT_Outline_MoveToFunc,
    pub line_to: FT_Outline_LineToFunc,
    pub conic_to: FT_Outline_ConicToFunc,
    pub cubic_to: FT_Outline_CubicToFunc,
    pub shift: c_int,
    pub delta: FT_Pos,
}

#[repr(C)]
pub struct FT_SfntName {
    pub platform_id: FT_UShort,
    pub encoding_id: FT_UShort,
    pub language_id: FT_UShort,
    pub name_id: FT_UShort,
    pub string: *mut FT_Byte,
    pub string_len: FT_UInt,
}

#[repr(C)]
pub struct PS_FontInfoRec {
    pub version: *mut c_char,
    pub notice: *mut c_char,
    pub full_name: *mut c_char,
    pub family_name: *mut c_char,
    pub weight: *mut c_char,
    pub italic_angle: FT_Long,
    pub is_fixed_pitch: FT_Bool,
    pub underline_position: FT_Short,
    pub underline_thickness: FT_UShort,
}

#[repr(C)]
pub struct FT_Var_Axis {
    pub name: *mut c_char,
    pub minimum: FT_Fixed,
    pub def: FT_Fixed,
    pub maximum: FT_Fixed,
    pub tag: FT_ULong,
    pub strid: FT_UInt,
}

#[repr(C)]
pub struct FT_Var_Named_Style {
    pub coords: *mut FT_Fixed,
    pub strid: FT_UInt,
    pub psid: FT_UInt,
}

#[repr(C)]
pub struct FT_MM_Var {
    pub num_axis: FT_UInt,
    pub num_designs: FT_UInt,
    pub num_namedstyles: FT_UInt,
    pub axis: *mut FT_Var_Axis,
    pub namedstyle: *mut FT_Var_Named_Style,
}

// SFNT tables, as returned by `FT_Get_Sfnt_Table`

#[repr(C)]
pub struct TT_Header {
    pub Table_Version: FT_Fixed,
    pub Font_Revision: FT_Fixed,
    pub CheckSum_Adjust: FT_Long,
    pub Magic_Number: FT_Long,
    pub Flags: FT_UShort,
    pub Units_Per_EM: FT_UShort,
    pub Created: [FT_ULong; 2],
    pub Modified: [FT_ULong; 2],
    pub xMin: FT_Short,
    pub yMin: FT_Short,
    pub xMax: FT_Short,
    pub yMax: FT_Short,
    pub Mac_Style: FT_UShort,
    pub Lowest_Rec_PPEM: FT_UShort,
    pub Font_Direction: FT_Short,
    pub Index_To_Loc_Format: FT_Short,
    pub Glyph_Data_Format: FT_Short,
}

#[repr(C)]
pub struct TT_MaxProfile {
    pub version: FT_Fixed,
    pub numGlyphs: FT_UShort,
    pub maxPoints: FT_UShort,
    pub maxContours: FT_UShort,
    pub maxCompositePoints: FT_UShort,
    pub maxCompositeContours: FT_UShort,
    pub maxZones: FT_UShort,
    pub maxTwilightPoints: FT_UShort,
    pub maxStorage: FT_UShort,
    pub maxFunctionDefs: FT_UShort,
    pub maxInstructionDefs: FT_UShort,
    pub maxStackElements: FT_UShort,
    pub maxSizeOfInstructions: FT_UShort,
    pub maxComponentElements: FT_UShort,
    pub maxComponentDepth: FT_UShort,
}

#[repr(C)]
pub struct TT_OS2 {
    pub version: FT_UShort,
    pub xAvgCharWidth: FT_Short,
    pub usWeightClass: FT_UShort,
    pub usWidthClass: FT_UShort,
    pub fsType: FT_UShort,
    pub ySubscriptXSize: FT_Short,
    pub ySubscriptYSize: FT_Short,
    pub ySubscriptXOffset: FT_Short,
    pub ySubscriptYOffset: FT_Short,
    pub ySuperscriptXSize: FT_Short,
    pub ySuperscriptYSize: FT_Short,
    pub ySuperscriptXOffset: FT_Short,
    pub ySuperscriptYOffset: FT_Short,
    pub yStrikeoutSize: FT_Short,
    pub yStrikeoutPosition: FT_Short,
    pub sFamilyClass: FT_Short,
    pub panose: [FT_Byte; 10],
    pub ulUnicodeRange1: FT_ULong,
    pub ulUnicodeRange2: FT_ULong,
    pub ulUnicodeRange3: FT_ULong,
    pub ulUnicodeRange4: FT_ULong,
    pub achVendID: [c_char; 4],
    pub fsSelection: FT_UShort,
    pub usFirstCharIndex: FT_UShort,
    pub usLastCharIndex: FT_UShort,
    pub sTypoAscender: FT_Short,
    pub sTypoDescender: FT_Short,
    pub sTypoLineGap: FT_Short,
    pub usWinAscent: FT_UShort,
    pub usWinDescent: FT_UShort,
    pub ulCodePageRange1: FT_ULong,
    pub ulCodePageRange2: FT_ULong,
    pub sxHeight: FT_Short,
    pub sCapHeight: FT_Short,
    pub usDefaultChar: FT_UShort,
    pub usBreakChar: FT_UShort,
    pub usMaxContext: FT_UShort,
    pub usLowerOpticalPointSize: FT_UShort,
    pub usUpperOpticalPointSize: FT_UShort,
}

/// `TT_HoriHeader` and `TT_VertHeader` share this layout.
#[repr(C)]
pub struct TT_HoriHeader {
    pub Version: FT_Fixed,
    pub Ascender: FT_Short,
    pub Descender: FT_Short,
    pub Line_Gap: FT_Short,
    pub advance_Width_Max: FT_UShort,
    pub min_Left_Side_Bearing: FT_Short,
    pub min_Right_Side_Bearing: FT_Short,
    pub xMax_Extent: FT_Short,
    pub caret_Slope_Rise: FT_Short,
    pub caret_Slope_Run: FT_Short,
    pub caret_Offset: FT_Short,
    pub Reserved: [FT_Short; 4],
    pub metric_Data_Format: FT_Short,
    pub number_Of_HMetrics: FT_UShort,
    pub long_metrics: *mut c_void,
    pub short_metrics: *mut c_void,
}

#[repr(C)]
pub struct TT_Postscript {
    pub FormatType: FT_Fixed,
    pub italicAngle: FT_Fixed,
    pub underlinePosition: FT_Short,
    pub underlineThickness: FT_Short,
    pub isFixedPitch: FT_ULong,
    pub minMemType42: FT_ULong,
    pub maxMemType42: FT_ULong,
    pub minMemType1: FT_ULong,
    pub maxMemType1: FT_ULong,
}

#[repr(C)]
pub struct TT_PCLT {
    pub Version: FT_Fixed,
    pub FontNumber: FT_ULong,
    pub Pitch: FT_UShort,
    pub xHeight: FT_UShort,
    pub Style: FT_UShort,
    pub TypeFamily: FT_UShort,
    pub CapHeight: FT_UShort,
    pub SymbolSet: FT_UShort,
    pub TypeFace: [c_char; 16],
    pub CharacterComplement: [c_char; 8],
    pub FileName: [c_char; 6],
    pub StrokeWeight: c_char,
    pub WidthType: c_char,
    pub SerifStyle: FT_Byte,
    pub Reserved: FT_Byte,
}

#[repr(C)]
pub struct FT_Size_RequestRec {
    pub type_: c_uint,
    pub width: FT_Long,
    pub height: FT_Long,
    pub horiResolution: FT_UInt,
    pub vertResolution: FT_UInt,
}

pub type FTC_Face_Requester = unsafe extern "C" fn(
    face_id: FTC_FaceID,
    library: FT_Library,
    req_data: FT_Pointer,
    aface: *mut FT_Face,
) -> FT_Error;

// Symbols come from the libfreetype that freetype-sys links.
extern "C" {
    // Library
    pub fn FT_Init_FreeType(alibrary: *mut FT_Library) -> FT_Error;
    pub fn FT_Done_FreeType(library: FT_Library) -> FT_Error;
    pub fn FT_Library_Version(library: FT_Library, amajor: *mut FT_Int, aminor: *mut FT_Int, apatch: *mut FT_Int);
    pub fn FT_Library_SetLcdFilter(library: FT_Library, filter: c_uint) -> FT_Error;
    pub fn FT_Property_Set(
        library: FT_Library,
        module_name: *const c_char,
        property_name: *const c_char,
        value: *const c_void,
    ) -> FT_Error;
    pub fn FT_Property_Get(
        library: FT_Library,
        module_name: *const c_char,
        property_name: *const c_char,
        value: *mut c_void,
    ) -> FT_Error;
    pub fn FT_Get_TrueType_Engine_Type(library: FT_Library) -> c_uint;

    // Faces
    pub fn FT_New_Face(
        library: FT_Library,
        filepathname: *const c_char,
        face_index: FT_Long,
        aface: *mut FT_Face,
    ) -> FT_Error;
    pub fn FT_New_Memory_Face(
        library: FT_Library,
        file_base: *const FT_Byte,
        file_size: FT_Long,
        face_index: FT_Long,
        aface: *mut FT_Face,
    ) -> FT_Error;
    pub fn FT_Reference_Face(face: FT_Face) -> FT_Error;
    pub fn FT_Done_Face(face: FT_Face) -> FT_Error;
    pub fn FT_Attach_File(face: FT_Face, filepathname: *const c_char) -> FT_Error;
    pub fn FT_Set_Char_Size(
        face: FT_Face,
        char_width: FT_F26Dot6,
        char_height: FT_F26Dot6,
        horz_resolution: FT_UInt,
        vert_resolution: FT_UInt,
    ) -> FT_Error;
    pub fn FT_Set_Pixel_Sizes(face: FT_Face, pixel_width: FT_UInt, pixel_height: FT_UInt) -> FT_Error;
    pub fn FT_Select_Size(face: FT_Face, strike_index: FT_Int) -> FT_Error;
    pub fn FT_Request_Size(face: FT_Face, req: *mut FT_Size_RequestRec) -> FT_Error;
    pub fn FT_Set_Transform(face: FT_Face, matrix: *const FT_Matrix, delta: *const FT_Vector);
    pub fn FT_Load_Glyph(face: FT_Face, glyph_index: FT_UInt, load_flags: FT_Int32) -> FT_Error;
    pub fn FT_Load_Char(face: FT_Face, char_code: FT_ULong, load_flags: FT_Int32) -> FT_Error;
    pub fn FT_Get_Char_Index(face: FT_Face, charcode: FT_ULong) -> FT_UInt;
    pub fn FT_Get_First_Char(face: FT_Face, agindex: *mut FT_UInt) -> FT_ULong;
    pub fn FT_Get_Next_Char(face: FT_Face, char_code: FT_ULong, agindex: *mut FT_UInt) -> FT_ULong;
    pub fn FT_Get_Kerning(
        face: FT_Face,
        left_glyph: FT_UInt,
        right_glyph: FT_UInt,
        kern_mode: FT_UInt,
        akerning: *mut FT_Vector,
    ) -> FT_Error;
    pub fn FT_Get_Advance(face: FT_Face, gindex: FT_UInt, load_flags: FT_Int32, padvance: *mut FT_Fixed) -> FT_Error;
    pub fn FT_Get_Glyph_Name(face: FT_Face, glyph_index: FT_UInt, buffer: FT_Pointer, buffer_max: FT_UInt)
        -> FT_Error;
    pub fn FT_Get_Name_Index(face: FT_Face, glyph_name: *const c_char) -> FT_UInt;
    pub fn FT_Get_Postscript_Name(face: FT_Face) -> *const c_char;

    // Charmaps
    pub fn FT_Select_Charmap(face: FT_Face, encoding: c_uint) -> FT_Error;
    pub fn FT_Set_Charmap(face: FT_Face, charmap: FT_CharMap) -> FT_Error;
    pub fn FT_Get_Charmap_Index(charmap: FT_CharMap) -> FT_Int;

    // SFNT, PostScript and variations
    pub fn FT_Get_Sfnt_Table(face: FT_Face, tag: c_uint) -> *mut c_void;
    pub fn FT_Load_Sfnt_Table(
        face: FT_Face,
        tag: FT_ULong,
        offset: FT_Long,
        buffer: *mut FT_Byte,
        length: *mut FT_ULong,
    ) -> FT_Error;
    pub fn FT_Get_Sfnt_Name_Count(face: FT_Face) -> FT_UInt;
    pub fn FT_Get_Sfnt_Name(face: FT_Face, idx: FT_UInt, aname: *mut FT_SfntName) -> FT_Error;
    pub fn FT_Get_PS_Font_Info(face: FT_Face, afont_info: *mut PS_FontInfoRec) -> FT_Error;
    pub fn FT_Has_PS_Glyph_Names(face: FT_Face) -> FT_Int;
    pub fn FT_Get_FSType_Flags(face: FT_Face) -> FT_UShort;
    pub fn FT_Get_Font_Format(face: FT_Face) -> *const c_char;
    pub fn FT_Get_MM_Var(face: FT_Face, amaster: *mut *mut FT_MM_Var) -> FT_Error;
    pub fn FT_Done_MM_Var(library: FT_Library, amaster: *mut FT_MM_Var) -> FT_Error;
    pub fn FT_Get_Var_Design_Coordinates(face: FT_Face, num_coords: FT_UInt, coords: *mut FT_Fixed) -> FT_Error;
    pub fn FT_Set_Var_Design_Coordinates(face: FT_Face, num_coords: FT_UInt, coords: *mut FT_Fixed) -> FT_Error;
    pub fn FT_Set_Var_Blend_Coordinates(face: FT_Face, num_coords: FT_UInt, coords: *mut FT_Fixed) -> FT_Error;
    pub fn FT_Set_Named_Instance(face: FT_Face, instance_index: FT_UInt) -> FT_Error;

    // Sizes
    pub fn FT_New_Size(face: FT_Face, size: *mut FT_Size) -> FT_Error;
    pub fn FT_Done_Size(size: FT_Size) -> FT_Error;
    pub fn FT_Activate_Size(size: FT_Size) -> FT_Error;

    // Glyph slots and glyphs
    pub fn FT_Render_Glyph(slot: FT_GlyphSlot, render_mode: c_uint) -> FT_Error;
    pub fn FT_Get_Glyph(slot: FT_GlyphSlot, aglyph: *mut FT_Glyph) -> FT_Error;
    pub fn FT_Glyph_Copy(source: FT_Glyph, target: *mut FT_Glyph) -> FT_Error;
    pub fn FT_Glyph_Transform(glyph: FT_Glyph, matrix: *const FT_Matrix, delta: *const FT_Vector) -> FT_Error;
    pub fn FT_Glyph_Get_CBox(glyph: FT_Glyph, bbox_mode: FT_UInt, acbox: *mut FT_BBox);
    pub fn FT_Glyph_To_Bitmap(
        the_glyph: *mut FT_Glyph,
        render_mode: c_uint,
        origin: *const FT_Vector,
        destroy: FT_Bool,
    ) -> FT_Error;
    pub fn FT_Glyph_Stroke(pglyph: *mut FT_Glyph, stroker: FT_Stroker, destroy: FT_Bool) -> FT_Error;
    pub fn FT_Glyph_StrokeBorder(pglyph: *mut FT_Glyph, stroker: FT_Stroker, inside: FT_Bool, destroy: FT_Bool)
        -> FT_Error;
    pub fn FT_Done_Glyph(glyph: FT_Glyph);

    // Outlines
    pub fn FT_Outline_New(
        library: FT_Library,
        numPoints: FT_UInt,
        numContours: FT_Int,
        anoutline: *mut FT_Outline,
    ) -> FT_Error;
    pub fn FT_Outline_Done(library: FT_Library, outline: *mut FT_Outline) -> FT_Error;
    pub fn FT_Outline_Copy(source: *const FT_Outline, target: *mut FT_Outline) -> FT_Error;
    pub fn FT_Outline_Translate(outline: *const FT_Outline, xOffset: FT_Pos, yOffset: FT_Pos);
    pub fn FT_Outline_Transform(outline: *const FT_Outline, matrix: *const FT_Matrix);
    pub fn FT_Outline_Embolden(outline: *mut FT_Outline, strength: FT_Pos) -> FT_Error;
    pub fn FT_Outline_EmboldenXY(outline: *mut FT_Outline, xstrength: FT_Pos, ystrength: FT_Pos) -> FT_Error;
    pub fn FT_Outline_Reverse(outline: *mut FT_Outline);
    pub fn FT_Outline_Check(outline: *mut FT_Outline) -> FT_Error;
    pub fn FT_Outline_Get_CBox(outline: *const FT_Outline, acbox: *mut FT_BBox);
    pub fn FT_Outline_Get_BBox(outline: *mut FT_Outline, abbox: *mut FT_BBox) -> FT_Error;
    pub fn FT_Outline_Get_Orientation(outline: *mut FT_Outline) -> c_uint;
    pub fn FT_Outline_Decompose(
        outline: *mut FT_Outline,
        func_interface: *const FT_Outline_Funcs,
        user: *mut c_void,
    ) -> FT_Error;
    pub fn FT_Outline_Get_Bitmap(library: FT_Library, outline: *mut FT_Outline, abitmap: *const FT_Bitmap)
        -> FT_Error;

    // Bitmaps
    pub fn FT_Bitmap_Init(abitmap: *mut FT_Bitmap);
    pub fn FT_Bitmap_Done(library: FT_Library, bitmap: *mut FT_Bitmap) -> FT_Error;
    pub fn FT_Bitmap_Copy(library: FT_Library, source: *const FT_Bitmap, target: *mut FT_Bitmap) -> FT_Error;
    pub fn FT_Bitmap_Convert(
        library: FT_Library,
        source: *const FT_Bitmap,
        target: *mut FT_Bitmap,
        alignment: FT_Int,
    ) -> FT_Error;
    pub fn FT_Bitmap_Embolden(library: FT_Library, bitmap: *mut FT_Bitmap, xStrength: FT_Pos, yStrength: FT_Pos)
        -> FT_Error;

    // Strokers
    pub fn FT_Stroker_New(library: FT_Library, astroker: *mut FT_Stroker) -> FT_Error;
    pub fn FT_Stroker_Set(
        stroker: FT_Stroker,
        radius: FT_Fixed,
        line_cap: c_uint,
        line_join: c_uint,
        miter_limit: FT_Fixed,
    );
    pub fn FT_Stroker_Done(stroker: FT_Stroker);

    // Cache manager
    pub fn FTC_Manager_New(
        library: FT_Library,
        max_faces: FT_UInt,
        max_sizes: FT_UInt,
        max_bytes: FT_ULong,
        requester: FTC_Face_Requester,
        req_data: FT_Pointer,
        amanager: *mut FTC_Manager,
    ) -> FT_Error;
    pub fn FTC_Manager_Done(manager: FTC_Manager);
    pub fn FTC_Manager_Reset(manager: FTC_Manager);
    pub fn FTC_Manager_LookupFace(manager: FTC_Manager, face_id: FTC_FaceID, aface: *mut FT_Face) -> FT_Error;
    pub fn FTC_Manager_RemoveFaceID(manager: FTC_Manager, face_id: FTC_FaceID);
}
