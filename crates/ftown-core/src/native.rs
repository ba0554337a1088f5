//! The native boundary
//!
//! [`FreeTypeApi`] is the FreeType C ABI as the wrappers see it: handles go
//! in, error codes and raw handles come out. Backends own every unsafe detail
//! of reaching the actual library; the wrappers own every lifetime decision.
//!
//! ## Conventions
//!
//! - Factories return `NativeResult<RawHandle>`. A non-zero native error is
//!   `Err(code)`; a null result is `Ok(0)` and is rejected by the caller.
//! - Release calls return `NativeResult<()>` and are called at most once per
//!   handle.
//! - Record readers copy native fields into plain values.
//! - Embedded-object accessors (`face_glyph_slot`, `slot_outline`, ...)
//!   return the address of a field inside the parent's memory. That address
//!   is only valid while the parent is.
//! - Calls taking Rust callbacks must not let a panic or error unwind through
//!   native frames; they translate it into an error code and resurface it
//!   once control is back on the Rust side.

use std::fmt;
use std::path::Path;
use std::rc::Rc;

use crate::handle::{NativeHandle, RawHandle};
use crate::records::*;
use crate::types::*;

/// A FreeType error code, kept verbatim.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ErrorCode(pub i32);

macro_rules! error_codes {
    ($($name:ident = $value:literal, $text:literal;)*) => {
        impl ErrorCode {
            $(pub const $name: ErrorCode = ErrorCode($value);)*

            /// FreeType's symbolic name for the code, e.g. `Invalid_Argument`.
            pub fn name(self) -> Option<&'static str> {
                match self.0 {
                    $($value => Some($text),)*
                    _ => None,
                }
            }
        }
    };
}

error_codes! {
    OK = 0x00, "Ok";
    CANNOT_OPEN_RESOURCE = 0x01, "Cannot_Open_Resource";
    UNKNOWN_FILE_FORMAT = 0x02, "Unknown_File_Format";
    INVALID_FILE_FORMAT = 0x03, "Invalid_File_Format";
    INVALID_VERSION = 0x04, "Invalid_Version";
    LOWER_MODULE_VERSION = 0x05, "Lower_Module_Version";
    INVALID_ARGUMENT = 0x06, "Invalid_Argument";
    UNIMPLEMENTED_FEATURE = 0x07, "Unimplemented_Feature";
    INVALID_TABLE = 0x08, "Invalid_Table";
    INVALID_OFFSET = 0x09, "Invalid_Offset";
    ARRAY_TOO_LARGE = 0x0A, "Array_Too_Large";
    MISSING_MODULE = 0x0B, "Missing_Module";
    MISSING_PROPERTY = 0x0C, "Missing_Property";
    INVALID_GLYPH_INDEX = 0x10, "Invalid_Glyph_Index";
    INVALID_CHARACTER_CODE = 0x11, "Invalid_Character_Code";
    INVALID_GLYPH_FORMAT = 0x12, "Invalid_Glyph_Format";
    CANNOT_RENDER_GLYPH = 0x13, "Cannot_Render_Glyph";
    INVALID_OUTLINE = 0x14, "Invalid_Outline";
    INVALID_COMPOSITE = 0x15, "Invalid_Composite";
    TOO_MANY_HINTS = 0x16, "Too_Many_Hints";
    INVALID_PIXEL_SIZE = 0x17, "Invalid_Pixel_Size";
    INVALID_SVG_DOCUMENT = 0x18, "Invalid_SVG_Document";
    INVALID_HANDLE = 0x20, "Invalid_Handle";
    INVALID_LIBRARY_HANDLE = 0x21, "Invalid_Library_Handle";
    INVALID_DRIVER_HANDLE = 0x22, "Invalid_Driver_Handle";
    INVALID_FACE_HANDLE = 0x23, "Invalid_Face_Handle";
    INVALID_SIZE_HANDLE = 0x24, "Invalid_Size_Handle";
    INVALID_SLOT_HANDLE = 0x25, "Invalid_Slot_Handle";
    INVALID_CHARMAP_HANDLE = 0x26, "Invalid_CharMap_Handle";
    INVALID_CACHE_HANDLE = 0x27, "Invalid_Cache_Handle";
    INVALID_STREAM_HANDLE = 0x28, "Invalid_Stream_Handle";
    TOO_MANY_DRIVERS = 0x30, "Too_Many_Drivers";
    TOO_MANY_EXTENSIONS = 0x31, "Too_Many_Extensions";
    OUT_OF_MEMORY = 0x40, "Out_Of_Memory";
    UNLISTED_OBJECT = 0x41, "Unlisted_Object";
    CANNOT_OPEN_STREAM = 0x51, "Cannot_Open_Stream";
    INVALID_STREAM_SEEK = 0x52, "Invalid_Stream_Seek";
    INVALID_STREAM_SKIP = 0x53, "Invalid_Stream_Skip";
    INVALID_STREAM_READ = 0x54, "Invalid_Stream_Read";
    INVALID_STREAM_OPERATION = 0x55, "Invalid_Stream_Operation";
    INVALID_FRAME_OPERATION = 0x56, "Invalid_Frame_Operation";
    NESTED_FRAME_ACCESS = 0x57, "Nested_Frame_Access";
    INVALID_FRAME_READ = 0x58, "Invalid_Frame_Read";
    RASTER_UNINITIALIZED = 0x60, "Raster_Uninitialized";
    RASTER_CORRUPTED = 0x61, "Raster_Corrupted";
    RASTER_OVERFLOW = 0x62, "Raster_Overflow";
    RASTER_NEGATIVE_HEIGHT = 0x63, "Raster_Negative_Height";
    TOO_MANY_CACHES = 0x70, "Too_Many_Caches";
    INVALID_OPCODE = 0x80, "Invalid_Opcode";
    TOO_FEW_ARGUMENTS = 0x81, "Too_Few_Arguments";
    STACK_OVERFLOW = 0x82, "Stack_Overflow";
    CODE_OVERFLOW = 0x83, "Code_Overflow";
    BAD_ARGUMENT = 0x84, "Bad_Argument";
    DIVIDE_BY_ZERO = 0x85, "Divide_By_Zero";
    INVALID_REFERENCE = 0x86, "Invalid_Reference";
    DEBUG_OPCODE = 0x87, "Debug_OpCode";
    ENDF_IN_EXEC_STREAM = 0x88, "ENDF_In_Exec_Stream";
    NESTED_DEFS = 0x89, "Nested_DEFS";
    INVALID_CODE_RANGE = 0x8A, "Invalid_CodeRange";
    EXECUTION_TOO_LONG = 0x8B, "Execution_Too_Long";
    TOO_MANY_FUNCTION_DEFS = 0x8C, "Too_Many_Function_Defs";
    TOO_MANY_INSTRUCTION_DEFS = 0x8D, "Too_Many_Instruction_Defs";
    TABLE_MISSING = 0x8E, "Table_Missing";
    HORIZ_HEADER_MISSING = 0x8F, "Horiz_Header_Missing";
    LOCATIONS_MISSING = 0x90, "Locations_Missing";
    NAME_TABLE_MISSING = 0x91, "Name_Table_Missing";
    CMAP_TABLE_MISSING = 0x92, "CMap_Table_Missing";
    HMTX_TABLE_MISSING = 0x93, "Hmtx_Table_Missing";
    POST_TABLE_MISSING = 0x94, "Post_Table_Missing";
    INVALID_HORIZ_METRICS = 0x95, "Invalid_Horiz_Metrics";
    INVALID_CHARMAP_FORMAT = 0x96, "Invalid_CharMap_Format";
    INVALID_PPEM = 0x97, "Invalid_PPem";
    INVALID_VERT_METRICS = 0x98, "Invalid_Vert_Metrics";
    COULD_NOT_FIND_CONTEXT = 0x99, "Could_Not_Find_Context";
    INVALID_POST_TABLE_FORMAT = 0x9A, "Invalid_Post_Table_Format";
    INVALID_POST_TABLE = 0x9B, "Invalid_Post_Table";
    DEF_IN_GLYF_BYTECODE = 0x9C, "DEF_In_Glyf_Bytecode";
    MISSING_BITMAP = 0x9D, "Missing_Bitmap";
    MISSING_SVG_HOOKS = 0x9E, "Missing_SVG_Hooks";
    SYNTAX_ERROR = 0xA0, "Syntax_Error";
    STACK_UNDERFLOW = 0xA1, "Stack_Underflow";
    IGNORE = 0xA2, "Ignore";
    NO_UNICODE_GLYPH_NAME = 0xA3, "No_Unicode_Glyph_Name";
    GLYPH_TOO_BIG = 0xA4, "Glyph_Too_Big";
    MISSING_STARTFONT_FIELD = 0xB0, "Missing_Startfont_Field";
    MISSING_FONT_FIELD = 0xB1, "Missing_Font_Field";
    MISSING_SIZE_FIELD = 0xB2, "Missing_Size_Field";
    MISSING_FONTBOUNDINGBOX_FIELD = 0xB3, "Missing_Fontboundingbox_Field";
    MISSING_CHARS_FIELD = 0xB4, "Missing_Chars_Field";
    MISSING_STARTCHAR_FIELD = 0xB5, "Missing_Startchar_Field";
    MISSING_ENCODING_FIELD = 0xB6, "Missing_Encoding_Field";
    MISSING_BBX_FIELD = 0xB7, "Missing_Bbx_Field";
    BBX_TOO_BIG = 0xB8, "Bbx_Too_Big";
    CORRUPTED_FONT_HEADER = 0xB9, "Corrupted_Font_Header";
    CORRUPTED_FONT_GLYPHS = 0xBA, "Corrupted_Font_Glyphs";
}

impl ErrorCode {
    /// Interpret a raw native return value.
    pub fn check(raw: i32) -> NativeResult<()> {
        if raw == 0 {
            Ok(())
        } else {
            Err(ErrorCode(raw))
        }
    }
}

impl fmt::Debug for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ErrorCode({self})")
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{name} ({:#04x})", self.0),
            None => write!(f, "error {:#04x}", self.0),
        }
    }
}

pub type NativeResult<T> = std::result::Result<T, ErrorCode>;

/// Receiver for [`FreeTypeApi::decompose_outline`].
///
/// Coordinates are in the outline's own units. Returning an error stops the
/// walk and becomes the result of the decomposition.
pub trait OutlineSink {
    fn move_to(&mut self, to: Vector) -> NativeResult<()>;
    fn line_to(&mut self, to: Vector) -> NativeResult<()>;
    fn conic_to(&mut self, control: Vector, to: Vector) -> NativeResult<()>;
    fn cubic_to(&mut self, control1: Vector, control2: Vector, to: Vector) -> NativeResult<()>;
}

/// Opens the face behind a cache face ID.
///
/// Called by the native cache manager whenever it needs a face it does not
/// hold. The returned face belongs to the manager from then on.
pub trait FaceRequester {
    fn request_face(&self, api: &dyn FreeTypeApi, library: NativeHandle, face_id: usize) -> NativeResult<RawHandle>;
}

/// Cache manager limits. Zero selects the native default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ManagerLimits {
    pub max_faces: u32,
    pub max_sizes: u32,
    pub max_bytes: u64,
}

/// The FreeType ABI.
///
/// Everything the wrappers ask of the native library goes through here.
/// Optional modules (variations, PostScript dictionaries, caching, the
/// stroker) have default implementations reporting `Unimplemented_Feature`,
/// mirroring a native build compiled without them.
pub trait FreeTypeApi {
    /// Backend name, for logs
    fn name(&self) -> &'static str;

    // Library

    fn init_library(&self) -> NativeResult<RawHandle>;
    fn done_library(&self, library: NativeHandle) -> NativeResult<()>;
    fn library_version(&self, library: NativeHandle) -> Version;

    fn set_lcd_filter(&self, _library: NativeHandle, _filter: LcdFilter) -> NativeResult<()> {
        Err(ErrorCode::UNIMPLEMENTED_FEATURE)
    }

    fn truetype_engine(&self, _library: NativeHandle) -> TrueTypeEngine {
        TrueTypeEngine::None
    }

    /// Set a driver or module property (`FT_Property_Set`). Unknown modules
    /// report `Missing_Module`, unknown properties `Missing_Property`.
    fn property_set(
        &self,
        _library: NativeHandle,
        _module: &str,
        _property: &str,
        _value: &PropertyValue,
    ) -> NativeResult<()> {
        Err(ErrorCode::MISSING_MODULE)
    }

    fn property_get(
        &self,
        _library: NativeHandle,
        _module: &str,
        _property: &str,
        _kind: PropertyKind,
    ) -> NativeResult<PropertyValue> {
        Err(ErrorCode::MISSING_MODULE)
    }

    // Faces

    fn new_face(&self, library: NativeHandle, path: &Path, face_index: i64) -> NativeResult<RawHandle>;

    /// The backend keeps `data` alive until the face's last reference is
    /// released.
    fn new_memory_face(&self, library: NativeHandle, data: Rc<[u8]>, face_index: i64) -> NativeResult<RawHandle>;

    /// Add a reference to a face (`FT_Reference_Face`).
    fn reference_face(&self, face: NativeHandle) -> NativeResult<()>;
    /// Drop one face reference, freeing the face with the last one.
    fn done_face(&self, face: NativeHandle) -> NativeResult<()>;

    fn attach_file(&self, _face: NativeHandle, _path: &Path) -> NativeResult<()> {
        Err(ErrorCode::UNIMPLEMENTED_FEATURE)
    }

    fn face_record(&self, face: NativeHandle) -> FaceRecord;

    fn set_char_size(&self, face: NativeHandle, width: i64, height: i64, h_res: u32, v_res: u32) -> NativeResult<()>;
    fn set_pixel_sizes(&self, face: NativeHandle, width: u32, height: u32) -> NativeResult<()>;
    fn select_size(&self, face: NativeHandle, strike_index: i32) -> NativeResult<()>;
    fn request_size(&self, face: NativeHandle, request: &SizeRequest) -> NativeResult<()>;
    fn set_transform(&self, face: NativeHandle, matrix: Option<Matrix>, delta: Option<Vector>);

    fn load_glyph(&self, face: NativeHandle, glyph_index: u32, flags: LoadFlags) -> NativeResult<()>;
    fn load_char(&self, face: NativeHandle, char_code: u32, flags: LoadFlags) -> NativeResult<()>;
    /// Zero means the character is not mapped.
    fn char_index(&self, face: NativeHandle, char_code: u32) -> u32;
    /// `(char_code, glyph_index)` of the first mapped character. A zero glyph
    /// index means the charmap is empty.
    fn first_char(&self, face: NativeHandle) -> (u32, u32);
    fn next_char(&self, face: NativeHandle, char_code: u32) -> (u32, u32);
    fn kerning(&self, face: NativeHandle, left: u32, right: u32, mode: KerningMode) -> NativeResult<Vector>;
    fn advance(&self, face: NativeHandle, glyph_index: u32, flags: LoadFlags) -> NativeResult<i64>;
    fn glyph_name(&self, face: NativeHandle, glyph_index: u32) -> NativeResult<String>;
    fn name_index(&self, face: NativeHandle, name: &str) -> u32;
    fn postscript_name(&self, face: NativeHandle) -> Option<String>;

    /// Address of the face's glyph slot.
    fn face_glyph_slot(&self, face: NativeHandle) -> RawHandle;
    /// Address of the face's active size. Zero when none is set.
    fn face_active_size(&self, face: NativeHandle) -> RawHandle;

    // Charmaps

    fn face_charmaps(&self, face: NativeHandle) -> Vec<RawHandle>;
    /// The selected charmap, zero when none is selected.
    fn face_charmap(&self, face: NativeHandle) -> RawHandle;
    fn select_charmap(&self, face: NativeHandle, encoding: Encoding) -> NativeResult<()>;
    fn set_charmap(&self, face: NativeHandle, charmap: NativeHandle) -> NativeResult<()>;
    fn charmap_record(&self, charmap: NativeHandle) -> CharMapRecord;
    /// Position of the charmap in its face's list, or -1.
    fn charmap_index(&self, charmap: NativeHandle) -> i32;

    // SFNT, PostScript and variation data

    fn sfnt_table(&self, _face: NativeHandle, _tag: SfntTag) -> Option<SfntTable> {
        None
    }

    /// Bytes of a raw table from `offset` on. [`TableTag::WHOLE_FONT`]
    /// reads the font file itself.
    fn load_sfnt_table(&self, _face: NativeHandle, _tag: TableTag, _offset: i64) -> NativeResult<Vec<u8>> {
        Err(ErrorCode::TABLE_MISSING)
    }

    fn sfnt_name_count(&self, _face: NativeHandle) -> u32 {
        0
    }

    fn sfnt_name(&self, _face: NativeHandle, _index: u32) -> NativeResult<SfntName> {
        Err(ErrorCode::UNIMPLEMENTED_FEATURE)
    }

    fn ps_font_info(&self, _face: NativeHandle) -> NativeResult<PsFontInfo> {
        Err(ErrorCode::UNIMPLEMENTED_FEATURE)
    }

    fn has_ps_glyph_names(&self, _face: NativeHandle) -> bool {
        false
    }

    fn fs_type_flags(&self, _face: NativeHandle) -> FsTypeFlags {
        FsTypeFlags::empty()
    }

    fn font_format(&self, _face: NativeHandle) -> Option<String> {
        None
    }

    fn mm_var(&self, _face: NativeHandle) -> NativeResult<MmVar> {
        Err(ErrorCode::UNIMPLEMENTED_FEATURE)
    }

    fn var_design_coordinates(&self, _face: NativeHandle, _num_coords: usize) -> NativeResult<Vec<i64>> {
        Err(ErrorCode::UNIMPLEMENTED_FEATURE)
    }

    fn set_var_design_coordinates(&self, _face: NativeHandle, _coords: &[i64]) -> NativeResult<()> {
        Err(ErrorCode::UNIMPLEMENTED_FEATURE)
    }

    fn set_var_blend_coordinates(&self, _face: NativeHandle, _coords: &[i64]) -> NativeResult<()> {
        Err(ErrorCode::UNIMPLEMENTED_FEATURE)
    }

    fn set_named_instance(&self, _face: NativeHandle, _instance_index: u32) -> NativeResult<()> {
        Err(ErrorCode::UNIMPLEMENTED_FEATURE)
    }

    // Sizes

    fn new_size(&self, face: NativeHandle) -> NativeResult<RawHandle>;
    fn done_size(&self, size: NativeHandle) -> NativeResult<()>;
    fn activate_size(&self, size: NativeHandle) -> NativeResult<()>;
    fn size_metrics(&self, size: NativeHandle) -> SizeMetrics;

    // Glyph slots

    fn slot_record(&self, slot: NativeHandle) -> GlyphSlotRecord;
    fn render_glyph(&self, slot: NativeHandle, mode: RenderMode) -> NativeResult<()>;
    /// Address of the slot's outline field.
    fn slot_outline(&self, slot: NativeHandle) -> RawHandle;
    /// Address of the slot's bitmap field.
    fn slot_bitmap(&self, slot: NativeHandle) -> RawHandle;
    /// Copy the slot's image into a new standalone glyph.
    fn get_glyph(&self, slot: NativeHandle) -> NativeResult<RawHandle>;

    // Glyphs

    fn glyph_record(&self, glyph: NativeHandle) -> GlyphRecord;
    fn glyph_copy(&self, glyph: NativeHandle) -> NativeResult<RawHandle>;
    fn glyph_transform(&self, glyph: NativeHandle, matrix: Option<Matrix>, delta: Option<Vector>) -> NativeResult<()>;
    fn glyph_cbox(&self, glyph: NativeHandle, mode: GlyphBBoxMode) -> BBox;

    /// Convert to a bitmap glyph.
    ///
    /// Returns the input handle unchanged when the glyph is already a bitmap.
    /// Otherwise returns a new glyph; with `destroy` the input is freed.
    fn glyph_to_bitmap(
        &self,
        glyph: NativeHandle,
        mode: RenderMode,
        origin: Option<Vector>,
        destroy: bool,
    ) -> NativeResult<RawHandle>;

    /// Same replacement contract as [`glyph_to_bitmap`](Self::glyph_to_bitmap).
    fn glyph_stroke(&self, _glyph: NativeHandle, _stroker: NativeHandle, _destroy: bool) -> NativeResult<RawHandle> {
        Err(ErrorCode::UNIMPLEMENTED_FEATURE)
    }

    fn glyph_stroke_border(
        &self,
        _glyph: NativeHandle,
        _stroker: NativeHandle,
        _inside: bool,
        _destroy: bool,
    ) -> NativeResult<RawHandle> {
        Err(ErrorCode::UNIMPLEMENTED_FEATURE)
    }

    fn done_glyph(&self, glyph: NativeHandle) -> NativeResult<()>;

    fn bitmap_glyph_record(&self, glyph: NativeHandle) -> BitmapGlyphRecord;
    /// Address of a bitmap glyph's bitmap field.
    fn bitmap_glyph_bitmap(&self, glyph: NativeHandle) -> RawHandle;
    /// Address of an outline glyph's outline field.
    fn outline_glyph_outline(&self, glyph: NativeHandle) -> RawHandle;

    // Outlines

    fn new_outline(&self, library: NativeHandle, n_points: u32, n_contours: u32) -> NativeResult<RawHandle>;
    fn done_outline(&self, library: NativeHandle, outline: NativeHandle) -> NativeResult<()>;
    fn outline_record(&self, outline: NativeHandle) -> OutlineRecord;
    /// Overwrite points, tags and contour ends. Lengths must match the
    /// outline's allocation.
    fn outline_write(&self, outline: NativeHandle, contents: &OutlineRecord) -> NativeResult<()>;
    fn outline_copy(&self, source: NativeHandle, target: NativeHandle) -> NativeResult<()>;
    fn outline_translate(&self, outline: NativeHandle, dx: i64, dy: i64);
    fn outline_transform(&self, outline: NativeHandle, matrix: Matrix);
    fn outline_embolden(&self, outline: NativeHandle, strength: i64) -> NativeResult<()>;
    fn outline_embolden_xy(&self, outline: NativeHandle, x_strength: i64, y_strength: i64) -> NativeResult<()>;
    fn outline_reverse(&self, outline: NativeHandle);
    fn outline_check(&self, outline: NativeHandle) -> NativeResult<()>;
    fn outline_cbox(&self, outline: NativeHandle) -> BBox;
    fn outline_bbox(&self, outline: NativeHandle) -> NativeResult<BBox>;
    fn outline_orientation(&self, outline: NativeHandle) -> Orientation;
    fn decompose_outline(&self, outline: NativeHandle, sink: &mut dyn OutlineSink) -> NativeResult<()>;
    /// Render into an existing bitmap, keeping its pixel mode and size.
    /// The outline is drawn at the bitmap's bottom-left corner.
    fn outline_get_bitmap(&self, library: NativeHandle, outline: NativeHandle, bitmap: NativeHandle)
        -> NativeResult<()>;

    // Bitmaps

    fn new_bitmap(&self, library: NativeHandle) -> NativeResult<RawHandle>;
    fn done_bitmap(&self, library: NativeHandle, bitmap: NativeHandle) -> NativeResult<()>;
    fn bitmap_record(&self, bitmap: NativeHandle) -> BitmapRecord;
    /// Copy of the pixel buffer, `rows * |pitch|` bytes.
    fn bitmap_buffer(&self, bitmap: NativeHandle) -> Vec<u8>;
    fn bitmap_copy(&self, library: NativeHandle, source: NativeHandle, target: NativeHandle) -> NativeResult<()>;
    fn bitmap_convert(
        &self,
        library: NativeHandle,
        source: NativeHandle,
        target: NativeHandle,
        alignment: i32,
    ) -> NativeResult<()>;
    fn bitmap_embolden(&self, library: NativeHandle, bitmap: NativeHandle, x_strength: i64, y_strength: i64)
        -> NativeResult<()>;
    /// Replace the contents with a zeroed 8-bit gray image of the given size.
    fn bitmap_allocate(&self, library: NativeHandle, bitmap: NativeHandle, width: u32, rows: u32)
        -> NativeResult<()>;

    // Strokers

    fn new_stroker(&self, _library: NativeHandle) -> NativeResult<RawHandle> {
        Err(ErrorCode::UNIMPLEMENTED_FEATURE)
    }

    fn done_stroker(&self, _stroker: NativeHandle) -> NativeResult<()> {
        Err(ErrorCode::UNIMPLEMENTED_FEATURE)
    }

    fn stroker_set(
        &self,
        _stroker: NativeHandle,
        _radius: i64,
        _cap: StrokerLineCap,
        _join: StrokerLineJoin,
        _miter_limit: i64,
    ) {
    }

    // Cache manager

    fn new_manager(
        &self,
        _library: NativeHandle,
        _limits: ManagerLimits,
        _requester: Rc<dyn FaceRequester>,
    ) -> NativeResult<RawHandle> {
        Err(ErrorCode::UNIMPLEMENTED_FEATURE)
    }

    fn done_manager(&self, _manager: NativeHandle) -> NativeResult<()> {
        Err(ErrorCode::UNIMPLEMENTED_FEATURE)
    }

    /// Face for `face_id`, owned by the manager. Valid until the next call
    /// on the same manager.
    fn manager_lookup_face(&self, _manager: NativeHandle, _face_id: usize) -> NativeResult<RawHandle> {
        Err(ErrorCode::UNIMPLEMENTED_FEATURE)
    }

    fn manager_remove_face(&self, _manager: NativeHandle, _face_id: usize) {}

    fn manager_reset(&self, _manager: NativeHandle) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_code_display() {
        assert_eq!(ErrorCode::INVALID_FILE_FORMAT.to_string(), "Invalid_File_Format (0x03)");
        assert_eq!(ErrorCode::OUT_OF_MEMORY.to_string(), "Out_Of_Memory (0x40)");
        assert_eq!(ErrorCode(0x7f).to_string(), "error 0x7f");
        assert_eq!(ErrorCode::CORRUPTED_FONT_GLYPHS.name(), Some("Corrupted_Font_Glyphs"));
    }

    #[test]
    fn check_maps_zero_to_ok() {
        assert_eq!(ErrorCode::check(0), Ok(()));
        assert_eq!(ErrorCode::check(0x06), Err(ErrorCode::INVALID_ARGUMENT));
    }
}
