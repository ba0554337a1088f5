//! `FreeTypeApi` over the C ABI

use std::ffi::{c_int, c_uint, c_void, CStr, CString};
use std::path::Path;
use std::ptr;
use std::rc::Rc;

use ftown_core::records::*;
use ftown_core::types::*;
use ftown_core::{ErrorCode, FaceRequester, FreeTypeApi, ManagerLimits, NativeHandle, NativeResult, OutlineSink, RawHandle};

use crate::callbacks::{self, RequesterData};
use crate::ffi::*;
use crate::records;
use crate::{bbox, c_path, c_string, check, ft_matrix, ft_vector, opt_ptr, slice, slice_mut, vector};
use crate::{FreeTypeBackend, BACKEND_NAME};

fn face_ptr(face: NativeHandle) -> FT_Face {
    face.as_ptr::<FT_FaceRec>()
}

/// # Safety
/// `face` must be a live face.
unsafe fn face_rec<'a>(face: NativeHandle) -> &'a FT_FaceRec {
    unsafe { &*face_ptr(face) }
}

fn fixed_coords(coords: &[i64]) -> NativeResult<(FT_UInt, Vec<FT_Fixed>)> {
    let len = FT_UInt::try_from(coords.len()).map_err(|_| ErrorCode::INVALID_ARGUMENT)?;
    Ok((len, coords.iter().map(|&c| c as FT_Fixed).collect()))
}

fn property_name(name: &str) -> NativeResult<CString> {
    CString::new(name).map_err(|_| ErrorCode::INVALID_ARGUMENT)
}

fn glyph_out(glyph: FT_Glyph) -> RawHandle {
    glyph as RawHandle
}

impl FreeTypeApi for FreeTypeBackend {
    fn name(&self) -> &'static str {
        BACKEND_NAME
    }

    // Library

    fn init_library(&self) -> NativeResult<RawHandle> {
        let mut library: FT_Library = ptr::null_mut();
        check(unsafe { FT_Init_FreeType(&mut library) })?;
        Ok(library as RawHandle)
    }

    fn done_library(&self, library: NativeHandle) -> NativeResult<()> {
        let result = check(unsafe { FT_Done_FreeType(library.as_ptr()) });
        // Faces still open went down with the library
        self.drop_library_buffers(library.addr());
        result
    }

    fn library_version(&self, library: NativeHandle) -> Version {
        let (mut major, mut minor, mut patch) = (0, 0, 0);
        unsafe { FT_Library_Version(library.as_ptr(), &mut major, &mut minor, &mut patch) };
        Version { major, minor, patch }
    }

    fn set_lcd_filter(&self, library: NativeHandle, filter: LcdFilter) -> NativeResult<()> {
        check(unsafe { FT_Library_SetLcdFilter(library.as_ptr(), filter.to_raw()) })
    }

    fn truetype_engine(&self, library: NativeHandle) -> TrueTypeEngine {
        TrueTypeEngine::from_raw(unsafe { FT_Get_TrueType_Engine_Type(library.as_ptr()) })
    }

    fn property_set(&self, library: NativeHandle, module: &str, property: &str, value: &PropertyValue) -> NativeResult<()> {
        let (module, property) = (property_name(module)?, property_name(property)?);
        let set = |value: *const c_void| {
            check(unsafe { FT_Property_Set(library.as_ptr(), module.as_ptr(), property.as_ptr(), value) })
        };
        match *value {
            PropertyValue::UInt(v) => {
                let v: c_uint = v;
                set((&v as *const c_uint).cast())
            }
            PropertyValue::Bool(v) => {
                let v = FT_Bool::from(v);
                set((&v as *const FT_Bool).cast())
            }
            PropertyValue::Darkening(points) => {
                let points: [c_int; 8] = points;
                set(points.as_ptr().cast())
            }
        }
    }

    fn property_get(
        &self,
        library: NativeHandle,
        module: &str,
        property: &str,
        kind: PropertyKind,
    ) -> NativeResult<PropertyValue> {
        let (module, property) = (property_name(module)?, property_name(property)?);
        let get = |value: *mut c_void| {
            check(unsafe { FT_Property_Get(library.as_ptr(), module.as_ptr(), property.as_ptr(), value) })
        };
        match kind {
            PropertyKind::UInt => {
                let mut v: c_uint = 0;
                get((&mut v as *mut c_uint).cast())?;
                Ok(PropertyValue::UInt(v))
            }
            PropertyKind::Bool => {
                let mut v: FT_Bool = 0;
                get((&mut v as *mut FT_Bool).cast())?;
                Ok(PropertyValue::Bool(v != 0))
            }
            PropertyKind::Darkening => {
                let mut points: [c_int; 8] = [0; 8];
                get(points.as_mut_ptr().cast())?;
                Ok(PropertyValue::Darkening(points))
            }
        }
    }

    // Faces

    fn new_face(&self, library: NativeHandle, path: &Path, face_index: i64) -> NativeResult<RawHandle> {
        let path = c_path(path)?;
        let mut face: FT_Face = ptr::null_mut();
        check(unsafe { FT_New_Face(library.as_ptr(), path.as_ptr(), face_index as FT_Long, &mut face) })?;
        Ok(face as RawHandle)
    }

    fn new_memory_face(&self, library: NativeHandle, data: Rc<[u8]>, face_index: i64) -> NativeResult<RawHandle> {
        let len = FT_Long::try_from(data.len()).map_err(|_| ErrorCode::ARRAY_TOO_LARGE)?;
        let mut face: FT_Face = ptr::null_mut();
        check(unsafe {
            FT_New_Memory_Face(library.as_ptr(), data.as_ptr(), len, face_index as FT_Long, &mut face)
        })?;
        if !face.is_null() {
            self.hold_buffer(face as usize, library.addr(), data);
        }
        Ok(face as RawHandle)
    }

    fn reference_face(&self, face: NativeHandle) -> NativeResult<()> {
        check(unsafe { FT_Reference_Face(face_ptr(face)) })?;
        self.add_buffer_ref(face.addr());
        Ok(())
    }

    fn done_face(&self, face: NativeHandle) -> NativeResult<()> {
        let result = check(unsafe { FT_Done_Face(face_ptr(face)) });
        if result.is_ok() {
            self.drop_buffer_ref(face.addr());
        }
        result
    }

    fn attach_file(&self, face: NativeHandle, path: &Path) -> NativeResult<()> {
        let path = c_path(path)?;
        check(unsafe { FT_Attach_File(face_ptr(face), path.as_ptr()) })
    }

    fn face_record(&self, face: NativeHandle) -> FaceRecord {
        unsafe { records::face_record(face_rec(face)) }
    }

    fn set_char_size(&self, face: NativeHandle, width: i64, height: i64, h_res: u32, v_res: u32) -> NativeResult<()> {
        check(unsafe {
            FT_Set_Char_Size(face_ptr(face), width as FT_F26Dot6, height as FT_F26Dot6, h_res, v_res)
        })
    }

    fn set_pixel_sizes(&self, face: NativeHandle, width: u32, height: u32) -> NativeResult<()> {
        check(unsafe { FT_Set_Pixel_Sizes(face_ptr(face), width, height) })
    }

    fn select_size(&self, face: NativeHandle, strike_index: i32) -> NativeResult<()> {
        check(unsafe { FT_Select_Size(face_ptr(face), strike_index) })
    }

    fn request_size(&self, face: NativeHandle, request: &SizeRequest) -> NativeResult<()> {
        let mut req = FT_Size_RequestRec {
            type_: request.kind.to_raw(),
            width: request.width as FT_Long,
            height: request.height as FT_Long,
            horiResolution: request.hori_resolution,
            vertResolution: request.vert_resolution,
        };
        check(unsafe { FT_Request_Size(face_ptr(face), &mut req) })
    }

    fn set_transform(&self, face: NativeHandle, matrix: Option<Matrix>, delta: Option<Vector>) {
        let matrix = matrix.map(ft_matrix);
        let delta = delta.map(ft_vector);
        unsafe { FT_Set_Transform(face_ptr(face), opt_ptr(&matrix), opt_ptr(&delta)) }
    }

    fn load_glyph(&self, face: NativeHandle, glyph_index: u32, flags: LoadFlags) -> NativeResult<()> {
        check(unsafe { FT_Load_Glyph(face_ptr(face), glyph_index, flags.bits()) })
    }

    fn load_char(&self, face: NativeHandle, char_code: u32, flags: LoadFlags) -> NativeResult<()> {
        check(unsafe { FT_Load_Char(face_ptr(face), FT_ULong::from(char_code), flags.bits()) })
    }

    fn char_index(&self, face: NativeHandle, char_code: u32) -> u32 {
        unsafe { FT_Get_Char_Index(face_ptr(face), FT_ULong::from(char_code)) }
    }

    fn first_char(&self, face: NativeHandle) -> (u32, u32) {
        let mut glyph_index = 0;
        let code = unsafe { FT_Get_First_Char(face_ptr(face), &mut glyph_index) };
        (code as u32, glyph_index)
    }

    fn next_char(&self, face: NativeHandle, char_code: u32) -> (u32, u32) {
        let mut glyph_index = 0;
        let code = unsafe { FT_Get_Next_Char(face_ptr(face), FT_ULong::from(char_code), &mut glyph_index) };
        (code as u32, glyph_index)
    }

    fn kerning(&self, face: NativeHandle, left: u32, right: u32, mode: KerningMode) -> NativeResult<Vector> {
        let mut kerning = FT_Vector::default();
        check(unsafe { FT_Get_Kerning(face_ptr(face), left, right, mode.to_raw(), &mut kerning) })?;
        Ok(vector(kerning))
    }

    fn advance(&self, face: NativeHandle, glyph_index: u32, flags: LoadFlags) -> NativeResult<i64> {
        let mut advance: FT_Fixed = 0;
        check(unsafe { FT_Get_Advance(face_ptr(face), glyph_index, flags.bits(), &mut advance) })?;
        Ok(i64::from(advance))
    }

    fn glyph_name(&self, face: NativeHandle, glyph_index: u32) -> NativeResult<String> {
        let mut buffer = [0u8; 256];
        check(unsafe {
            FT_Get_Glyph_Name(
                face_ptr(face),
                glyph_index,
                buffer.as_mut_ptr().cast(),
                buffer.len() as FT_UInt,
            )
        })?;
        let name = CStr::from_bytes_until_nul(&buffer).map_err(|_| ErrorCode::INVALID_ARGUMENT)?;
        Ok(name.to_string_lossy().into_owned())
    }

    fn name_index(&self, face: NativeHandle, name: &str) -> u32 {
        match CString::new(name) {
            Ok(name) => unsafe { FT_Get_Name_Index(face_ptr(face), name.as_ptr()) },
            Err(_) => 0,
        }
    }

    fn postscript_name(&self, face: NativeHandle) -> Option<String> {
        unsafe { c_string(FT_Get_Postscript_Name(face_ptr(face))) }
    }

    fn face_glyph_slot(&self, face: NativeHandle) -> RawHandle {
        unsafe { face_rec(face) }.glyph as RawHandle
    }

    fn face_active_size(&self, face: NativeHandle) -> RawHandle {
        unsafe { face_rec(face) }.size as RawHandle
    }

    // Charmaps

    fn face_charmaps(&self, face: NativeHandle) -> Vec<RawHandle> {
        let rec = unsafe { face_rec(face) };
        unsafe { slice(rec.charmaps, rec.num_charmaps.max(0) as usize) }
            .iter()
            .map(|&cm| cm as RawHandle)
            .collect()
    }

    fn face_charmap(&self, face: NativeHandle) -> RawHandle {
        unsafe { face_rec(face) }.charmap as RawHandle
    }

    fn select_charmap(&self, face: NativeHandle, encoding: Encoding) -> NativeResult<()> {
        check(unsafe { FT_Select_Charmap(face_ptr(face), encoding.0) })
    }

    fn set_charmap(&self, face: NativeHandle, charmap: NativeHandle) -> NativeResult<()> {
        check(unsafe { FT_Set_Charmap(face_ptr(face), charmap.as_ptr()) })
    }

    fn charmap_record(&self, charmap: NativeHandle) -> CharMapRecord {
        let rec = unsafe { &*charmap.as_ptr::<FT_CharMapRec>() };
        CharMapRecord {
            encoding: Encoding(rec.encoding),
            platform_id: rec.platform_id,
            encoding_id: rec.encoding_id,
        }
    }

    fn charmap_index(&self, charmap: NativeHandle) -> i32 {
        unsafe { FT_Get_Charmap_Index(charmap.as_ptr()) }
    }

    // SFNT, PostScript and variation data

    fn sfnt_table(&self, face: NativeHandle, tag: SfntTag) -> Option<SfntTable> {
        let table = unsafe { FT_Get_Sfnt_Table(face_ptr(face), tag.to_raw()) };
        if table.is_null() {
            return None;
        }
        Some(unsafe { records::sfnt_table(tag, table) })
    }

    fn load_sfnt_table(&self, face: NativeHandle, tag: TableTag, offset: i64) -> NativeResult<Vec<u8>> {
        let tag = FT_ULong::from(tag.0);
        // A null buffer asks for the whole table's length
        let mut length: FT_ULong = 0;
        check(unsafe { FT_Load_Sfnt_Table(face_ptr(face), tag, 0, ptr::null_mut(), &mut length) })?;
        let total = u64::from(length);
        let start = u64::try_from(offset).map_err(|_| ErrorCode::INVALID_ARGUMENT)?;
        let remaining = total.checked_sub(start).ok_or(ErrorCode::INVALID_ARGUMENT)?;
        if remaining == 0 {
            return Ok(Vec::new());
        }
        let len = usize::try_from(remaining).map_err(|_| ErrorCode::ARRAY_TOO_LARGE)?;
        let mut buffer = vec![0u8; len];
        let mut length = remaining as FT_ULong;
        check(unsafe {
            FT_Load_Sfnt_Table(face_ptr(face), tag, offset as FT_Long, buffer.as_mut_ptr(), &mut length)
        })?;
        Ok(buffer)
    }

    fn sfnt_name_count(&self, face: NativeHandle) -> u32 {
        unsafe { FT_Get_Sfnt_Name_Count(face_ptr(face)) }
    }

    fn sfnt_name(&self, face: NativeHandle, index: u32) -> NativeResult<SfntName> {
        let mut name = FT_SfntName {
            platform_id: 0,
            encoding_id: 0,
            language_id: 0,
            name_id: 0,
            string: ptr::null_mut(),
            string_len: 0,
        };
        check(unsafe { FT_Get_Sfnt_Name(face_ptr(face), index, &mut name) })?;
        Ok(unsafe { records::sfnt_name(&name) })
    }

    fn ps_font_info(&self, face: NativeHandle) -> NativeResult<PsFontInfo> {
        let mut info = PS_FontInfoRec {
            version: ptr::null_mut(),
            notice: ptr::null_mut(),
            full_name: ptr::null_mut(),
            family_name: ptr::null_mut(),
            weight: ptr::null_mut(),
            italic_angle: 0,
            is_fixed_pitch: 0,
            underline_position: 0,
            underline_thickness: 0,
        };
        check(unsafe { FT_Get_PS_Font_Info(face_ptr(face), &mut info) })?;
        Ok(unsafe { records::ps_font_info(&info) })
    }

    fn has_ps_glyph_names(&self, face: NativeHandle) -> bool {
        unsafe { FT_Has_PS_Glyph_Names(face_ptr(face)) != 0 }
    }

    fn fs_type_flags(&self, face: NativeHandle) -> FsTypeFlags {
        FsTypeFlags::from_bits(unsafe { FT_Get_FSType_Flags(face_ptr(face)) })
    }

    fn font_format(&self, face: NativeHandle) -> Option<String> {
        unsafe { c_string(FT_Get_Font_Format(face_ptr(face))) }
    }

    fn mm_var(&self, face: NativeHandle) -> NativeResult<MmVar> {
        let mut mm: *mut FT_MM_Var = ptr::null_mut();
        check(unsafe { FT_Get_MM_Var(face_ptr(face), &mut mm) })?;
        if mm.is_null() {
            return Err(ErrorCode::INVALID_ARGUMENT);
        }
        let record = unsafe { records::mm_var(&*mm) };
        // The slot knows its library; the face record keeps it private
        let library = unsafe { (*face_rec(face).glyph).library };
        if let Err(code) = check(unsafe { FT_Done_MM_Var(library, mm) }) {
            log::warn!("freetype: FT_Done_MM_Var failed: {code}");
        }
        Ok(record)
    }

    fn var_design_coordinates(&self, face: NativeHandle, num_coords: usize) -> NativeResult<Vec<i64>> {
        let len = FT_UInt::try_from(num_coords).map_err(|_| ErrorCode::INVALID_ARGUMENT)?;
        let mut coords: Vec<FT_Fixed> = vec![0; num_coords];
        check(unsafe { FT_Get_Var_Design_Coordinates(face_ptr(face), len, coords.as_mut_ptr()) })?;
        Ok(coords.into_iter().map(i64::from).collect())
    }

    fn set_var_design_coordinates(&self, face: NativeHandle, coords: &[i64]) -> NativeResult<()> {
        let (len, mut coords) = fixed_coords(coords)?;
        check(unsafe { FT_Set_Var_Design_Coordinates(face_ptr(face), len, coords.as_mut_ptr()) })
    }

    fn set_var_blend_coordinates(&self, face: NativeHandle, coords: &[i64]) -> NativeResult<()> {
        let (len, mut coords) = fixed_coords(coords)?;
        check(unsafe { FT_Set_Var_Blend_Coordinates(face_ptr(face), len, coords.as_mut_ptr()) })
    }

    fn set_named_instance(&self, face: NativeHandle, instance_index: u32) -> NativeResult<()> {
        check(unsafe { FT_Set_Named_Instance(face_ptr(face), instance_index) })
    }

    // Sizes

    fn new_size(&self, face: NativeHandle) -> NativeResult<RawHandle> {
        let mut size: FT_Size = ptr::null_mut();
        check(unsafe { FT_New_Size(face_ptr(face), &mut size) })?;
        Ok(size as RawHandle)
    }

    fn done_size(&self, size: NativeHandle) -> NativeResult<()> {
        check(unsafe { FT_Done_Size(size.as_ptr()) })
    }

    fn activate_size(&self, size: NativeHandle) -> NativeResult<()> {
        check(unsafe { FT_Activate_Size(size.as_ptr()) })
    }

    fn size_metrics(&self, size: NativeHandle) -> SizeMetrics {
        records::size_metrics(unsafe { &(*size.as_ptr::<FT_SizeRec>()).metrics })
    }

    // Glyph slots

    fn slot_record(&self, slot: NativeHandle) -> GlyphSlotRecord {
        records::slot_record(unsafe { &*slot.as_ptr::<FT_GlyphSlotRec>() })
    }

    fn render_glyph(&self, slot: NativeHandle, mode: RenderMode) -> NativeResult<()> {
        check(unsafe { FT_Render_Glyph(slot.as_ptr(), mode.to_raw()) })
    }

    fn slot_outline(&self, slot: NativeHandle) -> RawHandle {
        let slot = slot.as_ptr::<FT_GlyphSlotRec>();
        unsafe { ptr::addr_of_mut!((*slot).outline) as RawHandle }
    }

    fn slot_bitmap(&self, slot: NativeHandle) -> RawHandle {
        let slot = slot.as_ptr::<FT_GlyphSlotRec>();
        unsafe { ptr::addr_of_mut!((*slot).bitmap) as RawHandle }
    }

    fn get_glyph(&self, slot: NativeHandle) -> NativeResult<RawHandle> {
        let mut glyph: FT_Glyph = ptr::null_mut();
        check(unsafe { FT_Get_Glyph(slot.as_ptr(), &mut glyph) })?;
        Ok(glyph_out(glyph))
    }

    // Glyphs

    fn glyph_record(&self, glyph: NativeHandle) -> GlyphRecord {
        records::glyph_record(unsafe { &*glyph.as_ptr::<FT_GlyphRec>() })
    }

    fn glyph_copy(&self, glyph: NativeHandle) -> NativeResult<RawHandle> {
        let mut copy: FT_Glyph = ptr::null_mut();
        check(unsafe { FT_Glyph_Copy(glyph.as_ptr(), &mut copy) })?;
        Ok(glyph_out(copy))
    }

    fn glyph_transform(&self, glyph: NativeHandle, matrix: Option<Matrix>, delta: Option<Vector>) -> NativeResult<()> {
        let matrix = matrix.map(ft_matrix);
        let delta = delta.map(ft_vector);
        check(unsafe { FT_Glyph_Transform(glyph.as_ptr(), opt_ptr(&matrix), opt_ptr(&delta)) })
    }

    fn glyph_cbox(&self, glyph: NativeHandle, mode: GlyphBBoxMode) -> BBox {
        let mut cbox = FT_BBox::default();
        unsafe { FT_Glyph_Get_CBox(glyph.as_ptr(), mode.to_raw(), &mut cbox) };
        bbox(cbox)
    }

    fn glyph_to_bitmap(
        &self,
        glyph: NativeHandle,
        mode: RenderMode,
        origin: Option<Vector>,
        destroy: bool,
    ) -> NativeResult<RawHandle> {
        let origin = origin.map(ft_vector);
        let mut target: FT_Glyph = glyph.as_ptr();
        check(unsafe { FT_Glyph_To_Bitmap(&mut target, mode.to_raw(), opt_ptr(&origin), FT_Bool::from(destroy)) })?;
        Ok(glyph_out(target))
    }

    fn glyph_stroke(&self, glyph: NativeHandle, stroker: NativeHandle, destroy: bool) -> NativeResult<RawHandle> {
        let mut target: FT_Glyph = glyph.as_ptr();
        check(unsafe { FT_Glyph_Stroke(&mut target, stroker.as_ptr(), FT_Bool::from(destroy)) })?;
        Ok(glyph_out(target))
    }

    fn glyph_stroke_border(
        &self,
        glyph: NativeHandle,
        stroker: NativeHandle,
        inside: bool,
        destroy: bool,
    ) -> NativeResult<RawHandle> {
        let mut target: FT_Glyph = glyph.as_ptr();
        check(unsafe {
            FT_Glyph_StrokeBorder(&mut target, stroker.as_ptr(), FT_Bool::from(inside), FT_Bool::from(destroy))
        })?;
        Ok(glyph_out(target))
    }

    fn done_glyph(&self, glyph: NativeHandle) -> NativeResult<()> {
        unsafe { FT_Done_Glyph(glyph.as_ptr()) };
        Ok(())
    }

    fn bitmap_glyph_record(&self, glyph: NativeHandle) -> BitmapGlyphRecord {
        let rec = unsafe { &*glyph.as_ptr::<FT_BitmapGlyphRec>() };
        BitmapGlyphRecord {
            left: rec.left,
            top: rec.top,
        }
    }

    fn bitmap_glyph_bitmap(&self, glyph: NativeHandle) -> RawHandle {
        let glyph = glyph.as_ptr::<FT_BitmapGlyphRec>();
        unsafe { ptr::addr_of_mut!((*glyph).bitmap) as RawHandle }
    }

    fn outline_glyph_outline(&self, glyph: NativeHandle) -> RawHandle {
        let glyph = glyph.as_ptr::<FT_OutlineGlyphRec>();
        unsafe { ptr::addr_of_mut!((*glyph).outline) as RawHandle }
    }

    // Outlines

    fn new_outline(&self, library: NativeHandle, n_points: u32, n_contours: u32) -> NativeResult<RawHandle> {
        let n_contours = FT_Int::try_from(n_contours).map_err(|_| ErrorCode::INVALID_ARGUMENT)?;
        // FreeType fills in the record; the record itself is ours
        let mut outline = Box::new(FT_Outline::empty());
        check(unsafe { FT_Outline_New(library.as_ptr(), n_points, n_contours, &mut *outline) })?;
        Ok(Box::into_raw(outline) as RawHandle)
    }

    fn done_outline(&self, library: NativeHandle, outline: NativeHandle) -> NativeResult<()> {
        let outline = outline.as_ptr::<FT_Outline>();
        let result = check(unsafe { FT_Outline_Done(library.as_ptr(), outline) });
        // SAFETY: only outlines from new_outline are released standalone
        drop(unsafe { Box::from_raw(outline) });
        result
    }

    fn outline_record(&self, outline: NativeHandle) -> OutlineRecord {
        unsafe { records::outline_record(&*outline.as_ptr::<FT_Outline>()) }
    }

    fn outline_write(&self, outline: NativeHandle, contents: &OutlineRecord) -> NativeResult<()> {
        let outline = unsafe { &mut *outline.as_ptr::<FT_Outline>() };
        let n_points = usize::from(outline.n_points);
        let n_contours = usize::from(outline.n_contours);
        if contents.points.len() != n_points || contents.tags.len() != n_points || contents.contours.len() != n_contours
        {
            return Err(ErrorCode::INVALID_ARGUMENT);
        }
        unsafe {
            for (dst, &src) in slice_mut(outline.points, n_points).iter_mut().zip(&contents.points) {
                *dst = ft_vector(src);
            }
            slice_mut(outline.tags, n_points).copy_from_slice(&contents.tags);
            slice_mut(outline.contours, n_contours).copy_from_slice(&contents.contours);
        }
        outline.flags = contents.flags.bits();
        Ok(())
    }

    fn outline_copy(&self, source: NativeHandle, target: NativeHandle) -> NativeResult<()> {
        check(unsafe { FT_Outline_Copy(source.as_ptr(), target.as_ptr()) })
    }

    fn outline_translate(&self, outline: NativeHandle, dx: i64, dy: i64) {
        unsafe { FT_Outline_Translate(outline.as_ptr(), dx as FT_Pos, dy as FT_Pos) }
    }

    fn outline_transform(&self, outline: NativeHandle, matrix: Matrix) {
        let matrix = ft_matrix(matrix);
        unsafe { FT_Outline_Transform(outline.as_ptr(), &matrix) }
    }

    fn outline_embolden(&self, outline: NativeHandle, strength: i64) -> NativeResult<()> {
        check(unsafe { FT_Outline_Embolden(outline.as_ptr(), strength as FT_Pos) })
    }

    fn outline_embolden_xy(&self, outline: NativeHandle, x_strength: i64, y_strength: i64) -> NativeResult<()> {
        check(unsafe { FT_Outline_EmboldenXY(outline.as_ptr(), x_strength as FT_Pos, y_strength as FT_Pos) })
    }

    fn outline_reverse(&self, outline: NativeHandle) {
        unsafe { FT_Outline_Reverse(outline.as_ptr()) }
    }

    fn outline_check(&self, outline: NativeHandle) -> NativeResult<()> {
        check(unsafe { FT_Outline_Check(outline.as_ptr()) })
    }

    fn outline_cbox(&self, outline: NativeHandle) -> BBox {
        let mut cbox = FT_BBox::default();
        unsafe { FT_Outline_Get_CBox(outline.as_ptr(), &mut cbox) };
        bbox(cbox)
    }

    fn outline_bbox(&self, outline: NativeHandle) -> NativeResult<BBox> {
        let mut exact = FT_BBox::default();
        check(unsafe { FT_Outline_Get_BBox(outline.as_ptr(), &mut exact) })?;
        Ok(bbox(exact))
    }

    fn outline_orientation(&self, outline: NativeHandle) -> Orientation {
        Orientation::from_raw(unsafe { FT_Outline_Get_Orientation(outline.as_ptr()) })
    }

    fn decompose_outline(&self, outline: NativeHandle, sink: &mut dyn OutlineSink) -> NativeResult<()> {
        callbacks::decompose(outline, sink)
    }

    fn outline_get_bitmap(&self, library: NativeHandle, outline: NativeHandle, bitmap: NativeHandle) -> NativeResult<()> {
        check(unsafe { FT_Outline_Get_Bitmap(library.as_ptr(), outline.as_ptr(), bitmap.as_ptr()) })
    }

    // Bitmaps

    fn new_bitmap(&self, _library: NativeHandle) -> NativeResult<RawHandle> {
        let mut bitmap = Box::new(FT_Bitmap::empty());
        unsafe { FT_Bitmap_Init(&mut *bitmap) };
        Ok(Box::into_raw(bitmap) as RawHandle)
    }

    fn done_bitmap(&self, library: NativeHandle, bitmap: NativeHandle) -> NativeResult<()> {
        let bitmap = bitmap.as_ptr::<FT_Bitmap>();
        let result = check(unsafe { FT_Bitmap_Done(library.as_ptr(), bitmap) });
        // SAFETY: only bitmaps from new_bitmap are released standalone
        drop(unsafe { Box::from_raw(bitmap) });
        result
    }

    fn bitmap_record(&self, bitmap: NativeHandle) -> BitmapRecord {
        records::bitmap_record(unsafe { &*bitmap.as_ptr::<FT_Bitmap>() })
    }

    fn bitmap_buffer(&self, bitmap: NativeHandle) -> Vec<u8> {
        unsafe { records::bitmap_buffer(&*bitmap.as_ptr::<FT_Bitmap>()) }
    }

    fn bitmap_copy(&self, library: NativeHandle, source: NativeHandle, target: NativeHandle) -> NativeResult<()> {
        check(unsafe { FT_Bitmap_Copy(library.as_ptr(), source.as_ptr(), target.as_ptr()) })
    }

    fn bitmap_convert(
        &self,
        library: NativeHandle,
        source: NativeHandle,
        target: NativeHandle,
        alignment: i32,
    ) -> NativeResult<()> {
        check(unsafe { FT_Bitmap_Convert(library.as_ptr(), source.as_ptr(), target.as_ptr(), alignment) })
    }

    fn bitmap_embolden(
        &self,
        library: NativeHandle,
        bitmap: NativeHandle,
        x_strength: i64,
        y_strength: i64,
    ) -> NativeResult<()> {
        check(unsafe {
            FT_Bitmap_Embolden(library.as_ptr(), bitmap.as_ptr(), x_strength as FT_Pos, y_strength as FT_Pos)
        })
    }

    fn bitmap_allocate(&self, library: NativeHandle, bitmap: NativeHandle, width: u32, rows: u32) -> NativeResult<()> {
        // Converting a blank gray source makes FreeType allocate the target
        let len = usize::try_from(u64::from(width) * u64::from(rows)).map_err(|_| ErrorCode::ARRAY_TOO_LARGE)?;
        let mut pixels = vec![0u8; len];
        let source = FT_Bitmap {
            rows,
            width,
            pitch: c_int::try_from(width).map_err(|_| ErrorCode::INVALID_ARGUMENT)?,
            buffer: pixels.as_mut_ptr(),
            num_grays: 256,
            pixel_mode: PixelMode::Gray.to_raw(),
            ..FT_Bitmap::empty()
        };
        check(unsafe { FT_Bitmap_Convert(library.as_ptr(), &source, bitmap.as_ptr(), 1) })
    }

    // Strokers

    fn new_stroker(&self, library: NativeHandle) -> NativeResult<RawHandle> {
        let mut stroker: FT_Stroker = ptr::null_mut();
        check(unsafe { FT_Stroker_New(library.as_ptr(), &mut stroker) })?;
        Ok(stroker as RawHandle)
    }

    fn done_stroker(&self, stroker: NativeHandle) -> NativeResult<()> {
        unsafe { FT_Stroker_Done(stroker.as_ptr()) };
        Ok(())
    }

    fn stroker_set(
        &self,
        stroker: NativeHandle,
        radius: i64,
        cap: StrokerLineCap,
        join: StrokerLineJoin,
        miter_limit: i64,
    ) {
        unsafe {
            FT_Stroker_Set(
                stroker.as_ptr(),
                radius as FT_Fixed,
                cap.to_raw(),
                join.to_raw(),
                miter_limit as FT_Fixed,
            )
        }
    }

    // Cache manager

    fn new_manager(
        &self,
        library: NativeHandle,
        limits: ManagerLimits,
        requester: Rc<dyn FaceRequester>,
    ) -> NativeResult<RawHandle> {
        let mut data = Box::new(RequesterData {
            backend: self as *const FreeTypeBackend,
            requester,
        });
        let req_data: FT_Pointer = (&mut *data as *mut RequesterData).cast();
        let mut manager: FTC_Manager = ptr::null_mut();
        check(unsafe {
            FTC_Manager_New(
                library.as_ptr(),
                limits.max_faces,
                limits.max_sizes,
                limits.max_bytes as FT_ULong,
                callbacks::request_face,
                req_data,
                &mut manager,
            )
        })?;
        if !manager.is_null() {
            self.managers.borrow_mut().insert(manager as usize, data);
        }
        Ok(manager as RawHandle)
    }

    fn done_manager(&self, manager: NativeHandle) -> NativeResult<()> {
        unsafe { FTC_Manager_Done(manager.as_ptr()) };
        self.managers.borrow_mut().remove(&manager.addr());
        Ok(())
    }

    fn manager_lookup_face(&self, manager: NativeHandle, face_id: usize) -> NativeResult<RawHandle> {
        let mut face: FT_Face = ptr::null_mut();
        let result = check(unsafe { FTC_Manager_LookupFace(manager.as_ptr(), face_id as FTC_FaceID, &mut face) });
        self.resume_panic();
        result?;
        Ok(face as RawHandle)
    }

    fn manager_remove_face(&self, manager: NativeHandle, face_id: usize) {
        unsafe { FTC_Manager_RemoveFaceID(manager.as_ptr(), face_id as FTC_FaceID) }
    }

    fn manager_reset(&self, manager: NativeHandle) {
        unsafe { FTC_Manager_Reset(manager.as_ptr()) }
    }
}
