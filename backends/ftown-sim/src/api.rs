//! `FreeTypeApi` over the object table

use std::path::Path;
use std::rc::Rc;

use ftown_core::records::*;
use ftown_core::types::*;
use ftown_core::{ErrorCode, FaceRequester, FreeTypeApi, ManagerLimits, NativeHandle, NativeResult, OutlineSink, RawHandle};

use crate::font::SimFontFile;
use crate::objects::*;
use crate::raster::{self, mul_fix, transform_point};
use crate::{h, SimFreeType, BACKEND_NAME};

const VERSION: Version = Version {
    major: 2,
    minor: 13,
    patch: 2,
};

impl SimFreeType {
    fn open_face(&self, library: NativeHandle, bytes: &[u8], data: Option<Rc<[u8]>>, face_index: i64) -> NativeResult<RawHandle> {
        self.with_library("FT_Open_Face", library, |_| ());
        let file = SimFontFile::parse(bytes).map_err(|e| {
            log::debug!("sim: rejecting font: {e}");
            e.code()
        })?;
        let num_faces = file.faces.len() as i64;
        // A negative index only asks for the face count
        let index = if face_index < 0 { 0 } else { face_index & 0xFFFF };
        let instance = if face_index < 0 { 0 } else { (face_index >> 16) as u32 };
        let font = file.faces.into_iter().nth(index as usize).ok_or(ErrorCode::INVALID_ARGUMENT)?;
        if instance as usize > font.instances.len() {
            return Err(ErrorCode::INVALID_ARGUMENT);
        }
        let font = Rc::new(font);

        let face = self.alloc(Body::Library(LibraryObj::default()), None);
        let outline = self.alloc(Body::Outline(OutlineObj { record: OutlineRecord::default() }), None);
        let bitmap = self.alloc(Body::Bitmap(BitmapObj::empty()), None);
        let slot = self.alloc(
            Body::Slot(SlotObj {
                face,
                glyph_index: 0,
                metrics: GlyphMetrics::default(),
                linear_hori_advance: 0,
                linear_vert_advance: 0,
                advance: Vector::default(),
                format: GlyphFormat::None,
                outline,
                bitmap,
                bitmap_left: 0,
                bitmap_top: 0,
            }),
            Some(face),
        );
        let default_size = self.alloc(
            Body::Size(SizeObj {
                face,
                metrics: SizeMetrics::default(),
            }),
            Some(face),
        );
        let charmaps: Vec<usize> = charmap_tables(&font)
            .into_iter()
            .enumerate()
            .map(|(i, (record, map))| {
                self.alloc(
                    Body::CharMap(CharMapObj {
                        face,
                        record,
                        index: i as i32,
                        map,
                    }),
                    Some(face),
                )
            })
            .collect();

        {
            let mut table = self.table.borrow_mut();
            for addr in [outline, bitmap] {
                if let Some(object) = table.objects.get_mut(&addr) {
                    object.owner = Some(slot);
                }
            }
            if let Some(object) = table.objects.get_mut(&face) {
                object.body = Body::Face(FaceObj {
                    library: library.addr(),
                    font,
                    face_index: index,
                    num_faces,
                    data,
                    refcount: 1,
                    slot,
                    charmap: charmaps.first().copied().unwrap_or(0),
                    charmaps,
                    default_size,
                    active_size: default_size,
                    matrix: Matrix::IDENTITY,
                    delta: Vector::default(),
                    attached: Vec::new(),
                    design_coords: Vec::new(),
                    named_instance: instance,
                    manager: None,
                });
            }
        }
        Ok(face)
    }

    fn glyph_count(&self, face: NativeHandle) -> u32 {
        self.with_face("glyph_count", face, |f| f.font.glyphs.len() as u32)
    }

    fn active_metrics(&self, face: NativeHandle) -> Option<SizeMetrics> {
        let size = self.with_face("active_size", face, |f| f.active_size);
        NativeHandle::new(size).map(|s| self.with_size("active_size", s, |s| s.metrics))
    }

    fn set_active_metrics(&self, face: NativeHandle, metrics: SizeMetrics) -> NativeResult<()> {
        let size = self.with_face("set_size", face, |f| f.active_size);
        let size = NativeHandle::new(size).ok_or(ErrorCode::INVALID_SIZE_HANDLE)?;
        self.with_size("set_size", size, |s| s.metrics = metrics);
        Ok(())
    }

    fn apply_pixel_size(&self, face: NativeHandle, width: u32, height: u32) -> NativeResult<()> {
        let (width, height) = match (width, height) {
            (0, 0) => (1, 1),
            (0, y) => (y, y),
            (x, 0) => (x, x),
            (x, y) => (x, y),
        };
        if width > 0xFFFF || height > 0xFFFF {
            return Err(ErrorCode::INVALID_PIXEL_SIZE);
        }
        let font = self.with_face("set_size", face, |f| Rc::clone(&f.font));
        self.set_active_metrics(face, size_metrics(&font, width as u16, height as u16))
    }

    fn new_glyph(&self, library: usize, advance: Vector, image: SlotImage) -> RawHandle {
        let glyph = self.alloc(
            Body::Glyph(GlyphObj {
                library,
                advance,
                image: GlyphImage::Outline { outline: 0 },
            }),
            None,
        );
        let image = match image {
            SlotImage::Outline(record) => GlyphImage::Outline {
                outline: self.alloc(Body::Outline(OutlineObj { record }), Some(glyph)),
            },
            SlotImage::Bitmap(bitmap, left, top) => GlyphImage::Bitmap {
                bitmap: self.alloc(Body::Bitmap(bitmap), Some(glyph)),
                left,
                top,
            },
        };
        self.with_glyph("new_glyph", h(glyph), |g| g.image = image);
        glyph
    }

    fn glyph_image(&self, glyph: NativeHandle) -> (usize, Vector, SlotImage) {
        let (library, advance, outline, bitmap) = self.with_glyph("glyph_image", glyph, |g| match g.image {
            GlyphImage::Outline { outline } => (g.library, g.advance, Some(outline), None),
            GlyphImage::Bitmap { bitmap, left, top } => (g.library, g.advance, None, Some((bitmap, left, top))),
        });
        let image = match (outline, bitmap) {
            (Some(outline), _) => SlotImage::Outline(self.with_outline("glyph_image", h(outline), |o| o.record.clone())),
            (_, Some((bitmap, left, top))) => {
                SlotImage::Bitmap(self.with_bitmap("glyph_image", h(bitmap), |b| b.clone()), left, top)
            }
            _ => SlotImage::Outline(OutlineRecord::default()),
        };
        (library, advance, image)
    }

    fn glyph_outline_addr(&self, glyph: NativeHandle) -> Option<usize> {
        self.with_glyph("glyph_outline", glyph, |g| match g.image {
            GlyphImage::Outline { outline } => Some(outline),
            GlyphImage::Bitmap { .. } => None,
        })
    }

    fn stroke(&self, op: &'static str, glyph: NativeHandle, stroker: NativeHandle, border: Option<bool>, destroy: bool) -> NativeResult<RawHandle> {
        if self.enter(op, glyph.addr())? {
            return Ok(0);
        }
        let radius = self.with_stroker(op, stroker, |s| s.radius);
        let (library, advance, image) = self.glyph_image(glyph);
        let SlotImage::Outline(source) = image else {
            return Err(ErrorCode::INVALID_ARGUMENT);
        };

        let mut outer = source.clone();
        raster::embolden(&mut outer, 2 * radius, 2 * radius);
        let mut inner = source;
        raster::embolden(&mut inner, -2 * radius, -2 * radius);
        raster::reverse(&mut inner);

        let stroked = match border {
            Some(true) => inner,
            Some(false) => outer,
            None => {
                let offset = outer.points.len() as u16;
                let mut both = outer;
                both.points.extend(inner.points);
                both.tags.extend(inner.tags);
                both.contours.extend(inner.contours.iter().map(|&c| c + offset));
                both
            }
        };
        let result = self.new_glyph(library, advance, SlotImage::Outline(stroked));
        if destroy {
            self.free(op, glyph.addr());
        }
        Ok(result)
    }
}

/// Image content detached from the object table.
enum SlotImage {
    Outline(OutlineRecord),
    Bitmap(BitmapObj, i32, i32),
}

fn grid_box(bbox: BBox, mode: GlyphBBoxMode) -> BBox {
    match mode {
        GlyphBBoxMode::Unscaled => bbox,
        GlyphBBoxMode::Gridfit | GlyphBBoxMode::Pixels => {
            let fitted = BBox {
                x_min: bbox.x_min & !63,
                y_min: bbox.y_min & !63,
                x_max: (bbox.x_max + 63) & !63,
                y_max: (bbox.y_max + 63) & !63,
            };
            if mode == GlyphBBoxMode::Pixels {
                BBox {
                    x_min: fitted.x_min >> 6,
                    y_min: fitted.y_min >> 6,
                    x_max: fitted.x_max >> 6,
                    y_max: fitted.y_max >> 6,
                }
            } else {
                fitted
            }
        }
        GlyphBBoxMode::Truncate => BBox {
            x_min: bbox.x_min >> 6,
            y_min: bbox.y_min >> 6,
            x_max: bbox.x_max >> 6,
            y_max: bbox.y_max >> 6,
        },
    }
}

impl FreeTypeApi for SimFreeType {
    fn name(&self) -> &'static str {
        BACKEND_NAME
    }

    // Library

    fn init_library(&self) -> NativeResult<RawHandle> {
        if self.enter("FT_Init_FreeType", 0)? {
            return Ok(0);
        }
        Ok(self.alloc(Body::Library(LibraryObj::default()), None))
    }

    fn done_library(&self, library: NativeHandle) -> NativeResult<()> {
        self.check_live("FT_Done_FreeType", library.addr());
        self.enter("FT_Done_FreeType", library.addr())?;
        // The native library closes any face still open in it
        let faces: Vec<usize> = self
            .table
            .borrow()
            .objects
            .iter()
            .filter(|(_, o)| matches!(&o.body, Body::Face(f) if f.library == library.addr()))
            .map(|(&addr, _)| addr)
            .collect();
        for face in faces {
            log::debug!("sim: FT_Done_FreeType closing face {face:#x}");
            self.free("FT_Done_FreeType", face);
        }
        self.release("FT_Done_FreeType", library.addr());
        Ok(())
    }

    fn library_version(&self, library: NativeHandle) -> Version {
        self.note("FT_Library_Version", library.addr());
        self.with_library("FT_Library_Version", library, |_| VERSION)
    }

    fn set_lcd_filter(&self, library: NativeHandle, filter: LcdFilter) -> NativeResult<()> {
        self.enter("FT_Library_SetLcdFilter", library.addr())?;
        self.with_library("FT_Library_SetLcdFilter", library, |l| l.lcd_filter = Some(filter));
        Ok(())
    }

    fn truetype_engine(&self, library: NativeHandle) -> TrueTypeEngine {
        self.with_library("FT_Get_TrueType_Engine_Type", library, |_| TrueTypeEngine::Patented)
    }

    fn property_set(&self, library: NativeHandle, module: &str, property: &str, value: &PropertyValue) -> NativeResult<()> {
        self.check_live("FT_Property_Set", library.addr());
        self.enter("FT_Property_Set", library.addr())?;
        if !is_module(module) {
            return Err(ErrorCode::MISSING_MODULE);
        }
        let default = default_property(module, property).ok_or(ErrorCode::MISSING_PROPERTY)?;
        if default.kind() != value.kind() {
            return Err(ErrorCode::INVALID_ARGUMENT);
        }
        check_property(property, value)?;
        self.with_library("FT_Property_Set", library, |l| {
            l.properties.insert((module.to_owned(), property.to_owned()), *value)
        });
        Ok(())
    }

    fn property_get(&self, library: NativeHandle, module: &str, property: &str, kind: PropertyKind) -> NativeResult<PropertyValue> {
        self.check_live("FT_Property_Get", library.addr());
        self.enter("FT_Property_Get", library.addr())?;
        if !is_module(module) {
            return Err(ErrorCode::MISSING_MODULE);
        }
        let default = default_property(module, property).ok_or(ErrorCode::MISSING_PROPERTY)?;
        if default.kind() != kind {
            return Err(ErrorCode::INVALID_ARGUMENT);
        }
        let key = (module.to_owned(), property.to_owned());
        Ok(self.with_library("FT_Property_Get", library, |l| l.properties.get(&key).copied().unwrap_or(default)))
    }

    // Faces

    fn new_face(&self, library: NativeHandle, path: &Path, face_index: i64) -> NativeResult<RawHandle> {
        if self.enter("FT_New_Face", library.addr())? {
            return Ok(0);
        }
        let bytes = std::fs::read(path).map_err(|e| {
            log::debug!("sim: cannot read {}: {e}", path.display());
            ErrorCode::CANNOT_OPEN_RESOURCE
        })?;
        let data: Rc<[u8]> = bytes.into();
        self.open_face(library, &Rc::clone(&data), Some(data), face_index)
    }

    fn new_memory_face(&self, library: NativeHandle, data: Rc<[u8]>, face_index: i64) -> NativeResult<RawHandle> {
        if self.enter("FT_New_Memory_Face", library.addr())? {
            return Ok(0);
        }
        let bytes = Rc::clone(&data);
        self.open_face(library, &bytes, Some(data), face_index)
    }

    fn reference_face(&self, face: NativeHandle) -> NativeResult<()> {
        self.check_live("FT_Reference_Face", face.addr());
        self.enter("FT_Reference_Face", face.addr())?;
        self.with_face("FT_Reference_Face", face, |f| f.refcount += 1);
        Ok(())
    }

    fn done_face(&self, face: NativeHandle) -> NativeResult<()> {
        self.check_live("FT_Done_Face", face.addr());
        self.enter("FT_Done_Face", face.addr())?;
        let remaining = self.with_face("FT_Done_Face", face, |f| {
            f.refcount -= 1;
            f.refcount
        });
        if remaining == 0 {
            self.release("FT_Done_Face", face.addr());
        }
        Ok(())
    }

    fn attach_file(&self, face: NativeHandle, path: &Path) -> NativeResult<()> {
        self.enter("FT_Attach_File", face.addr())?;
        if !path.exists() {
            return Err(ErrorCode::CANNOT_OPEN_RESOURCE);
        }
        self.with_face("FT_Attach_File", face, |f| f.attached.push(path.to_path_buf()));
        Ok(())
    }

    fn face_record(&self, face: NativeHandle) -> FaceRecord {
        self.note("FT_FaceRec", face.addr());
        self.with_face("FT_FaceRec", face, |f| f.record())
    }

    fn set_char_size(&self, face: NativeHandle, width: i64, height: i64, h_res: u32, v_res: u32) -> NativeResult<()> {
        self.enter("FT_Set_Char_Size", face.addr())?;
        if width < 0 || height < 0 {
            return Err(ErrorCode::INVALID_ARGUMENT);
        }
        let (width, height) = match (width, height) {
            (0, 0) => (64, 64),
            (0, y) => (y, y),
            (x, 0) => (x, x),
            (x, y) => (x, y),
        };
        let h_res = if h_res == 0 { 72 } else { i64::from(h_res) };
        let v_res = if v_res == 0 { 72 } else { i64::from(v_res) };
        let x_ppem = ((width * h_res / 72 + 32) >> 6).max(1);
        let y_ppem = ((height * v_res / 72 + 32) >> 6).max(1);
        self.apply_pixel_size(face, x_ppem as u32, y_ppem as u32)
    }

    fn set_pixel_sizes(&self, face: NativeHandle, width: u32, height: u32) -> NativeResult<()> {
        self.enter("FT_Set_Pixel_Sizes", face.addr())?;
        self.apply_pixel_size(face, width, height)
    }

    fn select_size(&self, face: NativeHandle, strike_index: i32) -> NativeResult<()> {
        self.enter("FT_Select_Size", face.addr())?;
        let font = self.with_face("FT_Select_Size", face, |f| Rc::clone(&f.font));
        let ppem = usize::try_from(strike_index)
            .ok()
            .and_then(|i| font.strikes.get(i).copied())
            .ok_or(ErrorCode::INVALID_ARGUMENT)?;
        self.set_active_metrics(face, size_metrics(&font, ppem, ppem))
    }

    fn request_size(&self, face: NativeHandle, request: &SizeRequest) -> NativeResult<()> {
        self.enter("FT_Request_Size", face.addr())?;
        if request.width < 0 || request.height < 0 {
            return Err(ErrorCode::INVALID_ARGUMENT);
        }
        let font = self.with_face("FT_Request_Size", face, |f| Rc::clone(&f.font));
        let upem = i64::from(font.units_per_em);
        let ppem = |value: i64, resolution: u32, metric: i64| -> i64 {
            if request.kind == SizeRequestType::Scales {
                return mul_fix(upem, value);
            }
            let scaled = if resolution == 0 { value } else { (value * i64::from(resolution) + 36) / 72 };
            if metric <= 0 {
                scaled
            } else {
                scaled * upem / metric
            }
        };
        let bbox = font_bbox(&font);
        let real_height = i64::from(font.ascender) - i64::from(font.descender);
        let (width_metric, height_metric) = match request.kind {
            SizeRequestType::Nominal | SizeRequestType::Scales => (upem, upem),
            SizeRequestType::RealDim => (real_height, real_height),
            SizeRequestType::BBox => (bbox.x_max - bbox.x_min, bbox.y_max - bbox.y_min),
            SizeRequestType::Cell => (i64::from(max_advance(&font)), real_height),
        };
        let x = ppem(request.width, request.hori_resolution, width_metric);
        let y = ppem(request.height, request.vert_resolution, height_metric);
        let (x, y) = match (x, y) {
            (0, y) => (y, y),
            (x, 0) => (x, x),
            (x, y) => (x, y),
        };
        let pixels = |v: i64| u32::try_from(((v + 32) >> 6).max(1)).map_err(|_| ErrorCode::INVALID_PIXEL_SIZE);
        self.apply_pixel_size(face, pixels(x)?, pixels(y)?)
    }

    fn set_transform(&self, face: NativeHandle, matrix: Option<Matrix>, delta: Option<Vector>) {
        self.note("FT_Set_Transform", face.addr());
        self.with_face("FT_Set_Transform", face, |f| {
            f.matrix = matrix.unwrap_or(Matrix::IDENTITY);
            f.delta = delta.unwrap_or_default();
        });
    }

    fn load_glyph(&self, face: NativeHandle, glyph_index: u32, flags: LoadFlags) -> NativeResult<()> {
        self.enter("FT_Load_Glyph", face.addr())?;
        let (font, slot, matrix, delta) = self.with_face("FT_Load_Glyph", face, |f| (Rc::clone(&f.font), f.slot, f.matrix, f.delta));
        let glyph = font.glyphs.get(glyph_index as usize).ok_or(ErrorCode::INVALID_GLYPH_INDEX)?;

        let no_scale = flags.contains(LoadFlags::NO_SCALE);
        let (x_scale, y_scale) = if no_scale {
            (0x10000, 0x10000)
        } else {
            match self.active_metrics(face) {
                Some(m) if m.x_ppem > 0 && m.y_ppem > 0 => (m.x_scale, m.y_scale),
                _ => return Err(ErrorCode::INVALID_SIZE_HANDLE),
            }
        };

        let mut outline = glyph_outline(&font, glyph_index);
        for p in &mut outline.points {
            p.x = mul_fix(p.x, x_scale);
            p.y = mul_fix(p.y, y_scale);
        }
        let round = |v: i64| if no_scale { v } else { (v + 32) & !63 };
        let advance_x = round(mul_fix(i64::from(glyph.advance), x_scale));
        let mut advance = Vector::new(advance_x, 0);
        if !flags.contains(LoadFlags::IGNORE_TRANSFORM) && (matrix != Matrix::IDENTITY || delta != Vector::default()) {
            for p in &mut outline.points {
                let t = transform_point(*p, &matrix);
                p.x = t.x + delta.x;
                p.y = t.y + delta.y;
            }
            advance = transform_point(advance, &matrix);
        }

        let bbox = raster::cbox(&outline.points);
        let vert_advance = round(mul_fix(i64::from(font.ascender) - i64::from(font.descender), y_scale));
        let metrics = GlyphMetrics {
            width: bbox.width(),
            height: bbox.height(),
            hori_bearing_x: bbox.x_min,
            hori_bearing_y: bbox.y_max,
            hori_advance: advance_x,
            vert_bearing_x: bbox.x_min - advance_x / 2,
            vert_bearing_y: (vert_advance - bbox.height()) / 2,
            vert_advance,
        };
        let linear = |units: i64, scale: i64| if no_scale { units << 16 } else { units * scale / 64 };

        let (outline_addr, bitmap_addr) = self.with_slot("FT_Load_Glyph", h(slot), |s| {
            s.glyph_index = glyph_index;
            s.metrics = metrics;
            s.linear_hori_advance = linear(i64::from(glyph.advance), x_scale);
            s.linear_vert_advance = linear(i64::from(font.ascender) - i64::from(font.descender), y_scale);
            s.advance = advance;
            s.format = GlyphFormat::Outline;
            s.bitmap_left = 0;
            s.bitmap_top = 0;
            (s.outline, s.bitmap)
        });
        self.with_outline("FT_Load_Glyph", h(outline_addr), |o| o.record = outline);
        self.with_bitmap("FT_Load_Glyph", h(bitmap_addr), |b| *b = BitmapObj::empty());

        if flags.contains(LoadFlags::RENDER) {
            let mode = if flags.contains(LoadFlags::MONOCHROME) || flags.target() == Some(LoadTarget::Mono) {
                RenderMode::Mono
            } else {
                RenderMode::Normal
            };
            self.render_glyph(h(slot), mode)?;
        }
        Ok(())
    }

    fn load_char(&self, face: NativeHandle, char_code: u32, flags: LoadFlags) -> NativeResult<()> {
        self.note("FT_Load_Char", face.addr());
        let index = self.char_index(face, char_code);
        self.load_glyph(face, index, flags)
    }

    fn char_index(&self, face: NativeHandle, char_code: u32) -> u32 {
        self.note("FT_Get_Char_Index", face.addr());
        let charmap = self.with_face("FT_Get_Char_Index", face, |f| f.charmap);
        match NativeHandle::new(charmap) {
            Some(cm) => self.with_charmap("FT_Get_Char_Index", cm, |c| c.map.get(&char_code).copied().unwrap_or(0)),
            None => 0,
        }
    }

    fn first_char(&self, face: NativeHandle) -> (u32, u32) {
        self.note("FT_Get_First_Char", face.addr());
        let charmap = self.with_face("FT_Get_First_Char", face, |f| f.charmap);
        match NativeHandle::new(charmap) {
            Some(cm) => self.with_charmap("FT_Get_First_Char", cm, |c| {
                c.map.iter().next().map(|(&code, &gid)| (code, gid)).unwrap_or((0, 0))
            }),
            None => (0, 0),
        }
    }

    fn next_char(&self, face: NativeHandle, char_code: u32) -> (u32, u32) {
        self.note("FT_Get_Next_Char", face.addr());
        let charmap = self.with_face("FT_Get_Next_Char", face, |f| f.charmap);
        match NativeHandle::new(charmap) {
            Some(cm) => self.with_charmap("FT_Get_Next_Char", cm, |c| {
                c.map
                    .range(char_code.saturating_add(1)..)
                    .next()
                    .map(|(&code, &gid)| (code, gid))
                    .unwrap_or((0, 0))
            }),
            None => (0, 0),
        }
    }

    fn kerning(&self, face: NativeHandle, left: u32, right: u32, mode: KerningMode) -> NativeResult<Vector> {
        self.enter("FT_Get_Kerning", face.addr())?;
        let font = self.with_face("FT_Get_Kerning", face, |f| Rc::clone(&f.font));
        let units = font
            .kerning
            .iter()
            .find(|k| k.left == left && k.right == right)
            .map_or(0, |k| i64::from(k.value));
        let x = match mode {
            KerningMode::Unscaled => units,
            _ => {
                let scale = self.active_metrics(face).map_or(0, |m| m.x_scale);
                let scaled = mul_fix(units, scale);
                if mode == KerningMode::Default {
                    (scaled + 32) & !63
                } else {
                    scaled
                }
            }
        };
        Ok(Vector::new(x, 0))
    }

    fn advance(&self, face: NativeHandle, glyph_index: u32, flags: LoadFlags) -> NativeResult<i64> {
        self.enter("FT_Get_Advance", face.addr())?;
        let font = self.with_face("FT_Get_Advance", face, |f| Rc::clone(&f.font));
        let glyph = font.glyphs.get(glyph_index as usize).ok_or(ErrorCode::INVALID_GLYPH_INDEX)?;
        if flags.contains(LoadFlags::NO_SCALE) {
            return Ok(i64::from(glyph.advance));
        }
        let scale = self.active_metrics(face).map_or(0, |m| m.x_scale);
        Ok(i64::from(glyph.advance) * scale / 64)
    }

    fn glyph_name(&self, face: NativeHandle, glyph_index: u32) -> NativeResult<String> {
        self.enter("FT_Get_Glyph_Name", face.addr())?;
        self.with_face("FT_Get_Glyph_Name", face, |f| {
            f.font
                .glyphs
                .get(glyph_index as usize)
                .map(|g| g.name.clone())
                .ok_or(ErrorCode::INVALID_ARGUMENT)
        })
    }

    fn name_index(&self, face: NativeHandle, name: &str) -> u32 {
        self.note("FT_Get_Name_Index", face.addr());
        self.with_face("FT_Get_Name_Index", face, |f| f.font.glyph_index(name).unwrap_or(0))
    }

    fn postscript_name(&self, face: NativeHandle) -> Option<String> {
        self.note("FT_Get_Postscript_Name", face.addr());
        self.with_face("FT_Get_Postscript_Name", face, |f| f.font.postscript_name.clone())
    }

    fn face_glyph_slot(&self, face: NativeHandle) -> RawHandle {
        self.with_face("face->glyph", face, |f| f.slot)
    }

    fn face_active_size(&self, face: NativeHandle) -> RawHandle {
        self.with_face("face->size", face, |f| f.active_size)
    }

    // Charmaps

    fn face_charmaps(&self, face: NativeHandle) -> Vec<RawHandle> {
        self.with_face("face->charmaps", face, |f| f.charmaps.clone())
    }

    fn face_charmap(&self, face: NativeHandle) -> RawHandle {
        self.with_face("face->charmap", face, |f| f.charmap)
    }

    fn select_charmap(&self, face: NativeHandle, encoding: Encoding) -> NativeResult<()> {
        self.enter("FT_Select_Charmap", face.addr())?;
        let charmaps = self.face_charmaps(face);
        let found = charmaps
            .into_iter()
            .find(|&cm| self.with_charmap("FT_Select_Charmap", h(cm), |c| c.record.encoding == encoding))
            .ok_or(ErrorCode::INVALID_ARGUMENT)?;
        self.with_face("FT_Select_Charmap", face, |f| f.charmap = found);
        Ok(())
    }

    fn set_charmap(&self, face: NativeHandle, charmap: NativeHandle) -> NativeResult<()> {
        self.enter("FT_Set_Charmap", face.addr())?;
        let owner = self.with_charmap("FT_Set_Charmap", charmap, |c| c.face);
        if owner != face.addr() {
            return Err(ErrorCode::INVALID_ARGUMENT);
        }
        self.with_face("FT_Set_Charmap", face, |f| f.charmap = charmap.addr());
        Ok(())
    }

    fn charmap_record(&self, charmap: NativeHandle) -> CharMapRecord {
        self.with_charmap("FT_CharMapRec", charmap, |c| c.record)
    }

    fn charmap_index(&self, charmap: NativeHandle) -> i32 {
        self.with_charmap("FT_Get_Charmap_Index", charmap, |c| c.index)
    }

    // SFNT, PostScript and variation data

    fn sfnt_table(&self, face: NativeHandle, tag: SfntTag) -> Option<SfntTable> {
        self.note("FT_Get_Sfnt_Table", face.addr());
        self.with_face("FT_Get_Sfnt_Table", face, |f| sfnt_table(&f.font, tag))
    }

    fn load_sfnt_table(&self, face: NativeHandle, tag: TableTag, offset: i64) -> NativeResult<Vec<u8>> {
        self.enter("FT_Load_Sfnt_Table", face.addr())?;
        let (font, data) = self.with_face("FT_Load_Sfnt_Table", face, |f| (Rc::clone(&f.font), f.data.clone()));
        let bytes = if tag == TableTag::WHOLE_FONT {
            data.map(|d| d.to_vec()).ok_or(ErrorCode::INVALID_FACE_HANDLE)?
        } else {
            raw_table(&font, tag.0).ok_or(ErrorCode::TABLE_MISSING)?
        };
        let start = usize::try_from(offset).map_err(|_| ErrorCode::INVALID_ARGUMENT)?;
        bytes.get(start..).map(<[u8]>::to_vec).ok_or(ErrorCode::INVALID_ARGUMENT)
    }

    fn sfnt_name_count(&self, face: NativeHandle) -> u32 {
        self.with_face("FT_Get_Sfnt_Name_Count", face, |f| f.font.names.len() as u32)
    }

    fn sfnt_name(&self, face: NativeHandle, index: u32) -> NativeResult<SfntName> {
        self.enter("FT_Get_Sfnt_Name", face.addr())?;
        self.with_face("FT_Get_Sfnt_Name", face, |f| {
            sfnt_names(&f.font).into_iter().nth(index as usize).ok_or(ErrorCode::INVALID_ARGUMENT)
        })
    }

    fn ps_font_info(&self, face: NativeHandle) -> NativeResult<PsFontInfo> {
        self.enter("FT_Get_PS_Font_Info", face.addr())?;
        self.with_face("FT_Get_PS_Font_Info", face, |_| ());
        // SFNT faces carry no Type 1 dictionaries
        Err(ErrorCode::INVALID_ARGUMENT)
    }

    fn has_ps_glyph_names(&self, face: NativeHandle) -> bool {
        self.with_face("FT_Has_PS_Glyph_Names", face, |_| true)
    }

    fn fs_type_flags(&self, face: NativeHandle) -> FsTypeFlags {
        self.with_face("FT_Get_FSType_Flags", face, |f| FsTypeFlags::from_bits(f.font.fs_type))
    }

    fn font_format(&self, face: NativeHandle) -> Option<String> {
        self.with_face("FT_Get_Font_Format", face, |_| Some("SimFont".to_string()))
    }

    fn mm_var(&self, face: NativeHandle) -> NativeResult<MmVar> {
        self.enter("FT_Get_MM_Var", face.addr())?;
        self.with_face("FT_Get_MM_Var", face, |f| {
            if f.font.axes.is_empty() {
                Err(ErrorCode::INVALID_ARGUMENT)
            } else {
                Ok(mm_var(&f.font))
            }
        })
    }

    fn var_design_coordinates(&self, face: NativeHandle, num_coords: usize) -> NativeResult<Vec<i64>> {
        self.enter("FT_Get_Var_Design_Coordinates", face.addr())?;
        self.with_face("FT_Get_Var_Design_Coordinates", face, |f| {
            if f.font.axes.is_empty() {
                return Err(ErrorCode::INVALID_ARGUMENT);
            }
            Ok(f.coords().into_iter().take(num_coords).collect())
        })
    }

    fn set_var_design_coordinates(&self, face: NativeHandle, coords: &[i64]) -> NativeResult<()> {
        self.enter("FT_Set_Var_Design_Coordinates", face.addr())?;
        self.with_face("FT_Set_Var_Design_Coordinates", face, |f| {
            if f.font.axes.is_empty() || coords.len() > f.font.axes.len() {
                return Err(ErrorCode::INVALID_ARGUMENT);
            }
            let mut design = f.coords();
            for ((slot, &value), axis) in design.iter_mut().zip(coords).zip(&f.font.axes) {
                *slot = value.clamp(f64_to_f16dot16(axis.min), f64_to_f16dot16(axis.max));
            }
            f.design_coords = design;
            f.named_instance = 0;
            Ok(())
        })
    }

    fn set_var_blend_coordinates(&self, face: NativeHandle, coords: &[i64]) -> NativeResult<()> {
        self.enter("FT_Set_Var_Blend_Coordinates", face.addr())?;
        self.with_face("FT_Set_Var_Blend_Coordinates", face, |f| {
            if f.font.axes.is_empty() || coords.len() > f.font.axes.len() {
                return Err(ErrorCode::INVALID_ARGUMENT);
            }
            let mut design = f.coords();
            for ((slot, &blend), axis) in design.iter_mut().zip(coords).zip(&f.font.axes) {
                let t = f16dot16_to_f64(blend).clamp(-1.0, 1.0);
                let value = if t < 0.0 {
                    axis.default + t * (axis.default - axis.min)
                } else {
                    axis.default + t * (axis.max - axis.default)
                };
                *slot = f64_to_f16dot16(value);
            }
            f.design_coords = design;
            f.named_instance = 0;
            Ok(())
        })
    }

    fn set_named_instance(&self, face: NativeHandle, instance_index: u32) -> NativeResult<()> {
        self.enter("FT_Set_Named_Instance", face.addr())?;
        self.with_face("FT_Set_Named_Instance", face, |f| {
            if instance_index as usize > f.font.instances.len() {
                return Err(ErrorCode::INVALID_ARGUMENT);
            }
            f.named_instance = instance_index;
            f.design_coords.clear();
            Ok(())
        })
    }

    // Sizes

    fn new_size(&self, face: NativeHandle) -> NativeResult<RawHandle> {
        self.check_live("FT_New_Size", face.addr());
        if self.enter("FT_New_Size", face.addr())? {
            return Ok(0);
        }
        Ok(self.alloc(
            Body::Size(SizeObj {
                face: face.addr(),
                metrics: SizeMetrics::default(),
            }),
            Some(face.addr()),
        ))
    }

    fn done_size(&self, size: NativeHandle) -> NativeResult<()> {
        self.check_live("FT_Done_Size", size.addr());
        self.enter("FT_Done_Size", size.addr())?;
        let face = self.with_size("FT_Done_Size", size, |s| s.face);
        self.with_face("FT_Done_Size", h(face), |f| {
            if f.default_size == size.addr() {
                panic!("FT_Done_Size: {size} is the face's built-in size");
            }
            if f.active_size == size.addr() {
                f.active_size = f.default_size;
            }
        });
        self.free("FT_Done_Size", size.addr());
        Ok(())
    }

    fn activate_size(&self, size: NativeHandle) -> NativeResult<()> {
        self.enter("FT_Activate_Size", size.addr())?;
        let face = self.with_size("FT_Activate_Size", size, |s| s.face);
        self.with_face("FT_Activate_Size", h(face), |f| f.active_size = size.addr());
        Ok(())
    }

    fn size_metrics(&self, size: NativeHandle) -> SizeMetrics {
        self.with_size("FT_Size_Metrics", size, |s| s.metrics)
    }

    // Glyph slots

    fn slot_record(&self, slot: NativeHandle) -> GlyphSlotRecord {
        self.with_slot("FT_GlyphSlotRec", slot, |s| s.record())
    }

    fn render_glyph(&self, slot: NativeHandle, mode: RenderMode) -> NativeResult<()> {
        self.enter("FT_Render_Glyph", slot.addr())?;
        let (format, outline, bitmap) = self.with_slot("FT_Render_Glyph", slot, |s| (s.format, s.outline, s.bitmap));
        match format {
            GlyphFormat::Bitmap => return Ok(()),
            GlyphFormat::Outline => {}
            _ => return Err(ErrorCode::INVALID_GLYPH_FORMAT),
        }
        let record = self.with_outline("FT_Render_Glyph", h(outline), |o| o.record.clone());
        let image = raster::rasterize(&record, mode, Vector::default())?;
        self.with_bitmap("FT_Render_Glyph", h(bitmap), |b| {
            b.record = image.record;
            b.buffer = image.buffer;
        });
        self.with_slot("FT_Render_Glyph", slot, |s| {
            s.format = GlyphFormat::Bitmap;
            s.bitmap_left = image.left;
            s.bitmap_top = image.top;
        });
        Ok(())
    }

    fn slot_outline(&self, slot: NativeHandle) -> RawHandle {
        self.with_slot("slot->outline", slot, |s| s.outline)
    }

    fn slot_bitmap(&self, slot: NativeHandle) -> RawHandle {
        self.with_slot("slot->bitmap", slot, |s| s.bitmap)
    }

    fn get_glyph(&self, slot: NativeHandle) -> NativeResult<RawHandle> {
        if self.enter("FT_Get_Glyph", slot.addr())? {
            return Ok(0);
        }
        let (face, format, outline, bitmap, left, top, advance) = self.with_slot("FT_Get_Glyph", slot, |s| {
            (s.face, s.format, s.outline, s.bitmap, s.bitmap_left, s.bitmap_top, s.advance)
        });
        let library = self.with_face("FT_Get_Glyph", h(face), |f| f.library);
        let image = match format {
            GlyphFormat::Outline => SlotImage::Outline(self.with_outline("FT_Get_Glyph", h(outline), |o| o.record.clone())),
            GlyphFormat::Bitmap => SlotImage::Bitmap(self.with_bitmap("FT_Get_Glyph", h(bitmap), |b| b.clone()), left, top),
            _ => return Err(ErrorCode::INVALID_GLYPH_FORMAT),
        };
        let advance = Vector::new(advance.x << 10, advance.y << 10);
        Ok(self.new_glyph(library, advance, image))
    }

    // Glyphs

    fn glyph_record(&self, glyph: NativeHandle) -> GlyphRecord {
        self.with_glyph("FT_GlyphRec", glyph, |g| GlyphRecord {
            format: g.format(),
            advance: g.advance,
        })
    }

    fn glyph_copy(&self, glyph: NativeHandle) -> NativeResult<RawHandle> {
        if self.enter("FT_Glyph_Copy", glyph.addr())? {
            return Ok(0);
        }
        let (library, advance, image) = self.glyph_image(glyph);
        Ok(self.new_glyph(library, advance, image))
    }

    fn glyph_transform(&self, glyph: NativeHandle, matrix: Option<Matrix>, delta: Option<Vector>) -> NativeResult<()> {
        self.enter("FT_Glyph_Transform", glyph.addr())?;
        let Some(outline) = self.glyph_outline_addr(glyph) else {
            return Err(ErrorCode::INVALID_GLYPH_FORMAT);
        };
        let matrix = matrix.unwrap_or(Matrix::IDENTITY);
        let delta = delta.unwrap_or_default();
        self.with_outline("FT_Glyph_Transform", h(outline), |o| {
            for p in &mut o.record.points {
                let t = transform_point(*p, &matrix);
                *p = Vector::new(t.x + delta.x, t.y + delta.y);
            }
        });
        self.with_glyph("FT_Glyph_Transform", glyph, |g| g.advance = transform_point(g.advance, &matrix));
        Ok(())
    }

    fn glyph_cbox(&self, glyph: NativeHandle, mode: GlyphBBoxMode) -> BBox {
        self.note("FT_Glyph_Get_CBox", glyph.addr());
        let (_, _, image) = self.glyph_image(glyph);
        let bbox = match image {
            SlotImage::Outline(record) => raster::cbox(&record.points),
            SlotImage::Bitmap(bitmap, left, top) => BBox {
                x_min: i64::from(left) << 6,
                y_max: i64::from(top) << 6,
                x_max: (i64::from(left) + i64::from(bitmap.record.width)) << 6,
                y_min: (i64::from(top) - i64::from(bitmap.record.rows)) << 6,
            },
        };
        grid_box(bbox, mode)
    }

    fn glyph_to_bitmap(&self, glyph: NativeHandle, mode: RenderMode, origin: Option<Vector>, destroy: bool) -> NativeResult<RawHandle> {
        if self.enter("FT_Glyph_To_Bitmap", glyph.addr())? {
            return Ok(0);
        }
        let (library, advance, image) = self.glyph_image(glyph);
        let record = match image {
            SlotImage::Bitmap(..) => return Ok(glyph.addr()),
            SlotImage::Outline(record) => record,
        };
        let raster = raster::rasterize(&record, mode, origin.unwrap_or_default())?;
        let bitmap = BitmapObj {
            record: raster.record,
            buffer: raster.buffer,
        };
        let result = self.new_glyph(library, advance, SlotImage::Bitmap(bitmap, raster.left, raster.top));
        if destroy {
            self.free("FT_Glyph_To_Bitmap", glyph.addr());
        }
        Ok(result)
    }

    fn glyph_stroke(&self, glyph: NativeHandle, stroker: NativeHandle, destroy: bool) -> NativeResult<RawHandle> {
        self.stroke("FT_Glyph_Stroke", glyph, stroker, None, destroy)
    }

    fn glyph_stroke_border(&self, glyph: NativeHandle, stroker: NativeHandle, inside: bool, destroy: bool) -> NativeResult<RawHandle> {
        self.stroke("FT_Glyph_StrokeBorder", glyph, stroker, Some(inside), destroy)
    }

    fn done_glyph(&self, glyph: NativeHandle) -> NativeResult<()> {
        self.check_live("FT_Done_Glyph", glyph.addr());
        self.enter("FT_Done_Glyph", glyph.addr())?;
        self.release("FT_Done_Glyph", glyph.addr());
        Ok(())
    }

    fn bitmap_glyph_record(&self, glyph: NativeHandle) -> BitmapGlyphRecord {
        self.with_glyph("FT_BitmapGlyphRec", glyph, |g| match g.image {
            GlyphImage::Bitmap { left, top, .. } => BitmapGlyphRecord { left, top },
            GlyphImage::Outline { .. } => panic!("FT_BitmapGlyphRec: {glyph} is an outline glyph"),
        })
    }

    fn bitmap_glyph_bitmap(&self, glyph: NativeHandle) -> RawHandle {
        self.with_glyph("bitmap_glyph->bitmap", glyph, |g| match g.image {
            GlyphImage::Bitmap { bitmap, .. } => bitmap,
            GlyphImage::Outline { .. } => 0,
        })
    }

    fn outline_glyph_outline(&self, glyph: NativeHandle) -> RawHandle {
        self.glyph_outline_addr(glyph).unwrap_or(0)
    }

    // Outlines

    fn new_outline(&self, library: NativeHandle, n_points: u32, n_contours: u32) -> NativeResult<RawHandle> {
        self.check_live("FT_Outline_New", library.addr());
        if self.enter("FT_Outline_New", library.addr())? {
            return Ok(0);
        }
        if n_points > 0xFFFF || n_contours > 0xFFFF {
            return Err(ErrorCode::ARRAY_TOO_LARGE);
        }
        if n_points > 0 && n_contours > n_points {
            return Err(ErrorCode::INVALID_ARGUMENT);
        }
        let record = OutlineRecord {
            points: vec![Vector::default(); n_points as usize],
            tags: vec![0; n_points as usize],
            contours: vec![0; n_contours as usize],
            flags: OutlineFlags::OWNER,
        };
        Ok(self.alloc(Body::Outline(OutlineObj { record }), None))
    }

    fn done_outline(&self, library: NativeHandle, outline: NativeHandle) -> NativeResult<()> {
        self.check_live("FT_Outline_Done", library.addr());
        self.check_live("FT_Outline_Done", outline.addr());
        self.enter("FT_Outline_Done", outline.addr())?;
        self.release("FT_Outline_Done", outline.addr());
        Ok(())
    }

    fn outline_record(&self, outline: NativeHandle) -> OutlineRecord {
        self.with_outline("FT_Outline", outline, |o| o.record.clone())
    }

    fn outline_write(&self, outline: NativeHandle, contents: &OutlineRecord) -> NativeResult<()> {
        self.enter("FT_Outline write", outline.addr())?;
        self.with_outline("FT_Outline write", outline, |o| {
            let r = &mut o.record;
            if contents.points.len() != r.points.len()
                || contents.tags.len() != r.tags.len()
                || contents.contours.len() != r.contours.len()
            {
                return Err(ErrorCode::INVALID_ARGUMENT);
            }
            r.points.clone_from(&contents.points);
            r.tags.clone_from(&contents.tags);
            r.contours.clone_from(&contents.contours);
            let owner = r.flags.contains(OutlineFlags::OWNER);
            r.flags = contents.flags;
            if owner {
                r.flags |= OutlineFlags::OWNER;
            }
            Ok(())
        })
    }

    fn outline_copy(&self, source: NativeHandle, target: NativeHandle) -> NativeResult<()> {
        self.enter("FT_Outline_Copy", source.addr())?;
        let contents = self.outline_record(source);
        let shape = self.with_outline("FT_Outline_Copy", target, |o| (o.record.points.len(), o.record.contours.len()));
        if shape != (contents.points.len(), contents.contours.len()) {
            return Err(ErrorCode::INVALID_ARGUMENT);
        }
        let mut contents = contents;
        contents.flags = OutlineFlags::from_bits(contents.flags.bits() & !OutlineFlags::OWNER.bits());
        self.outline_write(target, &contents)
    }

    fn outline_translate(&self, outline: NativeHandle, dx: i64, dy: i64) {
        self.note("FT_Outline_Translate", outline.addr());
        self.with_outline("FT_Outline_Translate", outline, |o| {
            for p in &mut o.record.points {
                p.x += dx;
                p.y += dy;
            }
        });
    }

    fn outline_transform(&self, outline: NativeHandle, matrix: Matrix) {
        self.note("FT_Outline_Transform", outline.addr());
        self.with_outline("FT_Outline_Transform", outline, |o| {
            for p in &mut o.record.points {
                *p = transform_point(*p, &matrix);
            }
        });
    }

    fn outline_embolden(&self, outline: NativeHandle, strength: i64) -> NativeResult<()> {
        self.outline_embolden_xy(outline, strength, strength)
    }

    fn outline_embolden_xy(&self, outline: NativeHandle, x_strength: i64, y_strength: i64) -> NativeResult<()> {
        self.enter("FT_Outline_EmboldenXY", outline.addr())?;
        self.with_outline("FT_Outline_EmboldenXY", outline, |o| {
            raster::check(&o.record)?;
            raster::embolden(&mut o.record, x_strength, y_strength);
            Ok(())
        })
    }

    fn outline_reverse(&self, outline: NativeHandle) {
        self.note("FT_Outline_Reverse", outline.addr());
        self.with_outline("FT_Outline_Reverse", outline, |o| {
            raster::reverse(&mut o.record);
            o.record.flags = OutlineFlags::from_bits(o.record.flags.bits() ^ OutlineFlags::REVERSE_FILL.bits());
        });
    }

    fn outline_check(&self, outline: NativeHandle) -> NativeResult<()> {
        self.enter("FT_Outline_Check", outline.addr())?;
        self.with_outline("FT_Outline_Check", outline, |o| raster::check(&o.record))
    }

    fn outline_cbox(&self, outline: NativeHandle) -> BBox {
        self.with_outline("FT_Outline_Get_CBox", outline, |o| raster::cbox(&o.record.points))
    }

    fn outline_bbox(&self, outline: NativeHandle) -> NativeResult<BBox> {
        self.enter("FT_Outline_Get_BBox", outline.addr())?;
        let record = self.outline_record(outline);
        raster::exact_bbox(&record)
    }

    fn outline_orientation(&self, outline: NativeHandle) -> Orientation {
        self.with_outline("FT_Outline_Get_Orientation", outline, |o| raster::orientation(&o.record))
    }

    fn decompose_outline(&self, outline: NativeHandle, sink: &mut dyn OutlineSink) -> NativeResult<()> {
        self.enter("FT_Outline_Decompose", outline.addr())?;
        // The sink may call back in, so walk a detached copy
        let record = self.outline_record(outline);
        raster::decompose(&record, sink)
    }

    fn outline_get_bitmap(&self, library: NativeHandle, outline: NativeHandle, bitmap: NativeHandle) -> NativeResult<()> {
        self.check_live("FT_Outline_Get_Bitmap", library.addr());
        self.enter("FT_Outline_Get_Bitmap", outline.addr())?;
        let target = self.with_bitmap("FT_Outline_Get_Bitmap", bitmap, |b| b.record);
        let mode = match target.pixel_mode {
            PixelMode::Mono => RenderMode::Mono,
            PixelMode::Gray => RenderMode::Normal,
            _ => return Err(ErrorCode::INVALID_ARGUMENT),
        };
        if target.rows == 0 || target.width == 0 {
            return Ok(());
        }
        let record = self.with_outline("FT_Outline_Get_Bitmap", outline, |o| o.record.clone());
        let image = raster::rasterize(&record, mode, Vector::default())?;
        self.with_bitmap("FT_Outline_Get_Bitmap", bitmap, |b| blit(&image, b));
        Ok(())
    }

    // Bitmaps

    fn new_bitmap(&self, library: NativeHandle) -> NativeResult<RawHandle> {
        self.check_live("FT_Bitmap_Init", library.addr());
        if self.enter("FT_Bitmap_Init", library.addr())? {
            return Ok(0);
        }
        Ok(self.alloc(Body::Bitmap(BitmapObj::empty()), None))
    }

    fn done_bitmap(&self, library: NativeHandle, bitmap: NativeHandle) -> NativeResult<()> {
        self.check_live("FT_Bitmap_Done", library.addr());
        self.check_live("FT_Bitmap_Done", bitmap.addr());
        self.enter("FT_Bitmap_Done", bitmap.addr())?;
        self.release("FT_Bitmap_Done", bitmap.addr());
        Ok(())
    }

    fn bitmap_record(&self, bitmap: NativeHandle) -> BitmapRecord {
        self.with_bitmap("FT_Bitmap", bitmap, |b| b.record)
    }

    fn bitmap_buffer(&self, bitmap: NativeHandle) -> Vec<u8> {
        self.with_bitmap("FT_Bitmap", bitmap, |b| b.buffer.clone())
    }

    fn bitmap_copy(&self, library: NativeHandle, source: NativeHandle, target: NativeHandle) -> NativeResult<()> {
        self.check_live("FT_Bitmap_Copy", library.addr());
        self.enter("FT_Bitmap_Copy", source.addr())?;
        let copy = self.with_bitmap("FT_Bitmap_Copy", source, |b| b.clone());
        self.with_bitmap("FT_Bitmap_Copy", target, |b| *b = copy);
        Ok(())
    }

    fn bitmap_convert(&self, library: NativeHandle, source: NativeHandle, target: NativeHandle, alignment: i32) -> NativeResult<()> {
        self.check_live("FT_Bitmap_Convert", library.addr());
        self.enter("FT_Bitmap_Convert", source.addr())?;
        let src = self.with_bitmap("FT_Bitmap_Convert", source, |b| b.clone());
        let converted = convert_bitmap(&src, alignment).ok_or(ErrorCode::INVALID_ARGUMENT)?;
        self.with_bitmap("FT_Bitmap_Convert", target, |b| *b = converted);
        Ok(())
    }

    fn bitmap_embolden(&self, library: NativeHandle, bitmap: NativeHandle, x_strength: i64, y_strength: i64) -> NativeResult<()> {
        self.check_live("FT_Bitmap_Embolden", library.addr());
        self.enter("FT_Bitmap_Embolden", bitmap.addr())?;
        if x_strength < 0 || y_strength < 0 {
            return Err(ErrorCode::INVALID_ARGUMENT);
        }
        let x = ((x_strength + 32) >> 6) as u32;
        let y = ((y_strength + 32) >> 6) as u32;
        if x == 0 && y == 0 {
            return Ok(());
        }
        let src = self.with_bitmap("FT_Bitmap_Embolden", bitmap, |b| b.clone());
        if src.record.rows == 0 || src.record.width == 0 {
            return Ok(());
        }
        let gray = match src.record.pixel_mode {
            PixelMode::Gray => src,
            _ => convert_bitmap(&src, 1).ok_or(ErrorCode::INVALID_GLYPH_FORMAT)?,
        };
        let bold = embolden_bitmap(&gray, x, y);
        self.with_bitmap("FT_Bitmap_Embolden", bitmap, |b| *b = bold);
        Ok(())
    }

    fn bitmap_allocate(&self, library: NativeHandle, bitmap: NativeHandle, width: u32, rows: u32) -> NativeResult<()> {
        self.check_live("FT_Bitmap_Convert", library.addr());
        self.enter("FT_Bitmap_Convert", bitmap.addr())?;
        let len = usize::try_from(u64::from(width) * u64::from(rows)).map_err(|_| ErrorCode::ARRAY_TOO_LARGE)?;
        let pitch = i32::try_from(width).map_err(|_| ErrorCode::INVALID_ARGUMENT)?;
        self.with_bitmap("FT_Bitmap_Convert", bitmap, |b| {
            *b = BitmapObj {
                record: BitmapRecord {
                    rows,
                    width,
                    pitch,
                    pixel_mode: PixelMode::Gray,
                    num_grays: 256,
                },
                buffer: vec![0; len],
            }
        });
        Ok(())
    }

    // Strokers

    fn new_stroker(&self, library: NativeHandle) -> NativeResult<RawHandle> {
        self.check_live("FT_Stroker_New", library.addr());
        if self.enter("FT_Stroker_New", library.addr())? {
            return Ok(0);
        }
        Ok(self.alloc(
            Body::Stroker(StrokerObj {
                radius: 0,
                cap: StrokerLineCap::Butt,
                join: StrokerLineJoin::Round,
                miter_limit: 0,
            }),
            None,
        ))
    }

    fn done_stroker(&self, stroker: NativeHandle) -> NativeResult<()> {
        self.check_live("FT_Stroker_Done", stroker.addr());
        self.enter("FT_Stroker_Done", stroker.addr())?;
        self.release("FT_Stroker_Done", stroker.addr());
        Ok(())
    }

    fn stroker_set(&self, stroker: NativeHandle, radius: i64, cap: StrokerLineCap, join: StrokerLineJoin, miter_limit: i64) {
        self.note("FT_Stroker_Set", stroker.addr());
        self.with_stroker("FT_Stroker_Set", stroker, |s| {
            s.radius = radius;
            s.cap = cap;
            s.join = join;
            s.miter_limit = miter_limit;
        });
    }

    // Cache manager

    fn new_manager(&self, library: NativeHandle, limits: ManagerLimits, requester: Rc<dyn FaceRequester>) -> NativeResult<RawHandle> {
        self.check_live("FTC_Manager_New", library.addr());
        if self.enter("FTC_Manager_New", library.addr())? {
            return Ok(0);
        }
        Ok(self.alloc(
            Body::Manager(ManagerObj {
                library: library.addr(),
                limits,
                requester,
                faces: Vec::new(),
            }),
            None,
        ))
    }

    fn done_manager(&self, manager: NativeHandle) -> NativeResult<()> {
        self.check_live("FTC_Manager_Done", manager.addr());
        self.enter("FTC_Manager_Done", manager.addr())?;
        self.manager_reset_inner(manager);
        self.release("FTC_Manager_Done", manager.addr());
        Ok(())
    }

    fn manager_lookup_face(&self, manager: NativeHandle, face_id: usize) -> NativeResult<RawHandle> {
        self.enter("FTC_Manager_LookupFace", manager.addr())?;
        let cached = self.with_manager("FTC_Manager_LookupFace", manager, |m| {
            let pos = m.faces.iter().position(|&(id, _)| id == face_id)?;
            let entry = m.faces.remove(pos);
            m.faces.push(entry);
            Some(entry.1)
        });
        if let Some(face) = cached {
            return Ok(face);
        }

        let (library, requester) = self.with_manager("FTC_Manager_LookupFace", manager, |m| (m.library, Rc::clone(&m.requester)));
        let face = requester.request_face(self, h(library), face_id)?;
        let face = NativeHandle::new(face).ok_or(ErrorCode::INVALID_HANDLE)?;
        self.with_face("FTC_Manager_LookupFace", face, |f| f.manager = Some(manager.addr()));

        let evicted = self.with_manager("FTC_Manager_LookupFace", manager, |m| {
            m.faces.push((face_id, face.addr()));
            let excess = m.faces.len().saturating_sub(m.max_faces());
            m.faces.drain(..excess).collect::<Vec<_>>()
        });
        for (id, old) in evicted {
            log::debug!("sim: cache manager evicting face id {id}");
            self.note("FTC_Manager evict", old);
            self.unref_face("FTC_Manager evict", old);
        }
        Ok(face.addr())
    }

    fn manager_remove_face(&self, manager: NativeHandle, face_id: usize) {
        self.note("FTC_Manager_RemoveFaceID", manager.addr());
        let removed = self.with_manager("FTC_Manager_RemoveFaceID", manager, |m| {
            let pos = m.faces.iter().position(|&(id, _)| id == face_id)?;
            Some(m.faces.remove(pos).1)
        });
        if let Some(face) = removed {
            self.unref_face("FTC_Manager_RemoveFaceID", face);
        }
    }

    fn manager_reset(&self, manager: NativeHandle) {
        self.note("FTC_Manager_Reset", manager.addr());
        self.manager_reset_inner(manager);
    }
}

impl SimFreeType {
    fn manager_reset_inner(&self, manager: NativeHandle) {
        let faces = self.with_manager("FTC_Manager_Reset", manager, |m| std::mem::take(&mut m.faces));
        for (_, face) in faces {
            self.unref_face("FTC_Manager_Reset", face);
        }
    }

    /// Drop the manager's reference on a cached face.
    fn unref_face(&self, op: &'static str, face: usize) {
        let remaining = self.with_face(op, h(face), |f| {
            f.refcount -= 1;
            if f.refcount == 0 {
                f.manager = None;
            }
            f.refcount
        });
        if remaining == 0 {
            self.free(op, face);
        }
    }
}
