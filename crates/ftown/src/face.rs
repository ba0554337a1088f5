//! Faces: owned, counted duplicates, or cache views

use std::fmt;
use std::path::Path;
use std::rc::{Rc, Weak};

use ftown_core::records::*;
use ftown_core::types::*;
use ftown_core::{
    report_release, Disposable, DisposeKind, FtError, Lifecycle, NativeHandle, NativeResultExt, Ownership, Registry,
    Result,
};

use crate::charmap::CharMap;
use crate::library::{Ctx, LibraryInner};
use crate::size::{Size, SizeInner};
use crate::slot::GlyphSlot;

/// A font face.
///
/// Faces opened through [`Library`](crate::Library) are owned and tracked
/// by the library. [`duplicate`](Self::duplicate) takes an extra native
/// reference, released on its own disposal. Faces handed out by a cache
/// [`Manager`](crate::Manager) are views into the cache.
#[derive(Clone)]
pub struct Face {
    pub(crate) inner: Rc<FaceInner>,
}

pub(crate) struct FaceInner {
    pub(crate) ctx: Ctx,
    pub(crate) life: Lifecycle,
    /// Whether the library's face registry holds this face.
    tracked: bool,
    pub(crate) sizes: Registry<SizeInner>,
}

impl Disposable for FaceInner {
    fn lifecycle(&self) -> &Lifecycle {
        &self.life
    }

    fn dispose_as(&self, kind: DisposeKind) {
        let disposed = self.life.dispose(kind, |handle| {
            self.sizes.cascade_dispose(kind);
            if self.life.ownership().releases_handle() {
                report_release("FT_Done_Face", "Face", handle, self.ctx.api.done_face(handle));
            }
        });
        if disposed && kind.is_explicit() && self.tracked {
            if let Some(library) = self.ctx.library.upgrade() {
                library.faces.unregister(self);
            }
        }
    }

    /// The native face is freed by someone else, and its sizes with it.
    fn invalidate(&self, kind: DisposeKind) {
        if self.life.force_disposed(kind) {
            self.sizes.invalidate_all(kind);
        }
    }
}

impl Drop for FaceInner {
    fn drop(&mut self) {
        self.dispose_as(DisposeKind::Finalizer);
    }
}

impl Face {
    fn build(ctx: Ctx, handle: NativeHandle, ownership: Ownership, tracked: bool) -> Self {
        Face {
            inner: Rc::new(FaceInner {
                ctx,
                life: Lifecycle::new("Face", handle, ownership),
                tracked,
                sizes: Registry::new("sizes"),
            }),
        }
    }

    pub(crate) fn owned(ctx: Ctx, handle: NativeHandle, library: &LibraryInner) -> Self {
        let face = Self::build(ctx, handle, Ownership::Owned, true);
        library.faces.register(&face.inner);
        face
    }

    /// A face whose memory belongs to a cache manager.
    pub(crate) fn view(ctx: Ctx, handle: NativeHandle) -> Self {
        Self::build(ctx, handle, Ownership::View, false)
    }

    /// Take a native reference on this face. With a parent the duplicate is
    /// tracked there; without one it only observes the library.
    pub(crate) fn reference(&self, parent: Option<&Rc<LibraryInner>>) -> Result<Face> {
        let handle = self.inner.life.live_handle()?;
        let library = self.inner.ctx.library()?;
        if let Some(parent) = parent {
            if !Rc::ptr_eq(parent, &library) {
                return Err(FtError::InvalidArgument(
                    "face belongs to a different library".to_string(),
                ));
            }
        }
        let ctx = library.ctx()?;
        ctx.api.reference_face(handle).op("FT_Reference_Face")?;

        let tracked = Ownership::Duplicate.is_tracked(parent.is_some());
        let face = Self::build(ctx, handle, Ownership::Duplicate, tracked);
        if tracked {
            library.faces.register(&face.inner);
        } else {
            // The library frees every face it still holds on release,
            // whatever their reference counts
            let observer: Weak<dyn Disposable> = { let w = Rc::downgrade(&face.inner); w };
            library.life.add_dependent(observer);
        }
        Ok(face)
    }

    /// An extra reference to the same native face (`FT_Reference_Face`).
    ///
    /// The duplicate is released on its own disposal and is not tracked by
    /// the library, although it still turns disposed when the library is
    /// released. Use [`Library::duplicate_face`](crate::Library::duplicate_face)
    /// for a tracked one.
    pub fn duplicate(&self) -> Result<Face> {
        self.reference(None)
    }

    lifecycle_methods!();

    fn live(&self) -> Result<(NativeHandle, &Ctx)> {
        Ok((self.inner.life.handle()?, &self.inner.ctx))
    }

    /// Apply the library's default hinting target unless `flags` set one.
    fn with_default_target(&self, flags: LoadFlags) -> LoadFlags {
        match self.inner.ctx.options.default_load_target {
            Some(target) if !flags.has_explicit_target() => flags.with_target(target),
            _ => flags,
        }
    }

    // Records

    /// Snapshot of the native face record.
    pub fn record(&self) -> Result<FaceRecord> {
        let (handle, ctx) = self.live()?;
        Ok(ctx.api.face_record(handle))
    }

    record_fields! {
        num_faces: i64;
        /// Face index, with the named instance in bits 16 and up.
        face_index: i64;
        face_flags: FaceFlags;
        style_flags: StyleFlags;
        num_glyphs: i64;
        family_name: Option<String>;
        style_name: Option<String>;
        available_sizes: Vec<BitmapSize>;
        num_charmaps: i32;
        bbox: BBox;
        units_per_em: u16;
        ascender: i16;
        descender: i16;
        height: i16;
        max_advance_width: i16;
        max_advance_height: i16;
        underline_position: i16;
        underline_thickness: i16;
    }

    pub fn has_flag(&self, flag: FaceFlags) -> Result<bool> {
        Ok(self.face_flags()?.contains(flag))
    }

    // Sizing

    /// Character size in 26.6 points at `h_res` x `v_res` dpi. Zero
    /// dimensions default to the other one, zero resolutions to 72.
    pub fn set_char_size(&self, width: i64, height: i64, h_res: u32, v_res: u32) -> Result<()> {
        let (handle, ctx) = self.live()?;
        ctx.api
            .set_char_size(handle, width, height, h_res, v_res)
            .op("FT_Set_Char_Size")
    }

    pub fn set_pixel_sizes(&self, width: u32, height: u32) -> Result<()> {
        let (handle, ctx) = self.live()?;
        ctx.api.set_pixel_sizes(handle, width, height).op("FT_Set_Pixel_Sizes")
    }

    /// Select one of the face's bitmap strikes.
    pub fn select_size(&self, strike_index: i32) -> Result<()> {
        let (handle, ctx) = self.live()?;
        ctx.api.select_size(handle, strike_index).op("FT_Select_Size")
    }

    /// Scale by one of the face's metrics instead of the EM square.
    pub fn request_size(&self, request: SizeRequest) -> Result<()> {
        let (handle, ctx) = self.live()?;
        ctx.api.request_size(handle, &request).op("FT_Request_Size")
    }

    /// A new size object on this face, owned and tracked by it.
    pub fn new_size(&self) -> Result<Size> {
        let handle = self.inner.life.live_handle()?;
        let ctx = self.inner.ctx.clone();
        let size = NativeHandle::adopt("FT_New_Size", "Size", ctx.api.new_size(handle))?;
        Ok(Size::owned(ctx, size, &self.inner))
    }

    /// A view of whichever size is active.
    ///
    /// When that is an owned [`new_size`](Self::new_size) object, created
    /// through this wrapper or another one on the same native face, the view
    /// also follows that size's disposal.
    pub fn active_size(&self) -> Result<Size> {
        let (handle, ctx) = self.live()?;
        let raw = ctx.api.face_active_size(handle);
        let active = NativeHandle::new(raw).ok_or(FtError::InvalidHandle { what: "Size" })?;
        let owner = ctx.library.upgrade().and_then(|library| library.owned_size(active));
        Ok(Size::view(ctx.clone(), active, &self.inner, owner.as_ref()))
    }

    pub fn set_transform(&self, matrix: Option<Matrix>, delta: Option<Vector>) -> Result<()> {
        let (handle, ctx) = self.live()?;
        ctx.api.set_transform(handle, matrix, delta);
        Ok(())
    }

    // Glyph loading

    pub fn load_glyph(&self, glyph_index: u32, flags: LoadFlags) -> Result<()> {
        let (handle, ctx) = self.live()?;
        ctx.api
            .load_glyph(handle, glyph_index, self.with_default_target(flags))
            .op("FT_Load_Glyph")
    }

    pub fn load_char(&self, char_code: u32, flags: LoadFlags) -> Result<()> {
        let (handle, ctx) = self.live()?;
        ctx.api
            .load_char(handle, char_code, self.with_default_target(flags))
            .op("FT_Load_Char")
    }

    /// A view of the face's glyph slot.
    pub fn glyph(&self) -> Result<GlyphSlot> {
        let (handle, ctx) = self.live()?;
        let raw = ctx.api.face_glyph_slot(handle);
        let slot = NativeHandle::new(raw).ok_or(FtError::InvalidHandle { what: "GlyphSlot" })?;
        Ok(GlyphSlot::view(ctx.clone(), slot, &self.inner))
    }

    /// Glyph index for a character code in the selected charmap, zero when
    /// unmapped.
    pub fn char_index(&self, char_code: u32) -> Result<u32> {
        let (handle, ctx) = self.live()?;
        Ok(ctx.api.char_index(handle, char_code))
    }

    /// Every `(char_code, glyph_index)` pair in the selected charmap.
    pub fn chars(&self) -> Result<Chars<'_>> {
        let (handle, ctx) = self.live()?;
        Ok(Chars {
            face: self,
            next: Some(ctx.api.first_char(handle)),
        })
    }

    pub fn kerning(&self, left: u32, right: u32, mode: KerningMode) -> Result<Vector> {
        let (handle, ctx) = self.live()?;
        ctx.api.kerning(handle, left, right, mode).op("FT_Get_Kerning")
    }

    /// Advance of a glyph, 16.16 unless `flags` has `NO_SCALE`.
    pub fn advance(&self, glyph_index: u32, flags: LoadFlags) -> Result<i64> {
        let (handle, ctx) = self.live()?;
        ctx.api.advance(handle, glyph_index, flags).op("FT_Get_Advance")
    }

    pub fn glyph_name(&self, glyph_index: u32) -> Result<String> {
        let (handle, ctx) = self.live()?;
        ctx.api.glyph_name(handle, glyph_index).op("FT_Get_Glyph_Name")
    }

    pub fn name_index(&self, name: &str) -> Result<u32> {
        let (handle, ctx) = self.live()?;
        Ok(ctx.api.name_index(handle, name))
    }

    pub fn postscript_name(&self) -> Result<Option<String>> {
        let (handle, ctx) = self.live()?;
        Ok(ctx.api.postscript_name(handle))
    }

    // Charmaps

    pub fn charmaps(&self) -> Result<Vec<CharMap>> {
        let (handle, ctx) = self.live()?;
        Ok(ctx
            .api
            .face_charmaps(handle)
            .into_iter()
            .filter_map(NativeHandle::new)
            .map(|charmap| CharMap::view(ctx.clone(), charmap, &self.inner, handle))
            .collect())
    }

    /// The selected charmap, if any.
    pub fn charmap(&self) -> Result<Option<CharMap>> {
        let (handle, ctx) = self.live()?;
        Ok(NativeHandle::new(ctx.api.face_charmap(handle))
            .map(|charmap| CharMap::view(ctx.clone(), charmap, &self.inner, handle)))
    }

    pub fn select_charmap(&self, encoding: Encoding) -> Result<()> {
        let (handle, ctx) = self.live()?;
        ctx.api.select_charmap(handle, encoding).op("FT_Select_Charmap")
    }

    pub fn set_charmap(&self, charmap: &CharMap) -> Result<()> {
        let (handle, ctx) = self.live()?;
        if charmap.face_handle() != handle {
            return Err(FtError::InvalidArgument(format!(
                "charmap belongs to face {}, not {handle}",
                charmap.face_handle()
            )));
        }
        ctx.api.set_charmap(handle, charmap.handle()?).op("FT_Set_Charmap")
    }

    // SFNT and PostScript data

    /// A copy of one of the face's SFNT tables, `None` when the face lacks it.
    pub fn sfnt_table(&self, tag: SfntTag) -> Result<Option<SfntTable>> {
        let (handle, ctx) = self.live()?;
        Ok(ctx.api.sfnt_table(handle, tag))
    }

    /// Raw bytes of a table from `offset` to its end. With
    /// [`TableTag::WHOLE_FONT`] the font file is read instead.
    pub fn load_sfnt_table(&self, tag: TableTag, offset: i64) -> Result<Vec<u8>> {
        let (handle, ctx) = self.live()?;
        ctx.api.load_sfnt_table(handle, tag, offset).op("FT_Load_Sfnt_Table")
    }

    pub fn sfnt_name_count(&self) -> Result<u32> {
        let (handle, ctx) = self.live()?;
        Ok(ctx.api.sfnt_name_count(handle))
    }

    pub fn sfnt_name(&self, index: u32) -> Result<SfntName> {
        let (handle, ctx) = self.live()?;
        ctx.api.sfnt_name(handle, index).op("FT_Get_Sfnt_Name")
    }

    pub fn sfnt_names(&self) -> Result<Vec<SfntName>> {
        (0..self.sfnt_name_count()?).map(|i| self.sfnt_name(i)).collect()
    }

    pub fn ps_font_info(&self) -> Result<PsFontInfo> {
        let (handle, ctx) = self.live()?;
        ctx.api.ps_font_info(handle).op("FT_Get_PS_Font_Info")
    }

    pub fn has_ps_glyph_names(&self) -> Result<bool> {
        let (handle, ctx) = self.live()?;
        Ok(ctx.api.has_ps_glyph_names(handle))
    }

    pub fn fs_type_flags(&self) -> Result<FsTypeFlags> {
        let (handle, ctx) = self.live()?;
        Ok(ctx.api.fs_type_flags(handle))
    }

    /// Font format name as the native driver reports it ("TrueType", "CFF", ...).
    pub fn font_format(&self) -> Result<Option<String>> {
        let (handle, ctx) = self.live()?;
        Ok(ctx.api.font_format(handle))
    }

    // Variations

    pub fn mm_var(&self) -> Result<MmVar> {
        let (handle, ctx) = self.live()?;
        ctx.api.mm_var(handle).op("FT_Get_MM_Var")
    }

    /// Current design coordinates, 16.16, one per axis.
    pub fn var_design_coordinates(&self) -> Result<Vec<i64>> {
        let axes = self.mm_var()?.axes.len();
        let (handle, ctx) = self.live()?;
        ctx.api
            .var_design_coordinates(handle, axes)
            .op("FT_Get_Var_Design_Coordinates")
    }

    pub fn set_var_design_coordinates(&self, coords: &[i64]) -> Result<()> {
        let (handle, ctx) = self.live()?;
        ctx.api
            .set_var_design_coordinates(handle, coords)
            .op("FT_Set_Var_Design_Coordinates")
    }

    /// Normalized coordinates in [-1, 1], 16.16.
    pub fn set_var_blend_coordinates(&self, coords: &[i64]) -> Result<()> {
        let (handle, ctx) = self.live()?;
        ctx.api
            .set_var_blend_coordinates(handle, coords)
            .op("FT_Set_Var_Blend_Coordinates")
    }

    /// Switch to a named instance; zero selects the default instance.
    pub fn set_named_instance(&self, instance_index: u32) -> Result<()> {
        let (handle, ctx) = self.live()?;
        ctx.api
            .set_named_instance(handle, instance_index)
            .op("FT_Set_Named_Instance")
    }

    /// Attach an auxiliary file, such as AFM metrics for a Type 1 face.
    pub fn attach_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let (handle, ctx) = self.live()?;
        ctx.api.attach_file(handle, path.as_ref()).op("FT_Attach_File")
    }

    /// Sizes created with [`new_size`](Self::new_size) and still live.
    pub fn live_sizes(&self) -> usize {
        self.inner.sizes.live_count()
    }
}

impl fmt::Debug for Face {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Face")
            .field("life", &self.inner.life)
            .field("tracked", &self.inner.tracked)
            .field("sizes", &self.inner.sizes)
            .finish()
    }
}

/// Iterator over a face's character map, from [`Face::chars`].
///
/// Stops early if the face is disposed mid-iteration.
pub struct Chars<'a> {
    face: &'a Face,
    next: Option<(u32, u32)>,
}

impl std::fmt::Debug for Chars<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chars").field("next", &self.next).finish_non_exhaustive()
    }
}

impl Iterator for Chars<'_> {
    type Item = (u32, u32);

    fn next(&mut self) -> Option<Self::Item> {
        let (char_code, glyph_index) = self.next.take()?;
        if glyph_index == 0 {
            return None;
        }
        let (handle, ctx) = self.face.live().ok()?;
        self.next = Some(ctx.api.next_char(handle, char_code));
        Some((char_code, glyph_index))
    }
}
