//! The glyph slot of a face

use std::fmt;
use std::rc::{Rc, Weak};

use ftown_core::records::{GlyphMetrics, GlyphSlotRecord};
use ftown_core::types::{GlyphFormat, RenderMode, Vector};
use ftown_core::{Disposable, DisposeKind, FtError, Lifecycle, NativeHandle, NativeResultExt, Ownership, Result};

use crate::bitmap::Bitmap;
use crate::face::FaceInner;
use crate::glyph::Glyph;
use crate::library::Ctx;
use crate::outline::Outline;

/// View of the slot a face loads glyphs into.
///
/// The slot is part of the face and its contents change with every load.
/// It turns disposed together with the face.
#[derive(Clone)]
pub struct GlyphSlot {
    pub(crate) inner: Rc<SlotInner>,
}

pub(crate) struct SlotInner {
    ctx: Ctx,
    life: Lifecycle,
}

impl Disposable for SlotInner {
    fn lifecycle(&self) -> &Lifecycle {
        &self.life
    }

    fn dispose_as(&self, kind: DisposeKind) {
        self.life.dispose(kind, |_| {});
    }
}

impl Drop for SlotInner {
    fn drop(&mut self) {
        self.dispose_as(DisposeKind::Finalizer);
    }
}

impl GlyphSlot {
    pub(crate) fn view(ctx: Ctx, handle: NativeHandle, face: &Rc<FaceInner>) -> Self {
        let slot = GlyphSlot {
            inner: Rc::new(SlotInner {
                ctx,
                life: Lifecycle::new("GlyphSlot", handle, Ownership::View),
            }),
        };
        let dependent: Weak<dyn Disposable> = { let w = Rc::downgrade(&slot.inner); w };
        face.life.add_dependent(dependent);
        slot
    }

    lifecycle_methods!();

    fn source(&self) -> Rc<dyn Disposable> {
        self.inner.clone()
    }

    pub fn record(&self) -> Result<GlyphSlotRecord> {
        let handle = self.handle()?;
        Ok(self.inner.ctx.api.slot_record(handle))
    }

    record_fields! {
        glyph_index: u32;
        metrics: GlyphMetrics;
        /// Unhinted advance, 16.16.
        linear_hori_advance: i64;
        linear_vert_advance: i64;
        /// Hinted advance, 26.6.
        advance: Vector;
        format: GlyphFormat;
        bitmap_left: i32;
        bitmap_top: i32;
        lsb_delta: i64;
        rsb_delta: i64;
    }

    /// Render the loaded outline into the slot's bitmap.
    pub fn render(&self, mode: RenderMode) -> Result<()> {
        let handle = self.handle()?;
        self.inner.ctx.api.render_glyph(handle, mode).op("FT_Render_Glyph")
    }

    /// View of the slot's outline. Fails unless an outline is loaded.
    pub fn outline(&self) -> Result<Outline> {
        let format = self.format()?;
        if format != GlyphFormat::Outline {
            return Err(FtError::InvalidCast {
                expected: GlyphFormat::Outline,
                actual: format,
            });
        }
        let handle = self.handle()?;
        let raw = self.inner.ctx.api.slot_outline(handle);
        let outline = NativeHandle::new(raw).ok_or(FtError::InvalidHandle { what: "Outline" })?;
        Ok(Outline::view(self.inner.ctx.clone(), outline, self.source()))
    }

    /// View of the slot's bitmap, empty until a glyph is rendered.
    pub fn bitmap(&self) -> Result<Bitmap> {
        let handle = self.handle()?;
        let raw = self.inner.ctx.api.slot_bitmap(handle);
        let bitmap = NativeHandle::new(raw).ok_or(FtError::InvalidHandle { what: "Bitmap" })?;
        Ok(Bitmap::view(self.inner.ctx.clone(), bitmap, self.source()))
    }

    /// Copy the slot's image into a standalone glyph (`FT_Get_Glyph`).
    ///
    /// The glyph is owned by the library and outlives later loads.
    pub fn glyph(&self) -> Result<Glyph> {
        let handle = self.handle()?;
        let library = self.inner.ctx.library()?;
        let ctx = library.ctx()?;
        let glyph = NativeHandle::adopt("FT_Get_Glyph", "Glyph", ctx.api.get_glyph(handle))?;
        Ok(Glyph::owned(ctx, glyph, &library))
    }
}

impl fmt::Debug for GlyphSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlyphSlot").field("life", &self.inner.life).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Face, Library, LoadFlags};
    use ftown_core::types::PixelMode;
    use ftown_core::ErrorCode;
    use ftown_sim::{sample_font_bytes, SimFreeType};

    fn loaded(size: u32) -> (Rc<SimFreeType>, Library, Face) {
        let sim = Rc::new(SimFreeType::new());
        let library = Library::with_api(sim.clone()).unwrap();
        let face = library.new_memory_face(sample_font_bytes(), 0).unwrap();
        face.set_pixel_sizes(0, size).unwrap();
        face.load_char('A' as u32, LoadFlags::DEFAULT).unwrap();
        (sim, library, face)
    }

    #[test]
    fn record_reflects_the_last_load() {
        let (_sim, _library, face) = loaded(20);
        let slot = face.glyph().unwrap();
        assert_eq!(slot.glyph_index().unwrap(), 2);
        assert_eq!(slot.format().unwrap(), GlyphFormat::Outline);
        assert_eq!(slot.advance().unwrap().x, 12 * 64);

        face.load_char('V' as u32, LoadFlags::DEFAULT).unwrap();
        assert_eq!(slot.glyph_index().unwrap(), 5);
    }

    #[test]
    fn render_fills_the_slot_bitmap() {
        let (_sim, _library, face) = loaded(20);
        let slot = face.glyph().unwrap();
        let bitmap = slot.bitmap().unwrap();
        assert_eq!(bitmap.width().unwrap(), 0);

        slot.render(RenderMode::Normal).unwrap();
        assert_eq!(slot.format().unwrap(), GlyphFormat::Bitmap);
        assert_eq!((bitmap.width().unwrap(), bitmap.rows().unwrap()), (12, 14));
        assert_eq!(bitmap.pixel_mode().unwrap(), PixelMode::Gray);
        assert!(bitmap.is_view());
    }

    #[test]
    fn outline_needs_an_outline_glyph() {
        let (_sim, _library, face) = loaded(20);
        let slot = face.glyph().unwrap();
        assert_eq!(slot.outline().unwrap().n_contours().unwrap(), 1);

        slot.render(RenderMode::Mono).unwrap();
        assert!(matches!(
            slot.outline(),
            Err(FtError::InvalidCast {
                expected: GlyphFormat::Outline,
                actual: GlyphFormat::Bitmap
            })
        ));
    }

    #[test]
    fn views_die_with_the_face() {
        let (sim, _library, face) = loaded(20);
        let slot = face.glyph().unwrap();
        let outline = slot.outline().unwrap();
        let bitmap = slot.bitmap().unwrap();

        face.dispose();
        assert!(slot.is_disposed());
        assert!(outline.is_disposed());
        assert!(bitmap.record().unwrap_err().is_disposed());

        outline.dispose();
        bitmap.dispose();
        assert_eq!(sim.calls("FT_Outline_Done"), 0);
        assert_eq!(sim.calls("FT_Bitmap_Done"), 0);
    }

    #[test]
    fn derived_views_outlive_the_slot_wrapper() {
        let (_sim, _library, face) = loaded(20);
        let outline = face.glyph().unwrap().outline().unwrap();
        assert!(!outline.is_disposed());
        assert_eq!(outline.n_points().unwrap(), 3);
    }

    #[test]
    fn slot_glyph_is_owned_by_the_library() {
        let (sim, library, face) = loaded(20);
        let glyph = face.glyph().unwrap().glyph().unwrap();
        assert_eq!(glyph.ownership(), Ownership::Owned);
        assert_eq!(library.live_glyphs(), 1);

        face.dispose();
        assert!(!glyph.is_disposed());
        assert_eq!(glyph.format().unwrap(), GlyphFormat::Outline);

        let handle = glyph.handle().unwrap();
        library.dispose();
        assert!(glyph.is_disposed());
        assert_eq!(sim.calls_on("FT_Done_Glyph", handle), 1);
        assert_eq!(sim.live_objects(), 0);
    }

    #[test]
    fn failed_get_glyph_creates_nothing() {
        let (sim, library, face) = loaded(20);
        let slot = face.glyph().unwrap();
        sim.fail_next("FT_Get_Glyph", ErrorCode::OUT_OF_MEMORY);
        assert_eq!(slot.glyph().unwrap_err().code(), Some(ErrorCode::OUT_OF_MEMORY));
        sim.null_next("FT_Get_Glyph");
        assert!(matches!(slot.glyph(), Err(FtError::InvalidHandle { what: "Glyph" })));
        assert_eq!(library.live_glyphs(), 0);
    }
}
