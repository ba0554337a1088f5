//! Bitmaps, standalone or inside a slot or glyph

use std::fmt;
use std::rc::{Rc, Weak};

use ftown_core::records::BitmapRecord;
use ftown_core::types::PixelMode;
use ftown_core::{
    report_release, Disposable, DisposeKind, FtError, Lifecycle, NativeHandle, NativeResultExt, Ownership, Result,
};

use crate::library::{Ctx, LibraryInner};

/// A pixel bitmap.
///
/// Standalone bitmaps are owned and released with `FT_Bitmap_Done`. The
/// bitmap of a glyph slot or bitmap glyph is a view.
#[derive(Clone)]
pub struct Bitmap {
    pub(crate) inner: Rc<BitmapInner>,
}

pub(crate) struct BitmapInner {
    ctx: Ctx,
    life: Lifecycle,
    _source: Option<Rc<dyn Disposable>>,
}

impl Disposable for BitmapInner {
    fn lifecycle(&self) -> &Lifecycle {
        &self.life
    }

    fn dispose_as(&self, kind: DisposeKind) {
        let disposed = self.life.dispose(kind, |handle| {
            if self.life.ownership().releases_handle() {
                let result = self.ctx.api.done_bitmap(self.ctx.library_handle, handle);
                report_release("FT_Bitmap_Done", "Bitmap", handle, result);
            }
        });
        if disposed && kind.is_explicit() && self.life.ownership() == Ownership::Owned {
            if let Some(library) = self.ctx.library.upgrade() {
                library.bitmaps.unregister(self);
            }
        }
    }
}

impl Drop for BitmapInner {
    fn drop(&mut self) {
        self.dispose_as(DisposeKind::Finalizer);
    }
}

impl Bitmap {
    pub(crate) fn new_owned(library: &Rc<LibraryInner>) -> Result<Self> {
        let ctx = library.ctx()?;
        let handle = NativeHandle::adopt("FT_Bitmap_Init", "Bitmap", ctx.api.new_bitmap(ctx.library_handle))?;
        let bitmap = Bitmap {
            inner: Rc::new(BitmapInner {
                ctx,
                life: Lifecycle::new("Bitmap", handle, Ownership::Owned),
                _source: None,
            }),
        };
        library.bitmaps.register(&bitmap.inner);
        Ok(bitmap)
    }

    pub(crate) fn view(ctx: Ctx, handle: NativeHandle, source: Rc<dyn Disposable>) -> Self {
        let bitmap = Bitmap {
            inner: Rc::new(BitmapInner {
                ctx,
                life: Lifecycle::new("Bitmap", handle, Ownership::View),
                _source: Some(Rc::clone(&source)),
            }),
        };
        let dependent: Weak<dyn Disposable> = { let w = Rc::downgrade(&bitmap.inner); w };
        source.lifecycle().add_dependent(dependent);
        bitmap
    }

    lifecycle_methods!();

    pub fn is_view(&self) -> bool {
        self.inner.life.ownership() == Ownership::View
    }

    pub fn record(&self) -> Result<BitmapRecord> {
        let handle = self.handle()?;
        Ok(self.inner.ctx.api.bitmap_record(handle))
    }

    record_fields! {
        rows: u32;
        width: u32;
        /// Bytes per row, negative for bottom-up bitmaps.
        pitch: i32;
        pixel_mode: PixelMode;
        num_grays: u16;
    }

    /// Copy of the pixel data, `rows * |pitch|` bytes.
    pub fn buffer(&self) -> Result<Vec<u8>> {
        let handle = self.handle()?;
        Ok(self.inner.ctx.api.bitmap_buffer(handle))
    }

    /// A new owned bitmap with the same pixels.
    pub fn copy(&self) -> Result<Bitmap> {
        let handle = self.handle()?;
        let target = Bitmap::new_owned(&self.inner.ctx.library()?)?;
        let ctx = &self.inner.ctx;
        ctx.api
            .bitmap_copy(ctx.library_handle, handle, target.handle()?)
            .op("FT_Bitmap_Copy")?;
        Ok(target)
    }

    /// A new owned 8-bit gray bitmap, rows padded to `alignment` bytes.
    pub fn convert(&self, alignment: i32) -> Result<Bitmap> {
        let handle = self.handle()?;
        let target = Bitmap::new_owned(&self.inner.ctx.library()?)?;
        let ctx = &self.inner.ctx;
        ctx.api
            .bitmap_convert(ctx.library_handle, handle, target.handle()?, alignment)
            .op("FT_Bitmap_Convert")?;
        Ok(target)
    }

    /// Replace the contents with a blank 8-bit gray image, ready for
    /// [`Outline::get_bitmap`](crate::Outline::get_bitmap).
    pub fn allocate(&self, width: u32, rows: u32) -> Result<()> {
        let handle = self.handle()?;
        if self.is_view() {
            return Err(FtError::InvalidArgument(
                "cannot reallocate a bitmap owned by a slot or glyph".to_string(),
            ));
        }
        let ctx = &self.inner.ctx;
        ctx.api
            .bitmap_allocate(ctx.library_handle, handle, width, rows)
            .op("FT_Bitmap_Convert")
    }

    /// Thicken the bitmap in place by 26.6 strengths.
    ///
    /// This reallocates the pixel buffer, so only owned bitmaps accept it.
    pub fn embolden(&self, x_strength: i64, y_strength: i64) -> Result<()> {
        let handle = self.handle()?;
        if self.is_view() {
            return Err(FtError::InvalidArgument(
                "cannot embolden a bitmap owned by a slot or glyph; copy it first".to_string(),
            ));
        }
        let ctx = &self.inner.ctx;
        ctx.api
            .bitmap_embolden(ctx.library_handle, handle, x_strength, y_strength)
            .op("FT_Bitmap_Embolden")
    }
}

impl fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bitmap").field("life", &self.inner.life).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Face, Library, LoadFlags, RenderMode};
    use ftown_core::ErrorCode;
    use ftown_sim::{sample_font_bytes, SimFreeType};

    fn rendered(mode: RenderMode) -> (Rc<SimFreeType>, Library, Face, Bitmap) {
        let sim = Rc::new(SimFreeType::new());
        let library = Library::with_api(sim.clone()).unwrap();
        let face = library.new_memory_face(sample_font_bytes(), 0).unwrap();
        face.set_pixel_sizes(0, 20).unwrap();
        face.load_char('A' as u32, LoadFlags::DEFAULT).unwrap();
        let slot = face.glyph().unwrap();
        slot.render(mode).unwrap();
        let bitmap = slot.bitmap().unwrap();
        (sim, library, face, bitmap)
    }

    #[test]
    fn new_bitmap_is_empty_and_released_once() {
        let sim = Rc::new(SimFreeType::new());
        let library = Library::with_api(sim.clone()).unwrap();
        let bitmap = library.new_bitmap().unwrap();
        assert_eq!((bitmap.rows().unwrap(), bitmap.width().unwrap()), (0, 0));
        assert!(bitmap.buffer().unwrap().is_empty());

        let handle = bitmap.handle().unwrap();
        bitmap.dispose();
        drop(bitmap);
        assert_eq!(sim.calls_on("FT_Bitmap_Done", handle), 1);
        assert_eq!(library.live_bitmaps(), 0);
    }

    #[test]
    fn buffer_matches_record() {
        let (_sim, _library, _face, bitmap) = rendered(RenderMode::Normal);
        let record = bitmap.record().unwrap();
        assert_eq!(bitmap.buffer().unwrap().len(), record.buffer_len());
        assert_eq!(record.num_grays, 256);
    }

    #[test]
    fn copy_outlives_the_slot() {
        let (sim, library, face, bitmap) = rendered(RenderMode::Normal);
        let copy = bitmap.copy().unwrap();
        assert!(!copy.is_view());
        assert_eq!(copy.buffer().unwrap(), bitmap.buffer().unwrap());
        assert_eq!(library.live_bitmaps(), 1);

        face.dispose();
        assert!(bitmap.is_disposed());
        assert_eq!(copy.width().unwrap(), 12);

        library.dispose();
        assert!(copy.is_disposed());
        assert_eq!(sim.live_objects(), 0);
    }

    #[test]
    fn convert_mono_to_gray() {
        let (_sim, _library, _face, bitmap) = rendered(RenderMode::Mono);
        assert_eq!(bitmap.pixel_mode().unwrap(), PixelMode::Mono);

        let gray = bitmap.convert(4).unwrap();
        assert_eq!(gray.pixel_mode().unwrap(), PixelMode::Gray);
        assert_eq!(gray.width().unwrap(), bitmap.width().unwrap());
        assert_eq!(gray.pitch().unwrap() % 4, 0);
    }

    #[test]
    fn embolden_is_for_owned_bitmaps() {
        let (_sim, _library, _face, bitmap) = rendered(RenderMode::Normal);
        assert!(matches!(bitmap.embolden(64, 64), Err(FtError::InvalidArgument(_))));

        let copy = bitmap.copy().unwrap();
        let width = copy.width().unwrap();
        copy.embolden(64, 0).unwrap();
        assert_eq!(copy.width().unwrap(), width + 1);

        let err = copy.embolden(-64, 0).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::INVALID_ARGUMENT));
    }

    #[test]
    fn allocate_replaces_contents_with_blank_gray() {
        let (_sim, _library, _face, bitmap) = rendered(RenderMode::Mono);
        assert!(matches!(bitmap.allocate(4, 4), Err(FtError::InvalidArgument(_))));

        let copy = bitmap.copy().unwrap();
        copy.allocate(5, 3).unwrap();
        let record = copy.record().unwrap();
        assert_eq!((record.width, record.rows, record.pixel_mode), (5, 3, PixelMode::Gray));
        assert_eq!(copy.buffer().unwrap(), [0; 15]);

        copy.dispose();
        assert!(copy.allocate(1, 1).unwrap_err().is_disposed());
    }

    #[test]
    fn failed_copy_releases_the_target() {
        let (sim, library, _face, bitmap) = rendered(RenderMode::Normal);
        sim.fail_next("FT_Bitmap_Copy", ErrorCode::OUT_OF_MEMORY);
        assert_eq!(bitmap.copy().unwrap_err().code(), Some(ErrorCode::OUT_OF_MEMORY));
        assert_eq!(library.live_bitmaps(), 0);
        assert_eq!(sim.calls("FT_Bitmap_Done"), 1);
    }
}
