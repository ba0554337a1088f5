//! Standalone glyph images

use std::fmt;
use std::rc::Rc;

use ftown_core::records::GlyphRecord;
use ftown_core::types::{BBox, GlyphBBoxMode, GlyphFormat, Matrix, RenderMode, Vector};
use ftown_core::{
    report_release, Disposable, DisposeKind, FreeTypeApi, FtError, Lifecycle, NativeHandle, NativeResult,
    NativeResultExt, Ownership, RawHandle, Result,
};

use crate::bitmap::Bitmap;
use crate::library::{Ctx, LibraryInner};
use crate::outline::Outline;
use crate::stroker::Stroker;

/// A glyph image detached from its face, owned by the library.
///
/// Conversions that may replace the native glyph ([`to_bitmap`](Self::to_bitmap),
/// [`stroke`](Self::stroke), [`stroke_border`](Self::stroke_border)) follow
/// one contract: when nothing needed replacing they return this glyph again;
/// otherwise they return a new glyph, and with `destroy` this one is
/// consumed by the native call and turns disposed.
#[derive(Clone)]
pub struct Glyph {
    pub(crate) inner: Rc<GlyphInner>,
}

pub(crate) struct GlyphInner {
    ctx: Ctx,
    life: Lifecycle,
}

impl Disposable for GlyphInner {
    fn lifecycle(&self) -> &Lifecycle {
        &self.life
    }

    fn dispose_as(&self, kind: DisposeKind) {
        let disposed = self.life.dispose(kind, |handle| {
            report_release("FT_Done_Glyph", "Glyph", handle, self.ctx.api.done_glyph(handle));
        });
        if disposed && kind.is_explicit() {
            self.unregister();
        }
    }
}

impl GlyphInner {
    fn unregister(&self) {
        if let Some(library) = self.ctx.library.upgrade() {
            library.glyphs.unregister(self);
        }
    }
}

impl Drop for GlyphInner {
    fn drop(&mut self) {
        self.dispose_as(DisposeKind::Finalizer);
    }
}

impl Glyph {
    pub(crate) fn owned(ctx: Ctx, handle: NativeHandle, library: &LibraryInner) -> Self {
        let glyph = Glyph {
            inner: Rc::new(GlyphInner {
                ctx,
                life: Lifecycle::new("Glyph", handle, Ownership::Owned),
            }),
        };
        library.glyphs.register(&glyph.inner);
        glyph
    }

    lifecycle_methods!();

    fn source(&self) -> Rc<dyn Disposable> {
        self.inner.clone()
    }

    pub fn record(&self) -> Result<GlyphRecord> {
        let handle = self.handle()?;
        Ok(self.inner.ctx.api.glyph_record(handle))
    }

    record_fields! {
        format: GlyphFormat;
        /// Advance, 16.16.
        advance: Vector;
    }

    /// An independent copy (`FT_Glyph_Copy`).
    pub fn copy(&self) -> Result<Glyph> {
        let handle = self.handle()?;
        let library = self.inner.ctx.library()?;
        let ctx = library.ctx()?;
        let copy = NativeHandle::adopt("FT_Glyph_Copy", "Glyph", ctx.api.glyph_copy(handle))?;
        Ok(Glyph::owned(ctx, copy, &library))
    }

    /// Transform an outline glyph in place.
    pub fn transform(&self, matrix: Option<Matrix>, delta: Option<Vector>) -> Result<()> {
        let handle = self.handle()?;
        self.inner
            .ctx
            .api
            .glyph_transform(handle, matrix, delta)
            .op("FT_Glyph_Transform")
    }

    pub fn cbox(&self, mode: GlyphBBoxMode) -> Result<BBox> {
        let handle = self.handle()?;
        Ok(self.inner.ctx.api.glyph_cbox(handle, mode))
    }

    /// Render into a bitmap glyph (`FT_Glyph_To_Bitmap`).
    pub fn to_bitmap(&self, mode: RenderMode, origin: Option<Vector>, destroy: bool) -> Result<Glyph> {
        self.replace("FT_Glyph_To_Bitmap", destroy, |api, glyph| {
            api.glyph_to_bitmap(glyph, mode, origin, destroy)
        })
    }

    /// Stroke both borders of an outline glyph (`FT_Glyph_Stroke`).
    pub fn stroke(&self, stroker: &Stroker, destroy: bool) -> Result<Glyph> {
        let stroker = stroker.handle()?;
        self.replace("FT_Glyph_Stroke", destroy, |api, glyph| api.glyph_stroke(glyph, stroker, destroy))
    }

    /// Stroke only the inside or outside border (`FT_Glyph_StrokeBorder`).
    pub fn stroke_border(&self, stroker: &Stroker, inside: bool, destroy: bool) -> Result<Glyph> {
        let stroker = stroker.handle()?;
        self.replace("FT_Glyph_StrokeBorder", destroy, |api, glyph| {
            api.glyph_stroke_border(glyph, stroker, inside, destroy)
        })
    }

    fn replace(
        &self,
        op: &'static str,
        destroy: bool,
        call: impl FnOnce(&dyn FreeTypeApi, NativeHandle) -> NativeResult<RawHandle>,
    ) -> Result<Glyph> {
        let handle = self.handle()?;
        let library = self.inner.ctx.library()?;
        let ctx = library.ctx()?;
        let result = NativeHandle::adopt(op, "Glyph", call(&*ctx.api, handle))?;
        if result == handle {
            return Ok(self.clone());
        }
        if destroy {
            self.retire();
        }
        Ok(Glyph::owned(ctx, result, &library))
    }

    /// The native call already freed this glyph.
    fn retire(&self) {
        if self.inner.life.force_disposed(DisposeKind::Explicit) {
            self.inner.unregister();
        }
    }

    /// Downcast by native format.
    pub fn kind(&self) -> Result<GlyphKind> {
        Ok(match self.format()? {
            GlyphFormat::Bitmap => GlyphKind::Bitmap(BitmapGlyph { root: self.clone() }),
            GlyphFormat::Outline => GlyphKind::Outline(OutlineGlyph { root: self.clone() }),
            _ => GlyphKind::Other(self.clone()),
        })
    }
}

impl fmt::Debug for Glyph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Glyph").field("life", &self.inner.life).finish()
    }
}

/// A [`Glyph`] by format.
#[derive(Debug, Clone)]
pub enum GlyphKind {
    Bitmap(BitmapGlyph),
    Outline(OutlineGlyph),
    Other(Glyph),
}

fn cast(glyph: &Glyph, expected: GlyphFormat) -> Result<Glyph> {
    let actual = glyph.format()?;
    if actual != expected {
        return Err(FtError::InvalidCast { expected, actual });
    }
    Ok(glyph.clone())
}

/// A glyph known to hold a bitmap. Shares its lifetime with the root glyph.
#[derive(Debug, Clone)]
pub struct BitmapGlyph {
    root: Glyph,
}

impl TryFrom<&Glyph> for BitmapGlyph {
    type Error = FtError;

    fn try_from(glyph: &Glyph) -> Result<Self> {
        Ok(BitmapGlyph {
            root: cast(glyph, GlyphFormat::Bitmap)?,
        })
    }
}

impl BitmapGlyph {
    pub fn root(&self) -> &Glyph {
        &self.root
    }

    pub fn dispose(&self) {
        self.root.dispose();
    }

    pub fn is_disposed(&self) -> bool {
        self.root.is_disposed()
    }

    /// Left bearing of the bitmap, in pixels.
    pub fn left(&self) -> Result<i32> {
        let handle = self.root.handle()?;
        Ok(self.root.inner.ctx.api.bitmap_glyph_record(handle).left)
    }

    /// Top bearing of the bitmap, in pixels, upwards.
    pub fn top(&self) -> Result<i32> {
        let handle = self.root.handle()?;
        Ok(self.root.inner.ctx.api.bitmap_glyph_record(handle).top)
    }

    /// View of the glyph's bitmap.
    pub fn bitmap(&self) -> Result<Bitmap> {
        let handle = self.root.handle()?;
        let ctx = &self.root.inner.ctx;
        let raw = ctx.api.bitmap_glyph_bitmap(handle);
        let bitmap = NativeHandle::new(raw).ok_or(FtError::InvalidHandle { what: "Bitmap" })?;
        Ok(Bitmap::view(ctx.clone(), bitmap, self.root.source()))
    }
}

/// A glyph known to hold an outline. Shares its lifetime with the root glyph.
#[derive(Debug, Clone)]
pub struct OutlineGlyph {
    root: Glyph,
}

impl TryFrom<&Glyph> for OutlineGlyph {
    type Error = FtError;

    fn try_from(glyph: &Glyph) -> Result<Self> {
        Ok(OutlineGlyph {
            root: cast(glyph, GlyphFormat::Outline)?,
        })
    }
}

impl OutlineGlyph {
    pub fn root(&self) -> &Glyph {
        &self.root
    }

    pub fn dispose(&self) {
        self.root.dispose();
    }

    pub fn is_disposed(&self) -> bool {
        self.root.is_disposed()
    }

    /// View of the glyph's outline.
    pub fn outline(&self) -> Result<Outline> {
        let handle = self.root.handle()?;
        let ctx = &self.root.inner.ctx;
        let raw = ctx.api.outline_glyph_outline(handle);
        let outline = NativeHandle::new(raw).ok_or(FtError::InvalidHandle { what: "Outline" })?;
        Ok(Outline::view(ctx.clone(), outline, self.root.source()))
    }
}
