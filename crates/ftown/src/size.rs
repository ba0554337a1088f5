//! Size objects and the face's active size

use std::fmt;
use std::rc::{Rc, Weak};

use ftown_core::records::SizeMetrics;
use ftown_core::{
    report_release, Disposable, DisposeKind, FtError, Lifecycle, NativeHandle, NativeResultExt, Ownership, Result,
};

use crate::face::{Face, FaceInner};
use crate::library::Ctx;

/// Scaling state of a face.
///
/// Sizes from [`Face::new_size`] are owned by that face and released with
/// it at the latest. [`Face::active_size`] hands out views instead.
#[derive(Clone)]
pub struct Size {
    pub(crate) inner: Rc<SizeInner>,
}

pub(crate) struct SizeInner {
    ctx: Ctx,
    pub(crate) life: Lifecycle,
    face: Weak<FaceInner>,
}

impl Disposable for SizeInner {
    fn lifecycle(&self) -> &Lifecycle {
        &self.life
    }

    fn dispose_as(&self, kind: DisposeKind) {
        let disposed = self.life.dispose(kind, |handle| {
            if self.life.ownership().releases_handle() {
                report_release("FT_Done_Size", "Size", handle, self.ctx.api.done_size(handle));
            }
        });
        if disposed && self.life.ownership() == Ownership::Owned {
            if let Some(library) = self.ctx.library.upgrade() {
                library.remove_owned_size(self.life.raw_handle(), self);
            }
            if kind.is_explicit() {
                if let Some(face) = self.face.upgrade() {
                    face.sizes.unregister(self);
                }
            }
        }
    }
}

impl Drop for SizeInner {
    fn drop(&mut self) {
        self.dispose_as(DisposeKind::Finalizer);
    }
}

impl Size {
    fn build(ctx: Ctx, handle: NativeHandle, ownership: Ownership, face: &Rc<FaceInner>) -> Self {
        Size {
            inner: Rc::new(SizeInner {
                ctx,
                life: Lifecycle::new("Size", handle, ownership),
                face: Rc::downgrade(face),
            }),
        }
    }

    pub(crate) fn owned(ctx: Ctx, handle: NativeHandle, face: &Rc<FaceInner>) -> Self {
        let library = ctx.library.upgrade();
        let size = Self::build(ctx, handle, Ownership::Owned, face);
        face.sizes.register(&size.inner);
        if let Some(library) = library {
            library.add_owned_size(handle, &size.inner);
        }
        size
    }

    /// A view of `face`'s active size. `owner` is the owned size behind it,
    /// when there is one.
    pub(crate) fn view(ctx: Ctx, handle: NativeHandle, face: &Rc<FaceInner>, owner: Option<&Rc<SizeInner>>) -> Self {
        let size = Self::build(ctx, handle, Ownership::View, face);
        let dependent: Weak<dyn Disposable> = { let w = Rc::downgrade(&size.inner); w };
        if let Some(owner) = owner {
            owner.life.add_dependent(dependent.clone());
        }
        face.life.add_dependent(dependent);
        size
    }

    lifecycle_methods!();

    pub fn is_view(&self) -> bool {
        self.inner.life.ownership() == Ownership::View
    }

    pub fn metrics(&self) -> Result<SizeMetrics> {
        let handle = self.handle()?;
        Ok(self.inner.ctx.api.size_metrics(handle))
    }

    /// Make this the size glyphs of its face load at.
    pub fn activate(&self) -> Result<()> {
        let handle = self.handle()?;
        self.inner.ctx.api.activate_size(handle).op("FT_Activate_Size")
    }

    /// The face this size scales.
    pub fn face(&self) -> Result<Face> {
        self.handle()?;
        self.inner
            .face
            .upgrade()
            .map(|inner| Face { inner })
            .ok_or(FtError::ObjectDisposed { what: "Face" })
    }
}

impl fmt::Debug for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Size").field("life", &self.inner.life).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Library;
    use ftown_sim::{sample_font_bytes, SimFreeType};

    fn open() -> (Rc<SimFreeType>, Library, Face) {
        let sim = Rc::new(SimFreeType::new());
        let library = Library::with_api(sim.clone()).unwrap();
        let face = library.new_memory_face(sample_font_bytes(), 0).unwrap();
        (sim, library, face)
    }

    #[test]
    fn owned_size_releases_once_and_unregisters() {
        let (sim, _library, face) = open();
        let size = face.new_size().unwrap();
        let handle = size.handle().unwrap();
        assert_eq!(face.live_sizes(), 1);

        size.dispose();
        size.dispose();
        drop(size);
        assert_eq!(sim.calls_on("FT_Done_Size", handle), 1);
        assert_eq!(face.live_sizes(), 0);
    }

    #[test]
    fn face_disposal_cascades_into_sizes() {
        let (sim, _library, face) = open();
        let size = face.new_size().unwrap();
        let handle = size.handle().unwrap();

        face.dispose();
        assert!(size.is_disposed());
        assert!(size.metrics().unwrap_err().is_disposed());
        assert_eq!(sim.calls_on("FT_Done_Size", handle), 1);

        size.dispose();
        assert_eq!(sim.calls_on("FT_Done_Size", handle), 1);
    }

    #[test]
    fn active_size_follows_activation() {
        let (_sim, _library, face) = open();
        face.set_pixel_sizes(0, 20).unwrap();
        let default = face.active_size().unwrap();
        assert!(default.is_view());
        assert_eq!(default.metrics().unwrap().y_ppem, 20);

        let size = face.new_size().unwrap();
        size.activate().unwrap();
        face.set_pixel_sizes(0, 32).unwrap();
        assert_eq!(size.metrics().unwrap().y_ppem, 32);

        let active = face.active_size().unwrap();
        assert_eq!(active.handle().unwrap(), size.handle().unwrap());
        assert_eq!(default.metrics().unwrap().y_ppem, 20);
    }

    #[test]
    fn active_size_view_dies_with_its_owner() {
        let (sim, _library, face) = open();
        let size = face.new_size().unwrap();
        let handle = size.handle().unwrap();
        size.activate().unwrap();
        let view = face.active_size().unwrap();

        size.dispose();
        assert!(view.is_disposed());
        view.dispose();
        assert_eq!(sim.calls("FT_Done_Size"), 1);

        // The face falls back to its built-in size
        let fallback = face.active_size().unwrap();
        assert!(!fallback.is_disposed());
        assert_ne!(fallback.handle().unwrap(), handle);
    }

    #[test]
    fn view_never_releases() {
        let (sim, _library, face) = open();
        let view = face.active_size().unwrap();
        view.dispose();
        drop(view);
        assert_eq!(sim.calls("FT_Done_Size"), 0);
        assert!(face.active_size().unwrap().metrics().is_ok());
    }

    #[test]
    fn size_reports_its_face() {
        let (_sim, _library, face) = open();
        let size = face.new_size().unwrap();
        assert_eq!(size.face().unwrap().handle().unwrap(), face.handle().unwrap());

        face.dispose();
        assert!(size.face().unwrap_err().is_disposed());
    }

    #[test]
    fn dropping_the_face_releases_its_sizes() {
        let (sim, _library, face) = open();
        let size = face.new_size().unwrap();
        let handle = size.handle().unwrap();
        let face_handle = face.handle().unwrap();

        drop(face);
        assert!(size.is_disposed());
        assert_eq!(sim.calls_on("FT_Done_Size", handle), 1);
        assert_eq!(sim.calls_on("FT_Done_Face", face_handle), 1);
        assert_eq!(sim.live_count("Size"), 0);
    }
}
