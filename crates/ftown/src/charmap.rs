//! Character maps of a face

use std::fmt;
use std::rc::{Rc, Weak};

use ftown_core::records::CharMapRecord;
use ftown_core::types::Encoding;
use ftown_core::{Disposable, DisposeKind, FtError, Lifecycle, NativeHandle, Ownership, Result};

use crate::face::{Face, FaceInner};
use crate::library::Ctx;

/// View of one of a face's character maps.
#[derive(Clone)]
pub struct CharMap {
    pub(crate) inner: Rc<CharMapInner>,
}

pub(crate) struct CharMapInner {
    ctx: Ctx,
    life: Lifecycle,
    face: Weak<FaceInner>,
    face_handle: NativeHandle,
}

impl Disposable for CharMapInner {
    fn lifecycle(&self) -> &Lifecycle {
        &self.life
    }

    fn dispose_as(&self, kind: DisposeKind) {
        self.life.dispose(kind, |_| {});
    }
}

impl Drop for CharMapInner {
    fn drop(&mut self) {
        self.dispose_as(DisposeKind::Finalizer);
    }
}

impl CharMap {
    pub(crate) fn view(ctx: Ctx, handle: NativeHandle, face: &Rc<FaceInner>, face_handle: NativeHandle) -> Self {
        let charmap = CharMap {
            inner: Rc::new(CharMapInner {
                ctx,
                life: Lifecycle::new("CharMap", handle, Ownership::View),
                face: Rc::downgrade(face),
                face_handle,
            }),
        };
        let dependent: Weak<dyn Disposable> = { let w = Rc::downgrade(&charmap.inner); w };
        face.life.add_dependent(dependent);
        charmap
    }

    lifecycle_methods!();

    /// Handle of the face this charmap belongs to.
    pub(crate) fn face_handle(&self) -> NativeHandle {
        self.inner.face_handle
    }

    pub fn record(&self) -> Result<CharMapRecord> {
        let handle = self.handle()?;
        Ok(self.inner.ctx.api.charmap_record(handle))
    }

    record_fields! {
        encoding: Encoding;
        platform_id: u16;
        encoding_id: u16;
    }

    /// Position in the face's charmap table.
    pub fn index(&self) -> Result<i32> {
        let handle = self.handle()?;
        Ok(self.inner.ctx.api.charmap_index(handle))
    }

    pub fn face(&self) -> Result<Face> {
        self.handle()?;
        self.inner
            .face
            .upgrade()
            .map(|inner| Face { inner })
            .ok_or(FtError::ObjectDisposed { what: "Face" })
    }
}

impl fmt::Debug for CharMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CharMap")
            .field("life", &self.inner.life)
            .field("face", &self.inner.face_handle)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Library;
    use ftown_sim::{sample_font_bytes, SimFreeType};

    #[test]
    fn records_describe_the_tables() {
        let library = Library::with_api(Rc::new(SimFreeType::new())).unwrap();
        let face = library.new_memory_face(sample_font_bytes(), 0).unwrap();
        let charmaps = face.charmaps().unwrap();

        let unicode = &charmaps[0];
        assert_eq!(unicode.encoding().unwrap(), Encoding::UNICODE);
        assert_eq!((unicode.platform_id().unwrap(), unicode.encoding_id().unwrap()), (3, 1));
        assert_eq!(unicode.index().unwrap(), 0);
        assert_eq!(unicode.face().unwrap().handle().unwrap(), face.handle().unwrap());

        let roman = &charmaps[1];
        assert_eq!(roman.encoding().unwrap(), Encoding::APPLE_ROMAN);
        assert_eq!(roman.platform_id().unwrap(), 1);
    }

    #[test]
    fn charmaps_die_with_the_face() {
        let library = Library::with_api(Rc::new(SimFreeType::new())).unwrap();
        let face = library.new_memory_face(sample_font_bytes(), 0).unwrap();
        let charmap = face.charmap().unwrap().unwrap();
        face.dispose();
        assert!(charmap.is_disposed());
        assert!(charmap.encoding().unwrap_err().is_disposed());
        assert!(charmap.face().unwrap_err().is_disposed());
    }
}
