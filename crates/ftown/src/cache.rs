//! Cache manager: faces opened on demand and evicted by the native cache

use std::cell::RefCell;
use std::fmt;
use std::path::PathBuf;
use std::rc::{Rc, Weak};

use ftown_core::{
    report_release, Disposable, DisposeKind, ErrorCode, FaceRequester, FreeTypeApi, Lifecycle, ManagerLimits,
    NativeHandle, NativeResult, Ownership, RawHandle, Result,
};

use crate::face::{Face, FaceInner};
use crate::library::{Ctx, LibraryInner};

/// Where the manager opens a face from.
#[derive(Debug, Clone)]
pub enum FaceSource {
    File { path: PathBuf, face_index: i64 },
    Memory { data: Rc<[u8]>, face_index: i64 },
}

/// Key of a registered [`FaceSource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FaceId(usize);

impl FaceId {
    pub fn raw(self) -> usize {
        self.0
    }
}

/// Face sources by ID, consulted by the native cache on a miss.
#[derive(Default)]
struct SourceTable {
    sources: RefCell<Vec<Option<FaceSource>>>,
}

impl SourceTable {
    fn insert(&self, source: FaceSource) -> FaceId {
        let mut sources = self.sources.borrow_mut();
        sources.push(Some(source));
        // IDs start at one so none of them looks like a null pointer
        FaceId(sources.len())
    }

    fn remove(&self, id: FaceId) {
        if let Some(slot) = self.sources.borrow_mut().get_mut(id.0.wrapping_sub(1)) {
            *slot = None;
        }
    }

    fn get(&self, face_id: usize) -> Option<FaceSource> {
        self.sources.borrow().get(face_id.wrapping_sub(1)).cloned().flatten()
    }
}

impl FaceRequester for SourceTable {
    fn request_face(&self, api: &dyn FreeTypeApi, library: NativeHandle, face_id: usize) -> NativeResult<RawHandle> {
        let source = self.get(face_id).ok_or(ErrorCode::INVALID_ARGUMENT)?;
        log::debug!("Cache miss for face id {face_id}, opening {source:?}");
        match source {
            FaceSource::File { path, face_index } => api.new_face(library, &path, face_index),
            FaceSource::Memory { data, face_index } => api.new_memory_face(library, data, face_index),
        }
    }
}

/// A FreeType cache manager (`FTC_Manager`).
///
/// Register sources with [`add_source`](Self::add_source), then ask
/// for faces by ID. Faces from [`lookup_face`](Self::lookup_face) belong to
/// the cache, which may close them on any later call, so each lookup, removal
/// or reset turns the faces handed out before it disposed. Take
/// [`Face::duplicate`] to keep one longer.
#[derive(Clone)]
pub struct Manager {
    pub(crate) inner: Rc<ManagerInner>,
}

pub(crate) struct ManagerInner {
    ctx: Ctx,
    life: Lifecycle,
    sources: Rc<SourceTable>,
    lookups: RefCell<Vec<Weak<FaceInner>>>,
}

impl ManagerInner {
    fn invalidate_lookups(&self) {
        let lookups = std::mem::take(&mut *self.lookups.borrow_mut());
        for face in lookups.iter().filter_map(Weak::upgrade) {
            face.invalidate(DisposeKind::Explicit);
        }
    }
}

impl Disposable for ManagerInner {
    fn lifecycle(&self) -> &Lifecycle {
        &self.life
    }

    fn dispose_as(&self, kind: DisposeKind) {
        // Lookups are dependents and flip before the manager frees them
        let disposed = self.life.dispose(kind, |handle| {
            report_release("FTC_Manager_Done", "Manager", handle, self.ctx.api.done_manager(handle));
        });
        if disposed {
            self.lookups.borrow_mut().clear();
            if kind.is_explicit() {
                if let Some(library) = self.ctx.library.upgrade() {
                    library.managers.unregister(self);
                }
            }
        }
    }
}

impl Drop for ManagerInner {
    fn drop(&mut self) {
        self.dispose_as(DisposeKind::Finalizer);
    }
}

impl Manager {
    pub(crate) fn new_owned(library: &Rc<LibraryInner>, limits: ManagerLimits) -> Result<Self> {
        let ctx = library.ctx()?;
        let sources = Rc::new(SourceTable::default());
        let requester: Rc<dyn FaceRequester> = sources.clone();
        let handle = NativeHandle::adopt(
            "FTC_Manager_New",
            "Manager",
            ctx.api.new_manager(ctx.library_handle, limits, requester),
        )?;
        let manager = Manager {
            inner: Rc::new(ManagerInner {
                ctx,
                life: Lifecycle::new("Manager", handle, Ownership::Owned),
                sources,
                lookups: RefCell::new(Vec::new()),
            }),
        };
        library.managers.register(&manager.inner);
        Ok(manager)
    }

    lifecycle_methods!();

    /// Register a source. Nothing is opened until the first lookup.
    pub fn add_source(&self, source: FaceSource) -> Result<FaceId> {
        self.handle()?;
        Ok(self.inner.sources.insert(source))
    }

    pub fn register_file(&self, path: impl Into<PathBuf>, face_index: i64) -> Result<FaceId> {
        self.add_source(FaceSource::File {
            path: path.into(),
            face_index,
        })
    }

    pub fn register_memory(&self, data: impl Into<Rc<[u8]>>, face_index: i64) -> Result<FaceId> {
        self.add_source(FaceSource::Memory {
            data: data.into(),
            face_index,
        })
    }

    /// The cached face for `id`, opening it on a miss.
    ///
    /// Faces returned by earlier calls turn disposed.
    pub fn lookup_face(&self, id: FaceId) -> Result<Face> {
        let handle = self.handle()?;
        self.inner.invalidate_lookups();
        let face = NativeHandle::adopt(
            "FTC_Manager_LookupFace",
            "Face",
            self.inner.ctx.api.manager_lookup_face(handle, id.0),
        )?;
        let face = Face::view(self.inner.ctx.clone(), face);
        let dependent: Weak<dyn Disposable> = { let w = Rc::downgrade(&face.inner); w };
        self.inner.life.add_dependent(dependent);
        self.inner.lookups.borrow_mut().push(Rc::downgrade(&face.inner));
        Ok(face)
    }

    /// Drop `id` from the cache and forget its source.
    ///
    /// Every face returned by an earlier [`lookup_face`](Self::lookup_face)
    /// turns disposed, whatever ID it was looked up with. Faces cached for
    /// other IDs stay in the cache; look them up again to keep using them.
    pub fn remove_face(&self, id: FaceId) -> Result<()> {
        let handle = self.handle()?;
        self.inner.invalidate_lookups();
        self.inner.ctx.api.manager_remove_face(handle, id.0);
        self.inner.sources.remove(id);
        Ok(())
    }

    /// Close every cached face. Sources stay registered.
    ///
    /// As with [`remove_face`](Self::remove_face), all earlier lookups turn
    /// disposed.
    pub fn reset(&self) -> Result<()> {
        let handle = self.handle()?;
        self.inner.invalidate_lookups();
        self.inner.ctx.api.manager_reset(handle);
        Ok(())
    }
}

impl fmt::Debug for Manager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Manager")
            .field("life", &self.inner.life)
            .field("sources", &self.inner.sources.sources.borrow().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Library;
    use ftown_sim::{sample_font_bytes, SimFreeType};

    fn setup(max_faces: u32) -> (Rc<SimFreeType>, Library, Manager) {
        let sim = Rc::new(SimFreeType::new());
        let library = Library::with_api(sim.clone()).unwrap();
        let manager = library
            .new_manager(ManagerLimits {
                max_faces,
                ..ManagerLimits::default()
            })
            .unwrap();
        (sim, library, manager)
    }

    #[test]
    fn lookup_opens_once_and_hits_afterwards() {
        let (sim, _library, manager) = setup(0);
        let id = manager.register_memory(sample_font_bytes(), 0).unwrap();

        let first = manager.lookup_face(id).unwrap();
        assert_eq!(first.ownership(), Ownership::View);
        assert_eq!(first.family_name().unwrap().as_deref(), Some("Sim Sans"));
        let handle = first.handle().unwrap();

        let second = manager.lookup_face(id).unwrap();
        assert!(first.is_disposed());
        assert_eq!(second.handle().unwrap(), handle);
        assert_eq!(sim.calls("FT_New_Memory_Face"), 1);
    }

    #[test]
    fn unknown_id_reports_invalid_argument() {
        let (_sim, _library, manager) = setup(0);
        let err = manager.lookup_face(FaceId(42)).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::INVALID_ARGUMENT));
    }

    #[test]
    fn eviction_closes_the_least_recent_face() {
        let (sim, _library, manager) = setup(1);
        let a = manager.register_memory(sample_font_bytes(), 0).unwrap();
        let b = manager.register_memory(sample_font_bytes(), 1).unwrap();

        let face_a = manager.lookup_face(a).unwrap();
        let handle_a = face_a.handle().unwrap();
        let face_b = manager.lookup_face(b).unwrap();
        assert!(face_a.is_disposed());
        assert_eq!(sim.calls("FTC_Manager evict"), 1);
        assert!(sim.is_freed(handle_a));
        assert_eq!(face_b.style_name().unwrap().as_deref(), Some("Variable"));
    }

    #[test]
    fn cached_faces_are_never_released_by_the_wrapper() {
        let (sim, library, manager) = setup(0);
        let id = manager.register_memory(sample_font_bytes(), 0).unwrap();
        let face = manager.lookup_face(id).unwrap();
        face.dispose();
        drop(face);
        assert_eq!(sim.calls("FT_Done_Face"), 0);
        assert_eq!(sim.cached_faces(manager.handle().unwrap()).len(), 1);

        library.dispose();
        assert!(manager.is_disposed());
        assert_eq!(sim.calls("FTC_Manager_Done"), 1);
        assert_eq!(sim.live_objects(), 0);
    }

    #[test]
    fn manager_disposal_invalidates_lookups() {
        let (sim, library, manager) = setup(0);
        let id = manager.register_memory(sample_font_bytes(), 0).unwrap();
        let face = manager.lookup_face(id).unwrap();
        let size = face.new_size().unwrap();

        manager.dispose();
        assert!(face.is_disposed());
        assert!(size.is_disposed());
        assert_eq!(library.live_managers(), 0);
        assert!(manager.lookup_face(id).unwrap_err().is_disposed());
        assert!(manager.register_memory(sample_font_bytes(), 0).unwrap_err().is_disposed());
        // The cache freed its face and the size with it
        assert_eq!(sim.calls("FT_Done_Size"), 0);
        assert_eq!(sim.live_count("Size"), 0);
    }

    #[test]
    fn removed_sources_cannot_be_looked_up() {
        let (sim, _library, manager) = setup(0);
        let id = manager.register_memory(sample_font_bytes(), 0).unwrap();
        let face = manager.lookup_face(id).unwrap();
        let handle = face.handle().unwrap();

        manager.remove_face(id).unwrap();
        assert!(face.is_disposed());
        assert!(sim.is_freed(handle));
        assert_eq!(manager.lookup_face(id).unwrap_err().code(), Some(ErrorCode::INVALID_ARGUMENT));
    }

    #[test]
    fn removing_one_id_invalidates_lookups_of_others() {
        let (sim, _library, manager) = setup(0);
        let kept = manager.register_memory(sample_font_bytes(), 0).unwrap();
        let removed = manager.register_memory(sample_font_bytes(), 1).unwrap();
        let other = manager.lookup_face(kept).unwrap();
        let handle = other.handle().unwrap();
        manager.lookup_face(removed).unwrap();

        manager.remove_face(removed).unwrap();
        assert!(other.is_disposed());
        assert!(sim.is_live(handle));

        let again = manager.lookup_face(kept).unwrap();
        assert_eq!(again.handle().unwrap(), handle);
        assert_eq!(sim.calls("FT_New_Memory_Face"), 2);
    }

    #[test]
    fn duplicates_survive_a_reset() {
        let (sim, library, manager) = setup(0);
        let id = manager.register_memory(sample_font_bytes(), 0).unwrap();
        let cached = manager.lookup_face(id).unwrap();
        let kept = cached.duplicate().unwrap();
        let handle = kept.handle().unwrap();
        assert_eq!(sim.face_refcount(handle), 2);

        manager.reset().unwrap();
        assert!(cached.is_disposed());
        assert!(!kept.is_disposed());
        assert_eq!(kept.num_glyphs().unwrap(), 6);

        kept.dispose();
        assert!(sim.is_freed(handle));
        assert_eq!(library.live_faces(), 0);
    }

    #[test]
    fn missing_file_fails_the_lookup() {
        let (_sim, _library, manager) = setup(0);
        let id = manager.register_file("/nonexistent/font.simf", 0).unwrap();
        let err = manager.lookup_face(id).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::CANNOT_OPEN_RESOURCE));
    }
}
