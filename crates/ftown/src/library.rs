//! The root of every lifetime tree

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::rc::{Rc, Weak};

use ftown_core::types::{LcdFilter, PropertyKind, PropertyValue, TrueTypeEngine, Version};
use ftown_core::{
    config, report_release, Disposable, DisposeKind, FreeTypeApi, FtError, LibraryOptions, Lifecycle,
    ManagerLimits, NativeHandle, NativeResultExt, Ownership, Registry, Result,
};

use crate::bitmap::{Bitmap, BitmapInner};
use crate::cache::{Manager, ManagerInner};
use crate::face::{Face, FaceInner};
use crate::glyph::GlyphInner;
use crate::outline::{Outline, OutlineInner};
use crate::size::SizeInner;
use crate::stroker::{Stroker, StrokerInner};

/// What every object needs to reach the native library.
#[derive(Clone)]
pub(crate) struct Ctx {
    pub api: Rc<dyn FreeTypeApi>,
    pub library: Weak<LibraryInner>,
    /// Valid for as long as any object holding this context is live, since
    /// the library disposes all of them before releasing itself.
    pub library_handle: NativeHandle,
    pub options: LibraryOptions,
}

impl Ctx {
    /// The library, if it is still accepting new children.
    pub fn library(&self) -> Result<Rc<LibraryInner>> {
        self.library
            .upgrade()
            .filter(|library| !library.life.is_disposing())
            .ok_or(FtError::ObjectDisposed { what: "Library" })
    }
}

impl fmt::Debug for Ctx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ctx")
            .field("backend", &self.api.name())
            .field("library", &self.library_handle)
            .finish()
    }
}

/// A FreeType library instance.
///
/// Clones share the same instance. The instance is released when
/// [`dispose`](Self::dispose) is called or the last clone is dropped; either
/// way every object created through it is disposed first.
#[derive(Clone)]
pub struct Library {
    pub(crate) inner: Rc<LibraryInner>,
}

pub(crate) struct LibraryInner {
    api: Rc<dyn FreeTypeApi>,
    options: LibraryOptions,
    pub(crate) life: Lifecycle,
    this: Weak<LibraryInner>,
    pub(crate) faces: Registry<FaceInner>,
    pub(crate) glyphs: Registry<GlyphInner>,
    pub(crate) outlines: Registry<OutlineInner>,
    pub(crate) bitmaps: Registry<BitmapInner>,
    pub(crate) strokers: Registry<StrokerInner>,
    pub(crate) managers: Registry<ManagerInner>,
    /// Every owned size, whichever face wrapper created it. Several wrappers
    /// can share one native face, and so one active size.
    owned_sizes: RefCell<HashMap<NativeHandle, Weak<SizeInner>>>,
}

impl LibraryInner {
    pub(crate) fn ctx(&self) -> Result<Ctx> {
        Ok(Ctx {
            api: Rc::clone(&self.api),
            library: self.this.clone(),
            library_handle: self.life.live_handle()?,
            options: self.options,
        })
    }

    pub(crate) fn add_owned_size(&self, handle: NativeHandle, size: &Rc<SizeInner>) {
        self.owned_sizes.borrow_mut().insert(handle, Rc::downgrade(size));
    }

    /// Forget `size`, unless a newer size has taken over its handle.
    pub(crate) fn remove_owned_size(&self, handle: NativeHandle, size: &SizeInner) {
        let mut sizes = self.owned_sizes.borrow_mut();
        let target: *const SizeInner = size;
        if sizes.get(&handle).is_some_and(|entry| entry.as_ptr() == target) {
            sizes.remove(&handle);
        }
    }

    /// The live owned size behind `handle`, if any.
    pub(crate) fn owned_size(&self, handle: NativeHandle) -> Option<Rc<SizeInner>> {
        self.owned_sizes
            .borrow()
            .get(&handle)
            .and_then(Weak::upgrade)
            .filter(|size| !size.life.is_disposed())
    }

    fn live_children(&self) -> usize {
        self.faces.live_count()
            + self.glyphs.live_count()
            + self.outlines.live_count()
            + self.bitmaps.live_count()
            + self.strokers.live_count()
            + self.managers.live_count()
    }
}

impl Disposable for LibraryInner {
    fn lifecycle(&self) -> &Lifecycle {
        &self.life
    }

    fn dispose_as(&self, kind: DisposeKind) {
        self.life.dispose(kind, |handle| {
            if kind == DisposeKind::Finalizer && config::is_leak_warnings_enabled() {
                let live = self.live_children();
                if live > 0 {
                    log::warn!("Library {handle} dropped with {live} live objects, disposing them now");
                }
            }
            // Managers first: they free their cached faces natively
            self.managers.cascade_dispose(kind);
            self.glyphs.cascade_dispose(kind);
            self.outlines.cascade_dispose(kind);
            self.bitmaps.cascade_dispose(kind);
            self.strokers.cascade_dispose(kind);
            self.faces.cascade_dispose(kind);
            report_release("FT_Done_FreeType", "Library", handle, self.api.done_library(handle));
        });
    }
}

impl Drop for LibraryInner {
    fn drop(&mut self) {
        self.dispose_as(DisposeKind::Finalizer);
    }
}

impl Library {
    /// Create a library on the native library `api` exposes.
    pub fn with_api(api: Rc<dyn FreeTypeApi>) -> Result<Self> {
        Self::with_options(api, &LibraryOptions::default())
    }

    pub fn with_options(api: Rc<dyn FreeTypeApi>, options: &LibraryOptions) -> Result<Self> {
        let handle = NativeHandle::adopt("FT_Init_FreeType", "Library", api.init_library())?;
        log::debug!("{} library {handle} created", api.name());
        let library = Library {
            inner: Rc::new_cyclic(|this| LibraryInner {
                api,
                options: *options,
                life: Lifecycle::new("Library", handle, Ownership::Owned),
                this: this.clone(),
                faces: Registry::new("faces"),
                glyphs: Registry::new("glyphs"),
                outlines: Registry::new("outlines"),
                bitmaps: Registry::new("bitmaps"),
                strokers: Registry::new("strokers"),
                managers: Registry::new("managers"),
                owned_sizes: RefCell::new(HashMap::new()),
            }),
        };
        // On failure the library drops here and is released again
        if let Some(filter) = options.lcd_filter {
            library.set_lcd_filter(filter)?;
        }
        Ok(library)
    }

    /// A library on the system FreeType, configured from the environment.
    #[cfg(feature = "freetype")]
    pub fn new() -> Result<Self> {
        let options = LibraryOptions::from_env()?;
        Self::with_options(Rc::new(ftown_freetype::FreeTypeBackend::new()), &options)
    }

    lifecycle_methods!();

    /// Name of the backend behind this library.
    pub fn backend_name(&self) -> &'static str {
        self.inner.api.name()
    }

    pub fn options(&self) -> LibraryOptions {
        self.inner.options
    }

    pub fn version(&self) -> Result<Version> {
        let handle = self.handle()?;
        Ok(self.inner.api.library_version(handle))
    }

    pub fn set_lcd_filter(&self, filter: LcdFilter) -> Result<()> {
        let handle = self.handle()?;
        self.inner.api.set_lcd_filter(handle, filter).op("FT_Library_SetLcdFilter")
    }

    pub fn truetype_engine(&self) -> Result<TrueTypeEngine> {
        let handle = self.handle()?;
        Ok(self.inner.api.truetype_engine(handle))
    }

    /// Set a property of a driver or module, e.g. `("truetype",
    /// "interpreter-version")`. Applies to faces opened afterwards.
    pub fn property_set(&self, module: &str, property: &str, value: PropertyValue) -> Result<()> {
        let handle = self.handle()?;
        log::debug!("setting property {module}.{property} to {value:?}");
        self.inner.api.property_set(handle, module, property, &value).op("FT_Property_Set")
    }

    /// Read a driver or module property. The value's shape follows from the
    /// property name; unknown names are rejected before reaching the library.
    pub fn property_get(&self, module: &str, property: &str) -> Result<PropertyValue> {
        let handle = self.handle()?;
        let kind = PropertyKind::of(property)
            .ok_or_else(|| FtError::InvalidArgument(format!("unknown property '{property}'")))?;
        self.inner.api.property_get(handle, module, property, kind).op("FT_Property_Get")
    }

    // Factories

    /// Open face `face_index` of the font file at `path`.
    ///
    /// A negative index opens nothing useful but reports the number of faces
    /// in [`Face::num_faces`].
    pub fn new_face(&self, path: impl AsRef<Path>, face_index: i64) -> Result<Face> {
        let ctx = self.inner.ctx()?;
        let handle = NativeHandle::adopt(
            "FT_New_Face",
            "Face",
            ctx.api.new_face(ctx.library_handle, path.as_ref(), face_index),
        )?;
        Ok(Face::owned(ctx, handle, &self.inner))
    }

    /// Open a face from bytes in memory. The bytes stay alive for as long as
    /// the native face does.
    pub fn new_memory_face(&self, data: impl Into<Rc<[u8]>>, face_index: i64) -> Result<Face> {
        let ctx = self.inner.ctx()?;
        let handle = NativeHandle::adopt(
            "FT_New_Memory_Face",
            "Face",
            ctx.api.new_memory_face(ctx.library_handle, data.into(), face_index),
        )?;
        Ok(Face::owned(ctx, handle, &self.inner))
    }

    /// Take an extra native reference on `face` and track it here.
    ///
    /// Unlike [`Face::duplicate`], the result is part of this library's
    /// cascade.
    pub fn duplicate_face(&self, face: &Face) -> Result<Face> {
        face.reference(Some(&self.inner))
    }

    /// Allocate an empty outline with room for `n_points` points and
    /// `n_contours` contours.
    pub fn new_outline(&self, n_points: u32, n_contours: u32) -> Result<Outline> {
        Outline::new_owned(&self.inner, n_points, n_contours)
    }

    /// Allocate an empty bitmap.
    pub fn new_bitmap(&self) -> Result<Bitmap> {
        Bitmap::new_owned(&self.inner)
    }

    pub fn new_stroker(&self) -> Result<Stroker> {
        Stroker::new_owned(&self.inner)
    }

    /// Create a cache manager. See [`Manager`].
    pub fn new_manager(&self, limits: ManagerLimits) -> Result<Manager> {
        Manager::new_owned(&self.inner, limits)
    }

    // Introspection

    pub fn live_faces(&self) -> usize {
        self.inner.faces.live_count()
    }

    pub fn live_glyphs(&self) -> usize {
        self.inner.glyphs.live_count()
    }

    pub fn live_outlines(&self) -> usize {
        self.inner.outlines.live_count()
    }

    pub fn live_bitmaps(&self) -> usize {
        self.inner.bitmaps.live_count()
    }

    pub fn live_strokers(&self) -> usize {
        self.inner.strokers.live_count()
    }

    pub fn live_managers(&self) -> usize {
        self.inner.managers.live_count()
    }
}

impl fmt::Debug for Library {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Library")
            .field("backend", &self.inner.api.name())
            .field("life", &self.inner.life)
            .field("faces", &self.inner.faces)
            .field("glyphs", &self.inner.glyphs)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ftown_core::types::LoadTarget;
    use ftown_core::ErrorCode;
    use ftown_sim::{sample_font_bytes, SimFreeType};

    fn setup() -> (Rc<SimFreeType>, Library) {
        let sim = Rc::new(SimFreeType::new());
        let library = Library::with_api(sim.clone()).unwrap();
        (sim, library)
    }

    #[test]
    fn dispose_releases_once() {
        let (sim, library) = setup();
        let handle = library.handle().unwrap();

        library.dispose();
        library.dispose();
        drop(library);

        assert_eq!(sim.calls_on("FT_Done_FreeType", handle), 1);
        assert_eq!(sim.live_objects(), 0);
    }

    #[test]
    fn last_clone_drop_releases() {
        let (sim, library) = setup();
        let clone = library.clone();
        drop(library);
        assert_eq!(sim.calls("FT_Done_FreeType"), 0);
        drop(clone);
        assert_eq!(sim.calls("FT_Done_FreeType"), 1);
    }

    #[test]
    fn init_failure_builds_nothing() {
        let sim = Rc::new(SimFreeType::new());
        sim.fail_next("FT_Init_FreeType", ErrorCode::OUT_OF_MEMORY);
        let err = Library::with_api(sim.clone()).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::OUT_OF_MEMORY));

        sim.null_next("FT_Init_FreeType");
        assert!(matches!(
            Library::with_api(sim.clone()),
            Err(FtError::InvalidHandle { what: "Library" })
        ));
        assert_eq!(sim.calls("FT_Done_FreeType"), 0);
    }

    #[test]
    fn failed_option_releases_library() {
        let sim = Rc::new(SimFreeType::new());
        sim.fail_next("FT_Library_SetLcdFilter", ErrorCode::UNIMPLEMENTED_FEATURE);
        let options = LibraryOptions::default().with_lcd_filter(LcdFilter::Default);
        assert!(Library::with_options(sim.clone(), &options).is_err());
        assert_eq!(sim.calls("FT_Done_FreeType"), 1);
        assert_eq!(sim.live_objects(), 0);
    }

    #[test]
    fn options_are_kept() {
        let sim = Rc::new(SimFreeType::new());
        let options = LibraryOptions::default().with_load_target(LoadTarget::Light);
        let library = Library::with_options(sim, &options).unwrap();
        assert_eq!(library.options().default_load_target, Some(LoadTarget::Light));
        assert_eq!(library.backend_name(), "sim");
    }

    #[test]
    fn version_and_engine() {
        let (_sim, library) = setup();
        assert_eq!(library.version().unwrap().to_string(), "2.13.2");
        assert_eq!(library.truetype_engine().unwrap(), TrueTypeEngine::Patented);

        library.dispose();
        assert!(library.version().unwrap_err().is_disposed());
    }

    #[test]
    fn properties_round_trip_through_the_library() {
        let (sim, library) = setup();
        assert_eq!(
            library.property_get("truetype", "interpreter-version").unwrap(),
            PropertyValue::UInt(40)
        );
        library.property_set("truetype", "interpreter-version", PropertyValue::UInt(35)).unwrap();
        assert_eq!(
            library.property_get("truetype", "interpreter-version").unwrap(),
            PropertyValue::UInt(35)
        );

        let darkening = PropertyValue::Darkening([500, 300, 1000, 200, 1500, 100, 2000, 0]);
        library.property_set("cff", "darkening-parameters", darkening).unwrap();
        assert_eq!(library.property_get("cff", "darkening-parameters").unwrap(), darkening);
        assert_eq!(library.property_get("type1", "no-stem-darkening").unwrap(), PropertyValue::Bool(true));

        let err = library.property_set("nope", "hinting-engine", PropertyValue::UInt(0)).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::MISSING_MODULE));
        let err = library.property_set("truetype", "hinting-engine", PropertyValue::UInt(0)).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::MISSING_PROPERTY));
        let err = library.property_set("truetype", "interpreter-version", PropertyValue::UInt(38)).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::UNIMPLEMENTED_FEATURE));

        let calls = sim.calls("FT_Property_Get");
        assert!(matches!(library.property_get("cff", "colour"), Err(FtError::InvalidArgument(_))));
        assert_eq!(sim.calls("FT_Property_Get"), calls);

        library.dispose();
        assert!(library.property_get("truetype", "interpreter-version").unwrap_err().is_disposed());
    }

    #[test]
    fn disposing_library_refuses_new_children() {
        let (_sim, library) = setup();
        let reentrant = library.clone();
        library.on_dispose(move |_| {
            let refused = reentrant.new_memory_face(sample_font_bytes(), 0);
            assert!(refused.unwrap_err().is_disposed());
        });
        library.dispose();
        assert_eq!(library.live_faces(), 0);
    }
}
