//! ftown-freetype: the native FreeType backend
//!
//! Implements [`FreeTypeApi`] on top of the system (or bundled) libfreetype
//! that `freetype-sys` links. Every unsafe dereference in ftown happens in
//! this crate; the wrappers above only ever see handles.
//!
//! Two kinds of memory are owned here rather than by FreeType:
//!
//! - the byte buffers behind memory faces, kept until the face's last
//!   reference is released,
//! - the `FT_Outline` and `FT_Bitmap` records of standalone outlines and
//!   bitmaps, which FreeType expects its caller to allocate.
//!
//! Rust callbacks (outline decomposition, the cache face requester) run
//! under `catch_unwind`. A panic becomes a non-zero error code on the native
//! side and is resumed once the native call has returned.

#![allow(unsafe_code)]

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::ffi::{c_char, CStr, CString};
use std::path::Path;
use std::rc::Rc;

use ftown_core::types::{BBox, Matrix, Vector};
use ftown_core::{ErrorCode, NativeResult};

// Link directives for libfreetype
use freetype_sys as _;

mod api;
mod callbacks;
mod ffi;
mod records;

pub const BACKEND_NAME: &str = "freetype";

struct MemoryFace {
    library: usize,
    data: Rc<[u8]>,
    refs: usize,
}

/// FreeType through its C ABI.
///
/// One backend can serve any number of libraries. It must stay at a fixed
/// address while a cache manager created through it is alive, which holding
/// it in an `Rc` guarantees.
pub struct FreeTypeBackend {
    memory_faces: RefCell<HashMap<usize, MemoryFace>>,
    managers: RefCell<HashMap<usize, Box<callbacks::RequesterData>>>,
    pending_panic: RefCell<Option<Box<dyn Any + Send>>>,
}

impl Default for FreeTypeBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl FreeTypeBackend {
    pub fn new() -> Self {
        Self {
            memory_faces: RefCell::new(HashMap::new()),
            managers: RefCell::new(HashMap::new()),
            pending_panic: RefCell::new(None),
        }
    }

    /// Number of memory faces whose bytes are still held.
    pub fn held_buffers(&self) -> usize {
        self.memory_faces.borrow().len()
    }

    fn stash_panic(&self, payload: Box<dyn Any + Send>) {
        let mut pending = self.pending_panic.borrow_mut();
        // The first panic wins; later ones are consequences of it
        if pending.is_none() {
            *pending = Some(payload);
        }
    }

    fn resume_panic(&self) {
        let payload = self.pending_panic.borrow_mut().take();
        if let Some(payload) = payload {
            std::panic::resume_unwind(payload);
        }
    }

    fn hold_buffer(&self, face: usize, library: usize, data: Rc<[u8]>) {
        // A stale entry at the same address belonged to a face the cache
        // manager closed behind our back
        self.memory_faces
            .borrow_mut()
            .insert(face, MemoryFace { library, data, refs: 1 });
    }

    fn add_buffer_ref(&self, face: usize) {
        if let Some(entry) = self.memory_faces.borrow_mut().get_mut(&face) {
            entry.refs += 1;
        }
    }

    fn drop_buffer_ref(&self, face: usize) {
        let mut faces = self.memory_faces.borrow_mut();
        if let Some(entry) = faces.get_mut(&face) {
            entry.refs -= 1;
            if entry.refs == 0 {
                faces.remove(&face);
                log::trace!("freetype: released memory face buffer of {face:#x}");
            }
        }
    }

    fn drop_library_buffers(&self, library: usize) {
        self.memory_faces.borrow_mut().retain(|_, f| f.library != library);
    }
}

impl std::fmt::Debug for FreeTypeBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FreeTypeBackend")
            .field("held_buffers", &self.held_buffers())
            .field("managers", &self.managers.borrow().len())
            .finish()
    }
}

fn check(raw: ffi::FT_Error) -> NativeResult<()> {
    ErrorCode::check(raw)
}

fn c_path(path: &Path) -> NativeResult<CString> {
    #[cfg(unix)]
    let bytes = {
        use std::os::unix::ffi::OsStrExt;
        path.as_os_str().as_bytes().to_vec()
    };
    #[cfg(not(unix))]
    let bytes = path.to_string_lossy().into_owned().into_bytes();
    CString::new(bytes).map_err(|_| ErrorCode::CANNOT_OPEN_RESOURCE)
}

/// Copy a NUL-terminated native string. Null reads as `None`.
///
/// # Safety
/// `ptr` must be null or point to a NUL-terminated string.
unsafe fn c_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    Some(unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned())
}

/// View a native array. Null or zero length reads as empty.
///
/// # Safety
/// A non-null `ptr` must point to `len` initialised values that outlive `'a`.
unsafe fn slice<'a, T>(ptr: *const T, len: usize) -> &'a [T] {
    if ptr.is_null() || len == 0 {
        return &[];
    }
    unsafe { std::slice::from_raw_parts(ptr, len) }
}

/// # Safety
/// As [`slice`], with exclusive access.
unsafe fn slice_mut<'a, T>(ptr: *mut T, len: usize) -> &'a mut [T] {
    if ptr.is_null() || len == 0 {
        return &mut [];
    }
    unsafe { std::slice::from_raw_parts_mut(ptr, len) }
}

fn opt_ptr<T>(value: &Option<T>) -> *const T {
    value.as_ref().map_or(std::ptr::null(), |v| v as *const T)
}

fn vector(v: ffi::FT_Vector) -> Vector {
    Vector::new(i64::from(v.x), i64::from(v.y))
}

fn ft_vector(v: Vector) -> ffi::FT_Vector {
    ffi::FT_Vector {
        x: v.x as ffi::FT_Pos,
        y: v.y as ffi::FT_Pos,
    }
}

fn ft_matrix(m: Matrix) -> ffi::FT_Matrix {
    ffi::FT_Matrix {
        xx: m.xx as ffi::FT_Fixed,
        xy: m.xy as ffi::FT_Fixed,
        yx: m.yx as ffi::FT_Fixed,
        yy: m.yy as ffi::FT_Fixed,
    }
}

fn bbox(b: ffi::FT_BBox) -> BBox {
    BBox {
        x_min: i64::from(b.xMin),
        y_min: i64::from(b.yMin),
        x_max: i64::from(b.xMax),
        y_max: i64::from(b.yMax),
    }
}
