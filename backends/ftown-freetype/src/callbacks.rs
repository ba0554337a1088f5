//! Rust callbacks handed to FreeType
//!
//! Nothing may unwind through a native frame. Each trampoline catches
//! panics, parks them, and returns a non-zero code so FreeType stops; the
//! Rust side resumes the panic once the native call is back.

use std::any::Any;
use std::ffi::{c_int, c_void};
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use ftown_core::{ErrorCode, FaceRequester, NativeHandle, NativeResult, OutlineSink};

use crate::ffi::*;
use crate::{vector, FreeTypeBackend};

/// Returned to FreeType when a callback panicked.
const CALLBACK_PANICKED: c_int = ErrorCode::INVALID_ARGUMENT.0;

/// What the cache manager's `req_data` points at.
pub(crate) struct RequesterData {
    pub(crate) backend: *const FreeTypeBackend,
    pub(crate) requester: Rc<dyn FaceRequester>,
}

pub(crate) unsafe extern "C" fn request_face(
    face_id: FTC_FaceID,
    library: FT_Library,
    req_data: FT_Pointer,
    aface: *mut FT_Face,
) -> FT_Error {
    // SAFETY: req_data is the boxed RequesterData registered with the
    // manager, alive until FTC_Manager_Done.
    let data = unsafe { &*req_data.cast::<RequesterData>() };
    let backend = unsafe { &*data.backend };
    let Some(library) = NativeHandle::from_ptr(library) else {
        return ErrorCode::INVALID_LIBRARY_HANDLE.0;
    };

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        data.requester.request_face(backend, library, face_id as usize)
    }));
    match outcome {
        Ok(Ok(face)) => {
            unsafe { *aface = face as FT_Face };
            0
        }
        Ok(Err(code)) => nonzero(code),
        Err(payload) => {
            backend.stash_panic(payload);
            CALLBACK_PANICKED
        }
    }
}

fn nonzero(code: ErrorCode) -> c_int {
    if code == ErrorCode::OK {
        ErrorCode::INVALID_ARGUMENT.0
    } else {
        code.0
    }
}

struct Walk<'a> {
    sink: &'a mut dyn OutlineSink,
    error: Option<ErrorCode>,
    panic: Option<Box<dyn Any + Send>>,
}

impl Walk<'_> {
    fn step(&mut self, f: impl FnOnce(&mut dyn OutlineSink) -> NativeResult<()>) -> c_int {
        let sink = &mut *self.sink;
        match panic::catch_unwind(AssertUnwindSafe(|| f(sink))) {
            Ok(Ok(())) => 0,
            Ok(Err(code)) => {
                self.error = Some(code);
                nonzero(code)
            }
            Err(payload) => {
                self.panic = Some(payload);
                CALLBACK_PANICKED
            }
        }
    }
}

/// # Safety
/// `user` must be the `Walk` passed to `FT_Outline_Decompose`.
unsafe fn walk<'a>(user: *mut c_void) -> &'a mut Walk<'a> {
    unsafe { &mut *user.cast::<Walk<'a>>() }
}

unsafe extern "C" fn move_to(to: *const FT_Vector, user: *mut c_void) -> c_int {
    let to = vector(unsafe { *to });
    unsafe { walk(user) }.step(|sink| sink.move_to(to))
}

unsafe extern "C" fn line_to(to: *const FT_Vector, user: *mut c_void) -> c_int {
    let to = vector(unsafe { *to });
    unsafe { walk(user) }.step(|sink| sink.line_to(to))
}

unsafe extern "C" fn conic_to(control: *const FT_Vector, to: *const FT_Vector, user: *mut c_void) -> c_int {
    let (control, to) = unsafe { (vector(*control), vector(*to)) };
    unsafe { walk(user) }.step(|sink| sink.conic_to(control, to))
}

unsafe extern "C" fn cubic_to(
    control1: *const FT_Vector,
    control2: *const FT_Vector,
    to: *const FT_Vector,
    user: *mut c_void,
) -> c_int {
    let (c1, c2, to) = unsafe { (vector(*control1), vector(*control2), vector(*to)) };
    unsafe { walk(user) }.step(|sink| sink.cubic_to(c1, c2, to))
}

/// Walk an outline into `sink`, in the outline's own units.
pub(crate) fn decompose(outline: NativeHandle, sink: &mut dyn OutlineSink) -> NativeResult<()> {
    let funcs = FT_Outline_Funcs {
        move_to,
        line_to,
        conic_to,
        cubic_to,
        shift: 0,
        delta: 0,
    };
    let mut walk = Walk {
        sink,
        error: None,
        panic: None,
    };
    let raw = unsafe {
        FT_Outline_Decompose(
            outline.as_ptr::<FT_Outline>(),
            &funcs,
            (&mut walk as *mut Walk<'_>).cast::<c_void>(),
        )
    };
    if let Some(payload) = walk.panic.take() {
        panic::resume_unwind(payload);
    }
    if let Some(code) = walk.error {
        return Err(code);
    }
    ErrorCode::check(raw)
}
