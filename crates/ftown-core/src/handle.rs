//! Opaque native handles

use std::fmt;
use std::num::NonZeroUsize;

use crate::error::{FtError, NativeResultExt, Result};
use crate::native::NativeResult;

/// Address of a native object as the native ABI hands it out. Zero means null.
pub type RawHandle = usize;

/// Address of a live native object.
///
/// Never dereferenced by the core; only passed back to native entry points.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NativeHandle(NonZeroUsize);

impl NativeHandle {
    pub fn new(raw: RawHandle) -> Option<Self> {
        NonZeroUsize::new(raw).map(Self)
    }

    pub fn from_ptr<T>(ptr: *const T) -> Option<Self> {
        Self::new(ptr as usize)
    }

    /// Validate the result of a native factory call.
    ///
    /// A native error code becomes `NativeOperationFailed`, a null handle
    /// becomes `InvalidHandle`.
    pub fn adopt(op: &'static str, what: &'static str, result: NativeResult<RawHandle>) -> Result<Self> {
        let raw = result.op(op)?;
        Self::new(raw).ok_or_else(|| {
            log::debug!("{op} returned a null {what}");
            FtError::InvalidHandle { what }
        })
    }

    pub fn addr(self) -> usize {
        self.0.get()
    }

    pub fn as_ptr<T>(self) -> *mut T {
        self.0.get() as *mut T
    }
}

impl fmt::Debug for NativeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeHandle({:#x})", self.0)
    }
}

impl fmt::Display for NativeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}
