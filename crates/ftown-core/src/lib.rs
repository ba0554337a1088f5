//! ftown core: handles, lifetimes and the native contract
//!
//! Everything the FreeType wrappers in `ftown` share lives here, and none of
//! it knows what a face or a glyph is:
//!
//! - [`NativeHandle`] - a non-null native address, never dereferenced here
//! - [`Ownership`] - whether a handle is owned, a counted duplicate, or a view
//! - [`Lifecycle`] - the once-only dispose protocol with its event and guard
//! - [`Registry`] - the weak per-context child set that drives cascades
//! - [`FreeTypeApi`] - the native ABI, implemented by the backend crates
//!
//! ## The dispose protocol
//!
//! ```
//! use ftown_core::{DisposeKind, Lifecycle, NativeHandle, Ownership};
//!
//! let handle = NativeHandle::new(0x1000).unwrap();
//! let life = Lifecycle::new("Face", handle, Ownership::Owned);
//!
//! assert!(life.dispose(DisposeKind::Explicit, |h| println!("FT_Done_Face({h})")));
//! // Second time around nothing runs
//! assert!(!life.dispose(DisposeKind::Explicit, |_| unreachable!()));
//! assert!(life.handle().unwrap_err().is_disposed());
//! ```

pub mod config;
pub mod error;
pub mod handle;
pub mod lifecycle;
pub mod native;
pub mod ownership;
pub mod records;
pub mod registry;
pub mod types;

pub use config::LibraryOptions;
pub use error::{FtError, NativeResultExt, Result};
pub use handle::{NativeHandle, RawHandle};
pub use lifecycle::{report_release, Disposable, DisposeKind, LifeState, Lifecycle};
pub use native::{ErrorCode, FaceRequester, FreeTypeApi, ManagerLimits, NativeResult, OutlineSink};
pub use ownership::Ownership;
pub use registry::Registry;

#[cfg(test)]
mod proptests;
