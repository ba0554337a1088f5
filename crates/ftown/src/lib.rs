//! ftown - FreeType objects with tracked lifetimes
//!
//! Every FreeType object is wrapped in a cheap, clonable handle type whose
//! lifetime is tracked against the object it came from:
//!
//! - [`Library`] is the root. Faces, glyphs, outlines, bitmaps, strokers and
//!   cache managers register with it and are disposed before it is.
//! - A [`Face`] is in turn the context of the [`Size`] objects created on it.
//! - Views ([`GlyphSlot`], [`CharMap`], a face's active size, the outline
//!   inside a slot, a cached face) alias memory owned by someone else. They
//!   never free anything and turn disposed as soon as their source does.
//!
//! Disposal is explicit (`dispose()`), or happens when the last clone of a
//! wrapper is dropped. Either way it happens once; touching a disposed object
//! returns [`FtError::ObjectDisposed`] instead of reaching freed memory.
//!
//! ```
//! use std::rc::Rc;
//! use ftown::{Library, LoadFlags};
//! use ftown_sim::{sample_font_bytes, SimFreeType};
//!
//! let library = Library::with_api(Rc::new(SimFreeType::new()))?;
//! let face = library.new_memory_face(sample_font_bytes(), 0)?;
//! face.set_pixel_sizes(0, 16)?;
//! face.load_char('A' as u32, LoadFlags::DEFAULT)?;
//!
//! let slot = face.glyph()?;
//! assert_eq!(slot.record()?.glyph_index, 2);
//!
//! library.dispose();
//! assert!(face.is_disposed());
//! assert!(slot.record().unwrap_err().is_disposed());
//! # Ok::<(), ftown::FtError>(())
//! ```
//!
//! # Feature Flags
//!
//! - `freetype`: link the native library through `ftown-freetype` and enable
//!   [`Library::new`]

/// Methods every wrapper shares, forwarded to its lifecycle.
macro_rules! lifecycle_methods {
    () => {
        /// Dispose now. Later calls, and the eventual drop, do nothing.
        pub fn dispose(&self) {
            ::ftown_core::Disposable::dispose_as(&*self.inner, ::ftown_core::DisposeKind::Explicit);
        }

        pub fn is_disposed(&self) -> bool {
            ::ftown_core::Disposable::lifecycle(&*self.inner).is_disposed()
        }

        pub fn state(&self) -> ::ftown_core::LifeState {
            ::ftown_core::Disposable::lifecycle(&*self.inner).state()
        }

        pub fn ownership(&self) -> ::ftown_core::Ownership {
            ::ftown_core::Disposable::lifecycle(&*self.inner).ownership()
        }

        /// The native handle, while the object is live.
        pub fn handle(&self) -> ::ftown_core::Result<::ftown_core::NativeHandle> {
            ::ftown_core::Disposable::lifecycle(&*self.inner).handle()
        }

        /// Run `listener` once, right before the native object goes away.
        ///
        /// Returns `false` when the object is already disposed.
        pub fn on_dispose(&self, listener: impl FnOnce(::ftown_core::DisposeKind) + 'static) -> bool {
            ::ftown_core::Disposable::lifecycle(&*self.inner).on_dispose(listener)
        }
    };
}

/// Accessors for fields of the wrapper's `record()` snapshot.
macro_rules! record_fields {
    ($($(#[$meta:meta])* $name:ident: $ty:ty;)*) => {
        $(
            $(#[$meta])*
            pub fn $name(&self) -> ::ftown_core::Result<$ty> {
                Ok(self.record()?.$name)
            }
        )*
    };
}

pub mod bitmap;
pub mod cache;
pub mod charmap;
pub mod face;
pub mod glyph;
pub mod library;
pub mod outline;
pub mod size;
pub mod slot;
pub mod stroker;

pub use bitmap::Bitmap;
pub use cache::{FaceId, FaceSource, Manager};
pub use charmap::CharMap;
pub use face::{Chars, Face};
pub use glyph::{BitmapGlyph, Glyph, GlyphKind, OutlineGlyph};
pub use library::Library;
pub use outline::{Outline, PathCommand};
pub use size::Size;
pub use slot::GlyphSlot;
pub use stroker::Stroker;

pub use ftown_core::records;
pub use ftown_core::types;
pub use ftown_core::types::{
    Encoding, GlyphBBoxMode, GlyphFormat, KerningMode, LoadFlags, LoadTarget, Matrix, PixelMode, PropertyValue,
    RenderMode, SfntTag, SizeRequest, SizeRequestType, StrokerLineCap, StrokerLineJoin, TableTag, Vector,
};
pub use ftown_core::{
    config, DisposeKind, ErrorCode, FreeTypeApi, FtError, LibraryOptions, LifeState, ManagerLimits, NativeHandle,
    OutlineSink, Ownership, Result,
};

#[cfg(test)]
mod proptests;
