//! Outline strokers

use std::fmt;
use std::rc::Rc;

use ftown_core::types::{StrokerLineCap, StrokerLineJoin};
use ftown_core::{report_release, Disposable, DisposeKind, Lifecycle, NativeHandle, Ownership, Result};

use crate::library::{Ctx, LibraryInner};

/// A stroker, owned by its library. See [`Glyph::stroke`](crate::Glyph::stroke).
#[derive(Clone)]
pub struct Stroker {
    pub(crate) inner: Rc<StrokerInner>,
}

pub(crate) struct StrokerInner {
    ctx: Ctx,
    life: Lifecycle,
}

impl Disposable for StrokerInner {
    fn lifecycle(&self) -> &Lifecycle {
        &self.life
    }

    fn dispose_as(&self, kind: DisposeKind) {
        let disposed = self.life.dispose(kind, |handle| {
            report_release("FT_Stroker_Done", "Stroker", handle, self.ctx.api.done_stroker(handle));
        });
        if disposed && kind.is_explicit() {
            if let Some(library) = self.ctx.library.upgrade() {
                library.strokers.unregister(self);
            }
        }
    }
}

impl Drop for StrokerInner {
    fn drop(&mut self) {
        self.dispose_as(DisposeKind::Finalizer);
    }
}

impl Stroker {
    pub(crate) fn new_owned(library: &Rc<LibraryInner>) -> Result<Self> {
        let ctx = library.ctx()?;
        let handle = NativeHandle::adopt("FT_Stroker_New", "Stroker", ctx.api.new_stroker(ctx.library_handle))?;
        let stroker = Stroker {
            inner: Rc::new(StrokerInner {
                ctx,
                life: Lifecycle::new("Stroker", handle, Ownership::Owned),
            }),
        };
        library.strokers.register(&stroker.inner);
        Ok(stroker)
    }

    lifecycle_methods!();

    /// Configure the pen. `radius` is 26.6, `miter_limit` 16.16.
    pub fn set(&self, radius: i64, cap: StrokerLineCap, join: StrokerLineJoin, miter_limit: i64) -> Result<()> {
        let handle = self.handle()?;
        self.inner.ctx.api.stroker_set(handle, radius, cap, join, miter_limit);
        Ok(())
    }
}

impl fmt::Debug for Stroker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stroker").field("life", &self.inner.life).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Library;
    use ftown_core::ErrorCode;
    use ftown_sim::SimFreeType;

    #[test]
    fn settings_reach_the_native_stroker() {
        let sim = Rc::new(SimFreeType::new());
        let library = Library::with_api(sim.clone()).unwrap();
        let stroker = library.new_stroker().unwrap();
        stroker
            .set(96, StrokerLineCap::Round, StrokerLineJoin::MiterFixed, 4 << 16)
            .unwrap();
        assert_eq!(
            sim.stroker_settings(stroker.handle().unwrap()),
            (96, StrokerLineCap::Round, StrokerLineJoin::MiterFixed, 4 << 16)
        );
    }

    #[test]
    fn released_once_by_whoever_comes_first() {
        let sim = Rc::new(SimFreeType::new());
        let library = Library::with_api(sim.clone()).unwrap();
        let explicit = library.new_stroker().unwrap();
        let cascaded = library.new_stroker().unwrap();
        explicit.dispose();
        assert_eq!(library.live_strokers(), 1);

        library.dispose();
        assert!(cascaded.is_disposed());
        assert!(cascaded.set(0, StrokerLineCap::Butt, StrokerLineJoin::Round, 0).unwrap_err().is_disposed());
        assert_eq!(sim.calls("FT_Stroker_Done"), 2);
        assert_eq!(sim.live_objects(), 0);
    }

    #[test]
    fn factory_errors_surface() {
        let sim = Rc::new(SimFreeType::new());
        let library = Library::with_api(sim.clone()).unwrap();
        sim.fail_next("FT_Stroker_New", ErrorCode::OUT_OF_MEMORY);
        assert_eq!(library.new_stroker().unwrap_err().code(), Some(ErrorCode::OUT_OF_MEMORY));
        assert_eq!(library.live_strokers(), 0);
    }
}
