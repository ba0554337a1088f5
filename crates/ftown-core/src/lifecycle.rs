//! The dispose protocol shared by every wrapper
//!
//! A resource is `Live` until it is disposed, then `Disposed` forever. Three
//! paths lead there:
//!
//! - an explicit `dispose()` call from client code,
//! - `Drop` of the last wrapper (the finalizer path),
//! - a cascade from the owning context, or an invalidation from the resource
//!   a view aliases.
//!
//! [`Lifecycle`] carries the state both flags need. The "entered" flag is set
//! before anything else runs, so a re-entrant dispose (a listener disposing
//! the resource that is notifying it, a cascade reaching a child that is
//! already on its way out) is a no-op. The disposal event fires before the
//! release logic, which is what lets views flip to `Disposed` while the
//! memory they alias is still valid.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Weak;

use crate::config;
use crate::error::{FtError, Result};
use crate::handle::NativeHandle;
use crate::native::NativeResult;
use crate::ownership::Ownership;

/// Why a resource is being disposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisposeKind {
    /// Client code called `dispose()`, directly or through a cascade.
    Explicit,
    /// The last wrapper was dropped while the resource was still live.
    Finalizer,
}

impl DisposeKind {
    pub fn is_explicit(self) -> bool {
        matches!(self, DisposeKind::Explicit)
    }
}

impl fmt::Display for DisposeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DisposeKind::Explicit => "explicit",
            DisposeKind::Finalizer => "finalizer",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifeState {
    Live,
    Disposed,
}

/// Anything a registry can cascade into or a source can invalidate.
pub trait Disposable {
    fn lifecycle(&self) -> &Lifecycle;

    /// Run the full protocol: event, release logic, `Disposed`.
    fn dispose_as(&self, kind: DisposeKind);

    /// The memory behind this resource is going away without our help.
    ///
    /// Marks the resource disposed without running release logic. Resources
    /// that own tracked children of their own override this to invalidate
    /// those too.
    fn invalidate(&self, kind: DisposeKind) {
        self.lifecycle().force_disposed(kind);
    }
}

type Listener = Box<dyn FnOnce(DisposeKind)>;

/// State machine behind one native handle.
pub struct Lifecycle {
    what: &'static str,
    handle: NativeHandle,
    ownership: Ownership,
    entered: Cell<bool>,
    disposed: Cell<bool>,
    listeners: RefCell<Vec<Listener>>,
    dependents: RefCell<Vec<Weak<dyn Disposable>>>,
}

impl Lifecycle {
    pub fn new(what: &'static str, handle: NativeHandle, ownership: Ownership) -> Self {
        if config::is_lifecycle_tracing_enabled() {
            log::trace!("{what} {handle} created ({ownership})");
        }
        Self {
            what,
            handle,
            ownership,
            entered: Cell::new(false),
            disposed: Cell::new(false),
            listeners: RefCell::new(Vec::new()),
            dependents: RefCell::new(Vec::new()),
        }
    }

    /// Resource category, used in error messages.
    pub fn what(&self) -> &'static str {
        self.what
    }

    pub fn ownership(&self) -> Ownership {
        self.ownership
    }

    pub fn state(&self) -> LifeState {
        if self.disposed.get() {
            LifeState::Disposed
        } else {
            LifeState::Live
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.get()
    }

    /// True from the moment disposal starts, including while it runs.
    pub fn is_disposing(&self) -> bool {
        self.entered.get()
    }

    /// The handle, for reading and operating on a live resource.
    pub fn handle(&self) -> Result<NativeHandle> {
        if self.disposed.get() {
            return Err(FtError::ObjectDisposed { what: self.what });
        }
        Ok(self.handle)
    }

    /// The handle whatever the state. For bookkeeping only, never for native
    /// calls.
    pub fn raw_handle(&self) -> NativeHandle {
        self.handle
    }

    /// The handle, for creating children.
    ///
    /// Stricter than [`handle`](Self::handle): a context that has started
    /// disposing refuses new children, since its cascade has already taken
    /// its snapshot.
    pub fn live_handle(&self) -> Result<NativeHandle> {
        if self.entered.get() {
            return Err(FtError::ObjectDisposed { what: self.what });
        }
        Ok(self.handle)
    }

    /// Subscribe to the disposal event.
    ///
    /// Returns `false` and drops the callback when the event already fired.
    pub fn on_dispose(&self, listener: impl FnOnce(DisposeKind) + 'static) -> bool {
        if self.entered.get() {
            return false;
        }
        self.listeners.borrow_mut().push(Box::new(listener));
        true
    }

    /// Register a view or other dependent that must not outlive this
    /// resource. A dependent added after disposal started is invalidated
    /// immediately.
    pub fn add_dependent(&self, dependent: Weak<dyn Disposable>) {
        if self.entered.get() {
            if let Some(dependent) = dependent.upgrade() {
                dependent.invalidate(DisposeKind::Explicit);
            }
            return;
        }
        let mut dependents = self.dependents.borrow_mut();
        dependents.retain(|d| d.strong_count() > 0);
        dependents.push(dependent);
    }

    /// Number of dependents still alive.
    pub fn dependent_count(&self) -> usize {
        self.dependents
            .borrow()
            .iter()
            .filter(|d| d.strong_count() > 0)
            .count()
    }

    /// Run the dispose protocol once.
    ///
    /// Fires the event, hands the handle to `release`, then marks the
    /// resource disposed. Returns `false` if disposal had already started.
    pub fn dispose(&self, kind: DisposeKind, release: impl FnOnce(NativeHandle)) -> bool {
        if self.entered.replace(true) {
            return false;
        }
        self.fire(kind);
        release(self.handle);
        self.disposed.set(true);
        if config::is_lifecycle_tracing_enabled() {
            log::trace!("{} {} disposed ({kind}, {})", self.what, self.handle, self.ownership);
        }
        true
    }

    /// Mark disposed without release logic. Used when the aliased or owning
    /// native memory disappears underneath this resource.
    pub fn force_disposed(&self, kind: DisposeKind) -> bool {
        if self.entered.replace(true) {
            return false;
        }
        self.fire(kind);
        self.disposed.set(true);
        if config::is_lifecycle_tracing_enabled() {
            log::trace!("{} {} invalidated ({kind})", self.what, self.handle);
        }
        true
    }

    fn fire(&self, kind: DisposeKind) {
        let listeners = std::mem::take(&mut *self.listeners.borrow_mut());
        for listener in listeners {
            listener(kind);
        }
        let dependents = std::mem::take(&mut *self.dependents.borrow_mut());
        for dependent in dependents.iter().filter_map(Weak::upgrade) {
            dependent.invalidate(kind);
        }
    }
}

impl fmt::Debug for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lifecycle")
            .field("what", &self.what)
            .field("handle", &self.handle)
            .field("ownership", &self.ownership)
            .field("state", &self.state())
            .finish()
    }
}

/// Report the outcome of a native release call.
///
/// Release entry points are not expected to fail and there is no caller to
/// return an error to on the drop path, so failures are logged. With
/// [`config::set_strict_release`] they panic instead, unless the thread is
/// already unwinding.
#[allow(clippy::panic)]
pub fn report_release(op: &'static str, what: &'static str, handle: NativeHandle, result: NativeResult<()>) {
    if let Err(code) = result {
        log::error!("{op} failed releasing {what} {handle}: {code}");
        if config::is_strict_release() && !std::thread::panicking() {
            panic!("{op} failed releasing {what} {handle}: {code}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    fn handle(raw: usize) -> NativeHandle {
        NativeHandle::new(raw).unwrap()
    }

    struct View {
        life: Lifecycle,
    }

    impl Disposable for View {
        fn lifecycle(&self) -> &Lifecycle {
            &self.life
        }

        fn dispose_as(&self, kind: DisposeKind) {
            self.life.dispose(kind, |_| {});
        }
    }

    #[test]
    fn dispose_runs_release_once() {
        let life = Lifecycle::new("Face", handle(0x10), Ownership::Owned);
        let releases = Cell::new(0);

        assert!(life.dispose(DisposeKind::Explicit, |_| releases.set(releases.get() + 1)));
        assert!(!life.dispose(DisposeKind::Explicit, |_| releases.set(releases.get() + 1)));
        assert!(!life.dispose(DisposeKind::Finalizer, |_| releases.set(releases.get() + 1)));

        assert_eq!(releases.get(), 1);
        assert_eq!(life.state(), LifeState::Disposed);
    }

    #[test]
    fn disposed_handle_access_fails() {
        let life = Lifecycle::new("Glyph", handle(0x20), Ownership::Owned);
        assert_eq!(life.handle().unwrap(), handle(0x20));

        life.dispose(DisposeKind::Explicit, |_| {});
        assert!(matches!(life.handle(), Err(FtError::ObjectDisposed { what: "Glyph" })));
    }

    #[test]
    fn handle_stays_readable_while_release_runs() {
        let life = Rc::new(Lifecycle::new("Face", handle(0x30), Ownership::Owned));
        let observed = Rc::new(Cell::new(None));

        let inner = Rc::clone(&life);
        let seen = Rc::clone(&observed);
        life.dispose(DisposeKind::Explicit, move |_| {
            seen.set(Some(inner.handle().is_ok()));
            assert!(inner.live_handle().is_err());
        });

        assert_eq!(observed.get(), Some(true));
    }

    #[test]
    fn event_fires_once_before_release() {
        let life = Rc::new(Lifecycle::new("Face", handle(0x40), Ownership::Owned));
        let order = Rc::new(RefCell::new(Vec::new()));

        let log = Rc::clone(&order);
        life.on_dispose(move |kind| log.borrow_mut().push(format!("event:{kind}")));

        let log = Rc::clone(&order);
        life.dispose(DisposeKind::Finalizer, move |_| log.borrow_mut().push("release".into()));
        life.dispose(DisposeKind::Explicit, |_| {});

        assert_eq!(*order.borrow(), vec!["event:finalizer", "release"]);
        assert!(!life.on_dispose(|_| {}));
    }

    #[test]
    fn reentrant_dispose_from_listener_is_noop() {
        let life = Rc::new(Lifecycle::new("Stroker", handle(0x50), Ownership::Owned));
        let releases = Rc::new(Cell::new(0));

        let again = Rc::clone(&life);
        let count = Rc::clone(&releases);
        life.on_dispose(move |_| {
            let count = Rc::clone(&count);
            assert!(!again.dispose(DisposeKind::Explicit, move |_| count.set(count.get() + 1)));
        });

        let count = Rc::clone(&releases);
        life.dispose(DisposeKind::Explicit, move |_| count.set(count.get() + 1));
        assert_eq!(releases.get(), 1);
    }

    #[test]
    fn dependents_flip_before_source_release() {
        let source = Lifecycle::new("Face", handle(0x60), Ownership::Owned);
        let view = Rc::new(View {
            life: Lifecycle::new("Size", handle(0x68), Ownership::View),
        });
        let as_dep: Rc<dyn Disposable> = view.clone();
        source.add_dependent(Rc::downgrade(&as_dep));
        assert_eq!(source.dependent_count(), 1);

        let watched = Rc::clone(&view);
        source.dispose(DisposeKind::Explicit, move |_| {
            assert!(watched.life.is_disposed());
        });
        assert!(view.life.handle().is_err());
    }

    #[test]
    fn late_dependent_is_invalidated_immediately() {
        let source = Lifecycle::new("Glyph", handle(0x70), Ownership::Owned);
        source.dispose(DisposeKind::Explicit, |_| {});

        let view = Rc::new(View {
            life: Lifecycle::new("Bitmap", handle(0x78), Ownership::View),
        });
        let as_dep: Rc<dyn Disposable> = view.clone();
        source.add_dependent(Rc::downgrade(&as_dep));
        assert!(view.life.is_disposed());
    }

    #[test]
    fn dropped_dependents_are_pruned() {
        let source = Lifecycle::new("Face", handle(0x80), Ownership::Owned);
        for raw in 1..=3 {
            let view: Rc<dyn Disposable> = Rc::new(View {
                life: Lifecycle::new("CharMap", handle(0x80 + raw), Ownership::View),
            });
            source.add_dependent(Rc::downgrade(&view));
        }
        assert_eq!(source.dependent_count(), 0);
        assert!(source.dependents.borrow().len() <= 1);
    }
}
