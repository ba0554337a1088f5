//! Per-context sets of children, used to drive cascading disposal

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::lifecycle::{Disposable, DisposeKind};

/// Weak set of the children one context produced in one category.
///
/// Entries are keyed by the child's address, so registering and
/// unregistering are constant time. Entries never keep a child alive. A child
/// dropped without an explicit dispose leaves a dead entry behind; dead
/// entries are pruned once the map doubles past the live count seen at the
/// last prune. Once the registry has cascaded it is closed: unregistration
/// and registration become no-ops.
pub struct Registry<T: Disposable> {
    category: &'static str,
    entries: RefCell<HashMap<usize, Weak<T>>>,
    /// Map size that triggers the next prune.
    prune_at: Cell<usize>,
    closed: Cell<bool>,
}

const MIN_PRUNE_AT: usize = 32;

fn key<T>(child: *const T) -> usize {
    child as usize
}

impl<T: Disposable> Registry<T> {
    pub fn new(category: &'static str) -> Self {
        Self {
            category,
            entries: RefCell::new(HashMap::new()),
            prune_at: Cell::new(MIN_PRUNE_AT),
            closed: Cell::new(false),
        }
    }

    pub fn category(&self) -> &'static str {
        self.category
    }

    /// True once [`cascade_dispose`](Self::cascade_dispose) or
    /// [`invalidate_all`](Self::invalidate_all) has started.
    pub fn is_closed(&self) -> bool {
        self.closed.get()
    }

    /// Add a child. Adding the same child twice keeps one entry.
    pub fn register(&self, child: &Rc<T>) {
        if self.closed.get() {
            log::warn!("{} registry is closed, not tracking new child", self.category);
            return;
        }
        let mut entries = self.entries.borrow_mut();
        // A dead entry pins its allocation, so a live child never shares a key with one
        entries.insert(key(Rc::as_ptr(child)), Rc::downgrade(child));
        if entries.len() >= self.prune_at.get() {
            entries.retain(|_, entry| entry.strong_count() > 0);
            self.prune_at.set((entries.len() * 2).max(MIN_PRUNE_AT));
        }
    }

    /// Remove a child. Returns `false` when it was absent or the registry is
    /// cascading, in which case nothing changes.
    pub fn unregister(&self, child: &T) -> bool {
        if self.closed.get() {
            return false;
        }
        let target: *const T = child;
        self.entries.borrow_mut().remove(&key(target)).is_some()
    }

    pub fn contains(&self, child: &T) -> bool {
        let target: *const T = child;
        self.entries
            .borrow()
            .get(&key(target))
            .is_some_and(|entry| entry.strong_count() > 0)
    }

    /// Children that are registered and still alive.
    pub fn live_count(&self) -> usize {
        self.entries
            .borrow()
            .values()
            .filter(|entry| entry.strong_count() > 0)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.live_count() == 0
    }

    /// Strong references to every live child.
    pub fn snapshot(&self) -> Vec<Rc<T>> {
        self.entries.borrow().values().filter_map(Weak::upgrade).collect()
    }

    /// Dispose every live child, then clear. Returns how many were disposed.
    ///
    /// Works on a snapshot, so children may freely touch the registry while
    /// they dispose.
    pub fn cascade_dispose(&self, kind: DisposeKind) -> usize {
        let children = self.close();
        for child in &children {
            child.dispose_as(kind);
        }
        if !children.is_empty() {
            log::debug!("cascaded {kind} dispose to {} {}", children.len(), self.category);
        }
        children.len()
    }

    /// Force every live child to `Disposed` without running release logic.
    ///
    /// For children whose native memory is freed by someone else, such as the
    /// sizes of a face owned by a cache manager.
    pub fn invalidate_all(&self, kind: DisposeKind) -> usize {
        let children = self.close();
        for child in &children {
            child.invalidate(kind);
        }
        children.len()
    }

    fn close(&self) -> Vec<Rc<T>> {
        self.closed.set(true);
        let entries = std::mem::take(&mut *self.entries.borrow_mut());
        entries.values().filter_map(Weak::upgrade).collect()
    }
}

impl<T: Disposable> fmt::Debug for Registry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("category", &self.category)
            .field("live", &self.live_count())
            .field("closed", &self.closed.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle::NativeHandle;
    use crate::lifecycle::Lifecycle;
    use crate::ownership::Ownership;

    struct Child {
        life: Lifecycle,
        parent: Weak<Registry<Child>>,
        releases: Rc<Cell<usize>>,
    }

    impl Child {
        fn new(raw: usize, parent: &Rc<Registry<Child>>, releases: &Rc<Cell<usize>>) -> Rc<Self> {
            let child = Rc::new(Self {
                life: Lifecycle::new("Glyph", NativeHandle::new(raw).unwrap(), Ownership::Owned),
                parent: Rc::downgrade(parent),
                releases: Rc::clone(releases),
            });
            parent.register(&child);
            child
        }
    }

    impl Disposable for Child {
        fn lifecycle(&self) -> &Lifecycle {
            &self.life
        }

        fn dispose_as(&self, kind: DisposeKind) {
            let releases = &self.releases;
            if self.life.dispose(kind, |_| releases.set(releases.get() + 1)) && kind.is_explicit() {
                if let Some(parent) = self.parent.upgrade() {
                    parent.unregister(self);
                }
            }
        }
    }

    impl Drop for Child {
        fn drop(&mut self) {
            self.dispose_as(DisposeKind::Finalizer);
        }
    }

    #[test]
    fn register_is_idempotent() {
        let registry = Rc::new(Registry::new("glyphs"));
        let releases = Rc::new(Cell::new(0));
        let child = Child::new(0x10, &registry, &releases);

        registry.register(&child);
        registry.register(&child);
        assert_eq!(registry.live_count(), 1);
        assert!(registry.contains(&child));
    }

    #[test]
    fn explicit_dispose_unregisters() {
        let registry = Rc::new(Registry::new("glyphs"));
        let releases = Rc::new(Cell::new(0));
        let a = Child::new(0x10, &registry, &releases);
        let b = Child::new(0x20, &registry, &releases);

        a.dispose_as(DisposeKind::Explicit);
        assert!(!registry.contains(&a));
        assert!(registry.contains(&b));
        assert!(!registry.unregister(&a));
    }

    #[test]
    fn cascade_disposes_each_child_once_and_clears() {
        let registry = Rc::new(Registry::new("glyphs"));
        let releases = Rc::new(Cell::new(0));
        let children: Vec<_> = (1..=5).map(|i| Child::new(i * 0x10, &registry, &releases)).collect();

        assert_eq!(registry.cascade_dispose(DisposeKind::Explicit), 5);
        assert_eq!(releases.get(), 5);
        assert!(registry.is_empty());
        assert!(registry.is_closed());
        assert!(children.iter().all(|c| c.life.is_disposed()));

        drop(children);
        assert_eq!(releases.get(), 5);
    }

    #[test]
    fn dropped_children_leave_no_live_entry() {
        let registry = Rc::new(Registry::new("outlines"));
        let releases = Rc::new(Cell::new(0));
        let kept = Child::new(0x10, &registry, &releases);
        drop(Child::new(0x20, &registry, &releases));

        assert_eq!(releases.get(), 1);
        assert_eq!(registry.live_count(), 1);
        assert_eq!(registry.cascade_dispose(DisposeKind::Explicit), 1);
        assert!(kept.life.is_disposed());
    }

    #[test]
    fn invalidate_all_skips_release() {
        let registry = Rc::new(Registry::new("sizes"));
        let releases = Rc::new(Cell::new(0));
        let child = Child::new(0x10, &registry, &releases);

        assert_eq!(registry.invalidate_all(DisposeKind::Explicit), 1);
        assert!(child.life.is_disposed());
        drop(child);
        assert_eq!(releases.get(), 0);
    }

    #[test]
    fn dead_entries_do_not_accumulate() {
        let registry = Rc::new(Registry::new("glyphs"));
        let releases = Rc::new(Cell::new(0));
        let kept = Child::new(0x10, &registry, &releases);
        for i in 0..10_000 {
            drop(Child::new(0x100 + i, &registry, &releases));
            assert!(registry.entries.borrow().len() <= MIN_PRUNE_AT);
        }
        assert_eq!(releases.get(), 10_000);
        assert_eq!(registry.live_count(), 1);
        assert!(registry.contains(&kept));
    }

    #[test]
    fn many_children_register_and_leave_individually() {
        let registry = Rc::new(Registry::new("strokers"));
        let releases = Rc::new(Cell::new(0));
        let children: Vec<_> = (1..=5_000).map(|i| Child::new(i * 0x10, &registry, &releases)).collect();
        assert_eq!(registry.live_count(), 5_000);

        for child in children.iter().step_by(2) {
            child.dispose_as(DisposeKind::Explicit);
        }
        assert_eq!(registry.live_count(), 2_500);
        assert!(children.iter().skip(1).step_by(2).all(|c| registry.contains(c)));
        assert_eq!(registry.cascade_dispose(DisposeKind::Explicit), 2_500);
        assert_eq!(releases.get(), 5_000);
    }

    #[test]
    fn closed_registry_ignores_changes() {
        let registry = Rc::new(Registry::new("faces"));
        let releases = Rc::new(Cell::new(0));
        registry.cascade_dispose(DisposeKind::Explicit);

        let late = Child::new(0x10, &registry, &releases);
        assert!(!registry.contains(&late));
        assert!(!registry.unregister(&late));
    }
}
