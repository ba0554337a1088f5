use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use proptest::prelude::*;

use crate::handle::NativeHandle;
use crate::lifecycle::{Disposable, DisposeKind, Lifecycle};
use crate::ownership::Ownership;
use crate::registry::Registry;

struct Node {
    life: Lifecycle,
    parent: Weak<Registry<Node>>,
    releases: Rc<RefCell<Vec<usize>>>,
}

impl Disposable for Node {
    fn lifecycle(&self) -> &Lifecycle {
        &self.life
    }

    fn dispose_as(&self, kind: DisposeKind) {
        let releases = &self.releases;
        if self.life.dispose(kind, |h| releases.borrow_mut().push(h.addr())) && kind.is_explicit() {
            if let Some(parent) = self.parent.upgrade() {
                parent.unregister(self);
            }
        }
    }
}

impl Drop for Node {
    fn drop(&mut self) {
        self.dispose_as(DisposeKind::Finalizer);
    }
}

#[derive(Debug, Clone)]
enum Op {
    Dispose(usize),
    Drop(usize),
    Register(usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..16usize).prop_map(Op::Dispose),
        (0..16usize).prop_map(Op::Drop),
        (0..16usize).prop_map(Op::Register),
    ]
}

// Property: whatever clients do first, every child is released exactly once
// once the context cascades, and the registry ends up empty.
proptest! {
    #[test]
    fn prop_every_child_released_once(count in 1..16usize, ops in prop::collection::vec(op(), 0..40)) {
        let registry = Rc::new(Registry::new("nodes"));
        let releases = Rc::new(RefCell::new(Vec::new()));
        let mut nodes: Vec<Option<Rc<Node>>> = (0..count)
            .map(|i| {
                let node = Rc::new(Node {
                    life: Lifecycle::new("Node", NativeHandle::new(0x100 + i).unwrap(), Ownership::Owned),
                    parent: Rc::downgrade(&registry),
                    releases: Rc::clone(&releases),
                });
                registry.register(&node);
                Some(node)
            })
            .collect();

        for op in ops {
            match op {
                Op::Dispose(i) => {
                    if let Some(Some(node)) = nodes.get(i % count) {
                        node.dispose_as(DisposeKind::Explicit);
                        prop_assert!(!registry.contains(node));
                    }
                }
                Op::Drop(i) => {
                    nodes[i % count] = None;
                }
                Op::Register(i) => {
                    if let Some(Some(node)) = nodes.get(i % count) {
                        if !node.life.is_disposing() {
                            registry.register(node);
                        }
                    }
                }
            }
        }

        registry.cascade_dispose(DisposeKind::Explicit);
        prop_assert!(registry.is_empty());
        drop(nodes);

        let mut released = releases.borrow().clone();
        released.sort_unstable();
        let expected: Vec<usize> = (0..count).map(|i| 0x100 + i).collect();
        prop_assert_eq!(released, expected);
    }
}

// Property: the disposal event fires exactly once however many times
// dispose is attempted, from either path.
proptest! {
    #[test]
    fn prop_event_fires_once(kinds in prop::collection::vec(any::<bool>(), 1..10)) {
        let life = Lifecycle::new("Glyph", NativeHandle::new(0x40).unwrap(), Ownership::Owned);
        let events = Rc::new(Cell::new(0));
        let seen = Rc::clone(&events);
        life.on_dispose(move |_| seen.set(seen.get() + 1));

        let mut successes = 0;
        for explicit in kinds {
            let kind = if explicit { DisposeKind::Explicit } else { DisposeKind::Finalizer };
            if life.dispose(kind, |_| {}) {
                successes += 1;
            }
        }

        prop_assert_eq!(successes, 1);
        prop_assert_eq!(events.get(), 1);
    }
}
