//! ftown-sim: FreeType without FreeType
//!
//! An in-memory implementation of [`FreeTypeApi`] for exercising the ftown
//! wrappers without linking a native library. Objects live in a table keyed
//! by synthetic addresses, so the wrappers see the same opaque handles they
//! would from the real thing.
//!
//! The simulator is strict where the native library is undefined:
//!
//! - touching a freed handle panics with "use after free",
//! - releasing a freed handle panics with "double free",
//! - releasing an embedded object (a glyph slot's outline, a face's size)
//!   through a standalone release call panics.
//!
//! Every call is logged, so tests can count native releases, and faults can
//! be queued per entry point to exercise error paths.
//!
//! ```
//! use ftown_core::FreeTypeApi;
//! use ftown_sim::SimFreeType;
//!
//! let sim = SimFreeType::new();
//! let library = sim.init_library().unwrap();
//! assert_eq!(sim.calls("FT_Init_FreeType"), 1);
//! # let _ = library;
//! ```

// Handle misuse is a bug in the caller and fails loudly
#![allow(clippy::panic)]

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};

use ftown_core::types::{StrokerLineCap, StrokerLineJoin};
use ftown_core::{ErrorCode, FreeTypeApi, NativeHandle, NativeResult};

mod api;
pub mod font;
mod objects;
pub mod raster;

pub use font::{sample_font_bytes, SimError, SimFont, SimFontFile};

use objects::{Body, Object};

/// First synthetic address handed out.
const BASE_ADDR: usize = 0x1000;
/// Spacing between objects, so addresses look like aligned allocations.
const ADDR_STEP: usize = 0x40;

/// One native call as seen by the simulator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub op: &'static str,
    pub handle: usize,
}

#[derive(Debug, Clone, Copy)]
enum Fault {
    Fail(ErrorCode),
    Null,
}

#[derive(Default)]
struct Table {
    objects: HashMap<usize, Object>,
    freed: HashMap<usize, &'static str>,
}

/// In-memory FreeType.
pub struct SimFreeType {
    table: RefCell<Table>,
    next_addr: Cell<usize>,
    log: RefCell<Vec<Call>>,
    faults: RefCell<HashMap<&'static str, VecDeque<Fault>>>,
}

impl Default for SimFreeType {
    fn default() -> Self {
        Self::new()
    }
}

impl SimFreeType {
    pub fn new() -> Self {
        Self {
            table: RefCell::new(Table::default()),
            next_addr: Cell::new(BASE_ADDR),
            log: RefCell::new(Vec::new()),
            faults: RefCell::new(HashMap::new()),
        }
    }

    // Fault injection

    /// Make the next call to `op` fail with `code`.
    pub fn fail_next(&self, op: &'static str, code: ErrorCode) {
        self.faults.borrow_mut().entry(op).or_default().push_back(Fault::Fail(code));
    }

    /// Make the next call to factory `op` succeed with a null handle.
    pub fn null_next(&self, op: &'static str) {
        self.faults.borrow_mut().entry(op).or_default().push_back(Fault::Null);
    }

    // Call log

    pub fn calls(&self, op: &str) -> usize {
        self.log.borrow().iter().filter(|c| c.op == op).count()
    }

    pub fn calls_on(&self, op: &str, handle: NativeHandle) -> usize {
        self.log
            .borrow()
            .iter()
            .filter(|c| c.op == op && c.handle == handle.addr())
            .count()
    }

    pub fn call_log(&self) -> Vec<Call> {
        self.log.borrow().clone()
    }

    pub fn clear_log(&self) {
        self.log.borrow_mut().clear();
    }

    // Object table

    pub fn is_live(&self, handle: NativeHandle) -> bool {
        self.table.borrow().objects.contains_key(&handle.addr())
    }

    pub fn is_freed(&self, handle: NativeHandle) -> bool {
        self.table.borrow().freed.contains_key(&handle.addr())
    }

    /// Standalone objects still allocated, i.e. leaks once everything has
    /// been disposed.
    pub fn live_objects(&self) -> usize {
        self.table.borrow().objects.values().filter(|o| o.owner.is_none()).count()
    }

    /// Live objects of one kind ("Face", "Glyph", ...), embedded ones
    /// included.
    pub fn live_count(&self, kind: &str) -> usize {
        self.table
            .borrow()
            .objects
            .values()
            .filter(|o| o.body.kind() == kind)
            .count()
    }

    /// Native reference count of a face, zero once freed.
    pub fn face_refcount(&self, face: NativeHandle) -> u32 {
        match self.table.borrow().objects.get(&face.addr()) {
            Some(Object {
                body: Body::Face(f), ..
            }) => f.refcount,
            _ => 0,
        }
    }

    /// Files attached to a face with `attach_file`.
    pub fn attached_files(&self, face: NativeHandle) -> Vec<std::path::PathBuf> {
        self.with_face("attached_files", face, |f| f.attached.clone())
    }

    pub fn stroker_settings(&self, stroker: NativeHandle) -> (i64, StrokerLineCap, StrokerLineJoin, i64) {
        self.with_stroker("stroker_settings", stroker, |s| (s.radius, s.cap, s.join, s.miter_limit))
    }

    /// Faces currently held by a cache manager.
    pub fn cached_faces(&self, manager: NativeHandle) -> Vec<NativeHandle> {
        self.with_manager("cached_faces", manager, |m| {
            m.faces.iter().filter_map(|&(_, face)| NativeHandle::new(face)).collect()
        })
    }

    /// Record a call and apply any queued fault. `Ok(true)` asks a factory to
    /// return null.
    fn enter(&self, op: &'static str, handle: usize) -> NativeResult<bool> {
        self.log.borrow_mut().push(Call { op, handle });
        let fault = self.faults.borrow_mut().get_mut(op).and_then(VecDeque::pop_front);
        match fault {
            Some(Fault::Fail(code)) => {
                log::debug!("sim: injected {code} into {op}");
                Err(code)
            }
            Some(Fault::Null) => Ok(true),
            None => Ok(false),
        }
    }

    fn note(&self, op: &'static str, handle: usize) {
        self.log.borrow_mut().push(Call { op, handle });
    }

    fn alloc(&self, body: Body, owner: Option<usize>) -> usize {
        let addr = self.next_addr.get();
        self.next_addr.set(addr + ADDR_STEP);
        self.table.borrow_mut().objects.insert(addr, Object { body, owner });
        addr
    }

    fn check_live(&self, op: &str, addr: usize) {
        let table = self.table.borrow();
        if table.objects.contains_key(&addr) {
            return;
        }
        match table.freed.get(&addr) {
            Some(kind) => panic!("use after free: {op} on freed {kind} {addr:#x}"),
            None => panic!("wild handle: {op} on unknown address {addr:#x}"),
        }
    }

    fn with<R>(&self, op: &str, handle: NativeHandle, f: impl FnOnce(&mut Body) -> R) -> R {
        self.check_live(op, handle.addr());
        let mut table = self.table.borrow_mut();
        match table.objects.get_mut(&handle.addr()) {
            Some(object) => f(&mut object.body),
            None => panic!("wild handle: {op} on {handle}"),
        }
    }

    fn owner_of(&self, addr: usize) -> Option<usize> {
        self.table.borrow().objects.get(&addr).and_then(|o| o.owner)
    }

    /// Free an object and everything embedded in it.
    fn free(&self, op: &str, addr: usize) {
        let mut table = self.table.borrow_mut();
        let Some(object) = table.objects.remove(&addr) else {
            match table.freed.get(&addr) {
                Some(kind) => panic!("double free: {op} on freed {kind} {addr:#x}"),
                None => panic!("wild handle: {op} on unknown address {addr:#x}"),
            }
        };
        table.freed.insert(addr, object.body.kind());
        let mut pending: Vec<usize> = vec![addr];
        while let Some(owner) = pending.pop() {
            let children: Vec<usize> = table
                .objects
                .iter()
                .filter(|(_, o)| o.owner == Some(owner))
                .map(|(&a, _)| a)
                .collect();
            for child in children {
                if let Some(o) = table.objects.remove(&child) {
                    table.freed.insert(child, o.body.kind());
                }
                pending.push(child);
            }
        }
    }

    /// Release a standalone object, refusing embedded ones.
    fn release(&self, op: &'static str, addr: usize) {
        self.check_live(op, addr);
        if let Some(owner) = self.owner_of(addr) {
            panic!("{op}: {addr:#x} is embedded in {owner:#x} and cannot be released on its own");
        }
        self.free(op, addr);
    }
}

macro_rules! accessor {
    ($name:ident, $variant:ident, $ty:ty) => {
        impl SimFreeType {
            fn $name<R>(&self, op: &str, handle: NativeHandle, f: impl FnOnce(&mut $ty) -> R) -> R {
                self.with(op, handle, |body| match body {
                    Body::$variant(obj) => f(obj),
                    other => panic!("{op}: expected {}, got {} at {handle}", stringify!($variant), other.kind()),
                })
            }
        }
    };
}

accessor!(with_library, Library, objects::LibraryObj);
accessor!(with_face, Face, objects::FaceObj);
accessor!(with_size, Size, objects::SizeObj);
accessor!(with_slot, Slot, objects::SlotObj);
accessor!(with_charmap, CharMap, objects::CharMapObj);
accessor!(with_glyph, Glyph, objects::GlyphObj);
accessor!(with_outline, Outline, objects::OutlineObj);
accessor!(with_bitmap, Bitmap, objects::BitmapObj);
accessor!(with_stroker, Stroker, objects::StrokerObj);
accessor!(with_manager, Manager, objects::ManagerObj);

/// Handle for an address the simulator allocated itself.
fn h(addr: usize) -> NativeHandle {
    match NativeHandle::new(addr) {
        Some(handle) => handle,
        None => panic!("simulator allocated a null address"),
    }
}

/// Backend name reported through [`FreeTypeApi::name`].
pub const BACKEND_NAME: &str = "sim";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn addresses_are_distinct_and_aligned() {
        let sim = SimFreeType::new();
        let a = sim.init_library().unwrap();
        let b = sim.init_library().unwrap();
        assert_ne!(a, b);
        assert_eq!(a % ADDR_STEP, 0);
        assert_eq!(sim.live_objects(), 2);
    }

    #[test]
    #[should_panic(expected = "double free")]
    fn double_free_panics() {
        let sim = SimFreeType::new();
        let lib = h(sim.init_library().unwrap());
        sim.done_library(lib).unwrap();
        let _ = sim.done_library(lib);
    }

    #[test]
    #[should_panic(expected = "use after free")]
    fn use_after_free_panics() {
        let sim = SimFreeType::new();
        let lib = h(sim.init_library().unwrap());
        sim.done_library(lib).unwrap();
        sim.library_version(lib);
    }

    #[test]
    fn faults_apply_once_in_order() {
        let sim = SimFreeType::new();
        sim.fail_next("FT_Init_FreeType", ErrorCode::OUT_OF_MEMORY);
        sim.null_next("FT_Init_FreeType");

        assert_eq!(sim.init_library(), Err(ErrorCode::OUT_OF_MEMORY));
        assert_eq!(sim.init_library(), Ok(0));
        assert!(sim.init_library().unwrap() != 0);
        assert_eq!(sim.calls("FT_Init_FreeType"), 3);
    }
}
