use std::rc::Rc;

use proptest::prelude::*;

use ftown_sim::{sample_font_bytes, SimFreeType};

use crate::{Face, Glyph, Library, LoadFlags, Outline, Stroker, StrokerLineCap, StrokerLineJoin};

enum Obj {
    Face(Face),
    Glyph(Glyph),
    Outline(Outline),
    Stroker(Stroker),
}

impl Obj {
    fn dispose(&self) {
        match self {
            Obj::Face(o) => o.dispose(),
            Obj::Glyph(o) => o.dispose(),
            Obj::Outline(o) => o.dispose(),
            Obj::Stroker(o) => o.dispose(),
        }
    }

    fn is_disposed(&self) -> bool {
        match self {
            Obj::Face(o) => o.is_disposed(),
            Obj::Glyph(o) => o.is_disposed(),
            Obj::Outline(o) => o.is_disposed(),
            Obj::Stroker(o) => o.is_disposed(),
        }
    }
}

#[derive(Debug, Clone)]
enum Op {
    NewFace,
    NewOutline,
    NewStroker,
    LoadGlyph(usize),
    Stroke(usize, usize, bool),
    Duplicate(usize),
    Dispose(usize),
    Drop(usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::NewFace),
        Just(Op::NewOutline),
        Just(Op::NewStroker),
        (0..32usize).prop_map(Op::LoadGlyph),
        (0..32usize, 0..32usize, any::<bool>()).prop_map(|(g, s, d)| Op::Stroke(g, s, d)),
        (0..32usize).prop_map(Op::Duplicate),
        (0..32usize).prop_map(Op::Dispose),
        (0..32usize).prop_map(Op::Drop),
    ]
}

fn pick(objects: &[Option<Obj>], i: usize) -> Option<&Obj> {
    if objects.is_empty() {
        return None;
    }
    objects[i % objects.len()].as_ref()
}

fn apply(library: &Library, objects: &mut Vec<Option<Obj>>, op: Op) {
    match op {
        Op::NewFace => {
            if let Ok(face) = library.new_memory_face(sample_font_bytes(), 0) {
                objects.push(Some(Obj::Face(face)));
            }
        }
        Op::NewOutline => {
            if let Ok(outline) = library.new_outline(4, 1) {
                objects.push(Some(Obj::Outline(outline)));
            }
        }
        Op::NewStroker => {
            if let Ok(stroker) = library.new_stroker() {
                let _ = stroker.set(64, StrokerLineCap::Round, StrokerLineJoin::Round, 0);
                objects.push(Some(Obj::Stroker(stroker)));
            }
        }
        Op::LoadGlyph(i) => {
            let Some(Obj::Face(face)) = pick(objects, i) else { return };
            let glyph = face
                .set_pixel_sizes(0, 16)
                .and_then(|_| face.load_char('A' as u32, LoadFlags::DEFAULT))
                .and_then(|_| face.glyph())
                .and_then(|slot| slot.glyph());
            if let Ok(glyph) = glyph {
                objects.push(Some(Obj::Glyph(glyph)));
            }
        }
        Op::Stroke(g, s, destroy) => {
            let (Some(Obj::Glyph(glyph)), Some(Obj::Stroker(stroker))) = (pick(objects, g), pick(objects, s)) else {
                return;
            };
            if let Ok(stroked) = glyph.stroke(stroker, destroy) {
                objects.push(Some(Obj::Glyph(stroked)));
            }
        }
        Op::Duplicate(i) => {
            if let Some(Obj::Face(face)) = pick(objects, i) {
                if let Ok(copy) = face.duplicate() {
                    objects.push(Some(Obj::Face(copy)));
                }
            }
        }
        Op::Dispose(i) => {
            if let Some(obj) = pick(objects, i) {
                obj.dispose();
                assert!(obj.is_disposed());
            }
        }
        Op::Drop(i) => {
            if !objects.is_empty() {
                let n = objects.len();
                objects[i % n] = None;
            }
        }
    }
}

// Property: any mix of creation, consumption, disposal and drops ends with
// every native object released once and nothing reachable after the library
// goes away. The simulator panics on a double free or use after free.
proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_library_disposal_releases_everything(ops in prop::collection::vec(op(), 0..48)) {
        let sim = Rc::new(SimFreeType::new());
        let library = Library::with_api(sim.clone()).unwrap();
        let mut objects = Vec::new();
        for op in ops {
            apply(&library, &mut objects, op);
        }

        library.dispose();
        for obj in objects.iter().flatten() {
            prop_assert!(obj.is_disposed());
        }
        prop_assert_eq!(library.live_faces(), 0);
        prop_assert_eq!(library.live_glyphs(), 0);
        prop_assert_eq!(library.live_outlines(), 0);
        prop_assert_eq!(library.live_strokers(), 0);
        prop_assert_eq!(sim.live_objects(), 0);

        drop(objects);
        prop_assert_eq!(sim.calls("FT_Done_FreeType"), 1);
    }

    #[test]
    fn prop_dropping_everything_releases_everything(ops in prop::collection::vec(op(), 0..48)) {
        let sim = Rc::new(SimFreeType::new());
        let library = Library::with_api(sim.clone()).unwrap();
        let mut objects = Vec::new();
        for op in ops {
            apply(&library, &mut objects, op);
        }

        drop(objects);
        prop_assert_eq!(library.live_faces(), 0);
        prop_assert_eq!(library.live_glyphs(), 0);
        prop_assert_eq!(sim.live_count("Face"), 0);
        prop_assert_eq!(sim.live_count("Glyph"), 0);

        drop(library);
        prop_assert_eq!(sim.live_objects(), 0);
    }
}
