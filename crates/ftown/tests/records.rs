//! Wrapper accessors read exactly what the native library reports

use std::rc::Rc;

use ftown::{FreeTypeApi, Library, LoadFlags, RenderMode, SfntTag};
use ftown_sim::{sample_font_bytes, SimFreeType};

fn loaded(ch: char) -> (Rc<SimFreeType>, Library, ftown::Face) {
    let sim = Rc::new(SimFreeType::new());
    let library = Library::with_api(sim.clone()).unwrap();
    let face = library.new_memory_face(sample_font_bytes(), 0).unwrap();
    face.set_pixel_sizes(0, 20).unwrap();
    face.load_char(ch as u32, LoadFlags::DEFAULT).unwrap();
    (sim, library, face)
}

#[test]
fn face_record_matches_native() {
    let (sim, _library, face) = loaded('A');
    let native = sim.face_record(face.handle().unwrap());
    assert_eq!(face.record().unwrap(), native);
    assert_eq!(face.units_per_em().unwrap(), native.units_per_em);
    assert_eq!(face.family_name().unwrap(), native.family_name);
    assert_eq!(face.available_sizes().unwrap(), native.available_sizes);
}

#[test]
fn size_metrics_match_native() {
    let (sim, _library, face) = loaded('A');
    let active = face.active_size().unwrap();
    assert_eq!(active.metrics().unwrap(), sim.size_metrics(active.handle().unwrap()));
}

#[test]
fn slot_record_matches_native() {
    let (sim, _library, face) = loaded('A');
    let slot = face.glyph().unwrap();
    let native = sim.slot_record(slot.handle().unwrap());
    assert_eq!(slot.record().unwrap(), native);
    assert_eq!(slot.advance().unwrap(), native.advance);
    assert_eq!(slot.advance().unwrap().x, 12 * 64);
}

#[test]
fn outline_record_matches_native() {
    let (sim, _library, face) = loaded('B');
    let outline = face.glyph().unwrap().outline().unwrap();
    let native = sim.outline_record(outline.handle().unwrap());
    assert_eq!(outline.record().unwrap(), native);
    assert_eq!(outline.points().unwrap(), native.points);
    assert_eq!(outline.n_contours().unwrap(), native.contours.len());
}

#[test]
fn bitmap_record_matches_native() {
    let (sim, _library, face) = loaded('A');
    let slot = face.glyph().unwrap();
    slot.render(RenderMode::Normal).unwrap();
    let bitmap = slot.bitmap().unwrap();
    let native = sim.bitmap_record(bitmap.handle().unwrap());
    assert_eq!(bitmap.record().unwrap(), native);
    assert_eq!((bitmap.width().unwrap(), bitmap.rows().unwrap()), (12, 14));
    assert_eq!(bitmap.buffer().unwrap(), sim.bitmap_buffer(bitmap.handle().unwrap()));
}

#[test]
fn glyph_record_matches_native() {
    let (sim, _library, face) = loaded('A');
    let glyph = face.glyph().unwrap().glyph().unwrap();
    assert_eq!(glyph.record().unwrap(), sim.glyph_record(glyph.handle().unwrap()));
}

#[test]
fn sfnt_tables_match_native() {
    let (sim, _library, face) = loaded('A');
    let handle = face.handle().unwrap();
    for tag in SfntTag::ALL {
        assert_eq!(face.sfnt_table(tag).unwrap(), sim.sfnt_table(handle, tag));
    }
    assert_eq!(face.sfnt_name_count().unwrap(), sim.sfnt_name_count(handle));
}
