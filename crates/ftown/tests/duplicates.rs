//! Duplicate faces share one native object under its reference count

use std::rc::Rc;

use ftown::{FtError, Library, Ownership};
use ftown_sim::{sample_font_bytes, SimFreeType};

fn setup() -> (Rc<SimFreeType>, Library, ftown::Face) {
    let sim = Rc::new(SimFreeType::new());
    let library = Library::with_api(sim.clone()).unwrap();
    let face = library.new_memory_face(sample_font_bytes(), 0).unwrap();
    (sim, library, face)
}

#[test]
fn parentless_duplicates_are_not_tracked() {
    let (sim, library, face) = setup();
    let dup = face.duplicate().unwrap();
    assert_eq!(dup.ownership(), Ownership::Duplicate);
    assert_eq!(dup.handle().unwrap(), face.handle().unwrap());
    assert_eq!(library.live_faces(), 1);
    assert_eq!(sim.face_refcount(face.handle().unwrap()), 2);
}

#[test]
fn duplicate_releases_its_reference_once() {
    let (sim, library, face) = setup();
    let handle = face.handle().unwrap();
    let dup = face.duplicate().unwrap();

    dup.dispose();
    dup.dispose();
    drop(dup);
    assert_eq!(sim.calls_on("FT_Done_Face", handle), 1);
    assert_eq!(sim.face_refcount(handle), 1);
    assert_eq!(face.num_glyphs().unwrap(), 6);

    face.dispose();
    assert!(sim.is_freed(handle));
    assert_eq!(library.live_faces(), 0);
}

#[test]
fn duplicate_outlives_the_original() {
    let (sim, _library, face) = setup();
    let handle = face.handle().unwrap();
    let dup = face.duplicate().unwrap();

    face.dispose();
    assert!(face.is_disposed());
    assert!(sim.is_live(handle));
    assert_eq!(dup.family_name().unwrap().as_deref(), Some("Sim Sans"));

    drop(dup);
    assert!(sim.is_freed(handle));
}

#[test]
fn library_disposal_reaches_parentless_duplicates() {
    let (sim, library, face) = setup();
    let dup = face.duplicate().unwrap();

    library.dispose();
    assert!(dup.is_disposed());
    assert!(matches!(dup.num_glyphs(), Err(FtError::ObjectDisposed { .. })));
    assert_eq!(sim.live_objects(), 0);
    drop(dup);
    assert_eq!(sim.live_objects(), 0);
}

#[test]
fn tracked_duplicates_join_the_cascade() {
    let (sim, library, face) = setup();
    let dup = library.duplicate_face(&face).unwrap();
    assert_eq!(dup.ownership(), Ownership::Duplicate);
    assert_eq!(library.live_faces(), 2);

    dup.dispose();
    assert_eq!(library.live_faces(), 1);

    let again = library.duplicate_face(&face).unwrap();
    library.dispose();
    assert!(again.is_disposed());
    assert_eq!(sim.calls("FT_Done_Face"), 3);
    assert_eq!(sim.live_objects(), 0);
}

#[test]
fn duplicating_across_libraries_is_refused() {
    let (_sim, _library, face) = setup();
    let other = Library::with_api(Rc::new(SimFreeType::new())).unwrap();
    let err = other.duplicate_face(&face).unwrap_err();
    assert!(matches!(err, FtError::InvalidArgument(_)));
    assert_eq!(other.live_faces(), 0);
}

#[test]
fn disposed_faces_cannot_be_duplicated() {
    let (_sim, _library, face) = setup();
    face.dispose();
    assert!(face.duplicate().unwrap_err().is_disposed());
}

#[test]
fn size_owned_by_a_duplicate_is_followed_from_the_original() {
    let (sim, _library, face) = setup();
    let dup = face.duplicate().unwrap();
    let size = dup.new_size().unwrap();
    size.activate().unwrap();

    let view = face.active_size().unwrap();
    assert_eq!(view.handle().unwrap(), size.handle().unwrap());

    size.dispose();
    assert!(view.is_disposed());
    assert!(view.metrics().unwrap_err().is_disposed());
    assert_eq!(sim.calls("FT_Done_Size"), 1);
}

#[test]
fn size_owned_by_the_original_is_followed_from_a_duplicate() {
    let (sim, library, face) = setup();
    let dup = library.duplicate_face(&face).unwrap();
    let size = face.new_size().unwrap();
    size.activate().unwrap();

    let view = dup.active_size().unwrap();
    face.dispose();
    assert!(size.is_disposed());
    assert!(view.is_disposed());
    assert_eq!(sim.calls("FT_Done_Size"), 1);

    // The native face lives on through the duplicate
    assert!(dup.active_size().unwrap().metrics().is_ok());
}

#[test]
fn disposing_the_owning_duplicate_invalidates_other_views() {
    let (sim, _library, face) = setup();
    let dup = face.duplicate().unwrap();
    let size = dup.new_size().unwrap();
    let handle = size.handle().unwrap();
    size.activate().unwrap();
    let view = face.active_size().unwrap();

    dup.dispose();
    assert!(size.is_disposed());
    assert!(view.is_disposed());
    assert_eq!(sim.calls_on("FT_Done_Size", handle), 1);

    let fallback = face.active_size().unwrap();
    assert_ne!(fallback.handle().unwrap(), handle);
    assert!(fallback.metrics().is_ok());
}

#[test]
fn charmap_from_a_duplicate_fits_the_original() {
    let (_sim, _library, face) = setup();
    let dup = face.duplicate().unwrap();
    let charmaps = dup.charmaps().unwrap();

    face.set_charmap(&charmaps[1]).unwrap();
    assert_eq!(face.charmap().unwrap().unwrap().index().unwrap(), 1);
    assert_eq!(dup.charmap().unwrap().unwrap().index().unwrap(), 1);

    dup.dispose();
    assert!(face.set_charmap(&charmaps[0]).unwrap_err().is_disposed());
}
