//! Backend calls against the linked libfreetype, no font files needed

use std::panic::{self, AssertUnwindSafe};

use ftown_core::records::OutlineRecord;
use ftown_core::types::{
    BBox, Matrix, Orientation, OutlineFlags, PixelMode, PropertyKind, PropertyValue, StrokerLineCap, StrokerLineJoin,
    Vector,
};
use ftown_core::{ErrorCode, FreeTypeApi, NativeHandle, NativeResult, OutlineSink};
use ftown_freetype::FreeTypeBackend;

fn h(raw: usize) -> NativeHandle {
    NativeHandle::new(raw).unwrap()
}

/// A closed 64x64 square, counter-clockwise.
fn square() -> OutlineRecord {
    OutlineRecord {
        points: vec![
            Vector::new(0, 0),
            Vector::new(64, 0),
            Vector::new(64, 64),
            Vector::new(0, 64),
        ],
        tags: vec![1; 4],
        contours: vec![3],
        flags: OutlineFlags::empty(),
    }
}

#[derive(Default)]
struct Recorder {
    moves: usize,
    lines: usize,
}

impl OutlineSink for Recorder {
    fn move_to(&mut self, _to: Vector) -> NativeResult<()> {
        self.moves += 1;
        Ok(())
    }
    fn line_to(&mut self, _to: Vector) -> NativeResult<()> {
        self.lines += 1;
        Ok(())
    }
    fn conic_to(&mut self, _control: Vector, _to: Vector) -> NativeResult<()> {
        Ok(())
    }
    fn cubic_to(&mut self, _c1: Vector, _c2: Vector, _to: Vector) -> NativeResult<()> {
        Ok(())
    }
}

struct Failing;

impl OutlineSink for Failing {
    fn move_to(&mut self, _to: Vector) -> NativeResult<()> {
        Ok(())
    }
    fn line_to(&mut self, _to: Vector) -> NativeResult<()> {
        Err(ErrorCode::INVALID_OUTLINE)
    }
    fn conic_to(&mut self, _control: Vector, _to: Vector) -> NativeResult<()> {
        Ok(())
    }
    fn cubic_to(&mut self, _c1: Vector, _c2: Vector, _to: Vector) -> NativeResult<()> {
        Ok(())
    }
}

struct Panicking;

impl OutlineSink for Panicking {
    fn move_to(&mut self, _to: Vector) -> NativeResult<()> {
        panic!("sink exploded");
    }
    fn line_to(&mut self, _to: Vector) -> NativeResult<()> {
        Ok(())
    }
    fn conic_to(&mut self, _control: Vector, _to: Vector) -> NativeResult<()> {
        Ok(())
    }
    fn cubic_to(&mut self, _c1: Vector, _c2: Vector, _to: Vector) -> NativeResult<()> {
        Ok(())
    }
}

fn with_square(test: impl FnOnce(&FreeTypeBackend, NativeHandle, NativeHandle)) {
    let _ = env_logger::builder().is_test(true).try_init();
    let ft = FreeTypeBackend::new();
    let library = h(ft.init_library().unwrap());
    let outline = h(ft.new_outline(library, 4, 1).unwrap());
    ft.outline_write(outline, &square()).unwrap();
    test(&ft, library, outline);
    ft.done_outline(library, outline).unwrap();
    ft.done_library(library).unwrap();
}

#[test]
fn library_reports_a_freetype_2_version() {
    let ft = FreeTypeBackend::new();
    let library = h(ft.init_library().unwrap());
    assert_eq!(ft.library_version(library).major, 2);
    ft.done_library(library).unwrap();
}

#[test]
fn outline_contents_round_trip() {
    with_square(|ft, _library, outline| {
        assert_eq!(ft.outline_record(outline), square());
        ft.outline_check(outline).unwrap();
        assert_eq!(
            ft.outline_cbox(outline),
            BBox {
                x_min: 0,
                y_min: 0,
                x_max: 64,
                y_max: 64
            }
        );
    });
}

#[test]
fn mismatched_writes_are_rejected() {
    with_square(|ft, _library, outline| {
        let mut short = square();
        short.points.pop();
        assert_eq!(ft.outline_write(outline, &short), Err(ErrorCode::INVALID_ARGUMENT));
    });
}

#[test]
fn outline_edits_apply_in_place() {
    with_square(|ft, _library, outline| {
        ft.outline_translate(outline, 64, 0);
        assert_eq!(ft.outline_cbox(outline).x_min, 64);

        ft.outline_transform(outline, Matrix::IDENTITY);
        assert_eq!(ft.outline_bbox(outline).unwrap().width(), 64);

        let before = ft.outline_orientation(outline);
        ft.outline_reverse(outline);
        assert_ne!(ft.outline_orientation(outline), before);
        assert_ne!(before, Orientation::None);
    });
}

#[test]
fn decomposition_walks_every_segment() {
    with_square(|ft, _library, outline| {
        let mut recorder = Recorder::default();
        ft.decompose_outline(outline, &mut recorder).unwrap();
        assert_eq!(recorder.moves, 1);
        // Three edges plus the closing one
        assert_eq!(recorder.lines, 4);
    });
}

#[test]
fn sink_errors_stop_the_walk() {
    with_square(|ft, _library, outline| {
        assert_eq!(ft.decompose_outline(outline, &mut Failing), Err(ErrorCode::INVALID_OUTLINE));
    });
}

#[test]
fn sink_panics_resurface_after_the_native_call() {
    with_square(|ft, _library, outline| {
        let caught = panic::catch_unwind(AssertUnwindSafe(|| ft.decompose_outline(outline, &mut Panicking)));
        let payload = caught.unwrap_err();
        assert_eq!(payload.downcast_ref::<&str>(), Some(&"sink exploded"));
        // The outline is untouched and still usable
        assert_eq!(ft.outline_record(outline), square());
    });
}

#[test]
fn outline_copies_are_independent() {
    with_square(|ft, library, outline| {
        let copy = h(ft.new_outline(library, 4, 1).unwrap());
        ft.outline_copy(outline, copy).unwrap();
        ft.outline_translate(outline, 10, 10);
        assert_eq!(ft.outline_record(copy), square());
        ft.done_outline(library, copy).unwrap();
    });
}

#[test]
fn standalone_bitmaps_start_empty() {
    let ft = FreeTypeBackend::new();
    let library = h(ft.init_library().unwrap());
    let bitmap = h(ft.new_bitmap(library).unwrap());
    let record = ft.bitmap_record(bitmap);
    assert_eq!((record.rows, record.width), (0, 0));
    assert_eq!(record.pixel_mode, PixelMode::None);
    assert!(ft.bitmap_buffer(bitmap).is_empty());
    ft.done_bitmap(library, bitmap).unwrap();
    ft.done_library(library).unwrap();
}

#[test]
fn outline_draws_into_an_allocated_bitmap() {
    with_square(|ft, library, outline| {
        let bitmap = h(ft.new_bitmap(library).unwrap());
        ft.bitmap_allocate(library, bitmap, 2, 2).unwrap();
        let record = ft.bitmap_record(bitmap);
        assert_eq!((record.width, record.rows, record.pixel_mode), (2, 2, PixelMode::Gray));

        ft.outline_get_bitmap(library, outline, bitmap).unwrap();
        let pitch = record.pitch.unsigned_abs() as usize;
        let pixels = ft.bitmap_buffer(bitmap);
        // The square fills the bottom-left pixel only
        assert!(pixels[pitch] > 0);
        assert_eq!(pixels[1], 0);
        ft.done_bitmap(library, bitmap).unwrap();
    });
}

#[test]
fn driver_properties_read_back() {
    let ft = FreeTypeBackend::new();
    let library = h(ft.init_library().unwrap());
    let version = ft
        .property_get(library, "truetype", "interpreter-version", PropertyKind::UInt)
        .unwrap();
    assert!(matches!(version, PropertyValue::UInt(35 | 38 | 40)));
    ft.property_set(library, "truetype", "interpreter-version", &PropertyValue::UInt(35))
        .unwrap();
    assert_eq!(
        ft.property_get(library, "truetype", "interpreter-version", PropertyKind::UInt),
        Ok(PropertyValue::UInt(35))
    );
    assert_eq!(
        ft.property_get(library, "no-such-module", "interpreter-version", PropertyKind::UInt),
        Err(ErrorCode::MISSING_MODULE)
    );
    ft.done_library(library).unwrap();
}

#[test]
fn strokers_configure_and_release() {
    let ft = FreeTypeBackend::new();
    let library = h(ft.init_library().unwrap());
    let stroker = h(ft.new_stroker(library).unwrap());
    ft.stroker_set(stroker, 64, StrokerLineCap::Round, StrokerLineJoin::Round, 0);
    ft.done_stroker(stroker).unwrap();
    ft.done_library(library).unwrap();
}

#[test]
fn garbage_bytes_are_not_a_font() {
    let ft = FreeTypeBackend::new();
    let library = h(ft.init_library().unwrap());
    let err = ft.new_memory_face(library, b"not a font".to_vec().into(), 0).unwrap_err();
    assert_eq!(err, ErrorCode::UNKNOWN_FILE_FORMAT);
    assert_eq!(ft.held_buffers(), 0);
    ft.done_library(library).unwrap();
}

#[test]
fn missing_files_cannot_be_opened() {
    let ft = FreeTypeBackend::new();
    let library = h(ft.init_library().unwrap());
    let err = ft
        .new_face(library, std::path::Path::new("/nonexistent/ftown.ttf"), 0)
        .unwrap_err();
    assert_eq!(err, ErrorCode::CANNOT_OPEN_RESOURCE);
    ft.done_library(library).unwrap();
}
