//! Outlines, standalone or inside a slot or glyph

use std::fmt;
use std::rc::{Rc, Weak};

use kurbo::{BezPath, Point};

use ftown_core::records::OutlineRecord;
use ftown_core::types::{BBox, Matrix, Orientation, OutlineFlags, Vector};
use ftown_core::{
    report_release, Disposable, DisposeKind, FtError, Lifecycle, NativeHandle, NativeResult, NativeResultExt,
    OutlineSink, Ownership, Result,
};

use crate::bitmap::Bitmap;
use crate::library::{Ctx, LibraryInner};

/// A vector outline.
///
/// Outlines from [`Library::new_outline`](crate::Library::new_outline) are
/// owned and released with `FT_Outline_Done`. Outlines reached through a
/// glyph slot or an outline glyph are views that keep their source alive
/// and turn disposed with it.
#[derive(Clone)]
pub struct Outline {
    pub(crate) inner: Rc<OutlineInner>,
}

pub(crate) struct OutlineInner {
    ctx: Ctx,
    life: Lifecycle,
    /// The slot or glyph a view aliases.
    _source: Option<Rc<dyn Disposable>>,
}

impl Disposable for OutlineInner {
    fn lifecycle(&self) -> &Lifecycle {
        &self.life
    }

    fn dispose_as(&self, kind: DisposeKind) {
        let disposed = self.life.dispose(kind, |handle| {
            if self.life.ownership().releases_handle() {
                let result = self.ctx.api.done_outline(self.ctx.library_handle, handle);
                report_release("FT_Outline_Done", "Outline", handle, result);
            }
        });
        if disposed && kind.is_explicit() && self.life.ownership() == Ownership::Owned {
            if let Some(library) = self.ctx.library.upgrade() {
                library.outlines.unregister(self);
            }
        }
    }
}

impl Drop for OutlineInner {
    fn drop(&mut self) {
        self.dispose_as(DisposeKind::Finalizer);
    }
}

/// One drawing command of a decomposed outline, in outline units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathCommand {
    MoveTo(Vector),
    LineTo(Vector),
    ConicTo { control: Vector, to: Vector },
    CubicTo { control1: Vector, control2: Vector, to: Vector },
}

#[derive(Default)]
struct RecordingSink {
    commands: Vec<PathCommand>,
}

impl OutlineSink for RecordingSink {
    fn move_to(&mut self, to: Vector) -> NativeResult<()> {
        self.commands.push(PathCommand::MoveTo(to));
        Ok(())
    }

    fn line_to(&mut self, to: Vector) -> NativeResult<()> {
        self.commands.push(PathCommand::LineTo(to));
        Ok(())
    }

    fn conic_to(&mut self, control: Vector, to: Vector) -> NativeResult<()> {
        self.commands.push(PathCommand::ConicTo { control, to });
        Ok(())
    }

    fn cubic_to(&mut self, control1: Vector, control2: Vector, to: Vector) -> NativeResult<()> {
        self.commands.push(PathCommand::CubicTo { control1, control2, to });
        Ok(())
    }
}

fn point(v: Vector) -> Point {
    Point::new(v.x as f64, v.y as f64)
}

impl Outline {
    pub(crate) fn new_owned(library: &Rc<LibraryInner>, n_points: u32, n_contours: u32) -> Result<Self> {
        let ctx = library.ctx()?;
        let handle = NativeHandle::adopt(
            "FT_Outline_New",
            "Outline",
            ctx.api.new_outline(ctx.library_handle, n_points, n_contours),
        )?;
        let outline = Outline {
            inner: Rc::new(OutlineInner {
                ctx,
                life: Lifecycle::new("Outline", handle, Ownership::Owned),
                _source: None,
            }),
        };
        library.outlines.register(&outline.inner);
        Ok(outline)
    }

    pub(crate) fn view(ctx: Ctx, handle: NativeHandle, source: Rc<dyn Disposable>) -> Self {
        let outline = Outline {
            inner: Rc::new(OutlineInner {
                ctx,
                life: Lifecycle::new("Outline", handle, Ownership::View),
                _source: Some(Rc::clone(&source)),
            }),
        };
        let dependent: Weak<dyn Disposable> = { let w = Rc::downgrade(&outline.inner); w };
        source.lifecycle().add_dependent(dependent);
        outline
    }

    lifecycle_methods!();

    pub fn is_view(&self) -> bool {
        self.inner.life.ownership() == Ownership::View
    }

    fn live(&self) -> Result<(NativeHandle, &Ctx)> {
        Ok((self.handle()?, &self.inner.ctx))
    }

    // Contents

    /// Snapshot of points, tags, contour ends and flags.
    pub fn record(&self) -> Result<OutlineRecord> {
        let (handle, ctx) = self.live()?;
        Ok(ctx.api.outline_record(handle))
    }

    record_fields! {
        points: Vec<Vector>;
        tags: Vec<u8>;
        contours: Vec<u16>;
        flags: OutlineFlags;
    }

    pub fn n_points(&self) -> Result<usize> {
        Ok(self.record()?.n_points())
    }

    pub fn n_contours(&self) -> Result<usize> {
        Ok(self.record()?.n_contours())
    }

    /// Overwrite points, tags and contour ends in place. The lengths must
    /// match the outline's allocation.
    pub fn set_contents(&self, contents: &OutlineRecord) -> Result<()> {
        let (handle, ctx) = self.live()?;
        ctx.api.outline_write(handle, contents).op("FT_Outline write")
    }

    /// Copy this outline into `target`, which must have the same shape.
    pub fn copy_into(&self, target: &Outline) -> Result<()> {
        let (handle, ctx) = self.live()?;
        let target = target.handle()?;
        ctx.api.outline_copy(handle, target).op("FT_Outline_Copy")
    }

    /// A new owned outline with the same contents.
    pub fn copy(&self) -> Result<Outline> {
        let record = self.record()?;
        let library = self.inner.ctx.library()?;
        let copy = Outline::new_owned(&library, record.n_points() as u32, record.n_contours() as u32)?;
        self.copy_into(&copy)?;
        Ok(copy)
    }

    // Transformations

    pub fn translate(&self, dx: i64, dy: i64) -> Result<()> {
        let (handle, ctx) = self.live()?;
        ctx.api.outline_translate(handle, dx, dy);
        Ok(())
    }

    pub fn transform(&self, matrix: Matrix) -> Result<()> {
        let (handle, ctx) = self.live()?;
        ctx.api.outline_transform(handle, matrix);
        Ok(())
    }

    /// Embolden by `strength` (26.6) in both directions.
    pub fn embolden(&self, strength: i64) -> Result<()> {
        let (handle, ctx) = self.live()?;
        ctx.api.outline_embolden(handle, strength).op("FT_Outline_Embolden")
    }

    pub fn embolden_xy(&self, x_strength: i64, y_strength: i64) -> Result<()> {
        let (handle, ctx) = self.live()?;
        ctx.api
            .outline_embolden_xy(handle, x_strength, y_strength)
            .op("FT_Outline_EmboldenXY")
    }

    /// Reverse the drawing direction of every contour.
    pub fn reverse(&self) -> Result<()> {
        let (handle, ctx) = self.live()?;
        ctx.api.outline_reverse(handle);
        Ok(())
    }

    // Queries

    /// Validate the contour table.
    pub fn check(&self) -> Result<()> {
        let (handle, ctx) = self.live()?;
        ctx.api.outline_check(handle).op("FT_Outline_Check")
    }

    /// Control box: the extent of all points, on or off the curve.
    pub fn cbox(&self) -> Result<BBox> {
        let (handle, ctx) = self.live()?;
        Ok(ctx.api.outline_cbox(handle))
    }

    /// Exact bounding box of the curves.
    pub fn bbox(&self) -> Result<BBox> {
        let (handle, ctx) = self.live()?;
        ctx.api.outline_bbox(handle).op("FT_Outline_Get_BBox")
    }

    pub fn orientation(&self) -> Result<Orientation> {
        let (handle, ctx) = self.live()?;
        Ok(ctx.api.outline_orientation(handle))
    }

    // Rendering

    /// Draw into `target`, keeping its size and pixel mode. The outline's
    /// origin lands on the bitmap's bottom-left corner.
    ///
    /// Only owned bitmaps are drawn into; the bitmap of a slot or glyph
    /// changes under the next load.
    pub fn get_bitmap(&self, target: &Bitmap) -> Result<()> {
        let (handle, ctx) = self.live()?;
        let target_handle = target.handle()?;
        if target.is_view() {
            return Err(FtError::InvalidArgument(
                "cannot render into a bitmap owned by a slot or glyph; allocate one first".to_string(),
            ));
        }
        ctx.api
            .outline_get_bitmap(ctx.library_handle, handle, target_handle)
            .op("FT_Outline_Get_Bitmap")
    }

    // Decomposition

    /// Walk the outline, feeding `sink` one segment at a time.
    pub fn decompose(&self, sink: &mut dyn OutlineSink) -> Result<()> {
        let (handle, ctx) = self.live()?;
        ctx.api.decompose_outline(handle, sink).op("FT_Outline_Decompose")
    }

    pub fn path_commands(&self) -> Result<Vec<PathCommand>> {
        let mut sink = RecordingSink::default();
        self.decompose(&mut sink)?;
        Ok(sink.commands)
    }

    /// The outline as a `kurbo` path, in outline units. Contours are closed.
    pub fn to_bez_path(&self) -> Result<BezPath> {
        let mut path = BezPath::new();
        let mut open = false;
        for command in self.path_commands()? {
            match command {
                PathCommand::MoveTo(to) => {
                    if open {
                        path.close_path();
                    }
                    path.move_to(point(to));
                    open = true;
                }
                PathCommand::LineTo(to) => path.line_to(point(to)),
                PathCommand::ConicTo { control, to } => path.quad_to(point(control), point(to)),
                PathCommand::CubicTo { control1, control2, to } => {
                    path.curve_to(point(control1), point(control2), point(to))
                }
            }
        }
        if open {
            path.close_path();
        }
        Ok(path)
    }
}

impl fmt::Debug for Outline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Outline").field("life", &self.inner.life).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Library, LoadFlags};
    use ftown_core::{ErrorCode, FtError};
    use ftown_sim::{sample_font_bytes, SimFreeType};
    use kurbo::Shape;

    fn setup() -> (Rc<SimFreeType>, Library) {
        let sim = Rc::new(SimFreeType::new());
        let library = Library::with_api(sim.clone()).unwrap();
        (sim, library)
    }

    fn triangle() -> OutlineRecord {
        OutlineRecord {
            points: vec![Vector::new(0, 0), Vector::new(0, 640), Vector::new(640, 0)],
            tags: vec![1, 1, 1],
            contours: vec![2],
            flags: OutlineFlags::empty(),
        }
    }

    #[test]
    fn owned_outline_round_trips_contents() {
        let (sim, library) = setup();
        let outline = library.new_outline(3, 1).unwrap();
        outline.set_contents(&triangle()).unwrap();

        let record = outline.record().unwrap();
        assert_eq!(record.points, triangle().points);
        assert_eq!(record.contours, [2]);
        assert!(record.flags.contains(OutlineFlags::OWNER));
        assert_eq!(library.live_outlines(), 1);

        let handle = outline.handle().unwrap();
        outline.dispose();
        assert_eq!(sim.calls_on("FT_Outline_Done", handle), 1);
        assert_eq!(library.live_outlines(), 0);
    }

    #[test]
    fn wrong_shape_is_rejected() {
        let (_sim, library) = setup();
        let outline = library.new_outline(4, 1).unwrap();
        let err = outline.set_contents(&triangle()).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::INVALID_ARGUMENT));

        let err = library.new_outline(2, 3).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::INVALID_ARGUMENT));
    }

    #[test]
    fn copy_detaches_from_a_view() {
        let (_sim, library) = setup();
        let face = library.new_memory_face(sample_font_bytes(), 0).unwrap();
        face.set_pixel_sizes(0, 20).unwrap();
        face.load_char('A' as u32, LoadFlags::DEFAULT).unwrap();
        let view = face.glyph().unwrap().outline().unwrap();
        let copy = view.copy().unwrap();
        assert!(!copy.is_view());
        assert_eq!(copy.points().unwrap(), view.points().unwrap());

        face.dispose();
        assert!(view.is_disposed());
        assert_eq!(copy.n_points().unwrap(), 3);
    }

    #[test]
    fn transforms_move_points() {
        let (_sim, library) = setup();
        let outline = library.new_outline(3, 1).unwrap();
        outline.set_contents(&triangle()).unwrap();

        outline.translate(64, -64).unwrap();
        assert_eq!(outline.cbox().unwrap(), BBox { x_min: 64, y_min: -64, x_max: 704, y_max: 576 });

        outline.transform(Matrix::from_f64(2.0, 0.0, 0.0, 1.0)).unwrap();
        assert_eq!(outline.cbox().unwrap().width(), 1280);
    }

    #[test]
    fn reverse_flips_orientation() {
        let (_sim, library) = setup();
        let outline = library.new_outline(3, 1).unwrap();
        outline.set_contents(&triangle()).unwrap();
        let before = outline.orientation().unwrap();
        outline.reverse().unwrap();
        assert_ne!(outline.orientation().unwrap(), before);
        assert!(outline.flags().unwrap().contains(OutlineFlags::REVERSE_FILL));
    }

    #[test]
    fn embolden_grows_the_box() {
        let (_sim, library) = setup();
        let outline = library.new_outline(3, 1).unwrap();
        outline.set_contents(&triangle()).unwrap();
        let before = outline.bbox().unwrap();
        outline.embolden(64).unwrap();
        let after = outline.bbox().unwrap();
        assert!(after.width() > before.width());
        outline.embolden_xy(0, 0).unwrap();
        outline.check().unwrap();
    }

    #[test]
    fn decomposes_into_commands_and_paths() {
        let (_sim, library) = setup();
        let outline = library.new_outline(3, 1).unwrap();
        outline.set_contents(&triangle()).unwrap();

        let commands = outline.path_commands().unwrap();
        assert_eq!(commands[0], PathCommand::MoveTo(Vector::new(0, 0)));
        assert!(commands[1..].iter().all(|c| matches!(c, PathCommand::LineTo(_))));

        let path = outline.to_bez_path().unwrap();
        let bbox = path.bounding_box();
        assert_eq!((bbox.width(), bbox.height()), (640.0, 640.0));
    }

    #[test]
    fn conic_and_cubic_segments_survive_decomposition() {
        let (_sim, library) = setup();
        let face = library.new_memory_face(sample_font_bytes(), 0).unwrap();
        face.load_glyph(face.name_index("B").unwrap(), LoadFlags::NO_SCALE).unwrap();
        let b = face.glyph().unwrap().outline().unwrap().path_commands().unwrap();
        assert!(b.iter().any(|c| matches!(c, PathCommand::ConicTo { .. })));

        face.load_glyph(face.name_index("O").unwrap(), LoadFlags::NO_SCALE).unwrap();
        let o = face.glyph().unwrap().outline().unwrap().path_commands().unwrap();
        assert!(o.iter().any(|c| matches!(c, PathCommand::CubicTo { .. })));
    }

    struct FailingSink;

    impl OutlineSink for FailingSink {
        fn move_to(&mut self, _to: Vector) -> NativeResult<()> {
            Err(ErrorCode::INVALID_OUTLINE)
        }
        fn line_to(&mut self, _to: Vector) -> NativeResult<()> {
            Ok(())
        }
        fn conic_to(&mut self, _control: Vector, _to: Vector) -> NativeResult<()> {
            Ok(())
        }
        fn cubic_to(&mut self, _control1: Vector, _control2: Vector, _to: Vector) -> NativeResult<()> {
            Ok(())
        }
    }

    #[test]
    fn sink_errors_propagate() {
        let (_sim, library) = setup();
        let outline = library.new_outline(3, 1).unwrap();
        outline.set_contents(&triangle()).unwrap();
        let err = outline.decompose(&mut FailingSink).unwrap_err();
        assert!(matches!(
            err,
            FtError::NativeOperationFailed {
                op: "FT_Outline_Decompose",
                code: ErrorCode::INVALID_OUTLINE
            }
        ));
    }

    #[test]
    fn renders_into_an_allocated_bitmap() {
        let (_sim, library) = setup();
        let outline = library.new_outline(3, 1).unwrap();
        outline.set_contents(&triangle()).unwrap();
        let bitmap = library.new_bitmap().unwrap();
        bitmap.allocate(10, 10).unwrap();

        outline.get_bitmap(&bitmap).unwrap();
        let pixels = bitmap.buffer().unwrap();
        assert!(pixels[9 * 10] > 0);
        assert_eq!(pixels[9], 0);
        assert_eq!((bitmap.width().unwrap(), bitmap.rows().unwrap()), (10, 10));
    }

    #[test]
    fn disposed_target_bitmap_is_rejected() {
        let (sim, library) = setup();
        let outline = library.new_outline(3, 1).unwrap();
        outline.set_contents(&triangle()).unwrap();
        let bitmap = library.new_bitmap().unwrap();
        bitmap.allocate(10, 10).unwrap();
        bitmap.dispose();

        let err = outline.get_bitmap(&bitmap).unwrap_err();
        assert!(matches!(err, FtError::ObjectDisposed { what: "Bitmap" }));
        assert_eq!(sim.calls("FT_Outline_Get_Bitmap"), 0);
    }

    #[test]
    fn slot_bitmap_is_not_a_render_target() {
        let (sim, library) = setup();
        let face = library.new_memory_face(sample_font_bytes(), 0).unwrap();
        face.set_pixel_sizes(0, 20).unwrap();
        face.load_char('A' as u32, LoadFlags::RENDER).unwrap();
        let view = face.glyph().unwrap().bitmap().unwrap();

        let outline = library.new_outline(3, 1).unwrap();
        outline.set_contents(&triangle()).unwrap();
        assert!(matches!(outline.get_bitmap(&view), Err(FtError::InvalidArgument(_))));
        assert_eq!(sim.calls("FT_Outline_Get_Bitmap"), 0);

        outline.dispose();
        let target = library.new_bitmap().unwrap();
        assert!(outline.get_bitmap(&target).unwrap_err().is_disposed());
    }

    #[test]
    fn library_disposal_releases_outlines() {
        let (sim, library) = setup();
        let outline = library.new_outline(3, 1).unwrap();
        let handle = outline.handle().unwrap();
        library.dispose();
        assert!(outline.cbox().unwrap_err().is_disposed());
        assert_eq!(sim.calls_on("FT_Outline_Done", handle), 1);
        assert_eq!(sim.live_objects(), 0);
    }
}
