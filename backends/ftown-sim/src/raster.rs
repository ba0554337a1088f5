//! Outline walking and a small supersampling rasterizer

use ftown_core::records::{BitmapRecord, OutlineRecord};
use ftown_core::types::{BBox, Matrix, Orientation, PixelMode, RenderMode, Vector};
use ftown_core::{ErrorCode, NativeResult, OutlineSink};

const TAG_ON: u8 = 0x01;
const TAG_CUBIC: u8 = 0x02;

fn tag_kind(tag: u8) -> u8 {
    if tag & TAG_ON != 0 {
        TAG_ON
    } else if tag & TAG_CUBIC != 0 {
        TAG_CUBIC
    } else {
        0
    }
}

fn mid(a: Vector, b: Vector) -> Vector {
    Vector::new((a.x + b.x) / 2, (a.y + b.y) / 2)
}

/// 16.16 multiply with rounding.
pub fn mul_fix(a: i64, b: i64) -> i64 {
    let product = a as i128 * b as i128;
    let rounded = if product < 0 { product - 0x8000 } else { product + 0x8000 };
    (rounded / 0x10000) as i64
}

pub fn transform_point(p: Vector, m: &Matrix) -> Vector {
    Vector::new(mul_fix(p.x, m.xx) + mul_fix(p.y, m.xy), mul_fix(p.x, m.yx) + mul_fix(p.y, m.yy))
}

/// Walk an outline into move/line/conic/cubic segments.
///
/// Contours are closed with a final segment back to their start point.
/// Implied on-curve points between consecutive conic controls are
/// synthesised at the midpoint.
pub fn decompose(outline: &OutlineRecord, sink: &mut dyn OutlineSink) -> NativeResult<()> {
    let points = &outline.points;
    let tags = &outline.tags;
    let mut first = 0usize;

    for &end in &outline.contours {
        let last = end as usize;
        if last >= points.len() || last < first {
            return Err(ErrorCode::INVALID_OUTLINE);
        }

        let mut v_start = points[first];
        let v_last = points[last];
        let mut limit = last as isize;
        let mut point = first as isize;

        match tag_kind(tags[first]) {
            TAG_CUBIC => return Err(ErrorCode::INVALID_OUTLINE),
            0 => {
                if tag_kind(tags[last]) == TAG_ON {
                    v_start = v_last;
                    limit -= 1;
                } else {
                    v_start = mid(v_start, v_last);
                }
                point -= 1;
            }
            _ => {}
        }

        sink.move_to(v_start)?;
        let mut closed = false;

        while point < limit {
            point += 1;
            let idx = point as usize;
            match tag_kind(tags[idx]) {
                TAG_ON => sink.line_to(points[idx])?,
                0 => {
                    let mut control = points[idx];
                    loop {
                        if point < limit {
                            point += 1;
                            let next = point as usize;
                            let vec = points[next];
                            match tag_kind(tags[next]) {
                                TAG_ON => {
                                    sink.conic_to(control, vec)?;
                                    break;
                                }
                                0 => {
                                    sink.conic_to(control, mid(control, vec))?;
                                    control = vec;
                                }
                                _ => return Err(ErrorCode::INVALID_OUTLINE),
                            }
                        } else {
                            sink.conic_to(control, v_start)?;
                            closed = true;
                            break;
                        }
                    }
                    if closed {
                        break;
                    }
                }
                _ => {
                    if point + 1 > limit || tag_kind(tags[idx + 1]) != TAG_CUBIC {
                        return Err(ErrorCode::INVALID_OUTLINE);
                    }
                    point += 2;
                    let c1 = points[idx];
                    let c2 = points[idx + 1];
                    if point <= limit {
                        sink.cubic_to(c1, c2, points[point as usize])?;
                    } else {
                        sink.cubic_to(c1, c2, v_start)?;
                        closed = true;
                        break;
                    }
                }
            }
        }

        if !closed {
            sink.line_to(v_start)?;
        }
        first = last + 1;
    }
    Ok(())
}

/// Flattens segments into closed polygons, in float pixels.
#[derive(Default)]
struct Flattener {
    scale: f64,
    polygons: Vec<Vec<(f64, f64)>>,
    current: (f64, f64),
}

const CURVE_STEPS: usize = 8;

impl Flattener {
    fn pt(&self, v: Vector) -> (f64, f64) {
        (v.x as f64 * self.scale, v.y as f64 * self.scale)
    }

    fn push(&mut self, p: (f64, f64)) {
        if let Some(poly) = self.polygons.last_mut() {
            poly.push(p);
        }
        self.current = p;
    }
}

impl OutlineSink for Flattener {
    fn move_to(&mut self, to: Vector) -> NativeResult<()> {
        let p = self.pt(to);
        self.polygons.push(vec![p]);
        self.current = p;
        Ok(())
    }

    fn line_to(&mut self, to: Vector) -> NativeResult<()> {
        let p = self.pt(to);
        self.push(p);
        Ok(())
    }

    fn conic_to(&mut self, control: Vector, to: Vector) -> NativeResult<()> {
        let (p0, p1, p2) = (self.current, self.pt(control), self.pt(to));
        for step in 1..=CURVE_STEPS {
            let t = step as f64 / CURVE_STEPS as f64;
            let u = 1.0 - t;
            self.push((
                u * u * p0.0 + 2.0 * u * t * p1.0 + t * t * p2.0,
                u * u * p0.1 + 2.0 * u * t * p1.1 + t * t * p2.1,
            ));
        }
        Ok(())
    }

    fn cubic_to(&mut self, control1: Vector, control2: Vector, to: Vector) -> NativeResult<()> {
        let (p0, p1, p2, p3) = (self.current, self.pt(control1), self.pt(control2), self.pt(to));
        for step in 1..=CURVE_STEPS {
            let t = step as f64 / CURVE_STEPS as f64;
            let u = 1.0 - t;
            let (a, b, c, d) = (u * u * u, 3.0 * u * u * t, 3.0 * u * t * t, t * t * t);
            self.push((
                a * p0.0 + b * p1.0 + c * p2.0 + d * p3.0,
                a * p0.1 + b * p1.1 + c * p2.1 + d * p3.1,
            ));
        }
        Ok(())
    }
}

fn winding(polygons: &[Vec<(f64, f64)>], x: f64, y: f64) -> i32 {
    let mut winding = 0;
    for poly in polygons {
        for (i, &(x1, y1)) in poly.iter().enumerate() {
            let (x2, y2) = poly[(i + 1) % poly.len()];
            if y1 <= y {
                if y2 > y && (x2 - x1) * (y - y1) - (x - x1) * (y2 - y1) > 0.0 {
                    winding += 1;
                }
            } else if y2 <= y && (x2 - x1) * (y - y1) - (x - x1) * (y2 - y1) < 0.0 {
                winding -= 1;
            }
        }
    }
    winding
}

/// A rendered glyph image.
pub struct Raster {
    pub record: BitmapRecord,
    pub buffer: Vec<u8>,
    pub left: i32,
    pub top: i32,
}

/// Render a 26.6 outline with the nonzero fill rule.
pub fn rasterize(outline: &OutlineRecord, mode: RenderMode, origin: Vector) -> NativeResult<Raster> {
    let mut shifted = outline.clone();
    for p in &mut shifted.points {
        p.x += origin.x;
        p.y += origin.y;
    }

    let mut flat = Flattener {
        scale: 1.0 / 64.0,
        ..Flattener::default()
    };
    decompose(&shifted, &mut flat)?;

    let bbox = cbox(&shifted.points);
    let x0 = bbox.x_min.div_euclid(64);
    let y0 = bbox.y_min.div_euclid(64);
    let x1 = (bbox.x_max + 63).div_euclid(64);
    let y1 = (bbox.y_max + 63).div_euclid(64);
    let width = (x1 - x0).max(0) as u32;
    let rows = (y1 - y0).max(0) as u32;

    let coverage = |col: u32, row: u32, samples: u32| -> u32 {
        let mut hits = 0;
        for sy in 0..samples {
            for sx in 0..samples {
                let x = x0 as f64 + col as f64 + (sx as f64 + 0.5) / samples as f64;
                let y = y1 as f64 - row as f64 - (sy as f64 + 0.5) / samples as f64;
                if winding(&flat.polygons, x, y) != 0 {
                    hits += 1;
                }
            }
        }
        hits
    };

    let (record, buffer) = match mode {
        RenderMode::Mono => {
            let pitch = width.div_ceil(8);
            let mut buffer = vec![0u8; (pitch * rows) as usize];
            for row in 0..rows {
                for col in 0..width {
                    if coverage(col, row, 1) > 0 {
                        buffer[(row * pitch + col / 8) as usize] |= 0x80 >> (col % 8);
                    }
                }
            }
            let record = BitmapRecord {
                rows,
                width,
                pitch: pitch as i32,
                pixel_mode: PixelMode::Mono,
                num_grays: 2,
            };
            (record, buffer)
        }
        _ => {
            let mut gray = vec![0u8; (width * rows) as usize];
            for row in 0..rows {
                for col in 0..width {
                    gray[(row * width + col) as usize] = (coverage(col, row, 4) * 255 / 16) as u8;
                }
            }
            match mode {
                RenderMode::Lcd => {
                    let buffer = gray.iter().flat_map(|&v| [v, v, v]).collect();
                    let record = BitmapRecord {
                        rows,
                        width: width * 3,
                        pitch: (width * 3) as i32,
                        pixel_mode: PixelMode::Lcd,
                        num_grays: 256,
                    };
                    (record, buffer)
                }
                RenderMode::LcdV => {
                    let buffer = gray
                        .chunks(width.max(1) as usize)
                        .flat_map(|row| row.repeat(3))
                        .collect();
                    let record = BitmapRecord {
                        rows: rows * 3,
                        width,
                        pitch: width as i32,
                        pixel_mode: PixelMode::LcdV,
                        num_grays: 256,
                    };
                    (record, buffer)
                }
                _ => {
                    let record = BitmapRecord {
                        rows,
                        width,
                        pitch: width as i32,
                        pixel_mode: PixelMode::Gray,
                        num_grays: 256,
                    };
                    (record, gray)
                }
            }
        }
    };

    Ok(Raster {
        record,
        buffer,
        left: x0 as i32,
        top: y1 as i32,
    })
}

/// Tight bounds of the curves, as opposed to the control box.
pub fn exact_bbox(outline: &OutlineRecord) -> NativeResult<BBox> {
    let mut flat = Flattener {
        scale: 1.0,
        ..Flattener::default()
    };
    decompose(outline, &mut flat)?;
    let points: Vec<Vector> = flat
        .polygons
        .iter()
        .flatten()
        .map(|&(x, y)| Vector::new(x.round() as i64, y.round() as i64))
        .collect();
    Ok(cbox(&points))
}

pub fn cbox(points: &[Vector]) -> BBox {
    let Some(first) = points.first() else {
        return BBox::default();
    };
    points.iter().fold(
        BBox {
            x_min: first.x,
            y_min: first.y,
            x_max: first.x,
            y_max: first.y,
        },
        |b, p| BBox {
            x_min: b.x_min.min(p.x),
            y_min: b.y_min.min(p.y),
            x_max: b.x_max.max(p.x),
            y_max: b.y_max.max(p.y),
        },
    )
}

/// Signed-area orientation over every contour.
pub fn orientation(outline: &OutlineRecord) -> Orientation {
    let mut area: i128 = 0;
    let mut first = 0usize;
    for &end in &outline.contours {
        let last = end as usize;
        if last >= outline.points.len() {
            break;
        }
        let mut prev = outline.points[last];
        for &cur in &outline.points[first..=last] {
            area += (cur.y - prev.y) as i128 * (cur.x + prev.x) as i128;
            prev = cur;
        }
        first = last + 1;
    }
    match area.signum() {
        1 => Orientation::PostScript,
        -1 => Orientation::TrueType,
        _ => Orientation::None,
    }
}

/// Check that contour ends are increasing and cover every point.
pub fn check(outline: &OutlineRecord) -> NativeResult<()> {
    if outline.points.is_empty() && outline.contours.is_empty() {
        return Ok(());
    }
    let mut prev: i64 = -1;
    for &end in &outline.contours {
        if i64::from(end) <= prev {
            return Err(ErrorCode::INVALID_ARGUMENT);
        }
        prev = i64::from(end);
    }
    if prev != outline.points.len() as i64 - 1 || outline.tags.len() != outline.points.len() {
        return Err(ErrorCode::INVALID_ARGUMENT);
    }
    Ok(())
}

/// Push every point away from its contour's centre.
pub fn embolden(outline: &mut OutlineRecord, x_strength: i64, y_strength: i64) {
    let mut first = 0usize;
    for &end in &outline.contours.clone() {
        let last = (end as usize).min(outline.points.len().saturating_sub(1));
        if first > last {
            break;
        }
        let contour = &mut outline.points[first..=last];
        let bbox = cbox(contour);
        let (cx, cy) = ((bbox.x_min + bbox.x_max) / 2, (bbox.y_min + bbox.y_max) / 2);
        for p in contour.iter_mut() {
            p.x += (p.x - cx).signum() * x_strength / 2;
            p.y += (p.y - cy).signum() * y_strength / 2;
        }
        first = last + 1;
    }
}

/// Reverse every contour in place, keeping its first point.
pub fn reverse(outline: &mut OutlineRecord) {
    let mut first = 0usize;
    for &end in &outline.contours {
        let last = end as usize;
        if last >= outline.points.len() || first > last {
            break;
        }
        outline.points[first + 1..=last].reverse();
        outline.tags[first + 1..=last].reverse();
        first = last + 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ftown_core::types::OutlineFlags;

    #[derive(Default)]
    struct Recorder(Vec<String>);

    impl OutlineSink for Recorder {
        fn move_to(&mut self, to: Vector) -> NativeResult<()> {
            self.0.push(format!("M{},{}", to.x, to.y));
            Ok(())
        }
        fn line_to(&mut self, to: Vector) -> NativeResult<()> {
            self.0.push(format!("L{},{}", to.x, to.y));
            Ok(())
        }
        fn conic_to(&mut self, c: Vector, to: Vector) -> NativeResult<()> {
            self.0.push(format!("Q{},{} {},{}", c.x, c.y, to.x, to.y));
            Ok(())
        }
        fn cubic_to(&mut self, c1: Vector, c2: Vector, to: Vector) -> NativeResult<()> {
            self.0.push(format!("C{},{} {},{} {},{}", c1.x, c1.y, c2.x, c2.y, to.x, to.y));
            Ok(())
        }
    }

    fn outline(points: &[(i64, i64)], tags: &[u8], contours: &[u16]) -> OutlineRecord {
        OutlineRecord {
            points: points.iter().map(|&(x, y)| Vector::new(x, y)).collect(),
            tags: tags.to_vec(),
            contours: contours.to_vec(),
            flags: OutlineFlags::NONE,
        }
    }

    #[test]
    fn polygon_closes_with_line() {
        let o = outline(&[(0, 0), (0, 10), (10, 0)], &[1, 1, 1], &[2]);
        let mut rec = Recorder::default();
        decompose(&o, &mut rec).unwrap();
        assert_eq!(rec.0, ["M0,0", "L0,10", "L10,0", "L0,0"]);
    }

    #[test]
    fn consecutive_conics_get_implied_midpoint() {
        let o = outline(&[(0, 0), (10, 10), (20, 10), (30, 0)], &[1, 0, 0, 1], &[3]);
        let mut rec = Recorder::default();
        decompose(&o, &mut rec).unwrap();
        assert_eq!(rec.0, ["M0,0", "Q10,10 15,10", "Q20,10 30,0", "L0,0"]);
    }

    #[test]
    fn trailing_cubic_closes_to_start() {
        let o = outline(&[(0, 0), (0, 10), (10, 10)], &[1, 2, 2], &[2]);
        let mut rec = Recorder::default();
        decompose(&o, &mut rec).unwrap();
        assert_eq!(rec.0, ["M0,0", "C0,10 10,10 0,0"]);
    }

    #[test]
    fn lone_cubic_is_invalid() {
        let o = outline(&[(0, 0), (0, 10), (10, 10)], &[1, 2, 1], &[2]);
        assert_eq!(decompose(&o, &mut Recorder::default()), Err(ErrorCode::INVALID_OUTLINE));
    }

    #[test]
    fn orientation_of_clockwise_square() {
        let o = outline(&[(0, 0), (0, 64), (64, 64), (64, 0)], &[1; 4], &[3]);
        assert_eq!(orientation(&o), Orientation::TrueType);
        let mut r = o.clone();
        reverse(&mut r);
        assert_eq!(orientation(&r), Orientation::PostScript);
    }

    #[test]
    fn square_rasterizes_solid() {
        let o = outline(&[(0, 0), (0, 128), (128, 128), (128, 0)], &[1; 4], &[3]);
        let raster = rasterize(&o, RenderMode::Normal, Vector::default()).unwrap();
        assert_eq!((raster.record.width, raster.record.rows), (2, 2));
        assert_eq!((raster.left, raster.top), (0, 2));
        assert!(raster.buffer.iter().all(|&v| v == 255));

        let mono = rasterize(&o, RenderMode::Mono, Vector::default()).unwrap();
        assert_eq!(mono.record.pitch, 1);
        assert_eq!(mono.buffer, [0xC0, 0xC0]);
    }

    #[test]
    fn mul_fix_rounds() {
        assert_eq!(mul_fix(64, 0x10000), 64);
        assert_eq!(mul_fix(64, 0x8000), 32);
        assert_eq!(mul_fix(-64, 0x8000), -32);
    }
}
