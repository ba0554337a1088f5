//! Value types shared by the native contract and the wrappers
//!
//! Geometry follows FreeType's fixed-point conventions: positions are 26.6
//! (1/64 pixel) once scaled, or font units when unscaled; matrices and
//! variation coordinates are 16.16.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};
use std::str::FromStr;

/// 26.6 fixed point to float.
pub fn f26dot6_to_f64(v: i64) -> f64 {
    v as f64 / 64.0
}

pub fn f64_to_f26dot6(v: f64) -> i64 {
    (v * 64.0).round() as i64
}

/// 16.16 fixed point to float.
pub fn f16dot16_to_f64(v: i64) -> f64 {
    v as f64 / 65536.0
}

pub fn f64_to_f16dot16(v: f64) -> i64 {
    (v * 65536.0).round() as i64
}

/// Build a four-character native tag.
pub const fn tag(bytes: &[u8; 4]) -> u32 {
    (bytes[0] as u32) << 24 | (bytes[1] as u32) << 16 | (bytes[2] as u32) << 8 | bytes[3] as u32
}

fn tag_str(value: u32) -> String {
    value
        .to_be_bytes()
        .iter()
        .map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { '?' })
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Vector {
    pub x: i64,
    pub y: i64,
}

impl Vector {
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

/// 2x2 transform in 16.16.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Matrix {
    pub xx: i64,
    pub xy: i64,
    pub yx: i64,
    pub yy: i64,
}

impl Matrix {
    pub const IDENTITY: Matrix = Matrix {
        xx: 0x10000,
        xy: 0,
        yx: 0,
        yy: 0x10000,
    };

    pub fn from_f64(xx: f64, xy: f64, yx: f64, yy: f64) -> Self {
        Self {
            xx: f64_to_f16dot16(xx),
            xy: f64_to_f16dot16(xy),
            yx: f64_to_f16dot16(yx),
            yy: f64_to_f16dot16(yy),
        }
    }

    /// Horizontal shear by `slant` (e.g. 0.2 for a synthetic oblique).
    pub fn shear(slant: f64) -> Self {
        Self::from_f64(1.0, slant, 0.0, 1.0)
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct BBox {
    pub x_min: i64,
    pub y_min: i64,
    pub x_max: i64,
    pub y_max: i64,
}

impl BBox {
    pub fn width(&self) -> i64 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> i64 {
        self.y_max - self.y_min
    }
}

/// Format of a glyph image, as the native four-character image tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GlyphFormat {
    None,
    Composite,
    Bitmap,
    Outline,
    Plotter,
    Svg,
    Unknown(u32),
}

impl GlyphFormat {
    pub fn from_raw(raw: u32) -> Self {
        match raw {
            0 => GlyphFormat::None,
            x if x == tag(b"comp") => GlyphFormat::Composite,
            x if x == tag(b"bits") => GlyphFormat::Bitmap,
            x if x == tag(b"outl") => GlyphFormat::Outline,
            x if x == tag(b"plot") => GlyphFormat::Plotter,
            x if x == tag(b"SVG ") => GlyphFormat::Svg,
            other => GlyphFormat::Unknown(other),
        }
    }

    pub fn to_raw(self) -> u32 {
        match self {
            GlyphFormat::None => 0,
            GlyphFormat::Composite => tag(b"comp"),
            GlyphFormat::Bitmap => tag(b"bits"),
            GlyphFormat::Outline => tag(b"outl"),
            GlyphFormat::Plotter => tag(b"plot"),
            GlyphFormat::Svg => tag(b"SVG "),
            GlyphFormat::Unknown(raw) => raw,
        }
    }
}

impl fmt::Display for GlyphFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GlyphFormat::None => f.write_str("none"),
            GlyphFormat::Composite => f.write_str("composite"),
            GlyphFormat::Bitmap => f.write_str("bitmap"),
            GlyphFormat::Outline => f.write_str("outline"),
            GlyphFormat::Plotter => f.write_str("plotter"),
            GlyphFormat::Svg => f.write_str("svg"),
            GlyphFormat::Unknown(raw) => write!(f, "unknown '{}'", tag_str(*raw)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelMode {
    None,
    Mono,
    Gray,
    Gray2,
    Gray4,
    Lcd,
    LcdV,
    Bgra,
    Unknown(u8),
}

impl PixelMode {
    pub fn from_raw(raw: u8) -> Self {
        match raw {
            0 => PixelMode::None,
            1 => PixelMode::Mono,
            2 => PixelMode::Gray,
            3 => PixelMode::Gray2,
            4 => PixelMode::Gray4,
            5 => PixelMode::Lcd,
            6 => PixelMode::LcdV,
            7 => PixelMode::Bgra,
            other => PixelMode::Unknown(other),
        }
    }

    pub fn to_raw(self) -> u8 {
        match self {
            PixelMode::None => 0,
            PixelMode::Mono => 1,
            PixelMode::Gray => 2,
            PixelMode::Gray2 => 3,
            PixelMode::Gray4 => 4,
            PixelMode::Lcd => 5,
            PixelMode::LcdV => 6,
            PixelMode::Bgra => 7,
            PixelMode::Unknown(raw) => raw,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum RenderMode {
    #[default]
    Normal,
    Light,
    Mono,
    Lcd,
    LcdV,
    Sdf,
}

impl RenderMode {
    pub fn to_raw(self) -> u32 {
        match self {
            RenderMode::Normal => 0,
            RenderMode::Light => 1,
            RenderMode::Mono => 2,
            RenderMode::Lcd => 3,
            RenderMode::LcdV => 4,
            RenderMode::Sdf => 5,
        }
    }
}

/// Hinting target stored in bits 16..20 of the load flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum LoadTarget {
    #[default]
    Normal,
    Light,
    Mono,
    Lcd,
    LcdV,
}

impl LoadTarget {
    fn render_mode(self) -> RenderMode {
        match self {
            LoadTarget::Normal => RenderMode::Normal,
            LoadTarget::Light => RenderMode::Light,
            LoadTarget::Mono => RenderMode::Mono,
            LoadTarget::Lcd => RenderMode::Lcd,
            LoadTarget::LcdV => RenderMode::LcdV,
        }
    }
}

impl FromStr for LoadTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "normal" => Ok(LoadTarget::Normal),
            "light" => Ok(LoadTarget::Light),
            "mono" => Ok(LoadTarget::Mono),
            "lcd" => Ok(LoadTarget::Lcd),
            "lcd-v" | "lcd_v" | "lcdv" => Ok(LoadTarget::LcdV),
            _ => Err(format!("unknown load target: {s}")),
        }
    }
}

/// Generates a transparent newtype over a native flag word.
macro_rules! native_flags {
    (
        $(#[$meta:meta])*
        pub struct $name:ident($repr:ty) {
            $($(#[$cmeta:meta])* const $flag:ident = $value:expr;)*
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
        pub struct $name($repr);

        impl $name {
            $($(#[$cmeta])* pub const $flag: $name = $name($value);)*

            pub const fn empty() -> Self {
                $name(0)
            }

            pub const fn from_bits(bits: $repr) -> Self {
                $name(bits)
            }

            pub const fn bits(self) -> $repr {
                self.0
            }

            pub const fn contains(self, other: Self) -> bool {
                self.0 & other.0 == other.0
            }

            pub const fn is_empty(self) -> bool {
                self.0 == 0
            }
        }

        impl BitOr for $name {
            type Output = Self;

            fn bitor(self, rhs: Self) -> Self {
                $name(self.0 | rhs.0)
            }
        }

        impl BitOrAssign for $name {
            fn bitor_assign(&mut self, rhs: Self) {
                self.0 |= rhs.0;
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let mut names = Vec::new();
                $(
                    if $value != 0 && self.contains($name::$flag) {
                        names.push(stringify!($flag));
                    }
                )*
                write!(f, "{}({:#x}: {})", stringify!($name), self.0, names.join(" | "))
            }
        }
    };
}

native_flags! {
    /// Flags for `FT_Load_Glyph` and friends.
    pub struct LoadFlags(i32) {
        const DEFAULT = 0;
        const NO_SCALE = 1 << 0;
        const NO_HINTING = 1 << 1;
        const RENDER = 1 << 2;
        const NO_BITMAP = 1 << 3;
        const VERTICAL_LAYOUT = 1 << 4;
        const FORCE_AUTOHINT = 1 << 5;
        const CROP_BITMAP = 1 << 6;
        const PEDANTIC = 1 << 7;
        const IGNORE_GLOBAL_ADVANCE_WIDTH = 1 << 9;
        const NO_RECURSE = 1 << 10;
        const IGNORE_TRANSFORM = 1 << 11;
        const MONOCHROME = 1 << 12;
        const LINEAR_DESIGN = 1 << 13;
        const NO_AUTOHINT = 1 << 15;
        const COLOR = 1 << 20;
        const COMPUTE_METRICS = 1 << 21;
        const BITMAP_METRICS_ONLY = 1 << 22;
    }
}

const LOAD_TARGET_MASK: i32 = 0xF << 16;

impl LoadFlags {
    /// Replace the hinting target bits.
    pub fn with_target(self, target: LoadTarget) -> Self {
        let bits = (target.render_mode().to_raw() as i32 & 0xF) << 16;
        LoadFlags((self.0 & !LOAD_TARGET_MASK) | bits)
    }

    /// The hinting target, or `None` when the bits hold an unknown value.
    pub fn target(self) -> Option<LoadTarget> {
        match (self.0 & LOAD_TARGET_MASK) >> 16 {
            0 => Some(LoadTarget::Normal),
            1 => Some(LoadTarget::Light),
            2 => Some(LoadTarget::Mono),
            3 => Some(LoadTarget::Lcd),
            4 => Some(LoadTarget::LcdV),
            _ => None,
        }
    }

    pub fn has_explicit_target(self) -> bool {
        self.0 & LOAD_TARGET_MASK != 0
    }
}

native_flags! {
    /// `face_flags` of a face record.
    pub struct FaceFlags(i64) {
        const SCALABLE = 1 << 0;
        const FIXED_SIZES = 1 << 1;
        const FIXED_WIDTH = 1 << 2;
        const SFNT = 1 << 3;
        const HORIZONTAL = 1 << 4;
        const VERTICAL = 1 << 5;
        const KERNING = 1 << 6;
        const FAST_GLYPHS = 1 << 7;
        const MULTIPLE_MASTERS = 1 << 8;
        const GLYPH_NAMES = 1 << 9;
        const EXTERNAL_STREAM = 1 << 10;
        const HINTER = 1 << 11;
        const CID_KEYED = 1 << 12;
        const TRICKY = 1 << 13;
        const COLOR = 1 << 14;
        const VARIATION = 1 << 15;
        const SVG = 1 << 16;
        const SBIX = 1 << 17;
        const SBIX_OVERLAY = 1 << 18;
    }
}

native_flags! {
    pub struct StyleFlags(i64) {
        const ITALIC = 1 << 0;
        const BOLD = 1 << 1;
    }
}

native_flags! {
    /// `flags` of an outline record.
    pub struct OutlineFlags(i32) {
        const NONE = 0;
        const OWNER = 1 << 0;
        const EVEN_ODD_FILL = 1 << 1;
        const REVERSE_FILL = 1 << 2;
        const IGNORE_DROPOUTS = 1 << 3;
        const SMART_DROPOUTS = 1 << 4;
        const INCLUDE_STUBS = 1 << 5;
        const OVERLAP = 1 << 6;
        const HIGH_PRECISION = 1 << 8;
        const SINGLE_PASS = 1 << 9;
    }
}

native_flags! {
    /// OS/2 `fsType` embedding permissions.
    pub struct FsTypeFlags(u16) {
        const INSTALLABLE_EMBEDDING = 0;
        const RESTRICTED_LICENSE_EMBEDDING = 1 << 1;
        const PREVIEW_AND_PRINT_EMBEDDING = 1 << 2;
        const EDITABLE_EMBEDDING = 1 << 3;
        const NO_SUBSETTING = 1 << 8;
        const BITMAP_EMBEDDING_ONLY = 1 << 9;
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum KerningMode {
    #[default]
    Default,
    Unfitted,
    Unscaled,
}

impl KerningMode {
    pub fn to_raw(self) -> u32 {
        match self {
            KerningMode::Default => 0,
            KerningMode::Unfitted => 1,
            KerningMode::Unscaled => 2,
        }
    }
}

/// Character map encoding tag.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Encoding(pub u32);

impl Encoding {
    pub const NONE: Encoding = Encoding(0);
    pub const MS_SYMBOL: Encoding = Encoding(tag(b"symb"));
    pub const UNICODE: Encoding = Encoding(tag(b"unic"));
    pub const SJIS: Encoding = Encoding(tag(b"sjis"));
    pub const PRC: Encoding = Encoding(tag(b"gb  "));
    pub const BIG5: Encoding = Encoding(tag(b"big5"));
    pub const WANSUNG: Encoding = Encoding(tag(b"wans"));
    pub const JOHAB: Encoding = Encoding(tag(b"joha"));
    pub const ADOBE_STANDARD: Encoding = Encoding(tag(b"ADOB"));
    pub const ADOBE_EXPERT: Encoding = Encoding(tag(b"ADBE"));
    pub const ADOBE_CUSTOM: Encoding = Encoding(tag(b"ADBC"));
    pub const ADOBE_LATIN_1: Encoding = Encoding(tag(b"lat1"));
    pub const OLD_LATIN_2: Encoding = Encoding(tag(b"lat2"));
    pub const APPLE_ROMAN: Encoding = Encoding(tag(b"armn"));
}

impl fmt::Debug for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Encoding('{}')", tag_str(self.0))
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == 0 {
            f.write_str("none")
        } else {
            f.write_str(tag_str(self.0).trim_end())
        }
    }
}

/// Tables reachable through `FT_Get_Sfnt_Table`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SfntTag {
    Head,
    Maxp,
    Os2,
    Hhea,
    Vhea,
    Post,
    Pclt,
}

impl SfntTag {
    pub const ALL: [SfntTag; 7] = [
        SfntTag::Head,
        SfntTag::Maxp,
        SfntTag::Os2,
        SfntTag::Hhea,
        SfntTag::Vhea,
        SfntTag::Post,
        SfntTag::Pclt,
    ];

    pub fn to_raw(self) -> u32 {
        match self {
            SfntTag::Head => 0,
            SfntTag::Maxp => 1,
            SfntTag::Os2 => 2,
            SfntTag::Hhea => 3,
            SfntTag::Vhea => 4,
            SfntTag::Post => 5,
            SfntTag::Pclt => 6,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SfntTag::Head => "head",
            SfntTag::Maxp => "maxp",
            SfntTag::Os2 => "OS/2",
            SfntTag::Hhea => "hhea",
            SfntTag::Vhea => "vhea",
            SfntTag::Post => "post",
            SfntTag::Pclt => "PCLT",
        }
    }
}

/// Four-character tag of a raw SFNT table, for `FT_Load_Sfnt_Table`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TableTag(pub u32);

impl TableTag {
    /// Selects the whole font file instead of one table.
    pub const WHOLE_FONT: TableTag = TableTag(0);

    pub const fn new(bytes: &[u8; 4]) -> Self {
        TableTag(tag(bytes))
    }
}

impl fmt::Debug for TableTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TableTag('{}')", tag_str(self.0))
    }
}

impl fmt::Display for TableTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == 0 {
            f.write_str("font")
        } else {
            f.write_str(&tag_str(self.0))
        }
    }
}

/// What the dimensions of a [`SizeRequest`] measure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SizeRequestType {
    /// The EM square.
    #[default]
    Nominal,
    /// Ascender minus descender.
    RealDim,
    /// The font bounding box.
    BBox,
    /// Maximum advance width by ascender minus descender.
    Cell,
    /// Width and height are 16.16 scales, not sizes.
    Scales,
}

impl SizeRequestType {
    pub fn to_raw(self) -> u32 {
        match self {
            SizeRequestType::Nominal => 0,
            SizeRequestType::RealDim => 1,
            SizeRequestType::BBox => 2,
            SizeRequestType::Cell => 3,
            SizeRequestType::Scales => 4,
        }
    }
}

/// Argument of `FT_Request_Size`.
///
/// Width and height are 26.6 points when a resolution is given, 26.6 pixels
/// when it is zero. A zero dimension takes the other one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SizeRequest {
    pub kind: SizeRequestType,
    pub width: i64,
    pub height: i64,
    pub hori_resolution: u32,
    pub vert_resolution: u32,
}

impl SizeRequest {
    /// A request in pixels.
    pub fn pixels(kind: SizeRequestType, width: u32, height: u32) -> Self {
        SizeRequest {
            kind,
            width: i64::from(width) << 6,
            height: i64::from(height) << 6,
            hori_resolution: 0,
            vert_resolution: 0,
        }
    }
}

/// Shape of a module property's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyKind {
    UInt,
    Bool,
    Darkening,
}

impl PropertyKind {
    /// The value shape of a known property name.
    pub fn of(property: &str) -> Option<Self> {
        match property {
            "interpreter-version" | "hinting-engine" | "default-script" | "fallback-script" => {
                Some(PropertyKind::UInt)
            }
            "no-stem-darkening" | "no-long-family-names" => Some(PropertyKind::Bool),
            "darkening-parameters" => Some(PropertyKind::Darkening),
            _ => None,
        }
    }
}

/// A module property value (`FT_Property_Set` / `FT_Property_Get`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyValue {
    UInt(u32),
    Bool(bool),
    /// Four `(x, y)` control points of the stem darkening curve.
    Darkening([i32; 8]),
}

impl PropertyValue {
    pub fn kind(&self) -> PropertyKind {
        match self {
            PropertyValue::UInt(_) => PropertyKind::UInt,
            PropertyValue::Bool(_) => PropertyKind::Bool,
            PropertyValue::Darkening(_) => PropertyKind::Darkening,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum StrokerLineCap {
    #[default]
    Butt,
    Round,
    Square,
}

impl StrokerLineCap {
    pub fn to_raw(self) -> u32 {
        match self {
            StrokerLineCap::Butt => 0,
            StrokerLineCap::Round => 1,
            StrokerLineCap::Square => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum StrokerLineJoin {
    #[default]
    Round,
    Bevel,
    MiterVariable,
    MiterFixed,
}

impl StrokerLineJoin {
    pub fn to_raw(self) -> u32 {
        match self {
            StrokerLineJoin::Round => 0,
            StrokerLineJoin::Bevel => 1,
            StrokerLineJoin::MiterVariable => 2,
            StrokerLineJoin::MiterFixed => 3,
        }
    }
}

/// Fill orientation of an outline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// Clockwise outer contours, filled on the right.
    TrueType,
    /// Counter-clockwise outer contours, filled on the left.
    PostScript,
    None,
}

impl Orientation {
    pub fn from_raw(raw: u32) -> Self {
        match raw {
            0 => Orientation::TrueType,
            1 => Orientation::PostScript,
            _ => Orientation::None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum GlyphBBoxMode {
    #[default]
    Unscaled,
    Gridfit,
    Truncate,
    Pixels,
}

impl GlyphBBoxMode {
    pub fn to_raw(self) -> u32 {
        match self {
            GlyphBBoxMode::Unscaled => 0,
            GlyphBBoxMode::Gridfit => 1,
            GlyphBBoxMode::Truncate => 2,
            GlyphBBoxMode::Pixels => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LcdFilter {
    None,
    Default,
    Light,
    Legacy1,
    Legacy,
}

impl LcdFilter {
    pub fn to_raw(self) -> u32 {
        match self {
            LcdFilter::None => 0,
            LcdFilter::Default => 1,
            LcdFilter::Light => 2,
            LcdFilter::Legacy1 => 3,
            LcdFilter::Legacy => 16,
        }
    }
}

impl FromStr for LcdFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(LcdFilter::None),
            "default" => Ok(LcdFilter::Default),
            "light" => Ok(LcdFilter::Light),
            "legacy1" => Ok(LcdFilter::Legacy1),
            "legacy" => Ok(LcdFilter::Legacy),
            _ => Err(format!("unknown LCD filter: {s}")),
        }
    }
}

/// Which TrueType bytecode engine the native library was built with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrueTypeEngine {
    None,
    Unpatented,
    Patented,
}

impl TrueTypeEngine {
    pub fn from_raw(raw: u32) -> Self {
        match raw {
            1 => TrueTypeEngine::Unpatented,
            2 => TrueTypeEngine::Patented,
            _ => TrueTypeEngine::None,
        }
    }
}

/// Native library version triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: i32,
    pub minor: i32,
    pub patch: i32,
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glyph_format_tags() {
        assert_eq!(GlyphFormat::Outline.to_raw(), 0x6f75746c);
        for format in [
            GlyphFormat::None,
            GlyphFormat::Composite,
            GlyphFormat::Bitmap,
            GlyphFormat::Outline,
            GlyphFormat::Plotter,
            GlyphFormat::Svg,
        ] {
            assert_eq!(GlyphFormat::from_raw(format.to_raw()), format);
        }
        assert_eq!(GlyphFormat::from_raw(tag(b"xyzw")).to_string(), "unknown 'xyzw'");
    }

    #[test]
    fn load_target_bits() {
        let flags = LoadFlags::NO_BITMAP.with_target(LoadTarget::Light);
        assert_eq!(flags.bits(), 0x8 | 0x10000);
        assert_eq!(flags.target(), Some(LoadTarget::Light));
        assert!(flags.contains(LoadFlags::NO_BITMAP));

        let flags = flags.with_target(LoadTarget::Mono);
        assert_eq!(flags.target(), Some(LoadTarget::Mono));
        assert!(!LoadFlags::DEFAULT.has_explicit_target());
    }

    #[test]
    fn flags_debug_lists_names() {
        let flags = FaceFlags::SCALABLE | FaceFlags::KERNING;
        assert_eq!(format!("{flags:?}"), "FaceFlags(0x41: SCALABLE | KERNING)");
    }

    #[test]
    fn encoding_display() {
        assert_eq!(Encoding::UNICODE.to_string(), "unic");
        assert_eq!(Encoding::PRC.to_string(), "gb");
        assert_eq!(Encoding::NONE.to_string(), "none");
    }

    #[test]
    fn fixed_point() {
        assert_eq!(f64_to_f26dot6(12.5), 800);
        assert_eq!(f26dot6_to_f64(-64), -1.0);
        assert_eq!(Matrix::from_f64(1.0, 0.0, 0.0, 1.0), Matrix::IDENTITY);
        assert_eq!(Matrix::shear(0.5).xy, 0x8000);
    }

    #[test]
    fn table_tags_and_properties() {
        assert_eq!(TableTag::new(b"head").0, 0x68656164);
        assert_eq!(TableTag::new(b"OS/2").to_string(), "OS/2");
        assert_eq!(TableTag::WHOLE_FONT.to_string(), "font");
        assert_eq!(SizeRequest::pixels(SizeRequestType::BBox, 0, 14).height, 14 * 64);
        assert_eq!(PropertyKind::of("interpreter-version"), Some(PropertyKind::UInt));
        assert_eq!(PropertyKind::of("no-stem-darkening"), Some(PropertyKind::Bool));
        assert_eq!(PropertyKind::of("colour"), None);
        assert_eq!(PropertyValue::Darkening([0; 8]).kind(), PropertyKind::Darkening);
    }

    #[test]
    fn parse_options() {
        assert_eq!("LCD-V".parse::<LoadTarget>(), Ok(LoadTarget::LcdV));
        assert_eq!("legacy".parse::<LcdFilter>(), Ok(LcdFilter::Legacy));
        assert!("blurry".parse::<LcdFilter>().is_err());
    }
}
