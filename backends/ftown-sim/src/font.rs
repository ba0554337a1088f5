//! The simulated font format
//!
//! A font file is the four bytes `SIMF` followed by a JSON document holding
//! one or more faces. Glyphs are polygons with optional conic and cubic
//! control points, in font units, so they decompose and rasterize the way a
//! TrueType or CFF outline would.

use std::path::Path;

use ftown_core::ErrorCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MAGIC: &[u8; 4] = b"SIMF";

#[derive(Debug, Error)]
pub enum SimError {
    #[error("not a SIMF font (bad magic)")]
    BadMagic,

    #[error("malformed font document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("font file holds no faces")]
    NoFaces,

    #[error("face '{face}' has no glyphs")]
    NoGlyphs { face: String },

    #[error("units per em {0} out of range")]
    BadUnitsPerEm(u16),

    #[error("glyph '{glyph}' has a control point index past the end of its contour")]
    BadContour { glyph: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SimError {
    /// The error code a native parser would have reported.
    pub fn code(&self) -> ErrorCode {
        match self {
            SimError::BadMagic => ErrorCode::UNKNOWN_FILE_FORMAT,
            SimError::Io(_) => ErrorCode::CANNOT_OPEN_RESOURCE,
            _ => ErrorCode::INVALID_FILE_FORMAT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimFontFile {
    pub faces: Vec<SimFont>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimFont {
    pub family_name: String,
    pub style_name: String,
    #[serde(default)]
    pub postscript_name: Option<String>,
    #[serde(default = "default_units_per_em")]
    pub units_per_em: u16,
    pub ascender: i16,
    pub descender: i16,
    #[serde(default)]
    pub line_gap: i16,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
    #[serde(default)]
    pub fixed_pitch: bool,
    #[serde(default = "default_weight_class")]
    pub weight_class: u16,
    #[serde(default)]
    pub fs_type: u16,
    pub glyphs: Vec<SimGlyph>,
    #[serde(default)]
    pub kerning: Vec<SimKern>,
    #[serde(default)]
    pub names: Vec<SimName>,
    /// Pixel sizes of embedded bitmap strikes.
    #[serde(default)]
    pub strikes: Vec<u16>,
    #[serde(default)]
    pub axes: Vec<SimAxis>,
    #[serde(default)]
    pub instances: Vec<SimInstance>,
}

fn default_units_per_em() -> u16 {
    1000
}

fn default_weight_class() -> u16 {
    400
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimGlyph {
    pub name: String,
    #[serde(default)]
    pub codepoints: Vec<u32>,
    pub advance: u16,
    #[serde(default)]
    pub contours: Vec<SimContour>,
}

/// A closed contour. Points are on-curve unless listed as conic or cubic
/// control points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimContour {
    pub points: Vec<(i32, i32)>,
    #[serde(default)]
    pub conic: Vec<usize>,
    #[serde(default)]
    pub cubic: Vec<usize>,
}

impl SimContour {
    pub fn polygon(points: &[(i32, i32)]) -> Self {
        Self {
            points: points.to_vec(),
            conic: Vec::new(),
            cubic: Vec::new(),
        }
    }

    /// Native point tag for point `i`.
    pub fn tag(&self, i: usize) -> u8 {
        if self.cubic.contains(&i) {
            0x02
        } else if self.conic.contains(&i) {
            0x00
        } else {
            0x01
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimKern {
    pub left: u32,
    pub right: u32,
    pub value: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimName {
    pub platform_id: u16,
    pub encoding_id: u16,
    pub language_id: u16,
    pub name_id: u16,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimAxis {
    pub tag: String,
    pub name: String,
    pub min: f64,
    pub default: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimInstance {
    pub name: String,
    pub coords: Vec<f64>,
}

impl SimFontFile {
    pub fn parse(bytes: &[u8]) -> Result<Self, SimError> {
        let body = bytes.strip_prefix(MAGIC.as_slice()).ok_or(SimError::BadMagic)?;
        let file: SimFontFile = serde_json::from_slice(body)?;
        file.validate()?;
        Ok(file)
    }

    pub fn read(path: impl AsRef<Path>) -> Result<Self, SimError> {
        Self::parse(&std::fs::read(path)?)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, SimError> {
        let mut out = MAGIC.to_vec();
        serde_json::to_writer(&mut out, self)?;
        Ok(out)
    }

    pub fn write(&self, path: impl AsRef<Path>) -> Result<(), SimError> {
        std::fs::write(path, self.to_bytes()?)?;
        Ok(())
    }

    fn validate(&self) -> Result<(), SimError> {
        if self.faces.is_empty() {
            return Err(SimError::NoFaces);
        }
        for face in &self.faces {
            if face.glyphs.is_empty() {
                return Err(SimError::NoGlyphs {
                    face: face.family_name.clone(),
                });
            }
            if !(16..=16384).contains(&face.units_per_em) {
                return Err(SimError::BadUnitsPerEm(face.units_per_em));
            }
            for glyph in &face.glyphs {
                let in_range = glyph.contours.iter().all(|c| {
                    c.conic.iter().chain(&c.cubic).all(|&i| i < c.points.len())
                });
                if !in_range {
                    return Err(SimError::BadContour {
                        glyph: glyph.name.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Two faces: "Sim Sans Regular" (static, with two bitmap strikes) and
    /// "Sim Sans Variable" (one `wght` axis).
    pub fn sample() -> Self {
        let regular = SimFont::sample();
        let mut variable = SimFont::sample();
        variable.style_name = "Variable".into();
        variable.postscript_name = Some("SimSans-Variable".into());
        variable.strikes.clear();
        variable.axes = vec![SimAxis {
            tag: "wght".into(),
            name: "Weight".into(),
            min: 100.0,
            default: 400.0,
            max: 900.0,
        }];
        variable.instances = vec![
            SimInstance {
                name: "Regular".into(),
                coords: vec![400.0],
            },
            SimInstance {
                name: "Bold".into(),
                coords: vec![700.0],
            },
        ];
        Self {
            faces: vec![regular, variable],
        }
    }
}

impl SimFont {
    /// Glyphs: `.notdef`, `space`, `A`, `B` (conic bowls), `O` (cubic) and
    /// `V`, with an A/V kerning pair.
    pub fn sample() -> Self {
        let glyphs = vec![
            SimGlyph {
                name: ".notdef".into(),
                codepoints: vec![],
                advance: 500,
                contours: vec![SimContour::polygon(&[(50, 0), (50, 700), (450, 700), (450, 0)])],
            },
            SimGlyph {
                name: "space".into(),
                codepoints: vec![0x20],
                advance: 250,
                contours: vec![],
            },
            SimGlyph {
                name: "A".into(),
                codepoints: vec![0x41],
                advance: 600,
                contours: vec![SimContour::polygon(&[(0, 0), (300, 700), (600, 0)])],
            },
            SimGlyph {
                name: "B".into(),
                codepoints: vec![0x42],
                advance: 550,
                contours: vec![SimContour {
                    points: vec![(0, 0), (0, 700), (350, 700), (500, 525), (350, 350), (500, 175), (350, 0)],
                    conic: vec![3, 5],
                    cubic: vec![],
                }],
            },
            SimGlyph {
                name: "O".into(),
                codepoints: vec![0x4F],
                advance: 600,
                contours: vec![SimContour {
                    points: vec![
                        (300, 0),
                        (100, 0),
                        (0, 200),
                        (0, 350),
                        (0, 500),
                        (100, 700),
                        (300, 700),
                        (500, 700),
                        (600, 500),
                        (600, 350),
                        (600, 200),
                        (500, 0),
                    ],
                    conic: vec![],
                    cubic: vec![1, 2, 4, 5, 7, 8, 10, 11],
                }],
            },
            SimGlyph {
                name: "V".into(),
                codepoints: vec![0x56],
                advance: 600,
                contours: vec![SimContour::polygon(&[(0, 700), (600, 700), (300, 0)])],
            },
        ];
        let name = |name_id: u16, value: &str| SimName {
            platform_id: 3,
            encoding_id: 1,
            language_id: 0x409,
            name_id,
            value: value.into(),
        };
        Self {
            family_name: "Sim Sans".into(),
            style_name: "Regular".into(),
            postscript_name: Some("SimSans-Regular".into()),
            units_per_em: 1000,
            ascender: 800,
            descender: -200,
            line_gap: 200,
            bold: false,
            italic: false,
            fixed_pitch: false,
            weight_class: 400,
            fs_type: 0,
            glyphs,
            kerning: vec![
                SimKern {
                    left: 2,
                    right: 5,
                    value: -80,
                },
                SimKern {
                    left: 5,
                    right: 2,
                    value: -80,
                },
            ],
            names: vec![
                name(1, "Sim Sans"),
                name(2, "Regular"),
                name(4, "Sim Sans Regular"),
                name(6, "SimSans-Regular"),
            ],
            strikes: vec![12, 16],
            axes: vec![],
            instances: vec![],
        }
    }

    pub fn glyph_index(&self, name: &str) -> Option<u32> {
        self.glyphs.iter().position(|g| g.name == name).map(|i| i as u32)
    }
}

/// Bytes of [`SimFontFile::sample`], ready for `new_memory_face`.
pub fn sample_font_bytes() -> Vec<u8> {
    let mut out = MAGIC.to_vec();
    // Serializing plain structs into a Vec cannot fail
    if serde_json::to_writer(&mut out, &SimFontFile::sample()).is_err() {
        log::error!("failed to serialize the sample font");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_survives_the_file_format() {
        let bytes = sample_font_bytes();
        assert!(bytes.starts_with(b"SIMF{"));
        assert_eq!(SimFontFile::parse(&bytes).unwrap(), SimFontFile::sample());
    }

    #[test]
    fn rejects_wrong_magic() {
        let err = SimFontFile::parse(b"OTTO\0\x01").unwrap_err();
        assert!(matches!(err, SimError::BadMagic));
        assert_eq!(err.code(), ErrorCode::UNKNOWN_FILE_FORMAT);
    }

    #[test]
    fn rejects_corrupt_body() {
        let err = SimFontFile::parse(b"SIMF{\"faces\": [").unwrap_err();
        assert!(matches!(err, SimError::Json(_)));
        assert_eq!(err.code(), ErrorCode::INVALID_FILE_FORMAT);
    }

    #[test]
    fn rejects_out_of_range_control_point() {
        let mut file = SimFontFile::sample();
        file.faces[0].glyphs[2].contours[0].conic = vec![7];
        let bytes = file.to_bytes().unwrap();
        assert!(matches!(SimFontFile::parse(&bytes), Err(SimError::BadContour { glyph }) if glyph == "A"));
    }

    #[test]
    fn minimal_document_uses_defaults() {
        let doc = br#"SIMF{"faces":[{"family_name":"Min","style_name":"Book","ascender":700,"descender":-300,
            "glyphs":[{"name":".notdef","advance":500}]}]}"#;
        let file = SimFontFile::parse(doc).unwrap();
        assert_eq!(file.faces[0].units_per_em, 1000);
        assert_eq!(file.faces[0].weight_class, 400);
        assert!(file.faces[0].kerning.is_empty());
    }
}
