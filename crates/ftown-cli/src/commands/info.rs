//! `ftown info`

use anyhow::Result;
use ftown::types::{FaceFlags, StyleFlags};
use ftown::Face;
use serde::Serialize;

use crate::cli::{Backend, InfoArgs};
use crate::commands::{open_face, open_library, resolve_backend};

#[derive(Debug, Serialize)]
pub struct FaceSummary {
    pub family: Option<String>,
    pub style: Option<String>,
    pub postscript_name: Option<String>,
    pub format: Option<String>,
    pub num_faces: i64,
    pub face_index: i64,
    pub num_glyphs: i64,
    pub units_per_em: u16,
    pub ascender: i16,
    pub descender: i16,
    pub height: i16,
    pub scalable: bool,
    pub bold: bool,
    pub italic: bool,
    pub fixed_sizes: Vec<i64>,
    pub charmaps: Vec<String>,
    pub axes: Vec<String>,
}

impl FaceSummary {
    pub fn read(face: &Face) -> Result<Self> {
        let record = face.record()?;
        let charmaps = face
            .charmaps()?
            .iter()
            .map(|cm| {
                cm.record()
                    .map(|r| format!("{} ({}/{})", r.encoding, r.platform_id, r.encoding_id))
            })
            .collect::<ftown::Result<Vec<_>>>()?;
        // Only variable fonts carry axes; anything else reports an error here
        let axes = if record.face_flags.contains(FaceFlags::MULTIPLE_MASTERS) {
            face.mm_var()?.axes.into_iter().map(|a| a.name).collect()
        } else {
            Vec::new()
        };
        Ok(Self {
            postscript_name: face.postscript_name()?,
            format: face.font_format()?,
            num_faces: record.num_faces,
            face_index: record.face_index,
            num_glyphs: record.num_glyphs,
            units_per_em: record.units_per_em,
            ascender: record.ascender,
            descender: record.descender,
            height: record.height,
            scalable: record.face_flags.contains(FaceFlags::SCALABLE),
            bold: record.style_flags.contains(StyleFlags::BOLD),
            italic: record.style_flags.contains(StyleFlags::ITALIC),
            fixed_sizes: record.available_sizes.iter().map(|s| s.y_ppem >> 6).collect(),
            family: record.family_name,
            style: record.style_name,
            charmaps,
            axes,
        })
    }

    fn print(&self) {
        let unknown = || "-".to_string();
        println!("Family:       {}", self.family.clone().unwrap_or_else(unknown));
        println!("Style:        {}", self.style.clone().unwrap_or_else(unknown));
        println!("PS name:      {}", self.postscript_name.clone().unwrap_or_else(unknown));
        println!("Format:       {}", self.format.clone().unwrap_or_else(unknown));
        println!("Face:         {} of {}", self.face_index & 0xffff, self.num_faces);
        println!("Glyphs:       {}", self.num_glyphs);
        println!("Units/EM:     {}", self.units_per_em);
        println!(
            "Metrics:      ascender {}, descender {}, height {}",
            self.ascender, self.descender, self.height
        );
        println!("Scalable:     {}", if self.scalable { "yes" } else { "no" });
        if !self.fixed_sizes.is_empty() {
            let sizes: Vec<String> = self.fixed_sizes.iter().map(i64::to_string).collect();
            println!("Strikes:      {} px", sizes.join(", "));
        }
        println!("Charmaps:     {}", self.charmaps.join(", "));
        if !self.axes.is_empty() {
            println!("Axes:         {}", self.axes.join(", "));
        }
    }
}

pub fn run(args: &InfoArgs, backend: Option<Backend>) -> Result<()> {
    let library = open_library(resolve_backend(backend))?;
    let face = open_face(&library, &args.face)?;
    let summary = FaceSummary::read(&face)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        summary.print();
    }

    library.dispose();
    Ok(())
}
