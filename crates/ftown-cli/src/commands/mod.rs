//! Subcommand implementations

pub mod info;
pub mod names;
pub mod render;

use std::rc::Rc;

use anyhow::{bail, Context, Result};
use ftown::{Face, Library};
use ftown_sim::SimFreeType;

use crate::cli::{Backend, FaceArgs};

pub fn resolve_backend(requested: Option<Backend>) -> Backend {
    match requested {
        Some(backend) => backend,
        None if cfg!(feature = "freetype") => Backend::Freetype,
        None => Backend::Sim,
    }
}

pub fn open_library(backend: Backend) -> Result<Library> {
    let library = match backend {
        Backend::Sim => Library::with_api(Rc::new(SimFreeType::new()))?,
        Backend::Freetype => native_library()?,
    };
    log::debug!("using the {} backend", library.backend_name());
    Ok(library)
}

#[cfg(feature = "freetype")]
fn native_library() -> Result<Library> {
    Ok(Library::new()?)
}

#[cfg(not(feature = "freetype"))]
fn native_library() -> Result<Library> {
    bail!("this ftown was built without the `freetype` feature; use --backend sim")
}

pub fn open_face(library: &Library, args: &FaceArgs) -> Result<Face> {
    if !args.font.exists() {
        bail!("font file not found: {}", args.font.display());
    }
    library
        .new_face(&args.font, args.face_index)
        .with_context(|| format!("cannot open {} (face {})", args.font.display(), args.face_index))
}
