//! `ftown names`

use anyhow::Result;

use crate::cli::{Backend, FaceArgs};
use crate::commands::{open_face, open_library, resolve_backend};

pub fn run(args: &FaceArgs, backend: Option<Backend>) -> Result<()> {
    let library = open_library(resolve_backend(backend))?;
    let face = open_face(&library, args)?;

    let names = face.sfnt_names()?;
    if names.is_empty() {
        println!("(no name table)");
    }
    for name in &names {
        println!(
            "{:>3}  {}/{}/{:#06x}  {}",
            name.name_id,
            name.platform_id,
            name.encoding_id,
            name.language_id,
            name.to_string_lossy()
        );
    }

    library.dispose();
    Ok(())
}
