//! Command-line definitions

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// ftown - look inside fonts through tracked FreeType objects
#[derive(Parser, Debug)]
#[command(name = "ftown")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Font engine. Defaults to freetype when built with it, sim otherwise
    #[arg(long, value_enum, global = true)]
    pub backend: Option<Backend>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Backend {
    /// The native FreeType library
    Freetype,
    /// The in-memory simulator, reading `.simf` fonts
    Sim,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Summarize a face
    #[command(alias = "i")]
    Info(InfoArgs),

    /// Dump the SFNT name table
    Names(FaceArgs),

    /// Draw one glyph as text
    #[command(alias = "r")]
    Render(RenderArgs),
}

#[derive(Parser, Debug)]
pub struct FaceArgs {
    /// Font file
    pub font: PathBuf,

    /// Face index within a collection
    #[arg(short = 'y', long = "face-index", default_value = "0")]
    pub face_index: i64,
}

#[derive(Parser, Debug)]
pub struct InfoArgs {
    #[command(flatten)]
    pub face: FaceArgs,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
pub struct RenderArgs {
    #[command(flatten)]
    pub face: FaceArgs,

    /// Character to draw
    pub ch: char,

    /// Pixel size
    #[arg(short = 's', long = "size", default_value = "16")]
    pub size: u32,

    /// Render 1-bit instead of antialiased
    #[arg(long)]
    pub mono: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn definitions_are_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn render_takes_font_then_char() {
        let cli = Cli::try_parse_from(["ftown", "render", "font.simf", "A", "--size", "24"]).unwrap();
        match cli.command {
            Commands::Render(args) => {
                assert_eq!(args.ch, 'A');
                assert_eq!(args.size, 24);
                assert_eq!(args.face.face_index, 0);
            }
            other => panic!("parsed as {other:?}"),
        }
    }

    #[test]
    fn backend_is_global() {
        let cli = Cli::try_parse_from(["ftown", "names", "font.simf", "--backend", "sim"]).unwrap();
        assert_eq!(cli.backend, Some(Backend::Sim));
    }
}
