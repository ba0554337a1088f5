//! `ftown render`

use anyhow::{bail, Result};
use ftown::records::BitmapRecord;
use ftown::{LoadFlags, PixelMode, RenderMode};

use crate::cli::{Backend, RenderArgs};
use crate::commands::{open_face, open_library, resolve_backend};

/// Darkest last.
const RAMP: &[u8] = b" .:-=+*#%@";

pub fn run(args: &RenderArgs, backend: Option<Backend>) -> Result<()> {
    let library = open_library(resolve_backend(backend))?;
    let face = open_face(&library, &args.face)?;

    face.set_pixel_sizes(0, args.size)?;
    let code = u32::from(args.ch);
    if face.char_index(code)? == 0 {
        log::warn!("{:?} is not mapped; drawing the missing glyph", args.ch);
    }
    face.load_char(code, LoadFlags::DEFAULT)?;

    let slot = face.glyph()?;
    slot.render(if args.mono { RenderMode::Mono } else { RenderMode::Normal })?;
    let bitmap = slot.bitmap()?;
    let record = bitmap.record()?;
    let buffer = bitmap.buffer()?;

    for line in ascii_rows(&record, &buffer)? {
        println!("{line}");
    }

    library.dispose();
    Ok(())
}

/// Lay a bitmap out as text, top row first.
pub fn ascii_rows(record: &BitmapRecord, buffer: &[u8]) -> Result<Vec<String>> {
    let stride = record.pitch.unsigned_abs() as usize;
    if buffer.len() < record.buffer_len() {
        bail!("bitmap buffer is {} bytes, expected {}", buffer.len(), record.buffer_len());
    }
    let rows = record.rows as usize;
    let width = record.width as usize;

    let mut lines = Vec::with_capacity(rows);
    for y in 0..rows {
        // Negative pitch stores rows bottom-up
        let row_index = if record.pitch < 0 { rows - 1 - y } else { y };
        let row = &buffer[row_index * stride..(row_index + 1) * stride];
        let line: String = match record.pixel_mode {
            PixelMode::Gray => row[..width]
                .iter()
                .map(|&v| RAMP[v as usize * (RAMP.len() - 1) / 255] as char)
                .collect(),
            PixelMode::Mono => (0..width)
                .map(|x| if row[x / 8] & (0x80 >> (x % 8)) != 0 { '#' } else { ' ' })
                .collect(),
            other => bail!("cannot draw {other:?} bitmaps"),
        };
        lines.push(line.trim_end().to_string());
    }
    Ok(lines)
}
