// src/pgm.rs
//
// ASCII PGM (P2) reader and writer for scalar fields.
//
// Load normalizes every sample to value/maxval. Save re-quantizes to the
// 16-bit range [0, 65535] using the field's own min/max, one integer per
// line, so a save/load round trip is exact to within 1/65535.

use std::fs::{create_dir_all, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use thiserror::Error;

use crate::field::ScalarField2D;

/// Errors raised while reading a PGM file.
///
/// A malformed file is always a hard error; the loader never hands back a
/// degenerate empty field.
#[derive(Debug, Error)]
pub enum PgmError {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    #[error("not an ASCII PGM file: expected magic 'P2', found '{found}'")]
    BadMagic { found: String },

    #[error("unexpected end of file while reading {expected}")]
    Truncated { expected: &'static str },

    #[error("invalid integer '{token}' while reading {expected}")]
    BadInteger { token: String, expected: &'static str },

    #[error("maxval must be positive")]
    ZeroMaxval,
}

fn parse_int(token: Option<&str>, expected: &'static str) -> Result<u32, PgmError> {
    let token = token.ok_or(PgmError::Truncated { expected })?;
    token.parse::<u32>().map_err(|_| PgmError::BadInteger {
        token: token.to_string(),
        expected,
    })
}

/// Load an ASCII PGM (P2) image as a field with values in [0, 1].
///
/// Comment lines starting with `#` are skipped. Each sample is divided by
/// the file's maxval.
pub fn load_pgm(path: &Path) -> Result<ScalarField2D, PgmError> {
    let text = std::fs::read_to_string(path)?;

    let mut tokens = text
        .lines()
        .filter(|line| !line.trim_start().starts_with('#'))
        .flat_map(str::split_whitespace);

    let magic = tokens.next().ok_or(PgmError::Truncated {
        expected: "magic number",
    })?;
    if magic != "P2" {
        return Err(PgmError::BadMagic {
            found: magic.to_string(),
        });
    }

    let nx = parse_int(tokens.next(), "width")? as usize;
    let ny = parse_int(tokens.next(), "height")? as usize;
    let maxval = parse_int(tokens.next(), "maxval")?;
    if maxval == 0 {
        return Err(PgmError::ZeroMaxval);
    }

    let mut values = Vec::with_capacity(nx * ny);
    for _ in 0..nx * ny {
        let v = parse_int(tokens.next(), "pixel value")?;
        values.push(v as f32 / maxval as f32);
    }

    Ok(ScalarField2D::from_values(nx, ny, values))
}

/// Save a field as an ASCII PGM (P2) image, quantized to [0, 65535] with the
/// field's own min/max. A constant field writes all zeros.
pub fn save_pgm(field: &ScalarField2D, path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            create_dir_all(parent)?;
        }
    }

    let file = File::create(path)?;
    let mut w = BufWriter::new(file);

    writeln!(w, "P2")?;
    writeln!(w, "{} {}", field.nx(), field.ny())?;
    writeln!(w, "65535")?;

    let min = field.min();
    let max = field.max();
    let range = max - min;

    for &v in field.values() {
        let ival = if range > 0.0 {
            ((v - min) / range * 65535.0).round() as u32
        } else {
            0
        };
        writeln!(w, "{}", ival)?;
    }

    w.flush()?;
    Ok(())
}
