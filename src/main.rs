// src/main.rs
//
// Command-line driver for the heightfield diffusion solver.
//
// Input convention: `alpha` marks fixed
// (Dirichlet) cells with 0 and free (laplacian-governed) cells with 1,
// `altitude` carries the fixed target values, `laplacian` the target
// curvature (stored as a grey image centred on 0.5).
//
// Example:
//
//   cargo run --release -- alpha=data/004_mask.pgm altitude=data/004_alt.pgm \
//       laplacian=data/004_lap.pgm out=results/result.pgm preview
//
// Typical outputs (next to the result):
//   results/
//     ├── result.pgm
//     ├── result_preview.png   (if `preview` is enabled)
//     └── config.json

use std::env;
use std::path::{Path, PathBuf};
use std::process::exit;

use diffusion_terrain::config::{InputConfig, RunConfig, RunInfo, SolverConfig};
use diffusion_terrain::hierarchy::MIN_COARSE_SIZE;
use diffusion_terrain::pgm::{load_pgm, save_pgm};
use diffusion_terrain::solver::DiffusionSolver;
use diffusion_terrain::visualisation::save_height_plot;

fn print_usage() {
    eprintln!(
        r#"Usage:
  cargo run --release -- alpha=FILE altitude=FILE laplacian=FILE
             [out=FILE] [lapscale=VAL] [lapoffset=VAL] [preview]

Notes:
  - All three inputs must be ASCII PGM (P2) images of the same square size.
  - alpha and altitude are normalized to [0, 1] on load; the laplacian map is
    recentred by lapoffset (default -0.5) and scaled by lapscale
    (default 0.03) to set the strength of the curvature constraints.
  - The result is written as a 16-bit ASCII PGM (default result.pgm), plus a
    PNG preview if 'preview' is set.
"#
    );
}

struct Args {
    alpha: String,
    altitude: String,
    laplacian: String,
    out: String,
    lap_scale: f32,
    lap_offset: f32,
    preview: bool,
}

fn parse_args() -> Option<Args> {
    let mut alpha = None;
    let mut altitude = None;
    let mut laplacian = None;
    let mut out = "result.pgm".to_string();
    let mut lap_scale = 0.03f32;
    let mut lap_offset = -0.5f32;
    let mut preview = false;

    for arg in env::args().skip(1) {
        if arg == "preview" {
            preview = true;
            continue;
        }
        let Some((key, value)) = arg.split_once('=') else {
            eprintln!("unrecognised argument '{}'", arg);
            return None;
        };
        match key {
            "alpha" => alpha = Some(value.to_string()),
            "altitude" | "alt" => altitude = Some(value.to_string()),
            "laplacian" | "lap" => laplacian = Some(value.to_string()),
            "out" => out = value.to_string(),
            "lapscale" => match value.parse() {
                Ok(v) => lap_scale = v,
                Err(_) => {
                    eprintln!("lapscale: not a number: '{}'", value);
                    return None;
                }
            },
            "lapoffset" => match value.parse() {
                Ok(v) => lap_offset = v,
                Err(_) => {
                    eprintln!("lapoffset: not a number: '{}'", value);
                    return None;
                }
            },
            _ => {
                eprintln!("unrecognised option '{}'", key);
                return None;
            }
        }
    }

    Some(Args {
        alpha: alpha?,
        altitude: altitude?,
        laplacian: laplacian?,
        out,
        lap_scale,
        lap_offset,
        preview,
    })
}

fn main() {
    env_logger::init();

    let Some(args) = parse_args() else {
        print_usage();
        exit(1);
    };

    // Load the constraint maps.
    let mut alpha = match load_pgm(Path::new(&args.alpha)) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("failed to load alpha map '{}': {}", args.alpha, e);
            exit(1);
        }
    };
    let mut altitude = match load_pgm(Path::new(&args.altitude)) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("failed to load altitude map '{}': {}", args.altitude, e);
            exit(1);
        }
    };
    let mut laplacian = match load_pgm(Path::new(&args.laplacian)) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("failed to load laplacian map '{}': {}", args.laplacian, e);
            exit(1);
        }
    };

    alpha.normalize();
    altitude.normalize();
    // Centre the laplacian map on zero, then set the constraint strength.
    laplacian.affine(1.0, args.lap_offset);
    laplacian.affine(args.lap_scale, 0.0);

    let nx = alpha.nx();
    let ny = alpha.ny();

    let mut solver = match DiffusionSolver::new(alpha, altitude, laplacian) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("cannot build the multigrid hierarchy: {}", e);
            exit(1);
        }
    };

    if let Err(e) = solver.solve() {
        eprintln!("solve aborted: {}", e);
        exit(1);
    }

    let result = match solver.result() {
        Ok(r) => r,
        Err(e) => {
            eprintln!("result read-back failed: {}", e);
            exit(1);
        }
    };

    let out_path = PathBuf::from(&args.out);
    if let Err(e) = save_pgm(&result, &out_path) {
        eprintln!("failed to save '{}': {}", args.out, e);
        exit(1);
    }
    println!("wrote {}", args.out);

    if args.preview {
        let preview_path = out_path.with_extension("").to_string_lossy().into_owned() + "_preview.png";
        if let Err(e) = save_height_plot(&result, &preview_path) {
            eprintln!("failed to save preview '{}': {}", preview_path, e);
            exit(1);
        }
        println!("wrote {}", preview_path);
    }

    let config = RunConfig {
        inputs: InputConfig {
            alpha: args.alpha,
            altitude: args.altitude,
            laplacian: args.laplacian,
            nx,
            ny,
        },
        solver: SolverConfig {
            resolutions: solver.depth(),
            min_coarse_size: MIN_COARSE_SIZE,
            laplacian_scale: args.lap_scale,
            laplacian_offset: args.lap_offset,
        },
        run: RunInfo {
            binary: "diffusion-terrain".to_string(),
            output: args.out,
        },
    };
    let out_dir = out_path.parent().filter(|p| !p.as_os_str().is_empty());
    if let Err(e) = config.write_to_dir(out_dir.unwrap_or(Path::new("."))) {
        eprintln!("failed to write config.json: {}", e);
    }
}
