use serde::Serialize;
use serde_json;
use std::fs::File;
use std::path::Path;

#[derive(Serialize)]
pub struct RunConfig {
    pub inputs: InputConfig,
    pub solver: SolverConfig,
    pub run: RunInfo,
}

#[derive(Serialize)]
pub struct InputConfig {
    pub alpha: String,
    pub altitude: String,
    pub laplacian: String,
    pub nx: usize,
    pub ny: usize,
}

#[derive(Serialize)]
pub struct SolverConfig {
    /// Number of multigrid resolutions built for this input size.
    pub resolutions: usize,
    pub min_coarse_size: usize,
    pub laplacian_scale: f32,
    pub laplacian_offset: f32,
}

#[derive(Serialize)]
pub struct RunInfo {
    pub binary: String,
    pub output: String,
}

impl RunConfig {
    pub fn write_to_dir(&self, out_dir: &Path) -> std::io::Result<()> {
        let path = out_dir.join("config.json");
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }
}
