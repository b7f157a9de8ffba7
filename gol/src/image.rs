//! Loading the initial grid and writing snapshots.

use std::collections::HashMap;
use std::future::Future;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

use crate::error::ImageError;
use crate::grid::Grid;

pub trait ImageStore: Send + Sync + 'static {
    /// Loads the image called `name`; it must be `width x height`.
    fn load(
        &self,
        name: &str,
        width: usize,
        height: usize,
    ) -> impl Future<Output = Result<Grid, ImageError>> + Send;

    /// Stores `grid` under `name`.
    fn save(&self, name: &str, grid: &Grid) -> impl Future<Output = Result<(), ImageError>> + Send;
}

/// Binary PGM (`P5`, maxval 255) files: `{input_dir}/{name}.pgm` in,
/// `{output_dir}/{name}.pgm` out.
#[derive(Debug, Clone)]
pub struct PgmStore {
    input_dir: PathBuf,
    output_dir: PathBuf,
}

impl PgmStore {
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self { input_dir: input_dir.into(), output_dir: output_dir.into() }
    }

    pub fn input_path(&self, name: &str) -> PathBuf {
        self.input_dir.join(format!("{name}.pgm"))
    }

    pub fn output_path(&self, name: &str) -> PathBuf {
        self.output_dir.join(format!("{name}.pgm"))
    }
}

impl ImageStore for PgmStore {
    async fn load(&self, name: &str, width: usize, height: usize) -> Result<Grid, ImageError> {
        let path = self.input_path(name);
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|source| ImageError::Io { path: path.display().to_string(), source })?;
        debug!("loaded {}", path.display());
        decode_pgm(&bytes, width, height)
    }

    async fn save(&self, name: &str, grid: &Grid) -> Result<(), ImageError> {
        let path = self.output_path(name);
        let io_err = |source| ImageError::Io { path: path.display().to_string(), source };
        tokio::fs::create_dir_all(&self.output_dir).await.map_err(io_err)?;
        tokio::fs::write(&path, encode_pgm(grid)).await.map_err(io_err)?;
        debug!("wrote {}", path.display());
        Ok(())
    }
}

/// Images held in memory, shareable between clones.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    images: Arc<Mutex<HashMap<String, Grid>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, name: impl Into<String>, grid: Grid) {
        self.images.lock().unwrap_or_else(PoisonError::into_inner).insert(name.into(), grid);
    }

    pub fn get(&self, name: &str) -> Option<Grid> {
        self.images.lock().unwrap_or_else(PoisonError::into_inner).get(name).cloned()
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.images.lock().unwrap_or_else(PoisonError::into_inner).keys().cloned().collect();
        names.sort();
        names
    }
}

impl ImageStore for MemoryStore {
    async fn load(&self, name: &str, width: usize, height: usize) -> Result<Grid, ImageError> {
        let grid = self.get(name).ok_or_else(|| ImageError::Missing(name.to_string()))?;
        if (grid.width(), grid.height()) != (width, height) {
            return Err(ImageError::Dimensions {
                width,
                height,
                actual_width: grid.width(),
                actual_height: grid.height(),
            });
        }
        Ok(grid)
    }

    async fn save(&self, name: &str, grid: &Grid) -> Result<(), ImageError> {
        self.insert(name, grid.clone());
        Ok(())
    }
}

pub fn encode_pgm(grid: &Grid) -> Vec<u8> {
    let mut out = format!("P5\n{} {}\n255\n", grid.width(), grid.height()).into_bytes();
    out.extend_from_slice(grid.as_bytes());
    out
}

/// Parses a `P5` image and checks it is `width x height`.
pub fn decode_pgm(bytes: &[u8], width: usize, height: usize) -> Result<Grid, ImageError> {
    let mut pos = 0;
    let magic = header_token(bytes, &mut pos)?;
    if magic != "P5" {
        return Err(ImageError::Header(format!("unsupported magic {magic:?}")));
    }
    let actual_width = header_number(bytes, &mut pos)?;
    let actual_height = header_number(bytes, &mut pos)?;
    let maxval = header_number(bytes, &mut pos)?;
    if maxval != 255 {
        return Err(ImageError::Header(format!("maxval {maxval}, expected 255")));
    }
    // Exactly one whitespace byte separates the header from the raster.
    pos += 1;

    if (actual_width, actual_height) != (width, height) {
        return Err(ImageError::Dimensions { width, height, actual_width, actual_height });
    }
    let raster = bytes.get(pos..).unwrap_or_default();
    let expected = width * height;
    if raster.len() < expected {
        return Err(ImageError::Truncated { expected, actual: raster.len() });
    }
    Grid::from_bytes(width, height, raster[..expected].to_vec())
}

fn header_token<'a>(bytes: &'a [u8], pos: &mut usize) -> Result<&'a str, ImageError> {
    loop {
        match bytes.get(*pos) {
            Some(b) if b.is_ascii_whitespace() => *pos += 1,
            Some(b'#') => {
                while bytes.get(*pos).is_some_and(|&b| b != b'\n') {
                    *pos += 1;
                }
            }
            Some(_) => break,
            None => return Err(ImageError::Header("header ends early".into())),
        }
    }
    let start = *pos;
    while bytes.get(*pos).is_some_and(|b| !b.is_ascii_whitespace()) {
        *pos += 1;
    }
    std::str::from_utf8(&bytes[start..*pos]).map_err(|_| ImageError::Header("non-ASCII header".into()))
}

fn header_number(bytes: &[u8], pos: &mut usize) -> Result<usize, ImageError> {
    let token = header_token(bytes, pos)?;
    token.parse().map_err(|_| ImageError::Header(format!("bad number {token:?}")))
}
