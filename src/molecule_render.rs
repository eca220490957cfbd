//! Depiction of molecule structure strings as raster images.
//!
//! Drawing chemistry is delegated to Open Babel (`obabel`), which emits SVG;
//! `resvg` rasterises it to a fixed-size RGBA image. When Open Babel is not
//! installed, a text card showing the structure string is drawn instead.

use image::{Rgba, RgbaImage};
use itertools::Itertools;
use lazy_static::lazy_static;
use resvg::{tiny_skia, usvg};
use std::{
    io::ErrorKind,
    path::Path,
    process::{Command, Output},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};
use svg::{
    Document,
    node::element::{Rectangle, Text},
};
use thiserror::Error;
use tracing::warn;

pub const IMAGE_WIDTH: u32 = 400;
pub const IMAGE_HEIGHT: u32 = 300;

const DEFAULT_OBABEL_BIN: &str = "obabel";
const OBABEL_ENV_BIN: &str = "MOLANNOT_OBABEL_BIN";
const NOTHING_CONVERTED: &str = "0 molecules converted";
const CARD_LINE_CHARS: usize = 36;
const CARD_MAX_LINES: usize = 8;

lazy_static! {
    static ref FONT_DB: Arc<usvg::fontdb::Database> = {
        let mut db = usvg::fontdb::Database::new();
        db.load_system_fonts();
        Arc::new(db)
    };
}

#[derive(Debug, Clone, Error)]
pub enum RenderError {
    #[error("Structure string is empty")]
    EmptyStructure,

    #[error(
        "Could not find obabel executable '{executable}'. Install Open Babel or set MOLANNOT_OBABEL_BIN"
    )]
    ToolNotFound { executable: String },

    #[error(
        "obabel command failed: {executable} {} (status={status:?}, stderr='{}')",
        .args.join(" "),
        .stderr.trim()
    )]
    ToolFailed {
        executable: String,
        args: Vec<String>,
        status: Option<i32>,
        stderr: String,
    },

    #[error("Could not parse structure '{structure}': {message}")]
    InvalidStructure { structure: String, message: String },

    #[error("Could not rasterize depiction: {0}")]
    Rasterize(String),

    #[error("{0}")]
    Io(String),
}

/// A depiction: the SVG it was drawn from and its raster.
#[derive(Clone, Debug)]
pub struct MoleculeImage {
    svg: String,
    pixels: RgbaImage,
}

impl MoleculeImage {
    pub fn from_svg(svg: String) -> Result<Self, RenderError> {
        let pixels = rasterize(&svg)?;
        Ok(Self { svg, pixels })
    }

    pub fn svg(&self) -> &str {
        &self.svg
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn size(&self) -> [usize; 2] {
        [self.pixels.width() as usize, self.pixels.height() as usize]
    }

    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<(), RenderError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    RenderError::Io(format!("Could not create image output directory: {e}"))
                })?;
            }
        }
        self.pixels
            .save_with_format(path, image::ImageFormat::Png)
            .map_err(|e| RenderError::Io(format!("Could not write '{}': {e}", path.display())))
    }
}

fn rasterize(svg: &str) -> Result<RgbaImage, RenderError> {
    let options = usvg::Options {
        fontdb: FONT_DB.clone(),
        ..usvg::Options::default()
    };
    let tree =
        usvg::Tree::from_str(svg, &options).map_err(|e| RenderError::Rasterize(e.to_string()))?;
    let mut pixmap = tiny_skia::Pixmap::new(IMAGE_WIDTH, IMAGE_HEIGHT)
        .ok_or_else(|| RenderError::Rasterize("zero-sized canvas".to_string()))?;
    pixmap.fill(tiny_skia::Color::WHITE);

    let size = tree.size();
    let (width, height) = (IMAGE_WIDTH as f32, IMAGE_HEIGHT as f32);
    let scale = (width / size.width()).min(height / size.height());
    if !scale.is_finite() || scale <= 0.0 {
        return Err(RenderError::Rasterize("depiction has no area".to_string()));
    }
    let dx = (width - size.width() * scale) / 2.0;
    let dy = (height - size.height() * scale) / 2.0;
    let transform = tiny_skia::Transform::from_row(scale, 0.0, 0.0, scale, dx, dy);
    resvg::render(&tree, transform, &mut pixmap.as_mut());

    let mut pixels = RgbaImage::new(IMAGE_WIDTH, IMAGE_HEIGHT);
    for (dst, src) in pixels.pixels_mut().zip(pixmap.pixels()) {
        let c = src.demultiply();
        *dst = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
    }
    Ok(pixels)
}

pub trait MoleculeRenderer {
    fn render(&self, structure: &str) -> Result<MoleculeImage, RenderError>;
}

fn ensure_structure(structure: &str) -> Result<&str, RenderError> {
    let structure = structure.trim();
    if structure.is_empty() {
        return Err(RenderError::EmptyStructure);
    }
    Ok(structure)
}

#[derive(Clone, Debug)]
pub struct ObabelRenderer {
    executable: String,
}

impl ObabelRenderer {
    pub fn new(executable: &str) -> Self {
        Self {
            executable: executable.to_string(),
        }
    }

    pub fn from_env() -> Self {
        let executable = std::env::var(OBABEL_ENV_BIN)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_OBABEL_BIN.to_string());
        Self { executable }
    }

    pub fn executable(&self) -> &str {
        &self.executable
    }

    fn run(&self, args: &[String]) -> Result<Output, RenderError> {
        Command::new(&self.executable).args(args).output().map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                RenderError::ToolNotFound {
                    executable: self.executable.clone(),
                }
            } else {
                RenderError::Io(format!(
                    "Could not run obabel executable '{}' with args [{}]: {e}",
                    self.executable,
                    args.join(" ")
                ))
            }
        })
    }
}

impl Default for ObabelRenderer {
    fn default() -> Self {
        Self::from_env()
    }
}

impl MoleculeRenderer for ObabelRenderer {
    fn render(&self, structure: &str) -> Result<MoleculeImage, RenderError> {
        let structure = ensure_structure(structure)?;
        let args = vec![format!("-:{structure}"), "-osvg".to_string()];
        let output = self.run(&args)?;
        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if stderr.contains(NOTHING_CONVERTED) {
            let message = stderr
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('='))
                .join(" ");
            return Err(RenderError::InvalidStructure {
                structure: structure.to_string(),
                message,
            });
        }
        if !output.status.success() || !stdout.contains("<svg") {
            return Err(RenderError::ToolFailed {
                executable: self.executable.clone(),
                args,
                status: output.status.code(),
                stderr,
            });
        }
        MoleculeImage::from_svg(stdout)
    }
}

/// Draws the structure string itself on a card. Used when no depiction tool
/// is available and for placeholders.
#[derive(Clone, Copy, Debug, Default)]
pub struct TextCardRenderer;

impl TextCardRenderer {
    pub fn card_svg(structure: &str, note: Option<&str>) -> String {
        let mut doc = Document::new()
            .set("viewBox", (0, 0, IMAGE_WIDTH, IMAGE_HEIGHT))
            .set("width", IMAGE_WIDTH)
            .set("height", IMAGE_HEIGHT)
            .add(
                Rectangle::new()
                    .set("x", 4)
                    .set("y", 4)
                    .set("width", IMAGE_WIDTH - 8)
                    .set("height", IMAGE_HEIGHT - 8)
                    .set("fill", "#fafafa")
                    .set("stroke", "#b0b0b0")
                    .set("rx", 6),
            );

        let lines: Vec<String> = structure
            .chars()
            .chunks(CARD_LINE_CHARS)
            .into_iter()
            .take(CARD_MAX_LINES)
            .map(|chunk| chunk.collect())
            .collect();
        let top = 40.0 + (CARD_MAX_LINES - lines.len()) as f32 * 9.0;
        for (row, line) in lines.into_iter().enumerate() {
            doc = doc.add(
                Text::new(line)
                    .set("x", IMAGE_WIDTH / 2)
                    .set("y", top + row as f32 * 22.0)
                    .set("text-anchor", "middle")
                    .set("font-family", "Menlo, Consolas, monospace")
                    .set("font-size", 16)
                    .set("fill", "#202020"),
            );
        }

        if let Some(note) = note {
            doc = doc.add(
                Text::new(note.to_string())
                    .set("x", IMAGE_WIDTH / 2)
                    .set("y", IMAGE_HEIGHT - 24)
                    .set("text-anchor", "middle")
                    .set("font-family", "Helvetica, Arial, sans-serif")
                    .set("font-size", 13)
                    .set("fill", "#b42d2d"),
            );
        }
        doc.to_string()
    }

    pub fn placeholder(structure: &str, reason: &str) -> Option<MoleculeImage> {
        let label = if structure.trim().is_empty() {
            "(empty structure)"
        } else {
            structure
        };
        MoleculeImage::from_svg(Self::card_svg(label, Some(reason))).ok()
    }
}

impl MoleculeRenderer for TextCardRenderer {
    fn render(&self, structure: &str) -> Result<MoleculeImage, RenderError> {
        let structure = ensure_structure(structure)?;
        MoleculeImage::from_svg(Self::card_svg(structure, None))
    }
}

/// Open Babel when available, the text card otherwise.
#[derive(Debug, Default)]
pub struct DefaultRenderer {
    obabel: ObabelRenderer,
    fallback: TextCardRenderer,
    fallback_warned: AtomicBool,
}

impl DefaultRenderer {
    pub fn new(obabel: ObabelRenderer) -> Self {
        Self {
            obabel,
            fallback: TextCardRenderer,
            fallback_warned: AtomicBool::new(false),
        }
    }
}

impl MoleculeRenderer for DefaultRenderer {
    fn render(&self, structure: &str) -> Result<MoleculeImage, RenderError> {
        match self.obabel.render(structure) {
            Err(RenderError::ToolNotFound { executable }) => {
                if !self.fallback_warned.swap(true, Ordering::Relaxed) {
                    warn!(
                        executable,
                        "obabel not found, drawing structure strings as text cards"
                    );
                }
                self.fallback.render(structure)
            }
            other => other,
        }
    }
}
