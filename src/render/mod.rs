//! Module matrix rasterization
//!
//! Two rasters are produced per symbol:
//! - the export raster, `(n + 2 * border) * scale` pixels square, one filled
//!   `scale` x `scale` square per module
//! - a fixed-size preview holding the export raster shrunk (never enlarged)
//!   with nearest-neighbour sampling and centered on a white background
//!
//! White is both the background and the colour key for transparency.

use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage, Rgba, RgbaImage};
use log::debug;

use crate::encoder::{EncodeRequest, Encoder, QrcodeEncoder};
use crate::error::{GenerateError, RenderError};
use crate::models::{ECLevel, ModuleMatrix};

/// Quiet zone width in modules
pub const QUIET_ZONE_MODULES: usize = 4;

/// Side of the square preview bounding box
pub const PREVIEW_SIZE: u32 = 380;

/// Background and transparency key
pub const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);

/// Dark module colour
pub const FOREGROUND: Rgb<u8> = Rgb([0, 0, 0]);

/// Pixels per module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ModuleScale {
    /// 4 px
    X4,
    /// 8 px
    #[default]
    X8,
    /// 12 px
    X12,
    /// 16 px
    X16,
}

impl ModuleScale {
    /// Supported scales, smallest first
    pub const ALL: [ModuleScale; 4] = [
        ModuleScale::X4,
        ModuleScale::X8,
        ModuleScale::X12,
        ModuleScale::X16,
    ];

    /// Pixels per module side
    pub fn pixels(&self) -> u32 {
        match self {
            ModuleScale::X4 => 4,
            ModuleScale::X8 => 8,
            ModuleScale::X12 => 12,
            ModuleScale::X16 => 16,
        }
    }
}

impl TryFrom<u32> for ModuleScale {
    type Error = RenderError;

    fn try_from(pixels: u32) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|s| s.pixels() == pixels)
            .ok_or(RenderError::UnsupportedScale(pixels))
    }
}

/// Per-request rendering parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Pixels per module
    pub scale: ModuleScale,
    /// Quiet zone in modules
    pub border: usize,
    /// Preview bounding box side
    pub preview_size: u32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            scale: ModuleScale::default(),
            border: QUIET_ZONE_MODULES,
            preview_size: PREVIEW_SIZE,
        }
    }
}

impl RenderOptions {
    /// Default options at `scale`
    pub fn with_scale(scale: ModuleScale) -> Self {
        Self {
            scale,
            ..Self::default()
        }
    }

    /// Export raster side for a matrix of `modules` per side
    pub fn export_size(&self, modules: usize) -> u64 {
        (modules as u64 + 2 * self.border as u64) * self.scale.pixels() as u64
    }
}

/// Where the export raster lands inside the preview
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreviewGeometry {
    /// `min(1, preview / export)`
    pub factor: f64,
    /// Side of the resampled export raster
    pub scaled_size: u32,
    /// Offset on both axes
    pub offset: u32,
}

/// Fit an `export_size` square into a `preview_size` square
pub fn preview_geometry(export_size: u32, preview_size: u32) -> PreviewGeometry {
    let factor = if export_size == 0 {
        1.0
    } else {
        (preview_size as f64 / export_size as f64).min(1.0)
    };
    let scaled_size = ((export_size as f64 * factor).round() as u32).min(preview_size);
    PreviewGeometry {
        factor,
        scaled_size,
        offset: (preview_size - scaled_size) / 2,
    }
}

/// White square raster of `side` pixels, failing instead of aborting when
/// the storage cannot be had
fn blank_raster(side: u64) -> Result<RgbImage, RenderError> {
    let failed = || RenderError::AllocationFailed {
        width: side,
        height: side,
    };
    let dim = u32::try_from(side).map_err(|_| failed())?;
    let len = side
        .checked_mul(side)
        .and_then(|px| px.checked_mul(3))
        .and_then(|bytes| usize::try_from(bytes).ok())
        .ok_or_else(failed)?;

    let mut data = Vec::new();
    data.try_reserve_exact(len).map_err(|_| failed())?;
    data.resize(len, BACKGROUND.0[0]);
    RgbImage::from_raw(dim, dim, data).ok_or_else(failed)
}

/// Draw the full-resolution export raster
pub fn render_export(
    matrix: &ModuleMatrix,
    options: &RenderOptions,
) -> Result<RgbImage, RenderError> {
    let side = options.export_size(matrix.size());
    let mut image = blank_raster(side)?;

    let scale = options.scale.pixels() as usize;
    let row_bytes = side as usize * 3;
    let data: &mut [u8] = &mut image;
    for my in 0..matrix.size() {
        let top = (options.border + my) * scale;
        for mx in 0..matrix.size() {
            if !matrix.get(mx, my) {
                continue;
            }
            let left = (options.border + mx) * scale * 3;
            for y in top..top + scale {
                let start = y * row_bytes + left;
                data[start..start + scale * 3].fill(FOREGROUND.0[0]);
            }
        }
    }

    debug!(
        "Rendered {}x{} modules at {} px into {}x{} raster",
        matrix.size(),
        matrix.size(),
        scale,
        side,
        side
    );
    Ok(image)
}

/// Shrink `export` into a centered, fixed-size preview
pub fn render_preview(
    export: &RgbImage,
    options: &RenderOptions,
) -> Result<RgbImage, RenderError> {
    let geometry = preview_geometry(export.width(), options.preview_size);
    let mut preview = blank_raster(options.preview_size as u64)?;
    if geometry.scaled_size == 0 {
        return Ok(preview);
    }

    let scaled = if geometry.scaled_size == export.width() {
        export.clone()
    } else {
        imageops::resize(
            export,
            geometry.scaled_size,
            geometry.scaled_size,
            FilterType::Nearest,
        )
    };
    imageops::replace(
        &mut preview,
        &scaled,
        geometry.offset as i64,
        geometry.offset as i64,
    );
    Ok(preview)
}

/// Copy of `raster` where background pixels are fully transparent
pub fn color_keyed(raster: &RgbImage) -> RgbaImage {
    RgbaImage::from_fn(raster.width(), raster.height(), |x, y| {
        let px = raster.get_pixel(x, y);
        let alpha = if *px == BACKGROUND { 0 } else { 255 };
        Rgba([px[0], px[1], px[2], alpha])
    })
}

/// A matrix with both of its rasters
#[derive(Debug, Clone)]
pub struct RenderedSymbol {
    /// Source matrix
    pub matrix: ModuleMatrix,
    /// Level it was encoded at
    pub level: ECLevel,
    /// Options used for both rasters
    pub options: RenderOptions,
    /// Full-resolution raster
    pub export: RgbImage,
    /// Fixed-size preview
    pub preview: RgbImage,
}

impl RenderedSymbol {
    /// Rasterize `matrix`
    pub fn render(
        matrix: ModuleMatrix,
        level: ECLevel,
        options: RenderOptions,
    ) -> Result<Self, RenderError> {
        let export = render_export(&matrix, &options)?;
        let preview = render_preview(&export, &options)?;
        Ok(Self {
            matrix,
            level,
            options,
            export,
            preview,
        })
    }
}

/// Owner of the current generated symbol
#[derive(Debug, Default)]
pub enum SymbolWorkspace {
    /// Nothing generated yet
    #[default]
    Empty,
    /// Current symbol
    Rendered(RenderedSymbol),
}

impl SymbolWorkspace {
    /// Current symbol, if any
    pub fn symbol(&self) -> Option<&RenderedSymbol> {
        match self {
            SymbolWorkspace::Empty => None,
            SymbolWorkspace::Rendered(symbol) => Some(symbol),
        }
    }

    /// Encode and render `text` with the default encoder
    pub fn regenerate(
        &mut self,
        text: &str,
        level: ECLevel,
        options: RenderOptions,
    ) -> Result<(), GenerateError> {
        self.regenerate_with(&QrcodeEncoder, text, level, options)
    }

    /// Encode and render `text`, replacing the current symbol.
    ///
    /// On failure the current symbol is left in place. On success it is
    /// dropped before the new one is installed.
    pub fn regenerate_with<E: Encoder + ?Sized>(
        &mut self,
        encoder: &E,
        text: &str,
        level: ECLevel,
        options: RenderOptions,
    ) -> Result<(), GenerateError> {
        if text.is_empty() {
            return Err(GenerateError::EmptyText);
        }
        let request = EncodeRequest::build(text, level)?;
        let matrix = encoder.encode(&request)?;
        let symbol = RenderedSymbol::render(matrix, level, options)?;

        self.clear();
        *self = SymbolWorkspace::Rendered(symbol);
        Ok(())
    }

    /// Drop the current symbol
    pub fn clear(&mut self) {
        *self = SymbolWorkspace::Empty;
    }
}
