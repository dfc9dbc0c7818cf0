//! Rendering pages into host surfaces and bitmaps

use crate::engine::{Color, Engine, Rect, RENDER_ANNOT, RENDER_REVERSE_BYTE_ORDER};
use crate::error::{PdfError, RenderError};
use std::io;
use std::path::Path;
use tracing::debug;

/// Pixel layouts a host surface or bitmap may report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// 8 bits per channel, R G B A in memory order. The only format rendered into.
    Rgba8888,
    /// 8 bits per channel with the alpha byte ignored.
    Rgbx8888,
    Rgb565,
    Rgba4444,
    /// 8-bit alpha mask.
    A8,
}

impl PixelFormat {
    /// Get the number of bytes per pixel for this format.
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Rgba8888 | PixelFormat::Rgbx8888 => 4,
            PixelFormat::Rgb565 | PixelFormat::Rgba4444 => 2,
            PixelFormat::A8 => 1,
        }
    }
}

/// Pixels of a locked display surface.
pub struct SurfaceBuffer<'a> {
    pub bits: &'a mut [u8],
    pub width: i32,
    pub height: i32,
    /// Row pitch in pixels.
    pub stride: i32,
    pub format: PixelFormat,
}

/// A window surface the host composites to screen.
///
/// The surface negotiates its buffer format when locked; rendering switches
/// it to [`PixelFormat::Rgba8888`] first if it reports anything else.
pub trait DisplaySurface {
    fn width(&self) -> i32;
    fn height(&self) -> i32;
    fn format(&self) -> PixelFormat;

    /// Change the size and format of buffers handed out by future locks.
    fn set_buffers_geometry(&mut self, width: i32, height: i32, format: PixelFormat)
        -> io::Result<()>;

    /// Lock the next buffer for writing.
    fn lock(&mut self) -> io::Result<SurfaceBuffer<'_>>;

    /// Release the locked buffer and queue it for display.
    fn unlock_and_post(&mut self);
}

/// Geometry of a host bitmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitmapInfo {
    pub width: i32,
    pub height: i32,
    /// Row pitch in bytes.
    pub stride: i32,
    pub format: PixelFormat,
}

/// An in-memory bitmap owned by the host.
pub trait PixelBitmap {
    fn info(&self) -> io::Result<BitmapInfo>;

    /// Lock the pixels for writing; the slice covers `stride * height` bytes.
    fn lock_pixels(&mut self) -> io::Result<&mut [u8]>;

    fn unlock_pixels(&mut self);
}

/// Where on the target the page is drawn, and how large.
///
/// `start_x`/`start_y` may be negative to scroll the page partly off the
/// target; `draw_width`/`draw_height` are the page's rendered size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderArea {
    pub start_x: i32,
    pub start_y: i32,
    pub draw_width: i32,
    pub draw_height: i32,
}

impl RenderArea {
    pub fn new(start_x: i32, start_y: i32, draw_width: i32, draw_height: i32) -> Self {
        Self {
            start_x,
            start_y,
            draw_width,
            draw_height,
        }
    }
}

/// Configuration for page rendering.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    margin_color: Color,
    page_color: Color,
    render_annotations: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            margin_color: Color::GRAY,
            page_color: Color::WHITE,
            render_annotations: false,
        }
    }
}

impl RenderConfig {
    /// Create a new render configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Color of the canvas outside the page when the page is smaller than
    /// the target.
    ///
    /// Default: gray (0x84, 0x84, 0x84)
    pub fn set_margin_color(mut self, color: Color) -> Self {
        self.margin_color = color;
        self
    }

    /// Color painted beneath the page content.
    ///
    /// Default: opaque white
    pub fn set_page_color(mut self, color: Color) -> Self {
        self.page_color = color;
        self
    }

    /// Draw annotation appearances along with page content.
    ///
    /// Default: false
    pub fn set_render_annotations(mut self, enabled: bool) -> Self {
        self.render_annotations = enabled;
        self
    }

    pub fn margin_color(&self) -> Color {
        self.margin_color
    }

    pub fn page_color(&self) -> Color {
        self.page_color
    }

    /// Engine render flags for this configuration.
    pub fn flags(&self) -> i32 {
        let mut flags = RENDER_REVERSE_BYTE_ORDER;
        if self.render_annotations {
            flags |= RENDER_ANNOT;
        }
        flags
    }
}

/// Rectangles filled and drawn for one render call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RenderPlan {
    /// Whole-canvas fill, present when the page does not cover the canvas.
    pub margin: Option<Rect>,
    /// Page background beneath the content.
    pub base: Rect,
    /// Destination of the rasterized page.
    pub content: Rect,
}

impl RenderPlan {
    pub(crate) fn new(canvas_width: i32, canvas_height: i32, area: RenderArea) -> Self {
        let margin = (area.draw_width < canvas_width || area.draw_height < canvas_height)
            .then(|| Rect::new(0, 0, canvas_width, canvas_height));

        let base = Rect::new(
            area.start_x.max(0),
            area.start_y.max(0),
            canvas_width.min(area.draw_width),
            canvas_height.min(area.draw_height),
        );

        let content = Rect::new(
            area.start_x,
            area.start_y,
            area.draw_width,
            area.draw_height,
        );

        Self {
            margin,
            base,
            content,
        }
    }
}

/// Bytes needed for `height` rows of `width` RGBA pixels, `stride` bytes apart.
fn required_len(width: i32, height: i32, stride: i32) -> Result<usize, RenderError> {
    let width = usize::try_from(width).map_err(|_| RenderError::BitmapCreation)?;
    let height = usize::try_from(height).map_err(|_| RenderError::BitmapCreation)?;
    let stride = usize::try_from(stride).map_err(|_| RenderError::BitmapCreation)?;
    let row = width * PixelFormat::Rgba8888.bytes_per_pixel();
    if stride < row {
        return Err(RenderError::BitmapCreation);
    }
    Ok(match height {
        0 => 0,
        rows => stride * (rows - 1) + row,
    })
}

/// Fill and rasterize into RGBA pixel memory of a locked target.
#[allow(clippy::too_many_arguments)]
fn rasterize<E: Engine>(
    engine: &E,
    page: &E::Page,
    pixels: &mut [u8],
    canvas_width: i32,
    canvas_height: i32,
    stride: i32,
    area: RenderArea,
    config: &RenderConfig,
) -> Result<(), RenderError> {
    let required = required_len(canvas_width, canvas_height, stride)?;
    if pixels.len() < required {
        return Err(RenderError::BufferTooSmall {
            required,
            actual: pixels.len(),
        });
    }

    debug!(
        start_x = area.start_x,
        start_y = area.start_y,
        canvas_width,
        canvas_height,
        draw_width = area.draw_width,
        draw_height = area.draw_height,
        "Rendering page"
    );

    let plan = RenderPlan::new(canvas_width, canvas_height, area);

    let mut bitmap = engine
        .create_bitmap(pixels, canvas_width, canvas_height, stride)
        .ok_or(RenderError::BitmapCreation)?;

    if let Some(margin) = plan.margin {
        engine.fill_rect(&mut bitmap, margin, config.margin_color);
    }
    engine.fill_rect(&mut bitmap, plan.base, config.page_color);
    engine.render_page(&mut bitmap, page, plan.content, 0, config.flags());

    engine.destroy_bitmap(bitmap);
    Ok(())
}

pub(crate) fn render_to_surface<E, S>(
    engine: &E,
    page: &E::Page,
    surface: &mut S,
    area: RenderArea,
    config: &RenderConfig,
) -> Result<(), RenderError>
where
    E: Engine,
    S: DisplaySurface + ?Sized,
{
    if surface.format() != PixelFormat::Rgba8888 {
        debug!("Set format to RGBA_8888");
        let (width, height) = (surface.width(), surface.height());
        surface
            .set_buffers_geometry(width, height, PixelFormat::Rgba8888)
            .map_err(RenderError::Geometry)?;
    }

    let result = {
        let buffer = surface.lock().map_err(RenderError::Lock)?;
        if buffer.format != PixelFormat::Rgba8888 {
            Err(RenderError::UnsupportedFormat(buffer.format))
        } else {
            rasterize(
                engine,
                page,
                buffer.bits,
                buffer.width,
                buffer.height,
                buffer.stride.saturating_mul(4),
                area,
                config,
            )
        }
    };

    surface.unlock_and_post();
    result
}

pub(crate) fn render_to_bitmap<E, B>(
    engine: &E,
    page: &E::Page,
    bitmap: &mut B,
    area: RenderArea,
    config: &RenderConfig,
) -> Result<(), RenderError>
where
    E: Engine,
    B: PixelBitmap + ?Sized,
{
    let info = bitmap.info().map_err(RenderError::Info)?;
    if info.format != PixelFormat::Rgba8888 {
        return Err(RenderError::UnsupportedFormat(info.format));
    }

    let pixels = bitmap.lock_pixels().map_err(RenderError::Lock)?;
    let result = rasterize(
        engine,
        page,
        pixels,
        info.width,
        info.height,
        info.stride,
        area,
        config,
    );

    bitmap.unlock_pixels();
    result
}

/// An owned bitmap in host memory.
///
/// Useful as a render target when the host has no bitmap type of its own.
#[derive(Debug, Clone)]
pub struct MemoryBitmap {
    width: i32,
    height: i32,
    stride: i32,
    format: PixelFormat,
    pixels: Vec<u8>,
    locked: bool,
}

impl MemoryBitmap {
    /// A transparent black RGBA 8888 bitmap with tightly packed rows.
    pub fn new(width: u16, height: u16) -> Self {
        Self::with_format(width, height, PixelFormat::Rgba8888)
    }

    /// A zeroed bitmap in any format, with tightly packed rows.
    pub fn with_format(width: u16, height: u16, format: PixelFormat) -> Self {
        let stride = usize::from(width) * format.bytes_per_pixel();
        Self {
            width: i32::from(width),
            height: i32::from(height),
            stride: stride as i32,
            format,
            pixels: vec![0; stride * usize::from(height)],
            locked: false,
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Raw pixel rows.
    pub fn data(&self) -> &[u8] {
        &self.pixels
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// RGBA bytes of one pixel; `None` outside the bitmap or for non-RGBA formats.
    pub fn pixel(&self, x: i32, y: i32) -> Option<[u8; 4]> {
        if self.format != PixelFormat::Rgba8888
            || x < 0
            || y < 0
            || x >= self.width
            || y >= self.height
        {
            return None;
        }
        let offset = y as usize * self.stride as usize + x as usize * 4;
        let px = &self.pixels[offset..offset + 4];
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Save the bitmap as a PNG file.
    ///
    /// Only RGBA 8888 bitmaps can be saved.
    pub fn save_as_png<P: AsRef<Path>>(&self, path: P) -> crate::Result<()> {
        use png::{BitDepth, ColorType, Encoder};
        use std::fs::File;
        use std::io::BufWriter;

        if self.format != PixelFormat::Rgba8888 {
            return Err(PdfError::PngEncoding(format!(
                "unsupported pixel format {:?}",
                self.format
            )));
        }

        let file = File::create(path)?;
        let writer = BufWriter::new(file);

        let mut encoder = Encoder::new(writer, self.width as u32, self.height as u32);
        encoder.set_color(ColorType::Rgba);
        encoder.set_depth(BitDepth::Eight);

        let mut png_writer = encoder
            .write_header()
            .map_err(|e| PdfError::PngEncoding(e.to_string()))?;

        png_writer
            .write_image_data(&self.pixels)
            .map_err(|e| PdfError::PngEncoding(e.to_string()))?;

        Ok(())
    }
}

impl PixelBitmap for MemoryBitmap {
    fn info(&self) -> io::Result<BitmapInfo> {
        Ok(BitmapInfo {
            width: self.width,
            height: self.height,
            stride: self.stride,
            format: self.format,
        })
    }

    fn lock_pixels(&mut self) -> io::Result<&mut [u8]> {
        if self.locked {
            return Err(io::Error::new(
                io::ErrorKind::WouldBlock,
                "bitmap pixels already locked",
            ));
        }
        self.locked = true;
        Ok(&mut self.pixels)
    }

    fn unlock_pixels(&mut self) {
        self.locked = false;
    }
}
