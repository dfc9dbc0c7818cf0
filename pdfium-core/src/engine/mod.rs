//! The engine seam: every call this crate makes into the rendering library.

use crate::source::FileAccess;
use std::sync::Arc;

/// Render content of annotations as well as page content.
pub const RENDER_ANNOT: i32 = 0x01;
/// Write pixels as RGBA instead of the engine's native BGRA.
pub const RENDER_REVERSE_BYTE_ORDER: i32 = 0x10;

/// A pixel rectangle in bitmap coordinates (origin top-left).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Whether the pixel at `(px, py)` lies inside this rectangle.
    pub fn contains(&self, px: i32, py: i32) -> bool {
        px >= self.x && py >= self.y && px < self.x + self.width && py < self.y + self.height
    }
}

/// An 8-bit-per-channel color, in R, G, B, A order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgba(0xFF, 0xFF, 0xFF, 0xFF);
    pub const GRAY: Color = Color::rgba(0x84, 0x84, 0x84, 0xFF);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Bytes as they land in an RGBA 8888 buffer.
    pub fn to_rgba_bytes(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Operations the layer needs from a PDF rendering library.
///
/// Document, page and bitmap values are engine handles: they are created and
/// destroyed only through these methods. Implementations are not required to
/// be reentrant across documents; callers of this crate serialize access to a
/// single document or page.
pub trait Engine: Send + Sync + 'static {
    type Document: Send + Sync;
    type Page: Send + Sync;
    /// A bitmap view over host pixel memory borrowed for `'buf`.
    type Bitmap<'buf>;

    /// One-time global initialization.
    fn init_library(&self);

    /// Global teardown. No engine call may follow until the next init.
    fn destroy_library(&self);

    /// Open a document whose bytes are pulled from `source` on demand.
    ///
    /// The engine may read from `source` at any point until
    /// [`Engine::close_document`] returns. Returns `None` on failure, in
    /// which case [`Engine::last_error`] describes why.
    fn load_custom_document(
        &self,
        source: Arc<dyn FileAccess>,
        file_len: u64,
        password: Option<&str>,
    ) -> Option<Self::Document>;

    /// Error code of the most recent failed call.
    fn last_error(&self) -> u32;

    fn close_document(&self, document: Self::Document);

    fn page_count(&self, document: &Self::Document) -> i32;

    fn load_page(&self, document: &Self::Document, index: i32) -> Option<Self::Page>;

    fn close_page(&self, page: Self::Page);

    /// Page width in points.
    fn page_width(&self, page: &Self::Page) -> f64;

    /// Page height in points.
    fn page_height(&self, page: &Self::Page) -> f64;

    /// Wrap `pixels` as a `width` × `height` BGRA bitmap with rows `stride`
    /// bytes apart. The caller has checked that `pixels` is large enough.
    fn create_bitmap<'buf>(
        &self,
        pixels: &'buf mut [u8],
        width: i32,
        height: i32,
        stride: i32,
    ) -> Option<Self::Bitmap<'buf>>;

    /// Fill `rect`, clipped to the bitmap, with an opaque or translucent color.
    fn fill_rect(&self, bitmap: &mut Self::Bitmap<'_>, rect: Rect, color: Color);

    /// Rasterize `page` into `rect` of `bitmap`.
    fn render_page(
        &self,
        bitmap: &mut Self::Bitmap<'_>,
        page: &Self::Page,
        rect: Rect,
        rotation: i32,
        flags: i32,
    );

    fn destroy_bitmap(&self, bitmap: Self::Bitmap<'_>);
}

#[cfg(feature = "pdfium")]
mod pdfium;
#[cfg(feature = "pdfium")]
pub use pdfium::{PdfiumBitmap, PdfiumDocument, PdfiumEngine, PdfiumPage};
