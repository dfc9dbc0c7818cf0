//! PDF page representation

use crate::document::DocumentInner;
use crate::engine::Engine;
use crate::error::RenderError;
use crate::render::{self, DisplaySurface, PixelBitmap, RenderArea, RenderConfig};
use std::mem::ManuallyDrop;
use std::sync::Arc;

/// Points per inch.
const POINTS_PER_INCH: f64 = 72.0;

/// An open page of a [`PdfDocument`](crate::PdfDocument).
///
/// The page holds a reference to its document, so the document stays open
/// at least as long as the page. Dropping the page closes it.
pub struct PdfPage<E: Engine> {
    // Closed in Drop, before the document reference is released.
    handle: ManuallyDrop<E::Page>,
    doc_inner: Arc<DocumentInner<E>>,
    index: i32,
}

impl<E: Engine> PdfPage<E> {
    pub(crate) fn new(handle: E::Page, doc_inner: Arc<DocumentInner<E>>, index: i32) -> Self {
        Self {
            handle: ManuallyDrop::new(handle),
            doc_inner,
            index,
        }
    }

    pub(crate) fn engine(&self) -> &E {
        self.doc_inner.engine()
    }

    pub(crate) fn handle(&self) -> &E::Page {
        &self.handle
    }

    /// Get the page index (0-based).
    pub fn index(&self) -> i32 {
        self.index
    }

    /// Get the page width in points (1/72 inch).
    pub fn width(&self) -> f64 {
        self.engine().page_width(self.handle())
    }

    /// Get the page height in points (1/72 inch).
    pub fn height(&self) -> f64 {
        self.engine().page_height(self.handle())
    }

    /// Page width in whole points.
    pub fn width_points(&self) -> i32 {
        self.width() as i32
    }

    /// Page height in whole points.
    pub fn height_points(&self) -> i32 {
        self.height() as i32
    }

    /// Page width in pixels at `dpi`, truncated toward zero.
    pub fn width_pixels(&self, dpi: i32) -> i32 {
        points_to_pixels(self.width(), dpi)
    }

    /// Page height in pixels at `dpi`, truncated toward zero.
    pub fn height_pixels(&self, dpi: i32) -> i32 {
        points_to_pixels(self.height(), dpi)
    }

    /// Render into a display surface, switching it to RGBA 8888 if needed.
    pub fn render_to_surface<S>(
        &self,
        surface: &mut S,
        area: RenderArea,
        config: &RenderConfig,
    ) -> Result<(), RenderError>
    where
        S: DisplaySurface + ?Sized,
    {
        render::render_to_surface(self.engine(), self.handle(), surface, area, config)
    }

    /// Render into an RGBA 8888 bitmap.
    ///
    /// Bitmaps in any other format are rejected without being written.
    pub fn render_to_bitmap<B>(
        &self,
        bitmap: &mut B,
        area: RenderArea,
        config: &RenderConfig,
    ) -> Result<(), RenderError>
    where
        B: PixelBitmap + ?Sized,
    {
        render::render_to_bitmap(self.engine(), self.handle(), bitmap, area, config)
    }

    /// Close the page.
    pub fn close(self) {
        drop(self);
    }
}

impl<E: Engine> Drop for PdfPage<E> {
    fn drop(&mut self) {
        // SAFETY: the handle is taken exactly once, here.
        let handle = unsafe { ManuallyDrop::take(&mut self.handle) };
        self.doc_inner.engine().close_page(handle);
    }
}

/// Close a batch of pages.
pub fn close_pages<E, I>(pages: I)
where
    E: Engine,
    I: IntoIterator<Item = PdfPage<E>>,
{
    pages.into_iter().for_each(PdfPage::close);
}

pub(crate) fn points_to_pixels(points: f64, dpi: i32) -> i32 {
    (points * f64::from(dpi) / POINTS_PER_INCH) as i32
}
