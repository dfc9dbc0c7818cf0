//! # pdfium-core
//!
//! Reference-counted PDF documents and pages, rendered into host-owned
//! display surfaces and bitmaps.
//!
//! This crate is the native layer under a mobile PDF viewer:
//!
//! - **One library lifetime** shared by every open document
//! - **Lazy file access** through positioned reads on a borrowed descriptor
//! - **Pages that keep their document alive** until the last one closes
//! - **Letterboxed rendering** with a margin color and a page background
//!
//! The rendering library sits behind the [`Engine`] trait. Enable the
//! `pdfium` feature for [`PdfiumEngine`], which links against PDFium and is
//! reached only through the process-wide `Library::pdfium()`.
//!
//! ## Quick Start
//!
//! ```no_run
//! # #[cfg(feature = "pdfium")]
//! # fn main() -> pdfium_core::Result<()> {
//! use pdfium_core::{Library, MemoryBitmap, PdfDocument, RenderArea, RenderConfig};
//!
//! let library = Library::pdfium();
//! let doc = PdfDocument::open_file(&library, "document.pdf")?;
//!
//! let page = doc.load_page(0)?;
//! let (width, height) = (page.width_pixels(150), page.height_pixels(150));
//!
//! let mut bitmap = MemoryBitmap::new(width as u16, height as u16);
//! let area = RenderArea::new(0, 0, width, height);
//! if let Err(err) = page.render_to_bitmap(&mut bitmap, area, &RenderConfig::default()) {
//!     eprintln!("render failed: {}", err);
//! }
//! bitmap.save_as_png("page_0.png")?;
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "pdfium"))]
//! # fn main() {}
//! ```
//!
//! Hosts that pass plain integers across a language boundary use
//! [`PdfiumCore`], which hands out [`DocumentHandle`] and [`PageHandle`]
//! values instead of Rust objects.

mod document;
mod engine;
mod error;
mod library;
mod page;
mod pdfium;
mod render;
mod source;

pub use document::PdfDocument;
pub use engine::{Color, Engine, Rect, RENDER_ANNOT, RENDER_REVERSE_BYTE_ORDER};
#[cfg(feature = "pdfium")]
pub use engine::{PdfiumBitmap, PdfiumDocument, PdfiumEngine, PdfiumPage};
pub use error::{EngineError, ErrorClass, PdfError, RenderError, Result};
pub use library::{Library, LibraryRef};
pub use page::{close_pages, PdfPage};
pub use pdfium::{DocumentHandle, PageHandle, PdfiumCore};
pub use render::{
    BitmapInfo, DisplaySurface, MemoryBitmap, PixelBitmap, PixelFormat, RenderArea, RenderConfig,
    SurfaceBuffer,
};
pub use source::{FdSource, FileAccess};
