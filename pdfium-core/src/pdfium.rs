//! Main entry point: documents and pages behind opaque handles

use crate::document::PdfDocument;
use crate::engine::Engine;
use crate::error::{PdfError, RenderError, Result};
use crate::library::Library;
use crate::page::PdfPage;
use crate::render::{DisplaySurface, PixelBitmap, RenderArea, RenderConfig};
use crate::source::{FdSource, FileAccess};
use std::collections::HashMap;
use std::num::NonZeroU64;
use std::os::unix::io::RawFd;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, error};

/// Opaque reference to a document opened through [`PdfiumCore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentHandle(NonZeroU64);

/// Opaque reference to a page opened through [`PdfiumCore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageHandle(NonZeroU64);

macro_rules! raw_handle {
    ($name:ident) => {
        impl $name {
            /// The handle as an integer, for hosts that store handles as numbers.
            pub fn as_raw(self) -> u64 {
                self.0.get()
            }

            /// Rebuild a handle from [`as_raw`](Self::as_raw). Zero is never a handle.
            pub fn from_raw(raw: u64) -> Option<Self> {
                NonZeroU64::new(raw).map(Self)
            }
        }
    };
}

raw_handle!(DocumentHandle);
raw_handle!(PageHandle);

/// Issued ids are never reused, so a stale handle can never alias a newer one.
struct HandleTable<T> {
    last_id: u64,
    entries: HashMap<u64, T>,
}

impl<T> HandleTable<T> {
    fn new() -> Self {
        Self {
            last_id: 0,
            entries: HashMap::new(),
        }
    }

    fn insert(&mut self, value: T) -> NonZeroU64 {
        let id = NonZeroU64::MIN.saturating_add(self.last_id);
        self.last_id = id.get();
        self.entries.insert(self.last_id, value);
        id
    }

    fn get(&self, id: NonZeroU64) -> Option<&T> {
        self.entries.get(&id.get())
    }

    fn remove(&mut self, id: NonZeroU64) -> Option<T> {
        self.entries.remove(&id.get())
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Documents and pages addressed by opaque handles.
///
/// This is the surface a host binding forwards to: every operation takes and
/// returns plain handle values. Open failures come back as [`PdfError`];
/// render failures are logged and otherwise ignored.
///
/// The handle tables are locked only while a handle is looked up, issued or
/// retired. Engine work runs outside those locks, and no lock is taken
/// around page loads, renders or closes; callers serialize use of a single
/// document or page.
///
/// # Example
///
/// ```no_run
/// # fn run<E: pdfium_core::Engine>(core: &pdfium_core::PdfiumCore<E>, fd: i32)
/// #     -> pdfium_core::Result<()> {
/// use pdfium_core::MemoryBitmap;
///
/// let doc = unsafe { core.open_document_fd(fd)? };
/// let page = core.load_page(doc, 0)?;
///
/// let width = core.page_width_pixels(page, 96)?;
/// let height = core.page_height_pixels(page, 96)?;
/// let mut bitmap = MemoryBitmap::new(width as u16, height as u16);
/// core.render_page_to_bitmap(page, &mut bitmap, 96, 0, 0, width, height);
///
/// core.close_page(page);
/// core.close_document(doc);
/// # Ok(())
/// # }
/// ```
pub struct PdfiumCore<E: Engine> {
    library: Arc<Library<E>>,
    documents: Mutex<HandleTable<PdfDocument<E>>>,
    pages: Mutex<HandleTable<Arc<PdfPage<E>>>>,
    config: RenderConfig,
}

impl<E: Engine> PdfiumCore<E> {
    /// Create a core over its own library instance.
    pub fn new(engine: E) -> Self {
        Self::with_library(Library::new(engine))
    }

    /// Create a core sharing an existing library instance.
    pub fn with_library(library: Arc<Library<E>>) -> Self {
        Self {
            library,
            documents: Mutex::new(HandleTable::new()),
            pages: Mutex::new(HandleTable::new()),
            config: RenderConfig::default(),
        }
    }

    /// Use `config` for every render call.
    pub fn with_render_config(mut self, config: RenderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn library(&self) -> &Arc<Library<E>> {
        &self.library
    }

    pub fn render_config(&self) -> &RenderConfig {
        &self.config
    }

    /// Number of documents currently open through this core.
    pub fn open_document_count(&self) -> usize {
        lock(&self.documents).len()
    }

    /// Number of pages currently open through this core.
    pub fn open_page_count(&self) -> usize {
        lock(&self.pages).len()
    }

    /// Open a document read lazily from `source`.
    pub fn open_document(&self, source: Arc<dyn FileAccess>) -> Result<DocumentHandle> {
        self.open_document_with_password(source, None)
    }

    /// Open an encrypted document.
    pub fn open_document_with_password(
        &self,
        source: Arc<dyn FileAccess>,
        password: Option<&str>,
    ) -> Result<DocumentHandle> {
        let document = PdfDocument::open_with_password(&self.library, source, password)?;
        let id = lock(&self.documents).insert(document);
        Ok(DocumentHandle(id))
    }

    /// Open a document from a host file descriptor.
    ///
    /// The descriptor is read with `pread` and is never closed by this crate.
    ///
    /// # Safety
    ///
    /// `fd` must stay open until the document and all of its pages are closed.
    pub unsafe fn open_document_fd(&self, fd: RawFd) -> Result<DocumentHandle> {
        self.open_document(Arc::new(FdSource::from_raw_fd(fd)))
    }

    /// The document behind `doc`, if it is still open.
    pub fn document(&self, doc: DocumentHandle) -> Option<PdfDocument<E>> {
        lock(&self.documents).get(doc.0).cloned()
    }

    /// Number of pages in the document.
    pub fn page_count(&self, doc: DocumentHandle) -> Result<i32> {
        let document = self
            .document(doc)
            .ok_or(PdfError::IllegalState("document is not open"))?;
        Ok(document.page_count())
    }

    /// Retire `doc`. Pages still open keep the parsed document alive until
    /// they are closed.
    pub fn close_document(&self, doc: DocumentHandle) {
        let removed = lock(&self.documents).remove(doc.0);
        match removed {
            Some(document) => document.close(),
            None => debug!("Close of unknown document handle {}", doc.as_raw()),
        }
    }

    /// Load one page.
    ///
    /// Fails with [`PdfError::IllegalState`] if `doc` is not open.
    pub fn load_page(&self, doc: DocumentHandle, index: i32) -> Result<PageHandle> {
        let Some(document) = self.document(doc) else {
            error!("Get page document null");
            return Err(PdfError::IllegalState("cannot load page"));
        };
        let page = document.load_page(index)?;
        let id = lock(&self.pages).insert(Arc::new(page));
        Ok(PageHandle(id))
    }

    /// Load pages `from..=to`, one result per index in ascending order.
    ///
    /// Empty when `to < from`. A failing index leaves its error in place and
    /// the remaining indices are still loaded.
    pub fn load_pages(&self, doc: DocumentHandle, from: i32, to: i32) -> Vec<Result<PageHandle>> {
        if to < from {
            return Vec::new();
        }
        (from..=to).map(|index| self.load_page(doc, index)).collect()
    }

    /// Close one page. No check is made against the document it came from.
    pub fn close_page(&self, page: PageHandle) {
        let removed = lock(&self.pages).remove(page.0);
        match removed {
            Some(page) => drop(page),
            None => debug!("Close of unknown page handle {}", page.as_raw()),
        }
    }

    /// Close several pages.
    pub fn close_pages(&self, pages: &[PageHandle]) {
        for &page in pages {
            self.close_page(page);
        }
    }

    fn page(&self, page: PageHandle) -> Result<Arc<PdfPage<E>>> {
        lock(&self.pages)
            .get(page.0)
            .cloned()
            .ok_or(PdfError::IllegalState("page is not open"))
    }

    /// Page width in pixels at `dpi`.
    pub fn page_width_pixels(&self, page: PageHandle, dpi: i32) -> Result<i32> {
        Ok(self.page(page)?.width_pixels(dpi))
    }

    /// Page height in pixels at `dpi`.
    pub fn page_height_pixels(&self, page: PageHandle, dpi: i32) -> Result<i32> {
        Ok(self.page(page)?.height_pixels(dpi))
    }

    /// Page width in points.
    pub fn page_width_points(&self, page: PageHandle) -> Result<i32> {
        Ok(self.page(page)?.width_points())
    }

    /// Page height in points.
    pub fn page_height_points(&self, page: PageHandle) -> Result<i32> {
        Ok(self.page(page)?.height_points())
    }

    /// Render a page into a display surface.
    ///
    /// Nothing is reported back: on failure the error is logged and the
    /// surface keeps whatever was written before the failing step. `dpi` is
    /// accepted for symmetry with the size queries and is not used.
    #[allow(clippy::too_many_arguments)]
    pub fn render_page_to_surface<S>(
        &self,
        page: PageHandle,
        surface: &mut S,
        _dpi: i32,
        start_x: i32,
        start_y: i32,
        draw_width: i32,
        draw_height: i32,
    ) where
        S: DisplaySurface + ?Sized,
    {
        let area = RenderArea::new(start_x, start_y, draw_width, draw_height);
        let result = match self.page(page) {
            Ok(page) => page.render_to_surface(surface, area, &self.config),
            Err(_) => Err(RenderError::UnknownPage),
        };
        if let Err(err) = result {
            error!("Render to surface failed: {}", err);
        }
    }

    /// Render a page into a bitmap.
    ///
    /// Same failure behavior as [`render_page_to_surface`](Self::render_page_to_surface);
    /// a bitmap that is not RGBA 8888 is left untouched.
    #[allow(clippy::too_many_arguments)]
    pub fn render_page_to_bitmap<B>(
        &self,
        page: PageHandle,
        bitmap: &mut B,
        _dpi: i32,
        start_x: i32,
        start_y: i32,
        draw_width: i32,
        draw_height: i32,
    ) where
        B: PixelBitmap + ?Sized,
    {
        let area = RenderArea::new(start_x, start_y, draw_width, draw_height);
        let result = match self.page(page) {
            Ok(page) => page.render_to_bitmap(bitmap, area, &self.config),
            Err(_) => Err(RenderError::UnknownPage),
        };
        if let Err(err) = result {
            error!("Render to bitmap failed: {}", err);
        }
    }
}
