//! PDF document representation

use crate::engine::Engine;
use crate::error::{EngineError, PdfError, Result};
use crate::library::{Library, LibraryRef};
use crate::page::PdfPage;
use crate::source::FileAccess;
use std::fs::File;
use std::mem::ManuallyDrop;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error};

/// An open PDF document.
///
/// Owns the engine's parsed document and the file source it reads from, and
/// holds one reference on the [`Library`]. Pages keep the document alive:
/// the engine document is closed when the last of the document and its
/// pages is dropped, then the source is released, then the library
/// reference.
///
/// Cloning is cheap and yields another handle to the same document.
///
/// # Example
///
/// ```no_run
/// # fn open<E: pdfium_core::Engine>(
/// #     library: &std::sync::Arc<pdfium_core::Library<E>>,
/// # ) -> pdfium_core::Result<()> {
/// use pdfium_core::PdfDocument;
///
/// let doc = PdfDocument::open_file(library, "document.pdf")?;
/// println!("Pages: {}", doc.page_count());
///
/// for page in doc.load_pages(0, doc.page_count() - 1) {
///     let page = page?;
///     println!("{} x {} pt", page.width_points(), page.height_points());
/// }
/// # Ok(())
/// # }
/// ```
pub struct PdfDocument<E: Engine> {
    inner: Arc<DocumentInner<E>>,
}

pub(crate) struct DocumentInner<E: Engine> {
    // Closed in Drop, before the fields below are released.
    handle: ManuallyDrop<E::Document>,
    _source: Arc<dyn FileAccess>,
    file_size: u64,
    library: LibraryRef<E>,
}

impl<E: Engine> DocumentInner<E> {
    pub(crate) fn engine(&self) -> &E {
        self.library.engine()
    }

    pub(crate) fn handle(&self) -> &E::Document {
        &self.handle
    }
}

impl<E: Engine> Drop for DocumentInner<E> {
    fn drop(&mut self) {
        // SAFETY: the handle is taken exactly once, here.
        let handle = unsafe { ManuallyDrop::take(&mut self.handle) };
        self.library.engine().close_document(handle);
    }
}

impl<E: Engine> Clone for PdfDocument<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E: Engine> PdfDocument<E> {
    /// Open a document read lazily from `source`.
    ///
    /// # Errors
    ///
    /// - [`PdfError::FileSize`] if the source is empty or its size cannot be
    ///   read. The engine is not touched in this case.
    /// - [`PdfError::OpenFailed`] if the engine rejects the document.
    pub fn open(library: &Arc<Library<E>>, source: Arc<dyn FileAccess>) -> Result<Self> {
        Self::open_with_password(library, source, None)
    }

    /// Open an encrypted document.
    pub fn open_with_password(
        library: &Arc<Library<E>>,
        source: Arc<dyn FileAccess>,
        password: Option<&str>,
    ) -> Result<Self> {
        let file_size = match source.size() {
            Ok(size) if size > 0 => size,
            Ok(_) => return Err(PdfError::FileSize),
            Err(err) => {
                error!("Error getting file size: {}", err);
                return Err(PdfError::FileSize);
            }
        };
        debug!("File Size: {}", file_size);

        // Dropping the reference on any early return undoes the acquire.
        let library = library.acquire();

        let handle = library.engine().load_custom_document(
            Arc::clone(&source),
            file_size,
            password,
        );
        let Some(handle) = handle else {
            let code = library.engine().last_error();
            return Err(PdfError::OpenFailed(EngineError::from_code(code)));
        };

        Ok(Self {
            inner: Arc::new(DocumentInner {
                handle: ManuallyDrop::new(handle),
                _source: source,
                file_size,
                library,
            }),
        })
    }

    /// Open a document from a file on disk.
    pub fn open_file<P: AsRef<Path>>(library: &Arc<Library<E>>, path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::open(library, Arc::new(file))
    }

    /// Get the number of pages in the document.
    pub fn page_count(&self) -> i32 {
        self.inner.engine().page_count(self.inner.handle())
    }

    /// Length of the underlying file in bytes.
    pub fn file_size(&self) -> u64 {
        self.inner.file_size
    }

    /// Load a page by index (0-based).
    ///
    /// The index is passed to the engine unchecked.
    pub fn load_page(&self, index: i32) -> Result<PdfPage<E>> {
        let handle = self
            .inner
            .engine()
            .load_page(self.inner.handle(), index)
            .ok_or(PdfError::PageLoadFailed { index })?;
        Ok(PdfPage::new(handle, Arc::clone(&self.inner), index))
    }

    /// Load pages `from..=to` in ascending order.
    ///
    /// Returns no pages when `to < from`. A page that fails to load leaves
    /// an error in its slot and does not stop the rest of the batch.
    pub fn load_pages(&self, from: i32, to: i32) -> Vec<Result<PdfPage<E>>> {
        if to < from {
            return Vec::new();
        }
        (from..=to).map(|index| self.load_page(index)).collect()
    }

    /// Close this handle to the document.
    ///
    /// The engine document is released once no page from it remains open.
    pub fn close(self) {
        drop(self);
    }

    /// Whether `self` and `other` refer to the same opened document.
    pub fn same_document(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}
