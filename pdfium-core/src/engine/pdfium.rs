//! [`Engine`] backed by the PDFium C library.

use super::{Color, Engine, Rect};
use crate::library::Library;
use crate::pdfium::PdfiumCore;
use crate::source::FileAccess;
use once_cell::sync::Lazy;
use pdfium_sys::*;
use std::ffi::CString;
use std::marker::PhantomData;
use std::os::raw::{c_int, c_uchar, c_ulong, c_void};
use std::ptr;
use std::sync::Arc;
use tracing::error;

/// PDFium as an [`Engine`].
///
/// PDFium keeps global state, so the engine cannot be constructed directly:
/// every document goes through the one process-wide [`Library`] returned by
/// [`Library::pdfium`].
#[derive(Debug)]
pub struct PdfiumEngine {
    _private: (),
}

static LIBRARY: Lazy<Arc<Library<PdfiumEngine>>> =
    Lazy::new(|| Library::new(PdfiumEngine { _private: () }));

static GLOBAL: Lazy<PdfiumCore<PdfiumEngine>> =
    Lazy::new(|| PdfiumCore::with_library(Library::pdfium()));

impl Library<PdfiumEngine> {
    /// The process-wide PDFium library.
    pub fn pdfium() -> Arc<Self> {
        Arc::clone(&LIBRARY)
    }
}

impl PdfiumCore<PdfiumEngine> {
    /// The shared core over the process-wide PDFium library.
    pub fn global() -> &'static Self {
        &GLOBAL
    }
}

// Boxed so the FPDF_FILEACCESS address PDFium keeps stays put.
struct Loader {
    access: FPDF_FILEACCESS,
    source: Arc<dyn FileAccess>,
}

pub struct PdfiumDocument {
    handle: FPDF_DOCUMENT,
    _loader: Box<Loader>,
}

// SAFETY: PDFium document handles are thread-safe when accessed with proper synchronization
unsafe impl Send for PdfiumDocument {}
unsafe impl Sync for PdfiumDocument {}

pub struct PdfiumPage {
    handle: FPDF_PAGE,
}

// SAFETY: Page handles are safe to send between threads
unsafe impl Send for PdfiumPage {}
unsafe impl Sync for PdfiumPage {}

/// A PDFium bitmap over pixel memory borrowed for `'buf`.
pub struct PdfiumBitmap<'buf> {
    handle: FPDF_BITMAP,
    _pixels: PhantomData<&'buf mut [u8]>,
}

unsafe extern "C" fn get_block(
    param: *mut c_void,
    position: c_ulong,
    buf: *mut c_uchar,
    size: c_ulong,
) -> c_int {
    if param.is_null() || buf.is_null() {
        return 0;
    }
    // SAFETY: `param` is the boxed Loader set up in load_custom_document and
    // PDFium hands us a writable buffer of `size` bytes.
    let loader = &*(param as *const Loader);
    let out = std::slice::from_raw_parts_mut(buf, size as usize);
    match loader.source.read_block(u64::from(position), out) {
        Ok(()) => 1,
        Err(err) => {
            error!("Cannot read from file descriptor: {}", err);
            0
        }
    }
}

/// PDFium wraps the RGBA buffer as BGRA, so red and blue trade places.
fn pack_color(color: Color) -> FPDF_DWORD {
    (FPDF_DWORD::from(color.a) << 24)
        | (FPDF_DWORD::from(color.b) << 16)
        | (FPDF_DWORD::from(color.g) << 8)
        | FPDF_DWORD::from(color.r)
}

impl Engine for PdfiumEngine {
    type Document = PdfiumDocument;
    type Page = PdfiumPage;
    type Bitmap<'buf> = PdfiumBitmap<'buf>;

    fn init_library(&self) {
        unsafe { FPDF_InitLibrary() }
    }

    fn destroy_library(&self) {
        unsafe { FPDF_DestroyLibrary() }
    }

    fn load_custom_document(
        &self,
        source: Arc<dyn FileAccess>,
        file_len: u64,
        password: Option<&str>,
    ) -> Option<PdfiumDocument> {
        let Ok(file_len) = c_ulong::try_from(file_len) else {
            error!("File too large for PDFium: {} bytes", file_len);
            return None;
        };
        let password = match password.map(CString::new).transpose() {
            Ok(password) => password,
            Err(_) => {
                error!("Password contains a NUL byte");
                return None;
            }
        };

        let mut loader = Box::new(Loader {
            access: FPDF_FILEACCESS {
                m_FileLen: file_len,
                m_GetBlock: Some(get_block),
                m_Param: ptr::null_mut(),
            },
            source,
        });
        let loader_ptr: *mut Loader = &mut *loader;

        let handle = unsafe {
            (*loader_ptr).access.m_Param = loader_ptr.cast();
            FPDF_LoadCustomDocument(
                ptr::addr_of_mut!((*loader_ptr).access),
                password.as_ref().map_or(ptr::null(), |p| p.as_ptr()),
            )
        };
        if handle.is_null() {
            return None;
        }
        Some(PdfiumDocument {
            handle,
            _loader: loader,
        })
    }

    fn last_error(&self) -> u32 {
        unsafe { FPDF_GetLastError() as u32 }
    }

    fn close_document(&self, document: PdfiumDocument) {
        unsafe { FPDF_CloseDocument(document.handle) }
    }

    fn page_count(&self, document: &PdfiumDocument) -> i32 {
        unsafe { FPDF_GetPageCount(document.handle) }
    }

    fn load_page(&self, document: &PdfiumDocument, index: i32) -> Option<PdfiumPage> {
        let handle = unsafe { FPDF_LoadPage(document.handle, index) };
        (!handle.is_null()).then_some(PdfiumPage { handle })
    }

    fn close_page(&self, page: PdfiumPage) {
        unsafe { FPDF_ClosePage(page.handle) }
    }

    fn page_width(&self, page: &PdfiumPage) -> f64 {
        unsafe { FPDF_GetPageWidth(page.handle) }
    }

    fn page_height(&self, page: &PdfiumPage) -> f64 {
        unsafe { FPDF_GetPageHeight(page.handle) }
    }

    fn create_bitmap<'buf>(
        &self,
        pixels: &'buf mut [u8],
        width: i32,
        height: i32,
        stride: i32,
    ) -> Option<PdfiumBitmap<'buf>> {
        let handle = unsafe {
            FPDFBitmap_CreateEx(
                width,
                height,
                FPDFBitmap_BGRA as c_int,
                pixels.as_mut_ptr().cast(),
                stride,
            )
        };
        (!handle.is_null()).then_some(PdfiumBitmap {
            handle,
            _pixels: PhantomData,
        })
    }

    fn fill_rect(&self, bitmap: &mut PdfiumBitmap<'_>, rect: Rect, color: Color) {
        unsafe {
            FPDFBitmap_FillRect(
                bitmap.handle,
                rect.x,
                rect.y,
                rect.width,
                rect.height,
                pack_color(color),
            );
        }
    }

    fn render_page(
        &self,
        bitmap: &mut PdfiumBitmap<'_>,
        page: &PdfiumPage,
        rect: Rect,
        rotation: i32,
        flags: i32,
    ) {
        unsafe {
            FPDF_RenderPageBitmap(
                bitmap.handle,
                page.handle,
                rect.x,
                rect.y,
                rect.width,
                rect.height,
                rotation,
                flags,
            );
        }
    }

    fn destroy_bitmap(&self, bitmap: PdfiumBitmap<'_>) {
        unsafe { FPDFBitmap_Destroy(bitmap.handle) }
    }
}
