//! FFI bindings to PDFium
//!
//! This crate provides low-level bindings to the part of `fpdfview.h` used by
//! `pdfium-core`: library lifetime, custom-loader documents, pages and
//! externally backed bitmaps.
//!
//! PDFium is a PDF rendering library developed by Google as part of the Chromium project.
//!
//! # Linking
//!
//! Set `PDFIUM_LIB_DIR` to the directory containing `libpdfium` before
//! building anything that calls into these functions:
//!
//! ```sh
//! export PDFIUM_LIB_DIR=/path/to/pdfium/lib
//! cargo build --features pdfium
//! ```
//!
//! # Safety
//!
//! Every function here is `unsafe extern "C"` and performs no validation on
//! the Rust side.

#![allow(non_upper_case_globals)]
#![allow(non_camel_case_types)]
#![allow(non_snake_case)]

use std::os::raw::{c_char, c_int, c_uchar, c_ulong, c_void};

#[repr(C)]
pub struct fpdf_document_t__ {
    _unused: [u8; 0],
}

#[repr(C)]
pub struct fpdf_page_t__ {
    _unused: [u8; 0],
}

#[repr(C)]
pub struct fpdf_bitmap_t__ {
    _unused: [u8; 0],
}

pub type FPDF_DOCUMENT = *mut fpdf_document_t__;
pub type FPDF_PAGE = *mut fpdf_page_t__;
pub type FPDF_BITMAP = *mut fpdf_bitmap_t__;
pub type FPDF_BOOL = c_int;
pub type FPDF_DWORD = c_ulong;
pub type FPDF_BYTESTRING = *const c_char;

// ========================================
// Error codes (FPDF_GetLastError)
// ========================================

pub const FPDF_ERR_SUCCESS: u32 = 0;
pub const FPDF_ERR_UNKNOWN: u32 = 1;
pub const FPDF_ERR_FILE: u32 = 2;
pub const FPDF_ERR_FORMAT: u32 = 3;
pub const FPDF_ERR_PASSWORD: u32 = 4;
pub const FPDF_ERR_SECURITY: u32 = 5;
pub const FPDF_ERR_PAGE: u32 = 6;

// ========================================
// Bitmap formats (FPDFBitmap_CreateEx)
// ========================================

pub const FPDFBitmap_Unknown: u32 = 0;
pub const FPDFBitmap_Gray: u32 = 1;
pub const FPDFBitmap_BGR: u32 = 2;
pub const FPDFBitmap_BGRx: u32 = 3;
pub const FPDFBitmap_BGRA: u32 = 4;

// ========================================
// Render flags (FPDF_RenderPageBitmap)
// ========================================

pub const FPDF_ANNOT: u32 = 0x01;
pub const FPDF_LCD_TEXT: u32 = 0x02;
pub const FPDF_NO_NATIVETEXT: u32 = 0x04;
pub const FPDF_GRAYSCALE: u32 = 0x08;
pub const FPDF_REVERSE_BYTE_ORDER: u32 = 0x10;

/// Block reader handed to [`FPDF_LoadCustomDocument`].
///
/// PDFium keeps a pointer to this struct; it must stay valid (and at a
/// stable address) until [`FPDF_CloseDocument`] returns.
#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct FPDF_FILEACCESS {
    /// File length in bytes.
    pub m_FileLen: c_ulong,
    /// Reads `size` bytes at `position` into `pBuf`. Returns non-zero on success.
    pub m_GetBlock: Option<
        unsafe extern "C" fn(
            param: *mut c_void,
            position: c_ulong,
            pBuf: *mut c_uchar,
            size: c_ulong,
        ) -> c_int,
    >,
    /// Opaque pointer passed back as `param`.
    pub m_Param: *mut c_void,
}

extern "C" {
    pub fn FPDF_InitLibrary();

    pub fn FPDF_DestroyLibrary();

    pub fn FPDF_GetLastError() -> c_ulong;

    pub fn FPDF_LoadCustomDocument(
        pFileAccess: *mut FPDF_FILEACCESS,
        password: FPDF_BYTESTRING,
    ) -> FPDF_DOCUMENT;

    pub fn FPDF_CloseDocument(document: FPDF_DOCUMENT);

    pub fn FPDF_GetPageCount(document: FPDF_DOCUMENT) -> c_int;

    pub fn FPDF_LoadPage(document: FPDF_DOCUMENT, page_index: c_int) -> FPDF_PAGE;

    pub fn FPDF_ClosePage(page: FPDF_PAGE);

    /// Page width in points.
    pub fn FPDF_GetPageWidth(page: FPDF_PAGE) -> f64;

    /// Page height in points.
    pub fn FPDF_GetPageHeight(page: FPDF_PAGE) -> f64;

    /// Wraps caller-owned memory when `first_scan` is non-null.
    pub fn FPDFBitmap_CreateEx(
        width: c_int,
        height: c_int,
        format: c_int,
        first_scan: *mut c_void,
        stride: c_int,
    ) -> FPDF_BITMAP;

    /// `color` is 0xAARRGGBB.
    pub fn FPDFBitmap_FillRect(
        bitmap: FPDF_BITMAP,
        left: c_int,
        top: c_int,
        width: c_int,
        height: c_int,
        color: FPDF_DWORD,
    ) -> FPDF_BOOL;

    pub fn FPDFBitmap_Destroy(bitmap: FPDF_BITMAP);

    pub fn FPDF_RenderPageBitmap(
        bitmap: FPDF_BITMAP,
        page: FPDF_PAGE,
        start_x: c_int,
        start_y: c_int,
        size_x: c_int,
        size_y: c_int,
        rotate: c_int,
        flags: c_int,
    );
}
