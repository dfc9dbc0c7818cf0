//! Test doubles shared by the integration tests.

#![allow(dead_code)]

use pdfium_core::{Color, DisplaySurface, Engine, FileAccess, PixelFormat, Rect, SurfaceBuffer};
use std::fs::File;
use std::io::{self, Seek, SeekFrom, Write};
use std::sync::{Arc, Mutex, MutexGuard};

pub const PDF_BYTES: &[u8] = b"%PDF-1.4\n1 0 obj << /Type /Catalog >> endobj\n%%EOF\n";

/// Everything the fake engine was asked to do, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Init,
    Destroy,
    OpenDocument(u32),
    CloseDocument(u32),
    LoadPage { doc: u32, index: i32 },
    ClosePage { doc: u32, index: i32 },
    CreateBitmap { width: i32, height: i32, stride: i32 },
    FillRect(Rect, Color),
    RenderPage { rect: Rect, rotation: i32, flags: i32 },
    DestroyBitmap,
}

struct State {
    events: Vec<Event>,
    next_doc: u32,
    last_error: u32,
    page_count: i32,
    page_size: (f64, f64),
    failing_pages: Vec<i32>,
    password: Option<String>,
}

/// An [`Engine`] that records calls and paints fills into the RGBA buffer.
///
/// Documents are accepted when the source starts with `%PDF-`.
pub struct FakeEngine {
    state: Mutex<State>,
}

pub struct FakeDocument {
    id: u32,
    _source: Arc<dyn FileAccess>,
}

pub struct FakePage {
    doc: u32,
    index: i32,
    width: f64,
    height: f64,
}

pub struct FakeBitmap<'buf> {
    pixels: &'buf mut [u8],
    width: i32,
    height: i32,
    stride: i32,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                events: Vec::new(),
                next_doc: 0,
                last_error: 0,
                page_count: 10,
                page_size: (612.0, 792.0),
                failing_pages: Vec::new(),
                password: None,
            }),
        }
    }

    pub fn with_page_count(self, count: i32) -> Self {
        self.state().page_count = count;
        self
    }

    pub fn with_page_size(self, width: f64, height: f64) -> Self {
        self.state().page_size = (width, height);
        self
    }

    pub fn with_failing_page(self, index: i32) -> Self {
        self.state().failing_pages.push(index);
        self
    }

    pub fn with_password(self, password: &str) -> Self {
        self.state().password = Some(password.to_string());
        self
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    fn record(&self, event: Event) {
        self.state().events.push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.state().events.clone()
    }

    pub fn count(&self, pred: impl Fn(&Event) -> bool) -> usize {
        self.state().events.iter().filter(|e| pred(*e)).count()
    }

    pub fn init_count(&self) -> usize {
        self.count(|e| *e == Event::Init)
    }

    pub fn destroy_count(&self) -> usize {
        self.count(|e| *e == Event::Destroy)
    }

    pub fn clear_events(&self) {
        self.state().events.clear();
    }
}

impl Engine for FakeEngine {
    type Document = FakeDocument;
    type Page = FakePage;
    type Bitmap<'buf> = FakeBitmap<'buf>;

    fn init_library(&self) {
        self.record(Event::Init);
    }

    fn destroy_library(&self) {
        self.record(Event::Destroy);
    }

    fn load_custom_document(
        &self,
        source: Arc<dyn FileAccess>,
        file_len: u64,
        password: Option<&str>,
    ) -> Option<FakeDocument> {
        let mut header = [0u8; 5];
        if file_len < 5 || source.read_block(0, &mut header).is_err() || &header != b"%PDF-" {
            self.state().last_error = 3;
            return None;
        }

        let mut state = self.state();
        if let Some(expected) = &state.password {
            if password != Some(expected.as_str()) {
                state.last_error = 4;
                return None;
            }
        }
        state.next_doc += 1;
        let id = state.next_doc;
        state.events.push(Event::OpenDocument(id));
        Some(FakeDocument {
            id,
            _source: source,
        })
    }

    fn last_error(&self) -> u32 {
        self.state().last_error
    }

    fn close_document(&self, document: FakeDocument) {
        self.record(Event::CloseDocument(document.id));
    }

    fn page_count(&self, _document: &FakeDocument) -> i32 {
        self.state().page_count
    }

    fn load_page(&self, document: &FakeDocument, index: i32) -> Option<FakePage> {
        let mut state = self.state();
        if index < 0 || index >= state.page_count || state.failing_pages.contains(&index) {
            return None;
        }
        state.events.push(Event::LoadPage {
            doc: document.id,
            index,
        });
        let (width, height) = state.page_size;
        Some(FakePage {
            doc: document.id,
            index,
            width,
            height,
        })
    }

    fn close_page(&self, page: FakePage) {
        self.record(Event::ClosePage {
            doc: page.doc,
            index: page.index,
        });
    }

    fn page_width(&self, page: &FakePage) -> f64 {
        page.width
    }

    fn page_height(&self, page: &FakePage) -> f64 {
        page.height
    }

    fn create_bitmap<'buf>(
        &self,
        pixels: &'buf mut [u8],
        width: i32,
        height: i32,
        stride: i32,
    ) -> Option<FakeBitmap<'buf>> {
        self.record(Event::CreateBitmap {
            width,
            height,
            stride,
        });
        Some(FakeBitmap {
            pixels,
            width,
            height,
            stride,
        })
    }

    fn fill_rect(&self, bitmap: &mut FakeBitmap<'_>, rect: Rect, color: Color) {
        self.record(Event::FillRect(rect, color));
        let x0 = rect.x.max(0);
        let y0 = rect.y.max(0);
        let x1 = (rect.x + rect.width).min(bitmap.width);
        let y1 = (rect.y + rect.height).min(bitmap.height);
        for y in y0..y1 {
            for x in x0..x1 {
                let at = (y * bitmap.stride + x * 4) as usize;
                bitmap.pixels[at..at + 4].copy_from_slice(&color.to_rgba_bytes());
            }
        }
    }

    fn render_page(
        &self,
        _bitmap: &mut FakeBitmap<'_>,
        _page: &FakePage,
        rect: Rect,
        rotation: i32,
        flags: i32,
    ) {
        self.record(Event::RenderPage {
            rect,
            rotation,
            flags,
        });
    }

    fn destroy_bitmap(&self, _bitmap: FakeBitmap<'_>) {
        self.record(Event::DestroyBitmap);
    }
}

/// A display surface backed by a padded pixel buffer.
pub struct FakeSurface {
    pub width: i32,
    pub height: i32,
    pub format: PixelFormat,
    /// Row pitch in pixels, at least `width`.
    pub stride: i32,
    pub pixels: Vec<u8>,
    pub fail_lock: bool,
    pub fail_geometry: bool,
    /// Format handed out by `lock`, independent of what `format` reports.
    pub locked_format: PixelFormat,
    pub geometry_calls: Vec<(i32, i32, PixelFormat)>,
    pub posts: usize,
}

impl FakeSurface {
    pub fn new(width: i32, height: i32, stride: i32) -> Self {
        Self {
            width,
            height,
            format: PixelFormat::Rgba8888,
            stride,
            pixels: vec![0; (stride * height * 4) as usize],
            fail_lock: false,
            fail_geometry: false,
            locked_format: PixelFormat::Rgba8888,
            geometry_calls: Vec::new(),
            posts: 0,
        }
    }

    pub fn with_format(mut self, format: PixelFormat) -> Self {
        self.format = format;
        self.locked_format = format;
        self
    }

    pub fn pixel(&self, x: i32, y: i32) -> [u8; 4] {
        let at = ((y * self.stride + x) * 4) as usize;
        [
            self.pixels[at],
            self.pixels[at + 1],
            self.pixels[at + 2],
            self.pixels[at + 3],
        ]
    }

    /// Bytes in the row padding past `width`.
    pub fn padding_is_untouched(&self) -> bool {
        (0..self.height).all(|y| {
            let start = ((y * self.stride + self.width) * 4) as usize;
            let end = ((y + 1) * self.stride * 4) as usize;
            self.pixels[start..end].iter().all(|&b| b == 0)
        })
    }
}

impl DisplaySurface for FakeSurface {
    fn width(&self) -> i32 {
        self.width
    }

    fn height(&self) -> i32 {
        self.height
    }

    fn format(&self) -> PixelFormat {
        self.format
    }

    fn set_buffers_geometry(
        &mut self,
        width: i32,
        height: i32,
        format: PixelFormat,
    ) -> io::Result<()> {
        self.geometry_calls.push((width, height, format));
        if self.fail_geometry {
            return Err(io::Error::new(io::ErrorKind::Other, "geometry rejected"));
        }
        self.format = format;
        self.locked_format = format;
        Ok(())
    }

    fn lock(&mut self) -> io::Result<SurfaceBuffer<'_>> {
        if self.fail_lock {
            return Err(io::Error::new(io::ErrorKind::Other, "lock failed"));
        }
        Ok(SurfaceBuffer {
            bits: &mut self.pixels,
            width: self.width,
            height: self.height,
            stride: self.stride,
            format: self.locked_format,
        })
    }

    fn unlock_and_post(&mut self) {
        self.posts += 1;
    }
}

/// A temporary file holding `contents`, rewound to the start.
pub fn temp_file_with(contents: &[u8]) -> File {
    let mut file = tempfile::tempfile().unwrap();
    file.write_all(contents).unwrap();
    file.seek(SeekFrom::Start(0)).unwrap();
    file
}

pub fn pdf_source() -> Arc<dyn FileAccess> {
    Arc::new(temp_file_with(PDF_BYTES))
}
