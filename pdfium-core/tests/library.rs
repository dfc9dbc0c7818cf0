//! Library lifetime across documents.

mod common;

use common::{pdf_source, temp_file_with, Event, FakeEngine};
use pdfium_core::{Library, PdfDocument, PdfError};
use std::sync::Arc;
use std::thread;

#[test]
fn test_first_open_initializes_last_close_destroys() {
    let library = Library::new(FakeEngine::new());
    assert!(!library.is_initialized());

    let a = PdfDocument::open(&library, pdf_source()).unwrap();
    assert_eq!(library.reference_count(), 1);
    assert_eq!(library.engine().init_count(), 1);

    let b = PdfDocument::open(&library, pdf_source()).unwrap();
    assert_eq!(library.reference_count(), 2);
    assert_eq!(library.engine().init_count(), 1);

    a.close();
    assert_eq!(library.reference_count(), 1);
    assert_eq!(library.engine().destroy_count(), 0);

    b.close();
    assert_eq!(library.reference_count(), 0);
    assert!(!library.is_initialized());
    assert_eq!(library.engine().init_count(), 1);
    assert_eq!(library.engine().destroy_count(), 1);
}

#[test]
fn test_reopen_after_teardown_initializes_again() {
    let library = Library::new(FakeEngine::new());
    PdfDocument::open(&library, pdf_source()).unwrap().close();
    PdfDocument::open(&library, pdf_source()).unwrap().close();

    let events = library.engine().events();
    assert_eq!(
        events
            .iter()
            .filter(|e| matches!(e, Event::Init | Event::Destroy))
            .collect::<Vec<_>>(),
        vec![&Event::Init, &Event::Destroy, &Event::Init, &Event::Destroy]
    );
}

#[test]
fn test_failed_open_leaves_counter_unchanged() {
    let library = Library::new(FakeEngine::new());
    let doc = PdfDocument::open(&library, pdf_source()).unwrap();

    let garbage = Arc::new(temp_file_with(b"not a pdf at all"));
    let err = PdfDocument::open(&library, garbage).err().unwrap();
    assert!(matches!(err, PdfError::OpenFailed(_)));
    assert_eq!(library.reference_count(), 1);

    doc.close();
    assert_eq!(library.reference_count(), 0);
    assert_eq!(library.engine().destroy_count(), 1);
}

#[test]
fn test_failed_first_open_tears_down() {
    let library = Library::new(FakeEngine::new());
    let garbage = Arc::new(temp_file_with(b"garbage"));
    assert!(PdfDocument::open(&library, garbage).is_err());

    assert_eq!(library.reference_count(), 0);
    assert_eq!(library.engine().init_count(), 1);
    assert_eq!(library.engine().destroy_count(), 1);
}

#[test]
fn test_concurrent_opens_keep_init_and_destroy_paired() {
    let library = Library::new(FakeEngine::new());

    thread::scope(|s| {
        for _ in 0..8 {
            s.spawn(|| {
                for _ in 0..25 {
                    let doc = PdfDocument::open(&library, pdf_source()).unwrap();
                    assert!(library.reference_count() >= 1);
                    doc.close();
                }
            });
        }
    });

    assert_eq!(library.reference_count(), 0);
    let engine = library.engine();
    assert!(engine.init_count() >= 1);
    assert_eq!(engine.init_count(), engine.destroy_count());

    // Never two inits without a destroy in between.
    let mut live = false;
    for event in engine.events() {
        match event {
            Event::Init => {
                assert!(!live);
                live = true;
            }
            Event::Destroy => {
                assert!(live);
                live = false;
            }
            _ => assert!(live),
        }
    }
}
