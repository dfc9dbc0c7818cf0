//! Reference-counted engine initialization.

use crate::engine::Engine;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// Owns the engine and counts the documents using it.
///
/// The engine is initialized when the first [`LibraryRef`] is taken and
/// destroyed when the last one is dropped. The lock covers only the counter
/// step, never document or render work.
pub struct Library<E: Engine> {
    engine: E,
    references: Mutex<usize>,
}

impl<E: Engine> Library<E> {
    /// Wrap an engine. Nothing is initialized until the first acquire.
    pub fn new(engine: E) -> Arc<Self> {
        Arc::new(Self {
            engine,
            references: Mutex::new(0),
        })
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Number of live references.
    pub fn reference_count(&self) -> usize {
        *self.lock()
    }

    /// Whether the engine is currently initialized.
    pub fn is_initialized(&self) -> bool {
        self.reference_count() > 0
    }

    /// Take a reference, initializing the engine if this is the first one.
    pub fn acquire(self: &Arc<Self>) -> LibraryRef<E> {
        let mut references = self.lock();
        if *references == 0 {
            debug!("Init FPDF library");
            self.engine.init_library();
        }
        *references += 1;
        LibraryRef {
            library: Arc::clone(self),
        }
    }

    fn release(&self) {
        let mut references = self.lock();
        *references -= 1;
        if *references == 0 {
            debug!("Destroy FPDF library");
            self.engine.destroy_library();
        }
    }

    // A poisoned counter still holds a valid count.
    fn lock(&self) -> MutexGuard<'_, usize> {
        self.references
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// One counted use of a [`Library`]. Dropping it releases the reference.
pub struct LibraryRef<E: Engine> {
    library: Arc<Library<E>>,
}

impl<E: Engine> LibraryRef<E> {
    pub fn engine(&self) -> &E {
        self.library.engine()
    }
}

impl<E: Engine> Drop for LibraryRef<E> {
    fn drop(&mut self) {
        self.library.release();
    }
}
