//! Byte sources the engine reads documents from.

use std::fs::File;
use std::io;
use std::os::unix::fs::FileExt;
use std::os::unix::io::RawFd;

/// Random-access file contents.
///
/// The engine asks for byte ranges lazily while a document is open, so a
/// source must stay readable until the document is closed.
pub trait FileAccess: Send + Sync {
    /// Total length in bytes.
    fn size(&self) -> io::Result<u64>;

    /// Fill `buf` with the bytes starting at `position`.
    ///
    /// Fails with [`io::ErrorKind::UnexpectedEof`] if the range runs past the
    /// end of the file.
    fn read_block(&self, position: u64, buf: &mut [u8]) -> io::Result<()>;
}

impl FileAccess for File {
    fn size(&self) -> io::Result<u64> {
        Ok(self.metadata()?.len())
    }

    fn read_block(&self, position: u64, buf: &mut [u8]) -> io::Result<()> {
        self.read_exact_at(buf, position)
    }
}

/// A file descriptor owned by the host.
///
/// Reads use `pread`, so the descriptor's file offset is never moved.
/// Dropping an `FdSource` does not close the descriptor.
#[derive(Debug)]
pub struct FdSource {
    fd: RawFd,
}

impl FdSource {
    /// Borrow a host file descriptor.
    ///
    /// # Safety
    ///
    /// `fd` must be an open, readable descriptor and must stay open until
    /// every document opened from this source has been closed.
    pub unsafe fn from_raw_fd(fd: RawFd) -> Self {
        Self { fd }
    }

    /// The borrowed descriptor.
    pub fn raw_fd(&self) -> RawFd {
        self.fd
    }
}

impl FileAccess for FdSource {
    fn size(&self) -> io::Result<u64> {
        let mut stat = std::mem::MaybeUninit::<libc::stat>::uninit();
        // SAFETY: fstat only writes into the provided struct.
        let ret = unsafe { libc::fstat(self.fd, stat.as_mut_ptr()) };
        if ret < 0 {
            return Err(io::Error::last_os_error());
        }
        // SAFETY: fstat succeeded, so the struct is initialized.
        let stat = unsafe { stat.assume_init() };
        u64::try_from(stat.st_size)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "negative file size"))
    }

    fn read_block(&self, position: u64, mut buf: &mut [u8]) -> io::Result<()> {
        let mut offset = position;
        while !buf.is_empty() {
            let file_offset = libc::off_t::try_from(offset)
                .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "offset too large"))?;
            // SAFETY: buf is valid for writes of buf.len() bytes.
            let read = unsafe {
                libc::pread(
                    self.fd,
                    buf.as_mut_ptr() as *mut libc::c_void,
                    buf.len(),
                    file_offset,
                )
            };
            if read < 0 {
                let err = io::Error::last_os_error();
                if err.kind() == io::ErrorKind::Interrupted {
                    continue;
                }
                return Err(err);
            }
            if read == 0 {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "read past end of file",
                ));
            }
            let read = read as usize;
            buf = &mut std::mem::take(&mut buf)[read..];
            offset += read as u64;
        }
        Ok(())
    }
}
