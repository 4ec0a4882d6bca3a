//! Anonymous memory regions that get faulted in one page at a time.

use std::ptr;
use std::sync::OnceLock;

use errno::Errno;
use libc::{
    mmap as libc_mmap, munmap as libc_munmap, MAP_ANONYMOUS, MAP_FAILED, MAP_PRIVATE, PROT_READ,
    PROT_WRITE,
};
use tracing::warn;

use crate::error::WorkerError;

/// Used when `sysconf` can't tell us the page size.
const FALLBACK_PAGE_SIZE: usize = 4096;

/// The system page size, looked up once.
pub fn page_size() -> usize {
    static PAGE_SIZE: OnceLock<usize> = OnceLock::new();

    *PAGE_SIZE.get_or_init(|| {
        let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
        if size > 0 {
            size as usize
        } else {
            FALLBACK_PAGE_SIZE
        }
    })
}

/// A private, anonymous, read-write mapping of whole pages.
///
/// Dropping a `Region` unmaps it. The benchmark normally calls [`Region::leak`] instead, leaving
/// the pages mapped until the process exits.
#[derive(Debug)]
pub struct Region {
    addr: *mut u8,
    pages: usize,
    page_size: usize,
}

impl Region {
    /// Map `pages` fresh pages. Nothing is faulted in yet.
    ///
    /// A zero-page region maps nothing, since `mmap` rejects a zero length.
    pub fn allocate(pages: usize) -> Result<Self, WorkerError> {
        let page_size = page_size();

        let len = pages
            .checked_mul(page_size)
            .ok_or(WorkerError::SizeOverflow { pages })?;

        if len == 0 {
            return Ok(Region {
                addr: ptr::null_mut(),
                pages: 0,
                page_size,
            });
        }

        let addr = unsafe {
            libc_mmap(
                ptr::null_mut(),
                len,
                PROT_READ | PROT_WRITE,
                MAP_PRIVATE | MAP_ANONYMOUS,
                -1,
                0,
            )
        };

        if addr == MAP_FAILED {
            return Err(WorkerError::AllocationFailure {
                pages,
                errno: errno::errno(),
            });
        }

        Ok(Region {
            addr: addr as *mut u8,
            pages,
            page_size,
        })
    }

    /// Write once to the first byte of every page, lowest address first.
    pub fn touch_all_pages(&mut self) {
        for page in 0..self.pages {
            // Volatile, so the store actually reaches the page and the fault really happens.
            unsafe {
                self.addr.add(page * self.page_size).write_volatile(page as u8);
            }
        }
    }

    /// How many pages of the region are currently resident, according to `mincore(2)`.
    pub fn resident_pages(&self) -> Result<usize, Errno> {
        if self.pages == 0 {
            return Ok(0);
        }

        let mut vec = vec![0u8; self.pages];
        let res = unsafe {
            libc::mincore(
                self.addr as *mut libc::c_void,
                self.len(),
                vec.as_mut_ptr(),
            )
        };
        if res != 0 {
            return Err(errno::errno());
        }

        Ok(vec.iter().filter(|&&b| b & 1 != 0).count())
    }

    /// Give up ownership without unmapping. The pages stay mapped until the process exits.
    pub fn leak(self) {
        std::mem::forget(self);
    }

    fn len(&self) -> usize {
        self.pages * self.page_size
    }

    #[cfg(test)]
    fn as_ptr(&self) -> *const u8 {
        self.addr
    }
}

impl Drop for Region {
    fn drop(&mut self) {
        if self.pages == 0 {
            return;
        }

        let res = unsafe { libc_munmap(self.addr as *mut libc::c_void, self.len()) };
        if res != 0 {
            warn!("munmap of {} pages failed: {}", self.pages, errno::errno());
        }
    }
}
