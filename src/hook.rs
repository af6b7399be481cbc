//! Process-wide library for hook shims
//!
//! Interposed functions need to forward to the real implementation in some
//! native library. A [`HookLibrary`] sits in a `static`, opens that library
//! the first time any shim asks for a symbol and keeps it open for the rest
//! of the process.
//!
//! ```no_run
//! use dynhook::hook::HookLibrary;
//!
//! static CUDA: HookLibrary = HookLibrary::new("/usr/lib/x86_64-linux-gnu/libcuda.so");
//!
//! type CuInit = unsafe extern "C" fn(u32) -> i32;
//!
//! let real_init: CuInit = unsafe { CUDA.function("cuInit") }.unwrap();
//! ```

use crate::error::LibraryError;
use crate::library::LibraryHandle;
use once_cell::sync::OnceCell;
use std::ffi::c_void;
use std::ptr::NonNull;
use tracing::debug;

/// Lazily opened library shared by the whole process
pub struct HookLibrary {
    path: &'static str,
    library: OnceCell<LibraryHandle>,
}

impl HookLibrary {
    /// Declare a hook library; nothing is opened yet
    #[must_use]
    pub const fn new(path: &'static str) -> Self {
        Self {
            path,
            library: OnceCell::new(),
        }
    }

    /// Path handed to the loader
    #[must_use]
    pub fn path(&self) -> &'static str {
        self.path
    }

    /// Whether the library has been opened
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.library.get().is_some()
    }

    /// The shared handle, opening the library on first use
    ///
    /// # Errors
    /// Returns [`LibraryError::Load`] if opening fails. Nothing is remembered
    /// about the failure, so the next call tries again.
    pub fn handle(&self) -> Result<&LibraryHandle, LibraryError> {
        self.library.get_or_try_init(|| {
            debug!("Opening hook library {}", self.path);
            LibraryHandle::open(self.path)
        })
    }

    /// Resolve a symbol in the shared library
    ///
    /// # Errors
    /// Load errors from the first open, or [`LibraryError::SymbolNotFound`].
    pub fn symbol(&self, name: &str) -> Result<NonNull<c_void>, LibraryError> {
        self.handle()?.symbol(name)
    }

    /// Resolve a symbol as a function pointer type
    ///
    /// # Errors
    /// Same as [`HookLibrary::symbol`].
    ///
    /// # Safety
    /// See [`LibraryHandle::function`].
    pub unsafe fn function<F: Copy>(&self, name: &str) -> Result<F, LibraryError> {
        self.handle()?.function(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static MISSING: HookLibrary = HookLibrary::new("libdynhook_missing_hook.so");

    #[test]
    fn test_not_loaded_until_used() {
        let hook = HookLibrary::new("libdynhook_unused.so");
        assert!(!hook.is_loaded());
        assert_eq!(hook.path(), "libdynhook_unused.so");
    }

    #[test]
    fn test_failed_open_is_retried() {
        for _ in 0..2 {
            let err = MISSING.symbol("anything").unwrap_err();
            assert!(matches!(err, LibraryError::Load { .. }));
            assert!(!MISSING.is_loaded());
        }
    }
}
