//! Owned dynamic library sessions.
//!
//! A [`LibraryHandle`] opens its library eagerly, resolves symbols on demand
//! and closes the library exactly once when dropped. It is deliberately not
//! `Clone`: two owners of one loader handle would close it twice.

pub mod loader;

use crate::error::LibraryError;
use std::ffi::c_void;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::ptr::NonNull;
use tracing::{debug, error};

pub use loader::{DlLoader, Loader};

/// One open session with the native loader
pub struct LibraryHandle<L: Loader = DlLoader> {
    name: String,
    loader: L,
    handle: Option<L::Handle>,
}

impl LibraryHandle<DlLoader> {
    /// Open a library by path or loader-resolvable name
    ///
    /// Symbols are bound lazily, as they are looked up.
    ///
    /// # Errors
    /// Returns [`LibraryError::Load`] if the loader cannot open the library
    /// (not found, malformed, missing dependencies, permission denied).
    pub fn open(name: impl Into<String>) -> Result<Self, LibraryError> {
        Self::open_with(DlLoader, name)
    }

    /// Adopt a raw `dlopen` handle
    ///
    /// A null `raw` yields a handle that refuses every lookup with
    /// [`LibraryError::InvalidHandle`].
    ///
    /// # Safety
    /// A non-null `raw` must come from `dlopen` (or [`LibraryHandle::into_raw`])
    /// and must not be closed by anyone else afterwards.
    pub unsafe fn from_raw(name: impl Into<String>, raw: *mut c_void) -> Self {
        let handle = if raw.is_null() {
            None
        } else {
            Some(libloading::os::unix::Library::from_raw(raw))
        };

        Self {
            name: name.into(),
            loader: DlLoader,
            handle,
        }
    }

    /// Give up ownership of the native handle without closing it
    ///
    /// Returns null if the handle was never open.
    #[must_use]
    pub fn into_raw(mut self) -> *mut c_void {
        self.handle
            .take()
            .map_or(std::ptr::null_mut(), libloading::os::unix::Library::into_raw)
    }
}

impl<L: Loader> LibraryHandle<L> {
    /// Open a library through a specific loader
    ///
    /// # Errors
    /// Returns [`LibraryError::Load`] carrying the loader's diagnostic.
    pub fn open_with(loader: L, name: impl Into<String>) -> Result<Self, LibraryError> {
        let name = name.into();
        let handle = loader
            .open(&name)
            .map_err(|reason| LibraryError::Load {
                name: name.clone(),
                reason,
            })?;

        debug!("Opened library {}", name);

        Ok(Self {
            name,
            loader,
            handle: Some(handle),
        })
    }

    /// Resolve the address of an exported symbol
    ///
    /// The address is untyped; casting it to the right function or data
    /// pointer type is up to the caller. Nothing is cached, every call asks
    /// the loader again.
    ///
    /// # Errors
    /// - [`LibraryError::InvalidHandle`] if there is no open handle
    /// - [`LibraryError::SymbolNotFound`] if the library does not export `name`
    pub fn symbol(&self, name: &str) -> Result<NonNull<c_void>, LibraryError> {
        let handle = self.handle.as_ref().ok_or(LibraryError::InvalidHandle)?;

        self.loader
            .symbol(handle, name)
            .ok_or_else(|| LibraryError::SymbolNotFound {
                library: self.name.clone(),
                symbol: name.to_string(),
            })
    }

    /// Resolve a symbol and reinterpret its address as `F`
    ///
    /// `F` is normally an `extern "C" fn(..)` type matching the export.
    ///
    /// # Errors
    /// Same as [`LibraryHandle::symbol`].
    ///
    /// # Safety
    /// `F` must be the actual type of the exported item. No checking is
    /// possible beyond the size assertion.
    ///
    /// # Panics
    /// If `F` is not pointer-sized.
    pub unsafe fn function<F: Copy>(&self, name: &str) -> Result<F, LibraryError> {
        assert_eq!(
            std::mem::size_of::<F>(),
            std::mem::size_of::<*mut c_void>(),
            "symbol type must be pointer-sized"
        );

        let address = self.symbol(name)?.as_ptr();
        Ok(std::mem::transmute_copy::<*mut c_void, F>(&address))
    }

    /// Name the library was opened with
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether a native handle is held
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.handle.is_some()
    }
}

impl<L: Loader> fmt::Debug for LibraryHandle<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LibraryHandle")
            .field("name", &self.name)
            .field("open", &self.is_open())
            .finish()
    }
}

impl<L: Loader> Drop for LibraryHandle<L> {
    fn drop(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };

        // A failed close is not actionable during teardown: report it and move on.
        let loader = &self.loader;
        match panic::catch_unwind(AssertUnwindSafe(|| loader.close(handle))) {
            Ok(Ok(())) => debug!("Closed library {}", self.name),
            Ok(Err(reason)) => error!("Unable to close library: {} ({})", self.name, reason),
            Err(_) => error!("Unable to close library: {}", self.name),
        }
    }
}
