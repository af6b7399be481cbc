use libloading::os::unix::{Library, RTLD_LAZY};
use std::ffi::c_void;
use std::ptr::NonNull;

/// The three native loader calls a [`LibraryHandle`](super::LibraryHandle) is built on.
///
/// Errors are the loader's own diagnostic strings; turning them into
/// [`LibraryError`](crate::error::LibraryError) is left to the handle.
pub trait Loader {
    /// Opaque handle for one open library session
    type Handle;

    /// Open `name`, resolving symbols lazily
    fn open(&self, name: &str) -> Result<Self::Handle, String>;

    /// Look up `name` in an open library. `None` when absent or null.
    fn symbol(&self, handle: &Self::Handle, name: &str) -> Option<NonNull<c_void>>;

    /// Release the handle
    ///
    /// Report failure by returning `Err`. A panic here is caught when a
    /// [`LibraryHandle`](super::LibraryHandle) is dropped, but the panic hook
    /// will already have printed its own message before the close error is
    /// logged.
    fn close(&self, handle: Self::Handle) -> Result<(), String>;
}

/// `dlopen`/`dlsym`/`dlclose` through libloading
#[derive(Debug, Clone, Copy, Default)]
pub struct DlLoader;

impl Loader for DlLoader {
    type Handle = Library;

    fn open(&self, name: &str) -> Result<Library, String> {
        // Safety: running the library's initializers is inherent to loading it;
        // the caller chose the library.
        unsafe { Library::open(Some(name), RTLD_LAZY) }.map_err(|e| e.to_string())
    }

    fn symbol(&self, handle: &Library, name: &str) -> Option<NonNull<c_void>> {
        // Safety: the address is requested as an untyped pointer and never
        // dereferenced here.
        let symbol = unsafe { handle.get::<*mut c_void>(name.as_bytes()) }.ok()?;
        NonNull::new(symbol.into_raw())
    }

    fn close(&self, handle: Library) -> Result<(), String> {
        handle.close().map_err(|e| e.to_string())
    }
}
