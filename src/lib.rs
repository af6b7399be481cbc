//! dynhook - Safe native library loading for plugin loaders and hook shims
//!
//! Wraps the platform dynamic loader in an owning handle: a library is
//! opened when the handle is created, symbols are resolved by name on
//! demand, and the library is closed exactly once when the handle is
//! dropped.
//!
//! # Modules
//!
//! - [`library`]: [`LibraryHandle`] and the [`Loader`](library::Loader) seam
//! - [`error`]: Load and resolution errors
//! - [`hook`]: Process-wide lazily opened library for interposed functions
//! - [`config`]: Probe manifests (YAML)
//! - [`probe`]: Check a library against expected exports
//!
//! ```no_run
//! use dynhook::LibraryHandle;
//!
//! let libm = LibraryHandle::open("libm.so.6")?;
//! let sqrt: extern "C" fn(f64) -> f64 = unsafe { libm.function("sqrt")? };
//! assert_eq!(sqrt(9.0), 3.0);
//! # Ok::<(), dynhook::LibraryError>(())
//! ```

#[cfg(not(unix))]
compile_error!("dynhook wraps the unix dynamic loader (dlopen) and only builds on unix targets");

pub mod config;
pub mod error;
pub mod hook;
pub mod library;
pub mod probe;

pub use error::LibraryError;
pub use library::LibraryHandle;
