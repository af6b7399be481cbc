//! Errors raised while opening libraries and resolving symbols.

/// Failure of a loader operation on a [`LibraryHandle`](crate::library::LibraryHandle).
///
/// The three kinds are kept apart so callers can, for example, treat a
/// missing symbol as an optional feature while still failing hard on a
/// library that could not be opened at all.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LibraryError {
    /// The loader could not open the named library
    #[error("Unable to open library: {name} due to {reason}")]
    Load { name: String, reason: String },

    /// Resolution was attempted without an open handle
    #[error("Handle to library is nullptr")]
    InvalidHandle,

    /// The library is open but does not export the symbol
    #[error("{library}: error loading symbol: {symbol}")]
    SymbolNotFound { library: String, symbol: String },
}

impl LibraryError {
    /// Whether the error means "library present, symbol absent"
    #[must_use]
    pub fn is_symbol_not_found(&self) -> bool {
        matches!(self, Self::SymbolNotFound { .. })
    }
}
