//! Open a library and check it against a list of expected exports.

use crate::config::ProbeConfig;
use crate::error::LibraryError;
use crate::library::{DlLoader, LibraryHandle, Loader};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// A symbol that resolved, with the address it had during the probe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedSymbol {
    pub name: String,
    pub address: usize,
}

/// Outcome of probing one library
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeReport {
    pub library: String,
    pub resolved: Vec<ResolvedSymbol>,
    /// Optional symbols the library does not export
    pub unavailable: Vec<String>,
}

impl ProbeReport {
    /// True when every requested symbol resolved
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.unavailable.is_empty()
    }
}

impl fmt::Display for ProbeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.library)?;
        for symbol in &self.resolved {
            writeln!(f, "  {:<40} {:#018x}", symbol.name, symbol.address)?;
        }
        for name in &self.unavailable {
            writeln!(f, "  {name:<40} unavailable")?;
        }
        Ok(())
    }
}

/// Probe the library named in `config` with the native loader
///
/// # Errors
/// [`LibraryError::Load`] if the library cannot be opened, or
/// [`LibraryError::SymbolNotFound`] for the first missing required symbol.
pub fn probe(config: &ProbeConfig) -> Result<ProbeReport, LibraryError> {
    probe_with(DlLoader, config)
}

/// Probe through a specific loader
///
/// # Errors
/// Same as [`probe`].
pub fn probe_with<L: Loader>(loader: L, config: &ProbeConfig) -> Result<ProbeReport, LibraryError> {
    let library = LibraryHandle::open_with(loader, config.library.as_str())?;
    let mut report = ProbeReport {
        library: config.library.clone(),
        resolved: Vec::with_capacity(config.required.len() + config.optional.len()),
        unavailable: Vec::new(),
    };

    for name in &config.required {
        let address = library.symbol(name)?;
        report.resolved.push(ResolvedSymbol {
            name: name.clone(),
            address: address.as_ptr() as usize,
        });
    }

    for name in &config.optional {
        match library.symbol(name) {
            Ok(address) => report.resolved.push(ResolvedSymbol {
                name: name.clone(),
                address: address.as_ptr() as usize,
            }),
            Err(e) if e.is_symbol_not_found() => {
                debug!("Optional symbol {} not exported by {}", name, config.library);
                report.unavailable.push(name.clone());
            }
            Err(e) => return Err(e),
        }
    }

    Ok(report)
}
