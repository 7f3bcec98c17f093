//! Native library loading
//!
//! Wraps libloading so every caller gets the same candidate fallback
//! and the same error shape.

use libloading::os::unix::{Library as UnixLibrary, RTLD_GLOBAL, RTLD_LAZY, RTLD_NOW};
use libloading::Library;
use log::debug;

use crate::error::{PigletError, Result};

/// Open the first loadable library among `candidates`.
///
/// `global` exports the library's symbols to the process image
/// (RTLD_GLOBAL), which is what makes them visible to
/// [`crate::symbols::SymbolResolver`].
///
/// # Arguments
/// * `candidates` - Names or paths tried in order
/// * `what` - Human-readable name for error messages
/// * `global` - Open with RTLD_NOW | RTLD_GLOBAL instead of RTLD_LAZY
pub fn open_first<S: AsRef<str>>(candidates: &[S], what: &str, global: bool) -> Result<Library> {
    let flags = if global { RTLD_NOW | RTLD_GLOBAL } else { RTLD_LAZY };
    let mut last_error = String::from("no candidates configured");

    for candidate in candidates {
        let name = candidate.as_ref();
        match unsafe { UnixLibrary::open(Some(name), flags) } {
            Ok(lib) => {
                debug!("Loaded {}: {}", what, name);
                return Ok(Library::from(lib));
            }
            Err(e) => {
                debug!("Could not load {} from {}: {}", what, name, e);
                last_error = e.to_string();
            }
        }
    }

    Err(PigletError::LibraryLoad {
        what: what.to_string(),
        reason: last_error,
    })
}

/// Copy a function pointer out of a loaded library.
///
/// # Safety
/// `T` must match the C signature of `symbol`, and the returned value must
/// not outlive `lib`.
pub unsafe fn symbol<T: Copy>(lib: &Library, symbol: &str) -> Result<T> {
    lib.get::<T>(symbol.as_bytes())
        .map(|s| *s)
        .map_err(|e| PigletError::LibraryLoad {
            what: symbol.to_string(),
            reason: e.to_string(),
        })
}
