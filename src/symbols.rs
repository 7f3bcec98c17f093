//! Dynamic symbol lookup in the running process
//!
//! Used to fetch GL / EGL extension entry points at runtime. The handle to
//! the process image is acquired once and released on drop.

use std::ffi::c_void;
use std::ptr;

use libloading::os::unix::Library as UnixLibrary;
use log::trace;

use crate::error::{PigletError, Result};

/// Cached handle to the process's own symbol table
pub struct SymbolResolver {
    image: UnixLibrary,
}

impl SymbolResolver {
    /// Open the running process image (dlopen(NULL))
    pub fn new() -> Self {
        Self {
            image: UnixLibrary::this(),
        }
    }

    /// Address of `name`, or an error if it is not a usable symbol name or
    /// the process image does not export it.
    pub fn lookup(&self, name: &str) -> Result<*mut c_void> {
        if name.is_empty() || name.contains('\0') {
            return Err(PigletError::InvalidSymbolName(name.to_string()));
        }

        let address = unsafe { self.image.get::<*mut c_void>(name.as_bytes()) }
            .map(|symbol| symbol.into_raw())
            .map_err(|e| PigletError::LibraryLoad {
                what: name.to_string(),
                reason: e.to_string(),
            })?;
        trace!("Resolved {} at {:p}", name, address);
        Ok(address)
    }

    /// Address of `name`, null if it cannot be resolved
    pub fn resolve(&self, name: &str) -> *mut c_void {
        self.lookup(name).unwrap_or(ptr::null_mut())
    }
}

impl Default for SymbolResolver {
    fn default() -> Self {
        Self::new()
    }
}
