// Sat Oct 17 2026 - Alex

use std::io;
use std::path::PathBuf;

/// Path of the image (shared library or executable) this crate is linked into.
///
/// Asks the dynamic loader which file contains this very function, so a
/// library reports itself rather than the host program. Falls back to the
/// running executable when the loader has no usable answer.
pub fn current_artifact() -> io::Result<PathBuf> {
    #[cfg(unix)]
    {
        if let Some(path) = loaded_image_path() {
            log::debug!("Loaded image resolved to {}", path.display());
            return Ok(path);
        }
        log::debug!("dladdr gave no usable path, using the current executable");
    }
    std::env::current_exe()
}

#[cfg(unix)]
fn loaded_image_path() -> Option<PathBuf> {
    use std::ffi::{CStr, OsStr};
    use std::os::unix::ffi::OsStrExt;

    let address = current_artifact as *const () as *const libc::c_void;
    // SAFETY: Dl_info is plain data and dladdr only writes into it.
    let mut info: libc::Dl_info = unsafe { std::mem::zeroed() };
    let found = unsafe { libc::dladdr(address, &mut info) };
    if found == 0 || info.dli_fname.is_null() {
        return None;
    }

    // SAFETY: non-null dli_fname points at a NUL-terminated string owned by the loader.
    let name = unsafe { CStr::from_ptr(info.dli_fname) };
    if name.to_bytes().is_empty() {
        return None;
    }
    let path = PathBuf::from(OsStr::from_bytes(name.to_bytes()));
    path.is_file().then_some(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_artifact_is_a_file() {
        let path = current_artifact().unwrap();
        assert!(path.is_file(), "{} is not a file", path.display());
    }
}
