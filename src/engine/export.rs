// Sat Oct 17 2026 - Alex

use crate::engine::core::Shared;
use crate::engine::{CastsError, Exposure};
use std::ffi::CStr;
use std::os::raw::c_char;

/// Resolve one cached C string of a static exposure, or describe why it failed.
pub fn resolve_c_str(
    exposure: &'static Result<Exposure, CastsError>,
    get: fn(&'static Exposure) -> Shared<'static, CStr>,
) -> Result<&'static CStr, String> {
    let exposure = exposure
        .as_ref()
        .map_err(|e| format!("Casts table exposure failed to initialize: {}", e))?;
    get(exposure).map_err(|e| format!("Failed to generate casts table: {}", e))
}

/// Entry point body for C callers. The returned pointer stays valid for the
/// life of the process. Any failure is fatal: it is logged and the process aborts,
/// since nothing can unwind across the C boundary.
pub fn exported_c_str(
    exposure: &'static Result<Exposure, CastsError>,
    get: fn(&'static Exposure) -> Shared<'static, CStr>,
) -> *const c_char {
    match resolve_c_str(exposure, get) {
        Ok(c_str) => c_str.as_ptr(),
        Err(message) => {
            log::error!("{}", message);
            eprintln!("casts-table: {}", message);
            std::process::abort()
        }
    }
}

/// Define the two C entry points of an exposure held in a static
/// `Lazy<Result<Exposure, CastsError>>`.
///
/// ```ignore
/// static EXPOSURE: Lazy<Result<Exposure, CastsError>> = Lazy::new(|| build_exposure());
/// export_casts_table!(EXPOSURE => my_api_casts_table, my_api_known_types);
/// ```
///
/// The first function returns the casts table JSON, the second the
/// known-types regular expression. Both abort the process on failure.
#[macro_export]
macro_rules! export_casts_table {
    ($exposure:path => $table_fn:ident, $known_types_fn:ident) => {
        #[no_mangle]
        pub extern "C" fn $table_fn() -> *const ::std::os::raw::c_char {
            $crate::engine::exported_c_str(&*$exposure, $crate::engine::Exposure::casts_table_c_str)
        }

        #[no_mangle]
        pub extern "C" fn $known_types_fn() -> *const ::std::os::raw::c_char {
            $crate::engine::exported_c_str(&*$exposure, $crate::engine::Exposure::known_types_c_str)
        }
    };
}
