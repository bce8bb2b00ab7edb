// Sat Oct 17 2026 - Alex

pub mod error;
pub mod rewrite;
pub mod table;

pub use error::OutputError;
pub use rewrite::{flatten_std_abi, rewrite_template_argument, NameRewriter, RewriteFn, WrapperRewrite};
pub use table::{CastsTable, TableAssembler};
