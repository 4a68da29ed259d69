//! Script intelligence for the Eidos language and SLiM simulation scripts:
//! token-driven reformatting, type-aware code completion and line-by-line
//! syntax classification.

pub mod completion;
pub mod config;
pub mod errors;
pub mod format;
pub mod highlight;
pub mod logging;
pub mod script;
pub mod types;
