//! Shared result type.
//!
//! Fallible I/O layers (the message log, configuration) return
//! `Result<T, TheirError>`, which wraps the layer's own error enum in a
//! `rootcause::Report`. Remote model calls do not use it: they degrade to a
//! fallback value instead of failing.

use rootcause::Report;

/// `std::result::Result` over a `rootcause::Report` of `C`.
pub type Result<T, C = ()> = std::result::Result<T, Report<C>>;
