//! Pattern compilation cache, match/extract/substitute, and range
//! transliteration (§4.7/C7). The *data* types (`CompiledRegex`,
//! `CompiledSubst`, `Transliteration`, `RegexOptions`) live in
//! `strand-value::pattern` so `Value` can hold them without this crate in
//! the loop; this crate owns compiling a pattern string into one and the
//! operations that run against it.

pub mod cache;
pub mod error;
pub mod ops;
pub mod transliterate;

pub use cache::PatternCache;
pub use error::RegexError;
