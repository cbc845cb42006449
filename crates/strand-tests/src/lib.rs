//! Cross-crate end-to-end scenarios. This crate has no library surface of
//! its own; see `tests/` for the scenario suite exercised against the
//! published crates as ordinary dev-dependencies.
