//! Cross-crate integration tests for the identity registry. See `tests/`.
