//! Cross-source tests for replica configuration loading
