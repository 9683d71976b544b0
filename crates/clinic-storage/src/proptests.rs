//! Property-based tests for booking under contention.
