//! Property-based tests for capacity and status rules.
