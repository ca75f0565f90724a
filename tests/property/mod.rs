//! Property-based tests for output layout and anchor chaining

mod chaining;
