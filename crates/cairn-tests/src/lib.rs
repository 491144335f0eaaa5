//! Adversarial test suite for the Cairn checkpoint guard.
//!
//! Integration tests that attack the checkpoint rules from the outside:
//! forged hashes at checkpointed heights, deep reorg attempts, and property
//! tests over randomized chains and tables.

pub mod helpers;
