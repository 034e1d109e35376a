//! This crate provides test-utilities for the payment channel crates.
//!
//! These utilities are mostly used to generate random values and proptest strategies for types
//! from external libraries, where implementing `Arbitrary` is not feasible due to the orphan rule.

pub mod arbitrary_generator;
pub mod bitcoin;
