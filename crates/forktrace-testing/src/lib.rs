//! Testing infrastructure for forktrace's integration tests.
//!
//! This crate provides:
//! - [`fixtures`]: builders for the canonical `Agent`/`Mail`/`Event` shapes
//! tests need to seed a store with, without each test hand-rolling one
//! - [`world::TestWorld`]: a fluent harness around the compiled `forktrace`
//! binary for subprocess-level integration tests
//! - [`engine`]: an in-process `Engine` fixture for tests that want to
//! drive the conversation core directly, without a subprocess
//! - [`assertions`]: readable helpers for the common shapes tests check

pub mod assertions;
pub mod engine;
pub mod fixtures;
pub mod world;

pub use world::TestWorld;
