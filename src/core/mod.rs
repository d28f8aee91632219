//! Core modules for the `rush-pnpm` wrapper.
//!
//! Leaf-first: `environment` and `policy` are pure, `config`, `spawn` and
//! `fs_sync` do the I/O, and `invoke` drives one invocation through them,
//! handing off to `sync` after PNPM succeeds.

pub mod config;
pub mod environment;
pub mod error;
pub mod fs_sync;
pub mod invoke;
pub mod output;
pub mod policy;
pub mod spawn;
pub mod sync;
