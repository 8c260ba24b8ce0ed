//! # Lifetime observation primitives.
//!
//! This module provides the two-flag lifetime signal the rest of the
//! runtime is built on:
//! - [`Flag`] - a shared boolean cell observable by non-owners
//! - [`Mortality`] - the `dead` / `destroyed` flag pair
//! - [`Mortal`] - trait for objects exposing a [`Mortality`] and an
//!   idempotent mark-dead hook
//! - [`MortalRef`] - non-owning observer that can mark a target dead
//!   without extending its lifetime
//! - [`WeakRef`] - non-owning handle that refuses to produce the target
//!   once the `destroyed` flag is set
//!
//! ## Architecture
//! ```text
//! owner ──────────────► Mortality { dead, destroyed }
//!   │                        ▲            ▲
//!   │ mark_dead()            │ shared     │ shared
//!   ▼                        │            │
//! on_mark_dead() hook   MortalRef     WeakRef<T>
//!                       (mark dead     (get() -> None once
//!                        if alive)      destroyed is set)
//! ```
//!
//! ## Rules
//! - `dead` may be set early (logical completion) independent of
//!   `destroyed` (actual reclamation).
//! - Once `destroyed` is true it never reverts.
//! - Marking dead is idempotent; the hook runs exactly once.
//! - Accessing a target through [`WeakRef::get`] is the only sanctioned
//!   path: the flag check happens before any upgrade.

mod flag;
mod mortal;
mod weak;

pub use flag::Flag;
pub use mortal::{Mortal, MortalRef, Mortality};
pub use weak::WeakRef;
