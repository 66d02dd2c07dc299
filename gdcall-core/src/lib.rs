/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! # Internal crate of [**gdcall**](https://docs.rs/gdcall)
//!
//! Typed layer on top of `gdcall-ffi`: builtin value types, ownership-aware object handles, engine class wrappers,
//! user classes with virtual dispatch, and the library entry point.
//!
//! Do not depend on this crate directly, instead use the `gdcall` crate.
//! No SemVer or other guarantees are provided.

pub mod builtin;
pub mod classes;
pub mod init;
pub mod log;
pub mod meta;
pub mod obj;
pub mod registry;

#[doc(hidden)]
pub mod private;

pub use gdcall_ffi as sys;

#[doc(hidden)]
pub use gdcall_ffi::out;
