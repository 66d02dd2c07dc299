/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Types and traits related to objects.
//!
//! The most important symbols from this module are:
//! * [`GodotClass`], which must be implemented for all classes: engine-provided ones and user-defined ones.
//! * [`Gd`], a smart pointer that manages instances of engine classes.
//! * [`Inherits`], the up-cast relation between engine classes.

mod base;
mod gd;
mod guards;
mod handle;
mod instance_id;
mod raw_gd;
mod traits;

pub mod bounds;

pub use base::*;
pub use gd::*;
pub use guards::*;
pub use handle::*;
pub use instance_id::*;
pub use raw_gd::Ownership;
pub use traits::*;

pub use bounds::{MemDynamic, MemManual, MemRefCounted, PossiblyManual};

pub(crate) use raw_gd::RawGd;
