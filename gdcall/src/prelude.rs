/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Often-imported symbols.

pub use super::builtin::{Basis, GString, Transform3D, Vector2, Vector3};
pub use super::classes::{Node, Node3D, Object, ProcessMode, RefCounted, Resource};
pub use super::init::{gdextension, ExtensionLibrary, InitContext, InitLevel};
pub use super::log::{godot_error, godot_warn};
pub use super::meta::{ClassName, ConvertError, FromGodot, GodotConvert, ToGodot};
pub use super::obj::{
    Base, EngineClass, Gd, GdMut, GdRef, GodotClass, Inherits, InstanceId, MemManual, MemRefCounted, UserClass,
};
pub use super::registry::{ClassRegistry, VirtualTable};

// Make trait methods available.
#[rustfmt::skip] // One per line.
mod trait_reexports {
    pub use crate::obj::NewAlloc as _;
    pub use crate::obj::NewGd as _;
}

pub use trait_reexports::*;
