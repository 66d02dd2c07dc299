/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! # Internal crate of [**gdcall**](https://docs.rs/gdcall)
//!
//! Low-level layer over the engine's GDExtension ABI: the interface struct, the per-engine [`Binding`] holding resolved
//! method binds, and the [`CallFrame`] used to marshal ptrcalls.
//!
//! Do not depend on this crate directly, instead use the `gdcall` crate.
//! No SemVer or other guarantees are provided.

mod binding;
mod call_frame;
mod class_name;
mod config;
mod error;
mod godot_ffi;
mod init_level;
mod interface;
mod method_table;
mod opaque;
mod toolbox;

pub use binding::Binding;
pub use call_frame::{frame_stats, CallFrame, FrameStats, MAX_ARGS, SLOT_ALIGN, SLOT_SIZE};
pub use class_name::ClassName;
pub use config::{BindingConfig, GodotVersion, Safeguards};
pub use error::InitError;
pub use godot_ffi::GodotFfi;
pub use init_level::InitLevel;
pub use interface::*;
pub use method_table::{BuiltinLifecycleTable, ClassMethodBind, MethodDecl, MethodTable};
pub use opaque::{Opaque, OpaqueString};
pub use toolbox::*;
