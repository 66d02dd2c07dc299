/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Registration of user classes and dispatch of engine virtuals.

mod callbacks;
mod class;
mod storage;
mod virtuals;

pub use class::ClassRegistry;
pub use virtuals::{VirtualEntry, VirtualFn, VirtualMethod, VirtualTable};

pub(crate) use storage::InstanceStorage;
