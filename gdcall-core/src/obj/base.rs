/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::ops::Deref;

use crate::obj::raw_gd::RawGd;
use crate::obj::{EngineClass, Gd, ObjectHandle};

/// Restricted version of `Gd`, to hold the base instance inside a user's `GodotClass`.
///
/// Behaves similarly to [`Gd`][crate::obj::Gd], but is more constrained. Cannot be constructed by the user.
/// Engine methods of the base class are available through `Deref`.
pub struct Base<W: EngineClass> {
    obj: W,
}

impl<W: EngineClass> Base<W> {
    /// # Safety
    /// `handle` must refer to the engine object that the user instance is attached to.
    pub(crate) unsafe fn from_handle(handle: ObjectHandle) -> Self {
        Self {
            obj: W::from_handle(handle),
        }
    }

    /// Returns a [`Gd`] referencing the same object as this reference.
    ///
    /// Manually managed objects are borrowed; ref-counted ones gain a reference.
    pub fn to_gd(&self) -> Gd<W> {
        let handle = self.obj.handle();

        // SAFETY: the base object outlives the user instance that holds this Base.
        let raw = unsafe { RawGd::<W>::from_obj_sys(handle.binding(), handle.obj_sys()) };
        raw.map(Gd::from_raw)
            .unwrap_or_else(|| panic!("base object {} has no instance ID", handle.instance_id()))
    }
}

impl<W: EngineClass> Deref for Base<W> {
    type Target = W;

    fn deref(&self) -> &W {
        &self.obj
    }
}

impl<W: EngineClass> Debug for Base<W> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "Base {{ id: {} }}", self.obj.handle().instance_id())
    }
}
