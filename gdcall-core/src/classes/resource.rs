/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::builtin::GString;
use crate::classes::{Object, RefCounted};
use crate::obj::{EngineClass, Gd, RawGd};

engine_class! {
    /// Base class for serializable data containers.
    pub struct Resource: RefCounted, Object;
    memory = MemRefCounted;
    methods = [
        set_name = 83702148,
        get_name = 201670096,
        duplicate = 482882304,
    ];
}

impl Resource {
    pub fn set_name(&self, name: &str) {
        let mut frame = self.frame();
        frame.arg(GString::from_str(self.binding(), name));
        self.ptrcall("set_name", frame)
    }

    pub fn get_name(&self) -> GString {
        self.ptrcall("get_name", self.frame())
    }

    /// Copies the resource. With `subresources`, nested resources are copied as well instead of shared.
    ///
    /// The engine returns the copy with one reference taken for the caller, which the returned `Gd` holds.
    pub fn duplicate(&self, subresources: bool) -> Gd<Resource> {
        let mut frame = self.frame();
        frame.arg(subresources);
        let ptr = self.ptrcall_object("duplicate", frame);

        // SAFETY: the engine returned a fresh Resource, reference already taken.
        unsafe { RawGd::from_obj_sys_transferred(self.binding(), ptr) }
            .map(Gd::from_raw)
            .unwrap_or_else(|| panic!("Resource::duplicate() returned null"))
    }
}
