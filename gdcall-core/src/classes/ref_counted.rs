/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::classes::Object;

engine_class! {
    /// Base class for reference-counted objects.
    ///
    /// The reference count is managed by [`Gd`][crate::obj::Gd]; the methods below are exposed for inspection and
    /// for low-level code. Calling them directly unbalances the count.
    pub struct RefCounted: Object;
    memory = MemRefCounted;
    methods = [
        init_ref = 2240911060,
        reference = 2240911060,
        unreference = 2240911060,
        get_reference_count = 3905245786,
    ];
}

impl RefCounted {
    /// Initializes the internal reference counter of a new instance. Returns `true` on success.
    pub fn init_ref(&self) -> bool {
        self.ptrcall("init_ref", self.frame())
    }

    /// Increments the reference counter. Returns `true` on success.
    pub fn reference(&self) -> bool {
        self.ptrcall("reference", self.frame())
    }

    /// Decrements the reference counter. Returns `true` if the object should be destroyed, i.e. the count reached zero.
    pub fn unreference(&self) -> bool {
        self.ptrcall("unreference", self.frame())
    }

    pub fn get_reference_count(&self) -> i32 {
        self.ptrcall("get_reference_count", self.frame())
    }
}
