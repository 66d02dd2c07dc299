/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::builtin::GString;
use crate::classes::EngineClassInfo;
use crate::meta::{ClassName, MethodDecl};
use crate::obj::{EngineClass, GodotClass, InstanceId, MemDynamic, ObjectHandle};

/// Base class of all engine classes.
///
/// Whether an `Object` is reference-counted is only known at runtime; see
/// [`MemDynamic`][crate::obj::MemDynamic].
pub struct Object {
    handle: ObjectHandle,
}

impl GodotClass for Object {
    type Memory = MemDynamic;
    type Wrapper = Self;
    const CLASS_NAME: ClassName = ClassName::new("Object\0");
}

impl EngineClass for Object {
    fn handle(&self) -> &ObjectHandle {
        &self.handle
    }

    unsafe fn from_handle(handle: ObjectHandle) -> Self {
        Self { handle }
    }
}

impl Object {
    pub(crate) const METHODS: &'static [MethodDecl] = &[
        MethodDecl::new(Self::CLASS_NAME, "get_class\0", 201670096),
        MethodDecl::new(Self::CLASS_NAME, "is_class\0", 3927539163),
    ];

    pub(crate) const INFO: EngineClassInfo = EngineClassInfo {
        name: Self::CLASS_NAME,
        parent: None,
        methods: Self::METHODS,
    };

    /// Name of the object's dynamic class, as known to the engine.
    pub fn get_class(&self) -> GString {
        self.handle.call(Self::CLASS_NAME, "get_class", self.call_frame())
    }

    /// Returns `true` if the object is of class `class` or inherits from it.
    pub fn is_class(&self, class: &str) -> bool {
        let mut frame = self.call_frame();
        frame.arg(GString::from_str(self.binding(), class));
        self.handle.call(Self::CLASS_NAME, "is_class", frame)
    }

    /// ⚠️ Returns the instance ID of this object.
    pub fn instance_id(&self) -> InstanceId {
        self.handle.instance_id()
    }

    pub fn is_instance_valid(&self) -> bool {
        self.handle.is_instance_valid()
    }
}

impl std::fmt::Debug for Object {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Object")
            .field("id", &self.handle.instance_id())
            .finish()
    }
}
