/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::builtin::{Transform3D, Vector3};
use crate::classes::{Node, Object};
use crate::meta::ToGodot;

engine_class! {
    /// Most basic 3D game object, with a 3D transform.
    pub struct Node3D: Node, Object;
    memory = MemManual;
    methods = [
        set_position = 3460891852,
        get_position = 3360562783,
        set_transform = 2952846383,
        get_transform = 3229777777,
        rotate = 3436291937,
    ];
}

impl Node3D {
    pub fn set_position(&self, position: Vector3) {
        let mut frame = self.frame();
        frame.arg(position);
        self.ptrcall("set_position", frame)
    }

    pub fn get_position(&self) -> Vector3 {
        self.ptrcall("get_position", self.frame())
    }

    /// Sets the local transform, relative to the parent node.
    pub fn set_transform(&self, transform: Transform3D) {
        let mut frame = self.frame();
        frame.arg(transform);
        self.ptrcall("set_transform", frame)
    }

    pub fn get_transform(&self) -> Transform3D {
        self.ptrcall("get_transform", self.frame())
    }

    /// Rotates the local transform around `axis` (normalized) by `angle` radians. The position is kept.
    pub fn rotate(&self, axis: Vector3, angle: f32) {
        let mut frame = self.frame();
        frame.arg(axis).arg(angle.to_godot());
        self.ptrcall("rotate", frame)
    }
}
