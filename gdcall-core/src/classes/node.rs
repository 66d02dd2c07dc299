/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::builtin::GString;
use crate::classes::Object;
use crate::meta::ToGodot;
use crate::obj::{EngineClass, Gd, GodotClass, Inherits, MemManual, RawGd};

engine_class! {
    /// Base class for all scene objects.
    ///
    /// Nodes are manually managed. A node added to a parent is owned by the parent and destroyed together with it;
    /// handles to children obtained from the engine are borrowed.
    pub struct Node: Object;
    memory = MemManual;
    methods = [
        set_name = 83702148,
        get_name = 2002593661,
        add_child = 3863233950,
        remove_child = 1078189570,
        get_child_count = 894402480,
        get_child = 541253412,
        get_parent = 3160264692,
        queue_free = 3218959716,
        set_process_mode = 1841290486,
        get_process_mode = 739966102,
    ];
}

engine_enum! {
    /// Controls when a node is processed, relative to the paused state of the scene tree.
    pub enum ProcessMode {
        /// Inherits the mode from the parent. Root nodes behave like `Pausable`.
        Inherit = 0,
        /// Stops processing while the tree is paused.
        Pausable = 1,
        /// Processes only while the tree is paused.
        WhenPaused = 2,
        /// Always processes.
        Always = 3,
        /// Never processes.
        Disabled = 4,
    }
}

impl Node {
    pub fn set_name(&self, name: &str) {
        let mut frame = self.frame();
        frame.arg(GString::from_str(self.binding(), name));
        self.ptrcall("set_name", frame)
    }

    pub fn get_name(&self) -> GString {
        self.ptrcall("get_name", self.frame())
    }

    /// Adds `child` as the last child of this node. The parent takes ownership, so the `Gd` is consumed; see
    /// [`Gd::into_engine()`].
    ///
    /// # Panics
    /// If `child` is not the owning `Gd` of its object, or this node was destroyed. The child is then dropped as usual,
    /// i.e. destroyed if `child` owned it.
    pub fn add_child<C>(&self, child: Gd<C>)
    where
        C: GodotClass<Memory = MemManual>,
        C::Wrapper: Inherits<Node>,
    {
        // The child stays with the caller if the call cannot go through.
        self.handle().check_callable(Self::CLASS, "add_child");

        let mut frame = self.frame();
        frame
            .arg(child.into_engine())
            .arg(false) // force_readable_name
            .arg(0i64); // internal: disabled
        self.ptrcall("add_child", frame)
    }

    /// Detaches `child` from this node. The child is not destroyed; it becomes an orphan that must be freed or
    /// attached again.
    pub fn remove_child<C>(&self, child: &Gd<C>)
    where
        C: GodotClass,
        C::Wrapper: Inherits<Node>,
    {
        let mut frame = self.frame();
        frame.arg(child.handle().obj_sys());
        self.ptrcall("remove_child", frame)
    }

    pub fn get_child_count(&self) -> i32 {
        let mut frame = self.frame();
        frame.arg(false); // include_internal
        self.ptrcall("get_child_count", frame)
    }

    /// Child at `index`, or `None` if out of bounds. Negative indices count from the end.
    ///
    /// The returned handle is borrowed: the parent keeps ownership.
    pub fn get_child(&self, index: i32) -> Option<Gd<Node>> {
        let mut frame = self.frame();
        frame.arg(index.to_godot()).arg(false);
        let ptr = self.ptrcall_object("get_child", frame);

        // SAFETY: the engine returns null or a Node.
        unsafe { RawGd::from_obj_sys_checked(self.binding(), ptr) }.map(Gd::from_raw)
    }

    /// All children, in order. Each handle is borrowed.
    pub fn get_children(&self) -> Vec<Gd<Node>> {
        (0..self.get_child_count())
            .filter_map(|index| self.get_child(index))
            .collect()
    }

    /// The parent node, or `None` if this node is not in a tree or is the root.
    pub fn get_parent(&self) -> Option<Gd<Node>> {
        let ptr = self.ptrcall_object("get_parent", self.frame());

        // SAFETY: the engine returns null or a Node.
        unsafe { RawGd::from_obj_sys_checked(self.binding(), ptr) }.map(Gd::from_raw)
    }

    /// Schedules the node for destruction at the end of the current frame, together with its children.
    pub fn queue_free(&self) {
        self.ptrcall("queue_free", self.frame())
    }

    pub fn set_process_mode(&self, mode: ProcessMode) {
        let mut frame = self.frame();
        frame.arg(mode.to_godot());
        self.ptrcall("set_process_mode", frame)
    }

    pub fn get_process_mode(&self) -> ProcessMode {
        self.ptrcall("get_process_mode", self.frame())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::FromGodot;

    #[test]
    fn process_mode_ordinals() {
        for &mode in ProcessMode::ALL {
            assert_eq!(ProcessMode::from_godot(mode.to_godot()), mode);
        }
        assert_eq!(ProcessMode::Disabled.ord(), 4);
    }

    #[test]
    fn unknown_process_mode_is_an_error() {
        let err = ProcessMode::try_from_godot(9).expect_err("9 is no process mode");
        assert_eq!(err.to_string(), "invalid ordinal for enum `ProcessMode`: 9");
    }
}
