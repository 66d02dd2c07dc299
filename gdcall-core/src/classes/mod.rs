/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Maps the engine class API to Rust.
//!
//! Each engine class is a thin wrapper around an [`ObjectHandle`][crate::obj::ObjectHandle]. Wrappers nest: a
//! `Node3D` contains a `Node`, which contains an `Object`. Methods of ancestors are reached through `Deref`, and
//! [`Inherits`][crate::obj::Inherits] relates each class to all of its ancestors.
//!
//! Every class lists the engine methods it calls, together with their hashes. These declarations are resolved to
//! method binds once, when the library is loaded; see [`method_decls()`].

#[macro_use]
mod macros;

mod node;
mod node3d;
mod object;
mod ref_counted;
mod resource;

pub use node::{Node, ProcessMode};
pub use node3d::Node3D;
pub use object::Object;
pub use ref_counted::RefCounted;
pub use resource::Resource;

use crate::meta::{ClassName, MethodDecl};

/// Static description of one engine class known to this crate.
#[derive(Copy, Clone, Debug)]
pub struct EngineClassInfo {
    pub name: ClassName,

    /// Direct superclass; `None` for `Object`.
    pub parent: Option<ClassName>,

    /// Methods this crate calls on the class.
    pub methods: &'static [MethodDecl],
}

/// All engine classes, parents before children.
pub fn engine_classes() -> [EngineClassInfo; 5] {
    [
        Object::INFO,
        RefCounted::INFO,
        Resource::INFO,
        Node::INFO,
        Node3D::INFO,
    ]
}

/// Method declarations of all engine classes, in class order.
pub fn method_decls() -> Vec<MethodDecl> {
    engine_classes()
        .iter()
        .flat_map(|class| class.methods.iter().copied())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn parents_precede_children() {
        let mut seen = HashSet::new();
        for class in engine_classes() {
            if let Some(parent) = class.parent {
                assert!(seen.contains(parent.as_str()), "{} listed before its parent {parent}", class.name);
            }
            seen.insert(class.name.as_str());
        }
    }

    #[test]
    fn method_names_are_unique_per_class() {
        for class in engine_classes() {
            let names: HashSet<_> = class.methods.iter().map(|decl| decl.method_name()).collect();
            assert_eq!(names.len(), class.methods.len(), "duplicate method in {}", class.name);
            assert!(class.methods.iter().all(|decl| decl.class == class.name));
        }
    }

    #[test]
    fn declarations_cover_all_classes() {
        let decls = method_decls();
        let total: usize = engine_classes().iter().map(|class| class.methods.len()).sum();

        assert_eq!(decls.len(), total);
        assert!(decls.iter().any(|decl| decl.class.as_str() == "Node" && decl.method_name() == "get_name"));
    }
}
