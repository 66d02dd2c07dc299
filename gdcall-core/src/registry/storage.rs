/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::any::type_name;
use std::cell;

use crate::obj::{ObjectHandle, UserClass};
use crate::{out, sys};

/// Manages storage and lifecycle of user's extension class instances.
///
/// Allocated when the engine creates an instance, and attached to the engine object both as its extension instance
/// and as its instance binding. Freed when the engine destroys the object.
pub(crate) struct InstanceStorage<T: UserClass> {
    user_instance: cell::RefCell<T>,
    base: ObjectHandle,
}

impl<T: UserClass> InstanceStorage<T> {
    pub fn construct(user_instance: T, base: ObjectHandle) -> Self {
        out!("    Storage::construct             <{}>", type_name::<T>());

        Self {
            user_instance: cell::RefCell::new(user_instance),
            base,
        }
    }

    pub fn is_bound(&self) -> bool {
        // Needs to borrow mutably, otherwise it succeeds if shared borrows are alive.
        self.user_instance.try_borrow_mut().is_err()
    }

    pub fn get(&self) -> cell::Ref<'_, T> {
        self.user_instance.try_borrow().unwrap_or_else(|_e| {
            panic!(
                "Gd<T>::bind() failed, already bound; T = {}.\n  \
                 Make sure there is no &mut T live at the time.\n  \
                 This often occurs when the engine calls back into Rust code while the instance is bound.",
                type_name::<T>()
            )
        })
    }

    pub fn get_mut(&self) -> cell::RefMut<'_, T> {
        self.user_instance.try_borrow_mut().unwrap_or_else(|_e| {
            panic!(
                "Gd<T>::bind_mut() failed, already bound; T = {}.\n  \
                 Make sure there is no &T or &mut T live at the time.\n  \
                 This often occurs when the engine calls back into Rust code while the instance is bound.",
                type_name::<T>()
            )
        })
    }

    pub fn base(&self) -> &ObjectHandle {
        &self.base
    }

    pub fn binding(&self) -> &'static sys::Binding {
        self.base.binding()
    }
}

impl<T: UserClass> Drop for InstanceStorage<T> {
    fn drop(&mut self) {
        out!("    Storage::drop (id={})          <{}>", self.base.instance_id(), type_name::<T>());
    }
}
