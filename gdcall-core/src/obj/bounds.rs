/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Different ways how bounds of a `GodotClass` can be checked.
//!
//! Each class declares its [`Memory`] strategy as an associated type. The strategy decides what happens when a
//! [`Gd`][crate::obj::Gd] pointing to an instance is created, cloned or dropped.
//!
//! | Memory            | Classes                         | On clone       | On drop                                  |
//! |-------------------|---------------------------------|----------------|------------------------------------------|
//! | [`MemRefCounted`] | `RefCounted` and subclasses     | `reference()`  | `unreference()`, destroy at zero         |
//! | [`MemManual`]     | `Node` and other manual classes | borrowed copy  | destroy only if the handle owns it       |
//! | [`MemDynamic`]    | `Object`                        | per instance   | per instance, from the ref-counted ID bit |

use crate::classes::RefCounted;
use crate::obj::{EngineClass, ObjectHandle};
use crate::out;

pub(super) mod private {
    pub trait Sealed {}
}

use private::Sealed;

/// Specifies the memory strategy of a class.
pub trait Memory: Sealed {
    /// Initialize reference counter of a freshly constructed object.
    #[doc(hidden)]
    fn maybe_init_ref(handle: &ObjectHandle);

    /// If ref-counted, then increment count.
    #[doc(hidden)]
    fn maybe_inc_ref(handle: &ObjectHandle);

    /// If ref-counted, then decrement count. Returns `true` if the count hit 0 and the object can be
    /// safely destroyed.
    #[doc(hidden)]
    fn maybe_dec_ref(handle: &ObjectHandle) -> bool;

    /// Whether the instance behind `handle` is reference-counted.
    #[doc(hidden)]
    fn is_ref_counted(handle: &ObjectHandle) -> bool;
}

fn as_ref_counted<R>(handle: &ObjectHandle, apply: impl FnOnce(&RefCounted) -> R) -> R {
    // SAFETY: only reached for instances whose ID carries the ref-counted bit, or whose static class is ref-counted.
    let refc = unsafe { RefCounted::from_handle(*handle) };
    apply(&refc)
}

/// Memory managed through the engine's reference counter (always present).
/// This is used for `RefCounted` classes and derived.
pub struct MemRefCounted {}
impl Sealed for MemRefCounted {}
impl Memory for MemRefCounted {
    fn maybe_init_ref(handle: &ObjectHandle) {
        out!("  Stat::init  <{}>", handle.instance_id());
        as_ref_counted(handle, |refc| {
            let success = refc.init_ref();
            assert!(success, "init_ref() failed");
        });
    }

    fn maybe_inc_ref(handle: &ObjectHandle) {
        out!("  Stat::inc   <{}>", handle.instance_id());
        as_ref_counted(handle, |refc| {
            let success = refc.reference();
            assert!(success, "reference() failed");
        });
    }

    fn maybe_dec_ref(handle: &ObjectHandle) -> bool {
        out!("  Stat::dec   <{}>", handle.instance_id());
        as_ref_counted(handle, |refc| {
            let is_last = refc.unreference();
            out!("  +-- was last={is_last}");
            is_last
        })
    }

    fn is_ref_counted(_handle: &ObjectHandle) -> bool {
        true
    }
}

/// Memory managed through the engine's reference counter, if present; otherwise manual.
/// This is used only for `Object` itself.
pub struct MemDynamic {}
impl Sealed for MemDynamic {}
impl Memory for MemDynamic {
    fn maybe_init_ref(handle: &ObjectHandle) {
        if Self::is_ref_counted(handle) {
            MemRefCounted::maybe_init_ref(handle)
        }
    }

    fn maybe_inc_ref(handle: &ObjectHandle) {
        if Self::is_ref_counted(handle) {
            MemRefCounted::maybe_inc_ref(handle)
        }
    }

    fn maybe_dec_ref(handle: &ObjectHandle) -> bool {
        if Self::is_ref_counted(handle) {
            MemRefCounted::maybe_dec_ref(handle)
        } else {
            false
        }
    }

    fn is_ref_counted(handle: &ObjectHandle) -> bool {
        handle.instance_id().is_ref_counted()
    }
}

/// No memory management, user responsible for not leaking.
/// This is used for all `Object` derivates which are not `RefCounted`. `Object` itself is also excluded.
pub struct MemManual {}
impl Sealed for MemManual {}
impl Memory for MemManual {
    fn maybe_init_ref(_handle: &ObjectHandle) {}
    fn maybe_inc_ref(_handle: &ObjectHandle) {}
    fn maybe_dec_ref(_handle: &ObjectHandle) -> bool {
        false
    }
    fn is_ref_counted(_handle: &ObjectHandle) -> bool {
        false
    }
}

/// Memory strategies under which an instance may be manually managed: [`MemManual`] always, [`MemDynamic`] depending
/// on the instance.
pub trait PossiblyManual: Sealed {}
impl PossiblyManual for MemManual {}
impl PossiblyManual for MemDynamic {}
