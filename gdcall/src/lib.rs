/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! The **gdcall** library implements typed Rust bindings over GDExtension, the C ABI of [Godot 4](https://godotengine.org).
//!
//! Every engine call goes through three layers:
//!
//! 1. A **method-bind table**, resolved once when the library is loaded. Each engine class declares the methods it
//!    calls; a method that the running engine does not provide makes loading fail with
//!    [`InitError::MissingMethodBind`][crate::init::InitError::MissingMethodBind] instead of crashing later.
//! 2. A **call frame** ([`CallFrame`][crate::sys::CallFrame]), which stages arguments and the return slot of one
//!    ptrcall and releases them exactly once, also when the call panics.
//! 3. **Typed wrappers** such as [`Node`][crate::classes::Node], reached through [`Gd<T>`][crate::obj::Gd], which
//!    knows whether it owns, shares or merely borrows the object it points to.
//!
//! There is no global state: all of this hangs off a [`Binding`][crate::sys::Binding] that is created when the engine
//! loads the library, and that every object handle carries.
//!
//! # Type categories
//!
//! 1. **Value types**: `i64`, `f64`, and mathematical types like [`Vector3`][crate::builtin::Vector3] and
//!    [`Transform3D`][crate::builtin::Transform3D].
//!
//!    They implement `Copy` and have the same memory layout as their engine counterparts. <br><br>
//!
//! 2. **Engine-owned values**: [`GString`][crate::builtin::GString].
//!
//!    Cloning copies the string through the engine; dropping releases it. <br><br>
//!
//! 3. **Reference-counted objects**: [`Gd<T>`][crate::obj::Gd] where `T` inherits from
//!    [`RefCounted`][crate::classes::RefCounted].
//!
//!    Each `Gd` holds one reference; the object is destroyed when the last one is dropped. <br><br>
//!
//! 4. **Manually managed objects**: [`Gd<T>`][crate::obj::Gd] where `T` inherits from
//!    [`Object`][crate::classes::Object] but not from [`RefCounted`][crate::classes::RefCounted], most notably nodes.
//!
//!    A `Gd` created with `new_alloc()` owns its object and destroys it on drop, unless ownership is handed to the
//!    engine first, e.g. through [`Node::add_child()`][crate::classes::Node::add_child]. Handles returned by the engine
//!    are borrowed and never destroy anything. <br><br>
//!
//! # Ergonomics and panics
//!
//! Methods whose failure usually indicates a bug panic with a descriptive message instead of returning `Result`.
//! Where a check at runtime makes sense, a fallible overload exists, e.g. [`Gd::try_cast()`][crate::obj::Gd::try_cast].
//! Such panicking methods are marked with "⚠️" at the beginning of their documentation.
//!
//! Calling a method on an object that the engine already destroyed panics. How much is validated before each call is
//! configured with [`Safeguards`][crate::init::Safeguards].
//!
//! # Cargo features
//!
//! All features are off by default.
//!
//! * **`serde`**
//!
//!   Implement the [serde](https://docs.rs/serde) traits `Serialize` and `Deserialize` for the math types.
//!   <br><br>
//!
//! * **`debug-checks-*`**
//!
//!   Select the default [`Safeguards`][crate::init::Safeguards] level: `fast-unsafe`, `balanced` or `paranoid`.
//!   Without one of them, debug builds check that receivers are alive and release builds do not.
//!
//! # Public API
//!
//! Symbols annotated with `#[doc(hidden)]`, the dependency crates, and modules named `private` are not part of the
//! public API. There are **no guarantees** regarding their stability.

#[doc(inline)]
pub use gdcall_core::{builtin, classes, log, meta, obj, registry};

#[doc(hidden)]
pub use gdcall_core::sys;

#[doc(hidden)]
pub use gdcall_core::private;

/// Entry point and initialization of the library.
pub mod init {
    pub use gdcall_core::init::*;
}

pub use gdcall_core::gdextension;

pub mod prelude;
