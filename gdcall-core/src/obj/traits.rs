/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::meta::ClassName;
use crate::obj::bounds::{MemManual, MemRefCounted, Memory};
use crate::obj::{Base, Gd, ObjectHandle};
use crate::registry::VirtualTable;
use crate::sys;
use crate::sys::InitLevel;

/// Makes `T` eligible to be managed by the engine and stored in [`Gd<T>`][crate::obj::Gd] pointers.
///
/// Implemented by engine classes (generated) and by user classes.
pub trait GodotClass: 'static + Sized {
    /// Memory strategy of this class.
    type Memory: Memory;

    /// The engine class that represents instances of `Self` on the engine side.
    ///
    /// For engine classes this is `Self`. For user classes it is the engine class they extend; all methods of that
    /// class are available on `Gd<T>` through `Deref`.
    type Wrapper: EngineClass;

    /// The name of the class, under which it is registered in the engine.
    const CLASS_NAME: ClassName;

    /// Initialization level, during which this class should be registered with the engine.
    const INIT_LEVEL: InitLevel = InitLevel::Scene;

    fn class_name() -> ClassName {
        Self::CLASS_NAME
    }
}

/// Typed wrapper around an engine object, generated for each engine class.
///
/// A wrapper is a thin view over an [`ObjectHandle`]; it carries no ownership and has no destructor.
pub trait EngineClass: GodotClass<Wrapper = Self> {
    fn handle(&self) -> &ObjectHandle;

    /// # Safety
    /// `handle` must refer to an instance of this class or a subclass.
    #[doc(hidden)]
    unsafe fn from_handle(handle: ObjectHandle) -> Self;

    /// Binding of the engine this object lives in.
    fn binding(&self) -> &'static sys::Binding {
        self.handle().binding()
    }

    /// Fresh call frame on this object's binding.
    #[doc(hidden)]
    fn call_frame(&self) -> sys::CallFrame {
        sys::CallFrame::new(self.binding())
    }
}

/// Non-strict inheritance relationship in the engine class hierarchy.
///
/// `Derived: Inherits<Base>` means that either `Derived` is a subclass of `Base`, or the class `Base` itself (hence
/// "non-strict"). This trait enables up-casts without runtime checks.
///
/// # Safety
/// `as_base()` must return a view of the same object, and `Base` must really be an ancestor of `Self`.
pub unsafe trait Inherits<Base: EngineClass>: EngineClass {
    fn as_base(&self) -> &Base;
}

// SAFETY: every class trivially "inherits" itself.
unsafe impl<T: EngineClass> Inherits<T> for T {
    fn as_base(&self) -> &T {
        self
    }
}

/// Class declared in Rust that extends an engine class.
///
/// ```ignore
/// struct Player {
///     base: Base<Node3D>,
///     speed: f32,
/// }
///
/// impl GodotClass for Player {
///     type Memory = MemManual;
///     type Wrapper = Node3D;
///     const CLASS_NAME: ClassName = ClassName::new("Player\0");
/// }
///
/// impl UserClass for Player {
///     fn init(base: Base<Node3D>) -> Self {
///         Self { base, speed: 3.0 }
///     }
///
///     fn register_virtuals(table: &mut VirtualTable<Self>) {
///         table.on_process(|this, delta| this.walk(delta));
///     }
/// }
/// ```
pub trait UserClass: GodotClass {
    /// Constructs the Rust part of a new instance. Called by the engine whenever an instance is created.
    fn init(base: Base<Self::Wrapper>) -> Self;

    /// Declares which engine virtuals this class overrides.
    fn register_virtuals(_table: &mut VirtualTable<Self>) {}
}

/// Classes that can be instantiated through [`new_alloc()`][Self::new_alloc] and are manually managed.
pub trait NewAlloc: GodotClass<Memory = MemManual> {
    /// Instantiates a new object. The returned `Gd` owns it; it is destroyed on drop unless handed to the engine
    /// first (e.g. by adding it to a parent node).
    fn new_alloc(binding: &'static sys::Binding) -> Gd<Self>;
}

impl<T: GodotClass<Memory = MemManual>> NewAlloc for T {
    fn new_alloc(binding: &'static sys::Binding) -> Gd<Self> {
        Gd::construct(binding)
    }
}

/// Classes that can be instantiated through [`new_gd()`][Self::new_gd] and are reference-counted.
pub trait NewGd: GodotClass<Memory = MemRefCounted> {
    /// Instantiates a new object with a reference count of one, held by the returned `Gd`.
    fn new_gd(binding: &'static sys::Binding) -> Gd<Self>;
}

impl<T: GodotClass<Memory = MemRefCounted>> NewGd for T {
    fn new_gd(binding: &'static sys::Binding) -> Gd<Self> {
        Gd::construct(binding)
    }
}
