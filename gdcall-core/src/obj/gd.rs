/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt::{Debug, Display, Formatter, Result as FmtResult};
use std::ops::Deref;

use crate::obj::bounds::{MemManual, Memory, PossiblyManual};
use crate::obj::raw_gd::{Ownership, RawGd};
use crate::obj::{EngineClass, GdMut, GdRef, GodotClass, Inherits, InstanceId, ObjectHandle, UserClass};
use crate::registry::InstanceStorage;
use crate::sys::{interface_fn, GodotFfi};
use crate::{out, sys};

/// Smart pointer to objects owned by the engine.
///
/// `Gd<T>` dereferences to the class wrapper `T::Wrapper`, so all engine methods of the class and its ancestors can be
/// called directly on it. What happens when the pointer is cloned or dropped depends on the class's
/// [`Memory`][crate::obj::bounds::Memory] strategy and on its [`Ownership`]:
///
/// * Ref-counted objects are released when the last `Gd` holding a reference goes out of scope.
/// * Manually managed objects are destroyed on drop only if this `Gd` owns them (it created them, and did not hand
///   them to the engine). Handles obtained from the engine, e.g. through `Node::get_child()`, are borrowed.
///
/// Calling a method through a `Gd` whose object was destroyed panics, unless checks are disabled through
/// [`Safeguards::Disengaged`][crate::sys::Safeguards::Disengaged].
pub struct Gd<T: GodotClass> {
    raw: RawGd<T>,
}

impl<T: GodotClass> Gd<T> {
    pub(crate) fn from_raw(raw: RawGd<T>) -> Self {
        Self { raw }
    }

    /// Constructs a new instance through the engine's class database and takes ownership of it.
    pub(crate) fn construct(binding: &'static sys::Binding) -> Self {
        let class = T::CLASS_NAME;
        let ptr = unsafe { interface_fn!(binding, classdb_construct_object)(class.as_sys()) };

        // SAFETY: the engine constructed an instance of exactly this class.
        let raw = unsafe { RawGd::<T>::from_obj_sys_transferred(binding, ptr) }
            .unwrap_or_else(|| panic!("engine failed to construct an instance of {class}"));

        T::Memory::maybe_init_ref(raw.handle());
        out!("Gd::construct <{class}>  id={}", raw.handle().instance_id());
        Self::from_raw(raw)
    }

    /// ⚠️ Looks up an object by its instance ID, returning a borrowed (manual) or sharing (ref-counted) handle.
    ///
    /// # Panics
    /// If no such object exists, or it is not of class `T`.
    pub fn from_instance_id(binding: &'static sys::Binding, instance_id: InstanceId) -> Self {
        Self::try_from_instance_id(binding, instance_id).unwrap_or_else(|| {
            panic!(
                "Instance ID {instance_id} does not belong to a valid object of class '{}'",
                T::CLASS_NAME
            )
        })
    }

    /// Looks up an object by its instance ID.
    ///
    /// Returns `None` if the object no longer exists, or is not of class `T`.
    pub fn try_from_instance_id(binding: &'static sys::Binding, instance_id: InstanceId) -> Option<Self> {
        let ptr = unsafe { interface_fn!(binding, object_get_instance_from_id)(instance_id.to_u64()) };

        // Validate class before taking a reference.
        let weak = unsafe { RawGd::<crate::classes::Object>::from_obj_sys_weak(binding, ptr) }?;
        if !weak.handle().is_of_class(T::CLASS_NAME) {
            return None;
        }

        // SAFETY: object is alive and of class T.
        unsafe { RawGd::<T>::from_obj_sys(binding, ptr) }.map(Self::from_raw)
    }

    /// ⚠️ Returns the instance ID of this object.
    ///
    /// The ID is cached and remains available even if the object is destroyed.
    pub fn instance_id(&self) -> InstanceId {
        self.raw.handle().instance_id()
    }

    /// Checks if this smart pointer points to a live object (read description!).
    ///
    /// Using this method is often indicative of bad design -- you should dispose of your pointers once an object is
    /// destroyed. However, this method exists because it may be needed for objects destroyed by the engine.
    pub fn is_instance_valid(&self) -> bool {
        self.raw.handle().is_instance_valid()
    }

    pub fn ownership(&self) -> Ownership {
        self.raw.ownership()
    }

    pub fn binding(&self) -> &'static sys::Binding {
        self.raw.handle().binding()
    }

    pub fn handle(&self) -> &ObjectHandle {
        self.raw.handle()
    }

    /// **Upcast:** convert into a smart pointer to a base class. Always succeeds.
    ///
    /// The object pointer and instance ID are unchanged; no engine call is made.
    pub fn upcast<Base>(self) -> Gd<Base>
    where
        Base: EngineClass,
        T::Wrapper: Inherits<Base>,
    {
        // SAFETY: T inherits Base.
        Gd::from_raw(unsafe { self.raw.cast_unchecked::<Base>() })
    }

    /// **Upcast shared-ref:** access this object as a shared reference to a base class.
    ///
    /// Unlike [`upcast()`][Self::upcast], this does not consume the pointer, and the result cannot outlive it.
    pub fn upcast_ref<Base>(&self) -> &Base
    where
        Base: EngineClass,
        T::Wrapper: Inherits<Base>,
    {
        self.raw.wrapper().as_base()
    }

    /// **Downcast:** try to convert into a smart pointer to a derived class.
    ///
    /// If `T`'s dynamic type is not `Derived` or one of its subclasses, `Err(self)` is returned, meaning you can reuse
    /// the original object for further casts.
    pub fn try_cast<Derived>(self) -> Result<Gd<Derived>, Self>
    where
        Derived: GodotClass,
    {
        if self.raw.handle().is_of_class(Derived::CLASS_NAME) {
            // SAFETY: the engine confirmed the dynamic class.
            Ok(Gd::from_raw(unsafe { self.raw.cast_unchecked::<Derived>() }))
        } else {
            Err(self)
        }
    }

    /// ⚠️ **Downcast:** convert into a smart pointer to a derived class. Panics on error.
    ///
    /// # Panics
    /// If the class' dynamic type is not `Derived` or one of its subclasses. Use [`Self::try_cast()`] if you want to check the result.
    pub fn cast<Derived>(self) -> Gd<Derived>
    where
        Derived: GodotClass,
    {
        self.try_cast().unwrap_or_else(|from_obj| {
            panic!(
                "downcast from {from} to {to} failed; instance {from_obj:?}",
                from = T::CLASS_NAME,
                to = Derived::CLASS_NAME,
            )
        })
    }
}

impl<T: GodotClass<Memory = MemManual>> Gd<T> {
    /// Transfers ownership of the object to the engine, e.g. as the `node` argument of `add_child()`.
    ///
    /// The `Gd` is consumed, so the object can no longer be accessed through it:
    ///
    /// ```compile_fail
    /// # use gdcall_core::classes::Node;
    /// # use gdcall_core::obj::{Gd, NewAlloc};
    /// # fn demo(parent: &Gd<Node>, child: Gd<Node>) {
    /// parent.add_child(child);
    /// child.get_name(); // error: borrow of moved value
    /// # }
    /// ```
    ///
    /// Look the object up again through the engine, e.g. [`get_child()`][crate::classes::Node::get_child], to obtain a
    /// new (borrowed) handle.
    ///
    /// # Panics
    /// If this `Gd` does not own the object, e.g. a clone obtained from the owning `Gd` or a handle returned by
    /// `get_child()`. Also if the object was already destroyed.
    pub fn into_engine(self) -> Transferred {
        assert!(
            self.ownership() == Ownership::Owned,
            "Gd::into_engine(): {self} is not owned by this handle ({:?}); only the owning Gd can hand it to the engine",
            self.ownership()
        );
        self.raw.handle().assert_valid_instance("Gd::into_engine()");

        let (handle, _ownership) = self.raw.into_parts();
        out!("Gd::into_engine  <{}>", handle.instance_id());
        Transferred { ptr: handle.obj_sys() }
    }
}

/// _The methods in this impl block are only available for objects `T` that may be manually managed, i.e. anything
/// that is not `RefCounted` or inherited from it._
impl<T, M> Gd<T>
where
    T: GodotClass<Memory = M>,
    M: PossiblyManual + Memory,
{
    /// ⚠️ Destroys the manually-managed engine object.
    ///
    /// # Panics
    /// If the object was already destroyed, or if this is a `Gd<Object>` pointing to a ref-counted instance.
    pub fn free(self) {
        assert!(
            !M::is_ref_counted(self.raw.handle()),
            "called free() on {self}, which is ref-counted; free() only supports manually managed objects"
        );

        let (handle, _ownership) = self.raw.into_parts();
        handle.assert_valid_instance("Gd::free()");

        // SAFETY: alive, and the only handle that could destroy it is consumed.
        unsafe { handle.destroy() };
    }
}

impl<T: UserClass> Gd<T> {
    /// Hands out a guard for a shared borrow, through which the user instance can be read.
    ///
    /// # Panics
    /// If there is a mutable borrow of the same instance, or the object is destroyed.
    pub fn bind(&self) -> GdRef<'_, T> {
        GdRef::from_guard(self.storage().get())
    }

    /// Hands out a guard for an exclusive borrow, through which the user instance can be read and written.
    ///
    /// # Panics
    /// If there is any other borrow of the same instance, or the object is destroyed.
    pub fn bind_mut(&mut self) -> GdMut<'_, T> {
        GdMut::from_guard(self.storage().get_mut())
    }

    fn storage(&self) -> &InstanceStorage<T> {
        let handle = self.raw.handle();
        handle.assert_valid_instance(format_args!("Gd<{}>::bind()", T::CLASS_NAME));

        let binding = handle.binding();
        let ptr = unsafe { interface_fn!(binding, object_get_instance_binding)(handle.obj_sys(), binding.library()) };
        assert!(
            !ptr.is_null(),
            "object {} is not an instance of the user class {}",
            handle.instance_id(),
            T::CLASS_NAME
        );

        // SAFETY: the instance binding of a user class object is its InstanceStorage<T>, which lives until the engine
        // frees the object; the returned reference is bounded by &self.
        unsafe { &*(ptr as *const InstanceStorage<T>) }
    }
}

impl<T: GodotClass> Deref for Gd<T> {
    type Target = T::Wrapper;

    fn deref(&self) -> &Self::Target {
        self.raw.wrapper()
    }
}

impl<T: GodotClass> Clone for Gd<T> {
    /// Second pointer to the same object. Ref-counted objects gain a reference; manually managed objects are
    /// borrowed, so only the original can destroy them.
    fn clone(&self) -> Self {
        Self::from_raw(self.raw.clone_handle())
    }
}

impl<T: GodotClass> PartialEq for Gd<T> {
    /// Returns whether two `Gd` pointers point to the same object.
    fn eq(&self, other: &Self) -> bool {
        self.instance_id() == other.instance_id()
    }
}

impl<T: GodotClass> Eq for Gd<T> {}

impl<T: GodotClass> Display for Gd<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "<{}#{}>", T::CLASS_NAME, self.instance_id())
    }
}

impl<T: GodotClass> Debug for Gd<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Gd")
            .field("class", &T::CLASS_NAME)
            .field("id", &self.instance_id())
            .field("ownership", &self.ownership())
            .finish()
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------

/// Object pointer whose ownership moved to the engine. Staged as a call argument, see [`Gd::into_engine()`].
#[repr(C)]
#[derive(Debug)]
pub struct Transferred {
    ptr: sys::GDExtensionObjectPtr,
}

// SAFETY: the ABI passes a pointer to the object pointer, which is the only field.
unsafe impl GodotFfi for Transferred {
    unsafe fn from_sys(_binding: &'static sys::Binding, ptr: sys::GDExtensionTypePtr) -> Self {
        Self {
            ptr: std::ptr::read(ptr as *const sys::GDExtensionObjectPtr),
        }
    }

    fn sys(&self) -> sys::GDExtensionTypePtr {
        &self.ptr as *const sys::GDExtensionObjectPtr as sys::GDExtensionTypePtr
    }

    unsafe fn move_return_ptr(self, dst: sys::GDExtensionTypePtr) {
        std::ptr::write(dst as *mut sys::GDExtensionObjectPtr, self.ptr)
    }
}
