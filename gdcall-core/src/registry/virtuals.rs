/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use crate::sys;

/// Engine virtual methods that a user class can override.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum VirtualMethod {
    Ready,
    Process,
    PhysicsProcess,
    EnterTree,
    ExitTree,
    Notification,
}

impl VirtualMethod {
    pub const COUNT: usize = 6;

    pub const ALL: [Self; Self::COUNT] = [
        Self::Ready,
        Self::Process,
        Self::PhysicsProcess,
        Self::EnterTree,
        Self::ExitTree,
        Self::Notification,
    ];

    /// Name under which the engine looks the method up, e.g. `"_ready"`.
    pub fn name(self) -> &'static str {
        match self {
            Self::Ready => "_ready",
            Self::Process => "_process",
            Self::PhysicsProcess => "_physics_process",
            Self::EnterTree => "_enter_tree",
            Self::ExitTree => "_exit_tree",
            Self::Notification => "_notification",
        }
    }

    /// Maps an engine name to the method, or `None` for virtuals that are not supported.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|method| method.name() == name)
    }

    /// Whether the engine passes the frame delta (`f64`) as the only argument.
    pub fn takes_delta(self) -> bool {
        matches!(self, Self::Process | Self::PhysicsProcess)
    }

    /// Whether the engine passes the notification code (`i64`) as the only argument.
    pub fn takes_what(self) -> bool {
        matches!(self, Self::Notification)
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for VirtualMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Rust implementation of one virtual method.
pub enum VirtualFn<T> {
    /// No arguments: `_ready`, `_enter_tree`, `_exit_tree`.
    Unit(fn(&mut T)),

    /// Frame delta in seconds: `_process`, `_physics_process`.
    Delta(fn(&mut T, f64)),

    /// Notification code: `_notification`.
    Int(fn(&mut T, i64)),
}

impl<T> Clone for VirtualFn<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for VirtualFn<T> {}

impl<T> VirtualFn<T> {
    /// # Safety
    /// `args` must hold the arguments of the virtual this function was registered for.
    pub(crate) unsafe fn invoke(self, instance: &mut T, args: *const sys::GDExtensionConstTypePtr) {
        match self {
            Self::Unit(f) => f(instance),
            Self::Delta(f) => {
                let delta = *(args.read() as *const f64);
                f(instance, delta)
            }
            Self::Int(f) => {
                let what = *(args.read() as *const i64);
                f(instance, what)
            }
        }
    }
}

/// One overridden virtual; the engine receives a pointer to this as "call data".
pub struct VirtualEntry<T> {
    pub(crate) method: VirtualMethod,
    pub(crate) func: VirtualFn<T>,
}

impl<T> VirtualEntry<T> {
    pub fn method(&self) -> VirtualMethod {
        self.method
    }
}

/// Virtual methods overridden by the user class `T`, indexed by [`VirtualMethod`].
///
/// Filled once in [`UserClass::register_virtuals()`][crate::obj::UserClass::register_virtuals]. The engine resolves
/// each name once through `get_virtual_call_data` and calls the entry directly afterwards.
pub struct VirtualTable<T> {
    entries: [Option<VirtualEntry<T>>; VirtualMethod::COUNT],
}

impl<T> VirtualTable<T> {
    pub fn new() -> Self {
        Self {
            entries: [None, None, None, None, None, None],
        }
    }

    pub fn on_ready(&mut self, f: fn(&mut T)) -> &mut Self {
        self.set(VirtualMethod::Ready, VirtualFn::Unit(f))
    }

    pub fn on_process(&mut self, f: fn(&mut T, f64)) -> &mut Self {
        self.set(VirtualMethod::Process, VirtualFn::Delta(f))
    }

    pub fn on_physics_process(&mut self, f: fn(&mut T, f64)) -> &mut Self {
        self.set(VirtualMethod::PhysicsProcess, VirtualFn::Delta(f))
    }

    pub fn on_enter_tree(&mut self, f: fn(&mut T)) -> &mut Self {
        self.set(VirtualMethod::EnterTree, VirtualFn::Unit(f))
    }

    pub fn on_exit_tree(&mut self, f: fn(&mut T)) -> &mut Self {
        self.set(VirtualMethod::ExitTree, VirtualFn::Unit(f))
    }

    pub fn on_notification(&mut self, f: fn(&mut T, i64)) -> &mut Self {
        self.set(VirtualMethod::Notification, VirtualFn::Int(f))
    }

    fn set(&mut self, method: VirtualMethod, func: VirtualFn<T>) -> &mut Self {
        debug_assert_eq!(method.takes_delta(), matches!(func, VirtualFn::Delta(_)));
        debug_assert_eq!(method.takes_what(), matches!(func, VirtualFn::Int(_)));
        self.entries[method.index()] = Some(VirtualEntry { method, func });
        self
    }

    pub fn get(&self, method: VirtualMethod) -> Option<&VirtualEntry<T>> {
        self.entries[method.index()].as_ref()
    }

    /// Looks a virtual up by its engine name.
    pub fn lookup(&self, name: &str) -> Option<&VirtualEntry<T>> {
        VirtualMethod::from_name(name).and_then(|method| self.get(method))
    }

    pub fn is_overridden(&self, method: VirtualMethod) -> bool {
        self.get(method).is_some()
    }

    /// Overridden methods, in declaration order of [`VirtualMethod`].
    pub fn overridden(&self) -> impl Iterator<Item = VirtualMethod> + '_ {
        self.entries.iter().flatten().map(|entry| entry.method)
    }
}

impl<T> Default for VirtualTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Counter {
        ready: u32,
        elapsed: f64,
        last_notification: i64,
    }

    #[test]
    fn names_round_trip() {
        for method in VirtualMethod::ALL {
            assert_eq!(VirtualMethod::from_name(method.name()), Some(method));
        }
        assert_eq!(VirtualMethod::from_name("_input"), None);
        assert_eq!(VirtualMethod::from_name("ready"), None);
    }

    #[test]
    fn table_dispatch() {
        let mut table = VirtualTable::<Counter>::new();
        table
            .on_ready(|c| c.ready += 1)
            .on_process(|c, delta| c.elapsed += delta);

        assert!(table.is_overridden(VirtualMethod::Ready));
        assert!(table.lookup("_physics_process").is_none());
        assert_eq!(
            table.overridden().collect::<Vec<_>>(),
            vec![VirtualMethod::Ready, VirtualMethod::Process]
        );

        let mut counter = Counter::default();
        let delta = 0.5f64;
        let args = [&delta as *const f64 as sys::GDExtensionConstTypePtr];

        let process = table.lookup("_process").expect("registered");
        unsafe { process.func.invoke(&mut counter, args.as_ptr()) };
        let ready = table.lookup("_ready").expect("registered");
        unsafe { ready.func.invoke(&mut counter, std::ptr::null()) };

        assert_eq!(counter.ready, 1);
        assert_eq!(counter.elapsed, 0.5);
    }

    #[test]
    fn notification_receives_code() {
        let mut table = VirtualTable::<Counter>::new();
        table.on_notification(|c, what| c.last_notification = what);

        let mut counter = Counter::default();
        let what = 13i64; // NOTIFICATION_READY
        let args = [&what as *const i64 as sys::GDExtensionConstTypePtr];

        let entry = table.lookup("_notification").expect("registered");
        assert_eq!(entry.method(), VirtualMethod::Notification);
        unsafe { entry.func.invoke(&mut counter, args.as_ptr()) };

        assert_eq!(counter.last_notification, 13);
    }
}
