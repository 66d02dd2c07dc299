/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Scratch buffer that stages the arguments and the return value of one ptrcall.

use std::cell::Cell;
use std::ffi::c_void;
use std::marker::PhantomData;
use std::mem::{align_of, size_of, MaybeUninit};

use crate as sys;
use crate::{interface_fn, out, static_assert, Binding, ClassMethodBind, GodotFfi};

/// Maximum number of arguments a frame can stage.
pub const MAX_ARGS: usize = 16;

/// Bytes available to a value before it spills into engine memory.
pub const SLOT_SIZE: usize = 32;

/// Alignment of inline slots and of engine allocations.
pub const SLOT_ALIGN: usize = 16;

#[repr(C, align(16))]
#[derive(Copy, Clone)]
struct Slot([MaybeUninit<u8>; SLOT_SIZE]);

static_assert!(align_of::<Slot>() == SLOT_ALIGN);
static_assert!(size_of::<Slot>() == SLOT_SIZE);

impl Slot {
    const UNINIT: Self = Self([MaybeUninit::uninit(); SLOT_SIZE]);
}

#[derive(Copy, Clone, Debug)]
enum Storage {
    Inline,
    Spilled(*mut c_void),
}

/// Type-erased bookkeeping for one staged argument.
#[derive(Copy, Clone)]
struct Staged {
    storage: Storage,
    sys_const: unsafe fn(*const c_void) -> sys::GDExtensionConstTypePtr,
    drop_in_place: unsafe fn(*mut c_void),
}

unsafe fn erased_sys_const<T: GodotFfi>(value: *const c_void) -> sys::GDExtensionConstTypePtr {
    (*(value as *const T)).sys_const()
}

unsafe fn erased_drop<T>(value: *mut c_void) {
    std::ptr::drop_in_place(value as *mut T)
}

/// Arguments and return slot for a single foreign call.
///
/// Values are moved into the frame in declaration order and live in fixed-size inline slots; only values larger than
/// [`SLOT_SIZE`] are placed in memory obtained from the engine's `mem_alloc`. The frame is released exactly once, when it
/// is dropped: staged values are dropped, spilled memory is returned through `mem_free`. This also holds if the call
/// unwinds.
///
/// Addresses returned by [`address_of()`][Self::address_of] and [`return_address()`][Self::return_address] point into
/// the frame and must not be retained past the call.
pub struct CallFrame {
    binding: &'static Binding,
    slots: [Slot; MAX_ARGS],
    staged: [Option<Staged>; MAX_ARGS],
    args: [sys::GDExtensionConstTypePtr; MAX_ARGS],
    len: usize,
    ret_slot: Slot,
    ret: Option<(Storage, usize)>,
    _marker: PhantomData<*const u8>, // !Send, !Sync
}

impl CallFrame {
    /// Acquires an empty frame.
    pub fn new(binding: &'static Binding) -> Self {
        update_stats(|stats| stats.acquired += 1);

        Self {
            binding,
            slots: [Slot::UNINIT; MAX_ARGS],
            staged: [None; MAX_ARGS],
            args: [std::ptr::null(); MAX_ARGS],
            len: 0,
            ret_slot: Slot::UNINIT,
            ret: None,
            _marker: PhantomData,
        }
    }

    pub fn binding(&self) -> &'static Binding {
        self.binding
    }

    /// Number of staged arguments.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Appends one argument. The frame owns `value` until it is released.
    ///
    /// # Panics
    /// If the frame already holds [`MAX_ARGS`] arguments, or `T` is aligned to more than [`SLOT_ALIGN`].
    pub fn arg<T: GodotFfi>(&mut self, value: T) -> &mut Self {
        let index = self.len;
        assert!(index < MAX_ARGS, "call frame holds at most {MAX_ARGS} arguments");

        let storage = self.allocate(size_of::<T>(), align_of::<T>());
        let dst = Self::slot_ptr(&mut self.slots[index], storage) as *mut T;

        // SAFETY: dst is valid for size_of::<T>() bytes and aligned, see allocate().
        unsafe { dst.write(value) };

        self.staged[index] = Some(Staged {
            storage,
            sys_const: erased_sys_const::<T>,
            drop_in_place: erased_drop::<T>,
        });
        self.len += 1;
        self
    }

    /// Reserves the return slot for a value of type `R`. Zero-sized types (void calls) reserve nothing.
    ///
    /// # Panics
    /// If a return slot of a different size is already reserved.
    pub fn return_slot<R: GodotFfi>(&mut self) {
        let size = size_of::<R>();
        match self.ret {
            Some((_, reserved)) => {
                assert_eq!(reserved, size, "return slot already reserved with a different size")
            }
            None => {
                let storage = self.allocate(size, align_of::<R>());
                self.ret = Some((storage, size));
            }
        }
    }

    /// Address of the argument pointer array, as passed to `object_method_bind_ptrcall`.
    pub fn address_of(&mut self) -> *const sys::GDExtensionConstTypePtr {
        for index in 0..self.len {
            if let Some(staged) = self.staged[index] {
                let value = Self::slot_ptr(&mut self.slots[index], staged.storage);

                // SAFETY: the slot holds an initialized T matching the erased function.
                self.args[index] = unsafe { (staged.sys_const)(value) };
            }
        }

        self.args.as_ptr()
    }

    /// Address of the reserved return slot; null for void calls.
    ///
    /// # Panics
    /// If no return slot was reserved.
    pub fn return_address(&mut self) -> sys::GDExtensionTypePtr {
        match self.ret {
            None => panic!("return slot must be reserved before taking its address"),
            Some((_, 0)) => std::ptr::null_mut(),
            Some((storage, _)) => Self::slot_ptr(&mut self.ret_slot, storage),
        }
    }

    /// Moves the result out of the return slot.
    ///
    /// # Safety
    /// The engine must have written a valid `R` into the slot reserved by [`return_slot::<R>()`][Self::return_slot].
    /// Must be called at most once.
    pub unsafe fn take_return<R: GodotFfi>(&mut self) -> R {
        let ptr = self.return_address();
        R::from_sys(self.binding, ptr)
    }

    /// Performs the call: `bind` on `object`, with the staged arguments. Releases the frame afterwards.
    ///
    /// # Safety
    /// Argument count and types must match the signature of `bind`, and `R` must be its return type. `object` must be a
    /// live object of a class that declares `bind`.
    pub unsafe fn ptrcall<R: GodotFfi>(mut self, bind: ClassMethodBind, object: sys::GDExtensionObjectPtr) -> R {
        self.return_slot::<R>();
        let args = self.address_of();
        let ret = self.return_address();

        out!("  CallFrame::ptrcall  args={}  ret={}B", self.len, size_of::<R>());
        interface_fn!(self.binding, object_method_bind_ptrcall)(bind.as_ptr(), object, args, ret);

        self.take_return::<R>()
    }

    /// Releases the frame. Equivalent to dropping it.
    pub fn release(self) {}

    fn allocate(&self, size: usize, align: usize) -> Storage {
        assert!(
            align <= SLOT_ALIGN,
            "call frame values must not be aligned to more than {SLOT_ALIGN} bytes"
        );

        if size <= SLOT_SIZE {
            return Storage::Inline;
        }

        let ptr = unsafe { interface_fn!(self.binding, mem_alloc)(size) };
        assert!(!ptr.is_null(), "engine failed to allocate {size} bytes for a call frame");

        out!("  CallFrame::spill  {size}B");
        update_stats(|stats| stats.spilled += 1);
        Storage::Spilled(ptr)
    }

    fn slot_ptr(slot: &mut Slot, storage: Storage) -> *mut c_void {
        match storage {
            Storage::Inline => slot.0.as_mut_ptr() as *mut c_void,
            Storage::Spilled(ptr) => ptr,
        }
    }
}

impl Drop for CallFrame {
    fn drop(&mut self) {
        for index in 0..self.len {
            let Some(staged) = self.staged[index].take() else {
                continue;
            };

            let value = Self::slot_ptr(&mut self.slots[index], staged.storage);
            unsafe { (staged.drop_in_place)(value) };

            if let Storage::Spilled(ptr) = staged.storage {
                unsafe { interface_fn!(self.binding, mem_free)(ptr) };
            }
        }

        // The return value (if any) was moved out by take_return(); only its memory is released here.
        if let Some((Storage::Spilled(ptr), _)) = self.ret.take() {
            unsafe { interface_fn!(self.binding, mem_free)(ptr) };
        }

        update_stats(|stats| stats.released += 1);
    }
}

impl std::fmt::Debug for CallFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallFrame")
            .field("len", &self.len)
            .field("ret", &self.ret)
            .finish()
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Statistics

/// Per-thread counters of frame lifecycle events.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub struct FrameStats {
    pub acquired: u64,
    pub released: u64,
    pub spilled: u64,
}

impl FrameStats {
    const ZERO: Self = Self {
        acquired: 0,
        released: 0,
        spilled: 0,
    };

    /// Frames acquired but not yet released.
    pub fn live(&self) -> u64 {
        self.acquired - self.released
    }

    /// Counter increase from `earlier` to `self`.
    pub fn since(&self, earlier: FrameStats) -> FrameStats {
        FrameStats {
            acquired: self.acquired - earlier.acquired,
            released: self.released - earlier.released,
            spilled: self.spilled - earlier.spilled,
        }
    }
}

thread_local! {
    static FRAME_STATS: Cell<FrameStats> = const { Cell::new(FrameStats::ZERO) };
}

fn update_stats(f: impl FnOnce(&mut FrameStats)) {
    FRAME_STATS.with(|cell| {
        let mut stats = cell.get();
        f(&mut stats);
        cell.set(stats);
    });
}

/// Frame counters of the current thread.
pub fn frame_stats() -> FrameStats {
    FRAME_STATS.with(Cell::get)
}
