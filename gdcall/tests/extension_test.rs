/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Loading an extension library with user classes, and virtual dispatch into them.

mod common;

use std::cell::{Cell, RefCell};

use gdcall::init::BindingConfig;
use gdcall::obj::Ownership;
use gdcall::prelude::*;
use gdcall::sys;
use gdcall_mock::MockEngine;

use common::{assert_no_engine_errors, checked_config};

const NOTIFICATION_PAUSED: i64 = 14;

thread_local! {
    static BINDING: Cell<Option<&'static sys::Binding>> = const { Cell::new(None) };
    static LEVEL_EVENTS: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
}

fn loaded_binding() -> &'static sys::Binding {
    BINDING
        .with(Cell::get)
        .unwrap_or_else(|| panic!("extension must be loaded first"))
}

fn level_events() -> Vec<String> {
    LEVEL_EVENTS.with(|events| events.borrow().clone())
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// User classes

struct Spinner {
    base: Base<Node3D>,
    speed: f32,
    entered: u32,
    ready: u32,
    exited: u32,
    elapsed: f64,
    last_notification: i64,
}

impl GodotClass for Spinner {
    type Memory = MemManual;
    type Wrapper = Node3D;
    const CLASS_NAME: ClassName = ClassName::new("Spinner\0");
}

impl UserClass for Spinner {
    fn init(base: Base<Node3D>) -> Self {
        Self {
            base,
            speed: 2.0,
            entered: 0,
            ready: 0,
            exited: 0,
            elapsed: 0.0,
            last_notification: 0,
        }
    }

    fn register_virtuals(table: &mut VirtualTable<Self>) {
        table
            .on_enter_tree(|this| this.entered += 1)
            .on_ready(|this| this.ready += 1)
            .on_exit_tree(|this| this.exited += 1)
            .on_process(Self::spin)
            .on_notification(|this, what| this.last_notification = what);
    }
}

impl Spinner {
    fn spin(&mut self, delta: f64) {
        self.elapsed += delta;
        self.base.rotate(Vector3::UP, self.speed * delta as f32);
    }
}

struct Fragile {
    base: Base<Node>,
}

impl GodotClass for Fragile {
    type Memory = MemManual;
    type Wrapper = Node;
    const CLASS_NAME: ClassName = ClassName::new("Fragile\0");
}

impl UserClass for Fragile {
    fn init(base: Base<Node>) -> Self {
        Self { base }
    }

    fn register_virtuals(table: &mut VirtualTable<Self>) {
        table.on_ready(|this| panic!("not ready: {}", this.base.instance_id()));
    }
}

/// User class whose name collides with an engine class.
struct Impostor {
    _base: Base<Node>,
}

impl GodotClass for Impostor {
    type Memory = MemManual;
    type Wrapper = Node;
    const CLASS_NAME: ClassName = ClassName::new("Resource\0");
}

impl UserClass for Impostor {
    fn init(base: Base<Node>) -> Self {
        Self { _base: base }
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Libraries

struct GameLibrary;

unsafe impl ExtensionLibrary for GameLibrary {
    fn min_level() -> InitLevel {
        InitLevel::Servers
    }

    fn config() -> BindingConfig {
        checked_config()
    }

    fn register_classes(registry: &mut ClassRegistry) {
        registry.register::<Spinner>().register::<Fragile>();
    }

    fn on_level_init(ctx: &InitContext) {
        BINDING.with(|binding| binding.set(Some(ctx.binding())));
        LEVEL_EVENTS.with(|events| events.borrow_mut().push(format!("init {:?}", ctx.level())));
    }

    fn on_level_deinit(ctx: &InitContext) {
        LEVEL_EVENTS.with(|events| events.borrow_mut().push(format!("deinit {:?}", ctx.level())));
    }
}

gdextension!(GameLibrary, game_init);

struct DuplicateLibrary;

unsafe impl ExtensionLibrary for DuplicateLibrary {
    fn register_classes(registry: &mut ClassRegistry) {
        registry.register::<Spinner>().register::<Spinner>();
    }
}

gdextension!(DuplicateLibrary, duplicate_init);

struct ClashingLibrary;

unsafe impl ExtensionLibrary for ClashingLibrary {
    fn register_classes(registry: &mut ClassRegistry) {
        registry.register::<Impostor>().register::<Spinner>();
    }
}

gdextension!(ClashingLibrary, clashing_init);

/// Loads [`GameLibrary`] and returns a root node to attach instances to.
fn load_game(engine: &mut MockEngine) -> Gd<Node> {
    assert!(engine.load_extension(game_init));
    Node::new_alloc(loaded_binding())
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Tests

#[test]
fn classes_follow_library_lifecycle() {
    let mut engine = MockEngine::new();
    assert!(engine.load_extension(game_init));

    assert!(engine.has_class("Spinner"));
    assert!(engine.has_class("Fragile"));
    assert_eq!(level_events(), ["init Servers", "init Scene"]);

    engine.unload_extension();

    assert!(!engine.has_class("Spinner"));
    assert!(!engine.has_class("Fragile"));
    assert_eq!(
        level_events(),
        ["init Servers", "init Scene", "deinit Scene", "deinit Servers"]
    );
    assert_no_engine_errors(&engine);
}

#[test]
fn instance_created_through_engine() {
    let mut engine = MockEngine::new();
    let root = load_game(&mut engine);

    let spinner = Spinner::new_alloc(loaded_binding());
    assert_eq!(spinner.ownership(), Ownership::Owned);
    assert_eq!(spinner.get_class(), "Spinner");
    assert!(spinner.is_class("Node3D"));
    assert_eq!(spinner.bind().speed, 2.0);
    assert_eq!(spinner.bind().ready, 0);

    let ptr = spinner.handle().obj_sys();
    assert_eq!(engine.class_of(ptr).as_deref(), Some("Spinner"));

    drop(spinner);
    assert!(!engine.is_alive(ptr));

    root.free();
    engine.unload_extension();
    assert_no_engine_errors(&engine);
}

#[test]
fn tree_virtuals_are_dispatched() {
    let mut engine = MockEngine::new();
    let root = load_game(&mut engine);

    let spinner = Spinner::new_alloc(loaded_binding());
    let observer = spinner.clone();
    root.add_child(spinner);

    assert_eq!(observer.bind().entered, 1);
    assert_eq!(observer.bind().ready, 1);
    assert_eq!(observer.bind().exited, 0);

    root.remove_child(&observer);
    assert_eq!(observer.bind().exited, 1);

    observer.free();
    root.free();
    assert_no_engine_errors(&engine);
}

#[test]
fn process_calls_into_user_code() {
    let mut engine = MockEngine::new();
    let root = load_game(&mut engine);

    let spinner = Spinner::new_alloc(loaded_binding());
    let mut observer = spinner.clone();
    root.add_child(spinner);

    engine.process_frame(0.25);
    engine.process_frame(0.25);

    assert_eq!(observer.bind().elapsed, 0.5);
    let expected = Basis::from_axis_angle(Vector3::UP, 1.0);
    assert!(observer.get_transform().basis.is_equal_approx(&expected));

    observer.bind_mut().speed = 0.0;
    observer.set_process_mode(ProcessMode::Disabled);
    engine.process_frame(1.0);
    assert_eq!(observer.bind().elapsed, 0.5);

    root.free();
    assert!(!observer.is_instance_valid());
    assert_no_engine_errors(&engine);
}

#[test]
fn virtual_names_are_resolved_once() {
    let mut engine = MockEngine::new();
    let root = load_game(&mut engine);

    let spinner = Spinner::new_alloc(loaded_binding());
    let observer = spinner.clone();
    root.add_child(spinner);
    let after_add = engine.stats();
    assert_eq!(after_add.virtual_lookups, 2, "_enter_tree, _ready");

    for _ in 0..5 {
        engine.process_frame(0.1);
        engine.physics_frame(0.1);
    }

    let stats = engine.stats();
    assert_eq!(stats.virtual_lookups, 4, "one lookup each for _process and _physics_process");
    assert_eq!(stats.virtual_calls - after_add.virtual_calls, 5, "_physics_process is not overridden");

    engine.notify(observer.handle().obj_sys(), NOTIFICATION_PAUSED);
    engine.notify(observer.handle().obj_sys(), NOTIFICATION_PAUSED + 1);
    assert_eq!(observer.bind().last_notification, NOTIFICATION_PAUSED + 1);
    assert_eq!(engine.stats().virtual_lookups, 5);

    root.free();
}

#[test]
fn queue_free_destroys_user_instance() {
    let mut engine = MockEngine::new();
    let root = load_game(&mut engine);

    let spinner = Spinner::new_alloc(loaded_binding());
    let observer = spinner.clone();
    root.add_child(spinner);
    let objects_before = engine.stats().live_objects();

    observer.queue_free();
    engine.process_frame(0.1);

    assert!(!observer.is_instance_valid());
    assert_eq!(engine.stats().live_objects(), objects_before - 1);
    assert_eq!(root.get_child_count(), 0);

    root.free();
    engine.unload_extension();
    assert_no_engine_errors(&engine);
}

#[test]
fn user_instance_seen_through_base_classes() {
    let mut engine = MockEngine::new();
    let root = load_game(&mut engine);

    let spinner = Spinner::new_alloc(loaded_binding());
    let as_node: Gd<Node> = spinner.clone().upcast();
    assert_eq!(as_node.ownership(), Ownership::Borrowed);

    let back = as_node.cast::<Spinner>();
    assert_eq!(back.bind().speed, 2.0);
    assert_eq!(back, spinner);

    drop(back);
    root.add_child(spinner);

    let child = root.get_child(0).expect("spinner was added");
    assert!(child.try_cast::<Spinner>().is_ok());

    root.free();
}

#[test]
fn panic_in_virtual_is_reported_to_engine() {
    let mut engine = MockEngine::new();
    let root = load_game(&mut engine);

    let fragile = Fragile::new_alloc(loaded_binding());
    let observer = fragile.clone();
    root.add_child(fragile);

    let errors = engine.errors();
    assert_eq!(errors.len(), 1, "{errors:#?}");
    assert!(errors[0].contains("Fragile::_ready"), "{}", errors[0]);
    assert!(errors[0].contains("not ready"), "{}", errors[0]);

    // The instance stays usable after the panic.
    let guard = observer.bind();
    drop(guard);
    assert!(observer.is_instance_valid());

    root.free();
}

#[test]
#[should_panic(expected = "already bound")]
fn exclusive_bind_is_exclusive() {
    let mut engine = MockEngine::new();
    let _root = load_game(&mut engine);

    let mut spinner = Spinner::new_alloc(loaded_binding());
    let mut second = spinner.clone();

    let _guard = spinner.bind_mut();
    let _other = second.bind_mut();
}

#[test]
fn duplicate_registration_fails_loading() {
    let mut engine = MockEngine::new();

    assert!(!engine.load_extension(duplicate_init));
    assert!(!engine.is_extension_loaded());
    assert!(!engine.has_class("Spinner"));

    let errors = engine.errors();
    assert!(
        errors.iter().any(|e| e.contains("`Spinner` is registered multiple times")),
        "{errors:#?}"
    );
}

#[test]
fn missing_engine_method_fails_loading() {
    let mut engine = MockEngine::new();
    engine.remove_method("Node3D", "rotate");

    assert!(!engine.load_extension(game_init));

    let errors = engine.errors();
    assert_eq!(errors.len(), 1, "{errors:#?}");
    assert!(errors[0].contains("Failed to load GDExtension library"), "{}", errors[0]);
    assert!(errors[0].contains("Node3D::rotate"), "{}", errors[0]);
}

#[test]
fn class_name_taken_by_engine_is_skipped() {
    let mut engine = MockEngine::new();

    assert!(engine.load_extension(clashing_init));
    assert!(engine.has_class("Spinner"));
    assert!(!engine.has_class("Resource"), "engine class must stay untouched");

    let errors = engine.errors();
    assert_eq!(errors.len(), 1, "{errors:#?}");
    assert!(errors[0].contains("`Resource`"), "{}", errors[0]);
    assert!(errors[0].contains("already exists"), "{}", errors[0]);

    // Only the registered class is unregistered again.
    engine.unload_extension();
    assert!(!engine.has_class("Spinner"));
    assert_eq!(engine.errors().len(), 1, "{:#?}", engine.errors());
}
