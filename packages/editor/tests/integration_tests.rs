//! Integration tests for editor crate

use retouch_editor::{
    Command, CommandBus, EditSession, EditorError, ElementTree, Geometry, Handle, NodeId,
    OverrideKey, OverrideStore, Point, PointerId, StyleProperty, VNode, ENTITY_ID_ATTR, FIELD_ATTR,
};
use retouch_geometry::GeometryError;
use retouch_overrides::{content_hash, ContentSnapshot};
use serde_json::json;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

const MOUSE: PointerId = PointerId(1);

fn page_vnode() -> VNode {
    VNode::element("body").with_child(
        VNode::element("main")
            .with_attr("data-content-root", "")
            .with_children(vec![
                VNode::element("h1").with_child(VNode::text("Welcome to the club")),
                VNode::element("div")
                    .with_attr(ENTITY_ID_ATTR, "mentor-1")
                    .with_children(vec![
                        VNode::element("h3")
                            .with_attr(FIELD_ATTR, "name")
                            .with_child(VNode::text("Ada")),
                        VNode::element("img")
                            .with_attr(FIELD_ATTR, "photo")
                            .with_attr("src", "/img/ada.png"),
                    ]),
                VNode::element("img").with_attr("src", "/img/banner.png"),
            ]),
    )
}

fn page() -> ElementTree {
    ElementTree::from_vnode(&page_vnode())
}

fn session() -> EditSession {
    EditSession::new("home", page(), OverrideStore::in_memory())
}

fn node(session: &EditSession, name: &str, value: &str) -> NodeId {
    session.tree().find_by_attribute(name, value).unwrap()
}

fn banner(session: &EditSession) -> NodeId {
    node(session, "src", "/img/banner.png")
}

#[test]
fn test_freeform_style_uses_derived_key() {
    let mut session = session();
    let h1 = session.tree().find_by_tag("h1").unwrap();

    let key = session
        .set_style(h1, StyleProperty::Color, "#ff0000")
        .unwrap();

    assert_eq!(
        key,
        OverrideKey::Derived {
            property: "textColor".to_string(),
            tag: "h1".to_string(),
            hash: content_hash("Welcome to the club"),
        }
    );
    assert_eq!(session.store().get(&key.to_string()), Some(&json!("#ff0000")));
    assert_eq!(session.tree().style(h1, "color"), Some("#ff0000"));

    let snapshot = ContentSnapshot::resolve(&ContentSnapshot::default(), session.store());
    assert_eq!(
        snapshot
            .styles_for("h1", "Welcome to the club")
            .get(StyleProperty::Color),
        Some("#ff0000")
    );
    assert!(snapshot.styles_for("h2", "Welcome to the club").is_empty());
}

#[test]
fn test_entity_edits_merge_into_one_entry() {
    let mut session = session();
    let mentor = node(&session, ENTITY_ID_ATTR, "mentor-1");
    let name = node(&session, FIELD_ATTR, "name");
    let photo = node(&session, FIELD_ATTR, "photo");

    session.set_text(name, "Ada Lovelace").unwrap();
    session
        .set_style(mentor, StyleProperty::BackgroundColor, "#eeeeee")
        .unwrap();
    session.set_image(photo, "/img/ada-2.png").unwrap();

    assert_eq!(
        session.store().get("mentor-1"),
        Some(&json!({
            "name": "Ada Lovelace",
            "backgroundColor": "#eeeeee",
            "photo": "/img/ada-2.png"
        }))
    );
    assert_eq!(session.tree().text_content(mentor), "Ada Lovelace");
    assert_eq!(session.tree().attribute(photo, "src"), Some("/img/ada-2.png"));

    let changes = session.journal().changes();
    assert_eq!(changes.len(), 3);
    assert!(changes.contains(&"mentor-1: background-color: #eeeeee;".to_string()));
}

#[test]
fn test_image_edit_requires_img() {
    let mut session = session();
    let h1 = session.tree().find_by_tag("h1").unwrap();

    assert_eq!(
        session.set_image(h1, "/img/x.png"),
        Err(EditorError::NotAnImage(h1))
    );
    assert!(session.store().is_empty());
}

#[test]
fn test_resize_presents_commits_and_flushes() {
    let mut session = session();
    let banner = banner(&session);
    let target = session.tree().target_id(banner);
    let key = session.layout_key(banner).unwrap();
    assert_eq!(key, OverrideKey::derived("layout", "img", "/img/banner.png"));
    let key = key.to_string();
    let t0 = Instant::now();

    session
        .begin_resize(
            MOUSE,
            banner,
            Handle::BottomRight,
            Point::new(100.0, 100.0),
            Geometry::new(0.0, 0.0, 200.0, 100.0),
        )
        .unwrap();
    session
        .pointer_move(MOUSE, Point::new(150.0, 130.0), t0)
        .unwrap();

    assert_eq!(session.animation_frame(), 1);
    assert_eq!(session.tree().style(banner, "width"), Some("250px"));
    assert_eq!(session.tree().style(banner, "height"), Some("130px"));
    assert!(session.store().is_empty());

    assert_eq!(session.poll(t0 + Duration::from_millis(200)), 1);
    assert_eq!(
        session.store().get(&key),
        Some(&json!({
            "layout": { "x": 0.0, "y": 0.0, "width": 250.0, "height": 130.0 }
        }))
    );

    let last = session
        .pointer_up(MOUSE, Point::new(160.0, 130.0))
        .unwrap();
    assert_eq!(last, Geometry::new(0.0, 0.0, 260.0, 130.0));
    assert_eq!(session.tree().style(banner, "width"), Some("260px"));
    assert_eq!(
        session.journal().entry(&target).unwrap().layout,
        Some(last)
    );

    let keys: Vec<&str> = session.store().keys().collect();
    assert_eq!(keys, vec![key.as_str()]);
    assert!(OverrideKey::parse(&key).is_derived());
}

#[test]
fn test_entity_geometry_is_stored_under_entity_id() {
    let mut session = session();
    let mentor = node(&session, ENTITY_ID_ATTR, "mentor-1");

    session
        .begin_resize(
            MOUSE,
            mentor,
            Handle::Move,
            Point::new(0.0, 0.0),
            Geometry::new(10.0, 10.0, 300.0, 200.0),
        )
        .unwrap();
    session
        .pointer_up(MOUSE, Point::new(5.0, 15.0))
        .unwrap();

    assert_eq!(
        session.store().get("mentor-1"),
        Some(&json!({
            "layout": { "x": 15.0, "y": 25.0, "width": 300.0, "height": 200.0 }
        }))
    );
}

#[test]
fn test_anonymous_geometry_key_survives_reload() {
    let mut first = session();
    let heading = first.tree().find_by_tag("h1").unwrap();
    first
        .begin_resize(
            MOUSE,
            heading,
            Handle::Right,
            Point::new(0.0, 0.0),
            Geometry::new(0.0, 0.0, 200.0, 60.0),
        )
        .unwrap();
    first.pointer_up(MOUSE, Point::new(40.0, 0.0)).unwrap();
    let before = first.tree().target_id(heading);
    let store = first.into_store();

    // Same content rebuilt behind a banner, so node ids shift
    let tree = ElementTree::from_vnode(
        &VNode::element("div").with_children(vec![
            VNode::element("nav").with_child(VNode::text("Menu")),
            page_vnode(),
        ]),
    );
    let reloaded = EditSession::new("home", tree, store);
    let heading = reloaded.tree().find_by_tag("h1").unwrap();
    assert_ne!(reloaded.tree().target_id(heading), before);

    let key = reloaded.layout_key(heading).unwrap();
    assert_eq!(key, OverrideKey::derived("layout", "h1", "Welcome to the club"));
    assert_eq!(
        reloaded.store().get(&key.to_string()),
        Some(&json!({
            "layout": { "x": 0.0, "y": 0.0, "width": 240.0, "height": 60.0 }
        }))
    );
}

#[test]
fn test_delete_aborts_drag_and_undo_restores() {
    let mut session = session();
    let banner = banner(&session);
    let target = session.tree().target_id(banner);
    let main = session.tree().parent(banner).unwrap();
    let before = session.tree().children(main).to_vec();

    session
        .begin_resize(
            MOUSE,
            banner,
            Handle::Right,
            Point::new(0.0, 0.0),
            Geometry::new(0.0, 0.0, 200.0, 100.0),
        )
        .unwrap();
    session
        .pointer_move(MOUSE, Point::new(80.0, 0.0), Instant::now())
        .unwrap();

    session.delete(banner).unwrap();
    assert!(!session.tree().is_attached(banner));

    assert_eq!(
        session.pointer_up(MOUSE, Point::new(80.0, 0.0)),
        Err(EditorError::Geometry(GeometryError::NoSession(MOUSE)))
    );
    assert!(session.store().is_empty());

    assert!(session.undo().unwrap());
    assert_eq!(session.tree().children(main), before.as_slice());
    assert!(!session.undo().unwrap());
}

#[test]
fn test_begin_resize_on_detached_node_fails() {
    let mut session = session();
    let banner = banner(&session);
    session.delete(banner).unwrap();

    let result = session.begin_resize(
        MOUSE,
        banner,
        Handle::Move,
        Point::new(0.0, 0.0),
        Geometry::new(0.0, 0.0, 100.0, 100.0),
    );
    assert!(matches!(result, Err(EditorError::TargetUnmounted(_))));
}

#[test]
fn test_command_bus_drives_session() {
    let session = Rc::new(RefCell::new(session()));
    let mut bus = CommandBus::new();

    let page = Rc::clone(&session);
    let handler = bus.register("home", move |command| match command {
        Command::SetContent {
            entity_id,
            field,
            value,
            ..
        } => {
            page.borrow_mut()
                .store_mut()
                .set(entity_id.clone(), json!({ field.clone(): value.clone() }));
            true
        }
        Command::SetStyle {
            key,
            value,
            ..
        } => {
            page.borrow_mut().store_mut().set_key(key, json!(value));
            true
        }
        Command::ResetOverrides { .. } => {
            page.borrow_mut().store_mut().clear();
            true
        }
    });

    bus.dispatch(&Command::SetContent {
        scope: "home".to_string(),
        entity_id: "hero".to_string(),
        field: "title".to_string(),
        value: json!("Hello"),
    })
    .unwrap();
    assert_eq!(
        session.borrow().store().get("hero"),
        Some(&json!({ "title": "Hello" }))
    );

    bus.dispatch(&Command::ResetOverrides {
        scope: "home".to_string(),
    })
    .unwrap();
    assert!(session.borrow().store().is_empty());

    bus.unregister(handler);
    assert!(bus
        .dispatch(&Command::ResetOverrides {
            scope: "home".to_string()
        })
        .is_err());
}

#[test]
fn test_session_edits_survive_reload() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("overrides.json");

    let mut session = EditSession::new("home", page(), OverrideStore::open(&path)?);
    let name = node(&session, FIELD_ATTR, "name");
    session.set_text(name, "Grace")?;

    let mut store = session.into_store();
    store.save()?;

    let reopened = OverrideStore::open(&path)?;
    assert_eq!(reopened.get("mentor-1"), Some(&json!({ "name": "Grace" })));
    Ok(())
}
