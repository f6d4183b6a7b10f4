use dayflow_core::persist::{LEGACY_STORAGE_KEY, STORAGE_KEY};
use dayflow_core::{
    AppData, Editor, EditorConfig, KeyValueStore, Layout, LayoutId, LeafKind, LeafNode,
    ManualClock, MemoryStore, Node, NodeAttrs, NodeBody, NodeId, NodeKind, SaveStatus,
    SqliteStore,
};
use std::time::Duration;

fn editor_on(store: MemoryStore) -> (Editor<MemoryStore, ManualClock>, ManualClock) {
    let clock = ManualClock::default();
    let editor = Editor::with_clock(store, EditorConfig::default(), clock.clone()).unwrap();
    (editor, clock)
}

fn persisted(store: &MemoryStore) -> AppData {
    let raw = store.get(STORAGE_KEY).unwrap().expect("app data was written");
    serde_json::from_str(&raw).unwrap()
}

#[test]
fn rapid_edits_produce_one_write_after_quiet_period() {
    let (mut editor, clock) = editor_on(MemoryStore::new());
    for _ in 0..5 {
        editor.on_add_node(NodeKind::Task);
        clock.advance(Duration::from_millis(300));
        editor.tick();
    }
    assert_eq!(editor.store().write_count(), 0);
    assert_eq!(editor.save_status(), SaveStatus::Unsaved);

    clock.advance(Duration::from_millis(1000));
    editor.tick();
    editor.tick();
    assert_eq!(editor.store().write_count(), 1);
    assert_eq!(editor.save_status(), SaveStatus::Saved);
    assert_eq!(persisted(editor.store()).layouts[0].nodes.len(), 11);
}

#[test]
fn switching_layout_saves_outgoing_edits_first() {
    let (mut editor, _) = editor_on(MemoryStore::new());
    let added = editor.on_add_node(NodeKind::Place);

    editor.switch_layout(&"layout-blank".into()).unwrap();
    assert!(editor.nodes().is_empty());
    assert!(editor.selected().is_none());

    let saved = persisted(editor.store());
    let sample = saved.layout(&"layout-default".into()).unwrap();
    assert!(sample.nodes.iter().any(|node| node.id == added));

    editor.switch_layout(&"layout-default".into()).unwrap();
    assert!(editor.nodes().iter().any(|node| node.id == added));
}

#[test]
fn created_layout_becomes_active_and_empty() {
    let (mut editor, clock) = editor_on(MemoryStore::new());
    editor.on_delete_node(&NodeId::from("d-run"));
    let id = editor.create_layout("  周末  ").unwrap();

    assert_eq!(editor.active_layout_id(), &id);
    assert!(editor.nodes().is_empty());
    let summary = editor.layouts();
    assert_eq!(summary.len(), 3);
    assert_eq!(summary[2].name, "周末");
    assert!(summary[2].active);

    clock.advance(Duration::from_secs(2));
    editor.tick();
    let saved = persisted(editor.store());
    assert_eq!(saved.active_layout_id, id);
    assert_eq!(saved.layouts[0].nodes.len(), 5);
}

fn full_attrs(title: &str, dashed: bool) -> NodeAttrs {
    NodeAttrs {
        title: title.to_string(),
        subtitle: Some(format!("{title} subtitle")),
        duration: Some("45分钟".to_string()),
        icon: Some("clock".to_string()),
        color: Some("blue".to_string()),
        dashed,
    }
}

fn three_node_layout() -> AppData {
    let nodes = vec![
        Node::from(LeafNode::new(
            "t1".into(),
            LeafKind::Time,
            full_attrs("Wake", true),
        )),
        Node {
            id: "b1".into(),
            attrs: full_attrs("Focus", false),
            body: NodeBody::Block {
                side_events: vec![LeafNode::new(
                    "b1-e1".into(),
                    LeafKind::Task,
                    full_attrs("Interruption", true),
                )],
                custom_width: Some(412.5),
                custom_height: Some(230.0),
            },
        },
        Node::from(LeafNode::new(
            "p1".into(),
            LeafKind::Place,
            full_attrs("Cafe", false),
        )),
    ];
    AppData {
        layouts: vec![Layout {
            id: LayoutId::from("layout-a"),
            name: "A".to_string(),
            nodes,
        }],
        active_layout_id: LayoutId::from("layout-a"),
    }
}

#[test]
fn app_data_round_trips_with_every_field_set() {
    let data = three_node_layout();
    let encoded = serde_json::to_string(&data).unwrap();
    let decoded: AppData = serde_json::from_str(&encoded).unwrap();
    assert_eq!(decoded, data);

    let mut store = MemoryStore::new();
    store.set(STORAGE_KEY, &encoded).unwrap();
    let (editor, _) = editor_on(store);
    assert_eq!(editor.app_data(), data);
}

#[test]
fn state_round_trips_through_sqlite_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dayflow.db");

    let block_id = {
        let mut editor = Editor::open(SqliteStore::open(&path).unwrap(), EditorConfig::default())
            .unwrap();
        let block_id = editor.on_add_node(NodeKind::Block);
        editor.on_add_side_event(&block_id).unwrap();
        editor.on_set_branch_count(&NodeId::from("d-lunch"), 3);
        editor.save_now();
        assert!(editor.last_saved_time().is_some());
        block_id
    };

    let editor =
        Editor::open(SqliteStore::open(&path).unwrap(), EditorConfig::default()).unwrap();
    let block = editor.nodes().iter().find(|node| node.id == block_id).unwrap();
    assert_eq!(block.children().len(), 1);
    let lunch = editor
        .nodes()
        .iter()
        .find(|node| node.id.as_str() == "d-lunch")
        .unwrap();
    assert_eq!(lunch.children().len(), 3);
}

#[test]
fn malformed_stored_data_falls_back_to_builtin_layouts() {
    let mut store = MemoryStore::new();
    store.set(STORAGE_KEY, "{\"layouts\": 42}").unwrap();
    let (editor, _) = editor_on(store);
    assert_eq!(editor.app_data(), AppData::builtin());
}

#[test]
fn quota_failure_raises_alert_and_keeps_unsaved() {
    let (mut editor, _) = editor_on(MemoryStore::with_quota(64));
    editor.on_add_node(NodeKind::Task);
    editor.save_now();

    assert_eq!(editor.save_status(), SaveStatus::Unsaved);
    let alert = editor.take_alert().expect("failure is surfaced");
    assert!(alert.contains("quota"));
    assert!(editor.take_alert().is_none());
}

#[test]
fn visibility_loss_writes_without_touching_status() {
    let (mut editor, _) = editor_on(MemoryStore::new());
    editor.on_add_node(NodeKind::Time);
    editor.on_visibility_hidden();
    assert_eq!(editor.save_status(), SaveStatus::Unsaved);
    assert_eq!(editor.store().write_count(), 1);
}

#[test]
fn successful_write_removes_legacy_key() {
    let mut store = MemoryStore::new();
    store.set(LEGACY_STORAGE_KEY, "[]").unwrap();
    let (mut editor, _) = editor_on(store);
    editor.save_now();
    assert!(!editor.store().contains_key(LEGACY_STORAGE_KEY));
}

#[test]
fn reset_restores_builtins_and_clears_storage() {
    let (mut editor, _) = editor_on(MemoryStore::new());
    editor.create_layout("extra").unwrap();
    editor.on_add_node(NodeKind::Task);
    editor.reset_all();

    assert_eq!(editor.app_data(), AppData::builtin());
    assert_eq!(editor.save_status(), SaveStatus::Saved);
    assert!(!editor.store().contains_key(STORAGE_KEY));
}
