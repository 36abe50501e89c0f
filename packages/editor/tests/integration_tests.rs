//! Integration tests for the editor crate

use pagebuilder_editor::model::{
    page_seed, Component, ComponentContent, ComponentPatch, ModelError, PageDocument, PageId,
    Section, SectionKind, Styles,
};
use pagebuilder_editor::{
    Command, CommandOutcome, EditSession, EditorConfig, EditorError, FileGateway, MemoryGateway,
    MutationError, PersistenceError, PersistenceGateway, SaveCoordinator, SaveResult, SaveStatus,
};
use std::sync::Arc;

/// Two sections: s1 = [a, b], s2 = [c]
fn sample_doc() -> PageDocument {
    PageDocument::from_sections(vec![
        Section::new(SectionKind::Hero)
            .with_id("s1")
            .with_component(Component::new(ComponentContent::heading("Welcome", 1)).with_id("a"))
            .with_component(Component::new(ComponentContent::text("Body")).with_id("b")),
        Section::new(SectionKind::Footer)
            .with_id("s2")
            .with_component(Component::new(ComponentContent::text("Footer")).with_id("c")),
    ])
}

fn session() -> EditSession {
    EditSession::new(PageId::from("home"), sample_doc())
}

fn ids_in(doc: &PageDocument, section_id: &str) -> Vec<String> {
    doc.find_section(section_id)
        .map(|s| s.component_ids().map(|id| id.to_string()).collect())
        .unwrap_or_default()
}

#[test]
fn test_move_up_then_undo() {
    let mut session = session();

    assert!(session.apply(Command::move_component_up("b")).is_applied());
    assert_eq!(ids_in(session.document(), "s1"), vec!["b", "a"]);

    assert!(session.apply(Command::Undo).is_applied());
    assert_eq!(ids_in(session.document(), "s1"), vec!["a", "b"]);
    assert_eq!(session.document(), &sample_doc());
}

#[test]
fn test_copy_paste_twice_gives_fresh_ids() {
    let mut session = session();

    assert!(session.apply(Command::copy_component("a")).is_applied());
    assert!(session.apply(Command::paste_component("s2")).is_applied());
    assert!(session.apply(Command::paste_component("s2")).is_applied());

    let s2 = session.document().find_section("s2").unwrap();
    assert_eq!(s2.components.len(), 3);

    let first = &s2.components[1];
    let second = &s2.components[2];
    let original = session.document().find_component("a").unwrap();

    assert_ne!(first.id, second.id);
    assert_ne!(first.id, original.id);
    assert_ne!(second.id, original.id);
    assert_eq!(first.content, original.content);
    assert_eq!(second.content, original.content);
    assert_eq!(original, &sample_doc().sections[0].components[0]);
    assert!(session.document().check_integrity().is_ok());
}

#[test]
fn test_sixty_inserts_keep_fifty_snapshots() {
    let mut session = EditSession::new(PageId::from("home"), PageDocument::new());

    for _ in 0..60 {
        assert!(session
            .apply(Command::insert_section(Section::new(SectionKind::Content), None))
            .is_applied());
    }
    assert_eq!(session.history().len(), 50);
    assert_eq!(session.document().section_count(), 60);

    for _ in 0..50 {
        assert!(session.apply(Command::Undo).is_applied());
    }

    // The first ten insertions were evicted from history
    assert_eq!(session.document().section_count(), 10);
    assert_eq!(session.history().len(), 50);
    assert!(!session.can_undo());
    assert!(session.can_redo());
    assert!(session.apply(Command::Undo).is_ignored());
}

#[test]
fn test_delete_selected_component_clears_selection() {
    let mut session = session();
    session.apply(Command::select(Some("b".into())));

    session.apply(Command::delete_component("b"));
    assert_eq!(session.selection(), None);
}

#[test]
fn test_delete_other_component_keeps_selection() {
    let mut session = session();
    session.apply(Command::select(Some("a".into())));

    session.apply(Command::delete_component("c"));
    assert_eq!(session.selection().map(|id| id.as_str()), Some("a"));
}

#[test]
fn test_delete_section_clears_selected_child() {
    let mut session = session();
    session.apply(Command::select(Some("a".into())));

    session.apply(Command::delete_section("s1"));
    assert_eq!(session.selection(), None);
}

#[test]
fn test_cross_section_move_from_wrong_section_is_ignored() {
    let mut session = session();
    let version = session.version();

    let outcome = session.apply(Command::move_component_across_sections("c", "s1", "s2", 0));
    assert!(matches!(
        outcome,
        CommandOutcome::Ignored {
            reason: MutationError::NotInSection { .. }
        }
    ));

    let outcome = session.apply(Command::move_component_across_sections("x", "s1", "s2", 0));
    assert!(outcome.is_ignored());

    assert_eq!(session.document(), &sample_doc());
    assert_eq!(session.version(), version);
    assert!(!session.is_dirty());
    assert!(!session.can_undo());
}

#[test]
fn test_duplicate_selects_copy() {
    let mut session = session();
    session.apply(Command::update_component(
        "a",
        ComponentPatch::styles(Styles::default().with_color("#333")),
    ));

    assert!(session.apply(Command::duplicate_component("a")).is_applied());

    let s1 = session.document().find_section("s1").unwrap();
    let original = &s1.components[0];
    let copy = &s1.components[1];

    assert_eq!(copy.component_type(), original.component_type());
    assert_eq!(copy.content, original.content);
    assert_eq!(copy.styles, original.styles);
    assert_ne!(copy.id, original.id);
    assert_eq!(session.selection(), Some(&copy.id));
}

#[test]
fn test_cross_section_move_conserves_components() {
    let mut session = session();
    let before = session.document().component_count();
    let moved = session.document().find_component("a").cloned().unwrap();

    assert!(session
        .apply(Command::move_component_across_sections("a", "s1", "s2", 99))
        .is_applied());

    let doc = session.document();
    assert_eq!(doc.component_count(), before);
    assert_eq!(ids_in(doc, "s1"), vec!["b"]);
    assert_eq!(ids_in(doc, "s2"), vec!["c", "a"]);
    assert_eq!(doc.find_component("a"), Some(&moved));
}

#[test]
fn test_undo_inverts_mixed_sequence() {
    let mut session = session();
    let commands = vec![
        Command::insert_section(Section::new(SectionKind::Features), Some(1)),
        Command::move_section(0, 2),
        Command::insert_component("s2", Component::new(ComponentContent::icon("star")), Some(0)),
        Command::move_component("s1", 0, 1),
        Command::update_component("b", ComponentPatch::content(ComponentContent::text("Edited"))),
        Command::duplicate_component("c"),
        Command::delete_component("a"),
    ];

    let applied = session
        .replay(commands)
        .iter()
        .filter(|o| o.is_applied())
        .count();
    assert_eq!(applied, 7);

    for _ in 0..applied {
        assert!(session.apply(Command::Undo).is_applied());
    }
    assert_eq!(session.document(), &sample_doc());
    assert!(!session.can_undo());
}

#[test]
fn test_new_edit_after_undo_discards_redo() {
    let mut session = session();
    session.apply(Command::move_component_down("a"));
    session.apply(Command::Undo);
    assert!(session.can_redo());

    session.apply(Command::delete_component("c"));
    assert!(!session.can_redo());
    assert!(matches!(
        session.apply(Command::Redo),
        CommandOutcome::Ignored {
            reason: MutationError::NothingToRedo
        }
    ));
}

#[test]
fn test_order_stays_positional() {
    let mut session = session();
    session.replay(vec![
        Command::insert_component("s1", Component::new(ComponentContent::text("x")).with_id("x"), Some(1)),
        Command::move_component("s1", 2, 0),
        Command::delete_component("a"),
        Command::insert_component("s1", Component::new(ComponentContent::text("y")).with_id("y"), None),
    ]);

    assert_eq!(ids_in(session.document(), "s1"), vec!["b", "x", "y"]);
    let s1 = session.document().find_section("s1").unwrap();
    for (position, component) in s1.components.iter().enumerate() {
        assert_eq!(s1.position_of(component.id.as_str()), Some(position));
    }
}

#[test]
fn test_clipboard_ignores_later_edits_to_original() {
    let mut session = session();
    session.apply(Command::copy_component("a"));
    session.apply(Command::update_component(
        "a",
        ComponentPatch::content(ComponentContent::heading("Changed", 2)),
    ));
    session.apply(Command::delete_component("a"));

    session.apply(Command::paste_component("s2"));

    let pasted = session.document().find_section("s2").unwrap().components.last().unwrap();
    assert_eq!(pasted.content, ComponentContent::heading("Welcome", 1));
}

#[test]
fn test_toolbar_move_checks_follow_position() {
    let session = session();
    assert!(!session.can_move_up("a"));
    assert!(session.can_move_down("a"));
    assert!(session.can_move_up("b"));
    assert!(!session.can_move_down("b"));
    assert!(!session.can_move_up("c"));
    assert!(!session.can_move_down("c"));
    assert!(!session.can_move_up("missing"));
}

#[test]
fn test_replaying_recorded_log_is_deterministic() {
    let commands = vec![
        Command::copy_component("a"),
        Command::paste_component("s2"),
        Command::duplicate_component("b"),
        Command::move_component_across_sections("c", "s2", "s1", 0),
        Command::Undo,
        Command::delete_section("s1"),
    ];

    let log: String = commands
        .iter()
        .map(|c| serde_json::to_string(c).unwrap() + "\n")
        .collect();
    let parsed: Vec<Command> = log
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(parsed, commands);

    let mut first = session();
    let mut second = session();
    let first_outcomes = first.replay(commands);
    let second_outcomes = second.replay(parsed);

    assert_eq!(first_outcomes, second_outcomes);
    assert_eq!(first.document(), second.document());
}

#[test]
fn test_batch_is_one_undo_step() {
    let mut session = session();
    session.begin_batch("Rearrange hero");
    session.apply(Command::move_component_down("a"));
    session.apply(Command::update_component("b", ComponentPatch::visible(false)));
    session.end_batch();

    assert_eq!(session.history().len(), 1);
    assert_eq!(session.history().undo_description(), Some("Rearrange hero"));

    session.apply(Command::Undo);
    assert_eq!(session.document(), &sample_doc());
}

#[tokio::test]
async fn test_open_save_reopen_through_file_gateway() {
    let dir = tempfile::tempdir().unwrap();
    let gateway = Arc::new(FileGateway::new(dir.path()));
    let page_id = PageId::from("home");
    gateway.save(&page_id, &sample_doc()).await.unwrap();

    let session = EditSession::open(&*gateway, page_id.clone(), &EditorConfig::default())
        .await
        .unwrap();
    let coordinator = SaveCoordinator::new(session, gateway.clone());

    coordinator.dispatch(Command::move_component_up("b")).await;
    assert!(matches!(coordinator.save().await, SaveResult::Saved { .. }));
    assert_eq!(
        coordinator.session().lock().await.save_status(),
        &SaveStatus::Saved
    );

    let reopened = EditSession::open(&*gateway, page_id, &EditorConfig::default())
        .await
        .unwrap();
    assert_eq!(ids_in(reopened.document(), "s1"), vec!["b", "a"]);
}

#[tokio::test]
async fn test_open_missing_page_fails() {
    let gateway = MemoryGateway::new();
    let err = EditSession::open(&gateway, PageId::from("nope"), &EditorConfig::default())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        EditorError::Persistence(PersistenceError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_open_rejects_duplicate_ids() {
    let gateway = MemoryGateway::new();
    let mut doc = sample_doc();
    doc.sections[1].components[0].id = "a".into();
    gateway.insert(PageId::from("home"), doc).await;

    let err = EditSession::open(&gateway, PageId::from("home"), &EditorConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(err, EditorError::Model(_)));
}

#[tokio::test]
async fn test_open_rejects_invalid_content() {
    let gateway = MemoryGateway::new();
    let mut doc = sample_doc();
    doc.sections[0].components[0].content = ComponentContent::Heading {
        text: "Welcome".to_string(),
        level: 9,
    };
    doc.sections[1].components[0].content = ComponentContent::image("", "missing");
    gateway.insert(PageId::from("home"), doc).await;

    let err = EditSession::open(&gateway, PageId::from("home"), &EditorConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        EditorError::Model(ModelError::InvalidContent { .. })
    ));
}

#[tokio::test]
async fn test_duplicate_on_page_with_large_id_suffix() {
    let gateway = MemoryGateway::new();
    let page_id = PageId::from("home");
    let large = format!("{}-4294967295", page_seed("home"));

    let mut doc = sample_doc();
    doc.sections[0].components[0].id = large.as_str().into();
    gateway.insert(page_id.clone(), doc).await;

    let mut session = EditSession::open(&gateway, page_id, &EditorConfig::default())
        .await
        .unwrap();
    assert!(session.apply(Command::duplicate_component(large.as_str())).is_applied());
    assert!(session.apply(Command::insert_section(Section::new(SectionKind::Content), None)).is_applied());

    assert_eq!(session.document().component_count(), 4);
    assert!(session.document().validate().is_ok());
}

#[tokio::test]
async fn test_opened_session_allocates_unused_ids() {
    let gateway = MemoryGateway::new();
    let page_id = PageId::from("home");

    // A previous session already handed out ids from this page's generator
    let mut first = EditSession::new(page_id.clone(), sample_doc());
    first.apply(Command::duplicate_component("a"));
    first.apply(Command::duplicate_component("b"));
    gateway.insert(page_id.clone(), first.document().clone()).await;

    let mut second = EditSession::open(&gateway, page_id, &EditorConfig::default())
        .await
        .unwrap();
    second.apply(Command::duplicate_component("c"));
    second.apply(Command::copy_component("c"));
    second.apply(Command::paste_component("s1"));

    assert!(second.document().check_integrity().is_ok());
    assert_eq!(second.document().component_count(), 7);
}

#[tokio::test]
async fn test_failed_save_keeps_edits_and_retries() {
    let gateway = Arc::new(MemoryGateway::new());
    let coordinator = SaveCoordinator::new(session(), gateway.clone());

    coordinator.dispatch(Command::delete_component("c")).await;
    gateway.set_fail_saves(true);
    assert!(matches!(coordinator.save_if_dirty().await, SaveResult::Failed(e) if e.is_retryable()));

    {
        let session = coordinator.session().lock().await;
        assert!(session.is_dirty());
        assert!(matches!(session.save_status(), SaveStatus::Error(_)));
        assert_eq!(session.document().component_count(), 2);
    }

    gateway.set_fail_saves(false);
    assert!(matches!(coordinator.save_if_dirty().await, SaveResult::Saved { .. }));
    let stored = gateway.get(&PageId::from("home")).await.unwrap();
    assert_eq!(stored.component_count(), 2);
}
