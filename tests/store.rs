use std::cell::RefCell;
use std::rc::Rc;

use crypto_escape::puzzle::load_catalog;
use crypto_escape::store::DEFAULT_SESSION_KEY;
use crypto_escape::{FileStore, ProgressionEngine, Session, SessionStore, StoreEvent, Timing};

fn shipped_catalog() -> crypto_escape::Catalog {
    let dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("puzzles/crypto_escape");
    load_catalog(&dir).unwrap()
}

#[test]
fn file_store_round_trips_a_session() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = FileStore::open(dir.path(), DEFAULT_SESSION_KEY).unwrap();
    assert!(store.load().is_none());

    let mut session = Session::default();
    session.score = 400;
    session.current_room_index = 2;
    session.started = true;
    session.solved_puzzle_ids.extend(["puzzle1".to_string(), "puzzle2".to_string()]);
    store.save(&session).unwrap();

    assert_eq!(
        store.path(),
        dir.path().join(format!("{}.json", DEFAULT_SESSION_KEY))
    );
    let reopened = FileStore::open(dir.path(), DEFAULT_SESSION_KEY).unwrap();
    assert_eq!(reopened.load(), Some(session));
}

#[test]
fn file_store_record_uses_documented_keys() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = FileStore::open(dir.path(), "slot").unwrap();
    let mut session = Session::default();
    session.score = 100;
    session.solved_puzzle_ids.insert("puzzle1".into());
    store.save(&session).unwrap();

    let raw = std::fs::read_to_string(store.path()).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(json["score"], 100);
    assert_eq!(json["solvedPuzzleIds"][0], "puzzle1");
    assert_eq!(json["currentRoomIndex"], 0);
}

#[test]
fn garbage_on_disk_loads_as_none() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::open(dir.path(), "slot").unwrap();
    std::fs::write(store.path(), b"\x00\x01 definitely not json").unwrap();
    assert!(store.load().is_none());
}

#[test]
fn clear_is_idempotent_and_notifies() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = FileStore::open(dir.path(), "slot").unwrap();
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    store.subscribe(Box::new(move |event| {
        sink.borrow_mut().push(match event {
            StoreEvent::Saved(session) => format!("saved {}", session.score),
            StoreEvent::Cleared => "cleared".to_string(),
        })
    }));

    store.save(&Session::default()).unwrap();
    store.clear().unwrap();
    store.clear().unwrap();

    assert!(!store.path().exists());
    assert_eq!(*events.borrow(), vec!["saved 0", "cleared", "cleared"]);
}

#[test]
fn later_saves_overwrite_earlier_ones() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = FileStore::open(dir.path(), "slot").unwrap();
    for score in (1..=5).map(|n| n * 100) {
        let session = Session {
            score,
            ..Session::default()
        };
        store.save(&session).unwrap();
    }
    assert_eq!(store.load().map(|s| s.score), Some(500));
}

#[test]
fn shipped_game_resumes_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::open(dir.path(), DEFAULT_SESSION_KEY).unwrap();
    let mut engine = ProgressionEngine::new(shipped_catalog(), store, Timing::default());

    engine.start_game();
    engine.select_puzzle("puzzle1").unwrap();
    engine.submit_solution("This Is A Secret Message").unwrap();
    engine.select_puzzle("puzzle2").unwrap();
    engine.submit_solution("PASSWORD").unwrap();
    engine.advance_room().unwrap();
    engine.select_puzzle("puzzle3").unwrap();
    engine.submit_solution("11111111").unwrap();
    drop(engine);

    let store = FileStore::open(dir.path(), DEFAULT_SESSION_KEY).unwrap();
    let engine = ProgressionEngine::resume(shipped_catalog(), store, Timing::default());
    assert_eq!(engine.score(), 300);
    assert_eq!(engine.current_room_index(), 1);
    assert_eq!(engine.current_room().name(), "The Digital Vault");
    assert_eq!(engine.progress(), (3, 10));
    assert!(!engine.can_advance_room());
}
