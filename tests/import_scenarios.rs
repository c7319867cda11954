//! End-to-end import scenarios against a real database file

use fortune_demo::{Error, FortuneStore, Importer, UniquenessMode};
use std::path::{Path, PathBuf};

// ──────────────────────── Helper ────────────────────────

fn write_fortunes(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

fn open(dir: &Path) -> FortuneStore {
    FortuneStore::open(&dir.join("fortunes.db"), UniquenessMode::ContentHash).unwrap()
}

// ══════════════════════════════════════════════════════════
//  import
// ══════════════════════════════════════════════════════════

#[test]
fn import_then_reimport_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_fortunes(dir.path(), "fortunes.txt", "A\n%\nB\n%\nC\n");

    let mut store = open(dir.path());
    store.initialize(false).unwrap();

    let first = Importer::new(&store).import_file(&file).unwrap();
    assert_eq!((first.total, first.imported, first.duplicates), (3, 3, 0));

    let second = Importer::new(&store).import_file(&file).unwrap();
    assert_eq!((second.total, second.imported, second.duplicates), (3, 0, 3));
    assert_eq!(store.count().unwrap(), 3);
}

#[test]
fn imported_plus_duplicates_equals_total() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = open(dir.path());
    store.initialize(false).unwrap();

    let inputs = ["x", "x\n%\nx", "a\n%\nb\n%\na\n%\nc\n%\n", "%\n%\n%\n"];
    for contents in inputs {
        let report = Importer::new(&store).import_str(contents).unwrap();
        assert_eq!(report.imported + report.duplicates, report.total, "input {:?}", contents);
    }
}

#[test]
fn data_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_fortunes(dir.path(), "one.txt", "The only fortune\n");
    {
        let mut store = open(dir.path());
        store.initialize(false).unwrap();
        Importer::new(&store).import_file(&file).unwrap();
    }

    let store = open(dir.path());
    assert_eq!(store.read_random_fortune().unwrap(), "The only fortune\n");
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = open(dir.path());
    store.initialize(false).unwrap();

    let err = Importer::new(&store)
        .import_file(&dir.path().join("nope.txt"))
        .unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}

// ══════════════════════════════════════════════════════════
//  table lifecycle
// ══════════════════════════════════════════════════════════

#[test]
fn init_keeps_data_and_reset_empties() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = open(dir.path());
    store.initialize(false).unwrap();
    Importer::new(&store).import_str("A\n%\nB\n").unwrap();

    assert!(store.initialize(false).unwrap().already_existed());
    assert_eq!(store.count().unwrap(), 2);

    store.initialize(true).unwrap();
    assert_eq!(store.count().unwrap(), 0);
    assert!(matches!(store.random_fortune(), Err(Error::EmptySelection)));
}

#[test]
fn drop_then_init_then_import() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_fortunes(dir.path(), "fortunes.txt", "A\n%\nB\n%\nC\n");
    let mut store = open(dir.path());
    store.initialize(false).unwrap();
    Importer::new(&store).import_file(&file).unwrap();

    store.drop_table().unwrap();
    assert!(!store.table_exists().unwrap());

    let outcome = store.initialize(false).unwrap();
    assert!(!outcome.already_existed());
    assert!(store.table_exists().unwrap());
    assert_eq!(store.count().unwrap(), 0);

    let report = Importer::new(&store).import_file(&file).unwrap();
    assert_eq!(report.imported, 3);
    assert!(store.table_exists().unwrap());

    // Fresh ids after a drop are still picked correctly
    let text = store.read_random_fortune().unwrap();
    assert!(["A\n", "B\n", "C\n"].contains(&text.as_str()));
}

#[test]
fn raw_text_mode_dedups_on_text() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = FortuneStore::open(&dir.path().join("raw.db"), UniquenessMode::RawText).unwrap();
    store.initialize(false).unwrap();

    let report = Importer::new(&store).import_str("A\n%\nA\n%\nB\n").unwrap();
    assert_eq!(report.imported, 2);
    assert_eq!(report.duplicates, 1);
}
