use super::*;
use std::fs;
use tempfile::TempDir;

#[derive(rust_embed::Embed)]
#[folder = "tests/fixtures/bundle/"]
struct Bundle;

fn names(entries: &[SourceEntry]) -> Vec<&str> {
    let mut names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
    names.sort_unstable();
    names
}

#[test]
fn test_dir_source_lists_files_and_dirs() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("migrations");
    fs::create_dir_all(dir.join("nested")).unwrap();
    fs::write(dir.join("001_init.up.sql"), "CREATE TABLE t (id INT)").unwrap();
    fs::write(dir.join("nested/002_x.up.sql"), "SELECT 1").unwrap();

    let source = DirSource::new(temp.path());
    let entries = source.list("migrations").unwrap();
    assert_eq!(names(&entries), vec!["001_init.up.sql", "nested"]);
    assert!(entries.iter().any(|e| e.name == "nested" && e.is_dir));
}

#[test]
fn test_dir_source_read_entries_skips_directories() {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(temp.path().join("nested")).unwrap();
    fs::write(temp.path().join("001_init.up.sql"), "CREATE TABLE t (id INT)").unwrap();
    fs::write(temp.path().join("nested/002_x.up.sql"), "SELECT 1").unwrap();

    let source = DirSource::new(temp.path());
    let entries = source.read_entries(".").unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].0, "001_init.up.sql");
    assert_eq!(entries[0].1, b"CREATE TABLE t (id INT)".to_vec());
}

#[test]
fn test_dir_source_accepts_absolute_dir() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("001_init.up.sql"), "SELECT 1").unwrap();

    let source = DirSource::new("/unrelated/root");
    let dir = temp.path().to_str().unwrap();
    let entries = source.read_entries(dir).unwrap();
    assert_eq!(entries.len(), 1);
}

#[test]
fn test_dir_source_missing_directory() {
    let temp = TempDir::new().unwrap();
    let source = DirSource::new(temp.path());
    let err = source.list("does_not_exist").unwrap_err();
    assert!(matches!(err, CoreError::SourceUnavailable { .. }));
}

#[test]
fn test_dir_source_missing_file() {
    let temp = TempDir::new().unwrap();
    let source = DirSource::new(temp.path());
    assert!(matches!(
        source.read("nope.sql"),
        Err(CoreError::SourceUnavailable { .. })
    ));
}

#[test]
fn test_embedded_source_lists_direct_children_only() {
    let source = EmbeddedSource::<Bundle>::new();
    let entries = source.list("migrations").unwrap();
    assert_eq!(
        names(&entries),
        vec![
            "001_init.down.sql",
            "001_init.up.sql",
            "002_add_col.down.sql",
            "002_add_col.up.sql",
            "archive",
        ]
    );
    assert!(entries.iter().any(|e| e.name == "archive" && e.is_dir));
}

#[test]
fn test_embedded_source_reads_files() {
    let source = EmbeddedSource::<Bundle>::new();
    let entries = source.read_entries("/migrations/").unwrap();
    assert_eq!(entries.len(), 4);
    let body = source.read("migrations/001_init.down.sql").unwrap();
    assert_eq!(String::from_utf8(body).unwrap().trim(), "DROP TABLE t;");
}

#[test]
fn test_embedded_source_unknown_directory() {
    let source = EmbeddedSource::<Bundle>::new();
    assert!(matches!(
        source.list("elsewhere"),
        Err(CoreError::SourceUnavailable { .. })
    ));
}

#[test]
fn test_join_path() {
    assert_eq!(join_path("", "a.sql"), "a.sql");
    assert_eq!(join_path(".", "a.sql"), "a.sql");
    assert_eq!(join_path("db/migrations/", "a.sql"), "db/migrations/a.sql");
    assert_eq!(join_path("/db/migrations", "a.sql"), "/db/migrations/a.sql");
}
