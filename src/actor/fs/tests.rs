use std::path::PathBuf;
use std::time::Duration;

use tempfile::TempDir;
use tokio::sync::mpsc;

use super::{FsActor, touches_target};
use crate::actor::messages::EditMsg;

fn make_event(paths: Vec<&str>, kind: notify::EventKind) -> notify::Event {
    notify::Event {
        kind,
        paths: paths.into_iter().map(PathBuf::from).collect(),
        attrs: Default::default(),
    }
}

fn modify_kind() -> notify::EventKind {
    notify::EventKind::Modify(notify::event::ModifyKind::Data(
        notify::event::DataChange::Any,
    ))
}

fn metadata_kind() -> notify::EventKind {
    notify::EventKind::Modify(notify::event::ModifyKind::Metadata(
        notify::event::MetadataKind::WriteTime,
    ))
}

fn create_kind() -> notify::EventKind {
    notify::EventKind::Create(notify::event::CreateKind::File)
}

fn remove_kind() -> notify::EventKind {
    notify::EventKind::Remove(notify::event::RemoveKind::File)
}

#[test]
fn test_touches_target_by_kind() {
    let target = PathBuf::from("/doc/main.tex");

    assert!(touches_target(&make_event(vec!["/doc/main.tex"], modify_kind()), &target));
    assert!(touches_target(&make_event(vec!["/doc/main.tex"], create_kind()), &target));
    assert!(!touches_target(&make_event(vec!["/doc/main.tex"], metadata_kind()), &target));
    assert!(!touches_target(&make_event(vec!["/doc/main.tex"], remove_kind()), &target));
}

#[test]
fn test_touches_target_ignores_siblings() {
    let target = PathBuf::from("/doc/main.tex");

    assert!(!touches_target(&make_event(vec!["/doc/main.aux"], modify_kind()), &target));
    assert!(!touches_target(&make_event(vec!["/doc/.main.tex.swp"], modify_kind()), &target));
    // Rename events carry both paths
    assert!(touches_target(
        &make_event(vec!["/doc/main.tex~", "/doc/main.tex"], create_kind()),
        &target
    ));
}

#[test]
fn test_new_canonicalizes_target() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("main.tex");
    std::fs::write(&source, "hello").unwrap();

    let (tx, _rx) = mpsc::channel(4);
    let actor = FsActor::new(&source, tx).unwrap();

    let expected = std::fs::canonicalize(temp.path()).unwrap().join("main.tex");
    assert_eq!(actor.target(), expected);
}

#[test]
fn test_new_missing_directory_fails() {
    let (tx, _rx) = mpsc::channel(4);
    assert!(FsActor::new(&PathBuf::from("/definitely/not/here/main.tex"), tx).is_err());
}

#[tokio::test]
async fn test_run_reports_initial_contents() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("main.tex");
    std::fs::write(&source, "\\section{A}").unwrap();

    let (tx, mut rx) = mpsc::channel(4);
    let actor = FsActor::new(&source, tx).unwrap();
    let task = tokio::spawn(actor.run());

    let msg = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .unwrap();
    assert_eq!(msg, Some(EditMsg::TextChanged("\\section{A}".into())));

    task.abort();
}
