mod common;

use classmap::core::container::ContainerType;
use classmap::core::descriptor::TypeDescriptor;
use classmap::core::traversal::{ArchiveWalker, TypeSink};
use classmap::LogContext;
use common::*;
use log::LevelFilter;
use std::io::Cursor;

#[derive(Default)]
struct Recorder {
    names: Vec<String>,
}

impl TypeSink for Recorder {
    fn accept(&mut self, descriptor: TypeDescriptor, bytes: &[u8]) {
        assert!(!bytes.is_empty());
        self.names.push(descriptor.binary_name);
    }
}

fn walker() -> (ArchiveWalker, LogContext) {
    let log = LogContext::new(LevelFilter::Off);
    (ArchiveWalker::new(log.clone()), log)
}

#[test]
fn walks_nested_archives_depth_first() {
    let inner = ArchiveBuilder::new()
        .class("com/x/C", &simple_class("com/x/C"))
        .build();
    let war = ArchiveBuilder::new()
        .class("com/x/B", &simple_class("com/x/B"))
        .entry("WEB-INF/lib/inner.jar", &inner)
        .build();
    let jar = ArchiveBuilder::new()
        .directory("com/x/")
        .class("com/x/A", &simple_class("com/x/A"))
        .entry("web.war", &war)
        .build();

    let dir = tempfile::TempDir::new().unwrap();
    let path = write_file(dir.path(), "app.jar", &jar);

    let (walker, log) = walker();
    let mut recorder = Recorder::default();
    let stats = walker.walk_path(&path, &mut recorder);

    assert_eq!(recorder.names, vec!["com.x.A", "com.x.B", "com.x.C"]);
    assert_eq!(stats.containers, 3);
    assert_eq!(stats.types, 3);
    assert_eq!(log.warnings(), 0);
    assert_eq!(log.errors(), 0);
}

#[test]
fn missing_or_empty_input_warns_once() {
    let dir = tempfile::TempDir::new().unwrap();
    let empty = write_file(dir.path(), "empty.jar", &[]);

    let (walker, log) = walker();
    let mut recorder = Recorder::default();
    walker.walk_path(&empty, &mut recorder);
    assert_eq!(log.warnings(), 1);

    walker.walk_path(&dir.path().join("absent.jar"), &mut recorder);
    assert_eq!(log.warnings(), 2);
    assert!(recorder.names.is_empty());
}

#[test]
fn malformed_entries_are_reported_and_skipped() {
    let jar = ArchiveBuilder::new()
        .class("com/x/Broken", b"\xCA\xFE\xBA\xBE\x00")
        .class("com/x/Good", &simple_class("com/x/Good"))
        .entry("corrupt.jar", b"definitely not a zip")
        .build();

    let (walker, log) = walker();
    let mut recorder = Recorder::default();
    let stats = walker.walk_reader("app.jar", ContainerType::Jar, Cursor::new(jar), &mut recorder);

    assert_eq!(recorder.names, vec!["com.x.Good"]);
    assert_eq!(stats.failed_entries, 1);
    assert_eq!(stats.failed_containers, 1);
    assert_eq!(log.errors(), 2);
}

#[test]
fn repeated_entry_names_are_each_processed() {
    let jar = ArchiveBuilder::new()
        .class("com/x/Foo", &simple_class("com/x/Foo"))
        .class("com/x/Foo", &simple_class("com/x/Foo"))
        .build();

    let (walker, log) = walker();
    let mut recorder = Recorder::default();
    let stats = walker.walk_reader("app.jar", ContainerType::Jar, Cursor::new(jar), &mut recorder);

    assert_eq!(recorder.names, vec!["com.x.Foo", "com.x.Foo"]);
    assert_eq!(stats.types, 2);
    assert_eq!(log.errors(), 0);
}

#[test]
fn skips_entries_outside_the_membership_table() {
    // A rar nested in a war is not read; an ear nested in a jar is ignored.
    let rar = ArchiveBuilder::new()
        .class("com/x/InRar", &simple_class("com/x/InRar"))
        .build();
    let war = ArchiveBuilder::new()
        .class("com/x/InWar", &simple_class("com/x/InWar"))
        .entry("connector.rar", &rar)
        .build();
    let jar = ArchiveBuilder::new()
        .entry("nested.war", &war)
        .entry("enterprise.ear", &war)
        .entry("README.txt", b"hello")
        .entry("com/x/Empty.class", &[])
        .build();

    let (walker, log) = walker();
    let mut recorder = Recorder::default();
    let stats = walker.walk_reader("app.jar", ContainerType::Jar, Cursor::new(jar), &mut recorder);

    assert_eq!(recorder.names, vec!["com.x.InWar"]);
    assert_eq!(stats.skipped_entries, 4);
    assert_eq!(log.errors(), 0);
}

#[test]
fn top_level_class_files_are_read_directly() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = write_file(dir.path(), "Loose.class", &simple_class("com/x/Loose"));

    let (walker, _log) = walker();
    let mut recorder = Recorder::default();
    let stats = walker.walk_path(&path, &mut recorder);

    assert_eq!(recorder.names, vec!["com.x.Loose"]);
    assert_eq!(stats.containers, 0);
}

#[test]
fn stops_descending_past_the_depth_limit() {
    let innermost = ArchiveBuilder::new()
        .class("com/x/Deep", &simple_class("com/x/Deep"))
        .build();
    let middle = ArchiveBuilder::new()
        .class("com/x/Middle", &simple_class("com/x/Middle"))
        .entry("innermost.jar", &innermost)
        .build();
    let outer = ArchiveBuilder::new().entry("middle.jar", &middle).build();

    let log = LogContext::new(LevelFilter::Off);
    let walker = ArchiveWalker::new(log.clone()).with_max_depth(1);
    let mut recorder = Recorder::default();
    walker.walk_reader("outer.jar", ContainerType::Jar, Cursor::new(outer), &mut recorder);

    assert_eq!(recorder.names, vec!["com.x.Middle"]);
    assert_eq!(log.warnings(), 1);
}
