use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;

use ncview_core::{load_path, Error, OwnerFilter, TreeBuilder};

fn passwd() -> HashMap<u32, String> {
    HashMap::from([(1000, "alice".to_string()), (1001, "bob".to_string())])
}

fn write_export(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn loads_a_nested_export() {
    let export = write_export(
        r#"[1, 0, {"progname":"ncdu","progver":"1.15.1","timestamp":1690000000},
[{"name":"/srv","uid":1000},
 {"name":"readme","asize":90,"dsize":100,"uid":1000},
 [{"name":"logs","uid":1001},
  {"name":"app.log","asize":250,"dsize":300,"uid":1001},
  {"name":"tmp.log","dsize":512,"uid":1001,"excluded":"pattern"}],
 {"name":"core","dsize":4096}]]
"#,
    );

    let mut builder = TreeBuilder::with_lookup(passwd());
    let root = load_path(export.path(), &mut builder).unwrap();

    assert_eq!(root.name, "/srv");
    assert_eq!(root.path, PathBuf::from("/srv"));
    // the excluded log and the uid-less core file never make it in
    assert_eq!(root.children.len(), 2);
    assert_eq!(root.hierarchy_size(), 100 + 300);
    assert_eq!(
        root.hierarchy_size_for_owner(&OwnerFilter::Name("bob".into())),
        300
    );
    assert_eq!(builder.known_owners(), vec!["*", "alice", "bob"]);

    let logs = &root.children[1];
    assert_eq!(logs.path, PathBuf::from("/srv/logs"));
    assert_eq!(logs.children.len(), 1);
}

#[test]
fn malformed_header_fails_without_a_tree() {
    let export = write_export(r#"[1, 0, {"progname":"ncdu"}]"#);
    let mut builder = TreeBuilder::with_lookup(passwd());
    let err = load_path(export.path(), &mut builder).unwrap_err();
    assert!(matches!(err, Error::Format(_)));
    assert_eq!(builder.entries_built(), 0);
}

#[test]
fn unreadable_payload_is_a_load_error() {
    let mut builder = TreeBuilder::with_lookup(passwd());
    let err = load_path(std::path::Path::new("/nonexistent/scan.json"), &mut builder)
        .unwrap_err();
    match err {
        Error::Load { path, .. } => assert_eq!(path, PathBuf::from("/nonexistent/scan.json")),
        other => panic!("expected Load error, got {other:?}"),
    }
}

#[test]
fn truncated_json_is_a_decode_error() {
    let export = write_export(r#"[1, 0, {}, [{"name":"/x","uid":1000},"#);
    let mut builder = TreeBuilder::with_lookup(passwd());
    let err = load_path(export.path(), &mut builder).unwrap_err();
    assert!(matches!(err, Error::Json(_)));
}
