use super::*;

use std::{
    cell::RefCell,
    fs::{create_dir, create_dir_all, write},
    rc::Rc,
};
use tempfile::TempDir;

// tempfile's default ".tmp" prefix would make every root hidden on unix.
fn temp_root() -> TempDir {
    let _ = gather_runtime::init();
    tempfile::Builder::new()
        .prefix("gather")
        .tempdir()
        .expect("create temp dir")
}

fn names(collector: &Collector) -> Vec<String> {
    collector.iter().map(|e| e.name.clone()).collect()
}

fn config(recurse: bool) -> CollectorConfig {
    CollectorConfig {
        recurse,
        ..CollectorConfig::default()
    }
}

#[test]
fn default_config_values() {
    let cfg = CollectorConfig::default();
    assert!(cfg.recurse);
    assert!(!cfg.ignore_directory_attributes);
    assert_eq!(
        cfg.prohibited_attributes,
        FileAttributes::HIDDEN | FileAttributes::OFFLINE | FileAttributes::SYSTEM
    );
}

#[test]
fn config_deserializes_with_defaults_for_missing_fields() {
    let cfg: CollectorConfig =
        serde_json::from_str(r#"{ "recurse": false, "prohibited_attributes": "HIDDEN" }"#)
            .expect("parse config");

    assert!(!cfg.recurse);
    assert!(!cfg.ignore_directory_attributes);
    assert_eq!(cfg.prohibited_attributes, FileAttributes::HIDDEN);

    let empty: CollectorConfig = serde_json::from_str("{}").expect("parse empty config");
    assert_eq!(empty, CollectorConfig::default());
}

#[test]
fn same_file_added_twice_yields_one_entry() {
    let tmp = temp_root();
    let root = tmp.path();
    let file = root.join("a.txt");
    write(&file, b"a").expect("write a.txt");

    let mut collector = Collector::default();
    assert_eq!(collector.add(&file).expect("first add"), 1);
    assert_eq!(collector.add(&file).expect("second add"), 0);
    // Directory spec covering the same file, reached through another path.
    assert_eq!(collector.add(root.join(".").join("a.txt")).expect("dotted add"), 0);
    assert_eq!(collector.add(root).expect("dir add"), 0);

    assert_eq!(collector.len(), 1);
    let canonical = file.canonicalize().expect("canonicalize");
    assert!(collector.contains(&canonical));
    assert_eq!(collector.get(&canonical).map(|e| e.len), Some(1));
}

#[cfg(target_os = "linux")]
#[test]
fn paths_differing_only_in_case_are_one_entry() {
    let tmp = temp_root();
    let root = tmp.path();
    write(root.join("Report.txt"), b"upper").expect("write Report.txt");
    write(root.join("report.txt"), b"lower").expect("write report.txt");

    let mut collector = Collector::default();
    collector.add(root).expect("add root");

    assert_eq!(names(&collector), vec!["Report.txt"]);

    let upper = root.canonicalize().expect("canonicalize").join("REPORT.TXT");
    assert!(collector.contains(&upper));
}

#[cfg(unix)]
#[test]
fn hidden_files_are_excluded_by_default() {
    let tmp = temp_root();
    let root = tmp.path();
    write(root.join("a.txt"), b"a").expect("write a.txt");
    write(root.join("b.tmp"), b"b").expect("write b.tmp");
    write(root.join(".c.txt"), b"c").expect("write .c.txt");

    let mut collector = Collector::default();
    collector.add(root).expect("add root");
    assert_eq!(names(&collector), vec!["a.txt", "b.tmp"]);

    // A hidden file named explicitly is still filtered.
    assert_eq!(collector.add(root.join(".c.txt")).expect("add hidden"), 0);

    let mut everything = Collector::default();
    everything.set_prohibited_attributes(FileAttributes::empty());
    everything.add(root).expect("add root");
    assert_eq!(names(&everything), vec![".c.txt", "a.txt", "b.tmp"]);
}

#[test]
fn recursion_controls_subdirectory_descent() {
    let tmp = temp_root();
    let root = tmp.path();
    write(root.join("x.log"), b"x").expect("write x.log");
    create_dir(root.join("sub")).expect("create sub");
    write(root.join("sub").join("y.log"), b"y").expect("write y.log");

    let deep = Collector::with_paths([root], config(true)).expect("recursive gather");
    assert_eq!(names(&deep), vec!["x.log", "y.log"]);

    let flat = Collector::with_paths([root], config(false)).expect("flat gather");
    assert_eq!(names(&flat), vec!["x.log"]);
}

#[test]
fn wildcard_spec_matches_names_at_the_chosen_depth() {
    let tmp = temp_root();
    let root = tmp.path();
    write(root.join("x.log"), b"x").expect("write x.log");
    write(root.join("notes.txt"), b"n").expect("write notes.txt");
    create_dir_all(root.join("sub").join("inner")).expect("create sub/inner");
    write(root.join("sub").join("y.log"), b"y").expect("write y.log");
    write(root.join("sub").join("inner").join("z.log"), b"z").expect("write z.log");
    write(root.join("sub").join("y.txt"), b"y").expect("write y.txt");

    let spec = root.join("*.log");

    let deep = Collector::with_paths([&spec], config(true)).expect("recursive gather");
    assert_eq!(names(&deep), vec!["x.log", "y.log", "z.log"]);

    let flat = Collector::with_paths([&spec], config(false)).expect("flat gather");
    assert_eq!(names(&flat), vec!["x.log"]);
}

#[test]
fn observer_can_veto_files() {
    let tmp = temp_root();
    let root = tmp.path();
    write(root.join("_draft.txt"), b"d").expect("write _draft.txt");
    write(root.join("final.txt"), b"f").expect("write final.txt");
    write(root.join("_scratch.log"), b"s").expect("write _scratch.log");

    let mut collector = Collector::default();
    collector.on_file_found(|event| {
        if event.entry.name.starts_with('_') {
            event.ignore = true;
        }
    });
    collector.add(root).expect("add root");

    assert_eq!(names(&collector), vec!["final.txt"]);
}

#[test]
fn observers_run_in_order_and_see_earlier_vetoes() {
    let tmp = temp_root();
    let root = tmp.path();
    write(root.join("a.txt"), b"a").expect("write a.txt");
    write(root.join("b.txt"), b"b").expect("write b.txt");

    let seen: Rc<RefCell<Vec<(String, &'static str, bool)>>> = Rc::default();

    let mut collector = Collector::default();
    {
        let seen = Rc::clone(&seen);
        collector.on_file_found(move |event| {
            seen.borrow_mut()
                .push((event.entry.name.clone(), "first", event.ignore));
            if event.entry.name == "a.txt" {
                event.ignore = true;
            }
        });
    }
    {
        let seen = Rc::clone(&seen);
        collector.on_file_found(move |event| {
            seen.borrow_mut()
                .push((event.entry.name.clone(), "second", event.ignore));
        });
    }
    collector.add(root).expect("add root");

    assert_eq!(names(&collector), vec!["b.txt"]);
    assert_eq!(
        *seen.borrow(),
        vec![
            ("a.txt".to_string(), "first", false),
            ("a.txt".to_string(), "second", true),
            ("b.txt".to_string(), "first", false),
            ("b.txt".to_string(), "second", false),
        ]
    );
}

#[test]
fn observers_are_not_called_for_duplicates_or_prohibited_files() {
    let tmp = temp_root();
    let root = tmp.path();
    write(root.join("a.txt"), b"a").expect("write a.txt");

    let calls = Rc::new(RefCell::new(0usize));
    let mut collector = Collector::default();
    {
        let calls = Rc::clone(&calls);
        collector.on_file_found(move |_| *calls.borrow_mut() += 1);
    }

    collector.add(root).expect("first add");
    collector.add(root.join("a.txt")).expect("second add");
    assert_eq!(*calls.borrow(), 1);
}

#[test]
fn missing_path_is_not_found_and_adds_nothing() {
    let tmp = temp_root();
    let root = tmp.path();
    write(root.join("a.txt"), b"a").expect("write a.txt");

    let mut collector = Collector::default();
    let missing = root.join("missing.txt");
    let err = collector.add(&missing).expect_err("missing path must fail");
    assert!(matches!(err, GatherError::NotFound { ref path } if *path == missing));

    let err = collector
        .add(root.join("nope").join("*.txt"))
        .expect_err("wildcard over missing dir must fail");
    assert!(matches!(err, GatherError::NotFound { .. }));

    assert!(collector.is_empty());
}

#[test]
fn empty_spec_is_invalid_argument() {
    let mut collector = Collector::default();
    let err = collector.add("").expect_err("empty spec must fail");
    assert!(matches!(err, GatherError::InvalidArgument { .. }));
}

#[test]
fn batch_stops_at_first_error_and_keeps_earlier_entries() {
    let tmp = temp_root();
    let root = tmp.path();
    write(root.join("a.txt"), b"a").expect("write a.txt");
    write(root.join("c.txt"), b"c").expect("write c.txt");

    let mut collector = Collector::default();
    let specs = [root.join("a.txt"), root.join("b.txt"), root.join("c.txt")];
    let err = collector.add_all(&specs).expect_err("b.txt is missing");

    assert!(matches!(err, GatherError::NotFound { .. }));
    assert_eq!(names(&collector), vec!["a.txt"]);

    assert!(Collector::with_paths(&specs, CollectorConfig::default()).is_err());
}

#[cfg(unix)]
#[test]
fn ignoring_directory_attributes_enumerates_hidden_directories() {
    let tmp = temp_root();
    let root = tmp.path();
    write(root.join("visible.txt"), b"v").expect("write visible.txt");
    create_dir(root.join(".hidden")).expect("create .hidden");
    write(root.join(".hidden").join("inside.txt"), b"i").expect("write inside.txt");

    let mut collector = Collector::default();
    collector.add(root).expect("add root");
    assert_eq!(names(&collector), vec!["visible.txt"]);

    collector.set_ignore_directory_attributes(true);
    assert!(collector.ignore_directory_attributes());
    assert_eq!(collector.add(root).expect("add root again"), 1);
    assert_eq!(names(&collector), vec!["visible.txt", "inside.txt"]);

    // Naming the hidden directory directly.
    let mut direct = Collector::default();
    direct.add(root.join(".hidden")).expect("add hidden dir");
    assert!(direct.is_empty());
    direct.set_ignore_directory_attributes(true);
    direct.add(root.join(".hidden")).expect("add hidden dir");
    assert_eq!(names(&direct), vec!["inside.txt"]);
}

#[test]
fn output_is_a_snapshot_in_discovery_order() {
    let tmp = temp_root();
    let root = tmp.path();
    write(root.join("b.txt"), b"b").expect("write b.txt");
    write(root.join("a.txt"), b"a").expect("write a.txt");
    create_dir(root.join("sub")).expect("create sub");
    write(root.join("sub").join("c.txt"), b"c").expect("write c.txt");

    let mut collector = Collector::default();
    collector.add(root.join("b.txt")).expect("add b.txt");
    collector.add(root).expect("add root");

    let snapshot = collector.to_vec();
    let snapshot_names: Vec<_> = snapshot.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(snapshot_names, vec!["b.txt", "a.txt", "c.txt"]);

    let canonical_root = root.canonicalize().expect("canonicalize");
    assert!(collector.paths().iter().all(|p| p.starts_with(&canonical_root)));
    assert!(snapshot.iter().all(|e| e.path.is_absolute()));
    assert_eq!(collector.entries()[2].name, "c.txt");
    assert_eq!((&collector).into_iter().count(), 3);

    let entries = collector.into_entries();
    assert_eq!(entries.len(), snapshot.len());
}

#[test]
fn add_file_accepts_a_single_path() {
    let tmp = temp_root();
    let file = tmp.path().join("one.txt");
    write(&file, b"1").expect("write one.txt");

    let mut collector = Collector::default();
    assert!(collector.add_file(&file).expect("add_file"));
    assert!(!collector.add_file(&file).expect("add_file again"));

    let err = collector
        .add_file(&tmp.path().join("missing.txt"))
        .expect_err("missing file must fail");
    assert!(matches!(err, GatherError::NotFound { .. }));
}

#[test]
fn config_changes_only_affect_later_adds() {
    let tmp = temp_root();
    let root = tmp.path();
    create_dir(root.join("a")).expect("create a");
    create_dir(root.join("b")).expect("create b");
    write(root.join("a").join("one.txt"), b"1").expect("write one.txt");
    write(root.join("b").join("two.txt"), b"2").expect("write two.txt");

    let mut collector = Collector::new(config(false));
    collector.add(root).expect("flat add");
    assert!(collector.is_empty());

    collector.set_recurse(true);
    assert!(collector.recurse());
    collector.add(root.join("a")).expect("add a");
    collector.set_config(config(false));
    collector.add(root.join("b")).expect("add b");

    assert_eq!(names(&collector), vec!["one.txt", "two.txt"]);
    assert!(!collector.config().recurse);
}

#[cfg(target_os = "linux")]
#[test]
fn names_differing_in_invalid_utf8_bytes_are_distinct_entries() {
    use std::{ffi::OsStr, os::unix::ffi::OsStrExt};

    let tmp = temp_root();
    let root = tmp.path();
    write(root.join(OsStr::from_bytes(b"a\xff.txt")), b"1").expect("write a\\xff.txt");
    write(root.join(OsStr::from_bytes(b"a\xfe.txt")), b"2").expect("write a\\xfe.txt");

    let mut collector = Collector::default();
    assert_eq!(collector.add(root).expect("add root"), 2);
    assert_eq!(collector.len(), 2);
}

#[cfg(target_os = "linux")]
#[test]
fn non_utf8_dot_names_are_hidden_for_files_and_directories() {
    use std::{ffi::OsStr, os::unix::ffi::OsStrExt};

    let tmp = temp_root();
    let root = tmp.path();
    write(root.join("shown.txt"), b"s").expect("write shown.txt");
    write(root.join(OsStr::from_bytes(b".secret\xff")), b"x").expect("write dotfile");
    let hidden_dir = root.join(OsStr::from_bytes(b".stash\xfe"));
    create_dir(&hidden_dir).expect("create hidden dir");
    write(hidden_dir.join("inner.txt"), b"i").expect("write inner.txt");

    let mut collector = Collector::default();
    collector.add(root).expect("add root");
    assert_eq!(names(&collector), vec!["shown.txt"]);
}

#[cfg(unix)]
#[test]
fn named_socket_is_a_file_candidate_rejected_as_system() {
    let tmp = temp_root();
    let sock = tmp.path().join("daemon.sock");
    let _listener = std::os::unix::net::UnixListener::bind(&sock).expect("bind socket");

    let mut collector = Collector::default();
    assert_eq!(collector.add(&sock).expect("socket is not NotFound"), 0);

    collector.set_prohibited_attributes(FileAttributes::empty());
    assert_eq!(collector.add(&sock).expect("add socket unfiltered"), 1);
    assert!(
        collector.to_vec()[0]
            .attributes
            .contains(FileAttributes::SYSTEM)
    );
}
