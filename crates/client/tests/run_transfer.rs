//! Orchestration tests driven by the scripted transport and fake lister.

use std::path::PathBuf;
use std::sync::Arc;

use client::{
    ClientError, ExitCode, HasExitCode, TransferConfig, TransferRequest, UploadSource,
    run_transfer,
};
use engine::{ErrorClass, RunContext};
use test_support::{FakeLister, FileTree, ScriptedTransport, Step};

fn tree(files: &[(&str, &str)]) -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut tree = FileTree::new();
    for (path, content) in files {
        tree.text_file(path, content);
    }
    tree.create_in(dir.path()).expect("tree");
    dir
}

fn upload(root: PathBuf) -> TransferRequest {
    TransferRequest::Upload {
        source: UploadSource::Directory(root),
        bucket: "bucket".to_owned(),
        prefix: "backup".to_owned(),
    }
}

fn unused_lister() -> FakeLister {
    FakeLister::failing("lister should not be used for uploads")
}

#[test]
fn upload_with_include_filter() {
    let dir = tree(&[("a.txt", "a"), ("b.log", "b"), ("sub/c.txt", "c")]);
    let config = TransferConfig::builder(upload(dir.path().to_path_buf()))
        .includes(vec!["*.txt".to_owned()])
        .build()
        .expect("config");
    let transport = Arc::new(ScriptedTransport::new());

    let summary = run_transfer(&config, Arc::clone(&transport), &unused_lister(), &RunContext::default())
        .expect("run");

    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.exit_code(), ExitCode::Ok);
    let mut destinations: Vec<String> = transport
        .calls()
        .into_iter()
        .map(|call| call.destination.to_string())
        .collect();
    destinations.sort();
    assert_eq!(
        destinations,
        ["s3://bucket/backup/a.txt", "s3://bucket/backup/sub/c.txt"]
    );
}

#[test]
fn excluded_directory_is_pruned() {
    let dir = tree(&[("keep.txt", "k"), ("cache/x.txt", "x"), ("cache/deep/y.txt", "y")]);
    let config = TransferConfig::builder(upload(dir.path().to_path_buf()))
        .excludes(vec!["cache/".to_owned()])
        .build()
        .expect("config");
    let transport = Arc::new(ScriptedTransport::new());

    let summary = run_transfer(&config, Arc::clone(&transport), &unused_lister(), &RunContext::default())
        .expect("run");
    assert_eq!(summary.total, 1);
    assert_eq!(transport.calls_for("keep.txt"), 1);
}

#[test]
fn permission_denied_yields_partial_transfer() {
    let dir = tree(&[("ok.txt", "1"), ("denied.txt", "2")]);
    let config = TransferConfig::builder(upload(dir.path().to_path_buf()))
        .build()
        .expect("config");
    let transport = Arc::new(ScriptedTransport::new().with_script("denied.txt", [Step::permanent()]));

    let summary = run_transfer(&config, Arc::clone(&transport), &unused_lister(), &RunContext::default())
        .expect("run");

    assert_eq!(summary.exit_code(), ExitCode::PartialTransfer);
    assert_eq!(summary.failed, 1);
    let failure = &summary.failures[0];
    assert_eq!(failure.relative, "denied.txt");
    assert_eq!(failure.attempts, 1);
    assert_eq!(failure.error.class(), ErrorClass::Permanent);
    assert_eq!(transport.calls_for("denied.txt"), 1);
}

#[test]
fn missing_source_is_a_setup_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = TransferConfig::builder(upload(dir.path().join("nope")))
        .build()
        .expect("config");
    let error = run_transfer(&config, ScriptedTransport::new(), &unused_lister(), &RunContext::default())
        .expect_err("missing root");
    assert!(matches!(error, ClientError::Enumeration(_)));
    assert_eq!(error.exit_code(), ExitCode::Setup);
}

#[test]
fn invalid_pattern_is_a_setup_error() {
    let dir = tree(&[("a.txt", "a")]);
    let config = TransferConfig::builder(upload(dir.path().to_path_buf()))
        .includes(vec!["[unclosed".to_owned()])
        .build()
        .expect("config");
    let error = run_transfer(&config, ScriptedTransport::new(), &unused_lister(), &RunContext::default())
        .expect_err("bad glob");
    assert!(matches!(error, ClientError::Filter(_)));
}

#[test]
fn empty_match_set_succeeds_without_calls() {
    let dir = tree(&[("a.log", "a")]);
    let config = TransferConfig::builder(upload(dir.path().to_path_buf()))
        .includes(vec!["*.txt".to_owned()])
        .build()
        .expect("config");
    let transport = Arc::new(ScriptedTransport::new());
    let summary = run_transfer(&config, Arc::clone(&transport), &unused_lister(), &RunContext::default())
        .expect("run");
    assert_eq!(summary.total, 0);
    assert_eq!(transport.call_count(), 0);
    assert_eq!(summary.exit_code(), ExitCode::Ok);
}

#[test]
fn explicit_files_are_keyed_by_name() {
    let dir = tree(&[("nested/one.csv", "1"), ("two.csv", "2")]);
    let request = TransferRequest::Upload {
        source: UploadSource::Files(vec![
            dir.path().join("nested/one.csv"),
            dir.path().join("two.csv"),
            dir.path().join("missing.csv"),
        ]),
        bucket: "bucket".to_owned(),
        prefix: String::new(),
    };
    let config = TransferConfig::builder(request).build().expect("config");
    let transport = Arc::new(ScriptedTransport::new());
    let summary = run_transfer(&config, Arc::clone(&transport), &unused_lister(), &RunContext::default())
        .expect("run");
    assert_eq!(summary.succeeded, 2);
    assert_eq!(transport.calls_for("s3://bucket/one.csv"), 1);
    assert_eq!(transport.calls_for("s3://bucket/two.csv"), 1);
}

#[test]
fn download_maps_keys_below_destination() {
    let out = tempfile::tempdir().expect("tempdir");
    let request = TransferRequest::Download {
        bucket: "bucket".to_owned(),
        prefix: "data".to_owned(),
        destination: out.path().to_path_buf(),
    };
    let config = TransferConfig::builder(request).build().expect("config");
    let lister = FakeLister::new([("data/", 0), ("data/a.bin", 4), ("data/x/b.bin", 8)]);
    let transport = Arc::new(ScriptedTransport::new());

    let summary = run_transfer(&config, Arc::clone(&transport), &lister, &RunContext::default())
        .expect("run");

    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.bytes_transferred, 12);
    let expected = out.path().join("x").join("b.bin");
    assert!(
        transport
            .calls()
            .iter()
            .any(|call| call.destination.as_local() == Some(expected.as_path()))
    );
}

#[test]
fn cancelled_context_skips_everything() {
    let dir = tree(&[("a.txt", "a"), ("b.txt", "b")]);
    let config = TransferConfig::builder(upload(dir.path().to_path_buf()))
        .build()
        .expect("config");
    let context = RunContext::default();
    context.cancellation().cancel();
    let transport = Arc::new(ScriptedTransport::new());

    let summary = run_transfer(&config, Arc::clone(&transport), &unused_lister(), &context)
        .expect("run");
    assert!(summary.cancelled);
    assert_eq!(summary.skipped, 2);
    assert_eq!(transport.call_count(), 0);
    assert_eq!(summary.exit_code(), ExitCode::PartialTransfer);
}

#[test]
fn unsafe_download_keys_are_counted_and_fail_the_run() {
    let out = tempfile::tempdir().expect("tempdir");
    let request = TransferRequest::Download {
        bucket: "bucket".to_owned(),
        prefix: "data".to_owned(),
        destination: out.path().to_path_buf(),
    };
    let config = TransferConfig::builder(request).build().expect("config");
    let lister = FakeLister::new([("data/a.bin", 4), ("data/a//b.bin", 8)]);
    let transport = Arc::new(ScriptedTransport::new());

    let summary = run_transfer(&config, Arc::clone(&transport), &lister, &RunContext::default())
        .expect("run");

    assert_eq!(summary.total, 1);
    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.rejected, 1);
    assert_eq!(transport.call_count(), 1);
    assert_eq!(summary.exit_code(), ExitCode::PartialTransfer);
}
