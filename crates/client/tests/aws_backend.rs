//! Runs against a fake `aws` executable.
#![cfg(unix)]

use std::fs;

use client::{ClientError, ExitCode, HasExitCode, TransferConfig, TransferRequest, UploadSource, run_with_aws};
use engine::RunContext;
use test_support::{FileTree, fake_aws};

/// Points the fake CLI at a bucket directory via a wrapper script so the
/// test does not depend on process-wide environment variables.
fn fake_cli(dir: &std::path::Path, store: &std::path::Path) -> std::path::PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let inner = fake_aws(dir).expect("fake aws");
    let wrapper = dir.join("aws-wrapper");
    fs::write(
        &wrapper,
        format!(
            "#!/bin/sh\nFAKE_S3_ROOT='{}' exec '{}' \"$@\"\n",
            store.display(),
            inner.display()
        ),
    )
    .expect("write wrapper");
    fs::set_permissions(&wrapper, fs::Permissions::from_mode(0o755)).expect("chmod");
    wrapper
}

#[test]
fn upload_then_download_round_trip() {
    let bin = tempfile::tempdir().expect("bin");
    let store = tempfile::tempdir().expect("store");
    fs::create_dir(store.path().join("bucket")).expect("bucket");
    let program = fake_cli(bin.path(), store.path());

    let source = tempfile::tempdir().expect("source");
    let mut tree = FileTree::new();
    tree.text_file("a.txt", "alpha").text_file("sub/b.txt", "beta");
    tree.create_in(source.path()).expect("tree");

    let upload = TransferConfig::builder(TransferRequest::Upload {
        source: UploadSource::Directory(source.path().to_path_buf()),
        bucket: "bucket".to_owned(),
        prefix: "backup".to_owned(),
    })
    .program(program.clone().into_os_string())
    .build()
    .expect("config");
    let summary = run_with_aws(&upload, &RunContext::default()).expect("upload");
    assert_eq!(summary.succeeded, 2, "{summary:?}");
    assert_eq!(
        fs::read_to_string(store.path().join("bucket/backup/sub/b.txt")).expect("stored"),
        "beta"
    );

    let out = tempfile::tempdir().expect("out");
    let download = TransferConfig::builder(TransferRequest::Download {
        bucket: "bucket".to_owned(),
        prefix: "backup".to_owned(),
        destination: out.path().to_path_buf(),
    })
    .program(program.into_os_string())
    .build()
    .expect("config");
    let summary = run_with_aws(&download, &RunContext::default()).expect("download");
    assert_eq!(summary.succeeded, 2, "{summary:?}");
    assert_eq!(
        fs::read_to_string(out.path().join("sub/b.txt")).expect("downloaded"),
        "beta"
    );
    assert_eq!(summary.exit_code(), ExitCode::Ok);
}

#[test]
fn missing_cli_fails_the_probe() {
    let dir = tempfile::tempdir().expect("dir");
    fs::write(dir.path().join("a.txt"), "a").expect("write");
    let config = TransferConfig::builder(TransferRequest::Upload {
        source: UploadSource::Directory(dir.path().to_path_buf()),
        bucket: "bucket".to_owned(),
        prefix: String::new(),
    })
    .program(dir.path().join("no-such-aws").into_os_string())
    .build()
    .expect("config");

    let error = run_with_aws(&config, &RunContext::default()).expect_err("probe");
    assert!(matches!(error, ClientError::Probe { .. }));
    assert_eq!(error.exit_code(), ExitCode::Setup);
}

#[test]
fn dry_run_upload_needs_no_cli() {
    let dir = tempfile::tempdir().expect("dir");
    fs::write(dir.path().join("a.txt"), "a").expect("write");
    let config = TransferConfig::builder(TransferRequest::Upload {
        source: UploadSource::Directory(dir.path().to_path_buf()),
        bucket: "bucket".to_owned(),
        prefix: String::new(),
    })
    .program(dir.path().join("no-such-aws").into_os_string())
    .dry_run(true)
    .build()
    .expect("config");

    let summary = run_with_aws(&config, &RunContext::default()).expect("dry run");
    assert_eq!(summary.succeeded, 1);
}
