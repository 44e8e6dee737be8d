//! Smoke tests for the compiled binary.
use std::process::{Command, Stdio};
use std::time::Duration;
use wait_timeout::ChildExt;

const TIMEOUT: Duration = Duration::from_secs(10);

fn run(args: &[&str]) -> (Option<i32>, String, String) {
    let mut child = Command::new(env!("CARGO_BIN_EXE_originscan"))
        .args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("binary should start");

    let status = match child.wait_timeout(TIMEOUT).expect("waiting on child") {
        Some(status) => status,
        None => {
            child.kill().unwrap();
            panic!("originscan {args:?} did not exit within {TIMEOUT:?}");
        }
    };

    let output = child.wait_with_output().expect("collecting output");
    (
        status.code(),
        String::from_utf8_lossy(&output.stdout).into_owned(),
        String::from_utf8_lossy(&output.stderr).into_owned(),
    )
}

#[test]
fn help_lists_limit_option() {
    let (code, stdout, _) = run(&["--help"]);

    assert_eq!(code, Some(0));
    assert!(stdout.contains("--limit"));
    assert!(stdout.contains("--region"));
    assert!(stdout.contains("--format"));
}

#[test]
fn version_matches_manifest() {
    let (code, stdout, _) = run(&["--version"]);

    assert_eq!(code, Some(0));
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn invalid_region_is_rejected() {
    let (code, _, stderr) = run(&["--region", "Atlantis"]);

    assert_eq!(code, Some(2));
    assert!(stderr.contains("two-letter country code"));
}

fn temp_file(name: &str, content: &str) -> std::path::PathBuf {
    let path = std::env::temp_dir().join(format!("originscan-{}-{name}", std::process::id()));
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn bad_region_in_config_file_aborts() {
    let config = temp_file("bad-region.toml", "region = \"Atlantis\"\n");

    let (code, _, stderr) = run(&["--config-path", config.to_str().unwrap()]);
    let _ = std::fs::remove_file(&config);

    assert_eq!(code, Some(1));
    assert!(stderr.contains("Invalid region 'Atlantis'"));
    assert!(stderr.contains("Aborting scan."));
}

#[test]
fn empty_region_is_reported_in_machine_formats() {
    let dataset = temp_file(
        "dataset.json",
        r#"[{"name": "Alpha University", "domains": ["alpha.edu"], "alpha_two_code": "US"}]"#,
    );
    let path = dataset.to_str().unwrap().to_owned();

    for format in ["json", "greppable"] {
        let (code, stdout, stderr) = run(&[
            "--no-config",
            "--region",
            "ZZ",
            "--dataset",
            &path,
            "--format",
            format,
        ]);
        // Hosts without IPv4 egress stop at the connectivity check.
        if stderr.contains("IPv4 network stack") {
            continue;
        }

        assert_eq!(code, Some(0), "{format}: {stderr}");
        assert!(stdout.is_empty(), "{format} wrote to stdout: {stdout}");
        assert!(
            stderr.contains("No universities found for region: ZZ"),
            "{format}: {stderr}"
        );
    }
    let _ = std::fs::remove_file(&dataset);
}
