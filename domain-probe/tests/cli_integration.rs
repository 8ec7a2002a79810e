// domain-probe/tests/cli_integration.rs

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread;
use tempfile::{NamedTempFile, TempDir};

/// Helper to create a test domains file
fn create_test_domains_file(domains: &[&str]) -> NamedTempFile {
    let file = NamedTempFile::new().expect("Failed to create temp file");
    let content = domains.join("\n");
    fs::write(file.path(), content).expect("Failed to write to temp file");
    file
}

/// Serve a fixed HTTP response forever on a loopback port.
fn spawn_server(status: u16, body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind fixture");
    let addr = listener.local_addr().unwrap().to_string();

    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else { continue };
            let mut buf = [0u8; 2048];
            let _ = stream.read(&mut buf);
            let response = format!(
                "HTTP/1.1 {} Fixture\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            let _ = stream.write_all(response.as_bytes());
        }
    });

    addr
}

/// Command isolated from the developer's config files and DP_* variables.
fn probe_cmd(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("domain-probe").unwrap();
    cmd.current_dir(home.path())
        .env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join(".config"))
        .env_remove("RUST_LOG");
    for key in [
        "DP_CONCURRENCY",
        "DP_TIMEOUT",
        "DP_CONNECT_TIMEOUT",
        "DP_READ_MIN_BYTES",
        "DP_IPV4_ONLY",
        "DP_ANY_STATUS",
        "DP_JSON",
        "DP_CSV",
        "DP_FILE",
        "DP_CONFIG",
    ] {
        cmd.env_remove(key);
    }
    cmd.args(["--scheme", "http", "--connect-timeout", "1s"]);
    cmd
}

#[test]
fn test_help_shows_flags() {
    let mut cmd = Command::cargo_bin("domain-probe").unwrap();
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("--concurrency"))
        .stdout(predicate::str::contains("--timeout"))
        .stdout(predicate::str::contains("--alive-only"))
        .stdout(predicate::str::contains("--output"));
}

#[test]
fn test_missing_file_fails() {
    let home = TempDir::new().unwrap();
    let mut cmd = probe_cmd(&home);
    cmd.arg("/definitely/not/here/domains.txt");

    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_no_input_fails() {
    let home = TempDir::new().unwrap();
    let mut cmd = probe_cmd(&home);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("You must specify a domains file"));
}

#[test]
fn test_empty_file_succeeds() {
    let home = TempDir::new().unwrap();
    let file = create_test_domains_file(&["# nothing to see", ""]);
    let mut cmd = probe_cmd(&home);
    cmd.arg(file.path());

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("0 domains"));
}

#[test]
fn test_reachable_and_unreachable_reported() {
    let home = TempDir::new().unwrap();
    let up = spawn_server(200, "hello from the fixture server");
    let missing = spawn_server(404, "not found");
    let file = create_test_domains_file(&[&up, &missing, "thisdomaindoesnotexist.invalid"]);

    let mut cmd = probe_cmd(&home);
    cmd.arg(file.path());

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("REACHABLE"))
        .stdout(predicate::str::contains("UNREACHABLE"))
        .stdout(predicate::str::contains("1 reachable"))
        .stdout(predicate::str::contains("2 unreachable"));
}

#[test]
fn test_json_output() {
    let home = TempDir::new().unwrap();
    let up = spawn_server(200, "json fixture body");
    let file = create_test_domains_file(&[&up, "bad!name"]);

    let mut cmd = probe_cmd(&home);
    cmd.arg(file.path()).arg("--json");

    let output = cmd.output().unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["summary"]["total"], 2);
    assert_eq!(value["summary"]["reachable"], 1);
    assert_eq!(value["results"][0]["domain"], up.as_str());
    assert_eq!(value["results"][1]["failure"], "invalid_domain");
}

#[test]
fn test_csv_output() {
    let home = TempDir::new().unwrap();
    let up = spawn_server(200, "csv fixture body");
    let file = create_test_domains_file(&[&up]);

    let mut cmd = probe_cmd(&home);
    cmd.arg(file.path()).arg("--csv");

    cmd.assert()
        .success()
        .stdout(predicate::str::starts_with(
            "domain,reachable,status_code,scheme,failure,duration_ms,error",
        ))
        .stdout(predicate::str::contains(format!("{},true,200,http", up)));
}

#[test]
fn test_alive_only_from_stdin() {
    let home = TempDir::new().unwrap();
    let up = spawn_server(200, "alive fixture body");

    let mut cmd = probe_cmd(&home);
    cmd.args(["-", "--alive-only"])
        .write_stdin(format!("{}\nthisdomaindoesnotexist.invalid\n", up));

    cmd.assert().success().stdout(predicate::str::diff(format!("{}\n", up)));
}

#[test]
fn test_output_file_written() {
    let home = TempDir::new().unwrap();
    let up = spawn_server(200, "report fixture body");
    let file = create_test_domains_file(&[&up]);
    let report_path = home.path().join("alive.txt");

    let mut cmd = probe_cmd(&home);
    cmd.arg(file.path())
        .arg("--alive-only")
        .arg("--output")
        .arg(&report_path);

    cmd.assert().success();
    assert_eq!(fs::read_to_string(&report_path).unwrap(), format!("{}\n", up));
}

#[test]
fn test_config_file_sets_format() {
    let home = TempDir::new().unwrap();
    let up = spawn_server(200, "config fixture body");
    let file = create_test_domains_file(&[&up]);
    fs::write(
        home.path().join("domain-probe.toml"),
        "[output]\ndefault_format = \"alive\"\n",
    )
    .unwrap();

    let mut cmd = probe_cmd(&home);
    cmd.arg(file.path());

    cmd.assert().success().stdout(predicate::str::diff(format!("{}\n", up)));
}

#[test]
fn test_invalid_explicit_config_fails() {
    let home = TempDir::new().unwrap();
    let file = create_test_domains_file(&["example.com"]);
    let config = home.path().join("broken.toml");
    fs::write(&config, "[defaults]\nconcurrency = 0\n").unwrap();

    let mut cmd = probe_cmd(&home);
    cmd.arg(file.path()).arg("--config").arg(&config);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load config file"));
}

#[test]
fn test_env_file_fallback() {
    let home = TempDir::new().unwrap();
    let up = spawn_server(200, "env fixture body");
    let file = create_test_domains_file(&[&up]);

    let mut cmd = probe_cmd(&home);
    cmd.env("DP_FILE", file.path()).arg("--alive-only");

    cmd.assert().success().stdout(predicate::str::diff(format!("{}\n", up)));
}

#[test]
fn test_conflicting_formats_rejected() {
    let home = TempDir::new().unwrap();
    let file = create_test_domains_file(&["example.com"]);

    let mut cmd = probe_cmd(&home);
    cmd.arg(file.path()).args(["--json", "--csv"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("multiple output formats"));
}

#[test]
fn test_stream_with_json_rejected() {
    let home = TempDir::new().unwrap();
    let file = create_test_domains_file(&["example.com"]);

    let mut cmd = probe_cmd(&home);
    cmd.arg(file.path()).args(["--stream", "--json"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("--stream"));
}

#[test]
fn test_stream_mode_reports_every_domain() {
    let home = TempDir::new().unwrap();
    let a = spawn_server(200, "stream fixture a");
    let b = spawn_server(200, "stream fixture b");
    let file = create_test_domains_file(&[&a, &b]);

    let mut cmd = probe_cmd(&home);
    cmd.arg(file.path()).arg("--stream");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(a.as_str()))
        .stdout(predicate::str::contains(b.as_str()))
        .stdout(predicate::str::contains("2 reachable"));
}

#[test]
fn test_invalid_concurrency_rejected() {
    let home = TempDir::new().unwrap();
    let file = create_test_domains_file(&["example.com"]);

    let mut cmd = probe_cmd(&home);
    cmd.arg(file.path()).args(["-c", "0"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Concurrency must be between 1 and 500"));
}

#[test]
fn test_overflowing_timeout_rejected() {
    let home = TempDir::new().unwrap();
    let file = create_test_domains_file(&["example.com"]);

    let mut cmd = probe_cmd(&home);
    cmd.arg(file.path()).args(["--timeout", "1e20"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("invalid duration"));
}
