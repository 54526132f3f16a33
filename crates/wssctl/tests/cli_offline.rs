#![cfg(all(unix, feature = "cli"))]

use std::path::PathBuf;
use std::process::{Command, Output};

fn wssctl(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_wssctl"))
        .env_remove("WSS_DEVICE")
        .env_remove("WSS_TIMEOUT")
        .env_remove("WSS_BAUD")
        .arg("--log-level")
        .arg("error")
        .args(args)
        .output()
        .expect("wssctl should run")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn temp_path(tag: &str) -> PathBuf {
    PathBuf::from(format!(
        "/tmp/wssctl-{tag}-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ))
}

#[test]
fn version_prints_package_version() {
    let output = wssctl(&["version"]);
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn catalog_lists_registers_as_json() {
    let output = wssctl(&["catalog", "--format", "json"]);
    assert_eq!(output.status.code(), Some(0));

    let entries: serde_json::Value =
        serde_json::from_str(stdout(&output).trim()).expect("catalog should be valid JSON");
    let names: Vec<&str> = entries
        .as_array()
        .expect("catalog should be an array")
        .iter()
        .filter_map(|entry| entry["name"].as_str())
        .collect();
    assert!(names.contains(&"vendor_name"));
    assert!(names.contains(&"channel_attenuation"));
}

#[test]
fn encode_prints_vendor_name_request() {
    let output = wssctl(&["encode", "vendor_name", "--format", "pretty"]);
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("DD 01 01 05 02 06 01 00 01 DD 02"));
}

#[test]
fn encode_raw_writes_frame_bytes() {
    let output = wssctl(&["encode", "vendor-name", "--format", "raw"]);
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(
        output.stdout,
        [0xDD, 0x01, 0x01, 0x05, 0x02, 0x06, 0x01, 0x00, 0x01, 0xDD, 0x02]
    );
}

#[test]
fn encode_unknown_register_is_a_usage_error() {
    let output = wssctl(&["encode", "no_such_register"]);
    assert_eq!(output.status.code(), Some(64));
    assert!(stderr(&output).contains("unknown register"));
}

#[test]
fn read_without_device_is_a_usage_error() {
    let output = wssctl(&["read", "vendor_name"]);
    assert_eq!(output.status.code(), Some(64));
    assert!(stderr(&output).contains("--device"));
}

#[test]
fn read_from_missing_device_is_a_transport_error() {
    let path = temp_path("missing");
    let output = wssctl(&[
        "--device",
        path.to_str().expect("utf-8 path"),
        "read",
        "vendor_name",
    ]);
    assert_eq!(output.status.code(), Some(3), "stderr: {}", stderr(&output));
}

#[test]
fn regular_file_is_not_a_serial_device() {
    let path = temp_path("plain");
    std::fs::write(&path, b"").expect("temp file should be writable");

    let output = wssctl(&[
        "--device",
        path.to_str().expect("utf-8 path"),
        "info",
    ]);
    let _ = std::fs::remove_file(&path);

    assert_eq!(output.status.code(), Some(3), "stderr: {}", stderr(&output));
}

#[test]
fn invalid_timeout_is_a_usage_error() {
    let output = wssctl(&["--device", "/dev/null", "--timeout", "soon", "post"]);
    assert_eq!(output.status.code(), Some(64));
}
