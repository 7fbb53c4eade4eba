use std::process::Command;

#[test]
fn fatal_error_is_reported_once() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.toml");

    let out = Command::new(env!("CARGO_BIN_EXE_grokken"))
        .arg("--config")
        .arg(&missing)
        .arg("list")
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1")
        .output()
        .expect("run grokken");

    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert_eq!(stderr.matches("reading config").count(), 1, "{stderr}");
    assert!(out.stdout.is_empty());
}
