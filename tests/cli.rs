use std::fs;
use std::process::Command;
use tempfile::tempdir;

fn hf() -> Command {
    Command::new(env!("CARGO_BIN_EXE_hf"))
}

#[test]
fn malformed_config_line_aborts_startup() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("hf.conf");
    fs::write(&config, "# sites\n:0 .\n:9000\n").unwrap();

    let output = hf().arg("-c").arg(&config).output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("bad config file"), "stderr was: {stderr}");
    assert!(!stderr.contains("listening"), "no server should start: {stderr}");
}

#[test]
fn unreadable_config_aborts_startup() {
    // a directory exists but cannot be read as a file
    let dir = tempdir().unwrap();

    let output = hf().arg("-c").arg(dir.path()).output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("could not read config file"), "stderr was: {stderr}");
}

#[test]
fn taken_address_aborts_the_process() {
    let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let dir = tempdir().unwrap();
    let config = dir.path().join("hf.conf");
    fs::write(
        &config,
        format!("{} {}\n", taken.local_addr().unwrap(), dir.path().display()),
    )
    .unwrap();

    let output = hf().arg("-c").arg(&config).arg("-d").output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("could not listen on"), "stderr was: {stderr}");
}
