// Drives the compiled binary through a PTY: real event loop, real crossterm input.
//
// Requires a TTY (expectrl allocates a pseudo terminal), so it is Unix-only and
// ignored by default. Run with `cargo test --test integration_min_session -- --ignored`.

#![cfg(unix)]

use std::process::Command;
use std::time::Duration;

use expectrl::{Eof, Session};

#[test]
#[ignore]
fn minimal_session_pauses_and_exits() -> Result<(), Box<dyn std::error::Error>> {
    // keep config and scoreboard writes away from the real home directory
    let home = tempfile::tempdir()?;

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin("merrymind"));
    cmd.args(["memory", "--seed", "7"]).env("HOME", home.path());

    let mut p = Session::spawn(cmd)?;
    std::thread::sleep(Duration::from_millis(200));

    // pause then resume
    p.send("p")?;
    std::thread::sleep(Duration::from_millis(100));
    p.send("p")?;
    std::thread::sleep(Duration::from_millis(100));

    p.send("\x1b")?; // ESC
    p.expect(Eof)?;
    Ok(())
}
