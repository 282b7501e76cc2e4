use std::process::Command;

fn hex_defence() -> Command {
    Command::new(env!("CARGO_BIN_EXE_hex-defence"))
}

#[test]
fn demo_scenario_runs_to_victory() {
    let output = hex_defence()
        .args(["--tick-rate", "20", "--log-level", "warn"])
        .output()
        .expect("failed to run the hex-defence binary");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(stdout.contains("Game won"), "{stdout}");
    assert!(stdout.contains("Waves: 2 / 2 (2 survived)"), "{stdout}");
    assert!(stdout.contains("Enemies spawned: 12"), "{stdout}");
}

#[test]
fn missing_scenario_file_fails() {
    let output = hex_defence()
        .args(["no-such-scenario.toml", "--log-level", "off"])
        .output()
        .expect("failed to run the hex-defence binary");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to read scenario"), "{stderr}");
}
