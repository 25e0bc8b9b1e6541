use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn lyra_cli(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_lyra-cli"))
        .args(args)
        .env("RUST_LOG", "off")
        .output()
        .expect("failed to run lyra-cli")
}

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).expect("failed to write fixture");
    path
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

const NIGHT_CSV: &str = "\
BJD_TDB,Source_AMag_T1,Source_AMag_Err_T1
2459000.1,12.41,0.004
2459000.4,12.93,0.005
";

#[test]
fn label_count_mismatch_exits_before_any_file_is_read() {
    let output = lyra_cli(&[
        "/no/such/night1.csv",
        "/no/such/night2.csv",
        "-l",
        "only-one",
        "--no-plot",
    ]);
    assert_eq!(output.status.code(), Some(2));
    let err = stderr(&output);
    assert!(err.contains("number of labels (1) must match the number of files (2)"));
    // Nothing was loaded, so no per-file error was reported.
    assert!(!err.contains("night1.csv"));
}

#[test]
fn invalid_period_and_figsize_are_validation_errors() {
    let dir = tempfile::tempdir().unwrap();
    let night = write(dir.path(), "night.csv", NIGHT_CSV);
    let night = night.to_str().unwrap();

    let output = lyra_cli(&[night, "-l", "N1", "-p", "0", "--no-plot"]);
    assert_eq!(output.status.code(), Some(2));

    let output = lyra_cli(&[night, "-l", "N1", "--figsize=-10,6", "--no-plot"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("--figsize"));
}

#[test]
fn nothing_processed_exits_with_failure() {
    let dir = tempfile::tempdir().unwrap();
    let no_timestamp = write(dir.path(), "bad.csv", "JD,Source_AMag_T1\n1.0,12.0\n");

    let output = lyra_cli(&[
        "/no/such/night.csv",
        no_timestamp.to_str().unwrap(),
        "-l",
        "missing",
        "bad",
        "--no-plot",
    ]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("none of the 2 files could be processed"));
}

#[test]
fn good_file_is_folded_and_reported() {
    let dir = tempfile::tempdir().unwrap();
    let night = write(dir.path(), "night.csv", NIGHT_CSV);

    let output = lyra_cli(&[
        night.to_str().unwrap(),
        "/no/such/other.csv",
        "-l",
        "Night 1",
        "Other",
        "-p",
        "0.5",
        "--error-bars",
        "--no-plot",
    ]);
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Night 1: 2 rows"));
    assert!(!stdout.contains("Other"));
}
