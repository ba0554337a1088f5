//! CLI smoke tests against the simulator backend

use std::path::PathBuf;
use std::process::{Command, Output};

use ftown_sim::SimFontFile;

fn sample_font(name: &str) -> PathBuf {
    let mut path = std::env::temp_dir();
    path.push(format!("ftown_cli_{}_{}.simf", std::process::id(), name));
    SimFontFile::sample().write(&path).unwrap();
    path
}

fn ftown(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_ftown"))
        .args(args)
        .output()
        .expect("failed to run ftown")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn help_lists_the_subcommands() {
    let output = ftown(&["--help"]);
    assert!(output.status.success());
    let text = stdout(&output);
    for command in ["info", "names", "render"] {
        assert!(text.contains(command), "missing {command} in:\n{text}");
    }
}

#[test]
fn info_prints_json() {
    let font = sample_font("info");
    let output = ftown(&["info", font.to_str().unwrap(), "--json", "--backend", "sim"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let summary: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(summary["family"], "Sim Sans");
    assert_eq!(summary["num_faces"], 2);
    assert!(summary["scalable"].as_bool().unwrap());
    let _ = std::fs::remove_file(font);
}

#[test]
fn info_prints_text() {
    let font = sample_font("info_text");
    let output = ftown(&["info", font.to_str().unwrap(), "--backend", "sim"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("Family:       Sim Sans"));
    let _ = std::fs::remove_file(font);
}

#[test]
fn names_dumps_the_name_table() {
    let font = sample_font("names");
    let output = ftown(&["names", font.to_str().unwrap(), "--backend", "sim"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("Sim Sans Regular"));
    assert!(text.contains("SimSans-Regular"));
    let _ = std::fs::remove_file(font);
}

#[test]
fn render_draws_a_glyph() {
    let font = sample_font("render");
    let output = ftown(&["render", font.to_str().unwrap(), "A", "--size", "20", "--backend", "sim"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let text = stdout(&output);
    assert!(text.lines().count() > 1);
    assert!(text.contains('@'));
    let _ = std::fs::remove_file(font);
}

#[test]
fn render_mono_uses_hashes() {
    let font = sample_font("mono");
    let output = ftown(&["render", font.to_str().unwrap(), "A", "--mono", "--backend", "sim"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains('#'));
    let _ = std::fs::remove_file(font);
}

#[test]
fn missing_font_fails() {
    let output = ftown(&["info", "/nonexistent/font.simf", "--backend", "sim"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("font file not found"));
}

#[test]
fn corrupt_font_fails_with_the_native_error() {
    let mut path = std::env::temp_dir();
    path.push(format!("ftown_cli_{}_corrupt.simf", std::process::id()));
    std::fs::write(&path, b"SIMF{").unwrap();

    let output = ftown(&["info", path.to_str().unwrap(), "--backend", "sim"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid_File_Format"));
    let _ = std::fs::remove_file(path);
}

#[cfg(not(feature = "freetype"))]
#[test]
fn freetype_backend_needs_the_feature() {
    let font = sample_font("feature");
    let output = ftown(&["info", font.to_str().unwrap(), "--backend", "freetype"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("`freetype` feature"));
    let _ = std::fs::remove_file(font);
}
