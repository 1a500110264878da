use assert_cmd::Command;
use candle_core::{DType, Device};
use candle_nn::{VarBuilder, VarMap};
use deepiep_core::{CharIndex, ModelConfig, RnnArchitecture};
use deepiep_models::{save_artifact, RnnRegressor};
use deepiep_test_data::TestFile;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write_model(dir: &Path) -> PathBuf {
    let config = ModelConfig::new(
        CharIndex::standard(),
        100,
        RnnArchitecture {
            units: vec![8],
            dense: vec![4],
            ..Default::default()
        },
    );
    let varmap = VarMap::new();
    let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
    RnnRegressor::new(&config, vb).unwrap();
    let base = dir.join("default");
    save_artifact(&base, &config, &varmap).unwrap();
    base
}

fn deepiep() -> Command {
    let mut cmd = Command::cargo_bin("deepiep").unwrap();
    cmd.env_remove("DEEPIEP_MODEL").arg("--cpu");
    cmd
}

fn one_decimal(value: &str) -> bool {
    value.parse::<f32>().is_ok() && value.split_once('.').map(|(_, d)| d.len()) == Some(1)
}

#[test]
fn test_usage_hint_without_input() {
    let output = deepiep().output().unwrap();
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "-h for usage\n");
}

#[test]
fn test_predict_sequences() {
    let dir = TempDir::new().unwrap();
    let base = write_model(dir.path());

    let output = deepiep()
        .arg("--model")
        .arg(&base)
        .args(["-s", "MKTAYIAKQR", "DDDDEEEE"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{output:?}");

    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "");
    for (line, seq) in lines[1..].iter().zip(["MKTAYIAKQR", "DDDDEEEE"]) {
        let (printed, value) = line.split_once(' ').unwrap();
        assert_eq!(printed, seq);
        assert!(one_decimal(value), "{line}");
    }
}

#[test]
fn test_model_from_env_and_cyscam() {
    let dir = TempDir::new().unwrap();
    let base = write_model(dir.path());

    let cyscam = deepiep()
        .env("DEEPIEP_MODEL", &base)
        .args(["--cyscam", "-s", "ACDC"])
        .output()
        .unwrap();
    assert!(cyscam.status.success(), "{cyscam:?}");
    let explicit = deepiep()
        .env("DEEPIEP_MODEL", &base)
        .args(["-s", "AZDZ"])
        .output()
        .unwrap();
    let value = |stdout: &[u8]| {
        String::from_utf8_lossy(stdout)
            .split_whitespace()
            .last()
            .unwrap()
            .to_string()
    };
    assert_eq!(value(&cyscam.stdout), value(&explicit.stdout));
}

#[test]
fn test_predict_csv_in_place() {
    let dir = TempDir::new().unwrap();
    let base = write_model(dir.path());
    let (csv_file, _temp) = TestFile::sequences_01().create_temp().unwrap();

    deepiep()
        .arg("--model")
        .arg(&base)
        .args(["-f", csv_file.as_str()])
        .assert()
        .success();

    let text = std::fs::read_to_string(&csv_file).unwrap();
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("Name,Sequences,DeepIEP"));
    let rows: Vec<&str> = lines.collect();
    assert_eq!(rows.len(), 4);
    for row in rows {
        let value = row.rsplit(',').next().unwrap();
        assert!(one_decimal(value), "{row}");
    }

    // running again overwrites the column
    deepiep()
        .arg("--model")
        .arg(&base)
        .args(["-f", csv_file.as_str(), "--full-precision"])
        .assert()
        .success();
    let text = std::fs::read_to_string(&csv_file).unwrap();
    assert_eq!(text.lines().next(), Some("Name,Sequences,DeepIEP"));
    assert_eq!(text.lines().count(), 5);
}

#[test]
fn test_missing_model_fails() {
    let dir = TempDir::new().unwrap();
    let output = deepiep()
        .arg("--model")
        .arg(dir.path().join("absent"))
        .args(["-s", "ACDE"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to load model"), "{stderr}");
}

#[test]
fn test_bad_csv_fails_without_rewriting() {
    let dir = TempDir::new().unwrap();
    let base = write_model(dir.path());
    let (csv_file, _temp) = TestFile::sequences_bad_01().create_temp().unwrap();

    let output = deepiep()
        .arg("--model")
        .arg(&base)
        .args(["-f", csv_file.as_str()])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown residue 'a'"), "{stderr}");
    assert_eq!(
        std::fs::read(&csv_file).unwrap(),
        TestFile::sequences_bad_01().bytes()
    );
}
