use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::path::PathBuf;

fn fixture_path(parts: &[&str]) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures");
    for part in parts {
        path = path.join(part);
    }
    path
}

#[test]
fn render_clean_parse_prints_tree() {
    let mut cmd = cargo_bin_cmd!("pegview");
    cmd.arg("render")
        .arg(fixture_path(&["attempts", "sum_ok.json"]));

    cmd.assert()
        .success()
        .stdout(
            predicate::str::contains("sum\n├─num \"1\"")
                .and(predicate::str::contains("Error").not())
                .and(predicate::str::contains("failed attempts").not()),
        );
}

#[test]
fn render_failed_parse_points_at_token() {
    let mut cmd = cargo_bin_cmd!("pegview");
    cmd.arg("render")
        .arg(fixture_path(&["attempts", "sum_failed.json"]));

    let output_pred = predicate::str::contains("Error at line 1, column 3: rule 'num' failed")
        .and(predicate::str::contains("1 | 1+x2\n  |   ^^"))
        .and(predicate::str::contains("note:").not());
    cmd.assert().success().stdout(output_pred);
}

#[test]
fn render_json_reports_status() {
    let mut cmd = cargo_bin_cmd!("pegview");
    cmd.arg("render")
        .arg(fixture_path(&["attempts", "sum_trailing.json"]))
        .arg("--format")
        .arg("json");

    cmd.assert().success().stdout(
        predicate::str::contains("\"status\": \"parse-failed\"")
            .and(predicate::str::contains("\"kind\": \"trailing-input\"")),
    );
}

#[test]
fn render_compile_error() {
    let mut cmd = cargo_bin_cmd!("pegview");
    cmd.arg("render")
        .arg(fixture_path(&["attempts", "compile_error.json"]));

    cmd.assert().success().stdout(
        predicate::str::contains("Grammar failed to compile:")
            .and(predicate::str::contains("1 | sum = num (op num)*\n  | ^^^")),
    );
}

#[test]
fn compile_error_notes_unprojected_position() {
    let mut cmd = cargo_bin_cmd!("pegview");
    cmd.arg("render")
        .arg(fixture_path(&["attempts", "compile_error.json"]));

    cmd.assert().success().stdout(predicate::str::contains(
        "note: 1 of 2 located span(s) have no extent on the text (a single position, or past its end) and are not projected as 'grammar-error' highlights",
    ));
}

#[test]
fn malformed_trace_exits_with_error() {
    let mut cmd = cargo_bin_cmd!("pegview");
    cmd.arg("render")
        .arg(fixture_path(&["attempts", "truncated.json"]));

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("not a multiple of 4"));
}

#[test]
fn trace_lists_failed_rules() {
    let mut cmd = cargo_bin_cmd!("pegview");
    cmd.arg("trace")
        .arg(fixture_path(&["attempts", "sum_failed.json"]));

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Failed rules: num, sum"));
}

#[test]
fn fixture_directory_listing() {
    let mut cmd = cargo_bin_cmd!("pegview");
    cmd.arg("fixture").arg(fixture_path(&["examples"]));

    cmd.assert().success().stdout(
        predicate::str::contains("Arithmetic *")
            .and(predicate::str::contains("CSV\n    grammar: 3 lines")),
    );
}

#[test]
fn config_file_changes_tree_style() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("pegview.toml");
    std::fs::write(&config, "[tree]\nstyle = \"bars\"\n").unwrap();

    let mut cmd = cargo_bin_cmd!("pegview");
    cmd.arg("render")
        .arg(fixture_path(&["attempts", "sum_ok.json"]))
        .arg("--config")
        .arg(&config);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("│ num \"1\""));
}

#[test]
fn tree_style_flag_selects_bars() {
    let mut cmd = cargo_bin_cmd!("pegview");
    cmd.arg("render")
        .arg(fixture_path(&["attempts", "sum_ok.json"]))
        .arg("--tree-style")
        .arg("bars");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("sum\n│ num \"1\""));
}

#[test]
fn tree_style_flag_beats_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("pegview.toml");
    std::fs::write(&config, "[tree]\nstyle = \"bars\"\n").unwrap();

    let mut cmd = cargo_bin_cmd!("pegview");
    cmd.arg("render")
        .arg(fixture_path(&["attempts", "sum_ok.json"]))
        .arg("--config")
        .arg(&config)
        .arg("--tree-style")
        .arg("connectors");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("├─num \"1\"").and(predicate::str::contains("│ num").not()));
}

#[test]
fn unknown_tree_style_is_rejected() {
    let mut cmd = cargo_bin_cmd!("pegview");
    cmd.arg("render")
        .arg(fixture_path(&["attempts", "sum_ok.json"]))
        .arg("--tree-style")
        .arg("zigzag");

    cmd.assert().failure();
}
