//! CLI integration tests using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// A command isolated from the user's home, config and progress file.
fn latindrill(dir: &TempDir) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("latindrill").unwrap();
    cmd.current_dir(dir.path())
        .env("HOME", dir.path())
        .env("LATINDRILL_SAVE_PATH", dir.path().join("progress.json"))
        .env_remove("LATINDRILL_SEED")
        .env_remove("RUST_LOG");
    cmd
}

fn stats_json(dir: &TempDir) -> serde_json::Value {
    let output = latindrill(dir).args(["stats", "--json"]).output().unwrap();
    assert!(output.status.success());
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn autoplay_reports_rounds() {
    let dir = TempDir::new().unwrap();
    latindrill(&dir)
        .args(["autoplay", "--rounds", "2", "--accuracy", "1", "--no-save"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Round 1: matching on normal, round complete"))
        .stdout(predicate::str::contains("Round 2:"))
        .stdout(predicate::str::contains("Total XP"));

    assert!(!dir.path().join("progress.json").exists());
}

#[test]
fn autoplay_saves_progress_for_stats() {
    let dir = TempDir::new().unwrap();
    latindrill(&dir)
        .args(["autoplay", "--mode", "construct", "--difficulty", "hard", "--accuracy", "1"])
        .assert()
        .success();

    let stats = stats_json(&dir);
    assert!(stats["best"]["totalXP"].as_u64().unwrap() > 0);
    assert_eq!(stats["best"]["bestStreak"], 1);
    assert_eq!(stats["player"]["difficulty"], "hard");
    assert_eq!(stats["version"], 1);

    latindrill(&dir)
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("Laurel Wreath"))
        .stdout(predicate::str::contains("Discipulus"));
}

#[test]
fn autoplay_json_is_deterministic() {
    let dir = TempDir::new().unwrap();
    let run = || {
        let output = latindrill(&dir)
            .args(["autoplay", "--rounds", "2", "--seed", "21", "--no-save", "--json"])
            .output()
            .unwrap();
        assert!(output.status.success());
        serde_json::from_slice::<serde_json::Value>(&output.stdout).unwrap()
    };

    let first = run();
    assert_eq!(first.as_array().map(Vec::len), Some(2));
    assert_eq!(first[0]["summary"]["mode"], "matching");
    assert_eq!(first, run());
}

#[test]
fn autoplay_rejects_bad_accuracy() {
    let dir = TempDir::new().unwrap();
    latindrill(&dir)
        .args(["autoplay", "--accuracy", "1.5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("accuracy"));
}

#[test]
fn stats_without_progress_shows_defaults() {
    let dir = TempDir::new().unwrap();
    let stats = stats_json(&dir);
    assert_eq!(stats["best"]["totalXP"], 0);
    assert_eq!(stats["settings"]["sound"], true);
}

#[test]
fn lexicon_lists_builtin_entries() {
    let dir = TempDir::new().unwrap();
    latindrill(&dir)
        .arg("lexicon")
        .assert()
        .success()
        .stdout(predicate::str::contains("puellam"))
        .stdout(predicate::str::contains("regit"))
        .stdout(predicate::str::contains("magna"));
}

#[test]
fn lexicon_check_reports_warnings() {
    let dir = TempDir::new().unwrap();
    latindrill(&dir)
        .args(["lexicon", "--check"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[fortis] WARNING"))
        .stdout(predicate::str::contains("2 warning(s) found"));
}

#[test]
fn lexicon_check_rejects_unplayable_file() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("tiny.toml"),
        r#"
[[nouns]]
lemma = "puella"
declension = 1
gender = "f"
gloss = "girl"
nom = "puella"
acc = "puellam"
"#,
    )
    .unwrap();

    latindrill(&dir)
        .args(["lexicon", "--check", "--file", "tiny.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("lexicon cannot produce challenges"));
}

#[test]
fn init_creates_files_once() {
    let dir = TempDir::new().unwrap();
    latindrill(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created latindrill.toml"))
        .stdout(predicate::str::contains("Created lexicon-example.toml"));

    latindrill(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists, skipping"));

    latindrill(&dir)
        .args(["lexicon", "--check", "--file", "lexicon-example.toml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Lexicon valid."));
}

#[test]
fn reset_requires_confirmation() {
    let dir = TempDir::new().unwrap();
    latindrill(&dir)
        .args(["autoplay", "--accuracy", "1"])
        .assert()
        .success();
    assert!(stats_json(&dir)["best"]["totalXP"].as_u64().unwrap() > 0);

    latindrill(&dir)
        .arg("reset")
        .assert()
        .success()
        .stdout(predicate::str::contains("--yes"));
    assert!(stats_json(&dir)["best"]["totalXP"].as_u64().unwrap() > 0);

    latindrill(&dir)
        .args(["reset", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Progress reset."));
    assert_eq!(stats_json(&dir)["best"]["totalXP"], 0);
}

#[test]
fn missing_config_is_an_error() {
    let dir = TempDir::new().unwrap();
    latindrill(&dir)
        .args(["--config", "nope.toml", "stats"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("config file not found"));
}

#[test]
fn play_quits_on_command() {
    let dir = TempDir::new().unwrap();
    latindrill(&dir)
        .args(["play", "--seed", "5", "--mute"])
        .write_stdin("h\nq\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Salve, Discipulus!"))
        .stdout(predicate::str::contains("Match each Latin word"))
        .stdout(predicate::str::contains("Vale!"));
}

#[test]
fn play_construction_shows_tiles() {
    let dir = TempDir::new().unwrap();
    latindrill(&dir)
        .args(["play", "--mode", "construct", "--difficulty", "hard"])
        .write_stdin("99\nq\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Translate:"))
        .stdout(predicate::str::contains("Tiles:"))
        .stdout(predicate::str::contains("No tile 99."));
}
