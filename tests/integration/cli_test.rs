//! Integration tests for the actmine binary

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

use crate::helpers::fixture_path;

/// Command with the user config directory pointed at a fresh temp dir, so
/// tests never read or write the real config.
fn actmine(config_home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("actmine").expect("binary should be built");
    cmd.env("XDG_CONFIG_HOME", config_home.path())
        .env("HOME", config_home.path())
        .env_remove("RUST_LOG");
    cmd
}

fn stdout_of(cmd: &mut Command) -> String {
    let output = cmd.assert().success().get_output().stdout.clone();
    String::from_utf8(output).expect("stdout should be UTF-8")
}

// ============================================================================
// Help and Version
// ============================================================================

#[test]
fn help_lists_subcommands() {
    let home = TempDir::new().unwrap();
    actmine(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("patterns"))
        .stdout(predicate::str::contains("discover"))
        .stdout(predicate::str::contains("rebuild"))
        .stdout(predicate::str::contains("completions"));
}

#[test]
fn version_starts_with_crate_version() {
    let home = TempDir::new().unwrap();
    actmine(&home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with(format!(
            "actmine {}",
            env!("CARGO_PKG_VERSION")
        )));
}

#[test]
fn missing_log_argument_is_usage_error() {
    let home = TempDir::new().unwrap();
    actmine(&home)
        .arg("discover")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("<LOG>"));
}

// ============================================================================
// Patterns
// ============================================================================

#[test]
fn patterns_of_scenario_log() {
    let home = TempDir::new().unwrap();
    let output = stdout_of(actmine(&home).arg("patterns").arg(fixture_path("scenario.txt")));

    insta::assert_snapshot!(output, @r"
    trace 0 [2, 5) a,b,c
    trace 0 [3, 6) b,c,a
    trace 0 [4, 7) c,a,b
    ");
}

#[test]
fn patterns_as_json() {
    let home = TempDir::new().unwrap();
    let output = stdout_of(
        actmine(&home)
            .args(["patterns", "--json", "--kind", "maximal-tandem-arrays"])
            .arg(fixture_path("scenario.txt")),
    );

    let entries: serde_json::Value = serde_json::from_str(&output).unwrap();
    let entries = entries.as_array().unwrap();
    assert_eq!(entries.len(), 5);
    assert_eq!(entries[3]["length"], 6);
}

#[test]
fn unknown_pattern_kind_fails() {
    let home = TempDir::new().unwrap();
    actmine(&home)
        .args(["patterns", "--kind", "longest-repeats"])
        .arg(fixture_path("scenario.txt"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown pattern kind 'longest-repeats'"));
}

#[test]
fn missing_log_file_fails_with_path() {
    let home = TempDir::new().unwrap();
    actmine(&home)
        .args(["patterns", "does-not-exist.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does-not-exist.txt"));
}

// ============================================================================
// Discover
// ============================================================================

#[test]
fn discover_report() {
    let home = TempDir::new().unwrap();
    let output = stdout_of(actmine(&home).arg("discover").arg(fixture_path("scenario.txt")));

    insta::assert_snapshot!(output, @r"
    Activities:
      a::b::c (Activity_0, 3 classes)
    Instances:
      trace 0: a::b::c [2, 15), a::b::c [17, 19)
    1 traces, 19 events, 3 patterns, 1 activities, 2 instances covering 15 events
    ");
}

#[test]
fn discover_json_has_stats() {
    let home = TempDir::new().unwrap();
    let output = stdout_of(
        actmine(&home)
            .args(["discover", "--json"])
            .arg(fixture_path("scenario.txt")),
    );

    let outcome: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(outcome["stats"]["instances"], 2);
    assert_eq!(outcome["stats"]["covered_events"], 15);
    assert_eq!(outcome["instances"][0][1]["start_pos"], 17);
}

#[test]
fn discover_writes_activity_and_unattached_logs() {
    let home = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let activity_dir = out.path().join("activities");
    let unattached = out.path().join("unattached.txt");

    actmine(&home)
        .args(["discover", "--kind", "maximal-repeats"])
        .args(["--strategy", "from-single-merged-trace"])
        .arg(fixture_path("claims.txt"))
        .arg("--activity-logs")
        .arg(&activity_dir)
        .arg("--unattached")
        .arg(&unattached)
        .assert()
        .success();

    let written: Vec<_> = std::fs::read_dir(&activity_dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|path| {
            let file_name = path.file_name().unwrap().to_string_lossy();
            file_name.starts_with("approve-check-register-Activity_") && file_name.ends_with(".txt")
        })
        .collect();
    assert_eq!(written.len(), 1);

    let activity_log = std::fs::read_to_string(&written[0]).unwrap();
    assert_eq!(
        activity_log,
        "register,check,approve\nregister,check,check,approve\nregister,check,approve\n"
    );
    assert_eq!(
        std::fs::read_to_string(&unattached).unwrap(),
        "notify\n\narchive\n"
    );
}

#[test]
fn discover_writes_long_activity_names_to_bounded_file_names() {
    let home = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let activity_dir = out.path().join("activities");

    let trace: Vec<String> = (0..40).map(|i| format!("class_number_{}", i)).collect();
    let input = format!("{}\n{}\n", trace.join(","), trace.join(","));

    actmine(&home)
        .args(["discover", "-", "--kind", "maximal-repeats"])
        .args(["--strategy", "from-single-merged-trace"])
        .arg("--activity-logs")
        .arg(&activity_dir)
        .write_stdin(input)
        .assert()
        .success();

    let written: Vec<_> = std::fs::read_dir(&activity_dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    assert_eq!(written.len(), 1);
    assert!(written[0].len() <= 255);
    assert!(written[0].starts_with("class_number_0-class_number_1-"));
    assert!(written[0].ends_with("-Activity_0.txt"));

    let content = std::fs::read_to_string(activity_dir.join(&written[0])).unwrap();
    assert_eq!(content.lines().count(), 2);
}

// ============================================================================
// Rebuild
// ============================================================================

#[test]
fn rebuild_to_stdout() {
    let home = TempDir::new().unwrap();
    actmine(&home)
        .arg("rebuild")
        .arg(fixture_path("scenario.txt"))
        .assert()
        .success()
        .stdout("g,d,a::b::c,f,i,a::b::c\n");
}

#[test]
fn rebuild_with_single_undefined_events() {
    let home = TempDir::new().unwrap();
    actmine(&home)
        .args(["rebuild", "--undefined", "insert-as-single-event"])
        .arg(fixture_path("scenario.txt"))
        .assert()
        .success()
        .stdout("UNDEFINED_ACTIVITY,a::b::c,UNDEFINED_ACTIVITY,a::b::c\n");
}

#[test]
fn rebuild_reads_stdin_and_writes_file() {
    let home = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let output = out.path().join("rebuilt.txt");

    actmine(&home)
        .args(["rebuild", "-", "--separator", ";", "--undefined", "DontInsert"])
        .arg("--output")
        .arg(&output)
        .write_stdin("a;b;a;b;c\n")
        .assert()
        .success()
        .stdout("");

    assert_eq!(std::fs::read_to_string(&output).unwrap(), "a::b\n");
}

#[test]
fn rebuild_over_two_levels() {
    let home = TempDir::new().unwrap();
    actmine(&home)
        .args(["rebuild", "-", "--levels", "2"])
        .write_stdin("a,b,a,b,x,a,b,a,b,x\n")
        .assert()
        .success()
        .stdout("a::b::x\n");
}

#[test]
fn rebuild_until_stable() {
    let home = TempDir::new().unwrap();
    actmine(&home)
        .args(["rebuild", "-", "--until-stable"])
        .write_stdin("a,b,a,b,c,d,c,d,a,b,a,b,a,b,c,d,c,d,c,d\n")
        .assert()
        .success()
        .stdout("a::b::c::d\n");
}

#[test]
fn until_stable_conflicts_with_levels() {
    let home = TempDir::new().unwrap();
    actmine(&home)
        .args(["rebuild", "-", "--until-stable", "--levels", "2"])
        .write_stdin("a,b,a,b\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--levels"));
}

#[test]
fn rebuild_json_numbers_levels_from_the_outermost_activity() {
    let home = TempDir::new().unwrap();
    let output = stdout_of(
        actmine(&home)
            .args(["rebuild", "-", "--until-stable", "--naming", "unique-name"])
            .args(["--json", "--reverse-hierarchy"])
            .write_stdin("a,b,a,b,c,d,c,d,a,b,a,b,a,b,c,d,c,d,c,d\n"),
    );
    let log: serde_json::Value = serde_json::from_str(&output).unwrap();

    let outer = &log["traces"][0]["events"][0];
    let inner = &outer["underlying"][0];
    let leaf = &inner["underlying"][0];
    assert_eq!(leaf["name"], "a");
    assert_eq!(leaf["hierarchy"]["0"], outer["name"]);
    assert_eq!(leaf["hierarchy"]["1"], inner["name"]);
}

// ============================================================================
// Loops
// ============================================================================

#[test]
fn loops_report() {
    let home = TempDir::new().unwrap();
    let output = stdout_of(actmine(&home).arg("loops").arg(fixture_path("loops.txt")));

    insta::assert_snapshot!(output, @r"
    trace 0 [1, 4) Loop[a]
    trace 1 [0, 4) Loop[a::b]
    ");
}

// ============================================================================
// Config
// ============================================================================

#[test]
fn config_path_is_under_config_dir() {
    let home = TempDir::new().unwrap();
    let expected = home.path().join("actmine").join("config.toml");

    actmine(&home)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(format!("{}\n", expected.display()));
}

#[test]
fn config_init_then_show() {
    let home = TempDir::new().unwrap();

    actmine(&home).args(["config", "init"]).assert().success();
    actmine(&home)
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
    actmine(&home).args(["config", "init", "--force"]).assert().success();

    actmine(&home)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[patterns]"))
        .stdout(predicate::str::contains("kind = \"PrimitiveTandemArrays\""))
        .stdout(predicate::str::contains("[activities]"));
}

#[test]
fn config_file_drives_discovery() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("custom.toml");
    std::fs::write(
        &config,
        "[patterns]\nkind = \"MaximalRepeats\"\nstrategy = \"FromSingleMergedTrace\"\n",
    )
    .unwrap();

    actmine(&home)
        .arg("--config")
        .arg(&config)
        .arg("rebuild")
        .arg(fixture_path("claims.txt"))
        .assert()
        .success()
        .stdout(
            "approve::check::register,notify\napprove::check::register\napprove::check::register,archive\n",
        );
}

#[test]
fn invalid_config_value_is_reported() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("bad.toml");
    std::fs::write(&config, "[activities]\nnarrowing = \"Sideways\"\n").unwrap();

    actmine(&home)
        .arg("--config")
        .arg(&config)
        .arg("discover")
        .arg(fixture_path("scenario.txt"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Sideways"));
}

// ============================================================================
// Completions
// ============================================================================

#[test]
fn completions_for_bash() {
    let home = TempDir::new().unwrap();
    actmine(&home)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("actmine"));
}
