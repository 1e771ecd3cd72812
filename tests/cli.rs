use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;

const FOX: &str = "The quick brown fox jumps over the lazy dog\n";

fn restwrap() -> Command {
    let mut cmd = cargo_bin_cmd!("restwrap");
    cmd.env_remove("RESTWRAP_WIDTH").env_remove("RUST_LOG");
    cmd
}

#[test]
fn wraps_to_positional_width() {
    restwrap()
        .arg("20")
        .write_stdin(FOX)
        .assert()
        .success()
        .stdout("The quick brown\nfox jumps over the\nlazy dog\n");
}

#[test]
fn default_width_keeps_short_lines() {
    restwrap().write_stdin(FOX).assert().success().stdout(FOX);
}

#[test]
fn width_from_environment() {
    restwrap()
        .env("RESTWRAP_WIDTH", "20")
        .write_stdin(FOX)
        .assert()
        .success()
        .stdout("The quick brown\nfox jumps over the\nlazy dog\n");
}

#[test]
fn line_range_leaves_other_lines_alone() {
    let long = "untouched line that is much longer than twenty\n";
    let input = format!(
        "{long}{long}alpha beta\ngamma delta\nepsilon zeta eta theta\n{}",
        long.repeat(5)
    );
    let expected = format!(
        "{long}{long}alpha beta gamma\ndelta epsilon zeta\neta theta\n{}",
        long.repeat(5)
    );
    restwrap()
        .args(["20", "--lines", "3", "5"])
        .write_stdin(input)
        .assert()
        .success()
        .stdout(expected);
}

#[test]
fn python_mode_wraps_comments_only() {
    let input = "def f():\n    # This comment is long enough that it\n    # must wrap at width thirty.\n    return some_function_with_a_long_name(argument)\n";
    let expected = "def f():\n    # This comment is long\n    # enough that it must\n    # wrap at width thirty.\n    return some_function_with_a_long_name(argument)\n";
    for flag in ["--python", "--comments"] {
        restwrap()
            .args(["30", flag])
            .write_stdin(input)
            .assert()
            .success()
            .stdout(expected);
    }
}

#[test]
fn malformed_markup_is_a_warning() {
    let input = "+---+\n| a |\n";
    restwrap()
        .write_stdin(input)
        .assert()
        .success()
        .stdout(input)
        .stderr(predicate::str::contains("Row separator expected at line 1"));
}

#[test]
fn unknown_flag_is_rejected() {
    restwrap()
        .arg("--bogus")
        .write_stdin(FOX)
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("--bogus"));
}

#[test]
fn lines_needs_two_values() {
    restwrap()
        .args(["--lines", "3"])
        .write_stdin(FOX)
        .assert()
        .failure();
}
