use assert_cmd::Command;
use predicates::prelude::*;

fn i8051() -> Command {
    Command::cargo_bin("i8051").unwrap()
}

#[test]
fn runs_to_completion() {
    i8051()
        .arg("tests/files/hello.asm")
        .assert()
        .success()
        .stdout(predicate::str::contains("serial: Hi"))
        .stdout(predicate::str::contains("R0-R7=00 00 00 00 00 00 00 05 (bank 0)"))
        .stdout(predicate::str::contains("halted at line"));
}

#[test]
fn step_limit_is_not_an_error() {
    i8051()
        .args(["tests/files/echo.asm", "--steps", "50"])
        .assert()
        .success()
        .stdout(predicate::str::contains("step limit reached"))
        .stdout(predicate::str::contains("after 50 steps"));
}

#[test]
fn echoes_received_byte() {
    i8051()
        .args(["tests/files/echo.asm", "--rx", "k"])
        .assert()
        .success()
        .stdout(predicate::str::contains("serial: k"))
        .stdout(predicate::str::contains("A=6B"));
}

#[test]
fn trace_lists_executed_lines() {
    i8051()
        .args(["tests/files/hello.asm", "--trace"])
        .assert()
        .success()
        .stdout(predicate::str::contains("MOV TMOD, #20H"))
        .stdout(predicate::str::contains("CLR TI"));
}

#[test]
fn unresolved_label_fails() {
    i8051()
        .arg("tests/files/bad_label.asm")
        .assert()
        .failure()
        .stdout(predicate::str::contains("faulted at line 2"))
        .stderr(predicate::str::contains("unresolved label NOWHERE"));
}

#[test]
fn syntax_error_names_the_line() {
    i8051()
        .arg("tests/files/bad_syntax.asm")
        .assert()
        .failure()
        .stderr(predicate::str::contains("line 2"));
}

#[test]
fn missing_file_fails() {
    i8051()
        .arg("tests/files/does_not_exist.asm")
        .assert()
        .failure()
        .stderr(predicate::str::contains("could not read"));
}
