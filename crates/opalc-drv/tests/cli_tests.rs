//! End-to-end tests driving the `opalc` binary through its menu.

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

const VALID_PROGRAM: &str = "\
_main
type int : b5 ;
b5 <--- 35 + 7 ;
return ;
end
";

fn opalc() -> Command {
    Command::cargo_bin("opalc").expect("binary builds")
}

#[test]
fn missing_arguments_exit_nonzero() {
    opalc().assert().failure();
}

#[test]
fn unopenable_input_exits_nonzero() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("tree.txt");
    opalc()
        .arg(dir.path().join("no-such-file.opl"))
        .arg(&out)
        .write_stdin("0\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot open input file"));
}

#[test]
fn menu_exit_immediately_succeeds() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("p.opl");
    fs::write(&src, VALID_PROGRAM).unwrap();
    opalc()
        .arg(&src)
        .arg(dir.path().join("tree.txt"))
        .write_stdin("0\n")
        .assert()
        .success();
}

#[test]
fn menu_one_removes_comments() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("p.opl");
    fs::write(&src, "b5 <--- 35 ; % trailing note\n").unwrap();
    opalc()
        .arg(&src)
        .arg(dir.path().join("tree.txt"))
        .write_stdin("1\n0\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("b5 <--- 35 ;"))
        .stdout(predicate::str::contains("trailing note").not());
}

#[test]
fn menu_two_prints_token_listing() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("p.opl");
    fs::write(&src, "b5 <--- 35 ;\n").unwrap();
    opalc()
        .arg(&src)
        .arg(dir.path().join("tree.txt"))
        .write_stdin("2\n0\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("TK_ID"))
        .stdout(predicate::str::contains("TK_ASSIGNOP"))
        .stdout(predicate::str::contains("TK_NUM"));
}

#[test]
fn menu_two_renders_error_categories() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("p.opl");
    fs::write(&src, "@\n").unwrap();
    opalc()
        .arg(&src)
        .arg(dir.path().join("tree.txt"))
        .write_stdin("2\n0\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Unrecognized pattern"))
        .stderr(predicate::str::contains("Line 1 Error:"));
}

#[test]
fn menu_three_writes_parse_tree() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("p.opl");
    let out = dir.path().join("tree.txt");
    fs::write(&src, VALID_PROGRAM).unwrap();
    opalc()
        .arg(&src)
        .arg(&out)
        .write_stdin("3\n0\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("syntactically correct"));

    let tree = fs::read_to_string(&out).unwrap();
    assert!(tree.contains("ROOT"));
    assert!(tree.contains("<program>"));
    assert!(tree.contains("TK_MAIN"));
    assert!(tree.contains("35"));
}

#[test]
fn menu_three_reports_syntax_errors_but_still_writes_tree() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("p.opl");
    let out = dir.path().join("tree.txt");
    fs::write(&src, "_main\nb5 <--- ;\nreturn ;\nend\n").unwrap();
    opalc()
        .arg(&src)
        .arg(&out)
        .write_stdin("3\n0\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("partial"))
        .stderr(predicate::str::contains("Line 2 Error:"));
    assert!(out.exists());
}

#[test]
fn menu_four_times_a_run() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("p.opl");
    fs::write(&src, VALID_PROGRAM).unwrap();
    opalc()
        .arg(&src)
        .arg(dir.path().join("tree.txt"))
        .write_stdin("4\n0\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("seconds"));
}

#[test]
fn grammar_override_is_honored() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("p.opl");
    let out = dir.path().join("tree.txt");
    let grammar = dir.path().join("grammar.txt");
    fs::write(&src, "_main\nend\n").unwrap();
    fs::write(&grammar, "<program> MAIN END\n").unwrap();
    opalc()
        .arg(&src)
        .arg(&out)
        .arg("--grammar")
        .arg(&grammar)
        .write_stdin("3\n0\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("syntactically correct"));
}

#[test]
fn malformed_grammar_is_fatal() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("p.opl");
    let grammar = dir.path().join("grammar.txt");
    fs::write(&src, "_main\nend\n").unwrap();
    fs::write(&grammar, "<nope> MAIN\n").unwrap();
    opalc()
        .arg(&src)
        .arg(dir.path().join("tree.txt"))
        .arg("--grammar")
        .arg(&grammar)
        .write_stdin("3\n0\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown non-terminal"));
}
