//! End-to-end checks over the fixture tree
//!
//! Each fixture under tests/fixtures/ is reviewed through the same entry
//! points the CLI uses; expected output lives inline in the assertions.
use invlint::report::{rule, Report};
use invlint::{candidate, conflicts, dupkeys, indent};
use std::path::Path;

#[test]
fn group_vars_conflict_is_reported() {
    let report = conflicts::review(Path::new("tests/fixtures/inv/group_vars/web.yml"));

    insta::assert_snapshot!(
        report.render(None),
        @"tests/fixtures/inv/group_vars/web.yml: [groupvars] Sibling groups web and db with common hosts app1 both define variable region"
    );
}

#[test]
fn conflicts_are_found_when_vars_live_only_in_group_vars_files() {
    // the inventory file declares no vars at all; both definitions of
    // `region` come from the group_vars files next to it
    let report = conflicts::review(Path::new("tests/fixtures/filevars/group_vars/web.yml"));

    insta::assert_snapshot!(
        report.render(None),
        @"tests/fixtures/filevars/group_vars/web.yml: [groupvars] Sibling groups web and db with common hosts app1 both define variable region"
    );
}

#[test]
fn group_vars_files_merge_into_the_graph() {
    let inv = invlint::inventory::Inventory::load(Path::new("tests/fixtures/filevars")).unwrap();

    let web = inv.group_named("web").unwrap();
    assert_eq!(
        inv.group(web).vars["region"],
        serde_yaml::Value::from("eu-west-1")
    );
}

#[test]
fn group_without_inventory_membership_is_clean() {
    let report = conflicts::review(Path::new("tests/fixtures/inv/group_vars/ghost.yml"));
    assert!(report.is_clean());
}

#[test]
fn broken_inventory_is_a_document_level_error() {
    let report = conflicts::review(Path::new("tests/fixtures/broken/group_vars/x.yml"));

    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].line.is_none());
    assert!(report.errors[0].message.starts_with("Inventory is broken:"));
}

#[test]
fn indentation_findings_render_with_line_text() {
    let path = Path::new("tests/fixtures/site_bad.yml");
    assert_eq!(candidate::classify(path), Some(candidate::FileKind::Playbook));

    let text = std::fs::read_to_string(path).unwrap();
    let report = Report::new(path.display().to_string(), rule::INDENT, indent::check(&text));

    insta::assert_snapshot!(
        report.render(Some(&text)),
        @"tests/fixtures/site_bad.yml:2: [indent] lines starting with '- ' should have same or less indentation than previous line     - name: x"
    );
}

#[test]
fn duplicate_keys_render_every_occurrence() {
    let path = Path::new("tests/fixtures/host_vars/app1.yml");
    assert_eq!(
        candidate::classify(path),
        Some(candidate::FileKind::HostVars)
    );

    let text = std::fs::read_to_string(path).unwrap();
    let report = Report::new(
        path.display().to_string(),
        rule::DUPLICATE_KEY,
        dupkeys::errors(&text),
    );

    assert_eq!(
        report.render(Some(&text)),
        "tests/fixtures/host_vars/app1.yml:1: [dupkey] Variable name occurs more than once name: a\n\
         tests/fixtures/host_vars/app1.yml:3: [dupkey] Variable name occurs more than once name: b"
    );
}

#[test]
fn reports_serialize_for_machine_output() {
    let report = Report::new(
        "x.yml".to_string(),
        rule::INDENT,
        indent::check("a:\n   b: 1\n"),
    );

    let json = serde_json::to_string(&report).unwrap();
    assert_eq!(
        json,
        r#"{"path":"x.yml","rule":"indent","errors":[{"line":2,"message":"indentation should increase by 2 chars"}]}"#
    );
}
