//! Opening files written by the old card table format.

use crate::harness::{Assertion, Scenario};

#[test]
fn test_legacy_cards_are_imported() {
    Scenario::new("legacy_import")
        .with_legacy_cards(&[
            ("1f2e", "{-100,-50,200,100}Foobar baz"),
            ("3a4b", r#"{"x":10,"y":20,"w":30,"h":40,"text":"from json"}"#),
        ])
        .open()
        .assert_card_count(2)
        .assert_edge_count(0)
        .assert(Assertion::AnyCardWithText("Foobar baz".to_string()))
        .assert(Assertion::AnyCardWithText("from json".to_string()))
        .assert(Assertion::LegacyTableDropped)
        .assert(Assertion::ConfigValue {
            key: "version".to_string(),
            value: Some("2".to_string()),
        })
        .assert_commit_count(1)
        .assert_verify_clean()
        .run()
        .unwrap();
}

#[test]
fn test_migrated_file_reopens_as_current() {
    Scenario::new("migrated_reopen")
        .with_legacy_cards(&[("row", "{0,0,120,80}kept")])
        .open()
        .crash()
        .reopen()
        .assert_card_count(1)
        .assert(Assertion::AnyCardWithText("kept".to_string()))
        .assert_commit_count(1)
        .run()
        .unwrap();
}

#[test]
fn test_empty_legacy_table_gives_empty_graph() {
    Scenario::new("empty_legacy_table")
        .with_legacy_cards(&[])
        .open()
        .assert_card_count(0)
        .assert(Assertion::LegacyTableDropped)
        .assert_commit_count(1)
        .run()
        .unwrap();
}

#[test]
fn test_bad_legacy_row_refuses_to_open() {
    Scenario::new("bad_legacy_row")
        .with_legacy_cards(&[("good", "{0,0,50,50}fine"), ("bad", "{0,0,0,50}text")])
        .expect_open_error("invalid legacy card")
        // Nothing was written, so the same failure repeats
        .expect_open_error("\"bad\"")
        .run()
        .unwrap();
}

#[test]
fn test_unparseable_legacy_row_refuses_to_open() {
    Scenario::new("unparseable_legacy_row")
        .with_legacy_cards(&[("junk", "not a card")])
        .expect_open_error("could not parse card")
        .run()
        .unwrap();
}
