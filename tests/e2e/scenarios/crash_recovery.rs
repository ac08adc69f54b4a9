//! Losing the process between commits.

use crate::harness::{Assertion, Scenario};

#[test]
fn test_uncommitted_edits_are_lost() {
    Scenario::new("uncommitted_edits_lost")
        .open()
        .user_adds_card("a", "saved", 0, 0, 100, 100)
        .commit_as("saved")
        .user_edits_text("a", "unsaved")
        .user_adds_card("b", "never committed", 50, 50, 100, 100)
        .crash()
        .reopen()
        .assert_card_count(1)
        .assert_card_text("a", "saved")
        .assert(Assertion::HeadIs("saved".to_string()))
        .assert_commit_count(2)
        .run()
        .unwrap();
}

#[test]
fn test_uncommitted_delete_is_undone() {
    Scenario::new("uncommitted_delete_undone")
        .open()
        .user_adds_card("a", "one", 0, 0, 100, 100)
        .user_adds_card("b", "two", 200, 0, 100, 100)
        .user_links("ab", "a", "b")
        .commit()
        .user_deletes("a")
        .assert_edge_count(0)
        .crash()
        .reopen()
        .assert_card_count(2)
        .assert_linked("a", "b")
        .run()
        .unwrap();
}

#[test]
fn test_work_continues_after_reopen() {
    Scenario::new("work_after_reopen")
        .open()
        .user_adds_card("a", "one", 0, 0, 100, 100)
        .commit()
        .crash()
        .reopen()
        .user_adds_card("b", "two", 200, 0, 100, 100)
        .user_links("ab", "a", "b")
        .commit_as("after")
        .crash()
        .reopen()
        .assert_card_count(2)
        .assert_linked("a", "b")
        .assert(Assertion::HeadIs("after".to_string()))
        .assert_commit_count(3)
        .assert_verify_clean()
        .run()
        .unwrap();
}

#[test]
fn test_config_changes_are_immediate() {
    Scenario::new("config_immediate")
        .open()
        .user_sets_config("viewport_x", "-250")
        .crash()
        .reopen()
        .assert(Assertion::ConfigValue {
            key: "viewport_x".to_string(),
            value: Some("-250".to_string()),
        })
        .assert(Assertion::Custom(Box::new(|file| {
            let viewport = file.config().viewport()?;
            anyhow::ensure!(viewport.x == -250, "viewport x is {}", viewport.x);
            anyhow::ensure!(viewport.w == 600, "viewport w is {}", viewport.w);
            Ok(())
        })))
        .run()
        .unwrap();
}

#[test]
fn test_unknown_version_refuses_to_open() {
    Scenario::new("unknown_version")
        .open()
        .user_sets_config("version", "3")
        .crash()
        .expect_open_error("unsupported file format version")
        .run()
        .unwrap();
}
