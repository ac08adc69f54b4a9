//! Everyday editing sessions on a fresh file.

use crate::harness::{Assertion, Scenario};
use graphpaper_core::CARD_OBJTYPE;

#[test]
fn test_fresh_file_starts_with_one_empty_commit() {
    Scenario::new("fresh_file")
        .open()
        .assert_card_count(0)
        .assert_edge_count(0)
        .assert_commit_count(1)
        .assert(Assertion::ConfigValue {
            key: "version".to_string(),
            value: Some("2".to_string()),
        })
        .assert(Assertion::ConfigValue {
            key: "viewport_h".to_string(),
            value: Some("400".to_string()),
        })
        .assert_verify_clean()
        .run()
        .unwrap();
}

#[test]
fn test_cards_edges_and_deletes_across_commits() {
    Scenario::new("cards_edges_deletes")
        .open()
        .user_adds_card("a", "card1", 0, 0, 100, 100)
        .user_adds_card("b", "number2", 200, 0, 100, 100)
        .user_adds_card("c", "", 0, 200, 100, 100)
        .user_links("ab", "a", "b")
        .user_links("bc", "b", "c")
        .commit_as("first")
        .assert_card_count(3)
        .assert_edge_count(2)
        .assert_linked("a", "b")
        .assert_linked("b", "c")
        .assert(Assertion::HeadIs("first".to_string()))
        // Deleting b takes both of its edges with it
        .user_deletes("b")
        .assert_edge_count(0)
        .commit_as("second")
        .assert_card_count(2)
        .assert(Assertion::CardGone {
            label: "b".to_string(),
        })
        .assert(Assertion::CommitHolds {
            name: "first".to_string(),
            cards: 3,
            edges: 2,
        })
        .assert(Assertion::CommitHolds {
            name: "second".to_string(),
            cards: 2,
            edges: 0,
        })
        .assert_commit_count(3)
        .assert_verify_clean()
        .run()
        .unwrap();
}

#[test]
fn test_edits_survive_reopen() {
    Scenario::new("edits_survive_reopen")
        .open()
        .user_adds_card("note", "draft", 10, 20, 150, 90)
        .commit()
        .user_edits_text("note", "final")
        .user_moves("note", -40, 15)
        .user_resizes("note", 5, 300)
        .assert_card_geometry("note", -40, 15, 20, 300)
        .commit()
        .crash()
        .reopen()
        .assert_card_text("note", "final")
        .assert_card_geometry("note", -40, 15, 20, 300)
        .assert_commit_count(3)
        .run()
        .unwrap();
}

#[test]
fn test_unlink_keeps_cards() {
    Scenario::new("unlink_keeps_cards")
        .open()
        .user_adds_card("a", "left", 0, 0, 50, 50)
        .user_adds_card("b", "right", 100, 0, 50, 50)
        .user_links("ab", "a", "b")
        .user_links("ba", "b", "a")
        .commit()
        .user_unlinks("ab")
        .commit()
        .assert_card_count(2)
        .assert_not_linked("a", "b")
        .assert_linked("b", "a")
        .run()
        .unwrap();
}

#[test]
fn test_saved_cards_carry_objtype() {
    Scenario::new("saved_cards_carry_objtype")
        .open()
        .user_adds_card("a", "typed", 0, 0, 40, 40)
        .commit()
        .assert(Assertion::Custom(Box::new(|file| {
            let (_, card) = file
                .graph()
                .cards()
                .next()
                .ok_or_else(|| anyhow::anyhow!("no card"))?;
            let oid = card.oid().ok_or_else(|| anyhow::anyhow!("card not saved"))?;
            let bytes = file.store().get(oid)?;
            let value: serde_json::Value = serde_json::from_slice(&bytes)?;
            anyhow::ensure!(value["objtype"] == CARD_OBJTYPE, "objtype is {}", value["objtype"]);
            Ok(())
        })))
        .run()
        .unwrap();
}
