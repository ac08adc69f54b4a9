use super::assertions::Assertion;

/// All possible actions in a test scenario.
///
/// Cards and edges are referred to by scenario labels; the runner maps them
/// to handles of the open graph.
#[derive(Debug)]
pub enum ScenarioStep {
    // Opening
    Open,
    ExpectOpenError {
        contains: String,
    },

    // Card edits
    AddCard {
        label: String,
        text: String,
        x: i64,
        y: i64,
        w: i64,
        h: i64,
    },
    SetText {
        label: String,
        text: String,
    },
    Move {
        label: String,
        x: i64,
        y: i64,
    },
    Resize {
        label: String,
        w: i64,
        h: i64,
    },
    DeleteCard {
        label: String,
    },

    // Edge edits
    Link {
        label: String,
        from: String,
        to: String,
    },
    Unlink {
        label: String,
    },

    // Commits
    Commit {
        name: Option<String>,
    },
    SetConfig {
        key: String,
        value: String,
    },

    // Failure simulation
    Crash,
    Reopen,

    // Assertions (can be interspersed)
    Assert {
        assertion: Assertion,
    },
}
