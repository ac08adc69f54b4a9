use super::assertions::Assertion;
use super::steps::ScenarioStep;
use super::workspace::TestWorkspace;
use anyhow::{anyhow, bail, Context, Result};
use graphpaper_core::{CardId, EdgeId, Graph, GraphFile, ObjectId, LEGACY_TABLE};
use std::collections::HashMap;

/// Executes scenarios against a real graph file
pub struct ScenarioRunner {
    workspace: TestWorkspace,
    file: Option<GraphFile>,
    crashed: bool,
    current_step: usize,

    cards: HashMap<String, CardId>,
    edges: HashMap<String, EdgeId>,
    // Labels as of the last commit, by oid, so they survive a reopen
    committed_cards: HashMap<String, ObjectId>,
    committed_edges: HashMap<String, ObjectId>,
    commits: HashMap<String, ObjectId>,
}

impl ScenarioRunner {
    /// Create a new runner, optionally over a legacy file
    pub fn new(legacy_cards: Option<&[(String, String)]>) -> Result<Self> {
        let workspace = match legacy_cards {
            Some(rows) => TestWorkspace::with_legacy_cards(rows)?,
            None => TestWorkspace::empty()?,
        };

        Ok(Self {
            workspace,
            file: None,
            crashed: false,
            current_step: 0,
            cards: HashMap::new(),
            edges: HashMap::new(),
            committed_cards: HashMap::new(),
            committed_edges: HashMap::new(),
            commits: HashMap::new(),
        })
    }

    /// Get current step number
    pub fn current_step(&self) -> usize {
        self.current_step
    }

    /// Execute all steps in sequence
    pub fn execute(&mut self, steps: &[ScenarioStep]) -> Result<()> {
        for (i, step) in steps.iter().enumerate() {
            self.current_step = i;
            self.execute_step(step)
                .with_context(|| format!("Step {}: {:?}", i, step))?;
        }
        Ok(())
    }

    /// Execute a single step
    fn execute_step(&mut self, step: &ScenarioStep) -> Result<()> {
        match step {
            ScenarioStep::Open => self.handle_open(),
            ScenarioStep::ExpectOpenError { contains } => self.handle_expect_open_error(contains),

            ScenarioStep::AddCard {
                label,
                text,
                x,
                y,
                w,
                h,
            } => self.handle_add_card(label, text, *x, *y, *w, *h),
            ScenarioStep::SetText { label, text } => {
                let id = self.card_id(label)?;
                self.card_mut(id)?.set_text(text.as_str());
                Ok(())
            }
            ScenarioStep::Move { label, x, y } => {
                let id = self.card_id(label)?;
                self.card_mut(id)?.set_pos(*x, *y);
                Ok(())
            }
            ScenarioStep::Resize { label, w, h } => {
                let id = self.card_id(label)?;
                self.card_mut(id)?.set_size(*w, *h);
                Ok(())
            }
            ScenarioStep::DeleteCard { label } => {
                let id = self.card_id(label)?;
                self.graph_mut()?.delete_card(id)?;
                Ok(())
            }

            ScenarioStep::Link { label, from, to } => self.handle_link(label, from, to),
            ScenarioStep::Unlink { label } => {
                let id = self.edge_id(label)?;
                self.graph_mut()?.delete_edge(id)?;
                Ok(())
            }

            ScenarioStep::Commit { name } => self.handle_commit(name.as_deref()),
            ScenarioStep::SetConfig { key, value } => {
                self.file()?.config().set(key, value)?;
                Ok(())
            }

            ScenarioStep::Crash => self.handle_crash(),
            ScenarioStep::Reopen => self.handle_reopen(),

            ScenarioStep::Assert { assertion } => self.handle_assertion(assertion),
        }
    }

    // ===== Access =====

    fn file(&self) -> Result<&GraphFile> {
        self.file
            .as_ref()
            .ok_or_else(|| anyhow!("Graph file is not open"))
    }

    fn file_mut(&mut self) -> Result<&mut GraphFile> {
        self.file
            .as_mut()
            .ok_or_else(|| anyhow!("Graph file is not open"))
    }

    fn graph(&self) -> Result<&Graph> {
        Ok(self.file()?.graph())
    }

    fn graph_mut(&mut self) -> Result<&mut Graph> {
        Ok(self.file_mut()?.graph_mut())
    }

    fn card_id(&self, label: &str) -> Result<CardId> {
        self.cards
            .get(label)
            .copied()
            .ok_or_else(|| anyhow!("No card labelled {:?}", label))
    }

    fn edge_id(&self, label: &str) -> Result<EdgeId> {
        self.edges
            .get(label)
            .copied()
            .ok_or_else(|| anyhow!("No edge labelled {:?}", label))
    }

    fn card_mut(&mut self, id: CardId) -> Result<&mut graphpaper_core::Card> {
        self.graph_mut()?
            .card_mut(id)
            .ok_or_else(|| anyhow!("{} is not in the working set", id))
    }

    fn live_card(&self, label: &str) -> Result<&graphpaper_core::Card> {
        let id = self.card_id(label)?;
        let card = self
            .graph()?
            .card(id)
            .ok_or_else(|| anyhow!("{} is not in the working set", id))?;
        if card.is_deleted() {
            bail!("Card {:?} is deleted", label);
        }
        Ok(card)
    }

    fn live_cards(&self) -> Result<usize> {
        Ok(self
            .graph()?
            .cards()
            .filter(|(_, card)| !card.is_deleted())
            .count())
    }

    fn live_edges(&self) -> Result<Vec<EdgeId>> {
        let graph = self.graph()?;
        let mut live = Vec::new();
        for (id, _) in graph.edges() {
            if !graph.edge_is_deleted(id)? {
                live.push(id);
            }
        }
        Ok(live)
    }

    fn linked(&self, from: &str, to: &str) -> Result<bool> {
        let (from, to) = (self.card_id(from)?, self.card_id(to)?);
        let graph = self.graph()?;
        Ok(self.live_edges()?.into_iter().any(|id| {
            graph
                .edge(id)
                .is_some_and(|edge| edge.orig() == from && edge.dest() == to)
        }))
    }

    // ===== Handlers =====

    fn handle_open(&mut self) -> Result<()> {
        if self.file.is_some() {
            bail!("Graph file is already open");
        }
        self.file = Some(self.workspace.open_graph()?);
        Ok(())
    }

    fn handle_expect_open_error(&mut self, contains: &str) -> Result<()> {
        if self.file.is_some() {
            bail!("Graph file is already open");
        }
        match self.workspace.open_graph() {
            Ok(_) => bail!("Expected opening to fail with {:?}, but it succeeded", contains),
            Err(e) => {
                let message = format!("{:#}", e);
                if !message.contains(contains) {
                    bail!("Expected open error containing {:?}, got {:?}", contains, message);
                }
                Ok(())
            }
        }
    }

    fn handle_add_card(&mut self, label: &str, text: &str, x: i64, y: i64, w: i64, h: i64) -> Result<()> {
        if self.cards.contains_key(label) {
            bail!("Card label {:?} is already in use", label);
        }
        let graph = self.graph_mut()?;
        let id = graph.new_card(x, y, w, h);
        if let Some(card) = graph.card_mut(id) {
            card.set_text(text);
        }
        self.cards.insert(label.to_string(), id);
        Ok(())
    }

    fn handle_link(&mut self, label: &str, from: &str, to: &str) -> Result<()> {
        if self.edges.contains_key(label) {
            bail!("Edge label {:?} is already in use", label);
        }
        let (from, to) = (self.card_id(from)?, self.card_id(to)?);
        let id = self.graph_mut()?.new_edge(from, to)?;
        self.edges.insert(label.to_string(), id);
        Ok(())
    }

    fn handle_commit(&mut self, name: Option<&str>) -> Result<()> {
        let oid = self.file_mut()?.commit()?;
        if let Some(name) = name {
            self.commits.insert(name.to_string(), oid);
        }

        let graph = self.graph()?;
        let mut cards = HashMap::new();
        for (label, id) in &self.cards {
            if let Some(oid) = graph.card(*id).and_then(|card| card.oid()) {
                cards.insert(label.clone(), oid);
            }
        }
        let mut edges = HashMap::new();
        for (label, id) in &self.edges {
            if let Some(oid) = graph.edge(*id).and_then(|edge| edge.oid()) {
                edges.insert(label.clone(), oid);
            }
        }

        self.cards.retain(|label, _| cards.contains_key(label));
        self.edges.retain(|label, _| edges.contains_key(label));
        self.committed_cards = cards;
        self.committed_edges = edges;
        Ok(())
    }

    fn handle_crash(&mut self) -> Result<()> {
        // Drop the file without committing
        self.file = None;
        self.crashed = true;
        Ok(())
    }

    fn handle_reopen(&mut self) -> Result<()> {
        if !self.crashed {
            return Err(anyhow!("Cannot reopen - not crashed"));
        }

        let file = self.workspace.open_graph()?;
        let graph = file.graph();

        self.cards.clear();
        for (label, oid) in &self.committed_cards {
            let id = graph
                .cards()
                .find(|(_, card)| card.oid() == Some(*oid))
                .map(|(id, _)| id)
                .ok_or_else(|| anyhow!("Committed card {:?} missing after reopen", label))?;
            self.cards.insert(label.clone(), id);
        }

        self.edges.clear();
        for (label, oid) in &self.committed_edges {
            let id = graph
                .edges()
                .find(|(_, edge)| edge.oid() == Some(*oid))
                .map(|(id, _)| id)
                .ok_or_else(|| anyhow!("Committed edge {:?} missing after reopen", label))?;
            self.edges.insert(label.clone(), id);
        }

        self.file = Some(file);
        self.crashed = false;
        Ok(())
    }

    // ===== Assertions =====

    fn handle_assertion(&mut self, assertion: &Assertion) -> Result<()> {
        match assertion {
            Assertion::CardCount(expected) => {
                let actual = self.live_cards()?;
                if actual != *expected {
                    bail!("Expected {} cards, found {}", expected, actual);
                }
            }
            Assertion::EdgeCount(expected) => {
                let actual = self.live_edges()?.len();
                if actual != *expected {
                    bail!("Expected {} edges, found {}", expected, actual);
                }
            }
            Assertion::CardText { label, text } => {
                let card = self.live_card(label)?;
                if card.text() != text {
                    bail!("Card {:?} has text {:?}, expected {:?}", label, card.text(), text);
                }
            }
            Assertion::CardGeometry { label, x, y, w, h } => {
                let card = self.live_card(label)?;
                let actual = (card.x(), card.y(), card.w(), card.h());
                if actual != (*x, *y, *w, *h) {
                    bail!(
                        "Card {:?} is at {:?}, expected {:?}",
                        label,
                        actual,
                        (x, y, w, h)
                    );
                }
            }
            Assertion::CardGone { label } => {
                if self.live_card(label).is_ok() {
                    bail!("Card {:?} is still live", label);
                }
            }
            Assertion::EdgeBetween { from, to } => {
                if !self.linked(from, to)? {
                    bail!("No edge from {:?} to {:?}", from, to);
                }
            }
            Assertion::NoEdgeBetween { from, to } => {
                if self.linked(from, to)? {
                    bail!("Unexpected edge from {:?} to {:?}", from, to);
                }
            }
            Assertion::AnyCardWithText(text) => {
                let found = self
                    .graph()?
                    .cards()
                    .any(|(_, card)| !card.is_deleted() && card.text() == text);
                if !found {
                    bail!("No card with text {:?}", text);
                }
            }

            Assertion::CommitCount(expected) => {
                let actual = self.file()?.history(None)?.len();
                if actual != *expected {
                    bail!("Expected {} commits, found {}", expected, actual);
                }
            }
            Assertion::HeadIs(name) => {
                let expected = self
                    .commits
                    .get(name)
                    .ok_or_else(|| anyhow!("No commit named {:?}", name))?;
                let file = self.file()?;
                if file.head() != Some(*expected) || file.config().head()? != Some(*expected) {
                    bail!("Head is not commit {:?}", name);
                }
            }
            Assertion::CommitHolds { name, cards, edges } => {
                let oid = *self
                    .commits
                    .get(name)
                    .ok_or_else(|| anyhow!("No commit named {:?}", name))?;
                let store = self.file()?.store().clone();
                let graph = Graph::new(store, Some(oid))?;
                let actual = (graph.cards().count(), graph.edges().count());
                if actual != (*cards, *edges) {
                    bail!(
                        "Commit {:?} holds {:?} cards/edges, expected {:?}",
                        name,
                        actual,
                        (cards, edges)
                    );
                }
            }

            Assertion::ConfigValue { key, value } => {
                let actual = self.file()?.config().get(key)?;
                if actual != *value {
                    bail!("Config {:?} is {:?}, expected {:?}", key, actual, value);
                }
            }
            Assertion::VerifyClean => {
                let report = self.file()?.verify()?;
                if report.has_issues() {
                    bail!("Verification found issues: {}", report.summary());
                }
            }
            Assertion::LegacyTableDropped => {
                if self.file()?.connection().has_table(LEGACY_TABLE)? {
                    bail!("Legacy table {:?} is still present", LEGACY_TABLE);
                }
            }

            Assertion::Custom(check) => {
                let file = self.file_mut()?;
                check(file)?;
            }
        }
        Ok(())
    }
}
