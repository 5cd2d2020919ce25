use include_dir::{include_dir, Dir};
use rand::Rng;
use serde::Deserialize;

static SCENARIO_DIR: Dir = include_dir!("src/scenarios");

/// Presentation tag for a scenario. The core treats this as opaque; the
/// renderer picks a card layout per kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ScenarioKind {
    Email,
    Sms,
    Browser,
    Website,
    LoginPrompt,
    StickyNote,
}

/// Kind-specific display fields, one variant per kind so the renderer can
/// match exhaustively instead of dispatching on a string tag.
#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScenarioContent {
    Email {
        from: String,
        to: String,
        subject: String,
        body: String,
    },
    Sms {
        sender: String,
        body: String,
    },
    Browser {
        title: String,
        body: String,
    },
    Website {
        title: String,
        body: String,
    },
    LoginPrompt {
        title: String,
        body: String,
    },
    StickyNote {
        title: String,
        body: String,
    },
}

impl ScenarioContent {
    pub fn kind(&self) -> ScenarioKind {
        match self {
            ScenarioContent::Email { .. } => ScenarioKind::Email,
            ScenarioContent::Sms { .. } => ScenarioKind::Sms,
            ScenarioContent::Browser { .. } => ScenarioKind::Browser,
            ScenarioContent::Website { .. } => ScenarioKind::Website,
            ScenarioContent::LoginPrompt { .. } => ScenarioKind::LoginPrompt,
            ScenarioContent::StickyNote { .. } => ScenarioKind::StickyNote,
        }
    }
}

/// One quiz item: display payload, ground truth, and the explanation shown
/// after the player answers.
#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct Scenario {
    #[serde(flatten)]
    pub content: ScenarioContent,
    pub is_unsafe: bool,
    pub explanation: String,
}

impl Scenario {
    pub fn kind(&self) -> ScenarioKind {
        self.content.kind()
    }
}

/// Immutable scenario set. Sessions never play the catalog directly; they
/// take a shuffled copy via [`Catalog::shuffled_deck`].
#[derive(Clone, Debug)]
pub struct Catalog {
    scenarios: Vec<Scenario>,
}

impl Catalog {
    /// The embedded catalog shipped with the binary.
    pub fn builtin() -> Self {
        let file = SCENARIO_DIR
            .get_file("builtin.json")
            .expect("Builtin scenario file not found");

        let raw = file
            .contents_utf8()
            .expect("Unable to interpret scenario file as a string");

        Self::from_json(raw).expect("Unable to deserialize builtin scenarios")
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        let scenarios = serde_json::from_str(raw)?;
        Ok(Self { scenarios })
    }

    pub fn from_scenarios(scenarios: Vec<Scenario>) -> Self {
        Self { scenarios }
    }

    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    /// A fresh uniformly random permutation of the catalog. Fisher-Yates on
    /// a copy; the catalog itself is never reordered.
    pub fn shuffled_deck(&self) -> Vec<Scenario> {
        let mut deck = self.scenarios.clone();
        let mut rng = rand::thread_rng();

        for i in (1..deck.len()).rev() {
            let j = rng.gen_range(0..=i);
            deck.swap(i, j);
        }

        deck
    }
}
