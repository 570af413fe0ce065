//! Common types used throughout CDA

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Reward value reported back by the debugging pipeline
pub type Reward = f64;

/// Prefix shared by every discrete action identifier
const ACTION_ID_PREFIX: &str = "action_";

/// Debugging session identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How an action was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    /// Uniformly random action
    Explore,
    /// Highest-scoring action of the online table
    Exploit,
}

impl std::fmt::Display for SelectionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SelectionMode::Explore => write!(f, "explore"),
            SelectionMode::Exploit => write!(f, "exploit"),
        }
    }
}

/// An action the agent can take, as reported to the debugging pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub id: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<f64>,
}

impl Action {
    /// Create a new action with the given id and description
    pub fn new(id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            parameters: Vec::new(),
        }
    }

    /// Build the action for a discrete action index
    pub fn from_index(index: usize, mode: SelectionMode) -> Self {
        Self::new(
            format!("{ACTION_ID_PREFIX}{index}"),
            format!("Action {index} ({mode})"),
        )
    }

    /// Attach parameters to the action
    pub fn with_parameters(mut self, parameters: Vec<f64>) -> Self {
        self.parameters = parameters;
        self
    }

    /// Discrete index encoded in the id, if it is a `action_<n>` id
    pub fn index(&self) -> Option<usize> {
        self.id.strip_prefix(ACTION_ID_PREFIX)?.parse().ok()
    }
}

/// One recorded (state, action, reward, next state, terminal) tuple
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub state: Vec<f64>,
    pub action: usize,
    pub reward: Reward,
    pub next_state: Vec<f64>,
    pub terminal: bool,
}

impl Transition {
    /// Create a new transition
    pub fn new(
        state: Vec<f64>,
        action: usize,
        reward: Reward,
        next_state: Vec<f64>,
        terminal: bool,
    ) -> Self {
        Self {
            state,
            action,
            reward,
            next_state,
            terminal,
        }
    }
}
