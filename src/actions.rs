//! Planner solutions and the typed task plans decoded from them.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::geometry::{Path, Pose};

/// A positional argument of a planner action.
///
/// Planner output is loosely typed: references to domain objects arrive as names, geometric
/// values arrive as poses or paths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum PlanArg {
    Ref(String),
    Pose(Pose),
    Path(Path),
}

impl PlanArg {
    pub fn reference(name: impl Into<String>) -> Self {
        Self::Ref(name.into())
    }

    /// Short kind label used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Ref(_) => "reference",
            Self::Pose(_) => "pose",
            Self::Path(_) => "path",
        }
    }
}

/// One action as returned by the planner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannerAction {
    pub name: String,
    pub args: Vec<PlanArg>,
}

impl PlannerAction {
    pub fn new(name: impl Into<String>, args: Vec<PlanArg>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }
}

/// The planner's full output: an optional action sequence, its total cost and free-form metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannerSolution {
    pub plan: Option<Vec<PlannerAction>>,
    pub total_cost: f64,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

impl PlannerSolution {
    pub fn new(plan: Vec<PlannerAction>, total_cost: f64) -> Self {
        Self {
            plan: Some(plan),
            total_cost,
            metadata: serde_json::Value::Null,
        }
    }

    /// The "no solution found" value.
    pub fn not_found() -> Self {
        Self {
            plan: None,
            total_cost: 0.0,
            metadata: serde_json::Value::Null,
        }
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Action type parsed from a planner action name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ActionTag {
    Navigate,
    Pick,
    Place,
    Other(String),
}

impl From<&str> for ActionTag {
    fn from(name: &str) -> Self {
        let normalized = name.trim().to_lowercase();
        match normalized.as_str() {
            "navigate" => Self::Navigate,
            "pick" => Self::Pick,
            "place" => Self::Place,
            _ => Self::Other(normalized),
        }
    }
}

impl FromStr for ActionTag {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl std::fmt::Display for ActionTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Navigate => f.write_str("navigate"),
            Self::Pick => f.write_str("pick"),
            Self::Place => f.write_str("place"),
            Self::Other(name) => f.write_str(name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigateAction {
    pub robot: String,
    pub source_location: String,
    pub target_location: String,
    /// May be left empty for an execution-time path planner to fill in.
    pub path: Option<Path>,
}

/// Fields shared by pick and place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManipulationAction {
    pub robot: String,
    pub object: String,
    pub target_location: String,
    pub pose: Option<Pose>,
}

/// A typed, executable step of a task plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum TaskAction {
    Navigate(NavigateAction),
    Pick(ManipulationAction),
    Place(ManipulationAction),
    /// An action this layer has no typed representation for; only its name is kept.
    Unsupported { name: String },
}

impl TaskAction {
    pub fn tag(&self) -> ActionTag {
        match self {
            Self::Navigate(_) => ActionTag::Navigate,
            Self::Pick(_) => ActionTag::Pick,
            Self::Place(_) => ActionTag::Place,
            Self::Unsupported { name } => ActionTag::Other(name.clone()),
        }
    }

    pub fn target_location(&self) -> Option<&str> {
        match self {
            Self::Navigate(nav) => Some(&nav.target_location),
            Self::Pick(m) | Self::Place(m) => Some(&m.target_location),
            Self::Unsupported { .. } => None,
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unsupported { .. })
    }
}

impl std::fmt::Display for TaskAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Navigate(nav) => {
                write!(f, "Navigate from {} to {}", nav.source_location, nav.target_location)?;
                if let Some(path) = &nav.path {
                    write!(f, " ({} waypoints)", path.len())?;
                }
                Ok(())
            }
            Self::Pick(m) => write!(f, "Pick {} from {}", m.object, m.target_location),
            Self::Place(m) => write!(f, "Place {} at {}", m.object, m.target_location),
            Self::Unsupported { name } => write!(f, "Unsupported action {name}"),
        }
    }
}

/// An ordered task plan ready for execution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskPlan {
    pub actions: Vec<TaskAction>,
    /// Total cost as reported by the planner; per-action costs are not available.
    pub total_cost: f64,
}

impl TaskPlan {
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl std::fmt::Display for TaskPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Task plan:")?;
        for (i, action) in self.actions.iter().enumerate() {
            writeln!(f, "  {}. {action}", i + 1)?;
        }
        write!(f, "Total cost: {:.3}", self.total_cost)
    }
}
