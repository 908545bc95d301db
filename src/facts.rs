//! Ground fact primitives handed to the symbolic planner.
//!
//! A [`Fact`] is a predicate applied to concrete terms. The predicate vocabulary is closed and
//! must match the planner's domain definition exactly, so it is an enum rather than free text.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::geometry::Pose;

/// The predicate vocabulary understood by the planning domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Predicate {
    Robot,
    HandEmpty,
    At,
    Pose,
    AtPose,
    Room,
    Location,
    Is,
    AtRoom,
    Type,
    Obj,
    Holding,
}

impl Predicate {
    /// Name as it appears in the planning domain.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Robot => "Robot",
            Self::HandEmpty => "HandEmpty",
            Self::At => "At",
            Self::Pose => "Pose",
            Self::AtPose => "AtPose",
            Self::Room => "Room",
            Self::Location => "Location",
            Self::Is => "Is",
            Self::AtRoom => "AtRoom",
            Self::Type => "Type",
            Self::Obj => "Obj",
            Self::Holding => "Holding",
        }
    }

    pub fn arity(&self) -> usize {
        match self {
            Self::Robot | Self::HandEmpty | Self::Room | Self::Location | Self::Type | Self::Obj => 1,
            Self::At | Self::Pose | Self::AtPose | Self::Is | Self::AtRoom | Self::Holding => 2,
        }
    }
}

impl std::fmt::Display for Predicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A single argument of a ground fact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Term {
    Robot(String),
    Location(String),
    Object(String),
    Category(String),
    Pose(Pose),
}

impl Term {
    pub fn robot(name: impl Into<String>) -> Self {
        Self::Robot(name.into())
    }

    pub fn location(name: impl Into<String>) -> Self {
        Self::Location(name.into())
    }

    pub fn object(name: impl Into<String>) -> Self {
        Self::Object(name.into())
    }

    pub fn category(name: impl Into<String>) -> Self {
        Self::Category(name.into())
    }

    /// The referenced name, or `None` for value terms.
    pub fn as_ref_name(&self) -> Option<&str> {
        match self {
            Self::Robot(n) | Self::Location(n) | Self::Object(n) | Self::Category(n) => Some(n),
            Self::Pose(_) => None,
        }
    }
}

impl std::fmt::Display for Term {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pose(p) => write!(f, "<{p}>"),
            other => f.write_str(other.as_ref_name().unwrap_or_default()),
        }
    }
}

/// A ground predicate, e.g. `(At Bot kitchen_table)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fact {
    pub predicate: Predicate,
    pub args: Vec<Term>,
}

impl Fact {
    pub fn new(predicate: Predicate, args: Vec<Term>) -> Self {
        debug_assert_eq!(
            predicate.arity(),
            args.len(),
            "{predicate} expects {} argument(s)",
            predicate.arity()
        );
        Self { predicate, args }
    }

    pub fn unary(predicate: Predicate, arg: Term) -> Self {
        Self::new(predicate, vec![arg])
    }

    pub fn binary(predicate: Predicate, first: Term, second: Term) -> Self {
        Self::new(predicate, vec![first, second])
    }
}

impl std::fmt::Display for Fact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}", self.predicate)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        f.write_str(")")
    }
}

/// Hashable identity of a [`Fact`]; pose components are compared by bit pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct FactKey(Predicate, Vec<TermKey>);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum TermKey {
    Named(&'static str, String),
    Pose([u64; 4]),
}

impl From<&Fact> for FactKey {
    fn from(fact: &Fact) -> Self {
        Self(fact.predicate, fact.args.iter().map(TermKey::from).collect())
    }
}

impl From<&Term> for TermKey {
    fn from(term: &Term) -> Self {
        match term {
            Term::Robot(n) => Self::Named("robot", n.clone()),
            Term::Location(n) => Self::Named("location", n.clone()),
            Term::Object(n) => Self::Named("object", n.clone()),
            Term::Category(n) => Self::Named("category", n.clone()),
            Term::Pose(p) => Self::Pose([p.x(), p.y(), p.z(), p.yaw()].map(canonical_bits)),
        }
    }
}

/// `0.0` and `-0.0` compare equal, so they share a key.
fn canonical_bits(value: f64) -> u64 {
    if value == 0.0 {
        0.0f64.to_bits()
    } else {
        value.to_bits()
    }
}

/// The planner's initial state: every fact true at the planning instant.
///
/// Iteration follows insertion order so the encoder output is stable for a given world.
/// Inserting a fact that is already present is a no-op; membership is a hash lookup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Fact>", into = "Vec<Fact>")]
pub struct FactSet {
    facts: Vec<Fact>,
    index: HashSet<FactKey>,
}

impl FactSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts the fact, returning false if an identical fact was already present.
    pub fn insert(&mut self, fact: Fact) -> bool {
        if !self.index.insert(FactKey::from(&fact)) {
            return false;
        }
        self.facts.push(fact);
        true
    }

    pub fn contains(&self, fact: &Fact) -> bool {
        self.index.contains(&FactKey::from(fact))
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Fact> {
        self.facts.iter()
    }

    /// All facts using the given predicate, in insertion order.
    pub fn with_predicate(&self, predicate: Predicate) -> impl Iterator<Item = &Fact> {
        self.facts.iter().filter(move |f| f.predicate == predicate)
    }

    pub fn into_vec(self) -> Vec<Fact> {
        self.facts
    }
}

impl PartialEq for FactSet {
    fn eq(&self, other: &Self) -> bool {
        self.facts == other.facts
    }
}

impl From<Vec<Fact>> for FactSet {
    fn from(facts: Vec<Fact>) -> Self {
        let mut set = Self::new();
        set.extend(facts);
        set
    }
}

impl From<FactSet> for Vec<Fact> {
    fn from(set: FactSet) -> Self {
        set.facts
    }
}

impl<'a> IntoIterator for &'a FactSet {
    type Item = &'a Fact;
    type IntoIter = std::slice::Iter<'a, Fact>;

    fn into_iter(self) -> Self::IntoIter {
        self.facts.iter()
    }
}

impl Extend<Fact> for FactSet {
    fn extend<I: IntoIterator<Item = Fact>>(&mut self, iter: I) {
        for fact in iter {
            self.insert(fact);
        }
    }
}
