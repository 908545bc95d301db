//! World model → planner initial state.

use std::collections::BTreeSet;

use tracing::{debug, warn};

use crate::facts::{Fact, FactSet, Predicate, Term};
use crate::world::{HandState, WorldModel};

/// Encodes a world snapshot as the set of ground facts true at the current instant.
#[derive(Debug, Clone, Copy, Default)]
pub struct FactEncoder;

impl FactEncoder {
    pub fn new() -> Self {
        Self
    }

    /// Produces the full initial-state fact set for `world`.
    ///
    /// Exactly one of `HandEmpty(r)` / `Holding(r, o)` is emitted. A robot whose location cannot
    /// be recorded or resolved from its pose gets no `At` fact.
    #[tracing::instrument(skip_all, fields(robot = %world.robot().name))]
    pub fn encode<W: WorldModel + ?Sized>(&self, world: &W) -> FactSet {
        let mut facts = FactSet::new();
        let robot = world.robot();
        let hand = robot.hand_state();

        // Robot state.
        facts.insert(Fact::unary(Predicate::Robot, Term::robot(&robot.name)));
        facts.insert(match hand {
            HandState::Empty => Fact::unary(Predicate::HandEmpty, Term::robot(&robot.name)),
            HandState::Holding(obj) => Fact::binary(Predicate::Holding, Term::robot(&robot.name), Term::object(obj)),
        });
        match robot
            .location
            .clone()
            .or_else(|| world.location_from_pose(&robot.pose))
        {
            Some(loc) => {
                facts.insert(Fact::binary(Predicate::At, Term::robot(&robot.name), Term::location(loc)));
            }
            None => warn!(pose = %robot.pose, "robot location unknown; omitting At fact"),
        }
        facts.insert(Fact::binary(Predicate::Pose, Term::robot(&robot.name), Term::Pose(robot.pose)));
        facts.insert(Fact::binary(Predicate::AtPose, Term::robot(&robot.name), Term::Pose(robot.pose)));

        // Rooms and locations. Spawns inherit the category of their owning location.
        for room in world.rooms() {
            facts.insert(Fact::unary(Predicate::Room, Term::location(&room.name)));
            facts.insert(Fact::unary(Predicate::Location, Term::location(&room.name)));
        }
        let mut loc_categories = BTreeSet::new();
        for loc in world.locations() {
            for spawn in &loc.children {
                facts.insert(Fact::unary(Predicate::Location, Term::location(&spawn.name)));
                facts.insert(Fact::binary(
                    Predicate::Is,
                    Term::location(&spawn.name),
                    Term::category(&loc.category),
                ));
                facts.insert(Fact::binary(
                    Predicate::AtRoom,
                    Term::location(&spawn.name),
                    Term::location(&loc.parent),
                ));
            }
            loc_categories.insert(loc.category.as_str());
        }
        for category in loc_categories {
            facts.insert(Fact::unary(Predicate::Type, Term::category(category)));
        }

        // Objects.
        let mut obj_categories = BTreeSet::new();
        for obj in world.objects() {
            facts.insert(Fact::unary(Predicate::Obj, Term::object(&obj.name)));
            facts.insert(Fact::binary(
                Predicate::Is,
                Term::object(&obj.name),
                Term::category(&obj.category),
            ));
            // Held objects are located by the Holding fact instead.
            let held = hand == HandState::Holding(obj.name.as_str());
            match &obj.parent {
                Some(parent) if !held => {
                    facts.insert(Fact::binary(
                        Predicate::At,
                        Term::object(&obj.name),
                        Term::location(parent),
                    ));
                }
                None if !held => {
                    warn!(object = %obj.name, "object has no parent and is not held; omitting At fact");
                }
                _ => {}
            }
            obj_categories.insert(obj.category.as_str());
        }
        for category in obj_categories {
            facts.insert(Fact::unary(Predicate::Type, Term::category(category)));
        }

        debug!(facts = facts.len(), "encoded world state");
        facts
    }
}
