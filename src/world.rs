//! Read-only view of the world model consumed by the fact encoder.
//!
//! The world model itself (room graph, pose storage, geometry) lives outside this crate and is
//! reached through [`WorldModel`]. [`World`] is a small in-memory snapshot implementing it,
//! suitable for handing an isolated copy of the world to each planning call.

use serde::{Deserialize, Serialize};

use crate::error::WorldError;
use crate::geometry::{Footprint, Pose};

/// What the robot's gripper currently holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandState<'a> {
    Empty,
    Holding(&'a str),
}

/// The robot being planned for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Robot {
    pub name: String,
    pub pose: Pose,
    /// Last known location; `None` means it must be derived from the pose.
    #[serde(default)]
    pub location: Option<String>,
    /// Object currently in the gripper, if any.
    #[serde(default)]
    pub manipulated_object: Option<String>,
}

impl Robot {
    pub fn new(name: impl Into<String>, pose: Pose) -> Self {
        Self {
            name: name.into(),
            pose,
            location: None,
            manipulated_object: None,
        }
    }

    pub fn at_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn holding(mut self, object: impl Into<String>) -> Self {
        self.manipulated_object = Some(object.into());
        self
    }

    /// The single authoritative hand state for this robot.
    pub fn hand_state(&self) -> HandState<'_> {
        match &self.manipulated_object {
            Some(obj) => HandState::Holding(obj),
            None => HandState::Empty,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub name: String,
    #[serde(default)]
    pub footprint: Option<Footprint>,
}

impl Room {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            footprint: None,
        }
    }

    pub fn with_footprint(mut self, footprint: Footprint) -> Self {
        self.footprint = Some(footprint);
        self
    }
}

/// A named placement point inside a location where objects may sit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectSpawn {
    pub name: String,
    #[serde(default)]
    pub footprint: Option<Footprint>,
}

impl ObjectSpawn {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            footprint: None,
        }
    }

    pub fn with_footprint(mut self, footprint: Footprint) -> Self {
        self.footprint = Some(footprint);
        self
    }
}

/// A piece of furniture or fixture inside a room, owning one or more object spawns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub category: String,
    /// Name of the room containing this location.
    pub parent: String,
    #[serde(default)]
    pub children: Vec<ObjectSpawn>,
}

impl Location {
    pub fn new(name: impl Into<String>, category: impl Into<String>, parent: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            parent: parent.into(),
            children: Vec::new(),
        }
    }

    pub fn with_spawn(mut self, spawn: ObjectSpawn) -> Self {
        self.children.push(spawn);
        self
    }
}

/// A movable object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obj {
    pub name: String,
    pub category: String,
    /// Spawn the object rests on; `None` while it is held by the robot.
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub pose: Option<Pose>,
}

impl Obj {
    pub fn new(name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            parent: None,
            pose: None,
        }
    }

    pub fn at(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn with_pose(mut self, pose: Pose) -> Self {
        self.pose = Some(pose);
        self
    }
}

/// Read access to a world model snapshot.
///
/// Collections are iterated in the order returned here, which fixes the encoder's output order.
pub trait WorldModel {
    fn robot(&self) -> &Robot;
    fn rooms(&self) -> &[Room];
    fn locations(&self) -> &[Location];
    fn objects(&self) -> &[Obj];

    /// Resolves a pose to the name of the location containing it, if any.
    fn location_from_pose(&self, pose: &Pose) -> Option<String>;
}

/// In-memory world snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct World {
    robot: Robot,
    rooms: Vec<Room>,
    locations: Vec<Location>,
    objects: Vec<Obj>,
}

impl World {
    pub fn new(robot: Robot) -> Self {
        Self {
            robot,
            rooms: Vec::new(),
            locations: Vec::new(),
            objects: Vec::new(),
        }
    }

    pub fn add_room(&mut self, room: Room) -> Result<(), WorldError> {
        self.ensure_unused(&room.name, "room")?;
        self.rooms.push(room);
        Ok(())
    }

    /// Adds a location; its parent room must already exist.
    pub fn add_location(&mut self, location: Location) -> Result<(), WorldError> {
        self.ensure_unused(&location.name, "location")?;
        for spawn in &location.children {
            self.ensure_unused(&spawn.name, "spawn")?;
        }
        if !self.rooms.iter().any(|r| r.name == location.parent) {
            return Err(WorldError::UnknownParent {
                kind: "location",
                name: location.name,
                parent: location.parent,
            });
        }
        self.locations.push(location);
        Ok(())
    }

    /// Adds an object; a parent, when given, must name an existing spawn.
    pub fn add_object(&mut self, object: Obj) -> Result<(), WorldError> {
        self.ensure_unused(&object.name, "object")?;
        if let Some(parent) = &object.parent {
            if self.spawn(parent).is_none() {
                return Err(WorldError::UnknownParent {
                    kind: "object",
                    name: object.name.clone(),
                    parent: parent.clone(),
                });
            }
        }
        self.objects.push(object);
        Ok(())
    }

    pub fn robot_mut(&mut self) -> &mut Robot {
        &mut self.robot
    }

    pub fn set_robot(&mut self, robot: Robot) {
        self.robot = robot;
    }

    /// Looks up a spawn and the location owning it.
    pub fn spawn(&self, name: &str) -> Option<(&Location, &ObjectSpawn)> {
        self.locations
            .iter()
            .find_map(|loc| loc.children.iter().find(|s| s.name == name).map(|s| (loc, s)))
    }

    pub fn object(&self, name: &str) -> Option<&Obj> {
        self.objects.iter().find(|o| o.name == name)
    }

    fn ensure_unused(&self, name: &str, kind: &'static str) -> Result<(), WorldError> {
        let taken = self.rooms.iter().any(|r| r.name == name)
            || self.locations.iter().any(|l| l.name == name || l.children.iter().any(|s| s.name == name))
            || self.objects.iter().any(|o| o.name == name);
        if taken {
            return Err(WorldError::DuplicateName {
                kind,
                name: name.to_string(),
            });
        }
        Ok(())
    }
}

impl WorldModel for World {
    fn robot(&self) -> &Robot {
        &self.robot
    }

    fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    fn locations(&self) -> &[Location] {
        &self.locations
    }

    fn objects(&self) -> &[Obj] {
        &self.objects
    }

    /// Prefers the most specific match: a containing spawn, then a containing room.
    fn location_from_pose(&self, pose: &Pose) -> Option<String> {
        let spawn = self
            .locations
            .iter()
            .flat_map(|loc| loc.children.iter())
            .filter(|s| s.footprint.is_some_and(|fp| fp.contains(pose)))
            .min_by(|a, b| footprint_area(a.footprint).total_cmp(&footprint_area(b.footprint)));
        if let Some(spawn) = spawn {
            return Some(spawn.name.clone());
        }

        self.rooms
            .iter()
            .find(|r| r.footprint.is_some_and(|fp| fp.contains(pose)))
            .map(|r| r.name.clone())
    }
}

fn footprint_area(footprint: Option<Footprint>) -> f64 {
    footprint.map_or(f64::INFINITY, |fp| fp.area())
}
