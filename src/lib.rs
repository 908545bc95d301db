//! PAGI task bridge: translation between the world model and the symbolic task planner.
//!
//! This crate defines:
//! - [`FactEncoder`]: turns a world snapshot into the planner's initial-state facts.
//! - [`PlanDecoder`]: turns a planner solution into a typed [`TaskPlan`].
//! - [`SymbolicPlanner`]: the async contract an external planner must implement.
//! - [`PlanningCore`]: wires encoder, planner and decoder into one planning call.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

pub mod actions;
pub mod config;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod facts;
pub mod geometry;
pub mod world;

pub use actions::{
    ActionTag, ManipulationAction, NavigateAction, PlanArg, PlannerAction, PlannerSolution, TaskAction,
    TaskPlan,
};
pub use config::PlannerConfig;
pub use decoder::PlanDecoder;
pub use encoder::FactEncoder;
pub use error::{ConfigError, DecodeError, PlanningError, WorldError};
pub use facts::{Fact, FactSet, Predicate, Term};
pub use geometry::{Footprint, Path, Pose};
pub use world::{HandState, Location, Obj, ObjectSpawn, Robot, Room, World, WorldModel};

/// Everything the external planner needs for one call.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanningProblem {
    /// Domain definition file (actions and predicates).
    pub domain_file: std::path::PathBuf,
    /// Stream definition file (samplers for poses, paths, grasps).
    pub stream_file: std::path::PathBuf,
    pub init: FactSet,
    pub goal: Vec<Fact>,
}

/// The contract for external symbolic planners.
///
/// Implementations run the actual search; "no plan found" is reported through
/// [`PlannerSolution::not_found`], not as an error.
#[async_trait]
pub trait SymbolicPlanner: Send + Sync {
    async fn solve(&self, problem: &PlanningProblem) -> Result<PlannerSolution, PlanningError>;
}

/// One planning round trip: encode the world, call the planner, decode its answer.
///
/// Holds no world state; each call encodes the snapshot it is given.
pub struct PlanningCore {
    planner: Arc<dyn SymbolicPlanner>,
    config: PlannerConfig,
    encoder: FactEncoder,
    decoder: PlanDecoder,
}

impl std::fmt::Debug for PlanningCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlanningCore")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl PlanningCore {
    /// Validates `config` and builds the core around `planner`.
    pub fn new(planner: Arc<dyn SymbolicPlanner>, config: PlannerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            planner,
            config,
            encoder: FactEncoder::new(),
            decoder: PlanDecoder::new(),
        })
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Builds the planning problem for `world` and `goal` without calling the planner.
    pub fn problem<W: WorldModel + ?Sized>(&self, world: &W, goal: Vec<Fact>) -> PlanningProblem {
        PlanningProblem {
            domain_file: self.config.domain_file(),
            stream_file: self.config.stream_file(),
            init: self.encoder.encode(world),
            goal,
        }
    }

    /// Plans for `goal` from the state in `world`.
    ///
    /// Returns `Ok(None)` when the planner finds no plan. The planner call is bounded by
    /// [`PlannerConfig::max_planning_time`].
    #[tracing::instrument(skip_all, fields(domain = %self.config.domain_name, goal_len = goal.len()))]
    pub async fn plan<W: WorldModel + ?Sized>(
        &self,
        world: &W,
        goal: Vec<Fact>,
    ) -> Result<Option<TaskPlan>, PlanningError> {
        let problem = self.problem(world, goal);
        let limit = self.config.max_planning_time();

        let solution = tokio::time::timeout(limit, self.planner.solve(&problem))
            .await
            .map_err(|_| PlanningError::Timeout(limit))??;

        let plan = self.decoder.decode(&solution)?;
        match &plan {
            Some(plan) => info!(actions = plan.len(), total_cost = plan.total_cost, "plan found"),
            None => info!("no plan found"),
        }
        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Records the problem it was given and replays a canned solution.
    struct ScriptedPlanner {
        solution: PlannerSolution,
        delay: Duration,
        seen: Mutex<Option<PlanningProblem>>,
    }

    impl ScriptedPlanner {
        fn new(solution: PlannerSolution) -> Self {
            Self {
                solution,
                delay: Duration::ZERO,
                seen: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl SymbolicPlanner for ScriptedPlanner {
        async fn solve(&self, problem: &PlanningProblem) -> Result<PlannerSolution, PlanningError> {
            *self.seen.lock().expect("lock") = Some(problem.clone());
            tokio::time::sleep(self.delay).await;
            Ok(self.solution.clone())
        }
    }

    struct FailingPlanner;

    #[async_trait]
    impl SymbolicPlanner for FailingPlanner {
        async fn solve(&self, _problem: &PlanningProblem) -> Result<PlannerSolution, PlanningError> {
            Err(PlanningError::Planner("domain file not found".to_string()))
        }
    }

    fn kitchen_world() -> World {
        let mut world = World::new(Robot::new("Bot", Pose::default()).at_location("kitchen"));
        world.add_room(Room::new("kitchen")).expect("room");
        world
            .add_location(Location::new("table0", "table", "kitchen").with_spawn(ObjectSpawn::new("table0_top")))
            .expect("location");
        world.add_object(Obj::new("apple0", "apple").at("table0_top")).expect("object");
        world
    }

    fn pick_apple_goal() -> Vec<Fact> {
        vec![Fact::binary(Predicate::Holding, Term::robot("Bot"), Term::object("apple0"))]
    }

    fn r(name: &str) -> PlanArg {
        PlanArg::reference(name)
    }

    #[tokio::test]
    async fn plan_round_trip_hands_encoded_state_to_planner() {
        let solution = PlannerSolution::new(
            vec![
                PlannerAction::new("navigate", vec![r("Bot"), r("kitchen"), r("table0_top")]),
                PlannerAction::new("pick", vec![r("Bot"), r("apple0"), r("table0_top")]),
            ],
            3.25,
        )
        .with_metadata(serde_json::json!({ "search_time": 0.12 }));
        let planner = Arc::new(ScriptedPlanner::new(solution));
        let core = PlanningCore::new(planner.clone(), PlannerConfig::default()).expect("valid config");

        let plan = core
            .plan(&kitchen_world(), pick_apple_goal())
            .await
            .expect("planning succeeds")
            .expect("plan found");

        assert_eq!(plan.len(), 2);
        assert_eq!(plan.total_cost, 3.25);
        assert_eq!(plan.actions[1].tag(), ActionTag::Pick);

        let seen = planner.seen.lock().expect("lock").clone().expect("planner was called");
        assert_eq!(seen.goal, pick_apple_goal());
        assert_eq!(seen.domain_file, core.config().domain_file());
        assert!(seen.init.contains(&Fact::unary(Predicate::HandEmpty, Term::robot("Bot"))));
        assert!(seen.init.contains(&Fact::binary(
            Predicate::At,
            Term::object("apple0"),
            Term::location("table0_top")
        )));
    }

    #[tokio::test]
    async fn no_solution_is_not_an_error() {
        let planner = Arc::new(ScriptedPlanner::new(PlannerSolution::not_found()));
        let core = PlanningCore::new(planner, PlannerConfig::default()).expect("valid config");

        let plan = core.plan(&kitchen_world(), pick_apple_goal()).await.expect("planning succeeds");
        assert_eq!(plan, None);
    }

    #[tokio::test]
    async fn slow_planner_times_out() {
        let mut planner = ScriptedPlanner::new(PlannerSolution::not_found());
        planner.delay = Duration::from_secs(30);
        let config = PlannerConfig {
            max_planning_time_secs: 0.05,
            ..PlannerConfig::default()
        };
        let core = PlanningCore::new(Arc::new(planner), config).expect("valid config");

        let err = core
            .plan(&kitchen_world(), pick_apple_goal())
            .await
            .expect_err("planner should time out");
        assert!(err.is_timeout());
    }

    #[tokio::test]
    async fn planner_errors_propagate() {
        let core = PlanningCore::new(Arc::new(FailingPlanner), PlannerConfig::default()).expect("valid config");
        let err = core
            .plan(&kitchen_world(), pick_apple_goal())
            .await
            .expect_err("planner failure surfaces");
        assert!(matches!(err, PlanningError::Planner(_)));
    }

    #[test]
    fn invalid_config_is_rejected_up_front() {
        let config = PlannerConfig {
            domain_name: String::new(),
            ..PlannerConfig::default()
        };
        let err = PlanningCore::new(Arc::new(FailingPlanner), config).expect_err("empty domain name");
        assert!(matches!(err, ConfigError::EmptyDomainName));
    }
}
