//! Planner solution → typed task plan.

use tracing::{debug, info, warn};

use crate::actions::{
    ActionTag, ManipulationAction, NavigateAction, PlanArg, PlannerAction, PlannerSolution, TaskAction,
    TaskPlan,
};
use crate::error::DecodeError;
use crate::geometry::{Path, Pose};

/// Decodes planner solutions into [`TaskPlan`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlanDecoder;

impl PlanDecoder {
    pub fn new() -> Self {
        Self
    }

    /// Decodes a planner solution.
    ///
    /// Returns `Ok(None)` when the planner found no plan (absent or empty action sequence).
    /// Actions with unrecognized names are kept as [`TaskAction::Unsupported`]; a recognized
    /// action with missing or mistyped required arguments fails the whole decode.
    #[tracing::instrument(skip_all, fields(total_cost = solution.total_cost))]
    pub fn decode(&self, solution: &PlannerSolution) -> Result<Option<TaskPlan>, DecodeError> {
        let actions = match solution.plan.as_deref() {
            None | Some([]) => {
                info!("planner returned no plan");
                return Ok(None);
            }
            Some(actions) => actions,
        };

        let actions = actions
            .iter()
            .enumerate()
            .map(|(index, action)| decode_action(index, action))
            .collect::<Result<Vec<_>, _>>()?;

        let plan = TaskPlan {
            actions,
            total_cost: solution.total_cost,
        };
        info!(actions = plan.len(), "decoded task plan");
        Ok(Some(plan))
    }
}

fn decode_action(index: usize, action: &PlannerAction) -> Result<TaskAction, DecodeError> {
    let args = Args { index, action };
    let decoded = match ActionTag::from(action.name.as_str()) {
        ActionTag::Navigate => TaskAction::Navigate(NavigateAction {
            robot: args.reference(0)?,
            source_location: args.reference(1)?,
            target_location: args.reference(2)?,
            path: args.last_path_from(3),
        }),
        ActionTag::Pick => TaskAction::Pick(args.manipulation()?),
        ActionTag::Place => TaskAction::Place(args.manipulation()?),
        ActionTag::Other(_) => {
            warn!(index, name = %action.name, "no typed decoding for action; keeping name only");
            TaskAction::Unsupported {
                name: action.name.clone(),
            }
        }
    };
    debug!(index, action = %decoded, "decoded action");
    Ok(decoded)
}

/// Positional argument access with errors that point at the offending action.
struct Args<'a> {
    index: usize,
    action: &'a PlannerAction,
}

impl Args<'_> {
    fn get(&self, position: usize) -> Result<&PlanArg, DecodeError> {
        self.action
            .args
            .get(position)
            .ok_or_else(|| DecodeError::MissingArgument {
                index: self.index,
                action: self.action.name.clone(),
                position,
            })
    }

    fn unexpected(&self, position: usize, expected: &'static str, found: &PlanArg) -> DecodeError {
        DecodeError::UnexpectedArgument {
            index: self.index,
            action: self.action.name.clone(),
            position,
            expected,
            found: found.kind(),
        }
    }

    fn reference(&self, position: usize) -> Result<String, DecodeError> {
        match self.get(position)? {
            PlanArg::Ref(name) => Ok(name.clone()),
            other => Err(self.unexpected(position, "reference", other)),
        }
    }

    fn optional_pose(&self, position: usize) -> Result<Option<Pose>, DecodeError> {
        match self.action.args.get(position) {
            None => Ok(None),
            Some(PlanArg::Pose(pose)) => Ok(Some(*pose)),
            Some(other) => Err(self.unexpected(position, "pose", other)),
        }
    }

    /// The last path among the arguments from `position` on; later paths override earlier ones.
    fn last_path_from(&self, position: usize) -> Option<Path> {
        self.action
            .args
            .iter()
            .skip(position)
            .rev()
            .find_map(|arg| match arg {
                PlanArg::Path(path) => Some(path.clone()),
                _ => None,
            })
    }

    fn manipulation(&self) -> Result<ManipulationAction, DecodeError> {
        Ok(ManipulationAction {
            robot: self.reference(0)?,
            object: self.reference(1)?,
            target_location: self.reference(2)?,
            pose: self.optional_pose(3)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(name: &str) -> PlanArg {
        PlanArg::reference(name)
    }

    fn single(action: PlannerAction, cost: f64) -> TaskPlan {
        PlanDecoder::new()
            .decode(&PlannerSolution::new(vec![action], cost))
            .expect("decode")
            .expect("plan")
    }

    #[test]
    fn absent_or_empty_solution_is_no_plan() {
        let decoder = PlanDecoder::new();
        let none = PlannerSolution::not_found().with_metadata(serde_json::json!({}));
        assert_eq!(decoder.decode(&none), Ok(None));
        assert_eq!(decoder.decode(&PlannerSolution::new(vec![], 3.0)), Ok(None));
    }

    #[test]
    fn navigate_carries_locations_and_path() {
        let path = Path::new(vec![Pose::from_xy_yaw(0.0, 0.0, 0.0), Pose::from_xy_yaw(2.0, 1.0, 0.0)]);
        let plan = single(
            PlannerAction::new(
                "navigate",
                vec![r("Bot"), r("S"), r("Kitchen"), PlanArg::Path(path.clone())],
            ),
            4.5,
        );

        assert_eq!(plan.total_cost, 4.5);
        assert_eq!(
            plan.actions,
            vec![TaskAction::Navigate(NavigateAction {
                robot: "Bot".to_string(),
                source_location: "S".to_string(),
                target_location: "Kitchen".to_string(),
                path: Some(path),
            })]
        );
    }

    #[test]
    fn navigate_without_path_is_tolerated() {
        let plan = single(PlannerAction::new("navigate", vec![r("Bot"), r("S"), r("Kitchen")]), 1.0);
        match &plan.actions[0] {
            TaskAction::Navigate(nav) => assert_eq!(nav.path, None),
            other => panic!("expected navigate, got {other:?}"),
        }
    }

    #[test]
    fn navigate_scans_trailing_args_for_the_path() {
        let path = Path::new(vec![Pose::from_xy_yaw(1.0, 1.0, 0.0)]);
        let plan = single(
            PlannerAction::new(
                "navigate",
                vec![
                    r("Bot"),
                    r("S"),
                    r("Kitchen"),
                    PlanArg::Pose(Pose::default()),
                    PlanArg::Path(path.clone()),
                ],
            ),
            1.0,
        );
        match &plan.actions[0] {
            TaskAction::Navigate(nav) => assert_eq!(nav.path.as_ref(), Some(&path)),
            other => panic!("expected navigate, got {other:?}"),
        }
    }

    #[test]
    fn pick_without_pose() {
        let plan = single(PlannerAction::new("pick", vec![r("Bot"), r("O"), r("S")]), 0.5);
        assert_eq!(
            plan.actions[0],
            TaskAction::Pick(ManipulationAction {
                robot: "Bot".to_string(),
                object: "O".to_string(),
                target_location: "S".to_string(),
                pose: None,
            })
        );
    }

    #[test]
    fn place_with_pose() {
        let pose = Pose::from_xy_yaw(1.0, 2.0, 0.5);
        let plan = single(
            PlannerAction::new("place", vec![r("Bot"), r("O"), r("S"), PlanArg::Pose(pose)]),
            0.5,
        );
        match &plan.actions[0] {
            TaskAction::Place(m) => assert_eq!(m.pose, Some(pose)),
            other => panic!("expected place, got {other:?}"),
        }
    }

    #[test]
    fn unknown_action_keeps_plan_length_and_order() {
        let decoder = PlanDecoder::new();
        let solution = PlannerSolution::new(
            vec![
                PlannerAction::new("detect", vec![r("Bot"), r("S")]),
                PlannerAction::new("pick", vec![r("Bot"), r("O"), r("S")]),
            ],
            2.0,
        );
        let plan = decoder.decode(&solution).expect("decode").expect("plan");

        assert_eq!(plan.len(), 2);
        assert_eq!(
            plan.actions[0],
            TaskAction::Unsupported {
                name: "detect".to_string()
            }
        );
        assert_eq!(plan.actions[1].tag(), ActionTag::Pick);
    }

    #[test]
    fn malformed_recognized_action_fails_fast() {
        let decoder = PlanDecoder::new();
        let solution = PlannerSolution::new(
            vec![
                PlannerAction::new("navigate", vec![r("Bot"), r("S"), r("Kitchen")]),
                PlannerAction::new("pick", vec![r("Bot"), r("O")]),
            ],
            1.0,
        );
        assert_eq!(
            decoder.decode(&solution),
            Err(DecodeError::MissingArgument {
                index: 1,
                action: "pick".to_string(),
                position: 2,
            })
        );

        let solution = PlannerSolution::new(
            vec![PlannerAction::new(
                "place",
                vec![r("Bot"), r("O"), r("S"), r("not_a_pose")],
            )],
            1.0,
        );
        assert!(matches!(
            decoder.decode(&solution),
            Err(DecodeError::UnexpectedArgument {
                position: 3,
                expected: "pose",
                found: "reference",
                ..
            })
        ));
    }

    #[test]
    fn total_cost_is_copied_verbatim() {
        let plan = single(
            PlannerAction::new("pick", vec![r("Bot"), r("O"), r("S")]),
            f64::INFINITY,
        );
        assert_eq!(plan.total_cost, f64::INFINITY);

        let plan = single(PlannerAction::new("pick", vec![r("Bot"), r("O"), r("S")]), f64::NAN);
        assert!(plan.total_cost.is_nan());
        assert_eq!(plan.len(), 1);
    }
}
