use crate::error::EvaluationError;
use crate::geom::Region;
use crate::validation::{Validation, ValidationGeometry, ValidationStatus};
use crate::world::{RobotId, World};

use super::region_geometry;

/// Passes while a friendly robot is inside any of the given regions.
///
/// With a robot id only that robot counts; otherwise any friendly robot does.
#[derive(Debug, Clone)]
pub struct RobotEntersRegion {
    regions: Vec<Region>,
    robot: Option<RobotId>,
}

impl RobotEntersRegion {
    pub fn new(regions: Vec<Region>) -> Self {
        Self {
            regions,
            robot: None,
        }
    }

    pub fn for_robot(mut self, id: RobotId) -> Self {
        self.robot = Some(id);
        self
    }
}

impl Validation for RobotEntersRegion {
    fn evaluate(&mut self, world: &World) -> Result<ValidationStatus, EvaluationError> {
        let inside = world
            .friendly_robots
            .iter()
            .filter(|robot| self.robot.map_or(true, |id| robot.id == id))
            .any(|robot| self.regions.iter().any(|region| region.contains(robot.position)));
        Ok(if inside {
            ValidationStatus::Passing
        } else {
            ValidationStatus::Failing
        })
    }

    fn geometry(&self, _world: &World) -> ValidationGeometry {
        region_geometry(&self.regions)
    }

    fn describe(&self) -> String {
        let count = self.regions.len();
        match self.robot {
            Some(id) => format!("Checking that robot {id} enters one of {count} region(s)"),
            None => format!("Checking that a robot enters one of {count} region(s)"),
        }
    }
}
