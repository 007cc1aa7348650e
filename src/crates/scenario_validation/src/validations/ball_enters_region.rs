use crate::error::EvaluationError;
use crate::geom::Region;
use crate::validation::{Validation, ValidationGeometry, ValidationStatus};
use crate::world::{Field, World};

use super::region_geometry;

/// Passes while the ball is inside any of the given regions.
#[derive(Debug, Clone)]
pub struct BallEntersRegion {
    regions: Vec<Region>,
}

impl BallEntersRegion {
    pub fn new(regions: Vec<Region>) -> Self {
        Self { regions }
    }

    /// The ball ends up in the enemy net.
    pub fn enemy_goal(field: &Field) -> Self {
        Self::new(vec![field.enemy_goal().into()])
    }
}

impl Validation for BallEntersRegion {
    fn evaluate(&mut self, world: &World) -> Result<ValidationStatus, EvaluationError> {
        let ball = world.ball.position;
        Ok(if self.regions.iter().any(|region| region.contains(ball)) {
            ValidationStatus::Passing
        } else {
            ValidationStatus::Failing
        })
    }

    fn geometry(&self, _world: &World) -> ValidationGeometry {
        region_geometry(&self.regions)
    }

    fn describe(&self) -> String {
        format!("Checking that the ball enters one of {} region(s)", self.regions.len())
    }
}
