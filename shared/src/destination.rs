//! Arrival transform computation.
//!
//! Gate arrivals take the spawn point from the destination gate and rotate
//! the incoming velocity by the angle between the two gates, so momentum
//! carries through a turned link. Direct arrivals land on an explicit
//! location or a world spawn, keep the traveler's orientation and carry the
//! velocity through unchanged.
//!
//! Both paths then run a single-sample safety scan: if the block one
//! velocity-step ahead of the destination is not passable, the velocity is
//! zeroed so the traveler is not driven into solid matter. Only that one
//! cell is tested.

use log::debug;

use crate::{Direction, Gate, ReservationError, Transform, Vector, WorldMutType, WorldRefType};

/// Rotate `velocity` about the vertical axis by the angle from `from` to
/// `to`. Magnitude is preserved and equal directions return the input.
pub fn rotate(velocity: &Vector, from: Direction, to: Direction) -> Vector {
    if from == to {
        return *velocity;
    }

    let delta = (to.heading() - from.heading()).to_radians();
    let (sin, cos) = delta.sin_cos();

    Vector::new(
        velocity.x * cos - velocity.z * sin,
        velocity.y,
        velocity.x * sin + velocity.z * cos,
    )
}

pub fn resolve_via_gate(
    departure: &Transform,
    departure_direction: Direction,
    gate: &dyn Gate,
) -> Transform {
    let mut destination = gate.spawn_transform(departure, departure_direction);
    if destination.world.is_none() {
        destination.world = Some(gate.world().to_string());
    }
    destination.velocity = rotate(&departure.velocity, departure_direction, gate.direction());

    debug!("departure: {}, velocity {}", departure, departure.velocity);
    debug!(
        "arrival via '{}': {}, velocity {}",
        gate.name(),
        destination,
        destination.velocity
    );

    destination
}

/// Destination without a gate: the explicit location if there is one,
/// otherwise the spawn of `target_world` or of the default world.
pub fn resolve_direct<W: WorldRefType>(
    world: &W,
    explicit: Option<&Transform>,
    target_world: Option<&str>,
    departure: &Transform,
) -> Result<Transform, ReservationError> {
    let mut destination = match explicit {
        Some(location) => {
            let mut location = location.clone();
            if location.world.is_none() {
                location.world = Some(
                    target_world
                        .map(str::to_string)
                        .unwrap_or_else(|| world.default_world()),
                );
            }
            location
        }
        None => {
            let world_name = target_world
                .map(str::to_string)
                .unwrap_or_else(|| world.default_world());
            world
                .world_spawn(&world_name)
                .ok_or(ReservationError::UnknownWorld { world: world_name })?
        }
    };

    if let Some(world_name) = &destination.world {
        if !world.has_world(world_name) {
            return Err(ReservationError::UnknownWorld {
                world: world_name.clone(),
            });
        }
    }

    destination.yaw = departure.yaw;
    destination.pitch = departure.pitch;
    destination.velocity = departure.velocity;

    Ok(destination)
}

/// Zero the destination velocity when the look-ahead block is not passable.
/// Returns whether the velocity was zeroed.
pub fn apply_safety_scan<W: WorldMutType>(world: &mut W, destination: &mut Transform) -> bool {
    let world_name = match &destination.world {
        Some(name) => name.clone(),
        None => world.default_world(),
    };

    world.ensure_loaded(&world_name, &destination.position);

    let next = destination.position + destination.velocity;
    world.ensure_loaded(&world_name, &next);

    let obstruction = world.obstruction_at(&world_name, &next);
    if obstruction.is_passable() {
        return false;
    }

    debug!(
        "zeroing velocity to avoid {:?} at {}",
        obstruction, next
    );
    destination.velocity = Vector::ZERO;
    true
}
