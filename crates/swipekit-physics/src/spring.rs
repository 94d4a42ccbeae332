//! Spring physics primitives.
//!
//! One integration step, a settle check, and the preset configurations the
//! controllers animate with. Integration is semi-implicit Euler: velocity is
//! updated first and the *new* velocity moves the position, which keeps the
//! simulation stable at interactive frame rates where explicit Euler with
//! the same constants visibly oscillates or diverges.

/// Default position epsilon for the settle check, in position units.
pub const REST_POSITION_EPSILON: f32 = 0.1;

/// Default velocity epsilon for the settle check, in position units per second.
pub const REST_VELOCITY_EPSILON: f32 = 0.1;

/// Configuration for a spring animation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpringConfig {
    /// Spring stiffness (higher = snappier).
    pub stiffness: f32,
    /// Damping coefficient (higher = less oscillation).
    pub damping: f32,
    /// Mass of the animated value.
    pub mass: f32,
}

impl SpringConfig {
    pub fn new(stiffness: f32, damping: f32, mass: f32) -> Self {
        Self {
            stiffness,
            damping,
            mass,
        }
    }

    /// Balanced snap animation, the general-purpose preset.
    pub fn snap() -> Self {
        Self::new(300.0, 30.0, 1.0)
    }

    /// Playful feedback with visible overshoot.
    pub fn bouncy() -> Self {
        Self::new(400.0, 20.0, 1.0)
    }

    /// Subtle ambient transitions.
    pub fn gentle() -> Self {
        Self::new(150.0, 20.0, 1.0)
    }

    /// Quick snaps with minimal overshoot.
    pub fn stiff() -> Self {
        Self::new(500.0, 40.0, 1.0)
    }

    /// Tuned for card-carousel navigation.
    pub fn carousel_snap() -> Self {
        Self::new(300.0, 28.0, 1.0)
    }

    /// The damping at which this spring stops oscillating fastest.
    pub fn critical_damping(&self) -> f32 {
        2.0 * (self.stiffness * self.mass).sqrt()
    }

    /// True if the spring will overshoot and oscillate.
    pub fn is_underdamped(&self) -> bool {
        self.damping < self.critical_damping()
    }
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self::snap()
    }
}

/// Result of one spring integration step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpringState {
    pub position: f32,
    pub velocity: f32,
}

/// Advances `(position, velocity)` toward `target` by `dt` seconds.
///
/// Force model: `F = -stiffness * (position - target) - damping * velocity`.
pub fn spring_step(
    position: f32,
    velocity: f32,
    target: f32,
    config: &SpringConfig,
    dt: f32,
) -> SpringState {
    let displacement = position - target;
    let spring_force = -config.stiffness * displacement;
    let damping_force = -config.damping * velocity;
    let acceleration = (spring_force + damping_force) / config.mass;

    let new_velocity = velocity + acceleration * dt;
    let new_position = position + new_velocity * dt;

    SpringState {
        position: new_position,
        velocity: new_velocity,
    }
}

/// True once both displacement and velocity are within the default epsilons.
pub fn is_spring_at_rest(position: f32, velocity: f32, target: f32) -> bool {
    is_spring_at_rest_with(
        position,
        velocity,
        target,
        REST_POSITION_EPSILON,
        REST_VELOCITY_EPSILON,
    )
}

/// Settle check with explicit thresholds.
pub fn is_spring_at_rest_with(
    position: f32,
    velocity: f32,
    target: f32,
    position_epsilon: f32,
    velocity_epsilon: f32,
) -> bool {
    (position - target).abs() < position_epsilon && velocity.abs() < velocity_epsilon
}
