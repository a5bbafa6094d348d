//! Configuration validation.
//!
//! Catches values the external simulator would reject (or silently
//! misbehave on) before a run is started.

use weft_types::{Scalar, WeftError, WeftResult};

use crate::config::{Cloth, SimulationConfig};

/// Validates a complete simulation configuration.
///
/// Checks:
/// - Frame timing is positive and finite
/// - At least one cloth is configured
/// - Strain limits and remeshing size ranges are ordered
/// - Collision tuning is non-negative
pub fn validate_config(config: &SimulationConfig) -> WeftResult<()> {
    positive("frame_time", config.frame_time)?;
    positive("end_time", config.end_time)?;
    if config.frame_steps == 0 {
        return Err(WeftError::InvalidConfig(
            "frame_steps must be >= 1".into(),
        ));
    }
    if config.end_time < config.frame_time {
        return Err(WeftError::InvalidConfig(format!(
            "end_time ({}) is shorter than one frame ({})",
            config.end_time, config.frame_time
        )));
    }

    if config.cloths.is_empty() {
        return Err(WeftError::InvalidConfig(
            "At least one cloth is required".into(),
        ));
    }
    for (i, cloth) in config.cloths.iter().enumerate() {
        validate_cloth(cloth).map_err(|e| match e {
            WeftError::InvalidConfig(msg) => WeftError::InvalidConfig(format!("cloths[{i}]: {msg}")),
            other => other,
        })?;
    }

    if let Some(g) = config.gravity {
        if g.iter().any(|c| !c.is_finite()) {
            return Err(WeftError::InvalidConfig(format!(
                "gravity must be finite, got {g:?}"
            )));
        }
    }

    if config.magic.repulsion_thickness < 0.0 {
        return Err(WeftError::InvalidConfig(
            "magic.repulsion_thickness must be non-negative".into(),
        ));
    }
    if config.magic.collision_stiffness < 0.0 {
        return Err(WeftError::InvalidConfig(
            "magic.collision_stiffness must be non-negative".into(),
        ));
    }

    Ok(())
}

fn validate_cloth(cloth: &Cloth) -> WeftResult<()> {
    if cloth.mesh.as_os_str().is_empty() {
        return Err(WeftError::InvalidConfig("mesh path is empty".into()));
    }

    for material in &cloth.materials {
        if let Some(t) = material.thicken {
            positive("thicken", t)?;
        }
        if let Some(limits) = material.strain_limits {
            ordered("strain_limits", limits)?;
        }
    }

    if let Some(remesh) = &cloth.remeshing {
        positive("remeshing.size[0]", remesh.size[0])?;
        ordered("remeshing.size", remesh.size)?;
        if remesh.aspect_min < 0.0 {
            return Err(WeftError::InvalidConfig(
                "remeshing.aspect_min must be non-negative".into(),
            ));
        }
    }

    if let Some(rotate) = cloth.transform.as_ref().and_then(|t| t.rotate) {
        if rotate.axis.iter().all(|&c| c == 0.0) {
            return Err(WeftError::InvalidConfig(
                "rotation axis must be non-zero".into(),
            ));
        }
    }

    Ok(())
}

fn positive(name: &str, value: Scalar) -> WeftResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(WeftError::InvalidConfig(format!(
            "{name} must be positive, got {value}"
        )))
    }
}

fn ordered(name: &str, [min, max]: [Scalar; 2]) -> WeftResult<()> {
    if min <= max {
        Ok(())
    } else {
        Err(WeftError::InvalidConfig(format!(
            "{name} is inverted: [{min}, {max}]"
        )))
    }
}
