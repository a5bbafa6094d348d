//! Frame-axis concatenation and node tagging.

use tracing::debug;
use weft_types::{NodeId, WeftError, WeftResult};

use crate::state::{NodeRole, SimulationState};

/// Concatenates `b` after `a` along the frame axis.
///
/// The empty state is an identity on both sides, and merging is
/// associative, so a run can be assembled by folding frames in order.
///
/// - Faces and rest vertices must be identical.
/// - Velocities are kept only if both states carry them.
/// - Node roles are per node: when both states carry roles they must
///   agree; when only one does, its roles are kept.
///
/// # Errors
/// [`WeftError::TopologyMismatch`] if the topologies or roles differ.
pub fn merge(mut a: SimulationState, b: SimulationState) -> WeftResult<SimulationState> {
    append(&mut a, b)?;
    Ok(a)
}

/// Appends `other` to `target` in place, with the rules of [`merge()`].
///
/// On error `target` is left untouched.
pub fn append(target: &mut SimulationState, other: SimulationState) -> WeftResult<()> {
    if other.is_empty() {
        return Ok(());
    }
    if target.is_empty() {
        *target = other;
        return Ok(());
    }

    if target.faces() != other.faces() {
        return Err(WeftError::TopologyMismatch(format!(
            "faces differ ({} vs {} triangles)",
            target.faces().len(),
            other.faces().len()
        )));
    }
    if target.rest_vertices() != other.rest_vertices() {
        return Err(WeftError::TopologyMismatch(format!(
            "rest vertices differ ({} vs {} nodes)",
            target.node_count(),
            other.node_count()
        )));
    }
    if let (Some(ra), Some(rb)) = (target.node_roles(), other.node_roles()) {
        if ra != rb {
            return Err(WeftError::TopologyMismatch("node roles differ".into()));
        }
    }

    target.extend_frames(other);
    debug!(
        frames = target.frame_count(),
        nodes = target.node_count(),
        "merged states"
    );
    Ok(())
}

/// Tags every node [`NodeRole::Normal`], then the listed ids
/// [`NodeRole::Handle`].
///
/// # Errors
/// [`WeftError::IndexOutOfRange`] if an id is not a node of `state`.
pub fn assign_roles(mut state: SimulationState, handles: &[NodeId]) -> WeftResult<SimulationState> {
    let count = state.node_count();
    let mut roles = vec![NodeRole::Normal; count];
    for &id in handles {
        let role = roles
            .get_mut(id.index())
            .ok_or(WeftError::IndexOutOfRange { index: id.index(), count })?;
        *role = NodeRole::Handle;
    }
    state.set_node_roles(Some(roles));
    Ok(state)
}
