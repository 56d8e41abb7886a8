use log::debug;

use crate::error::{BvhError, SceneRejection};
use crate::types::{BvhSkeleton, Position};

/// The narrow capability a host scene graph exposes to the importer.
///
/// The host decides what a "joint node" actually is; the importer only asks
/// for node creation and raw channel keyframes. Channel names are forwarded
/// verbatim ("Xposition", "Zrotation", ...) — mapping them onto host
/// attributes is the host's business, not the parser's.
pub trait JointScene {
    /// Opaque handle to a created node, echoed back as the parent of that
    /// node's children.
    type Handle: Clone;

    /// Create a skeletal joint node, placed under `parent` or at the scene
    /// root for `None`.
    fn create_joint(
        &mut self,
        name: &str,
        offset: Position,
        parent: Option<&Self::Handle>,
    ) -> Result<Self::Handle, SceneRejection>;

    /// Key one channel of a node at `time` seconds.
    fn set_key(
        &mut self,
        joint: &Self::Handle,
        channel: &str,
        time: f64,
        value: f64,
    ) -> Result<(), SceneRejection>;
}

/// Walks the skeleton depth-first, parent before children, creating one
/// scene node per joint — End Sites included, as placeholder leaves — and
/// keying every channel of every frame right after each node is created.
///
/// The first rejection aborts the remaining walk and surfaces verbatim.
/// Returns the created handles in joint arena order.
pub fn build_scene<S: JointScene>(
    bvh: &BvhSkeleton,
    scene: &mut S,
) -> Result<Vec<S::Handle>, BvhError> {
    let mut handles: Vec<S::Handle> = Vec::with_capacity(bvh.joints.len());

    // arena order is the parent-before-child discovery order, so a joint's
    // parent handle always exists by the time the joint is reached
    for joint in bvh.joints.iter() {
        let parent = if joint.parent_index >= 0 {
            Some(&handles[joint.parent_index as usize])
        } else {
            None
        };
        let handle = scene.create_joint(&joint.name, joint.offset, parent)?;

        for (frame, row) in joint.frame_values.iter().enumerate() {
            let time = frame as f64 * bvh.frame_time;
            for (channel, &value) in joint.channels.iter().zip(row.iter()) {
                scene.set_key(&handle, channel, time, value)?;
            }
        }
        handles.push(handle);
    }

    debug!(
        "bound {} scene nodes across {} roots",
        handles.len(),
        bvh.roots.len()
    );
    Ok(handles)
}
