use cgmath::Vector3;

pub type Index = usize;
pub type ParentIndex = isize; // can be -1 if joint has no parent
pub type Position = Vector3<f64>;

/////////////////////////////////////////////////////////////////////////////////////////////////

/// A single node of the skeletal hierarchy.
///
/// End Sites are joints too: they occupy an arena slot with no channels and
/// no children, so parent bookkeeping and scene binding see them, but they
/// never take part in the motion-channel stream.
#[derive(Debug, Clone, PartialEq)]
pub struct Joint {
    pub name: String,
    pub index: Index,
    pub parent_index: ParentIndex,
    /// Nesting depth, 0 for roots.
    pub depth: usize,
    /// Translation relative to the parent joint (or the world, for roots).
    pub offset: Position,
    /// Channel names in file order; also the column order of `frame_values`.
    pub channels: Vec<String>,
    pub children: Vec<Index>,
    pub is_end_site: bool,
    /// One row per frame, each row aligned 1:1 with `channels`.
    pub frame_values: Vec<Vec<f64>>,
}

/// A fully parsed .bvh document: the joint arena plus global motion metadata.
///
/// The arena owns every joint of every root hierarchy; arena order is the
/// depth-first order in which joints were discovered during parsing, which
/// is also the order their channels appear in each motion frame.
#[derive(Debug, Clone)]
pub struct BvhSkeleton {
    pub joints: Vec<Joint>,
    /// One entry per ROOT block, in declaration order.
    pub roots: Vec<Index>,
    pub num_frames: usize,
    /// Seconds per frame.
    pub frame_time: f64,
    pub fps: u32,
}

/////////////////////////////////////////////////////////////////////////////////////////////////

impl BvhSkeleton {
    pub fn find_joint_by_index(&self, index: Index) -> &Joint {
        &self.joints[index]
    }

    /// First joint with the given name, if any. Names are not required to
    /// be unique in a .bvh file.
    pub fn find_joint_by_name(&self, name: &str) -> Option<&Joint> {
        self.joints.iter().find(|joint| joint.name == name)
    }

    /// Width of one motion frame in floats. End Sites contribute nothing.
    pub fn total_channels(&self) -> usize {
        self.joints.iter().map(|joint| joint.channels.len()).sum()
    }

    /// Depth-first walk over the tree links, parent before children,
    /// children in declaration order. For a well-formed skeleton this is
    /// exactly `0..joints.len()`.
    pub fn dfs_order(&self) -> Vec<Index> {
        let mut order = Vec::with_capacity(self.joints.len());
        for &root in self.roots.iter() {
            let mut stack = vec![root];
            while let Some(index) = stack.pop() {
                order.push(index);
                // reversed so children pop in declaration order
                for &child in self.joints[index].children.iter().rev() {
                    stack.push(child);
                }
            }
        }
        order
    }

    /// Returns the kinematic chains of the skeleton like \[\[0,1,2,3\],\[4,5\]\].
    /// Usually the chains are: spine+head, left/right leg and left/right arm.
    pub fn kinematic_chains(&self) -> Vec<Vec<Index>> {
        let mut chains: Vec<Vec<Index>> = Vec::new();
        let mut chain: Vec<Index> = Vec::new();
        let mut last_depth: isize = -1;
        for joint in self.joints.iter() {
            if last_depth != joint.depth as isize - 1 && !chain.is_empty() {
                chains.push(std::mem::take(&mut chain));
            }
            last_depth = joint.depth as isize;
            chain.push(joint.index);
        }
        if !chain.is_empty() {
            chains.push(chain);
        }
        chains
    }
}
