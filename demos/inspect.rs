use bvh_import::{build_scene, load_bvh_from_string, JointScene, Position, SceneRejection};

const SAMPLE: &str = "\
HIERARCHY
ROOT Hips
{
  OFFSET 0 35 0
  CHANNELS 6 Xposition Yposition Zposition Zrotation Xrotation Yrotation
  JOINT LeftUpLeg
  {
    OFFSET 4 0 0
    CHANNELS 3 Zrotation Xrotation Yrotation
    JOINT LeftLeg
    {
      OFFSET 0 -18 0
      CHANNELS 3 Zrotation Xrotation Yrotation
      End Site
      {
        OFFSET 0 -16 0
      }
    }
  }
  JOINT RightUpLeg
  {
    OFFSET -4 0 0
    CHANNELS 3 Zrotation Xrotation Yrotation
    JOINT RightLeg
    {
      OFFSET 0 -18 0
      CHANNELS 3 Zrotation Xrotation Yrotation
      End Site
      {
        OFFSET 0 -16 0
      }
    }
  }
}
MOTION
Frames: 2
Frame Time: 0.0333333
0 35 0 0 0 0 10 0 0 -20 0 0 -10 0 0 20 0 0
0 35 1 0 5 0 12 0 0 -24 0 0 -12 0 0 24 0 0
";

/// Stand-in for a host scene graph: prints what it is asked to create and
/// counts the keyframes it receives.
struct PrintScene {
    keys: usize,
}

impl JointScene for PrintScene {
    type Handle = String;

    fn create_joint(
        &mut self,
        name: &str,
        offset: Position,
        parent: Option<&String>,
    ) -> Result<String, SceneRejection> {
        match parent {
            Some(parent) => println!(
                "create joint {name} under {parent} at ({}, {}, {})",
                offset.x, offset.y, offset.z
            ),
            None => println!("create joint {name} at the scene root"),
        }
        Ok(name.to_string())
    }

    fn set_key(
        &mut self,
        _joint: &String,
        _channel: &str,
        _time: f64,
        _value: f64,
    ) -> Result<(), SceneRejection> {
        self.keys += 1;
        Ok(())
    }
}

fn main() {
    let bvh = load_bvh_from_string(SAMPLE).unwrap();

    println!(
        "{} joints, {} frames at {} fps",
        bvh.joints.len(),
        bvh.num_frames,
        bvh.fps
    );
    for joint in bvh.joints.iter() {
        println!(
            "{}{} ({} channels)",
            "  ".repeat(joint.depth),
            joint.name,
            joint.channels.len()
        );
    }
    println!("kinematic chains: {:?}", bvh.kinematic_chains());

    let hips = bvh.find_joint_by_name("Hips").unwrap();
    println!("Hips frame 1 row: {:?}", hips.frame_values[1]);

    let mut scene = PrintScene { keys: 0 };
    build_scene(&bvh, &mut scene).unwrap();
    println!("{} keyframes emitted", scene.keys);
}
