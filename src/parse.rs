use log::{debug, info};
use std::path::Path;

use crate::error::BvhError;
use crate::tokenize::Tokens;
use crate::types::{BvhSkeleton, Index, Joint, ParentIndex, Position};

//////////////////////////////////////////////////////////////// PUBLIC ////////////////////////////////////////////////////////////////

/// Load a .bvh file from a file path.
pub fn load_bvh_from_file(file_path: impl AsRef<Path>) -> Result<BvhSkeleton, BvhError> {
    let path = file_path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|source| BvhError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_bvh_from_string(&contents)
}

/// Load a .bvh document already held in memory.
pub fn load_bvh_from_string(contents: &str) -> Result<BvhSkeleton, BvhError> {
    let mut tokens = Tokens::new(contents);
    let skeleton = parse_document(&mut tokens)?;
    info!(
        "loaded bvh: {} joints across {} roots, {} frames at {} fps",
        skeleton.joints.len(),
        skeleton.roots.len(),
        skeleton.num_frames,
        skeleton.fps
    );
    Ok(skeleton)
}

//////////////////////////////////////////////////////////////// PARSERS ////////////////////////////////////////////////////////////////

fn parse_document(tokens: &mut Tokens) -> Result<BvhSkeleton, BvhError> {
    let mut skeleton = parse_hierarchy(tokens)?;
    parse_motion(tokens, &mut skeleton)?;
    // the declared frame count must account for every remaining token
    if let Some(extra) = tokens.next() {
        return Err(BvhError::TrailingTokens { line: extra.line });
    }
    Ok(skeleton)
}

/// Parses `HIERARCHY` and one subtree per `ROOT` block, leaving the stream
/// positioned on the `MOTION` keyword.
fn parse_hierarchy(tokens: &mut Tokens) -> Result<BvhSkeleton, BvhError> {
    tokens.expect_literal("HIERARCHY")?;

    let mut joints: Vec<Joint> = Vec::new();
    let mut roots: Vec<Index> = Vec::new();

    loop {
        match tokens.peek() {
            Some(tok) if tok.text == "ROOT" => {
                tokens.next();
            }
            Some(_) => break,
            None => return Err(BvhError::UnexpectedEof { expected: "ROOT or MOTION" }),
        }

        let root = read_joint(tokens, &mut joints, -1, 0)?;
        roots.push(root);

        // currently open joints, innermost last; the root's own "}" empties
        // it, which completes this subtree
        let mut open: Vec<Index> = vec![root];
        while let Some(&top) = open.last() {
            let tok = tokens.demand("JOINT, End or }")?;
            match tok.text {
                "JOINT" => {
                    let child = read_joint(tokens, &mut joints, top as ParentIndex, open.len())?;
                    open.push(child);
                }
                "End" => read_end_site(tokens, &mut joints, top)?,
                "}" => {
                    open.pop();
                }
                _ => {
                    return Err(BvhError::UnexpectedToken {
                        expected: "JOINT, End or }",
                        found: tok.text.to_string(),
                        line: tok.line,
                    })
                }
            }
        }
    }

    debug!("parsed hierarchy: {} joints across {} roots", joints.len(), roots.len());

    Ok(BvhSkeleton {
        joints,
        roots,
        num_frames: 0,
        frame_time: 0.0,
        fps: 0,
    })
}

/// Parses `<name> "{" "OFFSET" f f f` plus an optional `CHANNELS` clause,
/// appends the new joint to the arena and links it under its parent.
fn read_joint(
    tokens: &mut Tokens,
    joints: &mut Vec<Joint>,
    parent_index: ParentIndex,
    depth: usize,
) -> Result<Index, BvhError> {
    let name = tokens.demand("a joint name")?.text.to_string();
    tokens.expect_literal("{")?;
    tokens.expect_literal("OFFSET")?;
    let offset = read_offset(tokens)?;

    let mut channels = Vec::new();
    if tokens.peek().map(|tok| tok.text) == Some("CHANNELS") {
        tokens.next();
        let count = tokens.expect_usize("a channel count")?;
        channels.reserve(count);
        for _ in 0..count {
            channels.push(tokens.demand("a channel name")?.text.to_string());
        }
    }

    let index = joints.len();
    if parent_index >= 0 {
        joints[parent_index as Index].children.push(index);
    }
    joints.push(Joint {
        name,
        index,
        parent_index,
        depth,
        offset,
        channels,
        children: Vec::new(),
        is_end_site: false,
        frame_values: Vec::new(),
    });
    Ok(index)
}

/// Parses `End Site { OFFSET f f f }` as a channel-less leaf under the
/// innermost open joint. End Sites close immediately and are never pushed
/// on the open stack.
fn read_end_site(tokens: &mut Tokens, joints: &mut Vec<Joint>, parent: Index) -> Result<(), BvhError> {
    let site = tokens.demand("Site")?;
    if site.text != "Site" {
        return Err(BvhError::UnexpectedToken {
            expected: "Site",
            found: site.text.to_string(),
            line: site.line,
        });
    }
    let name = site.text.to_string();
    tokens.expect_literal("{")?;
    tokens.expect_literal("OFFSET")?;
    let offset = read_offset(tokens)?;
    tokens.expect_literal("}")?;

    let index = joints.len();
    let depth = joints[parent].depth + 1;
    joints[parent].children.push(index);
    joints.push(Joint {
        name,
        index,
        parent_index: parent as ParentIndex,
        depth,
        offset,
        channels: Vec::new(),
        children: Vec::new(),
        is_end_site: true,
        frame_values: Vec::new(),
    });
    Ok(())
}

fn read_offset(tokens: &mut Tokens) -> Result<Position, BvhError> {
    let x = tokens.expect_f64("an OFFSET component")?;
    let y = tokens.expect_f64("an OFFSET component")?;
    let z = tokens.expect_f64("an OFFSET component")?;
    Ok(Position::new(x, y, z))
}

/// Reads the motion header and then, for every frame, one row of channel
/// values per joint, visiting each root's subtree depth-first in the same
/// order the hierarchy was discovered. Joints without channels (End Sites)
/// consume nothing.
fn parse_motion(tokens: &mut Tokens, skeleton: &mut BvhSkeleton) -> Result<(), BvhError> {
    tokens.expect_literal("MOTION")?;
    tokens.expect_literal("Frames:")?;
    let num_frames = tokens.expect_usize("a frame count")?;
    tokens.expect_literal("Frame")?;
    tokens.expect_literal("Time:")?;
    let frame_time = tokens.expect_f64("a frame time")?;

    skeleton.num_frames = num_frames;
    skeleton.frame_time = frame_time;
    skeleton.fps = if frame_time > 0.0 {
        (1.0 / frame_time).round() as u32
    } else {
        0
    };
    debug!("motion header: {} frames, {}s per frame", num_frames, frame_time);

    for joint in skeleton.joints.iter_mut() {
        if !joint.channels.is_empty() {
            joint.frame_values.reserve(num_frames);
        }
    }

    for _frame in 0..num_frames {
        for root_slot in 0..skeleton.roots.len() {
            let mut stack = vec![skeleton.roots[root_slot]];
            while let Some(index) = stack.pop() {
                let count = skeleton.joints[index].channels.len();
                if count > 0 {
                    let mut row = Vec::with_capacity(count);
                    for _ in 0..count {
                        row.push(tokens.expect_f64("a channel value")?);
                    }
                    skeleton.joints[index].frame_values.push(row);
                }
                // reversed so children pop in declaration order
                for &child in skeleton.joints[index].children.iter().rev() {
                    stack.push(child);
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BvhSkeleton;

    const TWO_FRAME_HIPS: &str = "\
HIERARCHY
ROOT Hips
{
  OFFSET 0 0 0
  CHANNELS 3 Xposition Yposition Zposition
  End Site
  {
    OFFSET 0 5 0
  }
}
MOTION
Frames: 2
Frame Time: 0.0333333
0 0 0
1 0 0
";

    const TWO_ROOTS: &str = "\
HIERARCHY
ROOT Torso
{
  OFFSET 0 0 0
  CHANNELS 2 Xposition Yposition
  JOINT Head
  {
    OFFSET 0 7 0
    CHANNELS 1 Xrotation
    End Site
    {
      OFFSET 0 2 0
    }
  }
}
ROOT Prop
{
  OFFSET 5 0 0
  CHANNELS 1 Zrotation
}
MOTION
Frames: 2
Frame Time: 0.1
10 20 30 40
11 21 31 41
";

    #[test]
    fn two_frame_hips_scenario() {
        let bvh = load_bvh_from_string(TWO_FRAME_HIPS).unwrap();

        assert_eq!(bvh.joints.len(), 2);
        assert_eq!(bvh.num_frames, 2);
        assert!((bvh.frame_time - 0.0333333).abs() < 1e-9);
        assert_eq!(bvh.fps, 30);

        let hips = &bvh.joints[0];
        assert_eq!(hips.name, "Hips");
        assert_eq!(hips.channels, vec!["Xposition", "Yposition", "Zposition"]);
        assert_eq!(hips.frame_values, vec![vec![0.0, 0.0, 0.0], vec![1.0, 0.0, 0.0]]);

        let site = &bvh.joints[1];
        assert!(site.is_end_site);
        assert_eq!(site.parent_index, 0);
        assert_eq!(site.offset, Position::new(0.0, 5.0, 0.0));
        assert!(site.channels.is_empty());
        assert!(site.frame_values.is_empty());
    }

    #[test]
    fn joint_count_matches_node_keywords() {
        // one joint per ROOT/JOINT/End occurrence
        assert_eq!(load_bvh_from_string(TWO_FRAME_HIPS).unwrap().joints.len(), 2);
        assert_eq!(load_bvh_from_string(TWO_ROOTS).unwrap().joints.len(), 4);
    }

    #[test]
    fn every_row_matches_its_channel_count() {
        let bvh = load_bvh_from_string(TWO_ROOTS).unwrap();
        for joint in bvh.joints.iter() {
            let expected_rows = if joint.channels.is_empty() { 0 } else { bvh.num_frames };
            assert_eq!(joint.frame_values.len(), expected_rows, "joint {}", joint.name);
            for row in joint.frame_values.iter() {
                assert_eq!(row.len(), joint.channels.len(), "joint {}", joint.name);
            }
        }
    }

    #[test]
    fn multi_root_frames_slice_in_declaration_order() {
        let bvh = load_bvh_from_string(TWO_ROOTS).unwrap();

        let torso = bvh.find_joint_by_name("Torso").unwrap();
        let head = bvh.find_joint_by_name("Head").unwrap();
        let prop = bvh.find_joint_by_name("Prop").unwrap();

        assert_eq!(torso.frame_values, vec![vec![10.0, 20.0], vec![11.0, 21.0]]);
        assert_eq!(head.frame_values, vec![vec![30.0], vec![31.0]]);
        assert_eq!(prop.frame_values, vec![vec![40.0], vec![41.0]]);
    }

    #[test]
    fn siblings_consume_once_per_frame() {
        // two channel-bearing children under one root, several frames; each
        // child must be visited exactly once per frame, in declaration order
        let src = "\
HIERARCHY
ROOT Spine
{
  OFFSET 0 0 0
  CHANNELS 1 Yrotation
  JOINT Left
  {
    OFFSET 1 0 0
    CHANNELS 1 Xrotation
  }
  JOINT Right
  {
    OFFSET -1 0 0
    CHANNELS 1 Zrotation
  }
}
MOTION
Frames: 3
Frame Time: 0.5
1 2 3
4 5 6
7 8 9
";
        let bvh = load_bvh_from_string(src).unwrap();
        let spine = bvh.find_joint_by_name("Spine").unwrap();
        let left = bvh.find_joint_by_name("Left").unwrap();
        let right = bvh.find_joint_by_name("Right").unwrap();
        assert_eq!(spine.frame_values, vec![vec![1.0], vec![4.0], vec![7.0]]);
        assert_eq!(left.frame_values, vec![vec![2.0], vec![5.0], vec![8.0]]);
        assert_eq!(right.frame_values, vec![vec![3.0], vec![6.0], vec![9.0]]);
    }

    #[test]
    fn channels_clause_is_optional() {
        let src = "\
HIERARCHY
ROOT Anchor
{
  OFFSET 0 1 0
  JOINT Tip
  {
    OFFSET 0 2 0
    CHANNELS 1 Yrotation
  }
}
MOTION
Frames: 1
Frame Time: 1.0
42
";
        let bvh = load_bvh_from_string(src).unwrap();
        let anchor = bvh.find_joint_by_name("Anchor").unwrap();
        assert!(anchor.channels.is_empty());
        assert!(anchor.frame_values.is_empty());
        assert!(!anchor.is_end_site);
        let tip = bvh.find_joint_by_name("Tip").unwrap();
        assert_eq!(tip.frame_values, vec![vec![42.0]]);
    }

    #[test]
    fn unexpected_keyword_inside_joint_is_fatal() {
        let src = "HIERARCHY ROOT Hips { OFFSET 0 0 0 BADTOKEN }";
        match load_bvh_from_string(src) {
            Err(BvhError::UnexpectedToken { expected, found, .. }) => {
                assert_eq!(expected, "JOINT, End or }");
                assert_eq!(found, "BADTOKEN");
            }
            other => panic!("expected structural error, got {other:?}"),
        }
    }

    #[test]
    fn malformed_offset_number_is_fatal() {
        let src = "HIERARCHY ROOT Hips { OFFSET 0 zero 0 }";
        match load_bvh_from_string(src) {
            Err(BvhError::InvalidNumber { found, .. }) => assert_eq!(found, "zero"),
            other => panic!("expected numeric error, got {other:?}"),
        }
    }

    #[test]
    fn end_requires_site_literal() {
        let src = "HIERARCHY ROOT Hips { OFFSET 0 0 0 End Effector { OFFSET 0 1 0 } }";
        match load_bvh_from_string(src) {
            Err(BvhError::UnexpectedToken { expected, found, .. }) => {
                assert_eq!(expected, "Site");
                assert_eq!(found, "Effector");
            }
            other => panic!("expected structural error, got {other:?}"),
        }
    }

    #[test]
    fn missing_hierarchy_keyword_is_fatal() {
        match load_bvh_from_string("ROOT Hips { OFFSET 0 0 0 }") {
            Err(BvhError::UnexpectedToken { expected, found, .. }) => {
                assert_eq!(expected, "HIERARCHY");
                assert_eq!(found, "ROOT");
            }
            other => panic!("expected structural error, got {other:?}"),
        }
    }

    #[test]
    fn hierarchy_must_hand_over_to_motion() {
        let src = "HIERARCHY ROOT Hips { OFFSET 0 0 0 } Frames: 1";
        match load_bvh_from_string(src) {
            Err(BvhError::UnexpectedToken { expected, found, .. }) => {
                assert_eq!(expected, "MOTION");
                assert_eq!(found, "Frames:");
            }
            other => panic!("expected structural error, got {other:?}"),
        }
    }

    #[test]
    fn truncated_motion_data_is_fatal() {
        let src = "\
HIERARCHY
ROOT Hips
{
  OFFSET 0 0 0
  CHANNELS 3 Xposition Yposition Zposition
}
MOTION
Frames: 2
Frame Time: 0.1
0 0 0
1 0
";
        match load_bvh_from_string(src) {
            Err(BvhError::UnexpectedEof { expected }) => assert_eq!(expected, "a channel value"),
            other => panic!("expected eof error, got {other:?}"),
        }
    }

    #[test]
    fn surplus_motion_data_is_fatal() {
        let src = "\
HIERARCHY
ROOT Hips
{
  OFFSET 0 0 0
  CHANNELS 1 Yposition
}
MOTION
Frames: 1
Frame Time: 0.1
0
99 99
";
        match load_bvh_from_string(src) {
            Err(BvhError::TrailingTokens { line }) => assert_eq!(line, 11),
            other => panic!("expected trailing-token error, got {other:?}"),
        }
    }

    #[test]
    fn missing_file_reports_io_error() {
        match load_bvh_from_file("/definitely/not/here.bvh") {
            Err(BvhError::Io { path, .. }) => {
                assert_eq!(path, Path::new("/definitely/not/here.bvh"))
            }
            other => panic!("expected io error, got {other:?}"),
        }
    }

    /// Test-local writer for the hierarchy block only; the crate itself has
    /// no .bvh export surface.
    fn write_hierarchy(bvh: &BvhSkeleton) -> String {
        fn emit(bvh: &BvhSkeleton, index: usize, keyword: &str, out: &mut String) {
            let joint = &bvh.joints[index];
            if joint.is_end_site {
                out.push_str(&format!(
                    "End {} {{ OFFSET {} {} {} }}\n",
                    joint.name, joint.offset.x, joint.offset.y, joint.offset.z
                ));
                return;
            }
            out.push_str(&format!(
                "{} {} {{\nOFFSET {} {} {}\n",
                keyword, joint.name, joint.offset.x, joint.offset.y, joint.offset.z
            ));
            if !joint.channels.is_empty() {
                out.push_str(&format!("CHANNELS {}", joint.channels.len()));
                for channel in joint.channels.iter() {
                    out.push(' ');
                    out.push_str(channel);
                }
                out.push('\n');
            }
            for &child in joint.children.iter() {
                emit(bvh, child, "JOINT", out);
            }
            out.push_str("}\n");
        }

        let mut out = String::from("HIERARCHY\n");
        for &root in bvh.roots.iter() {
            emit(bvh, root, "ROOT", &mut out);
        }
        out
    }

    #[test]
    fn hierarchy_round_trips_through_the_writer() {
        let first = load_bvh_from_string(TWO_ROOTS).unwrap();
        let rewritten = format!(
            "{}MOTION\nFrames: 0\nFrame Time: 0.0\n",
            write_hierarchy(&first)
        );
        let second = load_bvh_from_string(&rewritten).unwrap();

        assert_eq!(first.roots, second.roots);
        assert_eq!(first.joints.len(), second.joints.len());
        for (a, b) in first.joints.iter().zip(second.joints.iter()) {
            assert_eq!(a.name, b.name);
            assert_eq!(a.offset, b.offset);
            assert_eq!(a.channels, b.channels);
            assert_eq!(a.parent_index, b.parent_index);
            assert_eq!(a.children, b.children);
            assert_eq!(a.is_end_site, b.is_end_site);
        }
    }
}
