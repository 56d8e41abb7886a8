//! A .bvh (Biovision Hierarchy) motion-capture importer.
//!
//! Parses the joint hierarchy and per-frame channel data of a .bvh document
//! into a [`BvhSkeleton`], then binds it to a host scene graph through the
//! narrow [`JointScene`] capability trait. Parsing is strict: the first
//! unexpected keyword, bracket or malformed number aborts the import with
//! expected-vs-found context and a line position.
//!
//! ```
//! let bvh = bvh_import::load_bvh_from_string(
//!     "HIERARCHY
//!      ROOT Hips
//!      {
//!        OFFSET 0 0 0
//!        CHANNELS 3 Xposition Yposition Zposition
//!      }
//!      MOTION
//!      Frames: 1
//!      Frame Time: 0.033333
//!      0.0 1.0 0.0",
//! )
//! .unwrap();
//! assert_eq!(bvh.joints.len(), 1);
//! assert_eq!(bvh.joints[0].frame_values, vec![vec![0.0, 1.0, 0.0]]);
//! ```

pub mod error;
pub mod parse;
pub mod scene;
pub mod tokenize;
pub mod types;

// Re-exports for consumers
pub use error::{BvhError, SceneRejection};
pub use parse::{load_bvh_from_file, load_bvh_from_string};
pub use scene::{build_scene, JointScene};
pub use types::{BvhSkeleton, Index, Joint, ParentIndex, Position};
