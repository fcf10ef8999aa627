//! Pinboard Core Library
//!
//! Platform-agnostic document model, store, snapping and interaction logic
//! for Pinboard boards. Rendering lives in `pinboard-render`.

pub mod config;
pub mod error;
pub mod geometry;
pub mod input;
pub mod interaction;
pub mod node;
pub mod record;
pub mod snap;
pub mod state;
pub mod store;
pub mod viewport;

pub use config::{ConfigError, EditorConfig};
pub use error::{BoardError, BoardResult};
pub use geometry::Axis;
pub use input::{Key, Modifiers, PointerButton, PointerEvent, PointerId, WheelEvent};
pub use interaction::{Cancelled, EditResolution, Gesture, HandleDir, HandleKind, Interaction, SelectionBox, ToolKind};
pub use node::{BoardNode, NodeContent, NodeId, NodeKind, TextField, MIN_NODE_SIZE};
pub use record::{BoardSnapshot, SNAPSHOT_VERSION};
pub use snap::{compute_snap, snap_rotation, Guide, GuideKind, SnapResult};
pub use state::{ActiveTransform, BoardState, Draft, EditTarget, InteractionState, TransformKind};
pub use store::{AlignEdge, NodePatch, Store, SubscriptionId};
pub use viewport::Viewport;
