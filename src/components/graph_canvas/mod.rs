mod component;
mod events;
mod handle;
mod interaction;
mod layout;
mod render;
mod selection;
mod state;
mod style;
mod surface;
mod types;
mod viewport;

pub use component::GraphCanvas;
pub use events::{GraphEvent, Subscription};
pub use handle::GraphHandle;
pub use interaction::{CursorStyle, InteractionMode};
pub use layout::{LayoutParams, Parameter, UnknownParameter};
pub use selection::{Focus, SelectionState};
pub use state::{EngineConfig, GraphEngine};
pub use style::{EdgeStyle, LineStyle, NodeStyle, StyleTable};
pub use surface::{Surface, TextBaseline, TextStyle};
pub use types::{GraphData, GraphLink, GraphNode, VisualEdge, VisualGraph, VisualNode};
pub use viewport::ViewTransform;
