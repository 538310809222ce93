pub mod drag;
pub mod engine;
pub mod projection;
pub mod rotation;
pub mod touch;

pub use drag::DragSession;
pub use engine::{GlobeConfig, GlobeEngine, Marker, MarkerSizing, TickEffect};
pub use projection::{GeoPoint, Orthographic, Rotation, angular_distance, is_visible};
pub use rotation::{AutoRotate, RotationPolicy, TickAdvance};
pub use touch::TouchState;
