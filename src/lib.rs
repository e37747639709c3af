//! brick-placer
//!
//! Interactive placement of grid-aligned bricks in 3D, native and in the
//! browser. The pointer moves a translucent brick over the floor and existing
//! bricks, a left click commits it, `r` turns it and `Enter` posts the whole
//! layout as JSON to the layout service before starting over.
//!
//! High-level modules
//! - `app`: the placer flow wiring input, workspace and rendering together
//! - `capture`: offscreen frame readback for golden image tests
//! - `camera`: orbit camera, controller, projection and ray casting
//! - `config`: TOML configuration with defaults for every setting
//! - `context`: central GPU and window context that owns device/queue/pipelines
//! - `data_structures`: bricks, collision boxes, meshes and instances
//! - `error`: domain errors for configuration and uploads
//! - `flow`: the event loop and the flow abstraction driving it
//! - `grid`: snapping positions onto the placement grid
//! - `pick`: CPU ray picking against the floor and committed bricks
//! - `pipelines`: opaque and transparent render pipelines plus the light
//! - `placement`: the layout being built, independent of the GPU
//! - `render`: render composition for efficient pipeline reuse
//! - `upload`: the wire records and the HTTP client posting them
//!

pub mod app;
pub mod camera;
#[cfg(feature = "integration-tests")]
pub mod capture;
pub mod config;
pub mod context;
pub mod data_structures;
pub mod error;
pub mod flow;
pub mod grid;
pub mod pick;
pub mod pipelines;
pub mod placement;
pub mod render;
pub mod upload;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath::{Point3, Vector3};
pub use winit::dpi::PhysicalPosition;
pub use winit::event::{DeviceEvent, MouseButton, WindowEvent};

pub use app::run;
pub use config::PlacerConfig;
pub use error::PlacerError;
