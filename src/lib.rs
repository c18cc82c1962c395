pub mod backend;
pub mod camera;
pub mod cli;
pub mod config;
pub mod controls;
pub mod frame;
pub mod geometry;
pub mod input;
pub mod loaders;
pub mod renderer;
pub mod runtime;
pub mod scene;
pub mod schedule;
pub mod viewport;

pub use backend::{DrawRecord, DrawRequest, HeadlessBackend, RenderBackend, SceneHandle};
pub use camera::Camera;
pub use cli::Cli;
pub use config::{ConfigError, SceneConfig, SceneVariant};
pub use controls::OrbitControls;
pub use frame::{FpsCounter, FrameInfo, FrameIterator};
pub use input::PointerInput;
pub use loaders::{AssetLoadError, EnvironmentMap};
pub use renderer::GpuRenderer;
pub use runtime::{EnvironmentStatus, SceneRuntime};
pub use scene::{GeometryKind, Material, MaterialKind, RenderableObject, SceneDescriptor};
pub use schedule::{AnimationLoop, StopHandle};
pub use viewport::Viewport;
