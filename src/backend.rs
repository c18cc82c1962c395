use glam::Vec3;

use crate::camera::Camera;
use crate::loaders::EnvironmentMap;
use crate::scene::{RenderableObject, SceneDescriptor};

/// Opaque handle to a scene graph built by a backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SceneHandle(pub u32);

/// One frame's worth of state handed to the backend
#[derive(Debug, Clone, Copy)]
pub struct DrawRequest<'a> {
    pub scene: SceneHandle,
    pub objects: &'a [RenderableObject],
    pub camera: &'a Camera,
}

/// Rendering collaborator driven by `SceneRuntime`
///
/// Backends own every GPU or window resource. None of these calls report
/// failure to the runtime: a backend that cannot draw a frame logs and moves on.
pub trait RenderBackend {
    /// Build the scene graph for the described objects and lights
    fn construct(&mut self, scene: &SceneDescriptor) -> SceneHandle;

    /// Resize the draw surface
    fn set_viewport_size(&mut self, width: u32, height: u32);

    /// Render one frame
    fn draw(&mut self, request: &DrawRequest<'_>);

    /// Use the map as background and image-based ambient light
    fn install_environment(&mut self, scene: SceneHandle, environment: &EnvironmentMap);
}

/// What the headless backend saw on its most recent draw
#[derive(Debug, Clone, PartialEq)]
pub struct DrawRecord {
    pub scene: SceneHandle,
    pub rotations: Vec<Vec3>,
    pub camera_position: Vec3,
    pub camera_aspect: f32,
}

/// Backend that renders nothing and records every call
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    scenes_built: u32,
    attached_objects: usize,
    viewport: Option<(u32, u32)>,
    viewport_changes: u32,
    draws: u64,
    last_draw: Option<DrawRecord>,
    environment_size: Option<(u32, u32)>,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scenes_built(&self) -> u32 {
        self.scenes_built
    }

    /// Objects attached by the most recent `construct`
    pub fn attached_objects(&self) -> usize {
        self.attached_objects
    }

    pub fn viewport(&self) -> Option<(u32, u32)> {
        self.viewport
    }

    pub fn viewport_changes(&self) -> u32 {
        self.viewport_changes
    }

    pub fn draws(&self) -> u64 {
        self.draws
    }

    pub fn last_draw(&self) -> Option<&DrawRecord> {
        self.last_draw.as_ref()
    }

    pub fn environment_size(&self) -> Option<(u32, u32)> {
        self.environment_size
    }
}

impl RenderBackend for HeadlessBackend {
    fn construct(&mut self, scene: &SceneDescriptor) -> SceneHandle {
        self.scenes_built += 1;
        self.attached_objects = scene.objects.len();
        log::debug!(
            "headless scene {} built: {} objects, {} lights",
            self.scenes_built,
            scene.objects.len(),
            scene.lights.len()
        );
        SceneHandle(self.scenes_built)
    }

    fn set_viewport_size(&mut self, width: u32, height: u32) {
        self.viewport = Some((width, height));
        self.viewport_changes += 1;
    }

    fn draw(&mut self, request: &DrawRequest<'_>) {
        self.draws += 1;
        self.last_draw = Some(DrawRecord {
            scene: request.scene,
            rotations: request
                .objects
                .iter()
                .map(|object| object.transform.rotation)
                .collect(),
            camera_position: request.camera.position,
            camera_aspect: request.camera.aspect,
        });
    }

    fn install_environment(&mut self, _scene: SceneHandle, environment: &EnvironmentMap) {
        self.environment_size = Some((environment.width, environment.height));
    }
}
