//! Scene lifecycle: build once, then advance one frame per `tick` and follow
//! the host's viewport size.

use futures::FutureExt;
use std::f64::consts::TAU;
use std::path::PathBuf;

use crate::backend::{DrawRequest, RenderBackend, SceneHandle};
use crate::camera::Camera;
use crate::config::{ConfigError, SceneConfig};
use crate::controls::OrbitControls;
use crate::loaders::{load_environment, EnvironmentLoad};
use crate::scene::{RenderableObject, SceneDescriptor};
use crate::viewport::Viewport;

#[derive(Debug, Clone, PartialEq)]
pub enum EnvironmentStatus {
    Unset,
    Loading(PathBuf),
    Installed { width: u32, height: u32 },
}

pub struct SceneRuntime<B: RenderBackend> {
    backend: B,
    scene: SceneHandle,
    camera: Camera,
    controls: OrbitControls,
    viewport: Viewport,
    objects: Vec<RenderableObject>,
    base_step: f64,
    pending_environment: Option<EnvironmentLoad>,
    environment: EnvironmentStatus,
    installed_environment: Option<(u32, u32)>,
    frame_count: u64,
}

impl<B: RenderBackend> SceneRuntime<B> {
    /// Build the scene through `backend` and size it to `viewport`
    pub fn new(config: &SceneConfig, viewport: Viewport, mut backend: B) -> Result<Self, ConfigError> {
        config.validate()?;

        let descriptor = SceneDescriptor::from_config(config);
        let scene = backend.construct(&descriptor);
        backend.set_viewport_size(viewport.width, viewport.height);

        let camera = Camera::new(viewport.aspect());
        let controls = OrbitControls::new(&camera, config.enable_damping, config.damping_factor);

        log::info!(
            "Scene {:?} built: {:?} variant, {} objects, viewport {}x{}",
            scene,
            config.variant,
            descriptor.objects.len(),
            viewport.width,
            viewport.height
        );

        let mut runtime = Self {
            backend,
            scene,
            camera,
            controls,
            viewport,
            objects: descriptor.objects,
            base_step: config.base_step,
            pending_environment: None,
            environment: EnvironmentStatus::Unset,
            installed_environment: None,
            frame_count: 0,
        };
        if let Some(path) = &config.environment {
            runtime.load_environment(path.clone());
        }
        Ok(runtime)
    }

    /// Start loading an environment map; it is installed on a later tick
    pub fn load_environment(&mut self, path: PathBuf) {
        log::info!("Loading environment map {:?}", path);
        self.environment = EnvironmentStatus::Loading(path.clone());
        self.pending_environment = Some(load_environment(path));
    }

    /// Advance one frame: spin objects, ease the controls, draw
    pub fn tick(&mut self) {
        self.poll_environment();

        let frame = self.frame_count + 1;
        for (i, object) in self.objects.iter_mut().enumerate() {
            let angle = spin_angle(frame, i, self.base_step);
            object.transform.rotation.x = angle;
            object.transform.rotation.y = angle;
        }

        self.controls.update(&mut self.camera);

        self.backend.draw(&DrawRequest {
            scene: self.scene,
            objects: &self.objects,
            camera: &self.camera,
        });
        self.frame_count += 1;
    }

    /// Follow a host resize; returns whether anything changed
    ///
    /// Zero-sized and unchanged dimensions are ignored.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            log::debug!("Ignoring degenerate resize to {}x{}", width, height);
            return false;
        }
        if self.viewport.width == width && self.viewport.height == height {
            return false;
        }

        self.viewport = Viewport { width, height };
        self.camera.aspect = width as f32 / height as f32;
        self.backend.set_viewport_size(width, height);
        log::debug!("Viewport resized to {}x{}", width, height);
        true
    }

    fn poll_environment(&mut self) {
        let Some(pending) = self.pending_environment.as_mut() else {
            return;
        };
        let Some(result) = (&mut *pending).now_or_never() else {
            return;
        };
        let path = pending.path().to_path_buf();
        self.pending_environment = None;

        match result {
            Ok(map) => {
                self.backend.install_environment(self.scene, &map);
                self.installed_environment = Some((map.width, map.height));
                self.environment = EnvironmentStatus::Installed {
                    width: map.width,
                    height: map.height,
                };
                log::info!("Environment map {:?} installed", path);
            }
            Err(e) => {
                // The backend still holds whatever was installed before
                self.environment = match self.installed_environment {
                    Some((width, height)) => {
                        log::warn!("Keeping previous environment map: {}", e);
                        EnvironmentStatus::Installed { width, height }
                    }
                    None => {
                        log::warn!("Continuing without environment map: {}", e);
                        EnvironmentStatus::Unset
                    }
                };
            }
        }
    }

    pub fn objects(&self) -> &[RenderableObject] {
        &self.objects
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Camera together with its controls, for feeding input
    pub fn controls_mut(&mut self) -> (&mut OrbitControls, &Camera) {
        (&mut self.controls, &self.camera)
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn environment_status(&self) -> &EnvironmentStatus {
        &self.environment
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}

/// Rotation of object `index` after `frame` ticks, wrapped into [0, 2π)
///
/// Computed from the frame count in f64 so the angle never accumulates
/// rounding error, however long the loop runs.
fn spin_angle(frame: u64, index: usize, base_step: f64) -> f32 {
    let angle = (frame as f64 * (index + 1) as f64 * base_step).rem_euclid(TAU) as f32;
    if angle >= std::f32::consts::TAU {
        0.0
    } else {
        angle
    }
}
