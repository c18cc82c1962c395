use futures::channel::oneshot;
use glam::Vec3;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::task::{Context, Poll};

/// Panoramic image in linear RGB, used as background and ambient light
#[derive(Debug, Clone, PartialEq)]
pub struct EnvironmentMap {
    pub width: u32,
    pub height: u32,
    pub texels: Vec<[f32; 3]>,
}

impl EnvironmentMap {
    pub fn from_image(image: image::DynamicImage) -> Self {
        let rgb = image.into_rgb32f();
        let (width, height) = rgb.dimensions();
        let texels = rgb.pixels().map(|pixel| pixel.0).collect();
        Self {
            width,
            height,
            texels,
        }
    }

    /// Mean radiance over all texels
    pub fn average_radiance(&self) -> Vec3 {
        if self.texels.is_empty() {
            return Vec3::ZERO;
        }
        let sum = self
            .texels
            .iter()
            .fold(Vec3::ZERO, |acc, texel| acc + Vec3::from_array(*texel));
        sum / self.texels.len() as f32
    }
}

/// Environment map could not be produced
#[derive(thiserror::Error, Debug)]
pub enum AssetLoadError {
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode {path:?}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("{0:?} contains no pixels")]
    Empty(PathBuf),

    #[error("loading {0:?} was abandoned before it finished")]
    Canceled(PathBuf),
}

/// Read and decode an HDR (Radiance) or PNG panorama on the calling thread
pub fn decode_environment(path: &Path) -> Result<EnvironmentMap, AssetLoadError> {
    let bytes = std::fs::read(path).map_err(|source| AssetLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let image = image::load_from_memory(&bytes).map_err(|source| AssetLoadError::Decode {
        path: path.to_path_buf(),
        source,
    })?;

    let map = EnvironmentMap::from_image(image);
    if map.texels.is_empty() {
        return Err(AssetLoadError::Empty(path.to_path_buf()));
    }
    log::info!(
        "Environment map {:?} decoded: {}x{}",
        path,
        map.width,
        map.height
    );
    Ok(map)
}

/// Start decoding on a helper thread; the returned future resolves with the result
pub fn load_environment(path: impl Into<PathBuf>) -> EnvironmentLoad {
    let path = path.into();
    let (sender, receiver) = oneshot::channel();

    let worker_path = path.clone();
    let spawned = std::thread::Builder::new()
        .name("environment-loader".into())
        .spawn(move || {
            // Receiver may be gone if the runtime was dropped first
            let _ = sender.send(decode_environment(&worker_path));
        });
    if let Err(e) = spawned {
        log::warn!("Could not spawn environment loader for {:?}: {}", path, e);
    }

    EnvironmentLoad { path, receiver }
}

/// Pending environment decode
#[derive(Debug)]
pub struct EnvironmentLoad {
    path: PathBuf,
    receiver: oneshot::Receiver<Result<EnvironmentMap, AssetLoadError>>,
}

impl EnvironmentLoad {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Future for EnvironmentLoad {
    type Output = Result<EnvironmentMap, AssetLoadError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.receiver).poll(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(oneshot::Canceled)) => {
                Poll::Ready(Err(AssetLoadError::Canceled(self.path.clone())))
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("orbit-scene-{}-{}", std::process::id(), name))
    }

    #[test]
    fn test_average_radiance() {
        let map = EnvironmentMap {
            width: 2,
            height: 1,
            texels: vec![[1.0, 0.0, 0.0], [0.0, 0.0, 1.0]],
        };
        assert_eq!(map.average_radiance(), Vec3::new(0.5, 0.0, 0.5));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = decode_environment(Path::new("/nonexistent/sky.hdr")).unwrap_err();
        assert!(matches!(err, AssetLoadError::Io { .. }));
    }

    #[test]
    fn test_garbage_file_is_decode_error() {
        let path = temp_path("garbage.hdr");
        std::fs::write(&path, b"definitely not an image").unwrap();
        let err = decode_environment(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert!(matches!(err, AssetLoadError::Decode { .. }));
    }

    #[test]
    fn test_load_resolves_with_decoded_png() {
        let path = temp_path("sky.png");
        image::RgbImage::from_pixel(4, 2, image::Rgb([255, 255, 255]))
            .save(&path)
            .unwrap();

        let map = futures::executor::block_on(load_environment(&path)).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!((map.width, map.height), (4, 2));
        assert_eq!(map.texels.len(), 8);
        assert!((map.average_radiance().x - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_load_resolves_with_error() {
        let result = futures::executor::block_on(load_environment("/nonexistent/sky.hdr"));
        assert!(matches!(result, Err(AssetLoadError::Io { .. })));
    }
}
