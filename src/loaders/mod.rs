pub mod environment;

pub use environment::{decode_environment, load_environment, AssetLoadError, EnvironmentLoad, EnvironmentMap};
