pub mod config;
pub mod core;
pub mod normalize;
pub mod providers;
pub mod registry;
pub mod runtime;
pub mod transport;

#[cfg(test)]
pub(crate) mod test_support;

pub use core::error::{ConfigError, ProviderError, RuntimeError};
pub use core::traits::VideoProviderAdapter;
pub use core::types::*;
pub use normalize::{normalize_response, normalize_status};
pub use registry::{ProviderRegistry, create_provider};
pub use runtime::{VideoGenerationClient, VideoGenerationClientBuilder};
