pub mod adapter;
pub mod jimeng;
pub mod keling;
pub mod sora;
pub mod spec;
pub mod veo;

pub use adapter::HttpProviderAdapter;
pub use spec::{ProviderSpec, default_map_request};
