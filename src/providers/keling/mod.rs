//! Keling on Volcano Engine OpenAPI.
//!
//! Volcano Engine expects AK/SK request signing. That scheme is not
//! implemented; the key is sent as a bearer token and integrators needing
//! real signatures supply their own `auth_header` via a registered spec.

use crate::core::types::ProviderId;
use crate::providers::spec::ProviderSpec;

pub const KELING_DEFAULT_BASE_URL: &str = "https://open.volcengineapi.com";
pub const KELING_START_PATH: &str = "/";

pub fn spec() -> ProviderSpec {
    ProviderSpec::new(
        ProviderId::Keling,
        KELING_DEFAULT_BASE_URL,
        KELING_START_PATH,
        |request_id| format!("/?Action=GetVideoTaskInfo&TaskId={request_id}"),
    )
}
