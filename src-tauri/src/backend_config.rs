use std::env;

use url::Url;

use crate::{BACKEND_API_BASE_ENV, DEFAULT_BACKEND_API_BASE};

pub fn resolve_backend_api_base() -> String {
    normalize_backend_api_base(
        &env::var(BACKEND_API_BASE_ENV).unwrap_or_default(),
        DEFAULT_BACKEND_API_BASE,
    )
}

/// Canonical API base without a trailing slash, e.g. `http://localhost:5000/api`.
pub fn normalize_backend_api_base(raw: &str, default_base: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return default_base.to_string();
    }

    match Url::parse(trimmed) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") && parsed.host().is_some() => {
            parsed.as_str().trim_end_matches('/').to_string()
        }
        _ => default_base.to_string(),
    }
}
