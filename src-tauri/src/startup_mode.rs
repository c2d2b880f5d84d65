use std::env;

use crate::DESKTOP_MODE_ENV;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeEnvironment {
    Development,
    Packaged,
}

impl RuntimeEnvironment {
    pub fn detect() -> Self {
        let override_value = env::var(DESKTOP_MODE_ENV).ok();
        Self::resolve(override_value.as_deref(), tauri::is_dev())
    }

    fn resolve(override_value: Option<&str>, is_dev_build: bool) -> Self {
        if let Some(mode) = override_value.and_then(parse_mode) {
            return mode;
        }

        if is_dev_build {
            Self::Development
        } else {
            Self::Packaged
        }
    }

    pub fn is_packaged(self) -> bool {
        self == Self::Packaged
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Packaged => "packaged",
        }
    }
}

fn parse_mode(raw: &str) -> Option<RuntimeEnvironment> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "dev" | "development" => Some(RuntimeEnvironment::Development),
        "packaged" | "production" | "prod" => Some(RuntimeEnvironment::Packaged),
        _ => None,
    }
}
