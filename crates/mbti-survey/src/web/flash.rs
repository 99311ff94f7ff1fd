//! One-shot messages carried across a redirect in the `flash` cookie.
//!
//! The cookie value is `level:message`, URL-encoded. Pages clear it once the
//! message has been rendered.

use std::fmt;

use axum::http::HeaderMap;

use super::cookies;

pub const FLASH_COOKIE: &str = "flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashLevel {
    Success,
    Info,
    Warning,
    Error,
}

impl FlashLevel {
    pub const fn as_str(self) -> &'static str {
        match self {
            FlashLevel::Success => "success",
            FlashLevel::Info => "info",
            FlashLevel::Warning => "warning",
            FlashLevel::Error => "error",
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "success" => Some(FlashLevel::Success),
            "info" => Some(FlashLevel::Info),
            "warning" => Some(FlashLevel::Warning),
            "error" => Some(FlashLevel::Error),
            _ => None,
        }
    }
}

impl fmt::Display for FlashLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

impl Flash {
    pub fn new(level: FlashLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(FlashLevel::Success, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(FlashLevel::Info, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(FlashLevel::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(FlashLevel::Error, message)
    }

    pub fn encode(&self) -> String {
        urlencoding::encode(&format!("{}:{}", self.level, self.message)).into_owned()
    }

    pub fn decode(raw: &str) -> Option<Self> {
        let decoded = urlencoding::decode(raw).ok()?;
        let (level, message) = decoded.split_once(':')?;
        Some(Self::new(FlashLevel::parse(level)?, message))
    }

    /// Pending flash from the request, if any.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        cookies::read(headers, FLASH_COOKIE).and_then(|raw| Self::decode(&raw))
    }

    pub fn set_cookie(&self, secure: bool) -> String {
        cookies::set(FLASH_COOKIE, &self.encode(), None, secure)
    }
}
