//! Error types for the network backdrop.
//!
//! Nothing here is fatal to the host page. Only a malformed configuration is
//! surfaced to JavaScript as an exception; every other failure is logged and
//! the engine degrades to drawing nothing.

use thiserror::Error;
use wasm_bindgen::JsValue;

/// Errors raised while configuring, activating, or driving the engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The configuration object could not be deserialized.
    #[error("malformed configuration object: {0}")]
    Config(String),

    /// A call into the host environment failed.
    #[error("host call failed: {0}")]
    Host(String),

    /// No 2D drawing context could be acquired for the render surface.
    #[error("render surface unavailable")]
    SurfaceUnavailable,

    /// The host has no event callbacks installed to register or schedule.
    #[error("host callbacks are not bound")]
    NotBound,
}

impl EngineError {
    /// Wrap a JS exception value raised by a web API call.
    pub fn from_js(context: &str, value: &JsValue) -> Self {
        let detail = value
            .as_string()
            .unwrap_or_else(|| format!("{value:?}"));
        EngineError::Host(format!("{context}: {detail}"))
    }
}

impl From<serde_wasm_bindgen::Error> for EngineError {
    fn from(e: serde_wasm_bindgen::Error) -> Self {
        EngineError::Config(e.to_string())
    }
}

impl From<EngineError> for JsValue {
    fn from(e: EngineError) -> Self {
        js_sys::Error::new(&e.to_string()).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = EngineError::InvalidConfig("nodeCount must be positive".into());
        assert_eq!(
            err.to_string(),
            "invalid configuration: nodeCount must be positive"
        );
        assert_eq!(
            EngineError::SurfaceUnavailable.to_string(),
            "render surface unavailable"
        );
        assert_eq!(
            EngineError::NotBound.to_string(),
            "host callbacks are not bound"
        );
    }
}
