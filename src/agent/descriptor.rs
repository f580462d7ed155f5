//! Agent descriptor store
//!
//! Serves the capability document published at `/.well-known/agent.json`.
//! The document is read once at startup; a load failure is kept and reported
//! on every request instead of aborting the process.

use serde_json::{json, Value};
use std::path::Path;

use crate::config::AgentConfig;
use crate::error::{AgentError, Result};
use crate::logger;

/// Read-only source of the agent capability descriptor
pub trait DescriptorStore: Send + Sync {
    fn descriptor(&self) -> Result<&Value>;
}

/// Descriptor loaded from a JSON file
#[derive(Debug)]
pub struct FileDescriptorStore {
    loaded: std::result::Result<Value, String>,
}

impl FileDescriptorStore {
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let loaded = std::fs::read_to_string(path)
            .map_err(|e| format!("{}: {e}", path.display()))
            .and_then(|content| {
                serde_json::from_str::<Value>(&content)
                    .map_err(|e| format!("{}: {e}", path.display()))
            });

        if let Err(ref e) = loaded {
            logger::log_warning(&format!("Agent descriptor unavailable: {e}"));
        }

        Self { loaded }
    }
}

impl DescriptorStore for FileDescriptorStore {
    fn descriptor(&self) -> Result<&Value> {
        self.loaded
            .as_ref()
            .map_err(|e| AgentError::ConfigLoad(e.clone()))
    }
}

/// Descriptor held in memory
#[derive(Debug, Clone)]
pub struct StaticDescriptorStore {
    descriptor: Value,
}

impl StaticDescriptorStore {
    pub const fn new(descriptor: Value) -> Self {
        Self { descriptor }
    }

    /// Built-in descriptor advertising the QR and barcode skills
    pub fn builtin(agent: &AgentConfig) -> Self {
        Self::new(json!({
            "name": agent.name,
            "description": "Generate QR codes from chat commands. Barcode support is announced but not implemented yet.",
            "version": agent.version,
            "capabilities": {
                "streaming": false,
                "pushNotifications": false
            },
            "defaultInputModes": ["text/plain"],
            "defaultOutputModes": ["text/plain", "image/png"],
            "skills": [
                {
                    "id": "qr_generation",
                    "name": "QR Code Generation",
                    "description": "Encode any text or URL as a QR code image",
                    "examples": ["qr https://example.com", "qr Hello World"]
                },
                {
                    "id": "barcode_generation",
                    "name": "Barcode Generation",
                    "description": "Encode text as a barcode image (not implemented yet)",
                    "examples": ["barcode 1234567890"]
                }
            ]
        }))
    }
}

impl DescriptorStore for StaticDescriptorStore {
    fn descriptor(&self) -> Result<&Value> {
        Ok(&self.descriptor)
    }
}

/// Pick the store for the `[agent]` config section.
///
/// An empty `descriptor_path` selects the built-in descriptor.
pub fn from_config(agent: &AgentConfig) -> Box<dyn DescriptorStore> {
    if agent.descriptor_path.trim().is_empty() {
        Box::new(StaticDescriptorStore::builtin(agent))
    } else {
        Box::new(FileDescriptorStore::load(&agent.descriptor_path))
    }
}
