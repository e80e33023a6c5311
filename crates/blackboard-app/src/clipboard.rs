//! Bridge to the system clipboard.
//!
//! Element copy/paste uses the JSON transport from the core; this module only
//! moves that text in and out of the platform clipboard.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClipboardBridgeError {
    #[error("Clipboard unavailable: {0}")]
    Unavailable(String),
    #[error("Clipboard write failed: {0}")]
    Write(String),
}

/// Text clipboard the controller copies to and pastes from.
pub trait SystemClipboard {
    /// Current clipboard text, `None` if empty or not text.
    fn get_text(&mut self) -> Option<String>;

    fn set_text(&mut self, text: &str) -> Result<(), ClipboardBridgeError>;
}

/// Process-local clipboard, used headless and in tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    text: Option<String>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SystemClipboard for MemoryClipboard {
    fn get_text(&mut self) -> Option<String> {
        self.text.clone()
    }

    fn set_text(&mut self, text: &str) -> Result<(), ClipboardBridgeError> {
        self.text = Some(text.to_string());
        Ok(())
    }
}

/// Desktop clipboard via `arboard`.
#[cfg(all(feature = "native", not(target_arch = "wasm32")))]
pub struct NativeClipboard {
    inner: arboard::Clipboard,
}

#[cfg(all(feature = "native", not(target_arch = "wasm32")))]
impl NativeClipboard {
    pub fn new() -> Result<Self, ClipboardBridgeError> {
        let inner = arboard::Clipboard::new()
            .map_err(|e| ClipboardBridgeError::Unavailable(e.to_string()))?;
        Ok(Self { inner })
    }
}

#[cfg(all(feature = "native", not(target_arch = "wasm32")))]
impl SystemClipboard for NativeClipboard {
    fn get_text(&mut self) -> Option<String> {
        match self.inner.get_text() {
            Ok(text) => Some(text),
            Err(e) => {
                log::debug!("No text on clipboard: {}", e);
                None
            }
        }
    }

    fn set_text(&mut self, text: &str) -> Result<(), ClipboardBridgeError> {
        self.inner
            .set_text(text.to_string())
            .map_err(|e| ClipboardBridgeError::Write(e.to_string()))
    }
}

/// The best clipboard for this platform, falling back to memory.
pub fn platform_clipboard() -> Box<dyn SystemClipboard> {
    #[cfg(all(feature = "native", not(target_arch = "wasm32")))]
    {
        match NativeClipboard::new() {
            Ok(clipboard) => return Box::new(clipboard),
            Err(e) => log::warn!("{}, using in-memory clipboard", e),
        }
    }
    Box::new(MemoryClipboard::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_clipboard() {
        let mut clipboard = MemoryClipboard::new();
        assert_eq!(clipboard.get_text(), None);
        clipboard.set_text("[]").unwrap();
        assert_eq!(clipboard.get_text().as_deref(), Some("[]"));
    }
}
