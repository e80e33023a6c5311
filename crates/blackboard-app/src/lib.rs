//! Blackboard Application
//!
//! Input handling, change notification and a headless session that ties the
//! board, image cache and autosave together.

mod clipboard;
mod config;
mod controller;
mod input;
mod notify;
mod session;
mod shortcuts;

pub use clipboard::{ClipboardBridgeError, MemoryClipboard, SystemClipboard, platform_clipboard};
pub use config::AppConfig;
pub use controller::Controller;
pub use input::{Modifiers, PointerButton, Tool};
pub use notify::{BoardChange, ChangeSet, Notifier, SubscriptionId};
pub use session::{Session, SessionError};
pub use shortcuts::{Action, Shortcut, ShortcutRegistry};

#[cfg(all(feature = "native", not(target_arch = "wasm32")))]
pub use clipboard::NativeClipboard;
