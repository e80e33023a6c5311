//! Keyboard shortcut registry.

/// Something the keyboard can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Undo,
    Redo,
    Delete,
    Copy,
    Cut,
    Paste,
    Duplicate,
    SelectAll,
    BringToFront,
    SendToBack,
    BringForward,
    SendBackward,
    /// Move the selection by a canvas offset.
    Nudge { dx: i32, dy: i32 },
    /// Cancel the current gesture and clear the selection.
    Escape,
}

/// A keyboard shortcut definition.
#[derive(Debug, Clone)]
pub struct Shortcut {
    pub key: &'static str,
    pub ctrl: bool,
    pub shift: bool,
    pub action: Action,
    pub description: &'static str,
}

impl Shortcut {
    pub const fn new(
        key: &'static str,
        ctrl: bool,
        shift: bool,
        action: Action,
        description: &'static str,
    ) -> Self {
        Self {
            key,
            ctrl,
            shift,
            action,
            description,
        }
    }

    /// Format the shortcut for display (e.g., "Ctrl+Shift+Z").
    pub fn format(&self) -> String {
        let mut parts = Vec::new();
        if self.ctrl {
            parts.push("Ctrl");
        }
        if self.shift {
            parts.push("Shift");
        }
        parts.push(self.key);
        parts.join("+")
    }

    fn matches(&self, key: &str, ctrl: bool, shift: bool) -> bool {
        self.key.eq_ignore_ascii_case(key) && self.ctrl == ctrl && self.shift == shift
    }
}

/// Registry of all keyboard shortcuts.
pub struct ShortcutRegistry;

impl ShortcutRegistry {
    /// Get all registered shortcuts.
    pub fn all() -> Vec<Shortcut> {
        vec![
            Shortcut::new("Z", true, false, Action::Undo, "Undo"),
            Shortcut::new("Z", true, true, Action::Redo, "Redo"),
            Shortcut::new("Y", true, false, Action::Redo, "Redo"),
            Shortcut::new("Delete", false, false, Action::Delete, "Delete selected elements"),
            Shortcut::new("Backspace", false, false, Action::Delete, "Delete selected elements"),
            Shortcut::new("C", true, false, Action::Copy, "Copy elements"),
            Shortcut::new("X", true, false, Action::Cut, "Cut elements"),
            Shortcut::new("V", true, false, Action::Paste, "Paste elements"),
            Shortcut::new("D", true, false, Action::Duplicate, "Duplicate selection"),
            Shortcut::new("A", true, false, Action::SelectAll, "Select all elements"),
            Shortcut::new("]", true, true, Action::BringToFront, "Bring to front"),
            Shortcut::new("[", true, true, Action::SendToBack, "Send to back"),
            Shortcut::new("]", true, false, Action::BringForward, "Bring forward"),
            Shortcut::new("[", true, false, Action::SendBackward, "Send backward"),
            Shortcut::new("ArrowLeft", false, false, Action::Nudge { dx: -1, dy: 0 }, "Nudge left"),
            Shortcut::new("ArrowRight", false, false, Action::Nudge { dx: 1, dy: 0 }, "Nudge right"),
            Shortcut::new("ArrowUp", false, false, Action::Nudge { dx: 0, dy: -1 }, "Nudge up"),
            Shortcut::new("ArrowDown", false, false, Action::Nudge { dx: 0, dy: 1 }, "Nudge down"),
            Shortcut::new("ArrowLeft", false, true, Action::Nudge { dx: -10, dy: 0 }, "Nudge left by 10"),
            Shortcut::new("ArrowRight", false, true, Action::Nudge { dx: 10, dy: 0 }, "Nudge right by 10"),
            Shortcut::new("ArrowUp", false, true, Action::Nudge { dx: 0, dy: -10 }, "Nudge up by 10"),
            Shortcut::new("ArrowDown", false, true, Action::Nudge { dx: 0, dy: 10 }, "Nudge down by 10"),
            Shortcut::new("Escape", false, false, Action::Escape, "Cancel current action"),
        ]
    }

    /// Resolve a key press. Letter keys match case-insensitively.
    pub fn lookup(key: &str, ctrl: bool, shift: bool) -> Option<Action> {
        Self::all()
            .into_iter()
            .find(|s| s.matches(key, ctrl, shift))
            .map(|s| s.action)
    }

    /// Print all shortcuts to console.
    pub fn print_all() {
        println!("\n=== Keyboard Shortcuts ===");
        for shortcut in Self::all() {
            println!("  {:20} {}", shortcut.format(), shortcut.description);
        }
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        assert_eq!(ShortcutRegistry::lookup("z", true, false), Some(Action::Undo));
        assert_eq!(ShortcutRegistry::lookup("Z", true, true), Some(Action::Redo));
        assert_eq!(ShortcutRegistry::lookup("y", true, false), Some(Action::Redo));
        assert_eq!(ShortcutRegistry::lookup("Backspace", false, false), Some(Action::Delete));
        assert_eq!(ShortcutRegistry::lookup("]", true, true), Some(Action::BringToFront));
        assert_eq!(
            ShortcutRegistry::lookup("ArrowUp", false, true),
            Some(Action::Nudge { dx: 0, dy: -10 })
        );
        assert_eq!(ShortcutRegistry::lookup("z", false, false), None);
    }

    #[test]
    fn test_no_ambiguous_bindings() {
        let all = ShortcutRegistry::all();
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                assert!(!a.matches(b.key, b.ctrl, b.shift), "{} bound twice", a.format());
            }
        }
    }

    #[test]
    fn test_format() {
        let s = Shortcut::new("Z", true, true, Action::Redo, "Redo");
        assert_eq!(s.format(), "Ctrl+Shift+Z");
    }
}
