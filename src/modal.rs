//! Popup lifecycle shared by every modal: visibility, focus trapping while
//! open, and a single teardown on close.

use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Tab { shift: bool },
    Enter,
    Escape,
    Other,
}

/// What the controller did with a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Not handled; default browser behaviour applies.
    Ignored,
    /// Focus was wrapped inside the popup; default navigation suppressed.
    Wrapped,
    /// The popup asked to be closed.
    CloseRequested,
}

/// Keeps Tab cycling confined to an ordered set of focusable elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusTrap {
    elements: Vec<String>,
    active: usize,
}

impl FocusTrap {
    pub fn new(elements: Vec<String>) -> Self {
        Self { elements, active: 0 }
    }

    pub fn active(&self) -> Option<&str> {
        self.elements.get(self.active).map(String::as_str)
    }

    pub fn focus(&mut self, id: &str) -> bool {
        match self.elements.iter().position(|element| element == id) {
            Some(index) => {
                self.active = index;
                true
            }
            None => false,
        }
    }

    /// Tab on the last element goes to the first, Shift+Tab on the first to
    /// the last. Anywhere else focus moves normally.
    pub fn handle_tab(&mut self, shift: bool) -> KeyOutcome {
        let Some(last) = self.elements.len().checked_sub(1) else {
            return KeyOutcome::Ignored;
        };

        match (shift, self.active) {
            (true, 0) => {
                self.active = last;
                KeyOutcome::Wrapped
            }
            (false, active) if active == last => {
                self.active = 0;
                KeyOutcome::Wrapped
            }
            (true, active) => {
                self.active = active - 1;
                KeyOutcome::Ignored
            }
            (false, active) => {
                self.active = active + 1;
                KeyOutcome::Ignored
            }
        }
    }
}

#[derive(Debug)]
pub struct Modal {
    name: &'static str,
    trap: Option<FocusTrap>,
}

impl Modal {
    pub fn new(name: &'static str) -> Self {
        Self { name, trap: None }
    }

    pub fn is_open(&self) -> bool {
        self.trap.is_some()
    }

    pub fn open(&mut self, focusable: Vec<String>) {
        if self.trap.is_some() {
            debug!("{} popup already open", self.name);
            return;
        }
        debug!("{} popup opened", self.name);
        self.trap = Some(FocusTrap::new(focusable));
    }

    /// Hides the popup and releases its focus trap. Returns `false` when the
    /// popup was already closed, so the trap is torn down at most once.
    pub fn close(&mut self) -> bool {
        match self.trap.take() {
            Some(_) => {
                debug!("{} popup closed, focus trap released", self.name);
                true
            }
            None => false,
        }
    }

    pub fn trap(&self) -> Option<&FocusTrap> {
        self.trap.as_ref()
    }

    pub fn handle_key(&mut self, key: Key) -> KeyOutcome {
        let Some(trap) = self.trap.as_mut() else {
            return KeyOutcome::Ignored;
        };

        match key {
            Key::Tab { shift } => trap.handle_tab(shift),
            Key::Escape => KeyOutcome::CloseRequested,
            Key::Enter | Key::Other => KeyOutcome::Ignored,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn tab_wraps_at_both_ends() {
        let mut modal = Modal::new("ponto");
        modal.open(ids(&["date", "arrival", "submit"]));

        assert_eq!(modal.handle_key(Key::Tab { shift: true }), KeyOutcome::Wrapped);
        assert_eq!(modal.trap().unwrap().active(), Some("submit"));

        assert_eq!(modal.handle_key(Key::Tab { shift: false }), KeyOutcome::Wrapped);
        assert_eq!(modal.trap().unwrap().active(), Some("date"));

        assert_eq!(modal.handle_key(Key::Tab { shift: false }), KeyOutcome::Ignored);
        assert_eq!(modal.trap().unwrap().active(), Some("arrival"));
    }

    #[test]
    fn close_releases_trap_exactly_once() {
        let mut modal = Modal::new("tables");
        modal.open(ids(&["name"]));
        assert!(modal.is_open());

        assert!(modal.close());
        assert!(!modal.close());
        assert!(modal.trap().is_none());
        assert_eq!(modal.handle_key(Key::Tab { shift: false }), KeyOutcome::Ignored);
    }

    #[test]
    fn escape_requests_close_only_while_open() {
        let mut modal = Modal::new("ponto");
        assert_eq!(modal.handle_key(Key::Escape), KeyOutcome::Ignored);
        modal.open(ids(&["date"]));
        assert_eq!(modal.handle_key(Key::Escape), KeyOutcome::CloseRequested);
    }

    #[test]
    fn empty_trap_ignores_tab() {
        let mut trap = FocusTrap::new(Vec::new());
        assert_eq!(trap.handle_tab(false), KeyOutcome::Ignored);
        assert_eq!(trap.active(), None);
    }

    #[test]
    fn focus_moves_to_known_element() {
        let mut trap = FocusTrap::new(ids(&["a", "b"]));
        assert!(trap.focus("b"));
        assert!(!trap.focus("zzz"));
        assert_eq!(trap.handle_tab(false), KeyOutcome::Wrapped);
        assert_eq!(trap.active(), Some("a"));
    }
}
