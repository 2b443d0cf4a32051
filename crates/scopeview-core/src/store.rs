// ── View state store ──
//
// Owns the single `ViewState`. Mutation happens only through `dispatch`,
// which runs the reducer and bumps a version counter.

use tracing::trace;

use crate::action::Action;
use crate::reducer::reduce;
use crate::state::ViewState;

pub struct Store {
    state: ViewState,
    /// Version counter, bumped on every state-changing dispatch.
    version: u64,
}

impl Store {
    pub fn new(state: ViewState) -> Self {
        Self { state, version: 0 }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// Run the reducer. Shell-only actions leave the version untouched.
    pub fn dispatch(&mut self, action: &Action) {
        if action.is_shell_only() {
            return;
        }
        trace!(?action, "dispatch");
        reduce(&mut self.state, action);
        self.version += 1;
    }

    pub fn version(&self) -> u64 {
        self.version
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new(ViewState::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_bumps_version() {
        let mut store = Store::default();
        store.dispatch(&Action::ToggleHelp);
        assert_eq!(store.version(), 1);
        assert!(store.state().showing_help);
    }

    #[test]
    fn shell_actions_do_not_touch_state() {
        let mut store = Store::default();
        store.dispatch(&Action::Render);
        store.dispatch(&Action::Quit);
        assert_eq!(store.version(), 0);
    }
}
