use std::io::IsTerminal;
use std::sync::OnceLock;

use crate::cli::GlobalFlags;

#[derive(Clone, Copy, Debug)]
pub struct UiPrefs {
    /// Animated spinner on stderr.
    pub spinner: bool,
    /// Plain progress lines on stderr when the spinner is off.
    pub lines: bool,
}

static UI_PREFS: OnceLock<UiPrefs> = OnceLock::new();

pub fn init(flags: &GlobalFlags) {
    let _ = UI_PREFS.set(resolve(flags, std::io::stderr().is_terminal()));
}

const fn resolve(flags: &GlobalFlags, stderr_tty: bool) -> UiPrefs {
    UiPrefs {
        spinner: stderr_tty && !flags.quiet,
        lines: !stderr_tty && !flags.quiet,
    }
}

#[must_use]
pub fn prefs() -> UiPrefs {
    *UI_PREFS.get().unwrap_or(&UiPrefs {
        spinner: false,
        lines: false,
    })
}
