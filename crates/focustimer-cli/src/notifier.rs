//! Terminal implementation of the core notifier.
//!
//! Everything goes to stderr so command output on stdout stays parseable.
//! Whether OS-level notices are shown at all is decided by the user's
//! `notifications` setting before they reach this type.

use std::cell::{Cell, RefCell};

use focustimer_core::{Notifier, Severity};

pub struct TerminalNotifier {
    volume: Cell<u8>,
    ticking: Cell<bool>,
    /// Between `start_ticking_loop` and `stop_ticking_loop`.
    looping: Cell<bool>,
    last_pulse: Cell<Option<u64>>,
    last_system: RefCell<Option<(String, String)>>,
}

impl TerminalNotifier {
    pub fn new() -> Self {
        Self {
            volume: Cell::new(50),
            ticking: Cell::new(false),
            looping: Cell::new(false),
            last_pulse: Cell::new(None),
            last_system: RefCell::new(None),
        }
    }

    fn bell(&self) {
        if self.volume.get() > 0 {
            eprint!("\x07");
        }
    }

    /// Drive the ticking loop from the foreground timer. Plays one tick per
    /// whole second of countdown while the loop is on; returns whether a tick
    /// was played.
    pub fn pulse(&self, time_left_secs: u64) -> bool {
        if !self.looping.get() || !self.ticking.get() {
            return false;
        }
        if self.last_pulse.replace(Some(time_left_secs)) == Some(time_left_secs) {
            return false;
        }
        self.play_tick_sound();
        true
    }
}

impl Default for TerminalNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for TerminalNotifier {
    fn notify(&self, message: &str, severity: Severity) {
        let label = match severity {
            Severity::Info => "info",
            Severity::Success => "ok",
            Severity::Warning => "warn",
            Severity::Error => "error",
        };
        eprintln!("[{label}] {message}");
    }

    fn play_focus_complete_sound(&self) {
        self.bell();
    }

    fn play_break_complete_sound(&self) {
        self.bell();
    }

    fn play_tick_sound(&self) {
        if self.volume.get() > 0 {
            eprint!(".");
        }
    }

    fn start_ticking_loop(&self) {
        self.looping.set(true);
        self.last_pulse.set(None);
    }

    fn stop_ticking_loop(&self) {
        self.looping.set(false);
    }

    fn system_notification(&self, title: &str, body: &str, tag: &str) {
        let key = (tag.to_string(), body.to_string());
        let mut last = self.last_system.borrow_mut();
        if last.as_ref() == Some(&key) {
            return;
        }
        eprintln!("== {title}: {body} ==");
        *last = Some(key);
    }

    fn set_volume(&self, volume: u8) {
        self.volume.set(volume);
    }

    fn set_ticking_enabled(&self, enabled: bool) {
        self.ticking.set(enabled);
        if !enabled {
            self.looping.set(false);
        }
    }

    fn apply_theme(&self, class_token: &str, color: &str) {
        tracing::debug!(class_token, color, "theme applied");
    }
}
