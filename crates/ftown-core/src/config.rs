//! Global switches and per-library options
//!
//! Three process-wide switches, each off by default and each settable from the
//! environment at startup or at runtime:
//!
//! | Switch | Env var | Effect |
//! |---|---|---|
//! | leak warnings | `FTOWN_LEAK_WARNINGS=1` | warn when a library is dropped with live children |
//! | lifecycle tracing | `FTOWN_TRACE_LIFECYCLE=1` | `trace!` every create/dispose transition |
//! | strict release | `FTOWN_STRICT_RELEASE=1` | panic instead of logging when a native release call fails |
//!
//! ```
//! use ftown_core::config;
//!
//! config::set_leak_warnings(true);
//! assert!(config::is_leak_warnings_enabled());
//! config::set_leak_warnings(false);
//! ```
//!
//! [`LibraryOptions`] holds settings applied once to each new library.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::OnceLock;

use crate::error::{FtError, Result};
use crate::types::{LcdFilter, LoadTarget};

struct Switch {
    var: &'static str,
    enabled: AtomicBool,
    env_checked: OnceLock<()>,
}

impl Switch {
    const fn new(var: &'static str) -> Self {
        Self {
            var,
            enabled: AtomicBool::new(false),
            env_checked: OnceLock::new(),
        }
    }

    fn check_env(&self) {
        self.env_checked.get_or_init(|| {
            if let Ok(val) = std::env::var(self.var) {
                if is_truthy(&val) {
                    self.enabled.store(true, Ordering::SeqCst);
                    log::info!("{} enabled via environment", self.var);
                }
            }
        });
    }

    fn get(&self) -> bool {
        self.check_env();
        self.enabled.load(Ordering::SeqCst)
    }

    fn set(&self, enabled: bool) {
        self.check_env();
        self.enabled.store(enabled, Ordering::SeqCst);
        log::debug!(
            "{} {} via runtime call",
            self.var,
            if enabled { "enabled" } else { "disabled" }
        );
    }
}

fn is_truthy(val: &str) -> bool {
    matches!(val.to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

static LEAK_WARNINGS: Switch = Switch::new("FTOWN_LEAK_WARNINGS");
static TRACE_LIFECYCLE: Switch = Switch::new("FTOWN_TRACE_LIFECYCLE");
static STRICT_RELEASE: Switch = Switch::new("FTOWN_STRICT_RELEASE");

pub fn is_leak_warnings_enabled() -> bool {
    LEAK_WARNINGS.get()
}

/// Overrides `FTOWN_LEAK_WARNINGS`.
pub fn set_leak_warnings(enabled: bool) {
    LEAK_WARNINGS.set(enabled);
}

pub fn is_lifecycle_tracing_enabled() -> bool {
    TRACE_LIFECYCLE.get()
}

/// Overrides `FTOWN_TRACE_LIFECYCLE`.
pub fn set_lifecycle_tracing(enabled: bool) {
    TRACE_LIFECYCLE.set(enabled);
}

pub fn is_strict_release() -> bool {
    STRICT_RELEASE.get()
}

/// Overrides `FTOWN_STRICT_RELEASE`.
pub fn set_strict_release(enabled: bool) {
    STRICT_RELEASE.set(enabled);
}

/// Settings applied to a library right after it is initialised.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LibraryOptions {
    /// LCD filter installed with `FT_Library_SetLcdFilter`. `None` leaves the
    /// native default alone.
    pub lcd_filter: Option<LcdFilter>,
    /// Load target merged into load flags that carry none.
    pub default_load_target: Option<LoadTarget>,
}

impl LibraryOptions {
    /// Read `FTOWN_LCD_FILTER` and `FTOWN_LOAD_TARGET`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an explicit variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let lcd_filter = lookup("FTOWN_LCD_FILTER")
            .map(|val| {
                val.parse::<LcdFilter>()
                    .map_err(|_| FtError::Config(format!("FTOWN_LCD_FILTER: unknown filter '{val}'")))
            })
            .transpose()?;
        let default_load_target = lookup("FTOWN_LOAD_TARGET")
            .map(|val| {
                val.parse::<LoadTarget>()
                    .map_err(|_| FtError::Config(format!("FTOWN_LOAD_TARGET: unknown target '{val}'")))
            })
            .transpose()?;
        Ok(Self {
            lcd_filter,
            default_load_target,
        })
    }

    pub fn with_lcd_filter(mut self, filter: LcdFilter) -> Self {
        self.lcd_filter = Some(filter);
        self
    }

    pub fn with_load_target(mut self, target: LoadTarget) -> Self {
        self.default_load_target = Some(target);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn leak_warnings_toggle() {
        set_leak_warnings(true);
        assert!(is_leak_warnings_enabled());

        set_leak_warnings(false);
        assert!(!is_leak_warnings_enabled());
    }

    #[test]
    fn truthy_values() {
        for val in ["1", "true", "YES", "On"] {
            assert!(is_truthy(val), "{val}");
        }
        for val in ["0", "false", "", "enabled"] {
            assert!(!is_truthy(val), "{val}");
        }
    }

    #[test]
    fn options_from_lookup() {
        let vars: HashMap<&str, &str> = [("FTOWN_LCD_FILTER", "light"), ("FTOWN_LOAD_TARGET", "mono")].into();
        let options = LibraryOptions::from_lookup(|var| vars.get(var).map(|v| v.to_string())).unwrap();

        assert_eq!(options.lcd_filter, Some(LcdFilter::Light));
        assert_eq!(options.default_load_target, Some(LoadTarget::Mono));
    }

    #[test]
    fn options_default_when_unset() {
        let options = LibraryOptions::from_lookup(|_| None).unwrap();
        assert_eq!(options, LibraryOptions::default());
    }

    #[test]
    fn bad_option_is_config_error() {
        let err = LibraryOptions::from_lookup(|var| (var == "FTOWN_LCD_FILTER").then(|| "sharp".to_string()))
            .unwrap_err();
        assert!(matches!(err, FtError::Config(msg) if msg.contains("sharp")));
    }
}
