//! Shared test utilities
//!
//! Rendering output depends on the process-wide settings, so tests that
//! mutate them must not interleave. These helpers serialize such tests on a
//! single lock and restore the default profile afterwards.

use std::sync::{Mutex, PoisonError};

use crate::settings;
use crate::style::Palette;

/// Serializes tests that touch the global settings.
static SETTINGS_GUARD: Mutex<()> = Mutex::new(());

/// Run `f` with exclusive access to the global settings, starting from the
/// default profile with the given palette. The default profile and the
/// full-RGB palette are restored afterwards.
pub fn with_settings<F: FnOnce()>(palette: Palette, f: F) {
    let _guard = SETTINGS_GUARD.lock().unwrap_or_else(PoisonError::into_inner);
    settings::apply_default();
    settings::set_palette(palette);
    f();
    settings::apply_default();
    settings::set_palette(Palette::RGBFULL);
}

/// [`with_settings`] with all terminal styling disabled, for tests that
/// assert on layout rather than color.
pub fn with_plain_settings<F: FnOnce()>(f: F) {
    with_settings(Palette::NONE, f);
}
