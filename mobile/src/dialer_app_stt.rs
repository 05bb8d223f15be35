use crate::dlg_migrate_blocked_numbers::DlgMigrateBlockedNumbers;
use crate::Config;
use crate::LogLevel;
use crate::Settings;
use eframe::egui::Vec2;
use std::cell::Cell;
use std::rc::Rc;

#[derive(Debug, Clone, Default)]
pub struct LogSettings {
    pub show_logs: bool,
    pub log_level: LogLevel,
}

/// Where the blocked-number migration stands from the host's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MigrationStatus {
    #[default]
    NotPrompted,
    /// Prompt dismissed without allowing.
    Declined,
    /// User allowed, migration handed off to its collaborator.
    Requested,
}

#[doc(hidden)]
pub struct DialerApp {
    pub config: Option<Config>,
    pub settings: Settings,
    pub migrate_dialog: Option<DlgMigrateBlockedNumbers>,
    pub migration_status: Rc<Cell<MigrationStatus>>,
    // host lifecycle tracking
    pub last_screen_size: Option<Vec2>,
    pub was_focused: bool,
}
