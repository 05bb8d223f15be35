#![doc(hidden)]

use std::cell::Cell;
use std::rc::Rc;
use std::sync::{Arc, Mutex, OnceLock};

use eframe::egui;
use eframe::egui::{Context, Vec2};
use egui_i18n::tr;
use egui_material3::theme::{load_fonts, load_themes, update_window_background};
use egui_material3::MaterialButton;

pub use crate::dialer_app_stt::*;
use crate::dlg_migrate_blocked_numbers::{
    DismissReason, DlgMigrateBlockedNumbers, MigrationListener,
};
use crate::LogLevel;
use crate::{Config, Settings};

/// Initialize common app components (i18n, log capture settings).
/// Call this early in main() before creating the app.
pub fn init_common() {
    crate::init_i18n();

    if let Ok(config) = Config::new() {
        if let Ok(settings) = config.load_settings() {
            if !settings.language.is_empty() {
                egui_i18n::set_language(&settings.language);
            }
            update_log_settings(LogSettings {
                show_logs: settings.show_logs,
                log_level: LogLevel::from_name(&settings.log_level).unwrap_or_default(),
            });
        }
    }
}

/// Initialize egui context with fonts and themes.
/// Call this in the eframe app creation callback.
pub fn init_egui(ctx: &Context) {
    load_fonts(ctx);
    load_themes();
    update_window_background(ctx);
}

static LOG_BUFFER: OnceLock<Arc<Mutex<String>>> = OnceLock::new();
static LOG_SETTINGS: OnceLock<Arc<Mutex<LogSettings>>> = OnceLock::new();

// Get or initialize the log buffer
fn get_log_buffer() -> &'static Arc<Mutex<String>> {
    LOG_BUFFER.get_or_init(|| Arc::new(Mutex::new(String::new())))
}

fn get_log_settings() -> &'static Arc<Mutex<LogSettings>> {
    LOG_SETTINGS.get_or_init(|| {
        Arc::new(Mutex::new(LogSettings {
            show_logs: false,
            log_level: LogLevel::Info,
        }))
    })
}

pub fn update_log_settings(settings: LogSettings) {
    if let Ok(mut log_settings) = get_log_settings().lock() {
        *log_settings = settings;
    }
}

const LOG_BUFFER_LIMIT: usize = 10000;

/// Appends a captured log line if its level passes the in-app log filter.
pub fn append_log(level: &str, message: String) {
    let Some(message_level) = LogLevel::from_name(level) else {
        return;
    };

    let should_log = match get_log_settings().lock() {
        Ok(settings) => message_level.passes(settings.log_level),
        Err(_) => false,
    };

    if !should_log {
        return;
    }

    if let Ok(mut buffer) = get_log_buffer().lock() {
        buffer.push_str(&message);
        buffer.push('\n');

        // Keep only the tail to bound memory
        if buffer.len() > LOG_BUFFER_LIMIT {
            let excess = buffer.len() - LOG_BUFFER_LIMIT;
            let cut = (excess..=buffer.len())
                .find(|i| buffer.is_char_boundary(*i))
                .unwrap_or(buffer.len());
            buffer.drain(..cut);
        }
    }
}

pub fn log_text() -> String {
    match get_log_buffer().lock() {
        Ok(buffer) => buffer.clone(),
        Err(_) => String::from("Unable to access logs"),
    }
}

pub trait View {
    fn ui(&mut self, ui: &mut egui::Ui);
}

/// Hands the user's consent over to the blocked-number migration.
struct HostMigrationListener {
    status: Rc<Cell<MigrationStatus>>,
}

impl MigrationListener for HostMigrationListener {
    fn on_complete(&mut self) {
        // Moving the numbers is the migration collaborator's job; the host only records consent.
        tracing::info!("Blocked numbers migration allowed by user");
        self.status.set(MigrationStatus::Requested);
    }
}

impl Default for DialerApp {
    fn default() -> Self {
        tracing::info!("OS: {}", std::env::consts::OS);

        let config = Config::new().ok();
        let settings = if let Some(ref cfg) = config {
            cfg.load_settings().unwrap_or_default()
        } else {
            Settings::default()
        };

        Self::new(config, settings)
    }
}

impl DialerApp {
    pub fn new(config: Option<Config>, settings: Settings) -> Self {
        Self {
            config,
            settings,
            migrate_dialog: None,
            migration_status: Rc::new(Cell::new(MigrationStatus::NotPrompted)),
            last_screen_size: None,
            was_focused: true,
        }
    }

    pub fn migration_status(&self) -> MigrationStatus {
        self.migration_status.get()
    }

    /// Shows the migration prompt unless one is already on screen.
    pub fn open_migrate_dialog(&mut self) {
        if self
            .migrate_dialog
            .as_ref()
            .is_some_and(DlgMigrateBlockedNumbers::is_open)
        {
            return;
        }

        let listener: Box<dyn MigrationListener> = Box::new(HostMigrationListener {
            status: Rc::clone(&self.migration_status),
        });

        match DlgMigrateBlockedNumbers::new_instance(Some(listener)) {
            Ok(dlg) => self.migrate_dialog = Some(dlg),
            Err(e) => tracing::error!("Failed to open migration dialog: {}", e),
        }
    }

    /// Feeds host lifecycle observations for this frame. Losing focus or a
    /// screen size change (rotation) counts as the host view pausing.
    pub fn on_host_lifecycle(&mut self, focused: bool, screen_size: Vec2) {
        let lost_focus = self.was_focused && !focused;
        let rotated = self
            .last_screen_size
            .is_some_and(|last| last != screen_size);

        self.was_focused = focused;
        self.last_screen_size = Some(screen_size);

        if lost_focus || rotated {
            tracing::debug!(
                "Host paused (lost_focus: {}, rotated: {})",
                lost_focus,
                rotated
            );
            if let Some(dlg) = self.migrate_dialog.as_mut() {
                dlg.on_pause();
            }
        }
        self.reap_migrate_dialog();
    }

    /// Drops a dismissed dialog session and records how it ended.
    fn reap_migrate_dialog(&mut self) {
        let Some(reason) = self
            .migrate_dialog
            .as_ref()
            .and_then(DlgMigrateBlockedNumbers::dismiss_reason)
        else {
            return;
        };

        match reason {
            DismissReason::Cancelled | DismissReason::OutsideTap => {
                if self.migration_status.get() != MigrationStatus::Requested {
                    self.migration_status.set(MigrationStatus::Declined);
                }
            }
            // Allowed already went through the listener; a pause leaves the prompt pending.
            DismissReason::Allowed | DismissReason::HostPaused => {}
        }

        self.migrate_dialog = None;
    }

    fn show_migrate_dialog(&mut self, ctx: &egui::Context) {
        if let Some(dlg) = self.migrate_dialog.as_mut() {
            if dlg.show(ctx) {
                tracing::debug!("Migration dialog confirmed this frame");
            }
        }
        self.reap_migrate_dialog();
    }

    fn render_log_settings(&mut self, ui: &mut egui::Ui) {
        let mut changed = false;

        ui.horizontal(|ui| {
            changed |= ui
                .checkbox(&mut self.settings.show_logs, tr!("show-logs"))
                .changed();

            egui::ComboBox::from_id_salt("log_level_combo")
                .selected_text(self.settings.log_level.clone())
                .show_ui(ui, |ui| {
                    for level in ["Error", "Warn", "Info", "Debug", "Trace"] {
                        changed |= ui
                            .selectable_value(&mut self.settings.log_level, level.to_string(), level)
                            .changed();
                    }
                });
        });

        if changed {
            self.apply_log_settings();
        }
    }

    /// Pushes the current log settings to the capture buffer and the tracing
    /// filter, then persists them.
    pub fn apply_log_settings(&mut self) {
        update_log_settings(LogSettings {
            show_logs: self.settings.show_logs,
            log_level: LogLevel::from_name(&self.settings.log_level).unwrap_or_default(),
        });
        crate::log_capture::update_tracing_level(&self.settings.log_level.to_lowercase());

        if let Some(ref config) = self.config {
            if let Err(e) = config.save_settings(&self.settings) {
                tracing::error!("Failed to save settings: {:#}", e);
            }
        }
    }

    fn render_logs(&mut self, ui: &mut egui::Ui) {
        let log_text = log_text();

        ui.label(tr!("logs"));
        egui::ScrollArea::vertical()
            .id_salt("logs_scroll")
            .max_height(150.0)
            .min_scrolled_height(150.0)
            .stick_to_bottom(true)
            .show(ui, |ui| {
                ui.add(
                    egui::TextEdit::multiline(&mut log_text.as_str())
                        .desired_width(f32::INFINITY)
                        .font(egui::TextStyle::Monospace)
                        .interactive(false)
                        .desired_rows(10),
                );
            });
    }
}

impl View for DialerApp {
    fn ui(&mut self, ui: &mut egui::Ui) {
        ui.heading(tr!("blocked-numbers-title"));
        ui.add_space(8.0);

        let status_text = match self.migration_status.get() {
            MigrationStatus::NotPrompted => tr!("migration-status-not-prompted"),
            MigrationStatus::Declined => tr!("migration-status-declined"),
            MigrationStatus::Requested => tr!("migration-status-requested"),
        };
        ui.add(egui::Label::new(status_text).wrap());
        ui.add_space(12.0);

        if self.migration_status.get() != MigrationStatus::Requested
            && ui
                .add(MaterialButton::filled(tr!("migrate-blocked-numbers-open")))
                .clicked()
        {
            self.open_migrate_dialog();
        }

        ui.add_space(12.0);
        self.render_log_settings(ui);

        if self.settings.show_logs {
            ui.add_space(12.0);
            self.render_logs(ui);
        }

        self.show_migrate_dialog(ui.ctx());
    }
}

impl eframe::App for DialerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let focused = ctx.input(|i| i.viewport().focused.unwrap_or(true));
        let screen_size = ctx.content_rect().size();
        self.on_host_lifecycle(focused, screen_size);

        egui::CentralPanel::default().show(ctx, |ui| {
            self.ui(ui);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dlg_migrate_blocked_numbers::DialogEvent;

    const PORTRAIT: Vec2 = Vec2::new(720.0, 1280.0);
    const LANDSCAPE: Vec2 = Vec2::new(1280.0, 720.0);

    fn app_with_dialog() -> DialerApp {
        let mut app = DialerApp::new(None, Settings::default());
        app.on_host_lifecycle(true, PORTRAIT);
        app.open_migrate_dialog();
        app
    }

    #[test]
    fn test_allow_requests_migration() {
        let mut app = app_with_dialog();

        if let Some(dlg) = app.migrate_dialog.as_mut() {
            dlg.handle_event(DialogEvent::AllowClicked);
        }
        app.reap_migrate_dialog();

        assert_eq!(app.migration_status(), MigrationStatus::Requested);
        assert!(app.migrate_dialog.is_none());
    }

    #[test]
    fn test_cancel_declines_migration() {
        let mut app = app_with_dialog();

        if let Some(dlg) = app.migrate_dialog.as_mut() {
            dlg.handle_event(DialogEvent::CancelClicked);
        }
        app.reap_migrate_dialog();

        assert_eq!(app.migration_status(), MigrationStatus::Declined);
        assert!(app.migrate_dialog.is_none());
    }

    #[test]
    fn test_rotation_pauses_dialog() {
        let mut app = app_with_dialog();
        assert!(app.migrate_dialog.is_some());

        app.on_host_lifecycle(true, LANDSCAPE);

        assert!(app.migrate_dialog.is_none());
        assert_eq!(app.migration_status(), MigrationStatus::NotPrompted);
        // listener released along with the session
        assert_eq!(Rc::strong_count(&app.migration_status), 1);
    }

    #[test]
    fn test_focus_loss_pauses_dialog() {
        let mut app = app_with_dialog();

        app.on_host_lifecycle(false, PORTRAIT);

        assert!(app.migrate_dialog.is_none());
        assert_eq!(app.migration_status(), MigrationStatus::NotPrompted);
    }

    #[test]
    fn test_open_twice_keeps_single_session() {
        let mut app = app_with_dialog();
        app.open_migrate_dialog();

        // one clone held by the app, one by the single live listener
        assert_eq!(Rc::strong_count(&app.migration_status), 2);
    }

    #[test]
    fn test_log_buffer_filters_by_level() {
        update_log_settings(LogSettings {
            show_logs: true,
            log_level: LogLevel::Warn,
        });

        append_log("ERROR", "[ERROR] test: kept-error-line".to_string());
        append_log("DEBUG", "[DEBUG] test: dropped-debug-line".to_string());
        append_log("BOGUS", "[BOGUS] test: dropped-unknown-line".to_string());

        let text = log_text();
        assert!(text.contains("kept-error-line"));
        assert!(!text.contains("dropped-debug-line"));
        assert!(!text.contains("dropped-unknown-line"));
    }
}
