pub use crate::dlg_migrate_blocked_numbers_stt::*;
use eframe::egui;
use egui_i18n::tr;
use egui_material3::dialog;
use std::cell::Cell;

/// Dialog shown to users when their blocked numbers need to move from the
/// dialer's own list to the system-managed blocked numbers provider.
///
/// The session owns its [`MigrationListener`] until the dialog leaves the
/// screen. Every exit path (allow, cancel, outside tap, host pause, drop)
/// releases it, and `on_complete` runs at most once.
impl DlgMigrateBlockedNumbers {
    /// Creates a new dialog session in the `Shown` state.
    ///
    /// Returns [`DialogError::MissingListener`] if no listener is given.
    pub fn new_instance(
        migration_listener: Option<Box<dyn MigrationListener>>,
    ) -> Result<Self, DialogError> {
        let Some(migration_listener) = migration_listener else {
            tracing::error!("Migration dialog created without a listener");
            return Err(DialogError::MissingListener);
        };

        tracing::debug!("Migration dialog created");
        Ok(Self {
            open: true,
            state: DialogState::Shown,
            migration_listener: Some(migration_listener),
        })
    }

    pub fn new<L>(migration_listener: L) -> Self
    where
        L: MigrationListener + 'static,
    {
        Self {
            open: true,
            state: DialogState::Shown,
            migration_listener: Some(Box::new(migration_listener)),
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn state(&self) -> DialogState {
        self.state
    }

    pub fn has_listener(&self) -> bool {
        self.migration_listener.is_some()
    }

    pub fn dismiss_reason(&self) -> Option<DismissReason> {
        match self.state {
            DialogState::Shown => None,
            DialogState::Dismissed(reason) => Some(reason),
        }
    }

    /// Applies one user or lifecycle event. Events after dismissal are ignored.
    pub fn handle_event(&mut self, event: DialogEvent) {
        if self.state != DialogState::Shown {
            tracing::trace!("Ignoring {:?} on dismissed migration dialog", event);
            return;
        }

        let reason = match event {
            DialogEvent::AllowClicked => {
                // The migration itself is performed by the listener's owner.
                if let Some(mut listener) = self.migration_listener.take() {
                    listener.on_complete();
                }
                DismissReason::Allowed
            }
            DialogEvent::CancelClicked => DismissReason::Cancelled,
            DialogEvent::OutsideTapped => DismissReason::OutsideTap,
            DialogEvent::HostPaused => DismissReason::HostPaused,
        };

        self.dismiss(reason);
    }

    /// Host view suspension, i.e. rotation or backgrounding.
    pub fn on_pause(&mut self) {
        self.handle_event(DialogEvent::HostPaused);
    }

    fn dismiss(&mut self, reason: DismissReason) {
        self.open = false;
        self.migration_listener = None;
        self.state = DialogState::Dismissed(reason);
        tracing::debug!("Migration dialog dismissed: {:?}", reason);
    }

    /// Renders the dialog. Returns true if the user allowed the migration this frame.
    pub fn show(&mut self, ctx: &egui::Context) -> bool {
        if !self.open || self.state != DialogState::Shown {
            return false;
        }

        let allow_clicked = Cell::new(false);
        let cancel_clicked = Cell::new(false);

        let title = tr!("migrate-blocked-numbers-dialog-title");
        let message = tr!("migrate-blocked-numbers-dialog-message");

        dialog(
            "migrate_blocked_numbers_dialog",
            &title,
            &mut self.open,
        )
        .content(|ui| {
            ui.set_width(300.0);
            ui.label(&message);
        })
        .action(tr!("migrate-blocked-numbers-dialog-cancel-button"), || {
            cancel_clicked.set(true);
        })
        .primary_action(tr!("migrate-blocked-numbers-dialog-allow-button"), || {
            allow_clicked.set(true);
        })
        .show(ctx);

        if allow_clicked.get() {
            self.handle_event(DialogEvent::AllowClicked);
            return true;
        }

        if cancel_clicked.get() {
            self.handle_event(DialogEvent::CancelClicked);
        } else if !self.open {
            // closed by the dialog itself without a button: scrim tap or escape
            self.handle_event(DialogEvent::OutsideTapped);
        }

        false
    }
}

impl Drop for DlgMigrateBlockedNumbers {
    fn drop(&mut self) {
        if self.migration_listener.take().is_some() {
            tracing::debug!("Migration dialog dropped while shown, listener released");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    struct CountingListener {
        calls: Rc<Cell<usize>>,
    }

    impl MigrationListener for CountingListener {
        fn on_complete(&mut self) {
            self.calls.set(self.calls.get() + 1);
        }
    }

    fn counting_dialog() -> (DlgMigrateBlockedNumbers, Rc<Cell<usize>>) {
        let calls = Rc::new(Cell::new(0));
        let dlg = DlgMigrateBlockedNumbers::new(CountingListener {
            calls: Rc::clone(&calls),
        });
        (dlg, calls)
    }

    #[test]
    fn test_new_instance_without_listener() {
        let result = DlgMigrateBlockedNumbers::new_instance(None);
        assert_eq!(result.err(), Some(DialogError::MissingListener));
    }

    #[test]
    fn test_new_instance_with_listener() {
        let calls = Rc::new(Cell::new(0));
        let dlg = DlgMigrateBlockedNumbers::new_instance(Some(Box::new(CountingListener {
            calls: Rc::clone(&calls),
        })))
        .unwrap();

        assert!(dlg.is_open());
        assert!(dlg.has_listener());
        assert_eq!(dlg.state(), DialogState::Shown);
        assert_eq!(dlg.dismiss_reason(), None);
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_allow_after_dismiss_is_ignored() {
        let (mut dlg, calls) = counting_dialog();

        dlg.handle_event(DialogEvent::CancelClicked);
        dlg.handle_event(DialogEvent::AllowClicked);

        assert_eq!(calls.get(), 0);
        assert_eq!(dlg.dismiss_reason(), Some(DismissReason::Cancelled));
    }

    #[test]
    fn test_outside_tap_dismisses_silently() {
        let (mut dlg, calls) = counting_dialog();

        dlg.handle_event(DialogEvent::OutsideTapped);

        assert_eq!(calls.get(), 0);
        assert!(!dlg.is_open());
        assert!(!dlg.has_listener());
        assert_eq!(dlg.state(), DialogState::Dismissed(DismissReason::OutsideTap));
    }

    #[test]
    fn test_drop_releases_listener() {
        let calls = Rc::new(Cell::new(0));
        let dlg = DlgMigrateBlockedNumbers::new(CountingListener {
            calls: Rc::clone(&calls),
        });
        assert_eq!(Rc::strong_count(&calls), 2);

        drop(dlg);

        assert_eq!(Rc::strong_count(&calls), 1);
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            DialogError::MissingListener.to_string(),
            "Migration dialog requires a completion listener"
        );
    }
}
