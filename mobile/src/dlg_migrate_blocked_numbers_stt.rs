/// Callback for the operation migrating the dialer's own blocked-number list
/// to the system-managed blocked numbers provider.
pub trait MigrationListener {
    /// Called when the user allowed the migration.
    fn on_complete(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DismissReason {
    Allowed,
    Cancelled,
    OutsideTap,
    /// Host view was paused (rotation, backgrounding).
    HostPaused,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogState {
    Shown,
    Dismissed(DismissReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogEvent {
    AllowClicked,
    CancelClicked,
    OutsideTapped,
    HostPaused,
}

/// Error types for constructing the migration dialog
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogError {
    MissingListener,
}

impl std::fmt::Display for DialogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DialogError::MissingListener => {
                write!(f, "Migration dialog requires a completion listener")
            }
        }
    }
}

impl std::error::Error for DialogError {}

pub struct DlgMigrateBlockedNumbers {
    pub open: bool,
    pub(crate) state: DialogState,
    pub(crate) migration_listener: Option<Box<dyn MigrationListener>>,
}
