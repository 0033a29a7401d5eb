mod plugin;
pub use plugin::{Plugin, PluginKind, PluginSpec};

mod outcome;
pub use outcome::{ExitStatus, NO_LOGS_AVAILABLE, RunOutcome};
