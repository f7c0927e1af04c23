//! Actor-facing message templates
//!
//! Templates use `{name}` placeholders. The cooldown template receives
//! `{time_left}` (e.g. `1m 5s`) and `{seconds}` (whole seconds, rounded up).

use std::time::Duration;

use crate::config::MessagesConfig;
use crate::core::duration::format_remaining;

#[derive(Debug, Clone)]
pub struct Messages {
    cooldown: String,
    internal_error: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self::from_config(&MessagesConfig::default())
    }
}

impl Messages {
    #[must_use]
    pub fn from_config(config: &MessagesConfig) -> Self {
        Self {
            cooldown: config.cooldown.clone(),
            internal_error: config.internal_error.clone(),
        }
    }

    /// Message shown when a command is still cooling down.
    #[must_use]
    pub fn cooldown(&self, remaining: Duration) -> String {
        let seconds = remaining.as_secs() + u64::from(remaining.subsec_nanos() > 0);
        render(
            &self.cooldown,
            &[
                ("time_left", &format_remaining(remaining)),
                ("seconds", &seconds.to_string()),
            ],
        )
    }

    #[must_use]
    pub fn internal_error(&self) -> &str {
        &self.internal_error
    }
}

/// Replace `{name}` placeholders. Unknown placeholders are left as written.
#[must_use]
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = template.to_string();
    for (name, value) in vars {
        out = out.replace(&format!("{{{name}}}"), value);
    }
    out
}
