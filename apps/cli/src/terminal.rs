//! Terminal-backed display region and trigger control.

use std::{
    io::{self, Write},
    sync::{
        atomic::{AtomicBool, Ordering},
        RwLock,
    },
};

use client_core::{DisplayContent, DisplayRegion, TriggerControl};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Results go to stdout; the busy placeholder goes to stderr so piped
/// output only carries settled content.
pub struct TerminalDisplay {
    format: OutputFormat,
}

impl TerminalDisplay {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }
}

impl DisplayRegion for TerminalDisplay {
    fn replace(&self, content: DisplayContent) {
        if content.is_empty() {
            return;
        }
        if content.is_busy() {
            let _ = write!(io::stderr().lock(), "{content}");
            return;
        }

        let mut out = io::stdout().lock();
        let written = match self.format {
            OutputFormat::Text => writeln!(out, "{content}"),
            OutputFormat::Json => match serde_json::to_string_pretty(&content) {
                Ok(json) => writeln!(out, "{json}"),
                Err(error) => {
                    tracing::error!(%error, "failed to encode display content");
                    Ok(())
                }
            },
        };
        if let Err(error) = written.and_then(|()| out.flush()) {
            tracing::warn!(%error, "failed to write results to stdout");
        }
    }
}

pub struct TerminalControl {
    enabled: AtomicBool,
    label: RwLock<String>,
}

impl TerminalControl {
    pub fn new() -> Self {
        Self {
            enabled: AtomicBool::new(true),
            label: RwLock::new(String::new()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    pub fn label(&self) -> String {
        self.label
            .read()
            .map(|label| label.clone())
            .unwrap_or_default()
    }
}

impl Default for TerminalControl {
    fn default() -> Self {
        Self::new()
    }
}

impl TriggerControl for TerminalControl {
    fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Release);
    }

    fn set_label(&self, label: &str) {
        if let Ok(mut current) = self.label.write() {
            current.clear();
            current.push_str(label);
        }
        tracing::trace!(label, "trigger label changed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_tracks_enabled_flag_and_label() {
        let control = TerminalControl::new();
        assert!(control.is_enabled());

        control.set_enabled(false);
        control.set_label("Analyzing...");
        assert!(!control.is_enabled());
        assert_eq!(control.label(), "Analyzing...");

        control.set_label("Analyze DNA");
        control.set_enabled(true);
        assert!(control.is_enabled());
        assert_eq!(control.label(), "Analyze DNA");
    }
}
