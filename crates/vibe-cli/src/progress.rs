use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use vibe_publish::PublishEvent;

use crate::ui;

/// Stderr progress for a running command: a spinner on a terminal, plain
/// lines otherwise, nothing in quiet mode.
pub struct Progress {
    bar: Option<ProgressBar>,
    lines: bool,
}

impl Progress {
    #[must_use]
    pub fn spinner(message: &str) -> Self {
        let prefs = ui::prefs();
        if !prefs.spinner {
            let progress = Self {
                bar: None,
                lines: prefs.lines,
            };
            progress.set_message(message);
            return progress;
        }

        let bar = ProgressBar::with_draw_target(None, ProgressDrawTarget::stderr());
        bar.enable_steady_tick(Duration::from_millis(100));
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(message.to_string());
        Self {
            bar: Some(bar),
            lines: false,
        }
    }

    pub fn set_message(&self, message: &str) {
        if let Some(bar) = &self.bar {
            bar.set_message(message.to_string());
        } else if self.lines {
            eprintln!("{message}");
        }
    }

    /// Print a line above the spinner without disturbing it.
    pub fn println(&self, message: &str) {
        if let Some(bar) = &self.bar {
            bar.println(message);
        } else if self.lines {
            eprintln!("{message}");
        }
    }

    pub fn finish_ok(&self, message: &str) {
        if let Some(bar) = &self.bar {
            bar.finish_with_message(message.to_string());
        } else if self.lines {
            eprintln!("{message}");
        }
    }

    pub fn finish_clear(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }

    pub fn finish_err(&self, message: &str) {
        if let Some(bar) = &self.bar {
            bar.abandon_with_message(message.to_string());
        } else if self.lines {
            eprintln!("{message}");
        }
    }
}

/// One display line for a pipeline event.
#[must_use]
pub fn describe(event: &PublishEvent) -> String {
    match event {
        PublishEvent::Stage(stage) => format!("{stage}..."),
        PublishEvent::Progress(message) => message.clone(),
        PublishEvent::Warning(message) => format!("warning: {message}"),
        PublishEvent::Published { url, .. } => format!("Published: {url}"),
    }
}

/// Render pipeline events until the publisher drops its sender.
pub fn render_events(mut rx: mpsc::Receiver<PublishEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let progress = Progress::spinner("Starting...");
        while let Some(event) = rx.recv().await {
            let line = describe(&event);
            match event {
                PublishEvent::Stage(_) | PublishEvent::Progress(_) => progress.set_message(&line),
                PublishEvent::Warning(_) => progress.println(&line),
                PublishEvent::Published { .. } => {
                    progress.finish_ok(&line);
                    return;
                }
            }
        }
        progress.finish_clear();
    })
}
