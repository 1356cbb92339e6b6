// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! User-visible banners and the submission status line.

use std::time::{Duration, Instant};

/// How long non-error banners stay up before dismissing themselves.
pub const BANNER_TTL: Duration = Duration::from_secs(8);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl Severity {
    pub fn title(&self) -> &'static str {
        match self {
            Severity::Info => "Info",
            Severity::Success => "Success",
            Severity::Warning => "Heads up",
            Severity::Error => "Error",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Banner {
    pub severity: Severity,
    pub message: String,
    raised_at: Instant,
}

/// Holds at most one banner plus one status line; newer replaces older.
#[derive(Debug, Default)]
pub struct StatusReporter {
    banner: Option<Banner>,
    status_line: Option<(Severity, String)>,
}

impl StatusReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.raise(Severity::Info, message.into());
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.raise(Severity::Success, message.into());
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.raise(Severity::Warning, message.into());
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.raise(Severity::Error, message.into());
    }

    fn raise(&mut self, severity: Severity, message: String) {
        match severity {
            Severity::Error => log::error!("{}", message),
            Severity::Warning => log::warn!("{}", message),
            Severity::Info | Severity::Success => log::info!("{}", message),
        }
        self.banner = Some(Banner {
            severity,
            message,
            raised_at: Instant::now(),
        });
    }

    pub fn banner(&self) -> Option<&Banner> {
        self.banner.as_ref()
    }

    pub fn dismiss(&mut self) {
        self.banner = None;
    }

    /// Drop a non-error banner older than `ttl`. Errors stay until dismissed.
    pub fn expire(&mut self, now: Instant, ttl: Duration) {
        if let Some(banner) = &self.banner {
            if banner.severity != Severity::Error
                && now.saturating_duration_since(banner.raised_at) >= ttl
            {
                self.banner = None;
            }
        }
    }

    pub fn set_status(&mut self, severity: Severity, text: impl Into<String>) {
        let text = text.into();
        log::debug!("Status: {}", text);
        self.status_line = Some((severity, text));
    }

    pub fn status_line(&self) -> Option<(Severity, &str)> {
        self.status_line.as_ref().map(|(s, t)| (*s, t.as_str()))
    }

    pub fn clear_status(&mut self) {
        self.status_line = None;
    }
}
