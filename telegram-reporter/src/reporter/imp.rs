// Copyright (c) The telegram-reporter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    aggregate::ResultAggregator,
    config::ReporterConfig,
    deliver::{TelegramClient, Transport},
    errors::DisplayErrorChain,
    events::{SessionEvent, SessionStats},
    format::{self, SummaryInputs},
    time::{StopwatchSnapshot, StopwatchStart, stopwatch},
    tracker::AttemptTracker,
};

/// Observes one test session and posts a summary to Telegram at session end.
///
/// One instance per session, owned by the coordinating process. The runner
/// feeds it [`SessionEvent`]s through [`report_event`](Self::report_event);
/// everything else is internal. The reporter is strictly observational: no
/// event handler returns an error, delivery failures are logged and
/// swallowed, and the test run's exit status is never affected.
pub struct TelegramReporter {
    config: ReporterConfig,
    tracker: AttemptTracker,
    stopwatch: StopwatchStart,
    transport: Option<Box<dyn Transport>>,
}

impl TelegramReporter {
    /// Creates a reporter with the given configuration.
    pub fn new(config: ReporterConfig) -> Self {
        Self {
            config,
            tracker: AttemptTracker::new(),
            stopwatch: stopwatch(),
            transport: None,
        }
    }

    /// Creates a reporter configured from `TELEGRAM_*` environment variables.
    pub fn from_env() -> Self {
        Self::new(ReporterConfig::from_env())
    }

    /// Creates a reporter that delivers over a custom transport.
    ///
    /// Tests use this to observe delivery without network access.
    pub fn with_transport(config: ReporterConfig, transport: Box<dyn Transport>) -> Self {
        Self {
            config,
            tracker: AttemptTracker::new(),
            stopwatch: stopwatch(),
            transport: Some(transport),
        }
    }

    /// The reporter's configuration.
    pub fn config(&self) -> &ReporterConfig {
        &self.config
    }

    /// Handles one session lifecycle event.
    pub fn report_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::SessionStarted => {
                self.tracker.reset();
                self.stopwatch = stopwatch();
            }
            SessionEvent::AttemptStarted { test_id } => {
                self.tracker.attempt_started(&test_id);
            }
            SessionEvent::AttemptFinished(attempt) => {
                self.tracker.attempt_finished(&attempt);
            }
            SessionEvent::SessionFinished { stats } => {
                self.session_finished(&stats);
            }
        }
    }

    fn session_finished(&mut self, stats: &SessionStats) {
        if self.config.is_worker() {
            // Subordinate workers never report; the coordinator owns the
            // single notification for the whole run.
            return;
        }
        if !self.config.is_configured() {
            log::debug!("telegram reporting disabled: token or chat ID not configured");
            return;
        }

        let snapshot = self.stopwatch.snapshot();
        let transport = self.transport.take();
        let aggregator = ResultAggregator::new(stats, self.tracker.table());
        self.deliver(transport, &aggregator, snapshot);
    }

    fn deliver(
        &self,
        transport: Option<Box<dyn Transport>>,
        aggregator: &ResultAggregator<'_>,
        snapshot: StopwatchSnapshot,
    ) {
        let Some((token, chat_id)) = self.config.credentials() else {
            return;
        };
        let client = match transport {
            Some(transport) => TelegramClient::with_transport(token, chat_id, transport),
            None => match TelegramClient::new(token, chat_id) {
                Ok(client) => client,
                Err(error) => {
                    log::warn!(
                        "failed to set up delivery client: {}",
                        DisplayErrorChain(&error)
                    );
                    return;
                }
            },
        };

        let mut reply_to = None;
        if !self.config.disable_stickers() {
            let sticker_id = self.config.sticker_for(aggregator.has_failures());
            match client.send_sticker(sticker_id) {
                Ok(message_id) => reply_to = Some(message_id),
                Err(error) => {
                    log::warn!("failed to send status sticker: {}", DisplayErrorChain(&error));
                }
            }
        }

        let summary = format::summary_message(&SummaryInputs {
            counts: aggregator.counts(),
            start_time: snapshot.start_time,
            duration: snapshot.duration,
            env_label: self.config.env_label(),
            report_url: self.config.report_url(),
        });
        if let Err(error) = client.send_message(&summary, reply_to) {
            log::warn!("failed to send summary message: {}", DisplayErrorChain(&error));
        }

        if let Some(retry_report) =
            format::retry_message(&aggregator.retried_tests(), &aggregator.retry_stats())
        {
            if let Err(error) = client.send_message(&retry_report, None) {
                log::warn!("failed to send retry report: {}", DisplayErrorChain(&error));
            }
        }

        if self.config.list_failed() {
            let detail = aggregator.failed_detail(self.config.failed_limit());
            if let Some(failed_report) = format::failed_message(&detail) {
                if let Err(error) = client.send_message(&failed_report, None) {
                    log::warn!(
                        "failed to send failed-test report: {}",
                        DisplayErrorChain(&error)
                    );
                }
            }
        }
    }
}
