use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDateTime;
use shared::{
    compose_message, countdown_minutes, AlertPolicy, AlertThreshold, CalendarEvent, Clock, Phrases,
    SystemClock,
};
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;

use crate::calendar::CalendarSource;
use crate::config::Preferences;
use crate::display::StatusDisplay;
use crate::error::{FetchPhase, NotifyError, SchedulerError, SchedulerResult};
use crate::speech::Notifier;

/// Lifecycle of an [`AlertScheduler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Initializing,
    Running,
    Draining,
    Stopped,
}

/// Why [`AlertScheduler::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The cancellation token fired (signal or exit key)
    Cancelled,
    /// The event list was empty and `exit_on_empty` is set
    NoEvents,
}

/// Result of a single pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassOutcome {
    Completed { alerts: usize, refreshed: bool },
    /// No events to watch; the loop should stop
    Exhausted,
    /// Cancelled while the refresh fetch was in progress
    Cancelled,
}

/// How long queued announcements may keep playing after the calendar runs dry.
const EMPTY_CALENDAR_GRACE: Duration = Duration::from_secs(15);

/// An announcement decided during a pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub event_title: String,
    pub threshold: AlertThreshold,
    pub message: String,
}

fn alerts_for(
    title: &str,
    countdown: i64,
    policy: &AlertPolicy,
    phrases: &Phrases,
) -> impl Iterator<Item = Alert> {
    let event_title = title.to_string();
    let messages: Vec<(AlertThreshold, String)> = policy
        .matching(countdown)
        .into_iter()
        .map(|threshold| (threshold, compose_message(title, threshold, phrases)))
        .collect();

    messages.into_iter().map(move |(threshold, message)| Alert {
        event_title: event_title.clone(),
        threshold,
        message,
    })
}

/// Alerts due at `now`, in event order. Pure: same inputs give the same alerts.
pub fn evaluate_pass(
    events: &[CalendarEvent],
    now: NaiveDateTime,
    policy: &AlertPolicy,
    phrases: &Phrases,
) -> Vec<Alert> {
    events
        .iter()
        .flat_map(|event| {
            let countdown = countdown_minutes(now, event.start_time);
            alerts_for(event.display_title(), countdown, policy, phrases)
        })
        .collect()
}

/// Minute-granularity loop that announces upcoming calendar events.
///
/// The event list is owned here and replaced wholesale on every refresh.
/// Notifier calls run on their own tasks so a slow announcement never
/// delays the next pass.
pub struct AlertScheduler<S, N, C = SystemClock> {
    source: S,
    notifier: Arc<N>,
    clock: C,
    prefs: Preferences,
    display: StatusDisplay,
    cancel: CancellationToken,
    events: Vec<CalendarEvent>,
    pass_counter: u32,
    last_refresh: Option<NaiveDateTime>,
    state: SchedulerState,
    in_flight: JoinSet<Result<(), NotifyError>>,
}

impl<S, N> AlertScheduler<S, N, SystemClock>
where
    S: CalendarSource,
    N: Notifier,
{
    pub fn new(source: S, notifier: Arc<N>, prefs: Preferences, cancel: CancellationToken) -> Self {
        Self::with_clock(source, notifier, SystemClock, prefs, cancel)
    }
}

impl<S, N, C> AlertScheduler<S, N, C>
where
    S: CalendarSource,
    N: Notifier,
    C: Clock,
{
    pub fn with_clock(
        source: S,
        notifier: Arc<N>,
        clock: C,
        prefs: Preferences,
        cancel: CancellationToken,
    ) -> Self {
        let display = StatusDisplay::new(prefs.status_output, prefs.phrases.clone());
        Self {
            source,
            notifier,
            clock,
            prefs,
            display,
            cancel,
            events: Vec::new(),
            pass_counter: 0,
            last_refresh: None,
            state: SchedulerState::Initializing,
            in_flight: JoinSet::new(),
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn events(&self) -> &[CalendarEvent] {
        &self.events
    }

    /// Passes completed since the last refresh.
    pub fn pass_counter(&self) -> u32 {
        self.pass_counter
    }

    pub fn last_refresh(&self) -> Option<NaiveDateTime> {
        self.last_refresh
    }

    /// Fetch the initial event list and enter `Running`.
    ///
    /// Returns early, still `Initializing`, if cancelled during the fetch.
    pub async fn initialize(&mut self) -> SchedulerResult<()> {
        tracing::info!(
            "Starting alert scheduler (thresholds: {:?}, refresh every {} passes)",
            self.prefs.alert_policy.thresholds(),
            self.prefs.refresh_interval_passes
        );

        if !self.refresh(FetchPhase::Startup).await? {
            return Ok(());
        }

        if self.prefs.announce_startup {
            let greeting = self.prefs.phrases.program_starting.to_string();
            self.dispatch(greeting, false);
        }

        self.state = SchedulerState::Running;
        Ok(())
    }

    /// Evaluate every event once against the alert policy, dispatch due
    /// alerts, and refresh the event list when the cadence is reached.
    pub async fn run_pass(&mut self) -> SchedulerResult<PassOutcome> {
        let now = self.clock.now();
        self.display.begin_pass();

        if self.events.is_empty() {
            self.display.no_events();
            if self.prefs.exit_on_empty {
                tracing::info!("No upcoming events, stopping");
                return Ok(PassOutcome::Exhausted);
            }
        }

        for event in &self.events {
            let countdown = countdown_minutes(now, event.start_time);
            self.display.event_line(event.display_title(), countdown);
        }

        let alerts = evaluate_pass(
            &self.events,
            now,
            &self.prefs.alert_policy,
            &self.prefs.phrases,
        );

        for alert in &alerts {
            tracing::info!(
                "Alert for '{}' at {} minutes: {}",
                alert.event_title,
                alert.threshold,
                alert.message
            );
            self.dispatch(alert.message.clone(), self.prefs.alert_tone);
        }

        self.reap_finished();

        self.pass_counter += 1;
        let refreshed = self.pass_counter >= self.prefs.refresh_interval_passes;
        if refreshed {
            if !self.refresh(FetchPhase::Refresh).await? {
                return Ok(PassOutcome::Cancelled);
            }
            self.pass_counter = 0;
        }

        self.display.end_pass(self.pass_counter, self.last_refresh);

        Ok(PassOutcome::Completed {
            alerts: alerts.len(),
            refreshed,
        })
    }

    /// Run passes until cancelled or out of events.
    ///
    /// Every exit path, including errors, drains in-flight notifier tasks and
    /// leaves the scheduler `Stopped`.
    pub async fn run(&mut self) -> SchedulerResult<StopReason> {
        let result = self.drive().await;
        if matches!(result, Ok(StopReason::NoEvents)) {
            self.finish_announcements(EMPTY_CALENDAR_GRACE).await;
        }
        self.drain().await;
        result
    }

    async fn drive(&mut self) -> SchedulerResult<StopReason> {
        if self.state == SchedulerState::Initializing {
            self.initialize().await?;
        }

        let interval = self.prefs.pass_interval;
        loop {
            if self.cancel.is_cancelled() {
                return Ok(StopReason::Cancelled);
            }

            match self.run_pass().await? {
                PassOutcome::Exhausted => return Ok(StopReason::NoEvents),
                PassOutcome::Cancelled => return Ok(StopReason::Cancelled),
                PassOutcome::Completed { .. } => {}
            }

            tokio::select! {
                _ = self.cancel.cancelled() => return Ok(StopReason::Cancelled),
                _ = tokio::time::sleep(interval) => {}
            }
        }
    }

    /// Wait for every dispatched notification to finish.
    pub async fn wait_for_notifications(&mut self) {
        while let Some(joined) = self.in_flight.join_next().await {
            log_notification(joined);
        }
    }

    /// Let already queued announcements finish, bounded by `grace` and the token.
    async fn finish_announcements(&mut self, grace: Duration) {
        if self.in_flight.is_empty() {
            return;
        }

        let cancel = self.cancel.clone();
        tokio::select! {
            _ = cancel.cancelled() => {}
            finished = tokio::time::timeout(grace, self.wait_for_notifications()) => {
                if finished.is_err() {
                    tracing::warn!("Announcements still playing after {:?}", grace);
                }
            }
        }
    }

    /// Replace the event list. `Ok(false)` means the token fired first.
    async fn refresh(&mut self, phase: FetchPhase) -> SchedulerResult<bool> {
        let fetched = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => None,
            fetched = self.source.fetch_upcoming(self.prefs.events_to_fetch) => Some(fetched),
        };
        let Some(fetched) = fetched else {
            tracing::info!("Calendar fetch interrupted by shutdown ({})", phase);
            return Ok(false);
        };

        let events = fetched.map_err(|e| SchedulerError::fetch(phase, e))?;
        tracing::info!("Fetched {} upcoming events ({})", events.len(), phase);
        self.events = events;
        self.last_refresh = Some(self.clock.now());
        Ok(true)
    }

    fn dispatch(&mut self, message: String, with_alert_tone: bool) {
        let notifier = Arc::clone(&self.notifier);
        let language = self.prefs.language_code();
        self.in_flight
            .spawn(async move { notifier.notify(&message, language, with_alert_tone).await });
    }

    fn reap_finished(&mut self) {
        while let Some(joined) = self.in_flight.try_join_next() {
            log_notification(joined);
        }
    }

    async fn drain(&mut self) {
        self.state = SchedulerState::Draining;
        if !self.in_flight.is_empty() {
            tracing::info!("Aborting {} pending announcements", self.in_flight.len());
        }
        self.in_flight.shutdown().await;
        self.state = SchedulerState::Stopped;
        tracing::info!("Alert scheduler stopped");
    }
}

fn log_notification(joined: Result<Result<(), NotifyError>, JoinError>) {
    match joined {
        Ok(Ok(())) => tracing::debug!("Announcement finished"),
        Ok(Err(e)) => tracing::warn!("Announcement failed: {}", e),
        Err(e) if e.is_panic() => tracing::error!("Announcement task panicked: {}", e),
        Err(_) => tracing::debug!("Announcement cancelled"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 4)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    fn english() -> Phrases {
        Phrases::for_language("en").unwrap()
    }

    #[test]
    fn test_evaluate_pass_announces_matching_events_in_order() {
        let now = start();
        let events = vec![
            CalendarEvent::new("Standup", now + Duration::minutes(1)),
            CalendarEvent::new("Lunch", now + Duration::minutes(3)),
            CalendarEvent::new("Review", now + Duration::minutes(5) + Duration::seconds(20)),
        ];

        let alerts = evaluate_pass(&events, now, &AlertPolicy::from_minutes([1, 5]), &english());
        let messages: Vec<&str> = alerts.iter().map(|a| a.message.as_str()).collect();
        assert_eq!(
            messages,
            vec!["Standup begins in one minute", "Review begins in 5 minutes"]
        );
    }

    #[test]
    fn test_evaluate_pass_is_idempotent() {
        let now = start();
        let events = vec![
            CalendarEvent::new("Standup", now + Duration::minutes(5)),
            CalendarEvent::untitled(now + Duration::minutes(10)),
        ];
        let policy = AlertPolicy::from_minutes([1, 5, 10]);

        let first = evaluate_pass(&events, now, &policy, &english());
        let second = evaluate_pass(&events, now, &policy, &english());
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn test_started_events_do_not_alert() {
        let now = start();
        let events = vec![CalendarEvent::new("Standup", now - Duration::minutes(1))];
        assert!(evaluate_pass(&events, now, &AlertPolicy::from_minutes([1]), &english()).is_empty());
    }
}
