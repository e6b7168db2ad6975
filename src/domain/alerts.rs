//! Proactive rain alerts.
//!
//! [`AlertPolicy`] decides whether a rain alert should be raised for a city
//! and remembers, in an injected session store, which `(city, mode)` pairs
//! already fired. [`AlertDispatcher`] delivers an alert to the in-session
//! [`ToastBoard`] and, when permitted, to a [`NotificationChannel`].

use std::{collections::HashMap, io::IsTerminal};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::storage::KeyValueStore;

pub const ALERT_TITLE: &str = "ForecastIQ Alert";
pub const DEMO_ALERT_TITLE: &str = "ForecastIQ Demo Alert";
const NOTIFIED_PREFIX: &str = "fiq_notified_rain";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    pub window_minutes: i64,
    pub demo_delay_ms: u64,
    pub toast_ms: u64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            window_minutes: 30,
            demo_delay_ms: 1500,
            toast_ms: 4500,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlertMode {
    Real,
    Demo,
}

impl AlertMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Real => "real",
            Self::Demo => "demo",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertState {
    Idle,
    Armed,
    Fired,
    Suppressed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub title: String,
    pub body: String,
}

impl Alert {
    #[must_use]
    pub fn rain(minutes: i64) -> Self {
        Self {
            title: ALERT_TITLE.to_string(),
            body: format!("Rain starts in ~{minutes} minutes."),
        }
    }

    #[must_use]
    pub fn demo() -> Self {
        Self {
            title: DEMO_ALERT_TITLE.to_string(),
            body: "Leave 10 mins early — storm arriving during commute. (Demo)".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlertDecision {
    Skip,
    Fire {
        alert: Alert,
        delay: std::time::Duration,
    },
}

#[must_use]
pub fn notified_key(city: &str, mode: AlertMode) -> String {
    format!("{NOTIFIED_PREFIX}_{city}_{}", mode.as_str())
}

#[derive(Debug)]
pub struct AlertPolicy<S> {
    session: S,
    config: AlertConfig,
    states: HashMap<(String, AlertMode), AlertState>,
}

impl<S: KeyValueStore> AlertPolicy<S> {
    pub fn new(session: S, config: AlertConfig) -> Self {
        Self {
            session,
            config,
            states: HashMap::new(),
        }
    }

    pub fn state(&self, city: &str, mode: AlertMode) -> AlertState {
        if let Some(state) = self.states.get(&(city.to_string(), mode)) {
            return *state;
        }
        if self.already_notified(city, mode) {
            AlertState::Suppressed
        } else {
            AlertState::Idle
        }
    }

    /// True when rain is due within the alert window and no alert has fired
    /// for this city and mode during the session.
    pub fn should_fire(&self, city: &str, mode: AlertMode, rain_minutes: Option<i64>) -> bool {
        !city.is_empty() && self.in_window(rain_minutes) && !self.already_notified(city, mode)
    }

    /// Records that an alert fired so later evaluations stay quiet.
    pub fn acknowledge_fired(&mut self, city: &str, mode: AlertMode) -> bool {
        match self.session.set(&notified_key(city, mode), "1".to_string()) {
            Ok(()) => {
                self.set_state(city, mode, AlertState::Fired);
                true
            }
            Err(err) => {
                tracing::warn!(city, mode = mode.as_str(), %err, "recording alert failed");
                false
            }
        }
    }

    /// Runs the policy for a freshly computed rain onset.
    ///
    /// The session flag is written before the alert is handed out, so a
    /// re-evaluation during the delay cannot produce a second alert. If the
    /// flag cannot be written the alert is dropped.
    pub fn evaluate(
        &mut self,
        city: &str,
        mode: AlertMode,
        rain_minutes: Option<i64>,
    ) -> AlertDecision {
        if self.already_notified(city, mode) {
            self.set_state(city, mode, AlertState::Suppressed);
            return AlertDecision::Skip;
        }
        let Some(minutes) = rain_minutes.filter(|_| self.should_fire(city, mode, rain_minutes))
        else {
            self.set_state(city, mode, AlertState::Idle);
            return AlertDecision::Skip;
        };

        self.set_state(city, mode, AlertState::Armed);
        if !self.acknowledge_fired(city, mode) {
            self.set_state(city, mode, AlertState::Idle);
            return AlertDecision::Skip;
        }

        tracing::info!(city, mode = mode.as_str(), minutes, "rain alert armed");
        AlertDecision::Fire {
            alert: Alert::rain(minutes),
            delay: self.delay_for(mode),
        }
    }

    /// Manual demo alert. Not de-duplicated.
    #[must_use]
    pub fn trigger_demo(&self) -> AlertDecision {
        AlertDecision::Fire {
            alert: Alert::demo(),
            delay: std::time::Duration::ZERO,
        }
    }

    pub fn into_session(self) -> S {
        self.session
    }

    fn in_window(&self, rain_minutes: Option<i64>) -> bool {
        rain_minutes.is_some_and(|m| m > 0 && m <= self.config.window_minutes)
    }

    fn already_notified(&self, city: &str, mode: AlertMode) -> bool {
        self.session.get(&notified_key(city, mode)).is_some()
    }

    fn delay_for(&self, mode: AlertMode) -> std::time::Duration {
        match mode {
            AlertMode::Real => std::time::Duration::ZERO,
            AlertMode::Demo => std::time::Duration::from_millis(self.config.demo_delay_ms),
        }
    }

    fn set_state(&mut self, city: &str, mode: AlertMode, state: AlertState) {
        self.states.insert((city.to_string(), mode), state);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
    Default,
}

/// An out-of-session channel such as a desktop notification.
pub trait NotificationChannel: Send {
    fn permission(&self) -> Permission;

    /// Asks for permission while it is still undecided. Channels that cannot
    /// ask keep their current answer.
    fn request_permission(&mut self) -> Permission {
        self.permission()
    }

    fn deliver(&mut self, alert: &Alert);
}

/// Writes alerts to stderr with a terminal bell.
///
/// `None` leaves the choice undecided; a request then grants permission only
/// when stderr is attached to a terminal.
#[derive(Debug, Clone, Copy)]
pub struct TerminalNotifier {
    permission: Permission,
}

impl TerminalNotifier {
    #[must_use]
    pub fn new(enabled: Option<bool>) -> Self {
        Self {
            permission: match enabled {
                Some(true) => Permission::Granted,
                Some(false) => Permission::Denied,
                None => Permission::Default,
            },
        }
    }
}

impl NotificationChannel for TerminalNotifier {
    fn permission(&self) -> Permission {
        self.permission
    }

    fn request_permission(&mut self) -> Permission {
        if self.permission == Permission::Default {
            self.permission = if std::io::stderr().is_terminal() {
                Permission::Granted
            } else {
                Permission::Denied
            };
        }
        self.permission
    }

    fn deliver(&mut self, alert: &Alert) {
        eprintln!("\x07{}: {}", alert.title, alert.body);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub alert: Alert,
    pub shown_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Holds at most one in-session toast; a newer alert replaces the old one.
#[derive(Debug, Clone)]
pub struct ToastBoard {
    lifetime: Duration,
    current: Option<Toast>,
}

impl ToastBoard {
    #[must_use]
    pub fn new(lifetime_ms: u64) -> Self {
        Self {
            lifetime: Duration::milliseconds(i64::try_from(lifetime_ms).unwrap_or(i64::MAX)),
            current: None,
        }
    }

    pub fn show(&mut self, alert: Alert, now: DateTime<Utc>) -> &Toast {
        self.current.insert(Toast {
            alert,
            shown_at: now,
            expires_at: now + self.lifetime,
        })
    }

    #[must_use]
    pub fn visible(&self, now: DateTime<Utc>) -> Option<&Toast> {
        self.current.as_ref().filter(|toast| now < toast.expires_at)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delivery {
    pub toast: bool,
    pub notification: bool,
}

pub struct AlertDispatcher {
    toasts: ToastBoard,
    channel: Option<Box<dyn NotificationChannel>>,
}

impl AlertDispatcher {
    #[must_use]
    pub fn new(toasts: ToastBoard, channel: Option<Box<dyn NotificationChannel>>) -> Self {
        Self { toasts, channel }
    }

    #[must_use]
    pub fn toasts(&self) -> &ToastBoard {
        &self.toasts
    }

    /// Resolves an undecided channel permission before a manual alert.
    pub fn request_permission(&mut self) -> Option<Permission> {
        let channel = self.channel.as_mut()?;
        let permission = match channel.permission() {
            Permission::Default => channel.request_permission(),
            decided => decided,
        };
        tracing::debug!(?permission, "notification permission");
        Some(permission)
    }

    /// The toast is always shown; the channel only receives the alert when
    /// permission has been granted.
    pub fn fire(&mut self, alert: Alert, now: DateTime<Utc>) -> Delivery {
        let notification = match self.channel.as_mut() {
            Some(channel) if channel.permission() == Permission::Granted => {
                channel.deliver(&alert);
                true
            }
            Some(channel) => {
                tracing::debug!(
                    permission = ?channel.permission(),
                    "notification channel unavailable, toast only"
                );
                false
            }
            None => false,
        };
        self.toasts.show(alert, now);
        Delivery {
            toast: true,
            notification,
        }
    }

    /// Waits out the decision's delay, then fires once.
    pub async fn dispatch(&mut self, decision: AlertDecision) -> Option<Delivery> {
        let AlertDecision::Fire { alert, delay } = decision else {
            return None;
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        Some(self.fire(alert, Utc::now()))
    }
}

impl std::fmt::Debug for AlertDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlertDispatcher")
            .field("toasts", &self.toasts)
            .field("channel", &self.channel.as_ref().map(|c| c.permission()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::storage::MemoryStore;
    use crate::test_support::base_now;

    #[derive(Clone)]
    struct RecordingChannel {
        permission: Permission,
        delivered: Arc<Mutex<Vec<Alert>>>,
        requests: Arc<Mutex<usize>>,
    }

    impl NotificationChannel for RecordingChannel {
        fn permission(&self) -> Permission {
            self.permission
        }

        fn request_permission(&mut self) -> Permission {
            *self.requests.lock().expect("lock") += 1;
            if self.permission == Permission::Default {
                self.permission = Permission::Granted;
            }
            self.permission
        }

        fn deliver(&mut self, alert: &Alert) {
            self.delivered.lock().expect("lock").push(alert.clone());
        }
    }

    fn channel(permission: Permission) -> RecordingChannel {
        RecordingChannel {
            permission,
            delivered: Arc::default(),
            requests: Arc::default(),
        }
    }

    fn policy() -> AlertPolicy<MemoryStore> {
        AlertPolicy::new(MemoryStore::new(), AlertConfig::default())
    }

    #[test]
    fn fires_once_per_city_and_mode() {
        let mut policy = policy();
        let first = policy.evaluate("Oslo", AlertMode::Real, Some(20));
        let second = policy.evaluate("Oslo", AlertMode::Real, Some(20));

        assert_eq!(
            first,
            AlertDecision::Fire {
                alert: Alert::rain(20),
                delay: std::time::Duration::ZERO,
            }
        );
        assert_eq!(second, AlertDecision::Skip);
        assert_eq!(policy.state("Oslo", AlertMode::Real), AlertState::Suppressed);
    }

    #[test]
    fn modes_and_cities_are_keyed_separately() {
        let mut policy = policy();
        assert!(matches!(
            policy.evaluate("Oslo", AlertMode::Real, Some(10)),
            AlertDecision::Fire { .. }
        ));
        assert!(matches!(
            policy.evaluate("Oslo", AlertMode::Demo, Some(3)),
            AlertDecision::Fire { delay, .. } if delay == std::time::Duration::from_millis(1500)
        ));
        assert!(matches!(
            policy.evaluate("Rome", AlertMode::Real, Some(10)),
            AlertDecision::Fire { .. }
        ));
    }

    #[test]
    fn outside_window_stays_idle() {
        let mut policy = policy();
        for minutes in [None, Some(0), Some(-5), Some(31), Some(600)] {
            assert_eq!(
                policy.evaluate("Oslo", AlertMode::Real, minutes),
                AlertDecision::Skip
            );
            assert_eq!(policy.state("Oslo", AlertMode::Real), AlertState::Idle);
        }
        assert!(policy.should_fire("Oslo", AlertMode::Real, Some(30)));
        assert!(policy.should_fire("Oslo", AlertMode::Real, Some(1)));
    }

    #[test]
    fn acknowledged_key_lives_in_session_store() {
        let mut policy = policy();
        assert_eq!(policy.state("Lima", AlertMode::Demo), AlertState::Idle);
        assert!(policy.acknowledge_fired("Lima", AlertMode::Demo));
        assert_eq!(policy.state("Lima", AlertMode::Demo), AlertState::Fired);
        assert!(!policy.should_fire("Lima", AlertMode::Demo, Some(3)));

        let session = policy.into_session();
        assert_eq!(session.get("fiq_notified_rain_Lima_demo").as_deref(), Some("1"));

        let restored = AlertPolicy::new(session, AlertConfig::default());
        assert_eq!(restored.state("Lima", AlertMode::Demo), AlertState::Suppressed);
    }

    #[test]
    fn new_session_fires_again() {
        let mut policy = policy();
        policy.evaluate("Oslo", AlertMode::Real, Some(15));
        let mut fresh = AlertPolicy::new(MemoryStore::new(), AlertConfig::default());
        assert!(matches!(
            fresh.evaluate("Oslo", AlertMode::Real, Some(15)),
            AlertDecision::Fire { .. }
        ));
    }

    #[test]
    fn demo_trigger_always_fires() {
        let policy = policy();
        assert_eq!(policy.trigger_demo(), policy.trigger_demo());
        assert!(matches!(
            policy.trigger_demo(),
            AlertDecision::Fire { alert, .. } if alert.title == DEMO_ALERT_TITLE
        ));
    }

    #[test]
    fn toast_dismisses_after_lifetime() {
        let mut board = ToastBoard::new(4500);
        board.show(Alert::rain(12), base_now());
        assert!(board.visible(base_now() + Duration::milliseconds(4499)).is_some());
        assert!(board.visible(base_now() + Duration::milliseconds(4500)).is_none());
    }

    #[test]
    fn dispatcher_respects_channel_permission() {
        let delivered = Arc::new(Mutex::new(Vec::new()));
        let granted = RecordingChannel {
            delivered: Arc::clone(&delivered),
            ..channel(Permission::Granted)
        };
        let denied = RecordingChannel {
            delivered: Arc::clone(&delivered),
            ..channel(Permission::Denied)
        };

        let mut with_permission =
            AlertDispatcher::new(ToastBoard::new(4500), Some(Box::new(granted)));
        let delivery = with_permission.fire(Alert::rain(5), base_now());
        assert_eq!(
            delivery,
            Delivery {
                toast: true,
                notification: true
            }
        );

        let mut without = AlertDispatcher::new(ToastBoard::new(4500), Some(Box::new(denied)));
        let delivery = without.fire(Alert::rain(5), base_now());
        assert!(delivery.toast);
        assert!(!delivery.notification);
        assert!(without.toasts().visible(base_now()).is_some());

        assert_eq!(delivered.lock().expect("lock").len(), 1);
    }

    #[test]
    fn undecided_permission_is_requested_once_before_demo() {
        let undecided = channel(Permission::Default);
        let delivered = Arc::clone(&undecided.delivered);
        let requests = Arc::clone(&undecided.requests);
        let mut dispatcher = AlertDispatcher::new(ToastBoard::new(4500), Some(Box::new(undecided)));

        assert!(!dispatcher.fire(Alert::rain(5), base_now()).notification);
        assert_eq!(dispatcher.request_permission(), Some(Permission::Granted));
        assert_eq!(dispatcher.request_permission(), Some(Permission::Granted));
        assert_eq!(*requests.lock().expect("lock"), 1);

        assert!(dispatcher.fire(Alert::demo(), base_now()).notification);
        assert_eq!(delivered.lock().expect("lock").len(), 1);
    }

    #[test]
    fn decided_permission_is_not_requested_again() {
        let denied = channel(Permission::Denied);
        let requests = Arc::clone(&denied.requests);
        let mut dispatcher = AlertDispatcher::new(ToastBoard::new(4500), Some(Box::new(denied)));
        assert_eq!(dispatcher.request_permission(), Some(Permission::Denied));
        assert_eq!(*requests.lock().expect("lock"), 0);

        let mut without_channel = AlertDispatcher::new(ToastBoard::new(4500), None);
        assert_eq!(without_channel.request_permission(), None);
    }

    #[test]
    fn terminal_notifier_maps_preference_to_permission() {
        assert_eq!(TerminalNotifier::new(Some(true)).permission(), Permission::Granted);
        assert_eq!(TerminalNotifier::new(Some(false)).permission(), Permission::Denied);
        assert_eq!(TerminalNotifier::new(None).permission(), Permission::Default);
        let mut decided = TerminalNotifier::new(Some(false));
        assert_eq!(decided.request_permission(), Permission::Denied);
    }

    #[tokio::test(start_paused = true)]
    async fn dispatch_waits_for_delay_then_fires() {
        let mut dispatcher = AlertDispatcher::new(ToastBoard::new(4500), None);
        let started = tokio::time::Instant::now();
        let delivery = dispatcher
            .dispatch(AlertDecision::Fire {
                alert: Alert::rain(3),
                delay: std::time::Duration::from_millis(1500),
            })
            .await;
        assert!(started.elapsed() >= std::time::Duration::from_millis(1500));
        assert_eq!(delivery.map(|d| d.toast), Some(true));
        assert!(dispatcher.dispatch(AlertDecision::Skip).await.is_none());
    }
}
