//! Foreground app tracking
//!
//! Keeps a best estimate of the app the user is looking at. The OS reports
//! system UI surfaces (status bar, notification shade, launcher) as
//! "foreground" while the user interacts with another app's notification,
//! so those packages never replace the last genuine user app. For a short
//! window after such an interruption the last user app is still reported as
//! the effective foreground package.
//!
//! Every field is synchronized on its own. Readers never block the writer
//! and may see one field updated before another.

use arc_swap::ArcSwapOption;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// How long the last user app survives a system UI interruption
pub const DEFAULT_FALLBACK_WINDOW: Duration = Duration::from_millis(15_000);

/// System UI and launcher packages that are never treated as the user's app
pub const IGNORED_PACKAGES: &[&str] = &[
    "com.android.systemui",
    "com.android.launcher",
    "com.android.launcher3",
    "com.google.android.apps.nexuslauncher",
    "com.sec.android.app.launcher",
];

/// Check whether a package is a system UI surface
#[must_use]
pub fn is_ignored_package(package: &str) -> bool {
    IGNORED_PACKAGES.contains(&package)
}

/// Source of wall-clock time in epoch milliseconds
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;
}

/// Real time from the system clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Per-field view of the tracker for diagnostics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForegroundSnapshot {
    pub current_package: Option<String>,
    pub current_updated_at: i64,
    pub last_user_package: Option<String>,
    pub last_user_updated_at: i64,
}

/// Tracks the foreground package from a noisy event stream
pub struct ForegroundTracker {
    current_package: ArcSwapOption<String>,
    current_updated_at: AtomicI64,
    last_user_package: ArcSwapOption<String>,
    last_user_updated_at: AtomicI64,
    fallback_window: Duration,
    clock: Arc<dyn Clock>,
}

impl ForegroundTracker {
    /// Create a tracker on the system clock with the default fallback window
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock), DEFAULT_FALLBACK_WINDOW)
    }

    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock>, fallback_window: Duration) -> Self {
        Self {
            current_package: ArcSwapOption::empty(),
            current_updated_at: AtomicI64::new(0),
            last_user_package: ArcSwapOption::empty(),
            last_user_updated_at: AtomicI64::new(0),
            fallback_window,
            clock,
        }
    }

    /// Record a foreground-change report.
    ///
    /// Blank or missing packages are ignored; anything else is stored verbatim,
    /// surrounding whitespace included. Ignored system packages update
    /// the current package only; anything else also becomes the last user
    /// package.
    pub fn update_foreground_package(&self, package: Option<&str>) {
        let Some(package) = package.filter(|p| !p.trim().is_empty()) else {
            return;
        };

        let now = self.clock.now_millis();
        let reported = Arc::new(package.to_string());

        let previous = self.current_package.swap(Some(Arc::clone(&reported)));
        self.current_updated_at.store(now, Ordering::Release);

        if !is_ignored_package(package) {
            self.last_user_package.store(Some(reported));
            self.last_user_updated_at.store(now, Ordering::Release);
        }

        if previous.as_deref().map(String::as_str) != Some(package) {
            log::debug!(
                "Foreground changed: {} -> {package}",
                previous.as_deref().map_or("<none>", String::as_str)
            );
        }
    }

    /// The last reported package, verbatim
    #[must_use]
    pub fn current_package(&self) -> Option<String> {
        self.current_package.load_full().map(|p| p.as_ref().clone())
    }

    /// Best estimate of the user's app, using the configured fallback window
    #[must_use]
    pub fn effective_package_default(&self) -> Option<String> {
        self.effective_package(self.fallback_window)
    }

    /// Best estimate of the user's app.
    ///
    /// While a system package is in front, the last user package is returned
    /// if it was seen within `fallback_window`; otherwise the system package
    /// itself is returned so callers can tell the app is unknown.
    #[must_use]
    pub fn effective_package(&self, fallback_window: Duration) -> Option<String> {
        let current = self.current_package.load_full()?;
        if !is_ignored_package(&current) {
            return Some(current.as_ref().clone());
        }

        if let Some(last_user) = self.last_user_package.load_full() {
            let age = self
                .clock
                .now_millis()
                .saturating_sub(self.last_user_updated_at.load(Ordering::Acquire));
            let window = i64::try_from(fallback_window.as_millis()).unwrap_or(i64::MAX);
            if !last_user.is_empty() && age <= window {
                return Some(last_user.as_ref().clone());
            }
        }

        Some(current.as_ref().clone())
    }

    /// When the current package was last reported (epoch ms, 0 if never)
    #[must_use]
    pub fn last_updated_at(&self) -> i64 {
        self.current_updated_at.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn last_user_package(&self) -> Option<String> {
        self.last_user_package.load_full().map(|p| p.as_ref().clone())
    }

    /// When the last user package was recorded (epoch ms, 0 if never)
    #[must_use]
    pub fn last_user_updated_at(&self) -> i64 {
        self.last_user_updated_at.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn fallback_window(&self) -> Duration {
        self.fallback_window
    }

    #[must_use]
    pub fn snapshot(&self) -> ForegroundSnapshot {
        ForegroundSnapshot {
            current_package: self.current_package(),
            current_updated_at: self.last_updated_at(),
            last_user_package: self.last_user_package(),
            last_user_updated_at: self.last_user_updated_at(),
        }
    }
}

impl Default for ForegroundTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Clock driven by hand
    #[derive(Default)]
    pub(crate) struct ManualClock(AtomicI64);

    impl ManualClock {
        pub(crate) fn set_secs(&self, secs: i64) {
            self.0.store(secs * 1000, Ordering::SeqCst);
        }
    }

    impl Clock for ManualClock {
        fn now_millis(&self) -> i64 {
            self.0.load(Ordering::SeqCst)
        }
    }

    fn tracker() -> (Arc<ManualClock>, ForegroundTracker) {
        let clock = Arc::new(ManualClock::default());
        let tracker = ForegroundTracker::with_clock(clock.clone(), DEFAULT_FALLBACK_WINDOW);
        (clock, tracker)
    }

    #[test]
    fn test_no_state_means_no_package() {
        let (_, tracker) = tracker();
        assert_eq!(tracker.current_package(), None);
        assert_eq!(tracker.effective_package_default(), None);
        assert_eq!(tracker.last_updated_at(), 0);
    }

    #[test]
    fn test_blank_updates_are_ignored() {
        let (clock, tracker) = tracker();
        clock.set_secs(1);
        tracker.update_foreground_package(Some("com.spotify"));

        clock.set_secs(2);
        tracker.update_foreground_package(Some(""));
        tracker.update_foreground_package(Some("   "));
        tracker.update_foreground_package(None);

        assert_eq!(tracker.current_package().as_deref(), Some("com.spotify"));
        assert_eq!(tracker.last_updated_at(), 1000);
    }

    #[test]
    fn test_packages_are_stored_verbatim() {
        let (_, tracker) = tracker();
        tracker.update_foreground_package(Some(" com.spotify"));
        assert_eq!(tracker.current_package().as_deref(), Some(" com.spotify"));
        assert_eq!(tracker.last_user_package().as_deref(), Some(" com.spotify"));
    }

    #[test]
    fn test_user_package_is_effective() {
        let (_, tracker) = tracker();
        tracker.update_foreground_package(Some("com.spotify"));
        assert_eq!(tracker.effective_package_default().as_deref(), Some("com.spotify"));
        assert_eq!(tracker.last_user_package().as_deref(), Some("com.spotify"));
    }

    #[test]
    fn test_system_ui_falls_back_within_window() {
        let (clock, tracker) = tracker();
        clock.set_secs(0);
        tracker.update_foreground_package(Some("com.spotify"));
        clock.set_secs(1);
        tracker.update_foreground_package(Some("com.android.systemui"));

        assert_eq!(tracker.current_package().as_deref(), Some("com.android.systemui"));
        assert_eq!(tracker.last_user_package().as_deref(), Some("com.spotify"));

        clock.set_secs(5);
        assert_eq!(tracker.effective_package_default().as_deref(), Some("com.spotify"));

        clock.set_secs(20);
        assert_eq!(
            tracker.effective_package_default().as_deref(),
            Some("com.android.systemui")
        );
    }

    #[test]
    fn test_window_boundary_is_inclusive() {
        let (clock, tracker) = tracker();
        tracker.update_foreground_package(Some("com.spotify"));
        tracker.update_foreground_package(Some("com.android.systemui"));

        clock.set_secs(15);
        assert_eq!(
            tracker
                .effective_package(Duration::from_secs(15))
                .as_deref(),
            Some("com.spotify")
        );
        assert_eq!(
            tracker
                .effective_package(Duration::from_secs(14))
                .as_deref(),
            Some("com.android.systemui")
        );
    }

    #[test]
    fn test_system_ui_without_user_history() {
        let (_, tracker) = tracker();
        tracker.update_foreground_package(Some("com.android.systemui"));
        assert_eq!(
            tracker.effective_package_default().as_deref(),
            Some("com.android.systemui")
        );
        assert_eq!(tracker.last_user_package(), None);
        assert_eq!(tracker.last_user_updated_at(), 0);
    }

    #[test]
    fn test_repeated_reports_refresh_timestamp() {
        let (clock, tracker) = tracker();
        clock.set_secs(3);
        tracker.update_foreground_package(Some("com.spotify"));
        clock.set_secs(9);
        tracker.update_foreground_package(Some("com.spotify"));

        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.current_updated_at, 9000);
        assert_eq!(snapshot.last_user_updated_at, 9000);
    }

    #[test]
    fn test_concurrent_readers_see_whole_values() {
        let tracker = Arc::new(ForegroundTracker::new());
        let packages = ["com.spotify", "com.android.systemui", "com.whatsapp"];

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let tracker = Arc::clone(&tracker);
                std::thread::spawn(move || {
                    for _ in 0..1_000 {
                        if let Some(current) = tracker.current_package() {
                            assert!(packages.contains(&current.as_str()));
                        }
                    }
                })
            })
            .collect();

        for i in 0..1_000 {
            tracker.update_foreground_package(Some(packages[i % packages.len()]));
        }

        for reader in readers {
            reader.join().unwrap();
        }
    }
}
