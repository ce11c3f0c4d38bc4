//! Timer-driven ad-rotation scheduler.
//!
//! A fixed-period timer (independent of request traffic) derives the active
//! advertisement set, selects the next ad in rotation, and pushes the
//! resulting payload to the external display exactly once per content
//! change. Push failures are logged and retried on subsequent ticks; they
//! never crash the loop and never bubble past it.

use crate::config::DisplaySettings;
use crate::core::{advertisement, business, rotation};
use crate::core::rotation::RotationState;
use crate::display::{DisplayApi, DisplayPayload};
use crate::store::CollectionStore;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{info, trace, warn};

/// Runs one scheduler tick at the given instant. Split out from [`run`] so
/// tick behavior is testable with a pinned clock and a fake display.
pub async fn tick_at<A: DisplayApi>(
    store: &CollectionStore,
    display: &A,
    settings: &DisplaySettings,
    state: &mut RotationState,
    now: DateTime<Utc>,
) {
    let active = advertisement::active_advertisements(store, now).await;

    let payload = match rotation::advance(state, active.len()) {
        None => DisplayPayload::no_ad(&settings.no_ad_image),
        Some(index) => {
            let ad = &active[index];
            let business_name = business::get_business(store, &ad.business_id)
                .await
                .map(|b| b.name);
            DisplayPayload::for_ad(ad, business_name)
        }
    };

    let fingerprint = match rotation::fingerprint(&payload) {
        Ok(fingerprint) => fingerprint,
        Err(e) => {
            warn!(error = %e, "Failed to fingerprint display payload; skipping tick");
            return;
        }
    };
    if state.already_showing(&fingerprint) {
        trace!("Display content unchanged; nothing to push");
        return;
    }

    match display.push(&payload).await {
        Ok(status) => {
            info!(status, "Pushed display update");
            state.last_fingerprint = Some(fingerprint);
        }
        Err(e) => {
            // Fingerprint is left as-is so the push is retried next tick.
            warn!(error = %e, "Display push failed; will retry next tick");
        }
    }
}

/// One tick against the wall clock.
pub async fn tick<A: DisplayApi>(
    store: &CollectionStore,
    display: &A,
    settings: &DisplaySettings,
    state: &mut RotationState,
) {
    tick_at(store, display, settings, state, Utc::now()).await;
}

/// Runs the scheduler until the task is dropped. Ticks are serialized: a
/// slow push delays the next tick instead of overlapping it, and missed
/// ticks are skipped rather than compressed.
pub async fn run<A: DisplayApi>(
    store: Arc<CollectionStore>,
    display: A,
    settings: DisplaySettings,
) {
    let mut interval = tokio::time::interval(Duration::from_secs(settings.tick_seconds));
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut state = RotationState::new();

    info!(
        period_secs = settings.tick_seconds,
        "Rotation scheduler started"
    );
    loop {
        interval.tick().await;
        tick(&store, &display, &settings, &mut state).await;
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::advertisement::{create_advertisement, save_advertisement};
    use crate::core::business::create_business;
    use crate::display::DisplaySlide;
    use crate::errors::{Error, Result};
    use crate::test_utils::{new_ad_request, setup_test_store, test_display_settings};
    use chrono::Duration as ChronoDuration;
    use std::cell::Cell;
    use std::sync::Mutex;

    /// Records pushed payloads; optionally fails a number of pushes first.
    #[derive(Default)]
    struct RecordingDisplay {
        pushes: Mutex<Vec<DisplayPayload>>,
        failures_remaining: Cell<usize>,
    }

    impl RecordingDisplay {
        fn pushed(&self) -> Vec<DisplayPayload> {
            self.pushes.lock().unwrap().clone()
        }
    }

    impl DisplayApi for RecordingDisplay {
        async fn push(&self, payload: &DisplayPayload) -> Result<u16> {
            if self.failures_remaining.get() > 0 {
                self.failures_remaining.set(self.failures_remaining.get() - 1);
                return Err(Error::DisplayPush {
                    message: "connection refused".to_string(),
                });
            }
            self.pushes.lock().unwrap().push(payload.clone());
            Ok(200)
        }
    }

    fn pushed_title(payload: &DisplayPayload) -> Option<&str> {
        match &payload.ad {
            DisplaySlide::Ad { title, .. } => Some(title),
            DisplaySlide::NoAd { .. } => None,
        }
    }

    #[tokio::test]
    async fn test_rotation_cycles_and_pushes_each_change() -> Result<()> {
        let (store, _dir) = setup_test_store()?;
        let settings = test_display_settings();
        let business = create_business(&store, "Cafe Aurora", "aurora@example.com").await?;

        let mut ad_a = create_advertisement(&store, new_ad_request(&business.id, "adA")).await?;
        let mut ad_b = create_advertisement(&store, new_ad_request(&business.id, "adB")).await?;
        ad_a.created_at = Utc::now() - ChronoDuration::hours(2);
        ad_b.created_at = Utc::now() - ChronoDuration::hours(1);
        save_advertisement(&store, ad_a).await?;
        save_advertisement(&store, ad_b).await?;

        let display = RecordingDisplay::default();
        let mut state = RotationState::new();
        let now = Utc::now();
        for _ in 0..3 {
            tick_at(&store, &display, &settings, &mut state, now).await;
        }

        // Every tick changed the selection, so every tick pushed.
        let pushes = display.pushed();
        assert_eq!(pushes.len(), 3);
        assert_eq!(pushed_title(&pushes[0]), Some("adA"));
        assert_eq!(pushed_title(&pushes[1]), Some("adB"));
        assert_eq!(pushed_title(&pushes[2]), Some("adA"));
        Ok(())
    }

    #[tokio::test]
    async fn test_single_ad_pushes_once_across_ticks() -> Result<()> {
        let (store, _dir) = setup_test_store()?;
        let settings = test_display_settings();
        let business = create_business(&store, "Cafe Aurora", "aurora@example.com").await?;
        create_advertisement(&store, new_ad_request(&business.id, "Only one")).await?;

        let display = RecordingDisplay::default();
        let mut state = RotationState::new();
        let now = Utc::now();
        for _ in 0..3 {
            tick_at(&store, &display, &settings, &mut state, now).await;
        }

        let pushes = display.pushed();
        assert_eq!(pushes.len(), 1);
        assert_eq!(pushed_title(&pushes[0]), Some("Only one"));
        Ok(())
    }

    #[tokio::test]
    async fn test_transition_to_empty_pushes_sentinel_once() -> Result<()> {
        let (store, _dir) = setup_test_store()?;
        let settings = test_display_settings();
        let business = create_business(&store, "Cafe Aurora", "aurora@example.com").await?;

        let now = Utc::now();
        let mut request = new_ad_request(&business.id, "Expiring");
        request.start_time = now - ChronoDuration::minutes(10);
        request.end_time = now + ChronoDuration::minutes(5);
        create_advertisement(&store, request).await?;

        let display = RecordingDisplay::default();
        let mut state = RotationState::new();
        tick_at(&store, &display, &settings, &mut state, now).await;
        assert_eq!(display.pushed().len(), 1);

        // The ad's end_time passes: exactly one NO_AD push, then silence.
        let after_end = now + ChronoDuration::minutes(6);
        for _ in 0..3 {
            tick_at(&store, &display, &settings, &mut state, after_end).await;
        }
        let pushes = display.pushed();
        assert_eq!(pushes.len(), 2);
        assert_eq!(
            pushes[1].ad,
            DisplaySlide::NoAd {
                image_url: settings.no_ad_image.clone()
            }
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_push_retried_until_success() -> Result<()> {
        let (store, _dir) = setup_test_store()?;
        let settings = test_display_settings();
        let business = create_business(&store, "Cafe Aurora", "aurora@example.com").await?;
        create_advertisement(&store, new_ad_request(&business.id, "Flaky")).await?;

        let display = RecordingDisplay {
            failures_remaining: Cell::new(2),
            ..RecordingDisplay::default()
        };
        let mut state = RotationState::new();
        let now = Utc::now();

        // Two failing ticks leave the fingerprint unset and push nothing.
        tick_at(&store, &display, &settings, &mut state, now).await;
        tick_at(&store, &display, &settings, &mut state, now).await;
        assert!(display.pushed().is_empty());
        assert!(state.last_fingerprint.is_none());

        // The third tick succeeds; a fourth with unchanged content is a no-op.
        tick_at(&store, &display, &settings, &mut state, now).await;
        tick_at(&store, &display, &settings, &mut state, now).await;
        assert_eq!(display.pushed().len(), 1);
        assert!(state.last_fingerprint.is_some());
        Ok(())
    }
}
