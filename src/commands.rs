use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::core::clipboard::ClipboardWriter;
use crate::core::normalize;
use crate::core::scheduler::ScheduledTask;
use crate::state::AppState;
use crate::types::{CopyEvent, LoadingEvent, SessionSnapshot, TitlesEvent};

pub const EVENT_LOADING: &str = "loading-changed";
pub const EVENT_TITLES: &str = "titles-generated";
pub const EVENT_COPIED: &str = "title-copied";
pub const EVENT_COPIED_RESET: &str = "copied-reset";

pub type SharedState = Arc<Mutex<AppState>>;

/// Receives session events as JSON payloads.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &str, payload: Value);
}

fn emit<T: Serialize>(events: &dyn EventSink, event: &str, payload: &T) {
    match serde_json::to_value(payload) {
        Ok(value) => events.emit(event, value),
        Err(err) => log::warn!("failed to encode {event} payload: {err}"),
    }
}

fn lock(state: &Mutex<AppState>) -> Result<MutexGuard<'_, AppState>, String> {
    state
        .lock()
        .map_err(|_| "state lock poisoned".to_string())
}

pub fn set_topic(state: &SharedState, topic: &str) -> Result<(), String> {
    let mut guard = lock(state)?;
    guard.topic = topic.to_string();
    Ok(())
}

/// Starts a delayed generation for the current topic.
///
/// Returns the request id, or `None` when nothing was scheduled because the topic is blank or a
/// generation is already in flight.
pub fn generate_titles(
    state: &SharedState,
    events: Arc<dyn EventSink>,
) -> Result<Option<String>, String> {
    let (request_id, topic, delay) = {
        let mut guard = lock(state)?;
        if normalize::is_blank(&guard.topic) {
            log::debug!("generate ignored: blank topic");
            return Ok(None);
        }
        if guard.loading {
            log::debug!("generate ignored: request already pending");
            return Ok(None);
        }

        let request_id = Uuid::new_v4().to_string();
        guard.loading = true;
        guard.pending_request = Some(request_id.clone());
        (
            request_id,
            guard.topic.clone(),
            Duration::from_millis(guard.settings.generation.delay_ms),
        )
    };

    // The timer is armed only after `loading: true` is out, so listeners never see the
    // completion events first.
    emit(
        events.as_ref(),
        EVENT_LOADING,
        &LoadingEvent {
            request_id: request_id.clone(),
            loading: true,
        },
    );

    let mut guard = lock(state)?;
    if guard.pending_request.as_deref() != Some(request_id.as_str()) {
        log::debug!("generation {request_id} torn down before it was scheduled");
        return Ok(None);
    }
    let task_state = state.clone();
    let task_events = events.clone();
    let task_request = request_id.clone();
    guard.pending_generation = Some(ScheduledTask::spawn(delay, move || {
        finish_generation(&task_state, task_events.as_ref(), &task_request, &topic);
    }));
    drop(guard);

    log::info!(
        "scheduled generation {request_id} in {}ms",
        delay.as_millis()
    );
    Ok(Some(request_id))
}

/// Draws a fresh set of titles for the current topic.
pub fn regenerate(
    state: &SharedState,
    events: Arc<dyn EventSink>,
) -> Result<Option<String>, String> {
    generate_titles(state, events)
}

fn finish_generation(
    state: &Mutex<AppState>,
    events: &dyn EventSink,
    request_id: &str,
    topic: &str,
) {
    let payload = {
        let mut guard = match lock(state) {
            Ok(guard) => guard,
            Err(err) => {
                log::warn!("generation {request_id} dropped: {err}");
                return;
            }
        };
        if guard.pending_request.as_deref() != Some(request_id) {
            // Torn down between the timer firing and taking the lock.
            return;
        }

        let session = &mut *guard;
        let titles = session
            .generator
            .generate_with(topic, &mut session.rng)
            .unwrap_or_default();
        session.titles = titles.clone();
        session.loading = false;
        session.pending_request = None;
        session.pending_generation = None;

        TitlesEvent {
            request_id: request_id.to_string(),
            topic: normalize::normalize_topic(topic, session.settings.generation.collapse_spaces),
            titles,
        }
    };

    log::info!(
        "generation {request_id} produced {} titles",
        payload.titles.len()
    );
    emit(events, EVENT_TITLES, &payload);
    emit(
        events,
        EVENT_LOADING,
        &LoadingEvent {
            request_id: request_id.to_string(),
            loading: false,
        },
    );
}

/// Copies one generated title to the clipboard and marks it as copied until the reset timer fires.
pub fn copy_title(
    state: &SharedState,
    index: usize,
    clipboard: &dyn ClipboardWriter,
    events: Arc<dyn EventSink>,
) -> Result<String, String> {
    let text = {
        let guard = lock(state)?;
        guard
            .titles
            .get(index)
            .map(|title| title.text.clone())
            .ok_or_else(|| format!("No generated title at position {}", index + 1))?
    };

    clipboard.write_text(&text)?;

    let seq = {
        let mut guard = lock(state)?;
        let still_shown = guard
            .titles
            .get(index)
            .is_some_and(|title| title.text == text);
        if !still_shown {
            // Titles were regenerated while the clipboard write was in progress.
            log::debug!("title {index} changed during copy; not marking it");
            return Ok(text);
        }
        guard.copy_seq += 1;
        guard.copied = Some(index);
        guard.copy_seq
    };

    emit(
        events.as_ref(),
        EVENT_COPIED,
        &CopyEvent {
            index,
            text: text.clone(),
        },
    );

    let mut guard = lock(state)?;
    if guard.copy_seq == seq {
        let delay = Duration::from_millis(guard.settings.ui.copied_reset_ms);
        let task_state = state.clone();
        let task_events = events.clone();
        // Replacing the previous reset drops (and so cancels) it.
        guard.copied_reset = Some(ScheduledTask::spawn(delay, move || {
            reset_copied(&task_state, task_events.as_ref(), seq);
        }));
    }
    Ok(text)
}

fn reset_copied(state: &Mutex<AppState>, events: &dyn EventSink, seq: u64) {
    let index = {
        let mut guard = match lock(state) {
            Ok(guard) => guard,
            Err(_) => return,
        };
        if guard.copy_seq != seq {
            return;
        }
        guard.copied_reset = None;
        guard.copied.take()
    };

    if let Some(index) = index {
        emit(events, EVENT_COPIED_RESET, &serde_json::json!({ "index": index }));
    }
}

/// Cancels pending generations and copy-feedback timers. Safe to call more than once.
pub fn teardown(state: &SharedState) -> Result<(), String> {
    let mut guard = lock(state)?;
    guard.cancel_timers();
    Ok(())
}

pub fn snapshot(state: &SharedState) -> Result<SessionSnapshot, String> {
    let guard = lock(state)?;
    Ok(guard.snapshot())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use std::collections::HashSet;
    use std::sync::mpsc::{self, Receiver, Sender};

    struct ChannelSink {
        tx: Mutex<Sender<(String, Value)>>,
    }

    impl EventSink for ChannelSink {
        fn emit(&self, event: &str, payload: Value) {
            if let Ok(tx) = self.tx.lock() {
                let _ = tx.send((event.to_string(), payload));
            }
        }
    }

    #[derive(Default)]
    struct MemoryClipboard {
        contents: Mutex<Vec<String>>,
    }

    impl ClipboardWriter for MemoryClipboard {
        fn write_text(&self, text: &str) -> Result<(), String> {
            self.contents.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    struct BrokenClipboard;

    impl ClipboardWriter for BrokenClipboard {
        fn write_text(&self, _text: &str) -> Result<(), String> {
            Err("no display".to_string())
        }
    }

    fn session(delay_ms: u64, copied_reset_ms: u64) -> SharedState {
        let mut settings = Settings::default();
        settings.generation.delay_ms = delay_ms;
        settings.generation.seed = Some(1234);
        settings.ui.copied_reset_ms = copied_reset_ms;
        Arc::new(Mutex::new(AppState::new(settings).expect("state")))
    }

    fn sink() -> (Arc<dyn EventSink>, Receiver<(String, Value)>) {
        let (tx, rx) = mpsc::channel();
        (Arc::new(ChannelSink { tx: Mutex::new(tx) }), rx)
    }

    fn wait_for(rx: &Receiver<(String, Value)>, event: &str) -> Value {
        loop {
            let (name, payload) = rx
                .recv_timeout(Duration::from_secs(5))
                .expect("event before timeout");
            if name == event {
                return payload;
            }
        }
    }

    #[test]
    fn generate_fills_titles_after_delay() {
        let state = session(100, 2_000);
        let (events, rx) = sink();
        set_topic(&state, "home workout").unwrap();

        let request = generate_titles(&state, events).unwrap().expect("scheduled");
        assert!(snapshot(&state).unwrap().loading);

        let payload = wait_for(&rx, EVENT_TITLES);
        assert_eq!(payload["request_id"], Value::String(request));
        assert_eq!(payload["topic"], "Home Workout");

        let snap = snapshot(&state).unwrap();
        assert!(!snap.loading);
        assert_eq!(snap.titles.len(), 5);
        let templates: HashSet<_> = snap.titles.iter().map(|t| t.template_index).collect();
        assert_eq!(templates.len(), 5);
        assert!(snap.titles.iter().all(|t| t.text.contains("Home Workout")));
    }

    #[test]
    fn blank_topic_is_a_noop() {
        let state = session(0, 2_000);
        let (events, rx) = sink();
        set_topic(&state, "   ").unwrap();
        let before = snapshot(&state).unwrap();

        assert!(generate_titles(&state, events).unwrap().is_none());
        assert_eq!(snapshot(&state).unwrap(), before);
        assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());
    }

    #[test]
    fn generate_while_loading_is_ignored() {
        let state = session(200, 2_000);
        let (events, _rx) = sink();
        set_topic(&state, "chess").unwrap();

        assert!(generate_titles(&state, events.clone()).unwrap().is_some());
        assert!(generate_titles(&state, events).unwrap().is_none());
        teardown(&state).unwrap();
    }

    #[test]
    fn teardown_cancels_pending_generation() {
        let state = session(100, 2_000);
        let (events, rx) = sink();
        set_topic(&state, "chess").unwrap();
        generate_titles(&state, events).unwrap().expect("scheduled");

        teardown(&state).unwrap();
        std::thread::sleep(Duration::from_millis(250));

        let snap = snapshot(&state).unwrap();
        assert!(snap.titles.is_empty());
        assert!(!snap.loading);
        let names: Vec<String> = rx.try_iter().map(|(name, _)| name).collect();
        assert!(!names.iter().any(|name| name == EVENT_TITLES));
    }

    #[test]
    fn regenerate_keeps_topic_and_draws_again() {
        let state = session(0, 2_000);
        let (events, rx) = sink();
        set_topic(&state, "learning python").unwrap();

        generate_titles(&state, events.clone()).unwrap().expect("scheduled");
        wait_for(&rx, EVENT_TITLES);
        let first = snapshot(&state).unwrap();

        regenerate(&state, events).unwrap().expect("scheduled");
        wait_for(&rx, EVENT_TITLES);
        let second = snapshot(&state).unwrap();

        assert_eq!(first.topic, second.topic);
        assert_eq!(second.titles.len(), 5);
    }

    #[test]
    fn seeded_sessions_agree() {
        let run = || {
            let state = session(0, 2_000);
            let (events, rx) = sink();
            set_topic(&state, "drones").unwrap();
            generate_titles(&state, events).unwrap().expect("scheduled");
            wait_for(&rx, EVENT_TITLES);
            snapshot(&state).unwrap().titles
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn copy_sets_and_resets_marker() {
        let state = session(0, 200);
        let (events, rx) = sink();
        let clipboard = MemoryClipboard::default();
        set_topic(&state, "chess").unwrap();
        generate_titles(&state, events.clone()).unwrap().expect("scheduled");
        wait_for(&rx, EVENT_TITLES);

        let text = copy_title(&state, 2, &clipboard, events).unwrap();
        assert_eq!(clipboard.contents.lock().unwrap().as_slice(), &[text.clone()]);
        assert_eq!(snapshot(&state).unwrap().copied, Some(2));

        let payload = wait_for(&rx, EVENT_COPIED_RESET);
        assert_eq!(payload["index"], 2);
        assert_eq!(snapshot(&state).unwrap().copied, None);
    }

    #[test]
    fn second_copy_restarts_reset_timer() {
        let state = session(0, 150);
        let (events, rx) = sink();
        let clipboard = MemoryClipboard::default();
        set_topic(&state, "chess").unwrap();
        generate_titles(&state, events.clone()).unwrap().expect("scheduled");
        wait_for(&rx, EVENT_TITLES);

        copy_title(&state, 0, &clipboard, events.clone()).unwrap();
        copy_title(&state, 1, &clipboard, events).unwrap();
        assert_eq!(snapshot(&state).unwrap().copied, Some(1));

        let payload = wait_for(&rx, EVENT_COPIED_RESET);
        assert_eq!(payload["index"], 1);
        teardown(&state).unwrap();
    }

    #[test]
    fn copy_out_of_range_fails() {
        let state = session(0, 2_000);
        let (events, _rx) = sink();
        let clipboard = MemoryClipboard::default();
        let err = copy_title(&state, 0, &clipboard, events).unwrap_err();
        assert!(err.contains("position 1"));
        assert!(clipboard.contents.lock().unwrap().is_empty());
    }

    #[test]
    fn clipboard_failure_leaves_marker_unset() {
        let state = session(0, 2_000);
        let (events, rx) = sink();
        set_topic(&state, "chess").unwrap();
        generate_titles(&state, events.clone()).unwrap().expect("scheduled");
        wait_for(&rx, EVENT_TITLES);

        assert_eq!(
            copy_title(&state, 0, &BrokenClipboard, events),
            Err("no display".to_string())
        );
        assert_eq!(snapshot(&state).unwrap().copied, None);
    }

    fn drain_until(rx: &Receiver<(String, Value)>, last: &str) -> Vec<(String, Value)> {
        let mut seen = Vec::new();
        loop {
            let (name, payload) = rx
                .recv_timeout(Duration::from_secs(5))
                .expect("event before timeout");
            let done = name == last;
            seen.push((name, payload));
            if done {
                return seen;
            }
        }
    }

    #[test]
    fn loading_events_bracket_titles_without_delay() {
        for _ in 0..300 {
            let state = session(0, 2_000);
            let (events, rx) = sink();
            set_topic(&state, "chess").unwrap();
            generate_titles(&state, events).unwrap().expect("scheduled");

            let mut order = Vec::new();
            loop {
                let (name, payload) = rx
                    .recv_timeout(Duration::from_secs(5))
                    .expect("event before timeout");
                if name == EVENT_LOADING {
                    let loading = payload["loading"].as_bool().expect("loading flag");
                    order.push(if loading { "loading" } else { "idle" });
                    if !loading {
                        break;
                    }
                } else {
                    order.push("titles");
                }
            }
            assert_eq!(order, ["loading", "titles", "idle"]);
        }
    }

    #[test]
    fn copied_event_precedes_reset_with_zero_delay() {
        let clipboard = MemoryClipboard::default();
        for _ in 0..100 {
            let state = session(0, 0);
            let (events, rx) = sink();
            set_topic(&state, "chess").unwrap();
            generate_titles(&state, events.clone()).unwrap().expect("scheduled");
            wait_for(&rx, EVENT_TITLES);

            copy_title(&state, 1, &clipboard, events).unwrap();
            let names: Vec<String> = drain_until(&rx, EVENT_COPIED_RESET)
                .into_iter()
                .map(|(name, _)| name)
                .filter(|name| name == EVENT_COPIED || name == EVENT_COPIED_RESET)
                .collect();
            assert_eq!(names, [EVENT_COPIED, EVENT_COPIED_RESET]);
        }
    }

    struct RegeneratingClipboard {
        state: SharedState,
    }

    impl ClipboardWriter for RegeneratingClipboard {
        fn write_text(&self, _text: &str) -> Result<(), String> {
            let mut guard = self.state.lock().unwrap();
            for title in guard.titles.iter_mut() {
                title.text = format!("{} (new)", title.text);
            }
            Ok(())
        }
    }

    #[test]
    fn copy_does_not_mark_a_title_replaced_mid_copy() {
        let state = session(0, 2_000);
        let (events, rx) = sink();
        set_topic(&state, "chess").unwrap();
        generate_titles(&state, events.clone()).unwrap().expect("scheduled");
        wait_for(&rx, EVENT_TITLES);
        let original = snapshot(&state).unwrap().titles[0].text.clone();

        let clipboard = RegeneratingClipboard {
            state: state.clone(),
        };
        let copied = copy_title(&state, 0, &clipboard, events).unwrap();

        assert_eq!(copied, original);
        assert_eq!(snapshot(&state).unwrap().copied, None);
        let names: Vec<String> = rx.try_iter().map(|(name, _)| name).collect();
        assert!(!names.iter().any(|name| name == EVENT_COPIED));
    }
}
