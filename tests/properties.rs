//! Property tests for the device store, navigation and gesture invariants.

use pocket_phone::events::{EventBus, EventKind, PhoneEvent};
use pocket_phone::hardware::DeviceStore;
use pocket_phone::lifecycle::{GalleryViewer, GestureOutcome, Navigator, UnlockGesture};
use pocket_phone::models::AppId;
use pocket_phone::PhoneSettings;
use proptest::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

const CORRECT: [u8; 5] = [0, 3, 6, 7, 8];

fn store() -> DeviceStore {
    DeviceStore::new(&PhoneSettings::default())
}

fn any_app() -> impl Strategy<Value = AppId> {
    (0..AppId::ALL.len()).prop_map(|i| AppId::ALL[i])
}

#[derive(Debug, Clone)]
enum NavStep {
    Open(AppId),
    Home,
}

fn nav_step() -> impl Strategy<Value = NavStep> {
    prop_oneof![
        3 => any_app().prop_map(NavStep::Open),
        1 => Just(NavStep::Home),
    ]
}

proptest! {
    #[test]
    fn radio_toggles_stay_in_range(steps in prop::collection::vec(any::<bool>(), 0..40)) {
        let mut store = store();
        for wifi in steps {
            if wifi {
                store.toggle_wifi(None, None);
            } else {
                store.toggle_cellular();
            }
            let state = store.state();
            prop_assert!(state.wifi.signal_strength <= 100);
            prop_assert!((1..=5).contains(&state.cellular.strength));
        }
    }

    #[test]
    fn battery_ticks_are_monotonic_and_bounded(
        initial in prop_oneof![Just(f32::NAN), -50.0f32..150.0],
        charging in prop::collection::vec(any::<bool>(), 1..60),
    ) {
        let mut settings = PhoneSettings::default();
        settings.initial_battery_level = initial;
        let mut store = DeviceStore::new(&settings);

        for charge in charging {
            store.set_charging(charge);
            let before = store.state().battery_level.clamp(0.0, 100.0);
            store.battery_tick();
            let after = store.state().battery_level;
            prop_assert!((0.0..=100.0).contains(&after));
            if charge {
                prop_assert!(after >= before);
            } else {
                prop_assert!(after <= before);
            }
        }
    }

    #[test]
    fn system_process_is_never_terminated(deltas in prop::collection::vec(-1.0f32..1.0, 0..10)) {
        let mut store = store();
        for d in deltas {
            store.apply_ram_delta(d);
        }
        let before = store.snapshot();
        prop_assert!(store.terminate_app("Sistema").is_err());
        prop_assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn terminating_apps_keeps_resident_floor(
        order in Just(vec!["Cámara", "Galería", "Teléfono", "Aplicaciones en Segundo Plano"]).prop_shuffle(),
        opened in prop::collection::vec(any_app(), 0..5),
    ) {
        let mut store = store();
        for app in opened {
            store.on_app_opened(app);
        }
        for name in order {
            prop_assert!(store.terminate_app(name).is_ok());
            prop_assert!(store.state().ram.used_gb >= 1.5);
        }
        prop_assert_eq!(store.state().running_apps.len(), 1);
    }

    #[test]
    fn only_reference_pattern_is_accepted(
        attempt in Just((0u8..9).collect::<Vec<_>>()).prop_shuffle().prop_map(|v| v[..5].to_vec()),
    ) {
        let mut gesture = UnlockGesture::new(CORRECT.to_vec());
        let outcomes: Vec<_> = attempt.iter().map(|p| gesture.select(*p)).collect();
        let last = *outcomes.last().unwrap();
        if attempt == CORRECT {
            prop_assert_eq!(last, GestureOutcome::Accepted);
        } else {
            prop_assert_eq!(last, GestureOutcome::Rejected);
            prop_assert_eq!(gesture.result(), Some(false));
        }
        gesture.reset();
        prop_assert!(gesture.attempt().is_empty());
    }

    #[test]
    fn recents_exclude_current_and_are_unique(steps in prop::collection::vec(nav_step(), 0..50)) {
        let mut nav = Navigator::new();
        for step in steps {
            match step {
                NavStep::Open(app) => { nav.set_current_app(Some(app)); }
                NavStep::Home => { nav.go_back(); }
            }
            let state = nav.state();
            let recents = state.recent_apps(5);
            prop_assert!(recents.len() <= 5);
            prop_assert!(recents.iter().all(|r| Some(r.id) != state.current_app));

            let mut ids: Vec<_> = recents.iter().map(|r| r.id).collect();
            ids.sort_by_key(|id| id.as_str());
            ids.dedup();
            prop_assert_eq!(ids.len(), recents.len());

            if let Some(current) = state.current_app {
                prop_assert_eq!(state.app_history.last(), Some(&current));
            }
        }
    }

    #[test]
    fn viewer_index_stays_in_bounds(
        len in 1usize..10,
        open_at in 0usize..10,
        deletes in prop::collection::vec(0usize..10, 0..10),
    ) {
        let mut len = len;
        let mut viewer = GalleryViewer::default();
        viewer.open(open_at % len, len);

        for index in deletes {
            if len == 0 {
                break;
            }
            let index = index % len;
            viewer.on_deleted(index, len);
            len -= 1;
            if let Some(current) = viewer.index() {
                prop_assert!(len > 0);
                prop_assert!(current < len);
            }
        }
    }

    #[test]
    fn bus_does_not_replay(before in 0usize..5, after in 0usize..5) {
        let bus = EventBus::new();
        for _ in 0..before {
            prop_assert_eq!(bus.publish(PhoneEvent::CameraForceShutdown), 0);
        }

        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let _sub = bus.subscribe(EventKind::CameraForceShutdown, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        for _ in 0..after {
            bus.publish(PhoneEvent::CameraForceShutdown);
        }
        prop_assert_eq!(hits.load(Ordering::SeqCst), after);
    }
}
