//! PhoneController: the application-state handle every screen receives.
//!
//! Wraps the device store, navigator, gallery and unlock gesture behind
//! `Arc<RwLock<>>` fields. Every mutation goes through a named method that
//! holds one write guard for the duration of the change, so readers never
//! see a half-applied update. Timed transitions and periodic simulation
//! ticks run in the controller's `TaskScope` and stop when it is dropped.

use super::router::{self, ScreenId};
use super::threading::{request_ui_repaint, TaskScope};
use crate::apps::{CameraSession, Recorder};
use crate::config::PhoneSettings;
use crate::error::{capability_message, AppError, ConfigError, PhoneError};
use crate::events::{EventBus, EventKind, PhoneEvent, Subscription};
use crate::hardware::capture::CaptureConstraints;
use crate::hardware::{
    BatteryProvider, CaptureProvider, DeviceState, DeviceStore, NoBattery, SimulatedCapture, SysfsBattery,
};
use crate::lifecycle::{Gallery, GestureOutcome, NavigationState, Navigator, UnlockGesture};
use crate::models::{AppId, Notice, RecentApp};
use crate::{log_info, log_parsed};
use chrono::{DateTime, Local};
use std::collections::VecDeque;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Notices kept before the oldest are dropped.
const NOTICE_CAPACITY: usize = 8;

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn push_notice(notices: &RwLock<VecDeque<Notice>>, notice: Notice) {
    log_info!("[Notice] {:?}: {}", notice.level, notice.message);
    let mut queue = write(notices);
    queue.push_back(notice);
    while queue.len() > NOTICE_CAPACITY {
        queue.pop_front();
    }
}

/// Capabilities injected into the controller.
#[derive(Clone)]
pub struct Providers {
    pub capture: Arc<dyn CaptureProvider>,
    pub battery: Arc<dyn BatteryProvider>,
}

impl Default for Providers {
    /// Fully simulated device.
    fn default() -> Self {
        Providers {
            capture: Arc::new(SimulatedCapture::new()),
            battery: Arc::new(NoBattery),
        }
    }
}

impl Providers {
    /// Simulated capture, plus the host battery when one is exposed.
    pub fn detect() -> Self {
        let battery: Arc<dyn BatteryProvider> = match SysfsBattery::detect() {
            Some(bat) => Arc::new(bat),
            None => Arc::new(NoBattery),
        };
        Providers {
            battery,
            ..Self::default()
        }
    }
}

/// Consistent copy of everything a frame needs.
#[derive(Debug, Clone)]
pub struct PhoneSnapshot {
    pub device: DeviceState,
    pub navigation: NavigationState,
    pub screen: Option<ScreenId>,
    pub recents: Vec<RecentApp>,
    pub clock: DateTime<Local>,
    pub unlock_attempt: Vec<u8>,
    pub unlock_result: Option<bool>,
    pub camera_active: bool,
}

/// Central state manager for the phone
pub struct PhoneController {
    /// Settings the phone booted with
    settings: PhoneSettings,
    /// Simulated device attributes
    pub device: Arc<RwLock<DeviceStore>>,
    /// Screen, lock, call and power state
    pub navigation: Arc<RwLock<Navigator>>,
    /// Session photos
    pub gallery: Arc<RwLock<Gallery>>,
    /// Lock screen pattern attempt
    pub unlock: Arc<RwLock<UnlockGesture>>,
    /// Transient user-visible messages
    pub notices: Arc<RwLock<VecDeque<Notice>>>,
    /// Wall clock shown in the status bar, refreshed by the clock tick
    pub clock: Arc<RwLock<DateTime<Local>>>,
    /// Voice recorder state
    pub recorder: Arc<RwLock<Recorder>>,
    /// Typed event bus shared with capability producers
    pub bus: EventBus,
    /// Camera stream owner
    pub camera: Arc<CameraSession>,
    battery: Arc<dyn BatteryProvider>,
    /// UI context for requesting repaints from background tasks
    ui_context: Arc<RwLock<Option<egui::Context>>>,
    _gallery_feed: Subscription,
    tasks: TaskScope,
}

impl PhoneController {
    pub fn new(settings: PhoneSettings, providers: Providers) -> Self {
        log_info!("[PhoneController] Initializing PhoneController");
        log_info!("[PhoneController] {}", settings.get_summary());

        let bus = EventBus::new();
        let gallery = Arc::new(RwLock::new(Gallery::with_samples()));

        let feed_gallery = Arc::clone(&gallery);
        let gallery_feed = bus.subscribe(EventKind::PhotoCaptured, move |event| {
            if let PhoneEvent::PhotoCaptured { photo_url } = event {
                write(&feed_gallery).add(photo_url.clone());
            }
        });

        let camera = Arc::new(CameraSession::new(Arc::clone(&providers.capture), bus.clone()));

        PhoneController {
            device: Arc::new(RwLock::new(DeviceStore::new(&settings))),
            navigation: Arc::new(RwLock::new(Navigator::new())),
            gallery,
            unlock: Arc::new(RwLock::new(UnlockGesture::new(settings.lock_pattern.clone()))),
            notices: Arc::new(RwLock::new(VecDeque::new())),
            clock: Arc::new(RwLock::new(Local::now())),
            recorder: Arc::new(RwLock::new(Recorder::new(Arc::clone(&providers.capture)))),
            bus,
            camera,
            battery: providers.battery,
            ui_context: Arc::new(RwLock::new(None)),
            _gallery_feed: gallery_feed,
            tasks: TaskScope::new(),
            settings,
        }
    }

    pub fn settings(&self) -> &PhoneSettings {
        &self.settings
    }

    /// Start the periodic simulation. Must be called within a tokio runtime.
    ///
    /// The simulated battery tick only runs when the battery provider has no
    /// real feed.
    pub fn start(&self) {
        let device = Arc::clone(&self.device);
        let ctx = Arc::clone(&self.ui_context);
        match self.battery.subscribe() {
            Some(mut feed) => {
                log_info!("[PhoneController] Battery feed from {} provider", self.battery.name());
                self.tasks.spawn("battery-feed", async move {
                    loop {
                        let reading = *feed.borrow_and_update();
                        write(&device).apply_battery_reading(reading);
                        request_ui_repaint(read(&ctx).as_ref());
                        if feed.changed().await.is_err() {
                            break;
                        }
                    }
                });
            }
            None => {
                log_info!("[PhoneController] No battery feed, simulating battery");
                self.tasks.spawn_periodic("battery", self.settings.battery_tick(), move || {
                    write(&device).battery_tick();
                    request_ui_repaint(read(&ctx).as_ref());
                });
            }
        }

        let device = Arc::clone(&self.device);
        let ctx = Arc::clone(&self.ui_context);
        self.tasks
            .spawn_periodic("ram-jitter", self.settings.ram_jitter_period(), move || {
                let mut rng = rand::thread_rng();
                write(&device).ram_jitter_tick(&mut rng);
                request_ui_repaint(read(&ctx).as_ref());
            });

        let clock = Arc::clone(&self.clock);
        let ctx = Arc::clone(&self.ui_context);
        self.tasks.spawn_periodic("clock", self.settings.clock_tick(), move || {
            *write(&clock) = Local::now();
            request_ui_repaint(read(&ctx).as_ref());
        });

        log_info!("[PhoneController] Periodic tasks started");
    }

    /// Stop every background task.
    pub fn shutdown_tasks(&self) {
        self.tasks.cancel_all();
    }

    pub fn active_tasks(&self) -> Vec<&'static str> {
        self.tasks.active_tasks()
    }

    pub fn set_ui_context(&self, ctx: egui::Context) {
        *write(&self.ui_context) = Some(ctx);
    }

    fn repaint(&self) {
        request_ui_repaint(read(&self.ui_context).as_ref());
    }

    // ---------------------------------------------------------------
    // Reads
    // ---------------------------------------------------------------

    pub fn snapshot(&self) -> PhoneSnapshot {
        let device = read(&self.device).snapshot();
        let navigation = read(&self.navigation).snapshot();
        let (unlock_attempt, unlock_result) = {
            let gesture = read(&self.unlock);
            (gesture.attempt().to_vec(), gesture.result())
        };

        PhoneSnapshot {
            screen: router::resolve(
                navigation.current_app,
                navigation.is_locked,
                navigation.is_shut_down(),
            ),
            recents: navigation.recent_apps(self.settings.recents_limit),
            device,
            navigation,
            clock: *read(&self.clock),
            unlock_attempt,
            unlock_result,
            camera_active: self.camera.is_active(),
        }
    }

    pub fn device_state(&self) -> DeviceState {
        read(&self.device).snapshot()
    }

    pub fn navigation_state(&self) -> NavigationState {
        read(&self.navigation).snapshot()
    }

    pub fn recent_apps(&self) -> Vec<RecentApp> {
        read(&self.navigation)
            .state()
            .recent_apps(self.settings.recents_limit)
    }

    pub fn photos(&self) -> Vec<String> {
        read(&self.gallery).photos().to_vec()
    }

    // ---------------------------------------------------------------
    // Notices
    // ---------------------------------------------------------------

    pub fn notify(&self, notice: Notice) {
        push_notice(&self.notices, notice);
        self.repaint();
    }

    fn report(&self, err: &PhoneError) {
        self.notify(Notice::error(AppError::from(err.clone()).user_message()));
    }

    /// Surface a settings or storage failure to the user.
    pub fn report_config_error(&self, err: ConfigError) {
        log::warn!("[PhoneController] {}", err);
        self.notify(Notice::error(AppError::from(err).user_message()));
    }

    /// Take every pending notice.
    pub fn drain_notices(&self) -> Vec<Notice> {
        write(&self.notices).drain(..).collect()
    }

    // ---------------------------------------------------------------
    // Device
    // ---------------------------------------------------------------

    pub fn toggle_wifi(&self) {
        write(&self.device).toggle_wifi(None, None);
    }

    pub fn toggle_cellular(&self) {
        write(&self.device).toggle_cellular();
    }

    pub fn set_charging(&self, charging: bool) {
        write(&self.device).set_charging(charging);
    }

    pub fn terminate_app(&self, name: &str) -> Result<f32, PhoneError> {
        let result = write(&self.device).terminate_app(name);
        match &result {
            Ok(released) => self.notify(Notice::success(format!(
                "{} cerrada, {:.1} GB liberados",
                name, released
            ))),
            Err(e) => self.report(e),
        }
        result
    }

    // ---------------------------------------------------------------
    // Navigation
    // ---------------------------------------------------------------

    /// Switch the visible app (`None` = home).
    ///
    /// Leaving the camera publishes `CameraForceShutdown` before the switch.
    /// Opening a different app charges its RAM cost and records history.
    pub fn set_current_app(&self, app: Option<AppId>) {
        let previous = read(&self.navigation).state().current_app;
        if previous == app {
            return;
        }

        if previous == Some(AppId::Camera) {
            log_info!("[PhoneController] Leaving camera, forcing stream shutdown");
            self.bus.publish(PhoneEvent::CameraForceShutdown);
        }
        if previous == Some(AppId::Microphone) {
            self.stop_recording();
        }

        let opened = write(&self.navigation).set_current_app(app);
        if opened {
            if let Some(id) = app {
                write(&self.device).on_app_opened(id);
                log_info!("[PhoneController] Opened {}", id);
                if id == AppId::Camera {
                    self.start_camera();
                }
            }
        }
    }

    pub fn open_app(&self, app: AppId) {
        self.set_current_app(Some(app));
    }

    pub fn go_home(&self) {
        self.close_recents();
        self.set_current_app(None);
    }

    pub fn go_back(&self) {
        self.set_current_app(None);
    }

    pub fn open_recents(&self) {
        write(&self.navigation).open_recents();
    }

    pub fn close_recents(&self) {
        write(&self.navigation).close_recents();
    }

    pub fn toggle_recents(&self) {
        let mut nav = write(&self.navigation);
        if nav.state().is_recents_open {
            nav.close_recents();
        } else {
            nav.open_recents();
        }
    }

    /// Open an entry of the recents overlay.
    pub fn open_recent(&self, app: AppId) {
        self.close_recents();
        self.set_current_app(Some(app));
    }

    pub fn simulate_call(&self, number: &str, name: Option<&str>) -> Result<(), PhoneError> {
        let leaving_camera = {
            let nav = read(&self.navigation);
            nav.state().current_app == Some(AppId::Camera) && nav.state().power.is_on()
        };
        if leaving_camera {
            self.bus.publish(PhoneEvent::CameraForceShutdown);
        }

        let result = write(&self.navigation).simulate_call(number, name);
        match result {
            Ok(opened) => {
                if opened {
                    write(&self.device).on_app_opened(AppId::Phone);
                }
                log_parsed!("[Call] Calling {}", name.filter(|n| !n.is_empty()).unwrap_or(number));
                Ok(())
            }
            Err(e) => {
                self.report(&e);
                Err(e)
            }
        }
    }

    pub fn end_call(&self) {
        write(&self.navigation).end_call();
        log_parsed!("[Call] Call ended");
    }

    pub fn lock(&self) {
        write(&self.navigation).lock();
        write(&self.unlock).reset();
    }

    // ---------------------------------------------------------------
    // Unlock gesture
    // ---------------------------------------------------------------

    /// Feed one grid point into the lock screen gesture.
    ///
    /// A correct pattern unlocks after the confirm delay; a wrong one is
    /// shown as failed and cleared after the reset delay.
    pub fn select_unlock_point(&self, point: u8) -> GestureOutcome {
        {
            let nav = read(&self.navigation);
            if !nav.state().is_locked || !nav.state().power.is_on() {
                return GestureOutcome::Ignored;
            }
        }

        let (outcome, generation) = {
            let mut gesture = write(&self.unlock);
            let outcome = gesture.select(point);
            (outcome, gesture.generation())
        };
        match outcome {
            GestureOutcome::Accepted => {
                let unlock = Arc::clone(&self.unlock);
                let nav = Arc::clone(&self.navigation);
                let ctx = Arc::clone(&self.ui_context);
                self.tasks
                    .spawn_delayed("unlock-confirm", self.settings.unlock_confirm(), move || {
                        let mut gesture = write(&unlock);
                        if gesture.generation() != generation || gesture.result() != Some(true) {
                            return;
                        }
                        gesture.reset();
                        if write(&nav).unlock() {
                            log_parsed!("[Lock] Phone unlocked");
                        }
                        request_ui_repaint(read(&ctx).as_ref());
                    });
            }
            GestureOutcome::Rejected => {
                log_info!("[Lock] Wrong unlock pattern");
                let unlock = Arc::clone(&self.unlock);
                let ctx = Arc::clone(&self.ui_context);
                self.tasks
                    .spawn_delayed("unlock-reset", self.settings.unlock_reset(), move || {
                        let mut gesture = write(&unlock);
                        if gesture.generation() == generation && gesture.result() == Some(false) {
                            gesture.reset();
                        }
                        request_ui_repaint(read(&ctx).as_ref());
                    });
            }
            GestureOutcome::Pending | GestureOutcome::Ignored => {}
        }
        outcome
    }

    /// "Borrar" on the lock screen.
    pub fn clear_unlock(&self) -> bool {
        write(&self.unlock).clear()
    }

    // ---------------------------------------------------------------
    // Power
    // ---------------------------------------------------------------

    fn release_capture_for_power_change(&self) {
        if read(&self.navigation).state().current_app == Some(AppId::Camera) {
            self.bus.publish(PhoneEvent::CameraForceShutdown);
        }
        self.stop_recording();
    }

    /// Power off: `PoweringOff` now, `ShutDown` after the power-off delay.
    pub fn shutdown_phone(&self) -> Result<(), PhoneError> {
        if let Err(e) = write(&self.navigation).begin_shutdown() {
            self.report(&e);
            return Err(e);
        }
        log_parsed!("[Power] Powering off");
        self.release_capture_for_power_change();

        let nav = Arc::clone(&self.navigation);
        let ctx = Arc::clone(&self.ui_context);
        self.tasks
            .spawn_delayed("power-off", self.settings.power_off_delay(), move || {
                if write(&nav).complete_shutdown() {
                    log_parsed!("[Power] Shut down");
                }
                request_ui_repaint(read(&ctx).as_ref());
            });
        Ok(())
    }

    /// Restart: rebooting overlay, then a dark screen, then a locked home.
    pub fn restart_phone(&self) -> Result<(), PhoneError> {
        if let Err(e) = write(&self.navigation).begin_restart() {
            self.report(&e);
            return Err(e);
        }
        log_parsed!("[Power] Restarting");
        self.release_capture_for_power_change();

        let nav = Arc::clone(&self.navigation);
        let unlock = Arc::clone(&self.unlock);
        let ctx = Arc::clone(&self.ui_context);
        let first = self.settings.restart_delay();
        let dark = self.settings.restart_dark();
        self.tasks.spawn("restart", async move {
            tokio::time::sleep(first).await;
            if !write(&nav).restart_go_dark() {
                return;
            }
            request_ui_repaint(read(&ctx).as_ref());

            tokio::time::sleep(dark).await;
            if write(&nav).complete_restart() {
                write(&unlock).reset();
                log_parsed!("[Power] Restart complete");
            }
            request_ui_repaint(read(&ctx).as_ref());
        });
        Ok(())
    }

    /// Boot from the shut down state.
    pub fn power_on(&self) -> Result<(), PhoneError> {
        if let Err(e) = write(&self.navigation).power_on() {
            self.report(&e);
            return Err(e);
        }
        write(&self.unlock).reset();
        log_parsed!("[Power] Powered on");
        Ok(())
    }

    /// Side button: power on when off, otherwise power off.
    pub fn press_power_button(&self) -> Result<(), PhoneError> {
        if read(&self.navigation).state().power == crate::lifecycle::PowerState::ShutDown {
            self.power_on()
        } else {
            self.shutdown_phone()
        }
    }

    // ---------------------------------------------------------------
    // Gallery
    // ---------------------------------------------------------------

    pub fn add_photo(&self, photo_url: String) {
        write(&self.gallery).add(photo_url);
    }

    /// Delete a photo. Returns the gallery length before the delete when
    /// something was removed, for viewer index adjustment.
    pub fn delete_photo(&self, index: usize) -> Option<usize> {
        let mut gallery = write(&self.gallery);
        let len_before = gallery.len();
        gallery.delete(index).map(|_| len_before)
    }

    // ---------------------------------------------------------------
    // Camera and microphone
    // ---------------------------------------------------------------

    /// Acquire the camera in the background. Failures become notices.
    ///
    /// The generation is taken before spawning, so leaving the camera before
    /// the acquisition resolves releases the late stream.
    pub fn start_camera(&self) {
        let camera = Arc::clone(&self.camera);
        let generation = camera.prepare();
        let notices = Arc::clone(&self.notices);
        let ctx = Arc::clone(&self.ui_context);
        self.tasks.spawn("camera-start", async move {
            if let Err(e) = camera.start_prepared(generation).await {
                push_notice(&notices, Notice::error(capability_message(&e)));
            }
            request_ui_repaint(read(&ctx).as_ref());
        });
    }

    pub fn take_photo(&self) -> Result<String, PhoneError> {
        match self.camera.take_photo() {
            Ok(url) => {
                self.notify(Notice::success("Foto guardada en la galería"));
                Ok(url)
            }
            Err(e) => {
                self.report(&e);
                Err(e)
            }
        }
    }

    pub fn is_recording(&self) -> bool {
        read(&self.recorder).is_recording()
    }

    /// Start or stop the voice recorder.
    pub fn toggle_recording(&self) {
        if self.is_recording() {
            self.stop_recording();
            return;
        }

        let recorder = Arc::clone(&self.recorder);
        let notices = Arc::clone(&self.notices);
        let ctx = Arc::clone(&self.ui_context);
        let provider = read(&self.recorder).provider();
        self.tasks.spawn("recorder-start", async move {
            let result = match provider.acquire(CaptureConstraints::microphone()).await {
                Ok(stream) => write(&recorder).begin(stream),
                Err(e) => Err(e),
            };
            if let Err(e) = result {
                push_notice(&notices, Notice::error(capability_message(&e)));
            }
            request_ui_repaint(read(&ctx).as_ref());
        });
    }

    fn stop_recording(&self) {
        let saved = write(&self.recorder).stop();
        if let Some(recording) = saved {
            self.notify(Notice::info(format!(
                "Grabación guardada ({})",
                crate::apps::recorder::format_time(recording.duration_secs)
            )));
        }
    }
}

impl Drop for PhoneController {
    fn drop(&mut self) {
        log_info!("[PhoneController] Shutting down background tasks");
        self.tasks.cancel_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> PhoneController {
        PhoneController::new(PhoneSettings::default(), Providers::default())
    }

    #[tokio::test]
    async fn test_open_app_charges_ram_and_history() {
        let phone = controller();
        phone.open_app(AppId::Calculator);
        phone.open_app(AppId::Calculator);

        let snap = phone.snapshot();
        assert!((snap.device.ram.used_gb - 3.5).abs() < 1e-5);
        assert_eq!(snap.navigation.app_history, vec![AppId::Calculator]);
        // still locked: the router shows the lock screen
        assert_eq!(snap.screen, Some(ScreenId::Lock));
    }

    #[tokio::test]
    async fn test_leaving_camera_publishes_shutdown() {
        let phone = controller();
        let hits = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let _sub = phone.bus.subscribe(EventKind::CameraForceShutdown, move |_| {
            counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        });

        phone.open_app(AppId::Camera);
        phone.go_back();
        phone.go_back();
        assert_eq!(hits.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_captured_photo_lands_in_gallery() {
        let phone = controller();
        phone.bus.publish(PhoneEvent::PhotoCaptured {
            photo_url: "data:image/svg+xml,x".to_string(),
        });
        let photos = phone.photos();
        assert_eq!(photos.len(), 5);
        assert_eq!(photos[4], "data:image/svg+xml,x");
    }

    #[tokio::test]
    async fn test_terminate_system_produces_notice() {
        let phone = controller();
        assert!(phone.terminate_app("Sistema").is_err());
        let notices = phone.drain_notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level, crate::models::NoticeLevel::Error);
        assert!(phone.drain_notices().is_empty());
    }

    #[tokio::test]
    async fn test_config_error_becomes_notice() {
        let phone = controller();
        phone.report_config_error(ConfigError::ValidationFailed("bad".to_string()));
        let notices = phone.drain_notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level, crate::models::NoticeLevel::Error);
        assert!(notices[0].message.starts_with("Error de configuración"));
    }

    #[tokio::test]
    async fn test_delete_photo_reports_length() {
        let phone = controller();
        assert_eq!(phone.delete_photo(0), Some(4));
        assert_eq!(phone.delete_photo(10), None);
        assert_eq!(phone.photos().len(), 3);
    }
}
