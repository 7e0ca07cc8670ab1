//! RAM and storage accounting for the simulated device.
//!
//! Two independent mechanisms move `ram.used_gb`: the periodic jitter and
//! per-app accounting (open adds a cost, terminate releases it). Neither
//! reconciles against the running-apps list.

use crate::models::AppId;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Cost charged for apps without an entry in the table.
pub const DEFAULT_APP_RAM_GB: f32 = 0.5;

/// Name of the protected system process.
pub const SYSTEM_APP: &str = "Sistema";

/// A process listed by the memory app.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunningApp {
    pub name: String,
    pub ram_gb: f32,
}

impl RunningApp {
    pub fn new(name: impl Into<String>, ram_gb: f32) -> Self {
        RunningApp {
            name: name.into(),
            ram_gb,
        }
    }

    pub fn is_protected(&self) -> bool {
        self.name == SYSTEM_APP
    }
}

/// RAM charged when an app is opened.
pub fn app_ram_cost(app: AppId) -> f32 {
    match app {
        AppId::Camera => 0.8,
        AppId::Microphone => 0.6,
        AppId::Gallery => 0.5,
        AppId::Game => 1.2,
        AppId::Calculator => 0.3,
        AppId::Battery => 0.2,
        AppId::Connectivity => 0.2,
        AppId::Memory => 0.3,
        AppId::Calendar => 0.4,
        AppId::Contacts => 0.3,
        AppId::Messages => 0.5,
        AppId::Phone => 0.4,
        AppId::Amazon => 0.9,
        AppId::Tiktok => 1.1,
        AppId::Banco => 0.7,
        AppId::Slither => 1.0,
        AppId::Ujap => 0.8,
        AppId::Manual => DEFAULT_APP_RAM_GB,
    }
}

/// Processes resident at boot.
pub fn default_running_apps() -> Vec<RunningApp> {
    vec![
        RunningApp::new(SYSTEM_APP, 1.6),
        RunningApp::new("Cámara", 0.8),
        RunningApp::new("Galería", 0.4),
        RunningApp::new("Teléfono", 0.3),
        RunningApp::new("Aplicaciones en Segundo Plano", 0.1),
    ]
}

/// Storage categories shown by the memory app, in GB.
pub fn storage_breakdown() -> Vec<(&'static str, f32)> {
    vec![
        ("Fotos y Videos", 8.3),
        ("Aplicaciones", 6.2),
        ("Música", 4.5),
        ("Documentos", 3.2),
        ("Sistema", 3.7),
        ("Otros", 2.1),
    ]
}

pub fn round_tenth(value: f32) -> f32 {
    (value * 10.0).round() / 10.0
}

/// Uniform delta in `[-step, step)`.
pub fn random_delta<R: Rng + ?Sized>(rng: &mut R, step: f32) -> f32 {
    let step = step.abs();
    if step == 0.0 || !step.is_finite() {
        return 0.0;
    }
    rng.gen_range(-step..step)
}

/// Apply a jitter delta, clamping into `[min, max]` (and the physical total)
/// and rounding to one decimal.
pub fn jittered(current: f32, delta: f32, min: f32, max: f32, total: f32) -> f32 {
    let current = if current.is_finite() { current } else { min };
    let delta = if delta.is_finite() { delta } else { 0.0 };
    let upper = max.min(total).max(0.0);
    let lower = min.clamp(0.0, upper);
    round_tenth((current + delta).clamp(lower, upper)).clamp(lower, upper)
}
