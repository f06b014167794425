use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use glam::Vec3;
use instant::Instant;

use koi::config::{Bounds, FishConfig};
use koi::debug::timer::SystemPhase;
use koi::debug::FrameStats;
use koi::scene::{FishSnapshot, Scene};

/// Target simulation tick rate (seconds per tick).
const TICK_RATE: f64 = 1.0 / 60.0;
/// Max accumulated time before we clamp (prevents spiral of death).
const MAX_ACCUMULATOR: f64 = 0.25;
/// Wall-clock frame pacing for the headless loop.
const FRAME_SLEEP: Duration = Duration::from_millis(4);
/// How many fish to spawn on startup.
const INITIAL_FISH_COUNT: usize = 3;
/// Seconds between simulated pointer clicks.
const CLICK_INTERVAL: Duration = Duration::from_millis(1500);
/// How often to log fish status (seconds).
const STATUS_LOG_INTERVAL: f64 = 2.0;
/// Scripted conversation window for the first fish (seconds since start).
const TALK_START: f64 = 10.0;
const TALK_END: f64 = 16.0;

const FISH_NAMES: [&str; INITIAL_FISH_COUNT] = ["Kohaku", "Sanke", "Showa"];

/// Options for a demo run.
pub struct RunOptions {
    pub config_path: Option<PathBuf>,
    /// Wall-clock run length in seconds.
    pub duration: f64,
}

/// Top-level application state.
struct App {
    scene: Scene,
    fish: Vec<hecs::Entity>,

    // Snapshot cache, rebuilt every frame
    snapshots: Vec<FishSnapshot>,

    // Fixed timestep
    last_frame_time: Option<Instant>,
    accumulator: f64,
    started: Instant,

    frame_stats: FrameStats,
    status_timer: f64,
    talking: bool,
}

impl App {
    fn new(config: &FishConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let mut scene = Scene::new();
        let center = config.bounds.center();
        let mut fish = Vec::with_capacity(INITIAL_FISH_COUNT);

        for (i, name) in FISH_NAMES.iter().enumerate() {
            let offset = i as f32 - (INITIAL_FISH_COUNT as f32 - 1.0) * 0.5;
            let position = Vec3::new(center.x + offset * 2.0, config.ground_y, center.y);
            let mut fish_config = config.clone();
            // Distinct but reproducible streams when a seed is given.
            fish_config.rng_seed = config.rng_seed.map(|seed| seed.wrapping_add(i as u64));
            fish.push(scene.spawn_fish(*name, fish_config, position)?);
        }

        Ok(Self {
            scene,
            fish,
            snapshots: Vec::with_capacity(INITIAL_FISH_COUNT),
            last_frame_time: None,
            accumulator: 0.0,
            started: Instant::now(),
            frame_stats: FrameStats::new(),
            status_timer: 0.0,
            talking: false,
        })
    }

    /// One wall-clock frame: run fixed ticks, then refresh snapshots.
    fn frame(&mut self) {
        let now = Instant::now();
        let dt = match self.last_frame_time {
            Some(last) => now.duration_since(last).as_secs_f64(),
            None => TICK_RATE,
        };
        self.last_frame_time = Some(now);

        self.run_script();
        self.run_fixed_update(dt);

        let timers = &mut self.frame_stats.system_timers;
        timers.begin();
        self.scene.build_snapshots(&mut self.snapshots);
        timers.end(SystemPhase::Snapshots);

        self.frame_stats.record_frame(dt);
        self.status_timer += dt;
        if self.status_timer >= STATUS_LOG_INTERVAL {
            self.status_timer = 0.0;
            self.log_status();
        }
    }

    /// Run fixed-timestep simulation ticks.
    fn run_fixed_update(&mut self, dt: f64) {
        self.accumulator += dt;

        if self.accumulator > MAX_ACCUMULATOR {
            self.accumulator = MAX_ACCUMULATOR;
        }

        while self.accumulator >= TICK_RATE {
            let timers = &mut self.frame_stats.system_timers;

            timers.begin();
            self.scene.drain_clicks();
            timers.end(SystemPhase::Clicks);

            timers.begin();
            self.scene.update_fish(TICK_RATE as f32);
            timers.end(SystemPhase::Fish);

            timers.begin();
            self.scene.despawn_eaten();
            timers.end(SystemPhase::Pellets);

            self.accumulator -= TICK_RATE;
            self.frame_stats.tick_count += 1;
        }
    }

    /// Start and stop a conversation with the first fish on a fixed schedule.
    fn run_script(&mut self) {
        let Some(&first) = self.fish.first() else {
            return;
        };
        let t = self.started.elapsed().as_secs_f64();

        let result = if !self.talking && (TALK_START..TALK_END).contains(&t) {
            // Refused while approaching or eating; retried next frame.
            self.scene.start_talking(first)
        } else if self.talking && t >= TALK_END {
            self.scene.stop_talking(first).map(|_| false)
        } else {
            return;
        };

        match result {
            Ok(talking) => self.talking = talking,
            Err(e) => log::warn!("Talk script failed: {e}"),
        }
    }

    fn log_status(&self) {
        for snap in &self.snapshots {
            match snap.target {
                Some(target) => log::info!(
                    "{:<8} {:<8} head ({:>6.2}, {:>6.2}) -> ({:>6.2}, {:>6.2})",
                    snap.name,
                    snap.state,
                    snap.head.x,
                    snap.head.z,
                    target.x,
                    target.z,
                ),
                None => log::info!(
                    "{:<8} {:<8} head ({:>6.2}, {:>6.2})",
                    snap.name,
                    snap.state,
                    snap.head.x,
                    snap.head.z,
                ),
            }
        }
        log::debug!(
            "{} fish, {} pellets, sim time {:.1}s",
            self.scene.fish_count(),
            self.scene.pellet_count(),
            self.scene.elapsed(),
        );
    }
}

/// Stand-in for a pointer: drops food at random spots inside `bounds`.
fn spawn_pointer(
    clicks: Sender<Vec3>,
    bounds: Bounds,
    ground_y: f32,
    seed: Option<u64>,
    stop: Arc<AtomicBool>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let mut rng = match seed {
            Some(seed) => fastrand::Rng::with_seed(seed ^ 0x9e37_79b9),
            None => fastrand::Rng::new(),
        };
        while !stop.load(Ordering::Relaxed) {
            thread::sleep(CLICK_INTERVAL);
            let x = bounds.min_x + rng.f32() * (bounds.max_x - bounds.min_x);
            let z = bounds.min_z + rng.f32() * (bounds.max_z - bounds.min_z);
            if clicks.send(Vec3::new(x, ground_y, z)).is_err() {
                break;
            }
        }
    })
}

/// Run the headless demo until `options.duration` elapses.
pub fn run(options: RunOptions) -> Result<(), Box<dyn std::error::Error>> {
    let config = match &options.config_path {
        Some(path) => {
            log::info!("Loading config from {}", path.display());
            FishConfig::load(path)?
        }
        None => FishConfig::default(),
    };

    let mut app = App::new(&config)?;

    let stop = Arc::new(AtomicBool::new(false));
    let pointer = spawn_pointer(
        app.scene.click_sender(),
        config.bounds,
        config.ground_y,
        config.rng_seed,
        Arc::clone(&stop),
    );

    log::info!(
        "Running {} fish for {:.0}s at {:.0} Hz",
        app.scene.fish_count(),
        options.duration,
        1.0 / TICK_RATE,
    );
    while app.started.elapsed().as_secs_f64() < options.duration {
        app.frame();
        thread::sleep(FRAME_SLEEP);
    }

    stop.store(true, Ordering::Relaxed);
    if pointer.join().is_err() {
        log::warn!("Pointer thread panicked");
    }
    log::info!(
        "Done after {} ticks, {} pellets left",
        app.frame_stats.tick_count,
        app.scene.pellet_count()
    );
    Ok(())
}
