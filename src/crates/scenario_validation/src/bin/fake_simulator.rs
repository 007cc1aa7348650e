//! Scripted stand-in for the physics simulator, used by the end-to-end tests.
//!
//! Robot 0 holds the ball at centre field. After a `normal_start` or
//! `force_start` referee command the ball rolls towards robot 1, which traps it.

use std::io::{self, BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use scenario_validation::geom::{Point, Vector};
use scenario_validation::world::{BallState, RobotState, World};
use scenario_validation::{ControlMessage, RefereeCommand};
use tracing::{debug, info};

const TICK: Duration = Duration::from_millis(10);
const KICK_SPEED_M_PER_S: f64 = 2.0;
const RECEIVER_X: f64 = 1.5;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let options = Options::parse(std::env::args().skip(1));

    let running = Arc::new(AtomicBool::new(true));
    let (control_tx, control_rx) = mpsc::channel();
    spawn_control_reader(control_tx, running.clone());

    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "fake simulator ready")?;
    out.flush()?;

    let kicker = RobotState::stationary(0, Point::new(-0.15, 0.0), 0.0);
    let receiver = RobotState::stationary(1, Point::new(RECEIVER_X, 0.0), std::f64::consts::PI);
    let mut ball = BallState::default();

    for tick in 0..options.max_ticks {
        if !running.load(Ordering::SeqCst) {
            break;
        }

        while let Ok(message) = control_rx.try_recv() {
            match message {
                ControlMessage::RefereeCommand {
                    command: RefereeCommand::NormalStart | RefereeCommand::ForceStart,
                    ..
                } => {
                    info!(tick, "kick released");
                    ball.velocity = Vector::new(KICK_SPEED_M_PER_S, 0.0);
                }
                other => debug!(?other, "ignoring control message"),
            }
        }

        let dt = TICK.as_secs_f64();
        ball.position = ball.position + ball.velocity.scale(dt);
        if receiver.is_near_dribbler(ball.position, 0.0) {
            ball.velocity = Vector::default();
        }

        if options.malformed_snapshots {
            writeln!(out, r#"{{"timestamp": "tick {tick}", "ball": {{}}}}"#)?;
        } else {
            let world = World::new(tick as f64 * dt, ball)
                .with_friendly_robot(kicker)
                .with_friendly_robot(receiver)
                .with_enemy_robot(RobotState::stationary(0, Point::new(1.0, 2.5), 0.0));
            writeln!(out, "{}", serde_json::to_string(&world)?)?;
        }
        out.flush()?;

        thread::sleep(TICK);
    }

    Ok(())
}

struct Options {
    max_ticks: u64,
    malformed_snapshots: bool,
}

impl Options {
    fn parse(mut args: impl Iterator<Item = String>) -> Self {
        let mut options = Options {
            max_ticks: 1_000,
            malformed_snapshots: false,
        };
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--ticks" => {
                    if let Some(ticks) = args.next().and_then(|value| value.parse().ok()) {
                        options.max_ticks = ticks;
                    }
                }
                "--malformed-snapshots" => options.malformed_snapshots = true,
                other => debug!(other, "ignoring unknown argument"),
            }
        }
        options
    }
}

/// Forward control messages from stdin; EOF stops the simulation.
fn spawn_control_reader(tx: mpsc::Sender<ControlMessage>, running: Arc<AtomicBool>) {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines().map_while(Result::ok) {
            match serde_json::from_str(&line) {
                Ok(message) => {
                    if tx.send(message).is_err() {
                        break;
                    }
                }
                Err(err) => debug!(%err, "ignoring malformed control line"),
            }
        }
        running.store(false, Ordering::SeqCst);
    });
}
