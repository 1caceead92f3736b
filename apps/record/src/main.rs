//! Records a simulation run: every tick stamps the points onto the canvas,
//! fades and blurs it, advances the ensemble and persists the frame, until a
//! quit key is pressed.

use std::path::Path;
use std::time::{Duration, Instant};

use cgmath::vec2;
use crossterm::event::{self, Event, KeyCode, KeyModifiers};
use crossterm::terminal;
use frame_store::Session;
use log::info;
use ndarray::Array;
use slime::point;
use slime::trail::{self, Canvas, Rgb8};

const CANVAS_WIDTH: usize = 500;
const CANVAS_HEIGHT: usize = 500;
const POINT_COUNT: usize = 1000;
const FOREGROUND: Rgb8 = [255, 255, 255];
const DECAY: Rgb8 = [1, 1, 1];
/// `None` skips the blur pass entirely.
const DIFFUSION_RATE: Option<f64> = Some(0.5);
const TICKS_PER_SECOND: u64 = 60;
const PICTURES_ROOT: &str = "pictures";

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut session = Session::create(Path::new(PICTURES_ROOT))?;
    println!(
        "recording to {}, press q to stop",
        session.dir().display()
    );

    terminal::enable_raw_mode()?;
    let result = run(&mut session);
    terminal::disable_raw_mode()?;
    eprintln!();

    result
}

fn run(session: &mut Session) -> anyhow::Result<()> {
    let playground = vec2(CANVAS_WIDTH as f64, CANVAS_HEIGHT as f64);
    let mut canvas: Canvas = Array::from_elem((CANVAS_WIDTH, CANVAS_HEIGHT), [0; 3]);
    let mut points = point::fan_out(POINT_COUNT, playground / 2.0, playground);

    let mut frames = 0;
    loop {
        let tick_start = Instant::now();

        // Quit is polled before any tick work, so a partial tick is never
        // persisted.
        if quit_requested()? {
            info!("quit requested after {} frames", frames);
            return Ok(());
        }

        for p in &points {
            trail::stamp(&mut canvas, p.position, FOREGROUND);
        }
        trail::fade(&mut canvas, DECAY);
        if let Some(rate) = DIFFUSION_RATE {
            canvas = trail::diffuse(&canvas, rate);
        }
        for p in &mut points {
            p.advance();
        }

        frames = session.save_frame(&canvas)?;
        eprint!("\r frame {}", frames);

        sleep_to_cap(tick_start, TICKS_PER_SECOND);
    }
}

fn quit_requested() -> anyhow::Result<bool> {
    while event::poll(Duration::from_secs(0))? {
        if let Event::Key(key) = event::read()? {
            let ctrl_c = key.code == KeyCode::Char('c')
                && key.modifiers.contains(KeyModifiers::CONTROL);
            if ctrl_c || matches!(key.code, KeyCode::Char('q') | KeyCode::Esc) {
                return Ok(true);
            }
        }
    }

    Ok(false)
}

fn sleep_to_cap(tick_start: Instant, ticks_per_second: u64) {
    let budget = Duration::from_micros(1_000_000 / ticks_per_second);
    let elapsed = tick_start.elapsed();
    if elapsed < budget {
        std::thread::sleep(budget - elapsed);
    }
}
