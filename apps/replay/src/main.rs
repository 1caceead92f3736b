//! Replays a recorded session: pick one from the menu, then step through its
//! frames in numeric order at the recording rate, holding on the last frame
//! until a quit key is pressed.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyModifiers};
use crossterm::terminal;
use frame_store::StoreError;
use log::warn;

const TICKS_PER_SECOND: u64 = 60;
const PICTURES_ROOT: &str = "pictures";

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let sessions = frame_store::list_sessions(Path::new(PICTURES_ROOT))?;
    let session = choose_session(&sessions)?;

    let frames = frame_store::frame_paths(session)?;
    if frames.is_empty() {
        println!("{} holds no frames", session.display());
        return Ok(());
    }

    println!(
        "replaying {} frames from {}, press q to stop",
        frames.len(),
        session.display()
    );

    terminal::enable_raw_mode()?;
    let result = play(&frames);
    terminal::disable_raw_mode()?;
    eprintln!();

    result
}

/// Prints the 1-based session menu and prompts until the selection is valid.
/// Invalid input is reported and re-prompted, never fatal.
fn choose_session(sessions: &[PathBuf]) -> anyhow::Result<&PathBuf> {
    let padding = sessions.len().to_string().len();
    for (i, session) in sessions.iter().enumerate() {
        println!(
            "{:<width$} -> {}",
            i + 1,
            session.file_name().unwrap_or_default().to_string_lossy(),
            width = padding
        );
    }
    println!();

    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            anyhow::bail!("stdin closed before a session was chosen");
        }

        match frame_store::select(&line, sessions.len()) {
            Ok(index) => return Ok(&sessions[index]),
            Err(err @ StoreError::InvalidSelection { .. }) => eprintln!("{}", err),
            Err(err) => return Err(err.into()),
        }
    }
}

/// Advances one frame per tick and keeps the latest decoded frame as what
/// the viewer is holding; a frame that fails to decode is skipped with a
/// warning without disturbing the order. Presentation itself is the
/// windowing collaborator's job.
fn play(frames: &[PathBuf]) -> anyhow::Result<()> {
    let mut shown = None;
    let mut index = 0;

    loop {
        let tick_start = Instant::now();

        if quit_requested()? {
            return Ok(());
        }

        if index < frames.len() {
            match frame_store::load_frame(&frames[index]) {
                Ok(frame) => shown = Some(frame),
                Err(err) => warn!("skipping frame: {}", err),
            }
            index += 1;
        }

        if let Some(frame) = &shown {
            eprint!(
                "\r frame {} / {} ({}x{})",
                index,
                frames.len(),
                frame.width(),
                frame.height()
            );
        }

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
