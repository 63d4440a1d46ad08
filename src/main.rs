mod display;

use std::collections::HashMap;
use std::fs::File;
use std::io::{stdout, BufWriter, Write};
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
        KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    style::{self, Color, Print},
    terminal,
    ExecutableCommand, QueueableCommand,
};
use rand::thread_rng;

use arena_survival::compute::{init_state, restart, tick};
use arena_survival::config::Tuning;
use arena_survival::entities::{GameState, GameStatus};
use arena_survival::services::{AudioSink, Keys, SoundId, SpriteCache, TrackId};

/// A key is considered "held" if its last press/repeat event arrived within
/// this many frames. Covers terminals that don't emit key-release events:
/// at 60 FPS a window of 8 frames (≈133 ms) outlasts the OS repeat interval.
const HOLD_WINDOW: u64 = 8;

const TUNING_ENV: &str = "ARENA_TUNING";
const DEFAULT_TUNING_FILE: &str = "arena.ron";
const LOG_FILE: &str = "arena_survival.log";

/// Returns true if `key` was seen within the last `HOLD_WINDOW` frames.
fn is_held(key_frame: &HashMap<KeyCode, u64>, key: &KeyCode, frame: u64) -> bool {
    key_frame
        .get(key)
        .map(|&last| frame.saturating_sub(last) <= HOLD_WINDOW)
        .unwrap_or(false)
}

fn any_held(key_frame: &HashMap<KeyCode, u64>, keys: &[KeyCode], frame: u64) -> bool {
    keys.iter().any(|k| is_held(key_frame, k, frame))
}

/// Snapshot of the logical controls for this frame.
fn read_keys(key_frame: &HashMap<KeyCode, u64>, frame: u64) -> Keys {
    use KeyCode::*;
    Keys {
        left: any_held(key_frame, &[Left, Char('a'), Char('A')], frame),
        right: any_held(key_frame, &[Right, Char('d'), Char('D')], frame),
        jump: any_held(key_frame, &[Up, Char('w'), Char('W')], frame),
        attack: any_held(key_frame, &[Char(' ')], frame),
        ultimate: any_held(key_frame, &[Char('x'), Char('X')], frame),
        grenade: any_held(key_frame, &[Char('q'), Char('Q')], frame),
    }
}

// ── Logging ───────────────────────────────────────────────────────────────────

/// Log to a file: the terminal belongs to the game while it runs.
fn init_logging() {
    let path = std::env::temp_dir().join(LOG_FILE);
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    match File::create(&path) {
        Ok(file) => {
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
        Err(_) => {
            // No log file; stay quiet rather than scribble over the screen.
            builder.filter_level(log::LevelFilter::Off);
        }
    }
    builder.init();
    log::info!("Logging to {}", path.display());
}

fn tuning_path() -> PathBuf {
    std::env::var_os(TUNING_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_TUNING_FILE))
}

// ── Audio ─────────────────────────────────────────────────────────────────────

/// The terminal's only sound is the bell, saved for explosions.
struct TerminalAudio<W: Write> {
    out: W,
    track: Option<TrackId>,
}

impl<W: Write> AudioSink for TerminalAudio<W> {
    fn play_effect(&mut self, sound: SoundId) {
        log::trace!("Sound {:?}", sound);
        if sound == SoundId::Explosion {
            let _ = self.out.write_all(b"\x07").and_then(|_| self.out.flush());
        }
    }

    fn play_track(&mut self, track: TrackId) {
        if self.track != Some(track) {
            log::debug!("Starting track {:?}", track);
            self.track = Some(track);
        }
    }

    fn stop_track(&mut self) {
        if let Some(track) = self.track.take() {
            log::debug!("Stopping track {:?}", track);
        }
    }
}

// ── Menu ──────────────────────────────────────────────────────────────────────

enum MenuResult {
    Start,
    Quit,
}

fn show_menu<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    best_kills: u32,
) -> std::io::Result<MenuResult> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    let (width, height) = terminal::size()?;
    let cx = width / 2;
    let cy = height / 2;

    let title = "⚔  ARENA  SURVIVAL  ⚔";
    out.queue(cursor::MoveTo(
        cx.saturating_sub(title.chars().count() as u16 / 2),
        cy.saturating_sub(7),
    ))?;
    out.queue(style::SetForegroundColor(Color::Cyan))?;
    out.queue(Print(title))?;

    if best_kills > 0 {
        let best = format!("Best run: {} kills", best_kills);
        out.queue(cursor::MoveTo(
            cx.saturating_sub(best.chars().count() as u16 / 2),
            cy.saturating_sub(6),
        ))?;
        out.queue(style::SetForegroundColor(Color::Yellow))?;
        out.queue(Print(&best))?;
    }

    let left = cx.saturating_sub(18);
    let rows: &[(&str, Color, &str)] = &[
        ("SPACE", Color::White, "Slash whatever is in reach"),
        ("X    ", Color::Cyan, "Ultimate wave (full mana)"),
        ("Q    ", Color::White, "Throw a grenade (costs mana)"),
        ("♦    ", Color::Cyan, "Mana potion"),
        ("♥    ", Color::Red, "Health potion"),
    ];
    for (i, (key, color, desc)) in rows.iter().enumerate() {
        out.queue(cursor::MoveTo(left, cy.saturating_sub(3) + i as u16))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(*key))?;
        out.queue(style::SetForegroundColor(Color::DarkGrey))?;
        out.queue(Print(format!("  {}", desc)))?;
    }

    out.queue(cursor::MoveTo(left, cy + 4))?;
    out.queue(style::SetForegroundColor(Color::Green))?;
    out.queue(Print("[ENTER] Fight    [ESC] Quit"))?;

    out.queue(style::ResetColor)?;
    out.flush()?;

    // Block until the user makes a choice
    loop {
        match rx.recv() {
            Ok(Event::Key(KeyEvent { code, kind: KeyEventKind::Press, modifiers, .. })) => {
                match code {
                    KeyCode::Enter | KeyCode::Char(' ') => return Ok(MenuResult::Start),
                    KeyCode::Esc => return Ok(MenuResult::Quit),
                    KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                        return Ok(MenuResult::Quit);
                    }
                    _ => {}
                }
            }
            Ok(_) => {}
            Err(_) => return Ok(MenuResult::Quit),
        }
    }
}

// ── Game loop ─────────────────────────────────────────────────────────────────

enum LoopExit {
    Quit,
    Menu,
}

/// Runs one session until the player quits or asks for the menu.
///
/// Input model: instead of acting on each key event individually, we keep a
/// `key_frame` map with the frame number of the last press/repeat event for
/// every key. Each frame the keys that are still "fresh" become one `Keys`
/// snapshot for the simulation, so Space + A/D + W can all be held at once.
/// Terminals with keyboard enhancement also send releases, which remove the
/// key immediately.
fn game_loop<W: Write, A: AudioSink>(
    out: &mut W,
    state: &mut GameState,
    audio: &mut A,
    rx: &mpsc::Receiver<Event>,
) -> std::io::Result<LoopExit> {
    let mut rng = thread_rng();
    let mut sprites = SpriteCache::new();
    let frame_time = Duration::from_secs(1) / state.tuning.world.tick_rate.max(1);

    let mut key_frame: HashMap<KeyCode, u64> = HashMap::new();
    let mut frame: u64 = 0;
    let mut paused = false;

    audio.play_track(TrackId::Soundtrack);

    loop {
        let frame_start = Instant::now();
        frame += 1;

        // ── Drain all pending input events (non-blocking) ─────────────────────
        while let Ok(ev) = rx.try_recv() {
            let Event::Key(KeyEvent { code, kind, modifiers, .. }) = ev else {
                continue;
            };
            match kind {
                KeyEventKind::Press => {
                    key_frame.insert(code, frame);
                    match code {
                        KeyCode::Esc => return Ok(LoopExit::Quit),
                        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                            return Ok(LoopExit::Quit);
                        }
                        KeyCode::Char('p') | KeyCode::Char('P')
                            if state.status == GameStatus::Playing =>
                        {
                            paused = !paused;
                            log::debug!("Paused: {}", paused);
                        }
                        KeyCode::Char('r') | KeyCode::Char('R')
                            if state.status == GameStatus::GameOver =>
                        {
                            restart(state);
                            sprites.clear();
                            key_frame.clear();
                            audio.play_track(TrackId::Soundtrack);
                        }
                        KeyCode::Char('m') | KeyCode::Char('M')
                            if state.status == GameStatus::GameOver =>
                        {
                            return Ok(LoopExit::Menu);
                        }
                        _ => {}
                    }
                }
                KeyEventKind::Repeat => {
                    key_frame.insert(code, frame);
                }
                KeyEventKind::Release => {
                    key_frame.remove(&code);
                }
            }
        }

        if state.status == GameStatus::Playing && !paused {
            let keys = read_keys(&key_frame, frame);
            tick(state, &keys, &mut rng);
            for sound in state.drain_sounds() {
                audio.play_effect(sound);
            }
            if state.status == GameStatus::GameOver {
                audio.stop_track();
            }
        }

        display::render(out, state, &mut sprites, paused)?;

        let elapsed = frame_start.elapsed();
        if elapsed < frame_time {
            std::thread::sleep(frame_time - elapsed);
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> std::io::Result<()> {
    init_logging();
    let tuning = Tuning::load_or_default(&tuning_path());

    let raw_out = stdout();
    let mut out = BufWriter::new(raw_out);

    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Request key-release (and key-repeat) events from the terminal.
    // Kitty-protocol terminals support this; others fall back to HOLD_WINDOW.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();
    log::debug!("Keyboard enhancement: {}", keyboard_enhanced);

    // Dedicate a thread to blocking event reads so the frame loop never
    // waits on input.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || loop {
        match event::read() {
            Ok(ev) => {
                if tx.send(ev).is_err() {
                    break; // receiver dropped → program exiting
                }
            }
            Err(e) => {
                log::error!("Input thread stopped: {}", e);
                break;
            }
        }
    });

    let mut audio = TerminalAudio { out: stdout(), track: None };
    let result = run(&mut out, &mut audio, &rx, tuning);

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    if let Err(e) = &result {
        log::error!("Exiting on terminal error: {}", e);
    }
    result
}

fn run<W: Write, A: AudioSink>(
    out: &mut W,
    audio: &mut A,
    rx: &mpsc::Receiver<Event>,
    tuning: Tuning,
) -> std::io::Result<()> {
    let mut best_kills = 0;

    loop {
        match show_menu(out, rx, best_kills)? {
            MenuResult::Quit => break,
            MenuResult::Start => {
                let mut state = init_state(tuning);
                log::info!("New run started");
                let exit = game_loop(out, &mut state, audio, rx)?;
                audio.stop_track();
                best_kills = best_kills.max(state.kills);

                if let LoopExit::Quit = exit {
                    break;
                }
            }
        }
    }
    Ok(())
}
