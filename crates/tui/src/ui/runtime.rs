//! Runtime: unified event loop and input routing for the TUI.
//!
//! Responsibilities
//! - Own the terminal lifecycle (enter/leave alternate screen, raw mode).
//! - Drive a single event loop that handles input, ticks and finished
//!   backend calls.
//! - Route keys to the focused component and execute returned `Effect`s.
//!
//! Ticking strategy: a fast interval (100 ms) while calls are in flight or
//! effects are queued, a slow one (5 s) when idle. Effects collected between
//! ticks are executed on the next tick.
//!
//! Entry Point
//! - `run_app(ctx)` is called from `lib::run` and performs setup, event
//!   processing, and teardown.
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::MouseEventKind;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event, EventStream, KeyCode, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures_util::{Stream, StreamExt, stream::FuturesUnordered};
use ratatui::{Terminal, prelude::*};
use simctl_types::{Effect, ExecOutcome, Msg};
use tokio::task::JoinHandle;
use tokio::{
    signal,
    sync::mpsc,
    time::{self, MissedTickBehavior},
};
use tracing::{info, warn};

use crate::app::{App, SharedCtx};
use crate::cmd;
use crate::ui::components::component::Component;
use crate::ui::main_component::MainView;

/// Passes every event except mouse moves arriving within `interval` of the
/// previously forwarded one.
#[derive(Debug)]
struct MouseMoveThrottle {
    interval: Duration,
    last_move: Option<Instant>,
}

impl MouseMoveThrottle {
    fn new(interval: Duration) -> Self {
        Self { interval, last_move: None }
    }

    fn admit(&mut self, event: &Event, now: Instant) -> bool {
        let is_mouse_move = event.as_mouse_event().is_some_and(|e| e.kind == MouseEventKind::Moved);
        if !is_mouse_move {
            return true;
        }
        if self.last_move.is_some_and(|last| now.duration_since(last) < self.interval) {
            return false;
        }
        self.last_move = Some(now);
        true
    }
}

/// Forward terminal events from `events` over a Tokio channel. The task ends
/// when the stream fails or the receiver is dropped.
fn spawn_input_task<S>(mut events: S) -> mpsc::Receiver<Event>
where
    S: Stream<Item = std::io::Result<Event>> + Unpin + Send + 'static,
{
    let (sender, receiver) = mpsc::channel(500);

    tokio::spawn(async move {
        let mut throttle = MouseMoveThrottle::new(Duration::from_millis(16));
        while let Some(next) = events.next().await {
            let event = match next {
                Ok(event) => event,
                Err(e) => {
                    warn!("Failed to read event: {}", e);
                    break;
                }
            };
            if throttle.admit(&event, Instant::now())
                && let Err(e) = sender.send(event).await
            {
                warn!("Failed to send event: {}", e);
                break;
            }
        }
    });
    receiver
}

/// Put the terminal into raw mode and enter the alternate screen.
fn setup_terminal() -> Result<Terminal<CrosstermBackend<std::io::Stdout>>> {
    enable_raw_mode().context("enabling raw mode")?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore terminal settings and leave the alternate screen.
fn cleanup_terminal(terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;
    Ok(())
}

fn render(terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>, app: &mut App, main_view: &mut MainView) -> Result<()> {
    terminal.draw(|frame| main_view.render(frame, frame.area(), app))?;
    Ok(())
}

fn handle_input_event(app: &mut App, main_view: &mut MainView, input_event: Event) -> Vec<Effect> {
    match input_event {
        Event::Key(key_event) => main_view.handle_key_events(app, key_event),
        Event::Mouse(mouse_event) => main_view.handle_mouse_events(app, mouse_event),
        Event::Resize(width, height) => main_view.handle_message(app, Msg::Resize(width, height)),
        Event::FocusGained | Event::FocusLost | Event::Paste(_) => Vec::new(),
    }
}

/// Entry point for the TUI runtime: sets up the terminal, spawns the event
/// producer, runs the async event loop, and performs cleanup on exit.
pub async fn run_app(ctx: SharedCtx) -> Result<()> {
    let mut input_receiver = spawn_input_task(EventStream::new());
    let mut app = App::new(ctx);
    let mut main_view = MainView::new();
    let mut terminal = setup_terminal()?;

    let mut pending_execs: FuturesUnordered<JoinHandle<ExecOutcome>> = FuturesUnordered::new();
    let mut effects: Vec<Effect> = Vec::with_capacity(5);
    // Enter the start screen through the usual navigation path so its data loads.
    effects.push(Effect::SwitchTo(app.route));
    info!(route = ?app.route, "console started");

    let fast_interval = Duration::from_millis(100);
    let idle_interval = Duration::from_millis(5000);
    let mut current_interval = fast_interval;
    let mut ticker = time::interval(current_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    // Track the last known terminal size to synthesize Resize messages when
    // some terminals fail to emit them reliably.
    let mut last_size: Option<(u16, u16)> = crossterm::terminal::size().ok();

    loop {
        let needs_animation = app.executing || !effects.is_empty();
        let target_interval = if needs_animation { fast_interval } else { idle_interval };
        if target_interval != current_interval {
            current_interval = target_interval;
            ticker = time::interval(current_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        }
        let mut needs_render = tokio::select! {
            maybe_event = input_receiver.recv() => {
                let Some(event) = maybe_event else {
                    // Input channel closed; shut down cleanly.
                    break;
                };
                if let Event::Key(key_event) = event
                    && key_event.code == KeyCode::Char('c') && key_event.modifiers.contains(KeyModifiers::CONTROL) {
                        break;
                    }
                effects.extend(handle_input_event(&mut app, &mut main_view, event));
                true
            }

            _ = ticker.tick() => {
                effects.extend(main_view.handle_message(&mut app, Msg::Tick));
                let redraw = needs_animation || !effects.is_empty();
                if !effects.is_empty() {
                    // move effects out of their Vec to avoid processing new effects while processing current ones
                    let mut effects_to_process = Vec::with_capacity(effects.len());
                    effects_to_process.append(&mut effects);

                    handle_navigation_effects(&mut app, &mut main_view, &mut effects_to_process, &mut effects);
                    process_effects(&mut app, &mut main_view, effects_to_process, &mut pending_execs, &mut effects);
                }
                redraw
            }

            Some(joined) = pending_execs.next(), if !pending_execs.is_empty() => {
                let outcome = joined.unwrap_or_else(|error| ExecOutcome::Log(format!("Execution task failed: {error}")));
                effects.extend(main_view.handle_message(&mut app, Msg::ExecCompleted(Box::new(outcome))));
                app.executing = !pending_execs.is_empty();
                if !app.executing {
                    app.throbber_idx = 0;
                }
                true
            }

            _ = signal::ctrl_c() => { break; }
        };

        // Fallback: detect terminal size changes even if no explicit Resize
        // event was received.
        if let Ok((w, h)) = crossterm::terminal::size()
            && last_size != Some((w, h))
        {
            last_size = Some((w, h));
            effects.extend(main_view.handle_message(&mut app, Msg::Resize(w, h)));
            needs_render = true;
        }

        if needs_render {
            render(&mut terminal, &mut app, &mut main_view)?;
        }
    }

    cleanup_terminal(&mut terminal)?;
    info!("console stopped");
    Ok(())
}

/// Apply `SwitchTo`, `ShowModal` and `CloseModal`, leaving the other effects
/// in `effects`. Effects produced by the enter/exit hooks are queued.
fn handle_navigation_effects(app: &mut App, main_view: &mut MainView, effects: &mut Vec<Effect>, queued_effects: &mut Vec<Effect>) {
    let navigation_effects = effects
        .extract_if(.., |effect| {
            matches!(effect, Effect::SwitchTo(_) | Effect::ShowModal(_) | Effect::CloseModal)
        })
        .collect::<Vec<Effect>>();

    for effect in navigation_effects {
        match effect {
            Effect::SwitchTo(route) => {
                if let Some(mut view) = main_view.content_view.take() {
                    queued_effects.extend(view.on_route_exit(app));
                }
                main_view.set_current_route(app, route);
                if let Some(view) = main_view.content_view.as_mut() {
                    queued_effects.extend(view.on_route_enter(app));
                }
            }
            Effect::ShowModal(modal) => {
                if let Some((mut view, _)) = main_view.modal_view.take() {
                    queued_effects.extend(view.on_route_exit(app));
                }
                main_view.set_open_modal_kind(app, Some(modal));
                if let Some((view, _)) = main_view.modal_view.as_mut() {
                    queued_effects.extend(view.on_route_enter(app));
                }
            }
            Effect::CloseModal => {
                if let Some((mut view, _)) = main_view.modal_view.take() {
                    queued_effects.extend(view.on_route_exit(app));
                }
                main_view.set_open_modal_kind(app, None);
            }
            _ => {}
        }
    }
}

fn process_effects(
    app: &mut App,
    main_view: &mut MainView,
    effects: Vec<Effect>,
    pending_execs: &mut FuturesUnordered<JoinHandle<ExecOutcome>>,
    effects_out: &mut Vec<Effect>,
) {
    if effects.is_empty() {
        return;
    }

    let command_batch = cmd::run_from_effects(app, effects);
    if !command_batch.pending.is_empty() {
        if !app.executing {
            app.throbber_idx = 0;
        }
        pending_execs.extend(command_batch.pending);
        app.executing = true;
    }

    for outcome in command_batch.immediate {
        effects_out.extend(main_view.handle_message(app, Msg::ExecCompleted(Box::new(outcome))));
    }
    app.executing = !pending_execs.is_empty();
}
