//! Terminal plumbing and tick pacing shared by the interactive modes

use anyhow::{Context, Result};
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::{Frame, Terminal, backend::CrosstermBackend};
use std::io::{Stderr, stderr};
use std::time::Duration;
use tokio::time::{Interval, MissedTickBehavior, interval};

use crate::input::{InputHandler, KeyAction};

pub type Term = Terminal<CrosstermBackend<Stderr>>;

/// Frame period of the renderer (about 30 FPS)
pub const RENDER_INTERVAL: Duration = Duration::from_millis(33);

/// Step applied by the speed keys
const SPEED_STEP_MS: u64 = 10;

/// Milliseconds between game ticks, adjustable at runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickInterval {
    millis: u64,
}

impl TickInterval {
    pub fn new(millis: u64) -> Self {
        Self {
            millis: millis.max(1),
        }
    }

    pub fn millis(&self) -> u64 {
        self.millis
    }

    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.millis)
    }

    /// Lengthen the interval by one step
    pub fn slow_down(&mut self) {
        self.millis += SPEED_STEP_MS;
    }

    /// Shorten the interval by one step, bottoming out at 1 ms
    pub fn speed_up(&mut self) {
        if self.millis > SPEED_STEP_MS {
            self.millis -= SPEED_STEP_MS;
        } else {
            self.millis = 1;
        }
    }

    /// A tokio timer ticking at this interval
    pub fn timer(&self) -> Interval {
        let mut timer = interval(self.duration());
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        timer
    }
}

/// Speed, pause and quit state common to every interactive mode
#[derive(Debug, Clone)]
pub struct Controls {
    pub tick: TickInterval,
    pub paused: bool,
    pub should_quit: bool,
}

impl Controls {
    pub fn new(tick_ms: u64) -> Self {
        Self {
            tick: TickInterval::new(tick_ms),
            paused: false,
            should_quit: false,
        }
    }

    /// Apply the keys every mode shares. Mode-specific keys are handed back.
    pub fn apply(&mut self, action: KeyAction) -> Option<KeyAction> {
        match action {
            KeyAction::SpeedUp => self.tick.speed_up(),
            KeyAction::SlowDown => self.tick.slow_down(),
            KeyAction::Pause => self.paused = !self.paused,
            KeyAction::Quit => self.should_quit = true,
            KeyAction::None => {}
            other => return Some(other),
        }
        None
    }
}

/// A mode driven by [`run_event_loop`]
pub trait TuiApp {
    fn controls(&mut self) -> &mut Controls;

    /// A key the shared controls handed back
    fn on_key(&mut self, _action: KeyAction) {}

    /// One game tick; skipped while paused
    fn on_tick(&mut self);

    fn draw(&mut self, frame: &mut Frame);
}

/// Feed key presses through the shared controls, then to the app
pub fn dispatch_event<A: TuiApp + ?Sized>(app: &mut A, input: &InputHandler, event: Event) {
    let Event::Key(key) = event else {
        return;
    };
    if key.kind != KeyEventKind::Press {
        return;
    }

    let action = input.handle_key_event(key);
    if let Some(action) = app.controls().apply(action) {
        app.on_key(action);
    }
}

/// Drive `app` until it asks to quit or Ctrl-C arrives.
///
/// Keys, game ticks, frames and Ctrl-C are multiplexed on one task. The tick
/// timer is rebuilt whenever the speed keys change the interval.
pub async fn run_event_loop<A: TuiApp>(app: &mut A, terminal: &mut Term) -> Result<()> {
    let input = InputHandler::new();
    let mut event_stream = EventStream::new();
    let mut tick_timer = app.controls().tick.timer();
    let mut render_timer = interval(RENDER_INTERVAL);

    loop {
        tokio::select! {
            maybe_event = event_stream.next() => {
                if let Some(Ok(event)) = maybe_event {
                    let before = app.controls().tick;
                    dispatch_event(app, &input, event);
                    if app.controls().tick != before {
                        tick_timer = app.controls().tick.timer();
                    }
                }
            }

            _ = tick_timer.tick() => {
                if !app.controls().paused {
                    app.on_tick();
                }
            }

            _ = render_timer.tick() => {
                terminal.draw(|frame| app.draw(frame)).context("Failed to draw frame")?;
            }

            _ = tokio::signal::ctrl_c() => {
                app.controls().should_quit = true;
            }
        }

        if app.controls().should_quit {
            return Ok(());
        }
    }
}

pub fn setup_terminal() -> Result<Term> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stderr = stderr();
    execute!(stderr, EnterAlternateScreen).context("Failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stderr);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
    terminal.hide_cursor().context("Failed to hide cursor")?;
    terminal.clear().context("Failed to clear terminal")?;
    Ok(terminal)
}

pub fn restore_terminal(terminal: &mut Term) -> Result<()> {
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to show cursor")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Direction;

    #[test]
    fn test_slow_down_adds_ten() {
        let mut tick = TickInterval::new(50);
        tick.slow_down();
        assert_eq!(tick.millis(), 60);
    }

    #[test]
    fn test_speed_up_floors_at_one() {
        let mut tick = TickInterval::new(25);
        tick.speed_up();
        assert_eq!(tick.millis(), 15);
        tick.speed_up();
        assert_eq!(tick.millis(), 5);
        tick.speed_up();
        assert_eq!(tick.millis(), 1);
        tick.speed_up();
        assert_eq!(tick.millis(), 1);

        // Exactly one step falls to the floor rather than zero
        let mut tick = TickInterval::new(10);
        tick.speed_up();
        assert_eq!(tick.millis(), 1);
    }

    #[test]
    fn test_controls_consume_shared_keys() {
        let mut controls = Controls::new(50);

        assert_eq!(controls.apply(KeyAction::SlowDown), None);
        assert_eq!(controls.tick.millis(), 60);
        assert_eq!(controls.apply(KeyAction::SpeedUp), None);
        assert_eq!(controls.tick.millis(), 50);

        assert_eq!(controls.apply(KeyAction::Pause), None);
        assert!(controls.paused);
        controls.apply(KeyAction::Pause);
        assert!(!controls.paused);

        let steer = KeyAction::Steer(Direction::Up);
        assert_eq!(controls.apply(steer), Some(steer));
        assert_eq!(controls.apply(KeyAction::Restart), Some(KeyAction::Restart));
        assert!(!controls.should_quit);

        controls.apply(KeyAction::Quit);
        assert!(controls.should_quit);
    }

    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    struct Recorder {
        controls: Controls,
        keys: Vec<KeyAction>,
    }

    impl TuiApp for Recorder {
        fn controls(&mut self) -> &mut Controls {
            &mut self.controls
        }

        fn on_key(&mut self, action: KeyAction) {
            self.keys.push(action);
        }

        fn on_tick(&mut self) {}

        fn draw(&mut self, _frame: &mut Frame) {}
    }

    fn key(code: KeyCode, kind: KeyEventKind) -> Event {
        Event::Key(KeyEvent::new_with_kind(code, KeyModifiers::NONE, kind))
    }

    #[test]
    fn test_dispatch_routes_mode_keys() {
        let input = InputHandler::new();
        let mut app = Recorder {
            controls: Controls::new(50),
            keys: Vec::new(),
        };

        dispatch_event(&mut app, &input, key(KeyCode::Char('-'), KeyEventKind::Press));
        dispatch_event(&mut app, &input, key(KeyCode::Up, KeyEventKind::Press));
        dispatch_event(&mut app, &input, key(KeyCode::Char('r'), KeyEventKind::Press));
        // Releases and non-key events are ignored
        dispatch_event(&mut app, &input, key(KeyCode::Down, KeyEventKind::Release));
        dispatch_event(&mut app, &input, Event::FocusLost);

        assert_eq!(app.controls.tick.millis(), 60);
        assert_eq!(
            app.keys,
            vec![KeyAction::Steer(Direction::Up), KeyAction::Restart]
        );

        dispatch_event(&mut app, &input, key(KeyCode::Char('q'), KeyEventKind::Press));
        assert!(app.controls.should_quit);
        assert_eq!(app.keys.len(), 2);
    }

    #[test]
    fn test_zero_is_clamped() {
        assert_eq!(TickInterval::new(0).millis(), 1);
        assert_eq!(TickInterval::new(150).duration(), Duration::from_millis(150));
    }
}
