use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CtEvent, KeyEvent, KeyEventKind};
use log::debug;

/// What the game loop reacts to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    Key(KeyEvent),
    Resize,
    /// The terminal window lost focus; the host pauses.
    FocusLost,
    /// A frame passed carrying this much game time.
    Tick(Duration),
}

/// Input feeding the loop. `None` means nothing arrived within `timeout`.
pub trait GameEventSource: Send + 'static {
    fn poll(&self, timeout: Duration) -> Option<GameEvent>;
}

/// Map a terminal event to a game event. Key releases and mouse input are dropped.
pub fn translate(ev: CtEvent) -> Option<GameEvent> {
    match ev {
        CtEvent::Key(key) if key.kind != KeyEventKind::Release => Some(GameEvent::Key(key)),
        CtEvent::Resize(_, _) => Some(GameEvent::Resize),
        CtEvent::FocusLost => Some(GameEvent::FocusLost),
        _ => None,
    }
}

fn poll_channel(rx: &Receiver<GameEvent>, timeout: Duration) -> Option<GameEvent> {
    match rx.recv_timeout(timeout) {
        Ok(ev) => Some(ev),
        Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
    }
}

/// Terminal input read on its own thread, so a frame never waits on a blocking read.
pub struct CrosstermEventSource {
    rx: Receiver<GameEvent>,
}

impl CrosstermEventSource {
    pub fn spawn() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            let ev = match event::read() {
                Ok(ev) => ev,
                Err(e) => {
                    debug!("terminal reader stopped: {}", e);
                    break;
                }
            };
            let Some(ev) = translate(ev) else { continue };
            if tx.send(ev).is_err() {
                break;
            }
        });

        Self { rx }
    }
}

impl GameEventSource for CrosstermEventSource {
    fn poll(&self, timeout: Duration) -> Option<GameEvent> {
        poll_channel(&self.rx, timeout)
    }
}

/// Scripted input for headless play.
pub struct ChannelEvents {
    rx: Receiver<GameEvent>,
}

impl ChannelEvents {
    pub fn channel() -> (Sender<GameEvent>, Self) {
        let (tx, rx) = mpsc::channel();
        (tx, Self { rx })
    }
}

impl GameEventSource for ChannelEvents {
    fn poll(&self, timeout: Duration) -> Option<GameEvent> {
        poll_channel(&self.rx, timeout)
    }
}

/// Decides how long a frame waits for input and how much game time a tick carries.
pub trait FrameClock: Send + 'static {
    fn frame(&self) -> Duration;
    /// Game time since the previous lap.
    fn lap(&mut self) -> Duration;
}

/// Real time. Time spent handling keys between ticks still reaches the game.
pub struct WallClock {
    frame: Duration,
    last: Instant,
}

impl WallClock {
    pub fn new(frame: Duration) -> Self {
        Self {
            frame,
            last: Instant::now(),
        }
    }
}

impl Default for WallClock {
    /// Fast enough for the 500ms card holds to feel snappy.
    fn default() -> Self {
        Self::new(Duration::from_millis(100))
    }
}

impl FrameClock for WallClock {
    fn frame(&self) -> Duration {
        self.frame
    }

    fn lap(&mut self) -> Duration {
        let now = Instant::now();
        let dt = now - self.last;
        self.last = now;
        dt
    }
}

/// Every tick carries the same game time however long the frame really took.
#[derive(Clone, Copy, Debug)]
pub struct SteppedClock {
    frame: Duration,
    step: Duration,
}

impl SteppedClock {
    pub fn new(frame: Duration, step: Duration) -> Self {
        Self { frame, step }
    }
}

impl FrameClock for SteppedClock {
    fn frame(&self) -> Duration {
        self.frame
    }

    fn lap(&mut self) -> Duration {
        self.step
    }
}

/// Pulls the next thing for the game loop to handle.
pub struct Runner<E: GameEventSource, C: FrameClock> {
    events: E,
    clock: C,
}

impl<E: GameEventSource, C: FrameClock> Runner<E, C> {
    pub fn new(events: E, clock: C) -> Self {
        Self { events, clock }
    }

    /// Waits at most one frame. Quiet frames, and a closed source, become ticks.
    pub fn step(&mut self) -> GameEvent {
        match self.events.poll(self.clock.frame()) {
            Some(ev) => ev,
            None => GameEvent::Tick(self.clock.lap()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEventState, KeyModifiers};

    fn stepped() -> SteppedClock {
        SteppedClock::new(Duration::from_millis(1), Duration::from_millis(100))
    }

    #[test]
    fn quiet_frame_ticks_with_game_time() {
        let (_tx, events) = ChannelEvents::channel();
        let mut runner = Runner::new(events, stepped());

        assert_eq!(runner.step(), GameEvent::Tick(Duration::from_millis(100)));
    }

    #[test]
    fn queued_input_comes_before_ticks() {
        let (tx, events) = ChannelEvents::channel();
        let key = KeyEvent::new(KeyCode::Char('h'), KeyModifiers::NONE);
        tx.send(GameEvent::Key(key)).unwrap();
        tx.send(GameEvent::FocusLost).unwrap();
        let mut runner = Runner::new(events, stepped());

        assert_eq!(runner.step(), GameEvent::Key(key));
        assert_eq!(runner.step(), GameEvent::FocusLost);
        assert!(matches!(runner.step(), GameEvent::Tick(_)));
    }

    #[test]
    fn closed_source_keeps_ticking() {
        let (tx, events) = ChannelEvents::channel();
        drop(tx);
        let mut runner = Runner::new(events, stepped());

        assert!(matches!(runner.step(), GameEvent::Tick(_)));
        assert!(matches!(runner.step(), GameEvent::Tick(_)));
    }

    #[test]
    fn wall_clock_laps_are_disjoint() {
        let mut clock = WallClock::default();
        std::thread::sleep(Duration::from_millis(20));
        let first = clock.lap();
        let second = clock.lap();

        assert!(first >= Duration::from_millis(20));
        assert!(second < first);
        assert_eq!(clock.frame(), Duration::from_millis(100));
    }

    #[test]
    fn translate_keeps_presses_and_focus_loss() {
        let press = KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE);
        let release = KeyEvent {
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
            ..press
        };

        assert_eq!(translate(CtEvent::Key(press)), Some(GameEvent::Key(press)));
        assert_eq!(translate(CtEvent::Key(release)), None);
        assert_eq!(translate(CtEvent::Resize(80, 24)), Some(GameEvent::Resize));
        assert_eq!(translate(CtEvent::FocusLost), Some(GameEvent::FocusLost));
        assert_eq!(translate(CtEvent::FocusGained), None);
    }
}
