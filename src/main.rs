pub mod config;
pub mod field;
pub mod game;
pub mod runtime;
pub mod scoreboard;
pub mod timer;
pub mod ui;

use crate::{
    config::{Config, ConfigError, ConfigStore, FileConfigStore, RoundConfig},
    field::SlotId,
    game::Game,
    runtime::{CrosstermEventSource, EventSource, FixedTicker, GameEvent, Runner, Ticker},
};
use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    time::{Duration, Instant},
};
use webbrowser::Browser;

/// Event-loop cadence; matches the scoreboard's countdown check resolution
/// so deadlines are observed within one check interval.
const TICK_RATE: Duration = scoreboard::CHECK_INTERVAL;

/// terminal whack-a-mole with timed rounds and a twitchy target grid
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A terminal whack-a-mole: moles pop up on a grid of digit keys, whack them before the round clock runs out. Settings persist between runs."
)]
pub struct Cli {
    /// round length in seconds
    #[clap(short = 's', long, value_parser = clap::value_parser!(u64).range(1..))]
    secs: Option<u64>,

    /// how many of the nine digit-key slots are in play
    #[clap(short = 't', long, value_parser = clap::value_parser!(u8).range(1..=9))]
    targets: Option<u8>,

    /// how many moles are up at once (at most --targets)
    #[clap(short = 'm', long, value_parser = clap::value_parser!(u8).range(1..=9))]
    moles: Option<u8>,

    /// milliseconds between mole rotations
    #[clap(short = 'r', long, value_parser = clap::value_parser!(u64).range(1..))]
    rotation_ms: Option<u64>,
}

impl Cli {
    /// Saved settings are the baseline; any flag given overrides them.
    /// Cross-field validation (moles vs targets) happens here, after the
    /// merge, since either side can come from either source.
    fn round_config(&self, saved: &Config) -> Result<RoundConfig, ConfigError> {
        RoundConfig::new(
            Duration::from_secs(self.secs.unwrap_or(saved.round_secs)),
            self.targets.map(usize::from).unwrap_or(saved.target_count),
            self.moles.map(usize::from).unwrap_or(saved.concurrency),
            Duration::from_millis(self.rotation_ms.unwrap_or(saved.rotation_ms)),
        )
    }
}

#[derive(Debug)]
pub struct App {
    pub game: Game,
}

impl App {
    pub fn new(game: Game) -> Self {
        Self { game }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let store = FileConfigStore::new();
    let round = match cli.round_config(&store.load()) {
        Ok(rc) => rc,
        Err(err) => {
            let mut cmd = Cli::command();
            cmd.error(ErrorKind::ValueValidation, err).exit();
        }
    };

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(Game::new(round));
    let runner = Runner::new(CrosstermEventSource::new(), FixedTicker::new(TICK_RATE));
    let result = run(&mut terminal, &mut app, &runner, &store);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run<B: Backend, E: EventSource, T: Ticker>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E, T>,
    store: &dyn ConfigStore,
) -> Result<(), Box<dyn Error>> {
    loop {
        terminal.draw(|f| f.render_widget(&*app, f.area()))?;

        match runner.step() {
            GameEvent::Tick => app.game.on_tick(Instant::now()),
            GameEvent::Resize => {}
            GameEvent::Key(key) => {
                if key.modifiers.contains(KeyModifiers::CONTROL)
                    && key.code == KeyCode::Char('c')
                {
                    break;
                }
                match key.code {
                    KeyCode::Esc => {
                        if app.game.is_running() {
                            // explicit abort; Esc again quits from the summary
                            app.game.stop();
                        } else {
                            break;
                        }
                    }
                    KeyCode::Char(' ') => app.game.start(Instant::now()),
                    KeyCode::Char('t') if app.game.game_over_visible() => {
                        share_score(&app.game);
                    }
                    KeyCode::Up | KeyCode::Down | KeyCode::Left | KeyCode::Right => {
                        if let Some(next) = adjusted_config(app.game.config(), key.code) {
                            if app.game.configure(next).is_ok() {
                                // best effort; a failed write never blocks play
                                let _ = store.save(&Config::from(&next));
                            }
                        }
                    }
                    code => {
                        if let Some(slot) = slot_from_key(code) {
                            app.game.whack(slot, Instant::now());
                        }
                    }
                }
            }
        }
    }

    Ok(())
}

/// Digit keys 1-9 are the target slots; anything else is not a whack.
fn slot_from_key(code: KeyCode) -> Option<SlotId> {
    match code {
        KeyCode::Char(c @ '1'..='9') => Some(c as usize - '0' as usize),
        _ => None,
    }
}

/// Idle-screen adjustments: Up/Down move round time in 5s steps, Left/Right
/// move the mole count. Anything the validator rejects is dropped.
fn adjusted_config(current: &RoundConfig, code: KeyCode) -> Option<RoundConfig> {
    let secs = current.duration.as_secs();
    let (secs, concurrency) = match code {
        KeyCode::Up => (secs + 5, current.concurrency),
        KeyCode::Down => (secs.checked_sub(5)?, current.concurrency),
        KeyCode::Right => (secs, current.concurrency + 1),
        KeyCode::Left => (secs, current.concurrency.checked_sub(1)?),
        _ => return None,
    };
    RoundConfig::new(
        Duration::from_secs(secs),
        current.target_count,
        concurrency,
        current.rotation_interval,
    )
    .ok()
}

fn share_score(game: &Game) {
    if Browser::is_available() {
        webbrowser::open(&format!(
            "https://twitter.com/intent/tweet?text={}%20moles%20whacked%20in%20{}s%20%2F%20{:.0}%25%20acc",
            game.score(),
            game.config().duration.as_secs(),
            game.stats().accuracy()
        ))
        .unwrap_or_default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::RoundState;
    use clap::Parser;

    fn default_round() -> RoundConfig {
        RoundConfig::default()
    }

    #[test]
    fn test_cli_no_flags_uses_saved_settings() {
        let cli = Cli::parse_from(["whak"]);

        assert_eq!(cli.secs, None);
        assert_eq!(cli.targets, None);
        assert_eq!(cli.moles, None);
        assert_eq!(cli.rotation_ms, None);

        let rc = cli.round_config(&Config::default()).unwrap();
        assert_eq!(rc, RoundConfig::default());
    }

    #[test]
    fn test_cli_flags_parse() {
        let cli = Cli::parse_from(["whak", "-s", "30", "-t", "6", "-m", "3", "-r", "750"]);

        assert_eq!(cli.secs, Some(30));
        assert_eq!(cli.targets, Some(6));
        assert_eq!(cli.moles, Some(3));
        assert_eq!(cli.rotation_ms, Some(750));

        let cli = Cli::parse_from([
            "whak",
            "--secs",
            "30",
            "--targets",
            "6",
            "--moles",
            "3",
            "--rotation-ms",
            "750",
        ]);
        assert_eq!(cli.secs, Some(30));
        assert_eq!(cli.rotation_ms, Some(750));
    }

    #[test]
    fn test_cli_flag_overrides_saved_setting() {
        let cli = Cli::parse_from(["whak", "-s", "30"]);
        let saved = Config {
            round_secs: 5,
            target_count: 6,
            concurrency: 2,
            rotation_ms: 500,
        };

        let rc = cli.round_config(&saved).unwrap();

        assert_eq!(rc.duration, Duration::from_secs(30));
        // Unflagged fields keep the saved values
        assert_eq!(rc.target_count, 6);
        assert_eq!(rc.concurrency, 2);
        assert_eq!(rc.rotation_interval, Duration::from_millis(500));
    }

    #[test]
    fn test_cli_rejects_out_of_range_values() {
        assert!(Cli::try_parse_from(["whak", "-s", "0"]).is_err());
        assert!(Cli::try_parse_from(["whak", "-t", "10"]).is_err());
        assert!(Cli::try_parse_from(["whak", "-m", "0"]).is_err());
        assert!(Cli::try_parse_from(["whak", "-r", "0"]).is_err());
    }

    #[test]
    fn test_cli_cross_field_check_happens_after_merge() {
        // Both in range on their own, but moles > targets
        let cli = Cli::parse_from(["whak", "-t", "3", "-m", "5"]);
        assert!(matches!(
            cli.round_config(&Config::default()),
            Err(ConfigError::ConcurrencyOutOfRange { .. })
        ));

        // Saved concurrency exceeding a flagged target count is caught too
        let cli = Cli::parse_from(["whak", "-t", "2"]);
        let saved = Config {
            concurrency: 4,
            ..Config::default()
        };
        assert!(cli.round_config(&saved).is_err());
    }

    #[test]
    fn test_slot_from_key_maps_digits() {
        assert_eq!(slot_from_key(KeyCode::Char('1')), Some(1));
        assert_eq!(slot_from_key(KeyCode::Char('9')), Some(9));
        assert_eq!(slot_from_key(KeyCode::Char('0')), None);
        assert_eq!(slot_from_key(KeyCode::Char('a')), None);
        assert_eq!(slot_from_key(KeyCode::Enter), None);
    }

    #[test]
    fn test_adjusted_config_round_time_steps() {
        let rc = default_round();

        let up = adjusted_config(&rc, KeyCode::Up).unwrap();
        assert_eq!(up.duration, Duration::from_secs(15));

        let down = adjusted_config(&rc, KeyCode::Down).unwrap();
        assert_eq!(down.duration, Duration::from_secs(5));

        // Stepping down to zero is rejected
        assert_eq!(adjusted_config(&down, KeyCode::Down), None);
    }

    #[test]
    fn test_adjusted_config_mole_count_steps() {
        let rc = default_round();

        let more = adjusted_config(&rc, KeyCode::Right).unwrap();
        assert_eq!(more.concurrency, 5);

        let fewer = adjusted_config(&rc, KeyCode::Left).unwrap();
        assert_eq!(fewer.concurrency, 3);

        // Cannot exceed the slots in play or drop below one mole
        let full = RoundConfig::new(rc.duration, 4, 4, rc.rotation_interval).unwrap();
        assert_eq!(adjusted_config(&full, KeyCode::Right), None);

        let single = RoundConfig::new(rc.duration, 4, 1, rc.rotation_interval).unwrap();
        assert_eq!(adjusted_config(&single, KeyCode::Left), None);
    }

    #[test]
    fn test_adjusted_config_ignores_other_keys() {
        assert_eq!(adjusted_config(&default_round(), KeyCode::Char('x')), None);
        assert_eq!(adjusted_config(&default_round(), KeyCode::Esc), None);
    }

    #[test]
    fn test_app_new_is_idle() {
        let app = App::new(Game::new(default_round()));

        assert_eq!(app.game.state(), RoundState::Idle);
        assert!(!app.game.game_over_visible());
        assert_eq!(app.game.score(), 0);
    }

    #[test]
    fn test_tick_rate_matches_countdown_check() {
        assert_eq!(TICK_RATE, scoreboard::CHECK_INTERVAL);
    }
}
