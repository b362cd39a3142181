use crossterm::{
    cursor,
    event::{self, Event, KeyCode},
    execute, terminal,
};
use std::io::{self, stdout};
use std::thread;
use std::time::Duration;

use screamy_bird::mic::Microphone;
use screamy_bird::render::{self, PixelBuf, SpriteSlot};
use screamy_bird::sound;
use screamy_bird::ticker::Ticker;
use screamy_bird::world::{Phase, World};

/// Fixed simulation cadence: 60 ticks per second.
const TICK: Duration = Duration::from_nanos(1_000_000_000 / 60);

fn main() -> io::Result<()> {
    // Acquire collaborators before the alternate screen opens so any startup
    // notice lands on a readable stderr. All of them degrade: no microphone
    // means the bird only falls, no speaker means silence, and the sprite
    // keeps decoding in the background while a rectangle stands in.
    let mic = match Microphone::open() {
        Ok(mic) => mic,
        Err(err) => {
            eprintln!("microphone unavailable ({err}); the bird will only fall");
            Microphone::disabled()
        }
    };
    let sprite = SpriteSlot::load("berd.png");
    let audio_out = rodio::OutputStreamBuilder::open_default_stream().ok();

    terminal::enable_raw_mode()?;
    let mut out = stdout();
    execute!(
        out,
        terminal::EnterAlternateScreen,
        cursor::Hide,
        terminal::DisableLineWrap,
    )?;

    let cleanup = |out: &mut io::Stdout| -> io::Result<()> {
        execute!(
            out,
            terminal::LeaveAlternateScreen,
            cursor::Show,
            terminal::EnableLineWrap,
        )?;
        terminal::disable_raw_mode()
    };

    let (cols, rows) = terminal::size()?;
    let mut buf = PixelBuf::new(cols as usize, rows as usize * 2);

    let mut world = World::new();
    let mut rng = rand::thread_rng();
    let mut ticker = Ticker::new(TICK);
    let mut redraw = true;

    loop {
        // Input
        while event::poll(Duration::ZERO)? {
            match event::read()? {
                Event::Key(key) => match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => {
                        cleanup(&mut out)?;
                        return Ok(());
                    }
                    KeyCode::Char(' ') | KeyCode::Enter => {
                        // Start and restart share the same full reset.
                        if world.phase != Phase::Running {
                            world.reset();
                            ticker.rearm();
                        }
                    }
                    _ => {}
                },
                Event::Resize(c, r) => {
                    buf.resize(c as usize, r as usize * 2);
                    redraw = true;
                }
                _ => {}
            }
        }

        if world.phase == Phase::Running {
            if ticker.due() {
                let scored_before = world.score;
                world.step(mic.loudness(), &mut rng);

                if let Some(stream) = &audio_out {
                    if world.score > scored_before {
                        sound::play_score(stream.mixer());
                    }
                    if world.phase == Phase::GameOver {
                        sound::play_death(stream.mixer());
                    }
                }

                render::draw(&world, &sprite, mic.ready(), &mut buf);
                buf.render(&mut out)?;
            } else {
                thread::sleep(ticker.until_due());
            }
        } else {
            // Idle and game-over screens run no physics; they redraw on
            // demand and keep polling for a start request.
            if redraw {
                render::draw(&world, &sprite, mic.ready(), &mut buf);
                buf.render(&mut out)?;
                redraw = false;
            }
            thread::sleep(Duration::from_millis(33));
        }
    }
}
