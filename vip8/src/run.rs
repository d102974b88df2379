use std::fs;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context};
use log::{error, info};
use sdl2::event::Event;
use sdl2::keyboard::Keycode;

use vip8_core::constants::TIMER_HZ;
use vip8_core::{Buzzer, FrameBuffer, Machine, Step};
use vip8_display::Display;

use crate::audio::{Beeper, Mute};
use crate::keymap::keymap;
use crate::Args;

/// The driver loop: two independent clocks against one machine.
///
/// Instructions dispatch at `args.speed` Hz and the timers tick at a
/// fixed 60 Hz, both paced off `Instant` deadlines on this thread. The
/// loop is stoppable between steps (window close or Escape) and halts on
/// the first fatal fault.
pub fn run(args: &Args) -> anyhow::Result<()> {
    let image = fs::read(&args.rom)
        .with_context(|| format!("failed to read program image {}", args.rom.display()))?;

    let sdl = sdl2::init().map_err(|e| anyhow!(e))?;
    let mut events = sdl.event_pump().map_err(|e| anyhow!(e))?;
    let mut display = Display::new(&sdl, args.scale.max(1)).map_err(|e| anyhow!(e))?;
    let mut buzzer: Box<dyn Buzzer> = if args.mute {
        Box::new(Mute)
    } else {
        Box::new(Beeper::new(&sdl).map_err(|e| anyhow!(e))?)
    };

    let mut machine = Machine::new();
    let mut frame = FrameBuffer::new();
    machine.load(&image, &mut frame)?;
    info!("loaded {} ({} bytes)", args.rom.display(), image.len());

    let cycle_period = Duration::from_secs(1) / args.speed.max(1);
    let tick_period = Duration::from_secs(1) / TIMER_HZ;
    let mut next_cycle = Instant::now();
    let mut next_tick = Instant::now();

    // The currently held key, updated from the event queue. The core
    // reads it as a single snapshot per key-dependent instruction.
    let mut held_key: Option<u8> = None;

    'running: loop {
        for event in events.poll_iter() {
            match event {
                Event::Quit { .. } => break 'running,
                Event::KeyDown {
                    keycode: Some(Keycode::Escape),
                    ..
                } => break 'running,
                Event::KeyDown {
                    keycode: Some(key), ..
                } => {
                    if let Some(code) = keymap(key) {
                        held_key = Some(code);
                    }
                }
                Event::KeyUp {
                    keycode: Some(key), ..
                } => {
                    // Only the release of the held key clears it.
                    if keymap(key).is_some() && keymap(key) == held_key {
                        held_key = None;
                    }
                }
                _ => {}
            }
        }

        let now = Instant::now();

        while next_tick <= now {
            machine.tick_60hz(buzzer.as_mut());
            next_tick += tick_period;
        }

        while next_cycle <= now {
            match machine.step(&mut frame, &held_key) {
                Ok(Step::Blocked) => {
                    // Waiting on a key. Hand the rest of this dispatch
                    // budget back; the timers above keep running.
                    next_cycle = now + cycle_period;
                    break;
                }
                Ok(_) => next_cycle += cycle_period,
                Err(fault) => {
                    error!("execution halted: {}", fault);
                    return Err(fault.into());
                }
            }
        }

        if let Some(pixels) = frame.take_frame() {
            display.render(&pixels).map_err(|e| anyhow!(e))?;
        }

        let deadline = next_cycle.min(next_tick);
        if let Some(idle) = deadline.checked_duration_since(Instant::now()) {
            thread::sleep(idle);
        }
    }

    Ok(())
}
