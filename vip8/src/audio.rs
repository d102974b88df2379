use sdl2::audio::{AudioCallback, AudioDevice, AudioSpecDesired};
use sdl2::Sdl;

use vip8_core::Buzzer;

const TONE_HZ: f32 = 440.0;
const VOLUME: f32 = 0.05;

/// Square-wave generator run by the SDL audio thread.
struct SquareWave {
    phase: f32,
    step: f32,
}

impl AudioCallback for SquareWave {
    type Channel = f32;

    fn callback(&mut self, out: &mut [f32]) {
        for sample in out.iter_mut() {
            *sample = if self.phase < 0.5 { VOLUME } else { -VOLUME };
            self.phase = (self.phase + self.step) % 1.0;
        }
    }
}

/// The tone the sound timer gates on and off.
pub struct Beeper {
    device: AudioDevice<SquareWave>,
}

impl Beeper {
    pub fn new(sdl: &Sdl) -> Result<Self, String> {
        let audio = sdl.audio()?;
        let spec = AudioSpecDesired {
            freq: Some(44_100),
            channels: Some(1),
            samples: None,
        };
        let device = audio.open_playback(None, &spec, |spec| SquareWave {
            phase: 0.0,
            step: TONE_HZ / spec.freq as f32,
        })?;
        Ok(Beeper { device })
    }
}

impl Buzzer for Beeper {
    fn start_tone(&mut self) {
        self.device.resume();
    }

    fn stop_tone(&mut self) {
        self.device.pause();
    }
}

/// Silent sink for `--mute`.
pub struct Mute;

impl Buzzer for Mute {
    fn start_tone(&mut self) {}
    fn stop_tone(&mut self) {}
}
