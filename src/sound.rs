use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SizedSample};

use crate::error::{Error, Result};

const TONE_HZ: f32 = 440.0;
const AMPLITUDE: f32 = 0.25;

/// Tone output driven by the sound timer. Both calls are idempotent and
/// arrive once per cycle.
pub trait Sound {
    fn play(&mut self);
    fn stop(&mut self);
}

/// A 440Hz sine on the default output device. The stream is built once at
/// startup and then only paused and resumed.
pub struct Beeper {
    stream: cpal::Stream,
    playing: bool,
}

impl Beeper {
    pub fn new() -> Result<Self> {
        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(Error::NoAudioDevice)?;
        let mut supported_configs_range = device.supported_output_configs()?;
        let supported_config = supported_configs_range
            .next()
            .ok_or(Error::NoAudioConfig)?
            .with_max_sample_rate();
        let sample_format = supported_config.sample_format();
        let config: cpal::StreamConfig = supported_config.into();

        let stream = match sample_format {
            cpal::SampleFormat::I8 => Self::build::<i8>(&device, &config)?,
            cpal::SampleFormat::I16 => Self::build::<i16>(&device, &config)?,
            cpal::SampleFormat::I32 => Self::build::<i32>(&device, &config)?,
            cpal::SampleFormat::I64 => Self::build::<i64>(&device, &config)?,
            cpal::SampleFormat::U8 => Self::build::<u8>(&device, &config)?,
            cpal::SampleFormat::U16 => Self::build::<u16>(&device, &config)?,
            cpal::SampleFormat::U32 => Self::build::<u32>(&device, &config)?,
            cpal::SampleFormat::U64 => Self::build::<u64>(&device, &config)?,
            cpal::SampleFormat::F32 => Self::build::<f32>(&device, &config)?,
            cpal::SampleFormat::F64 => Self::build::<f64>(&device, &config)?,
            sample_format => return Err(Error::UnsupportedSampleFormat(sample_format)),
        };
        // some hosts start streams immediately
        stream.pause()?;

        Ok(Self {
            stream,
            playing: false,
        })
    }

    fn build<T>(device: &cpal::Device, config: &cpal::StreamConfig) -> Result<cpal::Stream>
    where
        T: SizedSample + FromSample<f32>,
    {
        let sample_rate = config.sample_rate.0 as f32;
        let channels = config.channels as usize;

        let mut sample_clock = 0f32;
        let mut next_value = move || {
            sample_clock = (sample_clock + 1.0) % sample_rate;
            AMPLITUDE * (sample_clock * TONE_HZ * 2.0 * std::f32::consts::PI / sample_rate).sin()
        };

        let err_fn = |err| log::warn!("an error occurred on stream: {}", err);

        let stream = device.build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                write_data(data, channels, &mut next_value)
            },
            err_fn,
            None,
        )?;
        Ok(stream)
    }
}

fn write_data<T>(output: &mut [T], channels: usize, next_sample: &mut dyn FnMut() -> f32)
where
    T: Sample + FromSample<f32>,
{
    for frame in output.chunks_mut(channels) {
        let value: T = T::from_sample(next_sample());
        for sample in frame.iter_mut() {
            *sample = value;
        }
    }
}

impl Sound for Beeper {
    fn play(&mut self) {
        if self.playing {
            return;
        }
        match self.stream.play() {
            Ok(()) => self.playing = true,
            Err(e) => log::warn!("unable to start tone: {}", e),
        }
    }

    fn stop(&mut self) {
        if !self.playing {
            return;
        }
        match self.stream.pause() {
            Ok(()) => self.playing = false,
            Err(e) => log::warn!("unable to stop tone: {}", e),
        }
    }
}

/// Silent backend for `--mute` and headless runs.
#[derive(Debug, Default)]
pub struct Mute;

impl Sound for Mute {
    fn play(&mut self) {}

    fn stop(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_data_fills_every_channel() {
        let mut samples = [0f32; 6];
        let mut n = 0.0;
        let mut next = || {
            n += 0.5;
            n
        };
        write_data(&mut samples, 2, &mut next);
        assert_eq!(samples, [0.5, 0.5, 1.0, 1.0, 1.5, 1.5]);
    }
}
