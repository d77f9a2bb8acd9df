use std::{io, path::PathBuf};

/// Fatal startup errors. Anything that goes wrong once the machine is running
/// is logged and skipped instead.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unable to read ROM {}: {source}", .path.display())]
    RomRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("ROM is too large ({size} bytes), max size is {max_size} bytes")]
    RomTooLarge { size: usize, max_size: usize },

    #[error("unable to open window: {0}")]
    Window(#[from] minifb::Error),

    #[error("no audio output device available")]
    NoAudioDevice,

    #[error("audio device reported no supported output config")]
    NoAudioConfig,

    #[error("error while querying audio configs: {0}")]
    AudioConfigs(#[from] cpal::SupportedStreamConfigsError),

    #[error("unable to build audio stream: {0}")]
    AudioStream(#[from] cpal::BuildStreamError),

    #[error("unable to pause audio stream: {0}")]
    AudioPause(#[from] cpal::PauseStreamError),

    #[error("unsupported sample format '{0:?}'")]
    UnsupportedSampleFormat(cpal::SampleFormat),
}

pub type Result<T> = std::result::Result<T, Error>;
