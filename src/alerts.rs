use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};

use rodio::Source;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    pub audio: bool,
    /// Seconds of sound before it goes quiet. 0 rings until dismissed.
    pub ring_seconds: u64,
    pub blink_interval_ms: u64,
    /// Audio file to loop. `None` rings the terminal bell.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ringtone: Option<PathBuf>,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            audio: true,
            ring_seconds: 0,
            blink_interval_ms: 500,
            ringtone: None,
        }
    }
}

impl AlertConfig {
    pub fn should_silence(&self, rung_for_secs: i64) -> bool {
        self.ring_seconds > 0 && rung_for_secs >= i64::try_from(self.ring_seconds).unwrap_or(i64::MAX)
    }
}

#[derive(Debug, Error)]
pub enum AlertError {
    #[error("audio output unavailable: {0}")]
    Output(#[from] io::Error),
    #[error("ringtone {0} not found")]
    MissingRingtone(PathBuf),
    #[error("no audio device: {0}")]
    Stream(#[from] rodio::StreamError),
    #[error("can't start playback: {0}")]
    Play(#[from] rodio::PlayError),
    #[error("can't decode ringtone: {0}")]
    Decode(#[from] rodio::decoder::DecoderError),
}

/// Looped alarm sound.
///
/// `pulse` is called once per second while ringing so sinks without their
/// own looping can repeat the sound.
pub trait Ringer {
    fn start(&mut self) -> Result<(), AlertError>;
    fn pulse(&mut self) -> Result<(), AlertError>;
    fn stop(&mut self);
    fn is_ringing(&self) -> bool;
}

/// Rings the terminal bell (BEL) once per pulse.
pub struct TerminalBell<W: Write> {
    out: W,
    ringing: bool,
}

impl TerminalBell<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> TerminalBell<W> {
    pub fn new(out: W) -> Self {
        Self { out, ringing: false }
    }

    fn bell(&mut self) -> Result<(), AlertError> {
        self.out.write_all(b"\x07")?;
        self.out.flush()?;
        Ok(())
    }
}

impl<W: Write> Ringer for TerminalBell<W> {
    fn start(&mut self) -> Result<(), AlertError> {
        self.bell()?;
        self.ringing = true;
        Ok(())
    }

    fn pulse(&mut self) -> Result<(), AlertError> {
        if !self.ringing {
            return Ok(());
        }
        self.bell()
    }

    fn stop(&mut self) {
        self.ringing = false;
    }

    fn is_ringing(&self) -> bool {
        self.ringing
    }
}

/// Loops an audio file on the default output device.
pub struct RodioRinger {
    _stream: rodio::OutputStream,
    handle: rodio::OutputStreamHandle,
    path: PathBuf,
    sink: Option<rodio::Sink>,
}

impl RodioRinger {
    pub fn open(path: &Path) -> Result<Self, AlertError> {
        if !path.is_file() {
            return Err(AlertError::MissingRingtone(path.to_path_buf()));
        }
        let (stream, handle) = rodio::OutputStream::try_default()?;
        log::info!("ringtone {}", path.display());
        Ok(Self {
            _stream: stream,
            handle,
            path: path.to_path_buf(),
            sink: None,
        })
    }
}

impl Ringer for RodioRinger {
    fn start(&mut self) -> Result<(), AlertError> {
        self.stop();
        let decoder = rodio::Decoder::new(BufReader::new(File::open(&self.path)?))?;
        let sink = rodio::Sink::try_new(&self.handle)?;
        sink.append(decoder.repeat_infinite());
        self.sink = Some(sink);
        Ok(())
    }

    fn pulse(&mut self) -> Result<(), AlertError> {
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
    }

    fn is_ringing(&self) -> bool {
        self.sink.is_some()
    }
}

/// Configured ringtone, if it exists on disk.
pub fn usable_ringtone(config: &AlertConfig) -> Option<&Path> {
    let path = config.ringtone.as_deref()?;
    if path.is_file() {
        Some(path)
    } else {
        log::warn!("ringtone {} not found, using the terminal bell", path.display());
        None
    }
}

/// Ringtone player when possible, terminal bell otherwise.
pub fn open_ringer(config: &AlertConfig) -> Box<dyn Ringer> {
    let Some(path) = usable_ringtone(config) else {
        return Box::new(TerminalBell::stdout());
    };
    match RodioRinger::open(path) {
        Ok(ringer) => Box::new(ringer),
        Err(e) => {
            log::warn!("can't play {}: {}, using the terminal bell", path.display(), e);
            Box::new(TerminalBell::stdout())
        }
    }
}

pub fn fire_alert(config: &AlertConfig, ringer: &mut dyn Ringer, message: &str) {
    log::info!("{}", message);
    if config.audio {
        if let Err(e) = ringer.start() {
            log::warn!("can't play alarm sound: {}", e);
        }
    }
}
