//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;
use smartie_http::{DEFAULT_ANSWER_URL, DEFAULT_SYNTHESIS_URL};

/// Chat with a smartie answering service from the terminal.
#[derive(Debug, Parser)]
#[command(name = "smartie")]
#[command(about = "Chat with a smartie answering service")]
#[command(version)]
pub struct Cli {
    /// Answer endpoint
    #[arg(long, env = "SMARTIE_ANSWER_URL", default_value = DEFAULT_ANSWER_URL)]
    pub answer_url: String,

    /// Speech-synthesis endpoint
    #[arg(long, env = "SMARTIE_TTS_URL", default_value = DEFAULT_SYNTHESIS_URL)]
    pub tts_url: String,

    /// Session file. Defaults to `<data dir>/smartie/session.json`.
    #[arg(long, env = "SMARTIE_STORE")]
    pub store: Option<PathBuf>,

    /// Start with an empty transcript instead of restoring the last one
    #[arg(long)]
    pub clear_on_start: bool,

    /// Read typed replies aloud (needs the `local-playback` feature)
    #[arg(long)]
    pub speak: bool,

    /// Seconds to wait for an answer
    #[arg(long, env = "SMARTIE_TIMEOUT", default_value_t = 30)]
    pub timeout: u64,

    /// Latitude sent with each question
    #[arg(long, env = "SMARTIE_LATITUDE", requires = "longitude", allow_hyphen_values = true)]
    pub latitude: Option<f64>,

    /// Longitude sent with each question
    #[arg(long, env = "SMARTIE_LONGITUDE", requires = "latitude", allow_hyphen_values = true)]
    pub longitude: Option<f64>,

    /// Enable debug logging
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

impl Cli {
    /// Session file location, falling back to the platform data directory.
    pub fn store_path(&self) -> Option<PathBuf> {
        self.store
            .clone()
            .or_else(|| dirs::data_dir().map(|d| d.join("smartie").join("session.json")))
    }
}
