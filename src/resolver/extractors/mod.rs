// Extractor boundary - trait, configuration, and the yt-dlp CLI driver

mod cli;
mod traits;

pub use cli::CliAudioExtractor;
pub use traits::{AudioExtractor, ExtractorConfig};
