pub mod encoding;
pub mod srt;
pub mod vtt;
