#![allow(dead_code)]

/// Served as playable audio.
pub const OPEN_PIECE_ID: &str = "mozart-night";
pub const OPEN_FILE_NAME: &str = "mozart-night.mp3";

/// The bucket refuses to serve this one.
pub const FORBIDDEN_PIECE_ID: &str = "bach-toccata";
pub const FORBIDDEN_FILE_NAME: &str = "bach-toccata.mp3";

/// Served, but the body is not audio.
pub const GARBAGE_PIECE_ID: &str = "satie-gymnopedie";
pub const GARBAGE_FILE_NAME: &str = "satie-gymnopedie.mp3";

/// Minimal MP3 prefix: an ID3v2 header followed by filler.
pub const TEST_AUDIO_BYTES: &[u8] = b"ID3\x04\x00\x00\x00\x00\x00\x00test audio payload";

pub const GARBAGE_BODY: &str = "<html><body>Not audio</body></html>";
