mod ffprobe_info;
mod shell_words;
mod video_scanner;

pub use ffprobe_info::{probe_codec, probe_duration};
pub use shell_words::split_shell_words;
pub use video_scanner::find_video_files;
