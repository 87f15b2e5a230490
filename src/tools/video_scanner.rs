use crate::config::FileTypeTable;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 遞迴列出資料夾內的所有影片檔案，依路徑排序以確保結果穩定
#[must_use]
pub fn find_video_files(directory: &Path, file_type_table: &FileTypeTable) -> Vec<PathBuf> {
    let mut videos: Vec<PathBuf> = WalkDir::new(directory)
        .follow_links(false)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| file_type_table.is_video_file(entry.path()))
        .map(walkdir::DirEntry::into_path)
        .collect();

    videos.sort();
    videos
}
