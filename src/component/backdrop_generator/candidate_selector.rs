use crate::config::FileTypeTable;
use crate::tools::find_video_files;
use std::fs;
use std::path::{Path, PathBuf};

/// 季資料夾名稱的判斷條件（不分大小寫的子字串比對）
const SEASON_TOKEN: &str = "season";
const FIRST_SEASON_TOKENS: [&str; 2] = ["01", "season 1"];
const FIRST_EPISODE_TOKENS: [&str; 2] = ["e01", "episode 1"];

/// 電影：遞迴找出最大的影片檔。
/// 檔案大小相同時取排序後先出現的那一個，沒有影片則回傳 None
#[must_use]
pub fn select_movie_source(folder: &Path, file_type_table: &FileTypeTable) -> Option<PathBuf> {
    let mut best: Option<(PathBuf, u64)> = None;

    for video in find_video_files(folder, file_type_table) {
        let size = fs::metadata(&video).map(|meta| meta.len()).unwrap_or(0);
        let is_larger = match &best {
            None => true,
            Some((_, best_size)) => size > *best_size,
        };
        if is_larger {
            best = Some((video, size));
        }
    }

    best.map(|(path, _)| path)
}

/// 影集：優先第一季資料夾，其次排序後的第一個季資料夾，
/// 都沒有時退回節目根目錄；在選定的資料夾內優先第一集，
/// 其次排序後的第一個影片。媒體庫命名不一致，全部用子字串比對
#[must_use]
pub fn select_show_source(folder: &Path, file_type_table: &FileTypeTable) -> Option<PathBuf> {
    let seasons = season_directories(folder);
    let chosen = seasons
        .iter()
        .find(|dir| {
            let name = entry_name_lower(dir);
            FIRST_SEASON_TOKENS.iter().any(|token| name.contains(token))
        })
        .or_else(|| seasons.first())
        .cloned()
        .unwrap_or_else(|| folder.to_path_buf());

    let videos = find_video_files(&chosen, file_type_table);
    videos
        .iter()
        .find(|video| {
            let name = entry_name_lower(video);
            FIRST_EPISODE_TOKENS.iter().any(|token| name.contains(token))
        })
        .or_else(|| videos.first())
        .cloned()
}

/// 列出名稱含有 "season" 的直接子目錄，依路徑排序
fn season_directories(folder: &Path) -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = fs::read_dir(folder)
        .into_iter()
        .flatten()
        .filter_map(std::result::Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .filter(|path| entry_name_lower(path).contains(SEASON_TOKEN))
        .collect();

    dirs.sort();
    dirs
}

fn entry_name_lower(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> FileTypeTable {
        FileTypeTable {
            video_file: vec![".mkv".to_string(), ".mp4".to_string()],
        }
    }

    fn write_file(path: &Path, size: usize) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, vec![0u8; size]).unwrap();
    }

    #[test]
    fn test_movie_picks_largest() {
        let dir = tempfile::tempdir().unwrap();
        write_file(&dir.path().join("a.mkv"), 100);
        write_file(&dir.path().join("extras/b.mp4"), 4000);
        write_file(&dir.path().join("c.mp4"), 2000);

        let source = select_movie_source(dir.path(), &table()).unwrap();
        assert_eq!(source, dir.path().join("extras/b.mp4"));
    }

    #[test]
    fn test_movie_tie_keeps_first_sorted() {
        let dir = tempfile::tempdir().unwrap();
        write_file(&dir.path().join("zz.mkv"), 500);
        write_file(&dir.path().join("aa.mkv"), 500);

        let source = select_movie_source(dir.path(), &table()).unwrap();
        assert_eq!(source, dir.path().join("aa.mkv"));
    }

    #[test]
    fn test_movie_empty_folder() {
        let dir = tempfile::tempdir().unwrap();
        assert!(select_movie_source(dir.path(), &table()).is_none());
    }

    #[test]
    fn test_show_prefers_season_one() {
        let dir = tempfile::tempdir().unwrap();
        write_file(&dir.path().join("Season 02/show.s02e01.mkv"), 10);
        write_file(&dir.path().join("Season 01/show.s01e03.mkv"), 10);

        let source = select_show_source(dir.path(), &table()).unwrap();
        assert_eq!(source, dir.path().join("Season 01/show.s01e03.mkv"));
    }

    #[test]
    fn test_show_season_match_is_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        write_file(&dir.path().join("SEASON 1/pilot.mkv"), 10);

        let source = select_show_source(dir.path(), &table()).unwrap();
        assert_eq!(source, dir.path().join("SEASON 1/pilot.mkv"));
    }

    #[test]
    fn test_show_falls_back_to_first_season_sorted() {
        let dir = tempfile::tempdir().unwrap();
        write_file(&dir.path().join("Season 03/ep.mkv"), 10);
        write_file(&dir.path().join("Season 02/ep.mkv"), 10);

        let source = select_show_source(dir.path(), &table()).unwrap();
        assert_eq!(source, dir.path().join("Season 02/ep.mkv"));
    }

    #[test]
    fn test_show_falls_back_to_show_root() {
        let dir = tempfile::tempdir().unwrap();
        write_file(&dir.path().join("specials/movie.mkv"), 10);

        // 沒有任何季資料夾時整個節目目錄都算
        let source = select_show_source(dir.path(), &table()).unwrap();
        assert_eq!(source, dir.path().join("specials/movie.mkv"));
    }

    #[test]
    fn test_show_prefers_first_episode() {
        let dir = tempfile::tempdir().unwrap();
        write_file(&dir.path().join("Season 01/show.s01e03.mkv"), 10);
        write_file(&dir.path().join("Season 01/show.s01e01.mkv"), 10);
        write_file(&dir.path().join("Season 01/show.s01e02.mkv"), 10);

        let source = select_show_source(dir.path(), &table()).unwrap();
        assert_eq!(source, dir.path().join("Season 01/show.s01e01.mkv"));
    }

    #[test]
    fn test_show_episode_word_match() {
        let dir = tempfile::tempdir().unwrap();
        write_file(&dir.path().join("Season 01/Show Episode 1.mkv"), 10);
        write_file(&dir.path().join("Season 01/Show Episode 2.mkv"), 10);

        let source = select_show_source(dir.path(), &table()).unwrap();
        assert_eq!(source, dir.path().join("Season 01/Show Episode 1.mkv"));
    }

    #[test]
    fn test_show_without_first_episode_takes_first_sorted() {
        let dir = tempfile::tempdir().unwrap();
        write_file(&dir.path().join("Season 01/show.s01e07.mkv"), 10);
        write_file(&dir.path().join("Season 01/show.s01e05.mkv"), 10);

        let source = select_show_source(dir.path(), &table()).unwrap();
        assert_eq!(source, dir.path().join("Season 01/show.s01e05.mkv"));
    }

    #[test]
    fn test_show_empty_season_folder() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("Season 01")).unwrap();
        assert!(select_show_source(dir.path(), &table()).is_none());
    }
}
