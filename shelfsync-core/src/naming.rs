//! Folder and file naming convention parsing.
//!
//! The library tree follows a fixed convention:
//! show/movie entries are named `"<Title> (<Year>) [<TmdbId>]"` (movie files
//! additionally carry an `.mkv`/`.mp4` extension), season folders are named
//! `"Season <N>"`, and episode files contain an `SNNENN` label somewhere in
//! the name. Non-conforming names parse to `None`; callers log and skip.

use regex::Regex;
use std::sync::LazyLock;

static MEDIA_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+) \((\d{4})\) \[(\d+)\](?:\.(?:mkv|mp4))?$").unwrap());

static SEASON_FOLDER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^Season (\d+)$").unwrap());

static EPISODE_LABEL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)S(\d{2})E(\d+)").unwrap());

/// Identity recovered from a conforming folder or file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaName {
    pub title: String,
    pub year: i32,
    pub tmdb_id: i32,
}

impl MediaName {
    /// Reconstructs the canonical folder name, used for exact matching
    /// against remote show folders.
    pub fn folder_name(&self) -> String {
        format!("{} ({}) [{}]", self.title, self.year, self.tmdb_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpisodeLabel {
    pub season: u32,
    pub episode: u32,
}

/// Parses `"<Title> (<Year>) [<TmdbId>]"` with an optional video extension.
pub fn parse_media_name(name: &str) -> Option<MediaName> {
    let caps = MEDIA_NAME.captures(name)?;
    Some(MediaName {
        title: caps[1].to_string(),
        year: caps[2].parse().ok()?,
        tmdb_id: caps[3].parse().ok()?,
    })
}

/// Parses `"Season <N>"` folder names.
pub fn parse_season_folder(name: &str) -> Option<u32> {
    let caps = SEASON_FOLDER.captures(name)?;
    caps[1].parse().ok()
}

/// Searches (not full-matches) for the first `SNNENN` label in a file name,
/// case-insensitively.
pub fn parse_episode_label(name: &str) -> Option<EpisodeLabel> {
    let caps = EPISODE_LABEL.captures(name)?;
    Some(EpisodeLabel {
        season: caps[1].parse().ok()?,
        episode: caps[2].parse().ok()?,
    })
}

/// Renders the zero-padded label used as the join key against the metadata
/// provider's season listing. Not a database key.
pub fn format_episode_label(season: u32, episode: u32) -> String {
    format!("S{season:02}E{episode:02}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_movie_file_name() {
        let parsed = parse_media_name("Bar (2019) [456].mkv").unwrap();
        assert_eq!(parsed.title, "Bar");
        assert_eq!(parsed.year, 2019);
        assert_eq!(parsed.tmdb_id, 456);
    }

    #[test]
    fn parses_show_folder_name() {
        let parsed = parse_media_name("Foo (2020) [123]").unwrap();
        assert_eq!(parsed.title, "Foo");
        assert_eq!(parsed.year, 2020);
        assert_eq!(parsed.tmdb_id, 123);
        assert_eq!(parsed.folder_name(), "Foo (2020) [123]");
    }

    #[test]
    fn keeps_parenthesized_title_parts() {
        let parsed = parse_media_name("Dune (Part Two) (2024) [693134].mp4").unwrap();
        assert_eq!(parsed.title, "Dune (Part Two)");
        assert_eq!(parsed.year, 2024);
    }

    #[test]
    fn rejects_non_conforming_names() {
        assert_eq!(parse_media_name("Foo.2020.1080p.mkv"), None);
        assert_eq!(parse_media_name("Foo (2020)"), None);
        assert_eq!(parse_media_name("Foo [123]"), None);
        assert_eq!(parse_media_name("Foo (20) [123]"), None);
    }

    #[test]
    fn parses_season_folders() {
        assert_eq!(parse_season_folder("Season 1"), Some(1));
        assert_eq!(parse_season_folder("Season 12"), Some(12));
        assert_eq!(parse_season_folder("season 1"), None);
        assert_eq!(parse_season_folder("Season One"), None);
        assert_eq!(parse_season_folder("Specials"), None);
    }

    #[test]
    fn finds_episode_label_anywhere() {
        let label = parse_episode_label("Foo 1080p S03E14 final.mkv").unwrap();
        assert_eq!(label.season, 3);
        assert_eq!(label.episode, 14);
    }

    #[test]
    fn episode_label_is_case_insensitive() {
        let label = parse_episode_label("foo s01e02.mkv").unwrap();
        assert_eq!(label.season, 1);
        assert_eq!(label.episode, 2);
    }

    #[test]
    fn first_label_occurrence_wins() {
        let label = parse_episode_label("S01E02 S05E06.mkv").unwrap();
        assert_eq!((label.season, label.episode), (1, 2));
    }

    #[test]
    fn no_label_means_none() {
        assert_eq!(parse_episode_label("Foo Episode 3.mkv"), None);
        // Season needs exactly two digits in the label form.
        assert_eq!(parse_episode_label("S1E02.mkv"), None);
    }

    #[test]
    fn label_round_trips() {
        let label = parse_episode_label("Foo S05E03.mkv").unwrap();
        assert_eq!((label.season, label.episode), (5, 3));
        assert_eq!(format_episode_label(label.season, label.episode), "S05E03");
        assert_eq!(format_episode_label(1, 123), "S01E123");
    }
}
