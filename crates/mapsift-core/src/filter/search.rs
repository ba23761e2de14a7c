//! Free-text search filter: every query token must appear in the song's
//! combined text fields.

use crate::error::Result;
use crate::filter::{FilterPolicy, FilterValues, SongFilter};
use crate::types::BeatmapDetails;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchFilterValues {
    pub query: String,
}

impl FilterValues for SearchFilterValues {
    fn is_filtering(&self) -> bool {
        !self.query.trim().is_empty()
    }

    /// Free text cannot satisfy the alphanumeric wire bound, so the search
    /// filter is excluded from quick-filter persistence.
    fn to_settings(&self) -> Vec<(String, String)> {
        Vec::new()
    }

    fn from_settings(_pairs: &[(String, String)]) -> Result<Self> {
        Ok(Self::default())
    }
}

pub(crate) struct SearchFilterPolicy;

impl FilterPolicy for SearchFilterPolicy {
    type Values = SearchFilterValues;

    fn name(&self) -> &'static str {
        "search"
    }

    fn keep(&self, values: &Self::Values, details: &BeatmapDetails) -> bool {
        let haystack = format!(
            "{} {} {} {}",
            details.song_name,
            details.song_sub_name,
            details.song_author_name,
            details.level_author_name
        )
        .to_lowercase();

        values
            .query
            .split_whitespace()
            .all(|token| haystack.contains(&token.to_lowercase()))
    }
}

pub(crate) fn search_filter() -> SongFilter<SearchFilterPolicy> {
    SongFilter::new(SearchFilterPolicy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Filter;
    use crate::test_util::named_song;

    #[test]
    fn all_tokens_must_match_somewhere() {
        let mut filter = search_filter();
        filter.staging_mut().query = "star wars".to_string();
        filter.apply_staging();

        let mut songs = vec![
            named_song("a", "Star Wars Theme", "John Williams", ""),
            named_song("b", "Counting Stars", "OneRepublic", ""),
            named_song("c", "Wars", "Starman", ""),
        ];
        filter.filter_song_list(&mut songs);

        let ids: Vec<&str> = songs.iter().map(|s| s.level_id.as_str()).collect();
        // "c" matches: "star" is in the author, "wars" in the title.
        assert_eq!(ids, ["a", "c"]);
    }

    #[test]
    fn matching_is_case_insensitive() {
        let mut filter = search_filter();
        filter.staging_mut().query = "THEME".to_string();
        filter.apply_staging();

        let mut songs = vec![named_song("a", "Star Wars Theme", "", "")];
        filter.filter_song_list(&mut songs);
        assert_eq!(songs.len(), 1);
    }

    #[test]
    fn excluded_from_quick_filter_settings() {
        let mut filter = search_filter();
        filter.staging_mut().query = "star".to_string();
        filter.apply_staging();
        assert!(filter.is_applied());
        assert!(filter.applied_settings().is_empty());
    }
}
