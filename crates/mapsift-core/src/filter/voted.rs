//! Vote status filter. Requires the vote-data collaborator.

use std::sync::Arc;

use crate::error::Result;
use crate::filter::{FilterPolicy, FilterValues, SettingsReader, SongFilter, encode_bool};
use crate::sources::{VoteSource, VoteStatus};
use crate::types::BeatmapDetails;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VotedFilterValues {
    pub upvoted: bool,
    pub downvoted: bool,
    pub no_vote: bool,
}

impl FilterValues for VotedFilterValues {
    fn to_settings(&self) -> Vec<(String, String)> {
        vec![
            ("upvoted".into(), encode_bool(self.upvoted)),
            ("downvoted".into(), encode_bool(self.downvoted)),
            ("noVote".into(), encode_bool(self.no_vote)),
        ]
    }

    fn from_settings(pairs: &[(String, String)]) -> Result<Self> {
        let reader = SettingsReader::new("voted", pairs);
        Ok(Self {
            upvoted: reader.bool("upvoted")?,
            downvoted: reader.bool("downvoted")?,
            no_vote: reader.bool("noVote")?,
        })
    }
}

pub(crate) struct VotedFilterPolicy {
    votes: Option<Arc<dyn VoteSource>>,
}

impl FilterPolicy for VotedFilterPolicy {
    type Values = VotedFilterValues;

    fn name(&self) -> &'static str {
        "voted"
    }

    fn is_available(&self) -> bool {
        self.votes.is_some()
    }

    fn keep(&self, values: &Self::Values, details: &BeatmapDetails) -> bool {
        let Some(votes) = &self.votes else {
            return true;
        };
        match votes.vote_for(&details.level_id) {
            VoteStatus::Upvoted => values.upvoted,
            VoteStatus::Downvoted => values.downvoted,
            VoteStatus::NoVote => values.no_vote,
        }
    }
}

pub(crate) fn voted_filter(votes: Option<Arc<dyn VoteSource>>) -> SongFilter<VotedFilterPolicy> {
    SongFilter::new(VotedFilterPolicy { votes })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Filter;
    use crate::test_util::song;

    struct StubVotes;

    impl VoteSource for StubVotes {
        fn vote_for(&self, level_id: &str) -> VoteStatus {
            match level_id {
                "liked" => VoteStatus::Upvoted,
                "disliked" => VoteStatus::Downvoted,
                _ => VoteStatus::NoVote,
            }
        }
    }

    #[test]
    fn keeps_only_selected_vote_states() {
        let mut filter = voted_filter(Some(Arc::new(StubVotes)));
        filter
            .set_staging_from_settings(&[
                ("upvoted".into(), "true".into()),
                ("noVote".into(), "true".into()),
            ])
            .unwrap();
        filter.apply_staging();

        let mut songs = vec![
            song("liked", 100.0),
            song("disliked", 100.0),
            song("neutral", 100.0),
        ];
        filter.filter_song_list(&mut songs);

        let ids: Vec<&str> = songs.iter().map(|s| s.level_id.as_str()).collect();
        assert_eq!(ids, ["liked", "neutral"]);
    }
}
