use serde::{Deserialize, Serialize};

use crate::model::{api::id::ApiId, common::ElectionStatus, db::election::Election};

/// Public tally for one election, derived from the candidate counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElectionResults {
    pub election_id: ApiId,
    pub title: String,
    pub status: ElectionStatus,
    pub total_votes: u64,
    pub results: Vec<CandidateResult>,
    /// Every candidate sharing the maximum; empty when no votes were cast.
    pub winners: Vec<CandidateResult>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateResult {
    pub candidate_id: ApiId,
    pub name: String,
    pub votes: u64,
    /// Whole-number share of the total, rounded half-up; 0 when no votes.
    pub percentage: u32,
}

impl From<Election> for ElectionResults {
    fn from(election: Election) -> Self {
        let total_votes = election.total_votes();
        let results: Vec<CandidateResult> = election
            .election
            .candidates
            .iter()
            .map(|candidate| CandidateResult {
                candidate_id: candidate.id.into(),
                name: candidate.name.clone(),
                votes: candidate.votes,
                percentage: percentage(candidate.votes, total_votes),
            })
            .collect();

        let max_votes = results.iter().map(|r| r.votes).max().unwrap_or(0);
        let winners = if total_votes == 0 {
            Vec::new()
        } else {
            results
                .iter()
                .filter(|r| r.votes == max_votes)
                .cloned()
                .collect()
        };

        Self {
            election_id: election.id.into(),
            title: election.election.title,
            status: election.election.status,
            total_votes,
            results,
            winners,
        }
    }
}

/// Whole-number percentage, rounded half-up.
fn percentage(votes: u64, total: u64) -> u32 {
    if total == 0 {
        0
    } else {
        (votes as f64 * 100.0 / total as f64 + 0.5).floor() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::model::db::election::ElectionCore;
    use crate::model::mongodb::Id;

    fn election_with_votes(votes: &[u64]) -> Election {
        let mut election = Election::example();
        assert!(votes.len() <= election.candidates.len());
        for (candidate, &count) in election.candidates.iter_mut().zip(votes) {
            candidate.votes = count;
        }
        election
    }

    #[test]
    fn tie_produces_multiple_winners() {
        // 5 + 5 + 1 = 11 total; shares 45.45%, 45.45%, 9.09%.
        let results = ElectionResults::from(election_with_votes(&[5, 5, 1]));
        assert_eq!(results.total_votes, 11);
        let percentages: Vec<u32> = results.results.iter().map(|r| r.percentage).collect();
        assert_eq!(percentages, vec![45, 45, 9]);
        assert_eq!(results.winners.len(), 2);
        assert!(results.winners.iter().all(|w| w.votes == 5));
    }

    #[test]
    fn rounds_half_up() {
        // 1 of 8 is 12.5%, which rounds up to 13.
        let results = ElectionResults::from(election_with_votes(&[1, 7, 0]));
        assert_eq!(results.results[0].percentage, 13);
        assert_eq!(results.results[1].percentage, 88);
        assert_eq!(results.results[2].percentage, 0);
    }

    #[test]
    fn zero_votes_means_no_winners() {
        let results = ElectionResults::from(election_with_votes(&[0, 0, 0]));
        assert_eq!(results.total_votes, 0);
        assert!(results.winners.is_empty());
        assert!(results.results.iter().all(|r| r.percentage == 0));
    }

    #[test]
    fn clear_winner() {
        let results = ElectionResults::from(election_with_votes(&[2, 9, 1]));
        assert_eq!(results.winners.len(), 1);
        assert_eq!(results.winners[0].name, "Priya Nair");
        assert_eq!(results.winners[0].percentage, 75);
    }

    #[test]
    fn preserves_candidate_order() {
        let election = election_with_votes(&[1, 2, 3]);
        let names: Vec<String> = election.candidates.iter().map(|c| c.name.clone()).collect();
        let results = ElectionResults::from(election);
        let result_names: Vec<String> = results.results.into_iter().map(|r| r.name).collect();
        assert_eq!(names, result_names);
    }

    #[test]
    fn single_candidate_takes_all() {
        let mut election = Election {
            id: Id::new(),
            election: ElectionCore::new(
                "Referendum".to_string(),
                String::new(),
                ElectionStatus::Closed,
                vec![crate::model::db::election::Candidate::new("Yes".to_string())],
            ),
        };
        election.candidates[0].votes = 4;
        let results = ElectionResults::from(election);
        assert_eq!(results.results[0].percentage, 100);
        assert_eq!(results.winners.len(), 1);
    }
}
