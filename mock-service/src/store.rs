use crate::error::ApiError;
use crate::model::{CreatePullRequest, PrStatus, PullRequest, Team, TeamMember, User};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::{BTreeMap, BTreeSet, HashMap};

const REVIEWERS_PER_PR: usize = 2;

/// In-memory teams, users and pull requests.
///
/// A user belongs to the team which most recently listed them.
#[derive(Debug, Default)]
pub struct Store {
    teams: BTreeSet<String>,
    users: BTreeMap<String, User>,
    pull_requests: HashMap<String, PullRequest>,
}

impl Store {
    pub fn create_team(&mut self, team: Team) -> Result<Team, ApiError> {
        if self.teams.contains(&team.team_name) {
            return Err(ApiError::TeamExists);
        }

        for member in team.members {
            self.users.insert(
                member.user_id.clone(),
                User {
                    user_id: member.user_id,
                    username: member.username,
                    team_name: team.team_name.clone(),
                    is_active: member.is_active,
                },
            );
        }
        self.teams.insert(team.team_name.clone());

        self.team(&team.team_name)
    }

    pub fn team(&self, name: &str) -> Result<Team, ApiError> {
        if !self.teams.contains(name) {
            return Err(ApiError::NotFound("team"));
        }

        let members = self
            .users
            .values()
            .filter(|user| user.team_name == name)
            .map(|user| TeamMember {
                user_id: user.user_id.clone(),
                username: user.username.clone(),
                is_active: user.is_active,
            })
            .collect();

        Ok(Team {
            team_name: name.to_string(),
            members,
        })
    }

    /// Create an open pull request and assign up to two active reviewers from the author's team.
    pub fn create_pull_request<R: Rng + ?Sized>(
        &mut self,
        req: CreatePullRequest,
        rng: &mut R,
    ) -> Result<PullRequest, ApiError> {
        if self.pull_requests.contains_key(&req.pull_request_id) {
            return Err(ApiError::PrExists);
        }

        let author = self
            .users
            .get(&req.author_id)
            .ok_or(ApiError::NotFound("author or team"))?;

        let candidates: Vec<&str> = self
            .users
            .values()
            .filter(|user| {
                user.team_name == author.team_name && user.is_active && user.user_id != author.user_id
            })
            .map(|user| user.user_id.as_str())
            .collect();

        let assigned_reviewers = candidates
            .choose_multiple(rng, REVIEWERS_PER_PR)
            .map(|id| id.to_string())
            .collect();

        let pr = PullRequest {
            pull_request_id: req.pull_request_id,
            pull_request_name: req.pull_request_name,
            author_id: req.author_id,
            status: PrStatus::Open,
            assigned_reviewers,
        };
        self.pull_requests
            .insert(pr.pull_request_id.clone(), pr.clone());

        Ok(pr)
    }

    pub fn pull_request(&self, id: &str) -> Option<&PullRequest> {
        self.pull_requests.get(id)
    }

    pub fn pull_request_count(&self) -> usize {
        self.pull_requests.len()
    }
}
