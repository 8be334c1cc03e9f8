//! Request bodies sent to the team / pull-request service
use prload::VuContext;
use serde::{Deserialize, Serialize};

/// Usernames given to the members of every generated team, in order.
pub const MEMBER_USERNAMES: [&str; 3] = ["A", "B", "C"];

pub const PULL_REQUEST_NAME: &str = "Load Test";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMember {
    pub user_id: String,
    pub username: String,
    pub is_active: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRegistration {
    pub team_name: String,
    pub members: Vec<TeamMember>,
}

impl TeamRegistration {
    /// The team owned by virtual user `vu`: `team-{vu}` with active members `u{vu}-1..3`.
    pub fn for_vu(vu: u64) -> Self {
        let members = MEMBER_USERNAMES
            .iter()
            .enumerate()
            .map(|(i, username)| TeamMember {
                user_id: member_id(vu, i + 1),
                username: username.to_string(),
                is_active: true,
            })
            .collect();

        Self {
            team_name: format!("team-{vu}"),
            members,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestCreate {
    pub pull_request_id: String,
    pub pull_request_name: String,
    pub author_id: String,
}

impl PullRequestCreate {
    /// A pull request unique to this iteration, authored by the first member of the VU's team.
    pub fn for_iteration(ctx: VuContext) -> Self {
        Self {
            pull_request_id: format!("pr-{}-{}", ctx.vu, ctx.iteration),
            pull_request_name: PULL_REQUEST_NAME.to_string(),
            author_id: member_id(ctx.vu, 1),
        }
    }
}

fn member_id(vu: u64, position: usize) -> String {
    format!("u{vu}-{position}")
}
