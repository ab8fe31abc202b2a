//! Optimistic mutation of vote, like, bookmark and membership sets.
//!
//! The next state is computed locally in one step, applied to the held
//! entity, and pushed to the server as a complete replacement payload.
//! On success the server's representation overwrites the local entity
//! (counts and derived fields are authoritative there). On failure the
//! optimistic change is left in place and the error bubbles to the
//! caller; the view keeps showing the attempted state until the next
//! full reload.

use std::future::Future;

use crate::client::ApiError;
use crate::models::{Community, Question, User};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vote {
    Up,
    Down,
}

/// Flip membership of `id` in a simple set.
pub fn toggled(set: &[String], id: &str) -> Vec<String> {
    let mut updated: Vec<String> = set.to_vec();
    match updated.iter().position(|member| member == id) {
        Some(index) => {
            updated.remove(index);
        }
        None => updated.push(id.to_string()),
    }
    updated
}

/// Compute the next (upvotes, downvotes) pair for a vote toggle in a
/// single state computation. Voting the same direction again un-votes;
/// voting the other direction switches atomically, so the user id never
/// lands in both sets.
pub fn next_vote_state(
    upvotes: &[String],
    downvotes: &[String],
    user_id: &str,
    vote: Vote,
) -> (Vec<String>, Vec<String>) {
    let (target, opposite) = match vote {
        Vote::Up => (upvotes, downvotes),
        Vote::Down => (downvotes, upvotes),
    };

    let (next_target, next_opposite) = if target.iter().any(|id| id == user_id) {
        (
            target
                .iter()
                .filter(|id| id.as_str() != user_id)
                .cloned()
                .collect(),
            opposite.to_vec(),
        )
    } else {
        (
            target
                .iter()
                .cloned()
                .chain(std::iter::once(user_id.to_string()))
                .collect(),
            opposite
                .iter()
                .filter(|id| id.as_str() != user_id)
                .cloned()
                .collect(),
        )
    };

    match vote {
        Vote::Up => (next_target, next_opposite),
        Vote::Down => (next_opposite, next_target),
    }
}

/// Toggle the acting user's vote on a question and push the full payload
/// through the injected update call.
pub async fn toggle_vote<F, Fut>(
    question: &mut Question,
    user_id: &str,
    vote: Vote,
    push: F,
) -> Result<(), ApiError>
where
    F: FnOnce(Question) -> Fut,
    Fut: Future<Output = Result<Question, ApiError>>,
{
    let (upvotes, downvotes) = next_vote_state(&question.upvotes, &question.downvotes, user_id, vote);
    question.upvotes = upvotes;
    question.downvotes = downvotes;

    match push(question.clone()).await {
        Ok(server) => {
            *question = server;
            Ok(())
        }
        Err(err) => Err(err),
    }
}

/// Toggle the acting user's like on a question.
pub async fn toggle_like<F, Fut>(
    question: &mut Question,
    user_id: &str,
    push: F,
) -> Result<(), ApiError>
where
    F: FnOnce(Question) -> Fut,
    Fut: Future<Output = Result<Question, ApiError>>,
{
    question.likes = toggled(&question.likes, user_id);

    match push(question.clone()).await {
        Ok(server) => {
            *question = server;
            Ok(())
        }
        Err(err) => Err(err),
    }
}

/// Toggle the acting user's membership in a community.
pub async fn toggle_membership<F, Fut>(
    community: &mut Community,
    user_id: &str,
    push: F,
) -> Result<(), ApiError>
where
    F: FnOnce(Community) -> Fut,
    Fut: Future<Output = Result<Community, ApiError>>,
{
    community.members = toggled(&community.members, user_id);

    match push(community.clone()).await {
        Ok(server) => {
            *community = server;
            Ok(())
        }
        Err(err) => Err(err),
    }
}

/// Toggle a question in the user's bookmark list.
pub async fn toggle_bookmark<F, Fut>(
    user: &mut User,
    question_id: &str,
    push: F,
) -> Result<(), ApiError>
where
    F: FnOnce(User) -> Fut,
    Fut: Future<Output = Result<User, ApiError>>,
{
    user.bookmark = toggled(&user.bookmark, question_id);

    match push(user.clone()).await {
        Ok(server) => {
            *user = server;
            Ok(())
        }
        Err(err) => Err(err),
    }
}
