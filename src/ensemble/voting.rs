use crate::ensemble::OutputCodeMatrix;
use crate::utils::math::{add_values, normalize_l1};

/// Sums the L1-normalized member votes. Members without an opinion (empty
/// or zero-sum votes) are skipped.
pub fn combine_votes<I>(votes: I) -> Vec<f64>
where
    I: IntoIterator<Item = Vec<f64>>,
{
    let mut combined = Vec::new();
    for mut vote in votes {
        if normalize_l1(&mut vote) {
            add_values(&mut combined, &vote);
        }
    }
    combined
}

/// Reads a member's two-class vote as 0 or 1. Anything that is not a
/// two-entry vote favouring class 1 counts as 0.
pub fn binary_vote(vote: &[f64]) -> usize {
    if vote.len() == 2 && vote[1] > vote[0] {
        1
    } else {
        0
    }
}

/// Decodes per-member binary votes through the output-code matrix.
pub fn combine_output_code_votes<I>(
    codes: &OutputCodeMatrix,
    num_classes: usize,
    votes: I,
) -> Vec<f64>
where
    I: IntoIterator<Item = Vec<f64>>,
{
    let mut combined = vec![0.0; num_classes];
    for (member, vote) in votes.into_iter().enumerate() {
        codes.accumulate(member, binary_vote(&vote), &mut combined);
    }
    combined
}
