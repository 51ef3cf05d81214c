use crate::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    Upscale,

    /// Copy the output of the given (upscaled) frame.
    ReuseFrom(usize),
}

/// State carried from one frame to the next while deciding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Elision {
    pub prev: Fingerprint,
    pub anchor: usize,
}

impl Elision {
    /// Decides frame `idx` given the state left by frame `idx - 1`.
    pub fn step(
        state: Option<Self>,
        idx: usize,
        curr: Fingerprint,
        similarity: Similarity,
    ) -> (Self, Decision) {
        match state {
            Some(Self { prev, anchor }) if similarity.matches(prev, curr) => {
                (Self { prev: curr, anchor }, Decision::ReuseFrom(anchor))
            }

            _ => (
                Self {
                    prev: curr,
                    anchor: idx,
                },
                Decision::Upscale,
            ),
        }
    }
}

/// Runs the elision pass over a whole sequence, in order.
pub fn decide(fingerprints: &[Fingerprint], similarity: Similarity) -> Vec<Decision> {
    let (_, decisions) = fingerprints.iter().enumerate().fold(
        (None, Vec::with_capacity(fingerprints.len())),
        |(state, mut decisions), (idx, &curr)| {
            let (state, decision) = Elision::step(state, idx, curr, similarity);

            decisions.push(decision);
            (Some(state), decisions)
        },
    );

    decisions
}
