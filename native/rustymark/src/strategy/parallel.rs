//! Parallel fragment planning
//!
//! Uses Rayon to split large leaf sets across threads. Planning only reads
//! text, so the tree is not touched here; wrappers are created afterwards
//! on the calling thread.

use rayon::prelude::*;
use regex::Regex;

use crate::dom::NodeId;
use crate::highlight::fragment::{plan_leaf, FragmentPlan};

/// Plan every leaf in parallel, keeping leaf order
pub fn plan_parallel(leaves: &[(NodeId, &str)], regex: &Regex) -> Vec<FragmentPlan> {
    leaves
        .par_iter()
        .map(|&(leaf, text)| plan_leaf(leaf, text, regex))
        .collect::<Vec<_>>()
        .into_iter()
        .flatten()
        .collect()
}

/// Plan every leaf on the current thread
pub fn plan_sequential(leaves: &[(NodeId, &str)], regex: &Regex) -> Vec<FragmentPlan> {
    leaves
        .iter()
        .filter_map(|&(leaf, text)| plan_leaf(leaf, text, regex))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parallel_matches_sequential() {
        let texts: Vec<String> = (0..500)
            .map(|i| if i % 3 == 0 { format!("item {i} match") } else { format!("item {i}") })
            .collect();
        let leaves: Vec<(NodeId, &str)> = texts
            .iter()
            .enumerate()
            .map(|(i, t)| (i as NodeId, t.as_str()))
            .collect();
        let regex = Regex::new("match").unwrap();

        let parallel = plan_parallel(&leaves, &regex);
        assert_eq!(parallel, plan_sequential(&leaves, &regex));
        assert_eq!(parallel.len(), 167);
        assert!(parallel.windows(2).all(|w| w[0].leaf < w[1].leaf));
    }
}
