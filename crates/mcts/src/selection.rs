use crate::dirichlet::RootNoise;
use crate::tree::{Edge, Node};

/// Pick the legal action with the highest PUCT score at an expanded node.
///
/// Actions are scanned in increasing index order and only a strictly
/// greater score replaces the incumbent, so ties go to the lowest index.
/// When `noise` is given its weights are matched to legal actions by rank.
/// Returns `None` if the cached mask has no legal action.
pub fn select_action(node: &Node, c_puct: f32, noise: Option<&RootNoise>) -> Option<usize> {
    let sqrt_parent = (node.visit_count as f32).sqrt();

    let mut best_action = None;
    let mut best_score = f32::NEG_INFINITY;
    let mut rank = 0;

    for (action, &valid) in node.valid.iter().enumerate() {
        if valid == 0.0 {
            continue;
        }

        let prior = node.prior.get(action).copied().unwrap_or(0.0);
        let prior = match noise {
            Some(noise) => noise.mix(prior, rank),
            None => prior,
        };
        rank += 1;

        let score = puct_value(node.edge(action), prior, sqrt_parent, c_puct);
        if score > best_score {
            best_score = score;
            best_action = Some(action);
        }
    }

    best_action
}

/// Calculate PUCT value for an edge
///
/// U(s, a) = Q(s, a) + c_puct * P(s, a) * sqrt(N(s)) / (1 + N(s, a))
///
/// Q and N(s, a) are 0 for an edge never taken.
pub fn puct_value(edge: Option<&Edge>, prior: f32, sqrt_parent: f32, c_puct: f32) -> f32 {
    let (q, n_sa) = edge.map_or((0.0, 0.0), |e| (e.q_value, e.visit_count as f32));
    q + c_puct * prior * sqrt_parent / (1.0 + n_sa)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn node(prior: Vec<f32>, valid: Vec<f32>, visits: u32) -> Node {
        Node {
            prior,
            valid,
            visit_count: visits,
            is_expanded: true,
            ..Node::default()
        }
    }

    #[test]
    fn test_puct_value_unvisited() {
        // 0 + 1.5 * 0.5 * sqrt(100) / 1 = 7.5
        let puct = puct_value(None, 0.5, 10.0, 1.5);
        assert_relative_eq!(puct, 7.5, epsilon = 1e-5);
    }

    #[test]
    fn test_puct_value_visited() {
        let edge = Edge {
            visit_count: 10,
            q_value: 0.5,
        };
        // 0.5 + 1.5 * 0.5 * 10 / 11 ≈ 1.182
        let puct = puct_value(Some(&edge), 0.5, 10.0, 1.5);
        assert!((puct - 1.182).abs() < 0.01);
    }

    #[test]
    fn test_first_visit_picks_lowest_legal_index() {
        // N(s) = 0 makes every exploration term vanish: all scores tie at 0
        let n = node(vec![0.1, 0.2, 0.7], vec![0.0, 1.0, 1.0], 0);
        assert_eq!(select_action(&n, 1.5, None), Some(1));
    }

    #[test]
    fn test_prefers_high_prior() {
        let n = node(vec![0.1, 0.2, 0.7], vec![1.0, 1.0, 1.0], 4);
        assert_eq!(select_action(&n, 1.5, None), Some(2));
    }

    #[test]
    fn test_never_selects_illegal_action() {
        let n = node(vec![0.0, 0.0, 1.0], vec![1.0, 1.0, 0.0], 9);
        let chosen = select_action(&n, 1.5, None).unwrap();
        assert!(chosen < 2);
    }

    #[test]
    fn test_q_value_outweighs_prior() {
        let mut n = node(vec![0.5, 0.5], vec![1.0, 1.0], 2);
        n.edges.insert(0, Edge { visit_count: 1, q_value: -1.0 });
        n.edges.insert(1, Edge { visit_count: 1, q_value: 1.0 });
        assert_eq!(select_action(&n, 1.0, None), Some(1));
    }

    #[test]
    fn test_no_legal_action() {
        let n = node(vec![0.5, 0.5], vec![0.0, 0.0], 3);
        assert_eq!(select_action(&n, 1.5, None), None);
    }

    #[test]
    fn test_noise_is_matched_by_legal_rank() {
        // Flat prior on legal actions 1 and 3; all noise on the second legal action
        let n = node(vec![0.0, 0.5, 0.0, 0.5], vec![0.0, 1.0, 0.0, 1.0], 4);
        let noise = RootNoise::from_weights(vec![0.0, 1.0], 0.25);
        assert_eq!(select_action(&n, 1.5, Some(&noise)), Some(3));
    }
}
