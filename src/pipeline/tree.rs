//! CART regression tree.
//!
//! Nodes live in a flat arena indexed by position, with the root at index 0.
//! Splits minimise the summed squared error of the two children over every
//! feature, using midpoints between adjacent distinct values as thresholds.

use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};

/// Growth limits shared by every tree of a forest
#[derive(Debug, Clone, Copy)]
pub struct TreeParams {
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

#[derive(Debug, Clone, Copy)]
struct Split {
    feature: usize,
    threshold: f64,
    score: f64,
}

/// Fitted regression tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    nodes: Vec<Node>,
}

impl RegressionTree {
    /// Grow a tree on the rows of `x` listed in `samples`. Repeated indices
    /// count once per occurrence, which is how bootstrap weighting enters.
    pub fn fit(x: &Array2<f64>, y: &[f64], samples: &[usize], params: &TreeParams) -> Self {
        let mut builder = TreeBuilder {
            x,
            y,
            params,
            nodes: Vec::new(),
        };
        let mut samples = samples.to_vec();
        if samples.is_empty() {
            builder.nodes.push(Node::Leaf { value: 0.0 });
        } else {
            builder.grow(&mut samples);
        }
        Self {
            nodes: builder.nodes,
        }
    }

    /// Walk from the root to a leaf
    pub fn predict_row(&self, row: ArrayView1<f64>) -> f64 {
        let mut index = 0;
        loop {
            match self.nodes[index] {
                Node::Leaf { value } => return value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if row[feature] <= threshold { left } else { right };
                }
            }
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(0, 0)];
        while let Some((index, depth)) = stack.pop() {
            match self.nodes[index] {
                Node::Leaf { .. } => deepest = deepest.max(depth),
                Node::Split { left, right, .. } => {
                    stack.push((left, depth + 1));
                    stack.push((right, depth + 1));
                }
            }
        }
        deepest
    }
}

/// Pending node: a sample range still to be split or turned into a leaf
struct Pending {
    start: usize,
    end: usize,
    depth: usize,
    slot: usize,
}

struct TreeBuilder<'a> {
    x: &'a Array2<f64>,
    y: &'a [f64],
    params: &'a TreeParams,
    nodes: Vec<Node>,
}

impl TreeBuilder<'_> {
    /// Grow depth-first from an explicit work stack, so deep trees do not
    /// consume call stack. Children are reserved as a pair after their parent.
    fn grow(&mut self, samples: &mut [usize]) {
        self.nodes.push(Node::Leaf { value: 0.0 });
        let mut stack = vec![Pending {
            start: 0,
            end: samples.len(),
            depth: 0,
            slot: 0,
        }];

        while let Some(Pending {
            start,
            end,
            depth,
            slot,
        }) = stack.pop()
        {
            let node_samples = &mut samples[start..end];
            let n = node_samples.len();
            let sum: f64 = node_samples.iter().map(|&i| self.y[i]).sum();
            let mean = sum / n as f64;

            let splittable = n >= self.params.min_samples_split
                && n >= 2 * self.params.min_samples_leaf
                && self.params.max_depth.is_none_or(|max| depth < max)
                && !self.is_pure(node_samples);

            let split = if splittable {
                self.best_split(node_samples, sum)
            } else {
                None
            };

            let Some(split) = split else {
                self.nodes[slot] = Node::Leaf { value: mean };
                continue;
            };

            let mid = start
                + partition(node_samples, |i| {
                    self.x[[i, split.feature]] <= split.threshold
                });

            let left = self.nodes.len();
            let right = left + 1;
            self.nodes.push(Node::Leaf { value: mean });
            self.nodes.push(Node::Leaf { value: mean });
            self.nodes[slot] = Node::Split {
                feature: split.feature,
                threshold: split.threshold,
                left,
                right,
            };

            stack.push(Pending {
                start: mid,
                end,
                depth: depth + 1,
                slot: right,
            });
            stack.push(Pending {
                start,
                end: mid,
                depth: depth + 1,
                slot: left,
            });
        }
    }

    fn is_pure(&self, samples: &[usize]) -> bool {
        let first = self.y[samples[0]];
        samples.iter().all(|&i| self.y[i] == first)
    }

    /// Maximise sum_l²/n_l + sum_r²/n_r, equivalent to minimising child SSE
    fn best_split(&self, samples: &[usize], total: f64) -> Option<Split> {
        let n = samples.len();
        let min_leaf = self.params.min_samples_leaf;
        let parent_score = total * total / n as f64;

        let mut order = samples.to_vec();
        let mut best: Option<Split> = None;

        for feature in 0..self.x.ncols() {
            order.sort_by(|&a, &b| self.x[[a, feature]].total_cmp(&self.x[[b, feature]]));

            let mut left_sum = 0.0;
            for k in 0..n - 1 {
                left_sum += self.y[order[k]];
                let left_n = k + 1;
                let right_n = n - left_n;
                if left_n < min_leaf || right_n < min_leaf {
                    continue;
                }

                let low = self.x[[order[k], feature]];
                let high = self.x[[order[k + 1], feature]];
                if low >= high {
                    continue;
                }

                let right_sum = total - left_sum;
                let score =
                    left_sum * left_sum / left_n as f64 + right_sum * right_sum / right_n as f64;

                if best.is_none_or(|b| score > b.score) {
                    let mut threshold = low + (high - low) / 2.0;
                    if threshold >= high {
                        threshold = low;
                    }
                    best = Some(Split {
                        feature,
                        threshold,
                        score,
                    });
                }
            }
        }

        let tolerance = 1e-12 * parent_score.abs().max(1.0);
        best.filter(|split| split.score - parent_score > tolerance)
    }
}

/// Move entries satisfying `goes_left` to the front; returns the boundary
fn partition(samples: &mut [usize], goes_left: impl Fn(usize) -> bool) -> usize {
    let mut boundary = 0;
    for k in 0..samples.len() {
        if goes_left(samples[k]) {
            samples.swap(boundary, k);
            boundary += 1;
        }
    }
    boundary
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn params() -> TreeParams {
        TreeParams {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
        }
    }

    fn all(n: usize) -> Vec<usize> {
        (0..n).collect()
    }

    #[test]
    fn test_step_function_is_learned_exactly() {
        let x = array![[1.0], [2.0], [3.0], [10.0], [11.0], [12.0]];
        let y = [5.0, 5.0, 5.0, 50.0, 50.0, 50.0];
        let tree = RegressionTree::fit(&x, &y, &all(6), &params());

        assert_eq!(tree.depth(), 1);
        assert_eq!(tree.predict_row(array![2.5].view()), 5.0);
        assert_eq!(tree.predict_row(array![6.5].view()), 5.0);
        assert_eq!(tree.predict_row(array![6.6].view()), 50.0);
    }

    #[test]
    fn test_chooses_informative_feature() {
        let x = array![[0.0, 1.0], [0.0, 2.0], [1.0, 1.0], [1.0, 2.0]];
        let y = [1.0, 9.0, 1.0, 9.0];
        let tree = RegressionTree::fit(&x, &y, &all(4), &params());

        assert_eq!(tree.depth(), 1);
        assert_eq!(tree.predict_row(array![1.0, 1.0].view()), 1.0);
        assert_eq!(tree.predict_row(array![0.0, 2.0].view()), 9.0);
    }

    #[test]
    fn test_pure_node_is_a_leaf() {
        let x = array![[1.0], [2.0], [3.0]];
        let y = [7.0, 7.0, 7.0];
        let tree = RegressionTree::fit(&x, &y, &all(3), &params());
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.predict_row(array![100.0].view()), 7.0);
    }

    #[test]
    fn test_identical_features_cannot_split() {
        let x = array![[4.0], [4.0], [4.0]];
        let y = [1.0, 2.0, 6.0];
        let tree = RegressionTree::fit(&x, &y, &all(3), &params());
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.predict_row(array![4.0].view()), 3.0);
    }

    #[test]
    fn test_max_depth_limits_growth() {
        let x = array![[1.0], [2.0], [3.0], [4.0], [5.0], [6.0], [7.0], [8.0]];
        let y = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let limited = TreeParams {
            max_depth: Some(2),
            ..params()
        };

        assert_eq!(RegressionTree::fit(&x, &y, &all(8), &limited).depth(), 2);
        assert_eq!(RegressionTree::fit(&x, &y, &all(8), &params()).depth(), 3);
    }

    #[test]
    fn test_min_samples_leaf_respected() {
        let x = array![[1.0], [2.0], [3.0], [4.0]];
        let y = [100.0, 0.0, 0.0, 0.0];
        let limited = TreeParams {
            min_samples_leaf: 2,
            ..params()
        };
        let tree = RegressionTree::fit(&x, &y, &all(4), &limited);

        assert_eq!(tree.depth(), 1);
        assert_eq!(tree.predict_row(array![1.0].view()), 50.0);
    }

    #[test]
    fn test_duplicate_samples_weight_the_mean() {
        let x = array![[1.0], [1.0]];
        let y = [0.0, 30.0];
        let tree = RegressionTree::fit(&x, &y, &[0, 1, 1], &params());
        assert_eq!(tree.predict_row(array![1.0].view()), 20.0);
    }

    #[test]
    fn test_chain_of_single_sample_splits() {
        // With targets tripling per sample, peeling off the largest one is
        // the best split at every level, so the tree is a chain
        let n = 300;
        let x = Array2::from_shape_fn((n, 1), |(i, _)| i as f64);
        let y: Vec<f64> = (0..n).map(|i| 3f64.powi(i as i32)).collect();
        let tree = RegressionTree::fit(&x, &y, &all(n), &params());

        assert_eq!(tree.depth(), n - 1);
        assert_eq!(tree.node_count(), 2 * n - 1);
        assert_eq!(tree.predict_row(array![(n - 1) as f64].view()), y[n - 1]);
        assert_eq!(tree.predict_row(array![0.0].view()), y[0]);
    }

    #[test]
    fn test_partition_keeps_all_entries() {
        let mut samples = vec![5, 2, 8, 1, 9];
        let mid = partition(&mut samples, |i| i < 5);
        assert_eq!(mid, 2);
        let mut left = samples[..mid].to_vec();
        left.sort();
        assert_eq!(left, vec![1, 2]);
        assert_eq!(samples.len(), 5);
    }
}
