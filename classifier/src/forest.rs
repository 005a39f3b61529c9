//! Random forest of CART decision trees.
//!
//! Each tree is grown on a bootstrap sample of the training set, choosing
//! the best Gini split among a random subset of `sqrt(n_features)` features
//! at every node. Prediction averages the class distribution of the leaf
//! reached in each tree.
//!
//! Training is deterministic for a given seed and input order.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{BinaryClassifier, ClassifierError, Label};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// How many features each split may consider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaxFeatures {
    /// `floor(sqrt(n_features))`, at least 1.
    Sqrt,
    /// Every feature.
    All,
    /// A fixed count, clamped to `1..=n_features`.
    Count(usize),
}

impl MaxFeatures {
    fn resolve(self, n_features: usize) -> usize {
        let k = match self {
            MaxFeatures::Sqrt => (n_features as f64).sqrt() as usize,
            MaxFeatures::All => n_features,
            MaxFeatures::Count(k) => k,
        };
        k.clamp(1, n_features.max(1))
    }
}

/// ForestConfig configures random forest training.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestConfig {
    /// Number of trees. Default: 200.
    pub n_estimators: usize,
    /// Maximum tree depth; `None` grows until leaves are pure. Default: None.
    pub max_depth: Option<usize>,
    /// Minimum samples required to split a node. Default: 2.
    pub min_samples_split: usize,
    /// Features considered per split. Default: sqrt.
    pub max_features: MaxFeatures,
    /// Draw a bootstrap sample per tree. Default: true.
    pub bootstrap: bool,
    /// RNG seed. Default: 42.
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_estimators: 200,
            max_depth: None,
            min_samples_split: 2,
            max_features: MaxFeatures::Sqrt,
            bootstrap: true,
            seed: 42,
        }
    }
}

// ---------------------------------------------------------------------------
// Tree
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum Node {
    Leaf {
        proba: [f64; 2],
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// A single CART tree stored as a flat node arena; node 0 is the root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<Node>,
}

impl DecisionTree {
    /// Class distribution of the leaf `x` falls into.
    pub fn predict_proba(&self, x: &[f64]) -> [f64; 2] {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { proba } => return *proba,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if x[*feature] <= *threshold { *left } else { *right };
                }
            }
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Checks that every path from the root ends in a well-formed leaf.
    ///
    /// Children must come after their parent in the arena, which also rules
    /// out cycles.
    fn validate(&self, n_features: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".into());
        }
        let len = self.nodes.len();
        for (i, node) in self.nodes.iter().enumerate() {
            match node {
                Node::Leaf { proba } => {
                    let in_range = proba.iter().all(|p| p.is_finite() && (0.0..=1.0).contains(p));
                    if !in_range || (proba[0] + proba[1] - 1.0).abs() > 1e-6 {
                        return Err(format!("node {i}: invalid leaf distribution {proba:?}"));
                    }
                }
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= n_features {
                        return Err(format!(
                            "node {i}: feature {feature} out of range for {n_features} features"
                        ));
                    }
                    if !threshold.is_finite() {
                        return Err(format!("node {i}: non-finite threshold"));
                    }
                    for child in [*left, *right] {
                        if child <= i || child >= len {
                            return Err(format!("node {i}: child index {child} out of order"));
                        }
                    }
                }
            }
        }
        Ok(())
    }

    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], idx: usize) -> usize {
            match &nodes[idx] {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => 1 + walk(nodes, *left).max(walk(nodes, *right)),
            }
        }
        walk(&self.nodes, 0)
    }
}

struct TreeBuilder<'a> {
    x: &'a [Vec<f64>],
    y: &'a [Label],
    cfg: &'a ForestConfig,
    n_features: usize,
    max_features: usize,
    nodes: Vec<Node>,
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    impurity: f64,
}

impl TreeBuilder<'_> {
    fn counts(&self, idx: &[usize]) -> [usize; 2] {
        let mut c = [0usize; 2];
        for &i in idx {
            c[self.y[i].index()] += 1;
        }
        c
    }

    fn leaf(counts: [usize; 2]) -> Node {
        let total = (counts[0] + counts[1]) as f64;
        Node::Leaf {
            proba: [counts[0] as f64 / total, counts[1] as f64 / total],
        }
    }

    /// Grows the subtree for `idx` and returns its node index.
    fn grow(&mut self, idx: &mut [usize], depth: usize, rng: &mut StdRng) -> usize {
        let counts = self.counts(idx);
        let pure = counts[0] == 0 || counts[1] == 0;
        let depth_reached = self.cfg.max_depth.is_some_and(|d| depth >= d);

        if pure || depth_reached || idx.len() < self.cfg.min_samples_split.max(2) {
            self.nodes.push(Self::leaf(counts));
            return self.nodes.len() - 1;
        }

        let Some(split) = self.best_split(idx, counts, rng) else {
            self.nodes.push(Self::leaf(counts));
            return self.nodes.len() - 1;
        };

        // Reserve this node, then fill in children.
        let me = self.nodes.len();
        self.nodes.push(Self::leaf(counts));

        let mid = partition(idx, |i| self.x[i][split.feature] <= split.threshold);
        let (l, r) = idx.split_at_mut(mid);
        let left = self.grow(l, depth + 1, rng);
        let right = self.grow(r, depth + 1, rng);

        self.nodes[me] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        me
    }

    fn best_split(&self, idx: &[usize], counts: [usize; 2], rng: &mut StdRng) -> Option<BestSplit> {
        let n = idx.len();
        let parent = gini(counts, n);
        let mut best: Option<BestSplit> = None;

        let candidates = rand::seq::index::sample(rng, self.n_features, self.max_features);
        let mut order: Vec<usize> = idx.to_vec();

        for feature in candidates.iter() {
            order.copy_from_slice(idx);
            order.sort_by(|&a, &b| {
                self.x[a][feature]
                    .total_cmp(&self.x[b][feature])
                    .then(a.cmp(&b))
            });

            let mut left = [0usize; 2];
            for pos in 0..n - 1 {
                left[self.y[order[pos]].index()] += 1;
                let lo = self.x[order[pos]][feature];
                let hi = self.x[order[pos + 1]][feature];
                if lo >= hi {
                    continue;
                }
                let n_left = pos + 1;
                let n_right = n - n_left;
                let right = [counts[0] - left[0], counts[1] - left[1]];
                let impurity = (n_left as f64 * gini(left, n_left)
                    + n_right as f64 * gini(right, n_right))
                    / n as f64;

                if impurity < parent - 1e-12
                    && best.as_ref().is_none_or(|b| impurity < b.impurity)
                {
                    let mut threshold = lo + (hi - lo) / 2.0;
                    if threshold >= hi {
                        threshold = lo;
                    }
                    best = Some(BestSplit {
                        feature,
                        threshold,
                        impurity,
                    });
                }
            }
        }
        best
    }
}

fn gini(counts: [usize; 2], n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let p0 = counts[0] as f64 / n as f64;
    let p1 = counts[1] as f64 / n as f64;
    1.0 - p0 * p0 - p1 * p1
}

/// Stable partition: elements satisfying `pred` first. Returns their count.
fn partition(idx: &mut [usize], pred: impl Fn(usize) -> bool) -> usize {
    let (yes, no): (Vec<usize>, Vec<usize>) = idx.iter().partition(|&&i| pred(i));
    let mid = yes.len();
    for (slot, v) in idx.iter_mut().zip(yes.into_iter().chain(no)) {
        *slot = v;
    }
    mid
}

// ---------------------------------------------------------------------------
// Forest
// ---------------------------------------------------------------------------

/// An ensemble of [`DecisionTree`]s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    n_features: usize,
    trees: Vec<DecisionTree>,
}

impl RandomForest {
    /// Fits a forest on rows `x` with labels `y`.
    pub fn fit(x: &[Vec<f64>], y: &[Label], cfg: &ForestConfig) -> Result<Self, ClassifierError> {
        if x.is_empty() {
            return Err(ClassifierError::Training("no training samples".into()));
        }
        if x.len() != y.len() {
            return Err(ClassifierError::Training(format!(
                "{} rows but {} labels",
                x.len(),
                y.len()
            )));
        }
        if cfg.n_estimators == 0 {
            return Err(ClassifierError::Training("n_estimators must be positive".into()));
        }
        let n_features = x[0].len();
        if n_features == 0 {
            return Err(ClassifierError::Training("rows have no features".into()));
        }
        if let Some(row) = x.iter().position(|r| r.len() != n_features) {
            return Err(ClassifierError::Training(format!(
                "row {row} has {} features, expected {n_features}",
                x[row].len()
            )));
        }
        if x.iter().flatten().any(|v| !v.is_finite()) {
            return Err(ClassifierError::Training("non-finite feature value".into()));
        }

        let n = x.len();
        let mut master = StdRng::seed_from_u64(cfg.seed);
        let mut trees = Vec::with_capacity(cfg.n_estimators);

        for _ in 0..cfg.n_estimators {
            let mut rng = StdRng::seed_from_u64(master.r#gen::<u64>());
            let mut idx: Vec<usize> = if cfg.bootstrap {
                (0..n).map(|_| rng.gen_range(0..n)).collect()
            } else {
                (0..n).collect()
            };

            let mut builder = TreeBuilder {
                x,
                y,
                cfg,
                n_features,
                max_features: cfg.max_features.resolve(n_features),
                nodes: Vec::new(),
            };
            builder.grow(&mut idx, 0, &mut rng);
            trees.push(DecisionTree {
                nodes: builder.nodes,
            });
        }

        debug!(
            trees = trees.len(),
            samples = n,
            features = n_features,
            "fitted random forest"
        );
        Ok(Self { n_features, trees })
    }

    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }

    /// Structural check for forests read from disk.
    ///
    /// A forest that passes can score any finite vector of `n_features`
    /// values without panicking, and its probabilities sum to 1.
    pub fn validate(&self) -> Result<(), ClassifierError> {
        if self.n_features == 0 {
            return Err(ClassifierError::InvalidModel("forest has no features".into()));
        }
        if self.trees.is_empty() {
            return Err(ClassifierError::InvalidModel("forest has no trees".into()));
        }
        for (t, tree) in self.trees.iter().enumerate() {
            tree.validate(self.n_features)
                .map_err(|reason| ClassifierError::InvalidModel(format!("tree {t}: {reason}")))?;
        }
        Ok(())
    }
}

#[cfg(test)]
impl RandomForest {
    pub(crate) fn from_trees(n_features: usize, trees: Vec<DecisionTree>) -> Self {
        Self { n_features, trees }
    }
}

#[cfg(test)]
impl DecisionTree {
    /// A root split whose children point past the end of the arena.
    pub(crate) fn dangling() -> Self {
        Self {
            nodes: vec![Node::Split {
                feature: 0,
                threshold: 0.5,
                left: 7,
                right: 7,
            }],
        }
    }
}

impl BinaryClassifier for RandomForest {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict_proba(&self, features: &[f64]) -> [f64; 2] {
        let mut sum = [0.0f64; 2];
        for tree in &self.trees {
            let p = tree.predict_proba(features);
            sum[0] += p[0];
            sum[1] += p[1];
        }
        let n = self.trees.len() as f64;
        [sum[0] / n, sum[1] / n]
    }
}
