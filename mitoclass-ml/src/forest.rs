//! Random-forest trainer: CART trees over bootstrap samples with random
//! feature subsets per split, tuned by stratified k-fold cross-validation.

use crate::dataset::FeatureMatrix;
use crate::evaluate::{check_width, Classifier, ImportanceRow, ImportanceTable};
use mitoclass_core::config::ForestConfig;
use mitoclass_core::{FeatureSchema, GeneLabel, MitoclassError, MitoclassResult};
use ndarray::ArrayView1;
use rand::rngs::StdRng;
use rand::seq::index;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone)]
enum Node {
    Leaf {
        label: GeneLabel,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

#[derive(Debug, Clone)]
struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    fn predict(&self, row: ArrayView1<'_, f64>) -> GeneLabel {
        let mut current = 0usize;
        loop {
            match &self.nodes[current] {
                Node::Leaf { label } => return *label,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    current = if row[*feature] < *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }
}

/// Cross-validation outcome: the chosen features-per-split value and the
/// mean held-out accuracy per candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CvReport {
    pub folds: usize,
    pub chosen_mtry: usize,
    pub grid_scores: Vec<(usize, f64)>,
}

/// Ensemble of CART trees with mean-decrease-in-impurity importances.
#[derive(Debug, Clone)]
pub struct RandomForest {
    schema: FeatureSchema,
    trees: Vec<Tree>,
    pub mtry: usize,
    importance: Vec<f64>,
    class_importance: [Vec<f64>; 2],
}

impl RandomForest {
    /// Tune `mtry` by cross-validation, then fit the final forest on the full
    /// training matrix. Every stochastic step draws from RNG streams derived
    /// sequentially from `seed`, so the result is reproducible regardless of
    /// how many rayon threads fit the trees.
    pub fn fit(
        matrix: &FeatureMatrix,
        config: &ForestConfig,
        seed: u64,
    ) -> MitoclassResult<(Self, CvReport)> {
        let counts = matrix.class_counts();
        if counts[0] == 0 || counts[1] == 0 {
            return Err(MitoclassError::Convergence {
                model: "random forest".to_string(),
                detail: format!(
                    "training set is single-class ({} COI, {} CytB)",
                    counts[0], counts[1]
                ),
            });
        }

        let grid = effective_grid(config, matrix.n_cols());
        let cv = tune_mtry(matrix, config, &grid, seed)?;
        tracing::info!(
            mtry = cv.chosen_mtry,
            folds = cv.folds,
            "cross-validation selected features-per-split"
        );

        let fit = fit_trees(matrix, config, cv.chosen_mtry, seed);
        Ok((
            Self {
                schema: matrix.schema.clone(),
                trees: fit.trees,
                mtry: cv.chosen_mtry,
                importance: fit.importance,
                class_importance: fit.class_importance,
            },
            cv,
        ))
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn predict_row(&self, row: ArrayView1<'_, f64>) -> GeneLabel {
        let mut votes = [0usize; 2];
        for tree in &self.trees {
            votes[tree.predict(row).index()] += 1;
        }
        if votes[1] > votes[0] {
            GeneLabel::Cytb
        } else {
            GeneLabel::Coi
        }
    }
}

impl Classifier for RandomForest {
    fn name(&self) -> &'static str {
        "random forest"
    }

    fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    fn predict(&self, matrix: &FeatureMatrix) -> MitoclassResult<Vec<GeneLabel>> {
        check_width(&self.schema, matrix)?;
        Ok((0..matrix.n_rows())
            .map(|i| self.predict_row(matrix.row(i)))
            .collect())
    }

    fn importance(&self) -> ImportanceTable {
        let rows = self
            .schema
            .names()
            .iter()
            .enumerate()
            .map(|(i, name)| ImportanceRow {
                feature: name.clone(),
                score: self.importance[i],
                per_class: Some([self.class_importance[0][i], self.class_importance[1][i]]),
            })
            .collect();
        ImportanceTable::new("random forest", rows)
    }
}

fn effective_grid(config: &ForestConfig, n_features: usize) -> Vec<usize> {
    if !config.mtry_grid.is_empty() {
        let mut grid: Vec<usize> = config
            .mtry_grid
            .iter()
            .map(|&m| m.clamp(1, n_features))
            .collect();
        grid.sort_unstable();
        grid.dedup();
        return grid;
    }
    let upper = ((n_features as f64).sqrt().ceil() as usize + 2).min(n_features);
    (1..=upper).collect()
}

/// Stratified k-fold: each class's rows are shuffled and dealt round-robin,
/// so fold class balance mirrors the pool whenever counts allow it.
fn stratified_folds(labels: &[GeneLabel], folds: usize, rng: &mut StdRng) -> Vec<Vec<usize>> {
    let mut assignments: Vec<Vec<usize>> = vec![Vec::new(); folds];
    for class in GeneLabel::ALL {
        let mut members: Vec<usize> = labels
            .iter()
            .enumerate()
            .filter(|(_, l)| **l == class)
            .map(|(i, _)| i)
            .collect();
        members.shuffle(rng);
        for (slot, row) in members.into_iter().enumerate() {
            assignments[slot % folds].push(row);
        }
    }
    assignments
}

fn tune_mtry(
    matrix: &FeatureMatrix,
    config: &ForestConfig,
    grid: &[usize],
    seed: u64,
) -> MitoclassResult<CvReport> {
    let n = matrix.n_rows();
    if n < config.cv_folds {
        return Err(MitoclassError::Convergence {
            model: "random forest".to_string(),
            detail: format!(
                "{} training rows cannot form {} cross-validation folds",
                n, config.cv_folds
            ),
        });
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let folds = stratified_folds(&matrix.labels, config.cv_folds, &mut rng);

    // A degenerate fold poisons every candidate equally; abort up front.
    for (i, fold) in folds.iter().enumerate() {
        let mut held_out = [0usize; 2];
        for &row in fold {
            held_out[matrix.labels[row].index()] += 1;
        }
        let total = matrix.class_counts();
        let training = [total[0] - held_out[0], total[1] - held_out[1]];
        if held_out.contains(&0) || training.contains(&0) {
            return Err(MitoclassError::Convergence {
                model: "random forest".to_string(),
                detail: format!("cross-validation fold {} contains a single class", i + 1),
            });
        }
    }

    let mut grid_scores = Vec::with_capacity(grid.len());
    for &mtry in grid {
        let mut fold_accuracy = Vec::with_capacity(folds.len());
        for held_out in &folds {
            let train_rows: Vec<usize> = folds
                .iter()
                .filter(|f| !std::ptr::eq(*f, held_out))
                .flatten()
                .copied()
                .collect();
            let train = matrix.select_rows(&train_rows);
            let valid = matrix.select_rows(held_out);

            let fit = fit_trees(&train, config, mtry, seed);
            fold_accuracy.push(Tree::ensemble_accuracy(&fit.trees, &valid));
        }
        let mean = fold_accuracy.iter().sum::<f64>() / fold_accuracy.len() as f64;
        tracing::debug!(mtry, mean_accuracy = mean, "cross-validation candidate");
        grid_scores.push((mtry, mean));
    }

    // Ties resolve to the smaller candidate; the grid is ascending.
    let chosen_mtry = grid_scores
        .iter()
        .fold((grid_scores[0].0, f64::NEG_INFINITY), |best, &(m, acc)| {
            if acc > best.1 {
                (m, acc)
            } else {
                best
            }
        })
        .0;

    Ok(CvReport {
        folds: config.cv_folds,
        chosen_mtry,
        grid_scores,
    })
}

impl Tree {
    fn ensemble_accuracy(trees: &[Tree], valid: &FeatureMatrix) -> f64 {
        let correct = (0..valid.n_rows())
            .filter(|&i| {
                let mut votes = [0usize; 2];
                for tree in trees {
                    votes[tree.predict(valid.row(i)).index()] += 1;
                }
                let predicted = if votes[1] > votes[0] {
                    GeneLabel::Cytb
                } else {
                    GeneLabel::Coi
                };
                predicted == valid.labels[i]
            })
            .count();
        correct as f64 / valid.n_rows() as f64
    }
}

struct ForestFit {
    trees: Vec<Tree>,
    importance: Vec<f64>,
    class_importance: [Vec<f64>; 2],
}

fn fit_trees(matrix: &FeatureMatrix, config: &ForestConfig, mtry: usize, seed: u64) -> ForestFit {
    // Per-tree seeds are drawn sequentially before the parallel section so
    // thread scheduling cannot change the result.
    let mut seed_rng = StdRng::seed_from_u64(seed);
    let tree_seeds: Vec<u64> = (0..config.n_trees).map(|_| seed_rng.gen()).collect();

    let fits: Vec<TreeFit> = tree_seeds
        .par_iter()
        .map(|&tree_seed| fit_one_tree(matrix, config, mtry, tree_seed))
        .collect();

    let p = matrix.n_cols();
    let mut importance = vec![0.0; p];
    let mut class_importance = [vec![0.0; p], vec![0.0; p]];
    for fit in &fits {
        for i in 0..p {
            importance[i] += fit.importance[i];
            class_importance[0][i] += fit.class_importance[0][i];
            class_importance[1][i] += fit.class_importance[1][i];
        }
    }
    let n_trees = fits.len() as f64;
    for i in 0..p {
        importance[i] /= n_trees;
        class_importance[0][i] /= n_trees;
        class_importance[1][i] /= n_trees;
    }

    ForestFit {
        trees: fits.into_iter().map(|f| f.tree).collect(),
        importance,
        class_importance,
    }
}

struct TreeFit {
    tree: Tree,
    importance: Vec<f64>,
    class_importance: [Vec<f64>; 2],
}

fn fit_one_tree(matrix: &FeatureMatrix, config: &ForestConfig, mtry: usize, seed: u64) -> TreeFit {
    let n = matrix.n_rows();
    let mut rng = StdRng::seed_from_u64(seed);
    let bootstrap: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();

    let mut builder = TreeBuilder {
        matrix,
        mtry: mtry.max(1).min(matrix.n_cols()),
        min_leaf: config.min_samples_leaf.max(1),
        max_depth: config.max_depth,
        n_total: bootstrap.len() as f64,
        nodes: Vec::new(),
        importance: vec![0.0; matrix.n_cols()],
        class_importance: [vec![0.0; matrix.n_cols()], vec![0.0; matrix.n_cols()]],
        rng,
    };
    builder.grow(bootstrap, 0);

    TreeFit {
        tree: Tree {
            nodes: builder.nodes,
        },
        importance: builder.importance,
        class_importance: builder.class_importance,
    }
}

struct TreeBuilder<'a> {
    matrix: &'a FeatureMatrix,
    mtry: usize,
    min_leaf: usize,
    max_depth: Option<usize>,
    n_total: f64,
    nodes: Vec<Node>,
    importance: Vec<f64>,
    class_importance: [Vec<f64>; 2],
    rng: StdRng,
}

impl TreeBuilder<'_> {
    fn grow(&mut self, rows: Vec<usize>, depth: usize) -> usize {
        let counts = self.count_classes(&rows);
        let majority = majority_label(&counts);

        let depth_reached = self.max_depth.map(|d| depth >= d).unwrap_or(false);
        if counts[0] == 0 || counts[1] == 0 || rows.len() < 2 * self.min_leaf || depth_reached {
            return self.push_leaf(majority);
        }

        let best = self.best_split(&rows, &counts);
        let (feature, threshold, decrease) = match best {
            Some(split) => split,
            None => return self.push_leaf(majority),
        };

        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = rows
            .iter()
            .copied()
            .partition(|&row| self.matrix.x[[row, feature]] < threshold);

        // Weighted impurity decrease, attributed per class to the majority
        // side of each child.
        let node_weight = rows.len() as f64 / self.n_total;
        self.importance[feature] += node_weight * decrease;
        for child in [&left_rows, &right_rows] {
            let child_counts = self.count_classes(child);
            let child_majority = majority_label(&child_counts);
            let child_weight = child.len() as f64 / rows.len() as f64;
            self.class_importance[child_majority.index()][feature] +=
                node_weight * decrease * child_weight;
        }

        let id = self.push_leaf(majority); // placeholder, overwritten below
        let left = self.grow(left_rows, depth + 1);
        let right = self.grow(right_rows, depth + 1);
        self.nodes[id] = Node::Split {
            feature,
            threshold,
            left,
            right,
        };
        id
    }

    fn push_leaf(&mut self, label: GeneLabel) -> usize {
        self.nodes.push(Node::Leaf { label });
        self.nodes.len() - 1
    }

    fn count_classes(&self, rows: &[usize]) -> [usize; 2] {
        let mut counts = [0usize; 2];
        for &row in rows {
            counts[self.matrix.labels[row].index()] += 1;
        }
        counts
    }

    /// Best (feature, threshold, Gini decrease) over a random feature subset.
    fn best_split(&mut self, rows: &[usize], counts: &[usize; 2]) -> Option<(usize, f64, f64)> {
        let parent_gini = gini(counts);
        let candidates: Vec<usize> =
            index::sample(&mut self.rng, self.matrix.n_cols(), self.mtry).into_vec();

        let mut best: Option<(usize, f64, f64)> = None;
        for feature in candidates {
            if let Some((threshold, decrease)) =
                self.best_split_on(rows, feature, parent_gini, counts)
            {
                let better = match best {
                    Some((_, _, best_decrease)) => decrease > best_decrease,
                    None => true,
                };
                if better {
                    best = Some((feature, threshold, decrease));
                }
            }
        }
        best.filter(|&(_, _, decrease)| decrease > 1e-12)
    }

    fn best_split_on(
        &self,
        rows: &[usize],
        feature: usize,
        parent_gini: f64,
        counts: &[usize; 2],
    ) -> Option<(f64, f64)> {
        let mut pairs: Vec<(f64, usize)> = rows
            .iter()
            .map(|&row| {
                (
                    self.matrix.x[[row, feature]],
                    self.matrix.labels[row].index(),
                )
            })
            .collect();
        pairs.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

        let n = pairs.len();
        let mut left = [0usize; 2];
        let mut best: Option<(f64, f64)> = None;

        for i in 0..n - 1 {
            left[pairs[i].1] += 1;
            if pairs[i].0 >= pairs[i + 1].0 {
                continue;
            }
            let n_left = i + 1;
            let n_right = n - n_left;
            if n_left < self.min_leaf || n_right < self.min_leaf {
                continue;
            }
            let right = [counts[0] - left[0], counts[1] - left[1]];
            let weighted = (n_left as f64 / n as f64) * gini(&left)
                + (n_right as f64 / n as f64) * gini(&right);
            let decrease = parent_gini - weighted;

            let better = match best {
                Some((_, best_decrease)) => decrease > best_decrease,
                None => true,
            };
            if better {
                best = Some(((pairs[i].0 + pairs[i + 1].0) / 2.0, decrease));
            }
        }
        best
    }
}

fn gini(counts: &[usize; 2]) -> f64 {
    let n = (counts[0] + counts[1]) as f64;
    if n == 0.0 {
        return 0.0;
    }
    let p0 = counts[0] as f64 / n;
    let p1 = counts[1] as f64 / n;
    1.0 - p0 * p0 - p1 * p1
}

fn majority_label(counts: &[usize; 2]) -> GeneLabel {
    if counts[1] > counts[0] {
        GeneLabel::Cytb
    } else {
        GeneLabel::Coi
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::FeatureMatrix;
    use mitoclass_core::{FeatureSchema, FeatureVector};

    fn config() -> ForestConfig {
        ForestConfig {
            n_trees: 25,
            min_samples_leaf: 1,
            max_depth: None,
            cv_folds: 2,
            mtry_grid: vec![1, 2],
        }
    }

    /// Cleanly separable two-class pool over a 4-column schema.
    fn separable_matrix(per_class: usize) -> FeatureMatrix {
        let schema = FeatureSchema::single(1);
        let mut vectors = Vec::new();
        for i in 0..per_class {
            let jitter = (i % 5) as f64 * 0.01;
            vectors.push(FeatureVector::new(
                format!("coi{}", i),
                GeneLabel::Coi,
                vec![0.7 - jitter, 0.1, 0.1, 0.1 + jitter],
            ));
            vectors.push(FeatureVector::new(
                format!("cytb{}", i),
                GeneLabel::Cytb,
                vec![0.1, 0.7 - jitter, 0.1 + jitter, 0.1],
            ));
        }
        FeatureMatrix::from_vectors(&schema, &vectors).unwrap()
    }

    #[test]
    fn test_fit_separable_data() {
        let matrix = separable_matrix(20);
        let (forest, cv) = RandomForest::fit(&matrix, &config(), 42).unwrap();

        assert_eq!(forest.n_trees(), 25);
        assert_eq!(cv.folds, 2);
        assert_eq!(cv.grid_scores.len(), 2);
        assert!(cv.grid_scores.iter().any(|&(m, _)| m == forest.mtry));

        let predictions = forest.predict(&matrix).unwrap();
        let correct = predictions
            .iter()
            .zip(matrix.labels.iter())
            .filter(|(p, o)| p == o)
            .count();
        assert_eq!(correct, matrix.n_rows());
    }

    #[test]
    fn test_same_seed_same_predictions() {
        let matrix = separable_matrix(15);
        let (forest_a, _) = RandomForest::fit(&matrix, &config(), 7).unwrap();
        let (forest_b, _) = RandomForest::fit(&matrix, &config(), 7).unwrap();

        assert_eq!(forest_a.mtry, forest_b.mtry);
        assert_eq!(
            forest_a.predict(&matrix).unwrap(),
            forest_b.predict(&matrix).unwrap()
        );
    }

    #[test]
    fn test_importance_highlights_informative_features() {
        let matrix = separable_matrix(20);
        let (forest, _) = RandomForest::fit(&matrix, &config(), 42).unwrap();
        let table = forest.importance();

        assert_eq!(table.rows.len(), 4);
        // Columns A and C carry all the signal; G and T are near-constant.
        let top: Vec<&str> = table.top(2).iter().map(|r| r.feature.as_str()).collect();
        assert!(top.contains(&"A") || top.contains(&"C"));
        assert!(table.rows.iter().all(|r| r.per_class.is_some()));
        assert!(table.rows[0].score > 0.0);
    }

    #[test]
    fn test_single_class_training_set_fails() {
        let schema = FeatureSchema::single(1);
        let vectors: Vec<FeatureVector> = (0..10)
            .map(|i| {
                FeatureVector::new(
                    format!("coi{}", i),
                    GeneLabel::Coi,
                    vec![0.25, 0.25, 0.25, 0.25],
                )
            })
            .collect();
        let matrix = FeatureMatrix::from_vectors(&schema, &vectors).unwrap();

        let err = RandomForest::fit(&matrix, &config(), 1).unwrap_err();
        assert!(matches!(err, MitoclassError::Convergence { .. }));
    }

    #[test]
    fn test_degenerate_fold_fails() {
        let schema = FeatureSchema::single(1);
        let mut vectors: Vec<FeatureVector> = (0..10)
            .map(|i| {
                FeatureVector::new(format!("coi{}", i), GeneLabel::Coi, vec![0.7, 0.1, 0.1, 0.1])
            })
            .collect();
        // One lone CytB row: with 2 folds, one fold's held-out or training
        // portion must end up single-class.
        vectors.push(FeatureVector::new(
            "cytb0".to_string(),
            GeneLabel::Cytb,
            vec![0.1, 0.7, 0.1, 0.1],
        ));
        let matrix = FeatureMatrix::from_vectors(&schema, &vectors).unwrap();

        let err = RandomForest::fit(&matrix, &config(), 1).unwrap_err();
        match err {
            MitoclassError::Convergence { detail, .. } => {
                assert!(detail.contains("single class"), "unexpected detail: {detail}")
            }
            other => panic!("expected Convergence, got {other}"),
        }
    }

    #[test]
    fn test_width_mismatch_on_predict() {
        let matrix = separable_matrix(15);
        let (forest, _) = RandomForest::fit(&matrix, &config(), 3).unwrap();

        let wide_schema = FeatureSchema::combined(&[1, 2]).unwrap();
        let wide_vectors: Vec<FeatureVector> = (0..4)
            .map(|i| FeatureVector::new(format!("w{}", i), GeneLabel::Coi, vec![0.05; 20]))
            .collect();
        let wide = FeatureMatrix::from_vectors(&wide_schema, &wide_vectors).unwrap();

        let err = forest.predict(&wide).unwrap_err();
        assert!(matches!(
            err,
            MitoclassError::ShapeMismatch {
                expected: 4,
                actual: 20
            }
        ));
    }
}
