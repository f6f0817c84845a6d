//! Binomial logistic regression fit by iteratively reweighted least squares.
//!
//! Columns are standardized before fitting so coefficient magnitudes are
//! comparable across features; importance is the absolute standardized
//! coefficient. Composition blocks sum to one, which makes the unpenalized
//! normal equations rank deficient, so a small configurable ridge term keeps
//! the solve well posed.

use crate::dataset::FeatureMatrix;
use crate::evaluate::{check_width, Classifier, ImportanceRow, ImportanceTable};
use mitoclass_core::config::LogisticConfig;
use mitoclass_core::{FeatureSchema, GeneLabel, MitoclassError, MitoclassResult};
use ndarray::{Array1, Array2, ArrayView1};

const PROB_FLOOR: f64 = 1e-10;

#[derive(Debug, Clone)]
pub struct LogisticRegression {
    schema: FeatureSchema,
    means: Vec<f64>,
    stds: Vec<f64>,
    /// Coefficients in standardized feature space, intercept last.
    coefficients: Vec<f64>,
    intercept: f64,
    pub n_iter: usize,
    pub deviance: f64,
}

impl LogisticRegression {
    pub fn fit(matrix: &FeatureMatrix, config: &LogisticConfig) -> MitoclassResult<Self> {
        let n = matrix.n_rows();
        let p = matrix.n_cols();
        if n == 0 {
            return Err(MitoclassError::InvalidInput(
                "cannot fit logistic regression on an empty matrix".to_string(),
            ));
        }

        let counts = matrix.class_counts();
        if counts[0] == 0 || counts[1] == 0 {
            return Err(MitoclassError::Convergence {
                model: "logistic regression".to_string(),
                detail: format!(
                    "training set is single-class ({} COI, {} CytB)",
                    counts[0], counts[1]
                ),
            });
        }

        // Standardize columns; constant columns keep std 1 and end up with a
        // zero coefficient.
        let mut means = vec![0.0; p];
        let mut stds = vec![1.0; p];
        for j in 0..p {
            let column = matrix.x.column(j);
            let mean = column.sum() / n as f64;
            let var = column.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n as f64;
            means[j] = mean;
            if var.sqrt() > 1e-12 {
                stds[j] = var.sqrt();
            }
        }

        let mut xs = Array2::zeros((n, p + 1));
        for i in 0..n {
            for j in 0..p {
                xs[[i, j]] = (matrix.x[[i, j]] - means[j]) / stds[j];
            }
            xs[[i, p]] = 1.0; // intercept column
        }
        let y: Array1<f64> = matrix.labels.iter().map(|l| l.index() as f64).collect();

        let mut beta = Array1::<f64>::zeros(p + 1);
        let mut old_deviance = f64::INFINITY;
        let mut converged = None;

        for iteration in 1..=config.max_iter {
            let eta = xs.dot(&beta);
            let probs = eta.mapv(sigmoid);

            // Weighted least-squares step on the working response.
            let weights = probs.mapv(|prob| (prob * (1.0 - prob)).max(PROB_FLOOR));
            let z = &eta + &((&y - &probs) / &weights);

            let mut xtwx = Array2::<f64>::zeros((p + 1, p + 1));
            let mut xtwz = Array1::<f64>::zeros(p + 1);
            for i in 0..n {
                let w = weights[i];
                for a in 0..=p {
                    let xa = xs[[i, a]];
                    xtwz[a] += w * xa * z[i];
                    for b in a..=p {
                        xtwx[[a, b]] += w * xa * xs[[i, b]];
                    }
                }
            }
            for a in 0..=p {
                for b in 0..a {
                    xtwx[[a, b]] = xtwx[[b, a]];
                }
            }
            // Ridge on the feature coefficients, not on the intercept.
            for j in 0..p {
                xtwx[[j, j]] += config.ridge;
            }

            beta = solve_linear_system(xtwx, xtwz).ok_or_else(|| MitoclassError::Convergence {
                model: "logistic regression".to_string(),
                detail: format!("singular weighted system at iteration {}", iteration),
            })?;

            let deviance = {
                let eta = xs.dot(&beta);
                let probs = eta.mapv(sigmoid);
                -2.0 * probs
                    .iter()
                    .zip(y.iter())
                    .map(|(&prob, &yi)| {
                        let prob = prob.clamp(PROB_FLOOR, 1.0 - PROB_FLOOR);
                        yi * prob.ln() + (1.0 - yi) * (1.0 - prob).ln()
                    })
                    .sum::<f64>()
            };

            if (old_deviance - deviance).abs() / (deviance.abs() + 0.1) < config.tolerance {
                converged = Some((iteration, deviance));
                break;
            }
            old_deviance = deviance;
        }

        let (n_iter, deviance) = converged.ok_or_else(|| MitoclassError::Convergence {
            model: "logistic regression".to_string(),
            detail: format!(
                "deviance still changing after {} iterations",
                config.max_iter
            ),
        })?;

        tracing::info!(n_iter, deviance, "logistic regression converged");

        Ok(Self {
            schema: matrix.schema.clone(),
            means,
            stds,
            coefficients: beta.iter().take(p).copied().collect(),
            intercept: beta[p],
            n_iter,
            deviance,
        })
    }

    fn linear_predictor(&self, row: ArrayView1<'_, f64>) -> f64 {
        let mut eta = self.intercept;
        for (j, &value) in row.iter().enumerate() {
            eta += self.coefficients[j] * (value - self.means[j]) / self.stds[j];
        }
        eta
    }

    pub fn predict_proba_row(&self, row: ArrayView1<'_, f64>) -> f64 {
        sigmoid(self.linear_predictor(row))
    }

    pub fn predict_row(&self, row: ArrayView1<'_, f64>) -> GeneLabel {
        if self.predict_proba_row(row) > 0.5 {
            GeneLabel::Cytb
        } else {
            GeneLabel::Coi
        }
    }
}

impl Classifier for LogisticRegression {
    fn name(&self) -> &'static str {
        "logistic regression"
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
            .map(|(j, name)| ImportanceRow {
                feature: name.clone(),
                score: self.coefficients[j].abs(),
                per_class: None,
            })
            .collect();
        ImportanceTable::new("logistic regression", rows)
    }
}

fn sigmoid(eta: f64) -> f64 {
    1.0 / (1.0 + (-eta).exp())
}

/// Gaussian elimination with partial pivoting; None on a singular system.
fn solve_linear_system(mut a: Array2<f64>, mut b: Array1<f64>) -> Option<Array1<f64>> {
    let n = b.len();
    for col in 0..n {
        let pivot_row = (col..n)
            .max_by(|&r1, &r2| {
                a[[r1, col]]
                    .abs()
                    .partial_cmp(&a[[r2, col]].abs())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .unwrap();
        if a[[pivot_row, col]].abs() < 1e-12 {
            return None;
        }
        if pivot_row != col {
            for j in 0..n {
                let tmp = a[[col, j]];
                a[[col, j]] = a[[pivot_row, j]];
                a[[pivot_row, j]] = tmp;
            }
            b.swap(col, pivot_row);
        }
        for row in col + 1..n {
            let factor = a[[row, col]] / a[[col, col]];
            if factor == 0.0 {
                continue;
            }
            for j in col..n {
                a[[row, j]] -= factor * a[[col, j]];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = Array1::<f64>::zeros(n);
    for row in (0..n).rev() {
        let mut sum = b[row];
        for j in row + 1..n {
            sum -= a[[row, j]] * x[j];
        }
        x[row] = sum / a[[row, row]];
    }
    Some(x)
}
