//! Model training and evaluation for mitoclass: dataset splitting, the
//! random-forest and logistic-regression trainers, confusion matrices and
//! importance tables, and the k-mer training-time sweep.

pub mod dataset;
pub mod evaluate;
pub mod forest;
pub mod logistic;
pub mod pipeline;
pub mod sweep;

pub use dataset::{split, FeatureMatrix, SplitPool};
pub use evaluate::{Classifier, ConfusionMatrix, ImportanceRow, ImportanceTable};
pub use forest::{CvReport, RandomForest};
pub use logistic::LogisticRegression;
pub use pipeline::{classify_pools, ClassificationOutcome};
pub use sweep::{load_sweep_table, render_sweep_csv, run_sweep, SweepRow};
