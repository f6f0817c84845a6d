//! Machine-readable run report plus the table rendering used by the CLI.

use chrono::{DateTime, Utc};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Table};
use mitoclass_bio::filter::FilterSummary;
use mitoclass_bio::sequence::PoolStats;
use mitoclass_core::{GeneLabel, PipelineConfig};
use mitoclass_ml::{ClassificationOutcome, ConfusionMatrix, CvReport, ImportanceTable, SweepRow};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct PoolReport {
    pub gene: String,
    pub filter: FilterSummary,
    pub stats: PoolStats,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelReport {
    pub model: String,
    pub accuracy: f64,
    pub confusion: ConfusionMatrix,
    pub importance: ImportanceTable,
    pub fit_secs: f64,
}

/// Everything a downstream reporting/visualization consumer needs from one
/// run, serialized as a single JSON document.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub generated: DateTime<Utc>,
    pub config: PipelineConfig,
    pub feature_names: Vec<String>,
    pub pools: Vec<PoolReport>,
    pub cv: CvReport,
    pub models: Vec<ModelReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sweep: Option<Vec<SweepRow>>,
}

impl RunReport {
    pub fn new(
        config: PipelineConfig,
        pools: Vec<PoolReport>,
        outcome: &ClassificationOutcome,
    ) -> Self {
        Self {
            generated: Utc::now(),
            config,
            feature_names: outcome.schema.names().to_vec(),
            pools,
            cv: outcome.cv.clone(),
            models: vec![
                ModelReport {
                    model: "random forest".to_string(),
                    accuracy: outcome.forest_confusion.accuracy(),
                    confusion: outcome.forest_confusion.clone(),
                    importance: outcome.forest_importance.clone(),
                    fit_secs: outcome.forest_fit_secs,
                },
                ModelReport {
                    model: "logistic regression".to_string(),
                    accuracy: outcome.logistic_confusion.accuracy(),
                    confusion: outcome.logistic_confusion.clone(),
                    importance: outcome.logistic_importance.clone(),
                    fit_secs: outcome.logistic_fit_secs,
                },
            ],
            sweep: None,
        }
    }
}

pub fn pool_table(pools: &[PoolReport]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec![
        "Gene",
        "Input",
        "Dropped (quality)",
        "Dropped (length)",
        "Retained",
        "Median len",
        "GC",
        "N bases",
    ]);
    for pool in pools {
        table.add_row(vec![
            Cell::new(&pool.gene),
            Cell::new(pool.filter.input),
            Cell::new(pool.filter.dropped_by_quality),
            Cell::new(pool.filter.dropped_by_length),
            Cell::new(pool.filter.survivors),
            Cell::new(format!("{:.1}", pool.filter.median_length)),
            Cell::new(format!("{:.3}", pool.stats.gc_content)),
            Cell::new(pool.stats.ambiguous_bases),
        ]);
    }
    table
}

pub fn composition_table(pools: &[PoolReport]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Gene", "A", "C", "G", "T", "N"]);
    for pool in pools {
        let mut row = vec![Cell::new(&pool.gene)];
        for base in ['A', 'C', 'G', 'T', 'N'] {
            let proportion = pool.stats.base_composition.get(&base).copied().unwrap_or(0.0);
            row.push(Cell::new(format!("{:.4}", proportion)));
        }
        table.add_row(row);
    }
    table
}

pub fn confusion_table(matrix: &ConfusionMatrix) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Observed \\ Predicted", "COI", "CytB"]);
    for observed in GeneLabel::ALL {
        table.add_row(vec![
            Cell::new(observed.as_str()),
            Cell::new(matrix.count(observed, GeneLabel::Coi)),
            Cell::new(matrix.count(observed, GeneLabel::Cytb)),
        ]);
    }
    table
}

pub fn importance_table(importance: &ImportanceTable, top: usize) -> Table {
    let mut table = Table::new();
    let per_class = importance.rows.iter().any(|r| r.per_class.is_some());
    let header = if per_class {
        vec!["Feature", "Importance", "COI", "CytB"]
    } else {
        vec!["Feature", "|coefficient|"]
    };
    table.load_preset(UTF8_FULL).set_header(header);

    for row in importance.top(top) {
        let mut cells = vec![
            Cell::new(&row.feature),
            Cell::new(format!("{:.6}", row.score)),
        ];
        if let Some([coi, cytb]) = row.per_class {
            cells.push(Cell::new(format!("{:.6}", coi)));
            cells.push(Cell::new(format!("{:.6}", cytb)));
        }
        table.add_row(cells);
    }
    table
}

pub fn sweep_table(rows: &[SweepRow]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["k", "Model", "Accuracy", "Fit time (s)"]);
    for row in rows {
        table.add_row(vec![
            Cell::new(row.k),
            Cell::new(&row.model),
            Cell::new(format!("{:.4}", row.accuracy)),
            Cell::new(format!("{:.3}", row.elapsed_secs)),
        ]);
    }
    table
}
