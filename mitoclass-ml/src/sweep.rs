//! Training-time scaling with k-mer size: one train/evaluate cycle per
//! (k, model), plus the loader for precomputed sweep tables from prior runs.

use crate::pipeline::classify_pools;
use mitoclass_bio::sequence::FilteredSequence;
use mitoclass_core::{FeatureSchema, MitoclassError, MitoclassResult, PipelineConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const FOREST_MODEL: &str = "random forest";
pub const LOGISTIC_MODEL: &str = "logistic regression";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepRow {
    pub k: usize,
    pub accuracy: f64,
    pub model: String,
    pub elapsed_secs: f64,
}

/// Rebuild the schema per k and run a full train/evaluate cycle for each
/// model, recording validation accuracy and wall-clock fit time.
pub fn run_sweep(
    coi: &[FilteredSequence],
    cytb: &[FilteredSequence],
    config: &PipelineConfig,
) -> MitoclassResult<Vec<SweepRow>> {
    let mut rows = Vec::with_capacity(config.sweep.kmer_sizes.len() * 2);
    for &k in &config.sweep.kmer_sizes {
        let schema = FeatureSchema::single(k);
        let outcome = classify_pools(coi, cytb, &schema, config)?;
        tracing::info!(
            k,
            forest_secs = outcome.forest_fit_secs,
            logistic_secs = outcome.logistic_fit_secs,
            "sweep step finished"
        );
        rows.push(SweepRow {
            k,
            accuracy: outcome.forest_confusion.accuracy(),
            model: FOREST_MODEL.to_string(),
            elapsed_secs: outcome.forest_fit_secs,
        });
        rows.push(SweepRow {
            k,
            accuracy: outcome.logistic_confusion.accuracy(),
            model: LOGISTIC_MODEL.to_string(),
            elapsed_secs: outcome.logistic_fit_secs,
        });
    }
    Ok(rows)
}

/// Parse a precomputed sweep table (tab-separated: k, accuracy, model,
/// elapsed seconds). A header line and `#` comments are tolerated.
pub fn load_sweep_table(path: &Path) -> MitoclassResult<Vec<SweepRow>> {
    let content = std::fs::read_to_string(path)?;
    let mut rows = Vec::new();

    for (line_no, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() != 4 {
            return Err(MitoclassError::Parse {
                path: path.display().to_string(),
                detail: format!(
                    "line {}: expected 4 tab-separated fields, found {}",
                    line_no + 1,
                    fields.len()
                ),
            });
        }

        // The first non-comment line may be the column-name header; anything
        // else non-numeric there is a malformed row, not a header.
        if rows.is_empty() && fields == ["k", "accuracy", "model", "elapsed_secs"] {
            continue;
        }

        let parse_err = |field: &str, what: &str| MitoclassError::Parse {
            path: path.display().to_string(),
            detail: format!("line {}: invalid {} '{}'", line_no + 1, what, field),
        };

        rows.push(SweepRow {
            k: fields[0]
                .parse()
                .map_err(|_| parse_err(fields[0], "k-mer size"))?,
            accuracy: fields[1]
                .parse()
                .map_err(|_| parse_err(fields[1], "accuracy"))?,
            model: fields[2].to_string(),
            elapsed_secs: fields[3]
                .parse()
                .map_err(|_| parse_err(fields[3], "elapsed seconds"))?,
        });
    }

    if rows.is_empty() {
        return Err(MitoclassError::Parse {
            path: path.display().to_string(),
            detail: "no sweep rows found".to_string(),
        });
    }
    Ok(rows)
}

/// Render sweep rows as CSV for the downstream plotting collaborator.
pub fn render_sweep_csv(rows: &[SweepRow]) -> String {
    let mut output = String::from("k,accuracy,model,elapsed_secs\n");
    for row in rows {
        output.push_str(&format!(
            "{},{:.6},{},{:.6}\n",
            row.k, row.accuracy, row.model, row.elapsed_secs
        ));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_sweep_table_with_header() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "# produced by a prior sweep run").unwrap();
        writeln!(file, "k\taccuracy\tmodel\telapsed_secs").unwrap();
        writeln!(file, "1\t0.912\trandom forest\t3.51").unwrap();
        writeln!(file, "1\t0.905\tlogistic regression\t0.08").unwrap();
        writeln!(file, "2\t0.981\trandom forest\t6.20").unwrap();
        file.flush().unwrap();

        let rows = load_sweep_table(file.path()).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].k, 1);
        assert_eq!(rows[0].model, "random forest");
        assert!((rows[1].accuracy - 0.905).abs() < 1e-12);
        assert!((rows[2].elapsed_secs - 6.20).abs() < 1e-12);
    }

    #[test]
    fn test_load_sweep_table_reports_line_numbers() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "1\t0.9\trandom forest\t1.0").unwrap();
        writeln!(file, "2\tnot-a-number\trandom forest\t2.0").unwrap();
        file.flush().unwrap();

        let err = load_sweep_table(file.path()).unwrap_err();
        match err {
            MitoclassError::Parse { detail, .. } => {
                assert!(detail.contains("line 2"), "unexpected detail: {detail}");
                assert!(detail.contains("accuracy"));
            }
            other => panic!("expected Parse error, got {other}"),
        }
    }

    #[test]
    fn test_malformed_first_row_is_not_mistaken_for_header() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "x\t0.9\trandom forest\t1.0").unwrap();
        writeln!(file, "1\t0.9\trandom forest\t1.0").unwrap();
        file.flush().unwrap();

        let err = load_sweep_table(file.path()).unwrap_err();
        match err {
            MitoclassError::Parse { detail, .. } => {
                assert!(detail.contains("line 1"), "unexpected detail: {detail}");
                assert!(detail.contains("k-mer size"));
            }
            other => panic!("expected Parse error, got {other}"),
        }
    }

    #[test]
    fn test_load_sweep_table_rejects_wrong_width() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "1\t0.9\trandom forest").unwrap();
        file.flush().unwrap();
        assert!(load_sweep_table(file.path()).is_err());
    }

    #[test]
    fn test_render_csv_round_trips_through_loader() {
        let rows = vec![
            SweepRow {
                k: 3,
                accuracy: 0.9875,
                model: FOREST_MODEL.to_string(),
                elapsed_secs: 12.25,
            },
            SweepRow {
                k: 3,
                accuracy: 0.9625,
                model: LOGISTIC_MODEL.to_string(),
                elapsed_secs: 0.5,
            },
        ];
        let csv = render_sweep_csv(&rows);
        assert!(csv.starts_with("k,accuracy,model,elapsed_secs\n"));
        assert_eq!(csv.lines().count(), 3);
        assert!(csv.contains("3,0.987500,random forest,12.250000"));
    }
}
