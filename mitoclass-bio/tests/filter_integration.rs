//! End-to-end checks of the trim -> quality -> length-window pipeline plus
//! featurization on realistic pools.
use mitoclass_bio::features::featurize_pool;
use mitoclass_bio::filter::{filter_pool, FilterOptions};
use mitoclass_bio::sequence::{PoolStats, SequenceRecord};
use mitoclass_core::{FeatureSchema, GeneLabel};

/// Deterministic pseudo-random nucleotide pool, no RNG dependency needed.
fn synthetic_pool(count: usize, base_len: usize) -> Vec<SequenceRecord> {
    (0..count)
        .map(|i| {
            let len = base_len + (i * 7) % 40;
            let mut seq = Vec::with_capacity(len + 6);
            seq.extend_from_slice(b"NN");
            for j in 0..len {
                let base = match (i * 31 + j * 17) % 4 {
                    0 => b'A',
                    1 => b'C',
                    2 => b'G',
                    _ => b'T',
                };
                seq.push(base);
            }
            seq.extend_from_slice(b"-NNN");
            SequenceRecord::new(format!("rec{}", i), seq)
        })
        .collect()
}

#[test]
fn test_filter_then_featurize_pipeline() {
    let pool = synthetic_pool(60, 600);
    let options = FilterOptions {
        max_n_fraction: 0.01,
        length_window: 100,
    };

    let (retained, summary) = filter_pool("COI", &pool, &options).unwrap();
    assert_eq!(summary.input, 60);
    assert_eq!(summary.survivors, retained.len());
    assert!(summary.survivors > 0);

    // Edges were trimmed: no N at either end, no gaps anywhere.
    for seq in &retained {
        assert_ne!(seq.sequence.first(), Some(&b'N'));
        assert_ne!(seq.sequence.last(), Some(&b'N'));
        assert!(!seq.sequence.contains(&b'-'));
    }

    let schema = FeatureSchema::combined(&[1, 2]).unwrap();
    let vectors = featurize_pool(&retained, GeneLabel::Coi, &schema).unwrap();
    assert_eq!(vectors.len(), retained.len());

    for vector in &vectors {
        assert_eq!(vector.width(), 20);
        for (_, offset, width) in schema.blocks() {
            let sum: f64 = vector.values[offset..offset + width].iter().sum();
            assert!((sum - 1.0).abs() < 1e-9);
        }
    }
}

#[test]
fn test_pool_stats_after_filtering() {
    let pool = synthetic_pool(40, 500);
    let options = FilterOptions {
        max_n_fraction: 0.01,
        length_window: 100,
    };
    let (retained, summary) = filter_pool("CytB", &pool, &options).unwrap();

    let stats = PoolStats::calculate(&retained);
    assert_eq!(stats.total_sequences, retained.len());
    assert_eq!(stats.median_length, summary.median_length);
    assert!(stats.min_length >= 500);
    assert!(stats.max_length <= 539);

    let composition_sum: f64 = stats.base_composition.values().sum();
    assert!((composition_sum - 1.0).abs() < 1e-9);
}
