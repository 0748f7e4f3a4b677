use std::collections::BTreeMap;

use slimtrace_catalog::{StrategyConfig, PRESCRIPTIONS};
use slimtrace_core::render_records;
use slimtrace_core::token::{context_window_percent, estimate_total_tokens};
use slimtrace_types::{Record, RecordKind};

use crate::applier;

#[derive(Debug, Clone)]
pub struct KindBreakdown {
    pub kind: RecordKind,
    pub count: usize,
    pub bytes: usize,
}

#[derive(Debug, Clone)]
pub struct HeavyRecord {
    pub line_no: usize,
    pub uuid: String,
    pub kind: RecordKind,
    pub bytes: usize,
}

#[derive(Debug, Clone)]
pub struct BloatSignature {
    pub label: &'static str,
    pub count: usize,
}

/// What treating the session with a whole prescription would do, computed
/// without mutating the real transcript (spec §4.2 "prescription savings
/// projections").
#[derive(Debug, Clone)]
pub struct PrescriptionProjection {
    pub name: &'static str,
    pub removed_count: usize,
    pub modified_count: usize,
    pub bytes_saved: i64,
    pub tokens_after: u64,
}

#[derive(Debug, Clone)]
pub struct Diagnosis {
    pub record_count: usize,
    pub total_bytes: usize,
    pub total_tokens: u64,
    pub context_window_percent: f64,
    pub breakdown: Vec<KindBreakdown>,
    /// Top 10 heaviest records by approximate byte size, heaviest first.
    pub heaviest: Vec<HeavyRecord>,
    pub bloat_signatures: Vec<BloatSignature>,
    pub projections: Vec<PrescriptionProjection>,
}

/// Build a full diagnosis of a record sequence: size/token accounting,
/// a per-kind breakdown, the heaviest individual records, bloat signatures,
/// and a dry-run savings projection for each canonical prescription.
pub fn diagnose(records: &[Record]) -> Diagnosis {
    let total_bytes = render_records(records).len();
    let total_tokens = estimate_total_tokens(records);

    let mut by_kind: BTreeMap<RecordKind, (usize, usize)> = BTreeMap::new();
    for record in records {
        let entry = by_kind.entry(record.kind).or_insert((0, 0));
        entry.0 += 1;
        entry.1 += record.approx_bytes();
    }
    let breakdown = by_kind
        .into_iter()
        .map(|(kind, (count, bytes))| KindBreakdown { kind, count, bytes })
        .collect();

    let mut heaviest: Vec<HeavyRecord> = records
        .iter()
        .map(|r| HeavyRecord {
            line_no: r.line_no,
            uuid: r.uuid.clone(),
            kind: r.kind,
            bytes: r.approx_bytes(),
        })
        .collect();
    heaviest.sort_by(|a, b| b.bytes.cmp(&a.bytes));
    heaviest.truncate(10);

    let bloat_signatures = detect_bloat_signatures(records);

    let config = StrategyConfig::default();
    let projections = PRESCRIPTIONS
        .iter()
        .map(|prescription| {
            let applied = applier::run(records, prescription.strategies, &config);
            let removed_count: usize = applied.strategy_results.iter().map(|r| r.removed_count).sum();
            let modified_count: usize = applied.strategy_results.iter().map(|r| r.modified_count).sum();
            let bytes_saved = total_bytes as i64 - render_records(&applied.records).len() as i64;
            PrescriptionProjection {
                name: prescription.name,
                removed_count,
                modified_count,
                bytes_saved,
                tokens_after: estimate_total_tokens(&applied.records),
            }
        })
        .collect();

    Diagnosis {
        record_count: records.len(),
        total_bytes,
        total_tokens,
        context_window_percent: context_window_percent(total_tokens),
        breakdown,
        heaviest,
        bloat_signatures,
        projections,
    }
}

fn detect_bloat_signatures(records: &[Record]) -> Vec<BloatSignature> {
    let mut progress_ticks = 0usize;
    let mut thinking_blocks = 0usize;
    let mut oversized_blocks = 0usize;

    for record in records {
        if record.kind == RecordKind::ProgressTick {
            progress_ticks += 1;
        }
        for block in &record.content_blocks {
            if block.is_thinking() {
                thinking_blocks += 1;
            }
            if block.payload_bytes() > 8 * 1024 {
                oversized_blocks += 1;
            }
        }
    }

    [
        BloatSignature { label: "progress-tick records", count: progress_ticks },
        BloatSignature { label: "thinking blocks", count: thinking_blocks },
        BloatSignature { label: "content blocks over 8KiB", count: oversized_blocks },
    ]
    .into_iter()
    .filter(|s| s.count > 0)
    .collect()
}
