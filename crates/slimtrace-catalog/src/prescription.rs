/// A named, ordered bundle of strategy names (spec §3, §6 `formulary`).
#[derive(Debug, Clone, Copy)]
pub struct Prescription {
    pub name: &'static str,
    pub description: &'static str,
    pub strategies: &'static [&'static str],
}

pub const GENTLE: &[&str] = &["progress-collapse", "file-history-dedup", "metadata-strip"];

pub const STANDARD: &[&str] = &[
    "progress-collapse",
    "file-history-dedup",
    "metadata-strip",
    "thinking-blocks",
    "tool-output-trim",
    "stale-reads",
    "system-reminder-dedup",
];

pub const AGGRESSIVE: &[&str] = &[
    "progress-collapse",
    "file-history-dedup",
    "metadata-strip",
    "thinking-blocks",
    "tool-output-trim",
    "stale-reads",
    "system-reminder-dedup",
    "http-spam",
    "error-retry-collapse",
    "background-poll-collapse",
    "document-dedup",
    "mega-block-trim",
    "envelope-strip",
];

pub const PRESCRIPTIONS: &[Prescription] = &[
    Prescription {
        name: "gentle",
        description: "Lossless housekeeping: collapse progress noise, drop stale file snapshots, strip telemetry.",
        strategies: GENTLE,
    },
    Prescription {
        name: "standard",
        description: "Gentle plus reasoning/tool-output trimming and the read-before-edit cleanup.",
        strategies: STANDARD,
    },
    Prescription {
        name: "aggressive",
        description: "Standard plus spam/error collapsing, document dedup, and the mega-block safety net.",
        strategies: AGGRESSIVE,
    },
];

pub fn prescription_by_name(name: &str) -> Option<&'static Prescription> {
    PRESCRIPTIONS.iter().find(|p| p.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_extends_gentle() {
        for name in GENTLE {
            assert!(STANDARD.contains(name));
        }
    }

    #[test]
    fn aggressive_extends_standard() {
        for name in STANDARD {
            assert!(AGGRESSIVE.contains(name));
        }
    }

    #[test]
    fn envelope_strip_runs_last() {
        assert_eq!(AGGRESSIVE.last(), Some(&"envelope-strip"));
    }
}
