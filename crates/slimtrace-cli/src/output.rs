//! Terminal rendering helpers, grounded in the teacher's
//! `agtrace-cli/src/views/doctor.rs`: plain `println!` structure with
//! `owo-colors` applied only when stdout is actually a terminal
//! (`is-terminal`), so piped output stays plain text.

use is_terminal::IsTerminal;
use owo_colors::OwoColorize;
use slimtrace_engine::Diagnosis;

fn colorize() -> bool {
    std::io::stdout().is_terminal()
}

pub fn heading(text: &str) {
    if colorize() {
        println!("{}", text.bright_blue().bold());
    } else {
        println!("{text}");
    }
}

pub fn ok(text: &str) {
    if colorize() {
        println!("{}", text.green().bold());
    } else {
        println!("{text}");
    }
}

pub fn warn(text: &str) {
    if colorize() {
        println!("{}", text.yellow());
    } else {
        println!("{text}");
    }
}

pub fn error(text: &str) {
    if colorize() {
        eprintln!("{}", text.red());
    } else {
        eprintln!("{text}");
    }
}

pub fn dim(text: &str) {
    if colorize() {
        println!("{}", text.bright_black());
    } else {
        println!("{text}");
    }
}

/// Render a full diagnosis the way `diagnose`/`current -d` print it: a
/// size/token summary, the per-kind breakdown, the heaviest offenders, and
/// each prescription's projected savings.
pub fn print_diagnosis(diagnosis: &Diagnosis) {
    heading(&format!(
        "{} records, {} bytes, ~{} tokens ({:.1}% of context window)",
        diagnosis.record_count, diagnosis.total_bytes, diagnosis.total_tokens, diagnosis.context_window_percent
    ));

    println!();
    println!("by kind:");
    for entry in &diagnosis.breakdown {
        println!("  {:<20} {:>6} records  {:>10} bytes", entry.kind.as_str(), entry.count, entry.bytes);
    }

    if !diagnosis.heaviest.is_empty() {
        println!();
        println!("heaviest records:");
        for record in &diagnosis.heaviest {
            println!("  line {:<6} {:<20} {:>10} bytes  {}", record.line_no, record.kind.as_str(), record.bytes, record.uuid);
        }
    }

    if !diagnosis.bloat_signatures.is_empty() {
        println!();
        println!("bloat signatures:");
        for signature in &diagnosis.bloat_signatures {
            println!("  {:<28} x{}", signature.label, signature.count);
        }
    }

    println!();
    println!("prescription projections:");
    for projection in &diagnosis.projections {
        println!(
            "  {:<12} -{:>5} removed  ~{:>5} modified  {:>10} bytes saved  ~{} tokens after",
            projection.name, projection.removed_count, projection.modified_count, projection.bytes_saved, projection.tokens_after
        );
    }
}
