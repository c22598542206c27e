use super::Palette;
use aide_runtime::IngestSummary;
use std::fmt::Write;

pub fn format_summary(summary: &IngestSummary, palette: &Palette) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", palette.heading("Ingest complete"));
    let _ = writeln!(
        out,
        "  files     {} discovered, {} parsed, {} unchanged, {} malformed, {} forgotten",
        summary.files_discovered,
        summary.files_parsed,
        summary.files_unchanged,
        summary.files_malformed,
        summary.files_forgotten
    );
    let _ = writeln!(
        out,
        "  sessions  {} persisted, {} rejected",
        summary.sessions_persisted, summary.rejected_sessions
    );
    let _ = writeln!(out, "  skipped   {} lines", summary.skipped_lines);
    if !summary.unknown_models.is_empty() {
        let _ = writeln!(
            out,
            "  {} {}",
            palette.warn("priced at default rates:"),
            summary.unknown_models.join(", ")
        );
    }
    out
}
