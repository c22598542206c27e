use super::{Palette, fmt_duration, fmt_percent, fmt_tokens};
use aide_runtime::Diagnosis;
use std::fmt::Write;

const FILES_SHOWN: usize = 5;

pub fn format_diagnosis(diagnosis: &Diagnosis, palette: &Palette) -> String {
    let report = &diagnosis.report;
    let session = &report.session;
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{} {}",
        palette.heading("Session"),
        session.session_id
    );
    let _ = writeln!(out, "  project   {}", session.project_name);
    let _ = writeln!(
        out,
        "  started   {}",
        session.started_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    let _ = writeln!(
        out,
        "  duration  {} (active {}, {} work blocks)",
        fmt_duration(session.duration_seconds),
        fmt_duration(session.active_duration_seconds),
        session.work_blocks.len()
    );
    let _ = writeln!(
        out,
        "  messages  {} ({} tool calls)",
        session.message_count, session.tool_call_count
    );
    let _ = writeln!(out, "  {}", diagnosis.cost);

    let _ = writeln!(out, "\n{}", palette.heading("Cost by category"));
    for category in &report.categories {
        let _ = writeln!(
            out,
            "  {:<16} ${:>9.4}  {:>5.1}%",
            category.category.as_str(),
            category.cost_usd,
            category.percentage
        );
    }

    let context = &report.context;
    let _ = writeln!(out, "\n{}", palette.heading("Context"));
    let _ = writeln!(
        out,
        "  peak         {} tokens ({} of window)",
        fmt_tokens(context.peak_tokens),
        fmt_percent(context.peak_utilization)
    );
    if context.compactions.is_empty() {
        let _ = writeln!(out, "  compactions  none");
    } else {
        let _ = writeln!(out, "  compactions  {}", context.compactions.len());
        for event in &context.compactions {
            let _ = writeln!(
                out,
                "    turn {}: {} -> {} (lost {})",
                event.turn_index,
                fmt_tokens(event.tokens_before),
                fmt_tokens(event.tokens_after),
                fmt_tokens(event.estimated_tokens_lost)
            );
        }
    }

    let cache = &report.cache;
    let _ = writeln!(out, "\n{}", palette.heading("Cache"));
    let rate = cache
        .hit_rate
        .map(fmt_percent)
        .unwrap_or_else(|| "n/a".to_string());
    let _ = writeln!(out, "  hit rate  {}", rate);
    let _ = writeln!(out, "  savings   ${:.4}", cache.savings_usd);

    if !report.top_turns.is_empty() {
        let _ = writeln!(out, "\n{}", palette.heading("Most expensive turns"));
        for turn in &report.top_turns {
            let tools = if turn.tool_names.is_empty() {
                palette.dim("-")
            } else {
                turn.tool_names.join(", ")
            };
            let _ = writeln!(
                out,
                "  turn {:<4} {:<9} ${:.4}  {}",
                turn.turn_index,
                turn.role.as_str(),
                turn.cost_usd,
                tools
            );
        }
    }

    if !report.files.is_empty() {
        let _ = writeln!(out, "\n{}", palette.heading("Files"));
        for file in report.files.iter().take(FILES_SHOWN) {
            let _ = writeln!(
                out,
                "  {} {}",
                palette.dim(&format!(
                    "{}r {}e {}w",
                    file.reads, file.edits, file.writes
                )),
                file.path
            );
        }
    }

    if !report.unknown_models.is_empty() {
        let _ = writeln!(
            out,
            "\n{} {}",
            palette.warn("Priced at default rates:"),
            report.unknown_models.join(", ")
        );
    }

    let _ = writeln!(out, "\n{}", palette.heading("Recommendations"));
    if diagnosis.recommendations.is_empty() {
        let _ = writeln!(out, "  none");
    }
    for rec in &diagnosis.recommendations {
        let _ = writeln!(out, "  {} {}", palette.severity(rec.severity), rec.message);
        let _ = writeln!(out, "    {}", palette.dim(&rec.evidence));
    }

    out
}
