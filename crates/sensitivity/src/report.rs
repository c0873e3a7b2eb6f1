//! Report types and markdown rendering.
//!
//! The report is a structured document (camelCase on the wire, like the
//! model itself) plus a markdown rendering whose layout is a documented
//! convention rather than a strict contract.

use std::fmt::Write;

use serde::{Deserialize, Serialize};

use cascade_foundation::NodeId;

/// Impact of one perturbation on one downstream node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactRow {
    pub node_id: NodeId,
    pub node_label: String,
    pub baseline: f64,
    pub intervened: f64,
    pub absolute_change: f64,
    pub pct_change: f64,
    #[serde(default)]
    pub units: Option<String>,
}

/// All downstream impacts of one (source, multiplier) run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerturbationRun {
    pub multiplier: f64,
    pub intervention_value: f64,
    pub impacts: Vec<ImpactRow>,
}

/// The four perturbation runs of one source node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceResult {
    pub source_id: NodeId,
    pub source_label: String,
    pub prior_mean: f64,
    pub runs: Vec<PerturbationRun>,
}

/// Aggregated strength of one source -> target coupling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectSummary {
    pub source_id: NodeId,
    pub target_id: NodeId,
    pub target_label: String,
    pub avg_increase_pct: f64,
    pub avg_decrease_pct: f64,
    pub overall_pct: f64,
}

/// A coupling that responds much harder in one direction than the other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AsymmetryFinding {
    pub source_id: NodeId,
    pub target_id: NodeId,
    pub avg_increase_pct: f64,
    pub avg_decrease_pct: f64,
    /// Larger direction over smaller; always > 2 for reported findings.
    pub ratio: f64,
}

/// A terminal node that barely moved under a strong input perturbation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BottleneckWarning {
    pub source_id: NodeId,
    pub terminal_id: NodeId,
    pub terminal_pct_change: f64,
    /// The interior node with the smallest response, when small enough to
    /// plausibly explain the attenuation.
    #[serde(default)]
    pub suspected_bottleneck: Option<NodeId>,
    #[serde(default)]
    pub bottleneck_pct_change: Option<f64>,
}

/// Classification lists distilled from the detailed results.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensitivitySummary {
    pub strong_effects: Vec<EffectSummary>,
    pub weak_effects: Vec<EffectSummary>,
    pub asymmetric_effects: Vec<AsymmetryFinding>,
    pub bottlenecks: Vec<BottleneckWarning>,
}

/// Complete sensitivity analysis output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensitivityReport {
    pub model_title: String,
    /// ISO-8601 generation time.
    pub timestamp: String,
    pub sample_count: usize,
    pub results: Vec<SourceResult>,
    pub summary: SensitivitySummary,
}

/// Render the report as markdown, with the conventional section layout:
/// Summary, Bottlenecks, Strong, Weak, Asymmetric, Detailed Results.
pub fn render_markdown(report: &SensitivityReport) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "# Sensitivity Analysis: {}", report.model_title);
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Generated {} with {} samples per run.",
        report.timestamp, report.sample_count
    );

    let summary = &report.summary;
    let _ = writeln!(out, "\n## Summary\n");
    let _ = writeln!(
        out,
        "- {} strong, {} weak, {} asymmetric effects; {} bottleneck warnings",
        summary.strong_effects.len(),
        summary.weak_effects.len(),
        summary.asymmetric_effects.len(),
        summary.bottlenecks.len()
    );

    let _ = writeln!(out, "\n## Bottlenecks\n");
    if summary.bottlenecks.is_empty() {
        let _ = writeln!(out, "None detected.");
    }
    for warning in &summary.bottlenecks {
        match (&warning.suspected_bottleneck, warning.bottleneck_pct_change) {
            (Some(suspect), Some(pct)) => {
                let _ = writeln!(
                    out,
                    "- `{}` moved only {:.1}% at terminal `{}`; suspected bottleneck `{}` ({:.1}%)",
                    warning.source_id, warning.terminal_pct_change, warning.terminal_id, suspect, pct
                );
            }
            _ => {
                let _ = writeln!(
                    out,
                    "- `{}` moved only {:.1}% at terminal `{}`",
                    warning.source_id, warning.terminal_pct_change, warning.terminal_id
                );
            }
        }
    }

    let _ = writeln!(out, "\n## Strong Effects\n");
    write_effect_table(&mut out, &summary.strong_effects);

    let _ = writeln!(out, "\n## Weak Effects\n");
    write_effect_table(&mut out, &summary.weak_effects);

    let _ = writeln!(out, "\n## Asymmetric Effects\n");
    if summary.asymmetric_effects.is_empty() {
        let _ = writeln!(out, "None detected.");
    } else {
        let _ = writeln!(out, "| Source | Target | Increase % | Decrease % | Ratio |");
        let _ = writeln!(out, "|---|---|---|---|---|");
        for finding in &summary.asymmetric_effects {
            let _ = writeln!(
                out,
                "| {} | {} | {:.1} | {:.1} | {:.1} |",
                finding.source_id,
                finding.target_id,
                finding.avg_increase_pct,
                finding.avg_decrease_pct,
                finding.ratio
            );
        }
    }

    let _ = writeln!(out, "\n## Detailed Results");
    for source in &report.results {
        let _ = writeln!(out, "\n### {}", display_name(&source.source_label, &source.source_id));
        for run in &source.runs {
            let _ = writeln!(
                out,
                "\n#### x{} (intervened at {:.3})\n",
                run.multiplier, run.intervention_value
            );
            let _ = writeln!(out, "| Node | Baseline | Intervened | Change | Change % |");
            let _ = writeln!(out, "|---|---|---|---|---|");
            for impact in &run.impacts {
                let units = impact.units.as_deref().unwrap_or("");
                let _ = writeln!(
                    out,
                    "| {} | {:.3} | {:.3} | {:+.3} {} | {:+.1}% |",
                    display_name(&impact.node_label, &impact.node_id),
                    impact.baseline,
                    impact.intervened,
                    impact.absolute_change,
                    units,
                    impact.pct_change
                );
            }
        }
    }

    out
}

fn write_effect_table(out: &mut String, effects: &[EffectSummary]) {
    if effects.is_empty() {
        let _ = writeln!(out, "None detected.");
        return;
    }
    let _ = writeln!(out, "| Source | Target | Increase % | Decrease % | Overall % |");
    let _ = writeln!(out, "|---|---|---|---|---|");
    for effect in effects {
        let _ = writeln!(
            out,
            "| {} | {} | {:.1} | {:.1} | {:.1} |",
            effect.source_id,
            display_name(&effect.target_label, &effect.target_id),
            effect.avg_increase_pct,
            effect.avg_decrease_pct,
            effect.overall_pct
        );
    }
}

fn display_name<'a>(label: &'a str, id: &'a NodeId) -> &'a str {
    if label.is_empty() { id.as_str() } else { label }
}
