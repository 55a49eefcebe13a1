//! Text and HTML reports, and the per-symbol "latest analysis" file that
//! feeds the next run's trend comparison

use crate::analysis::ProviderAnalysis;
use crate::consensus::{ConsensusOutcome, ConsensusStats, ConsolidatedDecision};
use crate::error::Result;
use crate::screenshots::ScreenshotSet;
use chrono::{DateTime, Local};
use html_escape::encode_text;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{debug, info};

/// Latest combined analysis, one per symbol folder
pub const COMBINED_REPORT_FILE: &str = "combined_analysis_latest.txt";
/// Multi-provider HTML report, one per symbol folder
pub const HTML_REPORT_FILE: &str = "multi_provider_analysis.html";

const RESULTS_HEADER: &str = "Combined Analysis Results:";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

static RESULTS_SECTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^Combined Analysis Results:[ \t]*\r?\n={40}[ \t]*\r?\n")
        .expect("results header pattern is valid")
});

/// Analysis text of the previous run, if any
pub async fn load_prior_analysis(folder: &Path) -> Option<String> {
    let path = folder.join(COMBINED_REPORT_FILE);
    match tokio::fs::read_to_string(&path).await {
        Ok(content) => {
            let prior = extract_prior(&content);
            if prior.is_some() {
                info!("Loaded prior analysis from {}", path.display());
            }
            prior
        }
        Err(e) => {
            debug!("No prior analysis at {}: {}", path.display(), e);
            None
        }
    }
}

fn extract_prior(content: &str) -> Option<String> {
    let found = RESULTS_SECTION.find(content)?;
    let text = content[found.end()..].trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn in_report_order(analyses: &[ProviderAnalysis]) -> Vec<&ProviderAnalysis> {
    let mut ordered: Vec<&ProviderAnalysis> = analyses.iter().collect();
    ordered.sort_by_key(|a| a.provider.report_order());
    ordered
}

/// Plain-text report used as the email body and the saved analysis
pub fn render_text_report(
    decision: Option<&ConsolidatedDecision>,
    analyses: &[ProviderAnalysis],
    stats: &ConsensusStats,
) -> String {
    let rule = "=".repeat(60);
    let mut report = String::new();

    if let Some(decision) = decision {
        report.push_str(&format!(
            "GOOGLE AI CONSOLIDATED TRADING DECISION\n{rule}\n{}\n\n",
            decision.text.trim()
        ));
    }

    for analysis in in_report_order(analyses) {
        report.push_str(&format!(
            "{} ANALYSIS\n{rule}\n{}\n\n",
            analysis.provider.name().to_uppercase(),
            analysis.analysis_text.trim()
        ));
    }

    if stats.count > 0 {
        report.push_str(&format!("MULTI-PROVIDER CONSENSUS SUMMARY\n{rule}\n"));
        report.push_str(&format!(
            "Average Trend Change Probability: {:.1}%\n",
            stats.average
        ));
        report.push_str(&format!(
            "Probability Range: {:.1}% - {:.1}%\n",
            stats.min, stats.max
        ));
        report.push_str(&format!("Providers Used: {}\n", stats.count));

        if !stats.alerts.is_empty() {
            report.push_str(&format!("\nAlerts from {} provider(s):\n", stats.alerts.len()));
            for alert in &stats.alerts {
                report.push_str(&format!(
                    "- {}: {} ({:.1}%) - {}\n",
                    alert.provider.title(),
                    alert.alert_level.as_str().to_uppercase(),
                    alert.probability,
                    alert.summary
                ));
            }
        }
    }

    report.trim_end().to_string()
}

const HTML_STYLE: &str = "body { font-family: Arial, sans-serif; margin: 20px; background-color: #f5f5f5; }
.container { max-width: 1200px; margin: 0 auto; background: white; padding: 20px; border-radius: 8px; }
h1 { color: #2c3e50; border-bottom: 3px solid #3498db; padding-bottom: 10px; }
h2 { color: #34495e; margin-top: 30px; }
.meta { color: #7f8c8d; font-size: 0.9em; }
.decision { background: #eef7ff; border-left: 5px solid #3498db; padding: 15px; }
.provider { border: 1px solid #ddd; border-radius: 5px; padding: 15px; margin: 15px 0; }
.consensus { background: #f8f9fa; border: 2px solid #2ecc71; padding: 15px; border-radius: 5px; }
.alert { color: #c0392b; font-weight: bold; }
.summary-box { background: #fffbea; border: 1px solid #f1c40f; padding: 10px; margin-top: 10px; }
pre { white-space: pre-wrap; word-wrap: break-word; font-family: inherit; }";

/// Self-contained HTML page with every provider's analysis
pub fn render_html_report(
    symbol: &str,
    decision: Option<&ConsolidatedDecision>,
    analyses: &[ProviderAnalysis],
    stats: &ConsensusStats,
    outcome: &ConsensusOutcome,
    generated_at: DateTime<Local>,
) -> String {
    let symbol = encode_text(symbol);
    let mut html = format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
         <title>Multi-Provider AI Analysis Report for {symbol}</title>\n\
         <style>\n{HTML_STYLE}\n</style>\n</head>\n<body>\n<div class=\"container\">\n\
         <h1>Multi-Provider AI Analysis Report for {symbol}</h1>\n\
         <p class=\"meta\">Generated: {}</p>\n",
        generated_at.format(TIMESTAMP_FORMAT)
    );

    if let Some(decision) = decision {
        html.push_str(&format!(
            "<h2>Consolidated Trading Decision</h2>\n<div class=\"decision\"><pre>{}</pre></div>\n",
            encode_text(decision.text.trim())
        ));
    }

    for analysis in in_report_order(analyses) {
        html.push_str(&format!(
            "<div class=\"provider\">\n<h2>{} Analysis</h2>\n<p class=\"meta\">Model: {}</p>\n\
             <p>Trend change probability: {:.1}% ({})</p>\n<pre>{}</pre>\n</div>\n",
            analysis.provider.title(),
            encode_text(&analysis.model),
            analysis.evaluation.trend_change_probability,
            analysis.evaluation.alert_level.as_str().to_uppercase(),
            encode_text(analysis.analysis_text.trim())
        ));
    }

    html.push_str("<div class=\"consensus\">\n<h2>Consensus Summary</h2>\n");
    html.push_str(&format!(
        "<p>Average trend change probability: {:.1}%</p>\n<p>Range: {:.1}% - {:.1}%</p>\n\
         <p>Providers used: {}</p>\n",
        stats.average, stats.min, stats.max, stats.count
    ));

    if !stats.alerts.is_empty() {
        html.push_str("<ul>\n");
        for alert in &stats.alerts {
            html.push_str(&format!(
                "<li class=\"alert\">{}: {} ({:.1}%) - {}</li>\n",
                alert.provider.title(),
                alert.alert_level.as_str().to_uppercase(),
                alert.probability,
                encode_text(&alert.summary)
            ));
        }
        html.push_str("</ul>\n");
    }

    html.push_str(&format!(
        "<div class=\"summary-box\">\n<p><strong>Status:</strong> {} ({})</p>\n\
         <p><strong>Summary:</strong> {}</p>\n<p><strong>Provider agreement:</strong> {:.0}%</p>\n</div>\n",
        outcome.status_label(),
        outcome.alert_level.as_str().to_uppercase(),
        encode_text(&outcome.summary),
        outcome.provider_agreement
    ));
    html.push_str("</div>\n</div>\n</body>\n</html>\n");
    html
}

/// Write the HTML report into the symbol folder
pub async fn save_html_report(folder: &Path, html: &str) -> Result<PathBuf> {
    tokio::fs::create_dir_all(folder).await?;
    let path = folder.join(HTML_REPORT_FILE);
    tokio::fs::write(&path, html).await?;
    info!("HTML report saved to {}", path.display());
    Ok(path)
}

/// Body of `combined_analysis_latest.txt`
pub fn render_combined_report(
    screenshots: &ScreenshotSet,
    analysis: &str,
    outcome: &ConsensusOutcome,
    generated_at: DateTime<Local>,
) -> String {
    let mut text = format!(
        "Combined Screenshot Analysis Report\n{}\n\n",
        "=".repeat(60)
    );
    text.push_str(&format!(
        "Analysis Date: {}\n",
        generated_at.format(TIMESTAMP_FORMAT)
    ));
    text.push_str(&format!("Screenshots Analyzed: {}\n\n", screenshots.len()));

    text.push_str(&format!("Screenshot Sources:\n{}\n", "-".repeat(30)));
    for (kind, path) in &screenshots.entries {
        let file = path.file_name().map_or_else(
            || path.display().to_string(),
            |name| name.to_string_lossy().into_owned(),
        );
        text.push_str(&format!("- {}: {}\n", kind.title(), file));
    }

    text.push_str("\nTrend Change Analysis:\n");
    text.push_str(&format!(
        "[DATA] Trend Change Probability: {:.1}%\n",
        outcome.trend_change_probability
    ));
    text.push_str(&format!(
        "[>>] Confidence Level: {}\n",
        outcome.confidence_level.to_uppercase()
    ));
    text.push_str(&format!(
        "[ALERT] Status: {} ({})\n",
        outcome.status_label(),
        outcome.alert_level.as_str().to_uppercase()
    ));
    text.push_str(&format!("[SUMMARY] {}\n\n", outcome.summary));

    text.push_str(&format!("{RESULTS_HEADER}\n{}\n", "=".repeat(40)));
    text.push_str(analysis.trim());
    text.push('\n');
    text
}

/// Write `combined_analysis_latest.txt` into the screenshot folder
pub async fn save_combined_report(
    screenshots: &ScreenshotSet,
    analysis: &str,
    outcome: &ConsensusOutcome,
    generated_at: DateTime<Local>,
) -> Result<PathBuf> {
    tokio::fs::create_dir_all(&screenshots.folder).await?;
    let path = screenshots.folder.join(COMBINED_REPORT_FILE);
    let text = render_combined_report(screenshots, analysis, outcome, generated_at);
    tokio::fs::write(&path, text).await?;
    info!("Combined analysis saved to {}", path.display());
    Ok(path)
}
