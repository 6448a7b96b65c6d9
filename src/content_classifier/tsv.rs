//! Tab-separated text detection and table synthesis.
//!
//! Spreadsheet pastes usually arrive with a plain-text flavor where cells are
//! separated by tabs. Prose occasionally contains tabs too, so detection looks
//! at the shape of the whole payload before treating it as a table.

use html_escape::encode_text;

use crate::config::{Thresholds, TsvDetection};

/// Shape statistics for a block of text
#[derive(Debug, Clone, PartialEq)]
pub struct TsvStats {
    /// Number of non-empty lines
    pub lines: usize,
    /// Number of lines containing at least one tab
    pub tabbed_lines: usize,
    /// Average characters per non-empty line
    pub avg_line_len: f64,
    /// Fraction of tabbed lines whose tab count is near the mean
    pub consistency: f64,
    /// Whether two tab-bearing lines appear back to back
    pub has_consecutive_tabbed: bool,
}

impl TsvStats {
    /// Compute statistics over the text's lines
    #[must_use]
    pub fn measure(text: &str, thresholds: &Thresholds) -> Self {
        let lines: Vec<&str> = split_lines(text)
            .into_iter()
            .filter(|l| !l.trim().is_empty())
            .collect();

        let tab_counts: Vec<usize> = lines
            .iter()
            .map(|l| l.matches('\t').count())
            .filter(|&c| c > 0)
            .collect();

        let avg_line_len = if lines.is_empty() {
            0.0
        } else {
            lines.iter().map(|l| l.chars().count()).sum::<usize>() as f64 / lines.len() as f64
        };

        let consistency = if tab_counts.is_empty() {
            0.0
        } else {
            let mean = tab_counts.iter().sum::<usize>() as f64 / tab_counts.len() as f64;
            let consistent = tab_counts
                .iter()
                .filter(|&&c| (c as f64 - mean).abs() <= thresholds.tsv_tab_tolerance)
                .count();
            consistent as f64 / tab_counts.len() as f64
        };

        let has_consecutive_tabbed = lines
            .windows(2)
            .any(|pair| pair[0].contains('\t') && pair[1].contains('\t'));

        Self {
            lines: lines.len(),
            tabbed_lines: tab_counts.len(),
            avg_line_len,
            consistency,
            has_consecutive_tabbed,
        }
    }
}

/// Split on newlines without trimming tabs from the first or last cell
pub(crate) fn split_lines(text: &str) -> Vec<&str> {
    text.trim_matches(|c| c == '\n' || c == '\r')
        .lines()
        .collect()
}

/// Detect if text is tab-separated values (TSV) from a spreadsheet
///
/// Both modes reject payloads where fewer than half the lines carry tabs or
/// where lines are long enough to be prose. `Strict` then requires a
/// consistent tab count across tabbed lines; `Consecutive` requires two
/// tab-bearing lines in a row.
#[must_use]
pub fn is_tsv_content(text: &str, detection: TsvDetection, thresholds: &Thresholds) -> bool {
    let stats = TsvStats::measure(text, thresholds);

    if stats.lines < 2 || stats.tabbed_lines < 2 {
        return false;
    }

    let fraction = stats.tabbed_lines as f64 / stats.lines as f64;
    if fraction < thresholds.tsv_min_tab_line_fraction {
        return false;
    }

    if stats.avg_line_len > thresholds.tsv_max_avg_line_len as f64 {
        return false;
    }

    match detection {
        TsvDetection::Strict => stats.consistency >= thresholds.tsv_min_consistency,
        TsvDetection::Consecutive => stats.has_consecutive_tabbed,
    }
}

/// Converts TSV (tab-separated values) to an HTML table with the first row as headers
#[must_use]
pub fn tsv_to_html_table(tsv: &str) -> String {
    let lines: Vec<&str> = split_lines(tsv)
        .into_iter()
        .filter(|l| !l.trim().is_empty())
        .collect();

    let Some((header, body)) = lines.split_first() else {
        return String::new();
    };

    let mut html = String::from("<table>\n<thead>\n<tr>\n");
    for cell in header.split('\t') {
        html.push_str("<th>");
        html.push_str(&encode_text(cell.trim()));
        html.push_str("</th>\n");
    }
    html.push_str("</tr>\n</thead>\n");

    if !body.is_empty() {
        html.push_str("<tbody>\n");
        for line in body {
            html.push_str("<tr>\n");
            for cell in line.split('\t') {
                html.push_str("<td>");
                html.push_str(&encode_text(cell.trim()));
                html.push_str("</td>\n");
            }
            html.push_str("</tr>\n");
        }
        html.push_str("</tbody>\n");
    }

    html.push_str("</table>");
    html
}
