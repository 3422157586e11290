//! HTML rendering of screening results.

use std::fmt::Write;

use crate::models::CandidateResult;
use aristosys_scoring::JobAnalysis;

/// Escape text for inclusion in HTML content or attribute values.
pub fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn score_cell(score: Option<String>) -> String {
    score.unwrap_or_else(|| "&ndash;".to_string())
}

/// Render ranked candidates as a standalone HTML document.
pub fn render_report(job: &JobAnalysis, candidates: &[CandidateResult], screened_at: &str) -> String {
    let title = escape_html(job.title_or("Unknown Position"));

    let mut html = String::new();
    let _ = write!(
        html,
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>Screening report: {title}</title>\n\
         <style>\n\
         body {{ font-family: sans-serif; margin: 2rem; }}\n\
         table {{ border-collapse: collapse; width: 100%; }}\n\
         th, td {{ border: 1px solid #ddd; padding: 0.5rem; text-align: left; vertical-align: top; }}\n\
         th {{ background: #f4f4f4; }}\n\
         </style>\n</head>\n<body>\n\
         <h1>{title}</h1>\n\
         <p>Classification: {classification} &middot; Screened: {screened_at} &middot; Candidates: {count}</p>\n",
        title = title,
        classification = escape_html(job.job_classification.as_str()),
        screened_at = escape_html(screened_at),
        count = candidates.len(),
    );

    html.push_str(
        "<table>\n<thead>\n<tr><th>Rank</th><th>Candidate</th><th>Resume score</th>\
         <th>Technical</th><th>Communication</th><th>Summary</th><th>Recommendation</th></tr>\n\
         </thead>\n<tbody>\n",
    );

    for (rank, candidate) in candidates.iter().enumerate() {
        let resume_score = score_cell(candidate.resume_score.map(|s| format!("{:.1}", s)));
        let technical = score_cell(
            candidate
                .audio_analysis
                .as_ref()
                .map(|a| a.technical_score.to_string()),
        );
        let communication = score_cell(
            candidate
                .audio_analysis
                .as_ref()
                .map(|a| a.communication_score.to_string()),
        );
        let summary = candidate
            .resume_analysis
            .as_ref()
            .map(|r| escape_html(&r.summary))
            .unwrap_or_default();
        let recommendation = candidate
            .recommendation
            .as_deref()
            .map(escape_html)
            .unwrap_or_default();

        let _ = writeln!(
            html,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            rank + 1,
            escape_html(&candidate.name),
            resume_score,
            technical,
            communication,
            summary,
            recommendation,
        );
    }

    html.push_str("</tbody>\n</table>\n</body>\n</html>\n");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use aristosys_scoring::AudioAnalysis;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<b>"R&D" 'team'</b>"#),
            "&lt;b&gt;&quot;R&amp;D&quot; &#39;team&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn test_render_report_escapes_candidate_content() {
        let mut job = JobAnalysis::fallback();
        job.job_title = "Backend <Engineer>".to_string();

        let mut first = CandidateResult::new("Jane <script>alert(1)</script>");
        first.resume_score = Some(79.0);
        first.recommendation = Some("Proceed & schedule".to_string());

        let mut second = CandidateResult::new("John Smith");
        second.audio_analysis = Some(AudioAnalysis::fallback());

        let html = render_report(&job, &[first, second], "2026-01-01T00:00:00Z");

        assert!(html.contains("<h1>Backend &lt;Engineer&gt;</h1>"));
        assert!(html.contains("Jane &lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("<td>79.0</td>"));
        assert!(html.contains("Proceed &amp; schedule"));
        assert!(html.contains("<tr><td>2</td><td>John Smith</td><td>&ndash;</td><td>50</td><td>50</td>"));
    }
}
