//! HTML rendering for the calculator page.

use std::fmt::Write as _;

use crate::calculator::InputError;
use crate::stats::StatsRecord;
use crate::utils::cpu::format::{showcase, FactorSummary};
use crate::utils::text::{escape_html, thousands};

/// What the result area shows for this request.
#[derive(Debug)]
pub enum ResultView {
    Idle,
    Invalid(InputError),
    Degenerate,
    Factored(FactorSummary),
}

pub struct PageView<'a> {
    pub input: &'a str,
    pub result: &'a ResultView,
    pub warnings: &'a [String],
    pub stats: &'a StatsRecord,
    /// `YYYY-MM-DD` of the request, for the "today" counter.
    pub today: &'a str,
}

const STYLE: &str = "body{font-family:sans-serif;margin:0;display:flex}\
aside{width:260px;padding:1rem;background:#f4f4f8;min-height:100vh}\
main{flex:1;padding:1rem 2rem}\
.metric{margin:.3rem 0}.metric b{font-size:1.3rem;display:block}\
.warn{background:#fff4d6;padding:.5rem}.error{background:#fde2e2;padding:.5rem}\
.info{background:#e2effd;padding:.5rem}.success{background:#e3f7e3;padding:.5rem}\
.cols{display:flex;gap:2rem;flex-wrap:wrap}";

pub fn render(view: &PageView) -> String {
    let mut html = String::new();
    let _ = write!(
        html,
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\">\
         <title>Prime Factorization Calculator</title><style>{}</style></head><body>",
        STYLE
    );

    render_sidebar(&mut html, view);

    html.push_str("<main><h1>🔢 Prime Factorization Calculator</h1><hr>");
    html.push_str("<p>Enter a number to see its prime factorization.</p>");

    for warning in view.warnings {
        let _ = write!(html, "<p class=\"warn\">⚠️ {}</p>", escape_html(warning));
    }

    let _ = write!(
        html,
        "<form method=\"get\" action=\"/\">\
         <label for=\"n\">Number to factor:</label> \
         <input id=\"n\" name=\"n\" value=\"{}\" placeholder=\"e.g. 100, 1234, 999999\"> \
         <button type=\"submit\">🔍 Calculate</button></form>",
        escape_html(view.input)
    );

    render_result(&mut html, view.result);
    render_examples(&mut html);
    render_stats(&mut html, view.stats);

    html.push_str("<hr><p>🔢 <b>Prime Factorization Calculator</b></p></main></body></html>");
    html
}

fn metric(html: &mut String, label: &str, value: &str) {
    let _ = write!(html, "<div class=\"metric\">{}<b>{}</b></div>", escape_html(label), escape_html(value));
}

fn render_sidebar(html: &mut String, view: &PageView) {
    let stats = view.stats;
    html.push_str("<aside><h3>ℹ️ How to use</h3><ol>\
        <li>Type a number into the field</li>\
        <li>Press Enter or click Calculate</li>\
        <li>Read the factorization</li></ol>\
        <h3>📚 What is a prime factor?</h3>\
        <p>A prime is a natural number greater than 1 whose only divisors are 1 and itself, \
        e.g. 2, 3, 5, 7, 11, 13, ...</p><h3>📈 Live statistics</h3>");

    metric(html, "Total visits", &thousands(stats.total_visits));
    metric(html, "Unique visitors", &thousands(stats.unique_visitors));
    metric(html, "Calculations", &thousands(stats.calculation_count));
    if !stats.last_visit.is_empty() {
        let _ = write!(html, "<small>Last: {}</small>", escape_html(stats.last_visit_short()));
    }
    metric(html, "Visits today", &thousands(stats.visits_on(view.today)));

    html.push_str("<details><summary>📊 Details</summary><h4>📅 Last 7 days</h4><ul>");
    for (day, count) in stats.recent_days(7) {
        let _ = write!(html, "<li><b>{}</b>: {}</li>", escape_html(day.get(5..).unwrap_or(day)), count);
    }
    html.push_str("</ul><h4>🔢 Popular numbers</h4><ul>");
    for (number, count) in stats.top_numbers(3) {
        let _ = write!(html, "<li><b>{}</b>: {}×</li>", escape_html(number), count);
    }
    html.push_str("</ul></details></aside>");
}

fn render_result(html: &mut String, result: &ResultView) {
    match result {
        ResultView::Idle => {}
        ResultView::Invalid(InputError::Empty) => {
            let _ = write!(html, "<p class=\"warn\">{}</p>", escape_html(&InputError::Empty.to_string()));
        }
        ResultView::Invalid(e) => {
            let _ = write!(html, "<p class=\"error\">{}</p>", escape_html(&e.to_string()));
        }
        ResultView::Degenerate => {
            html.push_str("<p class=\"info\">1 is not a prime number.</p>");
            html.push_str("<p><b>Factorization:</b> 1</p>");
        }
        ResultView::Factored(s) => render_summary(html, s),
    }
}

fn render_summary(html: &mut String, s: &FactorSummary) {
    let _ = write!(html, "<p class=\"success\">✅ Factorization of {} complete!</p><div class=\"cols\"><div>", s.n);
    let _ = write!(html, "<h3>📊 Result</h3><p><b>{} = {}</b></p>", s.n, escape_html(&s.formatted));

    if s.factors.len() > 1 {
        html.push_str("<p><b>Individual factors:</b></p><ol>");
        for factor in &s.factors {
            let _ = write!(html, "<li>{}</li>", factor);
        }
        html.push_str("</ol>");
    }

    html.push_str("</div><div><h3>📈 Statistics</h3>");
    let _ = write!(html, "<p><b>Prime factors (with multiplicity):</b> {}</p>", s.total_factor_count);
    let _ = write!(html, "<p><b>Distinct prime factors:</b> {}</p>", s.unique_factor_count);
    let _ = write!(html, "<p><b>Largest prime factor:</b> {}</p>", s.max_factor);
    html.push_str("</div></div><hr><h3>🔍 Analysis</h3>");

    if s.is_prime {
        let _ = write!(html, "<p class=\"info\">🎉 {} is prime!</p>", s.n);
    } else {
        let _ = write!(html, "<p><b>Prime:</b> {} is not prime.</p>", s.n);
    }
    let _ = write!(html, "<p><b>Number of divisors:</b> {}</p>", s.divisor_count);
}

fn render_examples(html: &mut String) {
    html.push_str("<hr><h3>💡 Examples</h3><div class=\"cols\">");
    for group in showcase() {
        let _ = write!(html, "<div><b>{}</b>", escape_html(group.title));
        for entry in group.entries {
            let _ = write!(html, "<p>{} = {}</p>", entry.n, escape_html(&entry.formatted));
        }
        html.push_str("</div>");
    }
    html.push_str("</div>");
}

fn render_stats(html: &mut String, stats: &StatsRecord) {
    html.push_str("<hr><h3>📊 Visit statistics</h3><div class=\"cols\">");
    metric(html, "Total visits", &thousands(stats.total_visits));
    metric(html, "Unique visitors", &thousands(stats.unique_visitors));
    metric(html, "Total calculations", &thousands(stats.calculation_count));
    if !stats.last_visit.is_empty() {
        metric(html, "Last visit", stats.last_visit_short());
    }
    html.push_str("</div>");

    let recent = stats.recent_days(7);
    if !recent.is_empty() {
        html.push_str("<h4>📅 Daily visits</h4><div class=\"cols\">");
        for (day, count) in recent {
            metric(html, day.get(5..).unwrap_or(day), &count.to_string());
        }
        html.push_str("</div>");
    }

    if !stats.hourly_visits.is_empty() {
        html.push_str("<h4>🕐 Visits by hour</h4><div class=\"cols\">");
        for bucket in stats.hourly_buckets() {
            metric(html, &format!("{}h", bucket.label), &bucket.visits.to_string());
        }
        html.push_str("</div>");
    }

    let top = stats.top_numbers(5);
    if !top.is_empty() {
        html.push_str("<h4>🔢 Most factored numbers</h4><ul>");
        for (number, count) in top {
            let _ = write!(html, "<li><b>{}</b>: {}×</li>", escape_html(number), count);
        }
        html.push_str("</ul>");
    }
}
