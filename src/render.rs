extern crate chrono;
extern crate chrono_tz;

use crate::arrivals::Arrival;
use crate::config;
use crate::dashboard::{Panel, PanelRows};
use crate::result::PanelOutcome;

const EMPTY_NOTICE: &str = "No upcoming departures found (or source temporarily unavailable).";

/// Wall-clock time `minutes` from `now`, 12-hour, no leading zero: "2:05 PM".
pub fn clock_label<Tz: chrono::TimeZone>(now: &chrono::DateTime<Tz>, minutes: u32) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let arrival = now.clone() + chrono::Duration::minutes(minutes as i64);
    return arrival.format("%-I:%M %p").to_string();
}

pub fn title(window: u32) -> String {
    return format!("Hoboken Departures (Next {} Minutes)", window);
}

fn last_updated<Tz: chrono::TimeZone>(now: &chrono::DateTime<Tz>) -> String {
    let eastern = now.with_timezone(&chrono_tz::US::Eastern);
    return format!("Last updated: {} ET", eastern.format("%Y-%m-%d %I:%M:%S %p"));
}

// Label, destination, clock time, minutes. Strings are raw; callers escape.
struct Line {
    label: String,
    to: String,
    clock: String,
    minutes: u32,
}

enum PanelView {
    Rows(Vec<Line>),
    Empty,
    Failed(String),
}

fn view<T: Arrival, Tz: chrono::TimeZone>(source: &str, outcome: &PanelOutcome<T>, now: &chrono::DateTime<Tz>) -> PanelView
where
    Tz::Offset: std::fmt::Display,
{
    match outcome {
        PanelOutcome::Failed(reason) => {
            return PanelView::Failed(format!("{} fetch failed: {}", source, reason));
        },
        PanelOutcome::Rows(rows) if rows.is_empty() => {
            return PanelView::Empty;
        },
        PanelOutcome::Rows(rows) => {
            return PanelView::Rows(rows.iter().map(|r| Line{
                label: r.label(),
                to: r.destination().to_string(),
                clock: clock_label(now, r.minutes()),
                minutes: r.minutes(),
            }).collect());
        },
    }
}

fn panel_view<Tz: chrono::TimeZone>(panel: &Panel, now: &chrono::DateTime<Tz>) -> PanelView
where
    Tz::Offset: std::fmt::Display,
{
    match panel.rows {
        PanelRows::Path(ref outcome) => return view(&panel.source, outcome, now),
        PanelRows::Bus(ref outcome) => return view(&panel.source, outcome, now),
    }
}

pub fn render_html<Tz: chrono::TimeZone>(panels: &[Panel], cfg: &config::DashConfig, now: &chrono::DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let mut body = format!(
        "<!DOCTYPE html><html><head><meta charset='utf-8'>\
         <meta http-equiv='refresh' content='{refresh}; url=/?window={window}&amp;refresh={refresh}'>\
         <title>{title}</title><style>{style}</style></head><body>",
        refresh = cfg.refresh_seconds,
        window = cfg.window_minutes,
        title = escape_html(&title(cfg.window_minutes)),
        style = STYLE);

    body.push_str(&format!(
        "<form class='settings' method='get' action='/'>\
         <label>Show departures within (minutes) <input type='range' name='window' min='{wmin}' max='{wmax}' step='{wstep}' value='{window}' onchange='this.form.submit()'> {window}</label>\
         <label>Auto-refresh (seconds) <input type='range' name='refresh' min='{rmin}' max='{rmax}' step='{rstep}' value='{refresh}' onchange='this.form.submit()'> {refresh}</label>\
         <noscript><button type='submit'>Apply</button></noscript>\
         <div class='caption'>Tip: leave this running on a second monitor.</div>\
         </form>",
        wmin = config::MIN_WINDOW_MIN,
        wmax = config::MAX_WINDOW_MIN,
        wstep = config::WINDOW_STEP_MIN,
        window = cfg.window_minutes,
        rmin = config::MIN_REFRESH_SEC,
        rmax = config::MAX_REFRESH_SEC,
        rstep = config::REFRESH_STEP_SEC,
        refresh = cfg.refresh_seconds));

    body.push_str(&format!("<h1>{}</h1><div class='caption'>{}</div><div class='columns'>",
                           escape_html(&title(cfg.window_minutes)),
                           escape_html(&last_updated(now))));

    for panel in panels {
        body.push_str(&format!("<div class='column'><h2>{}</h2>", escape_html(&panel.title)));
        match panel_view(panel, now) {
            PanelView::Failed(message) => {
                body.push_str(&format!("<div class='error'>{}</div>", escape_html(&message)));
            },
            PanelView::Empty => {
                body.push_str(&format!("<div class='info'>{}</div>", EMPTY_NOTICE));
            },
            PanelView::Rows(lines) => {
                for line in lines {
                    body.push_str(&format!(
                        "<p><b>{}</b> → {}<br>🕒 {} ({} min)</p>",
                        escape_html(&line.label),
                        escape_html(&line.to),
                        line.clock,
                        line.minutes));
                }
            },
        }
        body.push_str("</div>");
    }

    body.push_str("</div></body></html>");
    return body;
}

pub fn render_text<Tz: chrono::TimeZone>(panels: &[Panel], window: u32, now: &chrono::DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let mut out = format!("{}\n{}\n", title(window), last_updated(now));

    for panel in panels {
        out.push_str(&format!("\n{}\n", panel.title));
        match panel_view(panel, now) {
            PanelView::Failed(message) => out.push_str(&format!("  ERROR: {}\n", message)),
            PanelView::Empty => out.push_str(&format!("  {}\n", EMPTY_NOTICE)),
            PanelView::Rows(lines) => {
                for line in lines {
                    out.push_str(&format!("  {} → {}  {} ({} min)\n", line.label, line.to, line.clock, line.minutes));
                }
            },
        }
    }

    return out;
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    return out;
}

const STYLE: &str = "body{font-family:sans-serif;margin:1em 2em}\
.columns{display:flex;gap:2em}.column{flex:1}\
.caption{color:#666;font-size:0.9em}.settings{float:right;text-align:right}\
.settings label{display:block}\
.error{background:#fde2e2;color:#8a1c1c;padding:0.5em}\
.info{background:#e2eefd;color:#1c3f8a;padding:0.5em}";
