use crate::arrivals::{BusArrival, PathArrival};
use crate::config;
use crate::mybus;
use crate::path;
use crate::result::{self, PanelOutcome};
use crate::webclient;

#[derive(Debug, PartialEq, Serialize)]
#[serde(tag = "kind", content = "outcome", rename_all = "lowercase")]
pub enum PanelRows {
    Path(PanelOutcome<PathArrival>),
    Bus(PanelOutcome<BusArrival>),
}

/// One column of the dashboard, bound to exactly one feed.
#[derive(Debug, PartialEq, Serialize)]
pub struct Panel {
    pub title: String,
    pub source: String,
    pub rows: PanelRows,
}

pub fn run_cycle(client: &webclient::FeedClient, window: u32) -> Vec<Panel> {
    return run_cycle_ext(
        window,
        |url| client.fetch_json(url),
        |url| client.fetch_html(url));
}

// The three feeds run one after another; a failure only lands in its own panel.
fn run_cycle_ext<J, H>(window: u32, fetch_json_fn: J, fetch_html_fn: H) -> Vec<Panel>
where
    J: Fn(&str) -> result::HoboDashResult<String>,
    H: Fn(&str) -> result::HoboDashResult<String>,
{
    let mut panels = vec![];

    panels.push(Panel{
        title: config::PATH_TITLE.to_string(),
        source: "PATH".to_string(),
        rows: PanelRows::Path(capture(config::PATH_TITLE, path::get_path_arrivals(window, &fetch_json_fn))),
    });

    for stop in config::BUS_STOPS.iter() {
        panels.push(Panel{
            title: stop.title.to_string(),
            source: "MyBus".to_string(),
            rows: PanelRows::Bus(capture(stop.title, mybus::get_bus_arrivals(stop.url, window, &fetch_html_fn))),
        });
    }

    return panels;
}

fn capture<T>(title: &str, rows: result::HoboDashResult<Vec<T>>) -> PanelOutcome<T> {
    match rows {
        Ok(ref rows) => info!("{}: {} departures", title, rows.len()),
        Err(ref err) => warn!("{}: {}", title, err),
    }
    return rows.into();
}
