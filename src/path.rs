extern crate chrono;
extern crate regex;
extern crate serde;
extern crate serde_json;
extern crate serde_with;

use crate::arrivals::{self, PathArrival};
use crate::config;
use crate::result;
use serde_with::{serde_as, DefaultOnError, VecSkipError};

const DEFAULT_LABEL: &str = "PATH";

// Accepted in addition to RFC 3339, once a trailing 'Z' has become "+00:00".
const TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%d %H:%M%:z",
];

// ridepath.json: results[] -> destinations[] -> messages[]
// Every field is optional. A field of the wrong type reads as missing and a
// malformed list element is skipped.
#[serde_as]
#[derive(Deserialize, Debug)]
struct RidePathResponse {
    #[serde_as(as = "VecSkipError<_>")]
    #[serde(default)]
    results: Vec<RidePathStation>,
}

#[serde_as]
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct RidePathStation {
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    considered_station: Option<String>,

    #[serde_as(as = "DefaultOnError<VecSkipError<_>>")]
    #[serde(default)]
    destinations: Vec<RidePathDestination>,
}

#[serde_as]
#[derive(Deserialize, Debug)]
struct RidePathDestination {
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    label: Option<String>,

    #[serde_as(as = "DefaultOnError<VecSkipError<_>>")]
    #[serde(default)]
    messages: Vec<RidePathMessage>,
}

#[serde_as]
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct RidePathMessage {
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    arrival_time: Option<String>,

    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    arrival_time_message: Option<String>,

    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    head_sign: Option<String>,

    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    line_name: Option<String>,

    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    line: Option<String>,
}

/// Fetches the PATH feed with `fetch_fn` and normalizes it. Fetch and
/// document-level JSON failures propagate; bad messages are skipped.
pub fn get_path_arrivals<F>(window: u32, fetch_fn: F) -> result::HoboDashResult<Vec<PathArrival>>
where
    F: Fn(&str) -> result::HoboDashResult<String>,
{
    let body = fetch_fn(config::PATH_URL)?;
    return parse_path_realtime(&body, config::PATH_STATION, window, chrono::Utc::now());
}

/// Flattens a ridepath.json document into the arrivals at `station` that are
/// at most `window` minutes out, unique and sorted by minutes.
pub fn parse_path_realtime(
    body: &str,
    station: &str,
    window: u32,
    now: chrono::DateTime<chrono::Utc>) -> result::HoboDashResult<Vec<PathArrival>> {
    let response: RidePathResponse = serde_json::from_str(body)?;
    let minutes_re = regex::Regex::new(r"(?i)(\d+)\s*min")?;

    let mut rows = vec![];
    for considered in response.results.iter().filter(|s| s.considered_station.as_deref() == Some(station)) {
        for dest in &considered.destinations {
            for msg in &dest.messages {
                let minutes = match message_minutes(msg, &minutes_re, now) {
                    Some(m) => m,
                    None => {
                        debug!("Dropping PATH message without a usable time: {:?}", msg);
                        continue;
                    }
                };

                if !arrivals::within_window(minutes, window) {
                    continue;
                }

                let to = first_present(&[&msg.head_sign, &dest.label]).unwrap_or(DEFAULT_LABEL);
                let line = first_present(&[&msg.line_name, &msg.line]).unwrap_or(DEFAULT_LABEL);

                rows.push(PathArrival{
                    line: line.to_string(),
                    to: to.to_string(),
                    minutes: minutes,
                });
            }
        }
    }

    return Ok(arrivals::collapse_rows(rows, |r| (r.line.clone(), r.to.clone(), r.minutes)));
}

fn message_minutes(
    msg: &RidePathMessage,
    minutes_re: &regex::Regex,
    now: chrono::DateTime<chrono::Utc>) -> Option<u32> {
    let from_timestamp = msg.arrival_time.as_deref()
        .filter(|t| !t.is_empty())
        .and_then(parse_arrival_time)
        .map(|arrival| minutes_until(arrival, now));

    if from_timestamp.is_some() {
        return from_timestamp;
    }

    let phrase = msg.arrival_time_message.as_deref()?;
    let captures = minutes_re.captures(phrase)?;
    return captures.get(1)?.as_str().parse::<u32>().ok();
}

fn parse_arrival_time(raw: &str) -> Option<chrono::DateTime<chrono::FixedOffset>> {
    let normalized = raw.trim().replace("Z", "+00:00");

    if let Ok(ts) = chrono::DateTime::parse_from_rfc3339(&normalized) {
        return Some(ts);
    }

    return TIMESTAMP_FORMATS.iter()
        .filter_map(|fmt| chrono::DateTime::parse_from_str(&normalized, fmt).ok())
        .next();
}

// Whole minutes, rounded down, never negative.
fn minutes_until(arrival: chrono::DateTime<chrono::FixedOffset>, now: chrono::DateTime<chrono::Utc>) -> u32 {
    let millis = arrival.with_timezone(&chrono::Utc).signed_duration_since(now).num_milliseconds();
    let minutes = millis.div_euclid(60_000).max(0);
    return std::cmp::min(minutes, u32::MAX as i64) as u32;
}

fn first_present<'a>(candidates: &[&'a Option<String>]) -> Option<&'a str> {
    return candidates.iter()
        .copied()
        .filter_map(|c| c.as_deref())
        .filter(|s| !s.is_empty())
        .next();
}

#[cfg(test)]
mod tests {
    extern crate chrono;
    extern crate serde_json;

    use super::result;
    use crate::arrivals::PathArrival;
    use chrono::TimeZone;

    fn now() -> chrono::DateTime<chrono::Utc> {
        return chrono::Utc.with_ymd_and_hms(2025, 3, 4, 14, 0, 0).unwrap();
    }

    fn row(line: &str, to: &str, minutes: u32) -> PathArrival {
        return PathArrival{ line: line.to_string(), to: to.to_string(), minutes: minutes };
    }

    fn single_message(msg: serde_json::Value) -> String {
        return serde_json::json!({
            "results": [{
                "consideredStation": "HOB",
                "destinations": [{ "label": "33rd Street", "messages": [msg] }],
            }],
        }).to_string();
    }

    #[test]
    fn parse_fixture() {
        let raw_json = std::fs::read_to_string("testdata/ridepath.json")
            .expect("Error reading ridepath.json");

        let rows = super::parse_path_realtime(&raw_json, "HOB", 120, now())
            .expect("parse_path_realtime");

        assert_eq!(rows, vec![
            row("HOB-33", "33rd Street", 0),
            row("HOB-33", "33rd Street", 5),
            row("HOB-WTC", "World Trade Center", 7),
            row("HOB-WTC", "ToNJ", 9),
            row("HOB-33", "33rd Street", 12),
            row("HOB-WTC", "ToNJ", 20),
        ]);
    }

    #[test]
    fn timestamp_five_minutes_out() {
        let body = single_message(serde_json::json!({ "arrivalTime": "2025-03-04T14:05:00Z" }));

        let rows = super::parse_path_realtime(&body, "HOB", 120, now()).expect("parse");

        assert_eq!(rows, vec![row("PATH", "33rd Street", 5)]);
    }

    #[test]
    fn sub_minute_remainder_is_truncated() {
        let body = single_message(serde_json::json!({ "arrivalTime": "2025-03-04T14:05:59.900+00:00" }));

        let rows = super::parse_path_realtime(&body, "HOB", 120, now()).expect("parse");

        assert_eq!(rows[0].minutes, 5);
    }

    #[test]
    fn unparseable_timestamp_falls_back_to_message() {
        let body = single_message(serde_json::json!({
            "arrivalTime": "sometime soon",
            "arrivalTimeMessage": "7 min",
        }));

        let rows = super::parse_path_realtime(&body, "HOB", 120, now()).expect("parse");

        assert_eq!(rows, vec![row("PATH", "33rd Street", 7)]);
    }

    #[test]
    fn offsetless_timestamp_falls_back_to_message() {
        let body = single_message(serde_json::json!({
            "arrivalTime": "2025-03-04T14:30:00",
            "arrivalTimeMessage": "3 MIN",
        }));

        let rows = super::parse_path_realtime(&body, "HOB", 120, now()).expect("parse");

        assert_eq!(rows[0].minutes, 3);
    }

    #[test]
    fn window_excludes_later_arrivals() {
        let body = single_message(serde_json::json!({ "arrivalTimeMessage": "45 min" }));

        assert!(super::parse_path_realtime(&body, "HOB", 30, now()).expect("parse").is_empty());
        assert_eq!(super::parse_path_realtime(&body, "HOB", 45, now()).expect("parse").len(), 1);
    }

    #[test]
    fn other_stations_ignored() {
        let body = serde_json::json!({
            "results": [{
                "consideredStation": "JSQ",
                "destinations": [{ "label": "ToNY", "messages": [{ "arrivalTimeMessage": "2 min" }] }],
            }],
        }).to_string();

        assert!(super::parse_path_realtime(&body, "HOB", 120, now()).expect("parse").is_empty());
    }

    #[test]
    fn malformed_document_is_an_error() {
        assert!(super::parse_path_realtime("<html>", "HOB", 120, now()).is_err());
        assert!(super::parse_path_realtime("[1, 2]", "HOB", 120, now()).is_err());
    }

    #[test]
    fn missing_results_is_empty() {
        assert!(super::parse_path_realtime("{}", "HOB", 120, now()).expect("parse").is_empty());
    }

    #[test]
    fn fetch_failure_propagates() {
        let fake_fetch_fn = |_url: &str| -> result::HoboDashResult<String> {
            return Err(result::make_error("timed out"));
        };

        let err = super::get_path_arrivals(120, fake_fetch_fn).unwrap_err();

        assert_eq!(err.to_string(), "timed out");
    }

    #[test]
    fn fetches_path_feed() {
        let fake_fetch_fn = |url: &str| -> result::HoboDashResult<String> {
            assert_eq!(url, crate::config::PATH_URL);
            return Ok(r#"{"results": []}"#.to_string());
        };

        assert!(super::get_path_arrivals(120, fake_fetch_fn).expect("get_path_arrivals").is_empty());
    }
}
