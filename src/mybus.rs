extern crate regex;

use crate::arrivals::{self, BusArrival};
use crate::html;
use crate::result;

/// One route/destination/ETA triple pulled out of the page text, before the
/// ETA token has been turned into minutes.
#[derive(Debug, PartialEq)]
pub struct EtaMatch {
    pub route: String,
    pub to: String,
    pub eta: String,
}

/// Finds ETA rows in the visible text of a MyBus page. The page layout isn't
/// documented anywhere, so the matching lives behind this trait.
pub trait EtaMatcher {
    fn find_etas(&self, text: &str) -> Vec<EtaMatch>;
}

/// Matches runs like "#126 To 126 NEW YORK 13 MIN", "#126 To 126
/// HOBOKEN-PATH < 1 MIN" and "#22 To 22 HOBOKEN DUE".
pub struct RegexEtaMatcher {
    pattern: regex::Regex,
}

impl RegexEtaMatcher {
    pub fn new() -> result::HoboDashResult<RegexEtaMatcher> {
        let pattern = regex::Regex::new(
            r"(?i)#(?P<route>\d+)\s+To\s+(?P<to>.+?)\s+(?P<eta><\s*1|DUE|\d+)\s*(?:MIN)?")?;
        return Ok(RegexEtaMatcher{ pattern: pattern });
    }
}

impl EtaMatcher for RegexEtaMatcher {
    fn find_etas(&self, text: &str) -> Vec<EtaMatch> {
        return self.pattern.captures_iter(text)
            .map(|caps| EtaMatch{
                route: caps["route"].trim().to_string(),
                to: caps["to"].trim().to_string(),
                eta: caps["eta"].trim().to_string(),
            })
            .collect();
    }
}

pub fn get_bus_arrivals<F>(url: &str, window: u32, fetch_fn: F) -> result::HoboDashResult<Vec<BusArrival>>
where
    F: Fn(&str) -> result::HoboDashResult<String>,
{
    let body = fetch_fn(url)?;
    return parse_mybus_eta(&body, window);
}

/// Bus arrivals on a MyBus ETA page that are at most `window` minutes out,
/// unique and sorted by minutes. A page with no recognizable rows is an empty
/// list, not an error.
pub fn parse_mybus_eta(page: &str, window: u32) -> result::HoboDashResult<Vec<BusArrival>> {
    let matcher = RegexEtaMatcher::new()?;
    return Ok(parse_mybus_eta_with(&matcher, page, window));
}

pub fn parse_mybus_eta_with(matcher: &dyn EtaMatcher, page: &str, window: u32) -> Vec<BusArrival> {
    let text = html::visible_text(page);

    let rows: Vec<BusArrival> = matcher.find_etas(&text).into_iter()
        .filter_map(|m| {
            let minutes = match eta_minutes(&m.eta) {
                Some(minutes) => minutes,
                None => {
                    debug!("Skipping unreadable ETA '{}' for #{}", m.eta, m.route);
                    return None;
                }
            };
            return Some(BusArrival{ route: m.route, to: m.to, minutes: minutes });
        })
        .filter(|r| arrivals::within_window(r.minutes, window))
        .collect();

    return arrivals::collapse_rows(rows, |r| (r.route.clone(), r.to.clone(), r.minutes));
}

fn eta_minutes(eta: &str) -> Option<u32> {
    let eta = eta.trim().to_ascii_uppercase();
    if eta == "DUE" || eta.starts_with('<') {
        return Some(0);
    }
    return eta.parse::<u32>().ok();
}

#[cfg(test)]
mod tests {
    use super::{result, EtaMatch, EtaMatcher};
    use crate::arrivals::BusArrival;

    fn row(route: &str, to: &str, minutes: u32) -> BusArrival {
        return BusArrival{ route: route.to_string(), to: to.to_string(), minutes: minutes };
    }

    #[test]
    fn minutes_eta() {
        let rows = super::parse_mybus_eta("#126 To 126 NEW YORK 13 MIN", 120).expect("parse");
        assert_eq!(rows, vec![row("126", "126 NEW YORK", 13)]);
    }

    #[test]
    fn due_eta() {
        let rows = super::parse_mybus_eta("#22 To 22 HOBOKEN DUE", 120).expect("parse");
        assert_eq!(rows, vec![row("22", "22 HOBOKEN", 0)]);
    }

    #[test]
    fn less_than_one_eta() {
        let rows = super::parse_mybus_eta("#126 To 126 HOBOKEN-PATH &lt; 1 MIN", 120).expect("parse");
        assert_eq!(rows, vec![row("126", "126 HOBOKEN-PATH", 0)]);
    }

    #[test]
    fn destination_entities_are_decoded() {
        let rows = super::parse_mybus_eta("<p>#87 To 87 JOURNAL SQ &ndash; PATH 4 MIN</p>", 120).expect("parse");
        assert_eq!(rows, vec![row("87", "87 JOURNAL SQ \u{2013} PATH", 4)]);
    }

    #[test]
    fn unquoted_apostrophe_in_tag_keeps_rows() {
        let rows = super::parse_mybus_eta("<img alt=Bob's><p>#22 To 22 HOBOKEN DUE</p>", 120).expect("parse");
        assert_eq!(rows, vec![row("22", "22 HOBOKEN", 0)]);
    }

    #[test]
    fn case_insensitive() {
        let rows = super::parse_mybus_eta("#87 to 87 Journal Square due", 120).expect("parse");
        assert_eq!(rows, vec![row("87", "87 Journal Square", 0)]);
    }

    #[test]
    fn parse_fixture() {
        let page = std::fs::read_to_string("testdata/mybus_eta.html")
            .expect("Error reading mybus_eta.html");

        let rows = super::parse_mybus_eta(&page, 120).expect("parse");

        assert_eq!(rows, vec![
            row("126", "126 NEW YORK", 0),
            row("22", "22 HOBOKEN", 0),
            row("126", "126 NEW YORK", 13),
            row("126", "126 NEW YORK", 41),
        ]);
    }

    #[test]
    fn window_excludes_later_buses() {
        let rows = super::parse_mybus_eta("#126 To 126 NEW YORK 45 MIN #126 To 126 NEW YORK 12 MIN", 30)
            .expect("parse");
        assert_eq!(rows, vec![row("126", "126 NEW YORK", 12)]);
    }

    #[test]
    fn oversized_eta_is_skipped() {
        let rows = super::parse_mybus_eta("#126 To 126 NEW YORK 99999999999 MIN", 240).expect("parse");
        assert!(rows.is_empty());
    }

    #[test]
    fn no_matches_is_empty() {
        let page = "<html><body><p>No arrival times available.</p></body></html>";
        assert_eq!(super::parse_mybus_eta(page, 120).expect("parse"), vec![]);
    }

    #[test]
    fn custom_matcher() {
        struct Fixed;
        impl EtaMatcher for Fixed {
            fn find_etas(&self, _text: &str) -> Vec<EtaMatch> {
                return vec![
                    EtaMatch{ route: "9".to_string(), to: "X".to_string(), eta: "3".to_string() },
                    EtaMatch{ route: "9".to_string(), to: "X".to_string(), eta: "soon".to_string() },
                ];
            }
        }

        assert_eq!(super::parse_mybus_eta_with(&Fixed, "", 120), vec![row("9", "X", 3)]);
    }

    #[test]
    fn empty_page_and_failed_fetch_differ() {
        let empty_fetch_fn = |_url: &str| -> result::HoboDashResult<String> {
            return Ok("<html></html>".to_string());
        };
        let failed_fetch_fn = |_url: &str| -> result::HoboDashResult<String> {
            return Err(result::make_error("HTTP status server error (503 Service Unavailable)"));
        };

        assert_eq!(super::get_bus_arrivals("http://eta", 120, empty_fetch_fn).expect("empty page"), vec![]);
        assert!(super::get_bus_arrivals("http://eta", 120, failed_fetch_fn).is_err());
    }
}
