extern crate getopts;
extern crate querystring;

use crate::result;

pub const PATH_URL: &str = "https://www.panynj.gov/bin/portauthority/ridepath.json";
pub const PATH_STATION: &str = "HOB";
pub const PATH_TITLE: &str = "PATH — Hoboken";

pub const MYBUS_HOME: &str = "https://mybusnow.njtransit.com/bustime/wireless/html/home.jsp";

pub struct BusStop {
    pub title: &'static str,
    pub url: &'static str,
}

pub const BUS_STOPS: [BusStop; 2] = [
    BusStop{
        title: "Bus — Washington St + 11th St (Stop 20513)",
        url: "https://mybusnow.njtransit.com/bustime/wireless/html/eta.jsp?direction=New+York&id=20513&route=126&showAllBusses=on",
    },
    BusStop{
        title: "Bus — Washington St + 10th St (Stop 20516)",
        url: "https://mybusnow.njtransit.com/bustime/wireless/html/eta.jsp?direction=Hoboken%2FJersey+City&id=20516&route=126&showAllBusses=on",
    },
];

pub const DEFAULT_WINDOW_MIN: u32 = 120;
pub const MIN_WINDOW_MIN: u32 = 30;
pub const MAX_WINDOW_MIN: u32 = 240;
pub const WINDOW_STEP_MIN: u32 = 15;

pub const DEFAULT_REFRESH_SEC: u32 = 30;
pub const MIN_REFRESH_SEC: u32 = 15;
pub const MAX_REFRESH_SEC: u32 = 120;
pub const REFRESH_STEP_SEC: u32 = 5;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_BIND: &str = "0.0.0.0";

#[derive(Clone, Debug, PartialEq)]
pub struct DashConfig {
    pub window_minutes: u32,
    pub refresh_seconds: u32,
    pub bind: String,
    pub port: u16,
}

impl Default for DashConfig {
    fn default() -> DashConfig {
        return DashConfig{
            window_minutes: DEFAULT_WINDOW_MIN,
            refresh_seconds: DEFAULT_REFRESH_SEC,
            bind: DEFAULT_BIND.to_string(),
            port: DEFAULT_PORT,
        };
    }
}

impl DashConfig {
    /// Applies `?window=N&refresh=S` from a request URL. Values that don't
    /// parse are ignored, values out of range are clamped.
    pub fn with_query(&self, query: Option<&str>) -> DashConfig {
        let mut cfg = self.clone();
        let query = match query {
            Some(q) => q,
            None => return cfg,
        };

        for (k, v) in querystring::querify(query) {
            match (k, v.parse::<u32>()) {
                ("window", Ok(n)) => cfg.window_minutes = clamp_window(n),
                ("refresh", Ok(n)) => cfg.refresh_seconds = clamp_refresh(n),
                _ => {},
            }
        }

        return cfg;
    }
}

pub fn clamp_window(minutes: u32) -> u32 {
    return minutes.clamp(MIN_WINDOW_MIN, MAX_WINDOW_MIN);
}

pub fn clamp_refresh(seconds: u32) -> u32 {
    return seconds.clamp(MIN_REFRESH_SEC, MAX_REFRESH_SEC);
}

pub struct CliOptions {
    pub config: DashConfig,
    pub one_shot: bool,
    pub log_to_file: bool,
    pub help: Option<String>,
}

pub fn parse_args(args: &[String]) -> result::HoboDashResult<CliOptions> {
    let mut opts = getopts::Options::new();
    opts.optopt("p", "port", "port for the web view", "PORT");
    opts.optopt("b", "bind", "address for the web view", "ADDR");
    opts.optopt("w", "window", "show departures within this many minutes", "MINUTES");
    opts.optopt("r", "refresh", "auto-refresh interval of the web view", "SECONDS");
    opts.optflag("o", "one-shot", "fetch once, print to stdout and exit");
    opts.optflag("l", "log-to-file", "also write logs to a file in the working directory");
    opts.optflag("h", "help", "print this help");

    let matches = opts.parse(args)
        .map_err(|err| result::make_error(&format!("Bad arguments: {}", err)))?;

    let mut config = DashConfig::default();

    if let Some(port) = matches.opt_str("port") {
        config.port = parse_number(&port, "port")?;
    }
    if let Some(bind) = matches.opt_str("bind") {
        config.bind = bind;
    }
    if let Some(window) = matches.opt_str("window") {
        config.window_minutes = clamp_window(parse_number(&window, "window")?);
    }
    if let Some(refresh) = matches.opt_str("refresh") {
        config.refresh_seconds = clamp_refresh(parse_number(&refresh, "refresh")?);
    }

    let help = if matches.opt_present("help") {
        Some(opts.usage("Usage: hobodash [options]"))
    } else {
        None
    };

    return Ok(CliOptions{
        config: config,
        one_shot: matches.opt_present("one-shot"),
        log_to_file: matches.opt_present("log-to-file"),
        help: help,
    });
}

fn parse_number<T: std::str::FromStr>(value: &str, name: &str) -> result::HoboDashResult<T> {
    return value.trim().parse::<T>()
        .map_err(|_| result::make_error(&format!("Invalid --{}: '{}'", name, value)));
}
