extern crate chrono;
extern crate flexi_logger;
#[macro_use]
extern crate log;
#[macro_use]
extern crate serde_derive;

mod arrivals;
mod config;
mod dashboard;
mod entities;
mod html;
mod mybus;
mod path;
mod render;
mod result;
mod server;
mod webclient;

fn start_logger(log_to_file: bool) -> result::HoboDashResult<flexi_logger::LoggerHandle> {
    let logger = flexi_logger::Logger::try_with_env_or_str("info")
        .map_err(|err| result::make_error(&format!("Logger config: {}", err)))?
        .format(flexi_logger::detailed_format);

    let logger = if log_to_file {
        logger
            .log_to_file(flexi_logger::FileSpec::default())
            .duplicate_to_stderr(flexi_logger::Duplicate::Info)
    } else {
        logger
    };

    return logger.start()
        .map_err(|err| result::make_error(&format!("Logger start: {}", err)));
}

fn run(args: &[String]) -> result::HoboDashResult<()> {
    let opts = config::parse_args(args)?;

    if let Some(usage) = opts.help {
        println!("{}", usage);
        return Ok(());
    }

    let _logger = start_logger(opts.log_to_file)?;

    info!("Running. window={}min refresh={}s one-shot={}",
          opts.config.window_minutes, opts.config.refresh_seconds, opts.one_shot);

    let client = webclient::FeedClient::new()?;

    if opts.one_shot {
        let panels = dashboard::run_cycle(&client, opts.config.window_minutes);
        print!("{}", render::render_text(&panels, opts.config.window_minutes, &chrono::Local::now()));
        return Ok(());
    }

    return server::run_server(&opts.config, &client);
}

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if let Err(err) = run(args.get(1..).unwrap_or_default()) {
        eprintln!("{}", err);
        std::process::exit(1);
    }
}
