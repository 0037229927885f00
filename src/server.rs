extern crate chrono;
extern crate serde_json;
extern crate tiny_http;

use crate::config;
use crate::dashboard::{self, Panel};
use crate::render;
use crate::result;
use crate::webclient;

#[derive(Debug)]
struct Reply {
    status: u16,
    content_type: &'static str,
    body: String,
}

#[derive(Serialize)]
struct DeparturesResponse<'a> {
    window_minutes: u32,
    updated: String,
    panels: &'a [Panel],
}

/// Serves the dashboard. Requests are handled one at a time, so each page
/// load runs its three feeds strictly in sequence.
pub fn run_server(cfg: &config::DashConfig, client: &webclient::FeedClient) -> result::HoboDashResult<()> {
    let listen = format!("{}:{}", cfg.bind, cfg.port);
    let server = tiny_http::Server::http(&listen)
        .map_err(|err| result::make_error(&format!("Couldn't listen on {}: {}", listen, err)))?;

    info!("Serving dashboard on http://{}/", listen);

    for request in server.incoming_requests() {
        let reply = handle(
            request.method(),
            request.url(),
            cfg,
            |window| dashboard::run_cycle(client, window),
            &chrono::Local::now());

        let reply = match reply {
            Ok(reply) => reply,
            Err(err) => {
                error!("Failed to serve {}: {}", request.url(), err);
                Reply{ status: 500, content_type: "text/plain; charset=utf-8", body: err.to_string() }
            },
        };

        let content_type = tiny_http::Header::from_bytes("Content-Type", reply.content_type)
            .map_err(|_| result::make_error("Bad Content-Type header"))?;
        let response = tiny_http::Response::from_string(reply.body)
            .with_status_code(reply.status)
            .with_header(content_type);

        if let Err(err) = request.respond(response) {
            warn!("Couldn't write response: {}", err);
        }
    }

    return Ok(());
}

fn handle<C>(
    method: &tiny_http::Method,
    url: &str,
    cfg: &config::DashConfig,
    run_cycle_fn: C,
    now: &chrono::DateTime<chrono::Local>) -> result::HoboDashResult<Reply>
where
    C: Fn(u32) -> Vec<Panel>,
{
    let (path, query) = match url.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (url, None),
    };

    debug!("{} {}", method, url);

    match (method, path) {
        (&tiny_http::Method::Get, "/") => {
            let cfg = cfg.with_query(query);
            let panels = run_cycle_fn(cfg.window_minutes);
            return Ok(Reply{
                status: 200,
                content_type: "text/html; charset=utf-8",
                body: render::render_html(&panels, &cfg, now),
            });
        },
        (&tiny_http::Method::Get, "/api/departures") => {
            let cfg = cfg.with_query(query);
            let panels = run_cycle_fn(cfg.window_minutes);
            let body = serde_json::to_string(&DeparturesResponse{
                window_minutes: cfg.window_minutes,
                updated: now.to_rfc3339(),
                panels: &panels,
            })?;
            return Ok(Reply{ status: 200, content_type: "application/json", body: body });
        },
        (_, _) => {
            return Ok(Reply{
                status: 404,
                content_type: "text/html; charset=utf-8",
                body: "<h1>404</h1><p>Not found!<p>".to_string(),
            });
        },
    }
}
