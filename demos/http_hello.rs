mod utils;

use anyhow::Error;
use hax_http::{cookies, HttpConfig, HttpService, Pairs, RequestContext};
use hax_tcp::Poller;
use tracing::{event, Level};

fn main() -> Result<(), Error> {
    utils::init_logging();

    let config = HttpConfig::default();
    let mut poller = Poller::new(config.events_capacity)?;
    let mut service = HttpService::bind(poller.registry()?, utils::listen_addr()?, config)?;

    // Run the event loop
    let mut handler = handle;
    loop {
        service.run_once(&mut poller, None, &mut handler)?;
    }
}

fn handle(path: &str, ctx: &mut RequestContext) -> bool {
    event!(Level::INFO, verb = %ctx.request.verb, path, "received request");

    match path {
        "/" => {
            let visits = ctx
                .cookies()
                .get("visits")
                .and_then(|value| value.parse::<u32>().ok())
                .unwrap_or(0)
                + 1;

            let mut cookie = Pairs::new();
            cookie.append("visits", visits.to_string());
            ctx.response.add("Set-Cookie", &cookies::format(&cookie));
            ctx.response.add("Content-Type", "text/html");

            ctx.write(PAGE_START.as_bytes());
            ctx.write(format!("<p>Visit number {}.</p>", visits).as_bytes());
            ctx.write(FORM.as_bytes());
            ctx.write(PAGE_END.as_bytes());
        }
        "/greet" => {
            let name = match ctx.form() {
                Ok(form) => form.get("name").map(cookies::sanitize),
                Err(error) => {
                    event!(Level::WARN, %error, "invalid form");
                    None
                }
            };

            ctx.response.add("Content-Type", "text/plain");
            let text = format!("Hello, {}!", name.as_deref().unwrap_or("stranger"));
            ctx.write(text.as_bytes());
        }
        "/old" => {
            ctx.status = 302;
            ctx.response.add("Location", "/");
        }
        _ => return false,
    }

    true
}

const PAGE_START: &str = "<!DOCTYPE html><html><body><h1>Hello, World!</h1>";

const PAGE_END: &str = "</body></html>";

const FORM: &str =
    "<form method=\"post\" action=\"/greet\"><input name=\"name\"/><button>Greet</button></form>";
