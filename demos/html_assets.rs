mod utils;

use std::io::BufRead;

use anyhow::Error;
use hax_http::{
    asset::{self, Asset},
    HttpConfig, RequestContext,
};
use tracing::{event, Level};

const ASSETS: &[Asset<'static>] = &[
    Asset {
        request: "/",
        path: "index.html",
        content_type: "text/html",
    },
    Asset {
        request: "/style.css",
        path: "style.css",
        content_type: "text/css",
    },
];

fn main() -> Result<(), Error> {
    utils::init_logging();

    let prefix = concat!(env!("CARGO_MANIFEST_DIR"), "/assets/");
    let handler = move |path: &str, ctx: &mut RequestContext| {
        asset::serve(ASSETS, path, ctx, Some(prefix))
    };

    let task = hax_http::spawn(utils::listen_addr()?, HttpConfig::default(), handler)?;
    event!(Level::INFO, addr = ?task.local_addr(), "serving assets, press enter to stop");

    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;

    task.cancel_and_join()?;

    Ok(())
}
