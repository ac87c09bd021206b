//! Static file responses.

use std::{fs::File, io, path::Path};

use bytes::BufMut;
use tracing::{event, Level};

use crate::RequestContext;

/// Entry of a static asset table.
#[derive(Debug, Clone, Copy)]
pub struct Asset<'a> {
    /// Request path to match, compared exactly.
    pub request: &'a str,
    /// File path, appended to the prefix given to [`serve`].
    pub path: &'a str,
    pub content_type: &'a str,
}

/// Answer `path` from an asset table.
///
/// Returns false if no entry matches or the file can't be read, in which case `ctx` is left
/// untouched.
pub fn serve(assets: &[Asset], path: &str, ctx: &mut RequestContext, prefix: Option<&str>) -> bool {
    let Some(asset) = assets.iter().find(|asset| asset.request == path) else {
        return false;
    };

    let file_path = format!("{}{}", prefix.unwrap_or(""), asset.path);
    send_file(Path::new(&file_path), asset.content_type, ctx)
}

/// Answer with the contents of a single file.
pub fn send_file(path: &Path, content_type: &str, ctx: &mut RequestContext) -> bool {
    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(error) => {
            event!(Level::DEBUG, ?path, %error, "failed to open asset");
            return false;
        }
    };

    let start = ctx.output.len();
    let mut writer = (&mut ctx.output).writer();
    if let Err(error) = io::copy(&mut file, &mut writer) {
        event!(Level::WARN, ?path, %error, "failed to read asset");
        ctx.output.truncate(start);
        return false;
    }

    ctx.response.add("Content-Type", content_type);
    true
}
