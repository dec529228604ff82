use url::Url;

use crate::Error;

mod anubis;
mod crtsh;
mod hackertarget;
mod rapiddns;
mod web_archive;

pub use anubis::AnubisDb;
pub use crtsh::CrtSh;
pub use hackertarget::HackerTarget;
pub use rapiddns::{page_count, RapidDns, MAX_PAGES, PAGE_SIZE};
pub use web_archive::WebArchive;

fn endpoint(base_url: &str, path: &str) -> Result<Url, Error> {
    let mut url = Url::parse(base_url)?;
    url.set_path(path);
    Ok(url)
}
