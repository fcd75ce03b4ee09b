//! Request handlers for the upload page
//!
//! These are framework-agnostic: a host server maps `GET /` to [`index`]
//! and `POST /convert` to [`convert`], passing the multipart files along
//! as an [`UploadForm`].

use crate::config::DepthConfig;
use crate::page::{self, Page};
use crate::transfer::{self, UploadForm};

/// `GET /`: the empty upload form
pub fn index() -> String {
    page::render(&Page::default())
}

/// `POST /convert`: the form again, with either both images or an error
pub fn convert(form: &UploadForm, config: &DepthConfig) -> String {
    let page = match transfer::convert(form, config) {
        Ok(conversion) => Page::from(conversion),
        Err(e) => {
            if e.is_client_error() {
                log::info!("Rejected upload: {e}");
            } else {
                log::warn!("Conversion failed: {e}");
            }
            Page::with_error(e.to_string())
        }
    };

    page::render(&page)
}
