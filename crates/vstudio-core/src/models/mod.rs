pub mod caption;
pub mod confidentiality;
pub mod metadata;
pub mod publish;
pub mod timestamp;
pub mod video;
pub mod youtube;

pub use caption::*;
pub use confidentiality::*;
pub use metadata::*;
pub use publish::*;
pub use video::*;
pub use youtube::*;

use serde::{Deserialize, Serialize};

/// Generic `{ "ok": bool }` acknowledgement returned by several endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OkResponse {
    #[serde(default)]
    pub ok: bool,
}
