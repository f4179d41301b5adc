//! Server-rendered pages and embedded assets

mod assets;
mod templates;

pub use assets::public_asset;
pub use templates::Templates;
