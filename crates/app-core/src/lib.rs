pub mod constants;
pub mod flow;
pub mod locale;
pub mod raycast;
pub mod scene;
pub mod session;
pub static SCENE_WGSL: &str = include_str!("../shaders/scene.wgsl");

pub use constants::*;
pub use flow::*;
pub use locale::*;
pub use scene::*;
pub use session::*;
