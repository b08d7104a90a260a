pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod gesture;
pub mod landmarks;
pub mod lane;
pub mod layout;
pub mod schedule;
pub mod scoring;
pub mod session;
pub mod synth;
pub mod volume;

pub use config::*;
pub use constants::*;
pub use engine::*;
pub use error::*;
pub use gesture::*;
pub use landmarks::*;
pub use lane::*;
pub use layout::*;
pub use schedule::*;
pub use scoring::*;
pub use session::*;
pub use synth::*;
pub use volume::*;
