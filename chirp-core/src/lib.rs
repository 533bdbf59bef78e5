pub mod builtins;
pub mod compiler;
pub mod config;
pub mod registry;
pub mod soundboard;

pub use compiler::compile;
pub use config::{Config, ConfigError};
pub use registry::RecipeRegistry;
pub use soundboard::SoundBoard;
