#![forbid(unsafe_code)]

//! Portfolio demo: the scene, scroll scripts and the replay CLI.

pub mod cli;
pub mod error;
pub mod scene;
pub mod script;

pub use cli::{Args, OutputFormat, Summary, run, run_from_env};
pub use error::{DemoError, Result};
pub use scene::{Mounted, Scene};
pub use script::{Keyframe, ScrollScript};
