pub mod builtins;
pub mod config;
pub mod editor;
pub mod hints;
pub mod imports;
pub mod logging;
pub mod matcher;
pub mod partials;
pub mod provider;
pub mod scan;
pub mod scope;
pub mod session;
pub mod text;
