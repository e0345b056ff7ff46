// Persisted user settings (credential, language, criteria form) and scan history.

pub mod handlers;
pub mod history;
pub mod store;
