// IO action backend: single-shot actions, triggered jobs and their result files.

pub mod client;
pub mod models;
