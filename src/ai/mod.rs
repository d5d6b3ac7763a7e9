pub mod intent;
pub mod prompt;
