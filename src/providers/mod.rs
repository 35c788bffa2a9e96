pub mod errors;
pub mod openai;
