pub mod message;
pub mod parser;
pub mod serializer;
pub mod time;
pub mod validate;
