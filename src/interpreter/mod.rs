pub mod destruct;
pub mod engine;
pub mod native;
pub mod scope;
pub mod sink;
pub mod value;
