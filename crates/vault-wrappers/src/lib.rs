pub mod wrappers;
