pub mod substitute;
