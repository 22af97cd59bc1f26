pub mod random;
pub mod reqwest;
pub mod url;
