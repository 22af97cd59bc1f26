pub mod desk;
pub mod form;
pub mod sessions;
pub mod table;
