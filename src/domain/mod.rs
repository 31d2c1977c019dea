pub mod identity;
pub mod track;
