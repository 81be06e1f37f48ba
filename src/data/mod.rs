pub mod migrations;
pub mod repository;
pub mod search_index;
