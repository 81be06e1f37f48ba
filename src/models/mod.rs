pub mod clip;
pub mod search;
pub mod subtitle;
pub mod video;
