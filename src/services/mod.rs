pub mod clip_service;
pub mod frame_index;
pub mod indexing_service;
pub mod media_tool;
pub mod retrieval_service;
pub mod subtitle_service;
