pub mod video_convert;
