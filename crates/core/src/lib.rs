pub mod annotation {
    pub mod domain {
        pub mod color;
        pub mod frame_annotator;
        pub mod glyph_rasterizer;
        pub mod text_mask;
        pub mod text_overlay;
    }
    pub mod infrastructure;
}

pub mod config {
    pub mod annotate_config;
    pub mod config_error;
    pub mod video_config;
}

pub mod pipeline {
    pub mod annotate_video_use_case;
    pub mod pipeline_logger;
}

pub mod shared {
    pub mod constants;
    pub mod frame;
    pub mod video_metadata;
}

pub mod video {
    pub mod domain {
        pub mod video_io_error;
        pub mod video_reader;
        pub mod video_writer;
    }
    pub mod infrastructure;
}
