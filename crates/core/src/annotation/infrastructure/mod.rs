pub mod bitmap_font_rasterizer;
pub mod fontdue_rasterizer;
pub mod overlay_renderer;
pub mod rasterizer_factory;
