pub mod canvas;
pub mod cpu_renderer;
pub mod render_cache;

pub use canvas::{Canvas, CanvasFactory, CanvasProperties, DrawTarget, Shadow};
pub use cpu_renderer::{Bitmap, CpuCanvas, CpuCanvasConfig, CpuCanvasFactory};
pub use render_cache::{CacheEntry, RenderCache, RenderSnapshot};
