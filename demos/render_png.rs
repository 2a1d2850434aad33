use std::sync::Arc;

use image::RgbaImage;
use textbake::{
    Bitmap, CpuCanvasFactory, FontSystem, Text,
    text::{BaseAlign, Color, Offset, TextAlign, TextOptions},
};

const WIDTH: u32 = 640;
const HEIGHT: u32 = 360;

#[allow(clippy::unwrap_used)]
fn main() {
    env_logger::init();

    let fonts = Arc::new(FontSystem::new());
    fonts.load_system_fonts();
    assert!(!fonts.is_empty(), "system fonts are required for this demo");
    let factory = CpuCanvasFactory::new(fonts);

    let mut title: Text<Bitmap> = Text::new(TextOptions {
        text: "textbake".into(),
        bold: true,
        font_size: 64.0,
        text_align: TextAlign::Center,
        base_align: BaseAlign::Top,
        color: Color::new(1.0, 0.85, 0.2, 1.0),
        outline_color: Color::new(0.1, 0.05, 0.0, 1.0),
        outline_width: 3.0,
        shadow_color: Color::new(0.0, 0.0, 0.0, 0.6),
        shadow_offset: Offset::new(4.0, 6.0),
        shadow_blur_radius: 6.0,
        ..Default::default()
    });

    let mut body: Text<Bitmap> = Text::new(TextOptions {
        text: "Styled text is wrapped greedily on whitespace, rasterized once with \
               fill, outline and shadow, and reused every frame until an option \
               changes.\nNewlines always start a new line."
            .into(),
        font_size: 22.0,
        line_height: Some(30.0),
        wrap_width: Some(WIDTH as f32 - 80.0),
        color: Color::new(0.95, 0.95, 0.95, 1.0),
        shadow_color: Color::new(0.0, 0.0, 0.0, 0.8),
        shadow_offset: Offset::new(2.0, 2.0),
        shadow_blur_radius: 2.0,
        ..Default::default()
    });

    let mut frame = Bitmap::new(WIDTH, HEIGHT);
    for y in 0..HEIGHT as i64 {
        for x in 0..WIDTH as i64 {
            let t = y as f32 / HEIGHT as f32;
            frame.blend(x, y, Color::new(0.15, 0.2 + 0.2 * t, 0.45, 1.0), 1.0);
        }
    }

    let timer = std::time::Instant::now();
    title
        .draw(&factory, &mut frame, WIDTH as f32 / 2.0, 30.0)
        .unwrap();
    body.draw(&factory, &mut frame, 40.0, 160.0).unwrap();
    println!("First draw (builds): {:.2?}", timer.elapsed());

    // Cached images are blitted again without rasterizing.
    let timer = std::time::Instant::now();
    title
        .draw(&factory, &mut frame, WIDTH as f32 / 2.0, 30.0)
        .unwrap();
    body.draw(&factory, &mut frame, 40.0, 160.0).unwrap();
    println!(
        "Second draw (cached): {:.2?}, builds: title={} body={}",
        timer.elapsed(),
        title.build_count(),
        body.build_count()
    );

    let bounds = body.local_bounds(&factory).unwrap();
    println!(
        "Body bounds relative to origin: {:?} .. {:?} ({} lines)",
        bounds.min,
        bounds.max,
        body.cache().entry().map_or(0, |entry| entry.line_count)
    );

    let image = RgbaImage::from_raw(WIDTH, HEIGHT, frame.to_rgba8()).unwrap();
    image.save("render_png.png").unwrap();
    println!("Saved render_png.png");
}
