use std::fmt;

/// Straight-alpha sRGB color used for fill, outline and shadow.
pub type Color = palette::Srgba;

/// 2D offset in pixels, used for shadow displacement.
pub type Offset = euclid::default::Vector2D<f32>;

/// Fully transparent black.
pub fn transparent() -> Color {
    Color::new(0.0, 0.0, 0.0, 0.0)
}

/// Opaque black, the default fill.
pub fn black() -> Color {
    Color::new(0.0, 0.0, 0.0, 1.0)
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
    Oblique,
}

impl FontStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            FontStyle::Normal => "normal",
            FontStyle::Italic => "italic",
            FontStyle::Oblique => "oblique",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
/// Horizontal anchor of a line relative to its draw position.
///
/// `Start` and `End` resolve against a left-to-right direction.
pub enum TextAlign {
    #[default]
    Left,
    Right,
    Center,
    Start,
    End,
}

impl TextAlign {
    pub fn as_str(self) -> &'static str {
        match self {
            TextAlign::Left => "left",
            TextAlign::Right => "right",
            TextAlign::Center => "center",
            TextAlign::Start => "start",
            TextAlign::End => "end",
        }
    }

    /// Fraction of the advance width that lies left of the anchor.
    pub fn anchor_fraction(self) -> f32 {
        match self {
            TextAlign::Left | TextAlign::Start => 0.0,
            TextAlign::Center => 0.5,
            TextAlign::Right | TextAlign::End => 1.0,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
/// Vertical anchor of a line relative to its draw position.
pub enum BaseAlign {
    #[default]
    Alphabetic,
    Bottom,
    Hanging,
    Ideographic,
    Middle,
    Top,
}

impl BaseAlign {
    pub fn as_str(self) -> &'static str {
        match self {
            BaseAlign::Alphabetic => "alphabetic",
            BaseAlign::Bottom => "bottom",
            BaseAlign::Hanging => "hanging",
            BaseAlign::Ideographic => "ideographic",
            BaseAlign::Middle => "middle",
            BaseAlign::Top => "top",
        }
    }
}

/// Font selection handed to a drawing surface.
///
/// The `Display` form is the CSS-like shorthand
/// `"<style> <weight> <size>px <family>"`.
#[derive(Clone, Debug, PartialEq)]
pub struct FontSpec {
    pub family: String,
    pub style: FontStyle,
    pub bold: bool,
    pub size: f32,
}

impl FontSpec {
    pub fn weight_str(&self) -> &'static str {
        if self.bold { "bold" } else { "normal" }
    }
}

impl fmt::Display for FontSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}px {}",
            self.style.as_str(),
            self.weight_str(),
            self.size,
            self.family
        )
    }
}

/// Fully resolved style snapshot.
///
/// Every optional option has already been replaced with its effective value,
/// so two snapshots compare equal exactly when they would render the same
/// bitmap for the same text.
#[derive(Clone, Debug, PartialEq)]
pub struct TextStyle {
    pub font: FontSpec,
    pub text_align: TextAlign,
    pub base_align: BaseAlign,
    pub line_height: f32,
    /// `f32::INFINITY` disables wrapping.
    pub wrap_width: f32,
    pub color: Color,
    pub outline_color: Color,
    pub outline_width: f32,
    pub shadow_color: Color,
    pub shadow_offset: Offset,
    pub shadow_blur_radius: f32,
}

impl Default for TextStyle {
    fn default() -> Self {
        TextOptions::default().style()
    }
}

impl TextStyle {
    /// A shadow is drawn only when its color is not fully transparent.
    pub fn has_shadow(&self) -> bool {
        self.shadow_color.alpha > 0.0
    }

    /// Stroke is centered on the glyph contour, so only half of it lands
    /// outside; doubling keeps the visible outline at `outline_width`.
    pub fn stroke_width(&self) -> f32 {
        2.0 * self.outline_width
    }

    pub fn stroke_color(&self) -> Color {
        if self.outline_width == 0.0 {
            transparent()
        } else {
            self.outline_color
        }
    }

    /// Whole-pixel padding reserved on every side for the outline.
    pub fn outline_margin(&self) -> f32 {
        self.outline_width.max(0.0).ceil()
    }
}

/// Flat set of independently settable text options.
///
/// `line_height` and `wrap_width` stay optional here and are resolved once
/// by [`TextOptions::style`].
#[derive(Clone, Debug, PartialEq)]
pub struct TextOptions {
    pub text: String,
    pub font_family: String,
    pub font_style: FontStyle,
    pub bold: bool,
    pub font_size: f32,
    pub text_align: TextAlign,
    pub base_align: BaseAlign,
    /// Defaults to `font_size`.
    pub line_height: Option<f32>,
    /// `None` means unbounded.
    pub wrap_width: Option<f32>,
    pub color: Color,
    pub outline_color: Color,
    pub outline_width: f32,
    pub shadow_color: Color,
    pub shadow_offset: Offset,
    pub shadow_blur_radius: f32,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            text: String::new(),
            font_family: "sans-serif".into(),
            font_style: FontStyle::Normal,
            bold: false,
            font_size: 10.0,
            text_align: TextAlign::Left,
            base_align: BaseAlign::Alphabetic,
            line_height: None,
            wrap_width: None,
            color: black(),
            outline_color: transparent(),
            outline_width: 0.0,
            shadow_color: transparent(),
            shadow_offset: Offset::zero(),
            shadow_blur_radius: 0.0,
        }
    }
}

impl TextOptions {
    /// Resolves defaults into an immutable style snapshot.
    pub fn style(&self) -> TextStyle {
        TextStyle {
            font: FontSpec {
                family: self.font_family.clone(),
                style: self.font_style,
                bold: self.bold,
                size: self.font_size,
            },
            text_align: self.text_align,
            base_align: self.base_align,
            line_height: self.line_height.unwrap_or(self.font_size),
            wrap_width: self.wrap_width.unwrap_or(f32::INFINITY),
            color: self.color,
            outline_color: self.outline_color,
            outline_width: self.outline_width.max(0.0),
            shadow_color: self.shadow_color,
            shadow_offset: self.shadow_offset,
            shadow_blur_radius: self.shadow_blur_radius.max(0.0),
        }
    }
}
