use crate::level::{ClauseFields, ClauseReader, LevelSerializable, LevelWriter};
use crate::object::GameObject;
use crate::sector::Sector;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Color {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Color {
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Color { red, green, blue }
    }
}

/// Sector backdrop: either a scrolling image or a vertical gradient.
/// A non-empty image always wins over the gradient.
pub struct Background {
    image: Option<String>,
    speed: f32,
    gradient_top: Color,
    gradient_bottom: Color,
}

impl Background {
    pub fn new() -> Self {
        Background {
            image: None,
            speed: 0.5,
            gradient_top: Color::new(0, 0, 128),
            gradient_bottom: Color::new(0, 0, 128),
        }
    }

    pub fn parse(reader: &ClauseReader<'_>) -> Self {
        let mut background = Background::new();
        match reader.read_string("image") {
            Some(image) if !image.is_empty() => {
                let speed = reader.read_float("speed").unwrap_or(0.5);
                background.set_image(image, speed);
            }
            _ => {
                background.set_gradient(
                    read_color(reader, "top", background.gradient_top),
                    read_color(reader, "bottom", background.gradient_bottom),
                );
            }
        }
        background
    }

    pub fn set_image(&mut self, image: String, speed: f32) {
        self.image = Some(image);
        self.speed = speed;
    }

    pub fn set_gradient(&mut self, top: Color, bottom: Color) {
        self.image = None;
        self.gradient_top = top;
        self.gradient_bottom = bottom;
    }

    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    pub fn gradient(&self) -> (Color, Color) {
        (self.gradient_top, self.gradient_bottom)
    }
}

fn read_color(reader: &ClauseReader<'_>, edge: &str, fallback: Color) -> Color {
    Color::new(
        reader
            .read_int(&format!("red_{edge}"))
            .unwrap_or(fallback.red as i64) as u8,
        reader
            .read_int(&format!("green_{edge}"))
            .unwrap_or(fallback.green as i64) as u8,
        reader
            .read_int(&format!("blue_{edge}"))
            .unwrap_or(fallback.blue as i64) as u8,
    )
}

impl Default for Background {
    fn default() -> Self {
        Background::new()
    }
}

impl GameObject for Background {
    fn update(&mut self, _sector: &mut Sector, _elapsed: f32) {}
}

impl LevelSerializable for Background {
    fn write(&self, writer: &mut LevelWriter) {
        let mut fields = ClauseFields::new();
        if let Some(image) = &self.image {
            fields = fields.string("image", image).float("speed", self.speed);
        } else {
            fields = fields
                .int("red_top", self.gradient_top.red as i64)
                .int("green_top", self.gradient_top.green as i64)
                .int("blue_top", self.gradient_top.blue as i64)
                .int("red_bottom", self.gradient_bottom.red as i64)
                .int("green_bottom", self.gradient_bottom.green as i64)
                .int("blue_bottom", self.gradient_bottom.blue as i64);
        }
        writer.write_clause("background", fields);
    }
}
