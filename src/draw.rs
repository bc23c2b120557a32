use embedded_graphics::{
    mono_font::{MonoFont, MonoTextStyleBuilder, MonoTextStyle},
    pixelcolor::Rgb888,
    prelude::*,
    primitives::{PrimitiveStyleBuilder, Rectangle},
    text::{Baseline, Text},
};

use embedded_text::{
    alignment::{HorizontalAlignment, VerticalAlignment},
    style::TextBoxStyleBuilder,
    TextBox,
};

/// Render text with its top-left corner at `pos`.
pub fn draw_text<D>(
    target: &mut D,
    text: &str,
    pos: Point,
    font: &MonoFont,
    color: Rgb888,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb888> + OriginDimensions,
{
    Text::with_baseline(
        text,
        pos,
        MonoTextStyleBuilder::new()
            .font(font)
            .text_color(color)
            .build(),
        Baseline::Top,
    )
    .draw(target)?;
    Ok(())
}

/// Render text aligned within a band of the given length.
pub fn draw_text_align<D>(
    target: &mut D,
    text: &str,
    top_left: Point,
    length: u32,
    align: HorizontalAlignment,
    font: &MonoFont,
    color: Rgb888,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb888> + OriginDimensions,
{
    let h = font.character_size.height;
    let character_style = MonoTextStyle::new(font, color);
    let textbox_style = TextBoxStyleBuilder::new()
        .alignment(align)
        .vertical_alignment(VerticalAlignment::Middle)
        .build();
    let band = Rectangle::new(top_left, Size::new(length, h));
    TextBox::with_textbox_style(text, band, character_style, textbox_style).draw(target)?;
    Ok(())
}

/// Filled rectangle with an optional border.
pub fn draw_rectangle<D>(
    target: &mut D,
    top_left: Point,
    w: u32,
    h: u32,
    fill: Rgb888,
    border_width: Option<u32>,
    border_color: Option<Rgb888>,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb888> + OriginDimensions,
{
    Rectangle::new(top_left, Size::new(w, h))
        .into_styled(
            PrimitiveStyleBuilder::new()
                .stroke_color(border_color.unwrap_or(fill))
                .stroke_width(border_width.unwrap_or(0))
                .fill_color(fill)
                .build(),
        )
        .draw(target)?;
    Ok(())
}
