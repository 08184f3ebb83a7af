use super::model::{GenerationRequest, Theme};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageError};

/// Neither side of the image sent to the generation service exceeds this
pub const MAX_IMAGE_DIMENSION: u32 = 1024;

const JPEG_QUALITY: u8 = 60;

const OUTPUT_SCHEMA: &str = r#"Reply with a single JSON object and nothing else, in this shape:
{
    "title": "story title",
    "text": "story body...",
    "averagePitch": 120.5,
    "pitchStdDev": 15.2,
    "mfccValues": [[v1, v2, ..., v13], [v1, v2, ..., v13]]
}

averagePitch is a real number between 0 and 200: the average pitch of a narrator voice that suits the story.
pitchStdDev is a real number between 0 and 50: the standard deviation of that voice's pitch.
mfccValues is a two-dimensional array of 13-coefficient MFCC vectors for that voice.

The story should take about five minutes to read aloud (roughly 3000 to 5000 characters).
It must be suitable for readers of all ages and written entirely in Korean."#;

/// Genre-specific opening of the instruction
pub fn theme_instruction(theme: Theme) -> &'static str {
    match theme {
        Theme::Fantasy => "Based on this image, write a fantasy fairy tale in Korean. Include magic, adventure and an imaginary world.",
        Theme::Romance => "Based on this image, write a fairy tale about love in Korean. Center it on warm feelings and human relationships.",
        Theme::SciFi => "Based on this image, write a science-fiction fairy tale in Korean. Include elements such as the future, technology or space.",
        Theme::Horror => "Based on this image, write a fairy tale in Korean with spooky elements that children can still read: a little thrilling, never truly frightening.",
        Theme::Comedy => "Based on this image, write a humorous, fun fairy tale in Korean. Include situations or characters that make readers laugh.",
    }
}

/// Full instruction text: theme template followed by the output schema
pub fn build_instruction(theme: Theme) -> String {
    format!("{}\n\n{}", theme_instruction(theme), OUTPUT_SCHEMA)
}

/// Scale the image down so it fits in a `max` x `max` box, keeping its aspect ratio.
/// Images already inside the box are returned unchanged.
pub fn fit_within(image: DynamicImage, max: u32) -> DynamicImage {
    let (width, height) = image.dimensions();
    if width <= max && height <= max {
        return image;
    }

    image.resize(max, max, FilterType::Triangle)
}

/// Assemble the generation request for a validated image.
///
/// Pure transformation: resizes, re-encodes as JPEG and attaches the theme
/// instruction. Only fails if the JPEG encoder does.
pub fn build(theme: Theme, image: DynamicImage) -> Result<GenerationRequest, ImageError> {
    let (original_width, original_height) = image.dimensions();
    let resized = fit_within(image, MAX_IMAGE_DIMENSION);
    let (width, height) = resized.dimensions();

    let rgb = DynamicImage::ImageRgb8(resized.to_rgb8());
    let mut jpeg = Vec::new();
    rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut jpeg, JPEG_QUALITY))?;

    tracing::debug!(
        theme = %theme,
        original_width,
        original_height,
        width,
        height,
        jpeg_size = jpeg.len(),
        "Generation request built"
    );

    Ok(GenerationRequest::new(
        theme,
        build_instruction(theme),
        jpeg,
        width,
        height,
    ))
}
