use crate::options::{BackgroundType, EnhancementOptions};

pub const PROMPT_PREAMBLE: &str = "Professional photo enhancement: ";
pub const QUALITY_CLAUSE: &str = "high quality, 4k resolution, professional photography. ";

const LIGHTING_CLAUSE: &str = "improve lighting, adjust brightness and contrast, ";
const COMPOSITION_CLAUSE: &str = "improve composition and framing, ";
const COLORS_CLAUSE: &str = "enhance colors, increase saturation, ";
const SHARPNESS_CLAUSE: &str = "increase sharpness and details, ";
const NOTES_PREFIX: &str = "Additional instructions: ";

pub fn background_clause(background_type: BackgroundType) -> Option<&'static str> {
    match background_type {
        BackgroundType::Studio => {
            Some("with professional studio background, clean white backdrop, ")
        }
        BackgroundType::Outdoor => Some("with beautiful outdoor background, natural scenery, "),
        BackgroundType::Blur => Some("with soft blurred background, bokeh effect, "),
        BackgroundType::Beach => Some("with tropical beach background, ocean and palm trees, "),
        BackgroundType::Office => Some("with modern office background, professional workspace, "),
        BackgroundType::Custom => Some("with replaced background, seamless integration, "),
        BackgroundType::None => None,
    }
}

pub fn build_prompt(options: &EnhancementOptions) -> String {
    let mut prompt = String::from(PROMPT_PREAMBLE);

    if options.lighting {
        prompt.push_str(LIGHTING_CLAUSE);
    }
    if options.composition {
        prompt.push_str(COMPOSITION_CLAUSE);
    }
    if options.colors {
        prompt.push_str(COLORS_CLAUSE);
    }
    if options.sharpness {
        prompt.push_str(SHARPNESS_CLAUSE);
    }

    if options.wants_background_swap() {
        if let Some(clause) = background_clause(options.background_type()) {
            prompt.push_str(clause);
        }
    }

    prompt.push_str(QUALITY_CLAUSE);

    if !options.reference_notes.is_empty() {
        prompt.push_str(NOTES_PREFIX);
        prompt.push_str(options.reference_notes.as_str());
    }

    prompt
}
