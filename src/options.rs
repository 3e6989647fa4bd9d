use crate::image_ref::ImageRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackgroundType {
    Studio,
    Outdoor,
    Blur,
    Beach,
    Office,
    Custom,
    None,
}

impl BackgroundType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Studio => "studio",
            Self::Outdoor => "outdoor",
            Self::Blur => "blur",
            Self::Beach => "beach",
            Self::Office => "office",
            Self::Custom => "custom",
            Self::None => "none",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnhancementOptions {
    pub lighting: bool,
    pub composition: bool,
    pub colors: bool,
    pub sharpness: bool,
    pub reference_notes: String,
    background_change: bool,
    background_type: BackgroundType,
    background_intensity: u8,
    custom_background: Option<ImageRef>,
}

impl Default for EnhancementOptions {
    fn default() -> Self {
        Self {
            lighting: true,
            composition: true,
            colors: true,
            sharpness: true,
            reference_notes: String::new(),
            background_change: false,
            background_type: BackgroundType::Studio,
            background_intensity: 50,
            custom_background: None,
        }
    }
}

impl EnhancementOptions {
    pub fn background_change(&self) -> bool {
        self.background_change
    }

    pub fn background_type(&self) -> BackgroundType {
        self.background_type
    }

    pub fn background_intensity(&self) -> u8 {
        self.background_intensity
    }

    pub fn custom_background(&self) -> Option<&ImageRef> {
        self.custom_background.as_ref()
    }

    // Invariant: a custom background type implies background_change, and the
    // custom reference is only held while the type is Custom. The mutators
    // below keep both directions true at every step.

    pub fn set_background_change(&mut self, enabled: bool) {
        if !enabled && self.background_type == BackgroundType::Custom {
            self.background_type = BackgroundType::Studio;
            self.custom_background = None;
        }
        self.background_change = enabled;
    }

    pub fn set_background_type(&mut self, background_type: BackgroundType) {
        if background_type == BackgroundType::Custom {
            self.background_change = true;
        } else {
            self.custom_background = None;
        }
        self.background_type = background_type;
    }

    pub fn set_custom_background(&mut self, reference: ImageRef) {
        self.background_change = true;
        self.background_type = BackgroundType::Custom;
        self.custom_background = Some(reference);
    }

    pub fn clear_custom_background(&mut self) {
        self.custom_background = None;
    }

    pub fn set_background_intensity(&mut self, intensity: u8) {
        self.background_intensity = intensity.min(100);
    }

    pub fn wants_background_swap(&self) -> bool {
        self.background_change && self.background_type != BackgroundType::None
    }
}
