use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StyleOption {
    pub id: &'static str,
    pub name: &'static str,
    pub prompt_template: &'static str,
}

pub const STYLE_OPTIONS: &[StyleOption] = &[
    StyleOption {
        id: "cyberpunk",
        name: "Cyberpunk",
        prompt_template: "Transform this image into a cyberpunk scene with neon lighting, rain-slicked streets, holographic signage and a dark futuristic atmosphere.",
    },
    StyleOption {
        id: "anime",
        name: "Anime",
        prompt_template: "Transform this image into a hand-drawn anime illustration with clean line art, cel shading and vibrant colors.",
    },
    StyleOption {
        id: "watercolor",
        name: "Watercolor",
        prompt_template: "Transform this image into a watercolor painting with soft washes, visible paper texture and gentle color bleeding.",
    },
    StyleOption {
        id: "oil-painting",
        name: "Oil Painting",
        prompt_template: "Transform this image into a classical oil painting with rich pigments, visible brushstrokes and dramatic chiaroscuro lighting.",
    },
    StyleOption {
        id: "pixel-art",
        name: "Pixel Art",
        prompt_template: "Transform this image into 16-bit pixel art with a limited retro palette and crisp pixel edges.",
    },
    StyleOption {
        id: "comic-book",
        name: "Comic Book",
        prompt_template: "Transform this image into a comic book panel with bold ink outlines, halftone shading and saturated primary colors.",
    },
    StyleOption {
        id: "claymation",
        name: "Claymation",
        prompt_template: "Transform this image into a claymation scene where everything looks sculpted from modelling clay, with soft studio lighting.",
    },
    StyleOption {
        id: "vintage-photo",
        name: "Vintage Photograph",
        prompt_template: "Transform this image into a vintage 1970s film photograph with warm faded tones, film grain and slight vignetting.",
    },
    StyleOption {
        id: "fantasy",
        name: "Fantasy Art",
        prompt_template: "Transform this image into epic fantasy concept art with magical lighting, ornate details and a painterly finish.",
    },
    StyleOption {
        id: "pop-art",
        name: "Pop Art",
        prompt_template: "Transform this image into pop art in the spirit of 1960s screen prints, with flat bold colors and Ben-Day dots.",
    },
];

impl StyleOption {
    pub fn all() -> &'static [StyleOption] {
        STYLE_OPTIONS
    }

    pub fn by_id(id: &str) -> Option<&'static StyleOption> {
        STYLE_OPTIONS.iter().find(|style| style.id.eq_ignore_ascii_case(id.trim()))
    }
}
