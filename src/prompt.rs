//! Builds the instruction sent alongside the source image.
//!
//! Clauses are appended in a fixed order: base style, character, scene,
//! influence, face preservation, quality. Character and scene text is embedded
//! verbatim between double quotes and is not escaped.

use crate::models::{InfluenceBand, PromptParams, Quality};

pub const FACE_PRESERVATION_CLAUSE: &str = "IMPORTANT: Preserve the facial features, identity and expression of every person in the original image exactly. Do not alter, replace or restyle their faces.";

pub const HIGH_QUALITY_CLAUSE: &str = "Render the result in high definition with photorealistic detail, sharp textures and clean edges, targeting a 2K to 4K resolution.";

pub const STANDARD_QUALITY_CLAUSE: &str =
    "Render the result at standard web quality, targeting roughly 720p resolution.";

pub fn influence_clause(band: InfluenceBand) -> &'static str {
    match band {
        InfluenceBand::AdhereClosely => {
            "Adhere closely to the character and scene descriptions provided."
        }
        InfluenceBand::StrongReference => {
            "Use the character and scene descriptions as a strong reference, allowing for some stylization."
        }
        InfluenceBand::LooseInspiration => {
            "Use the character and scene descriptions as loose inspiration, allowing for significant creative interpretation."
        }
    }
}

pub fn quality_clause(quality: Quality) -> &'static str {
    match quality {
        Quality::High => HIGH_QUALITY_CLAUSE,
        Quality::Standard => STANDARD_QUALITY_CLAUSE,
    }
}

pub fn character_clause(character: &str) -> Option<String> {
    non_blank(character).map(|text| format!("Depict the main character as \"{}\".", text))
}

pub fn scene_clause(scene: &str) -> Option<String> {
    non_blank(scene).map(|text| format!("Set the scene in \"{}\".", text))
}

fn non_blank(text: &str) -> Option<&str> {
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Composes the full instruction. Deterministic and side-effect free.
pub fn compose_prompt(params: &PromptParams) -> String {
    let mut clauses: Vec<String> = Vec::with_capacity(6);
    clauses.push(params.base_style.trim_end().to_string());

    if let Some(clause) = character_clause(&params.character) {
        clauses.push(clause);
    }
    if let Some(clause) = scene_clause(&params.scene) {
        clauses.push(clause);
    }

    clauses.push(influence_clause(params.influence.band()).to_string());
    clauses.push(FACE_PRESERVATION_CLAUSE.to_string());
    clauses.push(quality_clause(params.quality).to_string());

    clauses.join(" ")
}

/// Positional form of [`compose_prompt`], taking the raw quality selector.
pub fn compose(
    base_style: &str,
    influence: u8,
    character: &str,
    scene: &str,
    quality_selector: &str,
) -> String {
    let params = PromptParams::new(base_style)
        .with_influence(influence)
        .with_character(character)
        .with_scene(scene)
        .with_quality(Quality::parse(quality_selector));
    compose_prompt(&params)
}
