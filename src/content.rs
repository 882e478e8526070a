//! Typed response shapes and their rendering into copyable sections.
//!
//! Every field falls back to its default when absent, null or of the wrong
//! type: the validator only guarantees the top-level keys, and decoding must
//! not be stricter than that.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_with::{serde_as, DefaultOnError};

use crate::schema::{SchemaRevision, PROMPT_VERSIONS};

/// One rendered block of output, with the text a copy button would place on
/// the clipboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub title: String,
    pub body: String,
    pub copy_text: String,
}

impl Section {
    fn plain(title: &str, text: &str) -> Self {
        Self { title: title.to_string(), body: text.to_string(), copy_text: text.to_string() }
    }

    fn with_copy(title: &str, body: String, copy_text: String) -> Self {
        Self { title: title.to_string(), body, copy_text }
    }
}

#[serde_as]
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BrandSlogan {
    #[serde_as(as = "DefaultOnError")]
    pub brand: String,
    #[serde_as(as = "DefaultOnError")]
    pub slogan: String,
}

#[serde_as]
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DesignProposal {
    #[serde_as(as = "DefaultOnError")]
    pub name: String,
    #[serde_as(as = "DefaultOnError")]
    pub description: String,
}

#[serde_as]
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct VisualStyle {
    #[serde_as(as = "DefaultOnError")]
    pub colors: Vec<String>,
    #[serde_as(as = "DefaultOnError")]
    pub composition: String,
    #[serde_as(as = "DefaultOnError")]
    pub trend: String,
}

#[serde_as]
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HashtagsCta {
    #[serde_as(as = "DefaultOnError")]
    pub hashtags: Vec<String>,
    #[serde_as(as = "DefaultOnError")]
    pub cta: String,
}

#[serde_as]
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductContent {
    #[serde_as(as = "DefaultOnError")]
    pub concept_analysis: String,
    #[serde_as(as = "DefaultOnError")]
    pub brand_slogan: BrandSlogan,
    #[serde_as(as = "DefaultOnError")]
    pub niche_target: String,
    #[serde_as(as = "DefaultOnError")]
    pub buyer_persona_summary: String,
    #[serde_as(as = "DefaultOnError")]
    pub design_proposals: Vec<DesignProposal>,
    #[serde_as(as = "DefaultOnError")]
    pub visual_style_output: VisualStyle,
    #[serde_as(as = "DefaultOnError")]
    pub ai_image_prompt: String,
    #[serde_as(as = "DefaultOnError")]
    pub ai_video_prompt: String,
    #[serde_as(as = "DefaultOnError")]
    pub ecommerce_sales_copy: String,
    #[serde(rename = "hashtagsCTA")]
    #[serde_as(as = "DefaultOnError")]
    pub hashtags_cta: HashtagsCta,
}

impl ProductContent {
    pub fn sections(&self) -> Vec<Section> {
        let proposals = self
            .design_proposals
            .iter()
            .enumerate()
            .map(|(i, p)| format!("Propuesta {}: {}\n{}", i + 1, p.name, p.description))
            .collect::<Vec<_>>()
            .join("\n\n");

        let style = &self.visual_style_output;
        let hashtags = self.hashtags_cta.hashtags.join(", ");
        let slogan = format!("Marca: {}\nSlogan: {}", self.brand_slogan.brand, self.brand_slogan.slogan);
        let cta = format!("Hashtags: {}\nCTA: {}", hashtags, self.hashtags_cta.cta);

        vec![
            Section::plain("1) Análisis breve del concepto", &self.concept_analysis),
            Section::with_copy("2) Marca + Slogan", slogan.clone(), slogan),
            Section::plain("3) Nicho objetivo real", &self.niche_target),
            Section::plain("4) Buyer Persona resumido", &self.buyer_persona_summary),
            Section::with_copy("5) 3 propuestas de diseño POD", proposals, pretty(&self.design_proposals)),
            Section::with_copy(
                "6) Estilo visual (colores, composición, tendencia)",
                format!("Colores: {}\nComposición: {}\nTendencia: {}", style.colors.join(", "), style.composition, style.trend),
                pretty(style),
            ),
            Section::plain("7) Prompt para imagen IA (para generar mockups)", &self.ai_image_prompt),
            Section::plain("8) Prompt para video promocional short-form (TikTok/Reels)", &self.ai_video_prompt),
            Section::plain("9) Copy de venta optimizado para eCommerce", &self.ecommerce_sales_copy),
            Section::with_copy("10) Hashtags y CTA", cta.clone(), cta),
        ]
    }
}

#[serde_as]
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct KeyPoints {
    #[serde_as(as = "DefaultOnError")]
    pub fabric_materials: String,
    #[serde_as(as = "DefaultOnError")]
    pub style_fit: String,
    #[serde_as(as = "DefaultOnError")]
    pub print_technique: String,
    #[serde_as(as = "DefaultOnError")]
    pub durability: String,
    #[serde_as(as = "DefaultOnError")]
    pub care_instructions: String,
}

#[serde_as]
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct PrintifyProduct {
    #[serde_as(as = "DefaultOnError")]
    pub name: String,
    #[serde_as(as = "DefaultOnError")]
    pub description_short: String,
    #[serde_as(as = "DefaultOnError")]
    pub emotional_benefits: String,
    #[serde_as(as = "DefaultOnError")]
    pub tactile_feel: String,
    #[serde_as(as = "DefaultOnError")]
    pub social_scenario: String,
    #[serde_as(as = "DefaultOnError")]
    pub cta: String,
    #[serde_as(as = "DefaultOnError")]
    pub key_points: KeyPoints,
}

#[serde_as]
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct SocialMediaCopy {
    #[serde_as(as = "DefaultOnError")]
    pub facebook_post: String,
    #[serde_as(as = "DefaultOnError")]
    pub tiktok_title_hook: String,
    #[serde_as(as = "DefaultOnError")]
    pub tiktok_description: String,
    #[serde(rename = "pinterestSEO")]
    #[serde_as(as = "DefaultOnError")]
    pub pinterest_seo: String,
}

#[serde_as]
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductEmbedding {
    #[serde_as(as = "DefaultOnError")]
    pub branding: Vec<String>,
    #[serde_as(as = "DefaultOnError")]
    pub emotion: Vec<String>,
    #[serde_as(as = "DefaultOnError")]
    pub buyer_persona: Vec<String>,
    #[serde_as(as = "DefaultOnError")]
    pub niche: Vec<String>,
    #[serde_as(as = "DefaultOnError")]
    pub colors: Vec<String>,
    #[serde_as(as = "DefaultOnError")]
    pub sensation: Vec<String>,
    #[serde_as(as = "DefaultOnError")]
    pub trigger_words: Vec<String>,
    #[serde_as(as = "DefaultOnError")]
    pub tendencias: Vec<String>,
    #[serde_as(as = "DefaultOnError")]
    pub bundles_recomendados: Vec<String>,
}

#[serde_as]
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ShopifyIntegration {
    #[serde_as(as = "DefaultOnError")]
    pub metafield_snippet: String,
    #[serde_as(as = "DefaultOnError")]
    pub recommendation_idea: String,
}

#[serde_as]
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ToneVariants {
    #[serde_as(as = "DefaultOnError")]
    pub sexy: String,
    #[serde_as(as = "DefaultOnError")]
    pub cute: String,
    #[serde_as(as = "DefaultOnError")]
    pub aspirational: String,
    #[serde_as(as = "DefaultOnError")]
    pub dangerous: String,
    #[serde_as(as = "DefaultOnError")]
    pub collector: String,
}

/// Earlier campaign-style revision with twelve prompt variants (A–L).
#[serde_as]
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct PodCampaign {
    #[serde_as(as = "DefaultOnError")]
    pub invented_buyer_persona: String,
    #[serde_as(as = "DefaultOnError")]
    pub printify_product: PrintifyProduct,
    #[serde_as(as = "DefaultOnError")]
    pub social_media_copy: SocialMediaCopy,
    #[serde(rename = "visualAIPrompt")]
    #[serde_as(as = "DefaultOnError")]
    pub visual_ai_prompt: std::collections::BTreeMap<String, String>,
    #[serde_as(as = "DefaultOnError")]
    pub product_embedding: ProductEmbedding,
    #[serde_as(as = "DefaultOnError")]
    pub shopify_integration: ShopifyIntegration,
    #[serde_as(as = "DefaultOnError")]
    pub tone_variants: ToneVariants,
}

impl PodCampaign {
    pub fn sections(&self) -> Vec<Section> {
        let p = &self.printify_product;
        let k = &p.key_points;
        let product = format!(
            "Nombre: {}\n{}\n\nBeneficio emocional: {}\nSensación táctil: {}\nEscenario social: {}\nCTA: {}\n\n\
             Materiales: {}\nEstilo / fit: {}\nTécnica: {}\nDurabilidad: {}\nCuidado: {}",
            p.name, p.description_short, p.emotional_benefits, p.tactile_feel, p.social_scenario, p.cta,
            k.fabric_materials, k.style_fit, k.print_technique, k.durability, k.care_instructions
        );

        let s = &self.social_media_copy;
        let social = format!(
            "Facebook: {}\nTikTok: {}\n{}\nPinterest: {}",
            s.facebook_post, s.tiktok_title_hook, s.tiktok_description, s.pinterest_seo
        );

        // declared A–L order, even if the model returned extra keys
        let prompts = PROMPT_VERSIONS
            .iter()
            .filter_map(|(key, _)| self.visual_ai_prompt.get(*key).map(|v| format!("{}: {}", key, v)))
            .collect::<Vec<_>>()
            .join("\n\n");

        let e = &self.product_embedding;
        let embedding = [
            ("Branding", &e.branding),
            ("Emoción", &e.emotion),
            ("Buyer persona", &e.buyer_persona),
            ("Nicho", &e.niche),
            ("Colores", &e.colors),
            ("Sensación", &e.sensation),
            ("Trigger words", &e.trigger_words),
            ("Tendencias", &e.tendencias),
            ("Bundles recomendados", &e.bundles_recomendados),
        ]
        .iter()
        .map(|(label, values)| format!("{}: {}", label, values.join(", ")))
        .collect::<Vec<_>>()
        .join("\n");

        let shopify = format!(
            "{}\n\n{}",
            self.shopify_integration.metafield_snippet, self.shopify_integration.recommendation_idea
        );

        let t = &self.tone_variants;
        let tones = format!(
            "🔥 Sexy: {}\n🥺 Cute: {}\n🚀 Aspiracional: {}\n😈 Peligrosa: {}\n🧠 Coleccionista: {}",
            t.sexy, t.cute, t.aspirational, t.dangerous, t.collector
        );

        vec![
            Section::plain("1) Buyer persona inventado", &self.invented_buyer_persona),
            Section::with_copy("2) Ficha Printify del producto", product.clone(), product),
            Section::with_copy("3) Copy viral redes sociales", social.clone(), social),
            Section::with_copy("4) Prompt IA diseño visual", prompts, pretty(&self.visual_ai_prompt)),
            Section::with_copy("5) Embeddings", embedding, pretty(&self.product_embedding)),
            Section::with_copy("6) Uso en Shopify", shopify.clone(), shopify),
            Section::with_copy("7) Variantes de tono", tones.clone(), tones),
        ]
    }
}

fn pretty<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_default()
}

/// Validated output of either revision.
#[derive(Debug, Clone, PartialEq)]
pub enum GeneratedContent {
    ProductContent(ProductContent),
    PodCampaign(PodCampaign),
}

impl GeneratedContent {
    pub fn decode(revision: SchemaRevision, value: Value) -> Result<Self, serde_json::Error> {
        Ok(match revision {
            SchemaRevision::ProductContent => GeneratedContent::ProductContent(serde_json::from_value(value)?),
            SchemaRevision::PodCampaign => GeneratedContent::PodCampaign(serde_json::from_value(value)?),
        })
    }

    pub fn sections(&self) -> Vec<Section> {
        match self {
            GeneratedContent::ProductContent(c) => c.sections(),
            GeneratedContent::PodCampaign(c) => c.sections(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{full_pod_campaign, full_product_content};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn product_content_renders_ten_sections() {
        let content: ProductContent = serde_json::from_value(full_product_content()).unwrap();
        let sections = content.sections();
        assert_eq!(sections.len(), 10);
        assert_eq!(sections[1].copy_text, "Marca: Cotorra\nSlogan: Habla claro");
        assert!(sections[4].body.starts_with("Propuesta 1: Loro sunset"));
        assert_eq!(sections[9].body, "Hashtags: #lorocubano, #miami\nCTA: Compra ya");
    }

    #[test]
    fn decoding_tolerates_missing_nested_fields() {
        let mut value = full_product_content();
        value["brandSlogan"] = json!({ "brand": "Cotorra" });
        let content: ProductContent = serde_json::from_value(value).unwrap();
        assert_eq!(content.brand_slogan.slogan, "");
    }

    #[test]
    fn decoding_tolerates_nulls_and_mismatched_types() {
        let mut value = full_product_content();
        value["hashtagsCTA"]["cta"] = Value::Null;
        value["nicheTarget"] = json!(7);
        value["designProposals"] = json!("tres propuestas");
        value["brandSlogan"] = json!(true);

        let content = GeneratedContent::decode(SchemaRevision::ProductContent, value).unwrap();
        let GeneratedContent::ProductContent(content) = content else { panic!("wrong revision") };
        assert_eq!(content.hashtags_cta.cta, "");
        assert_eq!(content.hashtags_cta.hashtags, vec!["#lorocubano", "#miami"]);
        assert_eq!(content.niche_target, "");
        assert!(content.design_proposals.is_empty());
        assert_eq!(content.brand_slogan, BrandSlogan::default());
        assert_eq!(content.sections().len(), 10);
    }

    #[test]
    fn campaign_decoding_tolerates_broken_prompt_map() {
        let mut value = full_pod_campaign();
        value["visualAIPrompt"]["versionC"] = Value::Null;
        value["productEmbedding"] = json!(42);

        let content = GeneratedContent::decode(SchemaRevision::PodCampaign, value).unwrap();
        assert_eq!(content.sections().len(), 7);
    }

    #[test]
    fn campaign_prompts_follow_declared_order() {
        let content = GeneratedContent::decode(SchemaRevision::PodCampaign, full_pod_campaign()).unwrap();
        let sections = content.sections();
        assert_eq!(sections.len(), 7);
        let prompts = &sections[3].body;
        assert!(prompts.starts_with("versionA: prompt versionA"));
        assert!(prompts.find("versionB").unwrap() < prompts.find("versionL").unwrap());
    }

    #[test]
    fn product_content_round_trips_its_wire_names() {
        let content: ProductContent = serde_json::from_value(full_product_content()).unwrap();
        let back = serde_json::to_value(&content).unwrap();
        assert_eq!(back["hashtagsCTA"]["cta"], "Compra ya");
        assert_eq!(back["visualStyleOutput"]["composition"], "centered-full");
    }
}
