//! Response-shape schemas sent to Gemini as `responseSchema`.
//!
//! Each revision is an independent snapshot; nothing is shared between them.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    String { description: Option<&'static str> },
    Array { items: Box<SchemaNode>, description: Option<&'static str> },
    Object { properties: Vec<(&'static str, SchemaNode)>, required: Vec<&'static str> },
}

impl SchemaNode {
    pub fn string() -> Self {
        SchemaNode::String { description: None }
    }

    pub fn described(description: &'static str) -> Self {
        SchemaNode::String { description: Some(description) }
    }

    pub fn string_list() -> Self {
        SchemaNode::Array { items: Box::new(SchemaNode::string()), description: None }
    }

    pub fn string_list_described(description: &'static str) -> Self {
        SchemaNode::Array { items: Box::new(SchemaNode::string()), description: Some(description) }
    }

    pub fn list_of(items: SchemaNode) -> Self {
        SchemaNode::Array { items: Box::new(items), description: None }
    }

    /// Object whose every listed property is required.
    pub fn strict(properties: Vec<(&'static str, SchemaNode)>) -> Self {
        let required = properties.iter().map(|(name, _)| *name).collect();
        SchemaNode::Object { properties, required }
    }

    /// All-strings object, every property required.
    pub fn strings(names: &[&'static str]) -> Self {
        Self::strict(names.iter().map(|n| (*n, SchemaNode::string())).collect())
    }

    /// Gemini's OpenAPI-subset JSON form.
    pub fn to_json(&self) -> Value {
        match self {
            SchemaNode::String { description } => {
                let mut v = json!({ "type": "STRING" });
                if let Some(d) = description {
                    v["description"] = json!(d);
                }
                v
            }
            SchemaNode::Array { items, description } => {
                let mut v = json!({ "type": "ARRAY", "items": items.to_json() });
                if let Some(d) = description {
                    v["description"] = json!(d);
                }
                v
            }
            SchemaNode::Object { properties, required } => {
                let props: Map<String, Value> =
                    properties.iter().map(|(name, node)| (name.to_string(), node.to_json())).collect();
                json!({ "type": "OBJECT", "properties": props, "required": required })
            }
        }
    }
}

/// Which response shape a generation asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SchemaRevision {
    #[default]
    ProductContent,
    PodCampaign,
}

impl SchemaRevision {
    pub fn schema(self) -> ResponseSchema {
        match self {
            SchemaRevision::ProductContent => product_content(),
            SchemaRevision::PodCampaign => pod_campaign(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResponseSchema {
    pub revision: SchemaRevision,
    pub root: SchemaNode,
}

impl ResponseSchema {
    /// Keys required at the root. Only these are checked after generation.
    pub fn required_top_level(&self) -> &[&'static str] {
        match &self.root {
            SchemaNode::Object { required, .. } => required.as_slice(),
            _ => &[],
        }
    }

    pub fn to_json(&self) -> Value {
        self.root.to_json()
    }
}

pub fn product_content() -> ResponseSchema {
    let root = SchemaNode::strict(vec![
        ("conceptAnalysis", SchemaNode::described("Brief analysis of the product concept.")),
        ("brandSlogan", SchemaNode::strings(&["brand", "slogan"])),
        ("nicheTarget", SchemaNode::described("Real target niche.")),
        ("buyerPersonaSummary", SchemaNode::described("Summarised buyer persona.")),
        ("designProposals", SchemaNode::list_of(SchemaNode::strings(&["name", "description"]))),
        (
            "visualStyleOutput",
            SchemaNode::strict(vec![
                ("colors", SchemaNode::string_list()),
                ("composition", SchemaNode::string()),
                ("trend", SchemaNode::string()),
            ]),
        ),
        ("aiImagePrompt", SchemaNode::described("Prompt for AI mockup image generation.")),
        ("aiVideoPrompt", SchemaNode::described("Prompt for a short-form promotional video.")),
        ("ecommerceSalesCopy", SchemaNode::described("Sales copy optimised for eCommerce.")),
        (
            "hashtagsCTA",
            SchemaNode::strict(vec![("hashtags", SchemaNode::string_list()), ("cta", SchemaNode::string())]),
        ),
    ]);
    ResponseSchema { revision: SchemaRevision::ProductContent, root }
}

pub const PROMPT_VERSIONS: [(&str, &str); 12] = [
    ("versionA", "Prompt for Mass Market designs."),
    ("versionB", "Prompt for Premium / Limited Edition designs."),
    ("versionC", "Prompt for Viral Social designs."),
    ("versionD", "Prompt for Adaptive AI designs, optimized automatically."),
    ("versionE", "Prompt for Bundle / Cross-sell designs."),
    ("versionF", "Prompt for Complete Collection designs."),
    ("versionG", "Prompt for Auto-Predictive designs, selected automatically for maximum sales/virality."),
    ("versionH", "Prompt for Trending Micro-Emotion Hook, adjusted for viral trends."),
    ("versionI", "Prompt for AI Marketing Copy, generating titles, captions, hashtags, etc."),
    ("versionJ", "Prompt for Auto-Time Trigger, adjusted for micro-moments, festivities, and time of day."),
    ("versionK", "Prompt for Meta-Bundle, generating combined collections with narrative."),
    ("versionL", "Prompt for Full Predictive AI, dynamic adjustment based on real-time feedback and global trends."),
];

pub fn pod_campaign() -> ResponseSchema {
    let key_points =
        SchemaNode::strings(&["fabricMaterials", "styleFit", "printTechnique", "durability", "careInstructions"]);

    let printify = SchemaNode::strict(vec![
        ("name", SchemaNode::string()),
        ("descriptionShort", SchemaNode::string()),
        ("emotionalBenefits", SchemaNode::string()),
        ("tactileFeel", SchemaNode::string()),
        ("socialScenario", SchemaNode::string()),
        ("cta", SchemaNode::string()),
        ("keyPoints", key_points),
    ]);

    let visual_prompts =
        SchemaNode::strict(PROMPT_VERSIONS.iter().map(|(name, d)| (*name, SchemaNode::described(*d))).collect());

    let embedding = SchemaNode::strict(vec![
        ("branding", SchemaNode::string_list()),
        ("emotion", SchemaNode::string_list()),
        ("buyerPersona", SchemaNode::string_list()),
        ("niche", SchemaNode::string_list()),
        ("colors", SchemaNode::string_list()),
        ("sensation", SchemaNode::string_list()),
        ("triggerWords", SchemaNode::string_list()),
        ("tendencias", SchemaNode::string_list_described("Detected market trends.")),
        ("bundlesRecomendados", SchemaNode::string_list_described("Recommended bundles based on analysis.")),
    ]);

    let root = SchemaNode::strict(vec![
        (
            "inventedBuyerPersona",
            SchemaNode::described("A detailed description of the invented buyer persona for the product."),
        ),
        ("printifyProduct", printify),
        ("socialMediaCopy", SchemaNode::strings(&["facebookPost", "tiktokTitleHook", "tiktokDescription", "pinterestSEO"])),
        ("visualAIPrompt", visual_prompts),
        ("productEmbedding", embedding),
        ("shopifyIntegration", SchemaNode::strings(&["metafieldSnippet", "recommendationIdea"])),
        ("toneVariants", SchemaNode::strings(&["sexy", "cute", "aspirational", "dangerous", "collector"])),
    ]);
    ResponseSchema { revision: SchemaRevision::PodCampaign, root }
}
