use serde_json::{json, Value};

pub fn full_product_content() -> Value {
    json!({
        "conceptAnalysis": "Loro cubano con actitud",
        "brandSlogan": { "brand": "Cotorra", "slogan": "Habla claro" },
        "nicheTarget": "Diáspora cubana en Miami",
        "buyerPersonaSummary": "Mujer 25-35, nostálgica, humor pícaro",
        "designProposals": [
            { "name": "Loro sunset", "description": "Loro sobre atardecer habanero" },
            { "name": "Loro neón", "description": "Estilo vaporwave" },
            { "name": "Loro clásico", "description": "Line art minimal" }
        ],
        "visualStyleOutput": { "colors": ["#00A86B", "#FF4F00"], "composition": "centered-full", "trend": "tropical retro" },
        "aiImagePrompt": "Vector art of a Cuban parrot, 4500x5400 px, 300 DPI",
        "aiVideoPrompt": "15s reel, parrot flies across the Malecón",
        "ecommerceSalesCopy": "Lleva La Habana contigo.",
        "hashtagsCTA": { "hashtags": ["#lorocubano", "#miami"], "cta": "Compra ya" }
    })
}

pub fn full_pod_campaign() -> Value {
    let versions: serde_json::Map<String, Value> = crate::schema::PROMPT_VERSIONS
        .iter()
        .map(|(name, _)| (name.to_string(), json!(format!("prompt {name}"))))
        .collect();

    json!({
        "inventedBuyerPersona": "Valeria, 28, Hialeah, coleccionista de merch retro",
        "printifyProduct": {
            "name": "Camiseta Loro Cubano",
            "descriptionShort": "Suave, atrevida y con sabor.",
            "emotionalBenefits": "Orgullo",
            "tactileFeel": "Algodón peinado",
            "socialScenario": "Domingo en Calle Ocho",
            "cta": "Pídela hoy",
            "keyPoints": {
                "fabricMaterials": "100% algodón",
                "styleFit": "Unisex regular",
                "printTechnique": "DTG vibrante",
                "durability": "50 lavados",
                "careInstructions": "Lavar en frío"
            }
        },
        "socialMediaCopy": {
            "facebookPost": "¿Quién dijo loro?",
            "tiktokTitleHook": "Este loro habla más que tu tía",
            "tiktokDescription": "Boca a boca",
            "pinterestSEO": "camiseta loro cubano"
        },
        "visualAIPrompt": versions,
        "productEmbedding": {
            "branding": ["cotorra"], "emotion": ["nostalgia"], "buyerPersona": ["diáspora"],
            "niche": ["cuba"], "colors": ["verde"], "sensation": ["calor"],
            "triggerWords": ["loro"], "tendencias": ["retro"], "bundlesRecomendados": ["taza + camiseta"]
        },
        "shopifyIntegration": {
            "metafieldSnippet": "{{ product.metafields.ai.embedding_json }}",
            "recommendationIdea": "Cross-sell con tazas"
        },
        "toneVariants": {
            "sexy": "s", "cute": "c", "aspirational": "a", "dangerous": "d", "collector": "k"
        }
    })
}

/// Wraps `text` as a single-candidate `generateContent` reply.
pub fn gemini_text_reply(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP"
        }]
    })
}

pub fn gemini_error(code: u16, message: &str, status: &str) -> Value {
    json!({ "error": { "code": code, "message": message, "status": status } })
}
