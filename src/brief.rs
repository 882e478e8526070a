use serde::{Deserialize, Serialize};
use serde_with::{serde_as, NoneAsEmptyString};

/// Lead-in line placed before the brief lines in the user turn.
pub const USER_TURN_LEAD: &str = "Genera contenido POD completo basado en la siguiente información del usuario:";

pub const MISSING_BASE_IDEA: &str = "Por favor, introduce tu \"Idea Base\" para generar el contenido.";

/// Form fields collected for one generation. Empty strings arrive as `None`.
#[serde_as]
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct DesignBrief {
    #[serde_as(as = "NoneAsEmptyString")]
    pub base_idea: Option<String>,
    #[serde_as(as = "NoneAsEmptyString")]
    pub product: Option<String>,
    #[serde_as(as = "NoneAsEmptyString")]
    pub visual_style: Option<String>,
    #[serde_as(as = "NoneAsEmptyString")]
    pub buyer_persona: Option<String>,
    #[serde_as(as = "NoneAsEmptyString")]
    pub emotion_purpose: Option<String>,
    #[serde_as(as = "NoneAsEmptyString")]
    pub brand_colors: Option<String>,
    #[serde_as(as = "NoneAsEmptyString")]
    pub market: Option<String>,
    #[serde_as(as = "NoneAsEmptyString")]
    pub print_material: Option<String>,
    #[serde_as(as = "NoneAsEmptyString")]
    pub print_technique: Option<String>,
    #[serde_as(as = "NoneAsEmptyString")]
    pub strategic_goal: Option<String>,
    #[serde_as(as = "NoneAsEmptyString")]
    pub sales_history: Option<String>,
    #[serde_as(as = "NoneAsEmptyString")]
    pub publication_type: Option<String>,
    #[serde_as(as = "NoneAsEmptyString")]
    pub market_trends: Option<String>,
    #[serde_as(as = "NoneAsEmptyString")]
    pub complementary_products: Option<String>,
    #[serde_as(as = "NoneAsEmptyString")]
    pub publication_platforms: Option<String>,
    #[serde_as(as = "NoneAsEmptyString")]
    pub micro_moments: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BriefField {
    BaseIdea,
    Product,
    VisualStyle,
    BuyerPersona,
    EmotionPurpose,
    BrandColors,
    Market,
    PrintMaterial,
    PrintTechnique,
    StrategicGoal,
    SalesHistory,
    PublicationType,
    MarketTrends,
    ComplementaryProducts,
    PublicationPlatforms,
    MicroMoments,
}

impl BriefField {
    /// Declared order; the builder emits lines in exactly this order.
    pub const ALL: [BriefField; 16] = [
        BriefField::BaseIdea,
        BriefField::Product,
        BriefField::VisualStyle,
        BriefField::BuyerPersona,
        BriefField::EmotionPurpose,
        BriefField::BrandColors,
        BriefField::Market,
        BriefField::PrintMaterial,
        BriefField::PrintTechnique,
        BriefField::StrategicGoal,
        BriefField::SalesHistory,
        BriefField::PublicationType,
        BriefField::MarketTrends,
        BriefField::ComplementaryProducts,
        BriefField::PublicationPlatforms,
        BriefField::MicroMoments,
    ];

    pub fn label(self) -> &'static str {
        match self {
            BriefField::BaseIdea => "Idea base",
            BriefField::Product => "Producto",
            BriefField::VisualStyle => "Estilo visual",
            BriefField::BuyerPersona => "Buyer persona",
            BriefField::EmotionPurpose => "Emoción principal",
            BriefField::BrandColors => "Colores clave",
            BriefField::Market => "Mercado objetivo",
            BriefField::PrintMaterial => "Material de impresión",
            BriefField::PrintTechnique => "Técnica de impresión preferida",
            BriefField::StrategicGoal => "Objetivo estratégico",
            BriefField::SalesHistory => "Historial de ventas, clics, shares y engagement previo",
            BriefField::PublicationType => "Tipo de publicación deseada",
            BriefField::MarketTrends => "Tendencias de mercado detectadas",
            BriefField::ComplementaryProducts => "Productos complementarios para bundle/cross-sell",
            BriefField::PublicationPlatforms => "Plataformas de publicación y adaptaciones necesarias",
            BriefField::MicroMoments => "Micro-momentos y triggers temporales",
        }
    }
}

impl DesignBrief {
    pub fn from_base_idea(idea: impl Into<String>) -> Self {
        Self { base_idea: Some(idea.into()), ..Default::default() }
    }

    pub fn get(&self, field: BriefField) -> Option<&str> {
        let value = match field {
            BriefField::BaseIdea => &self.base_idea,
            BriefField::Product => &self.product,
            BriefField::VisualStyle => &self.visual_style,
            BriefField::BuyerPersona => &self.buyer_persona,
            BriefField::EmotionPurpose => &self.emotion_purpose,
            BriefField::BrandColors => &self.brand_colors,
            BriefField::Market => &self.market,
            BriefField::PrintMaterial => &self.print_material,
            BriefField::PrintTechnique => &self.print_technique,
            BriefField::StrategicGoal => &self.strategic_goal,
            BriefField::SalesHistory => &self.sales_history,
            BriefField::PublicationType => &self.publication_type,
            BriefField::MarketTrends => &self.market_trends,
            BriefField::ComplementaryProducts => &self.complementary_products,
            BriefField::PublicationPlatforms => &self.publication_platforms,
            BriefField::MicroMoments => &self.micro_moments,
        };
        value.as_deref()
    }

    /// Checks the mandatory base idea. Runs before anything touches the network.
    pub fn validate(&self) -> Result<(), String> {
        match self.base_idea.as_deref() {
            Some(idea) if !idea.trim().is_empty() => Ok(()),
            _ => Err(MISSING_BASE_IDEA.to_string()),
        }
    }

    /// One `Label: value` line per present, non-empty field, in declared order.
    pub fn lines(&self) -> Vec<String> {
        BriefField::ALL
            .iter()
            .filter_map(|&field| match self.get(field) {
                Some(value) if !value.is_empty() => Some(format!("{}: {}", field.label(), value)),
                _ => None,
            })
            .collect()
    }

    pub fn user_turn(&self) -> String {
        let mut turn = String::from(USER_TURN_LEAD);
        for line in self.lines() {
            turn.push('\n');
            turn.push_str(&line);
        }
        turn
    }
}
