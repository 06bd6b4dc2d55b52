//! Response shaping: reduces raw analysis results to the public payloads.

use crate::services::language::{Category, Entity, EntityType, Sentiment, Token};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentBody {
    pub sentiment: Option<f64>,
    pub magnitude: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityBody {
    pub name: String,
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    pub salience: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySentimentBody {
    pub name: String,
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    pub score: Option<f64>,
    pub magnitude: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Morphology {
    pub tag: Option<String>,
    pub case: Option<String>,
    pub tense: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenBody {
    pub text: Option<String>,
    pub morphology: Morphology,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryBody {
    pub name: String,
    pub confidence: Option<f64>,
}

impl From<CategoryBody> for Category {
    fn from(body: CategoryBody) -> Self {
        Category {
            name: body.name,
            confidence: body.confidence,
        }
    }
}

pub fn sentiment_json(sentiment: &Sentiment) -> SentimentBody {
    SentimentBody {
        sentiment: sentiment.score,
        magnitude: sentiment.magnitude,
    }
}

/// `Sentiment = <score>; magnitude = <magnitude>`; absent values print as
/// `undefined`.
pub fn sentiment_text(sentiment: &Sentiment) -> String {
    format!(
        "Sentiment = {}; magnitude = {}",
        display_or_undefined(sentiment.score),
        display_or_undefined(sentiment.magnitude)
    )
}

fn display_or_undefined(value: Option<f64>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| "undefined".to_string())
}

/// Descending salience; a pair where either side lacks salience is equal.
pub fn compare_salience(a: &Entity, b: &Entity) -> Ordering {
    match (a.salience, b.salience) {
        (Some(a), Some(b)) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
        _ => Ordering::Equal,
    }
}

/// Stable sort by descending salience.
///
/// `compare_salience` is not transitive once a salience is missing, which
/// the standard library sorts may reject with a panic, so this is an
/// insertion sort: an element only moves past neighbours it compares
/// strictly greater than, and an entity without salience never moves
/// relative to any other entity.
pub fn sort_by_salience(entities: &mut [Entity]) {
    for i in 1..entities.len() {
        let mut j = i;
        while j > 0 && compare_salience(&entities[j], &entities[j - 1]) == Ordering::Less {
            entities.swap(j, j - 1);
            j -= 1;
        }
    }
}

pub fn shape_entities(mut entities: Vec<Entity>) -> Vec<EntityBody> {
    sort_by_salience(&mut entities);
    entities
        .into_iter()
        .map(|entity| EntityBody {
            name: entity.name,
            entity_type: entity.entity_type,
            salience: entity.salience,
        })
        .collect()
}

pub fn shape_entity_sentiments(mut entities: Vec<Entity>) -> Vec<EntitySentimentBody> {
    sort_by_salience(&mut entities);
    entities
        .into_iter()
        .map(|entity| {
            let sentiment = entity.sentiment.unwrap_or_default();
            EntitySentimentBody {
                name: entity.name,
                entity_type: entity.entity_type,
                score: sentiment.score,
                magnitude: sentiment.magnitude,
            }
        })
        .collect()
}

pub fn shape_tokens(tokens: Vec<Token>) -> Vec<TokenBody> {
    tokens
        .into_iter()
        .map(|token| {
            let pos = token.part_of_speech.unwrap_or_default();
            TokenBody {
                text: token.text.and_then(|span| span.content),
                morphology: Morphology {
                    tag: pos.tag,
                    case: pos.case,
                    tense: pos.tense,
                },
            }
        })
        .collect()
}

pub fn shape_categories(categories: Vec<Category>) -> Vec<CategoryBody> {
    categories
        .into_iter()
        .map(|category| CategoryBody {
            name: category.name,
            confidence: category.confidence,
        })
        .collect()
}
