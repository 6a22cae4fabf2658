//! Persona templates that turn raw content into backend instructions

use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};

pub const DEFAULT_AUDIENCE: &str = "general";
pub const DEFAULT_TONE: &str = "neutral";
pub const DEFAULT_PURPOSE: &str = "explain";
pub const DEFAULT_LENGTH_STRATEGY: &str = "minimal";

/// Style knobs for a single rewrite
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleParameters
{   pub audience: String
  , pub tone: String
  , pub purpose: String
  , pub length_strategy: String
}

impl Default for StyleParameters
{   fn default() -> Self
    {   StyleParameters
        {   audience: DEFAULT_AUDIENCE.to_string()
          , tone: DEFAULT_TONE.to_string()
          , purpose: DEFAULT_PURPOSE.to_string()
          , length_strategy: DEFAULT_LENGTH_STRATEGY.to_string()
        }
    }
}

impl StyleParameters
{   /// Fill absent or blank values with defaults
    pub fn from_optional(
      audience: Option<String>
    , tone: Option<String>
    , purpose: Option<String>
    , length_strategy: Option<String>
    ) -> Self
    {   fn pick(value: Option<String>, default: &str) -> String
        {   value
              .map(|v| v.trim().to_string())
              .filter(|v| !v.is_empty())
              .unwrap_or_else(|| default.to_string())
        }
        StyleParameters
        {   audience: pick(audience, DEFAULT_AUDIENCE)
          , tone: pick(tone, DEFAULT_TONE)
          , purpose: pick(purpose, DEFAULT_PURPOSE)
          , length_strategy: pick(length_strategy, DEFAULT_LENGTH_STRATEGY)
        }
    }
}

/// Instructional template, chosen per deployment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Persona
{   /// Constrained professional editor
    #[default]
    Editor
  , /// Unconstrained ghostwriter tuned against AI detectors
    Ghostwriter
}

impl FromStr for Persona
{   type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {   match s.trim().to_ascii_lowercase().as_str()
        {   "editor" => Ok(Persona::Editor)
          , "ghostwriter" => Ok(Persona::Ghostwriter)
          , other => Err(crate::error::Error::InvalidConfiguration(
              format!("unknown persona '{}'", other)
            ))
        }
    }
}

impl fmt::Display for Persona
{   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {   match self
        {   Persona::Editor => write!(f, "editor")
          , Persona::Ghostwriter => write!(f, "ghostwriter")
        }
    }
}

/// Extra guidance for the length strategies we know about
fn length_guidance(strategy: &str) -> &'static str
{   match strategy
    {   "minimal" => "keep the length within about 10% of the original"
      , "shorten" => "tighten the text and cut roughly a third of its length"
      , "expand" => "develop the ideas further, adding detail and examples"
      , _ => "follow this length strategy as closely as the content allows"
    }
}

impl Persona
{   /// Build the full instruction for `content`
    pub fn build(&self, content: &str, style: &StyleParameters) -> String
    {   build(*self, content, style)
    }
}

/// Interpolate content and style into the persona's template
pub fn build(
  persona: Persona
, content: &str
, style: &StyleParameters
) -> String
{   let guidance = length_guidance(&style.length_strategy);
    match persona
    {   Persona::Editor => format!(
"You are a professional editor. Rewrite the text below so it reads \
naturally and clearly while preserving every fact, name and number.

Audience: {audience}
Tone: {tone}
Purpose: {purpose}
Length strategy: {length} ({guidance})

Rules:
- Do not add information that is not in the original.
- Do not use headings, bullet points or markdown unless the original does.
- Return only the rewritten text, with no preamble or commentary.

Text:
{content}",
          audience = style.audience,
          tone = style.tone,
          purpose = style.purpose,
          length = style.length_strategy,
          guidance = guidance,
          content = content
        )
      , Persona::Ghostwriter => format!(
"You are a seasoned human ghostwriter. Rewrite the text below so it \
sounds unmistakably written by a person: vary sentence length and rhythm, \
prefer concrete wording over generic phrasing, allow the occasional \
informal turn, and avoid the stock transitions and symmetrical structure \
typical of machine-generated prose.

Write for this audience: {audience}
Keep this tone: {tone}
The text should: {purpose}
Length strategy: {length} ({guidance})

Return only the rewritten text.

Text:
{content}",
          audience = style.audience,
          tone = style.tone,
          purpose = style.purpose,
          length = style.length_strategy,
          guidance = guidance,
          content = content
        )
    }
}

#[cfg(test)]
mod tests
{   use super::*;

    fn students_formal() -> StyleParameters
    {   StyleParameters
        {   audience: "students".to_string()
          , tone: "formal".to_string()
          , purpose: "explain".to_string()
          , length_strategy: "shorten".to_string()
        }
    }

    #[test]
    fn every_persona_interpolates_all_values()
    {   for persona in [Persona::Editor, Persona::Ghostwriter]
        {   let prompt = persona.build("X", &students_formal());
            for needle in ["X", "students", "formal", "explain", "shorten"]
            {   assert!(
                  prompt.contains(needle),
                  "{} prompt missing {}", persona, needle
                );
            }
            assert!(prompt.ends_with("Text:\nX"));
        }
    }

    #[test]
    fn build_is_deterministic()
    {   let style = students_formal();
        assert_eq!(
          build(Persona::Editor, "same", &style),
          build(Persona::Editor, "same", &style)
        );
        assert_ne!(
          build(Persona::Editor, "same", &style),
          build(Persona::Ghostwriter, "same", &style)
        );
    }

    #[test]
    fn unknown_length_strategy_is_kept_verbatim()
    {   let style = StyleParameters
        {   length_strategy: "haiku".to_string()
          , ..StyleParameters::default()
        };
        let prompt = Persona::Editor.build("body", &style);
        assert!(prompt.contains("Length strategy: haiku"));
    }

    #[test]
    fn optional_values_fall_back_to_defaults()
    {   let style = StyleParameters::from_optional(
          Some("experts".to_string()),
          None,
          Some("  ".to_string()),
          None
        );
        assert_eq!(style.audience, "experts");
        assert_eq!(style.tone, DEFAULT_TONE);
        assert_eq!(style.purpose, DEFAULT_PURPOSE);
        assert_eq!(style.length_strategy, DEFAULT_LENGTH_STRATEGY);
    }

    #[test]
    fn persona_parses_case_insensitively()
    {   assert_eq!("Ghostwriter".parse::<Persona>(), Ok(Persona::Ghostwriter));
        assert!("poet".parse::<Persona>().is_err());
    }
}
