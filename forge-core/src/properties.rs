//! Puzzle package properties: `meta.xml` and `desc.xml`

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::LazyLock;

use crate::error::{ForgeError, Result};

const PROPERTIES_NAMESPACE: &str = "http://www.w3.org/2001/WMLSchema";

pub const META_FILE_NAME: &str = "meta.xml";
pub const DESC_FILE_NAME: &str = "desc.xml";

static ISO_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("date pattern is valid"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Fr,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Fr => "fr",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Fr => "Français",
        }
    }
}

impl FromStr for Language {
    type Err = ForgeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Language::En),
            "fr" => Ok(Language::Fr),
            other => Err(ForgeError::validation(format!("Unsupported language: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "EASY",
            Difficulty::Medium => "MEDIUM",
            Difficulty::Hard => "HARD",
        }
    }
}

impl FromStr for Difficulty {
    type Err = ForgeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "EASY" => Ok(Difficulty::Easy),
            "MEDIUM" => Ok(Difficulty::Medium),
            "HARD" => Ok(Difficulty::Hard),
            other => Err(ForgeError::validation(format!("Unsupported difficulty: {}", other))),
        }
    }
}

/// Author-facing properties of a puzzle package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PuzzleProperties {
    pub author: String,
    #[serde(default)]
    pub language: Language,
    #[serde(default)]
    pub difficulty: Difficulty,
}

/// Generated property files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyFiles {
    pub meta_xml: String,
    pub desc_xml: String,
}

impl PuzzleProperties {
    pub fn new(author: impl Into<String>, language: Language, difficulty: Difficulty) -> Self {
        Self {
            author: author.into(),
            language,
            difficulty,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.author.trim().is_empty() {
            return Err(ForgeError::validation("Author name is required"));
        }
        Ok(())
    }

    /// `meta.xml`; `date` is the creation and modification date as `YYYY-MM-DD`
    pub fn meta_xml(&self, date: &str) -> Result<String> {
        self.validate()?;
        if !ISO_DATE.is_match(date) {
            return Err(ForgeError::validation(format!(
                "Date must be formatted as YYYY-MM-DD, got '{}'",
                date
            )));
        }

        Ok(format!(
            "<Properties xmlns=\"{ns}\">\n    <author>{author}</author>\n    <created>{date}</created>\n    <modified>{date}</modified>\n    <title>Meta</title>\n</Properties>",
            ns = PROPERTIES_NAMESPACE,
            author = html_escape::encode_text(self.author.trim()),
            date = date,
        ))
    }

    pub fn desc_xml(&self) -> String {
        format!(
            "<Properties xmlns=\"{ns}\">\n    <difficulty>{difficulty}</difficulty>\n    <language>{language}</language>\n</Properties>",
            ns = PROPERTIES_NAMESPACE,
            difficulty = self.difficulty.as_str(),
            language = self.language.code(),
        )
    }

    /// Generate both files at once
    pub fn generate(&self, date: &str) -> Result<PropertyFiles> {
        Ok(PropertyFiles {
            meta_xml: self.meta_xml(date)?,
            desc_xml: self.desc_xml(),
        })
    }
}
