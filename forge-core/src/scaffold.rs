//! Python solution scaffolds that ship alongside a puzzle description
//!
//! A puzzle package carries three scripts: `forge.py` generates the input,
//! `decrypt.py` solves the first part and `unveil.py` the second. Each kind
//! has a few starter templates and a structural check run before packaging.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{ForgeError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaffoldKind {
    Forge,
    Decrypt,
    Unveil,
}

/// A starter template for one scaffold kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScaffoldTemplate {
    pub label: &'static str,
    pub value: &'static str,
    pub code: &'static str,
}

/// Result of a structural check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScaffoldReport {
    pub valid: bool,
    pub issues: Vec<String>,
}

/// A required code fragment and the issue reported when it is missing
struct Requirement {
    fragment: &'static str,
    issue: &'static str,
}

const FORGE_REQUIREMENTS: &[Requirement] = &[
    Requirement {
        fragment: "class Forge",
        issue: "Missing 'class Forge' definition",
    },
    Requirement {
        fragment: "def __init__(self, lines_count: int, unique_id: str = None)",
        issue: "Missing or incorrect constructor method",
    },
    Requirement {
        fragment: "def run(self)",
        issue: "Missing 'run' method",
    },
    Requirement {
        fragment: "def generate_line(self, index: int)",
        issue: "Missing 'generate_line' method",
    },
    Requirement {
        fragment: "def run(self) -> list",
        issue: "'run' method should specify return type -> list",
    },
    Requirement {
        fragment: "def generate_line(self, index: int) -> str",
        issue: "'generate_line' method should specify return type -> str",
    },
];

const DECRYPT_REQUIREMENTS: &[Requirement] = &[
    Requirement {
        fragment: "class Decrypt",
        issue: "Missing 'class Decrypt' definition",
    },
    Requirement {
        fragment: "def __init__(self, lines",
        issue: "Missing or incorrect constructor method",
    },
    Requirement {
        fragment: "def run(self)",
        issue: "Missing 'run' method",
    },
];

const UNVEIL_REQUIREMENTS: &[Requirement] = &[
    Requirement {
        fragment: "class Unveil",
        issue: "Missing 'class Unveil' definition",
    },
    Requirement {
        fragment: "def __init__(self, lines",
        issue: "Missing or incorrect constructor method",
    },
    Requirement {
        fragment: "def run(self)",
        issue: "Missing 'run' method",
    },
];

const FORGE_TEMPLATES: &[ScaffoldTemplate] = &[
    ScaffoldTemplate {
        label: "Basic Template",
        value: "basic",
        code: include_str!("../templates/forge_basic.py"),
    },
    ScaffoldTemplate {
        label: "Number Puzzle Template",
        value: "number",
        code: include_str!("../templates/forge_number.py"),
    },
];

const DECRYPT_TEMPLATES: &[ScaffoldTemplate] = &[
    ScaffoldTemplate {
        label: "Basic Template",
        value: "basic",
        code: include_str!("../templates/decrypt_basic.py"),
    },
    ScaffoldTemplate {
        label: "Pattern Matching",
        value: "pattern",
        code: include_str!("../templates/decrypt_pattern.py"),
    },
];

const UNVEIL_TEMPLATES: &[ScaffoldTemplate] = &[
    ScaffoldTemplate {
        label: "Basic Template",
        value: "basic",
        code: include_str!("../templates/unveil_basic.py"),
    },
    ScaffoldTemplate {
        label: "Matrix Processing",
        value: "matrix",
        code: include_str!("../templates/unveil_matrix.py"),
    },
];

impl ScaffoldKind {
    pub fn all() -> [ScaffoldKind; 3] {
        [ScaffoldKind::Forge, ScaffoldKind::Decrypt, ScaffoldKind::Unveil]
    }

    /// File name of the script inside a puzzle package
    pub fn file_name(&self) -> &'static str {
        match self {
            ScaffoldKind::Forge => "forge.py",
            ScaffoldKind::Decrypt => "decrypt.py",
            ScaffoldKind::Unveil => "unveil.py",
        }
    }

    pub fn templates(&self) -> &'static [ScaffoldTemplate] {
        match self {
            ScaffoldKind::Forge => FORGE_TEMPLATES,
            ScaffoldKind::Decrypt => DECRYPT_TEMPLATES,
            ScaffoldKind::Unveil => UNVEIL_TEMPLATES,
        }
    }

    /// Find a template by its value (`basic`, `pattern`, ...)
    pub fn template(&self, value: &str) -> Option<&'static ScaffoldTemplate> {
        self.templates().iter().find(|template| template.value == value)
    }

    fn requirements(&self) -> &'static [Requirement] {
        match self {
            ScaffoldKind::Forge => FORGE_REQUIREMENTS,
            ScaffoldKind::Decrypt => DECRYPT_REQUIREMENTS,
            ScaffoldKind::Unveil => UNVEIL_REQUIREMENTS,
        }
    }

    /// Method whose body the placeholder check refers to
    fn implemented_method(&self) -> &'static str {
        match self {
            ScaffoldKind::Forge => "generate_line",
            ScaffoldKind::Decrypt | ScaffoldKind::Unveil => "run",
        }
    }

    /// Check that `code` has the structure the puzzle runner expects.
    ///
    /// Fragment checks are plain substring tests. Code containing both a
    /// `# TODO` marker and a `pass` statement is treated as unimplemented.
    pub fn validate(&self, code: &str) -> ScaffoldReport {
        let mut issues: Vec<String> = self
            .requirements()
            .iter()
            .filter(|requirement| !code.contains(requirement.fragment))
            .map(|requirement| requirement.issue.to_string())
            .collect();

        if code.contains("# TODO") && code.contains("pass") {
            issues.push(format!(
                "Implementation needed: '{}' method contains placeholder code",
                self.implemented_method()
            ));
        }

        ScaffoldReport {
            valid: issues.is_empty(),
            issues,
        }
    }
}

impl std::fmt::Display for ScaffoldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScaffoldKind::Forge => write!(f, "forge"),
            ScaffoldKind::Decrypt => write!(f, "decrypt"),
            ScaffoldKind::Unveil => write!(f, "unveil"),
        }
    }
}

impl FromStr for ScaffoldKind {
    type Err = ForgeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().trim_end_matches(".py") {
            "forge" => Ok(ScaffoldKind::Forge),
            "decrypt" => Ok(ScaffoldKind::Decrypt),
            "unveil" => Ok(ScaffoldKind::Unveil),
            other => Err(ForgeError::validation(format!(
                "Unknown scaffold kind '{}', expected forge, decrypt or unveil",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parsing() {
        assert_eq!("forge.py".parse::<ScaffoldKind>().unwrap(), ScaffoldKind::Forge);
        assert_eq!("Unveil".parse::<ScaffoldKind>().unwrap(), ScaffoldKind::Unveil);
        assert!("solve".parse::<ScaffoldKind>().is_err());
        assert_eq!(ScaffoldKind::Decrypt.file_name(), "decrypt.py");
    }

    #[test]
    fn test_every_kind_has_a_basic_template() {
        for kind in ScaffoldKind::all() {
            let basic = kind.template("basic").unwrap();
            assert_eq!(basic.label, "Basic Template");
            assert!(basic.code.starts_with(&format!("# {}", kind.file_name())));
        }
        assert!(ScaffoldKind::Forge.template("missing").is_none());
    }

    #[test]
    fn test_complete_templates_validate() {
        assert!(ScaffoldKind::Forge.validate(FORGE_TEMPLATES[0].code).valid);
        assert!(ScaffoldKind::Forge.validate(FORGE_TEMPLATES[1].code).valid);
        assert!(ScaffoldKind::Decrypt.validate(DECRYPT_TEMPLATES[1].code).valid);
        assert!(ScaffoldKind::Unveil.validate(UNVEIL_TEMPLATES[1].code).valid);
    }

    #[test]
    fn test_placeholder_templates_are_flagged() {
        let report = ScaffoldKind::Decrypt.validate(DECRYPT_TEMPLATES[0].code);
        assert!(!report.valid);
        assert_eq!(
            report.issues,
            vec!["Implementation needed: 'run' method contains placeholder code"]
        );
    }

    #[test]
    fn test_forge_missing_return_types() {
        let code = "class Forge:\n    def __init__(self, lines_count: int, unique_id: str = None):\n        pass\n    def run(self):\n        return []\n    def generate_line(self, index: int):\n        return ''\n";
        let report = ScaffoldKind::Forge.validate(code);
        assert_eq!(
            report.issues,
            vec![
                "'run' method should specify return type -> list",
                "'generate_line' method should specify return type -> str",
            ]
        );
    }

    #[test]
    fn test_empty_code_reports_everything() {
        let report = ScaffoldKind::Unveil.validate("");
        assert_eq!(report.issues.len(), 3);
        assert!(!ScaffoldKind::Forge.validate("").valid);
    }
}
