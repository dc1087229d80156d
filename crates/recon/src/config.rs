use serde::{Deserialize, Serialize};

use crate::column::Role;
use crate::error::ReconError;
use crate::normalize::MIN_PART_NUMBER_LEN;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Run configuration. Every section is optional; defaults reproduce the
/// stock column aliases and French annotations used in BOM workbooks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReconConfig {
    #[serde(default)]
    pub columns: ColumnAliases,
    #[serde(default)]
    pub comments: CommentConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
    #[serde(default)]
    pub clean: CleanConfig,
    #[serde(default)]
    pub commit: CommitConfig,
}

// ---------------------------------------------------------------------------
// Column aliases
// ---------------------------------------------------------------------------

/// Alias lists per column role. A header matches a role when any alias is a
/// case-insensitive substring of it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColumnAliases {
    #[serde(default = "default_part_number")]
    pub part_number: Vec<String>,
    #[serde(default = "default_project")]
    pub project: Vec<String>,
    #[serde(default = "default_status")]
    pub status: Vec<String>,
    #[serde(default = "default_description")]
    pub description: Vec<String>,
    #[serde(default = "default_supplier")]
    pub supplier: Vec<String>,
    #[serde(default = "default_price")]
    pub price: Vec<String>,
    #[serde(default = "default_notes")]
    pub notes: Vec<String>,
    #[serde(default = "default_quantity")]
    pub quantity: Vec<String>,
}

impl ColumnAliases {
    pub fn for_role(&self, role: Role) -> &[String] {
        match role {
            Role::PartNumber => &self.part_number,
            Role::Project => &self.project,
            Role::Status => &self.status,
            Role::Description => &self.description,
            Role::Supplier => &self.supplier,
            Role::Price => &self.price,
            Role::Notes => &self.notes,
            Role::Quantity => &self.quantity,
        }
    }
}

impl Default for ColumnAliases {
    fn default() -> Self {
        Self {
            part_number: default_part_number(),
            project: default_project(),
            status: default_status(),
            description: default_description(),
            supplier: default_supplier(),
            price: default_price(),
            notes: default_notes(),
            quantity: default_quantity(),
        }
    }
}

fn owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn default_part_number() -> Vec<String> {
    owned(&[
        "Part Number", "PN", "Réf Composant", "Reference", "Ref", "Part_Number",
        "Référence", "Part_Num", "Numéro_Pièce", "Code_Article", "Article",
    ])
}

fn default_project() -> Vec<String> {
    owned(&[
        "Projet", "Project", "Prj", "Programme", "Program", "Nom_Projet", "Code_Projet",
        "Project_Name",
    ])
}

fn default_status() -> Vec<String> {
    owned(&[
        "Statut", "Status", "État", "State", "Etat", "État_Pièce", "Statut_Article",
        "Component_Status",
    ])
}

fn default_description() -> Vec<String> {
    owned(&["Description", "Désignation", "Desc", "Libellé", "Component_Description", "Part_Description"])
}

fn default_supplier() -> Vec<String> {
    owned(&["Fournisseur", "Supplier", "Vendor", "Fabricant", "Manufacturer", "Supplier_Name"])
}

fn default_price() -> Vec<String> {
    owned(&["Prix", "Price", "Coût", "Cost", "Unit_Price", "Prix_Unitaire", "Tarif"])
}

fn default_notes() -> Vec<String> {
    owned(&["Notes", "Note", "Commentaire", "Comment", "Remarque"])
}

fn default_quantity() -> Vec<String> {
    owned(&["Quantité", "Quantity", "Qty", "Qté", "Amount"])
}

// ---------------------------------------------------------------------------
// Comments
// ---------------------------------------------------------------------------

/// Annotation written to the notes column for each actioned row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommentConfig {
    #[serde(default = "default_to_replace_comment")]
    pub to_replace: String,
    #[serde(default = "default_duplicate_comment")]
    pub duplicate: String,
    #[serde(default = "default_format_error_comment")]
    pub format_error: String,
    #[serde(default = "default_not_found_comment")]
    pub not_found: String,
}

impl Default for CommentConfig {
    fn default() -> Self {
        Self {
            to_replace: default_to_replace_comment(),
            duplicate: default_duplicate_comment(),
            format_error: default_format_error_comment(),
            not_found: default_not_found_comment(),
        }
    }
}

fn default_to_replace_comment() -> String {
    "Statut X remplacé par D".into()
}

fn default_duplicate_comment() -> String {
    "Doublon ou incertain – vérification manuelle requise".into()
}

fn default_format_error_comment() -> String {
    "Erreur de format – à corriger manuellement".into()
}

fn default_not_found_comment() -> String {
    "PN inconnu – insertion possible".into()
}

// ---------------------------------------------------------------------------
// Validation, clean, commit
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ValidationConfig {
    #[serde(default = "default_min_len")]
    pub min_part_number_length: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self { min_part_number_length: default_min_len() }
    }
}

fn default_min_len() -> usize {
    MIN_PART_NUMBER_LEN
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CleanConfig {
    /// Columns placed right after the part-number column, when present.
    #[serde(default = "default_preferred_columns")]
    pub preferred_columns: Vec<String>,
}

impl Default for CleanConfig {
    fn default() -> Self {
        Self { preferred_columns: default_preferred_columns() }
    }
}

fn default_preferred_columns() -> Vec<String> {
    owned(&["Projet", "Quantité", "Désignation"])
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommitConfig {
    /// Status given to rows appended to the reference by `commit_additions`.
    #[serde(default = "default_new_row_status")]
    pub new_row_status: String,
}

impl Default for CommitConfig {
    fn default() -> Self {
        Self { new_row_status: default_new_row_status() }
    }
}

fn default_new_row_status() -> String {
    "A".into()
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: ReconConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        for role in Role::ALL {
            let aliases = self.columns.for_role(role);
            if role == Role::PartNumber && aliases.is_empty() {
                return Err(ReconError::ConfigValidation(
                    "columns.part_number needs at least one alias".into(),
                ));
            }
            // An empty alias is a substring of every header
            if aliases.iter().any(|a| a.trim().is_empty()) {
                return Err(ReconError::ConfigValidation(format!(
                    "columns.{}: blank alias",
                    role.as_str()
                )));
            }
        }

        if self.validation.min_part_number_length == 0 {
            return Err(ReconError::ConfigValidation(
                "validation.min_part_number_length must be at least 1".into(),
            ));
        }

        let comments = [
            ("to_replace", &self.comments.to_replace),
            ("duplicate", &self.comments.duplicate),
            ("format_error", &self.comments.format_error),
            ("not_found", &self.comments.not_found),
        ];
        for (name, text) in comments {
            if text.trim().is_empty() {
                return Err(ReconError::ConfigValidation(format!("comments.{name} is blank")));
            }
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
