//! Header-to-role resolution.
//!
//! Column names in BOM workbooks are free text ("Part Number", "Réf
//! Composant", "PN client", ...). A role is bound to the leftmost header that
//! contains any of the role's aliases, compared case-insensitively.

use crate::config::ColumnAliases;
use crate::error::ReconError;
use crate::model::Table;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    PartNumber,
    Project,
    Status,
    Description,
    Supplier,
    Price,
    Notes,
    Quantity,
}

impl Role {
    pub const ALL: [Role; 8] = [
        Role::PartNumber,
        Role::Project,
        Role::Status,
        Role::Description,
        Role::Supplier,
        Role::Price,
        Role::Notes,
        Role::Quantity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::PartNumber => "part_number",
            Role::Project => "project",
            Role::Status => "status",
            Role::Description => "description",
            Role::Supplier => "supplier",
            Role::Price => "price",
            Role::Notes => "notes",
            Role::Quantity => "quantity",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Index of the first header (left to right) containing any alias.
///
/// The leftmost match wins even when a later header is an exact match.
pub fn resolve<S: AsRef<str>>(headers: &[String], aliases: &[S]) -> Option<usize> {
    let aliases: Vec<String> = aliases.iter().map(|a| a.as_ref().to_lowercase()).collect();
    headers.iter().position(|header| {
        let header = header.to_lowercase();
        aliases.iter().any(|alias| header.contains(alias.as_str()))
    })
}

/// Column index per role for one table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoleMap {
    pub part_number: Option<usize>,
    pub project: Option<usize>,
    pub status: Option<usize>,
    pub description: Option<usize>,
    pub supplier: Option<usize>,
    pub price: Option<usize>,
    pub notes: Option<usize>,
    pub quantity: Option<usize>,
}

impl RoleMap {
    /// Resolve every role independently against `table`'s headers.
    pub fn resolve(table: &Table, aliases: &ColumnAliases) -> RoleMap {
        let mut map = RoleMap::default();
        for role in Role::ALL {
            map.set(role, resolve(table.headers(), aliases.for_role(role)));
        }
        map
    }

    pub fn get(&self, role: Role) -> Option<usize> {
        match role {
            Role::PartNumber => self.part_number,
            Role::Project => self.project,
            Role::Status => self.status,
            Role::Description => self.description,
            Role::Supplier => self.supplier,
            Role::Price => self.price,
            Role::Notes => self.notes,
            Role::Quantity => self.quantity,
        }
    }

    pub fn set(&mut self, role: Role, column: Option<usize>) {
        let slot = match role {
            Role::PartNumber => &mut self.part_number,
            Role::Project => &mut self.project,
            Role::Status => &mut self.status,
            Role::Description => &mut self.description,
            Role::Supplier => &mut self.supplier,
            Role::Price => &mut self.price,
            Role::Notes => &mut self.notes,
            Role::Quantity => &mut self.quantity,
        };
        *slot = column;
    }

    /// Column for a role that must be present.
    pub fn require(&self, role: Role, table: &str) -> Result<usize, ReconError> {
        self.get(role).ok_or_else(|| ReconError::MissingColumn {
            table: table.into(),
            role: role.as_str().into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn headers(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn case_insensitive_substring() {
        let h = headers(&["Qty", "part number (client)", "Projet"]);
        assert_eq!(resolve(&h, &["Part Number"]), Some(1));
        assert_eq!(resolve(&h, &["projet"]), Some(2));
        assert_eq!(resolve(&h, &["Statut"]), None);
    }

    #[test]
    fn leftmost_column_wins_over_exact_match() {
        // "PN client" contains "PN"; the exact "Part Number" header comes later
        let h = headers(&["PN client", "Part Number"]);
        assert_eq!(resolve(&h, &["Part Number", "PN"]), Some(0));
    }

    #[test]
    fn alias_order_does_not_matter() {
        let h = headers(&["Reference", "PN"]);
        assert_eq!(resolve(&h, &["PN", "Reference"]), Some(0));
    }

    #[test]
    fn role_map_from_defaults() {
        let t = Table::new(headers(&["Part Number", "Projet", "Statut", "Description", "Notes"]));
        let map = RoleMap::resolve(&t, &ColumnAliases::default());
        assert_eq!(map.part_number, Some(0));
        assert_eq!(map.project, Some(1));
        assert_eq!(map.status, Some(2));
        assert_eq!(map.description, Some(3));
        assert_eq!(map.notes, Some(4));
        assert_eq!(map.supplier, None);
    }

    #[test]
    fn require_reports_table_and_role() {
        let t = Table::new(headers(&["Foo"]));
        let map = RoleMap::resolve(&t, &ColumnAliases::default());
        let err = map.require(Role::PartNumber, "reference").unwrap_err();
        assert_eq!(err.to_string(), "reference table: no column matches role 'part_number'");
    }

    proptest! {
        #[test]
        fn resolved_column_is_the_leftmost_match(
            raw in proptest::collection::vec("[a-zA-Z ]{0,8}", 0..8),
            alias in "[a-zA-Z]{1,3}",
        ) {
            let h: Vec<String> = raw;
            let needle = alias.to_lowercase();
            let matches: Vec<usize> = (0..h.len())
                .filter(|&i| h[i].to_lowercase().contains(&needle))
                .collect();

            match resolve(&h, &[alias.as_str()]) {
                Some(col) => {
                    prop_assert!(matches.iter().all(|&m| col <= m));
                    prop_assert!(matches.contains(&col));
                }
                None => prop_assert!(matches.is_empty()),
            }
        }

        #[test]
        fn resolution_ignores_case(
            raw in proptest::collection::vec("[a-zA-Z]{0,6}", 0..6),
            alias in "[a-zA-Z]{1,3}",
        ) {
            let upper: Vec<String> = raw.iter().map(|h| h.to_uppercase()).collect();
            prop_assert_eq!(resolve(&raw, &[alias.as_str()]), resolve(&upper, &[alias.to_lowercase()]));
        }
    }
}
