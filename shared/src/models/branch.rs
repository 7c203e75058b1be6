//! Branch Model

use serde::{Deserialize, Serialize};

/// Manager assigned to a branch (populated reference)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerRef {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Branch entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Branch {
    #[serde(rename = "_id")]
    pub id: String,
    pub branch_name: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub manager: Option<ManagerRef>,
}

impl Branch {
    /// Id of the assigned manager, if any.
    ///
    /// A populated manager with an empty id counts as unassigned.
    pub fn manager_id(&self) -> Option<&str> {
        self.manager
            .as_ref()
            .map(|m| m.id.as_str())
            .filter(|id| !id.is_empty())
    }

    /// Label used in branch pickers: `"<name> - <location>"`
    pub fn label(&self) -> String {
        format!("{} - {}", self.branch_name, self.location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_branch_deserialize_with_manager() {
        let json = r#"{
            "_id": "b1",
            "branchName": "Bole",
            "location": "Addis Ababa",
            "manager": { "_id": "m1", "name": "Abebe" }
        }"#;
        let branch: Branch = serde_json::from_str(json).unwrap();
        assert_eq!(branch.id, "b1");
        assert_eq!(branch.manager_id(), Some("m1"));
        assert_eq!(branch.label(), "Bole - Addis Ababa");
    }

    #[test]
    fn test_branch_without_manager() {
        let json = r#"{ "_id": "b2", "branchName": "Piassa", "location": "Center", "manager": null }"#;
        let branch: Branch = serde_json::from_str(json).unwrap();
        assert_eq!(branch.manager_id(), None);

        let json = r#"{ "_id": "b3", "branchName": "Kazanchis" }"#;
        let branch: Branch = serde_json::from_str(json).unwrap();
        assert!(branch.manager.is_none());
        assert_eq!(branch.location, "");
    }

    #[test]
    fn test_empty_manager_id_is_unassigned() {
        let branch = Branch {
            id: "b4".into(),
            branch_name: "Megenagna".into(),
            location: "East".into(),
            manager: Some(ManagerRef {
                id: String::new(),
                name: None,
            }),
        };
        assert_eq!(branch.manager_id(), None);
    }
}
